//! MJPEG framing for the live preview.
//!
//! The preview process writes back-to-back JPEG images to stdout. The
//! splitter cuts that byte stream into whole images, and each image is
//! wrapped as one part of a `multipart/x-mixed-replace` response.

/// Multipart boundary token
pub const BOUNDARY: &str = "frame";

/// Content type of the preview response
pub const CONTENT_TYPE: &str = "multipart/x-mixed-replace; boundary=frame";

const SOI: [u8; 2] = [0xFF, 0xD8];
const EOI: [u8; 2] = [0xFF, 0xD9];

/// Incremental JPEG frame extractor.
#[derive(Debug, Default)]
pub struct MjpegSplitter {
    buf: Vec<u8>,
    /// Offset up to which `buf` is known to hold no EOI marker
    scanned: usize,
}

impl MjpegSplitter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a chunk, returning every frame it completes.
    ///
    /// A frame runs from the first SOI before an EOI through that EOI.
    /// Data before the SOI, or a span with no SOI at all, is dropped.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<Vec<u8>> {
        self.buf.extend_from_slice(chunk);
        let mut frames = Vec::new();

        while let Some(eoi) = find(&self.buf[self.scanned..], &EOI).map(|i| i + self.scanned) {
            let end = eoi + EOI.len();
            let span = &self.buf[..end];
            if let Some(start) = find(span, &SOI) {
                frames.push(span[start..].to_vec());
            }
            self.buf.drain(..end);
            self.scanned = 0;
        }

        // A marker may straddle the next chunk
        self.scanned = self.buf.len().saturating_sub(1);
        frames
    }

    /// Bytes held waiting for an EOI
    pub fn buffered(&self) -> usize {
        self.buf.len()
    }
}

fn find(haystack: &[u8], needle: &[u8; 2]) -> Option<usize> {
    haystack.windows(2).position(|w| w == needle)
}

/// Wrap a JPEG as one multipart part
pub fn multipart_part(frame: &[u8]) -> Vec<u8> {
    let header = format!("--{}\r\nContent-Type: image/jpeg\r\n\r\n", BOUNDARY);
    let mut part = Vec::with_capacity(header.len() + frame.len() + 2);
    part.extend_from_slice(header.as_bytes());
    part.extend_from_slice(frame);
    part.extend_from_slice(b"\r\n");
    part
}
