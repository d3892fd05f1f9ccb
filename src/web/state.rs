//! Shared state handed to every request handler.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::core::CamwebCore;

#[derive(Clone)]
pub struct WebAppState {
    core: Arc<CamwebCore>,
    /// Cancelled when the server begins shutting down; ends preview streams
    shutdown: CancellationToken,
}

impl WebAppState {
    pub fn new(core: CamwebCore) -> Self {
        Self {
            core: Arc::new(core),
            shutdown: CancellationToken::new(),
        }
    }

    pub fn core(&self) -> &CamwebCore {
        &self.core
    }

    pub fn shutdown_token(&self) -> &CancellationToken {
        &self.shutdown
    }
}
