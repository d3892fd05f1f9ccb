mod settings;

pub use settings::{
    save_tool_path, CameraSettings, Config, ServerSettings, StartPolicy, EXAMPLE_CONFIG,
};
