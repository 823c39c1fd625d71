mod adapter;
mod app_config;
mod file_config;
mod loader;

pub use adapter::FileConfigAdapter;
pub use app_config::{AppConfig, ChatConfig, FirebaseConfig, GroqConfig, LogConfig};
pub use loader::load;
