pub mod types;

pub use types::{ControllerError, ConfigError, StorageError, WebError};
