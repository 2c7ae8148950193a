pub mod cli;
pub mod clock;
pub mod confessions;
pub mod configuration;
pub mod controller;
pub mod error_handling;
pub mod habits;
pub mod moderation;
pub mod storage;
pub mod web_interface;

pub use controller::Controller;
pub use error_handling::types::ControllerError;
