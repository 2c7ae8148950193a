pub mod controller_handler;

pub use controller_handler::{open_backend, Controller};
