//! Anonymous confession feed: creation, moderation, reactions and comments.

pub mod confession_store;
pub mod types;

pub use confession_store::ConfessionStore;
pub use types::{Comment, Confession, ConfessionStatus};
