//! Application services layer.

pub mod clock;
pub mod error;
pub mod posts;
pub mod snapshot;
pub mod store;
