//! Data carried from a drop to the consumer

mod batch;
mod descriptor;

pub use batch::{DropBatch, DropPoint};
pub use descriptor::{AccessToken, FileDescriptor};
