//! The UI message channel
//!
//! The consumer listens on a fire-and-forget "invoke method with
//! arguments" channel. The core produces these calls:
//!
//! | method | arguments |
//! |---|---|
//! | `entered` | `[x, y]` |
//! | `updated` | `[x, y]` |
//! | `exited` | null |
//! | `dropReceived` | `[itemCount, [x, y]]` |
//! | `performOperation` | list of item maps |
//!
//! and answers two companion commands, `startAccessingResource` and
//! `stopAccessingResource`, through `ResourceAccessHandler`.

mod access;
mod sinks;

pub use access::{CommandResult, ResourceAccessHandler};
pub use sinks::{JsonLinesSink, RecordingSink};

use crate::model::{DropPoint, FileDescriptor};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

pub const ENTERED: &str = "entered";
pub const UPDATED: &str = "updated";
pub const EXITED: &str = "exited";
pub const DROP_RECEIVED: &str = "dropReceived";
pub const PERFORM_OPERATION: &str = "performOperation";
pub const START_ACCESSING_RESOURCE: &str = "startAccessingResource";
pub const STOP_ACCESSING_RESOURCE: &str = "stopAccessingResource";

/// One invocation on the channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodCall {
    pub method: String,
    pub arguments: Value,
}

impl MethodCall {
    pub fn new(method: impl Into<String>, arguments: Value) -> Self {
        Self {
            method: method.into(),
            arguments,
        }
    }

    pub fn entered(point: DropPoint) -> Self {
        Self::new(ENTERED, json!(point))
    }

    pub fn updated(point: DropPoint) -> Self {
        Self::new(UPDATED, json!(point))
    }

    pub fn exited() -> Self {
        Self::new(EXITED, Value::Null)
    }

    pub fn drop_received(item_count: usize, location: DropPoint) -> Self {
        Self::new(DROP_RECEIVED, json!([item_count, location]))
    }

    pub fn perform_operation(items: &[FileDescriptor]) -> Self {
        Self::new(PERFORM_OPERATION, json!(items))
    }
}

/// Where channel calls go.
///
/// Sinks are owned by the UI thread and are not required to be `Send`:
/// background work never calls them directly.
pub trait MessageSink {
    fn invoke_method(&mut self, call: MethodCall);
}
