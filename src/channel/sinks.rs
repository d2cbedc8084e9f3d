//! Ready-made message sinks

use super::{MessageSink, MethodCall};
use std::io::Write;

/// Writes each call as one JSON line.
pub struct JsonLinesSink<W: Write> {
    writer: W,
}

impl<W: Write> JsonLinesSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> MessageSink for JsonLinesSink<W> {
    fn invoke_method(&mut self, call: MethodCall) {
        let written = serde_json::to_writer(&mut self.writer, &call)
            .map_err(std::io::Error::from)
            .and_then(|()| self.writer.write_all(b"\n"))
            .and_then(|()| self.writer.flush());
        if let Err(e) = written {
            tracing::warn!(method = %call.method, error = %e, "failed to write channel call");
        }
    }
}

/// Keeps every call in memory, in order.
#[derive(Debug, Default, Clone)]
pub struct RecordingSink {
    calls: Vec<MethodCall>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> &[MethodCall] {
        &self.calls
    }

    pub fn methods(&self) -> Vec<&str> {
        self.calls.iter().map(|call| call.method.as_str()).collect()
    }

    /// The most recent call with the given method name.
    pub fn last(&self, method: &str) -> Option<&MethodCall> {
        self.calls.iter().rev().find(|call| call.method == method)
    }

    pub fn take(&mut self) -> Vec<MethodCall> {
        std::mem::take(&mut self.calls)
    }
}

impl MessageSink for RecordingSink {
    fn invoke_method(&mut self, call: MethodCall) {
        self.calls.push(call);
    }
}
