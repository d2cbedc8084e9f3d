//! Companion commands: turning access tokens back into grants

use super::{MethodCall, START_ACCESSING_RESOURCE, STOP_ACCESSING_RESOURCE};
use crate::access::SecurityScope;
use crate::model::AccessToken;
use serde_json::{json, Value};
use std::sync::Arc;

/// Answer to a companion command.
#[derive(Debug, Clone, PartialEq)]
pub enum CommandResult {
    Success(Value),
    Error { code: String, message: String },
    /// The method name is not one this handler knows
    NotImplemented,
}

impl CommandResult {
    fn bad_args(message: impl Into<String>) -> Self {
        Self::Error {
            code: "bad_args".to_string(),
            message: message.into(),
        }
    }
}

/// Handles `startAccessingResource` / `stopAccessingResource`.
///
/// Both take `{"accessToken": [bytes]}` with a token previously delivered
/// in a `performOperation` item.
pub struct ResourceAccessHandler {
    scope: Arc<dyn SecurityScope>,
}

impl ResourceAccessHandler {
    pub fn new(scope: Arc<dyn SecurityScope>) -> Self {
        Self { scope }
    }

    pub fn handle(&self, call: &MethodCall) -> CommandResult {
        match call.method.as_str() {
            START_ACCESSING_RESOURCE => {
                let token = match token_argument(&call.arguments) {
                    Ok(token) => token,
                    Err(result) => return result,
                };
                let granted = self.scope.start_accessing(&token).unwrap_or_else(|e| {
                    tracing::debug!(error = %e, "could not resolve access token");
                    false
                });
                CommandResult::Success(json!(granted))
            }
            STOP_ACCESSING_RESOURCE => {
                let token = match token_argument(&call.arguments) {
                    Ok(token) => token,
                    Err(result) => return result,
                };
                if let Err(e) = self.scope.stop_accessing(&token) {
                    tracing::debug!(error = %e, "could not release access token");
                }
                CommandResult::Success(json!(true))
            }
            other => {
                tracing::warn!(method = other, "method not found");
                CommandResult::NotImplemented
            }
        }
    }
}

fn token_argument(arguments: &Value) -> Result<AccessToken, CommandResult> {
    let raw = arguments
        .get("accessToken")
        .ok_or_else(|| CommandResult::bad_args("missing accessToken"))?;
    serde_json::from_value(raw.clone())
        .map_err(|e| CommandResult::bad_args(format!("accessToken must be a byte array: {}", e)))
}
