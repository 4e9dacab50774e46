//! Hub channel port: submit one command and await its response.

use std::future::Future;

use neohub_domain::command::Command;
use neohub_domain::error::HubError;
use serde_json::Value;

/// Request/response access to a connected hub.
///
/// Implementations enforce single-flight semantics: a command issued while
/// another awaits its response fails with
/// [`ProtocolError::CommandInProgress`](neohub_domain::error::ProtocolError::CommandInProgress).
pub trait HubChannel {
    /// Send `command` and return the decoded JSON response.
    fn send_command(&self, command: Command)
    -> impl Future<Output = Result<Value, HubError>> + Send;
}

impl<T: HubChannel + Send + Sync> HubChannel for std::sync::Arc<T> {
    fn send_command(
        &self,
        command: Command,
    ) -> impl Future<Output = Result<Value, HubError>> + Send {
        (**self).send_command(command)
    }
}
