//! Response bodies shared by several endpoints.

use serde::{Deserialize, Serialize};

/// A response body carrying a human readable message, e.g. a confirmation
/// that a resource was deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// The message for the client.
    pub message: String,
}

impl Message {
    /// Create a message body.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
