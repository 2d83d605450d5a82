//! The outside world, as the walk tracker sees it.
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Best-effort current temperature at a coordinate, in whole degrees Celsius.
#[allow(async_fn_in_trait)]
pub trait TemperatureService {
    async fn current_temp_c(&self, lat: f64, lon: f64) -> Option<i64>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageHandle {
    pub chat_id: i64,
    pub message_id: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Button {
    pub text: String,
    pub callback_data: String,
}

impl Button {
    pub fn new<S: Into<String>, C: Into<String>>(text: S, callback_data: C) -> Self {
        Self { text: text.into(), callback_data: callback_data.into() }
    }

    pub fn end_walk() -> Self {
        Self::new("🏁 End walk", "end_walk")
    }

    pub fn back() -> Self {
        Self::new("⬅️ Back", "back")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditOutcome {
    Edited,
    /// The message already had this content. Not an error.
    Unchanged,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Could not deliver message: {0}")]
pub struct MessagingError(pub String);

#[allow(async_fn_in_trait)]
pub trait MessagingSink {
    async fn send(&self, subject: i64, text: &str, buttons: &[Button]) -> Result<MessageHandle, MessagingError>;
    async fn edit(&self, handle: &MessageHandle, text: &str, buttons: &[Button]) -> EditOutcome;
}
