//! The chat-transport boundary.
//!
//! This module defines the seam between the wizard and whatever messaging
//! platform delivers events: inbound events arrive tagged with a [`UserId`],
//! and replies leave through the [`ChatTransport`] trait.
//!
//! The trait is designed for async usage and supports dynamic dispatch
//! (`dyn ChatTransport`) so the dispatcher never knows which platform it is
//! talking to. Token handling, command registration, and button rendering
//! all live behind an implementation of this trait.

use std::fmt;

use async_trait::async_trait;
use thiserror::Error;

/// Opaque per-user identifier assigned by the chat platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UserId(pub u64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One entry of an option menu: the label shown to the user and the payload
/// echoed back when it is clicked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuOption {
    pub label: String,
    pub payload: String,
}

impl MenuOption {
    pub fn new(label: impl Into<String>, payload: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            payload: payload.into(),
        }
    }
}

/// Inbound events delivered by the platform adapter, one at a time.
#[derive(Debug, Clone, PartialEq)]
pub enum InboundEvent {
    /// A slash-style command. Recognized names are `start` and `help`;
    /// anything else is ignored.
    Command { user: UserId, name: String },

    /// A click on a previously sent menu option.
    ButtonClick { user: UserId, payload: String },

    /// A document upload, already downloaded to raw bytes by the adapter.
    FileUpload { user: UserId, bytes: Vec<u8> },

    /// Free-form text.
    Text { user: UserId, text: String },
}

impl InboundEvent {
    /// The user the event belongs to.
    pub fn user(&self) -> UserId {
        match *self {
            Self::Command { user, .. }
            | Self::ButtonClick { user, .. }
            | Self::FileUpload { user, .. }
            | Self::Text { user, .. } => user,
        }
    }
}

/// Errors surfaced by a transport implementation.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The platform refused or failed to deliver an outbound message.
    #[error("failed to deliver message: {message}")]
    Delivery { message: String },
}

/// Outbound primitives the wizard needs from a chat platform.
#[async_trait]
pub trait ChatTransport {
    /// Sends plain text to a user.
    async fn send_text(&self, user: UserId, text: &str) -> Result<(), TransportError>;

    /// Sends text with an ordered list of clickable options.
    async fn send_menu(
        &self,
        user: UserId,
        text: &str,
        options: &[MenuOption],
    ) -> Result<(), TransportError>;
}
