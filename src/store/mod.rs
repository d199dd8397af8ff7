//! Access to the remote `messages` table
//!
//! [`MessageStore`] is the seam the controller talks through. The
//! production implementation is [`RestStore`]; [`MemoryStore`] keeps rows
//! in process for tests and for running without a backend.

pub mod memory;
pub mod rest;

use async_trait::async_trait;
use thiserror::Error;

use crate::message::{Message, MessageText};

pub use memory::MemoryStore;
pub use rest::RestStore;

/// Any failure talking to the store.
///
/// Callers treat every variant alike; the variants only exist so the
/// diagnostic log says what went wrong.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("store rejected request ({status}): {body}")]
    Rejected { status: u16, body: String },
    #[error("malformed response: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

#[async_trait]
pub trait MessageStore: Send + Sync {
    /// Every stored message, oldest first. An empty table is `Ok(vec![])`.
    async fn list_messages(&self) -> Result<Vec<Message>, StoreError>;

    /// Insert one message. The store assigns its id and timestamp.
    async fn append_message(&self, text: &MessageText) -> Result<(), StoreError>;
}
