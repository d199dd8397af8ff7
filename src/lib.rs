pub mod app;
pub mod config;
pub mod controller;
pub mod handler;
pub mod message;
pub mod store;
pub mod tab;
pub mod tui;
pub mod ui;

// Re-export main types for convenience
pub use config::{Config, StoreSettings};
pub use controller::{ChatController, StoreOutcome, StoreRequest};
pub use message::{Message, MessageId, MessageText};
pub use store::{MemoryStore, MessageStore, RestStore, StoreError};
pub use tab::Tab;
