//! UI-agnostic chat state
//!
//! [`ChatController`] owns the active tab, the input buffer and the last
//! fetched message list. It never talks to the store itself: transitions
//! return a [`StoreRequest`], the caller runs it against a
//! [`MessageStore`] and hands the resulting [`StoreOutcome`] back through
//! [`ChatController::apply`]. The TUI runs requests as spawned tasks;
//! headless callers and tests use [`ChatController::drive`].

use tracing::{error, info, warn};

use crate::message::{Message, MessageText};
use crate::store::{MessageStore, StoreError};
use crate::tab::Tab;

/// Work the controller wants done against the store
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreRequest {
    Refresh,
    Append(MessageText),
}

/// Result of running a [`StoreRequest`]
#[derive(Debug)]
pub enum StoreOutcome {
    Listed(Result<Vec<Message>, StoreError>),
    Appended {
        text: MessageText,
        result: Result<(), StoreError>,
    },
}

impl StoreRequest {
    pub async fn run(self, store: &dyn MessageStore) -> StoreOutcome {
        match self {
            StoreRequest::Refresh => StoreOutcome::Listed(store.list_messages().await),
            StoreRequest::Append(text) => {
                let result = store.append_message(&text).await;
                StoreOutcome::Appended { text, result }
            }
        }
    }
}

#[derive(Debug, Default)]
pub struct ChatController {
    active_tab: Tab,
    input: String,
    messages: Vec<Message>,
}

impl ChatController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active_tab(&self) -> Tab {
        self.active_tab
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Switch tabs. Entering the AI tab asks for a refresh; the other tabs
    /// are static and never touch the store.
    pub fn select_tab(&mut self, tab: Tab) -> Option<StoreRequest> {
        self.active_tab = tab;
        match tab {
            Tab::Ai => Some(StoreRequest::Refresh),
            Tab::External | Tab::Community => None,
        }
    }

    pub fn on_input_change(&mut self, input: impl Into<String>) {
        self.input = input.into();
    }

    /// Submit the input buffer. Blank input is dropped without a request.
    pub fn send(&mut self) -> Option<StoreRequest> {
        MessageText::new(self.input.clone()).map(StoreRequest::Append)
    }

    pub fn refresh(&self) -> StoreRequest {
        StoreRequest::Refresh
    }

    /// Fold a finished request into the state. Outcomes are applied in the
    /// order they arrive, so the last list to land wins.
    pub fn apply(&mut self, outcome: StoreOutcome) -> Option<StoreRequest> {
        match outcome {
            StoreOutcome::Listed(Ok(messages)) => {
                self.messages = messages;
                None
            }
            StoreOutcome::Listed(Err(err)) => {
                warn!("failed to refresh messages: {err}");
                None
            }
            StoreOutcome::Appended { text, result: Ok(()) } => {
                info!(len = text.as_str().len(), "message sent");
                self.input.clear();
                // Always the AI list, whichever tab is showing
                Some(StoreRequest::Refresh)
            }
            StoreOutcome::Appended { result: Err(err), .. } => {
                error!("failed to send message: {err}");
                None
            }
        }
    }

    /// Run a request and any follow-ups to completion
    pub async fn drive(&mut self, store: &dyn MessageStore, request: Option<StoreRequest>) {
        let mut next = request;
        while let Some(request) = next {
            let outcome = request.run(store).await;
            next = self.apply(outcome);
        }
    }
}
