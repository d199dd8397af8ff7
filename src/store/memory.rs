//! In-process message store
//!
//! Behaves like the remote table: ids and timestamps are assigned on
//! insert and listing is ordered by `created_at`. Failures can be switched
//! on per operation, and rows can be removed behind the client's back to
//! simulate changes made by another writer.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use uuid::Uuid;

use super::{MessageStore, StoreError};
use crate::message::{Message, MessageId, MessageText};

#[derive(Clone, Default)]
pub struct MemoryStore {
    rows: Arc<Mutex<Vec<Message>>>,
    fail_list: Arc<AtomicBool>,
    fail_append: Arc<AtomicBool>,
    list_calls: Arc<AtomicUsize>,
    append_calls: Arc<AtomicUsize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every following `list_messages` call fail (or succeed again)
    pub fn set_fail_list(&self, fail: bool) {
        self.fail_list.store(fail, Ordering::SeqCst);
    }

    /// Make every following `append_message` call fail (or succeed again)
    pub fn set_fail_append(&self, fail: bool) {
        self.fail_append.store(fail, Ordering::SeqCst);
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub fn append_calls(&self) -> usize {
        self.append_calls.load(Ordering::SeqCst)
    }

    /// Total store calls of either kind
    pub fn calls(&self) -> usize {
        self.list_calls() + self.append_calls()
    }

    /// Delete a row as another client would. Returns whether it existed.
    pub fn remove(&self, id: &MessageId) -> bool {
        let mut rows = self.rows.lock();
        let before = rows.len();
        rows.retain(|m| &m.id != id);
        rows.len() != before
    }

    /// Insert a row with an explicit timestamp, bypassing the call counters
    pub fn insert_at(&self, text: &str, created_at: DateTime<Utc>) -> Message {
        let message = Message {
            id: MessageId::new(Uuid::new_v4().to_string()),
            text: text.to_string(),
            created_at,
        };
        self.rows.lock().push(message.clone());
        message
    }

    pub fn len(&self) -> usize {
        self.rows.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.lock().is_empty()
    }
}

#[async_trait]
impl MessageStore for MemoryStore {
    async fn list_messages(&self) -> Result<Vec<Message>, StoreError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_list.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("list disabled".to_string()));
        }

        let mut rows = self.rows.lock().clone();
        // Stable, so rows sharing a timestamp stay in insertion order
        rows.sort_by_key(|m| m.created_at);
        Ok(rows)
    }

    async fn append_message(&self, text: &MessageText) -> Result<(), StoreError> {
        self.append_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_append.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("append disabled".to_string()));
        }

        let mut rows = self.rows.lock();
        // Never stamp earlier than the newest row, even if the clock steps back
        let now = Utc::now();
        let created_at = rows
            .iter()
            .map(|m| m.created_at)
            .max()
            .map_or(now, |latest| latest.max(now));

        rows.push(Message {
            id: MessageId::new(Uuid::new_v4().to_string()),
            text: text.as_str().to_string(),
            created_at,
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use std::collections::HashSet;

    fn text(s: &str) -> MessageText {
        MessageText::new(s).unwrap()
    }

    #[tokio::test]
    async fn test_empty_store_lists_nothing() {
        let store = MemoryStore::new();
        assert!(store.list_messages().await.unwrap().is_empty());
        assert_eq!(store.list_calls(), 1);
    }

    #[tokio::test]
    async fn test_appends_list_in_created_order() {
        let store = MemoryStore::new();
        for s in ["one", "two", "three"] {
            store.append_message(&text(s)).await.unwrap();
        }

        let rows = store.list_messages().await.unwrap();
        let texts: Vec<&str> = rows.iter().map(|m| m.text.as_str()).collect();
        assert_eq!(texts, vec!["one", "two", "three"]);
        assert!(rows.windows(2).all(|w| w[0].created_at <= w[1].created_at));

        let ids: HashSet<_> = rows.iter().map(|m| m.id.clone()).collect();
        assert_eq!(ids.len(), 3);
    }

    #[tokio::test]
    async fn test_list_sorts_out_of_order_inserts() {
        let store = MemoryStore::new();
        let base = Utc.with_ymd_and_hms(2025, 5, 1, 12, 0, 0).unwrap();
        store.insert_at("late", base + Duration::seconds(10));
        store.insert_at("early", base);
        store.insert_at("middle", base + Duration::seconds(5));

        let rows = store.list_messages().await.unwrap();
        let texts: Vec<&str> = rows.iter().map(|m| m.text.as_str()).collect();
        assert_eq!(texts, vec!["early", "middle", "late"]);
    }

    #[tokio::test]
    async fn test_append_never_stamps_before_latest_row() {
        let store = MemoryStore::new();
        let future = Utc::now() + Duration::hours(1);
        store.insert_at("from the future", future);

        store.append_message(&text("now")).await.unwrap();
        let rows = store.list_messages().await.unwrap();
        assert_eq!(rows.last().unwrap().text, "now");
        assert!(rows.last().unwrap().created_at >= future);
    }

    #[tokio::test]
    async fn test_failure_injection() {
        let store = MemoryStore::new();
        store.set_fail_append(true);
        assert!(store.append_message(&text("x")).await.is_err());
        assert!(store.is_empty());

        store.set_fail_list(true);
        assert!(store.list_messages().await.is_err());
        assert_eq!(store.calls(), 2);
    }

    #[test]
    fn test_remove() {
        let store = MemoryStore::new();
        let msg = store.insert_at("bye", Utc::now());
        assert!(store.remove(&msg.id));
        assert!(!store.remove(&msg.id));
        assert_eq!(store.len(), 0);
    }
}
