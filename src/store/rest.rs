use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use tracing::debug;

use super::{MessageStore, StoreError};
use crate::message::{Message, MessageText, NewMessage};

pub const DEFAULT_TABLE: &str = "messages";

/// Client for a PostgREST endpoint (the REST interface Supabase exposes)
#[derive(Clone)]
pub struct RestStore {
    client: Client,
    base_url: String,
    api_key: String,
    table: String,
}

impl RestStore {
    pub fn new(base_url: &str, api_key: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            table: DEFAULT_TABLE.to_string(),
        }
    }

    pub fn with_table(mut self, table: &str) -> Self {
        self.table = table.to_string();
        self
    }

    pub fn table_url(&self) -> String {
        format!("{}/rest/v1/{}", self.base_url, self.table)
    }

    pub fn list_url(&self) -> String {
        format!("{}?select=*&order=created_at.asc", self.table_url())
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("apikey", &self.api_key)
            .header("Authorization", format!("Bearer {}", self.api_key))
    }

    /// Insert a row and return what the store wrote, including the
    /// assigned id and timestamp.
    pub async fn insert_message(&self, text: &MessageText) -> Result<Vec<Message>, StoreError> {
        let request = self
            .client
            .post(self.table_url())
            .header("Prefer", "return=representation")
            .json(&NewMessage { text: text.as_str() });

        let response = self.authorize(request).send().await?;
        let rows = decode_rows(response).await?;
        debug!(table = %self.table, inserted = rows.len(), "inserted message");
        Ok(rows)
    }
}

#[async_trait]
impl MessageStore for RestStore {
    async fn list_messages(&self) -> Result<Vec<Message>, StoreError> {
        let request = self.client.get(self.list_url());
        let response = self.authorize(request).send().await?;
        let rows = decode_rows(response).await?;
        debug!(table = %self.table, count = rows.len(), "listed messages");
        Ok(rows)
    }

    async fn append_message(&self, text: &MessageText) -> Result<(), StoreError> {
        self.insert_message(text).await.map(|_| ())
    }
}

async fn decode_rows(response: Response) -> Result<Vec<Message>, StoreError> {
    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
        return Err(StoreError::Rejected {
            status: status.as_u16(),
            body,
        });
    }

    parse_rows(&body)
}

fn parse_rows(body: &str) -> Result<Vec<Message>, StoreError> {
    Ok(serde_json::from_str(body)?)
}
