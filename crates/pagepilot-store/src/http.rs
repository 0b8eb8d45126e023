//! HTTP store backend.
//!
//! Worker subprocesses do not share memory with the server, so they reach
//! the server-hosted [`MemoryStore`](crate::MemoryStore) through the
//! `/internal/store` surface. Atomicity still holds: every call here is one
//! request, and the server applies it under the store mutex.

use async_trait::async_trait;
use tracing::trace;

use pagepilot_protocols::{
    ActionResult, Instruction, SessionState, StateUpdate, StoreEntryResponse,
    TakeInstructionResponse, TakeResultResponse, Transition,
};

use crate::error::StoreError;
use crate::store::SessionStore;

/// Client-side store backend speaking to a PagePilot server.
#[derive(Clone)]
pub struct HttpStore {
    client: reqwest::Client,
    base_url: String,
}

impl HttpStore {
    /// `base_url` is the server root, e.g. `http://127.0.0.1:8090`.
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        HttpStore {
            client: reqwest::Client::new(),
            base_url,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn entry_url(&self, id: &str) -> String {
        format!("{}/internal/store/{}", self.base_url, id)
    }

    async fn require_success(
        response: reqwest::Response,
    ) -> Result<reqwest::Response, StoreError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(StoreError::Status {
            status: status.as_u16(),
            body,
        })
    }

    async fn entry(&self, id: &str) -> Result<StoreEntryResponse, StoreError> {
        let response = self.client.get(self.entry_url(id)).send().await?;
        Self::require_success(response)
            .await?
            .json()
            .await
            .map_err(|e| StoreError::InvalidReply(e.to_string()))
    }
}

#[async_trait]
impl SessionStore for HttpStore {
    async fn create(&self, id: &str) -> Result<(), StoreError> {
        let response = self.client.put(self.entry_url(id)).send().await?;
        Self::require_success(response).await?;
        Ok(())
    }

    async fn read_state(&self, id: &str) -> Result<Option<SessionState>, StoreError> {
        Ok(self.entry(id).await?.state)
    }

    async fn transition(&self, id: &str, update: StateUpdate) -> Result<Transition, StoreError> {
        trace!(session = id, next = %update.next, "store transition");
        let url = format!("{}/transition", self.entry_url(id));
        let response = self.client.post(url).json(&update).send().await?;
        Self::require_success(response)
            .await?
            .json()
            .await
            .map_err(|e| StoreError::InvalidReply(e.to_string()))
    }

    async fn take_instruction(&self, id: &str) -> Result<Option<Instruction>, StoreError> {
        let url = format!("{}/instruction/take", self.entry_url(id));
        let response = self.client.post(url).send().await?;
        let body: TakeInstructionResponse = Self::require_success(response)
            .await?
            .json()
            .await
            .map_err(|e| StoreError::InvalidReply(e.to_string()))?;
        Ok(body.instruction)
    }

    async fn take_response(&self, id: &str) -> Result<Option<ActionResult>, StoreError> {
        let url = format!("{}/response/take", self.entry_url(id));
        let response = self.client.post(url).send().await?;
        let body: TakeResultResponse = Self::require_success(response)
            .await?
            .json()
            .await
            .map_err(|e| StoreError::InvalidReply(e.to_string()))?;
        Ok(body.response)
    }

    async fn exists(&self, id: &str) -> Result<bool, StoreError> {
        Ok(self.entry(id).await?.exists)
    }

    async fn remove(&self, id: &str) -> Result<(), StoreError> {
        let response = self.client.delete(self.entry_url(id)).send().await?;
        Self::require_success(response).await?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "http_tests.rs"]
mod tests;
