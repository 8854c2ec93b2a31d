/// Backend API for the chat and feedback surfaces
///
/// - `client` - reqwest-based client for the four bearer-authenticated endpoints
/// - [`FeedbackBackend`] - the subset the review engine needs, so it can run against a fake
mod client;

pub use client::{ApiClient, ConversationReply, FeedbackSubmission};

use crate::error::ClientResult;
use crate::types::FeedbackRecord;
use async_trait::async_trait;

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
pub trait FeedbackBackend: Send + Sync {
    async fn fetch_feedback(&self, token: &str) -> ClientResult<Vec<FeedbackRecord>>;

    async fn review_feedback(&self, token: &str, feedback_id: &str, comments: &str)
    -> ClientResult<()>;
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl FeedbackBackend for ApiClient {
    async fn fetch_feedback(&self, token: &str) -> ClientResult<Vec<FeedbackRecord>> {
        ApiClient::fetch_feedback(self, token, None).await
    }

    async fn review_feedback(
        &self,
        token: &str,
        feedback_id: &str,
        comments: &str,
    ) -> ClientResult<()> {
        ApiClient::review_feedback(self, token, feedback_id, comments).await
    }
}
