use crate::config::Endpoints;
use crate::error::{ClientError, ClientResult};
use crate::types::{FeedbackRecord, FeedbackType};
use serde::{Deserialize, Serialize};

/// Reply from `POST /conversation`.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct ConversationReply {
    pub response: String,
    pub conversation_id: String,
}

/// Body of `POST /submit-feedback`.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FeedbackSubmission {
    pub conversation_id: String,
    pub feedback_type: FeedbackType,
    pub feedback_text: String,
    pub original_query: String,
    pub llm_response: String,
}

#[derive(Serialize)]
struct ConversationRequest<'a> {
    message: &'a str,
}

#[derive(Serialize)]
struct ReviewRequest<'a> {
    feedback_id: &'a str,
    reviewer_comments: &'a str,
}

#[derive(Deserialize)]
struct FeedbackDataResponse {
    #[serde(default)]
    feedback_items: Vec<FeedbackRecord>,
}

/// Bearer-authenticated client for the chat and feedback endpoints.
///
/// No retries and no client-side timeout. Any non-2xx status is a `Network` error.
#[derive(Clone)]
pub struct ApiClient {
    client: reqwest::Client,
    endpoints: Endpoints,
}

impl ApiClient {
    pub fn new(endpoints: Endpoints) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoints,
        }
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    pub async fn send_message(&self, message: &str, token: &str) -> ClientResult<ConversationReply> {
        let response = self
            .client
            .post(&self.endpoints.conversation)
            .bearer_auth(token)
            .json(&ConversationRequest { message })
            .send()
            .await?;
        let body = checked_body(response, "conversation").await?;
        Ok(serde_json::from_str(&body)?)
    }

    pub async fn submit_feedback(
        &self,
        submission: &FeedbackSubmission,
        token: &str,
    ) -> ClientResult<()> {
        let response = self
            .client
            .post(&self.endpoints.submit_feedback)
            .bearer_auth(token)
            .json(submission)
            .send()
            .await?;
        checked_body(response, "submit-feedback").await?;
        Ok(())
    }

    /// All visible feedback, optionally narrowed to one conversation.
    pub async fn fetch_feedback(
        &self,
        token: &str,
        conversation_id: Option<&str>,
    ) -> ClientResult<Vec<FeedbackRecord>> {
        let mut request = self.client.get(&self.endpoints.feedback_data).bearer_auth(token);
        if let Some(id) = conversation_id {
            request = request.query(&[("conversation_id", id)]);
        }
        let response = request.send().await?;
        let body = checked_body(response, "feedback-data").await?;
        let parsed: FeedbackDataResponse = serde_json::from_str(&body)?;
        Ok(parsed.feedback_items)
    }

    pub async fn review_feedback(
        &self,
        token: &str,
        feedback_id: &str,
        reviewer_comments: &str,
    ) -> ClientResult<()> {
        let response = self
            .client
            .post(&self.endpoints.review_feedback)
            .bearer_auth(token)
            .json(&ReviewRequest {
                feedback_id,
                reviewer_comments,
            })
            .send()
            .await?;
        checked_body(response, "review-feedback").await?;
        Ok(())
    }
}

async fn checked_body(response: reqwest::Response, what: &str) -> ClientResult<String> {
    let status = response.status();
    let body = response.text().await?;
    if status.is_success() {
        Ok(body)
    } else {
        Err(ClientError::Network(format!("{what} error {status}: {body}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn submission_wire_format() {
        let submission = FeedbackSubmission {
            conversation_id: "c-1".into(),
            feedback_type: FeedbackType::Negative,
            feedback_text: "wrong".into(),
            original_query: "2+2".into(),
            llm_response: "5".into(),
        };
        let json = serde_json::to_value(&submission).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "conversation_id": "c-1",
                "feedback_type": "negative",
                "feedback_text": "wrong",
                "original_query": "2+2",
                "llm_response": "5",
            })
        );
    }

    #[test]
    fn review_wire_format() {
        let json = serde_json::to_value(ReviewRequest {
            feedback_id: "f-9",
            reviewer_comments: "ok",
        })
        .unwrap();
        assert_eq!(
            json,
            serde_json::json!({"feedback_id": "f-9", "reviewer_comments": "ok"})
        );
    }

    #[test]
    fn conversation_reply_ignores_extra_fields() {
        let reply: ConversationReply = serde_json::from_str(
            r#"{"conversation_id":"c-2","response":"hi","user_id":"ann@example.com"}"#,
        )
        .unwrap();
        assert_eq!(reply.conversation_id, "c-2");
        assert_eq!(reply.response, "hi");
    }

    #[test]
    fn feedback_data_tolerates_missing_items() {
        let parsed: FeedbackDataResponse = serde_json::from_str("{}").unwrap();
        assert!(parsed.feedback_items.is_empty());
    }
}
