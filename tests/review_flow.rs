//! Reviewer workflow against an in-memory backend: load, render, review, re-filter.

use async_trait::async_trait;
use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chatdesk::api::FeedbackBackend;
use chatdesk::auth::Session;
use chatdesk::error::{ClientError, ClientResult};
use chatdesk::feedback::{FeedbackListView, ReviewEngine, ReviewSection};
use chatdesk::types::{FeedbackRecord, FeedbackType, ReviewFilter};
use std::sync::Mutex;

fn token(payload: &str) -> String {
    format!(
        "{}.{}.sig",
        URL_SAFE_NO_PAD.encode(r#"{"alg":"RS256"}"#),
        URL_SAFE_NO_PAD.encode(payload)
    )
}

fn reviewer_session() -> Session {
    Session::from_token(token(
        r#"{"email":"rev@example.com","name":"Rita","custom:is_reviewer":"true"}"#,
    ))
    .unwrap()
}

fn record(id: &str, timestamp: &str) -> FeedbackRecord {
    FeedbackRecord {
        id: id.to_string(),
        conversation_id: format!("conv-{id}"),
        feedback_type: FeedbackType::Negative,
        feedback_text: "too vague".to_string(),
        original_query: "what is rust?".to_string(),
        llm_response: "a language".to_string(),
        user_id: "user@example.com".to_string(),
        timestamp: timestamp.to_string(),
        reviewed: false,
        reviewer_comments: None,
        reviewer_id: None,
    }
}

/// Stores records and applies reviews the way the backend does.
#[derive(Default)]
struct InMemoryBackend {
    records: Mutex<Vec<FeedbackRecord>>,
    reject_reviews: bool,
}

impl InMemoryBackend {
    fn with(records: Vec<FeedbackRecord>) -> Self {
        Self {
            records: Mutex::new(records),
            reject_reviews: false,
        }
    }
}

#[async_trait]
impl FeedbackBackend for InMemoryBackend {
    async fn fetch_feedback(&self, _token: &str) -> ClientResult<Vec<FeedbackRecord>> {
        Ok(self.records.lock().unwrap().clone())
    }

    async fn review_feedback(
        &self,
        _token: &str,
        feedback_id: &str,
        comments: &str,
    ) -> ClientResult<()> {
        if self.reject_reviews {
            return Err(ClientError::Network("HTTP 500".to_string()));
        }
        let mut records = self.records.lock().unwrap();
        let record = records
            .iter_mut()
            .find(|r| r.id == feedback_id)
            .ok_or_else(|| ClientError::Network("HTTP 404".to_string()))?;
        record.mark_reviewed(comments, "set-by-backend");
        Ok(())
    }
}

#[tokio::test]
async fn empty_collection_shows_placeholder() {
    let mut engine = ReviewEngine::new(InMemoryBackend::default(), Some(reviewer_session()));
    engine.load().await.unwrap();
    assert_eq!(engine.board().view(), &FeedbackListView::Empty);
}

#[tokio::test]
async fn reviewer_reviews_single_record() {
    let backend = InMemoryBackend::with(vec![record("fb-1", "2024-03-01T10:00:00Z")]);
    let mut engine = ReviewEngine::new(backend, Some(reviewer_session()));

    engine.load().await.unwrap();
    assert_eq!(engine.board().view().review_forms(), 1);

    engine.submit_review("fb-1", "looks good").await.unwrap();

    let item = &engine.board().all_items()[0];
    assert!(item.reviewed);
    assert_eq!(item.reviewer_comments.as_deref(), Some("looks good"));
    assert_eq!(item.reviewer_id.as_deref(), Some("rev@example.com"));
    assert_eq!(
        engine.board().view().rows()[0].review,
        ReviewSection::ReadOnly {
            comments: "looks good".to_string(),
            reviewer_id: "rev@example.com".to_string(),
        }
    );

    engine.board_mut().set_review_filter(ReviewFilter::Reviewed);
    let rows = engine.board().view().rows();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].record.id, "fb-1");

    // The backend saw the review too.
    assert!(engine.backend().records.lock().unwrap()[0].reviewed);
}

#[tokio::test]
async fn rejected_review_leaves_form_in_place() {
    let backend = InMemoryBackend {
        records: Mutex::new(vec![record("fb-1", "2024-03-01T10:00:00Z")]),
        reject_reviews: true,
    };
    let mut engine = ReviewEngine::new(backend, Some(reviewer_session()));
    engine.load().await.unwrap();

    let err = engine.submit_review("fb-1", "looks good").await.unwrap_err();
    assert!(matches!(err, ClientError::Network(_)));
    assert!(!engine.board().all_items()[0].reviewed);
    assert_eq!(engine.board().view().review_forms(), 1);
}

#[tokio::test]
async fn reload_reflects_backend_state() {
    let backend = InMemoryBackend::with(vec![
        record("old", "2024-01-01T00:00:00Z"),
        record("new", "2024-06-01T00:00:00Z"),
    ]);
    let mut engine = ReviewEngine::new(backend, Some(reviewer_session()));
    engine.load().await.unwrap();
    engine.submit_review("old", "fine").await.unwrap();

    engine.board_mut().set_review_filter(ReviewFilter::Unreviewed);
    engine.load().await.unwrap();

    let ids: Vec<_> = engine
        .board()
        .view()
        .rows()
        .iter()
        .map(|row| row.record.id.as_str())
        .collect();
    assert_eq!(ids, vec!["new"]);
}

#[tokio::test]
async fn viewer_without_session_must_log_in() {
    let backend = InMemoryBackend::with(vec![record("fb-1", "2024-03-01T10:00:00Z")]);
    let mut engine = ReviewEngine::new(backend, None);

    let err = engine.load().await.unwrap_err();
    assert!(err.is_auth());
    assert!(matches!(engine.board().view(), FeedbackListView::Error(_)));
}
