use super::view::{FeedbackListView, LOAD_ERROR_MESSAGE, ReviewSection, apply_filters, render};
use crate::api::FeedbackBackend;
use crate::auth::{Session, reviewer_identity};
use crate::error::{ClientError, ClientResult};
use crate::types::{FeedbackRecord, ReviewFilter, TypeFilter};
use std::collections::HashSet;
use std::future::Future;
use std::sync::Arc;

/// State of the feedback list: the loaded collection, the role, the two filter selectors and
/// what is currently shown.
#[derive(Clone, Debug, PartialEq)]
pub struct FeedbackBoard {
    all_items: Vec<FeedbackRecord>,
    is_reviewer: bool,
    type_filter: TypeFilter,
    review_filter: ReviewFilter,
    view: FeedbackListView,
    /// Records with a review request in flight.
    submitting: HashSet<String>,
}

impl FeedbackBoard {
    pub fn new(is_reviewer: bool) -> Self {
        Self {
            all_items: Vec::new(),
            is_reviewer,
            type_filter: TypeFilter::All,
            review_filter: ReviewFilter::All,
            view: FeedbackListView::Loading,
            submitting: HashSet::new(),
        }
    }

    pub fn all_items(&self) -> &[FeedbackRecord] {
        &self.all_items
    }

    pub fn view(&self) -> &FeedbackListView {
        &self.view
    }

    pub fn is_reviewer(&self) -> bool {
        self.is_reviewer
    }

    pub fn type_filter(&self) -> TypeFilter {
        self.type_filter
    }

    pub fn review_filter(&self) -> ReviewFilter {
        self.review_filter
    }

    pub fn is_submitting(&self, feedback_id: &str) -> bool {
        self.submitting.contains(feedback_id)
    }

    /// Replace the collection wholesale on success. On failure the collection is kept but only
    /// the error placeholder is shown.
    pub fn apply_load(&mut self, result: ClientResult<Vec<FeedbackRecord>>) -> ClientResult<()> {
        match result {
            Ok(items) => {
                tracing::info!("loaded {} feedback items", items.len());
                self.all_items = items;
                self.filter();
                Ok(())
            }
            Err(err) => {
                if err.is_auth() {
                    tracing::warn!("feedback load requires login: {err}");
                } else {
                    tracing::error!("error fetching feedback data: {err}");
                }
                self.view = FeedbackListView::Error(LOAD_ERROR_MESSAGE);
                Err(err)
            }
        }
    }

    pub fn set_type_filter(&mut self, filter: TypeFilter) {
        self.type_filter = filter;
        self.filter();
    }

    pub fn set_review_filter(&mut self, filter: ReviewFilter) {
        self.review_filter = filter;
        self.filter();
    }

    /// Recompute the visible subset from the full collection.
    pub fn filter(&mut self) {
        let subset = apply_filters(&self.all_items, self.type_filter, self.review_filter);
        self.view = render(&subset, self.is_reviewer);
    }

    fn awaiting_review(&self, feedback_id: &str) -> bool {
        self.all_items
            .iter()
            .any(|item| item.id == feedback_id && !item.reviewed)
    }

    /// Apply a confirmed review to the collection and swap the visible row's review section in
    /// place. The visible list is not re-sorted or re-filtered.
    pub fn commit_review(&mut self, feedback_id: &str, comments: &str, reviewer_id: &str) -> bool {
        let Some(item) = self.all_items.iter_mut().find(|item| item.id == feedback_id) else {
            return false;
        };
        if !item.mark_reviewed(comments, reviewer_id) {
            return false;
        }

        let is_reviewer = self.is_reviewer;
        if let FeedbackListView::Rows(rows) = &mut self.view
            && let Some(row) = rows.iter_mut().find(|row| row.record.id == feedback_id)
        {
            row.record.mark_reviewed(comments, reviewer_id);
            row.review = ReviewSection::for_record(&row.record, is_reviewer);
        }
        true
    }
}

/// A review that passed local checks and is ready to be sent.
#[derive(Clone, Debug, PartialEq)]
pub struct PendingReview {
    token: String,
    pub feedback_id: String,
    pub comments: String,
    pub reviewer_id: String,
}

impl PendingReview {
    pub async fn send<B: FeedbackBackend + ?Sized>(&self, backend: &B) -> ClientResult<()> {
        backend
            .review_feedback(&self.token, &self.feedback_id, &self.comments)
            .await
    }
}

/// The feedback review surface: a backend, the viewer's session and the board state.
pub struct ReviewEngine<B> {
    backend: Arc<B>,
    session: Option<Session>,
    board: FeedbackBoard,
}

impl<B: FeedbackBackend> ReviewEngine<B> {
    /// The reviewer role is taken from the session once and fixed for the engine's lifetime.
    pub fn new(backend: B, session: Option<Session>) -> Self {
        let is_reviewer = session.as_ref().is_some_and(Session::is_reviewer);
        Self {
            backend: Arc::new(backend),
            session,
            board: FeedbackBoard::new(is_reviewer),
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Shared handle for sending a [`PendingReview`] without borrowing the engine.
    pub fn backend_handle(&self) -> Arc<B> {
        Arc::clone(&self.backend)
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn board(&self) -> &FeedbackBoard {
        &self.board
    }

    pub fn board_mut(&mut self) -> &mut FeedbackBoard {
        &mut self.board
    }

    pub fn token(&self) -> ClientResult<String> {
        self.session
            .as_ref()
            .map(|s| s.token.clone())
            .ok_or_else(ClientError::not_authenticated)
    }

    /// The fetch half of [`load`](Self::load). Owns everything it needs, so the engine can be
    /// released while the request is in flight; feed the result to
    /// [`FeedbackBoard::apply_load`].
    pub fn fetch(&self) -> impl Future<Output = ClientResult<Vec<FeedbackRecord>>> + use<B> {
        let backend = Arc::clone(&self.backend);
        let token = self.token();
        async move {
            let token = token?;
            backend.fetch_feedback(&token).await
        }
    }

    /// Fetch and replace the collection. `Auth` means the caller must redirect to login.
    pub async fn load(&mut self) -> ClientResult<()> {
        let result = self.fetch().await;
        self.board.apply_load(result)
    }

    pub fn filter(&mut self) {
        self.board.filter();
    }

    /// Local checks before anything is sent: a session, non-blank comments, and a record that
    /// is still awaiting review.
    ///
    /// The record stays marked as submitting until [`finish_review`](Self::finish_review), and a
    /// second attempt in the meantime is rejected.
    pub fn prepare_review(
        &mut self,
        feedback_id: &str,
        comments: &str,
    ) -> ClientResult<PendingReview> {
        let session = self
            .session
            .as_ref()
            .ok_or_else(ClientError::not_authenticated)?;
        if comments.trim().is_empty() {
            return Err(ClientError::Validation(
                "review comments are required".to_string(),
            ));
        }
        if !self.board.awaiting_review(feedback_id) {
            return Err(ClientError::Validation(format!(
                "feedback item {feedback_id} is not awaiting review"
            )));
        }
        if !self.board.submitting.insert(feedback_id.to_string()) {
            return Err(ClientError::Validation(format!(
                "review for {feedback_id} is already being submitted"
            )));
        }
        Ok(PendingReview {
            token: session.token.clone(),
            feedback_id: feedback_id.to_string(),
            comments: comments.to_string(),
            reviewer_id: reviewer_identity(session),
        })
    }

    /// Record the outcome of a sent review. Only a success touches the board.
    pub fn finish_review(
        &mut self,
        pending: &PendingReview,
        result: ClientResult<()>,
    ) -> ClientResult<()> {
        self.board.submitting.remove(&pending.feedback_id);
        match result {
            Ok(()) => {
                if !self.board.commit_review(
                    &pending.feedback_id,
                    &pending.comments,
                    &pending.reviewer_id,
                ) {
                    tracing::debug!(
                        "feedback {} was already reviewed; nothing to commit",
                        pending.feedback_id
                    );
                    return Ok(());
                }
                tracing::info!("feedback {} reviewed by {}", pending.feedback_id, pending.reviewer_id);
                Ok(())
            }
            Err(err) => {
                tracing::error!("error submitting review for {}: {err}", pending.feedback_id);
                Err(err)
            }
        }
    }

    pub async fn submit_review(&mut self, feedback_id: &str, comments: &str) -> ClientResult<()> {
        let pending = self.prepare_review(feedback_id, comments)?;
        let result = pending.send(self.backend.as_ref()).await;
        self.finish_review(&pending, result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::claims::tests::token_with;
    use crate::types::FeedbackType;
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Default)]
    struct FakeBackend {
        items: Vec<FeedbackRecord>,
        fail_fetch: bool,
        fail_review: bool,
        reviews: Mutex<Vec<(String, String, String)>>,
    }

    #[async_trait]
    impl FeedbackBackend for FakeBackend {
        async fn fetch_feedback(&self, _token: &str) -> ClientResult<Vec<FeedbackRecord>> {
            if self.fail_fetch {
                return Err(ClientError::Network("503".into()));
            }
            Ok(self.items.clone())
        }

        async fn review_feedback(
            &self,
            token: &str,
            feedback_id: &str,
            comments: &str,
        ) -> ClientResult<()> {
            if self.fail_review {
                return Err(ClientError::Network("500".into()));
            }
            self.reviews.lock().unwrap().push((
                token.to_string(),
                feedback_id.to_string(),
                comments.to_string(),
            ));
            Ok(())
        }
    }

    fn record(id: &str, kind: FeedbackType, reviewed: bool, day: u8) -> FeedbackRecord {
        FeedbackRecord {
            id: id.to_string(),
            conversation_id: "c".into(),
            feedback_type: kind,
            feedback_text: "text".into(),
            original_query: "q".into(),
            llm_response: "r".into(),
            user_id: "u@example.com".into(),
            timestamp: format!("2024-01-{day:02}T00:00:00"),
            reviewed,
            reviewer_comments: reviewed.then(|| "prior".to_string()),
            reviewer_id: reviewed.then(|| "prior@example.com".to_string()),
        }
    }

    fn fixture() -> Vec<FeedbackRecord> {
        vec![
            record("p1", FeedbackType::Positive, false, 1),
            record("p2", FeedbackType::Positive, false, 2),
            record("p3", FeedbackType::Positive, true, 3),
            record("n1", FeedbackType::Negative, false, 4),
            record("n2", FeedbackType::Negative, true, 5),
        ]
    }

    fn session(reviewer: bool) -> Session {
        Session::from_token(token_with(&format!(
            r#"{{"email":"rev@example.com","custom:is_reviewer":"{reviewer}"}}"#
        )))
        .unwrap()
    }

    fn engine(backend: FakeBackend, reviewer: bool) -> ReviewEngine<FakeBackend> {
        ReviewEngine::new(backend, Some(session(reviewer)))
    }

    #[tokio::test]
    async fn load_without_session_is_auth_error() {
        let mut engine = ReviewEngine::new(FakeBackend::default(), None);
        let err = engine.load().await.unwrap_err();
        assert!(err.is_auth());
        assert!(engine.board().all_items().is_empty());
    }

    #[tokio::test]
    async fn network_failure_shows_only_placeholder() {
        let mut engine = engine(
            FakeBackend {
                items: fixture(),
                fail_fetch: true,
                ..FakeBackend::default()
            },
            true,
        );
        let err = engine.load().await.unwrap_err();
        assert!(!err.is_auth());
        assert_eq!(
            engine.board().view(),
            &FeedbackListView::Error(LOAD_ERROR_MESSAGE)
        );
        assert!(engine.board().view().rows().is_empty());
    }

    #[tokio::test]
    async fn positive_unreviewed_subset() {
        let mut engine = engine(
            FakeBackend {
                items: fixture(),
                ..FakeBackend::default()
            },
            true,
        );
        engine.load().await.unwrap();
        engine.board_mut().set_type_filter(TypeFilter::Positive);
        engine.board_mut().set_review_filter(ReviewFilter::Unreviewed);

        let ids: Vec<_> = engine
            .board()
            .view()
            .rows()
            .iter()
            .map(|r| r.record.id.as_str())
            .collect();
        assert_eq!(ids, vec!["p2", "p1"]);
        assert_eq!(engine.board().all_items().len(), 5);
    }

    #[tokio::test]
    async fn filter_is_idempotent() {
        let mut engine = engine(
            FakeBackend {
                items: fixture(),
                ..FakeBackend::default()
            },
            true,
        );
        engine.load().await.unwrap();
        engine.board_mut().set_review_filter(ReviewFilter::Reviewed);
        let once = engine.board().view().clone();
        engine.filter();
        assert_eq!(engine.board().view(), &once);
    }

    #[tokio::test]
    async fn non_reviewer_never_gets_a_form() {
        let mut engine = engine(
            FakeBackend {
                items: fixture(),
                ..FakeBackend::default()
            },
            false,
        );
        engine.load().await.unwrap();
        for review in [ReviewFilter::All, ReviewFilter::Reviewed, ReviewFilter::Unreviewed] {
            engine.board_mut().set_review_filter(review);
            assert!(
                engine
                    .board()
                    .view()
                    .rows()
                    .iter()
                    .all(|row| row.review == ReviewSection::Hidden)
            );
        }
    }

    #[tokio::test]
    async fn successful_review_flips_exactly_one_record() {
        let mut engine = engine(
            FakeBackend {
                items: fixture(),
                ..FakeBackend::default()
            },
            true,
        );
        engine.load().await.unwrap();
        let before = engine.board().all_items().to_vec();

        engine.submit_review("n1", "needs work").await.unwrap();

        let after = engine.board().all_items();
        let changed: Vec<_> = before
            .iter()
            .zip(after)
            .filter(|(b, a)| b != a)
            .map(|(_, a)| a)
            .collect();
        assert_eq!(changed.len(), 1);
        assert_eq!(changed[0].id, "n1");
        assert!(changed[0].reviewed);
        assert_eq!(changed[0].reviewer_comments.as_deref(), Some("needs work"));
        assert_eq!(changed[0].reviewer_id.as_deref(), Some("rev@example.com"));

        let row = engine
            .board()
            .view()
            .rows()
            .iter()
            .find(|r| r.record.id == "n1")
            .unwrap();
        assert_eq!(
            row.review,
            ReviewSection::ReadOnly {
                comments: "needs work".into(),
                reviewer_id: "rev@example.com".into(),
            }
        );

        let sent = engine.backend().reviews.lock().unwrap().clone();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].1, "n1");
        assert_eq!(sent[0].2, "needs work");
    }

    #[tokio::test]
    async fn failed_review_changes_nothing() {
        let mut engine = engine(
            FakeBackend {
                items: fixture(),
                fail_review: true,
                ..FakeBackend::default()
            },
            true,
        );
        engine.load().await.unwrap();
        let items_before = engine.board().all_items().to_vec();
        let view_before = engine.board().view().clone();

        assert!(engine.submit_review("p1", "fine").await.is_err());
        assert_eq!(engine.board().all_items(), items_before.as_slice());
        assert_eq!(engine.board().view(), &view_before);
    }

    #[tokio::test]
    async fn blank_or_repeat_reviews_are_rejected_locally() {
        let mut engine = engine(
            FakeBackend {
                items: fixture(),
                ..FakeBackend::default()
            },
            true,
        );
        engine.load().await.unwrap();

        assert!(matches!(
            engine.submit_review("p1", "   ").await,
            Err(ClientError::Validation(_))
        ));
        assert!(matches!(
            engine.submit_review("p3", "again").await,
            Err(ClientError::Validation(_))
        ));
        assert!(matches!(
            engine.submit_review("missing", "x").await,
            Err(ClientError::Validation(_))
        ));
        assert!(engine.backend().reviews.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn second_review_while_in_flight_is_rejected() {
        let mut engine = engine(
            FakeBackend {
                items: fixture(),
                ..FakeBackend::default()
            },
            true,
        );
        engine.load().await.unwrap();

        let pending = engine.prepare_review("p1", "ok").unwrap();
        assert!(engine.board().is_submitting("p1"));
        assert!(matches!(
            engine.prepare_review("p1", "ok"),
            Err(ClientError::Validation(_))
        ));

        let result = pending.send(engine.backend()).await;
        engine.finish_review(&pending, result).unwrap();
        assert!(!engine.board().is_submitting("p1"));
        assert!(engine.board().all_items()[0].reviewed);
        assert_eq!(engine.backend().reviews.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn failed_review_can_be_retried() {
        let mut engine = engine(
            FakeBackend {
                items: fixture(),
                fail_review: true,
                ..FakeBackend::default()
            },
            true,
        );
        engine.load().await.unwrap();

        let pending = engine.prepare_review("p1", "ok").unwrap();
        let result = pending.send(engine.backend()).await;
        assert!(engine.finish_review(&pending, result).is_err());
        assert!(!engine.board().is_submitting("p1"));
        assert!(engine.prepare_review("p1", "ok").is_ok());
    }

    #[tokio::test]
    async fn duplicate_completion_is_a_no_op() {
        let mut engine = engine(
            FakeBackend {
                items: fixture(),
                ..FakeBackend::default()
            },
            true,
        );
        engine.load().await.unwrap();

        let pending = engine.prepare_review("p1", "first").unwrap();
        engine.finish_review(&pending, Ok(())).unwrap();
        let stale = PendingReview {
            comments: "second".to_string(),
            ..pending.clone()
        };
        engine.finish_review(&stale, Ok(())).unwrap();

        let item = &engine.board().all_items()[0];
        assert_eq!(item.reviewer_comments.as_deref(), Some("first"));
    }

    #[tokio::test]
    async fn reviewed_row_stays_visible_until_next_filter() {
        let mut engine = engine(
            FakeBackend {
                items: fixture(),
                ..FakeBackend::default()
            },
            true,
        );
        engine.load().await.unwrap();
        engine.board_mut().set_review_filter(ReviewFilter::Unreviewed);
        assert_eq!(engine.board().view().rows().len(), 3);

        engine.submit_review("p1", "ok").await.unwrap();
        assert_eq!(engine.board().view().rows().len(), 3);

        engine.filter();
        assert_eq!(engine.board().view().rows().len(), 2);
    }
}
