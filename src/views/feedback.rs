use crate::feedback::{
    EMPTY_MESSAGE, FeedbackListView, FeedbackRow, ReviewEngine, ReviewSection, display_timestamp,
};
use crate::types::{ReviewFilter, TypeFilter};
use crate::views::shared::{alert, use_services};
use dioxus::prelude::*;

const REVIEW_ERROR: &str = "Error submitting review. Please try again.";

#[component]
pub fn FeedbackView(on_auth_required: EventHandler<()>) -> Element {
    let services = use_services();
    let mut engine = use_signal(|| {
        ReviewEngine::new(services.api.clone(), services.identity.current_session())
    });

    use_hook(move || {
        spawn(async move {
            let request = engine.read().fetch();
            let result = request.await;
            let outcome = engine.write().board_mut().apply_load(result);
            if let Err(err) = outcome
                && err.is_auth()
            {
                on_auth_required.call(());
            }
        });
    });

    let submit_review = use_callback(move |(feedback_id, comments): (String, String)| {
        let prepared = engine.write().prepare_review(&feedback_id, &comments);
        let pending = match prepared {
            Ok(pending) => pending,
            Err(err) if err.is_auth() => {
                on_auth_required.call(());
                return;
            }
            Err(err) => {
                tracing::warn!("review not sent: {err}");
                return;
            }
        };
        let backend = engine.read().backend_handle();
        spawn(async move {
            let result = pending.send(backend.as_ref()).await;
            if engine.write().finish_review(&pending, result).is_err() {
                alert(REVIEW_ERROR);
            }
        });
    });

    let (view, type_filter, review_filter, submitting) = {
        let guard = engine.read();
        let board = guard.board();
        let submitting: Vec<String> = board
            .view()
            .rows()
            .iter()
            .filter(|row| board.is_submitting(&row.record.id))
            .map(|row| row.record.id.clone())
            .collect();
        (board.view().clone(), board.type_filter(), board.review_filter(), submitting)
    };

    rsx! {
        div { class: "feedback-container",
            div { class: "filters",
                label { r#for: "feedback-type-filter", "Type" }
                select {
                    id: "feedback-type-filter",
                    value: type_filter.as_str(),
                    onchange: move |ev| {
                        engine.write().board_mut().set_type_filter(TypeFilter::from_value(&ev.value()));
                    },
                    option { value: "all", "All" }
                    option { value: "positive", "Positive" }
                    option { value: "negative", "Negative" }
                }
                label { r#for: "review-status-filter", "Status" }
                select {
                    id: "review-status-filter",
                    value: review_filter.as_str(),
                    onchange: move |ev| {
                        engine.write().board_mut().set_review_filter(ReviewFilter::from_value(&ev.value()));
                    },
                    option { value: "all", "All" }
                    option { value: "reviewed", "Reviewed" }
                    option { value: "unreviewed", "Not Reviewed" }
                }
            }
            div { id: "feedback-list", class: "feedback-list",
                match view {
                    FeedbackListView::Loading => rsx! {
                        div { class: "no-feedback", "Loading feedback..." }
                    },
                    FeedbackListView::Error(message) => rsx! {
                        div { class: "no-feedback", "{message}" }
                    },
                    FeedbackListView::Empty => rsx! {
                        div { class: "no-feedback", "{EMPTY_MESSAGE}" }
                    },
                    FeedbackListView::Rows(rows) => rsx! {
                        for row in rows {
                            FeedbackItem {
                                key: "{row.record.id}",
                                submitting: submitting.contains(&row.record.id),
                                row,
                                on_review: move |review| submit_review.call(review),
                            }
                        }
                    },
                }
            }
        }
    }
}

#[component]
fn FeedbackItem(
    row: FeedbackRow,
    submitting: bool,
    on_review: EventHandler<(String, String)>,
) -> Element {
    let record = &row.record;
    let kind = record.feedback_type;
    let when = display_timestamp(&record.timestamp);

    rsx! {
        div { class: "feedback-item {kind}",
            div { class: "feedback-header",
                span { class: "feedback-type {kind}", "{kind.label()}" }
                span { class: "feedback-date", "{when}" }
            }
            div { class: "feedback-user", "User: {record.user_id}" }
            div { class: "feedback-content",
                p { strong { "Query: " } "{record.original_query}" }
                p { strong { "Response: " } "{record.llm_response}" }
                if let Some(text) = row.feedback_text() {
                    p { strong { "Feedback: " } "{text}" }
                }
            }
            match &row.review {
                ReviewSection::Hidden => rsx! {},
                ReviewSection::ReadOnly { comments, reviewer_id } => rsx! {
                    div { class: "review-section reviewed",
                        p { strong { "Reviewer Comments: " } "{comments}" }
                        p { strong { "Reviewed by: " } "{reviewer_id}" }
                    }
                },
                ReviewSection::Form => rsx! {
                    ReviewForm { feedback_id: record.id.clone(), submitting, on_review }
                },
            }
        }
    }
}

#[component]
fn ReviewForm(
    feedback_id: String,
    submitting: bool,
    on_review: EventHandler<(String, String)>,
) -> Element {
    let mut comments = use_signal(String::new);

    rsx! {
        form {
            class: "review-section review-form",
            onsubmit: move |ev: FormEvent| {
                ev.prevent_default();
                if !submitting {
                    on_review.call((feedback_id.clone(), comments()));
                }
            },
            textarea {
                placeholder: "Add review comments...",
                required: true,
                value: "{comments}",
                oninput: move |ev| comments.set(ev.value()),
            }
            button {
                class: "btn btn-primary", r#type: "submit", disabled: submitting,
                if submitting { "Submitting..." } else { "Submit Review" }
            }
        }
    }
}
