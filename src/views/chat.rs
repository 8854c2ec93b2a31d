use crate::api::{ApiClient, FeedbackSubmission};
use crate::transcript::{
    FEEDBACK_DISMISS_DELAY, FEEDBACK_THANKS, FeedbackForm, Transcript, TranscriptEntry,
    feedback_placeholder,
};
use crate::types::FeedbackType;
use crate::views::shared::{LoadingDots, sleep, use_services};
use dioxus::events::Key;
use dioxus::prelude::*;

#[component]
pub fn ChatView(on_auth_required: EventHandler<()>) -> Element {
    let services = use_services();
    let mut transcript = use_signal(Transcript::new);
    let mut input = use_signal(String::new);

    let send_services = services.clone();
    let send_message = use_callback(move |text: String| {
        let Some(token) = send_services.identity.token() else {
            on_auth_required.call(());
            return;
        };
        let Some(query) = transcript.write().begin_send(&text) else {
            return;
        };
        input.set(String::new());

        let api = send_services.api.clone();
        spawn(async move {
            let result = api.send_message(&query, &token).await;
            transcript.write().finish_send(&query, result);
        });
    });

    let submit_services = services.clone();
    let submit_feedback = use_callback(move |index: usize| {
        let Some(token) = submit_services.identity.token() else {
            on_auth_required.call(());
            return;
        };
        let submitted = transcript.write().submit_feedback(index);
        let Some((submission, ticket)) = submitted else {
            return;
        };

        let api = submit_services.api.clone();
        spawn(async move {
            send_feedback(api, submission, token).await;
        });
        spawn(async move {
            sleep(FEEDBACK_DISMISS_DELAY).await;
            transcript.write().dismiss_feedback(ticket);
        });
    });

    let snapshot = transcript();
    let pending = snapshot.is_pending();

    rsx! {
        div { class: "chat-container",
            div { id: "chat-messages", class: "chat-messages",
                for (i, entry) in snapshot.entries().iter().enumerate() {
                    MessageBubble {
                        key: "{i}",
                        entry: entry.clone(),
                        on_select: move |kind| transcript.write().select_feedback(i, kind),
                        on_text: move |value| transcript.write().set_feedback_text(i, value),
                        on_submit: move |_| submit_feedback.call(i),
                    }
                }
                if pending {
                    LoadingDots {}
                }
            }

            form {
                class: "chat-input",
                onsubmit: move |ev: FormEvent| {
                    ev.prevent_default();
                    send_message.call(input());
                },
                textarea {
                    id: "user-input", rows: "1", placeholder: "Type your message here...",
                    value: "{input}", oninput: move |ev| input.set(ev.value()),
                    onkeydown: move |ev| {
                        if ev.key() == Key::Enter && !ev.modifiers().shift() {
                            ev.prevent_default();
                            send_message.call(input());
                        }
                    },
                    autofocus: true,
                }
                button {
                    class: "btn btn-primary", r#type: "submit",
                    disabled: pending || input().trim().is_empty(),
                    "Send"
                }
            }
        }
    }
}

async fn send_feedback(api: ApiClient, submission: FeedbackSubmission, token: String) {
    // The confirmation is already showing; failures are only logged.
    if let Err(err) = api.submit_feedback(&submission, &token).await {
        tracing::error!("error submitting feedback: {err}");
    }
}

#[component]
fn MessageBubble(
    entry: TranscriptEntry,
    on_select: EventHandler<FeedbackType>,
    on_text: EventHandler<String>,
    on_submit: EventHandler<()>,
) -> Element {
    let class = entry.message.sender.css_class();
    let thumb_class = |kind: FeedbackType| {
        if entry.active == Some(kind) {
            "feedback-btn active"
        } else {
            "feedback-btn"
        }
    };

    rsx! {
        div { class: "message {class}",
            "{entry.message.text}"
            if entry.accepts_feedback() {
                div { class: "feedback-buttons",
                    button {
                        class: thumb_class(FeedbackType::Positive), r#type: "button",
                        title: "Helpful",
                        onclick: move |_| on_select.call(FeedbackType::Positive),
                        "👍"
                    }
                    button {
                        class: thumb_class(FeedbackType::Negative), r#type: "button",
                        title: "Not helpful",
                        onclick: move |_| on_select.call(FeedbackType::Negative),
                        "👎"
                    }
                }
                match &entry.form {
                    FeedbackForm::Closed => rsx! {},
                    FeedbackForm::Open { kind, text } => rsx! {
                        div { class: "feedback-form",
                            textarea {
                                placeholder: feedback_placeholder(*kind),
                                value: "{text}",
                                oninput: move |ev| on_text.call(ev.value()),
                            }
                            button {
                                class: "btn btn-primary", r#type: "button",
                                onclick: move |_| on_submit.call(()),
                                "Submit Feedback"
                            }
                        }
                    },
                    FeedbackForm::Thanks => rsx! {
                        div { class: "feedback-thanks", "{FEEDBACK_THANKS}" }
                    },
                }
            }
        }
    }
}
