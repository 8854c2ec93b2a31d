//! Chat transcript state: append-only messages, the in-flight indicator, the latest turn and
//! the per-message feedback forms.

use crate::api::{ConversationReply, FeedbackSubmission};
use crate::error::ClientResult;
use crate::types::{ConversationTurn, FeedbackType, Message};
use std::time::Duration;

pub const GREETING: &str = "Hello! How can I help you today?";
pub const SEND_ERROR_MESSAGE: &str =
    "Sorry, there was an error processing your request. Please try again.";
pub const FEEDBACK_THANKS: &str = "Thank you for your feedback!";
/// The confirmation is removed after this delay whether or not the submission finished.
pub const FEEDBACK_DISMISS_DELAY: Duration = Duration::from_secs(3);

pub fn feedback_placeholder(kind: FeedbackType) -> &'static str {
    match kind {
        FeedbackType::Positive => "What was helpful about this response?",
        FeedbackType::Negative => "What was not helpful about this response?",
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub enum FeedbackForm {
    #[default]
    Closed,
    Open {
        kind: FeedbackType,
        text: String,
    },
    Thanks,
}

#[derive(Clone, Debug, PartialEq)]
pub struct TranscriptEntry {
    pub message: Message,
    /// Which thumb is highlighted. Stays set after the form is dismissed.
    pub active: Option<FeedbackType>,
    pub form: FeedbackForm,
    generation: u64,
}

impl TranscriptEntry {
    fn new(message: Message) -> Self {
        Self {
            message,
            active: None,
            form: FeedbackForm::Closed,
            generation: 0,
        }
    }

    pub fn accepts_feedback(&self) -> bool {
        self.message.conversation_id.is_some()
    }
}

/// Token for the auto-dismiss of one submitted form.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DismissTicket {
    index: usize,
    generation: u64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Transcript {
    entries: Vec<TranscriptEntry>,
    pending: bool,
    last_turn: Option<ConversationTurn>,
}

impl Default for Transcript {
    fn default() -> Self {
        Self::new()
    }
}

impl Transcript {
    /// Starts with the greeting, which carries no feedback affordance.
    pub fn new() -> Self {
        Self {
            entries: vec![TranscriptEntry::new(Message::assistant(GREETING, None))],
            pending: false,
            last_turn: None,
        }
    }

    pub fn entries(&self) -> &[TranscriptEntry] {
        &self.entries
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    pub fn last_turn(&self) -> Option<&ConversationTurn> {
        self.last_turn.as_ref()
    }

    /// Appends the trimmed user message and raises the in-flight indicator.
    ///
    /// Returns `None` (and changes nothing) for blank input or while a request is in flight.
    pub fn begin_send(&mut self, input: &str) -> Option<String> {
        let message = input.trim();
        if message.is_empty() || self.pending {
            return None;
        }
        self.entries.push(TranscriptEntry::new(Message::user(message)));
        self.pending = true;
        Some(message.to_string())
    }

    pub fn finish_send(&mut self, query: &str, result: ClientResult<ConversationReply>) {
        self.pending = false;
        match result {
            Ok(reply) => {
                self.entries.push(TranscriptEntry::new(Message::assistant(
                    reply.response.clone(),
                    Some(reply.conversation_id.clone()),
                )));
                self.last_turn = Some(ConversationTurn {
                    conversation_id: reply.conversation_id,
                    query: query.to_string(),
                    response: reply.response,
                });
            }
            Err(err) => {
                tracing::error!("error sending message: {err}");
                self.entries
                    .push(TranscriptEntry::new(Message::system(SEND_ERROR_MESSAGE)));
            }
        }
    }

    /// Opens (or replaces) the feedback form of an assistant reply and moves the highlight.
    pub fn select_feedback(&mut self, index: usize, kind: FeedbackType) {
        let Some(entry) = self.entries.get_mut(index) else {
            return;
        };
        if !entry.accepts_feedback() {
            return;
        }
        entry.active = Some(kind);
        entry.form = FeedbackForm::Open {
            kind,
            text: String::new(),
        };
        entry.generation += 1;
    }

    pub fn set_feedback_text(&mut self, index: usize, value: String) {
        if let Some(TranscriptEntry {
            form: FeedbackForm::Open { text, .. },
            ..
        }) = self.entries.get_mut(index)
        {
            *text = value;
        }
    }

    /// Turns the open form into the confirmation and returns what to send.
    ///
    /// Query and response come from the latest turn; the conversation id is the message's own.
    pub fn submit_feedback(&mut self, index: usize) -> Option<(FeedbackSubmission, DismissTicket)> {
        let last_turn = self.last_turn.clone().unwrap_or_default();
        let entry = self.entries.get_mut(index)?;
        let conversation_id = entry.message.conversation_id.clone()?;
        let FeedbackForm::Open { kind, text } = &entry.form else {
            return None;
        };
        let (kind, text) = (*kind, text.clone());
        entry.form = FeedbackForm::Thanks;

        let submission = FeedbackSubmission {
            conversation_id,
            feedback_type: kind,
            feedback_text: text,
            original_query: last_turn.query,
            llm_response: last_turn.response,
        };
        let ticket = DismissTicket {
            index,
            generation: entry.generation,
        };
        Some((submission, ticket))
    }

    /// Removes the confirmation, unless the form has been reopened since.
    pub fn dismiss_feedback(&mut self, ticket: DismissTicket) {
        if let Some(entry) = self.entries.get_mut(ticket.index)
            && entry.generation == ticket.generation
            && entry.form == FeedbackForm::Thanks
        {
            entry.form = FeedbackForm::Closed;
        }
    }
}
