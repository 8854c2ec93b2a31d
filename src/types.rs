use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Assistant,
    System,
}

impl Sender {
    pub fn css_class(self) -> &'static str {
        match self {
            Sender::User => "user",
            Sender::Assistant => "assistant",
            Sender::System => "system",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Message {
    pub sender: Sender,
    pub text: String,
    /// Set for assistant replies; the feedback affordance binds to it.
    pub conversation_id: Option<String>,
}

impl Message {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            sender: Sender::User,
            text: text.into(),
            conversation_id: None,
        }
    }

    pub fn assistant(text: impl Into<String>, conversation_id: Option<String>) -> Self {
        Self {
            sender: Sender::Assistant,
            text: text.into(),
            conversation_id,
        }
    }

    pub fn system(text: impl Into<String>) -> Self {
        Self {
            sender: Sender::System,
            text: text.into(),
            conversation_id: None,
        }
    }
}

/// The most recent exchange. Overwritten on every successful turn.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ConversationTurn {
    pub conversation_id: String,
    pub query: String,
    pub response: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedbackType {
    Positive,
    Negative,
}

impl FeedbackType {
    pub fn as_str(self) -> &'static str {
        match self {
            FeedbackType::Positive => "positive",
            FeedbackType::Negative => "negative",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            FeedbackType::Positive => "Positive",
            FeedbackType::Negative => "Negative",
        }
    }
}

impl fmt::Display for FeedbackType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A feedback entry as returned by `GET /feedback-data`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FeedbackRecord {
    pub id: String,
    #[serde(default)]
    pub conversation_id: String,
    pub feedback_type: FeedbackType,
    #[serde(default)]
    pub feedback_text: String,
    #[serde(default)]
    pub original_query: String,
    #[serde(default)]
    pub llm_response: String,
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub timestamp: String,
    #[serde(default)]
    pub reviewed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reviewer_comments: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reviewer_id: Option<String>,
}

impl FeedbackRecord {
    /// Applies the one-way `Unreviewed -> Reviewed` transition.
    ///
    /// Returns `false` and leaves the record untouched if it was already reviewed.
    pub fn mark_reviewed(&mut self, comments: &str, reviewer_id: &str) -> bool {
        if self.reviewed {
            return false;
        }
        self.reviewed = true;
        self.reviewer_comments = Some(comments.to_string());
        self.reviewer_id = Some(reviewer_id.to_string());
        true
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TypeFilter {
    #[default]
    All,
    Positive,
    Negative,
}

impl TypeFilter {
    pub fn matches(self, record: &FeedbackRecord) -> bool {
        match self {
            TypeFilter::All => true,
            TypeFilter::Positive => record.feedback_type == FeedbackType::Positive,
            TypeFilter::Negative => record.feedback_type == FeedbackType::Negative,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TypeFilter::All => "all",
            TypeFilter::Positive => "positive",
            TypeFilter::Negative => "negative",
        }
    }

    /// Parses a `<select>` value; unknown values fall back to `All`.
    pub fn from_value(value: &str) -> Self {
        match value {
            "positive" => TypeFilter::Positive,
            "negative" => TypeFilter::Negative,
            _ => TypeFilter::All,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ReviewFilter {
    #[default]
    All,
    Reviewed,
    Unreviewed,
}

impl ReviewFilter {
    pub fn matches(self, record: &FeedbackRecord) -> bool {
        match self {
            ReviewFilter::All => true,
            ReviewFilter::Reviewed => record.reviewed,
            ReviewFilter::Unreviewed => !record.reviewed,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ReviewFilter::All => "all",
            ReviewFilter::Reviewed => "reviewed",
            ReviewFilter::Unreviewed => "unreviewed",
        }
    }

    pub fn from_value(value: &str) -> Self {
        match value {
            "reviewed" => ReviewFilter::Reviewed,
            "unreviewed" => ReviewFilter::Unreviewed,
            _ => ReviewFilter::All,
        }
    }
}
