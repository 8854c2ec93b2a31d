//! Pure filter / sort / row-building for the feedback list.
//!
//! Nothing in here touches the UI; `views::feedback` materializes a [`FeedbackListView`].

use crate::types::{FeedbackRecord, ReviewFilter, TypeFilter};
use std::cmp::Reverse;
use time::format_description::FormatItem;
use time::format_description::well_known::{Iso8601, Rfc3339};
use time::macros::format_description;
use time::{OffsetDateTime, PrimitiveDateTime, UtcOffset};

pub const EMPTY_MESSAGE: &str = "No feedback items found.";
pub const LOAD_ERROR_MESSAGE: &str = "Error loading feedback data. Please try again later.";

const DISPLAY_FORMAT: &[FormatItem<'static>] = format_description!(
    "[month]/[day]/[year], [hour repr:12 padding:none]:[minute]:[second] [period case:upper]"
);

/// What the review area of a row looks like.
#[derive(Clone, Debug, PartialEq)]
pub enum ReviewSection {
    /// Viewer is not a reviewer.
    Hidden,
    ReadOnly { comments: String, reviewer_id: String },
    Form,
}

impl ReviewSection {
    pub fn for_record(record: &FeedbackRecord, is_reviewer: bool) -> Self {
        if !is_reviewer {
            return ReviewSection::Hidden;
        }
        if record.reviewed {
            ReviewSection::ReadOnly {
                comments: record.reviewer_comments.clone().unwrap_or_default(),
                reviewer_id: record.reviewer_id.clone().unwrap_or_default(),
            }
        } else {
            ReviewSection::Form
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct FeedbackRow {
    pub record: FeedbackRecord,
    pub review: ReviewSection,
}

impl FeedbackRow {
    /// The user's comment, absent for thumbs-only feedback.
    pub fn feedback_text(&self) -> Option<&str> {
        let text = self.record.feedback_text.trim();
        (!text.is_empty()).then_some(text)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum FeedbackListView {
    Loading,
    /// Inline error placeholder. Never shown together with rows.
    Error(&'static str),
    Empty,
    Rows(Vec<FeedbackRow>),
}

impl FeedbackListView {
    pub fn rows(&self) -> &[FeedbackRow] {
        match self {
            FeedbackListView::Rows(rows) => rows,
            _ => &[],
        }
    }

    pub fn review_forms(&self) -> usize {
        self.rows()
            .iter()
            .filter(|row| row.review == ReviewSection::Form)
            .count()
    }
}

/// Type predicate, then review predicate. Input order is preserved.
pub fn apply_filters(
    items: &[FeedbackRecord],
    type_filter: TypeFilter,
    review_filter: ReviewFilter,
) -> Vec<FeedbackRecord> {
    items
        .iter()
        .filter(|item| type_filter.matches(item))
        .filter(|item| review_filter.matches(item))
        .cloned()
        .collect()
}

/// Accepts RFC 3339 and ISO 8601; values without an offset are taken as UTC.
pub fn parse_timestamp(raw: &str) -> Option<OffsetDateTime> {
    let raw = raw.trim();
    if let Ok(ts) = OffsetDateTime::parse(raw, &Rfc3339) {
        return Some(ts);
    }
    if let Ok(ts) = OffsetDateTime::parse(raw, &Iso8601::DEFAULT) {
        return Some(ts);
    }
    PrimitiveDateTime::parse(raw, &Iso8601::DEFAULT)
        .ok()
        .map(PrimitiveDateTime::assume_utc)
}

/// Newest first. Stable: equal timestamps keep collection order, and records whose timestamp
/// cannot be parsed go last in collection order.
pub fn sort_newest_first(items: &mut [FeedbackRecord]) {
    // `None` orders below every timestamp, so it lands last once reversed.
    items.sort_by_cached_key(|item| Reverse(parse_timestamp(&item.timestamp)));
}

/// Build the list for `items`: empty placeholder, or sorted rows with their review sections.
pub fn render(items: &[FeedbackRecord], is_reviewer: bool) -> FeedbackListView {
    if items.is_empty() {
        return FeedbackListView::Empty;
    }
    let mut sorted = items.to_vec();
    sort_newest_first(&mut sorted);
    FeedbackListView::Rows(
        sorted
            .into_iter()
            .map(|record| FeedbackRow {
                review: ReviewSection::for_record(&record, is_reviewer),
                record,
            })
            .collect(),
    )
}

/// Local-time rendering of a record timestamp; unparseable values are shown as-is.
pub fn display_timestamp(raw: &str) -> String {
    let Some(mut ts) = parse_timestamp(raw) else {
        return raw.to_string();
    };
    if let Ok(offset) = UtcOffset::current_local_offset() {
        ts = ts.to_offset(offset);
    }
    ts.format(DISPLAY_FORMAT).unwrap_or_else(|_| raw.to_string())
}
