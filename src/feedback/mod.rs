/// Feedback review list
///
/// - `view` - pure filtering, ordering and row building
/// - `engine` - the board state plus load / filter / review against a [`FeedbackBackend`]
///
/// [`FeedbackBackend`]: crate::api::FeedbackBackend
pub mod engine;
pub mod view;

pub use engine::{FeedbackBoard, PendingReview, ReviewEngine};
pub use view::{
    EMPTY_MESSAGE, FeedbackListView, FeedbackRow, LOAD_ERROR_MESSAGE, ReviewSection,
    apply_filters, display_timestamp, parse_timestamp, render, sort_newest_first,
};
