pub mod clicks;
pub mod forms;
pub mod quiz;
pub mod scroll;
pub mod time;

pub use clicks::{Element, TRACK_ATTRIBUTE};
pub use forms::{FieldInfo, FormSnapshot, FormSubmission, FormTracker};
pub use quiz::{QuizIds, QuizTracker};
pub use scroll::{ScrollMetrics, ScrollTracker, SCROLL_THRESHOLDS};
pub use time::{TimeOnPage, TIME_MILESTONES};
