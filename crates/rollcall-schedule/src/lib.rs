//! Posts the daily schedule: a header, one Event Message per workout with an
//! empty roster and a commit button, and a calendar footer.

pub mod card;
pub mod poster;

pub use poster::{PostedMessage, ScheduleError, SchedulePoster};
