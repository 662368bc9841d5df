use crate::{error::RosterResult, maud_conveniences::Notification};
use maud::{Markup, Render};

pub mod index;
pub mod student_form;
pub mod student_table;

/// Client-side event fired after a successful write; the listing re-requests itself on it.
pub const STUDENTS_CHANGED: &str = "students-changed";

/// htmx won't swap a 4xx/5xx body, so fragment routes answer failures with a toast instead.
pub fn render_or_notify(result: RosterResult<Markup>) -> Markup {
    match result {
        Ok(markup) => markup,
        Err(e) => {
            warn!(?e, "Unable to render fragment");
            Notification::error(e.user_message()).render()
        }
    }
}
