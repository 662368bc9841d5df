use crate::{
    data::{IdForm, student::Student},
    error::{MissingStudentSnafu, RosterResult},
    maud_conveniences::{Notification, NotificationKind, modal, render_table, subtitle, title},
    routes::{STUDENTS_CHANGED, render_or_notify},
    state::RosterState,
    store::StudentStore,
};
use axum::{
    extract::{Query, State},
    response::{AppendHeaders, IntoResponse, Response},
};
use maud::{Markup, html};
use snafu::OptionExt;
use uuid::Uuid;

/// Rows come out in the order they go in; sorting is the caller's business.
pub fn render_student_table(students: &[&Student]) -> Markup {
    if students.is_empty() {
        return html! {
            div class="text-center py-12 text-gray-400" {
                p class="text-lg" {"No students registered yet."}
                p class="text-sm mt-2" {"Click \"Add Student\" to get started."}
            }
        };
    }

    let rows = students
        .iter()
        .map(|student| {
            [
                html! { span class="font-medium" {(student.name)} },
                html! {(student.birth_date_dmy())},
                html! {(student.course)},
                html! {(student.enrollment_number)},
                html! {
                    div class="flex gap-2 justify-end" {
                        button class="bg-slate-600 hover:bg-slate-800 py-1 px-3 rounded" hx-get="/internal/students/form" hx-vals={"{\"id\": \"" (student.id) "\"}" } hx-target="#modal" {
                            "Edit"
                        }
                        button class="bg-red-600 hover:bg-red-800 py-1 px-3 rounded" hx-get="/internal/students/confirm_delete" hx-vals={"{\"id\": \"" (student.id) "\"}" } hx-target="#modal" {
                            "Delete"
                        }
                    }
                },
            ]
        })
        .collect();

    render_table(
        ["Name", "Birth Date", "Course", "Enrollment Number", "Actions"],
        rows,
    )
}

/// Two-step delete: nothing is sent to the store until a pending target is confirmed.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum DeleteDialog {
    #[default]
    Idle,
    Pending {
        target: Uuid,
    },
}

impl DeleteDialog {
    pub const fn request(target: Uuid) -> Self {
        Self::Pending { target }
    }

    pub fn cancel(self) -> Self {
        if let Self::Pending { target } = self {
            debug!(%target, "Delete cancelled");
        }
        Self::Idle
    }

    /// Issues the single delete for the pending target. Whatever happens, the dialog ends up idle.
    pub async fn confirm(self, store: &dyn StudentStore) -> (Self, Option<Notification>) {
        let Self::Pending { target } = self else {
            return (Self::Idle, None);
        };

        let notification = match store.remove_from_database(target).await {
            Ok(()) => {
                info!(%target, "Deleted student");
                Notification::success("Student deleted successfully.")
            }
            Err(e) => {
                error!(?e, %target, "Unable to delete student");
                Notification::error(e.user_message())
            }
        };

        (Self::Idle, Some(notification))
    }

    pub fn render(&self, student: Option<&Student>) -> Markup {
        match self {
            Self::Idle => html! {},
            Self::Pending { target } => modal(html! {
                (title("Confirm deletion"))
                (subtitle("Are you sure you want to delete this student? This can't be undone."))
                @if let Some(student) = student {
                    p class="text-gray-200 font-semibold mb-4" {(student)}
                }
                div class="flex gap-3 justify-end" {
                    button type="button" hx-get="/internal/students/cancel_delete" hx-vals={"{\"id\": \"" (target) "\"}" } hx-target="#modal" class="bg-gray-600 hover:bg-gray-700 font-bold py-2 px-4 rounded" {
                        "Cancel"
                    }
                    button type="button" hx-delete="/students" hx-vals={"{\"id\": \"" (target) "\"}" } hx-target="#modal" hx-disabled-elt="this" class="bg-red-600 hover:bg-red-800 font-bold py-2 px-4 rounded" {
                        "Delete"
                    }
                }
            }),
        }
    }
}

async fn open_confirm_delete(state: &RosterState, id: Uuid) -> RosterResult<Markup> {
    let directory = state.directory().await;
    let student = directory.find(id).context(MissingStudentSnafu { id })?;

    Ok(DeleteDialog::request(id).render(Some(student)))
}

pub async fn internal_get_confirm_delete(
    State(state): State<RosterState>,
    Query(IdForm { id }): Query<IdForm>,
) -> Markup {
    render_or_notify(open_confirm_delete(&state, id).await)
}

pub async fn internal_cancel_delete(Query(IdForm { id }): Query<IdForm>) -> Markup {
    DeleteDialog::request(id).cancel().render(None)
}

pub async fn delete_student(
    State(state): State<RosterState>,
    Query(IdForm { id }): Query<IdForm>,
) -> Response {
    let (dialog, notification) = DeleteDialog::request(id)
        .confirm(state.store())
        .await;
    let deleted = matches!(
        notification,
        Some(Notification {
            kind: NotificationKind::Success,
            ..
        })
    );

    if !deleted {
        return html! {
            (dialog.render(None))
            @if let Some(notification) = notification {
                (notification)
            }
        }
        .into_response();
    }

    let reload_failure = state
        .reload_directory()
        .await
        .err()
        .map(|e| Notification::error(e.user_message()));

    (
        AppendHeaders([("HX-Trigger", STUDENTS_CHANGED)]),
        html! {
            (dialog.render(None))
            @if let Some(notification) = notification {
                (notification)
            }
            @if let Some(reload_failure) = reload_failure {
                (reload_failure)
            }
        },
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::test_helpers::{student, test_state};

    async fn body_of(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[test]
    fn empty_input_renders_empty_state() {
        let markup = render_student_table(&[]).into_string();
        assert!(markup.contains("No students registered yet."));
        assert!(!markup.contains("<table"));
    }

    #[test]
    fn rows_keep_the_given_order_and_format_dates() {
        let bea = student("Bea", "Law", "2");
        let ana = student("Ana", "CS", "1");
        let markup = render_student_table(&[&bea, &ana]).into_string();

        let bea_at = markup.find("Bea").unwrap();
        let ana_at = markup.find("Ana").unwrap();
        assert!(bea_at < ana_at);
        assert!(markup.contains("15/03/2004"));
        assert_eq!(markup.matches("<tr class=").count(), 2);
    }

    #[test]
    fn request_then_cancel_is_idle() {
        let target = Uuid::new_v4();
        let pending = DeleteDialog::request(target);
        assert_eq!(pending, DeleteDialog::Pending { target });
        assert_eq!(pending.cancel(), DeleteDialog::Idle);
        assert!(DeleteDialog::Idle.render(None).into_string().is_empty());
    }

    #[tokio::test]
    async fn a_cancelled_dialog_confirms_nothing() {
        let ana = student("Ana", "CS", "1");
        let (_state, store) = test_state(vec![ana.clone()]);

        let (dialog, notification) = DeleteDialog::request(ana.id)
            .cancel()
            .confirm(store.as_ref())
            .await;

        assert_eq!(dialog, DeleteDialog::Idle);
        assert!(notification.is_none());
        assert_eq!(store.writes(), 0);
    }

    #[tokio::test]
    async fn cancel_button_closes_the_dialog_without_deleting() {
        let ana = student("Ana", "CS", "1");
        let (state, store) = test_state(vec![ana.clone()]);
        state.reload_directory().await.unwrap();

        let dialog = internal_get_confirm_delete(State(state.clone()), Query(IdForm { id: ana.id }))
            .await
            .into_string();
        assert!(dialog.contains("hx-get=\"/internal/students/cancel_delete\""));

        let closed = internal_cancel_delete(Query(IdForm { id: ana.id })).await;

        assert!(closed.into_string().is_empty());
        assert_eq!(store.writes(), 0);
        assert_eq!(store.fetch_count(), 1);
        assert_eq!(state.directory().await.students().len(), 1);
    }

    #[tokio::test]
    async fn confirming_removes_exactly_one_and_refetches_once() {
        let ana = student("Ana", "CS", "1");
        let (state, store) = test_state(vec![ana.clone(), student("Bea", "Law", "2")]);
        state.reload_directory().await.unwrap();

        let response = delete_student(State(state.clone()), Query(IdForm { id: ana.id })).await;

        assert_eq!(response.headers()["HX-Trigger"], STUDENTS_CHANGED);
        let body = body_of(response).await;
        assert!(body.contains("Student deleted successfully."));

        assert_eq!(store.deletes.load(std::sync::atomic::Ordering::SeqCst), 1);
        assert_eq!(store.fetch_count(), 2);
        let remaining = state.directory().await.students().to_vec();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].name, "Bea");
    }

    #[tokio::test]
    async fn failed_delete_notifies_and_does_not_refetch() {
        let ana = student("Ana", "CS", "1");
        let (state, store) = test_state(vec![ana.clone()]);
        store.fail_next_call();

        let response = delete_student(State(state), Query(IdForm { id: ana.id })).await;

        assert!(response.headers().get("HX-Trigger").is_none());
        let body = body_of(response).await;
        assert!(body.contains(&sqlx::Error::PoolTimedOut.to_string()));
        assert!(!body.contains("hx-delete"));
        assert_eq!(store.fetch_count(), 0);
    }

    #[tokio::test]
    async fn confirm_dialog_names_the_student() {
        let ana = student("Ana", "CS", "2024001");
        let (state, _store) = test_state(vec![ana.clone()]);
        state.reload_directory().await.unwrap();

        let markup = internal_get_confirm_delete(State(state), Query(IdForm { id: ana.id }))
            .await
            .into_string();

        assert!(markup.contains("Ana (2024001)"));
        assert!(markup.contains("hx-delete=\"/students\""));
    }

    #[tokio::test]
    async fn deleting_a_removed_student_shows_a_toast() {
        let ana = student("Ana", "CS", "2024001");
        let (state, store) = test_state(vec![ana.clone()]);
        store.remove_from_database(ana.id).await.unwrap();
        state.reload_directory().await.unwrap();

        let markup = internal_get_confirm_delete(State(state), Query(IdForm { id: ana.id }))
            .await
            .into_string();

        assert!(markup.contains("hx-swap-oob=\"beforeend:#toasts\""));
        assert!(markup.contains("Unable to find student"));
        assert!(!markup.contains("hx-delete"));
    }
}
