use crate::{
    data::{
        OptionalIdForm,
        student::{Field, FieldErrors, Student, StudentFields},
    },
    error::{MissingStudentSnafu, RosterError, RosterResult},
    maud_conveniences::{INPUT_CLASS, Notification, form_element, modal, subtitle, title},
    routes::{STUDENTS_CHANGED, render_or_notify},
    state::RosterState,
    store::StudentStore,
};
use axum::{
    Form,
    extract::{Query, State},
    response::{AppendHeaders, IntoResponse, Response},
};
use maud::{Markup, Render, html};
use snafu::OptionExt;
use uuid::Uuid;

pub const DUPLICATE_ENROLLMENT_MESSAGE: &str =
    "Enrollment number already exists. Please use a unique enrollment number.";

/// What the add/edit dialog is doing. Only the page opens and closes it. While open it holds
/// the values on screen, so a refused submission comes back exactly as it was typed.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum Modal {
    #[default]
    Closed,
    Open {
        fields: StudentFields,
        errors: FieldErrors,
    },
}

impl Modal {
    pub fn open(editing: Option<&Student>) -> Self {
        Self::Open {
            fields: editing.map(StudentFields::from).unwrap_or_default(),
            errors: FieldErrors::default(),
        }
    }

    pub fn submitted(fields: StudentFields) -> Self {
        Self::Open {
            fields,
            errors: FieldErrors::default(),
        }
    }

    #[cfg(test)]
    pub const fn is_open(&self) -> bool {
        matches!(self, Self::Open { .. })
    }

    /// After a submission the dialog closes only if the write went through.
    pub fn after(self, outcome: &SubmitOutcome) -> Self {
        match (self, outcome) {
            (Self::Closed, _) | (_, SubmitOutcome::Saved(_)) => Self::Closed,
            (Self::Open { fields, .. }, SubmitOutcome::Invalid(errors)) => Self::Open {
                fields,
                errors: errors.clone(),
            },
            (Self::Open { fields, .. }, SubmitOutcome::Rejected(_)) => Self::submitted(fields),
        }
    }
}

impl Render for Modal {
    fn render(&self) -> Markup {
        match self {
            Self::Closed => html! {},
            Self::Open { fields, errors } => render_student_form(fields, errors),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Blocked before reaching the store.
    Invalid(FieldErrors),
    Saved(Notification),
    /// The store refused: either a duplicate enrollment number or some other failure.
    Rejected(Notification),
}

/// Validates, then issues exactly one write: an update when `fields.id` is set, an insert otherwise.
pub async fn submit_student(store: &dyn StudentStore, fields: &StudentFields) -> SubmitOutcome {
    let student = match fields.validate() {
        Ok(student) => student,
        Err(errors) => return SubmitOutcome::Invalid(errors),
    };

    let result = match fields.id {
        Some(id) => store
            .update_in_database(id, student)
            .await
            .map(|()| (id, "Student updated successfully.")),
        None => store
            .insert_into_database(student)
            .await
            .map(|id| (id, "Student registered successfully.")),
    };

    match result {
        Ok((id, description)) => {
            info!(%id, "Saved student");
            SubmitOutcome::Saved(Notification::success(description))
        }
        Err(e) if e.is_conflict() => {
            warn!(?e, "Rejected duplicate enrollment number");
            SubmitOutcome::Rejected(Notification::error(DUPLICATE_ENROLLMENT_MESSAGE))
        }
        Err(e) => {
            error!(?e, "Unable to save student");
            SubmitOutcome::Rejected(Notification::error(e.user_message()))
        }
    }
}

pub fn render_student_form(fields: &StudentFields, errors: &FieldErrors) -> Markup {
    let editing = fields.id.is_some();

    let form_body = html! {
        @if let Some(id) = fields.id {
            input type="hidden" name="id" value=(id);
        }

        (form_element(Field::Name.input_name(), Field::Name.label(), errors.get(Field::Name), html! {
            input type="text" id="name" name="name" placeholder="Jane Doe" value=(fields.name) class=(INPUT_CLASS);
        }))
        (form_element(Field::BirthDate.input_name(), Field::BirthDate.label(), errors.get(Field::BirthDate), html! {
            input type="date" id="birth_date" name="birth_date" value=(fields.birth_date) class=(INPUT_CLASS);
        }))
        (form_element(Field::Course.input_name(), Field::Course.label(), errors.get(Field::Course), html! {
            input type="text" id="course" name="course" placeholder="Software Engineering" value=(fields.course) class=(INPUT_CLASS);
        }))
        (form_element(Field::EnrollmentNumber.input_name(), Field::EnrollmentNumber.label(), errors.get(Field::EnrollmentNumber), html! {
            @if editing {
                // disabled inputs aren't submitted, so the value rides along in a hidden one
                input type="text" id="enrollment_number" value=(fields.enrollment_number) disabled class=(INPUT_CLASS);
                input type="hidden" name="enrollment_number" value=(fields.enrollment_number);
            } @else {
                input type="text" id="enrollment_number" name="enrollment_number" placeholder="2024001" value=(fields.enrollment_number) class=(INPUT_CLASS);
            }
        }))

        div class="flex gap-3 justify-end" {
            button type="button" hx-get="/internal/modal/close" hx-target="#modal" class="bg-gray-600 hover:bg-gray-700 font-bold py-2 px-4 rounded" {
                "Cancel"
            }
            button type="submit" class="bg-blue-500 hover:bg-blue-700 font-bold py-2 px-4 rounded focus:outline-none focus:shadow-outline" {
                @if editing { "Update" } @else { "Register" }
            }
        }
    };

    modal(html! {
        @if editing {
            (title("Edit Student"))
            (subtitle("Update the student's details below."))
            form hx-post="/students" hx-target="#modal" class="space-y-2" {
                (form_body)
            }
        } @else {
            (title("Add New Student"))
            (subtitle("Fill in the new student's details."))
            form hx-put="/students" hx-target="#modal" class="space-y-2" {
                (form_body)
            }
        }
    })
}

async fn open_student_form(state: &RosterState, id: Option<Uuid>) -> RosterResult<Markup> {
    let directory = state.directory().await;
    let editing = id
        .map(|id| directory.find(id).context(MissingStudentSnafu { id }))
        .transpose()?;

    Ok(Modal::open(editing).render())
}

pub async fn internal_get_student_form(
    State(state): State<RosterState>,
    Query(OptionalIdForm { id }): Query<OptionalIdForm>,
) -> Markup {
    render_or_notify(open_student_form(&state, id).await)
}

pub async fn internal_close_modal() -> Markup {
    Modal::Closed.render()
}

async fn handle_submission(state: RosterState, fields: StudentFields) -> Response {
    let outcome = submit_student(state.store(), &fields).await;
    let modal = Modal::submitted(fields).after(&outcome);

    match outcome {
        SubmitOutcome::Saved(notification) => {
            let reload_failure = state
                .reload_directory()
                .await
                .err()
                .map(|e| Notification::error(e.user_message()));

            (
                AppendHeaders([("HX-Trigger", STUDENTS_CHANGED)]),
                html! {
                    (modal)
                    (notification)
                    @if let Some(reload_failure) = reload_failure {
                        (reload_failure)
                    }
                },
            )
                .into_response()
        }
        SubmitOutcome::Invalid(_) => modal.render().into_response(),
        SubmitOutcome::Rejected(notification) => html! {
            (modal)
            (notification)
        }
        .into_response(),
    }
}

pub async fn put_new_student(
    State(state): State<RosterState>,
    Form(mut fields): Form<StudentFields>,
) -> Response {
    fields.id = None;
    handle_submission(state, fields).await
}

pub async fn post_student(
    State(state): State<RosterState>,
    Form(fields): Form<StudentFields>,
) -> Response {
    if fields.id.is_none() {
        return render_or_notify(Err(RosterError::MissingStudentId)).into_response();
    }
    handle_submission(state, fields).await
}
