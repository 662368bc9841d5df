use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use maud::html;
use snafu::Snafu;
use std::num::ParseIntError;
use uuid::Uuid;

pub type RosterResult<T> = Result<T, RosterError>;

const GENERIC_FAILURE: &str = "Something went wrong while talking to the database.";

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum RosterError {
    #[snafu(display("Error opening database"))]
    OpenDatabase { source: sqlx::Error },
    #[snafu(display("Error getting db connection"))]
    GetDatabaseConnection { source: sqlx::Error },
    #[snafu(display("Error making SQL query"))]
    MakeQuery { source: sqlx::Error },
    #[snafu(display("Error migrating DB schema"))]
    Migrate { source: sqlx::migrate::MigrateError },
    #[snafu(display("Unable to retrieve env var `{}`", name))]
    BadEnvVar {
        source: dotenvy::Error,
        name: &'static str,
    },
    #[snafu(display("Unable to parse IP port"))]
    ParsePort { source: ParseIntError },
    #[snafu(display("Unable to convert date {:?}", original))]
    ConvertDate { original: String },
    #[snafu(display("Unable to find student with UUID: {}", id))]
    MissingStudent { id: Uuid },
    #[snafu(display("Tried to update a student without saying which one"))]
    MissingStudentId,
    #[snafu(display("Enrollment number {:?} already exists", enrollment_number))]
    DuplicateEnrollmentNumber { enrollment_number: String },
}

impl RosterError {
    pub const fn is_conflict(&self) -> bool {
        matches!(self, Self::DuplicateEnrollmentNumber { .. })
    }

    /// The message to show the person at the keyboard. Database errors surface what postgres
    /// actually said rather than our wrapper's display.
    pub fn user_message(&self) -> String {
        let message = match self {
            Self::MakeQuery { source } | Self::GetDatabaseConnection { source } => match source {
                sqlx::Error::Database(db) => db.message().to_string(),
                other => other.to_string(),
            },
            other => other.to_string(),
        };

        if message.trim().is_empty() {
            GENERIC_FAILURE.to_string()
        } else {
            message
        }
    }
}

impl IntoResponse for RosterError {
    #[allow(clippy::match_same_arms)]
    fn into_response(self) -> Response {
        const ISE: StatusCode = StatusCode::INTERNAL_SERVER_ERROR; //internal server error
        const NF: StatusCode = StatusCode::NOT_FOUND; //not found
        const BI: StatusCode = StatusCode::BAD_REQUEST; //bad input

        let basic_error = |desc| {
            html! {
                div class="bg-red-100 border border-red-400 text-red-700 px-4 py-3 rounded relative mb-4" role="alert" {
                    strong class="font-bold" {"Roster Error "}
                    span {(desc)}
                }
            }
        };

        let status_code = match &self {
            Self::OpenDatabase { .. } | Self::GetDatabaseConnection { .. } => ISE,
            Self::Migrate { .. } => ISE,
            Self::MakeQuery { source } => match source {
                sqlx::Error::RowNotFound => NF,
                _ => ISE,
            },
            Self::BadEnvVar { .. } => ISE,
            Self::ParsePort { .. } => ISE,
            Self::ConvertDate { .. } => ISE,
            Self::MissingStudent { .. } => NF,
            Self::MissingStudentId => BI,
            Self::DuplicateEnrollmentNumber { .. } => StatusCode::CONFLICT,
        };

        error!(?self, "Error!");
        (status_code, Html(basic_error(self.to_string()))).into_response()
    }
}
