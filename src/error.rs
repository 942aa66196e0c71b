use crate::data::student::StudentField;
use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use snafu::Snafu;
use std::num::ParseIntError;
use uuid::Uuid;

pub type RecordResult<T> = Result<T, RecordError>;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum RecordError {
    #[snafu(display("Error opening database"))]
    OpenDatabase { source: sqlx::Error },
    #[snafu(display("Error making SQL query: {source}"))]
    MakeQuery { source: sqlx::Error },
    #[snafu(display("Error migrating DB schema"))]
    MigrateError { source: sqlx::migrate::MigrateError },
    #[snafu(display("Unable to retrieve env var `{}`", name))]
    BadEnvVar {
        source: dotenvy::Error,
        name: &'static str,
    },
    #[snafu(display("Unable to parse `{}` as a number", name))]
    ParseNumber {
        source: ParseIntError,
        name: &'static str,
    },
    #[snafu(display("Unable to bind to {}", address))]
    BindListener {
        source: std::io::Error,
        address: String,
    },
    #[snafu(display("Error serving HTTP"))]
    Serve { source: std::io::Error },
    #[snafu(display("Cast to UUID failed for value {:?}", original))]
    ParseId {
        source: uuid::Error,
        original: String,
    },
    #[snafu(display("Invalid student id {:?} in update", original))]
    ParseUpdateId {
        source: uuid::Error,
        original: String,
    },
    #[snafu(display("Student validation failed: `{}` is required", field))]
    MissingField { field: StudentField },
    #[snafu(display(
        "Student validation failed: `{}` must be unique, {:?} is already taken",
        field,
        value
    ))]
    DuplicateField { field: StudentField, value: String },
    #[snafu(display("{}", source.body_text()))]
    BadBody { source: JsonRejection },
    #[snafu(display("Student not found"))]
    MissingStudent { id: Uuid },
    #[snafu(display("Student not found"))]
    MissingStudentBy { field: StudentField, value: String },
}

impl From<JsonRejection> for RecordError {
    fn from(source: JsonRejection) -> Self {
        Self::BadBody { source }
    }
}

#[derive(Serialize)]
pub struct Message {
    pub message: String,
}

impl Message {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl IntoResponse for RecordError {
    #[allow(clippy::match_same_arms)]
    fn into_response(self) -> Response {
        const ISE: StatusCode = StatusCode::INTERNAL_SERVER_ERROR; //internal server error
        const NF: StatusCode = StatusCode::NOT_FOUND; //not found
        const BI: StatusCode = StatusCode::BAD_REQUEST; //bad input

        let status_code = match &self {
            Self::OpenDatabase { .. } | Self::MigrateError { .. } => ISE,
            Self::MakeQuery { .. } => ISE,
            Self::BadEnvVar { .. } | Self::ParseNumber { .. } | Self::BindListener { .. } => ISE,
            Self::Serve { .. } => ISE,
            Self::ParseId { .. } => ISE,
            Self::ParseUpdateId { .. } => BI,
            Self::MissingField { .. } | Self::DuplicateField { .. } => BI,
            Self::BadBody { source } => match source.status() {
                StatusCode::PAYLOAD_TOO_LARGE => StatusCode::PAYLOAD_TOO_LARGE,
                _ => BI,
            },
            Self::MissingStudent { .. } | Self::MissingStudentBy { .. } => NF,
        };

        if status_code.is_server_error() {
            error!(?self, "Error!");
        } else {
            warn!(?self, %status_code, "Rejected request");
        }

        (status_code, Json(Message::new(self.to_string()))).into_response()
    }
}
