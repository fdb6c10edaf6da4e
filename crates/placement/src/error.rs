use crate::client::{ClientError, EditError, LoginError};
use crate::config::ConfigError;
use crate::roster::{RosterServiceError, StoreError};
use crate::telemetry::TelemetryError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::fmt;
use tracing::error;

#[derive(Debug)]
pub enum AppError {
    Config(ConfigError),
    Telemetry(TelemetryError),
    Io(std::io::Error),
    Store(StoreError),
    Roster(RosterServiceError),
    Client(ClientError),
    Login(LoginError),
    Edit(EditError),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {}", err),
            AppError::Telemetry(err) => write!(f, "telemetry error: {}", err),
            AppError::Io(err) => write!(f, "io error: {}", err),
            AppError::Store(err) => write!(f, "roster store error: {}", err),
            AppError::Roster(err) => write!(f, "roster error: {}", err),
            AppError::Client(err) => write!(f, "client error: {}", err),
            AppError::Login(err) => write!(f, "login failed: {}", err),
            AppError::Edit(err) => write!(f, "edit rejected: {}", err),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(err) => Some(err),
            AppError::Telemetry(err) => Some(err),
            AppError::Io(err) => Some(err),
            AppError::Store(err) => Some(err),
            AppError::Roster(err) => Some(err),
            AppError::Client(err) => Some(err),
            AppError::Login(err) => Some(err),
            AppError::Edit(err) => Some(err),
        }
    }
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Roster(RosterServiceError::MissingName)
            | AppError::Edit(_)
            | AppError::Login(LoginError::NotLoaded) => StatusCode::BAD_REQUEST,
            AppError::Roster(RosterServiceError::UnknownApplicant(_))
            | AppError::Login(LoginError::UnknownApplicant(_)) => StatusCode::NOT_FOUND,
            AppError::Config(_)
            | AppError::Telemetry(_)
            | AppError::Io(_)
            | AppError::Store(_)
            | AppError::Roster(RosterServiceError::Store(_))
            | AppError::Client(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!(error = %self, "request failed");
        }

        let body = Json(json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}

impl From<ConfigError> for AppError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<TelemetryError> for AppError {
    fn from(value: TelemetryError) -> Self {
        Self::Telemetry(value)
    }
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<StoreError> for AppError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

impl From<RosterServiceError> for AppError {
    fn from(value: RosterServiceError) -> Self {
        Self::Roster(value)
    }
}

impl From<ClientError> for AppError {
    fn from(value: ClientError) -> Self {
        Self::Client(value)
    }
}

impl From<LoginError> for AppError {
    fn from(value: LoginError) -> Self {
        Self::Login(value)
    }
}

impl From<EditError> for AppError {
    fn from(value: EditError) -> Self {
        Self::Edit(value)
    }
}
