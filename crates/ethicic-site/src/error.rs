use crate::config::ConfigError;
use crate::contact::ContactError;
use crate::content::tree::TreeError;
use crate::ingest::ImportError;
use crate::telemetry::TelemetryError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::fmt;

#[derive(Debug)]
pub enum SiteError {
    Config(ConfigError),
    Telemetry(TelemetryError),
    Io(std::io::Error),
    Server(axum::Error),
    Tree(TreeError),
    Import(ImportError),
    Contact(ContactError),
    Template(minijinja::Error),
    Store(String),
}

impl fmt::Display for SiteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SiteError::Config(err) => write!(f, "configuration error: {}", err),
            SiteError::Telemetry(err) => write!(f, "telemetry error: {}", err),
            SiteError::Io(err) => write!(f, "io error: {}", err),
            SiteError::Server(err) => write!(f, "server error: {}", err),
            SiteError::Tree(err) => write!(f, "page tree error: {}", err),
            SiteError::Import(err) => write!(f, "import error: {}", err),
            SiteError::Contact(err) => write!(f, "contact pipeline error: {}", err),
            SiteError::Template(err) => write!(f, "template error: {}", err),
            SiteError::Store(message) => write!(f, "content store error: {}", message),
        }
    }
}

impl std::error::Error for SiteError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SiteError::Config(err) => Some(err),
            SiteError::Telemetry(err) => Some(err),
            SiteError::Io(err) => Some(err),
            SiteError::Server(err) => Some(err),
            SiteError::Tree(err) => Some(err),
            SiteError::Import(err) => Some(err),
            SiteError::Contact(err) => Some(err),
            SiteError::Template(err) => Some(err),
            SiteError::Store(_) => None,
        }
    }
}

impl IntoResponse for SiteError {
    fn into_response(self) -> Response {
        let status = match self {
            SiteError::Tree(TreeError::NotFound { .. }) => StatusCode::NOT_FOUND,
            SiteError::Tree(_) | SiteError::Import(_) | SiteError::Contact(_) => {
                StatusCode::BAD_REQUEST
            }
            SiteError::Config(_)
            | SiteError::Telemetry(_)
            | SiteError::Io(_)
            | SiteError::Server(_)
            | SiteError::Template(_)
            | SiteError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}

impl From<ConfigError> for SiteError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<TelemetryError> for SiteError {
    fn from(value: TelemetryError) -> Self {
        Self::Telemetry(value)
    }
}

impl From<std::io::Error> for SiteError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<axum::Error> for SiteError {
    fn from(value: axum::Error) -> Self {
        Self::Server(value)
    }
}

impl From<TreeError> for SiteError {
    fn from(value: TreeError) -> Self {
        Self::Tree(value)
    }
}

impl From<ImportError> for SiteError {
    fn from(value: ImportError) -> Self {
        Self::Import(value)
    }
}

impl From<ContactError> for SiteError {
    fn from(value: ContactError) -> Self {
        Self::Contact(value)
    }
}

impl From<minijinja::Error> for SiteError {
    fn from(value: minijinja::Error) -> Self {
        Self::Template(value)
    }
}
