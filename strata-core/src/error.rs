use thiserror::Error;

/// Errors surfaced by the codec, stores and controller.
#[derive(Debug, Error)]
pub enum StrataError {
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("XML attribute error: {0}")]
    Attr(#[from] quick_xml::events::attributes::AttrError),

    #[error("Malformed <{element}>: {message}")]
    Codec { element: String, message: String },

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Not found: {0}")]
    NotFound(String),
}

impl StrataError {
    pub fn codec(element: impl Into<String>, message: impl Into<String>) -> Self {
        StrataError::Codec {
            element: element.into(),
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, StrataError>;
