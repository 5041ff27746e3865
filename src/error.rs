use thiserror::Error;

#[derive(Debug, Error)]
pub enum MigrateError {
    #[error("input file '{path}' does not exist or cannot be read: {source}")]
    InputNotFound {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("input file '{path}' is not valid JSON: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("schema error at {context}: {message}")]
    Schema { context: String, message: String },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl MigrateError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::InputNotFound { .. } => "input_not_found",
            Self::Parse { .. } => "parse_error",
            Self::Schema { .. } => "schema_error",
            Self::Io(_) => "io_error",
            Self::Json(_) => "json_error",
        }
    }

    pub fn schema(context: impl Into<String>, message: impl std::fmt::Display) -> Self {
        Self::Schema {
            context: context.into(),
            message: message.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, MigrateError>;
