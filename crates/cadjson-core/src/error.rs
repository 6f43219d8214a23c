use crate::topology::ExplorerInit;
use std::path::PathBuf;
use thiserror::Error;

pub const INSTALL_HINT: &str =
    "Hint: build with the `step-assembly` or `step-brep` feature and the `js-export` feature to enable conversion.";

/// Fatal conversion failures surfaced to the caller.
#[derive(Debug, Error)]
pub enum ConvertError {
    /// No import backend or exporter is available.
    #[error("missing dependency: {capability}")]
    Dependency { capability: String, hint: String },

    #[error("no shapes found in input file: {path:?}")]
    EmptyInput { path: PathBuf },

    #[error("import of {path:?} failed: {message}")]
    Import { path: PathBuf, message: String },

    /// The exporter still rejected a container after the decompose-and-retry pass.
    #[error("exporter rejected container shape: {message}")]
    UnsupportedContainer { message: String },

    #[error("export failed: {message}")]
    Export { message: String },

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },
}

impl ConvertError {
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        ConvertError::Io {
            context: context.into(),
            source,
        }
    }

    pub fn hint(&self) -> Option<&str> {
        match self {
            ConvertError::Dependency { hint, .. } => Some(hint),
            _ => None,
        }
    }
}

/// The exporter's output did not reduce to a valid document.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("could not locate object literal in exporter output")]
    NoObjectLiteral,

    #[error("invalid JSON after normalizing exporter output: {0}")]
    Json(#[from] serde_json::Error),

    #[error("document root is not an object")]
    NotAnObject,

    #[error("document has no `parts` array")]
    MissingParts,
}

/// A shape's own enumeration affordance failed.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct ShapeError(pub String);

/// Introspection failures; always absorbed by the classifier and flattener.
#[derive(Debug, Error)]
pub enum TopologyError {
    #[error("shape is not managed by this facility: {type_name}")]
    ForeignShape { type_name: String },

    #[error("explorer convention {0:?} is not supported")]
    UnsupportedInit(ExplorerInit),

    #[error("{0}")]
    Failed(String),
}

#[derive(Debug, Error)]
#[error("{message}")]
pub struct ImportError {
    pub message: String,
}

impl ImportError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Failures reported by an exporter call.
#[derive(Debug, Error)]
pub enum ExporterError {
    /// The exporter does not take tolerance parameters.
    #[error("exporter does not accept tolerance parameters: {0}")]
    InterfaceMismatch(String),

    #[error("{0}")]
    Failed(String),
}
