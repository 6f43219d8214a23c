use crate::error::ImportError;
use crate::shape::Imported;
use std::fmt;
use std::path::Path;
use tracing::{debug, info};

/// The closed set of geometry-import backends, in no particular order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BackendId {
    /// Product-structure aware STEP import returning one assembly container.
    StepAssembly,
    /// Plain B-rep STEP import returning the representation shapes.
    StepBrep,
}

impl BackendId {
    pub fn as_str(self) -> &'static str {
        match self {
            BackendId::StepAssembly => "step-assembly",
            BackendId::StepBrep => "step-brep",
        }
    }
}

impl fmt::Display for BackendId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub trait ImportBackend {
    fn id(&self) -> BackendId;

    /// Capability probe. A backend that is not available is skipped.
    fn is_available(&self) -> bool;

    fn import(&self, path: &Path) -> Result<Imported, ImportError>;
}

/// Returns the first available backend in priority order.
pub fn resolve(candidates: &[Box<dyn ImportBackend>]) -> Option<&dyn ImportBackend> {
    for backend in candidates {
        if backend.is_available() {
            info!(backend = %backend.id(), "resolved import backend");
            return Some(backend.as_ref());
        }
        debug!(backend = %backend.id(), "import backend unavailable");
    }
    None
}
