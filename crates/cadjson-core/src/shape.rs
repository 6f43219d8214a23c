use crate::error::ShapeError;
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// Topological level of a shape, from most aggregate to primitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShapeKind {
    Compound,
    CompSolid,
    Solid,
    Shell,
    Face,
    Unknown,
}

impl ShapeKind {
    /// Compounds and comp-solids are rejected by the exporter.
    pub fn is_container(self) -> bool {
        matches!(self, ShapeKind::Compound | ShapeKind::CompSolid)
    }

    pub fn is_primitive(self) -> bool {
        matches!(self, ShapeKind::Solid | ShapeKind::Shell | ShapeKind::Face)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ShapeKind::Compound => "Compound",
            ShapeKind::CompSolid => "CompSolid",
            ShapeKind::Solid => "Solid",
            ShapeKind::Shell => "Shell",
            ShapeKind::Face => "Face",
            ShapeKind::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for ShapeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A piece of geometry owned by the backend that produced it.
///
/// The converter never mutates shapes. It asks them for their runtime type
/// name, for container contents and for their solids; everything else goes
/// through a [`crate::topology::TopologyFacility`], which downcasts via
/// [`Shape::as_any`] to its own handle type.
pub trait Shape: fmt::Debug + Send + Sync {
    fn type_name(&self) -> &str;

    /// Contents of an assembly or workplane-like container.
    fn objects(&self) -> Option<Vec<ShapeHandle>> {
        None
    }

    /// Solid enumeration, if the shape offers one.
    fn solids(&self) -> Option<Result<Vec<ShapeHandle>, ShapeError>> {
        None
    }

    fn as_any(&self) -> &dyn Any;
}

pub type ShapeHandle = Arc<dyn Shape>;
pub type ShapeSequence = Vec<ShapeHandle>;

/// What an import backend hands back: a lone shape or a sequence.
#[derive(Debug)]
pub enum Imported {
    Single(ShapeHandle),
    Many(ShapeSequence),
}

impl Imported {
    pub fn into_sequence(self) -> ShapeSequence {
        match self {
            Imported::Single(shape) => vec![shape],
            Imported::Many(shapes) => shapes,
        }
    }
}

impl From<ShapeHandle> for Imported {
    fn from(shape: ShapeHandle) -> Self {
        Imported::Single(shape)
    }
}

impl From<ShapeSequence> for Imported {
    fn from(shapes: ShapeSequence) -> Self {
        Imported::Many(shapes)
    }
}
