use crate::error::TopologyError;
use crate::shape::{Shape, ShapeHandle, ShapeKind};
use tracing::debug;

/// Ways of setting up a sub-shape explorer. Facilities built against
/// different kernel versions support different subsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExplorerInit {
    /// Construct with the shape and the kind to find.
    Kind,
    /// Construct with the shape, the kind to find and a kind to avoid.
    KindAvoidingShape,
    /// Default-construct, then initialise with shape and kind.
    DefaultThenInit,
}

impl ExplorerInit {
    pub const ALL: [ExplorerInit; 3] = [
        ExplorerInit::Kind,
        ExplorerInit::KindAvoidingShape,
        ExplorerInit::DefaultThenInit,
    ];
}

/// Optional topology-exploration capability.
pub trait TopologyFacility {
    /// Runtime type name of a compound handle.
    fn compound_type_name(&self) -> &str;

    /// Direct type check for compound-ness.
    fn is_compound(&self, shape: &dyn Shape) -> Result<bool, TopologyError>;

    /// The shape type the kernel reports for `shape`.
    fn shape_type(&self, shape: &dyn Shape) -> Result<ShapeKind, TopologyError>;

    /// Sub-shapes of `kind` in traversal order. Like a kernel explorer, the
    /// root itself is reported when it is of the requested kind.
    fn explore(
        &self,
        shape: &ShapeHandle,
        kind: ShapeKind,
        init: ExplorerInit,
    ) -> Result<Vec<ShapeHandle>, TopologyError>;

    fn is_same(&self, a: &dyn Shape, b: &dyn Shape) -> bool;
}

/// Whether a topology facility is present. `Unavailable` is a normal
/// outcome: shapes then classify as [`ShapeKind::Unknown`] and pass through.
#[derive(Clone, Copy)]
pub enum Introspection<'a> {
    Available(&'a dyn TopologyFacility),
    Unavailable,
}

impl<'a> Introspection<'a> {
    pub fn from_option(facility: Option<&'a dyn TopologyFacility>) -> Self {
        match facility {
            Some(facility) => Introspection::Available(facility),
            None => Introspection::Unavailable,
        }
    }

    pub fn facility(&self) -> Option<&'a dyn TopologyFacility> {
        match self {
            Introspection::Available(facility) => Some(*facility),
            Introspection::Unavailable => None,
        }
    }
}

impl std::fmt::Debug for Introspection<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Introspection::Available(_) => f.write_str("Available"),
            Introspection::Unavailable => f.write_str("Unavailable"),
        }
    }
}

pub fn classify(introspection: Introspection<'_>, shape: &dyn Shape) -> ShapeKind {
    let Introspection::Available(facility) = introspection else {
        return ShapeKind::Unknown;
    };

    match facility.is_compound(shape) {
        Ok(true) => return ShapeKind::Compound,
        Ok(false) => {}
        Err(err) => debug!(shape = shape.type_name(), %err, "compound type check failed"),
    }

    match facility.shape_type(shape) {
        Ok(kind) => return kind,
        Err(err) => debug!(shape = shape.type_name(), %err, "shape type query failed"),
    }

    if shape.type_name() == facility.compound_type_name() {
        ShapeKind::Compound
    } else {
        ShapeKind::Unknown
    }
}

pub fn is_container(introspection: Introspection<'_>, shape: &dyn Shape) -> bool {
    classify(introspection, shape).is_container()
}
