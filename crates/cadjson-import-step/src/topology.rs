use crate::shape::{StepShape, COMPOUND_TYPE_NAME};
use cadjson_core::error::TopologyError;
use cadjson_core::topology::{ExplorerInit, TopologyFacility};
use cadjson_core::{Shape, ShapeHandle, ShapeKind};
use std::sync::Arc;

/// Topology facility over shapes read by this crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct StepTopology;

fn step_shape(shape: &dyn Shape) -> Result<&StepShape, TopologyError> {
    shape
        .as_any()
        .downcast_ref::<StepShape>()
        .ok_or_else(|| TopologyError::ForeignShape {
            type_name: shape.type_name().to_string(),
        })
}

impl TopologyFacility for StepTopology {
    fn compound_type_name(&self) -> &str {
        COMPOUND_TYPE_NAME
    }

    fn is_compound(&self, shape: &dyn Shape) -> Result<bool, TopologyError> {
        Ok(step_shape(shape)?.kind() == ShapeKind::Compound)
    }

    fn shape_type(&self, shape: &dyn Shape) -> Result<ShapeKind, TopologyError> {
        Ok(step_shape(shape)?.kind())
    }

    // The entity graph is walked the same way whichever convention is asked for.
    fn explore(
        &self,
        shape: &ShapeHandle,
        kind: ShapeKind,
        _init: ExplorerInit,
    ) -> Result<Vec<ShapeHandle>, TopologyError> {
        Ok(step_shape(shape.as_ref())?.find(kind))
    }

    fn is_same(&self, a: &dyn Shape, b: &dyn Shape) -> bool {
        match (step_shape(a), step_shape(b)) {
            (Ok(a), Ok(b)) => a.id() == b.id() && Arc::ptr_eq(a.model(), b.model()),
            _ => false,
        }
    }
}
