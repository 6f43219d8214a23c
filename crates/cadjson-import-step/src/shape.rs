use crate::model::StepModel;
use cadjson_core::error::ShapeError;
use cadjson_core::{Shape, ShapeHandle, ShapeKind};
use std::any::Any;
use std::sync::Arc;

pub const COMPOUND_TYPE_NAME: &str = "StepCompound";

/// One topological entity of a [`StepModel`].
#[derive(Debug, Clone)]
pub struct StepShape {
    model: Arc<StepModel>,
    id: u64,
    kind: ShapeKind,
}

impl StepShape {
    /// Returns `None` when `id` is not a topological entity.
    pub fn new(model: Arc<StepModel>, id: u64) -> Option<Self> {
        let kind = model.node(id)?.kind;
        Some(Self { model, id, kind })
    }

    pub fn handle(model: &Arc<StepModel>, id: u64) -> Option<ShapeHandle> {
        Self::new(model.clone(), id).map(|s| Arc::new(s) as ShapeHandle)
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn kind(&self) -> ShapeKind {
        self.kind
    }

    pub fn model(&self) -> &Arc<StepModel> {
        &self.model
    }

    pub fn label(&self) -> &str {
        self.model.node(self.id).map(|n| n.label.as_str()).unwrap_or("")
    }

    pub fn find(&self, kind: ShapeKind) -> Vec<ShapeHandle> {
        self.model
            .find(self.id, kind)
            .into_iter()
            .filter_map(|id| Self::handle(&self.model, id))
            .collect()
    }

    pub fn points(&self) -> Vec<[f64; 3]> {
        self.model.points(self.id)
    }
}

impl Shape for StepShape {
    fn type_name(&self) -> &str {
        match self.kind {
            ShapeKind::Compound => COMPOUND_TYPE_NAME,
            ShapeKind::CompSolid => "StepCompSolid",
            ShapeKind::Solid => "StepSolid",
            ShapeKind::Shell => "StepShell",
            ShapeKind::Face => "StepFace",
            ShapeKind::Unknown => "StepShape",
        }
    }

    /// Compounds enumerate their solids, like a kernel compound would.
    fn solids(&self) -> Option<Result<Vec<ShapeHandle>, ShapeError>> {
        match self.kind {
            ShapeKind::Compound | ShapeKind::CompSolid => Some(Ok(self.find(ShapeKind::Solid))),
            _ => None,
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Product-level container returned by the assembly backend.
#[derive(Debug, Clone)]
pub struct StepAssembly {
    pub name: String,
    pub objects: Vec<ShapeHandle>,
}

impl Shape for StepAssembly {
    fn type_name(&self) -> &str {
        "StepAssembly"
    }

    fn objects(&self) -> Option<Vec<ShapeHandle>> {
        Some(self.objects.clone())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
