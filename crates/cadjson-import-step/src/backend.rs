use crate::model::StepModel;
use crate::shape::{StepAssembly, StepShape};
use cadjson_core::backend::{BackendId, ImportBackend};
use cadjson_core::error::ImportError;
use cadjson_core::{Imported, ShapeHandle};
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

pub fn read_model(path: &Path) -> Result<Arc<StepModel>, ImportError> {
    StepModel::read(path)
        .map(Arc::new)
        .map_err(|err| ImportError::new(format!("{err:#}")))
}

pub fn root_shapes(model: &Arc<StepModel>) -> Vec<ShapeHandle> {
    model
        .roots()
        .into_iter()
        .filter_map(|id| StepShape::handle(model, id))
        .collect()
}

/// Imports the representation shapes as a flat sequence.
#[derive(Debug, Clone, Copy)]
pub struct StepBrepBackend {
    pub enabled: bool,
}

impl ImportBackend for StepBrepBackend {
    fn id(&self) -> BackendId {
        BackendId::StepBrep
    }

    fn is_available(&self) -> bool {
        self.enabled
    }

    fn import(&self, path: &Path) -> Result<Imported, ImportError> {
        let model = read_model(path)?;
        Ok(Imported::Many(root_shapes(&model)))
    }
}

/// Imports the file as one assembly container named after its first
/// product. Files without product structure come back as a flat sequence.
#[derive(Debug, Clone, Copy)]
pub struct StepAssemblyBackend {
    pub enabled: bool,
}

impl ImportBackend for StepAssemblyBackend {
    fn id(&self) -> BackendId {
        BackendId::StepAssembly
    }

    fn is_available(&self) -> bool {
        self.enabled
    }

    fn import(&self, path: &Path) -> Result<Imported, ImportError> {
        let model = read_model(path)?;
        let objects = root_shapes(&model);
        let Some(name) = model.products().first() else {
            debug!(?path, "no product structure; importing plain shapes");
            return Ok(Imported::Many(objects));
        };
        Ok(Imported::Single(Arc::new(StepAssembly {
            name: name.clone(),
            objects,
        })))
    }
}
