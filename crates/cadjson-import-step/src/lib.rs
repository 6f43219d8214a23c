pub mod backend;
pub mod entity;
pub mod model;
pub mod shape;
pub mod topology;

pub use backend::{StepAssemblyBackend, StepBrepBackend};
pub use model::StepModel;
pub use shape::{StepAssembly, StepShape};
pub use topology::StepTopology;
