#![allow(dead_code)]

use cadjson_core::backend::{BackendId, ImportBackend};
use cadjson_core::error::{ExporterError, ImportError, ShapeError, TopologyError};
use cadjson_core::export::{ExportCall, Exporter, Tolerances};
use cadjson_core::topology::{ExplorerInit, TopologyFacility};
use cadjson_core::{Imported, Shape, ShapeHandle, ShapeKind};
use std::any::Any;
use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::sync::Arc;

#[derive(Debug)]
pub struct StubShape {
    pub label: String,
    pub kind: ShapeKind,
    pub type_name: String,
    pub children: Vec<ShapeHandle>,
    pub objects: Option<Vec<ShapeHandle>>,
    pub solids: Option<Result<Vec<ShapeHandle>, String>>,
}

impl Shape for StubShape {
    fn type_name(&self) -> &str {
        &self.type_name
    }

    fn objects(&self) -> Option<Vec<ShapeHandle>> {
        self.objects.clone()
    }

    fn solids(&self) -> Option<Result<Vec<ShapeHandle>, ShapeError>> {
        self.solids
            .as_ref()
            .map(|r| r.clone().map_err(ShapeError))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

fn stub(label: &str, kind: ShapeKind, children: Vec<ShapeHandle>) -> StubShape {
    let type_name = match kind {
        ShapeKind::Unknown => "Workplane".to_string(),
        kind => format!("TopoDS_{kind}"),
    };
    StubShape {
        label: label.to_string(),
        kind,
        type_name,
        children,
        objects: None,
        solids: None,
    }
}

pub fn face(label: &str) -> ShapeHandle {
    Arc::new(stub(label, ShapeKind::Face, Vec::new()))
}

pub fn shell(label: &str, faces: Vec<ShapeHandle>) -> ShapeHandle {
    Arc::new(stub(label, ShapeKind::Shell, faces))
}

pub fn solid(label: &str) -> ShapeHandle {
    let faces = vec![face(&format!("{label}/f0")), face(&format!("{label}/f1"))];
    Arc::new(stub(
        label,
        ShapeKind::Solid,
        vec![shell(&format!("{label}/shell"), faces)],
    ))
}

pub fn compound(label: &str, children: Vec<ShapeHandle>) -> ShapeHandle {
    Arc::new(stub(label, ShapeKind::Compound, children))
}

pub fn comp_solid(label: &str, children: Vec<ShapeHandle>) -> ShapeHandle {
    Arc::new(stub(label, ShapeKind::CompSolid, children))
}

/// Assembly-like container exposing `objects`.
pub fn container(label: &str, objects: Vec<ShapeHandle>) -> ShapeHandle {
    let mut shape = stub(label, ShapeKind::Unknown, Vec::new());
    shape.objects = Some(objects);
    Arc::new(shape)
}

/// Compound offering its own solid enumeration.
pub fn compound_with_solids(label: &str, solids: Result<Vec<ShapeHandle>, String>) -> ShapeHandle {
    let mut shape = stub(label, ShapeKind::Compound, Vec::new());
    shape.solids = Some(solids);
    Arc::new(shape)
}

pub fn stub_of(shape: &ShapeHandle) -> &StubShape {
    shape
        .as_any()
        .downcast_ref::<StubShape>()
        .expect("stub shape")
}

pub fn label(shape: &ShapeHandle) -> String {
    stub_of(shape).label.clone()
}

pub fn labels(shapes: &[ShapeHandle]) -> Vec<String> {
    shapes.iter().map(label).collect()
}

/// Facility over [`StubShape`] trees.
pub struct StubTopology {
    /// When false, type checks fail and only the type name fallback works.
    pub reliable: bool,
    pub inits: Vec<ExplorerInit>,
    /// Report every shape as a compound, whatever it is.
    pub always_compound: bool,
    /// Only look at the root and its direct children.
    pub shallow: bool,
}

impl Default for StubTopology {
    fn default() -> Self {
        Self {
            reliable: true,
            inits: ExplorerInit::ALL.to_vec(),
            always_compound: false,
            shallow: false,
        }
    }
}

impl StubTopology {
    fn downcast<'s>(&self, shape: &'s dyn Shape) -> Result<&'s StubShape, TopologyError> {
        shape
            .as_any()
            .downcast_ref::<StubShape>()
            .ok_or_else(|| TopologyError::ForeignShape {
                type_name: shape.type_name().to_string(),
            })
    }
}

fn gather(shape: &ShapeHandle, kind: ShapeKind, out: &mut Vec<ShapeHandle>) {
    let node = stub_of(shape);
    if node.kind == kind {
        out.push(shape.clone());
        return;
    }
    for child in &node.children {
        gather(child, kind, out);
    }
}

impl TopologyFacility for StubTopology {
    fn compound_type_name(&self) -> &str {
        "TopoDS_Compound"
    }

    fn is_compound(&self, shape: &dyn Shape) -> Result<bool, TopologyError> {
        if self.always_compound {
            return Ok(true);
        }
        if !self.reliable {
            return Err(TopologyError::Failed("no type check".to_string()));
        }
        Ok(self.downcast(shape)?.kind == ShapeKind::Compound)
    }

    fn shape_type(&self, shape: &dyn Shape) -> Result<ShapeKind, TopologyError> {
        if !self.reliable {
            return Err(TopologyError::Failed("no shape type".to_string()));
        }
        Ok(self.downcast(shape)?.kind)
    }

    fn explore(
        &self,
        shape: &ShapeHandle,
        kind: ShapeKind,
        init: ExplorerInit,
    ) -> Result<Vec<ShapeHandle>, TopologyError> {
        if !self.inits.contains(&init) {
            return Err(TopologyError::UnsupportedInit(init));
        }
        let root = self.downcast(shape.as_ref())?;
        let mut out = Vec::new();
        if root.kind == kind {
            out.push(shape.clone());
        }
        for child in &root.children {
            if self.shallow {
                if stub_of(child).kind == kind {
                    out.push(child.clone());
                }
            } else {
                gather(child, kind, &mut out);
            }
        }
        Ok(out)
    }

    fn is_same(&self, a: &dyn Shape, b: &dyn Shape) -> bool {
        std::ptr::addr_eq(a, b)
    }
}

#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub names: Vec<String>,
    pub labels: Vec<String>,
    pub tolerances: Option<Tolerances>,
    pub output: PathBuf,
}

/// Exporter writing a small literal; rejects compounds like the real one.
#[derive(Clone)]
pub struct StubExporter {
    pub calls: Rc<RefCell<Vec<RecordedCall>>>,
    pub accepts_tolerances: bool,
    pub reject_compounds: bool,
    pub failure: Option<String>,
    pub output: Option<String>,
    pub available: bool,
}

impl Default for StubExporter {
    fn default() -> Self {
        Self {
            calls: Rc::new(RefCell::new(Vec::new())),
            accepts_tolerances: true,
            reject_compounds: true,
            failure: None,
            output: None,
            available: true,
        }
    }
}

impl StubExporter {
    pub fn call_count(&self) -> usize {
        self.calls.borrow().len()
    }

    /// Directories the exporter was asked to write into.
    pub fn output_dirs(&self) -> Vec<PathBuf> {
        self.calls
            .borrow()
            .iter()
            .filter_map(|call| call.output.parent().map(Path::to_path_buf))
            .collect()
    }

    pub fn last_call(&self) -> RecordedCall {
        self.calls.borrow().last().cloned().expect("exporter was called")
    }
}

impl Exporter for StubExporter {
    fn name(&self) -> &str {
        "stub"
    }

    fn is_available(&self) -> bool {
        self.available
    }

    fn export(&self, call: &ExportCall<'_>) -> Result<(), ExporterError> {
        if call.tolerances.is_some() && !self.accepts_tolerances {
            return Err(ExporterError::InterfaceMismatch(
                "unexpected keyword argument 'angular_tolerance'".to_string(),
            ));
        }
        self.calls.borrow_mut().push(RecordedCall {
            names: call.names.to_vec(),
            labels: labels(call.shapes),
            tolerances: call.tolerances,
            output: call.output.to_path_buf(),
        });
        if let Some(message) = &self.failure {
            return Err(ExporterError::Failed(message.clone()));
        }
        if self.reject_compounds
            && call
                .shapes
                .iter()
                .any(|s| stub_of(s).kind == ShapeKind::Compound)
        {
            return Err(ExporterError::Failed(
                "Unknown type: <class 'TopoDS_Compound'>".to_string(),
            ));
        }

        let text = match &self.output {
            Some(text) => text.clone(),
            None => {
                let parts: String = call
                    .names
                    .iter()
                    .map(|name| format!("    {{ name: \"{name}\", color: \"#e8b024\", }},\n"))
                    .collect();
                format!(
                    "var {} = {{\n  version: 3,\n  name: \"{}\",\n  parts: [\n{}  ],\n}};\n",
                    call.base, call.base, parts
                )
            }
        };
        std::fs::write(call.output, text)
            .map_err(|err| ExporterError::Failed(err.to_string()))
    }
}

pub struct StubBackend {
    pub id: BackendId,
    pub available: bool,
    pub result: Box<dyn Fn(&Path) -> Result<Imported, ImportError>>,
}

impl StubBackend {
    pub fn returning(id: BackendId, shapes: Vec<ShapeHandle>) -> Self {
        Self {
            id,
            available: true,
            result: Box::new(move |_| Ok(Imported::Many(shapes.clone()))),
        }
    }

    pub fn unavailable(id: BackendId) -> Self {
        Self {
            id,
            available: false,
            result: Box::new(|_| Err(ImportError::new("not installed"))),
        }
    }
}

impl ImportBackend for StubBackend {
    fn id(&self) -> BackendId {
        self.id
    }

    fn is_available(&self) -> bool {
        self.available
    }

    fn import(&self, path: &Path) -> Result<Imported, ImportError> {
        (self.result)(path)
    }
}
