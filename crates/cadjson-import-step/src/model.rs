use crate::entity::{EntityTable, Param};
use anyhow::{Context, Result};
use cadjson_core::ShapeKind;
use std::collections::{HashMap, HashSet};
use std::path::Path;

const REPRESENTATIONS: &[&str] = &[
    "ADVANCED_BREP_SHAPE_REPRESENTATION",
    "FACETED_BREP_SHAPE_REPRESENTATION",
    "MANIFOLD_SURFACE_SHAPE_REPRESENTATION",
    "SHAPE_REPRESENTATION",
];

#[derive(Debug, Clone, PartialEq)]
pub struct TopoNode {
    pub kind: ShapeKind,
    pub label: String,
    pub children: Vec<u64>,
}

/// Entity table plus the B-rep topology graph derived from it.
#[derive(Debug, Default)]
pub struct StepModel {
    pub entities: EntityTable,
    nodes: HashMap<u64, TopoNode>,
    products: Vec<String>,
}

impl StepModel {
    pub fn from_text(text: &str) -> Result<Self> {
        let entities = crate::entity::parse_entities(text)?;
        let mut nodes = HashMap::new();
        let mut products = Vec::new();

        for ent in entities.iter() {
            let label = ent.label().unwrap_or("").to_string();
            let (kind, children): (ShapeKind, Vec<u64>) = match ent.keyword.as_str() {
                "MANIFOLD_SOLID_BREP" | "FACETED_BREP" | "BREP_WITH_VOIDS" => {
                    (ShapeKind::Solid, ent.params.iter().skip(1).flat_map(param_refs).collect())
                }
                "CLOSED_SHELL" | "OPEN_SHELL" => (ShapeKind::Shell, list_refs(ent.params.get(1))),
                "ORIENTED_CLOSED_SHELL" | "ORIENTED_OPEN_SHELL" => (
                    ShapeKind::Shell,
                    ent.params.get(2).and_then(Param::as_ref_id).into_iter().collect(),
                ),
                "ADVANCED_FACE" | "FACE_SURFACE" | "ORIENTED_FACE" => (ShapeKind::Face, Vec::new()),
                "SHELL_BASED_SURFACE_MODEL" => (ShapeKind::Compound, list_refs(ent.params.get(1))),
                k if REPRESENTATIONS.contains(&k) => {
                    (ShapeKind::Compound, list_refs(ent.params.get(1)))
                }
                "PRODUCT" => {
                    let name = ent
                        .params
                        .get(1)
                        .and_then(Param::as_str)
                        .filter(|s| !s.is_empty())
                        .unwrap_or(label.as_str());
                    products.push(name.to_string());
                    continue;
                }
                _ => continue,
            };
            nodes.insert(
                ent.id,
                TopoNode {
                    kind,
                    label,
                    children,
                },
            );
        }

        // Representations also list placements; keep topological items only.
        let topo_ids: HashSet<u64> = nodes.keys().copied().collect();
        for node in nodes.values_mut() {
            node.children.retain(|id| topo_ids.contains(id));
        }

        Ok(Self {
            entities,
            nodes,
            products,
        })
    }

    pub fn read(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).with_context(|| format!("read STEP: {path:?}"))?;
        Self::from_text(&text).with_context(|| format!("parse STEP: {path:?}"))
    }

    pub fn node(&self, id: u64) -> Option<&TopoNode> {
        self.nodes.get(&id)
    }

    pub fn products(&self) -> &[String] {
        &self.products
    }

    /// Top-level shapes in file order: non-empty representations, or when
    /// there are none, topology nodes nothing else refers to.
    pub fn roots(&self) -> Vec<u64> {
        let reps: Vec<u64> = self
            .entities
            .iter()
            .filter(|e| REPRESENTATIONS.contains(&e.keyword.as_str()))
            .filter(|e| self.nodes.get(&e.id).is_some_and(|n| !n.children.is_empty()))
            .map(|e| e.id)
            .collect();
        if !reps.is_empty() {
            return reps;
        }

        let referenced: HashSet<u64> = self
            .nodes
            .values()
            .flat_map(|n| n.children.iter().copied())
            .collect();
        self.entities
            .iter()
            .map(|e| e.id)
            .filter(|id| self.nodes.contains_key(id) && !referenced.contains(id))
            .collect()
    }

    /// Sub-shapes of `kind` below `root`, plus `root` itself when it matches.
    /// The search does not descend into matches found below the root.
    pub fn find(&self, root: u64, kind: ShapeKind) -> Vec<u64> {
        let mut out = Vec::new();
        let mut seen = HashSet::new();
        let Some(node) = self.nodes.get(&root) else {
            return out;
        };
        seen.insert(root);
        if node.kind == kind {
            out.push(root);
        }
        for &child in &node.children {
            self.find_below(child, kind, &mut seen, &mut out);
        }
        out
    }

    fn find_below(&self, id: u64, kind: ShapeKind, seen: &mut HashSet<u64>, out: &mut Vec<u64>) {
        if !seen.insert(id) {
            return;
        }
        let Some(node) = self.nodes.get(&id) else {
            return;
        };
        if node.kind == kind {
            out.push(id);
            return;
        }
        for &child in &node.children {
            self.find_below(child, kind, seen, out);
        }
    }

    /// Vertex positions reachable from `root`, in discovery order. Only
    /// points owned by a VERTEX_POINT or POLY_LOOP count; surface and
    /// placement origins are skipped.
    pub fn points(&self, root: u64) -> Vec<[f64; 3]> {
        let mut out = Vec::new();
        let mut seen = HashSet::new();
        let mut stack = vec![(root, false)];
        while let Some((id, is_vertex)) = stack.pop() {
            let Some(ent) = self.entities.get(id) else {
                continue;
            };
            if ent.keyword == "CARTESIAN_POINT" {
                if is_vertex && seen.insert(id) {
                    if let Some(p) = point_coords(ent.params.get(1)) {
                        out.push(p);
                    }
                }
                continue;
            }
            if !seen.insert(id) {
                continue;
            }
            let owns_points = matches!(ent.keyword.as_str(), "VERTEX_POINT" | "POLY_LOOP");
            stack.extend(ent.refs().into_iter().rev().map(|r| (r, owns_points)));
        }
        out
    }
}

fn param_refs(param: &Param) -> Vec<u64> {
    let mut out = Vec::new();
    param.refs(&mut out);
    out
}

fn list_refs(param: Option<&Param>) -> Vec<u64> {
    match param {
        Some(Param::List(items)) => items.iter().filter_map(Param::as_ref_id).collect(),
        _ => Vec::new(),
    }
}

fn point_coords(param: Option<&Param>) -> Option<[f64; 3]> {
    let Some(Param::List(items)) = param else {
        return None;
    };
    let x = items.first()?.as_f64()?;
    let y = items.get(1).and_then(Param::as_f64).unwrap_or(0.0);
    let z = items.get(2).and_then(Param::as_f64).unwrap_or(0.0);
    Some([x, y, z])
}
