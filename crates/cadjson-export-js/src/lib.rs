use cadjson_core::error::ExporterError;
use cadjson_core::export::{ExportCall, Exporter, Tolerances};
use cadjson_core::{ShapeHandle, ShapeKind};
use cadjson_import_step::StepShape;
use std::fmt::Write as _;
use tracing::debug;

pub const DEFAULT_PART_COLOR: &str = "#e8b024";

/// Writes shapes as the viewer's relaxed object literal: an assignment
/// prologue, unquoted keys and trailing commas.
#[derive(Debug, Clone)]
pub struct JsLiteralExporter {
    pub color: String,
    /// Older exporter releases did not take tolerance parameters.
    pub legacy: bool,
}

impl Default for JsLiteralExporter {
    fn default() -> Self {
        Self {
            color: DEFAULT_PART_COLOR.to_string(),
            legacy: false,
        }
    }
}

impl JsLiteralExporter {
    pub fn legacy() -> Self {
        Self {
            legacy: true,
            ..Self::default()
        }
    }
}

impl Exporter for JsLiteralExporter {
    fn name(&self) -> &str {
        "js-literal"
    }

    fn export(&self, call: &ExportCall<'_>) -> Result<(), ExporterError> {
        if self.legacy && call.tolerances.is_some() {
            return Err(ExporterError::InterfaceMismatch(
                "unexpected tolerance parameters".to_string(),
            ));
        }
        if call.shapes.len() != call.names.len() {
            return Err(ExporterError::Failed(format!(
                "{} shapes but {} names",
                call.shapes.len(),
                call.names.len()
            )));
        }

        let parts = call
            .shapes
            .iter()
            .zip(call.names)
            .map(|(shape, name)| Part::from_shape(shape, name))
            .collect::<Result<Vec<_>, _>>()?;

        let text = render(call.base, &parts, &self.color, call.tolerances);
        std::fs::write(call.output, text)
            .map_err(|err| ExporterError::Failed(format!("write {:?}: {err}", call.output)))?;
        debug!(parts = parts.len(), output = ?call.output, "wrote literal");
        Ok(())
    }
}

struct Part<'a> {
    name: &'a str,
    kind: ShapeKind,
    faces: usize,
    vertices: Vec<[f64; 3]>,
}

impl<'a> Part<'a> {
    fn from_shape(shape: &ShapeHandle, name: &'a str) -> Result<Self, ExporterError> {
        let Some(step) = shape.as_any().downcast_ref::<StepShape>() else {
            return Err(ExporterError::Failed(format!(
                "Unknown type: {}",
                shape.type_name()
            )));
        };
        if !step.kind().is_primitive() {
            return Err(ExporterError::Failed(format!(
                "Unknown type: {}",
                shape.type_name()
            )));
        }
        Ok(Self {
            name,
            kind: step.kind(),
            faces: step.find(ShapeKind::Face).len(),
            vertices: step
                .points()
                .into_iter()
                .filter(|p| p.iter().all(|c| c.is_finite()))
                .collect(),
        })
    }
}

fn render(base: &str, parts: &[Part<'_>], color: &str, tolerances: Option<Tolerances>) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "var {} = {{", js_identifier(base));
    let _ = writeln!(out, "  version: 3,");
    let _ = writeln!(out, "  name: {},", js_string(base));
    let _ = writeln!(out, "  id: {},", js_string(&format!("/{base}")));
    if let Some(t) = tolerances {
        let _ = writeln!(
            out,
            "  tolerance: {{ linear: {}, angular: {}, }},",
            t.linear, t.angular_deg
        );
    }
    if let Some(bb) = bounds(parts.iter().flat_map(|p| p.vertices.iter())) {
        let _ = writeln!(out, "  bb: {bb},");
    }
    let _ = writeln!(out, "  parts: [");
    for part in parts {
        let _ = writeln!(out, "    {{");
        let _ = writeln!(out, "      id: {},", js_string(&format!("/{base}/{}", part.name)));
        let _ = writeln!(out, "      name: {},", js_string(part.name));
        let _ = writeln!(out, "      type: \"shapes\",");
        let _ = writeln!(out, "      subtype: {},", js_string(part.kind.as_str()));
        let _ = writeln!(out, "      color: {},", js_string(color));
        let _ = writeln!(out, "      faces: {},", part.faces);
        if let Some(bb) = bounds(part.vertices.iter()) {
            let _ = writeln!(out, "      bb: {bb},");
        }
        let coords: Vec<String> = part
            .vertices
            .iter()
            .flat_map(|p| p.iter().map(|c| c.to_string()))
            .collect();
        let _ = writeln!(out, "      shape: {{ vertices: [{}], }},", coords.join(", "));
        let _ = writeln!(out, "    }},");
    }
    let _ = writeln!(out, "  ],");
    let _ = writeln!(out, "}};");
    out
}

fn bounds<'p>(points: impl Iterator<Item = &'p [f64; 3]>) -> Option<String> {
    let mut min = [f64::INFINITY; 3];
    let mut max = [f64::NEG_INFINITY; 3];
    let mut any = false;
    for p in points {
        any = true;
        for i in 0..3 {
            min[i] = min[i].min(p[i]);
            max[i] = max[i].max(p[i]);
        }
    }
    if !any {
        return None;
    }
    Some(format!(
        "{{ xmin: {}, xmax: {}, ymin: {}, ymax: {}, zmin: {}, zmax: {}, }}",
        min[0], max[0], min[1], max[1], min[2], max[2]
    ))
}

fn js_string(s: &str) -> String {
    serde_json::Value::String(s.to_string()).to_string()
}

fn js_identifier(base: &str) -> String {
    let mut ident: String = base
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' || c == '$' { c } else { '_' })
        .collect();
    if ident.is_empty() || ident.starts_with(|c: char| c.is_ascii_digit()) {
        ident.insert(0, '_');
    }
    ident
}
