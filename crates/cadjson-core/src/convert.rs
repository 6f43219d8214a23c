use crate::backend::{resolve, ImportBackend};
use crate::document::ExportDocument;
use crate::error::{ConvertError, INSTALL_HINT};
use crate::export::{ExportAdapter, Exporter, Tolerances};
use crate::flatten::{flatten_to_primitives, MAX_FLATTEN_PASSES};
use crate::literal::parse_literal;
use crate::normalize::normalize_with_stats;
use crate::postprocess::{apply_color_override, write_document};
use crate::shape::ShapeSequence;
use crate::topology::{Introspection, TopologyFacility};
use std::path::PathBuf;
use tracing::{debug, info, warn};

#[derive(Debug, Clone)]
pub struct ConversionRequest {
    pub input: PathBuf,
    pub output: PathBuf,
    pub model_name: Option<String>,
    pub color: Option<String>,
    pub tolerances: Tolerances,
}

impl ConversionRequest {
    pub fn new(input: impl Into<PathBuf>, output: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            output: output.into(),
            model_name: None,
            color: None,
            tolerances: Tolerances::default(),
        }
    }

    /// Explicit model name, else the input file stem.
    pub fn base_name(&self) -> String {
        if let Some(name) = self.model_name.as_deref().map(str::trim) {
            if !name.is_empty() {
                return name.to_string();
            }
        }
        self.input
            .file_stem()
            .and_then(|s| s.to_str())
            .filter(|s| !s.is_empty())
            .unwrap_or("model")
            .to_string()
    }
}

#[derive(Debug, Clone)]
pub struct ConvertConfig {
    /// Clamped to `1..=MAX_FLATTEN_PASSES`.
    pub max_flatten_passes: usize,
    pub temp_prefix: String,
}

impl Default for ConvertConfig {
    fn default() -> Self {
        Self {
            max_flatten_passes: MAX_FLATTEN_PASSES,
            temp_prefix: "cadjson-".to_string(),
        }
    }
}

/// Conversion entry point wiring an import backend, an exporter and an
/// optional topology facility together.
pub struct Converter {
    cfg: ConvertConfig,
    backends: Vec<Box<dyn ImportBackend>>,
    exporter: Option<Box<dyn Exporter>>,
    topology: Option<Box<dyn TopologyFacility>>,
}

impl Converter {
    pub fn new(cfg: ConvertConfig) -> Self {
        Self {
            cfg,
            backends: Vec::new(),
            exporter: None,
            topology: None,
        }
    }

    /// Backends are tried in the order they are added.
    pub fn with_backend(mut self, backend: impl ImportBackend + 'static) -> Self {
        self.backends.push(Box::new(backend));
        self
    }

    pub fn with_exporter(mut self, exporter: impl Exporter + 'static) -> Self {
        self.exporter = Some(Box::new(exporter));
        self
    }

    pub fn with_topology(mut self, facility: impl TopologyFacility + 'static) -> Self {
        self.topology = Some(Box::new(facility));
        self
    }

    fn introspection(&self) -> Introspection<'_> {
        Introspection::from_option(self.topology.as_deref())
    }

    /// Imports, flattens, exports and parses `req.input`, then writes the
    /// document to `req.output`. Nothing is written on failure.
    pub fn convert(&self, req: &ConversionRequest) -> Result<ExportDocument, ConvertError> {
        let backend = resolve(&self.backends).ok_or_else(|| ConvertError::Dependency {
            capability: "geometry import backend (step-assembly or step-brep)".to_string(),
            hint: INSTALL_HINT.to_string(),
        })?;
        let exporter = self
            .exporter
            .as_deref()
            .filter(|exporter| exporter.is_available())
            .ok_or_else(|| ConvertError::Dependency {
                capability: "tessellation exporter".to_string(),
                hint: INSTALL_HINT.to_string(),
            })?;

        let imported = backend
            .import(&req.input)
            .map_err(|err| ConvertError::Import {
                path: req.input.clone(),
                message: err.to_string(),
            })?;

        let (shapes, stats) = normalize_with_stats(imported.into_sequence());
        debug!(?stats, shapes = shapes.len(), "normalized import result");

        let introspection = self.introspection();
        let max_passes = self.cfg.max_flatten_passes.clamp(1, MAX_FLATTEN_PASSES);
        let flattened = flatten_to_primitives(introspection, shapes, max_passes);
        if !flattened.converged {
            warn!(passes = flattened.passes, "exporting with unresolved containers");
        }
        if flattened.shapes.is_empty() {
            return Err(ConvertError::EmptyInput {
                path: req.input.clone(),
            });
        }

        let base = req.base_name();
        let text = export_text(
            &ExportAdapter::new(exporter, introspection),
            flattened.shapes,
            &base,
            &self.cfg.temp_prefix,
            req.tolerances,
        )?;

        let mut doc = parse_literal(&text)?;
        apply_color_override(&mut doc, req.color.as_deref());
        write_document(&doc, &req.output)?;

        info!(
            backend = %backend.id(),
            parts = doc.parts().len(),
            output = ?req.output,
            "conversion finished"
        );
        Ok(doc)
    }
}

/// Runs the export inside a scoped temporary directory that is removed on
/// every exit path; the retry inside the adapter reuses the same file.
fn export_text(
    adapter: &ExportAdapter<'_>,
    shapes: ShapeSequence,
    base: &str,
    temp_prefix: &str,
    tolerances: Tolerances,
) -> Result<String, ConvertError> {
    let workdir = tempfile::Builder::new()
        .prefix(temp_prefix)
        .tempdir()
        .map_err(|err| ConvertError::io("create temporary directory", err))?;
    let output = workdir.path().join(literal_file_name(base));
    let outcome = adapter.export(shapes, base, &output, tolerances)?;
    Ok(outcome.text)
}

fn literal_file_name(base: &str) -> String {
    let stem: String = base
        .chars()
        .map(|c| if std::path::is_separator(c) { '_' } else { c })
        .collect();
    format!("{stem}.js")
}
