use crate::error::{ConvertError, ExporterError};
use crate::flatten::flatten;
use crate::shape::{ShapeHandle, ShapeSequence};
use crate::topology::Introspection;
use std::path::Path;
use tracing::{debug, info, warn};

/// Tessellation quality passed through to the exporter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tolerances {
    pub linear: f64,
    pub angular_deg: f64,
}

impl Default for Tolerances {
    fn default() -> Self {
        Self {
            linear: 0.1,
            angular_deg: 12.0,
        }
    }
}

/// One exporter invocation. `names[i]` labels `shapes[i]`.
#[derive(Debug)]
pub struct ExportCall<'a> {
    pub base: &'a str,
    pub shapes: &'a [ShapeHandle],
    pub names: &'a [String],
    pub output: &'a Path,
    pub tolerances: Option<Tolerances>,
}

/// External tessellation/export capability.
///
/// Implementations write their textual output to `call.output`, return
/// [`ExporterError::InterfaceMismatch`] when they cannot take tolerances, and
/// fail with a message mentioning `Compound` when handed a container.
pub trait Exporter {
    fn name(&self) -> &str;

    fn is_available(&self) -> bool {
        true
    }

    fn export(&self, call: &ExportCall<'_>) -> Result<(), ExporterError>;
}

pub fn part_names(base: &str, count: usize) -> Vec<String> {
    (0..count).map(|i| format!("{base}_{i}")).collect()
}

pub fn is_unsupported_container(message: &str) -> bool {
    message.contains("Compound")
}

#[derive(Debug)]
pub struct ExportOutcome {
    pub text: String,
    /// The shapes that were actually exported, matching `names`.
    pub shapes: ShapeSequence,
    pub names: Vec<String>,
    pub retried: bool,
}

pub struct ExportAdapter<'a> {
    exporter: &'a dyn Exporter,
    introspection: Introspection<'a>,
}

impl<'a> ExportAdapter<'a> {
    pub fn new(exporter: &'a dyn Exporter, introspection: Introspection<'a>) -> Self {
        Self {
            exporter,
            introspection,
        }
    }

    /// Exports `shapes` to `output` and returns the text written there.
    ///
    /// A rejection naming a compound triggers exactly one retry over the
    /// re-flattened sequence; the exporter's verdict wins over local
    /// classification, so every element is exploded again.
    pub fn export(
        &self,
        shapes: ShapeSequence,
        base: &str,
        output: &Path,
        tolerances: Tolerances,
    ) -> Result<ExportOutcome, ConvertError> {
        let mut shapes = shapes;
        let mut names = part_names(base, shapes.len());
        let mut retried = false;

        if let Err(message) = self.call(base, &shapes, &names, output, tolerances) {
            if !is_unsupported_container(&message) {
                return Err(ConvertError::Export { message });
            }

            let retry_shapes = flatten(self.introspection, &shapes);
            if retry_shapes.is_empty() {
                return Err(ConvertError::UnsupportedContainer { message });
            }
            warn!(
                before = shapes.len(),
                after = retry_shapes.len(),
                "exporter rejected a compound; retrying with re-flattened shapes"
            );

            shapes = retry_shapes;
            names = part_names(base, shapes.len());
            retried = true;

            self.call(base, &shapes, &names, output, tolerances)
                .map_err(|message| {
                    if is_unsupported_container(&message) {
                        ConvertError::UnsupportedContainer { message }
                    } else {
                        ConvertError::Export { message }
                    }
                })?;
        }

        let text = std::fs::read_to_string(output)
            .map_err(|err| ConvertError::io(format!("read exporter output {output:?}"), err))?;
        info!(
            exporter = self.exporter.name(),
            parts = shapes.len(),
            retried,
            "export finished"
        );

        Ok(ExportOutcome {
            text,
            shapes,
            names,
            retried,
        })
    }

    /// Tolerance-aware call first, parameter-free call on interface mismatch.
    fn call(
        &self,
        base: &str,
        shapes: &[ShapeHandle],
        names: &[String],
        output: &Path,
        tolerances: Tolerances,
    ) -> Result<(), String> {
        let mut call = ExportCall {
            base,
            shapes,
            names,
            output,
            tolerances: Some(tolerances),
        };
        match self.exporter.export(&call) {
            Ok(()) => Ok(()),
            Err(ExporterError::InterfaceMismatch(reason)) => {
                debug!(%reason, "exporter takes no tolerances; calling without");
                call.tolerances = None;
                self.exporter.export(&call).map_err(|err| err.to_string())
            }
            Err(err) => Err(err.to_string()),
        }
    }
}
