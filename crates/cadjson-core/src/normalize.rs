use crate::shape::ShapeSequence;
use tracing::debug;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NormalizeStats {
    pub expanded_containers: usize,
    pub expanded_solids: usize,
    pub enumeration_failures: usize,
}

pub fn normalize(shapes: ShapeSequence) -> ShapeSequence {
    normalize_with_stats(shapes).0
}

/// Expands containers one level deep, preserving order.
///
/// A shape with non-empty `objects()` is replaced by those objects. Failing
/// that, a shape whose `solids()` yields something is replaced by its solids.
/// Anything else, including shapes whose enumeration fails, is kept as is.
pub fn normalize_with_stats(shapes: ShapeSequence) -> (ShapeSequence, NormalizeStats) {
    let mut stats = NormalizeStats::default();
    let mut out = Vec::with_capacity(shapes.len());

    for shape in shapes {
        if let Some(objects) = shape.objects() {
            if !objects.is_empty() {
                stats.expanded_containers += 1;
                out.extend(objects);
                continue;
            }
        }

        match shape.solids() {
            Some(Ok(solids)) if !solids.is_empty() => {
                stats.expanded_solids += 1;
                out.extend(solids);
                continue;
            }
            Some(Err(err)) => {
                stats.enumeration_failures += 1;
                debug!(shape = shape.type_name(), %err, "solid enumeration failed; keeping shape");
            }
            _ => {}
        }

        out.push(shape);
    }

    (out, stats)
}
