use crate::shape::{ShapeHandle, ShapeKind, ShapeSequence};
use crate::topology::{is_container, ExplorerInit, Introspection, TopologyFacility};
use tracing::{debug, warn};

/// Upper bound on flatten passes before export.
pub const MAX_FLATTEN_PASSES: usize = 5;

#[derive(Debug)]
pub struct FlattenOutcome {
    pub shapes: ShapeSequence,
    pub passes: usize,
    /// False when containers were still detected after the last allowed pass.
    pub converged: bool,
}

/// Decomposes one shape into the most specific kind the exporter accepts:
/// solids, then solids of comp-solids, then shells, then faces, then the
/// recursively exploded nested compounds. Returns the shape itself when
/// nothing is found or no facility is available.
pub fn explode(introspection: Introspection<'_>, shape: &ShapeHandle) -> ShapeSequence {
    let Introspection::Available(facility) = introspection else {
        return vec![shape.clone()];
    };

    let solids = collect(facility, shape, ShapeKind::Solid);
    if !solids.is_empty() {
        return solids;
    }

    let nested_solids: ShapeSequence = collect(facility, shape, ShapeKind::CompSolid)
        .iter()
        .flat_map(|comp_solid| collect(facility, comp_solid, ShapeKind::Solid))
        .collect();
    if !nested_solids.is_empty() {
        return nested_solids;
    }

    let shells = collect(facility, shape, ShapeKind::Shell);
    if !shells.is_empty() {
        return shells;
    }

    let faces = collect(facility, shape, ShapeKind::Face);
    if !faces.is_empty() {
        return faces;
    }

    let parts: ShapeSequence = collect(facility, shape, ShapeKind::Compound)
        .iter()
        .filter(|nested| !facility.is_same(nested.as_ref(), shape.as_ref()))
        .flat_map(|nested| explode(introspection, nested))
        .collect();
    if !parts.is_empty() {
        return parts;
    }

    vec![shape.clone()]
}

/// Tries each explorer convention in turn; the first one the facility
/// accepts decides the result. Failures read as "nothing found".
fn collect(facility: &dyn TopologyFacility, shape: &ShapeHandle, kind: ShapeKind) -> ShapeSequence {
    for init in ExplorerInit::ALL {
        match facility.explore(shape, kind, init) {
            Ok(found) => return found,
            Err(err) => debug!(?init, %kind, %err, "explorer convention rejected"),
        }
    }
    Vec::new()
}

pub fn flatten(introspection: Introspection<'_>, shapes: &[ShapeHandle]) -> ShapeSequence {
    shapes
        .iter()
        .flat_map(|shape| explode(introspection, shape))
        .collect()
}

/// Flattens until no shape classifies as a container, at most `max_passes`
/// times. Past the bound the sequence is returned as it stands.
pub fn flatten_to_primitives(
    introspection: Introspection<'_>,
    shapes: ShapeSequence,
    max_passes: usize,
) -> FlattenOutcome {
    let mut shapes = shapes;
    let mut passes = 0;

    loop {
        let containers = shapes
            .iter()
            .filter(|shape| is_container(introspection, shape.as_ref()))
            .count();
        if containers == 0 {
            return FlattenOutcome {
                shapes,
                passes,
                converged: true,
            };
        }
        if passes >= max_passes {
            warn!(passes, containers, "containers remain after flatten bound");
            return FlattenOutcome {
                shapes,
                passes,
                converged: false,
            };
        }

        shapes = flatten(introspection, &shapes);
        passes += 1;
        debug!(pass = passes, containers, shapes = shapes.len(), "flatten pass");
    }
}
