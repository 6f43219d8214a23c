use cadjson_core::backend::ImportBackend;
use cadjson_core::flatten::{flatten_to_primitives, MAX_FLATTEN_PASSES};
use cadjson_core::normalize::normalize;
use cadjson_core::topology::{classify, Introspection};
use cadjson_core::{Imported, ShapeHandle, ShapeKind};
use cadjson_import_step::entity::{parse_entities, Param};
use cadjson_import_step::{StepAssemblyBackend, StepBrepBackend, StepModel, StepShape, StepTopology};
use std::path::PathBuf;

fn fixture() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/bracket.step")
}

fn ids(shapes: &[ShapeHandle]) -> Vec<u64> {
    shapes
        .iter()
        .map(|s| s.as_any().downcast_ref::<StepShape>().expect("step shape").id())
        .collect()
}

#[test]
fn parses_entities_strings_and_lists() {
    let text = std::fs::read_to_string(fixture()).unwrap();
    let table = parse_entities(&text).unwrap();

    let product = table.get(1).unwrap();
    assert_eq!("PRODUCT", product.keyword);
    assert_eq!(Some("Bracket; rev 'A'"), product.params[1].as_str());

    let point = table.get(13).unwrap();
    let Param::List(coords) = &point.params[1] else {
        panic!("expected coordinate list");
    };
    assert_eq!(Some(3.0), coords[2].as_f64());

    let complex = table.get(90).unwrap();
    assert!(complex.keyword.is_empty());
    assert_eq!(vec![60], table.get(70).unwrap().refs());
}

#[test]
fn rejects_non_step_text() {
    assert!(parse_entities("solid cube\nendsolid").is_err());
    assert!(StepModel::from_text("ISO-10303-21;\nHEADER;\nENDSEC;\n").is_err());
}

#[test]
fn rejects_unbalanced_parameter_lists() {
    let text = "ISO-10303-21;\nHEADER;\nENDSEC;\nDATA;\n\
                #1=CARTESIAN_POINT('',(0.,0.,0.)));\nENDSEC;\nEND-ISO-10303-21;\n";
    let err = parse_entities(text).unwrap_err();
    assert!(format!("{err:#}").contains("#1"), "{err:#}");

    let text = "ISO-10303-21;\nDATA;\n#2=VERTEX_POINT('',#1));\nENDSEC;\n";
    assert!(parse_entities(text).is_err());
}

#[test]
fn builds_topology_graph() {
    let model = StepModel::read(&fixture()).unwrap();
    assert_eq!(vec![80, 81], model.roots());
    assert_eq!(ShapeKind::Compound, model.node(80).unwrap().kind);
    assert_eq!(vec![70, 71], model.node(80).unwrap().children);
    assert_eq!(ShapeKind::Solid, model.node(70).unwrap().kind);
    assert_eq!("block", model.node(70).unwrap().label);
    assert!(model.node(82).unwrap().children.is_empty());
    assert_eq!(vec!["Bracket; rev 'A'".to_string()], model.products());
}

#[test]
fn find_includes_matching_root_and_stops_at_matches() {
    let model = StepModel::read(&fixture()).unwrap();
    assert_eq!(vec![70, 71], model.find(80, ShapeKind::Solid));
    assert_eq!(vec![70], model.find(70, ShapeKind::Solid));
    assert_eq!(vec![40, 41], model.find(70, ShapeKind::Face));
    assert_eq!(vec![81, 72], model.find(81, ShapeKind::Compound));
    assert!(model.find(81, ShapeKind::Solid).is_empty());
}

#[test]
fn points_come_from_vertices_only() {
    let model = StepModel::read(&fixture()).unwrap();
    let points = model.points(71);
    assert_eq!(3, points.len());
    assert!(points.contains(&[0.0, 0.0, 3.0]));
    assert!(!points.contains(&[-50.0, -50.0, -50.0]));
}

#[test]
fn brep_backend_returns_representations() {
    let backend = StepBrepBackend { enabled: true };
    let Imported::Many(shapes) = backend.import(&fixture()).unwrap() else {
        panic!("expected a sequence");
    };
    assert_eq!(vec![80, 81], ids(&shapes));
}

#[test]
fn assembly_backend_wraps_products() {
    let backend = StepAssemblyBackend { enabled: true };
    let Imported::Single(asm) = backend.import(&fixture()).unwrap() else {
        panic!("expected an assembly");
    };
    assert_eq!("StepAssembly", asm.type_name());
    assert_eq!(vec![80, 81], ids(&asm.objects().unwrap()));
}

#[test]
fn assembly_backend_falls_back_without_products() {
    let dir = tempfile::tempdir().unwrap();
    let text = std::fs::read_to_string(fixture())
        .unwrap()
        .replace("#1=PRODUCT(", "#1=PRODUCT_CATEGORY(");
    let path = dir.path().join("plain.step");
    std::fs::write(&path, text).unwrap();

    let backend = StepAssemblyBackend { enabled: true };
    assert!(matches!(backend.import(&path).unwrap(), Imported::Many(_)));
}

#[test]
fn missing_file_is_an_import_error() {
    let backend = StepBrepBackend { enabled: true };
    let err = backend.import(&PathBuf::from("does/not/exist.step")).unwrap_err();
    assert!(err.message.contains("read STEP"));
}

#[test]
fn facility_classifies_step_shapes() {
    let topo = StepTopology;
    let intro = Introspection::Available(&topo);
    let model = std::sync::Arc::new(StepModel::read(&fixture()).unwrap());
    let rep = StepShape::handle(&model, 80).unwrap();
    let solid = StepShape::handle(&model, 70).unwrap();
    assert_eq!(ShapeKind::Compound, classify(intro, rep.as_ref()));
    assert_eq!(ShapeKind::Solid, classify(intro, solid.as_ref()));
    assert!(StepShape::handle(&model, 14).is_none());
}

#[test]
fn normalize_expands_assembly_one_level() {
    let imported = StepAssemblyBackend { enabled: true }.import(&fixture()).unwrap();
    let shapes = normalize(imported.into_sequence());
    assert_eq!(vec![80, 81], ids(&shapes));
}

#[test]
fn normalize_and_flatten_reach_primitives() {
    let topo = StepTopology;
    let intro = Introspection::Available(&topo);
    let imported = StepBrepBackend { enabled: true }.import(&fixture()).unwrap();

    let shapes = normalize(imported.into_sequence());
    // The brep compound offers its solids; the surface model has none.
    assert_eq!(vec![70, 71, 81], ids(&shapes));

    let outcome = flatten_to_primitives(intro, shapes, MAX_FLATTEN_PASSES);
    assert!(outcome.converged);
    assert_eq!(1, outcome.passes);
    assert_eq!(vec![70, 71, 62], ids(&outcome.shapes));
}
