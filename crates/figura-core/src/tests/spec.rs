use crate::models::cell::{CellKind, Organelle};
use crate::models::force::{ForceDirection, Magnitude, SurfaceKind};
use crate::models::generic::GenericElement;
use crate::models::geometry::AngleValue;
use crate::{DiagramSpec, DomainData, DomainTag, Error};
use serde_json::json;

#[test]
fn type_strings_are_normalized() {
    assert_eq!(DomainTag::from_type_str("Function-Graph"), DomainTag::FunctionGraph);
    assert_eq!(DomainTag::from_type_str("  flowchart "), DomainTag::ProcessFlow);
    assert_eq!(DomainTag::from_type_str("free body"), DomainTag::Force);
    assert_eq!(DomainTag::from_type_str("LENS"), DomainTag::Optics);
    assert_eq!(DomainTag::from_type_str("venn"), DomainTag::Generic);
    assert_eq!(DomainTag::from_type_str(""), DomainTag::Generic);
}

#[test]
fn non_object_specs_are_rejected() {
    for value in [json!(null), json!([1, 2]), json!("geometry"), json!(3)] {
        let err = DiagramSpec::from_value(&value).unwrap_err();
        assert!(matches!(err, Error::InvalidSpec { .. }), "{value}");
    }
    let err = DiagramSpec::from_value(&json!({ "type": 5 })).unwrap_err();
    assert!(matches!(err, Error::InvalidSpec { .. }));
}

#[test]
fn missing_data_defaults_to_empty() {
    let spec = DiagramSpec::from_value(&json!({ "type": "geometry", "title": "  " })).unwrap();
    assert_eq!(spec.tag, DomainTag::Geometry);
    assert_eq!(spec.title, None);
    let DomainData::Geometry(data) = spec.data else {
        panic!("expected geometry data");
    };
    assert!(data.points.is_empty());
}

#[test]
fn shape_mismatch_reports_declared_type() {
    let err = DiagramSpec::from_value(&json!({
        "type": "geometry",
        "data": { "points": "ABC" }
    }))
    .unwrap_err();
    match err {
        Error::InvalidData { diagram_type, .. } => assert_eq!(diagram_type, "geometry"),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn geometry_segments_accept_all_forms() {
    let spec = DiagramSpec::from_value(&json!({
        "type": "triangle",
        "data": {
            "points": [
                { "id": "A", "x": 0, "y": 0 },
                { "id": "B", "x": 4, "y": 0 },
                { "id": "A", "x": 9, "y": 9 }
            ],
            "segments": [["A", "B"], "BC", "C-A", { "from": "A", "to": "B", "dashed": true }],
            "angles": [{ "vertex": "A", "value": "90°" }]
        }
    }))
    .unwrap();
    let DomainData::Geometry(data) = spec.data else {
        panic!("expected geometry data");
    };
    let ends: Vec<(&str, &str)> = data
        .segments
        .iter()
        .map(|s| (s.from.as_str(), s.to.as_str()))
        .collect();
    assert_eq!(ends, vec![("A", "B"), ("B", "C"), ("C", "A"), ("A", "B")]);
    assert!(data.segments[3].dashed);

    let index = data.point_index();
    assert_eq!(index.len(), 2);
    assert_eq!(index["A"].x, 0.0);

    assert!(data.angles[0].mark);
    assert!(data.angles[0].value.as_ref().unwrap().is_right_angle());
}

#[test]
fn right_angle_detection() {
    assert!(AngleValue::Number(90.0).is_right_angle());
    assert!(AngleValue::Text(" 90 deg".into()).is_right_angle());
    assert!(AngleValue::Text("90".into()).is_right_angle());
    assert!(!AngleValue::Text("190°".into()).is_right_angle());
    assert!(!AngleValue::Number(89.5).is_right_angle());
    assert!(!AngleValue::Text("θ".into()).is_right_angle());
    assert_eq!(AngleValue::Number(60.0).display(), "60°");
    assert_eq!(AngleValue::Number(22.5).display(), "22.5°");
}

#[test]
fn generic_reads_top_level_when_data_absent() {
    let spec = DiagramSpec::from_value(&json!({
        "type": "poster",
        "description": "A poster",
        "elements": [
            { "type": "rect", "x": 1, "y": 2, "width": 10, "height": 5, "fill": "#eee" },
            { "type": "hexagon", "x": 0 }
        ]
    }))
    .unwrap();
    assert_eq!(spec.tag, DomainTag::Generic);
    assert_eq!(spec.declared_type, "poster");
    let DomainData::Generic(data) = spec.data else {
        panic!("expected generic data");
    };
    assert_eq!(data.width, 400.0);
    assert_eq!(data.description.as_deref(), Some("A poster"));
    assert_eq!(data.elements.len(), 2);
    match &data.elements[0] {
        GenericElement::Rect { width, paint, .. } => {
            assert_eq!(*width, 10.0);
            assert_eq!(paint.fill.as_deref(), Some("#eee"));
        }
        other => panic!("unexpected element {other:?}"),
    }
    assert_eq!(data.elements[1], GenericElement::Unknown);
}

#[test]
fn force_vocabulary() {
    let spec = DiagramSpec::from_value(&json!({
        "type": "force",
        "data": {
            "object": { "type": "ball" },
            "surface": { "type": "inclined plane", "angle": 30 },
            "forces": [
                { "direction": "gravity", "magnitude": "large" },
                { "direction": "tension" },
                { "direction": "sideways", "magnitude": 3 }
            ]
        }
    }))
    .unwrap();
    let DomainData::Force(data) = spec.data else {
        panic!("expected force data");
    };
    assert!(data.object.is_ball());
    assert_eq!(data.surface.kind, SurfaceKind::Incline);
    assert_eq!(data.surface.angle, Some(30.0));
    assert_eq!(data.forces[0].direction, ForceDirection::Down);
    assert_eq!(data.forces[0].magnitude, Magnitude::Large);
    assert_eq!(data.forces[1].direction, ForceDirection::Up);
    assert_eq!(data.forces[1].magnitude, Magnitude::Medium);
    assert_eq!(
        data.forces[2].direction,
        ForceDirection::Unknown("sideways".to_string())
    );
    assert_eq!(data.forces[2].magnitude.arrow_length(), 60.0);
}

#[test]
fn reaction_top_level_forms_single_step() {
    let spec = DiagramSpec::from_value(&json!({
        "type": "chemical_equation",
        "data": { "reactants": ["2H2", "O2"], "products": ["2H2O"], "conditions": ["ignite"] }
    }))
    .unwrap();
    let DomainData::Reaction(data) = spec.data else {
        panic!("expected reaction data");
    };
    let steps = data.effective_steps();
    assert_eq!(steps.len(), 1);
    assert_eq!(steps[0].reactants, vec!["2H2", "O2"]);
    assert_eq!(steps[0].conditions, vec!["ignite"]);
}

#[test]
fn cell_defaults_and_organelle_names() {
    let spec = DiagramSpec::from_value(&json!({ "type": "cell" })).unwrap();
    let DomainData::Cell(data) = spec.data else {
        panic!("expected cell data");
    };
    assert_eq!(data.cell_type, CellKind::Animal);
    assert!(data.show_labels);

    assert_eq!(Organelle::parse("Nucleus"), Some(Organelle::Nucleus));
    assert_eq!(Organelle::parse("ribosomes"), Some(Organelle::Ribosome));
    assert_eq!(Organelle::parse("Golgi apparatus"), Some(Organelle::Golgi));
    assert_eq!(Organelle::parse("cell-wall"), Some(Organelle::CellWall));
    assert_eq!(Organelle::parse("ER"), Some(Organelle::EndoplasmicReticulum));
    assert_eq!(Organelle::parse("flagellum"), None);
    assert!(Organelle::Chloroplast.plant_only());
    assert!(!Organelle::Nucleus.plant_only());
}

#[test]
fn climate_series_allow_gaps() {
    let spec = DiagramSpec::from_value(&json!({
        "type": "climate",
        "data": { "temp": [1.5, null, 4.0], "precip": [10, 20] }
    }))
    .unwrap();
    let DomainData::Climate(data) = spec.data else {
        panic!("expected climate data");
    };
    assert_eq!(data.month_count(), 3);
    assert!(data.temperature[1].is_nan());
    assert_eq!(data.month_label(2), "3");
    assert!(!data.is_empty());
}

#[test]
fn curve_dash_accepts_style_or_flag() {
    let spec = DiagramSpec::from_value(&json!({
        "type": "function",
        "data": {
            "functions": [
                { "expr": "sin(x)", "style": "dashed" },
                { "expr": "cos(x)", "dashed": true },
                { "expr": "x" }
            ]
        }
    }))
    .unwrap();
    let DomainData::FunctionGraph(data) = spec.data else {
        panic!("expected function data");
    };
    let dashed: Vec<bool> = data.functions.iter().map(|f| f.is_dashed()).collect();
    assert_eq!(dashed, vec![true, true, false]);
}

#[test]
fn optics_defaults() {
    let spec = DiagramSpec::from_value(&json!({
        "type": "optics",
        "data": {
            "elements": [
                { "type": "convex_lens", "position": 0 },
                { "type": "object", "x": -20, "height": 4 }
            ]
        }
    }))
    .unwrap();
    let DomainData::Optics(data) = spec.data else {
        panic!("expected optics data");
    };
    assert!(data.show_rays);
    assert_eq!(data.elements[0].focal_magnitude(), 10.0);
    assert_eq!(data.elements[1].position, -20.0);
    assert_eq!(data.elements[1].object_height(), 4.0);
}

#[test]
fn from_json_str_propagates_syntax_errors() {
    assert!(matches!(
        DiagramSpec::from_json_str("{ not json").unwrap_err(),
        Error::Json(_)
    ));
    let spec = DiagramSpec::from_json_str(r#"{"type":"molecule","data":{"smiles":"CCO"}}"#).unwrap();
    assert_eq!(spec.data.tag(), DomainTag::Molecule);
}
