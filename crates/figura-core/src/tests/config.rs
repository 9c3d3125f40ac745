use crate::{Error, FiguraConfig};
use serde_json::json;

#[test]
fn dotted_getters() {
    let cfg = FiguraConfig::from_value(json!({
        "canvas": { "optics": { "width": 500 } },
        "fontFamily": "serif",
        "debug": true
    }));
    assert_eq!(cfg.get_f64("canvas.optics.width"), Some(500.0));
    assert_eq!(cfg.get_f64("canvas.optics.height"), None);
    assert_eq!(cfg.get_str("fontFamily"), Some("serif"));
    assert_eq!(cfg.get_bool("debug"), Some(true));
    assert_eq!(cfg.get_str("canvas.optics"), None);
}

#[test]
fn set_value_creates_intermediate_objects() {
    let mut cfg = FiguraConfig::default();
    cfg.set_value("canvas.cell.height", json!(320));
    cfg.set_value("stroke", json!("#000"));
    assert_eq!(
        cfg.as_value(),
        &json!({ "canvas": { "cell": { "height": 320 } }, "stroke": "#000" })
    );

    let mut odd = FiguraConfig::from_value(json!([1, 2]));
    odd.set_value("padding", json!(12));
    assert_eq!(odd.get_f64("padding"), Some(12.0));
}

#[test]
fn deep_merge_overrides_leaves_only() {
    let mut cfg = FiguraConfig::from_value(json!({
        "canvas": { "optics": { "width": 420, "height": 240 } },
        "fontSize": 12
    }));
    cfg.deep_merge(&json!({ "canvas": { "optics": { "width": 600 } }, "idPrefix": "lesson" }));
    assert_eq!(cfg.get_f64("canvas.optics.width"), Some(600.0));
    assert_eq!(cfg.get_f64("canvas.optics.height"), Some(240.0));
    assert_eq!(cfg.get_f64("fontSize"), Some(12.0));
    assert_eq!(cfg.get_str("idPrefix"), Some("lesson"));
}

#[test]
fn yaml_and_json_load() {
    let cfg = FiguraConfig::from_yaml_str(
        "canvas:\n  geometry:\n    width: 480\nsampleCount: 600\n",
    )
    .unwrap();
    assert_eq!(cfg.get_f64("canvas.geometry.width"), Some(480.0));
    assert_eq!(cfg.get_f64("sampleCount"), Some(600.0));

    let cfg = FiguraConfig::from_yaml_str(r#"{"idPrefix": "q"}"#).unwrap();
    assert_eq!(cfg.get_str("idPrefix"), Some("q"));

    assert_eq!(FiguraConfig::from_yaml_str("  \n").unwrap(), FiguraConfig::default());
}

#[test]
fn yaml_scalar_root_is_rejected() {
    let err = FiguraConfig::from_yaml_str("42").unwrap_err();
    assert!(matches!(err, Error::Config { .. }));
    assert!(err.to_string().starts_with("Invalid config:"));
}
