use figura_core::models::climate::ClimateData;
use figura_core::models::process_flow::{FlowEdge, FlowNode};
use figura_render::capability::{
    ClimateCharting, CollaboratorError, FlowLayoutEngine, MoleculeDrawer, MoleculeDrawing, Surface,
};
use figura_render::{Collaborators, RenderContext, Rendered, render_value};
use serde_json::{Value, json};
use std::path::PathBuf;
use std::sync::Arc;

fn workspace_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
}

fn read_fixture(name: &str) -> Value {
    let path = workspace_root().join("fixtures").join("specs").join(name);
    let text = std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("failed to read fixture {}: {e}", path.display()));
    serde_json::from_str(&text).expect("fixture is valid JSON")
}

fn svg_of(rendered: &Rendered) -> String {
    match rendered {
        Rendered::Svg(doc) => doc.to_svg_string(),
        other => panic!("expected an svg, got {other:?}"),
    }
}

fn has_class(node: roxmltree::Node<'_, '_>, class: &str) -> bool {
    node.attribute("class")
        .is_some_and(|c| c.split_whitespace().any(|c| c == class))
}

fn count_class(svg: &str, class: &str) -> usize {
    let doc = roxmltree::Document::parse(svg).expect("svg parses");
    doc.descendants().filter(|n| has_class(*n, class)).count()
}

#[test]
fn every_domain_renders_well_formed_svg() {
    let ctx = RenderContext::default();
    let specs = [
        json!({"type": "geometry", "data": {"points": [{"id": "A", "x": 0, "y": 0}, {"id": "B", "x": 3, "y": 1}], "segments": ["AB"]}}),
        json!({"type": "function", "data": {"functions": [{"expr": "x^2 - 1"}]}}),
        json!({"type": "vector", "data": {"vectors": [{"to": [2, 3], "label": "v"}], "lines": [{"slope": 1, "intercept": 0}]}}),
        json!({"type": "force", "data": {"object": {"type": "block"}, "surface": {"type": "incline", "angle": 30}, "forces": [{"direction": "gravity", "label": "G"}, {"direction": "normal"}]}}),
        json!({"type": "circuit", "data": {"components": [{"type": "battery"}, {"type": "resistor", "label": "R1"}, {"type": "bulb"}]}}),
        json!({"type": "optics", "data": {"elements": [{"type": "object", "position": -30, "height": 3}, {"type": "convex_lens", "position": 0, "focalLength": 10}]}}),
        json!({"type": "molecule", "data": {"smiles": "CC(=O)O", "name": "Acetic acid"}}),
        json!({"type": "reaction", "data": {"reactants": ["CH4", "2O2"], "products": ["CO2", "2H2O"], "conditions": ["ignite"]}}),
        json!({"type": "apparatus", "data": {"equipment": [{"type": "flask", "content": "KMnO4"}, {"type": "tube"}, {"type": "gas_jar"}]}}),
        json!({"type": "cell", "data": {"cellType": "animal", "structures": ["nucleus", "mitochondria"], "showLabels": true}}),
        json!({"type": "flow", "data": {"nodes": [{"id": "a", "text": "Evaporate"}, {"id": "b", "text": "Condense"}]}}),
        json!({"type": "climate", "data": {"city": "Lima", "temperature": [22, 23, 22], "precipitation": [1, 0, 2]}}),
        json!({"type": "sketch", "data": {"elements": [{"type": "rect", "x": 10, "y": 10, "width": 40, "height": 20}]}}),
    ];
    for spec in &specs {
        let rendered = render_value(spec, &ctx);
        let svg = svg_of(&rendered);
        roxmltree::Document::parse(&svg)
            .unwrap_or_else(|e| panic!("{} produced malformed svg: {e}", spec["type"]));
    }
}

#[test]
fn right_angle_marks_get_a_bracket_not_an_arc() {
    let ctx = RenderContext::default();
    let svg = svg_of(&render_value(
        &read_fixture("geometry_right_triangle.json"),
        &ctx,
    ));
    assert_eq!(count_class(&svg, "angle-right"), 1);
    assert_eq!(count_class(&svg, "angle-arc"), 1);
    assert!(svg.contains("37°"));
    assert!(svg.contains("<title>Right triangle ABC</title>"));
}

fn angle_straddling_positive_x(points: [&str; 3]) -> String {
    let spec = json!({
        "type": "geometry",
        "data": {
            "points": [{"id": "A", "x": 0, "y": 0}, {"id": "B", "x": 4, "y": 0}, {"id": "C", "x": 4, "y": 3}],
            "segments": ["AB", "BC", "CA"],
            "angles": [{"vertex": "A", "value": 37, "points": points}]
        }
    });
    svg_of(&render_value(&spec, &RenderContext::default()))
}

#[test]
fn acute_angle_next_to_the_x_axis_gets_the_short_arc() {
    for arms in [["B", "A", "C"], ["C", "A", "B"]] {
        let svg = angle_straddling_positive_x(arms);
        let doc = roxmltree::Document::parse(&svg).unwrap();
        let arc = doc
            .descendants()
            .find(|n| has_class(*n, "angle-arc"))
            .and_then(|n| n.attribute("d"))
            .expect("angle arc");
        let flags: Vec<&str> = arc.split_whitespace().collect();
        // M x y Arx ry rotation large sweep x y
        assert_eq!(flags[5], "0", "large-arc flag in {arc}");

        let vertex = doc
            .descendants()
            .find(|n| has_class(*n, "point"))
            .expect("point A");
        let (vx, vy) = (
            vertex.attribute("cx").unwrap().parse::<f64>().unwrap(),
            vertex.attribute("cy").unwrap().parse::<f64>().unwrap(),
        );
        let label = doc
            .descendants()
            .find(|n| has_class(*n, "angle-label"))
            .expect("angle label");
        let (lx, ly) = (
            label.attribute("x").unwrap().parse::<f64>().unwrap(),
            label.attribute("y").unwrap().parse::<f64>().unwrap(),
        );
        // Bisector of a 37 degree angle opening up-right from +x.
        assert!(lx > vx && ly < vy, "label ({lx}, {ly}) outside angle at ({vx}, {vy})");
        assert!((vy - ly) < (lx - vx), "label above the bisector");
    }
}

#[test]
fn dangling_references_are_skipped() {
    let ctx = RenderContext::default();
    let spec = json!({
        "type": "geometry",
        "data": {
            "points": [{"id": "A", "x": 0, "y": 0}, {"id": "B", "x": 2, "y": 0}],
            "segments": ["AB", "BZ", "QA"],
            "angles": [{"vertex": "Z", "value": 40}],
            "circles": [{"center": "Y", "radius": 1}]
        }
    });
    let rendered = render_value(&spec, &ctx);
    let svg = svg_of(&rendered);
    let doc = roxmltree::Document::parse(&svg).unwrap();
    let segments = doc
        .descendants()
        .find(|n| has_class(*n, "segments"))
        .expect("segments group");
    assert_eq!(segments.children().filter(|n| n.is_element()).count(), 1);
    assert_eq!(count_class(&svg, "angle"), 0);
}

#[test]
fn reciprocal_curve_is_clipped_and_finite() {
    let ctx = RenderContext::default();
    let spec = json!({
        "type": "function",
        "data": {
            "xRange": [-4, 4],
            "yRange": [-5, 5],
            "functions": [{"expr": "1/x"}, {"expr": "sqrt(x)"}]
        }
    });
    let svg = svg_of(&render_value(&spec, &ctx));
    let doc = roxmltree::Document::parse(&svg).unwrap();
    assert!(doc.descendants().any(|n| n.has_tag_name("clipPath")));
    for path in doc.descendants().filter(|n| n.has_tag_name("path")) {
        let d = path.attribute("d").unwrap_or_default();
        assert!(!d.contains("NaN") && !d.contains("inf"), "non-finite path data: {d}");
    }
    assert!(count_class(&svg, "curve") >= 2);
}

fn curve_runs(expr: &str, x_range: [f64; 2]) -> usize {
    let spec = json!({
        "type": "function",
        "data": {"xRange": x_range, "functions": [{"expr": expr}]}
    });
    let svg = svg_of(&render_value(&spec, &RenderContext::default()));
    let doc = roxmltree::Document::parse(&svg).unwrap();
    let d = doc
        .descendants()
        .find(|n| has_class(*n, "curve"))
        .and_then(|n| n.attribute("d"))
        .expect("curve path")
        .to_string();
    d.matches('M').count()
}

#[test]
fn poles_break_the_curve_without_a_y_range() {
    assert_eq!(curve_runs("1/x", [-4.0, 4.0]), 2);
    assert_eq!(curve_runs("tan(x)", [-6.28, 6.28]), 5);
    assert_eq!(curve_runs("x^2 - 3", [-4.0, 4.0]), 1);
}

#[test]
fn tangent_fixture_draws_asymptotes() {
    let ctx = RenderContext::default();
    let svg = svg_of(&render_value(&read_fixture("function_tan.json"), &ctx));
    let doc = roxmltree::Document::parse(&svg).unwrap();
    let asymptotes = doc
        .descendants()
        .find(|n| has_class(*n, "asymptotes"))
        .expect("asymptote group");
    assert_eq!(asymptotes.children().filter(|n| n.is_element()).count(), 4);

    let dashes: Vec<bool> = doc
        .descendants()
        .filter(|n| has_class(*n, "curve"))
        .map(|n| n.attribute("stroke-dasharray").is_some())
        .collect();
    assert_eq!(dashes, vec![false, true]);
}

#[test]
fn invalid_expressions_do_not_break_the_graph() {
    let ctx = RenderContext::default();
    let spec = json!({
        "type": "function",
        "data": {"functions": [{"expr": "x +* 2"}, {"expr": "cos(x)"}]}
    });
    let rendered = render_value(&spec, &ctx);
    assert!(!rendered.is_placeholder());
    assert_eq!(count_class(&svg_of(&rendered), "curve"), 1);
}

#[test]
fn convex_lens_at_twice_focal_length_forms_real_inverted_image() {
    let ctx = RenderContext::default();
    let svg = svg_of(&render_value(&read_fixture("optics_convex.json"), &ctx));
    assert_eq!(count_class(&svg, "image-real"), 1);
    assert_eq!(count_class(&svg, "image-virtual"), 0);
    assert!(svg.contains("A'"));
    assert!(count_class(&svg, "rays") == 1);
}

#[test]
fn object_inside_focal_length_forms_virtual_image() {
    let ctx = RenderContext::default();
    let spec = json!({
        "type": "optics",
        "data": {"elements": [
            {"type": "object", "position": -5, "height": 2},
            {"type": "convex_lens", "position": 0, "focalLength": 10}
        ]}
    });
    let svg = svg_of(&render_value(&spec, &ctx));
    assert_eq!(count_class(&svg, "image-virtual"), 1);
}

#[test]
fn object_at_focal_point_draws_no_image() {
    let ctx = RenderContext::default();
    let spec = json!({
        "type": "optics",
        "data": {"elements": [
            {"type": "object", "position": -10, "height": 2},
            {"type": "convex_lens", "position": 0, "focalLength": 10}
        ]}
    });
    let rendered = render_value(&spec, &ctx);
    let svg = svg_of(&rendered);
    assert_eq!(count_class(&svg, "image"), 0);
}

struct FailingDrawer;

impl MoleculeDrawer for FailingDrawer {
    fn render(
        &self,
        _notation: &str,
        _name: Option<&str>,
        _surface: &Surface,
    ) -> Result<MoleculeDrawing, CollaboratorError> {
        Err(CollaboratorError::new("toolkit crashed").with_fallback_text("Structure unavailable"))
    }
}

struct SvgDrawer;

impl MoleculeDrawer for SvgDrawer {
    fn render(
        &self,
        notation: &str,
        _name: Option<&str>,
        surface: &Surface,
    ) -> Result<MoleculeDrawing, CollaboratorError> {
        Ok(MoleculeDrawing::Svg(format!(
            r#"<svg id="{}" data-smiles="{notation}"></svg>"#,
            surface.id
        )))
    }
}

struct AbsentDrawer;

impl MoleculeDrawer for AbsentDrawer {
    fn present(&self) -> bool {
        false
    }

    fn render(
        &self,
        _notation: &str,
        _name: Option<&str>,
        _surface: &Surface,
    ) -> Result<MoleculeDrawing, CollaboratorError> {
        panic!("an absent drawer is never called")
    }
}

fn ethanol() -> Value {
    json!({"type": "molecule", "data": {"smiles": "CCO", "name": "Ethanol"}})
}

#[test]
fn failing_molecule_drawer_falls_back_to_skeleton_with_note() {
    let ctx = RenderContext::default()
        .with_collaborators(Collaborators::none().with_molecule(Arc::new(FailingDrawer)));
    let rendered = render_value(&ethanol(), &ctx);
    let svg = svg_of(&rendered);
    assert!(svg.contains("Structure unavailable"));
    assert!(svg.contains("Ethanol"));
}

#[test]
fn molecule_drawer_markup_passes_through() {
    let ctx = RenderContext::default()
        .with_collaborators(Collaborators::none().with_molecule(Arc::new(SvgDrawer)));
    match render_value(&ethanol(), &ctx) {
        Rendered::Markup(markup) => assert!(markup.contains(r#"data-smiles="CCO""#)),
        other => panic!("expected markup, got {other:?}"),
    }
}

#[test]
fn absent_molecule_drawer_is_not_consulted() {
    let ctx = RenderContext::default()
        .with_collaborators(Collaborators::none().with_molecule(Arc::new(AbsentDrawer)));
    assert!(render_value(&ethanol(), &ctx).as_svg().is_some());
}

#[test]
fn unknown_type_without_primitives_becomes_a_description() {
    let ctx = RenderContext::default();
    let rendered = render_value(&json!({"type": "timeline", "title": "Key dates"}), &ctx);
    assert_eq!(rendered, Rendered::Description("Key dates".to_string()));
    assert!(rendered.to_markup().contains("figura-description"));

    let rendered = render_value(&json!({"type": "timeline"}), &ctx);
    assert_eq!(
        rendered,
        Rendered::Description("Diagram: timeline".to_string())
    );
}

#[test]
fn unknown_type_with_primitives_draws_them() {
    let ctx = RenderContext::default();
    let spec = json!({
        "type": "venn",
        "data": {"elements": [
            {"type": "circle", "cx": 100, "cy": 100, "r": 50, "label": "A"},
            {"type": "circle", "cx": 160, "cy": 100, "r": 50, "label": "B"},
            {"type": "star", "x": 1}
        ]}
    });
    let svg = svg_of(&render_value(&spec, &ctx));
    assert!(svg.contains("figura-generic"));
    let doc = roxmltree::Document::parse(&svg).unwrap();
    assert_eq!(doc.descendants().filter(|n| n.has_tag_name("circle")).count(), 2);
}

#[test]
fn missing_data_becomes_a_placeholder() {
    let ctx = RenderContext::default();
    for spec in [
        json!({"type": "circuit", "data": {"components": []}}),
        json!({"type": "apparatus", "data": {}}),
        json!({"type": "molecule", "data": {"smiles": "  "}}),
        json!({"type": "flow", "data": {"nodes": []}}),
        json!({"type": "climate"}),
    ] {
        let rendered = render_value(&spec, &ctx);
        assert!(rendered.is_placeholder(), "{} should not render", spec["type"]);
        assert!(rendered.to_markup().contains("figura-error"));
    }
}

#[test]
fn malformed_specs_become_placeholders() {
    let ctx = RenderContext::default();
    assert!(render_value(&json!([1, 2]), &ctx).is_placeholder());
    assert!(render_value(&json!({"type": 7}), &ctx).is_placeholder());
    assert!(render_value(&json!({"type": "geometry", "data": {"points": "AB"}}), &ctx).is_placeholder());
}

#[test]
fn reaction_height_grows_with_steps() {
    let ctx = RenderContext::default();
    let spec = json!({
        "type": "reaction",
        "data": {"steps": [
            {"reactants": ["N2", "3H2"], "products": ["2NH3"], "reversible": true},
            {"reactants": ["2NH3"], "products": ["N2", "3H2"]},
            {"reactants": ["H2"], "products": ["2H"]}
        ]}
    });
    let rendered = render_value(&spec, &ctx);
    let doc = rendered.as_svg().expect("svg");
    assert_eq!(doc.height, 200.0);
    assert!(doc.to_svg_string().contains(r#"baseline-shift="sub""#));
}

#[test]
fn ids_are_unique_across_documents() {
    let ctx = RenderContext::default();
    let spec = read_fixture("function_tan.json");
    let mut ids = Vec::new();
    for _ in 0..3 {
        let svg = svg_of(&render_value(&spec, &ctx));
        let doc = roxmltree::Document::parse(&svg).unwrap();
        ids.extend(
            doc.descendants()
                .filter_map(|n| n.attribute("id"))
                .map(str::to_string),
        );
    }
    let mut unique = ids.clone();
    unique.sort();
    unique.dedup();
    assert_eq!(ids.len(), unique.len(), "duplicate ids: {ids:?}");
    assert!(ids.iter().all(|id| id.starts_with("figura-")));
}

#[test]
fn highlighted_organelles_use_highlight_paint() {
    let ctx = RenderContext::default();
    let spec = json!({
        "type": "cell",
        "data": {"cellType": "plant", "structures": ["nucleus", "chloroplast"], "highlight": ["nucleus"]}
    });
    let svg = svg_of(&render_value(&spec, &ctx));
    let doc = roxmltree::Document::parse(&svg).unwrap();
    let nucleus = doc
        .descendants()
        .find(|n| has_class(*n, "organelle-nucleus"))
        .expect("nucleus");
    assert!(
        nucleus
            .descendants()
            .any(|n| n.attribute("fill") == Some(figura_render::DEFAULT_HIGHLIGHT_FILL))
    );
    assert_eq!(count_class(&svg, "organelle-chloroplast"), 1);
    assert_eq!(count_class(&svg, "organelle-cell-wall"), 1);
}

fn boxed_part<'a, 'input>(
    doc: &'a roxmltree::Document<'input>,
    class: &str,
) -> roxmltree::Node<'a, 'input> {
    let part = doc
        .descendants()
        .find(|n| has_class(*n, class))
        .unwrap_or_else(|| panic!("no element with class {class}"));
    assert!(
        part.descendants().any(|n| n.has_tag_name("rect")),
        "{class} is not boxed"
    );
    part
}

#[test]
fn unknown_circuit_component_is_a_labelled_box() {
    let spec = json!({
        "type": "circuit",
        "data": {"components": [{"type": "battery"}, {"type": "flux_capacitor"}, {"type": "bulb"}]}
    });
    let svg = svg_of(&render_value(&spec, &RenderContext::default()));
    let doc = roxmltree::Document::parse(&svg).unwrap();
    assert_eq!(count_class(&svg, "component"), 3);
    let part = boxed_part(&doc, "component-other");
    let text: String = part
        .descendants()
        .filter(|n| n.is_text())
        .filter_map(|n| n.text())
        .collect();
    assert_eq!(text, "flux_cap");
}

#[test]
fn unknown_apparatus_item_is_a_labelled_box() {
    let spec = json!({
        "type": "apparatus",
        "data": {"equipment": [{"type": "beaker"}, {"type": "spectrometer"}]}
    });
    let svg = svg_of(&render_value(&spec, &RenderContext::default()));
    let doc = roxmltree::Document::parse(&svg).unwrap();
    assert_eq!(count_class(&svg, "equipment-item"), 2);
    let part = boxed_part(&doc, "equipment-other");
    assert!(
        part.descendants()
            .any(|n| n.text() == Some("spectromet")),
        "truncated kind shown in the box"
    );
}

#[test]
fn unknown_force_direction_draws_nothing() {
    let spec = json!({
        "type": "force",
        "data": {
            "object": {"type": "block"},
            "surface": {"type": "incline", "angle": 25},
            "forces": [
                {"direction": "gravity"},
                {"direction": "sideways", "label": "Q"},
                {"direction": "normal"}
            ]
        }
    });
    let svg = svg_of(&render_value(&spec, &RenderContext::default()));
    let doc = roxmltree::Document::parse(&svg).unwrap();
    let labels: Vec<&str> = doc
        .descendants()
        .filter(|n| has_class(*n, "force-label"))
        .filter_map(|n| n.text())
        .collect();
    assert_eq!(labels, vec!["G", "N"]);
    let forces = doc
        .descendants()
        .find(|n| has_class(*n, "forces"))
        .expect("forces group");
    assert_eq!(
        forces.children().filter(|n| has_class(*n, "arrow")).count(),
        2
    );
}

struct FailingLayout;

impl FlowLayoutEngine for FailingLayout {
    fn render(
        &self,
        _nodes: &[FlowNode],
        _edges: &[FlowEdge],
        _surface: &Surface,
    ) -> Result<String, CollaboratorError> {
        Err(CollaboratorError::new("layout backend offline"))
    }
}

fn three_step_flow() -> Value {
    json!({
        "type": "flow",
        "data": {
            "nodes": [{"id": "a", "text": "Heat"}, {"id": "b", "text": "Boil"}, {"id": "c", "text": "Cool"}],
            "edges": [
                {"from": "a", "to": "b"},
                {"from": "b", "to": "ghost"},
                {"from": "nowhere", "to": "c"},
                {"from": "b", "to": "c", "label": "slowly"}
            ]
        }
    })
}

#[test]
fn failing_flow_layout_falls_back_to_rows() {
    let ctx = RenderContext::default()
        .with_collaborators(Collaborators::none().with_flow(Arc::new(FailingLayout)));
    let svg = svg_of(&render_value(&three_step_flow(), &ctx));
    assert_eq!(count_class(&svg, "flow-node"), 3);
}

#[test]
fn dangling_flow_edges_are_skipped() {
    let svg = svg_of(&render_value(&three_step_flow(), &RenderContext::default()));
    let doc = roxmltree::Document::parse(&svg).unwrap();
    let edges = doc
        .descendants()
        .find(|n| has_class(*n, "edges"))
        .expect("edges group");
    assert_eq!(edges.children().filter(|n| has_class(*n, "arrow")).count(), 2);
    assert_eq!(count_class(&svg, "edge-label"), 1);
}

struct PanickingCharts;

impl ClimateCharting for PanickingCharts {
    fn render(&self, _series: &ClimateData, _surface: &Surface) -> String {
        panic!("chart backend crashed");
    }
}

#[test]
fn panicking_collaborator_becomes_a_placeholder() {
    let ctx = RenderContext::default()
        .with_collaborators(Collaborators::none().with_climate(Arc::new(PanickingCharts)));
    let climate = json!({"type": "climate", "data": {"temperature": [5, 9, 14], "precipitation": [40, 35, 30]}});
    let rendered = render_value(&climate, &ctx);
    assert!(rendered.is_placeholder());
    assert!(rendered.to_markup().contains("figura-error"));
    assert!(rendered.to_markup().contains("internal error"));

    let sibling = render_value(&read_fixture("optics_convex.json"), &ctx);
    assert!(matches!(sibling, Rendered::Svg(_)));
}
