//! Contract Invariant Tests
//!
//! These tests verify the guarantees the device and Home Assistant rely on.

use serde_json::{json, Value};

use openhasp_plates::{
    automation::{ButtonMatrixRules, Condition, MatrixAction},
    hashing::sha256_hex,
    styling::{Part, State},
    widgets::{ButtonMatrix, Label, Roller, Tab, TabView},
    Generator, GridLayout, Placement, Plate, PlateError, PlateRegistry, StyleEntry, Theme,
    Widget, color,
};

fn plate(name: &str) -> Plate {
    let mut plate = Plate::new(name, 240, 320);
    plate.page(GridLayout::new(12, 16), "Page Zero").unwrap();
    plate
}

fn lines(jsonl: &str) -> Vec<Value> {
    jsonl
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect()
}

#[test]
fn invariant_ids_strictly_increase_from_one() {
    let mut plate = plate("office");
    let mut ids = vec![];
    for n in 0..5 {
        if n == 3 {
            plate.page(GridLayout::new(4, 4), "Page One").unwrap();
        }
        // geometry or not, every add takes the next id
        let placement = if n % 2 == 0 {
            Placement::grid(0.0, 0.0, 1.0, 1.0)
        } else {
            Placement::none()
        };
        ids.push(plate.place(Label::new("x"), placement).unwrap().id);
    }
    assert_eq!(ids, vec![1, 2, 3, 4, 5]);
}

#[test]
fn invariant_unit_cell_at_origin() {
    let mut plate = Plate::new("wide", 800, 480);
    plate.page(GridLayout::new(7, 3), "Only").unwrap();
    let widget = plate
        .add(Label::new("x").into(), Placement::grid(0.0, 0.0, 1.0, 1.0))
        .unwrap();
    // 800 / 7 = 114.28.., 480 / 3 = 160
    assert_eq!(
        (widget.fields.x, widget.fields.y, widget.fields.w, widget.fields.h),
        (0, 0, 114, 160)
    );
}

#[test]
fn invariant_later_override_wins() {
    let mut plate = plate("office");
    let widget = Widget::from(Label::new("x"))
        .style(StyleEntry::new().bg_color(color("#111111").unwrap()))
        .style(StyleEntry::new().bg_color(color("#222222").unwrap()));
    plate.add(widget, Placement::none()).unwrap();

    let docs = plate.documents().unwrap();
    assert_eq!(docs[1]["bg_color"], "#222222");
}

#[test]
fn invariant_descriptor_suffix() {
    let mut plate = plate("office");
    let white = color("#ffffff").unwrap();
    let widget = Widget::from(ButtonMatrix::new(["a", "b"]))
        .style(
            StyleEntry::new()
                .part(Part::Items)
                .state(State::Toggled)
                .bg_color(white),
        )
        .style(
            StyleEntry::new()
                .part(Part::Main)
                .state(State::Default)
                .bg_color(white),
        );
    plate.add(widget, Placement::none()).unwrap();

    let doc = &plate.documents().unwrap()[1];
    assert_eq!(doc["bg_color41"], "#ffffff");
    assert_eq!(doc["bg_color"], "#ffffff");
}

#[test]
fn invariant_theme_profile_resolved_before_overrides() {
    let theme = Theme::new("t")
        .profile(
            "card",
            vec![
                StyleEntry::new().radius(8).bg_opa(255),
                StyleEntry::new().part(Part::Knob).bg_opa(0),
            ],
        );
    let mut plate = plate("office").with_theme(theme);
    let widget = Widget::from(Label::new("x"))
        .use_profile("card")
        .style(StyleEntry::new().bg_opa(128));
    plate.add(widget, Placement::none()).unwrap();

    let doc = &plate.documents().unwrap()[1];
    assert_eq!(doc["radius"], 8);
    assert_eq!(doc["bg_opa"], 128);
    assert_eq!(doc["bg_opa20"], 0);
}

#[test]
fn invariant_roller_value_is_a_second_document() {
    let mut plate = plate("office");
    let mut roller = Roller::new(["60 °F", "61 °F"]);
    roller.val = Some(1);
    plate
        .add(roller.into(), Placement::grid(0.0, 0.0, 3.0, 1.0))
        .unwrap();

    let docs = lines(&plate.jsonl().unwrap());
    assert_eq!(docs.len(), 3);
    assert_eq!(docs[1]["options"], "60 °F\n61 °F");
    assert!(docs[1].get("val").is_none());
    assert_eq!(docs[2], json!({"obj": "roller", "id": 1, "val": 1}));
}

#[test]
fn invariant_tabs_never_carry_size() {
    let mut plate = plate("office");
    let tabs = plate
        .place(TabView::default(), Placement::grid(0.0, 0.0, 12.0, 16.0))
        .unwrap();
    plate
        .place(
            Widget::from(Tab::new("home")).parent(tabs.id),
            Placement::grid(0.0, 0.0, 12.0, 16.0),
        )
        .unwrap();

    for doc in &plate.documents().unwrap()[1..] {
        assert!(doc.get("w").is_none(), "{}", doc);
        assert!(doc.get("h").is_none(), "{}", doc);
        assert_eq!(doc["x"], 0);
    }
}

#[test]
fn invariant_button_matrix_rules_gate_on_release_per_index() {
    let mut plate = plate("office");
    let matrix = plate
        .place(ButtonMatrix::new(["a", "b", "\n", "c"]), Placement::none())
        .unwrap();
    let rules = ["scene.work", "scene.home", "scene.sleep"]
        .into_iter()
        .fold(ButtonMatrixRules::new("Scenes", matrix), |rules, scene| {
            rules.button(MatrixAction::new("scene.turn_on").entity(scene))
        });
    plate.add_automation(rules);

    let rules = plate.rules();
    assert_eq!(rules.len(), 3);
    for (index, rule) in rules.iter().enumerate() {
        let Condition::Template { value_template } = &rule.condition[0];
        assert!(value_template.contains("trigger.payload_json['event'] == 'up'"));
        assert!(value_template.contains(&format!("trigger.payload_json['val'] == {} ", index)));
        assert_eq!(rule.id, format!("office_press_p0b1-{}-0", index));
    }
}

#[test]
fn invariant_plates_keep_order_and_scope_ids() {
    let mut registry = PlateRegistry::new();
    for name in ["second", "first"] {
        let plate = registry.create(name, 240, 320).unwrap();
        plate.page(GridLayout::new(12, 16), name).unwrap();
        plate.place(Label::new("a"), Placement::none()).unwrap();
        plate.place(Label::new("b"), Placement::none()).unwrap();
    }

    let jsonl = registry.jsonl().unwrap();
    let names: Vec<_> = jsonl.iter().map(|(name, _)| name.as_str()).collect();
    assert_eq!(names, vec!["second", "first"]);
    for (_, stream) in &jsonl {
        let ids: Vec<_> = lines(stream).iter().filter_map(|d| d["id"].as_u64()).collect();
        assert_eq!(ids, vec![1, 2]);
    }
}

#[test]
fn invariant_duplicate_plate_rejected() {
    let mut registry = PlateRegistry::new();
    registry.register(plate("office")).unwrap();
    let err = registry.register(plate("office")).unwrap_err();
    assert!(matches!(err, PlateError::DuplicatePlate(_)));
}

#[test]
fn invariant_unknown_profile_falls_back_to_default() {
    let theme = Theme::new("t").profile("default", vec![StyleEntry::new().radius(3)]);
    let mut plate = plate("office").with_theme(theme);
    plate
        .add(
            Widget::from(Label::new("x")).use_profile("no-such-profile"),
            Placement::none(),
        )
        .unwrap();
    assert_eq!(plate.documents().unwrap()[1]["radius"], 3);
}

#[test]
fn invariant_generated_files_match_manifest() {
    let mut registry = PlateRegistry::new();
    let plate = registry.create("office", 240, 320).unwrap();
    plate.page(GridLayout::new(12, 16), "Home").unwrap();
    plate
        .add(Label::new("t").into(), Placement::grid(0.0, 0.0, 6.0, 1.0))
        .unwrap()
        .binding_mut()
        .inherit_value_from("text", "sensor.temperature", "value");

    let dir = tempfile::tempdir().unwrap();
    let files = Generator::new().validating().generate(&registry).unwrap();
    let manifest = files.write_to(dir.path()).unwrap();

    assert_eq!(manifest.outputs.len(), 3);
    for output in &manifest.outputs {
        let written = std::fs::read(dir.path().join(&output.filename)).unwrap();
        assert_eq!(written.len(), output.bytes);
        assert_eq!(sha256_hex(&written), output.hash);
    }

    let bindings: serde_yaml::Value =
        serde_yaml::from_str(files.get("openhasp.yaml").unwrap()).unwrap();
    assert_eq!(bindings["office"]["objects"][0]["obj"], "p0b1");
}
