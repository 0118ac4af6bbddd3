//! Plates compiled by `haspgen`.

use serde_json::{json, Value};

use openhasp_plates::automation::{
    ArtworkRule, ButtonMatrixRules, ConfigRule, MatrixAction, RemoteRules, ServiceCall, Trigger,
};
use openhasp_plates::styling::{BorderSide, Part};
use openhasp_plates::widgets::{
    Arc, Button, ButtonMatrix, Image, Label, Roller, Switch, Tab, TabButtonPosition, TabView,
};
use openhasp_plates::{
    color, Address, Color, GridLayout, IconSet, Placement, Plate, PlateRegistry, Result,
    StyleEntry, Theme, Widget,
};

const WHITE: Color = Color::new(0xff, 0xff, 0xff);
const ORANGE: Color = Color::new(0xd6, 0x76, 0x3d);

const RESIZER: &str = "http://192.168.7.20:5020/image/resize_padded";

/// Registers every plate.
pub fn build(registry: &mut PlateRegistry, icons: &IconSet, theme: &Theme) -> Result<()> {
    registry.register(office(icons, theme)?)?;
    registry.register(theater(icons, theme)?)?;
    Ok(())
}

fn matrix_rules<const N: usize>(
    title: &str,
    matrix: Address,
    buttons: [(&str, &str, Value); N],
) -> ButtonMatrixRules {
    buttons
        .into_iter()
        .fold(ButtonMatrixRules::new(title, matrix), |rules, (service, entity, data)| {
            rules.button(MatrixAction::new(service).entity(entity).data(data))
        })
}

/// Radio-style matrix: one button checked at a time, first one initially.
fn choice_matrix<const N: usize>(options: [&str; N]) -> ButtonMatrix {
    let mut matrix = ButtonMatrix::new(options);
    matrix.toggle = true;
    matrix.one_check = Some(true);
    matrix.val = Some(0);
    matrix
}

pub fn office(icons: &IconSet, theme: &Theme) -> Result<Plate> {
    let mut plate = Plate::new("officeplate", 240, 320).with_theme(theme.clone());
    plate.page(GridLayout::new(12, 16), "Page Zero")?;
    plate.page(GridLayout::new(12, 16), "Page One")?;

    plate.set_font("md_24", WHITE);
    let tabs = plate.place(
        TabView {
            btn_pos: TabButtonPosition::Top,
            val: Some(1),
        },
        Placement::none(),
    )?;

    // home tab
    let tab = plate.place(
        Widget::from(Tab::new(icons.get("house")?)).parent(tabs.id),
        Placement::none(),
    )?;

    plate.set_font(18, WHITE);
    plate.place(
        Widget::from(Label::new("Ceiling Fan")).parent(tab.id),
        Placement::grid(0.5, 0.25, 6.0, 2.0),
    )?;

    plate.set_font("24", WHITE);
    // light: down, toggle, up / fan: down, toggle, up
    let fan = plate.place(
        Widget::from(ButtonMatrix::new([
            "\u{e374}", "\u{e6e8}", "\u{e415}", "\n", "\u{e374}", "\u{e210}", "\u{e415}",
        ]))
        .parent(tab.id)
        .align("center"),
        Placement::grid(0.5, 1.5, 6.0, 5.0),
    )?;
    plate.add_automation(matrix_rules(
        "Office Plate Fan Controls",
        fan,
        [
            ("light.turn_on", "light.ceiling_fan_light", json!({"brightness_step": -10})),
            ("light.toggle", "light.ceiling_fan_light", json!({})),
            ("light.turn_on", "light.ceiling_fan_light", json!({"brightness_step": 10})),
            ("fan.decrease_speed", "fan.office_ceiling_fan", json!({})),
            ("fan.toggle", "fan.office_ceiling_fan", json!({})),
            ("fan.increase_speed", "fan.office_ceiling_fan", json!({})),
        ],
    ));

    plate.set_font(18, WHITE);
    plate.place(
        Widget::from(Label::new("Lamp"))
            .parent(tab.id)
            .style(StyleEntry::new().bg_color(WHITE)),
        Placement::grid(7.0, 0.25, 4.5, 2.0),
    )?;
    plate.place(
        Widget::from(Switch::default())
            .parent(tab.id)
            .style(StyleEntry::new().bg_color(WHITE))
            .style(StyleEntry::new().part(Part::Knob).bg_color(color("#1DA3EC")?))
            .bind(|hass| {
                hass.inherit_value_from_template(
                    "val",
                    "{{ int(states.switch.office_lamp.state == 'on') }}",
                )
                .on_down("switch.toggle", "switch.office_lamp", json!({}));
            }),
        Placement::grid(7.0, 1.5, 4.5, 1.0),
    )?;

    plate.place(
        Widget::from(Label::new("Blinds")).parent(tab.id),
        Placement::grid(7.0, 3.0, 4.5, 2.0),
    )?;
    // close, open
    let blinds = plate.place(
        Widget::from(ButtonMatrix::new(["\u{f11c}", "\u{f11e}"]))
            .parent(tab.id)
            .align("center"),
        Placement::grid(7.0, 4.25, 4.5, 2.25),
    )?;
    plate.add_automation(matrix_rules(
        "Office Plate Blind Controls",
        blinds,
        [
            ("cover.close_cover", "cover.office_blinds_cover", json!({})),
            ("cover.open_cover", "cover.office_blinds_cover", json!({})),
        ],
    ));

    plate.place(
        Widget::from(Label::new("Scenes")).parent(tab.id),
        Placement::grid(0.5, 7.0, 11.0, 2.0),
    )?;
    plate.set_font("md_48", WHITE);
    let scenes = plate.place(
        Widget::from(ButtonMatrix::new([
            icons.get("laptop_mac")?,
            icons.get("home")?,
            icons.get("bed")?,
        ]))
        .parent(tab.id)
        .align("center"),
        Placement::grid(0.5, 8.25, 11.0, 4.0),
    )?;
    plate.add_automation(matrix_rules(
        "Office Plate Scene Controls",
        scenes,
        [
            ("scene.turn_on", "scene.office_work", json!({})),
            ("scene.turn_on", "scene.office_home", json!({})),
            ("scene.turn_on", "scene.office_sleep", json!({})),
        ],
    ));

    // climate tab
    plate.set_font("md_24", WHITE);
    let tab = plate.place(
        Widget::from(Tab::new("\u{eb3b}")).parent(tabs.id),
        Placement::none(),
    )?;

    plate.set_font(16, ORANGE);
    plate.place(
        Widget::from(Label::new("CURRENT")).parent(tab.id).align("center"),
        Placement::grid(0.0, 0.5, 8.0, 1.0),
    )?;

    plate.place(
        Widget::from(Arc {
            min: Some(50),
            max: Some(100),
            val: Some(75),
            start_angle: Some(180),
            end_angle: Some(0),
            ..Arc::default()
        })
        .parent(tab.id)
        .style(
            StyleEntry::new()
                .bg_opa(0)
                .border_side(BorderSide::None)
                .line_color(WHITE),
        )
        .bind(|hass| {
            hass.inherit_value_from("val", "climate.office", "current_temperature");
        }),
        Placement::grid(0.0, 1.5, 8.0, 8.0),
    )?;

    plate.set_font(30, WHITE);
    plate.place(
        Widget::from(Label::new("78 °F"))
            .parent(tab.id)
            .align("center")
            .bind(|hass| {
                hass.inherit_wrapped_value_from(
                    "text",
                    "climate.office",
                    "current_temperature",
                    "",
                    "°F",
                );
            }),
        Placement::grid(0.0, 4.25, 8.0, 3.0),
    )?;

    plate.set_font(16, ORANGE);
    plate.place(
        Widget::from(Label::new("TARGET")).parent(tab.id).align("center"),
        Placement::grid(8.5, 0.5, 3.0, 1.0),
    )?;

    plate.set_font(16, WHITE);
    let temperatures: Vec<i32> = (60..=80).collect();
    let listed = temperatures
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ");
    let mut roller = Roller::new(temperatures.iter().map(|t| format!("{} °F", t)));
    roller.rows = Some(2);
    roller.val = Some(10);
    plate.place(
        Widget::from(roller).parent(tab.id).bind(|hass| {
            hass.on_change(
                "climate.set_temperature",
                "climate.office",
                json!({"temperature": format!("{{{{ [{}][int(val)] }}}}", listed)}),
            )
            .inherit_value_from_template(
                "val",
                format!(
                    "{{{{ [{}].index(state_attr('climate.office', 'temperature')) }}}}",
                    listed
                ),
            );
        }),
        Placement::grid(8.5, 1.95, 3.0, 1.0),
    )?;

    plate.set_font("md_24", WHITE);
    // off, heat, cool, auto
    let hvac = plate.place(
        Widget::from(choice_matrix(["\u{e8ac}", "\u{f16a}", "\u{f166}", "\u{f557}"]))
            .parent(tab.id),
        Placement::grid(0.5, 7.0, 11.0, 2.5),
    )?;
    plate.add_automation(matrix_rules(
        "Office Plate Air Con State Controls",
        hvac,
        [
            ("climate.toggle", "climate.office", json!({})),
            ("climate.set_hvac_mode", "climate.office", json!({"hvac_mode": "heat"})),
            ("climate.set_hvac_mode", "climate.office", json!({"hvac_mode": "cool"})),
            ("climate.set_hvac_mode", "climate.office", json!({"hvac_mode": "auto"})),
        ],
    ));

    // none, vertical, horizontal, 3D
    let swing = plate.place(
        Widget::from(choice_matrix(["\u{e5c9}", "\u{e8d5}", "\u{e8d4}", "\u{f854}"]))
            .parent(tab.id),
        Placement::grid(0.5, 10.0, 11.0, 2.5),
    )?;
    plate.add_automation(matrix_rules(
        "Office Plate Air Con Oscillation Controls",
        swing,
        [
            ("climate.set_swing_mode", "climate.office", json!({"swing_mode": "Off"})),
            ("climate.set_swing_mode", "climate.office", json!({"swing_mode": "Vertical"})),
            ("climate.set_swing_mode", "climate.office", json!({"swing_mode": "Horizontal"})),
            ("climate.set_swing_mode", "climate.office", json!({"swing_mode": "3D"})),
        ],
    ));

    Ok(plate)
}

/// Remote-control commands, keyed by media-controls button.
struct RemoteKeys {
    info: &'static str,
    up: &'static str,
    home: &'static str,
    left: &'static str,
    select: &'static str,
    right: &'static str,
    skip_back: &'static str,
    back: &'static str,
    down: &'static str,
    menu: &'static str,
    skip_fwd: &'static str,
}

const APPLE_TV_KEYS: RemoteKeys = RemoteKeys {
    info: "wakeup",
    up: "up",
    home: "home",
    left: "left",
    select: "select",
    right: "right",
    skip_back: "skip_backward",
    back: "menu",
    down: "down",
    menu: "menu",
    skip_fwd: "skip_forward",
};

const RECEIVER: &str = "media_player.home_theater_receiver";

/// Floating toggle button that shows a media-controls panel for `target`.
fn remote_control(
    plate: &mut Plate,
    icons: &IconSet,
    name: &str,
    target: &str,
    helper: &str,
    keys: &RemoteKeys,
) -> Result<()> {
    plate.set_font("md_48", WHITE);
    let mut toggle = Button::new("\u{e83e}");
    toggle.toggle = true;
    plate.place(
        Widget::from(toggle)
            .use_profile("floating-button")
            .bind(|hass| {
                hass.inherit_value_from_template(
                    "val",
                    format!("{{{{ int(states.{}== 'on') }}}}", helper),
                )
                .on_down("input_boolean.toggle", helper, json!({}));
            }),
        Placement::grid(28.5, 12.5, 3.0, 3.0),
    )?;

    let panel = plate.place(
        Widget::container().hidden(true).use_profile("floating-panel"),
        Placement::grid(5.0, 1.0, 22.0, 18.0),
    )?;

    for (label, from, to, hidden) in [("ON", "off", "on", false), ("Off", "on", "off", true)] {
        let parameters = json!({"id": panel.id, "page": panel.page, "hidden": hidden});
        plate.add_automation(ConfigRule::new(
            format!("Theater Plate - {} Remote Panel {}", name, label),
            format!(
                "theater_plate_toggle_{}_remote_panel_{}",
                name,
                label.to_lowercase()
            ),
            Trigger::transition([helper], from, to),
            ServiceCall::new("openhasp.command")
                .target(format!("openhasp.{}", plate.name))
                .data(json!({"keyword": "jsonl", "parameters": parameters.to_string()})),
        ));
    }

    let mut controls = Widget::from(ButtonMatrix::media_controls(icons)?)
        .parent(panel.id)
        .use_profile("control-matrix");
    controls.fields.pad_top = Some(0);
    controls.fields.pad_bottom = Some(0);
    controls.fields.pad_left = Some(0);
    controls.fields.pad_right = Some(0);
    let controls = plate.place(controls, Placement::grid(1.0, 1.0, 20.0, 16.0))?;

    let send = |command: &str| {
        ServiceCall::new("remote.send_command")
            .target(target)
            .data(json!({ "command": command }))
    };
    let receiver = |service: &str, data: Value| {
        ServiceCall::new(service).target(RECEIVER).data(data)
    };
    plate.add_automation(RemoteRules::new(
        format!("Theater Plate {} Remote", name),
        controls,
        vec![
            receiver(
                "media_player.volume_mute",
                json!({"is_volume_muted": "{%- if states.media_player.home_theater_receiver.attributes.is_volume_muted -%} false {%- else -%} true {%- endif -%}"}),
            ),
            send(keys.info),
            send(keys.up),
            send(keys.home),
            send(keys.info),
            receiver("media_player.volume_up", json!({})),
            send(keys.left),
            send(keys.select),
            send(keys.right),
            send(keys.skip_back),
            receiver("media_player.volume_down", json!({})),
            send(keys.back),
            send(keys.down),
            send(keys.menu),
            send(keys.skip_fwd),
        ],
    ));

    Ok(())
}

/// Transparent panel holding a title label and an artwork image.
fn now_playing(plate: &mut Plate, title_template: &str) -> Result<Address> {
    let container = plate.place(
        Widget::container().hidden(false).style(
            StyleEntry::new()
                .border_width(0)
                .border_opa(0)
                .bg_opa(0)
                .outline_opa(0)
                .shadow_opa(0),
        ),
        Placement::grid(5.0, 3.0, 26.0, 16.5),
    )?;

    plate.set_font(28, WHITE);
    let mut label = Label::new("No Active Activity");
    label.mode = Some("dots".to_string());
    plate.place(
        Widget::from(label)
            .parent(container.id)
            .align("left")
            .bind(|hass| {
                hass.inherit_value_from_template("text", title_template);
            }),
        Placement::grid(0.0, 0.25, 26.0, 2.0),
    )?;

    plate.place(
        Widget::from(Image {
            src: Some("L:/now-playing.png".to_string()),
            ..Image::default()
        })
        .parent(container.id),
        Placement::grid(0.0, 2.0, 26.0, 14.0),
    )
}

pub fn theater(icons: &IconSet, theme: &Theme) -> Result<Plate> {
    let mut plate = Plate::new("theaterplate", 800, 480).with_theme(theme.clone());

    plate.page(GridLayout::new(32, 20), "Page 1 - Apple TV")?;
    plate.set_font("32", WHITE);
    plate.place(
        Widget::from(Label::new("Apple TV")).align("left"),
        Placement::grid(5.0, 0.5, 28.0, 4.0),
    )?;
    let image = now_playing(
        &mut plate,
        "{{ state_attr('media_player.home_theater_2', 'media_title') or 'Idle'  }}",
    )?;
    plate.add_automation(
        ArtworkRule::media_player("media_player.home_theater_2", image, "192.168.7.20", 8123)
            .size(624, 350)
            .resizer(RESIZER),
    );
    remote_control(
        &mut plate,
        icons,
        "atv",
        "remote.home_theater_2",
        "input_boolean.theater_plate_atv_remote_panel_open",
        &APPLE_TV_KEYS,
    )?;

    plate.page(GridLayout::new(32, 20), "Page 2 - Steam")?;
    plate.set_font("32", WHITE);
    plate.place(
        Widget::from(Label::new("Steam")).align("left"),
        Placement::grid(5.0, 0.5, 28.0, 4.0),
    )?;
    let image = now_playing(
        &mut plate,
        "{{ state_attr('sensor.steam_76561198858658876', 'game') or 'Idle'  }}",
    )?;
    plate.add_automation(
        ArtworkRule::steam("sensor.steam_76561198858658876", image)
            .size(624, 350)
            .resizer(RESIZER),
    );

    Ok(plate)
}
