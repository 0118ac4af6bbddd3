//! Home Assistant side of a plate.
//!
//! Two things are generated here: per-widget bindings (state templates that
//! feed widget properties, and widget events that call services) and
//! standalone automation rules. Templates are carried as opaque strings.

use serde::Serialize;
use serde_json::{json, Value};
use std::collections::BTreeMap;

use crate::hashing::stable_u16;
use crate::widgets::Address;

/// One entity id or an ordered list of them. A list stays a list in YAML.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum EntityTarget {
    One(String),
    Many(Vec<String>),
}

impl EntityTarget {
    /// No entity at all: an empty id or an empty list.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::One(entity_id) => entity_id.is_empty(),
            Self::Many(entity_ids) => entity_ids.is_empty(),
        }
    }
}

impl From<&str> for EntityTarget {
    fn from(entity_id: &str) -> Self {
        Self::One(entity_id.to_string())
    }
}

impl From<String> for EntityTarget {
    fn from(entity_id: String) -> Self {
        Self::One(entity_id)
    }
}

impl From<Vec<String>> for EntityTarget {
    fn from(entity_ids: Vec<String>) -> Self {
        Self::Many(entity_ids)
    }
}

impl<const N: usize> From<[&str; N]> for EntityTarget {
    fn from(entity_ids: [&str; N]) -> Self {
        Self::Many(entity_ids.iter().map(|e| e.to_string()).collect())
    }
}

// --- Widget bindings ---

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventAction {
    pub service: String,
    pub entity_id: EntityTarget,
    pub data: Value,
}

/// Binding of one widget: property templates plus event handlers.
///
/// Keys are kept sorted so the generated YAML is stable.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HassBinding {
    properties: BTreeMap<String, String>,
    events: BTreeMap<String, Vec<EventAction>>,
}

impl HassBinding {
    /// `prop` follows `state_attr(entity_id, attribute)`.
    pub fn inherit_value_from(
        &mut self,
        prop: &str,
        entity_id: &str,
        attribute: &str,
    ) -> &mut Self {
        self.inherit_wrapped_value_from(prop, entity_id, attribute, "", "")
    }

    /// Like [`inherit_value_from`](Self::inherit_value_from) with literal
    /// text around the template, e.g. a unit suffix.
    pub fn inherit_wrapped_value_from(
        &mut self,
        prop: &str,
        entity_id: &str,
        attribute: &str,
        before: &str,
        after: &str,
    ) -> &mut Self {
        let template = format!(
            "{before}{{{{ state_attr(\"{entity_id}\", \"{attribute}\") }}}}{after}"
        );
        self.inherit_value_from_template(prop, template)
    }

    pub fn inherit_value_from_template(
        &mut self,
        prop: &str,
        template: impl Into<String>,
    ) -> &mut Self {
        self.properties.insert(prop.to_string(), template.into());
        self
    }

    pub fn on(&mut self, event: &str, action: EventAction) -> &mut Self {
        self.events.entry(event.to_string()).or_default().push(action);
        self
    }

    pub fn on_change(
        &mut self,
        service: &str,
        entity_id: impl Into<EntityTarget>,
        data: Value,
    ) -> &mut Self {
        self.on("changed", event_action(service, entity_id, data))
    }

    pub fn on_down(
        &mut self,
        service: &str,
        entity_id: impl Into<EntityTarget>,
        data: Value,
    ) -> &mut Self {
        self.on("down", event_action(service, entity_id, data))
    }

    pub fn on_up(
        &mut self,
        service: &str,
        entity_id: impl Into<EntityTarget>,
        data: Value,
    ) -> &mut Self {
        self.on("up", event_action(service, entity_id, data))
    }

    pub fn properties(&self) -> &BTreeMap<String, String> {
        &self.properties
    }

    pub fn events(&self) -> &BTreeMap<String, Vec<EventAction>> {
        &self.events
    }

    pub fn entry(&self, address: Address) -> BindingEntry {
        BindingEntry {
            obj: address.to_string(),
            properties: self.properties.clone(),
            event: self.events.clone(),
        }
    }
}

fn event_action(service: &str, entity_id: impl Into<EntityTarget>, data: Value) -> EventAction {
    EventAction {
        service: service.to_string(),
        entity_id: entity_id.into(),
        data,
    }
}

/// Serialized form of a binding, keyed by the widget address.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BindingEntry {
    pub obj: String,
    pub properties: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub event: BTreeMap<String, Vec<EventAction>>,
}

// --- Rule documents ---

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServiceTarget {
    pub entity_id: EntityTarget,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ServiceCall {
    pub service: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<ServiceTarget>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl ServiceCall {
    pub fn new(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
            target: None,
            data: None,
        }
    }

    pub fn target(mut self, entity_id: impl Into<EntityTarget>) -> Self {
        self.target = Some(ServiceTarget {
            entity_id: entity_id.into(),
        });
        self
    }

    pub fn data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "platform", rename_all = "lowercase")]
pub enum Trigger {
    Mqtt {
        topic: String,
    },
    State {
        entity_id: EntityTarget,
        #[serde(skip_serializing_if = "Option::is_none")]
        attribute: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        from: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        to: Option<String>,
    },
}

impl Trigger {
    /// State transition of `entity_id` from `from` to `to`.
    pub fn transition(entity_id: impl Into<EntityTarget>, from: &str, to: &str) -> Self {
        Self::State {
            entity_id: entity_id.into(),
            attribute: None,
            from: Some(from.to_string()),
            to: Some(to.to_string()),
        }
    }

    pub fn attribute_change(entity_id: &str, attribute: &str) -> Self {
        Self::State {
            entity_id: entity_id.into(),
            attribute: Some(attribute.to_string()),
            from: None,
            to: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "condition", rename_all = "lowercase")]
pub enum Condition {
    Template { value_template: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChooseBranch {
    pub conditions: Vec<Condition>,
    pub sequence: Vec<ServiceCall>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Action {
    Service(ServiceCall),
    Choose { choose: Vec<ChooseBranch> },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Actions {
    Single(Action),
    List(Vec<Action>),
}

/// One independently triggered rule of the rule document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Rule {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
    pub id: String,
    pub alias: String,
    pub trigger: Vec<Trigger>,
    pub condition: Vec<Condition>,
    pub action: Actions,
}

/// Free-form rule: one trigger, one service call.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigRule {
    pub title: String,
    pub identifier: String,
    pub trigger: Trigger,
    pub action: ServiceCall,
}

impl ConfigRule {
    pub fn new(
        title: impl Into<String>,
        identifier: impl Into<String>,
        trigger: Trigger,
        action: ServiceCall,
    ) -> Self {
        Self {
            title: title.into(),
            identifier: identifier.into(),
            trigger,
            action,
        }
    }

    fn rules(&self, plate: &str) -> Vec<Rule> {
        vec![Rule {
            mode: Some("single".to_string()),
            id: format!("{}_automation_{}", plate, self.identifier),
            alias: self.title.clone(),
            trigger: vec![self.trigger.clone()],
            condition: vec![],
            action: Actions::List(vec![Action::Service(self.action.clone())]),
        }]
    }
}

/// Service call run when one matrix button is released.
#[derive(Debug, Clone, PartialEq)]
pub struct MatrixAction {
    pub service: String,
    pub entity_id: Option<EntityTarget>,
    pub data: Option<Value>,
}

impl MatrixAction {
    pub fn new(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
            entity_id: None,
            data: None,
        }
    }

    pub fn entity(mut self, entity_id: impl Into<EntityTarget>) -> Self {
        self.entity_id = Some(entity_id.into());
        self
    }

    pub fn data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    fn call(&self) -> ServiceCall {
        let mut call = ServiceCall::new(self.service.clone());
        if let Some(entity_id) = self.entity_id.as_ref().filter(|e| !e.is_empty()) {
            call = call.target(entity_id.clone());
        }
        if let Some(data) = self.data.as_ref().filter(|d| has_payload(d)) {
            call = call.data(data.clone());
        }
        call
    }
}

/// False for `null`, `false`, zero and empty strings, lists and maps.
fn has_payload(data: &Value) -> bool {
    match data {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map_or(true, |n| n != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

/// MQTT topic a plate publishes a widget's events on.
fn state_topic(plate: &str, address: Address) -> String {
    format!("hasp/{}/state/{}", plate, address)
}

/// Template gate: release (`up`) of button `index`. Presses are ignored.
fn release_condition(index: usize) -> Condition {
    Condition::Template {
        value_template: format!(
            "{{{{ trigger.payload_json['event'] == 'up' and trigger.payload_json['val'] == {} }}}}",
            index
        ),
    }
}

/// One rule per (button, action) pair of a button matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct ButtonMatrixRules {
    pub title: String,
    pub matrix: Address,
    pub buttons: Vec<Vec<MatrixAction>>,
}

impl ButtonMatrixRules {
    pub fn new(title: impl Into<String>, matrix: Address) -> Self {
        Self {
            title: title.into(),
            matrix,
            buttons: vec![],
        }
    }

    /// Next button, running a single action.
    pub fn button(mut self, action: MatrixAction) -> Self {
        self.buttons.push(vec![action]);
        self
    }

    /// Next button, running several actions in order.
    pub fn button_actions(mut self, actions: Vec<MatrixAction>) -> Self {
        self.buttons.push(actions);
        self
    }

    fn rules(&self, plate: &str) -> Vec<Rule> {
        let mut rules = vec![];
        for (button, actions) in self.buttons.iter().enumerate() {
            for (count, action) in actions.iter().enumerate() {
                let key = format!("{}-{}-{}", self.matrix, button, count);
                rules.push(Rule {
                    mode: None,
                    id: format!("{}_press_{}", plate, key),
                    alias: format!("{}- Button - {} - ({})", plate, self.title, key),
                    trigger: vec![Trigger::Mqtt {
                        topic: state_topic(plate, self.matrix),
                    }],
                    condition: vec![release_condition(button)],
                    action: Actions::Single(Action::Service(action.call())),
                });
            }
        }
        rules
    }
}

/// Remote-control matrix: exactly one service call per button.
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteRules {
    pub title: String,
    pub matrix: Address,
    pub buttons: Vec<ServiceCall>,
}

impl RemoteRules {
    pub fn new(title: impl Into<String>, matrix: Address, buttons: Vec<ServiceCall>) -> Self {
        Self {
            title: title.into(),
            matrix,
            buttons,
        }
    }

    fn rules(&self, plate: &str) -> Vec<Rule> {
        self.buttons
            .iter()
            .enumerate()
            .map(|(button, call)| {
                let key = format!("{}-{}", self.matrix, button);
                Rule {
                    mode: None,
                    id: format!("{}_remote_press_{}", plate, key),
                    alias: format!("{} Remote Press ({})", plate, key),
                    trigger: vec![Trigger::Mqtt {
                        topic: state_topic(plate, self.matrix),
                    }],
                    condition: vec![release_condition(button)],
                    action: Actions::List(vec![Action::Service(call.clone())]),
                }
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArtworkSource {
    /// `entity_picture` of a media player, served by Home Assistant itself.
    MediaPlayer { host: String, port: u16 },
    /// `game_image_main` of a Steam entity, already an absolute URL.
    Steam,
}

impl ArtworkSource {
    fn attribute(&self) -> &'static str {
        match self {
            ArtworkSource::MediaPlayer { .. } => "entity_picture",
            ArtworkSource::Steam => "game_image_main",
        }
    }
}

/// Keeps an image widget showing an entity's artwork.
#[derive(Debug, Clone, PartialEq)]
pub struct ArtworkRule {
    pub title: String,
    pub entity_id: String,
    pub image: Address,
    pub source: ArtworkSource,
    pub width: u32,
    pub height: u32,
    pub default_image: Option<String>,
    pub resizer_url: Option<String>,
}

impl ArtworkRule {
    pub fn media_player(
        entity_id: impl Into<String>,
        image: Address,
        host: impl Into<String>,
        port: u16,
    ) -> Self {
        let entity_id = entity_id.into();
        Self {
            title: format!("Media Player Artwork Automation ({})", entity_id),
            entity_id,
            image,
            source: ArtworkSource::MediaPlayer {
                host: host.into(),
                port,
            },
            width: 480,
            height: 480,
            default_image: None,
            resizer_url: None,
        }
    }

    pub fn steam(entity_id: impl Into<String>, image: Address) -> Self {
        let entity_id = entity_id.into();
        Self {
            title: format!("Steam Artwork Automation ({})", entity_id),
            entity_id,
            image,
            source: ArtworkSource::Steam,
            width: 480,
            height: 480,
            default_image: None,
            resizer_url: None,
        }
    }

    pub fn size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn resizer(mut self, url: impl Into<String>) -> Self {
        self.resizer_url = Some(url.into());
        self
    }

    pub fn default_image(mut self, url: impl Into<String>) -> Self {
        self.default_image = Some(url.into());
        self
    }

    /// Image URL template, routed through the resizer when one is set.
    pub fn image_url(&self) -> String {
        let attribute = self.source.attribute();
        let source = match &self.source {
            ArtworkSource::MediaPlayer { host, port } => format!(
                "http://{}:{}{{{{state_attr(\"{}\", \"{}\") | urlencode}}}}",
                host, port, self.entity_id, attribute
            ),
            ArtworkSource::Steam => {
                format!("{{{{state_attr(\"{}\", \"{}\")}}}}", self.entity_id, attribute)
            }
        };

        match &self.resizer_url {
            Some(resizer) => format!(
                "{}?width={}&height={}&url={}",
                resizer, self.width, self.height, source
            ),
            None => source,
        }
    }

    fn push_image(&self, plate: &str, image: Option<String>) -> ServiceCall {
        ServiceCall::new("openhasp.push_image")
            .target(format!("openhasp.{}", plate))
            .data(json!({
                "image": image,
                "obj": self.image.to_string(),
                "width": self.width,
                "height": self.height,
                "fitscreen": true,
            }))
    }

    fn rules(&self, plate: &str) -> Vec<Rule> {
        let attribute = self.source.attribute();
        let suffix = stable_u16(&[plate, &self.entity_id, &self.image.to_string()]);

        let present = ChooseBranch {
            conditions: vec![Condition::Template {
                value_template: format!(
                    "{{{{ state_attr('{}', '{}') != None }}}}",
                    self.entity_id, attribute
                ),
            }],
            sequence: vec![self.push_image(plate, Some(self.image_url()))],
        };
        let absent = ChooseBranch {
            conditions: vec![Condition::Template {
                value_template: format!(
                    "{{{{ not state_attr('{}', '{}') }}}}",
                    self.entity_id, attribute
                ),
            }],
            sequence: vec![self.push_image(plate, self.default_image.clone())],
        };

        vec![Rule {
            mode: Some("single".to_string()),
            id: format!("am-{}-{}", self.entity_id, suffix),
            alias: self.title.clone(),
            trigger: vec![Trigger::attribute_change(&self.entity_id, attribute)],
            condition: vec![],
            action: Actions::List(vec![Action::Choose {
                choose: vec![present, absent],
            }]),
        }]
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Automation {
    Config(ConfigRule),
    ButtonMatrix(ButtonMatrixRules),
    Remote(RemoteRules),
    Artwork(ArtworkRule),
}

impl Automation {
    /// Rules this automation expands to on plate `plate`.
    pub fn rules(&self, plate: &str) -> Vec<Rule> {
        match self {
            Automation::Config(a) => a.rules(plate),
            Automation::ButtonMatrix(a) => a.rules(plate),
            Automation::Remote(a) => a.rules(plate),
            Automation::Artwork(a) => a.rules(plate),
        }
    }
}

impl From<ConfigRule> for Automation {
    fn from(a: ConfigRule) -> Self {
        Self::Config(a)
    }
}

impl From<ButtonMatrixRules> for Automation {
    fn from(a: ButtonMatrixRules) -> Self {
        Self::ButtonMatrix(a)
    }
}

impl From<RemoteRules> for Automation {
    fn from(a: RemoteRules) -> Self {
        Self::Remote(a)
    }
}

impl From<ArtworkRule> for Automation {
    fn from(a: ArtworkRule) -> Self {
        Self::Artwork(a)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MATRIX: Address = Address { page: 0, id: 4 };

    #[test]
    fn test_wrapped_template() {
        let mut b = HassBinding::default();
        b.inherit_wrapped_value_from("text", "climate.office", "current_temperature", "", "°F");
        assert_eq!(
            b.properties()["text"],
            "{{ state_attr(\"climate.office\", \"current_temperature\") }}°F"
        );
    }

    #[test]
    fn test_binding_entry_omits_empty_events() {
        let mut b = HassBinding::default();
        b.inherit_value_from("val", "light.x", "brightness");
        let yaml = serde_yaml::to_string(&b.entry(MATRIX)).unwrap();
        assert!(yaml.contains("obj: p0b4"));
        assert!(!yaml.contains("event"));
    }

    #[test]
    fn test_event_tuple_target_renders_as_list() {
        let mut b = HassBinding::default();
        b.on_down("light.toggle", ["light.a", "light.b"], json!({}));
        let value = serde_json::to_value(b.entry(MATRIX)).unwrap();
        assert_eq!(value["event"]["down"][0]["entity_id"], json!(["light.a", "light.b"]));
    }

    #[test]
    fn test_matrix_rules_gate_on_release() {
        let rules = ButtonMatrixRules::new("Fan", MATRIX)
            .button(MatrixAction::new("fan.toggle").entity("fan.office").data(json!({})))
            .button_actions(vec![
                MatrixAction::new("light.turn_on").entity("light.a"),
                MatrixAction::new("light.turn_on")
                    .entity("light.b")
                    .data(json!({"brightness_step": 10})),
            ]);
        let rules = Automation::from(rules).rules("office");
        assert_eq!(rules.len(), 3);
        assert_eq!(rules[2].id, "office_press_p0b4-1-1");

        let Condition::Template { value_template } = &rules[2].condition[0];
        assert!(value_template.contains("'up'"));
        assert!(value_template.contains("['val'] == 1 "));

        let first = serde_json::to_value(&rules[0]).unwrap();
        assert!(first.get("mode").is_none());
        assert!(first["action"].get("data").is_none());
        assert_eq!(first["trigger"][0]["topic"], "hasp/office/state/p0b4");
        assert_eq!(first["trigger"][0]["platform"], "mqtt");
    }

    #[test]
    fn test_matrix_action_drops_empty_payload_and_target() {
        for empty in [json!(null), json!(false), json!(0), json!(""), json!([]), json!({})] {
            let call = MatrixAction::new("script.run").entity("").data(empty).call();
            assert_eq!(call, ServiceCall::new("script.run"));
        }

        let call = MatrixAction::new("light.turn_on")
            .entity(Vec::<String>::new())
            .data(json!([1]))
            .call();
        assert!(call.target.is_none());
        assert_eq!(call.data, Some(json!([1])));
    }

    #[test]
    fn test_config_rule_shape() {
        let rule = ConfigRule::new(
            "Panel on",
            "panel_on",
            Trigger::transition(["input_boolean.panel"], "off", "on"),
            ServiceCall::new("openhasp.command").target("openhasp.theaterplate"),
        );
        let value = serde_json::to_value(&Automation::from(rule).rules("theaterplate")[0]).unwrap();
        assert_eq!(value["mode"], "single");
        assert_eq!(value["id"], "theaterplate_automation_panel_on");
        assert_eq!(value["trigger"][0]["entity_id"], json!(["input_boolean.panel"]));
        assert_eq!(value["trigger"][0]["from"], "off");
        assert!(value["action"].is_array());
    }

    #[test]
    fn test_artwork_rule_branches() {
        let image = Address { page: 1, id: 9 };
        let rule = ArtworkRule::media_player("media_player.tv", image, "10.0.0.2", 8123)
            .resizer("http://resizer/")
            .default_image("http://img/default.png");
        let rules = Automation::from(rule.clone()).rules("theater");
        let value = serde_json::to_value(&rules[0]).unwrap();

        let branches = &value["action"][0]["choose"];
        assert_eq!(branches.as_array().unwrap().len(), 2);
        let present = &branches[0]["sequence"][0]["data"];
        assert!(present["image"]
            .as_str()
            .unwrap()
            .starts_with("http://resizer/?width=480&height=480&url=http://10.0.0.2:8123{{"));
        assert_eq!(present["obj"], "p1b9");
        assert_eq!(branches[1]["sequence"][0]["data"]["image"], "http://img/default.png");
        assert_eq!(value["trigger"][0]["attribute"], "entity_picture");

        // ids are reproducible
        assert_eq!(rules[0].id, Automation::from(rule).rules("theater")[0].id);
    }

    #[test]
    fn test_steam_artwork_without_resizer() {
        let rule = ArtworkRule::steam("sensor.steam_me", Address { page: 0, id: 1 });
        assert_eq!(rule.image_url(), "{{state_attr(\"sensor.steam_me\", \"game_image_main\")}}");
    }

    #[test]
    fn test_remote_rules_action_list() {
        let rules = RemoteRules::new(
            "TV",
            MATRIX,
            vec![ServiceCall::new("remote.send_command")
                .target("remote.tv")
                .data(json!({"command": "up"}))],
        );
        let rules = Automation::from(rules).rules("theater");
        assert_eq!(rules[0].id, "theater_remote_press_p0b4-0");
        assert!(matches!(rules[0].action, Actions::List(_)));
    }
}
