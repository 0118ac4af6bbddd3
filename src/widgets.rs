//! Widget descriptors and their JSONL documents.
//!
//! Every widget shares [`ObjectFields`] (identity, geometry, flags) and adds
//! the fields of its [`WidgetKind`]. A document is `obj`, the shared fields,
//! the kind fields and the resolved styles, in that order, with unset fields
//! omitted.

use serde::{Serialize, Serializer};
use serde_json::{json, Map, Value};
use std::fmt;

use crate::automation::HassBinding;
use crate::error::Result;
use crate::icons::IconSet;
use crate::styling::{numeric_enum, Font, ObjectStyles, StyleEntry};
use crate::theme::Theme;
use crate::validation::{BoundedFields, ValueRange};

/// `p<page>b<id>`: how the device and Home Assistant address a widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Address {
    pub page: usize,
    pub id: u32,
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "p{}b{}", self.page, self.id)
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

numeric_enum! {
    #[derive(Default)]
    TabButtonPosition {
        None = 0,
        #[default]
        Top = 1,
        Bottom = 2,
        Left = 3,
        Right = 4,
    }
}

numeric_enum! {
    #[derive(Default)]
    ArcType {
        #[default]
        Normal = 0,
        Symmetrical = 1,
        Reverse = 2,
    }
}

/// Fields shared by every widget kind.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ObjectFields {
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    page: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub groupid: Option<i32>,
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hidden: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub click: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ext_click_h: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ext_click_v: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parentid: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_font: Option<Font>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub align: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pad_top: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pad_bottom: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pad_left: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pad_right: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_str: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_ofs_y: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_font: Option<i32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Button {
    pub toggle: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub val: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
}

impl Button {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Switch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub val: Option<i32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Label {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
}

impl Label {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            mode: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Slider {
    pub val: i32,
    pub min: i32,
    pub max: i32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Image {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub src: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_size: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset_x: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset_y: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zoom: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub angle: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pivot_x: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pivot_y: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub antialias: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Arc {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub val: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rotation: Option<i32>,
    #[serde(rename = "type")]
    pub arc_type: ArcType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub adjustable: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_angle: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_angle: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_angle10: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_angle10: Option<i32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Gauge {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub val: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub critical_value: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label_count: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_count: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub angle: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rotation: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<i32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Bar {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub val: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_value: Option<i32>,
}

/// Grid of buttons; a `"\n"` option starts a new row.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ButtonMatrix {
    pub options: Vec<String>,
    pub toggle: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub one_check: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub val: Option<i32>,
}

const MEDIA_CONTROLS: [&str; 17] = [
    "volume_mute",
    "info",
    "keyboard_arrow_up",
    "home",
    "info",
    "\n",
    "volume_up",
    "keyboard_arrow_left",
    "filter_tilt_shift",
    "keyboard_arrow_right",
    "replay",
    "\n",
    "volume_down",
    "arrow_back",
    "keyboard_arrow_down",
    "menu",
    "forward_media",
];

impl ButtonMatrix {
    pub fn new<I, S>(options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            options: options.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Appends one row of buttons followed by the row break.
    pub fn add_row<I, S>(&mut self, items: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.options.extend(items.into_iter().map(Into::into));
        self.options.push("\n".to_string());
        self
    }

    /// Three-row media remote (mute/volume, d-pad, back/menu) drawn with icon glyphs.
    pub fn media_controls(icons: &IconSet) -> Result<Self> {
        let options = MEDIA_CONTROLS
            .iter()
            .map(|name| match *name {
                "\n" => Ok("\n".to_string()),
                name => icons.get(name).map(String::from),
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::new(options))
    }

    /// Number of actual buttons (row breaks excluded).
    pub fn button_count(&self) -> usize {
        self.options.iter().filter(|o| o.as_str() != "\n").count()
    }
}

fn join_lines<S: Serializer>(
    options: &[String],
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_str(&options.join("\n"))
}

/// Scrolling option picker. A set `val` goes out as a separate document.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Roller {
    #[serde(serialize_with = "join_lines")]
    pub options: Vec<String>,
    #[serde(skip)]
    pub val: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rows: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<i32>,
}

impl Roller {
    pub fn new<I, S>(options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: ToString,
    {
        Self {
            options: options.into_iter().map(|o| o.to_string()).collect(),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ColorPicker {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scale_width: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pad_inner: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode_fixed: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Tab {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl Tab {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TabView {
    pub btn_pos: TabButtonPosition,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub val: Option<i32>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum WidgetKind {
    /// Generic container, mostly used as an invisible parent or panel.
    Object,
    Button(Button),
    Switch(Switch),
    Label(Label),
    Slider(Slider),
    Image(Image),
    Arc(Arc),
    Gauge(Gauge),
    Bar(Bar),
    ButtonMatrix(ButtonMatrix),
    Roller(Roller),
    ColorPicker(ColorPicker),
    Tab(Tab),
    TabView(TabView),
}

macro_rules! widget_kinds {
    ($($variant:ident),*) => {
        $(
            impl From<$variant> for WidgetKind {
                fn from(kind: $variant) -> Self {
                    WidgetKind::$variant(kind)
                }
            }

            impl From<$variant> for Widget {
                fn from(kind: $variant) -> Self {
                    Widget::new(WidgetKind::$variant(kind))
                }
            }
        )*
    };
}

widget_kinds!(
    Button,
    Switch,
    Label,
    Slider,
    Image,
    Arc,
    Gauge,
    Bar,
    ButtonMatrix,
    Roller,
    ColorPicker,
    Tab,
    TabView
);

impl WidgetKind {
    /// Wire name of the kind (`obj` field).
    pub fn tag(&self) -> &'static str {
        match self {
            WidgetKind::Object => "obj",
            WidgetKind::Button(_) => "btn",
            WidgetKind::Switch(_) => "switch",
            WidgetKind::Label(_) => "label",
            WidgetKind::Slider(_) => "slider",
            WidgetKind::Image(_) => "img",
            WidgetKind::Arc(_) => "arc",
            WidgetKind::Gauge(_) => "gauge",
            WidgetKind::Bar(_) => "bar",
            WidgetKind::ButtonMatrix(_) => "btnmatrix",
            WidgetKind::Roller(_) => "roller",
            WidgetKind::ColorPicker(_) => "cpicker",
            WidgetKind::Tab(_) => "tab",
            WidgetKind::TabView(_) => "tabview",
        }
    }

    /// Container-only kinds are sized by their parent; they never carry w/h.
    pub fn is_container_only(&self) -> bool {
        matches!(self, WidgetKind::Tab(_) | WidgetKind::TabView(_))
    }

    fn fields(&self) -> Result<Map<String, Value>> {
        match self {
            WidgetKind::Object => Ok(Map::new()),
            WidgetKind::Button(k) => object_map(k),
            WidgetKind::Switch(k) => object_map(k),
            WidgetKind::Label(k) => object_map(k),
            WidgetKind::Slider(k) => object_map(k),
            WidgetKind::Image(k) => object_map(k),
            WidgetKind::Arc(k) => object_map(k),
            WidgetKind::Gauge(k) => object_map(k),
            WidgetKind::Bar(k) => object_map(k),
            WidgetKind::ButtonMatrix(k) => object_map(k),
            WidgetKind::Roller(k) => object_map(k),
            WidgetKind::ColorPicker(k) => object_map(k),
            WidgetKind::Tab(k) => object_map(k),
            WidgetKind::TabView(k) => object_map(k),
        }
    }

    fn bounded_fields(&self, bounds: &mut BoundedFields) {
        use ValueRange as R;

        match self {
            WidgetKind::Object | WidgetKind::Label(_) | WidgetKind::Tab(_) => {}
            WidgetKind::Button(k) => bounds.add("val", k.val, R::ON_OFF),
            WidgetKind::Switch(k) => bounds.add("val", k.val, R::ON_OFF),
            WidgetKind::Slider(k) => {
                bounds.add("val", Some(k.val), R::INT16);
                bounds.add("min", Some(k.min), R::INT16);
                bounds.add("max", Some(k.max), R::INT16);
            }
            WidgetKind::Image(k) => {
                bounds.add("offset_x", k.offset_x, R::INT16);
                bounds.add("offset_y", k.offset_y, R::INT16);
                bounds.add("zoom", k.zoom, R::UINT16);
                bounds.add("angle", k.angle, R::INT16);
                bounds.add("pivot_x", k.pivot_x, R::INT16);
                bounds.add("pivot_y", k.pivot_y, R::INT16);
            }
            WidgetKind::Arc(k) => {
                bounds.add("min", k.min, R::INT16);
                bounds.add("max", k.max, R::INT16);
                bounds.add("val", k.val, R::INT16);
                bounds.add("rotation", k.rotation, R::INT16);
                bounds.add("start_angle", k.start_angle, R::ANGLE);
                bounds.add("end_angle", k.end_angle, R::ANGLE);
                bounds.add("start_angle10", k.start_angle10, R::ANGLE);
                bounds.add("end_angle10", k.end_angle10, R::ANGLE);
            }
            WidgetKind::Gauge(k) => {
                bounds.add("min", k.min, R::INT16);
                bounds.add("max", k.max, R::INT16);
                bounds.add("val", k.val, R::INT16);
                bounds.add("critical_value", k.critical_value, R::INT16);
                bounds.add("label_count", k.label_count, R::UINT8);
                bounds.add("line_count", k.line_count, R::UINT16);
                bounds.add("angle", k.angle, R::ANGLE);
                bounds.add("rotation", k.rotation, R::ANGLE);
                bounds.add("format", k.format, R::UINT16);
            }
            WidgetKind::Bar(k) => {
                bounds.add("val", k.val, R::INT16);
                bounds.add("min", k.min, R::INT16);
                bounds.add("max", k.max, R::INT16);
                bounds.add("start_value", k.start_value, R::INT16);
            }
            WidgetKind::ButtonMatrix(k) => bounds.add("val", k.val, R::INT8),
            WidgetKind::Roller(k) => {
                bounds.add("val", k.val, R::INT16);
                bounds.add("rows", k.rows, R::INT8);
                bounds.add("mode", k.mode, R::ON_OFF);
            }
            WidgetKind::ColorPicker(k) => {
                bounds.add("scale_width", k.scale_width, R::UINT16);
                bounds.add("pad_inner", k.pad_inner, R::INT16);
            }
            WidgetKind::TabView(k) => bounds.add("val", k.val, R::INT8),
        }
    }
}

fn object_map<T: Serialize>(value: &T) -> Result<Map<String, Value>> {
    match serde_json::to_value(value)? {
        Value::Object(map) => Ok(map),
        _ => Ok(Map::new()),
    }
}

/// One on-device control.
///
/// Widgets are built standalone and receive their page and id when added to
/// a plate. The style accumulator and the automation binding are created on
/// first mutable access.
#[derive(Debug, Clone, PartialEq)]
pub struct Widget {
    pub fields: ObjectFields,
    pub kind: WidgetKind,
    styles: Option<ObjectStyles>,
    binding: Option<HassBinding>,
}

impl Widget {
    pub fn new(kind: WidgetKind) -> Self {
        Self {
            fields: ObjectFields::default(),
            kind,
            styles: None,
            binding: None,
        }
    }

    /// Generic container (`obj`).
    pub fn container() -> Self {
        Self::new(WidgetKind::Object)
    }

    pub fn tag(&self) -> &'static str {
        self.kind.tag()
    }

    pub fn id(&self) -> Option<u32> {
        self.fields.id
    }

    pub fn page(&self) -> Option<usize> {
        self.fields.page
    }

    /// `None` until the widget has been added to a plate.
    pub fn address(&self) -> Option<Address> {
        Some(Address {
            page: self.fields.page?,
            id: self.fields.id?,
        })
    }

    pub(crate) fn attach(&mut self, page: usize, id: u32) {
        self.fields.page = Some(page);
        self.fields.id = Some(id);
    }

    pub fn parent(mut self, parent_id: u32) -> Self {
        self.fields.parentid = Some(parent_id);
        self
    }

    pub fn hidden(mut self, hidden: bool) -> Self {
        self.fields.hidden = Some(hidden);
        self
    }

    pub fn enabled(mut self, enabled: bool) -> Self {
        self.fields.enabled = Some(enabled);
        self
    }

    pub fn align(mut self, align: impl Into<String>) -> Self {
        self.fields.align = Some(align.into());
        self
    }

    pub fn styles(&self) -> Option<&ObjectStyles> {
        self.styles.as_ref()
    }

    pub fn styles_mut(&mut self) -> &mut ObjectStyles {
        self.styles.get_or_insert_with(ObjectStyles::default)
    }

    /// Records a style override, returning the widget for chaining.
    pub fn style(mut self, entry: StyleEntry) -> Self {
        self.styles_mut().set(entry);
        self
    }

    pub fn use_profile(mut self, profile: impl Into<String>) -> Self {
        self.styles_mut().use_profile(profile);
        self
    }

    pub fn binding(&self) -> Option<&HassBinding> {
        self.binding.as_ref()
    }

    pub fn binding_mut(&mut self) -> &mut HassBinding {
        self.binding.get_or_insert_with(HassBinding::default)
    }

    pub fn has_binding(&self) -> bool {
        self.binding.is_some()
    }

    /// Configures the automation binding, returning the widget for chaining.
    pub fn bind(mut self, configure: impl FnOnce(&mut HassBinding)) -> Self {
        configure(self.binding_mut());
        self
    }

    /// Device documents for this widget, styles resolved against `theme`.
    ///
    /// Usually one document; a roller with a value adds a trailing
    /// `{obj, id, val}` document because the device only accepts the value
    /// after the roller exists.
    pub fn documents(&self, theme: Option<&Theme>) -> Result<Vec<Value>> {
        let mut doc = Map::new();
        doc.insert("obj".to_string(), Value::from(self.tag()));
        doc.extend(object_map(&self.fields)?);
        doc.extend(self.kind.fields()?);
        if let Some(styles) = &self.styles {
            doc.extend(styles.resolve(theme));
        }

        if self.kind.is_container_only() {
            doc.shift_remove("w");
            doc.shift_remove("h");
        }

        let mut documents = vec![Value::Object(doc)];
        if let WidgetKind::Roller(Roller { val: Some(val), .. }) = &self.kind {
            documents.push(json!({"obj": "roller", "id": self.fields.id, "val": val}));
        }
        Ok(documents)
    }

    /// Bounded fields that are currently set, with their declared ranges.
    pub fn bounded_fields(&self) -> BoundedFields {
        use ValueRange as R;

        let f = &self.fields;
        let mut bounds = BoundedFields::default();
        bounds.add("id", f.id, R::new(1, 254));
        bounds.add("page", f.page.map(|p| p as i64), R::new(0, 12));
        bounds.add("groupid", f.groupid, R::new(0, 15));
        bounds.add("x", Some(f.x), R::INT16);
        bounds.add("y", Some(f.y), R::INT16);
        bounds.add("w", Some(f.w), R::INT16);
        bounds.add("h", Some(f.h), R::INT16);
        bounds.add("ext_click_h", f.ext_click_h, R::UINT8);
        bounds.add("ext_click_v", f.ext_click_v, R::UINT8);
        bounds.add("parentid", f.parentid, R::UINT8);
        bounds.add("pad_top", f.pad_top, R::INT16);
        bounds.add("pad_bottom", f.pad_bottom, R::INT16);
        bounds.add("pad_left", f.pad_left, R::INT16);
        bounds.add("pad_right", f.pad_right, R::INT16);
        bounds.add("value_ofs_y", f.value_ofs_y, R::INT16);
        bounds.add("value_font", f.value_font, R::UINT8);
        self.kind.bounded_fields(&mut bounds);
        bounds
    }

    /// Checks every set bounded field; fails on the first out-of-range value.
    ///
    /// Never called implicitly: assignment alone does not validate.
    pub fn validate(&self) -> Result<()> {
        self.bounded_fields().check()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Color;

    fn attached(widget: impl Into<Widget>, id: u32) -> Widget {
        let mut widget = widget.into();
        widget.attach(0, id);
        widget
    }

    #[test]
    fn test_document_field_order_and_omission() {
        let w = attached(Label::new("Lamp"), 3).parent(2);
        let docs = w.documents(None).unwrap();
        assert_eq!(docs.len(), 1);

        let keys: Vec<_> = docs[0].as_object().unwrap().keys().cloned().collect();
        assert_eq!(
            keys,
            vec!["obj", "id", "page", "x", "y", "w", "h", "parentid", "text"]
        );
        assert_eq!(docs[0]["obj"], "label");
    }

    #[test]
    fn test_styles_merge_into_document() {
        let w = attached(Switch::default(), 1)
            .style(StyleEntry::new().bg_color(Color::new(255, 255, 255)))
            .style(
                StyleEntry::new()
                    .part(crate::styling::Part::Knob)
                    .bg_color(Color::new(0x1d, 0xa3, 0xec)),
            );
        let doc = &w.documents(None).unwrap()[0];
        assert_eq!(doc["bg_color"], "#ffffff");
        assert_eq!(doc["bg_color20"], "#1da3ec");
    }

    #[test]
    fn test_style_font_replaces_field_in_place() {
        let mut w = attached(Label::new("x"), 1);
        w.fields.text_font = Some(Font::from(12));
        w.styles_mut().set(StyleEntry::new().text_font("md_24"));

        let doc = &w.documents(None).unwrap()[0];
        let keys: Vec<_> = doc.as_object().unwrap().keys().cloned().collect();
        assert_eq!(doc["text_font"], "md_24");
        assert!(keys.iter().position(|k| k == "text_font") < keys.iter().position(|k| k == "text"));
    }

    #[test]
    fn test_roller_with_value_emits_two_documents() {
        let roller = Roller {
            val: Some(10),
            rows: Some(2),
            ..Roller::new(["60 °F", "61 °F"])
        };
        let docs = attached(roller, 7).documents(None).unwrap();
        assert_eq!(docs.len(), 2);
        assert!(docs[0].get("val").is_none());
        assert_eq!(docs[0]["options"], "60 °F\n61 °F");
        assert_eq!(docs[1], json!({"obj": "roller", "id": 7, "val": 10}));
    }

    #[test]
    fn test_roller_without_value_is_single_document() {
        let docs = attached(Roller::new(["a", "b"]), 1).documents(None).unwrap();
        assert_eq!(docs.len(), 1);
    }

    #[test]
    fn test_tabs_never_carry_size() {
        let mut tab: Widget = Tab::new("home").into();
        tab.fields.w = 100;
        tab.fields.h = 50;
        let doc = &tab.documents(None).unwrap()[0];
        assert!(doc.get("w").is_none());
        assert!(doc.get("h").is_none());
        assert_eq!(doc["x"], 0);

        let view: Widget = TabView {
            val: Some(1),
            ..TabView::default()
        }
        .into();
        let doc = &view.documents(None).unwrap()[0];
        assert!(doc.get("w").is_none());
        assert_eq!(doc["btn_pos"], 1);
    }

    #[test]
    fn test_arc_type_serializes_numerically() {
        let arc: Widget = Arc {
            arc_type: ArcType::Reverse,
            ..Arc::default()
        }
        .into();
        assert_eq!(arc.documents(None).unwrap()[0]["type"], 2);
    }

    #[test]
    fn test_add_row_and_button_count() {
        let mut m = ButtonMatrix::default();
        m.add_row(["a", "b"]).add_row(["c"]);
        assert_eq!(m.options, vec!["a", "b", "\n", "c", "\n"]);
        assert_eq!(m.button_count(), 3);
    }

    #[test]
    fn test_media_controls_needs_every_icon() {
        let partial = IconSet::parse("home e88a\n").unwrap();
        assert!(ButtonMatrix::media_controls(&partial).is_err());
    }

    #[test]
    fn test_validate_is_explicit() {
        let switch: Widget = Switch { val: Some(2) }.into();
        assert!(switch.documents(None).is_ok());
        assert!(switch.validate().is_err());

        let ok: Widget = Switch { val: Some(1) }.into();
        assert!(ok.validate().is_ok());
    }

    #[test]
    fn test_address_requires_attachment() {
        let w = Widget::container();
        assert!(w.address().is_none());
        let w = attached(w, 4);
        assert_eq!(w.address().unwrap().to_string(), "p0b4");
    }

    #[test]
    fn test_lazy_binding() {
        let mut w = Widget::container();
        assert!(!w.has_binding());
        w.binding_mut();
        assert!(w.has_binding());
    }
}
