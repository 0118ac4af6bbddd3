//! Style entries and the per-widget style cascade.
//!
//! A widget accumulates [`StyleEntry`] values in call order. Resolution
//! flattens the theme profile entries followed by the explicit overrides into
//! one property map; for equal keys the later entry wins. Property keys carry
//! the entry's part/state descriptor as a two digit suffix when it is nonzero
//! (`bg_color` at ITEMS + TOGGLED becomes `bg_color41`).

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::color::Color;
use crate::theme::Theme;

/// Conversion of a style value into its wire representation.
pub trait StyleValue {
    fn to_value(&self) -> Value;
}

impl StyleValue for i32 {
    fn to_value(&self) -> Value {
        Value::from(*self)
    }
}

impl StyleValue for bool {
    fn to_value(&self) -> Value {
        Value::Bool(*self)
    }
}

impl StyleValue for Color {
    fn to_value(&self) -> Value {
        Value::String(self.to_hex())
    }
}

/// Enum serialized as its numeric device value, deserialized from its
/// snake_case name.
macro_rules! numeric_enum {
    (
        $(#[$meta:meta])*
        $name:ident { $($(#[$vmeta:meta])* $variant:ident = $value:expr),* $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $($(#[$vmeta])* $variant),*
        }

        impl $name {
            pub const fn value(self) -> u8 {
                match self {
                    $(Self::$variant => $value),*
                }
            }
        }

        impl serde::Serialize for $name {
            fn serialize<S: serde::Serializer>(
                &self,
                serializer: S,
            ) -> std::result::Result<S::Ok, S::Error> {
                serializer.serialize_u8(self.value())
            }
        }

        impl $crate::styling::StyleValue for $name {
            fn to_value(&self) -> serde_json::Value {
                serde_json::Value::from(self.value())
            }
        }
    };
}

pub(crate) use numeric_enum;

numeric_enum! {
    /// Visual sub-element a style targets.
    #[derive(Default)]
    Part {
        #[default]
        Main = 0,
        Indicator = 10,
        Knob = 20,
        ItemsBackground = 30,
        Items = 40,
        SelectedItem = 50,
        MajorTicks = 60,
        TextCursor = 70,
        Scrollbar = 80,
        Other = 90,
    }
}

numeric_enum! {
    /// Interaction state a style targets.
    #[derive(Default)]
    State {
        #[default]
        Default = 0,
        Toggled = 1,
        Pressed = 2,
        PressedToggled = 3,
        Disabled = 4,
        DisabledToggled = 5,
    }
}

numeric_enum! {
    GradientDirection {
        None = 0,
        Horizontal = 1,
        Vertical = 2,
    }
}

numeric_enum! {
    BorderSide {
        None = 0,
        Bottom = 1,
        Top = 2,
        TopBottom = 3,
        Left = 4,
        BottomLeft = 5,
        TopLeft = 6,
        TopBottomLeft = 7,
        Right = 8,
        BottomRight = 9,
        TopRight = 10,
        TopBottomRight = 11,
        LeftRight = 12,
        BottomLeftRight = 13,
        TopLeftRight = 14,
        Full = 15,
    }
}

numeric_enum! {
    TextDecor {
        None = 0,
        Underline = 1,
        Strikethrough = 2,
        UnderlineStrikethrough = 3,
    }
}

/// A font reference: either a named font (`"md_24"`) or a point size.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Font {
    Size(i32),
    Named(String),
}

impl From<i32> for Font {
    fn from(size: i32) -> Self {
        Self::Size(size)
    }
}

impl From<&str> for Font {
    fn from(name: &str) -> Self {
        Self::Named(name.to_string())
    }
}

impl From<String> for Font {
    fn from(name: String) -> Self {
        Self::Named(name)
    }
}

impl StyleValue for Font {
    fn to_value(&self) -> Value {
        match self {
            Font::Size(size) => Value::from(*size),
            Font::Named(name) => Value::String(name.clone()),
        }
    }
}

macro_rules! style_entry {
    ($($(#[$doc:meta])* $field:ident: $ty:ty,)*) => {
        /// One style application: a part/state target plus any number of
        /// optional properties.
        ///
        /// Built with the chained setters or deserialized from a theme file
        /// (`part`/`state` by snake_case name, colors as `#rrggbb`).
        #[derive(Debug, Clone, Default, PartialEq, Deserialize)]
        #[serde(default, deny_unknown_fields)]
        pub struct StyleEntry {
            pub part: Option<Part>,
            pub state: Option<State>,
            $($(#[$doc])* pub $field: Option<$ty>,)*
        }

        impl StyleEntry {
            $(
                pub fn $field(mut self, value: impl Into<$ty>) -> Self {
                    self.$field = Some(value.into());
                    self
                }
            )*

            /// True when no property is set (part/state alone do not count).
            pub fn is_empty(&self) -> bool {
                true $(&& self.$field.is_none())*
            }

            /// Set properties in declaration order, unsuffixed.
            pub fn properties(&self) -> Vec<(&'static str, Value)> {
                let mut properties = Vec::new();
                $(
                    if let Some(value) = &self.$field {
                        properties.push((stringify!($field), value.to_value()));
                    }
                )*
                properties
            }
        }
    };
}

style_entry! {
    // image
    image_opa: i32,
    image_recolor: Color,
    image_recolor_opa: i32,
    // scale
    scale_grad_color: Color,
    scale_end_color: Color,
    scale_width: i32,
    scale_border_width: i32,
    scale_end_line_width: i32,
    scale_end_border_width: i32,
    // line
    line_color: Color,
    line_opa: i32,
    line_width: i32,
    line_rounded: bool,
    line_dash_width: i32,
    line_dash_gap: i32,
    // text
    text_color: Color,
    text_font: Font,
    text_opa: i32,
    text_letter_space: i32,
    text_line_space: i32,
    text_decor: TextDecor,
    text_sel_color: Color,
    // shadow
    shadow_color: Color,
    shadow_opa: i32,
    shadow_width: i32,
    shadow_ofs_x: i32,
    shadow_ofs_y: i32,
    shadow_spread: i32,
    // outline
    outline_color: Color,
    outline_opa: i32,
    outline_width: i32,
    outline_pad: i32,
    // border
    border_color: Color,
    border_opa: i32,
    border_width: i32,
    border_side: BorderSide,
    border_post: bool,
    // background
    bg_opa: i32,
    bg_color: Color,
    bg_grad_color: Color,
    bg_grad_dir: GradientDirection,
    bg_grad_stop: i32,
    bg_main_stop: i32,
    // padding and margin
    pad_top: i32,
    pad_bottom: i32,
    pad_left: i32,
    pad_right: i32,
    pad_inner: i32,
    margin_top: i32,
    margin_bottom: i32,
    margin_left: i32,
    margin_right: i32,
    // general
    radius: i32,
    clip_corner: bool,
}

impl StyleEntry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn part(mut self, part: Part) -> Self {
        self.part = Some(part);
        self
    }

    pub fn state(mut self, state: State) -> Self {
        self.state = Some(state);
        self
    }

    /// Combined part + state offset; unset values count as MAIN/DEFAULT.
    pub fn descriptor(&self) -> u8 {
        self.part.unwrap_or_default().value() + self.state.unwrap_or_default().value()
    }

    pub fn property_key(&self, name: &str) -> String {
        match self.descriptor() {
            0 => name.to_string(),
            descriptor => format!("{name}{descriptor:02}"),
        }
    }

    /// Properties keyed by their descriptor-suffixed wire names.
    pub fn resolved(&self) -> Vec<(String, Value)> {
        self.properties()
            .into_iter()
            .map(|(name, value)| (self.property_key(name), value))
            .collect()
    }
}

/// Sequential last-write-wins flatten of ordered entries.
pub fn flatten<'a>(entries: impl IntoIterator<Item = &'a StyleEntry>) -> Map<String, Value> {
    let mut map = Map::new();
    for entry in entries {
        for (key, value) in entry.resolved() {
            map.insert(key, value);
        }
    }
    map
}

/// Ordered style accumulator of one widget plus its optional theme profile.
///
/// Nothing is cached: [`ObjectStyles::resolve`] recomputes on every call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObjectStyles {
    entries: Vec<StyleEntry>,
    profile: Option<String>,
}

impl ObjectStyles {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records an override. An entry without properties is ignored.
    pub fn set(&mut self, entry: StyleEntry) -> &mut Self {
        if !entry.is_empty() {
            self.entries.push(entry);
        }
        self
    }

    pub fn use_profile(&mut self, profile: impl Into<String>) -> &mut Self {
        self.profile = Some(profile.into());
        self
    }

    pub fn profile(&self) -> Option<&str> {
        self.profile.as_deref()
    }

    pub fn entries(&self) -> &[StyleEntry] {
        &self.entries
    }

    /// Theme profile entries first, then overrides in call order.
    pub fn resolve(&self, theme: Option<&Theme>) -> Map<String, Value> {
        let profile_entries = match (self.profile.as_deref(), theme) {
            (Some(profile), Some(theme)) => theme.styles_for(profile),
            _ => &[][..],
        };
        flatten(profile_entries.iter().chain(&self.entries))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn white() -> Color {
        Color::new(255, 255, 255)
    }

    #[test]
    fn test_descriptor_suffix() {
        let entry = StyleEntry::new()
            .part(Part::Items)
            .state(State::Toggled)
            .bg_color(white());
        assert_eq!(entry.resolved(), vec![("bg_color41".to_string(), json!("#ffffff"))]);

        let plain = StyleEntry::new().part(Part::Main).state(State::Default).bg_color(white());
        assert_eq!(plain.resolved()[0].0, "bg_color");
    }

    #[test]
    fn test_single_digit_descriptor_is_zero_padded() {
        let entry = StyleEntry::new().state(State::Pressed).radius(4);
        assert_eq!(entry.resolved()[0].0, "radius02");
    }

    #[test]
    fn test_later_override_wins() {
        let mut styles = ObjectStyles::new();
        styles
            .set(StyleEntry::new().bg_color(Color::new(1, 2, 3)))
            .set(StyleEntry::new().bg_color(Color::new(4, 5, 6)));
        let resolved = styles.resolve(None);
        assert_eq!(resolved["bg_color"], json!("#040506"));
        assert_eq!(resolved.len(), 1);
    }

    #[test]
    fn test_empty_override_is_noop() {
        let mut styles = ObjectStyles::new();
        styles.set(StyleEntry::new().part(Part::Knob));
        assert!(styles.entries().is_empty());
    }

    #[test]
    fn test_enums_serialize_numerically() {
        let entry = StyleEntry::new()
            .border_side(BorderSide::TopBottom)
            .text_decor(TextDecor::Underline)
            .bg_grad_dir(GradientDirection::Vertical);
        let map = flatten([&entry]);
        assert_eq!(map["border_side"], json!(3));
        assert_eq!(map["text_decor"], json!(1));
        assert_eq!(map["bg_grad_dir"], json!(2));
    }

    #[test]
    fn test_font_values() {
        let named = StyleEntry::new().text_font("md_24");
        let sized = StyleEntry::new().text_font(18);
        assert_eq!(flatten([&named])["text_font"], json!("md_24"));
        assert_eq!(flatten([&sized])["text_font"], json!(18));
    }

    #[test]
    fn test_profile_entries_precede_overrides() {
        let theme = Theme::new("test").profile(
            "card",
            vec![StyleEntry::new().radius(10).bg_color(Color::new(0, 0, 0))],
        );
        let mut styles = ObjectStyles::new();
        styles.use_profile("card").set(StyleEntry::new().radius(2));

        let resolved = styles.resolve(Some(&theme));
        assert_eq!(resolved["radius"], json!(2));
        assert_eq!(resolved["bg_color"], json!("#000000"));
    }

    #[test]
    fn test_profile_without_theme_is_ignored() {
        let mut styles = ObjectStyles::new();
        styles.use_profile("card");
        assert!(styles.resolve(None).is_empty());
    }

    #[test]
    fn test_entry_deserializes_by_name() {
        let entry: StyleEntry = serde_yaml::from_str(
            "part: items\nstate: toggled\nbg_color: \"#bd93f9\"\nborder_side: full\n",
        )
        .unwrap();
        assert_eq!(entry.part, Some(Part::Items));
        assert_eq!(entry.state, Some(State::Toggled));
        assert_eq!(entry.border_side, Some(BorderSide::Full));
        assert_eq!(entry.descriptor(), 41);
    }
}
