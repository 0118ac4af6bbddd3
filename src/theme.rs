//! Theme profiles: profile name -> ordered style entries.
//!
//! Each entry of a profile carries its own part/state target, so a profile
//! that styles both MAIN and ITEMS+TOGGLED is simply two entries. A theme
//! always answers for the `default` profile; unknown names fall back to it.

use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tracing::warn;

use crate::color::Color;
use crate::error::Result;
use crate::styling::{Part, State, StyleEntry};

/// Named colors a built-in theme is generated from.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Palette {
    pub background: Color,
    pub background_secondary: Color,
    pub background_tertiary: Color,
    pub selection: Color,
    pub foreground: Color,
    pub active_1: Color,
    pub active_2: Color,
    pub active_3: Color,
    pub active_4: Color,
    pub active_5: Color,
    pub active_6: Color,
    pub active_7: Color,
    pub active_8: Color,
}

impl Palette {
    pub const fn dracula() -> Self {
        Self {
            background: Color::new(0x28, 0x2a, 0x36),
            background_secondary: Color::new(0x44, 0x47, 0x5a),
            background_tertiary: Color::new(0x0e, 0x0d, 0x12),
            selection: Color::new(0xff, 0x79, 0xc6),
            foreground: Color::new(0xf8, 0xf8, 0xf2),
            active_1: Color::new(0x62, 0x72, 0xa4),
            active_2: Color::new(0x8b, 0xe9, 0xfd),
            active_3: Color::new(0x50, 0xfa, 0x7b),
            active_4: Color::new(0xff, 0xb8, 0x6c),
            active_5: Color::new(0xff, 0x79, 0xc6),
            active_6: Color::new(0xbd, 0x93, 0xf9),
            active_7: Color::new(0xff, 0x55, 0x55),
            active_8: Color::new(0xf1, 0xfa, 0x8c),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Theme {
    pub name: String,
    #[serde(default)]
    profiles: HashMap<String, Vec<StyleEntry>>,
}

impl Theme {
    pub const DEFAULT_PROFILE: &'static str = "default";

    /// Creates a theme holding only an empty `default` profile.
    pub fn new(name: impl Into<String>) -> Self {
        let mut profiles = HashMap::new();
        profiles.insert(Self::DEFAULT_PROFILE.to_string(), Vec::new());
        Self {
            name: name.into(),
            profiles,
        }
    }

    /// Adds or replaces a profile, returning the theme for chaining.
    pub fn profile(mut self, name: &str, entries: Vec<StyleEntry>) -> Self {
        self.set_profile(name, entries);
        self
    }

    pub fn set_profile(&mut self, name: &str, entries: Vec<StyleEntry>) {
        self.profiles.insert(name.to_string(), entries);
    }

    pub fn has_profile(&self, name: &str) -> bool {
        self.profiles.contains_key(name)
    }

    /// Entries for `profile`, or for `default` when the name is unknown.
    pub fn styles_for(&self, profile: &str) -> &[StyleEntry] {
        if let Some(entries) = self.profiles.get(profile) {
            return entries;
        }

        warn!(
            theme = %self.name,
            profile,
            "unknown style profile, falling back to '{}'",
            Self::DEFAULT_PROFILE
        );
        self.profiles
            .get(Self::DEFAULT_PROFILE)
            .map_or(&[][..], Vec::as_slice)
    }

    /// Standard profile set used by the plates, colored from `palette`.
    pub fn from_palette(name: impl Into<String>, palette: &Palette) -> Self {
        let p = palette;
        let black = Color::new(0, 0, 0);

        let raised = |entry: StyleEntry, shadow: Color| {
            entry
                .shadow_color(shadow)
                .shadow_opa(100)
                .shadow_width(10)
                .shadow_ofs_x(3)
                .shadow_ofs_y(3)
        };

        let matrix_items = StyleEntry::new()
            .part(Part::Items)
            .bg_color(p.background_secondary)
            .text_color(p.foreground)
            .border_color(p.foreground)
            .border_opa(50);

        Self::new(name)
            .profile(
                Self::DEFAULT_PROFILE,
                vec![StyleEntry::new()
                    .part(Part::Main)
                    .bg_color(p.background)
                    .text_color(p.foreground)],
            )
            .profile(
                "navigation",
                vec![
                    raised(
                        StyleEntry::new()
                            .part(Part::Main)
                            .bg_color(p.background_secondary)
                            .text_color(p.foreground),
                        black,
                    )
                    .radius(0),
                    StyleEntry::new()
                        .part(Part::Items)
                        .state(State::Toggled)
                        .bg_color(p.active_6),
                ],
            )
            .profile(
                "floating-button",
                vec![
                    raised(
                        StyleEntry::new()
                            .part(Part::Main)
                            .bg_color(p.foreground)
                            .border_color(p.active_5)
                            .text_color(p.background)
                            .radius(50),
                        p.background_tertiary,
                    ),
                    StyleEntry::new()
                        .part(Part::Main)
                        .state(State::Toggled)
                        .bg_color(p.active_6)
                        .border_color(p.foreground)
                        .text_color(p.foreground),
                ],
            )
            .profile(
                "floating-panel",
                vec![raised(
                    StyleEntry::new().part(Part::Main).radius(10),
                    p.background_tertiary,
                )
                .bg_color(p.background_tertiary)],
            )
            .profile(
                "control-matrix",
                vec![
                    StyleEntry::new()
                        .part(Part::Main)
                        .border_width(0)
                        .bg_color(p.background_tertiary),
                    matrix_items.clone(),
                ],
            )
            .profile(
                "small-control-matrix",
                vec![
                    StyleEntry::new()
                        .part(Part::Main)
                        .border_width(0)
                        .bg_color(p.background)
                        .pad_top(2)
                        .pad_bottom(2)
                        .pad_left(2)
                        .pad_right(2)
                        .pad_inner(2),
                    matrix_items,
                ],
            )
    }

    pub fn dracula() -> Self {
        Self::from_palette("dracula", &Palette::dracula())
    }

    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let theme: Theme = serde_yaml::from_str(content)?;
        Ok(theme.with_default_profile())
    }

    pub fn from_json_str(content: &str) -> Result<Self> {
        let theme: Theme = serde_json::from_str(content)?;
        Ok(theme.with_default_profile())
    }

    /// Loads a theme file; `.json` is read as JSON, anything else as YAML.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        if path.extension().map_or(false, |e| e == "json") {
            Self::from_json_str(&content)
        } else {
            Self::from_yaml_str(&content)
        }
    }

    fn with_default_profile(mut self) -> Self {
        self.profiles
            .entry(Self::DEFAULT_PROFILE.to_string())
            .or_default();
        self
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::new("default")
    }
}
