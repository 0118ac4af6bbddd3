//! openHASP Plates - Plate Compiler
//!
//! Builds openHASP display plates in code and compiles them to:
//! 1. one JSONL object stream per plate, loaded by the device
//! 2. a binding document for the Home Assistant openHASP integration
//! 3. an automation rule document for Home Assistant
//!
//! Output is deterministic: the same plates always produce the same bytes.

pub mod automation;
pub mod color;
pub mod error;
pub mod generator;
pub mod hashing;
pub mod icons;
pub mod layout;
pub mod plate;
pub mod registry;
pub mod styling;
pub mod theme;
pub mod validation;
pub mod widgets;
pub mod yaml;

pub use automation::{
    ArtworkRule, Automation, BindingEntry, ButtonMatrixRules, ConfigRule, EntityTarget,
    HassBinding, MatrixAction, RemoteRules, Rule, ServiceCall, Trigger,
};
pub use color::{color, Color};
pub use error::{PlateError, Result};
pub use generator::{GeneratedFiles, GenerationManifest, Generator};
pub use hashing::{canonical_json, compute_manifest_hash};
pub use icons::IconSet;
pub use layout::{GridLayout, Placement};
pub use plate::Plate;
pub use registry::PlateRegistry;
pub use styling::{Font, Part, State, StyleEntry};
pub use theme::{Palette, Theme};
pub use validation::{ValidationReport, ValidationRule, ValidationViolation, ValueRange, ViolationSeverity};
pub use widgets::{Address, Widget, WidgetKind};

pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");
