//! Plate registry - owns every plate of a generation run.
//!
//! Registration order is kept; it is the order plates appear in every
//! generated document. Names are unique.

use serde::ser::{Serialize, SerializeMap, Serializer};
use tracing::debug;

use crate::automation::{BindingEntry, Rule};
use crate::error::{PlateError, Result};
use crate::plate::Plate;
use crate::yaml;

#[derive(Debug, Clone, Default)]
pub struct PlateRegistry {
    plates: Vec<Plate>,
}

impl PlateRegistry {
    pub fn new() -> Self {
        Self { plates: vec![] }
    }

    pub fn register(&mut self, plate: Plate) -> Result<&mut Plate> {
        if self.get(&plate.name).is_some() {
            return Err(PlateError::DuplicatePlate(plate.name));
        }
        debug!(plate = %plate.name, "plate registered");
        self.plates.push(plate);
        let index = self.plates.len() - 1;
        Ok(&mut self.plates[index])
    }

    /// Registers an empty `width` x `height` plate.
    pub fn create(&mut self, name: impl Into<String>, width: u32, height: u32) -> Result<&mut Plate> {
        self.register(Plate::new(name, width, height))
    }

    pub fn get(&self, name: &str) -> Option<&Plate> {
        self.plates.iter().find(|p| p.name == name)
    }

    /// Like [`get`](Self::get), failing with `UnknownPlate`.
    pub fn plate(&self, name: &str) -> Result<&Plate> {
        self.get(name)
            .ok_or_else(|| PlateError::UnknownPlate(name.to_string()))
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Plate> {
        self.plates.iter_mut().find(|p| p.name == name)
    }

    pub fn list(&self) -> Vec<&str> {
        self.plates.iter().map(|p| p.name.as_str()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Plate> {
        self.plates.iter()
    }

    pub fn len(&self) -> usize {
        self.plates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plates.is_empty()
    }

    /// `(plate name, jsonl)` per plate.
    pub fn jsonl(&self) -> Result<Vec<(String, String)>> {
        self.plates
            .iter()
            .map(|p| Ok((p.name.clone(), p.jsonl()?)))
            .collect()
    }

    /// Binding document: `{<plate>: {objects: [...]}}` for every plate.
    pub fn bindings_yaml(&self) -> Result<String> {
        let document = BindingDocument {
            plates: self
                .plates
                .iter()
                .map(|p| (p.name.as_str(), p.bindings()))
                .collect(),
        };
        yaml::to_string(&document)
    }

    /// Rule document: one flat list, plates in registration order.
    pub fn rules(&self) -> Vec<Rule> {
        self.plates.iter().flat_map(Plate::rules).collect()
    }

    pub fn rules_yaml(&self) -> Result<String> {
        yaml::to_string(&self.rules())
    }
}

struct BindingDocument<'a> {
    plates: Vec<(&'a str, Vec<BindingEntry>)>,
}

#[derive(serde::Serialize)]
struct PlateBindings<'a> {
    objects: &'a [BindingEntry],
}

impl Serialize for BindingDocument<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.plates.len()))?;
        for (name, objects) in &self.plates {
            map.serialize_entry(name, &PlateBindings { objects })?;
        }
        map.end()
    }
}
