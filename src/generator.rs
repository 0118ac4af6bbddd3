//! Generator - Single Entry Point for Output Files
//!
//! Turns a registry into the per-plate JSONL files and the two Home
//! Assistant documents. When validation is requested it runs before any
//! output is produced and any error blocks generation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::{debug, info};

use crate::error::{PlateError, Result};
use crate::hashing::{compute_manifest_hash, sha256_hex};
use crate::registry::PlateRegistry;
use crate::validation::ValidationReport;
use crate::ENGINE_VERSION;

pub const BINDINGS_FILE: &str = "openhasp.yaml";
pub const RULES_FILE: &str = "openhasp_automations.yaml";

pub fn plate_filename(name: &str) -> String {
    format!("plate-{}.jsonl", name)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedFile {
    pub filename: String,
    pub contents: String,
}

#[derive(Debug, Clone)]
pub struct GeneratedFiles {
    pub files: Vec<GeneratedFile>,
    pub validation: ValidationReport,
}

impl GeneratedFiles {
    pub fn get(&self, filename: &str) -> Option<&str> {
        self.files
            .iter()
            .find(|f| f.filename == filename)
            .map(|f| f.contents.as_str())
    }

    /// Writes every file into `dir`, creating it when needed.
    pub fn write_to(&self, dir: &Path) -> Result<GenerationManifest> {
        fs::create_dir_all(dir)?;

        let mut outputs = vec![];
        for file in &self.files {
            let path = dir.join(&file.filename);
            fs::write(&path, &file.contents)?;
            debug!(path = %path.display(), bytes = file.contents.len(), "file written");

            outputs.push(OutputFile {
                filename: file.filename.clone(),
                bytes: file.contents.len(),
                hash: sha256_hex(file.contents.as_bytes()),
            });
        }

        let mut manifest = GenerationManifest {
            engine_version: ENGINE_VERSION.to_string(),
            generated_at: Utc::now(),
            outputs,
            manifest_hash: String::new(), // Computed after
        };
        manifest.manifest_hash = compute_manifest_hash(&manifest)?;

        info!(files = manifest.outputs.len(), dir = %dir.display(), "generation complete");
        Ok(manifest)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationManifest {
    pub engine_version: String,
    pub generated_at: DateTime<Utc>,
    pub outputs: Vec<OutputFile>,
    pub manifest_hash: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OutputFile {
    pub filename: String,
    pub bytes: usize,
    pub hash: String,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Generator {
    validate: bool,
}

impl Generator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate every plate before generating.
    pub fn validating(mut self) -> Self {
        self.validate = true;
        self
    }

    pub fn validate(&self, registry: &PlateRegistry) -> ValidationReport {
        let mut report = ValidationReport::default();
        for plate in registry.iter() {
            report.merge(plate.validate());
        }
        report
    }

    pub fn generate(&self, registry: &PlateRegistry) -> Result<GeneratedFiles> {
        let validation = if self.validate {
            let report = self.validate(registry);
            if !report.valid {
                return Err(PlateError::ValidationFailed(report.summary()));
            }
            report
        } else {
            ValidationReport::default()
        };

        let mut files = vec![];
        for (name, jsonl) in registry.jsonl()? {
            info!(plate = %name, "generating plate jsonl");
            files.push(GeneratedFile {
                filename: plate_filename(&name),
                contents: jsonl,
            });
        }

        info!(file = BINDINGS_FILE, "generating bindings");
        files.push(GeneratedFile {
            filename: BINDINGS_FILE.to_string(),
            contents: registry.bindings_yaml()?,
        });

        info!(file = RULES_FILE, "generating automations");
        files.push(GeneratedFile {
            filename: RULES_FILE.to_string(),
            contents: registry.rules_yaml()?,
        });

        Ok(GeneratedFiles { files, validation })
    }
}
