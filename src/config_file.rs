use crate::cli::Args;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Optional JSON configuration, e.g.
///
/// ```json
/// { "recursive": false, "preserveTransparency": true, "report": true }
/// ```
#[derive(Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ConfigFile {
    pub recursive: Option<bool>,
    pub preserve_transparency: Option<bool>,
    pub keep_originals: Option<bool>,
    pub verbose: Option<bool>,
    pub report: Option<bool>,
}

impl ConfigFile {
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }
}

impl Args {
    /// Load configuration from a JSON file and merge with command-line arguments
    /// Command-line arguments take precedence over config file values
    pub fn load_and_merge_config(&mut self) -> Result<()> {
        if let Some(config_path) = self.config_file.clone() {
            let config = ConfigFile::load(&config_path)?;
            self.merge_from_config(&config);

            if self.verbose && !self.json_progress {
                println!("Loaded configuration from: {}", config_path.display());
            }
        }
        Ok(())
    }

    /// Every flag is a switch away from the default, so a flag set on the
    /// command line is never overridden; the config only fills in the rest.
    pub fn merge_from_config(&mut self, config: &ConfigFile) {
        if !self.no_recursive {
            self.no_recursive = config.recursive == Some(false);
        }
        if !self.no_transparency {
            self.no_transparency = config.preserve_transparency == Some(false);
        }
        if !self.keep_originals {
            self.keep_originals = config.keep_originals.unwrap_or(false);
        }
        if !self.verbose {
            self.verbose = config.verbose.unwrap_or(false);
        }
        if !self.report {
            self.report = config.report.unwrap_or(false);
        }
    }
}
