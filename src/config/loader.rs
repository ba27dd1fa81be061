//! Configuration loading functionality.
//!
//! This module provides the [`ConfigLoader`] type for loading statutory
//! rulesets and ingestion settings from YAML files.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use chrono::NaiveDate;
use tracing::debug;

use crate::error::{PayrollError, PayrollResult};
use crate::ingest::AliasSet;

use super::types::{AliasOverrides, IngestSettings, Ruleset};

/// Loads and provides access to ingestion and deduction configuration.
///
/// # Directory Structure
///
/// ```text
/// config/ke/
/// ├── ingest.yaml          # Pipeline thresholds (optional)
/// ├── aliases.yaml         # Extra header aliases (optional)
/// └── rulesets/
///     ├── 2023-07-01.yaml  # One statutory ruleset per file
///     └── 2024-12-27.yaml
/// ```
///
/// # Example
///
/// ```no_run
/// use payroll_ingest::config::ConfigLoader;
/// use chrono::NaiveDate;
///
/// let loader = ConfigLoader::load("./config/ke")?;
/// let date = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
/// let ruleset = loader.ruleset_for(date)?;
/// println!("Using ruleset {}", ruleset.version);
/// # Ok::<(), payroll_ingest::error::PayrollError>(())
/// ```
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    rulesets: Vec<Ruleset>,
    settings: IngestSettings,
    aliases: AliasOverrides,
}

impl ConfigLoader {
    /// Loads configuration from the specified directory.
    ///
    /// # Returns
    ///
    /// Returns a `ConfigLoader` on success, or an error if:
    /// - The `rulesets` directory is missing or holds no YAML files
    /// - Any file contains invalid YAML
    /// - Any ruleset fails validation or repeats another's version
    pub fn load<P: AsRef<Path>>(path: P) -> PayrollResult<Self> {
        let path = path.as_ref();

        let rulesets = Self::load_rulesets(&path.join("rulesets"))?;
        let settings = Self::load_optional_yaml::<IngestSettings>(&path.join("ingest.yaml"))?
            .unwrap_or_default();
        let aliases = Self::load_optional_yaml::<AliasOverrides>(&path.join("aliases.yaml"))?
            .unwrap_or_default();

        Self::from_parts(rulesets, settings, aliases)
    }

    /// Builds a loader from already-constructed parts.
    ///
    /// Rulesets are validated and sorted by effective date.
    pub fn from_parts(
        rulesets: Vec<Ruleset>,
        settings: IngestSettings,
        aliases: AliasOverrides,
    ) -> PayrollResult<Self> {
        let mut rulesets = rulesets;
        for ruleset in &rulesets {
            ruleset.validate()?;
        }
        rulesets.sort_by(|a, b| a.effective_date.cmp(&b.effective_date));

        let mut seen = HashSet::new();
        for ruleset in &rulesets {
            if !seen.insert(ruleset.version.as_str()) {
                return Err(PayrollError::InvalidRuleset {
                    version: ruleset.version.clone(),
                    message: "version is defined more than once".to_string(),
                });
            }
        }

        debug!(rulesets = rulesets.len(), "Configuration assembled");

        Ok(Self {
            rulesets,
            settings,
            aliases,
        })
    }

    /// Loads and parses a YAML file.
    fn load_yaml<T: serde::de::DeserializeOwned>(path: &Path) -> PayrollResult<T> {
        let path_str = path.display().to_string();

        let content = fs::read_to_string(path).map_err(|_| PayrollError::ConfigNotFound {
            path: path_str.clone(),
        })?;

        serde_yaml::from_str(&content).map_err(|e| PayrollError::ConfigParseError {
            path: path_str,
            message: e.to_string(),
        })
    }

    /// Loads a YAML file if it exists.
    fn load_optional_yaml<T: serde::de::DeserializeOwned>(path: &Path) -> PayrollResult<Option<T>> {
        if !path.exists() {
            return Ok(None);
        }
        Self::load_yaml(path).map(Some)
    }

    /// Loads all ruleset files from the rulesets directory.
    fn load_rulesets(rulesets_dir: &Path) -> PayrollResult<Vec<Ruleset>> {
        let rulesets_dir_str = rulesets_dir.display().to_string();

        if !rulesets_dir.exists() {
            return Err(PayrollError::ConfigNotFound {
                path: rulesets_dir_str,
            });
        }

        let entries = fs::read_dir(rulesets_dir).map_err(|_| PayrollError::ConfigNotFound {
            path: rulesets_dir_str.clone(),
        })?;

        let mut rulesets = Vec::new();

        for entry in entries {
            let entry = entry.map_err(|_| PayrollError::ConfigNotFound {
                path: rulesets_dir_str.clone(),
            })?;

            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "yaml") {
                rulesets.push(Self::load_yaml::<Ruleset>(&path)?);
            }
        }

        if rulesets.is_empty() {
            return Err(PayrollError::ConfigNotFound {
                path: format!("{} (no ruleset files found)", rulesets_dir_str),
            });
        }

        Ok(rulesets)
    }

    /// Returns all rulesets, oldest effective date first.
    pub fn rulesets(&self) -> &[Ruleset] {
        &self.rulesets
    }

    /// Gets a ruleset by its version label.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use payroll_ingest::config::ConfigLoader;
    ///
    /// let loader = ConfigLoader::load("./config/ke")?;
    /// let ruleset = loader.ruleset("2023-07-01")?;
    /// assert_eq!(ruleset.version, "2023-07-01");
    /// # Ok::<(), payroll_ingest::error::PayrollError>(())
    /// ```
    pub fn ruleset(&self, version: &str) -> PayrollResult<&Ruleset> {
        self.rulesets
            .iter()
            .find(|ruleset| ruleset.version == version)
            .ok_or_else(|| PayrollError::RulesetNotFound {
                version: version.to_string(),
            })
    }

    /// Gets the most recent ruleset effective on or before the given date.
    pub fn ruleset_for(&self, date: NaiveDate) -> PayrollResult<&Ruleset> {
        self.rulesets
            .iter()
            .rev()
            .find(|ruleset| ruleset.effective_date <= date)
            .ok_or(PayrollError::NoRulesetForDate { date })
    }

    /// Returns the ingestion settings.
    pub fn settings(&self) -> &IngestSettings {
        &self.settings
    }

    /// Returns the extra aliases loaded from configuration.
    pub fn alias_overrides(&self) -> &AliasOverrides {
        &self.aliases
    }

    /// Builds the alias dictionary: built-in aliases plus configured extras.
    pub fn alias_set(&self) -> AliasSet {
        AliasSet::builtin().with_overrides(&self.aliases)
    }
}
