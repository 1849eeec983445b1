// Copyright (c) 2025 SOLARE S.R.O.
//
// This file is part of waydroid-upgrade.
//
// Licensed under the Creative Commons Attribution-NonCommercial-NoDerivatives 4.0 International
// (CC BY-NC-ND 4.0). You may use and share this file for non-commercial purposes only and you may not
// create derivatives. See <https://creativecommons.org/licenses/by-nc-nd/4.0/>.
//
// This software is provided "AS IS", without warranty of any kind.
//
// For commercial licensing, please contact: info@solare.cz

//! Waydroid configuration reader
//!
//! Reads the `[waydroid]` section of the INI file Waydroid keeps in its work
//! directory. The file is never written back.

use crate::error::{Result, UpgradeError};
use ini::{Ini, ParseOption};
use std::collections::BTreeMap;
use std::path::Path;

pub const CONFIG_PATH: &str = "/var/lib/waydroid/waydroid.cfg";

const SECTION: &str = "waydroid";

const DEFAULT_IMAGES_PATH: &str = "/var/lib/waydroid/images";

/// Keys filled in when the file does not provide them
const DEFAULTS: [(&str, &str); 3] = [
    ("images_path", DEFAULT_IMAGES_PATH),
    ("system_datetime", "0"),
    ("vendor_datetime", "0"),
];

/// Read-only image locations shipped by distributions; upgrading them is refused
pub const PREINSTALLED_IMAGES_PATHS: [&str; 2] = [
    "/etc/waydroid-extra/images",
    "/usr/share/waydroid-extra/images",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WaydroidConfig {
    values: BTreeMap<String, String>,
}

impl WaydroidConfig {
    /// Load the configuration from the well-known Waydroid path
    pub fn load() -> Result<Self> {
        Self::load_from(Path::new(CONFIG_PATH))
    }

    /// Load the configuration from `path`, or defaults if it is not a file
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.is_file() {
            tracing::debug!("No config at {}, using defaults", path.display());
            return Ok(Self::with_defaults(BTreeMap::new()));
        }

        let content = std::fs::read_to_string(path)?;
        Self::from_ini_str(&content).map_err(|e| match e {
            UpgradeError::Config(msg) => {
                UpgradeError::Config(format!("{}: {msg}", path.display()))
            }
            other => other,
        })
    }

    /// Parse an INI document and fill in missing defaults
    pub fn from_ini_str(content: &str) -> Result<Self> {
        // configparser stores values verbatim: no escapes, no quoting
        let options = ParseOption {
            enabled_escape: false,
            enabled_quote: false,
            ..ParseOption::default()
        };
        let ini = Ini::load_from_str_opt(content, options)
            .map_err(|e| UpgradeError::Config(format!("failed to parse config: {e}")))?;

        // configparser lower-cases option names when Waydroid writes the file
        let values = ini
            .section(Some(SECTION))
            .map(|props| {
                props
                    .iter()
                    .map(|(key, value)| (key.to_lowercase(), value.to_owned()))
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self::with_defaults(values))
    }

    fn with_defaults(mut values: BTreeMap<String, String>) -> Self {
        for (key, value) in DEFAULTS {
            values
                .entry(key.to_owned())
                .or_insert_with(|| value.to_owned());
        }
        Self { values }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn images_path(&self) -> &str {
        self.get("images_path").unwrap_or(DEFAULT_IMAGES_PATH)
    }

    /// Whether Waydroid boots from an image bundled outside its work directory
    pub fn is_preinstalled_image(&self) -> bool {
        PREINSTALLED_IMAGES_PATHS.contains(&self.images_path())
    }

    pub fn system_ota(&self) -> Result<&str> {
        self.required("system_ota")
    }

    pub fn vendor_ota(&self) -> Result<&str> {
        self.required("vendor_ota")
    }

    /// Build timestamp of the installed system image
    pub fn system_datetime(&self) -> Result<i64> {
        self.timestamp("system_datetime")
    }

    /// Build timestamp of the installed vendor image
    pub fn vendor_datetime(&self) -> Result<i64> {
        self.timestamp("vendor_datetime")
    }

    fn required(&self, key: &str) -> Result<&str> {
        self.get(key)
            .ok_or_else(|| UpgradeError::Config(format!("missing \"{key}\" in [{SECTION}]")))
    }

    fn timestamp(&self, key: &str) -> Result<i64> {
        let value = self.required(key)?;
        value.trim().parse::<i64>().map_err(|e| {
            UpgradeError::Config(format!("invalid {key} \"{value}\": {e}"))
        })
    }
}
