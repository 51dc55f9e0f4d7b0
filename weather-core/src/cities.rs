//! Read-only province -> cities lookup, loaded once at startup.

use std::{collections::HashMap, fs, path::Path};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;

/// A city entry. The data file may list plain names or objects flagging the
/// province's default city; either shape is kept as written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum City {
    Name(String),
    Detailed {
        name: String,
        #[serde(default, skip_serializing_if = "std::ops::Not::not")]
        default: bool,
    },
}

impl City {
    pub fn name(&self) -> &str {
        match self {
            City::Name(name) | City::Detailed { name, .. } => name,
        }
    }

    pub fn is_default(&self) -> bool {
        matches!(self, City::Detailed { default: true, .. })
    }
}

#[derive(Debug, Clone, Default)]
pub struct ProvinceDirectory {
    provinces: HashMap<String, Vec<City>>,
}

impl ProvinceDirectory {
    /// Load the directory from a JSON object `{ "<province>": [<city>, ...] }`.
    ///
    /// A missing or malformed file is an error; the server refuses to start
    /// without it.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read cities file: {}", path.display()))?;

        Self::from_json_str(&contents)
            .with_context(|| format!("Failed to parse cities file: {}", path.display()))
    }

    pub fn from_json_str(contents: &str) -> Result<Self> {
        let provinces: HashMap<String, Vec<City>> = serde_json::from_str(contents)?;
        Ok(Self { provinces })
    }

    /// Cities of `province`, in file order.
    pub fn cities(&self, province: &str) -> Result<&[City], ApiError> {
        self.provinces
            .get(province)
            .map(Vec::as_slice)
            .filter(|cities| !cities.is_empty())
            .ok_or_else(|| {
                ApiError::not_found(format!("no cities found for province: {province}"))
            })
    }

    pub fn is_province(&self, name: &str) -> bool {
        self.provinces.contains_key(name)
    }

    /// The city flagged as default, else the first one listed.
    pub fn default_city(&self, province: &str) -> Result<&City, ApiError> {
        let cities = self.cities(province)?;
        // `cities` never returns an empty slice.
        cities.iter().find(|c| c.is_default()).or(cities.first()).ok_or_else(|| {
            ApiError::not_found(format!("no cities found for province: {province}"))
        })
    }

    pub fn len(&self) -> usize {
        self.provinces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.provinces.is_empty()
    }
}
