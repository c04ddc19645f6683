use std::collections::HashSet;
use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::FootprintError;
use crate::schema::scope;

/// Emissions-accounting scope. Closed set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Scope {
    #[serde(rename = "Scope 1: Direct Emissions", alias = "scope1")]
    Direct,
    #[serde(
        rename = "Scope 2: Indirect Emissions - Purchased Energy",
        alias = "scope2"
    )]
    PurchasedEnergy,
    #[serde(rename = "Scope 3: Indirect Emissions - Value Chain", alias = "scope3")]
    ValueChain,
}

impl Scope {
    pub const ALL: [Scope; 3] = [Scope::Direct, Scope::PurchasedEnergy, Scope::ValueChain];

    pub fn label(self) -> &'static str {
        match self {
            Scope::Direct => scope::SCOPE_1,
            Scope::PurchasedEnergy => scope::SCOPE_2,
            Scope::ValueChain => scope::SCOPE_3,
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// kg CO2e per `unit` of activity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmissionFactor {
    pub factor: f64,
    pub unit: String,
    pub scope: Scope,
    pub category: String,
}

impl EmissionFactor {
    pub fn new(factor: f64, unit: &str, scope: Scope, category: &str) -> Self {
        Self {
            factor,
            unit: unit.to_string(),
            scope,
            category: category.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct TableFile {
    default: EmissionFactor,
    factors: Vec<FactorFileEntry>,
}

#[derive(Debug, Deserialize)]
struct FactorFileEntry {
    activity: String,
    #[serde(flatten)]
    factor: EmissionFactor,
}

/// Immutable activity → factor mapping plus the fallback of last resort.
///
/// Entry order is significant: the category-substring fallback picks the
/// first entry in table order.
#[derive(Debug, Clone, PartialEq)]
pub struct EmissionFactorTable {
    entries: Vec<(String, EmissionFactor)>,
    default: EmissionFactor,
}

impl EmissionFactorTable {
    /// Build a table, normalizing keys to trimmed lowercase.
    pub fn new(
        entries: Vec<(String, EmissionFactor)>,
        default: EmissionFactor,
    ) -> Result<Self, FootprintError> {
        validate_factor("default", &default)?;

        let mut seen = HashSet::new();
        let mut normalized = Vec::with_capacity(entries.len());
        for (activity, factor) in entries {
            let key = activity.trim().to_lowercase();
            if key.is_empty() {
                return Err(FootprintError::InvalidFactorTable(
                    "activity names must not be empty".into(),
                ));
            }
            if !seen.insert(key.clone()) {
                return Err(FootprintError::InvalidFactorTable(format!(
                    "duplicate activity '{key}'"
                )));
            }
            validate_factor(&key, &factor)?;
            normalized.push((key, factor));
        }

        Ok(Self {
            entries: normalized,
            default,
        })
    }

    /// The reference table shipped with the tool.
    pub fn builtin() -> Self {
        use Scope::*;
        let rows: [(&str, f64, &str, Scope, &str); 13] = [
            ("electricity", 0.4, "kWh", PurchasedEnergy, "Energy"),
            ("natural gas", 2.0, "therm", Direct, "Energy"),
            ("gasoline", 2.3, "liter", Direct, "Travel"),
            ("diesel", 2.7, "liter", Direct, "Travel"),
            ("flights", 0.15, "km", ValueChain, "Travel"),
            ("hotel stays", 25.0, "night", ValueChain, "Travel"),
            ("waste", 0.5, "kg", ValueChain, "Operations"),
            ("water", 0.3, "m3", ValueChain, "Operations"),
            ("commuting", 0.12, "km", ValueChain, "Travel"),
            ("business travel - rail", 0.04, "km", ValueChain, "Travel"),
            ("refrigerants", 1500.0, "kg", Direct, "Operations"),
            ("office supplies", 5.0, "item_bundle", ValueChain, "Operations"),
            ("cloud computing", 0.05, "hour_cpu", ValueChain, "Operations"),
        ];

        Self {
            entries: rows
                .iter()
                .map(|&(activity, factor, unit, scope, category)| {
                    (
                        activity.to_string(),
                        EmissionFactor::new(factor, unit, scope, category),
                    )
                })
                .collect(),
            default: EmissionFactor::new(1.0, "unit", ValueChain, "Other"),
        }
    }

    pub fn from_json_str(json: &str) -> Result<Self, FootprintError> {
        let file: TableFile = serde_json::from_str(json)?;
        Self::new(
            file.factors
                .into_iter()
                .map(|e| (e.activity, e.factor))
                .collect(),
            file.default,
        )
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, FootprintError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Exact lookup by normalized activity name.
    pub fn get(&self, activity: &str) -> Option<&EmissionFactor> {
        self.entries
            .iter()
            .find(|(key, _)| key == activity)
            .map(|(_, factor)| factor)
    }

    /// Entries in table order.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &EmissionFactor)> {
        self.entries.iter().map(|(k, f)| (k.as_str(), f))
    }

    pub fn default_factor(&self) -> &EmissionFactor {
        &self.default
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for EmissionFactorTable {
    fn default() -> Self {
        Self::builtin()
    }
}

fn validate_factor(name: &str, factor: &EmissionFactor) -> Result<(), FootprintError> {
    if !factor.factor.is_finite() {
        return Err(FootprintError::InvalidFactorTable(format!(
            "factor for '{name}' must be a finite number"
        )));
    }
    if factor.category.trim().is_empty() {
        return Err(FootprintError::InvalidFactorTable(format!(
            "category for '{name}' must not be empty"
        )));
    }
    Ok(())
}
