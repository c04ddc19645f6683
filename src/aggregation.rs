use std::collections::HashMap;

use polars::prelude::*;
use serde::{Deserialize, Serialize};

use crate::calculator::EmissionRecord;
use crate::error::FootprintError;
use crate::schema::{detailed, summary};

/// One slice of a breakdown: a scope label or a category name with its kg CO2e.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryItem {
    pub name: String,
    pub value: f64,
}

/// A summary item together with its share of the total, in percent.
#[derive(Debug, Clone, PartialEq)]
pub struct Share {
    pub name: String,
    pub value: f64,
    pub percent: f64,
}

/// Round half away from zero to two decimals. Values too large to scale
/// have no fractional part and come back unchanged.
pub fn round2(value: f64) -> f64 {
    let scaled = value * 100.0;
    if scaled.is_finite() {
        scaled.round() / 100.0
    } else {
        value
    }
}

/// Sum `co2e` per group key, keeping groups in first-seen order.
pub fn sum_by<F>(records: &[EmissionRecord], key: F) -> Vec<SummaryItem>
where
    F: Fn(&EmissionRecord) -> &str,
{
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut groups: Vec<SummaryItem> = Vec::new();

    for record in records {
        let name = key(record);
        match index.get(name) {
            Some(&i) => groups[i].value += record.co2e,
            None => {
                index.insert(name, groups.len());
                groups.push(SummaryItem {
                    name: name.to_string(),
                    value: record.co2e,
                });
            }
        }
    }

    for group in &mut groups {
        group.value = round2(group.value);
    }
    groups
}

/// Attach percentage shares. A non-positive total yields 0% everywhere.
pub fn with_shares(items: &[SummaryItem], total: f64) -> Vec<Share> {
    items
        .iter()
        .map(|item| Share {
            name: item.name.clone(),
            value: item.value,
            percent: if total > 0.0 {
                item.value / total * 100.0
            } else {
                0.0
            },
        })
        .collect()
}

/// Largest `n` items by value, ties keep their original order.
pub fn top_n(items: &[SummaryItem], n: usize) -> Vec<SummaryItem> {
    let mut sorted = items.to_vec();
    sorted.sort_by(|a, b| b.value.total_cmp(&a.value));
    sorted.truncate(n);
    sorted
}

// ── Polars frames ───────────────────────────────────────────────────────────

/// Two-column frame (`name`, `value`) for a breakdown.
pub fn summary_frame(items: &[SummaryItem]) -> Result<DataFrame, FootprintError> {
    let names: Vec<&str> = items.iter().map(|i| i.name.as_str()).collect();
    let values: Vec<f64> = items.iter().map(|i| i.value).collect();

    let df = DataFrame::new(vec![
        Column::new(summary::NAME.into(), &names),
        Column::new(summary::VALUE.into(), &values),
    ])?;
    Ok(df)
}

/// One row per emission record, in input order.
pub fn detailed_frame(records: &[EmissionRecord]) -> Result<DataFrame, FootprintError> {
    let mut ids = Vec::with_capacity(records.len());
    let mut activities = Vec::with_capacity(records.len());
    let mut quantities = Vec::with_capacity(records.len());
    let mut units = Vec::with_capacity(records.len());
    let mut categories = Vec::with_capacity(records.len());
    let mut scopes = Vec::with_capacity(records.len());
    let mut co2e = Vec::with_capacity(records.len());

    for r in records {
        ids.push(r.id.as_str());
        activities.push(r.activity.as_str());
        quantities.push(r.quantity);
        units.push(r.unit.as_str());
        categories.push(r.category.as_str());
        scopes.push(r.scope.label());
        co2e.push(r.co2e);
    }

    let df = DataFrame::new(vec![
        Column::new(detailed::ID.into(), &ids),
        Column::new(detailed::ACTIVITY.into(), &activities),
        Column::new(detailed::QUANTITY.into(), &quantities),
        Column::new(detailed::UNIT.into(), &units),
        Column::new(detailed::CATEGORY.into(), &categories),
        Column::new(detailed::SCOPE.into(), &scopes),
        Column::new(detailed::CO2E.into(), &co2e),
    ])?;
    Ok(df)
}
