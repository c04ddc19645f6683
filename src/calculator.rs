use std::fmt;

use polars::prelude::DataFrame;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::aggregation::{self, round2, SummaryItem};
use crate::error::FootprintError;
use crate::factors::{EmissionFactorTable, Scope};
use crate::ingest::RawTable;
use crate::resolver::ResolverChain;
use crate::schema::activity;

/// One validated input row.
#[derive(Debug, Clone, PartialEq)]
pub struct ActivityRow {
    /// Trimmed, original case. Used for display.
    pub activity: String,
    pub quantity: f64,
    /// Trimmed, original case. Used for display.
    pub unit: String,
}

impl ActivityRow {
    /// Key used for factor lookup.
    pub fn lookup_key(&self) -> String {
        self.activity.to_lowercase()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmissionRecord {
    pub id: String,
    pub activity: String,
    pub quantity: f64,
    pub unit: String,
    pub scope: Scope,
    pub category: String,
    pub co2e: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FootprintResult {
    #[serde(rename = "totalCO2e")]
    pub total_co2e: f64,
    pub detailed: Vec<EmissionRecord>,
    #[serde(rename = "byScope")]
    pub by_scope: Vec<SummaryItem>,
    #[serde(rename = "byCategory")]
    pub by_category: Vec<SummaryItem>,
}

impl FootprintResult {
    pub fn metric_tons(&self) -> f64 {
        self.total_co2e / 1000.0
    }

    /// Rough passenger-car equivalent shown next to the total.
    pub fn driving_miles_equivalent(&self) -> f64 {
        (self.total_co2e * 2.4).round()
    }

    pub fn to_json(&self) -> Result<String, FootprintError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn detailed_frame(&self) -> Result<DataFrame, FootprintError> {
        aggregation::detailed_frame(&self.detailed)
    }

    pub fn by_scope_frame(&self) -> Result<DataFrame, FootprintError> {
        aggregation::summary_frame(&self.by_scope)
    }

    pub fn by_category_frame(&self) -> Result<DataFrame, FootprintError> {
        aggregation::summary_frame(&self.by_category)
    }
}

/// Why a data row contributed nothing.
#[derive(Debug, Clone, PartialEq)]
pub enum SkipReason {
    /// Fewer cells than the rightmost required column.
    TooShort,
    Blank,
    MissingActivity,
    InvalidQuantity(String),
    MissingUnit,
    /// Quantity times factor, or the running total, left the f64 range.
    EmissionsOverflow,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::TooShort => f.write_str("row has too few columns"),
            SkipReason::Blank => f.write_str("row is blank"),
            SkipReason::MissingActivity => f.write_str("activity is empty"),
            SkipReason::InvalidQuantity(raw) => write!(f, "quantity '{raw}' is not a number"),
            SkipReason::MissingUnit => f.write_str("unit is empty"),
            SkipReason::EmissionsOverflow => f.write_str("emissions are out of range"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SkippedRow {
    /// 1-based line in the CSV, header being line 1.
    pub line: usize,
    pub reason: SkipReason,
}

/// A computed footprint together with the rows that were left out.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    pub result: FootprintResult,
    pub skipped: Vec<SkippedRow>,
}

/// Positions of the required columns, resolved by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnIndex {
    pub activity: usize,
    pub quantity: usize,
    pub unit: usize,
}

impl ColumnIndex {
    /// Case- and whitespace-insensitive header lookup. First occurrence wins.
    pub fn resolve<H: AsRef<str>>(header: &[H]) -> Result<Self, FootprintError> {
        let normalized: Vec<String> = header
            .iter()
            .map(|h| h.as_ref().trim().to_lowercase())
            .collect();
        let position = |name: &str| normalized.iter().position(|h| h == name);

        let found = activity::REQUIRED.map(position);
        match found {
            [Some(activity), Some(quantity), Some(unit)] => Ok(Self {
                activity,
                quantity,
                unit,
            }),
            _ => Err(FootprintError::MissingColumns {
                missing: activity::REQUIRED
                    .iter()
                    .zip(found)
                    .filter(|(_, pos)| pos.is_none())
                    .map(|(name, _)| name.to_string())
                    .collect(),
            }),
        }
    }

    fn min_row_len(&self) -> usize {
        self.activity.max(self.quantity).max(self.unit) + 1
    }

    /// Extract and validate one data row.
    pub fn parse_row<C: AsRef<str>>(&self, row: &[C]) -> Result<ActivityRow, SkipReason> {
        if row.iter().all(|cell| cell.as_ref().trim().is_empty()) {
            return Err(SkipReason::Blank);
        }
        if row.len() < self.min_row_len() {
            return Err(SkipReason::TooShort);
        }

        let activity = row[self.activity].as_ref().trim();
        if activity.is_empty() {
            return Err(SkipReason::MissingActivity);
        }

        let raw_quantity = row[self.quantity].as_ref().trim();
        let quantity = match leading_number(raw_quantity) {
            Some(q) if q.is_finite() => q,
            _ => return Err(SkipReason::InvalidQuantity(raw_quantity.to_string())),
        };

        let unit = row[self.unit].as_ref().trim();
        if unit.is_empty() {
            return Err(SkipReason::MissingUnit);
        }

        Ok(ActivityRow {
            activity: activity.to_string(),
            quantity,
            unit: unit.to_string(),
        })
    }
}

/// Longest decimal literal at the start of `cell`, so `"1500 kWh"` reads as
/// 1500. Trailing text is ignored; no leading digits means no number.
fn leading_number(cell: &str) -> Option<f64> {
    let bytes = cell.as_bytes();
    let digits_end = |from: usize| {
        from + bytes[from.min(bytes.len())..]
            .iter()
            .take_while(|b| b.is_ascii_digit())
            .count()
    };

    let mut end = usize::from(matches!(bytes.first(), Some(b'+' | b'-')));
    let int_end = digits_end(end);
    let mut has_digits = int_end > end;
    end = int_end;

    if bytes.get(end) == Some(&b'.') {
        let frac_end = digits_end(end + 1);
        if has_digits || frac_end > end + 1 {
            has_digits = true;
            end = frac_end;
        }
    }
    if !has_digits {
        return None;
    }

    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp = end + 1;
        if matches!(bytes.get(exp), Some(b'+' | b'-')) {
            exp += 1;
        }
        let exp_end = digits_end(exp);
        if exp_end > exp {
            end = exp_end;
        }
    }

    cell[..end].parse().ok()
}

/// Maps activity rows to emission factors and aggregates the result.
///
/// Pure over its inputs: the table and resolver chain are fixed at
/// construction and every call builds a fresh result.
#[derive(Debug)]
pub struct FootprintCalculator {
    table: EmissionFactorTable,
    resolvers: ResolverChain,
}

impl FootprintCalculator {
    pub fn new(table: EmissionFactorTable) -> Self {
        Self::with_resolvers(table, ResolverChain::standard())
    }

    pub fn with_resolvers(table: EmissionFactorTable, resolvers: ResolverChain) -> Self {
        Self { table, resolvers }
    }

    pub fn table(&self) -> &EmissionFactorTable {
        &self.table
    }

    pub fn compute<H, C>(
        &self,
        header: &[H],
        rows: &[Vec<C>],
    ) -> Result<FootprintResult, FootprintError>
    where
        H: AsRef<str>,
        C: AsRef<str>,
    {
        self.evaluate(header, rows).map(|e| e.result)
    }

    pub fn compute_table(&self, table: &RawTable) -> Result<FootprintResult, FootprintError> {
        self.compute(&table.header, &table.rows)
    }

    /// Like [`compute`](Self::compute), also reporting skipped rows.
    pub fn evaluate<H, C>(
        &self,
        header: &[H],
        rows: &[Vec<C>],
    ) -> Result<Evaluation, FootprintError>
    where
        H: AsRef<str>,
        C: AsRef<str>,
    {
        let columns = ColumnIndex::resolve(header)?;

        let mut detailed = Vec::new();
        let mut skipped = Vec::new();
        let mut running = 0.0_f64;

        for (index, row) in rows.iter().enumerate() {
            let line = index + 2;
            let parsed = match columns.parse_row(row) {
                Ok(parsed) => parsed,
                Err(reason) => {
                    warn!(line, %reason, "skipping activity row");
                    skipped.push(SkippedRow { line, reason });
                    continue;
                }
            };

            let key = parsed.lookup_key();
            let (factor, matched) = self.resolvers.resolve(&key, &self.table);
            debug!(line, activity = %key, ?matched, factor = factor.factor, "resolved emission factor");

            let co2e = round2(parsed.quantity * factor.factor);
            if !co2e.is_finite() || !(running + co2e).is_finite() {
                let reason = SkipReason::EmissionsOverflow;
                warn!(line, %reason, "skipping activity row");
                skipped.push(SkippedRow { line, reason });
                continue;
            }
            running += co2e;

            detailed.push(EmissionRecord {
                id: format!("item-{index}"),
                activity: parsed.activity,
                quantity: parsed.quantity,
                unit: parsed.unit,
                scope: factor.scope,
                category: factor.category.clone(),
                co2e,
            });
        }

        if detailed.is_empty() {
            return Err(FootprintError::NoValidActivities);
        }

        let total_co2e = round2(detailed.iter().map(|r| r.co2e).sum());
        let by_scope = aggregation::sum_by(&detailed, |r| r.scope.label());
        let by_category = aggregation::sum_by(&detailed, |r| r.category.as_str());

        info!(
            records = detailed.len(),
            skipped = skipped.len(),
            total_co2e,
            "computed carbon footprint"
        );

        Ok(Evaluation {
            result: FootprintResult {
                total_co2e,
                detailed,
                by_scope,
                by_category,
            },
            skipped,
        })
    }
}

impl Default for FootprintCalculator {
    fn default() -> Self {
        Self::new(EmissionFactorTable::builtin())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::factors::EmissionFactor;

    const HEADER: [&str; 3] = ["Activity", "Quantity", "Unit"];

    fn rows(data: &[&[&str]]) -> Vec<Vec<String>> {
        data.iter()
            .map(|r| r.iter().map(|c| c.to_string()).collect())
            .collect()
    }

    #[test]
    fn electricity_exact_match() {
        let calc = FootprintCalculator::default();
        let result = calc
            .compute(&HEADER, &rows(&[&["electricity", "1500", "kWh"]]))
            .unwrap();

        assert_eq!(result.total_co2e, 600.0);
        let record = &result.detailed[0];
        assert_eq!(record.id, "item-0");
        assert_eq!(record.co2e, 600.0);
        assert_eq!(record.scope.label(), "Scope 2: Indirect Emissions - Purchased Energy");
        assert_eq!(record.category, "Energy");
        assert_eq!(record.unit, "kWh");
    }

    #[test]
    fn header_lookup_is_order_and_case_insensitive() {
        let reordered = ColumnIndex::resolve(&["Unit", "Activity", "Quantity"]).unwrap();
        assert_eq!(
            reordered,
            ColumnIndex { activity: 1, quantity: 2, unit: 0 }
        );
        assert!(ColumnIndex::resolve(&["activity", "quantity", "unit"]).is_ok());
        assert!(ColumnIndex::resolve(&["  ACTIVITY ", "Quantity\t", " unit", "Date"]).is_ok());
    }

    #[test]
    fn missing_quantity_column_is_structural_error() {
        let calc = FootprintCalculator::default();
        let err = calc
            .compute(&["Activity", "Unit"], &rows(&[&["electricity", "kWh"]]))
            .unwrap_err();
        match err {
            FootprintError::MissingColumns { missing } => assert_eq!(missing, vec!["quantity"]),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn header_only_input_is_empty_result() {
        let calc = FootprintCalculator::default();
        let err = calc.compute(&HEADER, &Vec::<Vec<String>>::new()).unwrap_err();
        assert!(matches!(err, FootprintError::NoValidActivities));
    }

    #[test]
    fn invalid_rows_are_skipped_silently() {
        let calc = FootprintCalculator::default();
        let data = rows(&[
            &["electricity", "abc", "kWh"],
            &["", "", ""],
            &["water", "20"],
            &["", "5", "kg"],
            &["waste", "10", "  "],
            &["diesel", "inf", "liter"],
            &["natural gas", "200", "therm"],
        ]);
        let eval = calc.evaluate(&HEADER, &data).unwrap();

        assert_eq!(eval.result.detailed.len(), 1);
        assert_eq!(eval.result.detailed[0].id, "item-6");
        assert_eq!(eval.result.total_co2e, 400.0);

        let reasons: Vec<&SkipReason> = eval.skipped.iter().map(|s| &s.reason).collect();
        assert_eq!(
            reasons,
            vec![
                &SkipReason::InvalidQuantity("abc".into()),
                &SkipReason::Blank,
                &SkipReason::TooShort,
                &SkipReason::MissingActivity,
                &SkipReason::MissingUnit,
                &SkipReason::InvalidQuantity("inf".into()),
            ]
        );
        assert_eq!(eval.skipped[0].line, 2);
    }

    #[test]
    fn quantity_reads_leading_number() {
        let calc = FootprintCalculator::default();
        let data = rows(&[
            &["electricity", "1500 kWh", "kWh"],
            &["waste", "12kg", "kg"],
            &["water", ".5", "m3"],
            &["diesel", "1e1 liters", "liter"],
            &["commuting", "100e", "km"],
            &["flights", "-", "km"],
            &["hotel stays", "Infinity", "night"],
        ]);
        let eval = calc.evaluate(&HEADER, &data).unwrap();

        let co2e: Vec<f64> = eval.result.detailed.iter().map(|r| r.co2e).collect();
        assert_eq!(co2e, vec![600.0, 6.0, 0.15, 27.0, 12.0]);
        assert_eq!(eval.result.detailed[0].quantity, 1500.0);
        assert_eq!(
            eval.skipped.iter().map(|s| &s.reason).collect::<Vec<_>>(),
            vec![
                &SkipReason::InvalidQuantity("-".into()),
                &SkipReason::InvalidQuantity("Infinity".into()),
            ]
        );
    }

    #[test]
    fn leading_number_edge_cases() {
        assert_eq!(leading_number("5."), Some(5.0));
        assert_eq!(leading_number("+2.5e-1x"), Some(0.25));
        assert_eq!(leading_number("3.2.1"), Some(3.2));
        assert_eq!(leading_number("."), None);
        assert_eq!(leading_number("kg 12"), None);
        assert_eq!(leading_number(""), None);
    }

    #[test]
    fn empty_row_is_blank() {
        let index = ColumnIndex::resolve(&HEADER).unwrap();
        assert_eq!(index.parse_row::<&str>(&[]), Err(SkipReason::Blank));
        assert_eq!(index.parse_row(&["water", "20"]), Err(SkipReason::TooShort));
    }

    #[test]
    fn overflowing_emissions_are_skipped() {
        let calc = FootprintCalculator::default();
        let data = rows(&[
            &["refrigerants", "1e308", "kg"],
            &["natural gas", "8e307", "therm"],
            &["natural gas", "8e307", "therm"],
            &["electricity", "1500", "kWh"],
        ]);
        let eval = calc.evaluate(&HEADER, &data).unwrap();

        let ids: Vec<&str> = eval.result.detailed.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["item-1", "item-3"]);
        assert_eq!(
            eval.skipped,
            vec![
                SkippedRow { line: 2, reason: SkipReason::EmissionsOverflow },
                SkippedRow { line: 4, reason: SkipReason::EmissionsOverflow },
            ]
        );
        assert!(eval.result.total_co2e.is_finite());
        assert!(eval.result.by_scope.iter().all(|s| s.value.is_finite()));
        assert!(!eval.result.to_json().unwrap().contains("null"));
    }

    #[test]
    fn all_rows_invalid_is_empty_result() {
        let calc = FootprintCalculator::default();
        let err = calc
            .compute(&HEADER, &rows(&[&["electricity", "abc", "kWh"], &["", "", ""]]))
            .unwrap_err();
        assert!(matches!(err, FootprintError::NoValidActivities));
    }

    #[test]
    fn display_strings_keep_case_lookup_ignores_it() {
        let calc = FootprintCalculator::default();
        let result = calc
            .compute(&HEADER, &rows(&[&["  Natural GAS ", " 2.5 ", " Therm"]]))
            .unwrap();
        let record = &result.detailed[0];
        assert_eq!(record.activity, "Natural GAS");
        assert_eq!(record.unit, "Therm");
        assert_eq!(record.co2e, 5.0);
        assert_eq!(record.scope, Scope::Direct);
    }

    #[test]
    fn travel_substring_and_default_fallbacks() {
        let calc = FootprintCalculator::default();
        let result = calc
            .compute(
                &HEADER,
                &rows(&[&["Team Travel", "10", "trip"], &["Flight - NYC to LON", "11000", "km"]]),
            )
            .unwrap();

        let travel = &result.detailed[0];
        assert_eq!(travel.category, "Travel");
        assert_eq!(travel.co2e, 23.0);

        let flight = &result.detailed[1];
        assert_eq!(flight.category, "Other");
        assert_eq!(flight.scope, Scope::ValueChain);
        assert_eq!(flight.co2e, 11000.0);
    }

    #[test]
    fn aggregates_preserve_first_seen_order() {
        let calc = FootprintCalculator::default();
        let result = calc
            .compute(
                &HEADER,
                &rows(&[
                    &["hotel stays", "2", "night"],
                    &["electricity", "100", "kWh"],
                    &["flights", "1000", "km"],
                ]),
            )
            .unwrap();

        let scopes: Vec<&str> = result.by_scope.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(scopes, vec![Scope::ValueChain.label(), Scope::PurchasedEnergy.label()]);
        assert_eq!(result.by_scope[0].value, 200.0);

        let categories: Vec<&str> = result.by_category.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(categories, vec!["Travel", "Energy"]);
        assert_eq!(result.total_co2e, 240.0);
    }

    #[test]
    fn substituted_table_is_used() {
        let table = EmissionFactorTable::new(
            vec![(
                "electricity".into(),
                EmissionFactor::new(0.1, "kWh", Scope::PurchasedEnergy, "Grid"),
            )],
            EmissionFactor::new(0.0, "unit", Scope::ValueChain, "Unmapped"),
        )
        .unwrap();
        let calc = FootprintCalculator::new(table);
        let result = calc
            .compute(&HEADER, &rows(&[&["electricity", "1500", "kWh"], &["paper", "3", "kg"]]))
            .unwrap();

        assert_eq!(result.detailed[0].co2e, 150.0);
        assert_eq!(result.detailed[1].category, "Unmapped");
        assert_eq!(result.total_co2e, 150.0);
    }

    #[test]
    fn serializes_with_presentation_field_names() {
        let calc = FootprintCalculator::default();
        let result = calc
            .compute(&HEADER, &rows(&[&["electricity", "1500", "kWh"]]))
            .unwrap();
        let json = result.to_json().unwrap();
        assert!(json.starts_with("{\"totalCO2e\":600.0,\"detailed\":["));
        assert!(json.contains("\"byScope\":[{\"name\":\"Scope 2: Indirect Emissions - Purchased Energy\",\"value\":600.0}]"));
        assert!(json.contains("\"byCategory\""));

        assert_eq!(result.metric_tons(), 0.6);
        assert_eq!(result.driving_miles_equivalent(), 1440.0);
    }
}
