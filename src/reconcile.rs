//! Joins the primary record set with the optional stock, sales and day-count
//! record sets on the location/item pair.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use crate::error::{Result, ToolError};
use crate::key::build_pairs;
use crate::model::{CanonicalField, RecordSet, SourceKind};
use crate::numeric::coerce_number;
use crate::resolve::resolve_header;

/// The record sets taking part in one merge. Only the primary is required.
#[derive(Debug, Clone, Default)]
pub struct ReconcileInputs {
    pub primary: Option<RecordSet>,
    pub stock: Option<RecordSet>,
    pub sales: Option<RecordSet>,
    pub day_count: Option<RecordSet>,
}

/// Columns picked by hand, keyed by source role and canonical field.
///
/// A selection replaces automatic resolution for that field. Serialised as
/// `{"primary": {"location_code": "Depo"}}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ColumnOverrides {
    selections: BTreeMap<SourceKind, BTreeMap<CanonicalField, String>>,
}

impl ColumnOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a JSON overrides document.
    pub fn from_json(document: &str) -> Result<Self> {
        Ok(serde_json::from_str(document)?)
    }

    /// Records a manual selection, replacing any earlier one.
    pub fn set(&mut self, role: SourceKind, field: CanonicalField, header: impl Into<String>) {
        self.selections
            .entry(role)
            .or_default()
            .insert(field, header.into());
    }

    pub fn get(&self, role: SourceKind, field: CanonicalField) -> Option<&str> {
        self.selections
            .get(&role)
            .and_then(|fields| fields.get(&field))
            .map(String::as_str)
    }

    /// Applies an assignment of the form `source:field=Header`.
    pub fn apply_assignment(&mut self, assignment: &str) -> Result<()> {
        let invalid = || ToolError::InvalidOverride(assignment.to_string());
        let (target, header) = assignment.split_once('=').ok_or_else(invalid)?;
        let (role, field) = target.split_once(':').ok_or_else(invalid)?;
        let role: SourceKind = role.parse().map_err(|_| invalid())?;
        let field: CanonicalField = field.parse().map_err(|_| invalid())?;
        if header.is_empty() {
            return Err(invalid());
        }
        self.set(role, field, header);
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.selections.values().all(BTreeMap::is_empty)
    }
}

/// One merged row, in primary order.
///
/// `None` in an auxiliary field means the source was not supplied at all; a
/// supplied source without a matching pair yields `Some(0)`.
#[derive(Debug, Clone, PartialEq)]
pub struct MergedRow {
    pub pair: String,
    pub location_code: String,
    pub location_name: String,
    pub item_code: String,
    pub item_description: String,
    pub minimum_quantity: f64,
    pub stock: Option<f64>,
    pub sales: Option<f64>,
    pub day_count: Option<u64>,
}

/// Counters describing how one auxiliary source joined.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceReport {
    pub role: SourceKind,
    pub rows: usize,
    pub distinct_pairs: usize,
    /// Rows dropped because an earlier row carried the same pair. Always zero
    /// for the day-count source, which aggregates instead.
    pub duplicates_discarded: usize,
    /// Primary rows whose pair had no entry in this source.
    pub unmatched_primary_rows: usize,
}

/// Summary of a merge run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReconcileReport {
    pub primary_rows: usize,
    pub sources: Vec<SourceReport>,
}

/// Merged rows together with the run summary.
#[derive(Debug, Clone, PartialEq)]
pub struct Reconciliation {
    pub rows: Vec<MergedRow>,
    pub report: ReconcileReport,
}

/// Picks the column for every field `role` requires, honouring manual
/// selections before automatic resolution.
pub fn resolve_columns(
    records: &RecordSet,
    role: SourceKind,
    overrides: &ColumnOverrides,
) -> Result<BTreeMap<CanonicalField, String>> {
    let mut columns = BTreeMap::new();
    for &field in role.required_fields() {
        let header = match overrides.get(role, field) {
            Some(header) => {
                if records.column_index(header).is_none() {
                    return Err(ToolError::UnknownColumn {
                        role,
                        field,
                        header: header.to_string(),
                    });
                }
                debug!(%role, %field, header, "using manually selected column");
                header.to_string()
            }
            None => resolve_header(records.headers(), field, role)?,
        };
        columns.insert(field, header);
    }
    Ok(columns)
}

/// Pair keys and coerced values of one auxiliary source, in source order.
struct KeyedValues {
    pairs: Vec<String>,
    values: Vec<f64>,
}

fn keyed_values(
    mut records: RecordSet,
    role: SourceKind,
    overrides: &ColumnOverrides,
) -> Result<KeyedValues> {
    let columns = resolve_columns(&records, role, overrides)?;
    let location = &columns[&CanonicalField::LocationCode];
    let item = &columns[&CanonicalField::ItemCode];
    let value = &columns[&role.value_field()];

    let pairs = build_pairs(&mut records, location, item);
    let values = records.column(value).map(coerce_number).collect();
    Ok(KeyedValues { pairs, values })
}

/// Keeps the first value seen for every pair. Returns the map and the number
/// of later rows that were dropped.
pub fn first_value_per_pair(pairs: &[String], values: &[f64]) -> (HashMap<String, f64>, usize) {
    let mut map = HashMap::with_capacity(pairs.len());
    let mut discarded = 0;
    for (pair, value) in pairs.iter().zip(values) {
        if map.contains_key(pair) {
            discarded += 1;
        } else {
            map.insert(pair.clone(), *value);
        }
    }
    (map, discarded)
}

/// Counts, per pair, the rows whose quantity is strictly positive. Every pair
/// present in the source gets an entry, possibly zero.
pub fn positive_days_per_pair(pairs: &[String], quantities: &[f64]) -> HashMap<String, u64> {
    let mut counts: HashMap<String, u64> = HashMap::with_capacity(pairs.len());
    for (pair, quantity) in pairs.iter().zip(quantities) {
        *counts.entry(pair.clone()).or_insert(0) += u64::from(*quantity > 0.0);
    }
    counts
}

/// Lookup table built from one auxiliary source.
struct AuxiliaryTable<T> {
    values: HashMap<String, T>,
    report: SourceReport,
}

impl<T: Copy + Default> AuxiliaryTable<T> {
    /// Value for `pair`, defaulting to zero and counting the miss.
    fn lookup(&mut self, pair: &str) -> T {
        match self.values.get(pair) {
            Some(value) => *value,
            None => {
                self.report.unmatched_primary_rows += 1;
                T::default()
            }
        }
    }
}

fn first_wins_table(
    records: Option<RecordSet>,
    role: SourceKind,
    overrides: &ColumnOverrides,
) -> Result<Option<AuxiliaryTable<f64>>> {
    let Some(records) = records else {
        debug!(%role, "source not supplied, values default to zero");
        return Ok(None);
    };

    let rows = records.len();
    let keyed = keyed_values(records, role, overrides)?;
    let (values, duplicates_discarded) = first_value_per_pair(&keyed.pairs, &keyed.values);
    if duplicates_discarded > 0 {
        debug!(%role, duplicates_discarded, "kept the first row of duplicated pairs");
    }
    info!(%role, rows, distinct_pairs = values.len(), "loaded auxiliary source");

    Ok(Some(AuxiliaryTable {
        report: SourceReport {
            role,
            rows,
            distinct_pairs: values.len(),
            duplicates_discarded,
            unmatched_primary_rows: 0,
        },
        values,
    }))
}

fn day_count_table(
    records: Option<RecordSet>,
    overrides: &ColumnOverrides,
) -> Result<Option<AuxiliaryTable<u64>>> {
    let role = SourceKind::DayCount;
    let Some(records) = records else {
        debug!(%role, "source not supplied, values default to zero");
        return Ok(None);
    };

    let rows = records.len();
    let keyed = keyed_values(records, role, overrides)?;
    let values = positive_days_per_pair(&keyed.pairs, &keyed.values);
    info!(%role, rows, distinct_pairs = values.len(), "loaded auxiliary source");

    Ok(Some(AuxiliaryTable {
        report: SourceReport {
            role,
            rows,
            distinct_pairs: values.len(),
            duplicates_discarded: 0,
            unmatched_primary_rows: 0,
        },
        values,
    }))
}

/// Merges the inputs into one row per primary row, preserving primary order.
///
/// Fails with [`ToolError::MissingPrimarySource`] when no primary record set
/// is given and with [`ToolError::HeaderNotFound`] or
/// [`ToolError::UnknownColumn`] when a required column cannot be located.
/// Unparseable numbers become zero and duplicate pairs are settled per
/// source; neither is reported as an error.
#[instrument(level = "info", skip_all)]
pub fn reconcile(inputs: ReconcileInputs, overrides: &ColumnOverrides) -> Result<Reconciliation> {
    let ReconcileInputs {
        primary,
        stock,
        sales,
        day_count,
    } = inputs;
    let mut primary = primary.ok_or(ToolError::MissingPrimarySource)?;

    let columns = resolve_columns(&primary, SourceKind::Primary, overrides)?;
    let column = |field: CanonicalField| columns[&field].as_str();

    let mut stock = first_wins_table(stock, SourceKind::Stock, overrides)?;
    let mut sales = first_wins_table(sales, SourceKind::Sales, overrides)?;
    let mut day_count = day_count_table(day_count, overrides)?;

    let pairs = build_pairs(
        &mut primary,
        column(CanonicalField::LocationCode),
        column(CanonicalField::ItemCode),
    );
    info!(rows = primary.len(), "loaded primary source");

    let text = |row: usize, field: CanonicalField| {
        primary
            .value(row, column(field))
            .unwrap_or_default()
            .to_string()
    };

    let mut rows = Vec::with_capacity(pairs.len());
    for (row, pair) in pairs.into_iter().enumerate() {
        let merged = MergedRow {
            location_code: text(row, CanonicalField::LocationCode),
            location_name: text(row, CanonicalField::LocationName),
            item_code: text(row, CanonicalField::ItemCode),
            item_description: text(row, CanonicalField::ItemDescription),
            minimum_quantity: coerce_number(
                primary.value(row, column(CanonicalField::MinimumQuantity)),
            ),
            stock: stock.as_mut().map(|table| table.lookup(&pair)),
            sales: sales.as_mut().map(|table| table.lookup(&pair)),
            day_count: day_count.as_mut().map(|table| table.lookup(&pair)),
            pair,
        };
        rows.push(merged);
    }

    let mut sources = Vec::new();
    sources.extend(stock.map(|table| table.report));
    sources.extend(sales.map(|table| table.report));
    sources.extend(day_count.map(|table| table.report));
    for source in &sources {
        if source.unmatched_primary_rows > 0 {
            warn!(
                role = %source.role,
                unmatched = source.unmatched_primary_rows,
                "primary pairs without a match, filled with zero"
            );
        }
    }

    Ok(Reconciliation {
        report: ReconcileReport {
            primary_rows: rows.len(),
            sources,
        },
        rows,
    })
}
