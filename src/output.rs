use serde::Serialize;

use crate::reconcile::MergedRow;

/// Sheet name of the generated workbook.
pub const OUTPUT_SHEET: &str = "Output";

/// Column labels of the generated workbook, in output order.
pub const OUTPUT_COLUMNS: [&str; 9] = [
    "Pair",
    "Depo Kodu",
    "Depo Adı",
    "Madde Kodu",
    "Madde Açıklaması",
    "Minimum Miktar",
    "Stok",
    "Satış",
    "Envanter Gün Sayısı",
];

/// Final shape of one merged row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutputRow {
    pub pair: String,
    pub location_code: String,
    pub location_name: String,
    pub item_code: String,
    pub item_description: String,
    pub minimum_quantity: f64,
    pub stock: f64,
    pub sales: f64,
    pub inventory_day_count: u64,
}

impl OutputRow {
    /// Cells in [`OUTPUT_COLUMNS`] order.
    pub fn cells(&self) -> [Cell; 9] {
        [
            Cell::Text(self.pair.clone()),
            Cell::Text(self.location_code.clone()),
            Cell::Text(self.location_name.clone()),
            Cell::Text(self.item_code.clone()),
            Cell::Text(self.item_description.clone()),
            Cell::Number(self.minimum_quantity),
            Cell::Number(self.stock),
            Cell::Number(self.sales),
            Cell::Number(self.inventory_day_count as f64),
        ]
    }
}

impl From<&MergedRow> for OutputRow {
    fn from(row: &MergedRow) -> Self {
        Self {
            pair: row.pair.clone(),
            location_code: row.location_code.clone(),
            location_name: row.location_name.clone(),
            item_code: row.item_code.clone(),
            item_description: row.item_description.clone(),
            minimum_quantity: row.minimum_quantity,
            stock: row.stock.unwrap_or(0.0),
            sales: row.sales.unwrap_or(0.0),
            inventory_day_count: row.day_count.unwrap_or(0),
        }
    }
}

/// A typed worksheet cell.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    Number(f64),
}

/// A table that will be materialised as a single Excel sheet.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputTable {
    pub sheet_name: String,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

/// Projects merged rows into the fixed output column order, filling fields of
/// skipped sources with zero.
pub fn project(rows: &[MergedRow]) -> Vec<OutputRow> {
    rows.iter().map(OutputRow::from).collect()
}

/// Lays projected rows out as the output sheet.
pub fn build_table(rows: &[OutputRow]) -> OutputTable {
    OutputTable {
        sheet_name: OUTPUT_SHEET.to_string(),
        columns: OUTPUT_COLUMNS.iter().map(|label| label.to_string()).collect(),
        rows: rows.iter().map(|row| row.cells().to_vec()).collect(),
    }
}
