use std::path::Path;

use rust_xlsxwriter::{Table, TableColumn, Workbook};

use crate::error::Result;
use crate::output::{Cell, OutputTable};

/// Writes the output table as a single-sheet workbook at the given path.
pub fn write_workbook(path: &Path, table: &OutputTable) -> Result<()> {
    let mut workbook = build_workbook(table)?;
    workbook.save(path)?;
    Ok(())
}

/// Serialises the output table as a single-sheet xlsx workbook in memory.
pub fn write_workbook_to_buffer(table: &OutputTable) -> Result<Vec<u8>> {
    let mut workbook = build_workbook(table)?;
    Ok(workbook.save_to_buffer()?)
}

fn build_workbook(table: &OutputTable) -> Result<Workbook> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(&table.sheet_name)?;

    for (col_idx, header) in table.columns.iter().enumerate() {
        worksheet.write_string(0, col_idx as u16, header)?;
    }

    for (row_idx, row) in table.rows.iter().enumerate() {
        let excel_row = (row_idx + 1) as u32;
        for (col_idx, cell) in row.iter().enumerate() {
            match cell {
                Cell::Text(value) => {
                    worksheet.write_string(excel_row, col_idx as u16, value)?;
                }
                Cell::Number(value) => {
                    worksheet.write_number(excel_row, col_idx as u16, *value)?;
                }
            }
        }
    }

    // Excel rejects tables without data rows.
    if !table.rows.is_empty() {
        let columns: Vec<TableColumn> = table
            .columns
            .iter()
            .map(|header| TableColumn::new().set_header(header))
            .collect();
        let mut excel_table = Table::new();
        excel_table.set_autofilter(true).set_columns(&columns);

        let col_end = (table.columns.len() as u16).saturating_sub(1);
        worksheet.add_table(0, 0, table.rows.len() as u32, col_end, &excel_table)?;
    }
    worksheet.autofit();

    Ok(workbook)
}
