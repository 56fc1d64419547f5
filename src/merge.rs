use std::path::{Path, PathBuf};

use tracing::{debug, info, instrument};

use crate::error::{Result, ToolError};
use crate::io::{excel_read, excel_write};
use crate::model::{RecordSet, SourceKind};
use crate::output::{build_table, project};
use crate::reconcile::{ColumnOverrides, ReconcileInputs, ReconcileReport, reconcile};
use crate::resolve::{FieldChoice, field_choices};

/// Workbook paths of one merge run.
#[derive(Debug, Clone)]
pub struct MergeRequest {
    pub primary: Option<PathBuf>,
    pub stock: Option<PathBuf>,
    pub sales: Option<PathBuf>,
    pub day_count: Option<PathBuf>,
    pub output: PathBuf,
}

/// Merges the source workbooks and writes the consolidated workbook.
#[instrument(
    level = "info",
    skip_all,
    fields(output = %request.output.display())
)]
pub fn merge_workbooks(
    request: &MergeRequest,
    overrides: &ColumnOverrides,
) -> Result<ReconcileReport> {
    let primary = request
        .primary
        .as_deref()
        .ok_or(ToolError::MissingPrimarySource)?;

    let inputs = ReconcileInputs {
        primary: Some(load(primary, SourceKind::Primary)?),
        stock: load_optional(request.stock.as_deref(), SourceKind::Stock)?,
        sales: load_optional(request.sales.as_deref(), SourceKind::Sales)?,
        day_count: load_optional(request.day_count.as_deref(), SourceKind::DayCount)?,
    };

    let reconciliation = reconcile(inputs, overrides)?;
    let rows = project(&reconciliation.rows);
    let table = build_table(&rows);
    debug!(rows = table.rows.len(), "output table constructed");

    excel_write::write_workbook(&request.output, &table)?;
    info!(
        rows = reconciliation.report.primary_rows,
        "wrote merged workbook"
    );
    Ok(reconciliation.report)
}

/// Merges in-memory xlsx workbooks and returns the consolidated workbook bytes.
#[instrument(level = "info", skip_all)]
pub fn merge_buffers(
    primary: Option<&[u8]>,
    stock: Option<&[u8]>,
    sales: Option<&[u8]>,
    day_count: Option<&[u8]>,
    overrides: &ColumnOverrides,
) -> Result<Vec<u8>> {
    let primary = primary.ok_or(ToolError::MissingPrimarySource)?;
    let read = |bytes: Option<&[u8]>| bytes.map(excel_read::read_record_set_from_bytes).transpose();

    let inputs = ReconcileInputs {
        primary: Some(excel_read::read_record_set_from_bytes(primary)?),
        stock: read(stock)?,
        sales: read(sales)?,
        day_count: read(day_count)?,
    };

    let reconciliation = reconcile(inputs, overrides)?;
    let table = build_table(&project(&reconciliation.rows));
    excel_write::write_workbook_to_buffer(&table)
}

/// Lists, for every field `role` requires, the headers of the workbook and
/// the column that would be picked automatically.
#[instrument(level = "info", skip_all, fields(input = %path.display(), %role))]
pub fn inspect_headers(path: &Path, role: SourceKind) -> Result<Vec<FieldChoice>> {
    let records = load(path, role)?;
    Ok(field_choices(&records, role))
}

fn load(path: &Path, role: SourceKind) -> Result<RecordSet> {
    if !path.exists() {
        return Err(ToolError::MissingInput(path.to_path_buf()));
    }
    let records = excel_read::read_record_set(path)?;
    info!(%role, rows = records.len(), "read source workbook");
    Ok(records)
}

fn load_optional(path: Option<&Path>, role: SourceKind) -> Result<Option<RecordSet>> {
    path.map(|path| load(path, role)).transpose()
}
