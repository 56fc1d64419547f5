//! Workbook adapters at the edge of the merger: loading source sheets into
//! [`RecordSet`](crate::model::RecordSet)s and writing the merged sheet.

pub mod excel_read;
pub mod excel_write;
