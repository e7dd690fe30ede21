//! Spreadsheet to CSV conversion.

use std::path::{Path, PathBuf};

use calamine::{open_workbook_auto, Data, Reader};

use crate::error::PipelineError;

/// Convert the first sheet of `workbook` into `<out_dir>/<stem>.csv`.
///
/// Additional sheets are ignored. Headers are written exactly as they
/// appear in the sheet's first row. Fully blank rows are dropped.
pub fn convert_workbook(workbook: &Path, out_dir: &Path) -> Result<PathBuf, PipelineError> {
    tracing::info!(path = %workbook.display(), "Converting workbook to CSV");
    let result = write_first_sheet(workbook, out_dir);
    match &result {
        Ok(out_file) => {
            tracing::info!(path = %out_file.display(), "Successfully saved CSV");
        }
        Err(e) => {
            tracing::error!(path = %workbook.display(), error = ?e, "Failed to convert workbook");
        }
    }
    result
}

fn write_first_sheet(workbook: &Path, out_dir: &Path) -> Result<PathBuf, PipelineError> {
    let mut book = open_workbook_auto(workbook)?;
    let sheet = book
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| PipelineError::EmptyWorkbook(workbook.to_path_buf()))?;
    let range = book.worksheet_range(&sheet)?;

    std::fs::create_dir_all(out_dir)?;
    let out_file = out_dir.join(csv_file_name(workbook));
    let mut writer = csv::Writer::from_path(&out_file)?;
    for row in range.rows() {
        if row.iter().all(|cell| matches!(cell, Data::Empty)) {
            continue;
        }
        writer.write_record(row.iter().map(cell_to_field))?;
    }
    writer.flush()?;
    Ok(out_file)
}

fn csv_file_name(workbook: &Path) -> String {
    let stem = workbook
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "sheet".to_string());
    format!("{stem}.csv")
}

/// Render one cell as CSV text. Blank cells become empty fields so the
/// loader infers them as null.
fn cell_to_field(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) => f.to_string(),
        Data::Bool(b) => b.to_string(),
        other => other.to_string(),
    }
}
