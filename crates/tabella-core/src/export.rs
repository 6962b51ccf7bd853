use std::io::Write;
use std::path::Path;

use calamine::{open_workbook, Data, Reader, Xlsx};
use rust_decimal::prelude::ToPrimitive;
use rust_xlsxwriter::{Format, Workbook, Worksheet, XlsxError};

use crate::error::TabellaError;
use crate::model::{CellValue, FinalTable};

pub const SHEET_NAME: &str = "Sheet1";

/// Excel refuses column widths above this.
pub const MAX_COLUMN_WIDTH: f64 = 255.0;

/// Write `table` to a single-sheet workbook at `path`.
///
/// The header row holds the display names. An existing file is replaced
/// atomically, so a failed export never leaves a partial workbook behind.
pub fn export(table: &FinalTable, path: &Path) -> Result<(), TabellaError> {
    let mut workbook = Workbook::new();
    let header = Format::new().set_bold();
    let sheet = new_sheet(&mut workbook)?;

    for (c, name) in table.headers.iter().enumerate() {
        sheet
            .write_string_with_format(0, col_num(c)?, name, &header)
            .map_err(xlsx_error)?;
    }

    for (r, row) in table.rows.iter().enumerate() {
        let row_num = row_num(r + 1)?;
        for (c, cell) in row.iter().enumerate() {
            let col = col_num(c)?;
            match cell {
                CellValue::Empty => {}
                CellValue::Text(s) => {
                    sheet.write_string(row_num, col, s).map_err(xlsx_error)?;
                }
                CellValue::Number(d) => {
                    let value = d.to_f64().ok_or_else(|| {
                        TabellaError::ExportFailure(format!("{d} does not fit a spreadsheet number"))
                    })?;
                    sheet.write_number(row_num, col, value).map_err(xlsx_error)?;
                }
            }
        }
    }

    let bytes = workbook.save_to_buffer().map_err(xlsx_error)?;
    write_atomically(path, &bytes)?;
    tracing::info!(
        path = %path.display(),
        rows = table.row_count(),
        "spreadsheet written"
    );
    Ok(())
}

/// Resize every column of the first sheet to fit its longest value.
///
/// Cell values and types are kept; only widths change. Running this twice
/// gives the same result as running it once. Returns the applied widths.
pub fn normalize_column_widths(path: &Path) -> Result<Vec<f64>, TabellaError> {
    tracing::info!(path = %path.display(), "adjusting column widths");
    let rows = read_first_sheet(path)?;
    let rendered: Vec<Vec<String>> = rows
        .iter()
        .map(|r| r.iter().map(render).collect())
        .collect();
    let widths = column_widths(&rendered);

    let mut workbook = Workbook::new();
    let header = Format::new().set_bold();
    let sheet = new_sheet(&mut workbook)?;
    for (r, row) in rows.iter().enumerate() {
        let format = (r == 0).then_some(&header);
        for (c, cell) in row.iter().enumerate() {
            write_data(sheet, row_num(r)?, col_num(c)?, cell, format)?;
        }
    }
    for (c, width) in widths.iter().enumerate() {
        sheet
            .set_column_width(col_num(c)?, *width)
            .map_err(xlsx_error)?;
    }

    let bytes = workbook.save_to_buffer().map_err(xlsx_error)?;
    write_atomically(path, &bytes)?;
    tracing::info!(path = %path.display(), "successfully adjusted column widths");
    Ok(widths)
}

/// Width per column: longest value in characters plus two.
pub fn column_widths(rows: &[Vec<String>]) -> Vec<f64> {
    let columns = rows.iter().map(Vec::len).max().unwrap_or(0);
    (0..columns)
        .map(|c| {
            let longest = rows
                .iter()
                .filter_map(|r| r.get(c))
                .map(|s| s.chars().count())
                .max()
                .unwrap_or(0);
            ((longest + 2) as f64).min(MAX_COLUMN_WIDTH)
        })
        .collect()
}

/// Read the first sheet as a grid anchored at A1.
pub fn read_first_sheet(path: &Path) -> Result<Vec<Vec<Data>>, TabellaError> {
    let mut workbook: Xlsx<_> = open_workbook(path).map_err(|e: calamine::XlsxError| {
        TabellaError::ExportFailure(format!("failed to open {}: {e}", path.display()))
    })?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| {
            TabellaError::ExportFailure(format!("{} has no worksheets", path.display()))
        })?
        .map_err(|e| TabellaError::ExportFailure(format!("failed to read worksheet: {e}")))?;

    let (row0, col0) = range
        .start()
        .map_or((0, 0), |(r, c)| (r as usize, c as usize));
    let mut grid: Vec<Vec<Data>> = vec![Vec::new(); row0];
    for row in range.rows() {
        let mut cells = vec![Data::Empty; col0];
        cells.extend(row.iter().cloned());
        grid.push(cells);
    }
    Ok(grid)
}

fn render(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn write_data(
    sheet: &mut Worksheet,
    row: u32,
    col: u16,
    cell: &Data,
    format: Option<&Format>,
) -> Result<(), TabellaError> {
    let result = match (cell, format) {
        (Data::Empty, _) => return Ok(()),
        (Data::String(s), Some(f)) => sheet.write_string_with_format(row, col, s, f),
        (Data::String(s), None) => sheet.write_string(row, col, s),
        (Data::Float(v), _) => sheet.write_number(row, col, *v),
        (Data::Int(v), _) => sheet.write_number(row, col, *v as f64),
        (Data::Bool(v), _) => sheet.write_boolean(row, col, *v),
        (other, _) => sheet.write_string(row, col, other.to_string()),
    };
    result.map(|_| ()).map_err(xlsx_error)
}

fn new_sheet(workbook: &mut Workbook) -> Result<&mut Worksheet, TabellaError> {
    let sheet = workbook.add_worksheet();
    sheet.set_name(SHEET_NAME).map_err(xlsx_error)?;
    Ok(sheet)
}

fn write_atomically(path: &Path, bytes: &[u8]) -> Result<(), TabellaError> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let io_error = |e: std::io::Error| {
        TabellaError::ExportFailure(format!("could not write {}: {e}", path.display()))
    };

    let mut tmp = temp_file_in(dir).map_err(io_error)?;
    if let Ok(existing) = std::fs::metadata(path) {
        tmp.as_file()
            .set_permissions(existing.permissions())
            .map_err(io_error)?;
    }
    tmp.write_all(bytes).map_err(io_error)?;
    tmp.as_file().sync_all().map_err(io_error)?;
    tmp.persist(path).map_err(|e| io_error(e.error))?;
    Ok(())
}

/// A temp file created with the mode a plain `File::create` would get.
#[cfg(unix)]
fn temp_file_in(dir: &Path) -> std::io::Result<tempfile::NamedTempFile> {
    use std::os::unix::fs::PermissionsExt;
    tempfile::Builder::new()
        .permissions(std::fs::Permissions::from_mode(0o666))
        .tempfile_in(dir)
}

#[cfg(not(unix))]
fn temp_file_in(dir: &Path) -> std::io::Result<tempfile::NamedTempFile> {
    tempfile::NamedTempFile::new_in(dir)
}

fn row_num(r: usize) -> Result<u32, TabellaError> {
    u32::try_from(r).map_err(|_| TabellaError::ExportFailure(format!("row {r} is out of range")))
}

fn col_num(c: usize) -> Result<u16, TabellaError> {
    u16::try_from(c)
        .map_err(|_| TabellaError::ExportFailure(format!("column {c} is out of range")))
}

fn xlsx_error(e: XlsxError) -> TabellaError {
    TabellaError::ExportFailure(e.to_string())
}
