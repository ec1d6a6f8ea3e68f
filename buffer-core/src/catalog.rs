//! Loading stock catalogs from Excel workbooks, CSV or YAML files.

use crate::{
    error::BufferError,
    reagent::{catalog_from_items, Catalog, StockItem},
};
use buffer_schemas::{file_formats::CatalogFile, stock::StockRecord};
use calamine::{open_workbook, Data, Reader, Xlsx};
use csv::{ReaderBuilder, StringRecord, Trim};
use std::{fs, io, path::Path};

const REQUIRED_COLUMNS: [&str; 2] = ["name", "type"];

/// Sheet read from a workbook unless another one is asked for.
pub const DEFAULT_SHEET: &str = "stocks";

/// Lowercases the header row and checks the required columns are present.
fn normalize_headers<'h>(
    headers: impl IntoIterator<Item = &'h str>,
) -> Result<StringRecord, BufferError> {
    let headers: StringRecord = headers
        .into_iter()
        .map(|h| h.trim().to_lowercase())
        .collect();

    for column in REQUIRED_COLUMNS {
        if !headers.iter().any(|h| h == column) {
            return Err(BufferError::MissingColumn(column.to_string()));
        }
    }
    Ok(headers)
}

/// `None` for rows without a name.
fn item_from_row(
    row: &StringRecord,
    headers: &StringRecord,
    source: &str,
) -> Result<Option<StockItem>, BufferError> {
    let record: StockRecord = row
        .deserialize(Some(headers))
        .map_err(|e| BufferError::InvalidRow(source.to_string(), e))?;
    if record.name.trim().is_empty() {
        return Ok(None);
    }
    StockItem::try_from(record).map(Some)
}

/// Reads a CSV catalog from any reader. `source` names the input in errors.
///
/// Headers are matched case-insensitively, empty cells count as absent and
/// rows without a name are skipped.
pub fn read_stocks_csv_from<R: io::Read>(
    reader: R,
    source: &str,
) -> Result<Vec<StockItem>, BufferError> {
    let mut reader = ReaderBuilder::new().trim(Trim::All).from_reader(reader);
    let headers = normalize_headers(
        reader
            .headers()
            .map_err(|e| BufferError::CsvError(source.to_string(), e))?
            .iter(),
    )?;

    let mut items = Vec::new();
    for row in reader.records() {
        let row = row.map_err(|e| BufferError::CsvError(source.to_string(), e))?;
        items.extend(item_from_row(&row, &headers, source)?);
    }
    Ok(items)
}

pub fn read_stocks_csv(path: &Path) -> Result<Vec<StockItem>, BufferError> {
    let display = path.display().to_string();
    let file = fs::File::open(path).map_err(|e| BufferError::FileIO(display.clone(), e))?;
    read_stocks_csv_from(file, &display)
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(text) => text.trim().to_string(),
        other => other.to_string(),
    }
}

/// Reads the stock table from one worksheet of an `.xlsx` workbook.
///
/// The first row of the sheet is the header row; the column rules are the
/// same as for CSV.
pub fn read_stocks_xlsx(path: &Path, sheet: &str) -> Result<Vec<StockItem>, BufferError> {
    let display = path.display().to_string();
    let mut workbook: Xlsx<_> =
        open_workbook(path).map_err(|e| BufferError::Workbook(display.clone(), e))?;

    if !workbook.sheet_names().iter().any(|name| name == sheet) {
        return Err(BufferError::SheetNotFound {
            path: display,
            sheet: sheet.to_string(),
        });
    }
    let range = workbook
        .worksheet_range(sheet)
        .map_err(|e| BufferError::Workbook(display.clone(), e))?;

    let source = format!("{display} [{sheet}]");
    let mut rows = range.rows();
    let Some(header_row) = rows.next() else {
        return Err(BufferError::MissingColumn(REQUIRED_COLUMNS[0].to_string()));
    };
    let header_cells: Vec<String> = header_row.iter().map(cell_text).collect();
    let headers = normalize_headers(header_cells.iter().map(String::as_str))?;

    let mut items = Vec::new();
    for row in rows {
        let row: StringRecord = row.iter().map(cell_text).collect();
        items.extend(item_from_row(&row, &headers, &source)?);
    }
    Ok(items)
}

pub fn read_stocks_yaml(path: &Path) -> Result<Vec<StockItem>, BufferError> {
    let display = path.display().to_string();
    let content = fs::read_to_string(path).map_err(|e| BufferError::FileIO(display.clone(), e))?;
    let file: CatalogFile =
        serde_yaml::from_str(&content).map_err(|e| BufferError::YamlParsing(display, e))?;

    file.stocks
        .into_iter()
        .filter(|record| !record.name.trim().is_empty())
        .map(StockItem::try_from)
        .collect()
}

/// Loads a catalog, picking the reader from the file extension. Workbooks are
/// read from the [`DEFAULT_SHEET`].
pub fn load_catalog(path: &Path) -> Result<Catalog, BufferError> {
    load_catalog_sheet(path, DEFAULT_SHEET)
}

/// Like [`load_catalog`], reading `sheet` when the file is a workbook.
pub fn load_catalog_sheet(path: &Path, sheet: &str) -> Result<Catalog, BufferError> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase);

    let items = match extension.as_deref() {
        Some("xlsx") => read_stocks_xlsx(path, sheet)?,
        Some("csv") => read_stocks_csv(path)?,
        Some("yaml") | Some("yml") => read_stocks_yaml(path)?,
        _ => return Err(BufferError::UnsupportedCatalogFormat(path.display().to_string())),
    };

    log::info!("Loaded {} stock(s) from '{}'", items.len(), path.display());
    Ok(catalog_from_items(items))
}
