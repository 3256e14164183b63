use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use arrow::array::{Array, AsArray};
use arrow::datatypes::{DataType, Float32Type, Float64Type, Int32Type, Int64Type};
use calamine::{Data, Reader, open_workbook_auto};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::model::{RawCell, RawTable, Record, Table, TechDimension};
use crate::config::{ColumnNames, DashboardConfig, Sentinels};
use crate::error::LoadError;

/// Width stock codes are zero-padded to.
pub const STOCK_CODE_WIDTH: usize = 6;

static MISSING: RawCell = RawCell::Null;

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Read and normalize the source table in one go.
pub fn load_table(path: &Path, config: &DashboardConfig) -> Result<Table, LoadError> {
    let raw = read_raw(path)?;
    normalize(raw, &config.columns, &config.sentinels)
}

/// Read a file into an untyped [`RawTable`]. Dispatch by extension.
///
/// Supported formats:
/// * `.xlsx` / `.xlsm` / `.xls` / `.xlsb` / `.ods` – first worksheet, header row first
/// * `.csv`     – header row first
/// * `.json`    – `[{ "股票代码": 1, "企业名称": "...", ... }, ...]`
/// * `.parquet` – flat columns, e.g. from `df.to_parquet()`
pub fn read_raw(path: &Path) -> Result<RawTable, LoadError> {
    if !path.exists() {
        return Err(LoadError::Io {
            path: path.to_path_buf(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "file does not exist"),
        });
    }

    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "xlsx" | "xlsm" | "xls" | "xlsb" | "ods" => read_workbook(path),
        "csv" => Ok(read_csv(path)?),
        "json" => Ok(read_json(path)?),
        "parquet" | "pq" => Ok(read_parquet(path)?),
        other => Err(LoadError::UnsupportedFormat(other.to_string())),
    }
}

// ---------------------------------------------------------------------------
// Normalization: RawTable → Table
// ---------------------------------------------------------------------------

/// Turn untyped rows into strictly-typed records.
///
/// * stock codes are normalized with [`normalize_stock_code`]
/// * rows missing stock code, company name or index score are dropped
/// * the year must coerce to an integer for every remaining row, otherwise
///   the whole load fails
/// * a missing industry becomes the unknown-industry sentinel
/// * missing word frequencies (and absent optional columns) stay `None`
pub fn normalize(
    raw: RawTable,
    columns: &ColumnNames,
    sentinels: &Sentinels,
) -> Result<Table, LoadError> {
    let required = |name: &str| {
        raw.column_index(name)
            .ok_or_else(|| LoadError::MissingColumn(name.to_string()))
    };
    let code_idx = required(&columns.stock_code)?;
    let name_idx = required(&columns.company_name)?;
    let year_idx = required(&columns.year)?;
    let score_idx = required(&columns.index_score)?;

    let industry_idx = raw.column_index(&columns.industry_name);
    let freq_idx = raw.column_index(&columns.total_word_frequency);
    let dim_idx = TechDimension::ALL.map(|d| raw.column_index(columns.dimension(d)));

    for (dim, idx) in TechDimension::ALL.iter().zip(&dim_idx) {
        if idx.is_none() {
            log::warn!("Column '{}' ({dim}) not found, treated as missing", columns.dimension(*dim));
        }
    }

    let total_rows = raw.rows.len();
    let mut records = Vec::with_capacity(total_rows);

    for (row_no, row) in raw.rows.iter().enumerate() {
        let cell = |idx: usize| row.get(idx).unwrap_or(&MISSING);
        let number = |idx: Option<usize>| idx.and_then(|i| cell(i).as_f64());

        let Some(stock_code) = normalize_stock_code(cell(code_idx), &sentinels.unknown_stock_code)
        else {
            continue;
        };
        let Some(company_name) = cell(name_idx).as_text() else {
            continue;
        };
        let Some(index_score) = cell(score_idx).as_f64() else {
            continue;
        };

        let year = coerce_year(cell(year_idx)).ok_or_else(|| LoadError::InvalidYear {
            row: row_no + 1,
            value: cell(year_idx).to_string(),
        })?;

        let industry_name = industry_idx
            .and_then(|i| cell(i).as_text())
            .unwrap_or_else(|| sentinels.unknown_industry.clone());

        records.push(Record {
            stock_code,
            company_name,
            year,
            industry_name,
            index_score,
            technology: dim_idx.map(number),
            total_word_frequency: number(freq_idx),
        });
    }

    let dropped = total_rows - records.len();
    if dropped > 0 {
        log::warn!("Dropped {dropped} of {total_rows} rows with missing code, name or score");
    }

    Ok(Table::from_records(records))
}

/// Normalize a raw stock code cell.
///
/// Strings and integers (integral floats count as integers, since spreadsheets
/// store every number as a float) shorter than six characters are left-padded
/// with zeros, except for the unknown sentinel. Fractional floats and booleans
/// are not codes in any recognised form and keep their text unpadded. Codes
/// longer than six characters pass through unchanged.
/// Returns `None` for missing cells.
pub fn normalize_stock_code(cell: &RawCell, unknown: &str) -> Option<String> {
    let text = cell.as_text()?;
    let text = match cell {
        RawCell::Float(v) if v.fract() == 0.0 && v.is_finite() => format!("{}", *v as i64),
        RawCell::Integer(_) | RawCell::String(_) => text.trim().to_string(),
        _ => return Some(text),
    };

    if text == unknown {
        return Some(text);
    }
    let len = text.chars().count();
    if len < STOCK_CODE_WIDTH {
        Some(format!("{}{text}", "0".repeat(STOCK_CODE_WIDTH - len)))
    } else {
        if len > STOCK_CODE_WIDTH {
            log::debug!("Stock code '{text}' is longer than {STOCK_CODE_WIDTH} characters");
        }
        Some(text)
    }
}

fn coerce_year(cell: &RawCell) -> Option<i32> {
    match cell {
        RawCell::Integer(i) => i32::try_from(*i).ok(),
        RawCell::Float(v) if v.fract() == 0.0 => Some(*v as i32),
        RawCell::String(s) => {
            let s = s.trim();
            s.parse::<i32>().ok().or_else(|| {
                s.parse::<f64>()
                    .ok()
                    .filter(|v| v.fract() == 0.0)
                    .map(|v| v as i32)
            })
        }
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// TableCache – load once per source, share read-only
// ---------------------------------------------------------------------------

/// Memoizes loaded tables per source path. A table is read from disk at most
/// once; every later request hands out the same shared, immutable handle.
#[derive(Debug, Default)]
pub struct TableCache {
    tables: HashMap<PathBuf, Arc<Table>>,
}

impl TableCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached table for `path`, loading it on first access.
    /// Failures are not cached, so a fixed file can be opened again.
    pub fn get_or_load(
        &mut self,
        path: &Path,
        config: &DashboardConfig,
    ) -> Result<Arc<Table>, LoadError> {
        let key = std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
        if let Some(table) = self.tables.get(&key) {
            log::debug!("Using cached table for {}", key.display());
            return Ok(Arc::clone(table));
        }

        let table = Arc::new(load_table(path, config)?);
        log::info!("Loaded {} records from {}", table.len(), key.display());
        self.tables.insert(key, Arc::clone(&table));
        Ok(table)
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Workbook reader (calamine)
// ---------------------------------------------------------------------------

fn read_workbook(path: &Path) -> Result<RawTable, LoadError> {
    let mut workbook = open_workbook_auto(path)
        .with_context(|| format!("opening workbook {}", path.display()))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or(LoadError::EmptyWorkbook)?
        .context("reading first worksheet")?;

    let mut rows = range.rows();
    let headers: Vec<String> = rows
        .next()
        .map(|header| header.iter().map(|c| c.to_string().trim().to_string()).collect())
        .unwrap_or_default();
    let rows: Vec<Vec<RawCell>> = rows
        .map(|row| row.iter().map(excel_to_cell).collect())
        .collect();

    Ok(RawTable { headers, rows })
}

fn excel_to_cell(cell: &Data) -> RawCell {
    match cell {
        Data::Int(i) => RawCell::Integer(*i),
        Data::Float(f) => RawCell::Float(*f),
        Data::String(s) => RawCell::String(s.clone()),
        Data::Bool(b) => RawCell::Bool(*b),
        Data::Empty | Data::Error(_) => RawCell::Null,
        other => RawCell::String(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// CSV reader
// ---------------------------------------------------------------------------

/// CSV layout: header row with column names, one firm-year per line.
fn read_csv(path: &Path) -> Result<RawTable> {
    let mut reader = csv::Reader::from_path(path).context("opening CSV")?;
    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.trim_start_matches('\u{feff}').trim().to_string())
        .collect();

    let mut rows: Vec<Vec<RawCell>> = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;
        rows.push(record.iter().map(guess_cell_type).collect());
    }

    Ok(RawTable { headers, rows })
}

fn guess_cell_type(s: &str) -> RawCell {
    let s = s.trim();
    if s.is_empty() {
        return RawCell::Null;
    }
    // "000001" is an identifier, not the number 1
    if s.len() > 1 && s.starts_with('0') && s.bytes().all(|b| b.is_ascii_digit()) {
        return RawCell::String(s.to_string());
    }
    if let Ok(i) = s.parse::<i64>() {
        return RawCell::Integer(i);
    }
    if let Ok(f) = s.parse::<f64>() {
        return RawCell::Float(f);
    }
    if s == "true" || s == "false" {
        return RawCell::Bool(s == "true");
    }
    RawCell::String(s.to_string())
}

// ---------------------------------------------------------------------------
// JSON reader
// ---------------------------------------------------------------------------

/// Records orientation, as written by `df.to_json(orient='records')`.
/// Headers are the union of keys in first-seen order.
fn read_json(path: &Path) -> Result<RawTable> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    let root: JsonValue = serde_json::from_str(&text).context("parsing JSON")?;
    let records = root.as_array().context("Expected top-level JSON array")?;

    let mut headers: Vec<String> = Vec::new();
    let mut objects = Vec::with_capacity(records.len());
    for (i, rec) in records.iter().enumerate() {
        let obj = rec
            .as_object()
            .with_context(|| format!("Row {i} is not a JSON object"))?;
        for key in obj.keys() {
            if !headers.contains(key) {
                headers.push(key.clone());
            }
        }
        objects.push(obj);
    }

    let rows: Vec<Vec<RawCell>> = objects
        .iter()
        .map(|obj| {
            headers
                .iter()
                .map(|h| obj.get(h).map(json_to_cell).unwrap_or(RawCell::Null))
                .collect()
        })
        .collect();

    Ok(RawTable { headers, rows })
}

fn json_to_cell(val: &JsonValue) -> RawCell {
    match val {
        JsonValue::String(s) => RawCell::String(s.clone()),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                RawCell::Integer(i)
            } else if let Some(f) = n.as_f64() {
                RawCell::Float(f)
            } else {
                RawCell::String(n.to_string())
            }
        }
        JsonValue::Bool(b) => RawCell::Bool(*b),
        JsonValue::Null => RawCell::Null,
        other => RawCell::String(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Parquet reader
// ---------------------------------------------------------------------------

/// Flat Parquet file, e.g. `df.to_parquet()` of the merged table.
fn read_parquet(path: &Path) -> Result<RawTable> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).context("reading parquet metadata")?;
    let headers: Vec<String> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();
    let reader = builder.build().context("building parquet reader")?;

    let mut rows: Vec<Vec<RawCell>> = Vec::new();
    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        if batch.num_columns() != headers.len() {
            bail!(
                "record batch has {} columns, schema has {}",
                batch.num_columns(),
                headers.len()
            );
        }
        for row in 0..batch.num_rows() {
            rows.push(
                batch
                    .columns()
                    .iter()
                    .map(|col| arrow_to_cell(col.as_ref(), row))
                    .collect(),
            );
        }
    }

    Ok(RawTable { headers, rows })
}

/// Extract a single cell from an Arrow column at a given row.
fn arrow_to_cell(col: &dyn Array, row: usize) -> RawCell {
    if col.is_null(row) {
        return RawCell::Null;
    }
    match col.data_type() {
        DataType::Utf8 => RawCell::String(col.as_string::<i32>().value(row).to_string()),
        DataType::LargeUtf8 => RawCell::String(col.as_string::<i64>().value(row).to_string()),
        DataType::Int32 => RawCell::Integer(col.as_primitive::<Int32Type>().value(row) as i64),
        DataType::Int64 => RawCell::Integer(col.as_primitive::<Int64Type>().value(row)),
        DataType::Float32 => RawCell::Float(col.as_primitive::<Float32Type>().value(row) as f64),
        DataType::Float64 => RawCell::Float(col.as_primitive::<Float64Type>().value(row)),
        DataType::Boolean => RawCell::Bool(col.as_boolean().value(row)),
        _ => arrow::util::display::array_value_to_string(col, row)
            .map(RawCell::String)
            .unwrap_or(RawCell::Null),
    }
}
