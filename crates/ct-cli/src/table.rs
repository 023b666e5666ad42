//! Row/column tables read from and written to spreadsheet files.
//!
//! The format is picked from the file extension: `.csv` is handled by the
//! `csv` crate, workbooks are read with `calamine` (first worksheet, first row
//! as header) and `.xlsx` is written with `rust_xlsxwriter`. Workbook cells
//! keep their type through a read/write cycle; CSV cells are text.

use std::fmt;
use std::path::{Path, PathBuf};

use calamine::{open_workbook_auto, Data, DataType, Reader};
use chrono::{NaiveDateTime, Timelike};
use rust_xlsxwriter::{Format, Workbook, Worksheet};

#[derive(Debug, thiserror::Error)]
pub enum TableError {
    #[error("unsupported spreadsheet format: {0}")]
    UnsupportedFormat(PathBuf),
    #[error("{0} has no worksheet")]
    NoWorksheet(PathBuf),
    #[error("{0} has no header row")]
    NoHeader(PathBuf),
    #[error("data row {row} has {got} cells but the header has {expected}")]
    RowTooWide {
        row: usize,
        expected: usize,
        got: usize,
    },
    #[error("column {column:?} has {got} values, table has {expected} rows")]
    ColumnLength {
        column: String,
        expected: usize,
        got: usize,
    },
    #[error("table too large for a worksheet: {0}")]
    TooLarge(String),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("workbook read error: {0}")]
    WorkbookRead(#[from] calamine::Error),
    #[error("workbook write error: {0}")]
    WorkbookWrite(#[from] rust_xlsxwriter::XlsxError),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum TableFormat {
    Csv,
    Workbook,
}

impl TableFormat {
    fn from_path(path: &Path) -> Result<Self, TableError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        match ext.as_str() {
            "csv" => Ok(TableFormat::Csv),
            "xlsx" | "xlsm" | "xls" | "xlsb" | "ods" => Ok(TableFormat::Workbook),
            _ => Err(TableError::UnsupportedFormat(path.to_path_buf())),
        }
    }
}

// ---------------------------------------------------------------------------
// Cell
// ---------------------------------------------------------------------------

/// One spreadsheet value.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum Cell {
    #[default]
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
    DateTime(NaiveDateTime),
}

static EMPTY_CELL: Cell = Cell::Empty;

impl Cell {
    pub fn is_blank(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Text(text) => text.trim().is_empty(),
            _ => false,
        }
    }

    fn from_workbook(data: &Data) -> Self {
        match data {
            Data::Empty => Cell::Empty,
            Data::String(text) => Cell::from(text.as_str()),
            Data::Float(value) => Cell::Number(*value),
            Data::Int(value) => Cell::Number(*value as f64),
            Data::Bool(value) => Cell::Bool(*value),
            Data::DateTime(value) if value.is_duration() => Cell::Number(value.as_f64()),
            Data::DateTime(_) | Data::DateTimeIso(_) => match data.as_datetime() {
                Some(datetime) => Cell::DateTime(datetime),
                None => Cell::Text(data.to_string()),
            },
            Data::DurationIso(text) => Cell::Text(text.clone()),
            Data::Error(err) => Cell::Text(err.to_string()),
        }
    }
}

fn is_date_only(datetime: &NaiveDateTime) -> bool {
    datetime.num_seconds_from_midnight() == 0 && datetime.nanosecond() == 0
}

/// Text as written to CSV: dates in ISO form, whole numbers without a
/// fractional part.
impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Empty => Ok(()),
            Cell::Text(text) => f.write_str(text),
            Cell::Number(value) => write!(f, "{value}"),
            Cell::Bool(value) => write!(f, "{value}"),
            Cell::DateTime(datetime) if is_date_only(datetime) => {
                write!(f, "{}", datetime.format("%Y-%m-%d"))
            }
            Cell::DateTime(datetime) => write!(f, "{}", datetime.format("%Y-%m-%d %H:%M:%S")),
        }
    }
}

impl From<&str> for Cell {
    fn from(text: &str) -> Self {
        if text.is_empty() {
            Cell::Empty
        } else {
            Cell::Text(text.to_owned())
        }
    }
}

impl From<String> for Cell {
    fn from(text: String) -> Self {
        if text.is_empty() {
            Cell::Empty
        } else {
            Cell::Text(text)
        }
    }
}

// ---------------------------------------------------------------------------
// Table
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

impl Table {
    /// Rows shorter than the header are padded with empty cells; rows wider
    /// than the header are rejected.
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Cell>>) -> Result<Self, TableError> {
        let width = columns.len();
        let mut padded = Vec::with_capacity(rows.len());
        for (index, mut row) in rows.into_iter().enumerate() {
            if row.len() > width {
                return Err(TableError::RowTooWide {
                    row: index + 1,
                    expected: width,
                    got: row.len(),
                });
            }
            row.resize(width, Cell::Empty);
            padded.push(row);
        }
        Ok(Self {
            columns,
            rows: padded,
        })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Names from `required` that are not columns of this table, in order.
    pub fn missing_columns(&self, required: &[String]) -> Vec<String> {
        required
            .iter()
            .filter(|name| self.column_index(name).is_none())
            .cloned()
            .collect()
    }

    pub fn cell(&self, row: usize, column: usize) -> &Cell {
        self.rows
            .get(row)
            .and_then(|r| r.get(column))
            .unwrap_or(&EMPTY_CELL)
    }

    /// Replace the column called `name`, or append it when absent. Other
    /// cells are left as they are.
    pub fn set_column(&mut self, name: &str, values: Vec<String>) -> Result<(), TableError> {
        if values.len() != self.rows.len() {
            return Err(TableError::ColumnLength {
                column: name.to_owned(),
                expected: self.rows.len(),
                got: values.len(),
            });
        }

        let index = match self.column_index(name) {
            Some(index) => index,
            None => {
                self.columns.push(name.to_owned());
                self.columns.len() - 1
            }
        };
        for (row, value) in self.rows.iter_mut().zip(values) {
            if row.len() <= index {
                row.resize(index + 1, Cell::Empty);
            }
            row[index] = Cell::from(value);
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Reading
// ---------------------------------------------------------------------------

pub fn read_table(path: &Path) -> Result<Table, TableError> {
    match TableFormat::from_path(path)? {
        TableFormat::Csv => read_csv(path),
        TableFormat::Workbook => read_workbook(path),
    }
}

fn read_csv(path: &Path) -> Result<Table, TableError> {
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_path(path)?;
    let columns: Vec<String> = reader.headers()?.iter().map(ToOwned::to_owned).collect();
    if columns.is_empty() {
        return Err(TableError::NoHeader(path.to_path_buf()));
    }

    let mut rows = Vec::new();
    for record in reader.records() {
        rows.push(record?.iter().map(Cell::from).collect());
    }
    Table::new(columns, rows)
}

fn read_workbook(path: &Path) -> Result<Table, TableError> {
    let mut workbook = open_workbook_auto(path)?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| TableError::NoWorksheet(path.to_path_buf()))??;

    let mut sheet_rows = range.rows();
    let columns: Vec<String> = sheet_rows
        .next()
        .ok_or_else(|| TableError::NoHeader(path.to_path_buf()))?
        .iter()
        .map(|cell| cell.to_string())
        .collect();

    let rows = sheet_rows
        .map(|row| row.iter().map(Cell::from_workbook).collect())
        .collect();
    Table::new(columns, rows)
}

// ---------------------------------------------------------------------------
// Writing
// ---------------------------------------------------------------------------

/// Write `table` to `path`, replacing any existing file.
pub fn write_table(path: &Path, table: &Table) -> Result<(), TableError> {
    match TableFormat::from_path(path)? {
        TableFormat::Csv => write_csv(path, table),
        TableFormat::Workbook => write_workbook(path, table),
    }
}

/// Fail early when `path` names a format `write_table` cannot produce.
pub fn check_writable(path: &Path) -> Result<(), TableError> {
    match TableFormat::from_path(path)? {
        TableFormat::Csv => Ok(()),
        TableFormat::Workbook if is_xlsx(path) => Ok(()),
        TableFormat::Workbook => Err(TableError::UnsupportedFormat(path.to_path_buf())),
    }
}

fn is_xlsx(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("xlsx"))
}

fn write_csv(path: &Path, table: &Table) -> Result<(), TableError> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(table.columns())?;
    for row in table.rows() {
        writer.write_record(row.iter().map(Cell::to_string))?;
    }
    writer.flush().map_err(csv::Error::from)?;
    Ok(())
}

fn write_workbook(path: &Path, table: &Table) -> Result<(), TableError> {
    if !is_xlsx(path) {
        return Err(TableError::UnsupportedFormat(path.to_path_buf()));
    }

    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    let header = Format::new().set_bold();

    for (col, name) in table.columns().iter().enumerate() {
        worksheet.write_string_with_format(0, col_num(col)?, name, &header)?;
    }
    for (index, row) in table.rows().iter().enumerate() {
        let row_num = u32::try_from(index + 1)
            .map_err(|_| TableError::TooLarge(format!("{} rows", table.row_count())))?;
        for (col, cell) in row.iter().enumerate() {
            write_cell(worksheet, row_num, col_num(col)?, cell)?;
        }
    }

    workbook.save(path)?;
    Ok(())
}

fn write_cell(worksheet: &mut Worksheet, row: u32, col: u16, cell: &Cell) -> Result<(), TableError> {
    match cell {
        Cell::Empty => {}
        Cell::Text(text) => {
            worksheet.write_string(row, col, text)?;
        }
        Cell::Number(value) => {
            worksheet.write_number(row, col, *value)?;
        }
        Cell::Bool(value) => {
            worksheet.write_boolean(row, col, *value)?;
        }
        Cell::DateTime(datetime) => {
            let pattern = if is_date_only(datetime) {
                "yyyy-mm-dd"
            } else {
                "yyyy-mm-dd hh:mm:ss"
            };
            let format = Format::new().set_num_format(pattern);
            worksheet.write_datetime_with_format(row, col, datetime, &format)?;
        }
    }
    Ok(())
}

fn col_num(col: usize) -> Result<u16, TableError> {
    u16::try_from(col).map_err(|_| TableError::TooLarge(format!("{} columns", col + 1)))
}
