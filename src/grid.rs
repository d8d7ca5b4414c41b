//! In-memory grid backing the editor
//!
//! Holds the header row and the data rows of the loaded file. Rows are
//! addressed by position only, so indices shift after a deletion.

use std::fmt;

use tracing::{debug, trace};

use crate::csv;

pub const EXPORT_FILE_NAME: &str = "edited_data.csv";
pub const EXPORT_MIME_TYPE: &str = "text/csv;charset=utf-8;";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GridError {
    CellOutOfBounds { row: usize, column: usize },
    RowOutOfBounds(usize),
}

impl fmt::Display for GridError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GridError::CellOutOfBounds { row, column } => {
                write!(f, "cell {row}:{column} is outside of the grid")
            }
            GridError::RowOutOfBounds(row) => write!(f, "row {row} is outside of the grid"),
        }
    }
}

impl std::error::Error for GridError {}

/// The file produced by [`Grid::export`], ready to be written out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportFile {
    pub file_name: String,
    pub mime_type: String,
    pub content: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Grid {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Grid {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_text(text: &str) -> Self {
        let mut grid = Self::new();
        grid.load(text);
        grid
    }

    /// Replace header and rows with the content of `text`.
    pub fn load(&mut self, text: &str) {
        let (headers, rows) = csv::parse(text);
        debug!(
            "Loaded grid with {} columns and {} rows",
            headers.len(),
            rows.len()
        );
        self.headers = headers;
        self.rows = rows;
    }

    pub fn edit_cell(&mut self, row: usize, column: usize, value: String) -> Result<(), GridError> {
        let cell = self
            .rows
            .get_mut(row)
            .and_then(|r| r.get_mut(column))
            .ok_or(GridError::CellOutOfBounds { row, column })?;
        trace!("Edit {row}:{column} \"{cell}\" => \"{value}\"");
        *cell = value;
        Ok(())
    }

    /// Append an empty row as wide as the header. Returns the new row index.
    pub fn add_row(&mut self) -> usize {
        self.rows.push(vec![String::new(); self.headers.len()]);
        trace!("Added row {}", self.rows.len() - 1);
        self.rows.len() - 1
    }

    pub fn delete_row(&mut self, row: usize) -> Result<Vec<String>, GridError> {
        if row >= self.rows.len() {
            return Err(GridError::RowOutOfBounds(row));
        }
        trace!("Deleting row {row}");
        Ok(self.rows.remove(row))
    }

    pub fn export(&self) -> ExportFile {
        ExportFile {
            file_name: EXPORT_FILE_NAME.to_string(),
            mime_type: EXPORT_MIME_TYPE.to_string(),
            content: csv::serialize(&self.headers, &self.rows),
        }
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn row(&self, row: usize) -> Option<&[String]> {
        self.rows.get(row).map(|r| r.as_slice())
    }

    /// Cell value, empty for positions a ragged row does not reach.
    pub fn get(&self, row: usize, column: usize) -> &str {
        self.rows
            .get(row)
            .and_then(|r| r.get(column))
            .map(|s| s.as_str())
            .unwrap_or("")
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.headers.len()
    }

    /// Number of columns needed to show every cell, the header or the
    /// longest row, whichever is wider.
    pub fn width(&self) -> usize {
        self.rows
            .iter()
            .map(|r| r.len())
            .fold(self.headers.len(), std::cmp::max)
    }

    /// Header label, empty for columns only a long row reaches.
    pub fn header(&self, column: usize) -> &str {
        self.headers.get(column).map(|s| s.as_str()).unwrap_or("")
    }

    /// True when there are no data rows. A loaded header does not count.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
