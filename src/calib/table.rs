//! Whitespace-delimited calibration table files.
//!
//! Format contract:
//!
//! - the first line is a `#`-prefixed comment containing a literal `::`
//!   separator followed by the column names, one of which must be `sat_id`
//! - every subsequent non-comment, non-blank line carries one value per
//!   column, with the `sat_id` column identifying the satellite
//!
//! Example:
//!
//! ```text
//! # calibration nh ktuned :: sat_id a_sst_day b_sst_day ...
//! noaa7   1.0184  0.0213 ...
//! metop02 1.0121  0.0198 ...
//! ```

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::error::AppError;

const SPLIT_TEXT: &str = "::";
const SAT_ID_COLUMN: &str = "sat_id";

/// A parsed table: column names plus one row of values per satellite id.
#[derive(Debug, Clone)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
    sat_index: usize,
}

/// One satellite's row, with values addressable by column name.
#[derive(Debug, Clone)]
pub struct Row<'a> {
    satellite: &'a str,
    values: HashMap<&'a str, &'a str>,
}

impl Table {
    /// Read and parse a table file.
    pub fn load(path: &Path) -> Result<Table, AppError> {
        let text = fs::read_to_string(path).map_err(|e| {
            AppError::input(format!("Failed to read table '{}': {e}", path.display()))
        })?;
        Table::parse(&text)
            .map_err(|e| AppError::input(format!("Invalid table '{}': {e}", path.display())))
    }

    /// Parse table text (see the module docs for the format).
    pub fn parse(text: &str) -> Result<Table, AppError> {
        let mut lines = text.lines();
        let header = lines
            .next()
            .ok_or_else(|| AppError::input("Table is empty."))?;
        if !header.starts_with('#') {
            return Err(AppError::input(
                "Table header must be a '#'-prefixed comment line.",
            ));
        }
        let (_, names) = header.split_once(SPLIT_TEXT).ok_or_else(|| {
            AppError::input(format!("Table header is missing the '{SPLIT_TEXT}' separator."))
        })?;
        let columns: Vec<String> = names.split_whitespace().map(str::to_string).collect();
        let sat_index = columns
            .iter()
            .position(|c| c == SAT_ID_COLUMN)
            .ok_or_else(|| {
                AppError::input(format!("Table header has no '{SAT_ID_COLUMN}' column."))
            })?;

        let mut rows = Vec::new();
        for (number, line) in lines.enumerate() {
            if line.starts_with('#') || line.trim().is_empty() {
                continue;
            }
            let values: Vec<String> = line.split_whitespace().map(str::to_string).collect();
            if values.len() != columns.len() {
                return Err(AppError::input(format!(
                    "Table line {} has {} values but the header names {} columns.",
                    number + 2,
                    values.len(),
                    columns.len()
                )));
            }
            rows.push(values);
        }

        Ok(Table {
            columns,
            rows,
            sat_index,
        })
    }

    /// All satellite ids present in the table, in file order.
    pub fn satellite_ids(&self) -> Vec<&str> {
        self.rows.iter().map(|r| r[self.sat_index].as_str()).collect()
    }

    /// Look up a satellite's row. Unknown ids are fatal: this is called once,
    /// at startup, and the error names the ids the table does know.
    pub fn lookup(&self, satellite: &str) -> Result<Row<'_>, AppError> {
        let row = self
            .rows
            .iter()
            .find(|r| r[self.sat_index] == satellite)
            .ok_or_else(|| {
                AppError::data(format!(
                    "Satellite id '{}' must be one of '{}'.",
                    satellite,
                    self.satellite_ids().join("', '")
                ))
            })?;
        let values = self
            .columns
            .iter()
            .map(String::as_str)
            .zip(row.iter().map(String::as_str))
            .collect();
        Ok(Row {
            satellite: &row[self.sat_index],
            values,
        })
    }
}

impl Row<'_> {
    pub fn satellite(&self) -> &str {
        self.satellite
    }

    /// A named value parsed as `f64`.
    pub fn f64(&self, column: &str) -> Result<f64, AppError> {
        let raw = self.values.get(column).ok_or_else(|| {
            AppError::input(format!(
                "Satellite '{}' table row has no '{column}' column.",
                self.satellite
            ))
        })?;
        raw.parse::<f64>().map_err(|e| {
            AppError::input(format!(
                "Satellite '{}' column '{column}' value '{raw}' is not a number: {e}",
                self.satellite
            ))
        })
    }
}
