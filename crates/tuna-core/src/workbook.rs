//! Workbook loading: Excel (.xlsx/.xls) via calamine, delimited text via csv
//!
//! Everything downstream (detection, column mapping, parsing) works on a
//! plain `Vec<Vec<String>>` grid so the two input formats converge here.

use std::io::Cursor;

use calamine::{open_workbook_auto_from_rs, Data, Reader};
use tracing::debug;

use crate::error::{Error, Result};

/// File extensions handled by calamine
const EXCEL_EXTENSIONS: &[&str] = &["xlsx", "xls", "xlsm", "xlsb"];

/// True if the filename looks like an Excel workbook
pub fn is_excel(file_name: &str) -> bool {
    file_name
        .rsplit('.')
        .next()
        .map(|ext| EXCEL_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

/// Load an uploaded file into a 2-D grid of trimmed cell strings.
///
/// Excel files read the first worksheet; anything else is treated as
/// delimited text with the separator sniffed from the first line.
pub fn load_grid(file_name: &str, data: &[u8]) -> Result<Vec<Vec<String>>> {
    if is_excel(file_name) {
        load_excel_grid(data)
    } else {
        load_delimited_grid(data)
    }
}

/// Worksheet names of an Excel buffer; empty for non-Excel or unreadable input
pub fn sheet_names(file_name: &str, data: &[u8]) -> Vec<String> {
    if !is_excel(file_name) {
        return Vec::new();
    }
    match open_workbook_auto_from_rs(Cursor::new(data.to_vec())) {
        Ok(wb) => wb.sheet_names().to_vec(),
        Err(_) => Vec::new(),
    }
}

fn load_excel_grid(data: &[u8]) -> Result<Vec<Vec<String>>> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(data.to_vec()))
        .map_err(|e| Error::Workbook(e.to_string()))?;

    let sheet = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| Error::Workbook("Workbook has no sheets".into()))?;

    let range = workbook
        .worksheet_range(&sheet)
        .map_err(|e| Error::Workbook(e.to_string()))?;

    let grid: Vec<Vec<String>> = range
        .rows()
        .map(|row| row.iter().map(cell_to_string).collect())
        .collect();

    debug!(sheet = %sheet, rows = grid.len(), "Loaded Excel grid");
    Ok(grid)
}

fn load_delimited_grid(data: &[u8]) -> Result<Vec<Vec<String>>> {
    let delimiter = sniff_delimiter(data);

    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(delimiter)
        .from_reader(data);

    let mut grid = Vec::new();
    for record in rdr.records() {
        let record = record?;
        grid.push(record.iter().map(|c| c.trim().to_string()).collect());
    }

    debug!(rows = grid.len(), delimiter = %(delimiter as char), "Loaded delimited grid");
    Ok(grid)
}

/// ERP exports in this domain use either ',' or ';' depending on locale
fn sniff_delimiter(data: &[u8]) -> u8 {
    let first_line = data.split(|&b| b == b'\n').next().unwrap_or(&[]);
    let semicolons = first_line.iter().filter(|&&b| b == b';').count();
    let commas = first_line.iter().filter(|&&b| b == b',').count();
    if semicolons > commas {
        b';'
    } else {
        b','
    }
}

/// Render a calamine cell as a trimmed string; date cells become ISO dates
pub fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::String(s) => s.trim().to_string(),
        Data::Float(f) => {
            if (f.floor() - f).abs() < f64::EPSILON {
                format!("{}", *f as i64)
            } else {
                format!("{}", f)
            }
        }
        Data::Int(i) => i.to_string(),
        Data::Bool(b) => b.to_string(),
        Data::DateTime(dt) => dt
            .as_datetime()
            .map(|d| d.date().to_string())
            .unwrap_or_default(),
        Data::DateTimeIso(s) => s.clone(),
        Data::DurationIso(s) => s.clone(),
        Data::Empty | Data::Error(_) => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_excel() {
        assert!(is_excel("Presupuesto 2024.xlsx"));
        assert!(is_excel("ordenes.XLS"));
        assert!(!is_excel("presupuesto.csv"));
        assert!(!is_excel("noextension"));
    }

    #[test]
    fn test_load_comma_csv() {
        let data = b"Rubro,Presupuesto,Real\nAgroquimicos,1000,850\n";
        let grid = load_grid("variacion.csv", data).unwrap();
        assert_eq!(grid.len(), 2);
        assert_eq!(grid[0], vec!["Rubro", "Presupuesto", "Real"]);
        assert_eq!(grid[1][1], "1000");
    }

    #[test]
    fn test_load_semicolon_csv() {
        let data = b"Rubro;Presupuesto;Real\nFletes;200;250\n";
        let grid = load_grid("datos.txt", data).unwrap();
        assert_eq!(grid[1][0], "Fletes");
        assert_eq!(grid[1][2], "250");
    }

    #[test]
    fn test_unreadable_excel_is_error() {
        let result = load_grid("roto.xlsx", b"not a zip archive");
        assert!(matches!(result, Err(crate::error::Error::Workbook(_))));
    }
}
