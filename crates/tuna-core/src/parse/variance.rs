//! Variance worksheet parser

use tracing::debug;

use crate::columns::{ColumnMap, FieldId};
use crate::error::{Error, Result};
use crate::models::NewVarianceRow;

use super::{non_empty, parse_number, ParseSummary, ParsedSheet};

pub fn parse_variance_sheet(
    rows: &[Vec<String>],
    map: &ColumnMap,
) -> Result<ParsedSheet<NewVarianceRow>> {
    if map.col(FieldId::Rubric).is_none() {
        return Err(Error::MissingColumn(
            "rubric (expected a header like 'Rubro' or 'Concepto')".into(),
        ));
    }

    let mut out = Vec::new();
    let mut summary = ParseSummary::default();

    for (i, row) in rows.iter().enumerate().skip(map.header_row + 1) {
        let rubric = map.cell(row, FieldId::Rubric).trim();
        if rubric.is_empty() {
            summary.skip(i, "empty rubric cell");
            continue;
        }

        let budget_usd = parse_number(map.cell(row, FieldId::Budget));
        let actual_usd = parse_number(map.cell(row, FieldId::Actual));

        // The worksheet's own variance column is advisory; the stored values
        // are recomputed so all rows share one convention
        let variance = match non_empty(map.cell(row, FieldId::Variance)) {
            Some(v) => parse_number(&v),
            None => actual_usd - budget_usd,
        };
        let variance_pct = if budget_usd != 0.0 {
            (actual_usd - budget_usd) / budget_usd * 100.0
        } else {
            0.0
        };

        out.push(NewVarianceRow {
            rubric: rubric.to_string(),
            budget_usd,
            actual_usd,
            variance,
            variance_pct,
        });
        summary.processed_rows += 1;
    }

    debug!(
        processed = summary.processed_rows,
        skipped = summary.skipped_rows,
        "Parsed variance sheet"
    );
    Ok(ParsedSheet { rows: out, summary })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::columns::SheetLayout;

    fn grid(raw: &[&[&str]]) -> Vec<Vec<String>> {
        raw.iter()
            .map(|r| r.iter().map(|c| c.to_string()).collect())
            .collect()
    }

    #[test]
    fn test_parse_variance_rows() {
        let rows = grid(&[
            &["Rubro", "Presupuesto", "Real", "Variación"],
            &["Fletes", "100", "120", "20"],
            &["Agroquimicos", "1000", "850", ""],
        ]);
        let map = ColumnMap::detect(&rows, SheetLayout::Variance);
        let parsed = parse_variance_sheet(&rows, &map).unwrap();

        assert_eq!(parsed.rows.len(), 2);
        assert_eq!(parsed.rows[0].variance, 20.0);
        assert_eq!(parsed.rows[0].variance_pct, 20.0);
        // Missing variance cell is recomputed from budget/actual
        assert_eq!(parsed.rows[1].variance, -150.0);
        assert_eq!(parsed.rows[1].variance_pct, -15.0);
    }

    #[test]
    fn test_zero_budget_guard() {
        let rows = grid(&[
            &["Rubro", "Presupuesto", "Real"],
            &["Imprevistos", "0", "50"],
        ]);
        let map = ColumnMap::detect(&rows, SheetLayout::Variance);
        let parsed = parse_variance_sheet(&rows, &map).unwrap();
        assert_eq!(parsed.rows[0].variance_pct, 0.0);
        assert_eq!(parsed.rows[0].variance, 50.0);
    }

    #[test]
    fn test_empty_rubric_skipped() {
        let rows = grid(&[
            &["Rubro", "Presupuesto", "Real"],
            &["", "10", "10"],
        ]);
        let map = ColumnMap::detect(&rows, SheetLayout::Variance);
        let parsed = parse_variance_sheet(&rows, &map).unwrap();
        assert!(parsed.rows.is_empty());
        assert_eq!(parsed.summary.skipped_rows, 1);
    }
}
