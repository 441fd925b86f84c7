//! Budget sheet parser

use tracing::debug;

use crate::columns::{ColumnMap, FieldId};
use crate::error::{Error, Result};
use crate::models::NewBudgetRow;

use super::{non_empty, parse_number, parse_process, ParseSummary, ParsedSheet};

/// Walk data rows below the header and emit normalized budget line items.
///
/// The category column is required; a sheet without one cannot be imported
/// at all and fails with a descriptive error rather than an empty result.
pub fn parse_budget_sheet(
    rows: &[Vec<String>],
    map: &ColumnMap,
) -> Result<ParsedSheet<NewBudgetRow>> {
    if map.col(FieldId::Category).is_none() {
        return Err(Error::MissingColumn(
            "category (expected a header like 'Rubro', 'Categoría' or 'Descripción')".into(),
        ));
    }

    let mut out = Vec::new();
    let mut summary = ParseSummary::default();

    for (i, row) in rows.iter().enumerate().skip(map.header_row + 1) {
        let category = map.cell(row, FieldId::Category).trim();
        if category.is_empty() {
            summary.skip(i, "empty category cell");
            continue;
        }

        let budget_usd = parse_number(map.cell(row, FieldId::Budget));
        let actual = non_empty(map.cell(row, FieldId::Actual)).map(|s| parse_number(&s));
        let exchange_rate = non_empty(map.cell(row, FieldId::ExchangeRate)).map(|s| parse_number(&s));

        out.push(NewBudgetRow {
            code: non_empty(map.cell(row, FieldId::Code)),
            category: category.to_string(),
            process: parse_process(map.cell(row, FieldId::Process)),
            budget_usd,
            actual_usd: actual,
            exchange_rate,
        });
        summary.processed_rows += 1;
    }

    debug!(
        processed = summary.processed_rows,
        skipped = summary.skipped_rows,
        "Parsed budget sheet"
    );
    Ok(ParsedSheet { rows: out, summary })
}
