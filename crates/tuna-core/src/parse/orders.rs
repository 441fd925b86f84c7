//! Production-order ledger parser
//!
//! Besides the order rows themselves, this parser accumulates the per-EEFF-
//! concept spend totals split by process. Those totals are the sole input
//! feed for the reconciliation engine's concept list.

use std::collections::BTreeMap;

use tracing::debug;

use crate::columns::{ColumnMap, FieldId};
use crate::error::{Error, Result};
use crate::models::{ConceptTotal, NewProductionOrder, OrderStatus, Process};

use super::{non_empty, parse_date, parse_number, ParseSummary};

/// Orders plus the derived per-concept totals
#[derive(Debug, Clone)]
pub struct ParsedOrders {
    pub orders: Vec<NewProductionOrder>,
    pub concept_totals: Vec<ConceptTotal>,
    pub summary: ParseSummary,
}

pub fn parse_orders_sheet(rows: &[Vec<String>], map: &ColumnMap) -> Result<ParsedOrders> {
    if map.col(FieldId::ProductName).is_none() {
        return Err(Error::MissingColumn(
            "product name (expected a header like 'Producto', 'Descripción' or 'Item')".into(),
        ));
    }

    let mut orders = Vec::new();
    let mut summary = ParseSummary::default();
    // BTreeMap keeps concept totals in a stable order across uploads
    let mut totals: BTreeMap<String, ConceptTotal> = BTreeMap::new();

    for (i, row) in rows.iter().enumerate().skip(map.header_row + 1) {
        let product_name = map.cell(row, FieldId::ProductName).trim();
        if product_name.is_empty() {
            summary.skip(i, "empty product cell");
            continue;
        }

        let type_code = map.cell(row, FieldId::TypeCode);
        let process = match Process::from_type_code(type_code) {
            Some(p) => p,
            None => {
                summary
                    .warnings
                    .push(format!("Row {}: unknown type code '{}', assuming field", i + 1, type_code));
                Process::Field
            }
        };

        let estimated_qty = parse_number(map.cell(row, FieldId::EstimatedQty));
        let produced_qty = parse_number(map.cell(row, FieldId::ProducedQty));
        let cumulative_expense = parse_number(map.cell(row, FieldId::CumulativeExpense));
        let total_cost = parse_number(map.cell(row, FieldId::TotalCost));

        let order = NewProductionOrder {
            order_number: map.cell(row, FieldId::OrderNumber).trim().to_string(),
            process,
            open_date: parse_date(map.cell(row, FieldId::OpenDate)),
            close_date: parse_date(map.cell(row, FieldId::CloseDate)),
            status: OrderStatus::parse_cell(map.cell(row, FieldId::Status)),
            product_code: non_empty(map.cell(row, FieldId::ProductCode)),
            product_name: product_name.to_string(),
            estimated_qty,
            produced_qty,
            qty_variance: produced_qty - estimated_qty,
            period_expense: parse_number(map.cell(row, FieldId::PeriodExpense)),
            cumulative_expense,
            unit_cost: parse_number(map.cell(row, FieldId::UnitCost)),
            total_cost,
            labor_hours: parse_number(map.cell(row, FieldId::LaborHours)),
        };

        // Running per-concept totals: the concept label comes from the
        // order's product line, the process split from its type code. Orders
        // without a captured total cost fall back to the cumulative expense.
        let amount = if order.total_cost != 0.0 {
            order.total_cost
        } else {
            order.cumulative_expense
        };
        let concept = concept_label(&order);
        totals
            .entry(concept.clone())
            .or_insert_with(|| ConceptTotal {
                concept,
                ..Default::default()
            })
            .add(process, amount);

        orders.push(order);
        summary.processed_rows += 1;
    }

    debug!(
        processed = summary.processed_rows,
        skipped = summary.skipped_rows,
        concepts = totals.len(),
        "Parsed production-order ledger"
    );

    Ok(ParsedOrders {
        orders,
        concept_totals: totals.into_values().collect(),
        summary,
    })
}

/// EEFF concept label for an order: its product line, uppercased
fn concept_label(order: &NewProductionOrder) -> String {
    order.product_name.trim().to_uppercase()
}
