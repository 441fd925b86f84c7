//! Production order storage

use chrono::NaiveDate;
use rusqlite::{params, Row};

use crate::error::Result;
use crate::models::{NewProductionOrder, OrderStatus, Process, ProductionOrder};

use super::{parse_datetime, Database};

fn order_from_row(row: &Row<'_>) -> rusqlite::Result<ProductionOrder> {
    let process_str: String = row.get(3)?;
    let open_str: Option<String> = row.get(4)?;
    let close_str: Option<String> = row.get(5)?;
    let status_str: String = row.get(6)?;
    let created_str: String = row.get(17)?;

    Ok(ProductionOrder {
        id: row.get(0)?,
        campaign_id: row.get(1)?,
        order_number: row.get(2)?,
        process: process_str.parse().unwrap_or(Process::Field),
        open_date: open_str.and_then(|s| NaiveDate::parse_from_str(&s, "%Y-%m-%d").ok()),
        close_date: close_str.and_then(|s| NaiveDate::parse_from_str(&s, "%Y-%m-%d").ok()),
        status: status_str.parse().unwrap_or(OrderStatus::Other),
        product_code: row.get(7)?,
        product_name: row.get(8)?,
        estimated_qty: row.get(9)?,
        produced_qty: row.get(10)?,
        qty_variance: row.get(11)?,
        period_expense: row.get(12)?,
        cumulative_expense: row.get(13)?,
        unit_cost: row.get(14)?,
        total_cost: row.get(15)?,
        labor_hours: row.get(16)?,
        created_at: parse_datetime(&created_str),
    })
}

impl Database {
    /// Replace all production orders for a campaign with a freshly parsed
    /// ledger
    pub fn replace_orders(&self, campaign_id: i64, orders: &[NewProductionOrder]) -> Result<usize> {
        self.replace_rows(
            "production_orders",
            campaign_id,
            "INSERT INTO production_orders
                (campaign_id, order_number, process, open_date, close_date, status,
                 product_code, product_name, estimated_qty, produced_qty, qty_variance,
                 period_expense, cumulative_expense, unit_cost, total_cost, labor_hours)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)",
            orders,
            |stmt, order| {
                stmt.execute(params![
                    campaign_id,
                    order.order_number,
                    order.process.as_str(),
                    order.open_date.map(|d| d.format("%Y-%m-%d").to_string()),
                    order.close_date.map(|d| d.format("%Y-%m-%d").to_string()),
                    order.status.as_str(),
                    order.product_code,
                    order.product_name,
                    order.estimated_qty,
                    order.produced_qty,
                    order.qty_variance,
                    order.period_expense,
                    order.cumulative_expense,
                    order.unit_cost,
                    order.total_cost,
                    order.labor_hours,
                ])
            },
        )
    }

    /// All production orders for a campaign, in ledger order
    pub fn list_orders(&self, campaign_id: i64) -> Result<Vec<ProductionOrder>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, campaign_id, order_number, process, open_date, close_date, status,
                    product_code, product_name, estimated_qty, produced_qty, qty_variance,
                    period_expense, cumulative_expense, unit_cost, total_cost, labor_hours,
                    created_at
             FROM production_orders WHERE campaign_id = ?1 ORDER BY id",
        )?;
        let orders = stmt
            .query_map(params![campaign_id], order_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(orders)
    }
}
