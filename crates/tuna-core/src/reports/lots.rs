//! Per-lot profitability estimates

use serde::Serialize;

use crate::models::{ProductionOrder, Process};

use super::safe_ratio;

/// Estimated sale value multiplier over total cost.
///
/// Placeholder pending a real sales ledger; the margin this produces is a
/// stand-in, not a validated business figure.
pub const SALE_ESTIMATE_FACTOR: f64 = 1.2;

/// One packed lot with its estimated profitability
#[derive(Debug, Clone, Serialize)]
pub struct LotProfitability {
    pub order_number: String,
    pub product_name: String,
    pub produced_qty: f64,
    pub total_cost_usd: f64,
    pub estimated_sale_usd: f64,
    pub utility_usd: f64,
    pub margin_pct: f64,
}

/// Profitability per packing order. Nursery and field orders are cost
/// centers, not sellable lots, and are excluded.
pub fn lot_profitability(orders: &[ProductionOrder]) -> Vec<LotProfitability> {
    orders
        .iter()
        .filter(|o| o.process == Process::Packing)
        .map(|order| {
            let estimated_sale = order.total_cost * SALE_ESTIMATE_FACTOR;
            let utility = estimated_sale - order.total_cost;
            LotProfitability {
                order_number: order.order_number.clone(),
                product_name: order.product_name.clone(),
                produced_qty: order.produced_qty,
                total_cost_usd: order.total_cost,
                estimated_sale_usd: estimated_sale,
                utility_usd: utility,
                margin_pct: safe_ratio(utility, estimated_sale) * 100.0,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::OrderStatus;
    use chrono::Utc;

    fn order(number: &str, process: Process, cost: f64) -> ProductionOrder {
        ProductionOrder {
            id: 0,
            campaign_id: 1,
            order_number: number.to_string(),
            process,
            open_date: None,
            close_date: None,
            status: OrderStatus::Closed,
            product_code: None,
            product_name: "UVA RED GLOBE".to_string(),
            estimated_qty: 0.0,
            produced_qty: 500.0,
            qty_variance: 0.0,
            period_expense: 0.0,
            cumulative_expense: 0.0,
            unit_cost: 0.0,
            total_cost: cost,
            labor_hours: 0.0,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_only_packing_orders() {
        let orders = vec![
            order("OP-1", Process::Packing, 100.0),
            order("OP-2", Process::Field, 100.0),
            order("OP-3", Process::Nursery, 100.0),
        ];
        let lots = lot_profitability(&orders);
        assert_eq!(lots.len(), 1);
        assert_eq!(lots[0].order_number, "OP-1");
    }

    #[test]
    fn test_estimated_sale_and_margin() {
        let lots = lot_profitability(&[order("OP-1", Process::Packing, 100.0)]);
        assert_eq!(lots[0].estimated_sale_usd, 120.0);
        assert_eq!(lots[0].utility_usd, 20.0);
        assert!((lots[0].margin_pct - 16.666666).abs() < 0.001);
    }

    #[test]
    fn test_zero_cost_lot_is_guarded() {
        let lots = lot_profitability(&[order("OP-1", Process::Packing, 0.0)]);
        assert_eq!(lots[0].estimated_sale_usd, 0.0);
        assert_eq!(lots[0].margin_pct, 0.0);
    }
}
