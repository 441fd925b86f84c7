//! Campaign-level KPI set

use serde::Serialize;

use crate::models::{Campaign, OrderStatus, ProductionOrder};

use super::{safe_ratio, variance_pct};

/// Derived efficiency/performance ratios for one campaign.
///
/// Every ratio is zero-guarded: a missing denominator yields 0, never NaN.
#[derive(Debug, Clone, Serialize)]
pub struct CampaignRatios {
    /// Total cost / total produced quantity
    pub cost_per_kg: f64,
    /// Total cost / planted hectares
    pub cost_per_hectare: f64,
    /// Total cost / order count
    pub cost_per_order: f64,
    /// Total produced quantity / planted hectares
    pub yield_per_hectare: f64,
    /// Sum of produced quantity across all orders
    pub total_production: f64,
    /// Closed orders as a percentage of all orders
    pub closed_order_pct: f64,
    /// Actual spend as a percentage of total budget
    pub budget_execution_pct: f64,
    /// (actual - budget) / budget, percent
    pub variance_pct: f64,
    /// Produced quantity as a percentage of estimated quantity
    pub efficiency_pct: f64,
}

/// Compute the KPI set from the campaign's orders.
///
/// `hectares` is supplied by the caller; planted area is not part of the
/// ingested data model.
pub fn campaign_ratios(
    campaign: &Campaign,
    orders: &[ProductionOrder],
    hectares: f64,
) -> CampaignRatios {
    let total_cost: f64 = orders.iter().map(|o| o.total_cost).sum();
    let total_production: f64 = orders.iter().map(|o| o.produced_qty).sum();
    let total_estimated: f64 = orders.iter().map(|o| o.estimated_qty).sum();
    let closed = orders
        .iter()
        .filter(|o| o.status == OrderStatus::Closed)
        .count() as f64;

    CampaignRatios {
        cost_per_kg: safe_ratio(total_cost, total_production),
        cost_per_hectare: safe_ratio(total_cost, hectares),
        cost_per_order: safe_ratio(total_cost, orders.len() as f64),
        yield_per_hectare: safe_ratio(total_production, hectares),
        total_production,
        closed_order_pct: safe_ratio(closed, orders.len() as f64) * 100.0,
        budget_execution_pct: safe_ratio(total_cost, campaign.total_budget) * 100.0,
        variance_pct: variance_pct(campaign.total_budget, total_cost),
        efficiency_pct: safe_ratio(total_production, total_estimated) * 100.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CampaignStatus, Process, Season};
    use chrono::Utc;

    fn campaign(total_budget: f64) -> Campaign {
        let (start, end) = Season::FirstHalf.window(2025);
        Campaign {
            id: 1,
            owner: "ana".to_string(),
            season: Season::FirstHalf,
            year: 2025,
            start_date: start,
            end_date: end,
            status: CampaignStatus::Active,
            total_budget,
            exchange_rate: 1.0,
            created_at: Utc::now(),
        }
    }

    fn order(status: OrderStatus, estimated: f64, produced: f64, cost: f64) -> ProductionOrder {
        ProductionOrder {
            id: 0,
            campaign_id: 1,
            order_number: "OP".to_string(),
            process: Process::Field,
            open_date: None,
            close_date: None,
            status,
            product_code: None,
            product_name: "UVA".to_string(),
            estimated_qty: estimated,
            produced_qty: produced,
            qty_variance: produced - estimated,
            period_expense: 0.0,
            cumulative_expense: 0.0,
            unit_cost: 0.0,
            total_cost: cost,
            labor_hours: 0.0,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_empty_orders_all_zero() {
        let ratios = campaign_ratios(&campaign(1000.0), &[], 10.0);
        assert_eq!(ratios.cost_per_kg, 0.0);
        assert_eq!(ratios.cost_per_order, 0.0);
        assert_eq!(ratios.total_production, 0.0);
        assert_eq!(ratios.closed_order_pct, 0.0);
        assert_eq!(ratios.budget_execution_pct, 0.0);
        assert_eq!(ratios.efficiency_pct, 0.0);
    }

    #[test]
    fn test_kpi_arithmetic() {
        let orders = vec![
            order(OrderStatus::Closed, 500.0, 400.0, 300.0),
            order(OrderStatus::Open, 500.0, 400.0, 100.0),
        ];
        let ratios = campaign_ratios(&campaign(1000.0), &orders, 4.0);

        assert_eq!(ratios.cost_per_kg, 0.5); // 400 / 800
        assert_eq!(ratios.cost_per_hectare, 100.0);
        assert_eq!(ratios.cost_per_order, 200.0);
        assert_eq!(ratios.yield_per_hectare, 200.0);
        assert_eq!(ratios.total_production, 800.0);
        assert_eq!(ratios.closed_order_pct, 50.0);
        assert_eq!(ratios.budget_execution_pct, 40.0);
        assert_eq!(ratios.variance_pct, -60.0);
        assert_eq!(ratios.efficiency_pct, 80.0);
    }

    #[test]
    fn test_zero_hectares_guarded() {
        let orders = vec![order(OrderStatus::Closed, 100.0, 100.0, 100.0)];
        let ratios = campaign_ratios(&campaign(0.0), &orders, 0.0);
        assert_eq!(ratios.cost_per_hectare, 0.0);
        assert_eq!(ratios.yield_per_hectare, 0.0);
        assert_eq!(ratios.budget_execution_pct, 0.0);
        assert_eq!(ratios.variance_pct, 0.0);
    }
}
