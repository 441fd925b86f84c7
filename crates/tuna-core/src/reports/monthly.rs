//! Month-by-month budget execution

use chrono::Datelike;
use serde::Serialize;

use crate::models::{Campaign, ProductionOrder};

use super::{variance_pct, Classification};

/// One month of the execution view
#[derive(Debug, Clone, Serialize)]
pub struct MonthlyExecution {
    /// Calendar month, 1-12
    pub month: u32,
    /// Spanish month name for rendering
    pub label: &'static str,
    pub budget_usd: f64,
    pub actual_usd: f64,
    pub cumulative_budget_usd: f64,
    pub cumulative_actual_usd: f64,
    pub variance_pct: f64,
    pub classification: Classification,
}

const MONTH_LABELS: [&str; 12] = [
    "Enero",
    "Febrero",
    "Marzo",
    "Abril",
    "Mayo",
    "Junio",
    "Julio",
    "Agosto",
    "Septiembre",
    "Octubre",
    "Noviembre",
    "Diciembre",
];

/// Distribute the campaign's total budget evenly over its season's six
/// months and bucket order costs by open-date month.
///
/// The even split is a simplification pending seasonally-weighted budgets.
/// Orders without an open date, or dated outside the season window, are
/// not bucketed.
pub fn monthly_execution(campaign: &Campaign, orders: &[ProductionOrder]) -> Vec<MonthlyExecution> {
    let months = campaign.season.months();
    let monthly_budget = campaign.total_budget / months.len() as f64;

    let mut cumulative_budget = 0.0;
    let mut cumulative_actual = 0.0;

    months
        .iter()
        .map(|&month| {
            let actual: f64 = orders
                .iter()
                .filter(|o| {
                    o.open_date
                        .map(|d| d.month() == month && d.year() == campaign.year)
                        .unwrap_or(false)
                })
                .map(|o| o.total_cost)
                .sum();

            cumulative_budget += monthly_budget;
            cumulative_actual += actual;
            let pct = variance_pct(monthly_budget, actual);

            MonthlyExecution {
                month,
                label: MONTH_LABELS[(month - 1) as usize],
                budget_usd: monthly_budget,
                actual_usd: actual,
                cumulative_budget_usd: cumulative_budget,
                cumulative_actual_usd: cumulative_actual,
                variance_pct: pct,
                classification: Classification::for_variance_pct(pct),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{OrderStatus, Process, Season};
    use chrono::{NaiveDate, Utc};

    fn campaign(season: Season, total_budget: f64) -> Campaign {
        let (start, end) = season.window(2025);
        Campaign {
            id: 1,
            owner: "ana".to_string(),
            season,
            year: 2025,
            start_date: start,
            end_date: end,
            status: crate::models::CampaignStatus::Active,
            total_budget,
            exchange_rate: 1.0,
            created_at: Utc::now(),
        }
    }

    fn order(open: Option<(i32, u32, u32)>, cost: f64) -> ProductionOrder {
        ProductionOrder {
            id: 0,
            campaign_id: 1,
            order_number: "OP".to_string(),
            process: Process::Field,
            open_date: open.and_then(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d)),
            close_date: None,
            status: OrderStatus::Open,
            product_code: None,
            product_name: "UVA".to_string(),
            estimated_qty: 0.0,
            produced_qty: 0.0,
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
    fn test_even_split_over_six_months() {
        let report = monthly_execution(&campaign(Season::FirstHalf, 600.0), &[]);
        assert_eq!(report.len(), 6);
        assert_eq!(report[0].month, 1);
        assert_eq!(report[0].label, "Enero");
        assert!(report.iter().all(|m| m.budget_usd == 100.0));
        assert_eq!(report[5].cumulative_budget_usd, 600.0);
        assert_eq!(report[5].cumulative_actual_usd, 0.0);
    }

    #[test]
    fn test_actuals_bucketed_by_open_month() {
        let orders = vec![
            order(Some((2025, 2, 10)), 80.0),
            order(Some((2025, 2, 20)), 30.0),
            order(Some((2025, 5, 1)), 40.0),
            // No open date: never bucketed
            order(None, 999.0),
            // Wrong year: never bucketed
            order(Some((2024, 2, 10)), 999.0),
        ];
        let report = monthly_execution(&campaign(Season::FirstHalf, 600.0), &orders);

        assert_eq!(report[1].month, 2);
        assert_eq!(report[1].actual_usd, 110.0);
        assert_eq!(report[4].actual_usd, 40.0);
        assert_eq!(report[5].cumulative_actual_usd, 150.0);
    }

    #[test]
    fn test_second_half_window() {
        let orders = vec![order(Some((2025, 7, 15)), 25.0)];
        let report = monthly_execution(&campaign(Season::SecondHalf, 0.0), &orders);
        assert_eq!(report[0].month, 7);
        assert_eq!(report[0].label, "Julio");
        assert_eq!(report[0].actual_usd, 25.0);
        // Zero budget: percentage is guarded, not infinite
        assert_eq!(report[0].variance_pct, 0.0);
    }
}
