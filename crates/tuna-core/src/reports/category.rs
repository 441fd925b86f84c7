//! Variance by budget category

use std::collections::HashMap;

use serde::Serialize;

use crate::models::BudgetRow;

use super::{variance_pct, Classification};

/// One aggregate line of the by-category variance view
#[derive(Debug, Clone, Serialize)]
pub struct CategoryVariance {
    pub category: String,
    pub budget_usd: f64,
    pub actual_usd: f64,
    pub variance: f64,
    pub variance_pct: f64,
    pub classification: Classification,
}

/// Group budget rows by category name across processes, summing budget and
/// actual. Rows keep their first-appearance order from the sheet.
pub fn variance_by_category(rows: &[BudgetRow]) -> Vec<CategoryVariance> {
    let mut order: Vec<String> = Vec::new();
    let mut sums: HashMap<String, (f64, f64)> = HashMap::new();

    for row in rows {
        let entry = sums.entry(row.category.clone()).or_insert_with(|| {
            order.push(row.category.clone());
            (0.0, 0.0)
        });
        entry.0 += row.budget_usd;
        entry.1 += row.actual_usd.unwrap_or(0.0);
    }

    order
        .into_iter()
        .map(|category| {
            let (budget, actual) = sums[&category];
            let pct = variance_pct(budget, actual);
            CategoryVariance {
                category,
                budget_usd: budget,
                actual_usd: actual,
                variance: actual - budget,
                variance_pct: pct,
                classification: Classification::for_variance_pct(pct),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Process;
    use chrono::Utc;

    fn row(category: &str, process: Process, budget: f64, actual: Option<f64>) -> BudgetRow {
        BudgetRow {
            id: 0,
            campaign_id: 1,
            code: None,
            category: category.to_string(),
            process,
            budget_usd: budget,
            actual_usd: actual,
            exchange_rate: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_empty_input_is_empty_report() {
        assert!(variance_by_category(&[]).is_empty());
    }

    #[test]
    fn test_groups_across_processes() {
        let rows = vec![
            row("Jornales", Process::Field, 100.0, Some(60.0)),
            row("Jornales", Process::Packing, 100.0, Some(30.0)),
            row("Fletes", Process::Packing, 50.0, Some(55.0)),
        ];
        let report = variance_by_category(&rows);
        assert_eq!(report.len(), 2);

        assert_eq!(report[0].category, "Jornales");
        assert_eq!(report[0].budget_usd, 200.0);
        assert_eq!(report[0].actual_usd, 90.0);
        assert_eq!(report[0].variance, -110.0);
        assert_eq!(report[0].classification, Classification::Favorable);

        assert_eq!(report[1].category, "Fletes");
        assert_eq!(report[1].variance_pct, 10.0);
        assert_eq!(report[1].classification, Classification::Desfavorable);
    }

    #[test]
    fn test_variance_sign_convention() {
        let report = variance_by_category(&[row("A", Process::Field, 100.0, Some(90.0))]);
        assert_eq!(report[0].variance, -10.0);
        assert_eq!(report[0].variance_pct, -10.0);
        assert_eq!(report[0].classification, Classification::Favorable);

        let report = variance_by_category(&[row("B", Process::Field, 100.0, Some(101.0))]);
        assert_eq!(report[0].variance_pct, 1.0);
        assert_eq!(report[0].classification, Classification::Neutral);
    }

    #[test]
    fn test_zero_budget_is_guarded() {
        let report = variance_by_category(&[row("A", Process::Field, 0.0, Some(50.0))]);
        assert_eq!(report[0].variance_pct, 0.0);
        assert_eq!(report[0].classification, Classification::Neutral);
    }

    #[test]
    fn test_missing_actual_counts_as_zero() {
        let report = variance_by_category(&[row("A", Process::Field, 100.0, None)]);
        assert_eq!(report[0].actual_usd, 0.0);
        assert_eq!(report[0].variance, -100.0);
    }
}
