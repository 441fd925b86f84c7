//! Variance partitioned by process, with rollups

use serde::Serialize;

use crate::models::{BudgetRow, Process};

use super::category::{variance_by_category, CategoryVariance};
use super::{variance_pct, Classification};

/// One process partition with its per-category lines and subtotal
#[derive(Debug, Clone, Serialize)]
pub struct ProcessGroup {
    pub process: Process,
    pub categories: Vec<CategoryVariance>,
    pub budget_usd: f64,
    pub actual_usd: f64,
    pub variance: f64,
    pub variance_pct: f64,
    pub classification: Classification,
}

/// The full by-process view: one group per process plus a grand total
#[derive(Debug, Clone, Serialize)]
pub struct ProcessVarianceReport {
    pub groups: Vec<ProcessGroup>,
    pub total_budget_usd: f64,
    pub total_actual_usd: f64,
    pub total_variance: f64,
    pub total_variance_pct: f64,
    pub classification: Classification,
}

/// Partition budget rows by process, then aggregate categories within each
/// partition. Processes with no rows are omitted.
pub fn variance_by_process(rows: &[BudgetRow]) -> ProcessVarianceReport {
    let mut groups = Vec::new();
    let mut total_budget = 0.0;
    let mut total_actual = 0.0;

    for &process in Process::all() {
        let partition: Vec<BudgetRow> = rows
            .iter()
            .filter(|r| r.process == process)
            .cloned()
            .collect();
        if partition.is_empty() {
            continue;
        }

        let categories = variance_by_category(&partition);
        let budget: f64 = categories.iter().map(|c| c.budget_usd).sum();
        let actual: f64 = categories.iter().map(|c| c.actual_usd).sum();
        let pct = variance_pct(budget, actual);

        total_budget += budget;
        total_actual += actual;
        groups.push(ProcessGroup {
            process,
            categories,
            budget_usd: budget,
            actual_usd: actual,
            variance: actual - budget,
            variance_pct: pct,
            classification: Classification::for_variance_pct(pct),
        });
    }

    let total_pct = variance_pct(total_budget, total_actual);
    ProcessVarianceReport {
        groups,
        total_budget_usd: total_budget,
        total_actual_usd: total_actual,
        total_variance: total_actual - total_budget,
        total_variance_pct: total_pct,
        classification: Classification::for_variance_pct(total_pct),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn row(category: &str, process: Process, budget: f64, actual: f64) -> BudgetRow {
        BudgetRow {
            id: 0,
            campaign_id: 1,
            code: None,
            category: category.to_string(),
            process,
            budget_usd: budget,
            actual_usd: Some(actual),
            exchange_rate: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_empty_input_zeroed_totals() {
        let report = variance_by_process(&[]);
        assert!(report.groups.is_empty());
        assert_eq!(report.total_budget_usd, 0.0);
        assert_eq!(report.total_variance_pct, 0.0);
    }

    #[test]
    fn test_partitions_in_production_order() {
        let rows = vec![
            row("Cajas", Process::Packing, 100.0, 120.0),
            row("Semillas", Process::Nursery, 200.0, 150.0),
            row("Jornales", Process::Field, 300.0, 300.0),
        ];
        let report = variance_by_process(&rows);

        assert_eq!(report.groups.len(), 3);
        assert_eq!(report.groups[0].process, Process::Nursery);
        assert_eq!(report.groups[1].process, Process::Field);
        assert_eq!(report.groups[2].process, Process::Packing);

        assert_eq!(report.groups[0].variance, -50.0);
        assert_eq!(report.groups[0].classification, Classification::Favorable);
        assert_eq!(report.groups[2].variance_pct, 20.0);

        assert_eq!(report.total_budget_usd, 600.0);
        assert_eq!(report.total_actual_usd, 570.0);
        assert_eq!(report.total_variance, -30.0);
        assert_eq!(report.classification, Classification::Favorable);
    }

    #[test]
    fn test_missing_process_is_omitted() {
        let rows = vec![row("Jornales", Process::Field, 100.0, 90.0)];
        let report = variance_by_process(&rows);
        assert_eq!(report.groups.len(), 1);
        assert_eq!(report.groups[0].process, Process::Field);
    }
}
