//! CSV rendering for report views
//!
//! Every report exports with the same shape: one title row, one header row,
//! one row per aggregate. Formatting happens here, not in the report
//! structs: currency to 2 decimals, percentages to 1.

use csv::WriterBuilder;

use crate::error::{Error, Result};
use crate::reports::category::CategoryVariance;
use crate::reports::lots::LotProfitability;
use crate::reports::monthly::MonthlyExecution;
use crate::reports::process::ProcessVarianceReport;
use crate::reports::ratios::CampaignRatios;

fn money(value: f64) -> String {
    format!("{:.2}", value)
}

fn pct(value: f64) -> String {
    format!("{:.1}", value)
}

fn render<F>(title: &str, header: &[&str], write_rows: F) -> Result<String>
where
    F: FnOnce(&mut csv::Writer<Vec<u8>>) -> Result<()>,
{
    // Title and header rows have different widths
    let mut writer = WriterBuilder::new().flexible(true).from_writer(vec![]);
    writer.write_record([title])?;
    writer.write_record(header)?;
    write_rows(&mut writer)?;

    let bytes = writer.into_inner().map_err(|e| e.into_error())?;
    String::from_utf8(bytes).map_err(|e| Error::InvalidData(format!("Invalid CSV output: {}", e)))
}

/// Render the by-category variance view
pub fn category_csv(rows: &[CategoryVariance]) -> Result<String> {
    render(
        "Variacion por Categoria",
        &["Categoria", "Presupuesto", "Real", "Variacion", "Variacion %", "Clasificacion"],
        |writer| {
            for row in rows {
                writer.write_record([
                    row.category.as_str(),
                    &money(row.budget_usd),
                    &money(row.actual_usd),
                    &money(row.variance),
                    &pct(row.variance_pct),
                    row.classification.label(),
                ])?;
            }
            Ok(())
        },
    )
}

/// Render the by-process variance view, with per-process subtotal rows and
/// a grand-total row
pub fn process_csv(report: &ProcessVarianceReport) -> Result<String> {
    render(
        "Variacion por Proceso",
        &["Proceso", "Categoria", "Presupuesto", "Real", "Variacion", "Variacion %", "Clasificacion"],
        |writer| {
            for group in &report.groups {
                for row in &group.categories {
                    writer.write_record([
                        group.process.label(),
                        row.category.as_str(),
                        &money(row.budget_usd),
                        &money(row.actual_usd),
                        &money(row.variance),
                        &pct(row.variance_pct),
                        row.classification.label(),
                    ])?;
                }
                writer.write_record([
                    group.process.label(),
                    "Subtotal",
                    &money(group.budget_usd),
                    &money(group.actual_usd),
                    &money(group.variance),
                    &pct(group.variance_pct),
                    group.classification.label(),
                ])?;
            }
            writer.write_record([
                "Total",
                "",
                &money(report.total_budget_usd),
                &money(report.total_actual_usd),
                &money(report.total_variance),
                &pct(report.total_variance_pct),
                report.classification.label(),
            ])?;
            Ok(())
        },
    )
}

/// Render the monthly execution view
pub fn monthly_csv(rows: &[MonthlyExecution]) -> Result<String> {
    render(
        "Ejecucion Mensual",
        &["Mes", "Presupuesto", "Real", "Presupuesto Acum.", "Real Acum.", "Variacion %"],
        |writer| {
            for row in rows {
                writer.write_record([
                    row.label,
                    &money(row.budget_usd),
                    &money(row.actual_usd),
                    &money(row.cumulative_budget_usd),
                    &money(row.cumulative_actual_usd),
                    &pct(row.variance_pct),
                ])?;
            }
            Ok(())
        },
    )
}

/// Render the by-lot profitability view
pub fn lots_csv(rows: &[LotProfitability]) -> Result<String> {
    render(
        "Rentabilidad por Lote",
        &["Orden", "Producto", "Cantidad", "Costo", "Venta Estimada", "Utilidad", "Margen %"],
        |writer| {
            for row in rows {
                writer.write_record([
                    row.order_number.as_str(),
                    row.product_name.as_str(),
                    &money(row.produced_qty),
                    &money(row.total_cost_usd),
                    &money(row.estimated_sale_usd),
                    &money(row.utility_usd),
                    &pct(row.margin_pct),
                ])?;
            }
            Ok(())
        },
    )
}

/// Render the campaign KPI view, one row per ratio
pub fn ratios_csv(ratios: &CampaignRatios) -> Result<String> {
    render(
        "Ratios de Campana",
        &["Indicador", "Valor"],
        |writer| {
            let rows: [(&str, String); 9] = [
                ("Costo por kg", money(ratios.cost_per_kg)),
                ("Costo por hectarea", money(ratios.cost_per_hectare)),
                ("Costo por orden", money(ratios.cost_per_order)),
                ("Rendimiento por hectarea", money(ratios.yield_per_hectare)),
                ("Produccion total", money(ratios.total_production)),
                ("Ordenes cerradas %", pct(ratios.closed_order_pct)),
                ("Ejecucion presupuestal %", pct(ratios.budget_execution_pct)),
                ("Variacion %", pct(ratios.variance_pct)),
                ("Eficiencia %", pct(ratios.efficiency_pct)),
            ];
            for (label, value) in rows {
                writer.write_record([label, value.as_str()])?;
            }
            Ok(())
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reports::Classification;

    #[test]
    fn test_category_csv_shape() {
        let rows = vec![CategoryVariance {
            category: "Agroquimicos".to_string(),
            budget_usd: 1000.0,
            actual_usd: 850.0,
            variance: -150.0,
            variance_pct: -15.0,
            classification: Classification::Favorable,
        }];
        let csv = category_csv(&rows).unwrap();
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "Variacion por Categoria");
        assert!(lines[1].starts_with("Categoria,Presupuesto"));
        assert_eq!(lines[2], "Agroquimicos,1000.00,850.00,-150.00,-15.0,Favorable");
    }

    #[test]
    fn test_empty_report_still_has_title_and_header() {
        let csv = lots_csv(&[]).unwrap();
        assert_eq!(csv.lines().count(), 2);
    }

    #[test]
    fn test_ratios_csv_one_row_per_kpi() {
        let ratios = CampaignRatios {
            cost_per_kg: 0.5,
            cost_per_hectare: 100.0,
            cost_per_order: 200.0,
            yield_per_hectare: 200.0,
            total_production: 800.0,
            closed_order_pct: 50.0,
            budget_execution_pct: 40.0,
            variance_pct: -60.0,
            efficiency_pct: 80.0,
        };
        let csv = ratios_csv(&ratios).unwrap();
        assert_eq!(csv.lines().count(), 11);
        assert!(csv.contains("Costo por kg,0.50"));
        assert!(csv.contains("Eficiencia %,80.0"));
    }

    #[test]
    fn test_fields_with_commas_are_quoted() {
        let rows = vec![CategoryVariance {
            category: "Fletes, locales".to_string(),
            budget_usd: 10.0,
            actual_usd: 10.0,
            variance: 0.0,
            variance_pct: 0.0,
            classification: Classification::Neutral,
        }];
        let csv = category_csv(&rows).unwrap();
        assert!(csv.contains("\"Fletes, locales\""));
    }
}
