//! Column auto-mapping for human-authored spreadsheet headers
//!
//! Exported sheets arrive with Spanish headers in arbitrary casing, with
//! accent and spelling variants, and often with title/blank rows above the
//! real header. The keyword groups here are the de facto format contract:
//! changing them changes which files parse.

use std::collections::HashMap;

use crate::normalize::normalize;

/// Canonical fields a sheet column can map to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldId {
    // Budget sheet
    Code,
    Category,
    Process,
    Budget,
    Actual,
    ExchangeRate,
    CostFob,
    CostCif,
    // Production-order ledger
    OrderNumber,
    TypeCode,
    OpenDate,
    CloseDate,
    Status,
    ProductCode,
    ProductName,
    EstimatedQty,
    ProducedQty,
    PeriodExpense,
    CumulativeExpense,
    UnitCost,
    TotalCost,
    LaborHours,
    // Variance sheet
    Rubric,
    Variance,
}

/// One keyword group: a header cell matches when it contains every keyword.
/// Groups are tested in order, so specific multi-keyword groups must come
/// before generic single-keyword fallbacks.
struct FieldSpec {
    field: FieldId,
    keywords: &'static [&'static str],
}

const fn spec(field: FieldId, keywords: &'static [&'static str]) -> FieldSpec {
    FieldSpec { field, keywords }
}

/// Budget sheet keyword groups
const BUDGET_SPECS: &[FieldSpec] = &[
    spec(FieldId::CostFob, &["costo", "fob"]),
    spec(FieldId::CostCif, &["costo", "cif"]),
    spec(FieldId::ExchangeRate, &["tipo", "cambio"]),
    spec(FieldId::Code, &["codigo"]),
    spec(FieldId::Category, &["categoria"]),
    spec(FieldId::Category, &["rubro"]),
    spec(FieldId::Category, &["descripcion"]),
    spec(FieldId::Process, &["proceso"]),
    spec(FieldId::Budget, &["presupuesto"]),
    spec(FieldId::Budget, &["budget"]),
    spec(FieldId::Actual, &["ejecutado"]),
    spec(FieldId::Actual, &["real"]),
    spec(FieldId::Actual, &["actual"]),
];

/// Production-order ledger keyword groups
const ORDERS_SPECS: &[FieldSpec] = &[
    spec(FieldId::OrderNumber, &["numero", "orden"]),
    spec(FieldId::OrderNumber, &["nro", "op"]),
    spec(FieldId::OrderNumber, &["orden"]),
    spec(FieldId::TypeCode, &["tipo"]),
    spec(FieldId::OpenDate, &["fecha", "apertura"]),
    spec(FieldId::OpenDate, &["fecha", "inicio"]),
    spec(FieldId::CloseDate, &["fecha", "cierre"]),
    spec(FieldId::Status, &["estado"]),
    spec(FieldId::ProductCode, &["codigo", "producto"]),
    spec(FieldId::ProductName, &["producto"]),
    spec(FieldId::ProductName, &["descripcion"]),
    spec(FieldId::ProductName, &["item"]),
    spec(FieldId::EstimatedQty, &["cantidad", "estimada"]),
    spec(FieldId::EstimatedQty, &["cantidad", "estimado"]),
    spec(FieldId::ProducedQty, &["cantidad", "producida"]),
    spec(FieldId::ProducedQty, &["cantidad", "producido"]),
    spec(FieldId::PeriodExpense, &["gasto", "periodo"]),
    spec(FieldId::CumulativeExpense, &["gasto", "acumulado"]),
    spec(FieldId::UnitCost, &["costo", "unitario"]),
    spec(FieldId::TotalCost, &["costo", "total"]),
    spec(FieldId::LaborHours, &["horas"]),
];

/// Variance sheet keyword groups
const VARIANCE_SPECS: &[FieldSpec] = &[
    spec(FieldId::Rubric, &["rubro"]),
    spec(FieldId::Rubric, &["concepto"]),
    spec(FieldId::Variance, &["variacion"]),
    spec(FieldId::Variance, &["desviacion"]),
    spec(FieldId::Budget, &["presupuesto"]),
    spec(FieldId::Budget, &["budget"]),
    spec(FieldId::Actual, &["real"]),
    spec(FieldId::Actual, &["actual"]),
    spec(FieldId::Actual, &["ejecutado"]),
];

/// Layout hints that differ per sheet format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SheetLayout {
    Budget,
    Orders,
    Variance,
}

impl SheetLayout {
    /// Minimum non-empty cells for a row to qualify as the header row.
    /// Variance sheets are narrow, so the bar is lower.
    pub fn min_header_cells(&self) -> usize {
        match self {
            Self::Variance => 2,
            Self::Budget | Self::Orders => 3,
        }
    }

    fn specs(&self) -> &'static [FieldSpec] {
        match self {
            Self::Budget => BUDGET_SPECS,
            Self::Orders => ORDERS_SPECS,
            Self::Variance => VARIANCE_SPECS,
        }
    }
}

/// Header rows may appear anywhere in the first few rows (title/blank rows
/// are common in exports)
const HEADER_SCAN_ROWS: usize = 5;

/// Mapping from canonical field to column index, plus where the header was
#[derive(Debug, Clone)]
pub struct ColumnMap {
    fields: HashMap<FieldId, usize>,
    /// Index of the detected header row; data starts on the next row
    pub header_row: usize,
}

impl ColumnMap {
    /// Detect the header row and map each recognized header cell to a field.
    ///
    /// A field is assigned at most once (first match wins), and specific
    /// keyword groups are tested before generic ones, so "Costo CIF" never
    /// steals a generic cost assignment.
    pub fn detect(rows: &[Vec<String>], layout: SheetLayout) -> Self {
        let header_row = find_header_row(rows, layout.min_header_cells());

        let mut fields = HashMap::new();
        if let Some(header) = rows.get(header_row) {
            for (col, cell) in header.iter().enumerate() {
                let cell = normalize(cell);
                if cell.is_empty() {
                    continue;
                }
                for spec in layout.specs() {
                    if fields.contains_key(&spec.field) {
                        continue;
                    }
                    if spec.keywords.iter().all(|kw| cell.contains(kw)) {
                        fields.insert(spec.field, col);
                        break;
                    }
                }
            }
        }

        Self { fields, header_row }
    }

    /// Column index for a field, if one was found
    pub fn col(&self, field: FieldId) -> Option<usize> {
        self.fields.get(&field).copied()
    }

    /// Cell value for a field on the given row; empty string when the field
    /// is unmapped or the row is short
    pub fn cell<'a>(&self, row: &'a [String], field: FieldId) -> &'a str {
        self.col(field)
            .and_then(|c| row.get(c))
            .map(|s| s.as_str())
            .unwrap_or("")
    }

    /// Number of fields that were mapped
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// First of the initial rows with enough non-empty cells wins
fn find_header_row(rows: &[Vec<String>], min_cells: usize) -> usize {
    for (i, row) in rows.iter().take(HEADER_SCAN_ROWS).enumerate() {
        let non_empty = row.iter().filter(|c| !c.trim().is_empty()).count();
        if non_empty >= min_cells {
            return i;
        }
    }
    0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_budget_header_detection() {
        let rows = vec![row(&[
            "Código",
            "Rubro",
            "Proceso",
            "Presupuesto USD",
            "Real USD",
        ])];
        let map = ColumnMap::detect(&rows, SheetLayout::Budget);
        assert_eq!(map.col(FieldId::Code), Some(0));
        assert_eq!(map.col(FieldId::Category), Some(1));
        assert_eq!(map.col(FieldId::Process), Some(2));
        assert_eq!(map.col(FieldId::Budget), Some(3));
        assert_eq!(map.col(FieldId::Actual), Some(4));
    }

    #[test]
    fn test_cost_specificity() {
        // "Costo CIF" and "Costo FOB" must land on their specific fields,
        // not both on the first generic match
        let rows = vec![row(&["Rubro", "Costo CIF", "Costo FOB"])];
        let map = ColumnMap::detect(&rows, SheetLayout::Budget);
        assert_eq!(map.col(FieldId::CostCif), Some(1));
        assert_eq!(map.col(FieldId::CostFob), Some(2));
    }

    #[test]
    fn test_header_not_in_first_row() {
        let rows = vec![
            row(&["PRESUPUESTO CAMPAÑA 2024-II"]),
            row(&[]),
            row(&["Rubro", "Proceso", "Presupuesto", "Real"]),
            row(&["Agroquimicos", "campo", "1000", "850"]),
        ];
        let map = ColumnMap::detect(&rows, SheetLayout::Budget);
        assert_eq!(map.header_row, 2);
        assert_eq!(map.col(FieldId::Category), Some(0));
        assert_eq!(map.col(FieldId::Budget), Some(2));
    }

    #[test]
    fn test_variance_low_header_bar() {
        let rows = vec![
            row(&["Variaciones"]),
            row(&["Concepto", "Variación"]),
        ];
        let map = ColumnMap::detect(&rows, SheetLayout::Variance);
        assert_eq!(map.header_row, 1);
        assert_eq!(map.col(FieldId::Rubric), Some(0));
        assert_eq!(map.col(FieldId::Variance), Some(1));
    }

    #[test]
    fn test_orders_header() {
        let rows = vec![row(&[
            "Número de Orden",
            "Tipo",
            "Fecha Apertura",
            "Fecha Cierre",
            "Estado",
            "Producto",
            "Cantidad Estimada",
            "Cantidad Producida",
            "Gasto Periodo",
            "Gasto Acumulado",
            "Costo Unitario",
            "Costo Total",
            "Horas MO",
        ])];
        let map = ColumnMap::detect(&rows, SheetLayout::Orders);
        assert_eq!(map.col(FieldId::OrderNumber), Some(0));
        assert_eq!(map.col(FieldId::TypeCode), Some(1));
        assert_eq!(map.col(FieldId::OpenDate), Some(2));
        assert_eq!(map.col(FieldId::CloseDate), Some(3));
        assert_eq!(map.col(FieldId::ProductName), Some(5));
        assert_eq!(map.col(FieldId::TotalCost), Some(11));
        assert_eq!(map.col(FieldId::LaborHours), Some(12));
    }

    #[test]
    fn test_missing_fields_absent() {
        let rows = vec![row(&["Rubro", "Presupuesto"])];
        let map = ColumnMap::detect(&rows, SheetLayout::Budget);
        assert_eq!(map.col(FieldId::Actual), None);
        assert_eq!(map.col(FieldId::Process), None);
    }
}
