//! Integration tests for the full upload → reconcile → report pipeline

use tuna_core::db::{Database, MappingUpdate};
use tuna_core::detect::SheetKind;
use tuna_core::models::{MatchType, Process, Season};
use tuna_core::recon::ReconciliationEngine;
use tuna_core::reports::{category, lots, monthly, process, ratios, Classification};
use tuna_core::upload::process_upload;
use tuna_core::{export, AiClient, AliasTable};

const BUDGET_CSV: &[u8] = b"Rubro;Proceso;Presupuesto;Real\n\
Agroquimicos;Campo;1000;850\n\
Jornales;Empaque;500;520\n\
Fletes;Campo;200;100\n";

const ORDERS_CSV: &[u8] = b"Orden;Tipo;Fecha Inicio;Producto;Estado;Cantidad Estimada;Cantidad Producida;Costo Total\n\
OP-1;C;2025-02-10;Agroquimicos & Foliar;CERRADA;0;0;850\n\
OP-2;E;2025-03-05;Uva Red Globe;CERRADA;1000;900;400\n\
OP-3;E;2025-03-20;Uva Red Globe;ABIERTA;500;450;200\n";

fn setup() -> (Database, i64) {
    let db = Database::in_memory().unwrap();
    // Pin the campaign so the fixed 2025 order dates land in its window
    let campaign = db.ensure_campaign("ana", Season::FirstHalf, 2025).unwrap();
    let budget =
        process_upload(&db, "ana", Some(campaign.id), "presupuesto.csv", BUDGET_CSV, None).unwrap();
    let orders =
        process_upload(&db, "ana", Some(campaign.id), "ordenes.csv", ORDERS_CSV, None).unwrap();
    assert_eq!(budget.campaign_id, orders.campaign_id);
    (db, campaign.id)
}

#[test]
fn test_upload_pipeline_populates_all_tables() {
    let (db, campaign_id) = setup();

    assert_eq!(db.list_budget_rows(campaign_id).unwrap().len(), 3);
    assert_eq!(db.list_orders(campaign_id).unwrap().len(), 3);
    assert_eq!(db.list_concept_totals(campaign_id).unwrap().len(), 2);
    assert_eq!(db.list_uploads(campaign_id).unwrap().len(), 2);

    let campaign = db.get_campaign(campaign_id).unwrap();
    assert_eq!(campaign.total_budget, 1700.0);
}

#[test]
fn test_re_upload_is_a_true_replace() {
    let (db, campaign_id) = setup();

    // Same files again: same row counts, same totals, no accumulation
    process_upload(&db, "ana", Some(campaign_id), "presupuesto.csv", BUDGET_CSV, None).unwrap();
    process_upload(&db, "ana", Some(campaign_id), "ordenes.csv", ORDERS_CSV, None).unwrap();

    assert_eq!(db.list_budget_rows(campaign_id).unwrap().len(), 3);
    assert_eq!(db.list_orders(campaign_id).unwrap().len(), 3);
    assert_eq!(db.list_concept_totals(campaign_id).unwrap().len(), 2);
    assert_eq!(db.get_campaign(campaign_id).unwrap().total_budget, 1700.0);

    // History keeps every upload
    assert_eq!(db.list_uploads(campaign_id).unwrap().len(), 4);
}

#[tokio::test]
async fn test_reconcile_and_report_end_to_end() {
    let (db, campaign_id) = setup();

    let categories = db.budget_categories(campaign_id).unwrap();
    let concepts = db.concept_names(campaign_id).unwrap();
    assert_eq!(categories.len(), 3);
    assert!(concepts.contains(&"AGROQUIMICOS & FOLIAR".to_string()));

    // AI disabled: exact pass plus alias fallback only
    let engine = ReconciliationEngine::without_ai(AliasTable::embedded());
    let candidates = engine.reconcile(&categories, &concepts).await;
    assert_eq!(candidates.len(), 3);

    // "Agroquimicos" is contained in "agroquimicos foliar" after
    // normalization, so the substring rule claims it at 95
    let agro = candidates
        .iter()
        .find(|c| c.category == "Agroquimicos")
        .unwrap();
    assert_eq!(agro.eeff_concept, "AGROQUIMICOS & FOLIAR");
    assert_eq!(agro.confidence, 95.0);
    assert_eq!(agro.match_type, MatchType::Exact);

    db.save_mappings(campaign_id, &candidates).unwrap();
    let mappings = db.list_mappings(campaign_id).unwrap();
    assert_eq!(mappings.len(), 3);

    // By-category report: the budget row carries the actuals
    let report = category::variance_by_category(&db.list_budget_rows(campaign_id).unwrap());
    let agro_row = report.iter().find(|r| r.category == "Agroquimicos").unwrap();
    assert_eq!(agro_row.variance, -150.0);
    assert_eq!(agro_row.variance_pct, -15.0);
    assert_eq!(agro_row.classification, Classification::Favorable);
}

#[tokio::test]
async fn test_ai_suggestions_flow_into_confirmation() {
    let (db, campaign_id) = setup();

    let response = r#"[
        {"budget_category": "Fletes", "budget_process": "field",
         "eeff_concept": "UVA RED GLOBE", "confidence": 70,
         "reason": "closest available concept"}
    ]"#;
    let engine = ReconciliationEngine::new(
        Some(AiClient::mock_with_response(response)),
        AliasTable::embedded(),
    );

    let categories = db.budget_categories(campaign_id).unwrap();
    let concepts = db.concept_names(campaign_id).unwrap();
    let candidates = engine.reconcile(&categories, &concepts).await;
    db.save_mappings(campaign_id, &candidates).unwrap();

    let fletes = db
        .list_mappings(campaign_id)
        .unwrap()
        .into_iter()
        .find(|m| m.category == "Fletes")
        .unwrap();
    assert_eq!(fletes.match_type, MatchType::Suggested);
    assert!(!fletes.confirmed);

    // Human accepts the suggestion
    let confirmed = db
        .update_mapping(
            fletes.id,
            &MappingUpdate {
                confirmed: Some(true),
                ..Default::default()
            },
        )
        .unwrap();
    assert!(confirmed.confirmed);
    assert!(confirmed.confirmed_at.is_some());
    assert_eq!(db.pending_mapping_count(campaign_id).unwrap(), 1);
}

#[test]
fn test_reports_over_uploaded_orders() {
    let (db, campaign_id) = setup();
    let campaign = db.get_campaign(campaign_id).unwrap();
    let orders = db.list_orders(campaign_id).unwrap();

    let by_process = process::variance_by_process(&db.list_budget_rows(campaign_id).unwrap());
    assert_eq!(by_process.groups.len(), 2);
    assert_eq!(by_process.total_budget_usd, 1700.0);

    let months = monthly::monthly_execution(&campaign, &orders);
    assert_eq!(months.len(), 6);
    assert_eq!(months[1].actual_usd, 850.0); // February: OP-1
    assert_eq!(months[2].actual_usd, 600.0); // March: OP-2 + OP-3
    assert_eq!(months[5].cumulative_actual_usd, 1450.0);

    let lot_report = lots::lot_profitability(&orders);
    assert_eq!(lot_report.len(), 2); // packing orders only
    assert_eq!(lot_report[0].estimated_sale_usd, 480.0);

    let kpis = ratios::campaign_ratios(&campaign, &orders, 10.0);
    assert_eq!(kpis.total_production, 1350.0);
    assert_eq!(kpis.cost_per_hectare, 145.0);
    assert!((kpis.closed_order_pct - 66.666666).abs() < 0.001);
}

#[test]
fn test_export_renders_uploaded_data() {
    let (db, campaign_id) = setup();

    let report = category::variance_by_category(&db.list_budget_rows(campaign_id).unwrap());
    let csv = export::category_csv(&report).unwrap();

    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines[0], "Variacion por Categoria");
    assert!(lines[1].starts_with("Categoria,"));
    assert!(csv.contains("Agroquimicos,1000.00,850.00,-150.00,-15.0,Favorable"));
    assert!(csv.contains("Jornales,500.00,520.00,20.00,4.0,Desfavorable"));
}

#[test]
fn test_kind_override_for_ambiguous_file() {
    let db = Database::in_memory().unwrap();
    let outcome = process_upload(
        &db,
        "ana",
        None,
        "datos.csv",
        b"Rubro;Presupuesto;Real\nMano de Obra;1000;900\n",
        Some(SheetKind::Variance),
    )
    .unwrap();

    assert_eq!(outcome.kind, SheetKind::Variance);
    let rows = db.list_variance_rows(outcome.campaign_id).unwrap();
    assert_eq!(rows[0].rubric, "Mano de Obra");
    assert_eq!(rows[0].variance_pct, -10.0);
}

#[test]
fn test_orders_process_split_from_type_codes() {
    let (db, campaign_id) = setup();
    let orders = db.list_orders(campaign_id).unwrap();

    assert_eq!(orders[0].process, Process::Field);
    assert_eq!(orders[1].process, Process::Packing);

    let totals = db.list_concept_totals(campaign_id).unwrap();
    let uva = totals.iter().find(|t| t.concept == "UVA RED GLOBE").unwrap();
    assert_eq!(uva.packing_usd, 600.0);
    assert_eq!(uva.field_usd, 0.0);
}
