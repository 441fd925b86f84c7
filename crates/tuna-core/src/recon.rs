//! Category reconciliation engine
//!
//! Maps each (budget category, process) pair to its best-effort EEFF
//! concept in three ordered passes:
//!
//! 1. Exact/normalized string match (confidence 100, or 95 for containment)
//! 2. One batched AI semantic-match call, when a credential is configured
//! 3. Known-alias fallback (confidence 85), consulted only when the AI pass
//!    was unavailable or failed
//!
//! The engine is total: every input category gets exactly one candidate, in
//! input order, under every failure combination. Categories matching nothing
//! end as `MatchType::None` with confidence 0 and an empty concept, which is
//! a valid terminal state awaiting manual resolution, not an error.

use tracing::{debug, info, warn};

use crate::ai::parsing::parse_mapping_proposals;
use crate::ai::{AiClient, CompletionBackend};
use crate::aliases::AliasTable;
use crate::models::{MatchType, Process};
use crate::normalize::normalize;

/// Prompt template for the semantic pass
const RECON_PROMPT: &str = include_str!("recon_prompt.txt");

/// Token bound for the single semantic-match call
const RECON_MAX_TOKENS: u32 = 2048;

/// Containment matches shorter than this are too ambiguous to accept
const MIN_CONTAINMENT_LEN: usize = 3;

const CONFIDENCE_EXACT: f64 = 100.0;
const CONFIDENCE_CONTAINMENT: f64 = 95.0;
const CONFIDENCE_ALIAS: f64 = 85.0;

/// One (category, process) pair to reconcile
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryInput {
    pub category: String,
    pub process: Process,
}

/// One mapping candidate produced by the engine
#[derive(Debug, Clone)]
pub struct MappingCandidate {
    pub category: String,
    pub process: Process,
    /// Empty when match_type is None
    pub eeff_concept: String,
    /// 0-100
    pub confidence: f64,
    pub match_type: MatchType,
    /// From the AI pass, when available
    pub reasoning: Option<String>,
}

/// The three-pass reconciliation engine
pub struct ReconciliationEngine {
    ai: Option<AiClient>,
    aliases: AliasTable,
}

impl ReconciliationEngine {
    /// Engine with an optional AI client and the given alias table
    pub fn new(ai: Option<AiClient>, aliases: AliasTable) -> Self {
        Self { ai, aliases }
    }

    /// Engine without AI (exact + alias passes only)
    pub fn without_ai(aliases: AliasTable) -> Self {
        Self { ai: None, aliases }
    }

    /// Reconcile all categories against the concept list.
    ///
    /// Returns exactly one candidate per input category, in input order.
    /// Never fails: AI unavailability or malformed output downgrades to the
    /// alias pass.
    pub async fn reconcile(
        &self,
        categories: &[CategoryInput],
        concepts: &[String],
    ) -> Vec<MappingCandidate> {
        let mut results: Vec<Option<MappingCandidate>> = vec![None; categories.len()];
        // Indices into `concepts` not yet claimed by a match
        let mut unclaimed: Vec<usize> = (0..concepts.len()).collect();

        self.pass_exact(categories, concepts, &mut results, &mut unclaimed);

        let exact_count = results.iter().filter(|r| r.is_some()).count();
        debug!(
            mapped = exact_count,
            total = categories.len(),
            "Exact pass complete"
        );

        let ai_succeeded = if results.iter().any(|r| r.is_none()) && !unclaimed.is_empty() {
            self.pass_ai(categories, concepts, &mut results, &mut unclaimed)
                .await
        } else {
            false
        };

        if !ai_succeeded {
            self.pass_aliases(categories, concepts, &mut results);
        }

        // Terminal state: anything still unmapped is a `none` candidate
        let finalized: Vec<MappingCandidate> = results
            .into_iter()
            .zip(categories)
            .map(|(candidate, input)| {
                candidate.unwrap_or_else(|| MappingCandidate {
                    category: input.category.clone(),
                    process: input.process,
                    eeff_concept: String::new(),
                    confidence: 0.0,
                    match_type: MatchType::None,
                    reasoning: None,
                })
            })
            .collect();

        info!(
            total = finalized.len(),
            exact = finalized.iter().filter(|m| m.match_type == MatchType::Exact).count(),
            suggested = finalized.iter().filter(|m| m.match_type == MatchType::Suggested).count(),
            unmatched = finalized.iter().filter(|m| m.match_type == MatchType::None).count(),
            "Reconciliation complete"
        );
        finalized
    }

    /// Pass 1: exact/normalized match. First qualifying concept wins and is
    /// removed from the pool; iteration is category-outer/concept-inner, so
    /// reordering the concept list can change which category claims an
    /// ambiguous concept. First-in-order-wins is the documented tie-break.
    fn pass_exact(
        &self,
        categories: &[CategoryInput],
        concepts: &[String],
        results: &mut [Option<MappingCandidate>],
        unclaimed: &mut Vec<usize>,
    ) {
        for (i, input) in categories.iter().enumerate() {
            let cat_norm = normalize(&input.category);
            if cat_norm.is_empty() {
                continue;
            }

            let matched = unclaimed.iter().position(|&ci| {
                let concept_norm = normalize(&concepts[ci]);
                cat_norm == concept_norm || contains_match(&cat_norm, &concept_norm)
            });

            if let Some(pos) = matched {
                let ci = unclaimed.remove(pos);
                let concept_norm = normalize(&concepts[ci]);
                let confidence = if cat_norm == concept_norm {
                    CONFIDENCE_EXACT
                } else {
                    CONFIDENCE_CONTAINMENT
                };
                results[i] = Some(MappingCandidate {
                    category: input.category.clone(),
                    process: input.process,
                    eeff_concept: concepts[ci].clone(),
                    confidence,
                    match_type: MatchType::Exact,
                    reasoning: None,
                });
            }
        }
    }

    /// Pass 2: one batched semantic-match call. Returns true when the call
    /// produced a usable response; any failure logs and returns false so the
    /// alias pass takes over.
    async fn pass_ai(
        &self,
        categories: &[CategoryInput],
        concepts: &[String],
        results: &mut [Option<MappingCandidate>],
        unclaimed: &mut Vec<usize>,
    ) -> bool {
        let Some(ref client) = self.ai else {
            debug!("No AI client configured, skipping semantic pass");
            return false;
        };

        let unmapped: Vec<(usize, &CategoryInput)> = categories
            .iter()
            .enumerate()
            .filter(|(i, _)| results[*i].is_none())
            .collect();

        let prompt = build_prompt(&unmapped, concepts, unclaimed);

        let response = match client.complete(&prompt, RECON_MAX_TOKENS).await {
            Ok(completion) => completion.text,
            Err(e) => {
                warn!("AI semantic pass failed, falling back to aliases: {}", e);
                return false;
            }
        };

        let proposals = match parse_mapping_proposals(&response) {
            Ok(proposals) => proposals,
            Err(e) => {
                warn!("AI response unusable, falling back to aliases: {}", e);
                return false;
            }
        };

        for proposal in proposals {
            // Locate the unmapped category this proposal answers
            let target = unmapped.iter().find(|(i, input)| {
                results[*i].is_none()
                    && normalize(&input.category) == normalize(&proposal.budget_category)
                    && proposal
                        .budget_process
                        .parse::<Process>()
                        .map(|p| p == input.process)
                        .unwrap_or(true)
            });
            let Some(&(i, input)) = target else {
                continue;
            };

            // A proposed concept must come from the unclaimed pool; the
            // model never gets to invent one
            let concept_idx = if proposal.eeff_concept.is_empty() {
                None
            } else {
                unclaimed
                    .iter()
                    .position(|&ci| normalize(&concepts[ci]) == normalize(&proposal.eeff_concept))
            };

            let (eeff_concept, match_type) = match concept_idx {
                Some(pos) => {
                    let ci = unclaimed.remove(pos);
                    (concepts[ci].clone(), MatchType::Suggested)
                }
                None => (String::new(), MatchType::None),
            };

            results[i] = Some(MappingCandidate {
                category: input.category.clone(),
                process: input.process,
                eeff_concept,
                confidence: proposal.confidence.clamp(0.0, 100.0),
                match_type,
                reasoning: proposal.reason.clone(),
            });
        }

        true
    }

    /// Pass 3: known-alias fallback, consulted only when the AI pass was
    /// unavailable or failed. The aliased target must exist in the concept
    /// list; aliases never add concepts of their own.
    fn pass_aliases(
        &self,
        categories: &[CategoryInput],
        concepts: &[String],
        results: &mut [Option<MappingCandidate>],
    ) {
        for (i, input) in categories.iter().enumerate() {
            if results[i].is_some() {
                continue;
            }
            let Some(target) = self.aliases.lookup(&input.category) else {
                continue;
            };
            let Some(concept) = concepts
                .iter()
                .find(|c| normalize(c) == normalize(target))
            else {
                continue;
            };

            results[i] = Some(MappingCandidate {
                category: input.category.clone(),
                process: input.process,
                eeff_concept: concept.clone(),
                confidence: CONFIDENCE_ALIAS,
                match_type: MatchType::Suggested,
                reasoning: None,
            });
        }
    }
}

/// Containment rule: one normalized string contains the other and both are
/// long enough to make the overlap meaningful. Deliberately admits
/// abbreviation matches ("servicio de terceros" vs "terceros") while the
/// length floor blocks short-fragment noise.
fn contains_match(a: &str, b: &str) -> bool {
    a.len() > MIN_CONTAINMENT_LEN
        && b.len() > MIN_CONTAINMENT_LEN
        && (a.contains(b) || b.contains(a))
}

fn build_prompt(
    unmapped: &[(usize, &CategoryInput)],
    concepts: &[String],
    unclaimed: &[usize],
) -> String {
    let categories_block = unmapped
        .iter()
        .map(|(_, input)| format!("- {} | {}", input.category, input.process))
        .collect::<Vec<_>>()
        .join("\n");
    let concepts_block = unclaimed
        .iter()
        .map(|&ci| format!("- {}", concepts[ci]))
        .collect::<Vec<_>>()
        .join("\n");

    RECON_PROMPT
        .replace("{categories}", &categories_block)
        .replace("{concepts}", &concepts_block)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(category: &str, process: Process) -> CategoryInput {
        CategoryInput {
            category: category.to_string(),
            process,
        }
    }

    fn concepts(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_exact_match_confidence_100() {
        let engine = ReconciliationEngine::without_ai(AliasTable::from_entries(Vec::<(&str, &str)>::new()));
        let cats = [input("Fertilizantes", Process::Field)];
        let list = concepts(&["FERTILIZANTES"]);

        let mappings = engine.reconcile(&cats, &list).await;
        assert_eq!(mappings.len(), 1);
        assert_eq!(mappings[0].eeff_concept, "FERTILIZANTES");
        assert_eq!(mappings[0].confidence, 100.0);
        assert_eq!(mappings[0].match_type, MatchType::Exact);
    }

    #[tokio::test]
    async fn test_containment_match_confidence_95() {
        let engine = ReconciliationEngine::without_ai(AliasTable::from_entries(Vec::<(&str, &str)>::new()));
        let cats = [input("Servicio de Terceros", Process::Packing)];
        let list = concepts(&["TERCEROS"]);

        let mappings = engine.reconcile(&cats, &list).await;
        assert_eq!(mappings[0].confidence, 95.0);
        assert_eq!(mappings[0].match_type, MatchType::Exact);
    }

    #[tokio::test]
    async fn test_short_fragment_containment_rejected() {
        let engine = ReconciliationEngine::without_ai(AliasTable::from_entries(Vec::<(&str, &str)>::new()));
        let cats = [input("Sal", Process::Field)];
        let list = concepts(&["SALARIOS Y BENEFICIOS"]);

        let mappings = engine.reconcile(&cats, &list).await;
        assert_eq!(mappings[0].match_type, MatchType::None);
    }

    #[tokio::test]
    async fn test_no_double_claiming() {
        let engine = ReconciliationEngine::without_ai(AliasTable::from_entries(Vec::<(&str, &str)>::new()));
        // Both categories normalize to the same concept; only the first (in
        // input order) may claim it
        let cats = [
            input("Fertilizantes", Process::Nursery),
            input("FERTILIZANTES", Process::Field),
        ];
        let list = concepts(&["FERTILIZANTES"]);

        let mappings = engine.reconcile(&cats, &list).await;
        assert_eq!(mappings[0].match_type, MatchType::Exact);
        assert_eq!(mappings[0].confidence, 100.0);
        assert_eq!(mappings[1].match_type, MatchType::None);
        assert!(mappings[1].eeff_concept.is_empty());
    }

    #[tokio::test]
    async fn test_alias_fallback_when_no_ai() {
        let engine = ReconciliationEngine::without_ai(AliasTable::embedded());
        let cats = [input("Agroquimicos", Process::Field)];
        let list = concepts(&["AGROQUIMICOS & FOLIAR"]);

        let mappings = engine.reconcile(&cats, &list).await;
        // "agroquimicos" is contained in the normalized concept, so the
        // exact pass already catches it at 95
        assert_eq!(mappings[0].eeff_concept, "AGROQUIMICOS & FOLIAR");
        assert!(mappings[0].confidence >= 85.0);
    }

    #[tokio::test]
    async fn test_alias_requires_concept_in_list() {
        let engine = ReconciliationEngine::without_ai(AliasTable::embedded());
        let cats = [input("Transporte interno", Process::Field)];
        // Alias target TRANSPORTE DE CARGA is absent from the concept list
        let list = concepts(&["MANO DE OBRA DIRECTA"]);

        let mappings = engine.reconcile(&cats, &list).await;
        assert_eq!(mappings[0].match_type, MatchType::None);
    }

    #[tokio::test]
    async fn test_alias_pass_confidence_85() {
        let engine = ReconciliationEngine::without_ai(AliasTable::embedded());
        let cats = [input("Jornales de cosecha", Process::Field)];
        let list = concepts(&["MANO DE OBRA DIRECTA"]);

        let mappings = engine.reconcile(&cats, &list).await;
        assert_eq!(mappings[0].eeff_concept, "MANO DE OBRA DIRECTA");
        assert_eq!(mappings[0].confidence, 85.0);
        assert_eq!(mappings[0].match_type, MatchType::Suggested);
    }

    #[tokio::test]
    async fn test_ai_pass_maps_suggestions() {
        let response = r#"[{"budget_category": "Cajas de carton", "budget_process": "packing", "eeff_concept": "MATERIALES DE EMPAQUE", "confidence": 90, "reason": "packaging materials"}]"#;
        let engine = ReconciliationEngine::new(
            Some(AiClient::mock_with_response(response)),
            AliasTable::from_entries(Vec::<(&str, &str)>::new()),
        );
        let cats = [input("Cajas de carton", Process::Packing)];
        let list = concepts(&["MATERIALES DE EMPAQUE"]);

        let mappings = engine.reconcile(&cats, &list).await;
        assert_eq!(mappings[0].match_type, MatchType::Suggested);
        assert_eq!(mappings[0].confidence, 90.0);
        assert_eq!(mappings[0].reasoning.as_deref(), Some("packaging materials"));
    }

    #[tokio::test]
    async fn test_ai_cannot_invent_concepts() {
        let response = r#"[{"budget_category": "Cajas de carton", "budget_process": "packing", "eeff_concept": "CONCEPTO INVENTADO", "confidence": 99}]"#;
        let engine = ReconciliationEngine::new(
            Some(AiClient::mock_with_response(response)),
            AliasTable::from_entries(Vec::<(&str, &str)>::new()),
        );
        let cats = [input("Cajas de carton", Process::Packing)];
        let list = concepts(&["MATERIALES DE EMPAQUE"]);

        let mappings = engine.reconcile(&cats, &list).await;
        assert_eq!(mappings[0].match_type, MatchType::None);
        assert!(mappings[0].eeff_concept.is_empty());
    }

    #[tokio::test]
    async fn test_malformed_ai_response_falls_back_to_aliases() {
        let engine = ReconciliationEngine::new(
            Some(AiClient::mock_with_response("I have no idea, sorry.")),
            AliasTable::embedded(),
        );
        let cats = [input("Jornales", Process::Field)];
        let list = concepts(&["MANO DE OBRA DIRECTA"]);

        let mappings = engine.reconcile(&cats, &list).await;
        assert_eq!(mappings[0].match_type, MatchType::Suggested);
        assert_eq!(mappings[0].confidence, 85.0);
    }

    #[tokio::test]
    async fn test_totality_with_empty_concepts() {
        let engine = ReconciliationEngine::without_ai(AliasTable::embedded());
        let cats = [
            input("Algo", Process::Field),
            input("Otra cosa", Process::Packing),
        ];

        let mappings = engine.reconcile(&cats, &[]).await;
        assert_eq!(mappings.len(), 2);
        assert!(mappings.iter().all(|m| m.match_type == MatchType::None));
        assert!(mappings.iter().all(|m| m.confidence == 0.0));
    }

    #[tokio::test]
    async fn test_first_in_order_tiebreak() {
        let engine = ReconciliationEngine::without_ai(AliasTable::from_entries(Vec::<(&str, &str)>::new()));
        let cats = [input("Mano de Obra", Process::Field)];
        // Both concepts contain the category; the first in list order wins
        let list = concepts(&["MANO DE OBRA DIRECTA", "MANO DE OBRA INDIRECTA"]);

        let mappings = engine.reconcile(&cats, &list).await;
        assert_eq!(mappings[0].eeff_concept, "MANO DE OBRA DIRECTA");
    }
}
