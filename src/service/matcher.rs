use std::collections::HashSet;

use crate::models::{InventoryItem, MatchCandidate, MatchResult};
use crate::service::text::tokenize;

pub const DEFAULT_TOP_K: usize = 3;

/// Bonus when both the requirement and the item hit the merchant's declared
/// focus keywords.
const BOOST_BONUS: f64 = 0.15;

/// Rank inventory records against each required text by token overlap.
///
/// Score = |required ∩ item| / |required|, 0 when either side has no tokens.
/// Zero-score candidates are dropped; ties keep the original inventory order.
pub fn match_inventory(
    required: &[String],
    inventory: &[InventoryItem],
    top_k: usize,
    boost_keywords: Option<&[String]>,
) -> Vec<MatchResult> {
    let boost: HashSet<String> = tokenize(&boost_keywords.unwrap_or(&[]).join(" "));

    let indexed: Vec<(&InventoryItem, HashSet<String>)> = inventory
        .iter()
        .map(|it| {
            let synonyms = it.synonyms.as_deref().unwrap_or("");
            (it, tokenize(&format!("{} {}", it.name, synonyms)))
        })
        .collect();

    required
        .iter()
        .map(|req| {
            let req_tokens = tokenize(req);
            let mut scored: Vec<(f64, &InventoryItem)> = Vec::new();

            for (it, tokens) in &indexed {
                if req_tokens.is_empty() || tokens.is_empty() {
                    continue;
                }
                let overlap = req_tokens.intersection(tokens).count();
                let mut score = overlap as f64 / req_tokens.len() as f64;
                if !boost.is_empty()
                    && req_tokens.intersection(&boost).next().is_some()
                    && tokens.intersection(&boost).next().is_some()
                {
                    score = (score + BOOST_BONUS).min(1.0);
                }
                if score > 0.0 {
                    scored.push((score, it));
                }
            }

            // sort_by is stable: equal scores keep inventory order
            scored.sort_by(|a, b| b.0.total_cmp(&a.0));

            let matches = scored
                .into_iter()
                .take(top_k)
                .map(|(score, it)| MatchCandidate {
                    name: it.name.clone(),
                    sku: it.sku.clone(),
                    synonyms: it.synonyms.clone(),
                    stock: it.stock,
                    cost: it.cost,
                    price: it.price,
                    supplier: it.supplier.clone(),
                    score,
                })
                .collect();

            MatchResult {
                required: req.clone(),
                matches,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(name: &str, stock: i64) -> InventoryItem {
        InventoryItem {
            name: name.to_string(),
            stock: Some(stock),
            ..Default::default()
        }
    }

    fn req(texts: &[&str]) -> Vec<String> {
        texts.iter().map(|t| t.to_string()).collect()
    }

    #[test]
    fn one_result_per_required_item_in_order() {
        let inv = vec![item("guantes nitrilo", 10), item("mascarilla kn95", 5)];
        let results = match_inventory(&req(&["mascarilla", "guantes"]), &inv, 3, None);
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].required, "mascarilla");
        assert_eq!(results[1].required, "guantes");
        assert_eq!(results[0].matches[0].name, "mascarilla kn95");
        assert_eq!(results[1].matches[0].name, "guantes nitrilo");
    }

    #[test]
    fn empty_inventory_yields_empty_candidate_lists() {
        let results = match_inventory(&req(&["algo", "otra cosa"]), &[], 3, None);
        assert_eq!(results.len(), 2);
        assert!(results.iter().all(|r| r.matches.is_empty()));
    }

    #[test]
    fn empty_required_list_yields_empty_results() {
        let inv = vec![item("tornillos", 100)];
        assert!(match_inventory(&[], &inv, 3, None).is_empty());
    }

    #[test]
    fn zero_overlap_candidates_are_dropped() {
        let inv = vec![item("resma papel carta", 40)];
        let results = match_inventory(&req(&["cemento portland"]), &inv, 3, None);
        assert!(results[0].matches.is_empty());
    }

    #[test]
    fn requirement_without_tokens_never_matches() {
        let inv = vec![item("guantes", 10)];
        let results = match_inventory(&req(&["---"]), &inv, 3, None);
        assert!(results[0].matches.is_empty());
    }

    #[test]
    fn scores_are_overlap_over_required_tokens() {
        let inv = vec![item("guantes nitrilo talla m", 10)];
        let results = match_inventory(&req(&["guantes nitrilo azules"]), &inv, 3, None);
        let m = &results[0].matches[0];
        assert!((m.score - 2.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn synonyms_count_toward_item_tokens() {
        let mut it = item("alcohol gel", 8);
        it.synonyms = Some("sanitizante, desinfectante".to_string());
        let results = match_inventory(&req(&["sanitizante"]), &[it], 3, None);
        assert_eq!(results[0].matches.len(), 1);
        assert!((results[0].matches[0].score - 1.0).abs() < 1e-9);
    }

    #[test]
    fn respects_top_k_and_descending_order() {
        let inv = vec![
            item("caja guantes", 1),
            item("guantes nitrilo talla m", 2),
            item("guantes", 3),
            item("dispensador guantes pared", 4),
        ];
        let results = match_inventory(&req(&["guantes nitrilo"]), &inv, 2, None);
        let m = &results[0].matches;
        assert_eq!(m.len(), 2);
        assert!(m[0].score >= m[1].score);
        assert_eq!(m[0].name, "guantes nitrilo talla m");
    }

    #[test]
    fn ties_keep_inventory_order() {
        let inv = vec![item("guantes rojos", 1), item("guantes verdes", 2)];
        let results = match_inventory(&req(&["guantes"]), &inv, 3, None);
        let m = &results[0].matches;
        assert_eq!(m[0].name, "guantes rojos");
        assert_eq!(m[1].name, "guantes verdes");
        assert_eq!(m[0].score, m[1].score);
    }

    #[test]
    fn boost_rewards_focus_keyword_alignment() {
        let inv = vec![item("guantes nitrilo", 5), item("guantes latex", 5)];
        let boost = vec!["nitrilo".to_string()];
        let results = match_inventory(&req(&["guantes nitrilo"]), &inv, 3, Some(&boost));
        let m = &results[0].matches;
        // both sides hit the boost set -> +0.15, capped at 1.0
        assert!((m[0].score - 1.0).abs() < 1e-9);
        assert_eq!(m[0].name, "guantes nitrilo");
        assert!((m[1].score - 0.5).abs() < 1e-9);
    }

    #[test]
    fn boost_applies_on_top_of_overlap() {
        let mut it = item("insumos medicos", 3);
        it.synonyms = Some("salud".to_string());
        let boost = vec!["salud".to_string()];
        let results = match_inventory(&req(&["equipamiento salud"]), &[it], 3, Some(&boost));
        // overlap 1/2 plus the 0.15 bonus
        assert!((results[0].matches[0].score - 0.65).abs() < 1e-9);
    }

    #[test]
    fn accents_fold_before_matching() {
        let inv = vec![item("lápices grafito", 12)];
        let results = match_inventory(&req(&["LAPICES"]), &inv, 3, None);
        assert_eq!(results[0].matches.len(), 1);
    }

    #[test]
    fn repeated_calls_are_identical() {
        let inv = vec![item("guantes nitrilo", 5), item("guantes latex", 5)];
        let a = match_inventory(&req(&["guantes"]), &inv, 3, None);
        let b = match_inventory(&req(&["guantes"]), &inv, 3, None);
        assert_eq!(
            serde_json::to_string(&a).unwrap(),
            serde_json::to_string(&b).unwrap()
        );
    }
}
