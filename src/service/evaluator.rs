use crate::models::{
    CompanyProfile, InventoryItem, ItemAnalysis, MissingProcurement, Plan, PlanKind,
    ProviderOffer, Tender, TenderEvaluation, TenderSummary,
};
use crate::service::matcher::match_inventory;
use crate::service::text::fold;

/// Company margin defaults (percent) when the profile leaves them out.
pub const DEFAULT_MARGIN_TARGET_PCT: f64 = 18.0;
pub const DEFAULT_MARGIN_MIN_PCT: f64 = 8.0;

/// A tender without a deadline is treated as not urgent.
const DEFAULT_DEADLINE_DAYS: i64 = 10;
const URGENT_DEADLINE_DAYS: i64 = 3;

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

fn round3(v: f64) -> f64 {
    (v * 1000.0).round() / 1000.0
}

/// Cheapest provider offer whose name substring-matches the item (either
/// direction, after folding) and whose stock covers the shortfall.
pub fn find_best_offer<'a>(
    item_name: &str,
    missing_qty: i64,
    offers: &'a [ProviderOffer],
) -> Option<&'a ProviderOffer> {
    let needle = fold(item_name);
    let mut best: Option<&ProviderOffer> = None;
    for offer in offers {
        let name = fold(&offer.name);
        if !name.contains(&needle) && !needle.contains(&name) {
            continue;
        }
        if offer.stock < missing_qty {
            continue;
        }
        if best.map_or(true, |b| offer.unit_cost < b.unit_cost) {
            best = Some(offer);
        }
    }
    best
}

/// Price a tender opportunity: split every item between stock and provider
/// sourcing, derive a risk score, and generate the three pricing plans with
/// exactly one recommended (highest expected value, first wins ties).
pub fn evaluate_tender(
    tender: &Tender,
    inventory: &[InventoryItem],
    company: &CompanyProfile,
    provider_offers: &[ProviderOffer],
) -> TenderEvaluation {
    if tender.items.is_empty() {
        return TenderEvaluation::rejected("La licitación no tiene ítems para evaluar.");
    }

    let required: Vec<String> = tender
        .items
        .iter()
        .map(|it| it.name.trim().to_string())
        .collect();
    let matched = match_inventory(&required, inventory, 1, None);

    let margin_target = company.margin_target.unwrap_or(DEFAULT_MARGIN_TARGET_PCT) / 100.0;
    let margin_min = company.margin_min.unwrap_or(DEFAULT_MARGIN_MIN_PCT) / 100.0;

    let mut item_analysis: Vec<ItemAnalysis> = Vec::with_capacity(tender.items.len());
    let mut inventory_cost_total = 0.0;
    let mut procurement_cost_total = 0.0;
    let mut missing_count = 0usize;
    let mut unpriced_shortfall = false;

    for (src, result) in tender.items.iter().zip(&matched) {
        let qty = src.qty.unwrap_or(1).max(1);
        let best = result.matches.first();
        let inv_stock = best.and_then(|b| b.stock).unwrap_or(0).max(0);
        let inv_unit_cost = best.and_then(|b| b.cost).unwrap_or(0.0);

        let from_inventory = inv_stock.min(qty);
        let missing_qty = (qty - from_inventory).max(0);

        let inv_cost = from_inventory as f64 * inv_unit_cost;
        inventory_cost_total += inv_cost;

        let offer = if missing_qty > 0 {
            find_best_offer(&src.name, missing_qty, provider_offers)
        } else {
            None
        };
        // unmet shortfall prices as zero; the plans carry a flag for it
        let provider_cost = missing_qty as f64 * offer.map_or(0.0, |o| o.unit_cost);
        procurement_cost_total += provider_cost;

        if missing_qty > 0 {
            missing_count += 1;
            if offer.is_none() {
                unpriced_shortfall = true;
            }
        }

        item_analysis.push(ItemAnalysis {
            item: src.name.trim().to_string(),
            qty,
            from_inventory,
            missing_qty,
            inventory_match: best.cloned(),
            supplier_offer: offer.cloned(),
            estimated_item_cost: round2(inv_cost + provider_cost),
        });
    }

    let total_cost = round2(inventory_cost_total + procurement_cost_total);
    let missing_ratio = missing_count as f64 / tender.items.len() as f64;
    let urgent = tender.deadline_days.unwrap_or(DEFAULT_DEADLINE_DAYS) <= URGENT_DEADLINE_DAYS;
    let risk_score =
        (0.2 + 0.55 * missing_ratio + if urgent { 0.25 } else { 0.0 }).min(1.0);

    let mut plans: Vec<Plan> = PlanKind::ALL
        .iter()
        .map(|&kind| {
            let margin = margin_min.max(margin_target * kind.margin_factor());
            let offer_total = round2(total_cost * (1.0 + margin));
            let profit = round2(offer_total - total_cost);
            let award_probability =
                (0.58 - risk_score * 0.28 + kind.competitiveness_bonus()).clamp(0.08, 0.92);
            Plan {
                kind,
                label: kind.label().to_string(),
                margin_pct: round2(margin * 100.0),
                offer_total,
                estimated_profit: profit,
                risk_score: round3(risk_score),
                award_probability: round3(award_probability),
                expected_value: round2(profit * award_probability),
                unpriced_shortfall,
                recommended: false,
            }
        })
        .collect();

    // strictly greater, so the first plan wins exact ties
    if let Some(best) = plans
        .iter_mut()
        .reduce(|best, p| if p.expected_value > best.expected_value { p } else { best })
    {
        best.recommended = true;
    }

    let missing_procurement = item_analysis
        .iter()
        .filter(|row| row.missing_qty > 0)
        .map(|row| MissingProcurement {
            item: row.item.clone(),
            missing_qty: row.missing_qty,
            supplier_offer: row.supplier_offer.clone(),
        })
        .collect();

    TenderEvaluation {
        ok: true,
        error: None,
        summary: Some(TenderSummary {
            tender_title: tender
                .title
                .clone()
                .unwrap_or_else(|| "Licitación".to_string()),
            total_items: tender.items.len(),
            total_cost,
            inventory_cost: round2(inventory_cost_total),
            procurement_cost: round2(procurement_cost_total),
            missing_items: missing_count,
        }),
        item_analysis,
        plans,
        missing_procurement,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TenderItem;

    fn item(name: &str, stock: i64, cost: f64) -> InventoryItem {
        InventoryItem {
            name: name.to_string(),
            stock: Some(stock),
            cost: Some(cost),
            ..Default::default()
        }
    }

    fn tender_item(name: &str, qty: i64) -> TenderItem {
        TenderItem {
            name: name.to_string(),
            qty: Some(qty),
        }
    }

    fn tender(items: Vec<TenderItem>, deadline_days: Option<i64>) -> Tender {
        Tender {
            title: Some("Suministro insumos".to_string()),
            items,
            deadline_days,
        }
    }

    fn offer(name: &str, unit_cost: f64, stock: i64) -> ProviderOffer {
        ProviderOffer {
            name: name.to_string(),
            unit_cost,
            stock,
            supplier: None,
        }
    }

    fn company() -> CompanyProfile {
        CompanyProfile::default()
    }

    #[test]
    fn rejects_tender_without_items() {
        let result = evaluate_tender(&tender(vec![], None), &[], &company(), &[]);
        assert!(!result.ok);
        assert!(result.error.is_some());
        assert!(result.plans.is_empty());
        assert!(result.item_analysis.is_empty());
    }

    #[test]
    fn stock_split_is_clamped() {
        let inv = vec![item("guantes", 3, 2.0)];
        let t = tender(vec![tender_item("guantes", 5)], None);
        let result = evaluate_tender(&t, &inv, &company(), &[]);
        let row = &result.item_analysis[0];
        assert_eq!(row.from_inventory, 3);
        assert_eq!(row.missing_qty, 2);
    }

    #[test]
    fn totals_combine_inventory_and_procurement() {
        let inv = vec![item("guantes", 10, 10.0), item("mascarillas", 10, 20.0)];
        let offers = vec![offer("alcohol gel", 5.0, 50)];
        let t = tender(
            vec![
                tender_item("guantes", 1),
                tender_item("mascarillas", 1),
                tender_item("alcohol gel", 2),
            ],
            None,
        );
        let result = evaluate_tender(&t, &inv, &company(), &offers);
        let summary = result.summary.unwrap();
        assert_eq!(summary.inventory_cost, 30.0);
        assert_eq!(summary.procurement_cost, 10.0);
        assert_eq!(summary.total_cost, 40.0);
        assert_eq!(summary.missing_items, 1);
        assert_eq!(result.missing_procurement.len(), 1);
        assert_eq!(result.missing_procurement[0].item, "alcohol gel");
        assert_eq!(result.missing_procurement[0].missing_qty, 2);
    }

    #[test]
    fn cheapest_eligible_offer_wins() {
        let offers = vec![
            offer("alcohol gel galon", 9.0, 50),
            offer("alcohol gel", 5.0, 50),
            offer("alcohol gel barato", 1.0, 1), // not enough stock
        ];
        let best = find_best_offer("alcohol gel", 10, &offers).unwrap();
        assert_eq!(best.unit_cost, 5.0);
    }

    #[test]
    fn offer_matching_is_case_insensitive_both_directions() {
        let offers = vec![offer("GEL", 3.0, 100)];
        // offer name contained in item name
        assert!(find_best_offer("alcohol gel", 4, &offers).is_some());
        let offers = vec![offer("alcohol gel desinfectante", 3.0, 100)];
        // item name contained in offer name
        assert!(find_best_offer("Alcohol Gel", 4, &offers).is_some());
        let offers = vec![offer("cemento", 3.0, 100)];
        assert!(find_best_offer("alcohol gel", 4, &offers).is_none());
    }

    #[test]
    fn exactly_three_plans_in_fixed_order_with_one_recommended() {
        let inv = vec![item("guantes", 10, 10.0)];
        let t = tender(vec![tender_item("guantes", 2)], None);
        let result = evaluate_tender(&t, &inv, &company(), &[]);
        assert_eq!(result.plans.len(), 3);
        assert_eq!(result.plans[0].kind, PlanKind::Competitivo);
        assert_eq!(result.plans[1].kind, PlanKind::Equilibrado);
        assert_eq!(result.plans[2].kind, PlanKind::Rentable);
        assert_eq!(result.plans.iter().filter(|p| p.recommended).count(), 1);
    }

    #[test]
    fn risk_rises_with_missing_ratio_and_urgency() {
        let inv = vec![item("guantes", 10, 1.0)];
        let covered = tender(vec![tender_item("guantes", 1)], Some(10));
        let half_missing = tender(
            vec![tender_item("guantes", 1), tender_item("cemento", 1)],
            Some(10),
        );
        let urgent = tender(vec![tender_item("guantes", 1)], Some(3));

        let r_covered = evaluate_tender(&covered, &inv, &company(), &[]).plans[0].risk_score;
        let r_half = evaluate_tender(&half_missing, &inv, &company(), &[]).plans[0].risk_score;
        let r_urgent = evaluate_tender(&urgent, &inv, &company(), &[]).plans[0].risk_score;

        assert!((r_covered - 0.2).abs() < 1e-9);
        assert!((r_half - 0.475).abs() < 1e-9);
        assert!(r_half > r_covered);
        assert!((r_urgent - 0.45).abs() < 1e-9);
        assert!(r_urgent > r_covered);
    }

    #[test]
    fn margin_floor_applies() {
        let inv = vec![item("guantes", 10, 100.0)];
        let t = tender(vec![tender_item("guantes", 1)], None);
        let mut c = company();
        c.margin_target = Some(10.0);
        c.margin_min = Some(9.0);
        let result = evaluate_tender(&t, &inv, &c, &[]);
        // competitivo: max(0.09, 0.10 * 0.75) = 0.09
        assert_eq!(result.plans[0].margin_pct, 9.0);
        // rentable: max(0.09, 0.10 * 1.35) = 0.135
        assert_eq!(result.plans[2].margin_pct, 13.5);
    }

    #[test]
    fn award_probability_is_clamped() {
        // fully missing + urgent -> risk 1.0; rentable bonus -0.1 ->
        // 0.58 - 0.28 - 0.1 = 0.2; competitivo -> 0.42
        let t = tender(vec![tender_item("cemento", 1)], Some(1));
        let result = evaluate_tender(&t, &[], &company(), &[]);
        for p in &result.plans {
            assert!(p.award_probability >= 0.08 && p.award_probability <= 0.92);
        }
        assert!((result.plans[0].award_probability - 0.42).abs() < 1e-9);
        assert!((result.plans[2].award_probability - 0.2).abs() < 1e-9);
    }

    #[test]
    fn unpriced_shortfall_is_flagged() {
        let t = tender(vec![tender_item("cemento", 4)], None);
        let no_offers = evaluate_tender(&t, &[], &company(), &[]);
        assert!(no_offers.plans.iter().all(|p| p.unpriced_shortfall));
        assert!(no_offers.missing_procurement[0].supplier_offer.is_none());

        let offers = vec![offer("cemento", 2.0, 10)];
        let priced = evaluate_tender(&t, &[], &company(), &offers);
        assert!(priced.plans.iter().all(|p| !p.unpriced_shortfall));
    }

    #[test]
    fn default_quantity_is_one() {
        let inv = vec![item("guantes", 10, 3.0)];
        let t = tender(
            vec![TenderItem {
                name: "guantes".to_string(),
                qty: None,
            }],
            None,
        );
        let result = evaluate_tender(&t, &inv, &company(), &[]);
        assert_eq!(result.item_analysis[0].qty, 1);
        assert_eq!(result.summary.unwrap().total_cost, 3.0);
    }

    #[test]
    fn evaluation_is_deterministic() {
        let inv = vec![item("guantes", 3, 2.5), item("mascarillas", 0, 1.0)];
        let offers = vec![offer("mascarillas", 0.8, 100)];
        let t = tender(
            vec![tender_item("guantes", 5), tender_item("mascarillas", 10)],
            Some(2),
        );
        let a = evaluate_tender(&t, &inv, &company(), &offers);
        let b = evaluate_tender(&t, &inv, &company(), &offers);
        assert_eq!(
            serde_json::to_string(&a).unwrap(),
            serde_json::to_string(&b).unwrap()
        );
    }
}
