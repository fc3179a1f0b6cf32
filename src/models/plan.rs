use serde::{Deserialize, Serialize};

use super::inventory::ProviderOffer;
use super::tender::MatchCandidate;

/// The fixed set of pricing strategies, in generation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlanKind {
    Competitivo,
    Equilibrado,
    Rentable,
}

impl PlanKind {
    pub const ALL: [PlanKind; 3] = [
        PlanKind::Competitivo,
        PlanKind::Equilibrado,
        PlanKind::Rentable,
    ];

    pub fn label(self) -> &'static str {
        match self {
            PlanKind::Competitivo => "Plan competitivo",
            PlanKind::Equilibrado => "Plan equilibrado",
            PlanKind::Rentable => "Plan mayor ganancia",
        }
    }

    /// Multiplier applied to the company's target margin.
    pub fn margin_factor(self) -> f64 {
        match self {
            PlanKind::Competitivo => 0.75,
            PlanKind::Equilibrado => 1.0,
            PlanKind::Rentable => 1.35,
        }
    }

    /// Additive adjustment to the award probability.
    pub fn competitiveness_bonus(self) -> f64 {
        match self {
            PlanKind::Competitivo => 0.12,
            PlanKind::Equilibrado => 0.0,
            PlanKind::Rentable => -0.1,
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "competitivo" => Some(PlanKind::Competitivo),
            "equilibrado" => Some(PlanKind::Equilibrado),
            "rentable" => Some(PlanKind::Rentable),
            _ => None,
        }
    }
}

/// One priced bidding plan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Plan {
    #[serde(rename = "plan")]
    pub kind: PlanKind,
    pub label: String,
    pub margin_pct: f64,
    pub offer_total: f64,
    pub estimated_profit: f64,
    pub risk_score: f64,
    pub award_probability: f64,
    pub expected_value: f64,
    /// True when some shortfall had no eligible provider offer, i.e. part of
    /// the true cost is not priced into this plan.
    #[serde(default)]
    pub unpriced_shortfall: bool,
    pub recommended: bool,
}

/// Per-item breakdown of the evaluation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemAnalysis {
    pub item: String,
    pub qty: i64,
    pub from_inventory: i64,
    pub missing_qty: i64,
    pub inventory_match: Option<MatchCandidate>,
    pub supplier_offer: Option<ProviderOffer>,
    pub estimated_item_cost: f64,
}

/// Shortfall entry: what still has to be bought, and from whom (if anyone).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MissingProcurement {
    pub item: String,
    pub missing_qty: i64,
    pub supplier_offer: Option<ProviderOffer>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TenderSummary {
    pub tender_title: String,
    pub total_items: usize,
    pub total_cost: f64,
    pub inventory_cost: f64,
    pub procurement_cost: f64,
    pub missing_items: usize,
}

/// Full result of evaluating one tender opportunity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TenderEvaluation {
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<TenderSummary>,
    #[serde(default)]
    pub item_analysis: Vec<ItemAnalysis>,
    #[serde(default)]
    pub plans: Vec<Plan>,
    #[serde(default)]
    pub missing_procurement: Vec<MissingProcurement>,
}

impl TenderEvaluation {
    pub fn rejected(error: impl Into<String>) -> Self {
        Self {
            ok: false,
            error: Some(error.into()),
            summary: None,
            item_analysis: Vec::new(),
            plans: Vec::new(),
            missing_procurement: Vec::new(),
        }
    }
}
