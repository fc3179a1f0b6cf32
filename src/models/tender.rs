use serde::{Deserialize, Serialize};

/// Free-text requirement derived from a tender or document. Callers may send
/// the description under `text`, `texto`, `item` or `name`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequiredItem {
    #[serde(alias = "texto", alias = "item", alias = "name")]
    pub text: String,
    #[serde(default)]
    pub qty: Option<i64>,
    #[serde(default)]
    pub unit: Option<String>,
}

impl RequiredItem {
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            qty: None,
            unit: None,
        }
    }
}

/// One line of a tender's shopping list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TenderItem {
    #[serde(alias = "item")]
    pub name: String,
    #[serde(default)]
    pub qty: Option<i64>,
}

/// Structured tender opportunity.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Tender {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub items: Vec<TenderItem>,
    #[serde(default)]
    pub deadline_days: Option<i64>,
}

/// Scored read-only projection of one inventory item for one requirement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchCandidate {
    pub name: String,
    pub sku: Option<String>,
    pub synonyms: Option<String>,
    pub stock: Option<i64>,
    pub cost: Option<f64>,
    pub price: Option<f64>,
    pub supplier: Option<String>,
    /// Token overlap score in [0, 1]
    pub score: f64,
}

/// One requirement paired with its top-k candidates, descending by score.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchResult {
    pub required: String,
    pub matches: Vec<MatchCandidate>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoveredItem {
    pub item: RequiredItem,
    #[serde(rename = "match")]
    pub matched: MatchCandidate,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MissingItem {
    pub item: RequiredItem,
    pub best_match: Option<MatchCandidate>,
}

/// Coverage report: what share of a tender the merchant can serve from stock.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompatibilityReport {
    /// Percentage 0-100, rounded
    pub compat_score: u8,
    pub items_cubiertos: Vec<CoveredItem>,
    pub items_faltantes: Vec<MissingItem>,
}

/// Fast-track go/no-go signal derived from the coverage score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Decision {
    Apta,
    Evaluar,
    Descartar,
}

impl Decision {
    pub fn from_compat_score(compat_score: u8) -> Self {
        if compat_score == 0 {
            Decision::Descartar
        } else if compat_score >= 70 {
            Decision::Apta
        } else {
            Decision::Evaluar
        }
    }
}
