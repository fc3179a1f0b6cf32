use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Merchant profile (company_profile)
#[derive(Debug, Clone, Default, FromRow, Serialize, Deserialize)]
pub struct CompanyProfile {
    #[serde(default)]
    pub user_id: String,
    pub company_name: Option<String>,
    pub rut: Option<String>,
    pub categories: Option<String>,
    /// Sector keywords, separated by `,`, `;` or `|`
    pub rubros_keywords: Option<String>,
    pub keywords_globales: Option<String>,
    pub keywords_excluir: Option<String>,
    /// Percent values, e.g. 8.0 = 8%
    pub margin_min: Option<f64>,
    pub margin_target: Option<f64>,
    pub delivery_days: Option<String>,
    pub risk_rules: Option<String>,
}

impl CompanyProfile {
    pub fn empty(user_id: &str) -> Self {
        Self {
            user_id: user_id.to_string(),
            ..Default::default()
        }
    }

    /// Declared focus keywords, used as the matcher's boost set.
    pub fn boost_keywords(&self) -> Vec<String> {
        let mut out = split_keywords(self.rubros_keywords.as_deref().unwrap_or(""));
        out.extend(split_keywords(self.keywords_globales.as_deref().unwrap_or("")));
        out
    }
}

pub fn split_keywords(text: &str) -> Vec<String> {
    text.split(|c| matches!(c, ',' | ';' | '|'))
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect()
}
