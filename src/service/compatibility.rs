use crate::models::{CompatibilityReport, CoveredItem, InventoryItem, MissingItem, RequiredItem};
use crate::service::matcher::match_inventory;

pub const DEFAULT_MIN_SCORE: f64 = 0.4;

/// Reduce a batch of required items to a single 0-100 coverage score.
///
/// An item is covered iff its best match scores at least `min_score` AND that
/// match has stock. Everything else lands in `items_faltantes`, carrying the
/// best candidate (if any) for diagnostic display.
pub fn inventory_compatibility(
    items: &[RequiredItem],
    inventory: &[InventoryItem],
    min_score: f64,
    boost_keywords: Option<&[String]>,
) -> CompatibilityReport {
    if items.is_empty() {
        return CompatibilityReport {
            compat_score: 0,
            items_cubiertos: Vec::new(),
            items_faltantes: Vec::new(),
        };
    }

    let texts: Vec<String> = items.iter().map(|it| it.text.clone()).collect();
    let matched = match_inventory(&texts, inventory, 1, boost_keywords);

    let mut items_cubiertos = Vec::new();
    let mut items_faltantes = Vec::new();

    for (item, result) in items.iter().zip(matched) {
        let best = result.matches.into_iter().next();
        match best {
            Some(m) if m.score >= min_score && m.stock.unwrap_or(0) > 0 => {
                items_cubiertos.push(CoveredItem {
                    item: item.clone(),
                    matched: m,
                });
            }
            other => items_faltantes.push(MissingItem {
                item: item.clone(),
                best_match: other,
            }),
        }
    }

    let compat_score =
        (100.0 * items_cubiertos.len() as f64 / items.len() as f64).round() as u8;

    CompatibilityReport {
        compat_score,
        items_cubiertos,
        items_faltantes,
    }
}
