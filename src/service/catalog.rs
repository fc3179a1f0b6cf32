use crate::error::EngineError;
use crate::models::{CompanyProfile, InventoryItem};
use crate::service::text::fold;

/// Parse an uploaded inventory CSV. Column headers accept the Spanish and
/// English spellings used by merchant spreadsheets; rows without a product
/// name are skipped.
pub fn parse_inventory_csv(data: &str) -> Result<Vec<InventoryItem>, EngineError> {
    let data = data.trim_start_matches('\u{feff}');
    if data.trim().is_empty() {
        return Err(EngineError::InvalidUpload("archivo vacío".to_string()));
    }

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(data.as_bytes());

    let headers: Vec<String> = reader.headers()?.iter().map(fold).collect();

    let column = |aliases: &[&str]| -> Option<usize> {
        headers
            .iter()
            .position(|h| aliases.contains(&h.as_str()))
    };

    let col_sku = column(&["sku"]);
    let col_name = column(&["name", "nombre", "producto"]);
    let col_synonyms = column(&["synonyms", "sinonimos"]);
    let col_cost = column(&["cost", "costo"]);
    let col_price = column(&["price", "precio"]);
    let col_stock = column(&["stock"]);
    let col_restock = column(&["restock_days", "reposicion_dias", "restockdays", "lead_time", "leadtime"]);
    let col_supplier = column(&["supplier", "proveedor"]);

    let Some(col_name) = col_name else {
        return Err(EngineError::InvalidUpload(
            "columna 'name' (o 'nombre'/'producto') requerida".to_string(),
        ));
    };

    let mut items = Vec::new();
    for record in reader.records() {
        let record = record?;
        let cell = |col: Option<usize>| -> Option<String> {
            col.and_then(|i| record.get(i))
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        };

        let Some(name) = cell(Some(col_name)) else {
            continue;
        };

        items.push(InventoryItem {
            sku: cell(col_sku),
            name,
            synonyms: cell(col_synonyms),
            cost: cell(col_cost).and_then(|v| v.parse().ok()),
            price: cell(col_price).and_then(|v| v.parse().ok()),
            stock: cell(col_stock)
                .and_then(|v| v.parse::<f64>().ok())
                .map(|v| v as i64),
            restock_days: cell(col_restock)
                .and_then(|v| v.parse::<f64>().ok())
                .map(|v| v as i64),
            supplier: cell(col_supplier),
        });
    }

    Ok(items)
}

/// Verified company + inventory context block fed to external
/// text-generation layers. Deterministic plain text, no I/O.
pub fn build_truth_block(
    company: &CompanyProfile,
    inventory: &[InventoryItem],
    max_items: usize,
) -> String {
    let mut lines: Vec<String> = Vec::new();

    lines.push("### DATOS VERIFICADOS DEL CLIENTE".to_string());
    let user = if company.user_id.is_empty() {
        "demo"
    } else {
        company.user_id.as_str()
    };
    lines.push(format!("Usuario: {user}"));

    if let Some(name) = &company.company_name {
        lines.push(format!("Empresa: {name}"));
    }
    if let Some(categories) = &company.categories {
        lines.push(format!("Rubros: {categories}"));
    }
    if company.rubros_keywords.is_some() || company.keywords_globales.is_some() {
        lines.push(format!(
            "Rubros keywords: {}",
            company.rubros_keywords.as_deref().unwrap_or("")
        ));
        lines.push(format!(
            "Keywords globales: {}",
            company.keywords_globales.as_deref().unwrap_or("")
        ));
        lines.push(format!(
            "Keywords excluir: {}",
            company.keywords_excluir.as_deref().unwrap_or("")
        ));
    }

    lines.push(String::new());
    lines.push("Inventario:".to_string());

    if inventory.is_empty() {
        lines.push("- vacío".to_string());
    } else {
        for it in inventory.iter().take(max_items) {
            lines.push(format!(
                "- {} stock:{} costo:{}",
                it.name,
                it.stock_or_zero(),
                it.cost.unwrap_or(0.0)
            ));
        }
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_english_headers() {
        let csv = "sku,name,cost,price,stock,restock_days,supplier\n\
                   A1,guantes nitrilo,2.5,4.0,100,7,Acme\n\
                   ,mascarillas,1.0,2.0,50,,";
        let items = parse_inventory_csv(csv).unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].sku.as_deref(), Some("A1"));
        assert_eq!(items[0].name, "guantes nitrilo");
        assert_eq!(items[0].cost, Some(2.5));
        assert_eq!(items[0].stock, Some(100));
        assert_eq!(items[0].restock_days, Some(7));
        assert_eq!(items[1].sku, None);
        assert_eq!(items[1].restock_days, None);
    }

    #[test]
    fn parses_spanish_headers_with_accents() {
        let csv = "Nombre,Costo,Precio,Stock,Proveedor,Sinónimos\n\
                   alcohol gel,1.2,2.4,30,Acme,sanitizante";
        let items = parse_inventory_csv(csv).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].name, "alcohol gel");
        assert_eq!(items[0].cost, Some(1.2));
        assert_eq!(items[0].supplier.as_deref(), Some("Acme"));
        assert_eq!(items[0].synonyms.as_deref(), Some("sanitizante"));
    }

    #[test]
    fn skips_rows_without_a_name() {
        let csv = "name,stock\nguantes,10\n,5\nmascarillas,3";
        let items = parse_inventory_csv(csv).unwrap();
        assert_eq!(items.len(), 2);
    }

    #[test]
    fn rejects_empty_and_nameless_uploads() {
        assert!(parse_inventory_csv("").is_err());
        assert!(parse_inventory_csv("sku,cost\nA1,2.0").is_err());
    }

    #[test]
    fn truth_block_is_deterministic() {
        let company = CompanyProfile {
            user_id: "u1".to_string(),
            company_name: Some("Ferretería Sur".to_string()),
            categories: Some("ferretería".to_string()),
            ..Default::default()
        };
        let inventory = vec![InventoryItem {
            name: "tornillos".to_string(),
            stock: Some(500),
            cost: Some(0.1),
            ..Default::default()
        }];
        let a = build_truth_block(&company, &inventory, 80);
        let b = build_truth_block(&company, &inventory, 80);
        assert_eq!(a, b);
        assert!(a.contains("Usuario: u1"));
        assert!(a.contains("- tornillos stock:500 costo:0.1"));
    }

    #[test]
    fn truth_block_marks_empty_inventory() {
        let block = build_truth_block(&CompanyProfile::empty("u2"), &[], 80);
        assert!(block.contains("- vacío"));
    }

    #[test]
    fn truth_block_caps_inventory_lines() {
        let inventory: Vec<InventoryItem> = (0..10)
            .map(|i| InventoryItem {
                name: format!("item {i}"),
                ..Default::default()
            })
            .collect();
        let block = build_truth_block(&CompanyProfile::empty("u3"), &inventory, 3);
        assert!(block.contains("item 2"));
        assert!(!block.contains("item 3"));
    }
}
