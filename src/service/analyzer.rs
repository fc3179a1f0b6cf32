use std::sync::LazyLock;

use indexmap::IndexSet;
use regex::Regex;

use crate::models::{AnalysisDebug, DocumentAnalysis};
use crate::service::text::fold;

/// Only the head of the document is summarized.
const SCAN_CHARS: usize = 8000;
const SUMMARY_CHARS: usize = 900;

const REQUIREMENTS_LIMIT: usize = 12;
const RISKS_LIMIT: usize = 12;
const OPPORTUNITIES_LIMIT: usize = 10;
const REQUIRED_ITEMS_LIMIT: usize = 12;

// Patterns run against folded lines, so accents are already stripped.
static REQ_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    compile(&[
        r"requisit[oa]s?",
        r"obligatori[oa]s?",
        r"deberan?",
        r"deben?",
        r"exig(e|ido|encia)",
        r"garantia",
        r"multa(s)?",
        r"plazo(s)?",
    ])
});

static RISK_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    compile(&[
        r"multa(s)?",
        r"penalidad(es)?",
        r"garantia",
        r"incumplimiento",
        r"caducidad",
        r"rescision",
        r"responsabilidad",
        r"confidencialidad",
    ])
});

static OPPORTUNITY_PATTERNS: LazyLock<Vec<Regex>> =
    LazyLock::new(|| compile(&[r"ponderacion", r"criterio(s)?", r"puntaje", r"evaluacion"]));

static ITEM_PATTERNS: LazyLock<Vec<Regex>> =
    LazyLock::new(|| compile(&[r"item", r"cantidad", r"unidad", r"producto"]));

fn compile(patterns: &[&str]) -> Vec<Regex> {
    patterns
        .iter()
        .map(|p| Regex::new(p).unwrap_or_else(|e| panic!("bad analyzer pattern {p}: {e}")))
        .collect()
}

/// First `limit` non-empty lines matching any pattern, in original order,
/// de-duplicated by folded value.
fn bullet_extract(text: &str, patterns: &[Regex], limit: usize) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
        let low = fold(line);
        if patterns.iter().any(|p| p.is_match(&low)) {
            out.push(line.to_string());
        }
        if out.len() >= limit {
            break;
        }
    }
    let mut seen: IndexSet<String> = IndexSet::new();
    out.into_iter().filter(|l| seen.insert(fold(l))).collect()
}

fn bullets_or(lines: &[String], placeholder: &str) -> String {
    if lines.is_empty() {
        format!("- {placeholder}")
    } else {
        lines
            .iter()
            .map(|l| format!("- {l}"))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Regex-heuristic extraction of requirement/risk/opportunity/item bullet
/// lines from raw tender text. Fallback summarizer when no external
/// reasoning service is configured.
pub fn analyze_document(text: &str) -> DocumentAnalysis {
    let trimmed: String = text.chars().take(SCAN_CHARS).collect();
    let summary = if trimmed.chars().count() > SUMMARY_CHARS {
        let head: String = trimmed.chars().take(SUMMARY_CHARS).collect();
        format!("{head}…")
    } else {
        trimmed
    };

    let requirements = bullet_extract(text, &REQ_PATTERNS, REQUIREMENTS_LIMIT);
    let risks = bullet_extract(text, &RISK_PATTERNS, RISKS_LIMIT);
    let opportunities = bullet_extract(text, &OPPORTUNITY_PATTERNS, OPPORTUNITIES_LIMIT);
    let required_items = bullet_extract(text, &ITEM_PATTERNS, REQUIRED_ITEMS_LIMIT);

    let draft_markdown = format!(
        "# Propuesta (Borrador)\n\n\
         ## Resumen Ejecutivo\n{}\n\n\
         ## Requisitos Clave (detectados)\n{}\n\n\
         ## Riesgos y Cláusulas Críticas (detectados)\n{}\n\n\
         ## Oportunidades (criterios / ponderación)\n{}\n\n\
         ## Recomendación\n\
         - Preparar carpeta de antecedentes.\n\
         - Confirmar plazos, garantías y causales de inadmisibilidad.\n\
         - Validar stock y margen antes de ofertar.\n",
        if summary.is_empty() {
            "No se pudo extraer texto suficiente del documento."
        } else {
            summary.as_str()
        },
        bullets_or(
            &requirements,
            "(No detectados por heurística. Revisa el documento manualmente.)"
        ),
        bullets_or(
            &risks,
            "(No detectados por heurística. Revisa multas, garantías y plazos.)"
        ),
        bullets_or(&opportunities, "(No detectadas por heurística.)"),
    );

    DocumentAnalysis {
        summary,
        requirements,
        risks,
        opportunities,
        required_items,
        draft_markdown,
        debug: AnalysisDebug {
            mode: "local".to_string(),
            chars: text.chars().count(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_text_is_its_own_summary() {
        let analysis = analyze_document("Bases de licitación.");
        assert_eq!(analysis.summary, "Bases de licitación.");
        assert!(!analysis.summary.ends_with('…'));
    }

    #[test]
    fn long_text_is_truncated_with_ellipsis() {
        let text = "x".repeat(2000);
        let analysis = analyze_document(&text);
        assert_eq!(analysis.summary.chars().count(), 901);
        assert!(analysis.summary.ends_with('…'));
    }

    #[test]
    fn categorizes_matching_lines() {
        let text = "\
Licitación 4857-22-LE26
Requisitos: boleta de garantía por fiel cumplimiento
Multa de 1 UF por día de atraso
Criterios de evaluación: precio 60%, plazo 40%
Ítem 1: guantes de nitrilo, cantidad 500
Texto sin señal alguna";
        let analysis = analyze_document(text);
        assert!(analysis
            .requirements
            .iter()
            .any(|l| l.contains("garantía")));
        assert!(analysis.risks.iter().any(|l| l.contains("Multa")));
        assert!(analysis
            .opportunities
            .iter()
            .any(|l| l.contains("Criterios")));
        assert!(analysis
            .required_items
            .iter()
            .any(|l| l.contains("guantes")));
        assert!(!analysis
            .requirements
            .iter()
            .any(|l| l.contains("sin señal")));
    }

    #[test]
    fn accented_keywords_match() {
        let analysis = analyze_document("Se exige GARANTÍA de seriedad\nÍTEM 2: cemento");
        assert_eq!(analysis.requirements.len(), 1);
        assert_eq!(analysis.required_items.len(), 1);
    }

    #[test]
    fn deduplicates_case_insensitively_preserving_order() {
        let text = "Multa por atraso\nMULTA POR ATRASO\nMulta por incumplimiento";
        let analysis = analyze_document(text);
        assert_eq!(
            analysis.risks,
            vec!["Multa por atraso", "Multa por incumplimiento"]
        );
    }

    #[test]
    fn respects_category_caps() {
        let lines: Vec<String> = (0..30).map(|i| format!("Multa número {i}")).collect();
        let analysis = analyze_document(&lines.join("\n"));
        assert_eq!(analysis.risks.len(), RISKS_LIMIT);
        assert_eq!(analysis.requirements.len(), REQUIREMENTS_LIMIT);
    }

    #[test]
    fn empty_categories_get_placeholders() {
        let analysis = analyze_document("Nada relevante aquí");
        assert!(analysis
            .draft_markdown
            .contains("(No detectados por heurística. Revisa el documento manualmente.)"));
        assert!(analysis
            .draft_markdown
            .contains("(No detectadas por heurística.)"));
    }

    #[test]
    fn debug_reports_local_mode_and_chars() {
        let analysis = analyze_document("abc");
        assert_eq!(analysis.debug.mode, "local");
        assert_eq!(analysis.debug.chars, 3);
    }
}
