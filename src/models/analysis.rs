use serde::{Deserialize, Serialize};

/// Output of the heuristic document analyzer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentAnalysis {
    pub summary: String,
    pub requirements: Vec<String>,
    pub risks: Vec<String>,
    pub opportunities: Vec<String>,
    pub required_items: Vec<String>,
    pub draft_markdown: String,
    pub debug: AnalysisDebug,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisDebug {
    pub mode: String,
    pub chars: usize,
}
