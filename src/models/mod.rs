pub mod analysis;
pub mod company;
pub mod inventory;
pub mod job;
pub mod plan;
pub mod session;
pub mod tender;

pub use analysis::{AnalysisDebug, DocumentAnalysis};
pub use company::{split_keywords, CompanyProfile};
pub use inventory::{InventoryItem, ProviderOffer};
pub use job::{Job, JobStatus, JobSummary};
pub use plan::{ItemAnalysis, MissingProcurement, Plan, PlanKind, TenderEvaluation, TenderSummary};
pub use session::AssistantSession;
pub use tender::{
    CompatibilityReport, CoveredItem, Decision, MatchCandidate, MatchResult, MissingItem,
    RequiredItem, Tender, TenderItem,
};
