pub mod analyzer;
pub mod assistant;
pub mod catalog;
pub mod compatibility;
pub mod evaluator;
pub mod matcher;
pub mod text;

pub use analyzer::analyze_document;
pub use assistant::{route_command, CommandReply, Stage};
pub use catalog::{build_truth_block, parse_inventory_csv};
pub use compatibility::{inventory_compatibility, DEFAULT_MIN_SCORE};
pub use evaluator::{evaluate_tender, find_best_offer};
pub use matcher::{match_inventory, DEFAULT_TOP_K};
