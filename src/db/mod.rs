pub mod jobs;
pub mod pool;
pub mod queries;

pub use jobs::{create_job, finish_job, get_job, list_jobs};
pub use pool::create_pool;
pub use queries::*;
