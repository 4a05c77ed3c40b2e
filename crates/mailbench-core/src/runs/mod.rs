mod models;
mod queries;
mod store;

pub use models::{ClassifierMode, RunRecord, RunRequest, RunStatus};
pub use store::RunStore;
