pub mod analysis;
pub mod classifier;
pub mod config;
pub mod engine;
pub mod error;
pub mod progress;
pub mod runs;
pub mod scanner;
pub mod table;

pub use analysis::{FileAnalysis, PreFilterStat, ResultsAnalyzer};
pub use classifier::{Classifier, ClassifierOutput, CommandClassifier};
pub use config::{AnalysisConfig, AppConfig};
pub use engine::RunEngine;
pub use error::{Error, Result};
pub use progress::{ProgressReporter, SilentReporter};
pub use runs::{RunRecord, RunRequest, RunStatus, RunStore};
