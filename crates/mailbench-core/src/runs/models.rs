use crate::analysis::FileAnalysis;
use crate::config::ClassifierConfig;
use crate::error::{Error, Result};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use uuid::Uuid;

/// Which classification stages a run executes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClassifierMode {
    Sr,
    Qf,
    Both,
}

impl ClassifierMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClassifierMode::Sr => "sr",
            ClassifierMode::Qf => "qf",
            ClassifierMode::Both => "both",
        }
    }
}

impl fmt::Display for ClassifierMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ClassifierMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "sr" => Ok(ClassifierMode::Sr),
            "qf" => Ok(ClassifierMode::Qf),
            "both" => Ok(ClassifierMode::Both),
            other => Err(Error::InvalidRequest(format!("unknown mode '{}'", other))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    Pending,
    Running,
    Completed,
    Failed,
}

impl RunStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunStatus::Pending => "pending",
            RunStatus::Running => "running",
            RunStatus::Completed => "completed",
            RunStatus::Failed => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, RunStatus::Completed | RunStatus::Failed)
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RunStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(RunStatus::Pending),
            "running" => Ok(RunStatus::Running),
            "completed" => Ok(RunStatus::Completed),
            "failed" => Ok(RunStatus::Failed),
            other => Err(Error::InvalidRequest(format!("unknown status '{}'", other))),
        }
    }
}

/// Parameters for one classifier run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunRequest {
    pub source_path: String,
    pub out_path: String,
    pub mode: ClassifierMode,
    pub use_filter: bool,
    pub async_mode: bool,
    pub max_concurrency: u32,
}

impl RunRequest {
    /// Checks paths, the concurrency bound and, for file sources, the extension.
    pub fn validate(&self, config: &ClassifierConfig) -> Result<()> {
        let max_concurrency_limit = config.max_concurrency_limit;
        if self.source_path.trim().is_empty() {
            return Err(Error::InvalidRequest("source path is required".to_string()));
        }
        if self.out_path.trim().is_empty() {
            return Err(Error::InvalidRequest("output path is required".to_string()));
        }
        if self.max_concurrency < 1 || self.max_concurrency > max_concurrency_limit {
            return Err(Error::InvalidRequest(format!(
                "max concurrency must be between 1 and {}, got {}",
                max_concurrency_limit, self.max_concurrency
            )));
        }
        if let Some(ext) = Path::new(&self.source_path).extension() {
            let ext = ext.to_string_lossy().to_lowercase();
            let allowed = config
                .allowed_file_types
                .iter()
                .any(|t| t.trim_start_matches('.').eq_ignore_ascii_case(&ext));
            if !allowed {
                return Err(Error::InvalidRequest(format!(
                    "source file type .{} is not one of {:?}",
                    ext, config.allowed_file_types
                )));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunRecord {
    pub run_id: String,
    pub status: RunStatus,
    pub source_path: String,
    pub out_path: String,
    pub mode: ClassifierMode,
    pub use_filter: bool,
    pub async_mode: bool,
    pub max_concurrency: u32,
    pub created_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub error_message: Option<String>,
    pub total_emails: Option<u64>,
    pub processed_emails: Option<u64>,
    pub sr_positive: Option<u64>,
    pub sr_negative: Option<u64>,
    pub category_breakdown: Option<BTreeMap<String, u64>>,
    pub file_analyses: Option<Vec<FileAnalysis>>,
    /// Batch-level analysis failure; the run itself still completes.
    #[serde(default)]
    pub analysis_error: Option<String>,
}

impl RunRecord {
    pub fn new(request: &RunRequest) -> Self {
        Self {
            run_id: Uuid::new_v4().to_string(),
            status: RunStatus::Pending,
            source_path: request.source_path.clone(),
            out_path: request.out_path.clone(),
            mode: request.mode,
            use_filter: request.use_filter,
            async_mode: request.async_mode,
            max_concurrency: request.max_concurrency,
            created_at: Utc::now(),
            started_at: None,
            completed_at: None,
            error_message: None,
            total_emails: None,
            processed_emails: None,
            sr_positive: None,
            sr_negative: None,
            category_breakdown: None,
            file_analyses: None,
            analysis_error: None,
        }
    }

    pub fn mark_running(&mut self) -> Result<()> {
        if self.status != RunStatus::Pending {
            return Err(self.illegal_transition(RunStatus::Running));
        }
        self.status = RunStatus::Running;
        self.started_at = Some(Utc::now());
        Ok(())
    }

    pub fn mark_completed(&mut self) -> Result<()> {
        if self.status != RunStatus::Running {
            return Err(self.illegal_transition(RunStatus::Completed));
        }
        self.status = RunStatus::Completed;
        self.completed_at = Some(Utc::now());
        Ok(())
    }

    pub fn mark_failed(&mut self, message: impl Into<String>) -> Result<()> {
        if self.status.is_terminal() {
            return Err(self.illegal_transition(RunStatus::Failed));
        }
        self.status = RunStatus::Failed;
        self.completed_at = Some(Utc::now());
        self.error_message = Some(message.into());
        Ok(())
    }

    pub fn duration(&self) -> Option<Duration> {
        match (self.started_at, self.completed_at) {
            (Some(start), Some(end)) => Some(end - start),
            _ => None,
        }
    }

    fn illegal_transition(&self, to: RunStatus) -> Error {
        Error::InvalidRequest(format!(
            "run {} cannot move from {} to {}",
            self.run_id, self.status, to
        ))
    }
}
