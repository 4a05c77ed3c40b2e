use crate::analysis::ResultsAnalyzer;
use crate::classifier::{Classifier, ClassifierOutput};
use crate::config::AppConfig;
use crate::error::{Error, Result};
use crate::progress::ProgressReporter;
use crate::runs::{RunRecord, RunRequest, RunStore};
use std::path::Path;
use std::time::Instant;
use tracing::{error, info, warn};

/// Drives a run through its lifecycle: persist, classify, analyze, persist.
pub struct RunEngine<C: Classifier> {
    config: AppConfig,
    store: RunStore,
    classifier: C,
    analyzer: ResultsAnalyzer,
}

impl<C: Classifier> RunEngine<C> {
    pub fn new(config: AppConfig, store: RunStore, classifier: C) -> Self {
        let analyzer = ResultsAnalyzer::new(config.analysis.clone());
        Self {
            config,
            store,
            classifier,
            analyzer,
        }
    }

    pub fn store(&self) -> &RunStore {
        &self.store
    }

    /// Validate a request and record it as a pending run.
    pub fn submit(&self, request: &RunRequest) -> Result<RunRecord> {
        request.validate(&self.config.classifier)?;
        let record = RunRecord::new(request);
        self.store.save(&record)?;
        info!("Created run {} for {}", record.run_id, record.source_path);
        Ok(record)
    }

    /// Run the classifier for a pending run and analyze what it wrote.
    ///
    /// A classifier error fails the run. An analysis error that covers the whole
    /// batch is kept on the record and the run still completes.
    pub fn execute(&self, run_id: &str, reporter: &dyn ProgressReporter) -> Result<RunRecord> {
        let mut record = self
            .store
            .get(run_id)?
            .ok_or_else(|| Error::RunNotFound(run_id.to_string()))?;

        record.mark_running()?;
        self.store.save(&record)?;
        reporter.on_run_start(&record.run_id);

        let request = request_of(&record);
        reporter.on_classify_start(&request.source_path);
        let classify_start = Instant::now();

        let output = match self.classifier.classify(&request) {
            Ok(output) => output,
            Err(err) => {
                error!("Run {} failed: {}", record.run_id, err);
                record.mark_failed(err.to_string())?;
                self.store.save(&record)?;
                return Ok(record);
            }
        };
        reporter.on_classify_complete(
            output.processed_emails,
            classify_start.elapsed().as_secs_f64(),
        );

        apply_output(&mut record, &output);

        match self.analyzer.analyze_results_with(
            Path::new(&record.out_path),
            Some(output.file_stats.as_slice()),
            reporter,
        ) {
            Ok(analyses) => {
                let failed = analyses.iter().filter(|a| !a.is_success()).count();
                info!(
                    "Run {}: analyzed {} file(s), {} failed",
                    record.run_id,
                    analyses.len(),
                    failed
                );
                record.file_analyses = Some(analyses);
            }
            Err(err) => {
                warn!("Run {}: analysis unavailable: {}", record.run_id, err);
                record.analysis_error = Some(err.to_string());
            }
        }

        record.mark_completed()?;
        self.store.save(&record)?;
        Ok(record)
    }

    pub fn run(&self, request: &RunRequest, reporter: &dyn ProgressReporter) -> Result<RunRecord> {
        let record = self.submit(request)?;
        self.execute(&record.run_id, reporter)
    }
}

fn request_of(record: &RunRecord) -> RunRequest {
    RunRequest {
        source_path: record.source_path.clone(),
        out_path: record.out_path.clone(),
        mode: record.mode,
        use_filter: record.use_filter,
        async_mode: record.async_mode,
        max_concurrency: record.max_concurrency,
    }
}

fn apply_output(record: &mut RunRecord, output: &ClassifierOutput) {
    record.total_emails = Some(output.total_emails);
    record.processed_emails = Some(output.processed_emails);
    record.sr_positive = output.sr_positive;
    record.sr_negative = output.sr_negative;
    record.category_breakdown = output.category_breakdown.clone();
}
