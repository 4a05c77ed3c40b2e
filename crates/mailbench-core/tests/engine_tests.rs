use std::fs;
use std::path::Path;
use tempfile::tempdir;

use mailbench_core::analysis::{FileAnalysis, PreFilterStat};
use mailbench_core::runs::{ClassifierMode, RunRequest, RunStatus, RunStore};
use mailbench_core::{AppConfig, Classifier, ClassifierOutput, Error, RunEngine, SilentReporter};

/// Writes a fixed result file into the request's output directory.
struct FakeClassifier {
    result_body: &'static str,
}

impl Classifier for FakeClassifier {
    fn classify(&self, request: &RunRequest) -> mailbench_core::Result<ClassifierOutput> {
        let out = Path::new(&request.out_path);
        fs::create_dir_all(out)?;
        fs::write(out.join("emails_result.csv"), self.result_body)?;
        Ok(ClassifierOutput {
            total_emails: 4,
            processed_emails: 3,
            sr_positive: Some(2),
            sr_negative: Some(1),
            category_breakdown: None,
            file_stats: vec![PreFilterStat {
                source_file: "emails.csv".to_string(),
                original_total: 4,
                original_sr_count: 2,
                original_archive_count: 2,
                filtered_total: 3,
            }],
        })
    }
}

/// Succeeds without writing anything.
struct SilentClassifier;

impl Classifier for SilentClassifier {
    fn classify(&self, _request: &RunRequest) -> mailbench_core::Result<ClassifierOutput> {
        Ok(ClassifierOutput::default())
    }
}

struct BrokenClassifier;

impl Classifier for BrokenClassifier {
    fn classify(&self, _request: &RunRequest) -> mailbench_core::Result<ClassifierOutput> {
        Err(Error::Classifier("model endpoint unreachable".to_string()))
    }
}

fn make_request(out: &Path) -> RunRequest {
    RunRequest {
        source_path: "/data/emails.csv".to_string(),
        out_path: out.to_string_lossy().into_owned(),
        mode: ClassifierMode::Both,
        use_filter: true,
        async_mode: true,
        max_concurrency: 8,
    }
}

const RESULT: &str = "\
sr_id,quickfill,predicted_opening,predicted_quickfill
11,Billing,SR Creation,Billing
12,Tech,SR Creation,Billing
,,Archive,
";

#[test]
fn test_successful_run_is_completed_with_analyses() {
    let tmp = tempdir().unwrap();
    let out = tmp.path().join("out");
    let store = RunStore::open_in_memory(100).unwrap();
    let engine = RunEngine::new(AppConfig::default(), store, FakeClassifier { result_body: RESULT });

    let record = engine.run(&make_request(&out), &SilentReporter).unwrap();

    assert_eq!(record.status, RunStatus::Completed);
    assert!(record.started_at.is_some());
    assert!(record.completed_at.is_some());
    assert_eq!(record.total_emails, Some(4));
    assert_eq!(record.sr_positive, Some(2));
    assert!(record.analysis_error.is_none());

    let analyses = record.file_analyses.as_ref().unwrap();
    assert_eq!(analyses.len(), 1);
    match &analyses[0] {
        FileAnalysis::Success(report) => {
            assert_eq!(report.sr_analysis.sr_creation_precision, Some(1.0));
            assert_eq!(report.category_analysis.accuracy, Some(0.5));
            assert_eq!(report.filtered_total, Some(3));
            assert_eq!(report.original_stats.unwrap().total_emails, 4);
        }
        other => panic!("expected success, got {:?}", other),
    }

    let stored = engine.store().get(&record.run_id).unwrap().unwrap();
    assert_eq!(stored, record);
}

#[test]
fn test_classifier_failure_fails_the_run() {
    let tmp = tempdir().unwrap();
    let store = RunStore::open_in_memory(100).unwrap();
    let engine = RunEngine::new(AppConfig::default(), store, BrokenClassifier);

    let record = engine.run(&make_request(tmp.path()), &SilentReporter).unwrap();
    assert_eq!(record.status, RunStatus::Failed);
    assert!(record
        .error_message
        .as_deref()
        .unwrap()
        .contains("model endpoint unreachable"));
    assert!(record.file_analyses.is_none());
}

#[test]
fn test_missing_results_complete_with_analysis_error() {
    let tmp = tempdir().unwrap();
    let store = RunStore::open_in_memory(100).unwrap();
    let engine = RunEngine::new(AppConfig::default(), store, SilentClassifier);

    let record = engine.run(&make_request(tmp.path()), &SilentReporter).unwrap();
    assert_eq!(record.status, RunStatus::Completed);
    assert!(record.file_analyses.is_none());
    assert!(record
        .analysis_error
        .as_deref()
        .unwrap()
        .starts_with("No result files found"));
}

#[test]
fn test_invalid_request_is_rejected_before_saving() {
    let tmp = tempdir().unwrap();
    let store = RunStore::open_in_memory(100).unwrap();
    let engine = RunEngine::new(AppConfig::default(), store, SilentClassifier);

    let mut request = make_request(tmp.path());
    request.max_concurrency = 500;
    assert!(matches!(
        engine.submit(&request),
        Err(Error::InvalidRequest(_))
    ));
    assert_eq!(engine.store().count().unwrap(), 0);
}

#[test]
fn test_execute_unknown_run() {
    let store = RunStore::open_in_memory(100).unwrap();
    let engine = RunEngine::new(AppConfig::default(), store, SilentClassifier);
    assert!(matches!(
        engine.execute("nope", &SilentReporter),
        Err(Error::RunNotFound(_))
    ));
}
