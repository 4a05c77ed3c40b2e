use crate::analysis::PreFilterStat;
use crate::config::ClassifierConfig;
use crate::error::{Error, Result};
use crate::runs::RunRequest;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::Read;
use std::process::{Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// What the external classifier reports after writing its result files.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifierOutput {
    #[serde(default)]
    pub total_emails: u64,
    #[serde(default)]
    pub processed_emails: u64,
    #[serde(default)]
    pub sr_positive: Option<u64>,
    #[serde(default)]
    pub sr_negative: Option<u64>,
    #[serde(default)]
    pub category_breakdown: Option<BTreeMap<String, u64>>,
    #[serde(default)]
    pub file_stats: Vec<PreFilterStat>,
}

/// The classification process, treated as a black box that writes one result
/// table per source file under the request's output path.
pub trait Classifier {
    fn classify(&self, request: &RunRequest) -> Result<ClassifierOutput>;
}

/// Runs an external program and reads a JSON `ClassifierOutput` from its stdout.
pub struct CommandClassifier {
    program: String,
    args: Vec<String>,
    timeout: Option<Duration>,
}

impl CommandClassifier {
    pub fn new(program: &str, args: &[String]) -> Self {
        Self {
            program: program.to_string(),
            args: args.to_vec(),
            timeout: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// `None` when no classifier command is configured.
    pub fn from_config(config: &ClassifierConfig) -> Option<Self> {
        let command = config.command.as_ref()?;
        let classifier = Self::new(&command.program, &command.args);
        Some(match config.timeout_secs {
            Some(secs) => classifier.with_timeout(Duration::from_secs(secs)),
            None => classifier,
        })
    }

    fn request_args(request: &RunRequest) -> Vec<String> {
        let mut args = vec![
            "--source".to_string(),
            request.source_path.clone(),
            "--out".to_string(),
            request.out_path.clone(),
            "--mode".to_string(),
            request.mode.to_string(),
        ];
        if request.use_filter {
            args.push("--use-filter".to_string());
        }
        if request.async_mode {
            args.push("--async-mode".to_string());
        }
        args.push("--max-concurrency".to_string());
        args.push(request.max_concurrency.to_string());
        args
    }
}

impl Classifier for CommandClassifier {
    fn classify(&self, request: &RunRequest) -> Result<ClassifierOutput> {
        let args = Self::request_args(request);
        info!("Starting classifier: {} {:?}", self.program, args);

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| Error::Classifier(format!("could not start '{}': {}", self.program, e)))?;

        // drain both pipes so a chatty child cannot block on a full buffer
        let stdout = child.stdout.take().map(drain);
        let stderr = child.stderr.take().map(drain);

        let start = Instant::now();
        let status = loop {
            if let Some(status) = child.try_wait()? {
                break status;
            }
            if let Some(timeout) = self.timeout {
                if start.elapsed() >= timeout {
                    child.kill()?;
                    child.wait()?;
                    return Err(Error::ClassifierTimeout(timeout));
                }
            }
            thread::sleep(Duration::from_millis(50));
        };

        let stdout = collect(stdout);
        let stderr = collect(stderr);
        debug!("Classifier finished in {:.2}s with {}", start.elapsed().as_secs_f64(), status);

        if !status.success() {
            return Err(Error::Classifier(format!(
                "exited with {}: {}",
                status,
                stderr.trim()
            )));
        }

        serde_json::from_str(stdout.trim())
            .map_err(|e| Error::Classifier(format!("unreadable output: {}", e)))
    }
}

fn drain<R: Read + Send + 'static>(mut pipe: R) -> thread::JoinHandle<String> {
    thread::spawn(move || {
        let mut buf = String::new();
        let _ = pipe.read_to_string(&mut buf);
        buf
    })
}

fn collect(handle: Option<thread::JoinHandle<String>>) -> String {
    handle.and_then(|h| h.join().ok()).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runs::ClassifierMode;

    fn request() -> RunRequest {
        RunRequest {
            source_path: "/data/in".to_string(),
            out_path: "/data/out".to_string(),
            mode: ClassifierMode::Sr,
            use_filter: false,
            async_mode: true,
            max_concurrency: 4,
        }
    }

    #[test]
    fn test_request_args() {
        let args = CommandClassifier::request_args(&request());
        assert_eq!(
            args,
            vec![
                "--source", "/data/in", "--out", "/data/out", "--mode", "sr", "--async-mode",
                "--max-concurrency", "4"
            ]
        );
    }

    #[test]
    fn test_output_defaults_missing_fields() {
        let output: ClassifierOutput =
            serde_json::from_str(r#"{"total_emails": 3, "processed_emails": 3}"#).unwrap();
        assert_eq!(output.sr_positive, None);
        assert!(output.file_stats.is_empty());
    }

    #[test]
    fn test_from_config_requires_command() {
        assert!(CommandClassifier::from_config(&ClassifierConfig::default()).is_none());
    }

    #[cfg(unix)]
    #[test]
    fn test_command_output_is_parsed() {
        let script = r#"echo '{"total_emails": 5, "processed_emails": 4, "file_stats": [{"source_file": "a.csv", "original_total": 5, "original_sr_count": 2, "original_archive_count": 3, "filtered_total": 4}]}'"#;
        let classifier =
            CommandClassifier::new("sh", &["-c".to_string(), script.to_string(), "fake".to_string()]);
        let output = classifier.classify(&request()).unwrap();
        assert_eq!(output.total_emails, 5);
        assert_eq!(output.file_stats[0].source_file, "a.csv");
    }

    #[cfg(unix)]
    #[test]
    fn test_non_zero_exit_is_an_error() {
        let classifier = CommandClassifier::new(
            "sh",
            &["-c".to_string(), "echo boom >&2; exit 3".to_string(), "fake".to_string()],
        );
        match classifier.classify(&request()) {
            Err(Error::Classifier(msg)) => assert!(msg.contains("boom"), "{}", msg),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_timeout_kills_the_child() {
        let classifier = CommandClassifier::new(
            "sh",
            &["-c".to_string(), "sleep 5".to_string(), "fake".to_string()],
        )
        .with_timeout(Duration::from_millis(200));
        assert!(matches!(
            classifier.classify(&request()),
            Err(Error::ClassifierTimeout(_))
        ));
    }
}
