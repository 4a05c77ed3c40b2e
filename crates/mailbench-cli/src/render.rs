use colored::*;
use mailbench_core::analysis::{BatchSummary, ConfusionMatrix, FileAnalysis, FileReport};
use mailbench_core::runs::{RunRecord, RunStatus};

/// Percentage with two decimals; "n/a" when the metric could not be computed.
pub fn fmt_metric(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{:.2}%", v * 100.0),
        None => "n/a".to_string(),
    }
}

fn fmt_status(status: RunStatus) -> ColoredString {
    match status {
        RunStatus::Pending => status.as_str().to_uppercase().yellow(),
        RunStatus::Running => status.as_str().to_uppercase().blue(),
        RunStatus::Completed => status.as_str().to_uppercase().green(),
        RunStatus::Failed => status.as_str().to_uppercase().red(),
    }
}

pub fn print_run_line(record: &RunRecord) {
    let emails = record
        .total_emails
        .map(|n| n.to_string())
        .unwrap_or_else(|| "-".to_string());
    println!(
        "{}  {:<9}  {:<4}  {}  emails: {}  {}",
        record.run_id.dimmed(),
        fmt_status(record.status),
        record.mode,
        record.created_at.format("%Y-%m-%d %H:%M:%S"),
        emails,
        record.source_path,
    );
}

pub fn print_run(record: &RunRecord) {
    println!("{} {}", "Run".bold(), record.run_id);
    println!("  Status:      {}", fmt_status(record.status));
    println!("  Source:      {}", record.source_path);
    println!("  Output:      {}", record.out_path);
    println!(
        "  Mode:        {} (filter: {}, async: {}, concurrency: {})",
        record.mode, record.use_filter, record.async_mode, record.max_concurrency
    );
    println!("  Created:     {}", record.created_at.to_rfc3339());
    if let Some(duration) = record.duration() {
        println!(
            "  Duration:    {:.1}s",
            duration.num_milliseconds() as f64 / 1000.0
        );
    }
    if let Some(message) = &record.error_message {
        println!("  Error:       {}", message.red());
    }
    if let (Some(total), Some(processed)) = (record.total_emails, record.processed_emails) {
        println!("  Emails:      {} total, {} processed", total, processed);
    }
    if let (Some(pos), Some(neg)) = (record.sr_positive, record.sr_negative) {
        println!("  SR:          {} positive, {} negative", pos, neg);
    }
    if let Some(breakdown) = &record.category_breakdown {
        println!("  Categories:");
        for (category, count) in breakdown {
            println!("    {:<30} {}", category, count);
        }
    }
    if let Some(err) = &record.analysis_error {
        println!("  {} {}", "Analysis unavailable:".yellow(), err);
    }
    if let Some(analyses) = &record.file_analyses {
        println!();
        print_analyses(analyses);
    }
}

/// Failed files are listed as warnings; successful ones are still shown in full.
pub fn print_analyses(analyses: &[FileAnalysis]) {
    for analysis in analyses {
        match analysis {
            FileAnalysis::Success(report) => print_report(report),
            FileAnalysis::Failed(failure) => println!(
                "{} {}: {}",
                "⚠".yellow(),
                failure.file_name.bold(),
                failure.error_message.yellow()
            ),
        }
    }

    let summary = BatchSummary::from_analyses(analyses);
    println!(
        "{} {} file(s), {} analyzed, {} failed, {} emails",
        "Total:".bold(),
        summary.files_total,
        summary.files_succeeded.to_string().green(),
        summary.files_failed.to_string().red(),
        summary.total_emails,
    );
}

pub fn print_report(report: &FileReport) {
    let basic = &report.basic_stats;
    let sr = &report.sr_analysis;
    let qf = &report.category_analysis;

    println!("{}", report.file_name.bold().cyan());
    if let Some(original) = &report.original_stats {
        println!(
            "  Before filtering: {} emails ({} SR, {} archive)",
            original.total_emails, original.sr_count, original.archive_count
        );
    }
    println!(
        "  Emails: {} ({} SR creation, {} archive in ground truth)",
        basic.total_emails, basic.gt_sr_creation_count, basic.gt_sr_archive_count
    );
    println!(
        "  Predicted: {} SR, {} archive, {} review",
        sr.predicted_sr_count, sr.predicted_archive_count, sr.predicted_review_count
    );
    println!(
        "  SR precision: {}  Archive precision: {}  Accuracy: {}",
        fmt_metric(sr.sr_creation_precision).green(),
        fmt_metric(sr.archive_precision).green(),
        fmt_metric(sr.overall_accuracy).green(),
    );

    if qf.total_categories_predicted > 0 || qf.uncategorized_count > 0 {
        println!(
            "  Categories predicted: {} (uncategorized: {})  Accuracy: {}",
            qf.total_categories_predicted,
            qf.uncategorized_count,
            fmt_metric(qf.accuracy).green()
        );
        for (category, count) in &qf.distribution {
            println!("    {:<30} {}", category, count);
        }
        for (category, count) in &qf.special_category_counts {
            println!("    {} {:<28} {}", "*".magenta(), category, count);
        }
        if let Some(cm) = &qf.confusion_matrix {
            print_confusion_matrix(cm);
        }
    }

    for warning in &report.warnings {
        println!("  {} {}", "⚠".yellow(), warning);
    }
    println!();
}

fn print_confusion_matrix(cm: &ConfusionMatrix) {
    let width = cm.labels.iter().map(|l| l.len()).max().unwrap_or(0).max(6);
    print!("    {:width$}", "", width = width);
    for label in &cm.labels {
        print!(" {:>width$}", label, width = width);
    }
    println!();
    for truth in &cm.labels {
        print!("    {:width$}", truth, width = width);
        for pred in &cm.labels {
            let count = cm.get(truth, pred).to_string();
            let cell = format!("{:>width$}", count, width = width);
            if truth == pred {
                print!(" {}", cell.green());
            } else {
                print!(" {}", cell);
            }
        }
        println!();
    }
}
