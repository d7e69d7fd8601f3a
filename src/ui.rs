// UI layer: terminal prompts (`dialoguer`), spinners and progress bars
// (`indicatif`), and plain-text rendering of results.

use std::time::Duration;

use anyhow::Result;
use dialoguer::{Input, Password};
use indicatif::{ProgressBar, ProgressStyle};

use crate::materializer::FetchReport;
use crate::models::{Submission, SubmissionResult};

/// Asks for username/email and password.
pub fn prompt_credentials() -> Result<(String, String)> {
    let username: String = Input::new()
        .with_prompt("Enter your username or email")
        .interact_text()?;
    // `Password` hides input in the terminal.
    let password: String = Password::new().with_prompt("Enter your password").interact()?;
    Ok((username, password))
}

pub fn spinner(message: &str) -> Result<ProgressBar> {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::with_template("{spinner} {msg}")?);
    spinner.set_message(message.to_string());
    spinner.enable_steady_tick(Duration::from_millis(120));
    Ok(spinner)
}

/// Progress bar for a course fetch; the length is set once activities are known.
pub fn activity_progress() -> Result<ProgressBar> {
    let bar = ProgressBar::new(0);
    bar.set_style(
        ProgressStyle::with_template("{bar:30} {pos}/{len} activities {wide_msg}")?
            .progress_chars("=> "),
    );
    Ok(bar)
}

pub fn print_report(course_id: u64, report: &FetchReport) {
    println!(
        "Course {course_id}: {} saved, {} updated, {} skipped (already exist)",
        report.saved, report.updated, report.skipped
    );
    if report.failed > 0 {
        println!("{} activities failed, see the log for details", report.failed);
    }
}

pub fn print_submissions(submissions: &[Submission]) {
    if submissions.is_empty() {
        println!("No submissions yet.");
        return;
    }
    println!("{:>10}  {:<20}  {:<14}  final", "id", "date", "status");
    for submission in submissions {
        let date = submission
            .submission_date
            .map(|d| d.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_default();
        let status = submission
            .submission_status
            .map(|s| s.to_string())
            .unwrap_or_else(|| "-".to_string());
        let final_mark = if submission.is_final_solution { "*" } else { "" };
        println!("{:>10}  {:<20}  {:<14}  {}", submission.id, date, status, final_mark);
    }
}

pub fn print_result(result: &SubmissionResult) {
    let status = result
        .status()
        .map(|s| s.to_string())
        .unwrap_or_else(|| "-".to_string());
    println!("Submission {}: {}", result.latest.id, status);
    if result.status().is_some_and(|s| s.is_pending()) {
        println!("  still being graded, check again later");
        return;
    }
    if let Some(message) = &result.latest.exit_message {
        println!("  {message}");
    }
    let tests = result.unit_test_results();
    if !tests.is_empty() {
        println!("  {}/{} unit tests passed", result.latest.passed_tests(), tests.len());
        for test in tests {
            let mark = if test.passed { "ok  " } else { "FAIL" };
            println!("  [{mark}] {}", test.test_name);
            if let Some(error) = test.error_messages.as_deref().filter(|_| !test.passed) {
                for line in error.lines() {
                    println!("         {line}");
                }
            }
        }
    }
}
