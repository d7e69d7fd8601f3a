// Command handlers behind the CLI. Each builds what it needs from the
// config, delegates to the library, and reports through `ui`.

use std::env;
use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use reqwest::StatusCode;

use crate::api::{ApiClient, Credentials, HttpTransport};
use crate::cli::Commands;
use crate::config::{Config, USER_AGENT};
use crate::error::Error;
use crate::materializer::{FetchOptions, Materializer};
use crate::models::{find_course, Activity};
use crate::runner::run_unit_tests;
use crate::secrets::{FileSecretStore, SecretStore};
use crate::ui;
use crate::workspace::find_activity_context;

pub fn execute(command: Commands, config: &Config) -> Result<()> {
    match command {
        Commands::Login => login(config),
        Commands::Fetch {
            course_id,
            token,
            force,
            keep_going,
        } => fetch(config, course_id, token, FetchOptions { force, keep_going }),
        Commands::Submit { file, description } => submit(config, &file, &description),
        Commands::Status => status(config),
        Commands::Final { submission_id } => mark_final(config, submission_id),
        Commands::Test => test(),
    }
}

fn client(config: &Config) -> Result<ApiClient> {
    let transport =
        HttpTransport::new(USER_AGENT, config.timeout).context("Failed to build HTTP client")?;
    let secrets = FileSecretStore::open(&config.secrets_path).with_context(|| {
        format!("Failed to open secret store at {}", config.secrets_path.display())
    })?;
    let mut api = ApiClient::new(transport, secrets, config.base_url.as_str());
    if let Some(token) = &config.bearer_token {
        api.set_credentials(Credentials::bearer(token.as_str()));
    }
    Ok(api)
}

fn login(config: &Config) -> Result<()> {
    let mut api = client(config)?;
    let (username, password) = ui::prompt_credentials()?;

    let spinner = ui::spinner("Logging in...")?;
    let result = api.login(&username, &password);
    spinner.finish_and_clear();
    let credentials = result.context("Login failed")?;

    let secrets = api.secrets_mut();
    secrets.store_credentials(&username, &password)?;
    secrets.store_token(&credentials.access_token)?;
    println!("Login successful. Credentials stored.");
    Ok(())
}

fn fetch(config: &Config, course_id: u64, token: Option<String>, options: FetchOptions) -> Result<()> {
    let mut api = client(config)?;
    if let Some(token) = token {
        api.set_credentials(Credentials::bearer(token));
    }

    println!(
        "Fetching course {course_id} into {}...",
        config.courses_dir.display()
    );
    let materializer =
        Materializer::new(config.courses_dir.clone()).with_progress(ui::activity_progress()?);
    let report = materializer
        .fetch_course(&mut api, course_id, options)
        .with_context(|| format!("Failed to fetch course {course_id}"))?;
    ui::print_report(course_id, &report);
    Ok(())
}

/// Resolves the activity whose directory we are in against the server.
fn current_activity(api: &mut ApiClient) -> Result<Arc<Activity>> {
    let context = find_activity_context(&env::current_dir()?)?;
    let course = Arc::new(find_course(api.fetch_courses()?, context.metadata.course.id)?);
    let activity = api.fetch_activity(&course, context.metadata.id)?;
    Ok(Arc::new(activity))
}

fn submit(config: &Config, file: &Path, description: &str) -> Result<()> {
    let mut api = client(config)?;
    let activity = current_activity(&mut api)?;

    let spinner = ui::spinner("Uploading...")?;
    let result = api.submit(&activity, file, description);
    spinner.finish_and_clear();
    let submission = result.with_context(|| format!("Failed to submit {}", file.display()))?;

    let status = submission
        .submission_status
        .map(|s| s.to_string())
        .unwrap_or_else(|| "PENDING".to_string());
    println!(
        "Submitted {} to \"{}\" as #{} ({status}). Run `myrpl status` for results.",
        file.display(),
        activity.name,
        submission.id
    );
    Ok(())
}

fn status(config: &Config) -> Result<()> {
    let mut api = client(config)?;
    let activity = current_activity(&mut api)?;

    println!("{} / {}", activity.category.name, activity.name);
    let submissions = api.fetch_submissions(&activity)?;
    ui::print_submissions(&submissions);

    match api.fetch_final_submission(&activity) {
        Ok(submission) => println!("Final submission: #{}", submission.id),
        Err(Error::HttpStatus { status, .. }) if status == StatusCode::NOT_FOUND => {
            println!("No final submission.")
        }
        Err(e) => return Err(e.into()),
    }

    if let Some(latest) = submissions.iter().max_by_key(|s| s.id) {
        let result = api.fetch_submission_result(latest)?;
        println!();
        ui::print_result(&result);
    }
    Ok(())
}

fn mark_final(config: &Config, submission_id: u64) -> Result<()> {
    let mut api = client(config)?;
    let activity = current_activity(&mut api)?;

    let submissions = api.fetch_submissions(&activity)?;
    let Some(submission) = submissions.iter().find(|s| s.id == submission_id) else {
        bail!(
            "submission {submission_id} does not belong to \"{}\"",
            activity.name
        );
    };
    let updated = api.set_final_submission(submission)?;
    println!("Submission #{} is now the final solution.", updated.id);
    Ok(())
}

fn test() -> Result<()> {
    let context = find_activity_context(&env::current_dir()?)?;
    let status = run_unit_tests(&context)?;
    if !status.success() {
        bail!("unit tests failed ({status})");
    }
    Ok(())
}
