// Downloads a course's activities into the local tree. Each activity is
// handled on its own: an existing activity directory is left alone unless
// `force` is set, and nothing is rolled back if a write fails midway.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use indicatif::ProgressBar;
use tracing::{debug, info, warn};

use crate::api::{ApiClient, Transport};
use crate::error::Result;
use crate::models::{find_course, Activity};
use crate::secrets::SecretStore;
use crate::workspace::{
    activity_dir, category_dir, course_dir, ensure_marker, write_marker, Marker,
    ACTIVITY_DESCRIPTION_FILE, CATEGORY_DESCRIPTION_FILE,
};

const SOURCE_EXTENSIONS: &[&str] = &[
    "py", "c", "h", "cpp", "hpp", "cc", "java", "go", "rs", "js", "ts", "rb", "hs", "kt", "cs",
    "sql", "sh",
];

#[derive(Debug, Clone, Copy, Default)]
pub struct FetchOptions {
    /// Overwrite activities that already exist on disk.
    pub force: bool,
    /// Log and count a failing activity instead of aborting the batch.
    pub keep_going: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FetchReport {
    pub saved: usize,
    pub updated: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl FetchReport {
    pub fn total(&self) -> usize {
        self.saved + self.updated + self.skipped + self.failed
    }

    fn record(&mut self, outcome: ActivityOutcome) {
        match outcome {
            ActivityOutcome::Saved => self.saved += 1,
            ActivityOutcome::Updated => self.updated += 1,
            ActivityOutcome::Skipped => self.skipped += 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivityOutcome {
    Saved,
    Updated,
    Skipped,
}

pub struct Materializer {
    root: PathBuf,
    progress: ProgressBar,
}

impl Materializer {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Materializer {
            root: root.into(),
            progress: ProgressBar::hidden(),
        }
    }

    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = progress;
        self
    }

    /// Fetches every activity of `course_id` into the local tree.
    pub fn fetch_course<T: Transport, S: SecretStore>(
        &self,
        api: &mut ApiClient<T, S>,
        course_id: u64,
        options: FetchOptions,
    ) -> Result<FetchReport> {
        info!(course_id, "fetching course");
        let course = Arc::new(find_course(api.fetch_courses()?, course_id)?);
        let activities = api.fetch_activities(&course)?;
        info!(course = %course.name, count = activities.len(), "found activities");

        self.progress.set_length(activities.len() as u64);
        let mut report = FetchReport::default();
        for activity in &activities {
            match self.save_activity(api, activity, options.force) {
                Ok(outcome) => report.record(outcome),
                Err(e) if options.keep_going => {
                    warn!(activity = %activity.name, error = %e, "activity failed, continuing");
                    report.failed += 1;
                }
                Err(e) => {
                    self.progress.abandon();
                    return Err(e);
                }
            }
            self.progress.set_message(activity.name.clone());
            self.progress.inc(1);
        }
        self.progress.finish_and_clear();

        info!(
            saved = report.saved,
            updated = report.updated,
            skipped = report.skipped,
            failed = report.failed,
            "course fetched"
        );
        Ok(report)
    }

    /// Materializes one activity from the course listing.
    pub fn save_activity<T: Transport, S: SecretStore>(
        &self,
        api: &mut ApiClient<T, S>,
        activity: &Activity,
        force: bool,
    ) -> Result<ActivityOutcome> {
        let dir = activity_dir(&self.root, activity);
        let existed = dir.exists();
        if existed && !force {
            debug!(path = %dir.display(), "skipped, already exists");
            return Ok(ActivityOutcome::Skipped);
        }
        let course_dir = course_dir(&self.root, activity);
        let category_dir = category_dir(&self.root, activity);

        // Everything remote is fetched before the first directory is created.
        let activity = Arc::new(api.fetch_activity_info(activity)?);
        let files = source_files(self.code_files(api, &activity)?);

        fs::create_dir_all(&dir)?;
        ensure_marker(&course_dir, &Marker::Course(activity.course.metadata()))?;
        ensure_marker(&category_dir, &Marker::Category(activity.category.metadata()))?;
        fs::write(
            category_dir.join(CATEGORY_DESCRIPTION_FILE),
            &activity.category.description,
        )?;

        write_marker(&dir, &Marker::Activity(activity.metadata()))?;
        fs::write(dir.join(ACTIVITY_DESCRIPTION_FILE), &activity.description)?;
        for (name, content) in &files {
            fs::write(dir.join(name), content)?;
        }
        if let Some(tests) = &activity.activity_unit_tests {
            fs::write(dir.join(unit_test_file_name(&activity.language)), tests)?;
        }

        debug!(path = %dir.display(), files = files.len(), "activity saved");
        Ok(if existed {
            ActivityOutcome::Updated
        } else {
            ActivityOutcome::Saved
        })
    }

    /// Files of the latest submission if the activity was attempted,
    /// otherwise the starter files.
    fn code_files<T: Transport, S: SecretStore>(
        &self,
        api: &mut ApiClient<T, S>,
        activity: &Arc<Activity>,
    ) -> Result<BTreeMap<String, String>> {
        if activity.submission_status.is_some() {
            let latest = api
                .fetch_submissions(activity)?
                .into_iter()
                .max_by_key(|submission| submission.id);
            match latest {
                Some(submission) => match submission.submission_file_id {
                    Some(file_id) => {
                        debug!(submission = submission.id, "using latest submission files");
                        return api.fetch_files(file_id);
                    }
                    None => warn!(
                        submission = submission.id,
                        "latest submission has no files, using starter files"
                    ),
                },
                None => debug!(activity = activity.id, "no submissions listed, using starter files"),
            }
        }
        api.fetch_files(activity.file_id)
    }
}

/// Keeps only plain file names with a known source extension.
fn source_files(files: BTreeMap<String, String>) -> BTreeMap<String, String> {
    files
        .into_iter()
        .filter(|(name, _)| is_source_file(name))
        .collect()
}

fn is_source_file(name: &str) -> bool {
    let path = Path::new(name);
    if path.components().count() != 1 {
        return false;
    }
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| SOURCE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

/// Name of the unit-test file for an activity language such as `PYTHON3`
/// or `c_std11`.
pub fn unit_test_file_name(language: &str) -> &'static str {
    let language = language.to_ascii_lowercase();
    if language.starts_with("python") {
        "unit_test.py"
    } else if language.starts_with("cpp") || language.starts_with("c++") {
        "unit_test.cpp"
    } else if language.starts_with("java") {
        "unit_test.java"
    } else if language.starts_with("go") {
        "unit_test.go"
    } else if language == "c" || language.starts_with("c_") {
        "unit_test.c"
    } else {
        "unit_test.txt"
    }
}
