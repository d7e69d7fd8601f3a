// On-disk layout of downloaded courses:
//
//   <root>/<course>/.myrpl                       course marker
//   <root>/<course>/<category>/.myrpl            category marker
//   <root>/<course>/<category>/description.txt
//   <root>/<course>/<category>/<activity>/.myrpl activity marker
//   <root>/<course>/<category>/<activity>/description.md, sources, unit test
//
// Markers are small TOML files identifying what a directory holds, so
// later commands run from inside an activity know which one it is.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::models::{Activity, ActivityMetadata, CategoryMetadata, CourseMetadata};

pub const MARKER_FILE: &str = ".myrpl";
pub const ACTIVITY_DESCRIPTION_FILE: &str = "description.md";
pub const CATEGORY_DESCRIPTION_FILE: &str = "description.txt";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Marker {
    Course(CourseMetadata),
    Category(CategoryMetadata),
    Activity(ActivityMetadata),
}

/// Replaces characters that would let a server-provided name escape or
/// break the directory tree.
pub fn sanitize_component(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| match c {
            '/' | '\\' | '\0' => '_',
            c => c,
        })
        .collect();
    match cleaned.trim() {
        "" | "." | ".." => "_".to_string(),
        trimmed => trimmed.to_string(),
    }
}

pub fn course_dir(root: &Path, activity: &Activity) -> PathBuf {
    root.join(sanitize_component(&activity.course.name))
}

pub fn category_dir(root: &Path, activity: &Activity) -> PathBuf {
    course_dir(root, activity).join(sanitize_component(&activity.category.name))
}

pub fn activity_dir(root: &Path, activity: &Activity) -> PathBuf {
    category_dir(root, activity).join(sanitize_component(&activity.name))
}

pub fn write_marker(dir: &Path, marker: &Marker) -> Result<()> {
    let path = dir.join(MARKER_FILE);
    let text = toml::to_string(marker).map_err(|e| Error::Marker {
        path: path.clone(),
        reason: e.to_string(),
    })?;
    fs::write(&path, text)?;
    Ok(())
}

/// Reads the marker in `dir`, `None` when there is none.
pub fn read_marker(dir: &Path) -> Result<Option<Marker>> {
    let path = dir.join(MARKER_FILE);
    let text = match fs::read_to_string(&path) {
        Ok(text) => text,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    toml::from_str(&text).map(Some).map_err(|e| Error::Marker {
        path,
        reason: e.to_string(),
    })
}

/// Writes the marker only if `dir` has none yet. Returns whether it wrote.
pub fn ensure_marker(dir: &Path, marker: &Marker) -> Result<bool> {
    if dir.join(MARKER_FILE).exists() {
        return Ok(false);
    }
    write_marker(dir, marker)?;
    Ok(true)
}

/// An activity directory and the metadata its marker holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivityContext {
    pub dir: PathBuf,
    pub metadata: ActivityMetadata,
}

/// Walks up from `start` to the nearest directory carrying a marker, which
/// must be an activity marker.
pub fn find_activity_context(start: &Path) -> Result<ActivityContext> {
    for dir in start.ancestors() {
        match read_marker(dir)? {
            Some(Marker::Activity(metadata)) => {
                return Ok(ActivityContext {
                    dir: dir.to_path_buf(),
                    metadata,
                })
            }
            Some(_) => {
                return Err(Error::NotActivityDirectory {
                    path: start.to_path_buf(),
                })
            }
            None => continue,
        }
    }
    Err(Error::NotWorkspace {
        path: start.to_path_buf(),
    })
}
