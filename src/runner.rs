// Runs an activity's unit tests locally against the saved sources.

use std::process::{Command, ExitStatus};

use tracing::info;

use crate::error::{Error, Result};
use crate::materializer::unit_test_file_name;
use crate::workspace::ActivityContext;

/// Builds the test command for the activity, run from its directory.
pub fn unit_test_command(context: &ActivityContext) -> Result<Command> {
    let language = &context.metadata.language;
    let test_file = unit_test_file_name(language);
    let Some(module) = test_file.strip_suffix(".py") else {
        return Err(Error::UnsupportedLanguage {
            language: language.clone(),
        });
    };

    if !context.dir.join(test_file).exists() {
        return Err(Error::NotFound {
            resource: format!("{} in {}", test_file, context.dir.display()),
        });
    }

    let mut command = Command::new("python3");
    command
        .args(["-m", "unittest", "-v", module])
        .current_dir(&context.dir);
    Ok(command)
}

pub fn run_unit_tests(context: &ActivityContext) -> Result<ExitStatus> {
    let mut command = unit_test_command(context)?;
    info!(activity = %context.metadata.name, "running unit tests");
    Ok(command.status()?)
}
