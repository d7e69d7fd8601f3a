use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "myrpl", author, version, about = "CLI tool for MyRPL course activities")]
pub struct Args {
    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Log in and store credentials
    Login,

    /// Fetch and save activities for a given course ID
    Fetch {
        /// ID of the course to fetch activities from
        course_id: u64,

        /// Bearer token for authentication. Overrides MYRPL_BEARER_TOKEN and
        /// the stored token
        #[arg(short, long)]
        token: Option<String>,

        /// Overwrite activities that already exist locally
        #[arg(short, long)]
        force: bool,

        /// Continue with the remaining activities when one fails
        #[arg(long)]
        keep_going: bool,
    },

    /// Submit a file for the activity in the current directory
    Submit {
        file: PathBuf,

        #[arg(short, long, default_value = "")]
        description: String,
    },

    /// Show submissions and the latest result for the current activity
    Status,

    /// Mark one of the current activity's submissions as final
    Final { submission_id: u64 },

    /// Run the current activity's unit tests locally
    Test,
}
