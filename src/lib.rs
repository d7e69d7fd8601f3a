// Library root
// -----------
// The `myrpl` binary (`main.rs`) is a thin shell over these modules.
//
// Module responsibilities:
// - `api`: authenticated HTTP client for the MyRPL backend, with a
//   `Transport` seam and one-shot token renewal on 401.
// - `models`: typed courses, activities and submissions built from the
//   server's JSON payloads.
// - `materializer` / `workspace`: writes course activities to disk under
//   `courses/{course}/{category}/{activity}/` with `.myrpl` markers.
// - `secrets`: the credential and token store.
// - `cli`, `commands`, `ui`, `config`, `runner`: the command-line surface.
pub mod api;
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod materializer;
pub mod models;
pub mod runner;
pub mod secrets;
pub mod ui;
pub mod workspace;

#[cfg(test)]
pub(crate) mod test_support;

pub use error::{Error, Result};
