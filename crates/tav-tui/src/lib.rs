//! Terminal UI for browsing assignment feedback reports.
//!
//! Elm-style architecture: `state` holds the data, `update` is the pure
//! reducer, `render` is the pure view, and `runtime` owns the terminal and
//! executes effects.

pub mod common;
pub mod effects;
pub mod events;
pub mod markdown;
pub mod render;
pub mod runtime;
pub mod state;
pub mod terminal;
pub mod update;

use std::io::IsTerminal;

use anyhow::Result;
use tav_core::config::Config;

use crate::runtime::TuiRuntime;

/// Runs the TUI until the user quits.
///
/// `initial_student` pre-fills the search box and submits it before the
/// first frame.
pub async fn run(config: Config, initial_student: Option<String>) -> Result<()> {
    if !std::io::stdout().is_terminal() {
        anyhow::bail!("tav requires an interactive terminal");
    }

    let mut runtime = TuiRuntime::new(config)?;
    if let Some(student_id) = initial_student {
        runtime.submit_initial_search(student_id);
    }
    runtime.run()
}
