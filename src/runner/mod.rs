// SPDX-FileCopyrightText: 2026 GSI Helmholtzzentrum f. Schwerionenforschung GmbH, Darmstadt, Germany
// SPDX-License-Identifier: LGPL-3.0-or-later

//! Command execution seam.
//!
//! Everything that shells out goes through [`CommandRunner`], so discovery and
//! sampling can be driven by a scripted runner in tests.

pub mod shell;

#[cfg(test)]
pub mod fake;

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

pub use shell::{shell_quote, ShellRunner};

/// Failure to run an external command
#[derive(Debug, Error)]
pub enum ExecutionError {
    #[error("failed to spawn `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("`{command}` exited with {}: {stderr}", exit_label(.code))]
    NonZeroExit {
        command: String,
        code: Option<i32>,
        stderr: String,
    },

    #[error("`{command}` did not finish within {after:?}")]
    TimedOut { command: String, after: Duration },
}

fn exit_label(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("status {}", code),
        // Killed by a signal
        None => "no status".to_string(),
    }
}

/// Captured streams of a command that exited successfully
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    /// stdout followed by stderr
    pub fn combined(&self) -> String {
        let mut text = self.stdout.clone();
        text.push_str(&self.stderr);
        text
    }
}

/// Runs a shell command line and returns its captured output
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run `command` to completion.
    ///
    /// A spawn failure or a non-zero exit is an [`ExecutionError`].
    async fn run(&self, command: &str) -> Result<CommandOutput, ExecutionError>;
}
