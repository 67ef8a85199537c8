// SPDX-FileCopyrightText: 2026 GSI Helmholtzzentrum f. Schwerionenforschung GmbH, Darmstadt, Germany
// SPDX-License-Identifier: LGPL-3.0-or-later

//! Scripted runner used in tests to stand in for virsh and ssh.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::Notify;

use super::{CommandOutput, CommandRunner, ExecutionError};

/// What the fake does when a command matches a rule
pub enum FakeResponse {
    Output { stdout: String, stderr: String },
    Exit { code: i32, stderr: String },
    /// Block until the gate is notified, then return the output
    Hang { gate: Arc<Notify>, output: String },
    Panic,
}

impl FakeResponse {
    pub fn output(stdout: &str) -> Self {
        Self::output_with_stderr(stdout, "")
    }

    /// Successful exit that also wrote to stderr
    pub fn output_with_stderr(stdout: &str, stderr: &str) -> Self {
        FakeResponse::Output {
            stdout: stdout.to_string(),
            stderr: stderr.to_string(),
        }
    }

    pub fn exit(code: i32, stderr: &str) -> Self {
        FakeResponse::Exit {
            code,
            stderr: stderr.to_string(),
        }
    }

    pub fn hang(gate: Arc<Notify>, output: &str) -> Self {
        FakeResponse::Hang {
            gate,
            output: output.to_string(),
        }
    }
}

/// Answers each command with the first rule whose pattern it contains.
/// Unmatched commands fail like a missing program.
#[derive(Default)]
pub struct FakeRunner {
    rules: Vec<(String, FakeResponse)>,
    calls: Mutex<Vec<String>>,
}

impl FakeRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on(mut self, pattern: &str, response: FakeResponse) -> Self {
        self.rules.push((pattern.to_string(), response));
        self
    }

    /// Commands seen so far, in call order
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl CommandRunner for FakeRunner {
    async fn run(&self, command: &str) -> Result<CommandOutput, ExecutionError> {
        self.calls.lock().unwrap().push(command.to_string());

        let response = self
            .rules
            .iter()
            .find(|(pattern, _)| command.contains(pattern.as_str()))
            .map(|(_, response)| response);

        match response {
            Some(FakeResponse::Output { stdout, stderr }) => Ok(CommandOutput {
                stdout: stdout.clone(),
                stderr: stderr.clone(),
            }),
            Some(FakeResponse::Exit { code, stderr }) => Err(ExecutionError::NonZeroExit {
                command: command.to_string(),
                code: Some(*code),
                stderr: stderr.clone(),
            }),
            Some(FakeResponse::Hang { gate, output }) => {
                gate.notified().await;
                Ok(CommandOutput {
                    stdout: output.clone(),
                    stderr: String::new(),
                })
            }
            Some(FakeResponse::Panic) => panic!("scripted panic for `{}`", command),
            None => Err(ExecutionError::NonZeroExit {
                command: command.to_string(),
                code: Some(127),
                stderr: "command not found".to_string(),
            }),
        }
    }
}
