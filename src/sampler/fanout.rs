// SPDX-FileCopyrightText: 2026 GSI Helmholtzzentrum f. Schwerionenforschung GmbH, Darmstadt, Germany
// SPDX-License-Identifier: LGPL-3.0-or-later

//! Fan-out/fan-in driver.
//!
//! Discovery runs first; then one tokio task per discovered VM runs the
//! remote sample and prints its line as soon as it is done. The driver keeps
//! every handle and awaits all of them before returning, so a session that
//! never returns keeps the run pending unless a timeout was configured.

use std::io::Write;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::load::CpuReadings;
use super::remote::{remote_command, DEFAULT_PIPELINE};
use crate::hypervisor::{list_command, list_running, Target};
use crate::runner::{CommandOutput, CommandRunner, ExecutionError};

/// Everything a run needs besides the runner
#[derive(Debug, Clone)]
pub struct SamplerConfig {
    /// virsh program
    pub virsh: String,
    /// libvirt connection URI passed as `--connect`
    pub connect: Option<String>,
    /// ssh program
    pub ssh: String,
    /// Remote login user, `None` leaves it to the ssh config
    pub user: Option<String>,
    /// Command run on every guest
    pub pipeline: String,
    /// Per-task limit; `None` waits forever
    pub timeout: Option<Duration>,
    /// Append user + system + last field to each line
    pub with_load: bool,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            virsh: "virsh".to_string(),
            connect: None,
            ssh: "ssh".to_string(),
            user: None,
            pipeline: DEFAULT_PIPELINE.to_string(),
            timeout: None,
            with_load: false,
        }
    }
}

/// Counters for one run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub discovered: usize,
    pub spawned: usize,
    pub sampled: usize,
    pub failed: usize,
}

#[derive(Clone)]
pub struct Sampler {
    runner: Arc<dyn CommandRunner>,
    config: Arc<SamplerConfig>,
}

impl Sampler {
    pub fn new(runner: Arc<dyn CommandRunner>, config: SamplerConfig) -> Self {
        Self {
            runner,
            config: Arc::new(config),
        }
    }

    /// Discover running VMs, sample each one concurrently and wait for all
    /// of them. Sample lines go to `out` in completion order.
    pub async fn run<W>(&self, out: Arc<Mutex<W>>) -> RunSummary
    where
        W: Write + Send + 'static,
    {
        let command = list_command(&self.config.virsh, self.config.connect.as_deref());
        let targets = match list_running(self.runner.as_ref(), &command).await {
            Ok(targets) => targets,
            Err(e) => {
                warn!("{:#}", e);
                return RunSummary::default();
            }
        };

        let mut summary = RunSummary {
            discovered: targets.len(),
            ..Default::default()
        };

        let tasks = self.spawn_tasks(targets, &out);
        summary.spawned = tasks.len();

        for (target, handle) in tasks {
            match handle.await {
                Ok(Ok(())) => summary.sampled += 1,
                // Already logged by the task
                Ok(Err(_)) => summary.failed += 1,
                Err(e) => {
                    warn!(target = %target, "sample task aborted: {}", e);
                    summary.failed += 1;
                }
            }
        }

        info!(
            discovered = summary.discovered,
            spawned = summary.spawned,
            sampled = summary.sampled,
            failed = summary.failed,
            "sampling finished"
        );
        summary
    }

    /// Spawn one sample task per target. Handles come back most recently
    /// spawned first, which is the order they are joined in.
    fn spawn_tasks<W>(&self, targets: Vec<Target>, out: &Arc<Mutex<W>>) -> Vec<(Target, JoinHandle<Result<()>>)>
    where
        W: Write + Send + 'static,
    {
        let mut tasks = Vec::with_capacity(targets.len());
        for target in targets {
            debug!(target = %target, "spawning sample task");
            let handle = tokio::spawn(sample_target(
                self.runner.clone(),
                self.config.clone(),
                target.clone(),
                out.clone(),
            ));
            tasks.insert(0, (target, handle));
        }
        tasks
    }
}

/// One sample task. Every failure is logged here, when it happens.
async fn sample_target<W>(
    runner: Arc<dyn CommandRunner>,
    config: Arc<SamplerConfig>,
    target: Target,
    out: Arc<Mutex<W>>,
) -> Result<()>
where
    W: Write + Send + 'static,
{
    let result = sample_and_print(runner.as_ref(), &config, &target, &out).await;
    if let Err(e) = &result {
        warn!(target = %target, "sampling failed: {:#}", e);
    }
    result
}

/// Run the remote command and print `<name> <sample>`
async fn sample_and_print<W>(
    runner: &dyn CommandRunner,
    config: &SamplerConfig,
    target: &Target,
    out: &Mutex<W>,
) -> Result<()>
where
    W: Write + Send,
{
    let command = remote_command(&config.ssh, config.user.as_deref(), target, &config.pipeline);
    let output = run_with_timeout(runner, &command, config.timeout).await?;

    let line = format_line(target, &output.combined(), config.with_load);

    let mut out = out.lock().map_err(|_| anyhow!("output lock poisoned"))?;
    writeln!(out, "{}", line).context("Failed to write sample line")?;
    out.flush().context("Failed to flush sample line")?;
    Ok(())
}

async fn run_with_timeout(
    runner: &dyn CommandRunner,
    command: &str,
    timeout: Option<Duration>,
) -> Result<CommandOutput, ExecutionError> {
    match timeout {
        Some(after) => tokio::time::timeout(after, runner.run(command))
            .await
            .map_err(|_| ExecutionError::TimedOut {
                command: command.to_string(),
                after,
            })?,
        None => runner.run(command).await,
    }
}

fn format_line(target: &Target, sample: &str, with_load: bool) -> String {
    let sample = sample.trim_end_matches(['\n', '\r']);
    let mut line = format!("{} {}", target, sample);

    if with_load {
        if let Some(readings) = CpuReadings::parse(sample) {
            line.push_str(&format!(" {:.2}", readings.total_load()));
        }
    }
    line
}
