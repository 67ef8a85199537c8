// SPDX-FileCopyrightText: 2026 GSI Helmholtzzentrum f. Schwerionenforschung GmbH, Darmstadt, Germany
// SPDX-License-Identifier: LGPL-3.0-or-later

use std::io;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod hypervisor;
mod runner;
mod sampler;

use runner::ShellRunner;
use sampler::remote::DEFAULT_PIPELINE;
use sampler::{Sampler, SamplerConfig};

#[derive(Parser, Debug)]
#[command(name = "vmload")]
#[command(about = "Sample the CPU load of every running virtual machine over ssh")]
#[command(version)]
struct Args {
    /// virsh program used to list running guests
    #[arg(long, default_value = "virsh")]
    virsh: String,

    /// libvirt connection URI (e.g. qemu:///system)
    #[arg(short, long)]
    connect: Option<String>,

    /// ssh program used to reach the guests
    #[arg(long, default_value = "ssh")]
    ssh: String,

    /// Remote login user
    #[arg(short, long)]
    user: Option<String>,

    /// Command run on each guest
    #[arg(long, default_value = DEFAULT_PIPELINE)]
    pipeline: String,

    /// Give up on a guest after this many seconds (default: wait forever)
    #[arg(short, long)]
    timeout: Option<u64>,

    /// Append user + system + steal to each line
    #[arg(long)]
    with_load: bool,

    /// Increase log verbosity on stderr (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Args {
    fn into_config(self) -> SamplerConfig {
        SamplerConfig {
            virsh: self.virsh,
            connect: self.connect,
            ssh: self.ssh,
            user: self.user,
            pipeline: self.pipeline,
            timeout: self.timeout.map(Duration::from_secs),
            with_load: self.with_load,
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let rt = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;

    let sampler = Sampler::new(Arc::new(ShellRunner::new()), args.into_config());
    let stdout = Arc::new(Mutex::new(io::stdout()));
    rt.block_on(sampler.run(stdout));

    Ok(())
}

/// Logs go to stderr; stdout carries only sample lines
fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}
