// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `dockhand launch` - Run one agent container bridged to stdio

use std::sync::Arc;

use anyhow::Result;
use clap::Args;

use dh_adapters::{BuildLog, DockerEngine, JobLogger};
use dh_core::{CommitSpec, ContainerId, ImageName, JobId, VolumeBinding};
use dh_launcher::{AgentLauncher, LaunchRequest, ReapReport};

use crate::config::Config;
use crate::exit_error::ExitError;
use crate::interrupt::Interrupt;
use crate::stdio::StdioSink;

#[derive(Args, Debug)]
pub struct LaunchArgs {
    /// Image to run (e.g. "alpine:3.18")
    pub image: ImageName,

    /// Job id naming the build log (default: generated)
    #[arg(long)]
    pub job: Option<String>,

    /// Extra bind mount, added to the configured ones
    #[arg(long = "bind", value_name = "HOST:CONTAINER[:ro]")]
    pub binds: Vec<VolumeBinding>,

    /// Commit the container to this image during teardown
    #[arg(long, value_name = "REPO[:TAG]")]
    pub commit: Option<ImageName>,

    /// Agent command (default: the configured agent command)
    #[arg(last = true)]
    pub command: Vec<String>,
}

impl LaunchArgs {
    /// Merge the arguments with the configured agent defaults
    pub fn request(self, config: &Config) -> LaunchRequest {
        let mut binds = config.agent.binds.clone();
        binds.extend(self.binds);
        let command =
            if self.command.is_empty() { config.agent.command.clone() } else { self.command };

        let request = LaunchRequest::new(self.image).binds(binds).command(command);
        match self.commit {
            Some(image) => request.commit(CommitSpec::from(image)),
            None => request,
        }
    }
}

/// Exit code when the launch was cut short by Ctrl-C or SIGTERM
const INTERRUPTED: i32 = 130;

pub async fn handle(args: LaunchArgs, config: &Config) -> Result<()> {
    let interrupt = Interrupt::install();
    let job_id = args.job.clone().map(JobId::from_string).unwrap_or_default();
    let log = JobLogger::new(&config.log_dir, job_id.as_str());
    tracing::info!(job_id = %job_id, build_log = %log.path().display(), "launching agent");
    let log: Arc<dyn BuildLog> = Arc::new(log);

    let engine = DockerEngine::connect(config.docker_host.as_deref())?
        .with_stop_timeout(config.teardown.stop_timeout());
    let launcher =
        AgentLauncher::new(engine).with_forwarder_join(config.teardown.forwarder_join());

    let session = launcher
        .launch_agent(args.request(config), &StdioSink::new(interrupt.clone()), log)
        .await
        .map_err(|e| ExitError::new(1, format!("launch failed: {e}")))?;
    let container_id = session.container_id().clone();

    let report = session.finished().await;
    exit_status(&container_id, &report, interrupt.is_fired())
}

/// Map a finished session to the command result. Incomplete teardown wins
/// over an interrupt since it leaves something behind.
pub(crate) fn exit_status(
    container_id: &ContainerId,
    report: &ReapReport,
    interrupted: bool,
) -> Result<()> {
    if !report.is_complete() {
        return Err(ExitError::new(
            2,
            format!("teardown incomplete for container {}: {}", container_id.short(), summary(report)),
        )
        .into());
    }
    if interrupted {
        return Err(ExitError::new(INTERRUPTED, "interrupted").into());
    }
    Ok(())
}

pub(crate) fn summary(report: &ReapReport) -> String {
    let mut parts = vec![format!("stop {}", report.stop)];
    if let Some(commit) = &report.commit {
        parts.push(format!("commit {commit}"));
    }
    parts.push(format!("remove {}", report.remove));
    for detail in [Some(&report.stop), report.commit.as_ref(), Some(&report.remove)]
        .into_iter()
        .flatten()
        .filter_map(|o| o.detail())
    {
        parts.push(format!("({detail})"));
    }
    parts.join(", ")
}

#[cfg(test)]
#[path = "launch_tests.rs"]
mod tests;
