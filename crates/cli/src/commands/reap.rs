// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `dockhand reap` - Tear down a container left behind by a dead launch

use anyhow::Result;
use clap::Args;

use dh_adapters::DockerEngine;
use dh_core::{CommitSpec, ContainerId, ImageName};
use dh_launcher::Reaper;

use super::launch::summary;
use crate::config::Config;
use crate::exit_error::ExitError;

#[derive(Args, Debug)]
pub struct ReapArgs {
    /// Container id or name
    pub container: String,

    /// Commit the container to this image before removing it
    #[arg(long, value_name = "REPO[:TAG]")]
    pub commit: Option<ImageName>,
}

pub async fn handle(args: ReapArgs, config: &Config) -> Result<()> {
    let engine = DockerEngine::connect(config.docker_host.as_deref())?
        .with_stop_timeout(config.teardown.stop_timeout());
    let reaper = Reaper::new(engine).with_commit(args.commit.map(CommitSpec::from));
    let id = ContainerId::new(args.container);

    let report = reaper.retire(&id).await;
    println!("{}: {}", id.short(), summary(&report));
    if !report.is_complete() {
        return Err(ExitError::new(1, format!("failed to reap container {}", id.short())).into());
    }
    Ok(())
}
