// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Docker Engine adapter built on `bollard`.

use super::{
    BoxReader, ContainerEngine, ContainerStreams, CreatedContainer, EngineError, ProgressStream,
};
use async_trait::async_trait;
use bollard::container::{
    AttachContainerOptions, AttachContainerResults, Config, CreateContainerOptions, LogOutput,
    RemoveContainerOptions, StartContainerOptions, StopContainerOptions,
};
use bollard::image::{CommitContainerOptions, CreateImageOptions};
use bollard::models::{CreateImageInfo, HostConfig};
use bollard::Docker;
use dh_core::{CommitSpec, ContainerId, ContainerSpec, ImageName, ProgressEvent};
use futures_util::{Stream, StreamExt};
use std::collections::HashMap;
use std::time::Duration;
use tokio::io::{AsyncWriteExt, DuplexStream};

/// Connection timeout for socket and HTTP transports, in seconds
const CONNECT_TIMEOUT_SECS: u64 = 120;

/// In-memory buffer per demultiplexed stream
const PIPE_CAPACITY: usize = 64 * 1024;

/// Default grace period before the engine kills a stopping container
pub const DEFAULT_STOP_TIMEOUT: Duration = Duration::from_secs(10);

/// Container engine backed by a Docker daemon
#[derive(Clone)]
pub struct DockerEngine {
    docker: Docker,
    stop_timeout: Duration,
}

impl DockerEngine {
    /// Connect to the daemon at `host`, or to the local default socket.
    ///
    /// Accepts `unix://` paths and `tcp://`/`http://` addresses. Connecting
    /// does not contact the daemon; the first request does.
    pub fn connect(host: Option<&str>) -> Result<Self, EngineError> {
        let docker = match host {
            None => Docker::connect_with_local_defaults(),
            Some(host) if host.starts_with("unix://") || host.starts_with('/') => {
                Docker::connect_with_socket(
                    host,
                    CONNECT_TIMEOUT_SECS,
                    bollard::API_DEFAULT_VERSION,
                )
            }
            Some(host) => {
                Docker::connect_with_http(host, CONNECT_TIMEOUT_SECS, bollard::API_DEFAULT_VERSION)
            }
        }
        .map_err(|e| EngineError::Engine(format!("connect failed: {e}")))?;

        Ok(Self { docker, stop_timeout: DEFAULT_STOP_TIMEOUT })
    }

    pub fn with_stop_timeout(mut self, timeout: Duration) -> Self {
        self.stop_timeout = timeout;
        self
    }
}

/// Map a bollard error, turning HTTP 404 into `ContainerNotFound`.
pub(crate) fn classify(id: &str, err: bollard::errors::Error) -> EngineError {
    match err {
        bollard::errors::Error::DockerResponseServerError { status_code: 404, .. } => {
            EngineError::ContainerNotFound(id.to_string())
        }
        other => EngineError::Engine(other.to_string()),
    }
}

fn to_u64(value: Option<i64>) -> u64 {
    value.and_then(|v| u64::try_from(v).ok()).unwrap_or(0)
}

/// Map one pull progress record to a `ProgressEvent`.
///
/// Records carrying an error become `Error` events whose status is the
/// engine's error message.
pub(crate) fn progress_event(info: CreateImageInfo) -> ProgressEvent {
    let error = info.error_detail.and_then(|d| d.message).or(info.error);
    if let Some(message) = error {
        return ProgressEvent::error(message);
    }

    let (current, total) = match info.progress_detail {
        Some(detail) => (to_u64(detail.current), to_u64(detail.total)),
        None => (0, 0),
    };
    let status = match info.id {
        Some(layer) if !layer.is_empty() => {
            format!("{}: {}", layer, info.status.unwrap_or_default())
        }
        _ => info.status.unwrap_or_default(),
    };
    ProgressEvent::ok(status)
        .with_progress(current, total)
        .with_detail(info.progress.unwrap_or_default())
}

async fn forward(pipe: &mut Option<DuplexStream>, bytes: &[u8]) {
    let Some(writer) = pipe.as_mut() else {
        return;
    };
    if writer.write_all(bytes).await.is_err() {
        // Reader side closed; discard the rest of this stream
        *pipe = None;
    }
}

/// Split an attach output stream into stdout and stderr pipes.
///
/// Runs until the stream ends, fails, or both readers are gone. Dropping
/// the write halves gives each reader EOF.
pub(crate) async fn demux<S>(
    id: String,
    mut output: S,
    mut stdout: Option<DuplexStream>,
    mut stderr: Option<DuplexStream>,
) where
    S: Stream<Item = Result<LogOutput, bollard::errors::Error>> + Unpin,
{
    while stdout.is_some() || stderr.is_some() {
        match output.next().await {
            Some(Ok(LogOutput::StdOut { message })) | Some(Ok(LogOutput::Console { message })) => {
                forward(&mut stdout, &message).await;
            }
            Some(Ok(LogOutput::StdErr { message })) => {
                forward(&mut stderr, &message).await;
            }
            Some(Ok(LogOutput::StdIn { .. })) => {}
            Some(Err(e)) => {
                tracing::debug!(container_id = %id, error = %e, "attach stream failed");
                break;
            }
            None => break,
        }
    }
}

#[async_trait]
impl ContainerEngine for DockerEngine {
    fn pull_image<'a>(&'a self, image: &ImageName) -> ProgressStream<'a> {
        let options = CreateImageOptions {
            from_image: image.repository().to_string(),
            tag: image.pull_tag().to_string(),
            ..Default::default()
        };
        let name = image.to_string();
        self.docker
            .create_image(Some(options), None, None)
            .map(move |item| {
                item.map(progress_event)
                    .map_err(|e| EngineError::Engine(format!("pull {name} failed: {e}")))
            })
            .boxed()
    }

    async fn create_container(
        &self,
        spec: &ContainerSpec,
    ) -> Result<CreatedContainer, EngineError> {
        let binds: Vec<String> = spec.binds.iter().map(|b| b.to_bind()).collect();
        let volumes: HashMap<String, HashMap<(), ()>> =
            spec.volume_paths().map(|path| (path, HashMap::new())).collect();
        let config = Config {
            image: Some(spec.image.to_string()),
            cmd: Some(spec.command.clone()),
            attach_stdin: Some(spec.attach_stdin),
            attach_stdout: Some(spec.attach_stdout),
            attach_stderr: Some(spec.attach_stderr),
            open_stdin: Some(spec.open_stdin),
            stdin_once: Some(spec.stdin_once),
            tty: Some(spec.tty),
            volumes: if volumes.is_empty() { None } else { Some(volumes) },
            host_config: Some(HostConfig {
                binds: if binds.is_empty() { None } else { Some(binds) },
                ..Default::default()
            }),
            ..Default::default()
        };

        let response = self
            .docker
            .create_container(None::<CreateContainerOptions<String>>, config)
            .await
            .map_err(|e| EngineError::Engine(e.to_string()))?;

        Ok(CreatedContainer { id: ContainerId::new(response.id), warnings: response.warnings })
    }

    async fn attach_container(&self, id: &ContainerId) -> Result<ContainerStreams, EngineError> {
        let options = AttachContainerOptions::<String> {
            stdin: Some(true),
            stdout: Some(true),
            stderr: Some(true),
            stream: Some(true),
            logs: Some(true),
            detach_keys: None,
        };
        let AttachContainerResults { output, input } = self
            .docker
            .attach_container(id.as_str(), Some(options))
            .await
            .map_err(|e| classify(id.as_str(), e))?;

        let (stdout_tx, stdout_rx) = tokio::io::duplex(PIPE_CAPACITY);
        let (stderr_tx, stderr_rx) = tokio::io::duplex(PIPE_CAPACITY);
        tokio::spawn(demux(id.to_string(), output, Some(stdout_tx), Some(stderr_tx)));

        let stdout: BoxReader = Box::new(stdout_rx);
        let stderr: BoxReader = Box::new(stderr_rx);
        Ok(ContainerStreams { stdin: Box::new(input), stdout, stderr })
    }

    async fn start_container(&self, id: &ContainerId) -> Result<(), EngineError> {
        self.docker
            .start_container(id.as_str(), None::<StartContainerOptions<String>>)
            .await
            .map_err(|e| classify(id.as_str(), e))
    }

    async fn stop_container(&self, id: &ContainerId) -> Result<(), EngineError> {
        let t = i64::try_from(self.stop_timeout.as_secs()).unwrap_or(i64::MAX);
        let options = StopContainerOptions { t };
        match self.docker.stop_container(id.as_str(), Some(options)).await {
            Ok(()) => Ok(()),
            // 304: already stopped
            Err(bollard::errors::Error::DockerResponseServerError { status_code: 304, .. }) => {
                Ok(())
            }
            Err(e) => Err(classify(id.as_str(), e)),
        }
    }

    async fn commit_container(
        &self,
        id: &ContainerId,
        commit: &CommitSpec,
    ) -> Result<(), EngineError> {
        let options = CommitContainerOptions {
            container: id.to_string(),
            repo: commit.repository.clone(),
            tag: commit.tag.clone(),
            author: commit.author.clone(),
            pause: false,
            ..Default::default()
        };
        self.docker
            .commit_container(options, Config::<String>::default())
            .await
            .map(|_| ())
            .map_err(|e| classify(id.as_str(), e))
    }

    async fn remove_container(&self, id: &ContainerId) -> Result<(), EngineError> {
        let options = RemoveContainerOptions { v: true, force: true, ..Default::default() };
        self.docker
            .remove_container(id.as_str(), Some(options))
            .await
            .map_err(|e| classify(id.as_str(), e))
    }
}

#[cfg(test)]
#[path = "docker_tests.rs"]
mod tests;
