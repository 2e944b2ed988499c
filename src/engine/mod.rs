//! Local engine lookups via the `docker` CLI.
//!
//! The shell already wraps the `docker` binary for execution, so resource
//! lookups go through the same binary with `--format` templates instead of a
//! full engine SDK. Every lookup is bounded by a short timeout and absorbs
//! failure into an empty result; only the startup health check propagates an
//! error.

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::debug;

/// Timeout applied to every engine call.
pub const ENGINE_TIMEOUT: Duration = Duration::from_secs(2);

const CONTAINER_FORMAT: &str = "{{.ID}}\t{{.Image}}";
const IMAGE_FORMAT: &str = "{{.ID}}\t{{.Repository}}:{{.Tag}}";
const SEARCH_FORMAT: &str = "{{.Name}}\t{{.IsOfficial}}\t{{.Description}}";
const PORT_FORMAT: &str =
    "{{if .RepoTags}}{{index .RepoTags 0}}{{else}}{{.Id}}{{end}}\t{{json .Config.ExposedPorts}}";

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("docker binary not found: {0}")]
    NotFound(#[from] which::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("engine call timed out after {0:?}")]
    Timeout(Duration),
    #[error("docker exited with {status}: {stderr}")]
    Failed { status: i32, stderr: String },
}

/// Which local resource to list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Containers,
    Images,
}

/// One local resource: the id to insert and a label to display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resource {
    pub id: String,
    pub label: String,
}

/// One image search hit, from the engine or from the Hub catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchHit {
    pub name: String,
    pub official: bool,
    pub description: String,
}

/// An exposed port advertised by a local image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortHint {
    pub port: String,
    pub proto: String,
    pub image: String,
}

/// Lookup surface the completion pipeline depends on. Implementations must
/// degrade to empty results on failure; the pipeline never sees an error.
#[async_trait]
pub trait ResourceLookup: Send + Sync {
    async fn list_resources(&self, kind: ResourceKind, all: bool) -> Vec<Resource>;
    async fn search_images(&self, query: &str, limit: usize) -> Vec<SearchHit>;
    async fn exposed_ports(&self) -> Vec<PortHint>;
}

/// Engine client shelling out to the `docker` CLI.
pub struct EngineClient {
    binary: PathBuf,
    timeout: Duration,
}

impl EngineClient {
    /// Locate the `docker` binary on PATH.
    pub fn discover() -> Result<Self, EngineError> {
        let binary = which::which("docker")?;
        Ok(Self {
            binary,
            timeout: ENGINE_TIMEOUT,
        })
    }

    pub fn with_binary(binary: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            binary: binary.into(),
            timeout,
        }
    }

    pub fn binary(&self) -> &PathBuf {
        &self.binary
    }

    /// Health check: the shell refuses to start if the engine is unreachable.
    pub async fn ping(&self) -> Result<String, EngineError> {
        let version = self
            .run(&["version", "--format", "{{.Server.Version}}"])
            .await?;
        Ok(version.trim().to_string())
    }

    async fn run(&self, args: &[&str]) -> Result<String, EngineError> {
        let output = timeout(
            self.timeout,
            Command::new(&self.binary).args(args).output(),
        )
        .await
        .map_err(|_| EngineError::Timeout(self.timeout))??;

        if !output.status.success() {
            return Err(EngineError::Failed {
                status: output.status.code().unwrap_or(-1),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

#[async_trait]
impl ResourceLookup for EngineClient {
    async fn list_resources(&self, kind: ResourceKind, all: bool) -> Vec<Resource> {
        let mut args: Vec<&str> = match kind {
            ResourceKind::Containers => vec!["ps", "--format", CONTAINER_FORMAT],
            ResourceKind::Images => vec!["images", "--format", IMAGE_FORMAT],
        };
        if all {
            args.push("--all");
        }
        match self.run(&args).await {
            Ok(out) => parse_list_output(&out),
            Err(err) => {
                debug!(%err, ?kind, "resource listing failed");
                Vec::new()
            }
        }
    }

    async fn search_images(&self, query: &str, limit: usize) -> Vec<SearchHit> {
        let limit = limit.to_string();
        let args = [
            "search",
            "--limit",
            limit.as_str(),
            "--format",
            SEARCH_FORMAT,
            query,
        ];
        match self.run(&args).await {
            Ok(out) => parse_search_output(&out),
            Err(err) => {
                debug!(%err, query, "image search failed");
                Vec::new()
            }
        }
    }

    async fn exposed_ports(&self) -> Vec<PortHint> {
        let ids = match self.run(&["images", "-q"]).await {
            Ok(out) => {
                let mut ids: Vec<String> =
                    out.lines().map(|l| l.trim().to_string()).filter(|l| !l.is_empty()).collect();
                ids.sort();
                ids.dedup();
                ids
            }
            Err(err) => {
                debug!(%err, "image id listing failed");
                return Vec::new();
            }
        };
        if ids.is_empty() {
            return Vec::new();
        }

        let mut args: Vec<&str> = vec!["image", "inspect", "--format", PORT_FORMAT];
        args.extend(ids.iter().map(String::as_str));
        match self.run(&args).await {
            Ok(out) => parse_port_lines(&out),
            Err(err) => {
                debug!(%err, "image inspect failed");
                Vec::new()
            }
        }
    }
}

/// Parse `id<TAB>label` lines. Lines without a tab keep the id as label.
pub fn parse_list_output(out: &str) -> Vec<Resource> {
    out.lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| match line.split_once('\t') {
            Some((id, label)) => Resource {
                id: id.trim().to_string(),
                label: label.trim().to_string(),
            },
            None => Resource {
                id: line.trim().to_string(),
                label: line.trim().to_string(),
            },
        })
        .collect()
}

/// Parse `name<TAB>official<TAB>description` lines. `docker search` renders
/// the official marker as `[OK]` or an empty cell.
pub fn parse_search_output(out: &str) -> Vec<SearchHit> {
    out.lines()
        .filter(|line| !line.trim().is_empty())
        .filter_map(|line| {
            let mut fields = line.splitn(3, '\t');
            let name = fields.next()?.trim();
            if name.is_empty() {
                return None;
            }
            let official = fields.next().map(str::trim).unwrap_or("");
            let description = fields.next().map(str::trim).unwrap_or("");
            Some(SearchHit {
                name: name.to_string(),
                official: official == "[OK]" || official == "true",
                description: description.to_string(),
            })
        })
        .collect()
}

/// Parse `image<TAB>{"80/tcp":{}}` lines from `docker image inspect`.
pub fn parse_port_lines(out: &str) -> Vec<PortHint> {
    let mut hints = Vec::new();
    for line in out.lines() {
        let Some((image, json)) = line.split_once('\t') else {
            continue;
        };
        let Ok(Value::Object(map)) = serde_json::from_str::<Value>(json.trim()) else {
            continue;
        };
        for key in map.keys() {
            let (port, proto) = match key.split_once('/') {
                Some((p, t)) => (p, t),
                None => (key.as_str(), "tcp"),
            };
            hints.push(PortHint {
                port: port.to_string(),
                proto: proto.to_string(),
                image: image.trim().to_string(),
            });
        }
    }
    hints
}
