//! Job API transport.

use super::Direction;
use crate::error::{MedicError, Result};
use reqwest::Url;
use reqwest::blocking::Client;
use reqwest::header::ACCEPT;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde_json::{Map, Value};
use std::time::Duration;

/// Remote job-queue API.
///
/// The reconciler only talks to the service through this trait so it can
/// be driven by an in-memory fake.
pub trait JobApi {
    /// Read the full job map in one request.
    fn fetch_jobs(&self) -> Result<Map<String, Value>>;

    /// Send `direction` as a command to a single job.
    fn send_command(&self, job: &str, direction: Direction) -> Result<()>;
}

#[derive(Debug, Serialize)]
struct CommandBody {
    command: &'static str,
    force: bool,
}

/// HTTP implementation authenticated with an `x-api-key` header.
pub struct HttpJobApi {
    client: Client,
    server: String,
    api_key: SecretString,
}

impl HttpJobApi {
    /// `server` must already be normalised (no trailing `/` or `/api`).
    pub fn new(server: impl Into<String>, api_key: SecretString, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| MedicError::Transport(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            server: server.into(),
            api_key,
        })
    }

    fn jobs_url(&self) -> String {
        format!("{}/api/jobs", self.server)
    }

    /// `{server}/api/jobs/{job}` with the job name percent-encoded.
    fn job_url(&self, job: &str) -> Result<Url> {
        let mut url = Url::parse(&self.jobs_url()).map_err(|e| {
            MedicError::Config(format!("invalid server URL '{}': {}", self.server, e))
        })?;
        url.path_segments_mut()
            .map_err(|_| {
                MedicError::Config(format!("server URL '{}' cannot take a path", self.server))
            })?
            .push(job);
        Ok(url)
    }
}

impl JobApi for HttpJobApi {
    fn fetch_jobs(&self) -> Result<Map<String, Value>> {
        let url = self.jobs_url();
        tracing::debug!(%url, "fetching job snapshot");

        let jobs = self
            .client
            .get(&url)
            .header("x-api-key", self.api_key.expose_secret())
            .header(ACCEPT, "application/json")
            .send()?
            .error_for_status()?
            .json::<Map<String, Value>>()?;

        Ok(jobs)
    }

    fn send_command(&self, job: &str, direction: Direction) -> Result<()> {
        let url = self.job_url(job)?;
        tracing::debug!(%url, command = direction.as_str(), "sending job command");

        self.client
            .put(url)
            .header("x-api-key", self.api_key.expose_secret())
            .header(ACCEPT, "application/json")
            .json(&CommandBody {
                command: direction.as_str(),
                force: false,
            })
            .send()?
            .error_for_status()?;

        Ok(())
    }
}
