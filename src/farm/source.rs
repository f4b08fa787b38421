// (c) Meta Platforms, Inc. and affiliates.
//
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use std::io;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::farm::models::{Artifact, ArtifactCategory, Job, Project, Run, Suite};

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum FarmError {
    #[error("failed to read device farm data")]
    Io(#[from] io::Error),

    #[error("malformed device farm snapshot")]
    Snapshot(#[from] serde_json::Error),

    #[error("artifact download failed")]
    Http(#[from] reqwest::Error),

    #[error("artifact download from '{url}' returned HTTP {status}")]
    HttpStatus { url: String, status: u16 },

    #[error("invalid artifact url '{0}'")]
    InvalidUrl(String),

    #[error("no {kind} with arn '{arn}'")]
    NotFound { kind: &'static str, arn: String },

    #[error("'{0}' is not a device farm run arn")]
    InvalidRunArn(String),
}

/// Read access to the device farm API surface the uploader needs.
#[async_trait]
pub trait DeviceFarm {
    async fn list_projects(&self) -> Result<Vec<Project>, FarmError>;

    async fn list_runs(&self, project_arn: &str) -> Result<Vec<Run>, FarmError>;

    async fn get_run(&self, run_arn: &str) -> Result<Run, FarmError>;

    async fn list_jobs(&self, run_arn: &str) -> Result<Vec<Job>, FarmError>;

    async fn list_suites(&self, job_arn: &str) -> Result<Vec<Suite>, FarmError>;

    /// Lists the artifacts of a run, job or suite filtered by category.
    async fn list_artifacts(
        &self,
        arn: &str,
        category: ArtifactCategory,
    ) -> Result<Vec<Artifact>, FarmError>;

    /// Fetches the full content of an artifact.
    async fn download(&self, artifact: &Artifact) -> Result<Vec<u8>, FarmError>;
}

pub fn is_arn(value: &str) -> bool {
    value.starts_with("arn:")
}

/// Builds the management console address for a run.
///
/// Run arns end in `<project uuid>/<run uuid>`.
///
/// # Examples
///
/// ```rust
/// # use farm_uploader::farm::console_link;
/// let link = console_link(
///     "us-west-2",
///     "arn:aws:devicefarm:us-west-2:1234:run:5e01a8c7-c861-4c0a-b1d5-5ec6e6c6dd23/0fcac17b-6122-44d7-ae5a-12345678abcd",
/// )?;
/// assert!(link.ends_with("/runs/0fcac17b-6122-44d7-ae5a-12345678abcd"));
/// # Ok::<(), farm_uploader::farm::FarmError>(())
/// ```
pub fn console_link(region: &str, run_arn: &str) -> Result<String, FarmError> {
    let invalid = || FarmError::InvalidRunArn(run_arn.to_owned());

    let ids = run_arn.rsplit(':').next().ok_or_else(invalid)?;
    let ids = ids
        .split('/')
        .map(Uuid::parse_str)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|_| invalid())?;

    match ids.as_slice() {
        [project, run] => Ok(format!(
            "https://{region}.console.aws.amazon.com/devicefarm/home#/mobile/projects/{}/runs/{}",
            project.hyphenated(),
            run.hyphenated()
        )),
        _ => Err(invalid()),
    }
}
