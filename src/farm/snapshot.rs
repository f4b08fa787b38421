// (c) Meta Platforms, Inc. and affiliates.
//
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::Deserialize;
use tokio::fs;
use url::Url;

use crate::farm::models::{Artifact, ArtifactCategory, Job, Project, Run, Suite};
use crate::farm::source::{DeviceFarm, FarmError};

#[derive(Debug, Deserialize, Default)]
struct Document {
    #[serde(default)]
    projects: Vec<ProjectEntry>,
}

#[derive(Debug, Deserialize)]
struct ProjectEntry {
    #[serde(flatten)]
    project: Project,
    #[serde(default)]
    runs: Vec<RunEntry>,
}

#[derive(Debug, Deserialize)]
struct RunEntry {
    #[serde(flatten)]
    run: Run,
    #[serde(default)]
    jobs: Vec<JobEntry>,
}

#[derive(Debug, Deserialize)]
struct JobEntry {
    #[serde(flatten)]
    job: Job,
    #[serde(default)]
    suites: Vec<SuiteEntry>,
    #[serde(default)]
    artifacts: Vec<Artifact>,
}

#[derive(Debug, Deserialize)]
struct SuiteEntry {
    #[serde(flatten)]
    suite: Suite,
    #[serde(default)]
    artifacts: Vec<Artifact>,
}

/// A [`DeviceFarm`] backed by an exported JSON document.
///
/// The export nests `projects` → `runs` → `jobs` → `suites` → `artifacts`.
/// Artifact urls may be `http(s)` addresses, `file://` urls, or paths
/// relative to the export's directory.
///
/// # Examples
///
/// ```rust
/// # tokio_test::block_on(async {
/// # use farm_uploader::farm::*;
/// let farm = SnapshotFarm::from_str(
///     r#"{"projects": [{"arn": "arn:p", "name": "demo", "runs": []}]}"#,
///     ".",
/// )?;
/// let projects = farm.list_projects().await?;
/// assert_eq!(projects[0].name, "demo");
/// # Ok::<(), FarmError>(())
/// # });
/// ```
pub struct SnapshotFarm {
    document: Document,
    base_dir: PathBuf,
    client: reqwest::Client,
}

impl SnapshotFarm {
    /// Loads an export from disk; relative artifact paths resolve next to it.
    pub async fn load<P: AsRef<Path>>(path: P) -> Result<Self, FarmError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).await?;
        let base_dir = path.parent().unwrap_or_else(|| Path::new("."));

        Self::from_str(&content, base_dir)
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str<P: AsRef<Path>>(content: &str, base_dir: P) -> Result<Self, FarmError> {
        let document = serde_json::from_str::<Document>(content)?;
        Ok(SnapshotFarm {
            document,
            base_dir: base_dir.as_ref().to_path_buf(),
            client: reqwest::Client::new(),
        })
    }

    fn runs(&self) -> impl Iterator<Item = &RunEntry> {
        self.document.projects.iter().flat_map(|p| p.runs.iter())
    }

    fn jobs(&self) -> impl Iterator<Item = &JobEntry> {
        self.runs().flat_map(|r| r.jobs.iter())
    }

    fn suites(&self) -> impl Iterator<Item = &SuiteEntry> {
        self.jobs().flat_map(|j| j.suites.iter())
    }

    fn find_run(&self, arn: &str) -> Result<&RunEntry, FarmError> {
        self.runs()
            .find(|r| r.run.arn == arn)
            .ok_or_else(|| not_found("run", arn))
    }

    fn artifacts_of(&self, arn: &str) -> Result<&[Artifact], FarmError> {
        if let Some(suite) = self.suites().find(|s| s.suite.arn == arn) {
            return Ok(&suite.artifacts);
        }
        if let Some(job) = self.jobs().find(|j| j.job.arn == arn) {
            return Ok(&job.artifacts);
        }
        Err(not_found("suite or job", arn))
    }

    async fn fetch_http(&self, url: Url) -> Result<Vec<u8>, FarmError> {
        let response = self.client.get(url.clone()).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FarmError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        Ok(response.bytes().await?.to_vec())
    }
}

fn not_found(kind: &'static str, arn: &str) -> FarmError {
    FarmError::NotFound {
        kind,
        arn: arn.to_owned(),
    }
}

#[async_trait]
impl DeviceFarm for SnapshotFarm {
    async fn list_projects(&self) -> Result<Vec<Project>, FarmError> {
        Ok(self
            .document
            .projects
            .iter()
            .map(|p| p.project.clone())
            .collect())
    }

    async fn list_runs(&self, project_arn: &str) -> Result<Vec<Run>, FarmError> {
        let project = self
            .document
            .projects
            .iter()
            .find(|p| p.project.arn == project_arn)
            .ok_or_else(|| not_found("project", project_arn))?;

        Ok(project.runs.iter().map(|r| r.run.clone()).collect())
    }

    async fn get_run(&self, run_arn: &str) -> Result<Run, FarmError> {
        Ok(self.find_run(run_arn)?.run.clone())
    }

    async fn list_jobs(&self, run_arn: &str) -> Result<Vec<Job>, FarmError> {
        let run = self.find_run(run_arn)?;
        Ok(run.jobs.iter().map(|j| j.job.clone()).collect())
    }

    async fn list_suites(&self, job_arn: &str) -> Result<Vec<Suite>, FarmError> {
        let job = self
            .jobs()
            .find(|j| j.job.arn == job_arn)
            .ok_or_else(|| not_found("job", job_arn))?;

        Ok(job.suites.iter().map(|s| s.suite.clone()).collect())
    }

    async fn list_artifacts(
        &self,
        arn: &str,
        category: ArtifactCategory,
    ) -> Result<Vec<Artifact>, FarmError> {
        Ok(self
            .artifacts_of(arn)?
            .iter()
            .filter(|a| a.category == category)
            .cloned()
            .collect())
    }

    async fn download(&self, artifact: &Artifact) -> Result<Vec<u8>, FarmError> {
        match Url::parse(&artifact.url) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => self.fetch_http(url).await,
            Ok(url) if url.scheme() == "file" => {
                let path = url
                    .to_file_path()
                    .map_err(|_| FarmError::InvalidUrl(artifact.url.clone()))?;
                Ok(fs::read(path).await?)
            }
            Ok(_) => Err(FarmError::InvalidUrl(artifact.url.clone())),
            Err(url::ParseError::RelativeUrlWithoutBase) => {
                Ok(fs::read(self.base_dir.join(&artifact.url)).await?)
            }
            Err(_) => Err(FarmError::InvalidUrl(artifact.url.clone())),
        }
    }
}
