// (c) Meta Platforms, Inc. and affiliates.
//
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use std::fmt;

use serde::Deserialize;
use serde::Serialize;

/// Lifecycle status of a run, job or suite.
/// ref: https://docs.aws.amazon.com/devicefarm/latest/APIReference/API_Run.html
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum ExecutionStatus {
    #[serde(rename = "PENDING")]
    Pending,
    #[serde(rename = "PENDING_CONCURRENCY")]
    PendingConcurrency,
    #[serde(rename = "PENDING_DEVICE")]
    PendingDevice,
    #[serde(rename = "PROCESSING")]
    Processing,
    #[serde(rename = "SCHEDULING")]
    Scheduling,
    #[serde(rename = "PREPARING")]
    Preparing,
    #[serde(rename = "RUNNING")]
    Running,
    #[serde(rename = "COMPLETED")]
    Completed,
    #[serde(rename = "STOPPING")]
    Stopping,
}

/// Outcome of a run, job or suite.
/// ref: https://docs.aws.amazon.com/devicefarm/latest/APIReference/API_Job.html
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum ExecutionResult {
    #[serde(rename = "PENDING")]
    Pending,
    #[serde(rename = "PASSED")]
    Passed,
    #[serde(rename = "WARNED")]
    Warned,
    #[serde(rename = "FAILED")]
    Failed,
    #[serde(rename = "SKIPPED")]
    Skipped,
    #[serde(rename = "ERRORED")]
    Errored,
    #[serde(rename = "STOPPED")]
    Stopped,
}

impl ExecutionResult {
    /// Results after which a suite's output may be missing tests.
    pub fn is_potentially_incomplete(&self) -> bool {
        matches!(self, ExecutionResult::Errored | ExecutionResult::Stopped)
    }
}

/// The artifact filter accepted by `ListArtifacts`.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactCategory {
    #[serde(rename = "FILE")]
    File,
    #[serde(rename = "SCREENSHOT")]
    Screenshot,
    #[serde(rename = "LOG")]
    Log,
}

impl fmt::Display for ExecutionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ExecutionStatus::Pending => "PENDING",
            ExecutionStatus::PendingConcurrency => "PENDING_CONCURRENCY",
            ExecutionStatus::PendingDevice => "PENDING_DEVICE",
            ExecutionStatus::Processing => "PROCESSING",
            ExecutionStatus::Scheduling => "SCHEDULING",
            ExecutionStatus::Preparing => "PREPARING",
            ExecutionStatus::Running => "RUNNING",
            ExecutionStatus::Completed => "COMPLETED",
            ExecutionStatus::Stopping => "STOPPING",
        };
        f.write_str(s)
    }
}

impl fmt::Display for ExecutionResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ExecutionResult::Pending => "PENDING",
            ExecutionResult::Passed => "PASSED",
            ExecutionResult::Warned => "WARNED",
            ExecutionResult::Failed => "FAILED",
            ExecutionResult::Skipped => "SKIPPED",
            ExecutionResult::Errored => "ERRORED",
            ExecutionResult::Stopped => "STOPPED",
        };
        f.write_str(s)
    }
}

impl fmt::Display for ArtifactCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ArtifactCategory::File => "FILE",
            ArtifactCategory::Screenshot => "SCREENSHOT",
            ArtifactCategory::Log => "LOG",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Project {
    pub arn: String,
    pub name: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Run {
    pub arn: String,
    pub name: String,
    pub status: Option<ExecutionStatus>,
    pub result: Option<ExecutionResult>,
}

/// The device a job ran on.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Device {
    pub arn: Option<String>,
    pub manufacturer: Option<String>,
    pub model: Option<String>,
    pub form_factor: Option<String>,
    pub name: Option<String>,
    pub os: Option<String>,
    pub platform: Option<String>,
}

/// One device's execution within a run.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Job {
    pub arn: String,
    pub name: Option<String>,
    pub status: Option<ExecutionStatus>,
    pub result: Option<ExecutionResult>,
    pub device: Option<Device>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Suite {
    pub arn: String,
    pub name: String,
    pub status: Option<ExecutionStatus>,
    pub result: Option<ExecutionResult>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Artifact {
    pub arn: String,
    pub name: String,
    pub category: ArtifactCategory,
    pub extension: String,
    pub url: String,
}
