// (c) Meta Platforms, Inc. and affiliates.
//
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Low-level models for the upload journal.
//!
//! Every line of the journal is one [`Root`] object: an artifact body plus a
//! sequence number and a timestamp.

use chrono::{DateTime, NaiveDateTime};
use serde::Serialize;
use serde_with::serde_as;
use serde_with::DisplayFromStr;

pub const SPEC_VERSION: (i8, i8) = (1, 0);

mod rfc3339_format {
    use chrono::DateTime;
    use chrono::SecondsFormat;

    pub fn serialize<S>(date: &DateTime<chrono_tz::Tz>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let s = date.to_rfc3339_opts(SecondsFormat::Millis, true);
        serializer.serialize_str(&s)
    }
}

mod ref_date_format {
    use chrono::NaiveDateTime;

    const FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

    pub fn serialize<S>(date: &Option<NaiveDateTime>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        match date {
            Some(d) => serializer.serialize_str(&d.format(FORMAT).to_string()),
            None => serializer.serialize_none(),
        }
    }
}

/// Status of a test run as understood by the results server.
#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum TestRunStatus {
    #[serde(rename = "PASSED")]
    Passed,
    #[serde(rename = "FAILED")]
    Failed,
    #[serde(rename = "EXCEPTION")]
    Exception,
}

/// Visibility status of a test run set.
#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum TestRunSetStatus {
    #[serde(rename = "UPLOADING")]
    Uploading,
    #[serde(rename = "STANDARD")]
    Standard,
    #[serde(rename = "DELETED")]
    Deleted,
}

/// How an evidence set picks test runs out of a source test run set.
#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
pub enum TestRunSelectionMode {
    #[serde(rename = "ALL")]
    All,
    #[serde(rename = "SELECTED")]
    Selected,
}

/// What happens when two sources produce a test run with the same name.
#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
pub enum MultipleSourceTestRunsBehaviour {
    #[serde(rename = "NOT_ALLOWED")]
    NotAllowed,
    #[serde(rename = "ALLOWED")]
    Allowed,
}

#[derive(Debug, Serialize, Clone)]
pub struct Root {
    #[serde(flatten)]
    pub artifact: RootImpl,

    #[serde(rename = "timestamp")]
    #[serde(with = "rfc3339_format")]
    pub timestamp: DateTime<chrono_tz::Tz>,

    #[serde(rename = "sequenceNumber")]
    pub seqno: u64,
}

#[derive(Debug, Serialize, PartialEq, Clone)]
pub enum RootImpl {
    #[serde(rename = "schemaVersion")]
    SchemaVersion(SchemaVersion),

    #[serde(rename = "testRunSetArtifact")]
    TestRunSetArtifact(TestRunSetArtifact),

    #[serde(rename = "testRunArtifact")]
    TestRunArtifact(TestRunArtifact),

    #[serde(rename = "evidenceSetArtifact")]
    EvidenceSetArtifact(EvidenceSetArtifact),
}

impl From<TestRunSetArtifact> for RootImpl {
    fn from(value: TestRunSetArtifact) -> Self {
        RootImpl::TestRunSetArtifact(value)
    }
}

impl From<TestRunArtifact> for RootImpl {
    fn from(value: TestRunArtifact) -> Self {
        RootImpl::TestRunArtifact(value)
    }
}

impl From<EvidenceSetArtifact> for RootImpl {
    fn from(value: EvidenceSetArtifact) -> Self {
        RootImpl::EvidenceSetArtifact(value)
    }
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct SchemaVersion {
    #[serde(rename = "major")]
    pub major: i8,

    #[serde(rename = "minor")]
    pub minor: i8,
}

impl Default for SchemaVersion {
    fn default() -> Self {
        SchemaVersion {
            major: SPEC_VERSION.0,
            minor: SPEC_VERSION.1,
        }
    }
}

#[derive(Debug, Serialize, PartialEq, Clone)]
pub struct TestRunSetArtifact {
    #[serde(rename = "testRunSetId")]
    pub test_run_set_id: u64,

    #[serde(flatten)]
    pub artifact: TestRunSetArtifactImpl,
}

#[derive(Debug, Serialize, PartialEq, Clone)]
pub enum TestRunSetArtifactImpl {
    #[serde(rename = "testRunSetStart")]
    TestRunSetStart(TestRunSetStart),

    #[serde(rename = "externalLink")]
    ExternalLink(ExternalLink),

    #[serde(rename = "additionalFile")]
    AdditionalFile(AdditionalFile),

    #[serde(rename = "testRunSetStatus")]
    Status(TestRunSetStatusChange),
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct TestRunSetStart {
    #[serde(rename = "product")]
    pub product: String,

    #[serde(rename = "name")]
    pub name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(rename = "description")]
    pub description: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(rename = "refDate")]
    #[serde(with = "ref_date_format")]
    pub ref_date: Option<NaiveDateTime>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(rename = "tags")]
    pub tags: Option<Vec<String>>,

    #[serde(rename = "status")]
    pub status: TestRunSetStatus,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct TestRunSetStatusChange {
    #[serde(rename = "status")]
    pub status: TestRunSetStatus,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct ExternalLink {
    #[serde(rename = "name")]
    pub name: String,

    #[serde(rename = "url")]
    pub url: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(rename = "description")]
    pub description: Option<String>,
}

#[serde_as]
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct AdditionalFile {
    #[serde(rename = "name")]
    pub name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(rename = "description")]
    pub description: Option<String>,

    #[serde(rename = "size")]
    pub size: u64,

    #[serde_as(as = "Option<DisplayFromStr>")]
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(rename = "contentType")]
    pub content_type: Option<mime::Mime>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(rename = "path")]
    pub path: Option<String>,
}

#[derive(Debug, Serialize, PartialEq, Clone)]
pub struct TestRunArtifact {
    #[serde(rename = "testRunSetId")]
    pub test_run_set_id: u64,

    #[serde(rename = "testRunId")]
    pub test_run_id: u64,

    #[serde(flatten)]
    pub artifact: TestRunArtifactImpl,
}

#[derive(Debug, Serialize, PartialEq, Clone)]
pub enum TestRunArtifactImpl {
    #[serde(rename = "testRunStart")]
    TestRunStart(TestRunStart),

    #[serde(rename = "logMessages")]
    LogMessages(LogMessages),

    #[serde(rename = "additionalFile")]
    AdditionalFile(AdditionalFile),
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct TestRunStart {
    #[serde(rename = "name")]
    pub name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(rename = "description")]
    pub description: Option<String>,

    #[serde(rename = "testRunType")]
    pub test_run_type: String,

    #[serde(rename = "status")]
    pub status: TestRunStatus,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct LogMessages {
    #[serde(rename = "lines")]
    pub lines: Vec<String>,
}

#[derive(Debug, Serialize, PartialEq, Clone)]
pub struct EvidenceSetArtifact {
    #[serde(rename = "evidenceSetId")]
    pub evidence_set_id: u64,

    #[serde(flatten)]
    pub artifact: EvidenceSetArtifactImpl,
}

#[derive(Debug, Serialize, PartialEq, Clone)]
pub enum EvidenceSetArtifactImpl {
    #[serde(rename = "evidenceSetCreate")]
    EvidenceSetCreate(EvidenceSetCreate),
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct EvidenceSetCreate {
    #[serde(rename = "product")]
    pub product: String,

    #[serde(rename = "name")]
    pub name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(rename = "description")]
    pub description: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(rename = "refDate")]
    #[serde(with = "ref_date_format")]
    pub ref_date: Option<NaiveDateTime>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(rename = "tags")]
    pub tags: Option<Vec<String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(rename = "links")]
    pub links: Option<Vec<ExternalLink>>,

    #[serde(rename = "multipleSourceTestRunsBehaviour")]
    pub multiple_source_behaviour: MultipleSourceTestRunsBehaviour,

    #[serde(rename = "sources")]
    pub sources: Vec<EvidenceSetSource>,

    #[serde(rename = "summary")]
    pub summary: EvidenceSetCounts,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct EvidenceSetSource {
    #[serde(rename = "prefix")]
    pub prefix: String,

    #[serde(rename = "product")]
    pub product: String,

    #[serde(rename = "testRunSetId")]
    pub test_run_set_id: u64,

    #[serde(rename = "selectionMode")]
    pub selection_mode: TestRunSelectionMode,
}

#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq, Default)]
pub struct EvidenceSetCounts {
    #[serde(rename = "successfulTests")]
    pub successful_tests: u64,

    #[serde(rename = "failedTests")]
    pub failed_tests: u64,

    #[serde(rename = "erroringTests")]
    pub erroring_tests: u64,
}
