// (c) Meta Platforms, Inc. and affiliates.
//
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Copies one completed device-farm run into the results server.
//!
//! Every job of the run becomes a test run set; the pytest results found in
//! the job's "Tests Suite" become its test runs. A single evidence set then
//! gathers all the created sets.

use std::collections::BTreeMap;
use std::io;

use chrono::NaiveDateTime;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::farm::{self, Artifact, ArtifactCategory, DeviceFarm, ExecutionStatus, FarmError};
use crate::output::{
    self as tv, AdditionalFile, EvidenceSet, EvidenceSetSource, EvidenceSetSummary,
    ExternalLink, OutputError, TestRun, TestRunSetStatus, TestRunStatus,
};
use crate::pytest::{self, TestEntry};
use crate::template::{self, JobContext, TemplateError};

const TESTS_SUITE: &str = "Tests Suite";
const TEST_SPEC_OUTPUT: &str = "Test spec output";
const LINK_NAME: &str = "AWS Job";
const LINK_DESCRIPTION: &str = "AWS Job for the whole set";

pub const EXIT_TEST_FAILURE: u8 = 2;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum UploadError {
    #[error("no project named '{0}' found")]
    ProjectNotFound(String),

    #[error("no test run named '{0}' found")]
    RunNotFound(String),

    #[error("more than one {kind} named '{name}' found")]
    AmbiguousName { kind: &'static str, name: String },

    #[error("test run '{arn}' is not complete ({status})")]
    RunNotComplete { arn: String, status: String },

    #[error(transparent)]
    Template(#[from] TemplateError),

    #[error(transparent)]
    Farm(#[from] FarmError),

    #[error(transparent)]
    Output(#[from] OutputError),

    #[error("cannot read test spec output: {0}")]
    Io(#[from] io::Error),
}

/// Templates and fixed values used to name what gets created.
///
/// Fields documented as templates may contain `{job.…}` placeholders and
/// are expanded once per job.
#[derive(Debug, Clone, Default)]
pub struct UploadSettings {
    pub test_run_type: String,

    /// Template.
    pub test_run_set_name: String,
    /// Template.
    pub test_run_set_description: Option<String>,
    /// Templates.
    pub test_run_set_tags: Vec<String>,
    pub test_run_set_ref_date: Option<NaiveDateTime>,

    pub evidence_set_name: String,
    pub evidence_set_description: Option<String>,
    pub evidence_set_tags: Vec<String>,
    pub evidence_set_ref_date: Option<NaiveDateTime>,
    /// Template.
    pub evidence_set_prefix: Option<String>,

    /// Project ARN or name.
    pub project: String,
    /// Run ARN or name.
    pub run: String,
    pub region: String,

    pub fail_on_test_failure: bool,
}

/// Result of a successful upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadOutcome {
    pub evidence_set: EvidenceSetSummary,
    pub exit_code: u8,
}

/// Runs the whole upload against `farm`, recording into `product`.
pub async fn upload<F>(
    farm: &F,
    product: &tv::Product,
    settings: &UploadSettings,
) -> Result<UploadOutcome, UploadError>
where
    F: DeviceFarm + Sync + ?Sized,
{
    let project_arn = resolve_project(farm, &settings.project).await?;
    let run_arn = resolve_run(farm, &project_arn, &settings.run).await?;
    info!(project = %project_arn, run = %run_arn, "resolved device farm run");

    let run = farm.get_run(&run_arn).await?;
    if run.status != Some(ExecutionStatus::Completed) {
        return Err(UploadError::RunNotComplete {
            arn: run_arn,
            status: run
                .status
                .map_or_else(|| "UNKNOWN".to_owned(), |s| s.to_string()),
        });
    }

    let link = ExternalLink::new(LINK_NAME, &farm::console_link(&settings.region, &run_arn)?)
        .with_description(LINK_DESCRIPTION);

    let mut sources = vec![];
    for job in farm.list_jobs(&run_arn).await? {
        let source = upload_job(farm, product, settings, &link, &job).await?;
        sources.push(source);
    }

    let mut builder = EvidenceSet::builder(&settings.evidence_set_name)
        .add_link(link)
        .multiple_source_behaviour(tv::MultipleSourceTestRunsBehaviour::NotAllowed);
    if let Some(description) = &settings.evidence_set_description {
        builder = builder.description(description);
    }
    if let Some(ref_date) = settings.evidence_set_ref_date {
        builder = builder.ref_date(ref_date);
    }
    for tag in &settings.evidence_set_tags {
        builder = builder.add_tag(tag);
    }
    for source in sources {
        builder = builder.add_source(source);
    }

    let summary = product.create_evidence_set(&builder.build()).await?;
    info!(
        id = summary.id,
        successful = summary.successful_tests,
        failed = summary.failed_tests,
        erroring = summary.erroring_tests,
        "created evidence set"
    );

    let exit_code = if settings.fail_on_test_failure && summary.has_failures() {
        warn!("tests failed, exiting with code {}", EXIT_TEST_FAILURE);
        EXIT_TEST_FAILURE
    } else {
        0
    };

    Ok(UploadOutcome {
        evidence_set: summary,
        exit_code,
    })
}

async fn resolve_project<F>(farm: &F, project: &str) -> Result<String, UploadError>
where
    F: DeviceFarm + Sync + ?Sized,
{
    if farm::is_arn(project) {
        return Ok(project.to_owned());
    }

    debug!(project, "looking up project by name");
    let projects = farm.list_projects().await?;
    single_named(projects, "project", project, |p| {
        p.name.eq_ignore_ascii_case(project)
    })?
    .map(|p| p.arn)
    .ok_or_else(|| UploadError::ProjectNotFound(project.to_owned()))
}

async fn resolve_run<F>(farm: &F, project_arn: &str, run: &str) -> Result<String, UploadError>
where
    F: DeviceFarm + Sync + ?Sized,
{
    if farm::is_arn(run) {
        return Ok(run.to_owned());
    }

    debug!(run, "looking up test run by name");
    let runs = farm.list_runs(project_arn).await?;
    single_named(runs, "test run", run, |r| r.name.eq_ignore_ascii_case(run))?
        .map(|r| r.arn)
        .ok_or_else(|| UploadError::RunNotFound(run.to_owned()))
}

/// The only item accepted by `is_match`, if any; duplicates are an error.
fn single_named<T>(
    items: Vec<T>,
    kind: &'static str,
    name: &str,
    is_match: impl Fn(&T) -> bool,
) -> Result<Option<T>, UploadError> {
    let mut found = items.into_iter().filter(|item| is_match(item));
    let first = found.next();
    if found.next().is_some() {
        return Err(UploadError::AmbiguousName {
            kind,
            name: name.to_owned(),
        });
    }
    Ok(first)
}

async fn upload_job<F>(
    farm: &F,
    product: &tv::Product,
    settings: &UploadSettings,
    link: &ExternalLink,
    job: &farm::Job,
) -> Result<EvidenceSetSource, UploadError>
where
    F: DeviceFarm + Sync + ?Sized,
{
    let context = JobContext::from(job);
    info!(
        job = context.name.as_deref().unwrap_or_default(),
        device = context
            .device
            .as_ref()
            .and_then(|d| d.name.as_deref())
            .unwrap_or_default(),
        result = context.result.as_deref().unwrap_or_default(),
        "processing job"
    );

    let trs = product
        .create_test_run_set(&test_run_set_for(settings, &context)?)
        .await?;
    trs.add_external_link(link).await?;

    let prefix = template::expand(
        settings.evidence_set_prefix.as_deref().unwrap_or_default(),
        &context,
    )?;
    let source = EvidenceSetSource::all(&prefix, product.name(), trs.id());

    let suites = farm.list_suites(&job.arn).await?;
    let Some(suite) = single_named(suites, "suite", TESTS_SUITE, |s| s.name == TESTS_SUITE)?
    else {
        warn!(job = %job.arn, "no '{}' suite found", TESTS_SUITE);
        return Ok(source);
    };
    info!(
        suite = %suite.name,
        result = %suite.result.map(|r| r.to_string()).unwrap_or_default(),
        "found tests suite"
    );

    let files = farm.list_artifacts(&suite.arn, ArtifactCategory::File).await?;
    let spec_output = match files
        .iter()
        .find(|a| a.name.eq_ignore_ascii_case(TEST_SPEC_OUTPUT))
    {
        Some(artifact) => Some(farm.download(artifact).await?),
        None => None,
    };

    if suite
        .result
        .is_some_and(|r| r.is_potentially_incomplete())
    {
        info!("potentially incomplete results, adding test run 'General'");
        let general = trs
            .create_test_run(
                &TestRun::builder("General", &settings.test_run_type)
                    .description("Automatically added TR")
                    .status(TestRunStatus::Failed)
                    .build(),
            )
            .await?;

        if let Some(content) = &spec_output {
            general
                .publish_log_messages(String::from_utf8_lossy(content).lines())
                .await?;
        }
    }

    let Some(spec_output) = spec_output else {
        warn!(suite = %suite.arn, "cannot find '{}', skipping", TEST_SPEC_OUTPUT);
        return Ok(source);
    };

    let screenshots: BTreeMap<String, Artifact> = farm
        .list_artifacts(&suite.arn, ArtifactCategory::Screenshot)
        .await?
        .into_iter()
        .map(|a| (a.name.clone(), a))
        .collect();

    trs.publish_additional_file(&AdditionalFile::new(
        &format!("{}.txt", TEST_SPEC_OUTPUT),
        "Full test spec output from AWS",
        spec_output.clone(),
    ))
    .await?;

    let entries = pytest::process_log(spec_output.as_slice())?;
    info!(count = entries.len(), "uploading tests");

    for entry in &entries {
        upload_entry(farm, &trs, settings, &screenshots, entry).await?;
    }

    trs.set_status(TestRunSetStatus::Standard).await?;
    Ok(source)
}

async fn upload_entry<F>(
    farm: &F,
    trs: &tv::StartedTestRunSet,
    settings: &UploadSettings,
    screenshots: &BTreeMap<String, Artifact>,
    entry: &TestEntry,
) -> Result<(), UploadError>
where
    F: DeviceFarm + Sync + ?Sized,
{
    debug!(test = %entry.test_name, passed = entry.passed, "uploading test");

    let status = if entry.passed {
        TestRunStatus::Passed
    } else {
        TestRunStatus::Failed
    };
    let tr = trs
        .create_test_run(
            &TestRun::builder(&entry.test_name.replace('.', "\\"), &settings.test_run_type)
                .description("Device farm test")
                .status(status)
                .build(),
        )
        .await?;

    let prefix = screenshot_prefix(&entry.test_name);
    for (name, artifact) in screenshots.range(prefix.clone()..) {
        let Some(rest) = name.strip_prefix(&prefix) else {
            break;
        };

        debug!(screenshot = %name, "uploading screenshot");
        let content = farm.download(artifact).await?;
        tr.publish_additional_file(&AdditionalFile::new(
            &format!("{}.{}", rest, artifact.extension),
            "From AWS",
            content,
        ))
        .await?;
    }

    let lines = log_lines(entry);
    if !lines.is_empty() {
        tr.publish_log_messages(lines).await?;
    }
    Ok(())
}

fn test_run_set_for(
    settings: &UploadSettings,
    context: &JobContext,
) -> Result<tv::TestRunSet, TemplateError> {
    let mut builder = tv::TestRunSet::builder(&template::expand(
        &settings.test_run_set_name,
        context,
    )?);

    if let Some(description) = &settings.test_run_set_description {
        builder = builder.description(&template::expand(description, context)?);
    }
    if let Some(ref_date) = settings.test_run_set_ref_date {
        builder = builder.ref_date(ref_date);
    }
    for tag in &settings.test_run_set_tags {
        builder = builder.add_tag(&template::expand(tag, context)?);
    }
    Ok(builder.build())
}

/// Screenshots of `a.b.test` are named `a_b_test_<anything>`.
fn screenshot_prefix(test_name: &str) -> String {
    let mut prefix = test_name.split('.').collect::<Vec<_>>().join("_");
    prefix.push('_');
    prefix
}

fn log_lines(entry: &TestEntry) -> Vec<String> {
    let sections = [
        ("=== BODY ===", &entry.body),
        ("=== STD OUT ===", &entry.stdout_lines),
        ("=== LOGS ===", &entry.log_messages),
    ];

    let mut lines = vec![];
    for (header, content) in sections {
        if content.is_empty() {
            continue;
        }
        lines.push(header.to_owned());
        lines.extend(content.iter().cloned());
        lines.push(String::new());
    }
    lines
}
