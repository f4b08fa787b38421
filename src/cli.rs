// (c) Meta Platforms, Inc. and affiliates.
//
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use std::path::PathBuf;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use clap::Parser;
use thiserror::Error;

use crate::upload::UploadSettings;

const TEMPLATE_HELP: &str = "\
Run set names, descriptions and tags, as well as the evidence set prefix, may
contain placeholders expanded once per device farm job:

  {job.name}                  {job.result}
  {job.status}                {job.arn}
  {job.device.name}           {job.device.manufacturer}
  {job.device.model}          {job.device.formfactor}
  {job.device.os}             {job.device.platform}
  {job.device.arn}

Names are case-insensitive. Use '{{' for a literal '{'.";

const DEFAULT_REGION: &str = "us-west-2";

#[derive(Debug, Error, PartialEq)]
#[non_exhaustive]
pub enum CliError {
    #[error("no value specified for --{0}")]
    Missing(&'static str),

    #[error("unable to parse '{value}' as a date for --{flag}")]
    InvalidDate { flag: &'static str, value: String },
}

#[derive(Parser, Debug)]
#[command(name = "farm-uploader")]
#[command(about = "Copies the results of an AWS Device Farm run to a results server")]
#[command(version)]
#[command(after_help = TEMPLATE_HELP)]
pub struct Args {
    #[arg(long, help = "Results server")]
    pub server: Option<String>,

    #[arg(long, help = "Product on the results server")]
    pub product: Option<String>,

    #[arg(long, env = "CONICAL_TOKEN", hide_env_values = true, help = "Access token")]
    pub token: Option<String>,

    #[arg(long, help = "Type of the created test runs")]
    pub test_run_type: Option<String>,

    #[arg(long, help = "Test run set name (template)")]
    pub test_run_set_name: Option<String>,

    #[arg(long, help = "Test run set description (template)")]
    pub test_run_set_description: Option<String>,

    #[arg(long = "test-run-set-tag", help = "Test run set tag (template), repeatable")]
    pub test_run_set_tags: Vec<String>,

    #[arg(long, help = "Test run set reference date")]
    pub test_run_set_ref_date: Option<String>,

    #[arg(long, help = "chrono format of --test-run-set-ref-date")]
    pub test_run_set_ref_date_format: Option<String>,

    #[arg(long, help = "Evidence set name")]
    pub evidence_set_name: Option<String>,

    #[arg(long, help = "Evidence set description")]
    pub evidence_set_description: Option<String>,

    #[arg(long = "evidence-set-tag", help = "Evidence set tag, repeatable")]
    pub evidence_set_tags: Vec<String>,

    #[arg(long, help = "Evidence set reference date")]
    pub evidence_set_ref_date: Option<String>,

    #[arg(long, help = "chrono format of --evidence-set-ref-date")]
    pub evidence_set_ref_date_format: Option<String>,

    #[arg(long, help = "Prefix of each test run set in the evidence set (template)")]
    pub evidence_set_test_run_set_prefix: Option<String>,

    #[arg(long, help = "Device farm project name or ARN")]
    pub aws_project: Option<String>,

    #[arg(long, help = "Device farm test run name or ARN")]
    pub aws_test_run: Option<String>,

    #[arg(long, default_value = DEFAULT_REGION, help = "Region used for console links")]
    pub aws_region: String,

    #[arg(long, help = "Device farm snapshot file")]
    pub aws_snapshot: Option<PathBuf>,

    #[arg(long, help = "Write the upload journal to this file instead of stdout")]
    pub output: Option<PathBuf>,

    #[arg(long, help = "Directory receiving the content of published files")]
    pub files_dir: Option<PathBuf>,

    #[arg(long, help = "Exit with code 2 when any uploaded test failed")]
    pub use_non_zero_exit_code_on_test_failure: bool,
}

/// Where the results go, as opposed to what gets uploaded.
#[derive(Debug, Clone, PartialEq)]
pub struct ServerSettings {
    pub server: String,
    pub product: String,
    pub token: Option<String>,
}

/// Validated command line.
#[derive(Debug, Clone)]
pub struct Settings {
    pub server: ServerSettings,
    pub upload: UploadSettings,
    pub snapshot: PathBuf,
    pub output: Option<PathBuf>,
    pub files_dir: Option<PathBuf>,
}

impl Args {
    /// Checks the arguments and converts them into [`Settings`].
    pub fn validate(self) -> Result<Settings, CliError> {
        let server = ServerSettings {
            server: required(self.server, "server")?,
            product: required(self.product, "product")?,
            token: self.token.filter(|t| !t.is_empty()),
        };

        let test_run_set_ref_date = self
            .test_run_set_ref_date
            .map(|value| {
                parse_ref_date(
                    &value,
                    self.test_run_set_ref_date_format.as_deref(),
                    "test-run-set-ref-date",
                )
            })
            .transpose()?;
        let evidence_set_ref_date = self
            .evidence_set_ref_date
            .map(|value| {
                parse_ref_date(
                    &value,
                    self.evidence_set_ref_date_format.as_deref(),
                    "evidence-set-ref-date",
                )
            })
            .transpose()?;

        let upload = UploadSettings {
            test_run_type: required(self.test_run_type, "test-run-type")?,
            test_run_set_name: required(self.test_run_set_name, "test-run-set-name")?,
            test_run_set_description: self.test_run_set_description,
            test_run_set_tags: self.test_run_set_tags,
            test_run_set_ref_date,
            evidence_set_name: required(self.evidence_set_name, "evidence-set-name")?,
            evidence_set_description: self.evidence_set_description,
            evidence_set_tags: self.evidence_set_tags,
            evidence_set_ref_date,
            evidence_set_prefix: self.evidence_set_test_run_set_prefix,
            project: required(self.aws_project, "aws-project")?,
            run: required(self.aws_test_run, "aws-test-run")?,
            region: self.aws_region,
            fail_on_test_failure: self.use_non_zero_exit_code_on_test_failure,
        };

        Ok(Settings {
            server,
            upload,
            snapshot: self.aws_snapshot.ok_or(CliError::Missing("aws-snapshot"))?,
            output: self.output,
            files_dir: self.files_dir,
        })
    }
}

fn required(value: Option<String>, flag: &'static str) -> Result<String, CliError> {
    value
        .filter(|v| !v.trim().is_empty())
        .ok_or(CliError::Missing(flag))
}

/// Parses a reference date, either with an explicit chrono format or with
/// one of the accepted defaults.
pub fn parse_ref_date(
    value: &str,
    format: Option<&str>,
    flag: &'static str,
) -> Result<NaiveDateTime, CliError> {
    let parsed = match format {
        Some(format) => NaiveDateTime::parse_from_str(value, format).ok().or_else(|| {
            NaiveDate::parse_from_str(value, format)
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        }),
        None => DateTime::parse_from_rfc3339(value)
            .map(|d| d.naive_local())
            .ok()
            .or_else(|| NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S").ok())
            .or_else(|| NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S").ok())
            .or_else(|| {
                NaiveDate::parse_from_str(value, "%Y-%m-%d")
                    .ok()
                    .and_then(|d| d.and_hms_opt(0, 0, 0))
            }),
    };

    parsed.ok_or_else(|| CliError::InvalidDate {
        flag,
        value: value.to_owned(),
    })
}
