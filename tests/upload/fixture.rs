// (c) Meta Platforms, Inc. and affiliates.
//
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use std::sync::Arc;

use anyhow::Result;
use assert_fs::prelude::*;
use serde_json::json;
use tokio::sync::Mutex;

use farm_uploader::farm::SnapshotFarm;
use farm_uploader::output::{Config, Product, TimestampProvider};
use farm_uploader::upload::{self, UploadError, UploadOutcome, UploadSettings};

pub const PROJECT_ARN: &str =
    "arn:aws:devicefarm:us-west-2:123456789012:project:5e01a8c7-c861-4c0a-b1d5-5ec6e6c6dd23";
pub const RUN_ARN: &str = "arn:aws:devicefarm:us-west-2:123456789012:run:5e01a8c7-c861-4c0a-b1d5-5ec6e6c6dd23/0fcac17b-6122-44d7-ae5a-12345678abcd";
pub const CONSOLE_LINK: &str = "https://us-west-2.console.aws.amazon.com/devicefarm/home#/mobile/projects/5e01a8c7-c861-4c0a-b1d5-5ec6e6c6dd23/runs/0fcac17b-6122-44d7-ae5a-12345678abcd";

pub const SPEC_OUTPUT: &str = "\
=================================== FAILURES ===================================
___________________________________ test_bad ___________________________________
E       AssertionError
----------------------------- Captured stdout call -----------------------------
tapped login
=========================== short test summary info ============================
PASSED tests/test_login.py::test_ok
FAILED tests/test_login.py::test_bad - AssertionError
";

pub struct FixedTsProvider {}

impl TimestampProvider for FixedTsProvider {
    fn now(&self) -> chrono::DateTime<chrono_tz::Tz> {
        chrono::DateTime::from_timestamp_nanos(0).with_timezone(&chrono_tz::UTC)
    }
}

pub fn settings() -> UploadSettings {
    UploadSettings {
        test_run_type: "integration".to_owned(),
        test_run_set_name: "{job.device.name} ({job.device.os})".to_owned(),
        test_run_set_description: Some("{job.name}: {job.result}".to_owned()),
        test_run_set_tags: vec!["{job.device.platform}".to_owned()],
        evidence_set_name: "nightly".to_owned(),
        evidence_set_prefix: Some("{job.device.formfactor}".to_owned()),
        project: "demo".to_owned(),
        run: "NIGHTLY".to_owned(),
        region: "us-west-2".to_owned(),
        ..Default::default()
    }
}

pub fn job(arn: &str, suite_result: &str, artifacts: serde_json::Value) -> serde_json::Value {
    json!({
        "arn": arn,
        "name": "Google Pixel 7",
        "status": "COMPLETED",
        "result": "FAILED",
        "device": {
            "name": "Pixel 7",
            "manufacturer": "Google",
            "formFactor": "PHONE",
            "platform": "ANDROID",
            "os": "14"
        },
        "suites": [
            {"arn": format!("{arn}:setup"), "name": "Setup Suite", "result": "PASSED"},
            {
                "arn": format!("{arn}:tests"),
                "name": "Tests Suite",
                "result": suite_result,
                "artifacts": artifacts
            }
        ]
    })
}

pub fn artifact(name: &str, category: &str, extension: &str, url: &str) -> serde_json::Value {
    json!({
        "arn": format!("arn:artifact:{name}"),
        "name": name,
        "category": category,
        "extension": extension,
        "url": url
    })
}

/// The artifacts of a suite whose tests all produced output.
pub fn default_artifacts() -> serde_json::Value {
    json!([
        artifact("Test spec output", "FILE", "txt", "spec.txt"),
        artifact("tests_test_login_test_ok_home", "SCREENSHOT", "png", "home.png"),
        artifact("tests_test_login_test_ok_menu", "SCREENSHOT", "jpg", "menu.jpg"),
        artifact("unrelated_shot", "SCREENSHOT", "png", "home.png"),
    ])
}

pub fn document(run_status: &str, jobs: Vec<serde_json::Value>) -> serde_json::Value {
    json!({
        "projects": [{
            "arn": PROJECT_ARN,
            "name": "Demo",
            "runs": [{
                "arn": RUN_ARN,
                "name": "nightly",
                "status": run_status,
                "result": "FAILED",
                "jobs": jobs
            }]
        }]
    })
}

/// Runs an upload of `document` and returns the outcome with the journal.
pub async fn run_upload(
    document: serde_json::Value,
    settings: &UploadSettings,
) -> Result<(Result<UploadOutcome, UploadError>, Vec<serde_json::Value>)> {
    let dir = assert_fs::TempDir::new()?;
    dir.child("spec.txt").write_str(SPEC_OUTPUT)?;
    dir.child("home.png").write_binary(&[0x89, 0x50, 0x4e, 0x47])?;
    dir.child("menu.jpg").write_binary(&[0xff, 0xd8])?;
    let export = dir.child("export.json");
    export.write_str(&document.to_string())?;

    let buffer: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(vec![]));
    let product = Product::builder("app")
        .config(
            Config::builder()
                .with_buffer_output(Arc::clone(&buffer))
                .with_timestamp_provider(Box::new(FixedTsProvider {}))
                .build(),
        )
        .build();
    let farm = SnapshotFarm::load(export.path()).await?;

    let outcome = upload::upload(&farm, &product, settings).await;

    let lines = buffer
        .lock()
        .await
        .iter()
        .map(|line| serde_json::from_str::<serde_json::Value>(line))
        .collect::<Result<Vec<_>, _>>()?;
    Ok((outcome, lines))
}

/// Journal records without the envelope, in order.
pub fn artifacts(lines: &[serde_json::Value]) -> Vec<serde_json::Value> {
    lines
        .iter()
        .filter_map(|line| line.as_object())
        .filter_map(|line| {
            line.iter()
                .find(|(key, _)| !matches!(key.as_str(), "sequenceNumber" | "timestamp"))
                .map(|(_, value)| value.clone())
        })
        .collect()
}
