// (c) Meta Platforms, Inc. and affiliates.
//
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use anyhow::Result;
use assert_json_diff::assert_json_eq;
use assert_matches::assert_matches;
use serde_json::json;

use farm_uploader::template::TemplateError;
use farm_uploader::upload::{UploadError, UploadSettings};

use super::fixture::*;

fn trs_start(id: u64, description: &str) -> serde_json::Value {
    json!({
        "testRunSetId": id,
        "testRunSetStart": {
            "product": "app",
            "name": "Pixel 7 (14)",
            "description": description,
            "tags": ["ANDROID"],
            "status": "UPLOADING"
        }
    })
}

fn link(id: u64) -> serde_json::Value {
    json!({
        "testRunSetId": id,
        "externalLink": {
            "name": "AWS Job",
            "url": CONSOLE_LINK,
            "description": "AWS Job for the whole set"
        }
    })
}

fn tr_start(id: u64, name: &str, description: &str, status: &str) -> serde_json::Value {
    json!({
        "testRunSetId": 1,
        "testRunId": id,
        "testRunStart": {
            "name": name,
            "description": description,
            "testRunType": "integration",
            "status": status
        }
    })
}

fn standard(id: u64) -> serde_json::Value {
    json!({
        "testRunSetId": id,
        "testRunSetStatus": {"status": "STANDARD"}
    })
}

#[tokio::test]
async fn test_upload_completed_job() -> Result<()> {
    let document = document(
        "COMPLETED",
        vec![job("arn:job:1", "PASSED", default_artifacts())],
    );
    let (outcome, lines) = run_upload(document, &settings()).await?;

    let outcome = outcome?;
    assert_eq!(outcome.exit_code, 0);
    assert_eq!(outcome.evidence_set.successful_tests, 1);
    assert_eq!(outcome.evidence_set.failed_tests, 1);

    let expected = vec![
        json!({"major": 1, "minor": 0}),
        trs_start(1, "Google Pixel 7: FAILED"),
        link(1),
        json!({
            "testRunSetId": 1,
            "additionalFile": {
                "name": "Test spec output.txt",
                "description": "Full test spec output from AWS",
                "size": SPEC_OUTPUT.len(),
                "contentType": "text/plain"
            }
        }),
        tr_start(1, "tests\\test_login\\test_ok", "Device farm test", "PASSED"),
        json!({
            "testRunSetId": 1,
            "testRunId": 1,
            "additionalFile": {
                "name": "home.png",
                "description": "From AWS",
                "size": 4,
                "contentType": "image/png"
            }
        }),
        json!({
            "testRunSetId": 1,
            "testRunId": 1,
            "additionalFile": {
                "name": "menu.jpg",
                "description": "From AWS",
                "size": 2,
                "contentType": "image/jpeg"
            }
        }),
        tr_start(2, "tests\\test_login\\test_bad", "Device farm test", "FAILED"),
        json!({
            "testRunSetId": 1,
            "testRunId": 2,
            "logMessages": {
                "lines": [
                    "=== BODY ===",
                    "E       AssertionError",
                    "",
                    "=== STD OUT ===",
                    "tapped login",
                    ""
                ]
            }
        }),
        standard(1),
        json!({
            "evidenceSetId": 1,
            "evidenceSetCreate": {
                "product": "app",
                "name": "nightly",
                "links": [{
                    "name": "AWS Job",
                    "url": CONSOLE_LINK,
                    "description": "AWS Job for the whole set"
                }],
                "multipleSourceTestRunsBehaviour": "NOT_ALLOWED",
                "sources": [{
                    "prefix": "PHONE",
                    "product": "app",
                    "testRunSetId": 1,
                    "selectionMode": "ALL"
                }],
                "summary": {
                    "successfulTests": 1,
                    "failedTests": 1,
                    "erroringTests": 0
                }
            }
        }),
    ];
    assert_json_eq!(json!(artifacts(&lines)), json!(expected));

    for (seqno, line) in lines.iter().enumerate() {
        assert_eq!(line["sequenceNumber"], json!(seqno));
        assert_eq!(line["timestamp"], json!("1970-01-01T00:00:00.000Z"));
    }
    Ok(())
}

#[tokio::test]
async fn test_errored_suite_adds_general_run() -> Result<()> {
    let document = document(
        "COMPLETED",
        vec![job("arn:job:1", "ERRORED", default_artifacts())],
    );
    let (outcome, lines) = run_upload(document, &settings()).await?;
    outcome?;

    let records = artifacts(&lines);
    assert_json_eq!(
        records[3],
        tr_start(1, "General", "Automatically added TR", "FAILED")
    );
    assert_json_eq!(
        records[4],
        json!({
            "testRunSetId": 1,
            "testRunId": 1,
            "logMessages": {"lines": SPEC_OUTPUT.lines().collect::<Vec<_>>()}
        })
    );
    assert_json_eq!(
        records[6],
        tr_start(2, "tests\\test_login\\test_ok", "Device farm test", "PASSED")
    );
    assert_json_eq!(records[records.len() - 2], standard(1));
    Ok(())
}

#[tokio::test]
async fn test_stopped_suite_without_spec_output() -> Result<()> {
    let artifacts_without_output = json!([artifact(
        "tests_test_login_test_ok_home",
        "SCREENSHOT",
        "png",
        "home.png"
    )]);
    let document = document(
        "COMPLETED",
        vec![job("arn:job:1", "STOPPED", artifacts_without_output)],
    );
    let (outcome, lines) = run_upload(document, &settings()).await?;

    let outcome = outcome?;
    assert_eq!(outcome.evidence_set.erroring_tests, 0);
    assert_eq!(outcome.evidence_set.failed_tests, 1);

    let records = artifacts(&lines);
    assert_eq!(records.len(), 5);
    assert_json_eq!(
        records[3],
        tr_start(1, "General", "Automatically added TR", "FAILED")
    );
    assert!(records[4].get("evidenceSetCreate").is_some());
    Ok(())
}

#[tokio::test]
async fn test_job_without_tests_suite_keeps_source() -> Result<()> {
    let mut lonely = job("arn:job:2", "PASSED", default_artifacts());
    lonely["suites"] = json!([]);
    lonely["device"]["formFactor"] = json!(null);

    let document = document(
        "COMPLETED",
        vec![lonely, job("arn:job:1", "PASSED", default_artifacts())],
    );
    let (outcome, lines) = run_upload(document, &settings()).await?;
    outcome?;

    let records = artifacts(&lines);
    assert_json_eq!(records[1], trs_start(1, "Google Pixel 7: FAILED"));
    assert_json_eq!(records[2], link(1));
    assert_json_eq!(records[3], trs_start(2, "Google Pixel 7: FAILED"));

    let statuses: Vec<_> = records
        .iter()
        .filter(|r| r.get("testRunSetStatus").is_some())
        .collect();
    assert_eq!(statuses.len(), 1);
    assert_json_eq!(statuses[0], standard(2));

    let evidence_set = &records[records.len() - 1]["evidenceSetCreate"];
    assert_json_eq!(
        evidence_set["sources"],
        json!([
            {"prefix": "", "product": "app", "testRunSetId": 1, "selectionMode": "ALL"},
            {"prefix": "PHONE", "product": "app", "testRunSetId": 2, "selectionMode": "ALL"}
        ])
    );
    Ok(())
}

#[tokio::test]
async fn test_exit_code_on_test_failure() -> Result<()> {
    let settings = UploadSettings {
        fail_on_test_failure: true,
        ..settings()
    };
    let document = document(
        "COMPLETED",
        vec![job("arn:job:1", "PASSED", default_artifacts())],
    );

    let (outcome, _) = run_upload(document, &settings).await?;
    assert_eq!(outcome?.exit_code, 2);
    Ok(())
}

#[tokio::test]
async fn test_lookup_by_arn_and_name() -> Result<()> {
    let by_arn = UploadSettings {
        project: PROJECT_ARN.to_owned(),
        run: RUN_ARN.to_owned(),
        ..settings()
    };
    let (outcome, _) = run_upload(document("COMPLETED", vec![]), &by_arn).await?;
    assert_eq!(outcome?.evidence_set.successful_tests, 0);

    let unknown_project = UploadSettings {
        project: "missing".to_owned(),
        ..settings()
    };
    let (outcome, lines) = run_upload(document("COMPLETED", vec![]), &unknown_project).await?;
    assert_matches!(outcome, Err(UploadError::ProjectNotFound(name)) if name == "missing");
    assert!(lines.is_empty());

    let unknown_run = UploadSettings {
        run: "weekly".to_owned(),
        ..settings()
    };
    let (outcome, _) = run_upload(document("COMPLETED", vec![]), &unknown_run).await?;
    assert_matches!(outcome, Err(UploadError::RunNotFound(_)));
    Ok(())
}

#[tokio::test]
async fn test_duplicate_names_are_rejected() -> Result<()> {
    let mut twice = document("COMPLETED", vec![]);
    let mut copy = twice["projects"][0]["runs"][0].clone();
    copy["arn"] = json!(format!("{RUN_ARN}-copy"));
    if let Some(runs) = twice["projects"][0]["runs"].as_array_mut() {
        runs.push(copy);
    }

    let (outcome, lines) = run_upload(twice, &settings()).await?;
    assert_matches!(
        outcome,
        Err(UploadError::AmbiguousName { kind: "test run", name }) if name == "NIGHTLY"
    );
    assert!(lines.is_empty());

    let mut doubled = job("arn:job:1", "PASSED", default_artifacts());
    let suite = doubled["suites"][1].clone();
    if let Some(suites) = doubled["suites"].as_array_mut() {
        suites.push(suite);
    }
    let (outcome, _) = run_upload(document("COMPLETED", vec![doubled]), &settings()).await?;
    assert_matches!(
        outcome,
        Err(UploadError::AmbiguousName { kind: "suite", name }) if name == "Tests Suite"
    );
    Ok(())
}

#[tokio::test]
async fn test_incomplete_run_is_rejected() -> Result<()> {
    let document = document(
        "RUNNING",
        vec![job("arn:job:1", "PASSED", default_artifacts())],
    );
    let (outcome, lines) = run_upload(document, &settings()).await?;

    assert_matches!(
        outcome,
        Err(UploadError::RunNotComplete { status, .. }) if status == "RUNNING"
    );
    assert!(lines.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_bad_template_aborts() -> Result<()> {
    let settings = UploadSettings {
        test_run_set_name: "{job.device.serial}".to_owned(),
        ..settings()
    };
    let document = document(
        "COMPLETED",
        vec![job("arn:job:1", "PASSED", default_artifacts())],
    );

    let (outcome, _) = run_upload(document, &settings).await?;
    assert_matches!(
        outcome,
        Err(UploadError::Template(TemplateError::UnknownProperty(name))) if name == "serial"
    );
    Ok(())
}
