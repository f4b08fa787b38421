// (c) Meta Platforms, Inc. and affiliates.
//
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use anyhow::Result;
use assert_fs::prelude::*;
use assert_matches::assert_matches;
use predicates::prelude::*;
use serde_json::json;

use farm_uploader::output::{AdditionalFile, Config, OutputError, TestRun, TestRunSet};

use super::fixture::*;

#[tokio::test]
async fn test_file_metadata_without_files_dir() -> Result<()> {
    let expected = [
        json_schema_version(),
        json_trs_start(1, "nightly", 1),
        json!({
            "testRunSetArtifact": {
                "testRunSetId": 1,
                "additionalFile": {
                    "name": "Test spec output.txt",
                    "description": "Full test spec output from AWS",
                    "size": 5,
                    "contentType": "text/plain"
                }
            },
            "sequenceNumber": 2,
            "timestamp": DATETIME_FORMATTED
        }),
    ];

    check_output(&expected, |product| async move {
        let trs = product
            .create_test_run_set(&TestRunSet::new("nightly"))
            .await?;
        trs.publish_additional_file(&AdditionalFile::new(
            "Test spec output.txt",
            "Full test spec output from AWS",
            b"hello".to_vec(),
        ))
        .await?;

        Ok(())
    })
    .await
}

#[tokio::test]
async fn test_files_dir_receives_content() -> Result<()> {
    let dir = assert_fs::TempDir::new()?;
    let trs_file = dir.child("trs-1").child("Test spec output.txt");
    let tr_file = dir.child("trs-1").child("tr-1").child("home.png");

    let expected = [
        json_schema_version(),
        json_trs_start(1, "nightly", 1),
        json!({
            "testRunSetArtifact": {
                "testRunSetId": 1,
                "additionalFile": {
                    "name": "Test spec output.txt",
                    "size": 5,
                    "contentType": "text/plain",
                    "path": trs_file.path().display().to_string()
                }
            },
            "sequenceNumber": 2,
            "timestamp": DATETIME_FORMATTED
        }),
        json_tr_start(1, 1, "tests\\test_ok", "PASSED", 3),
        json!({
            "testRunArtifact": {
                "testRunSetId": 1,
                "testRunId": 1,
                "additionalFile": {
                    "name": "home.png",
                    "description": "From AWS",
                    "size": 3,
                    "contentType": "image/png",
                    "path": tr_file.path().display().to_string()
                }
            },
            "sequenceNumber": 4,
            "timestamp": DATETIME_FORMATTED
        }),
    ];

    let config = Config::builder().files_dir(dir.path());
    check_output_with(&expected, config, |product| async move {
        let trs = product
            .create_test_run_set(&TestRunSet::new("nightly"))
            .await?;
        trs.publish_additional_file(
            &AdditionalFile::builder("Test spec output.txt", b"hello".to_vec()).build(),
        )
        .await?;

        let tr = trs
            .create_test_run(&TestRun::builder("tests\\test_ok", "integration").build())
            .await?;
        tr.publish_additional_file(&AdditionalFile::new(
            "home.png",
            "From AWS",
            vec![0x89, 0x50, 0x4e],
        ))
        .await?;

        Ok(())
    })
    .await?;

    trs_file.assert(predicate::str::diff("hello"));
    tr_file.assert(predicate::path::exists());
    Ok(())
}

#[tokio::test]
async fn test_file_name_must_not_escape() -> Result<()> {
    let expected = [json_schema_version(), json_trs_start(1, "nightly", 1)];

    check_output(&expected, |product| async move {
        let trs = product
            .create_test_run_set(&TestRunSet::new("nightly"))
            .await?;

        let result = trs
            .publish_additional_file(&AdditionalFile::new("../escape.txt", "", vec![]))
            .await;
        assert_matches!(result, Err(OutputError::InvalidFileName(name)) if name == "../escape.txt");

        Ok(())
    })
    .await
}
