// (c) Meta Platforms, Inc. and affiliates.
//
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use anyhow::Result;
use assert_matches::assert_matches;
use serde_json::json;

use farm_uploader::output::{
    EvidenceSet, EvidenceSetSource, ExternalLink, MultipleSourceTestRunsBehaviour, OutputError,
    TestRun, TestRunSet, TestRunStatus,
};

use super::fixture::*;

#[tokio::test]
async fn test_evidence_set_counts_sources() -> Result<()> {
    let expected = [
        json_schema_version(),
        json_trs_start(1, "pixel", 1),
        json_tr_start(1, 1, "ok", "PASSED", 2),
        json_tr_start(1, 2, "bad", "FAILED", 3),
        json_trs_start(2, "galaxy", 4),
        json_tr_start(2, 3, "ok", "PASSED", 5),
        json_tr_start(2, 4, "General", "EXCEPTION", 6),
        json!({
            "evidenceSetArtifact": {
                "evidenceSetId": 1,
                "evidenceSetCreate": {
                    "product": "app",
                    "name": "nightly",
                    "description": "all devices",
                    "tags": ["release"],
                    "links": [{
                        "name": "AWS Job",
                        "url": "https://example.com/run"
                    }],
                    "multipleSourceTestRunsBehaviour": "NOT_ALLOWED",
                    "sources": [
                        {
                            "prefix": "pixel",
                            "product": "app",
                            "testRunSetId": 1,
                            "selectionMode": "ALL"
                        },
                        {
                            "prefix": "",
                            "product": "app",
                            "testRunSetId": 2,
                            "selectionMode": "ALL"
                        }
                    ],
                    "summary": {
                        "successfulTests": 2,
                        "failedTests": 1,
                        "erroringTests": 1
                    }
                }
            },
            "sequenceNumber": 7,
            "timestamp": DATETIME_FORMATTED
        }),
    ];

    check_output(&expected, |product| async move {
        let mut sources = vec![];
        for (name, runs) in [
            ("pixel", [("ok", TestRunStatus::Passed), ("bad", TestRunStatus::Failed)]),
            (
                "galaxy",
                [("ok", TestRunStatus::Passed), ("General", TestRunStatus::Exception)],
            ),
        ] {
            let trs = product.create_test_run_set(&TestRunSet::new(name)).await?;
            for (run, status) in runs {
                trs.create_test_run(&TestRun::builder(run, "integration").status(status).build())
                    .await?;
            }

            let prefix = if name == "pixel" { name } else { "" };
            sources.push(EvidenceSetSource::all(prefix, product.name(), trs.id()));
        }

        let mut builder = EvidenceSet::builder("nightly")
            .description("all devices")
            .add_tag("release")
            .add_link(ExternalLink::new("AWS Job", "https://example.com/run"))
            .multiple_source_behaviour(MultipleSourceTestRunsBehaviour::NotAllowed);
        for source in sources {
            builder = builder.add_source(source);
        }

        let summary = product.create_evidence_set(&builder.build()).await?;
        assert_eq!(summary.id, 1);
        assert_eq!(summary.successful_tests, 2);
        assert_eq!(summary.failed_tests, 1);
        assert_eq!(summary.erroring_tests, 1);
        assert!(summary.has_failures());

        Ok(())
    })
    .await
}

#[tokio::test]
async fn test_evidence_set_unknown_source() -> Result<()> {
    check_output(&[], |product| async move {
        let evidence_set = EvidenceSet::builder("nightly")
            .add_source(EvidenceSetSource::all("", "app", 42))
            .build();

        assert_matches!(
            product.create_evidence_set(&evidence_set).await,
            Err(OutputError::UnknownTestRunSet(42))
        );
        Ok(())
    })
    .await
}
