// (c) Meta Platforms, Inc. and affiliates.
//
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::Mutex;

use crate::output as tv;
use crate::spec;
use tv::{error::OutputError, file, state};

/// Description of a single test result inside a test run set.
#[derive(Debug, Clone)]
pub struct TestRun {
    name: String,
    description: Option<String>,
    test_run_type: String,
    status: spec::TestRunStatus,
}

impl TestRun {
    /// Creates a new [`TestRunBuilder`]; the status defaults to passed.
    pub fn builder(name: &str, test_run_type: &str) -> TestRunBuilder {
        TestRunBuilder::new(name, test_run_type)
    }

    pub fn status(&self) -> spec::TestRunStatus {
        self.status
    }

    pub(crate) fn to_artifact(&self) -> spec::TestRunStart {
        spec::TestRunStart {
            name: self.name.clone(),
            description: self.description.clone(),
            test_run_type: self.test_run_type.clone(),
            status: self.status,
        }
    }
}

pub struct TestRunBuilder {
    name: String,
    description: Option<String>,
    test_run_type: String,
    status: spec::TestRunStatus,
}

impl TestRunBuilder {
    fn new(name: &str, test_run_type: &str) -> Self {
        TestRunBuilder {
            name: name.to_owned(),
            description: None,
            test_run_type: test_run_type.to_owned(),
            status: spec::TestRunStatus::Passed,
        }
    }

    pub fn description(mut self, value: &str) -> Self {
        self.description = Some(value.to_owned());
        self
    }

    pub fn status(mut self, value: spec::TestRunStatus) -> Self {
        self.status = value;
        self
    }

    pub fn build(self) -> TestRun {
        TestRun {
            name: self.name,
            description: self.description,
            test_run_type: self.test_run_type,
            status: self.status,
        }
    }
}

/// A test run that exists on the results server.
pub struct StartedTestRun {
    id: u64,
    test_run_set_id: u64,
    state: Arc<Mutex<state::SinkState>>,
}

impl StartedTestRun {
    pub(crate) fn new(id: u64, test_run_set_id: u64, state: Arc<Mutex<state::SinkState>>) -> Self {
        StartedTestRun {
            id,
            test_run_set_id,
            state,
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    async fn emit(&self, artifact: spec::TestRunArtifactImpl) -> Result<(), OutputError> {
        let state = self.state.lock().await;
        state
            .emitter
            .emit(spec::TestRunArtifact {
                test_run_set_id: self.test_run_set_id,
                test_run_id: self.id,
                artifact,
            })
            .await?;
        Ok(())
    }

    /// Publishes log lines for this test run.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # tokio_test::block_on(async {
    /// # use farm_uploader::output::*;
    ///
    /// let product = Product::builder("my_app").build();
    /// let trs = product.create_test_run_set(&TestRunSet::new("nightly")).await?;
    /// let tr = trs
    ///     .create_test_run(&TestRun::builder("login\\test_ok", "integration").build())
    ///     .await?;
    /// tr.publish_log_messages(["=== STD OUT ===", "logged in", ""]).await?;
    ///
    /// # Ok::<(), OutputError>(())
    /// # });
    /// ```
    pub async fn publish_log_messages<I, S>(&self, lines: I) -> Result<(), OutputError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let lines = lines.into_iter().map(Into::into).collect();
        self.emit(spec::TestRunArtifactImpl::LogMessages(spec::LogMessages {
            lines,
        }))
        .await
    }

    pub async fn publish_additional_file(
        &self,
        file: &file::AdditionalFile,
    ) -> Result<(), OutputError> {
        let location = PathBuf::from(format!("trs-{}", self.test_run_set_id))
            .join(format!("tr-{}", self.id));
        let path = {
            let state = self.state.lock().await;
            state
                .store_file(&location, file.name(), file.content())
                .await?
        };

        self.emit(spec::TestRunArtifactImpl::AdditionalFile(
            file.to_artifact(path.as_deref()),
        ))
        .await
    }
}
