// (c) Meta Platforms, Inc. and affiliates.
//
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use std::path::PathBuf;
use std::sync::Arc;

use chrono::NaiveDateTime;
use tokio::sync::Mutex;

use crate::output as tv;
use crate::spec;
use tv::trait_ext::VecExt;
use tv::{error::OutputError, file, state, test_run};

/// Description of a test run set to be created on a [`tv::Product`].
#[derive(Debug, Clone, Default)]
pub struct TestRunSet {
    name: String,
    description: Option<String>,
    ref_date: Option<NaiveDateTime>,
    tags: Vec<String>,
}

impl TestRunSet {
    pub fn builder(name: &str) -> TestRunSetBuilder {
        TestRunSetBuilder::new(name)
    }

    pub fn new(name: &str) -> Self {
        TestRunSetBuilder::new(name).build()
    }

    pub(crate) fn to_artifact(&self, product: &str) -> spec::TestRunSetStart {
        spec::TestRunSetStart {
            product: product.to_owned(),
            name: self.name.clone(),
            description: self.description.clone(),
            ref_date: self.ref_date,
            tags: self.tags.map_option(Clone::clone),
            status: spec::TestRunSetStatus::Uploading,
        }
    }
}

#[derive(Debug, Default)]
pub struct TestRunSetBuilder {
    name: String,
    description: Option<String>,
    ref_date: Option<NaiveDateTime>,
    tags: Vec<String>,
}

impl TestRunSetBuilder {
    fn new(name: &str) -> Self {
        TestRunSetBuilder {
            name: name.to_owned(),
            ..Default::default()
        }
    }

    pub fn description(mut self, value: &str) -> Self {
        self.description = Some(value.to_owned());
        self
    }

    pub fn ref_date(mut self, value: NaiveDateTime) -> Self {
        self.ref_date = Some(value);
        self
    }

    pub fn add_tag(mut self, value: &str) -> Self {
        self.tags.push(value.to_owned());
        self
    }

    pub fn build(self) -> TestRunSet {
        TestRunSet {
            name: self.name,
            description: self.description,
            ref_date: self.ref_date,
            tags: self.tags,
        }
    }
}

/// A named link to an external resource.
#[derive(Debug, Clone, PartialEq)]
pub struct ExternalLink {
    name: String,
    url: String,
    description: Option<String>,
}

impl ExternalLink {
    pub fn new(name: &str, url: &str) -> Self {
        ExternalLink {
            name: name.to_owned(),
            url: url.to_owned(),
            description: None,
        }
    }

    pub fn with_description(mut self, value: &str) -> Self {
        self.description = Some(value.to_owned());
        self
    }

    pub(crate) fn to_artifact(&self) -> spec::ExternalLink {
        spec::ExternalLink {
            name: self.name.clone(),
            url: self.url.clone(),
            description: self.description.clone(),
        }
    }
}

/// A test run set that exists on the results server.
pub struct StartedTestRunSet {
    id: u64,
    product: String,
    state: Arc<Mutex<state::SinkState>>,
}

impl StartedTestRunSet {
    pub(crate) fn new(id: u64, product: String, state: Arc<Mutex<state::SinkState>>) -> Self {
        StartedTestRunSet { id, product, state }
    }

    /// The server-assigned id, used to reference the set from evidence sets.
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn product(&self) -> &str {
        &self.product
    }

    async fn emit(&self, artifact: spec::TestRunSetArtifactImpl) -> Result<(), OutputError> {
        let state = self.state.lock().await;
        state
            .emitter
            .emit(spec::TestRunSetArtifact {
                test_run_set_id: self.id,
                artifact,
            })
            .await?;
        Ok(())
    }

    pub async fn add_external_link(&self, link: &ExternalLink) -> Result<(), OutputError> {
        self.emit(spec::TestRunSetArtifactImpl::ExternalLink(link.to_artifact()))
            .await
    }

    /// Attaches a file to the whole set.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # tokio_test::block_on(async {
    /// # use farm_uploader::output::*;
    ///
    /// let product = Product::builder("my_app").build();
    /// let trs = product.create_test_run_set(&TestRunSet::new("nightly")).await?;
    /// trs.publish_additional_file(&AdditionalFile::new(
    ///     "Test spec output.txt",
    ///     "Full test spec output",
    ///     b"PASSED tests/test_a.py::test_a".to_vec(),
    /// ))
    /// .await?;
    ///
    /// # Ok::<(), OutputError>(())
    /// # });
    /// ```
    pub async fn publish_additional_file(
        &self,
        file: &file::AdditionalFile,
    ) -> Result<(), OutputError> {
        let location = PathBuf::from(format!("trs-{}", self.id));
        let path = {
            let state = self.state.lock().await;
            state
                .store_file(&location, file.name(), file.content())
                .await?
        };

        self.emit(spec::TestRunSetArtifactImpl::AdditionalFile(
            file.to_artifact(path.as_deref()),
        ))
        .await
    }

    /// Creates a test run inside this set.
    pub async fn create_test_run(
        &self,
        test_run: &test_run::TestRun,
    ) -> Result<test_run::StartedTestRun, OutputError> {
        let mut state = self.state.lock().await;
        let id = state.register_test_run(self.id, test_run.status())?;

        state
            .emitter
            .emit(spec::TestRunArtifact {
                test_run_set_id: self.id,
                test_run_id: id,
                artifact: spec::TestRunArtifactImpl::TestRunStart(test_run.to_artifact()),
            })
            .await?;

        Ok(test_run::StartedTestRun::new(
            id,
            self.id,
            Arc::clone(&self.state),
        ))
    }

    pub async fn set_status(&self, status: spec::TestRunSetStatus) -> Result<(), OutputError> {
        self.emit(spec::TestRunSetArtifactImpl::Status(
            spec::TestRunSetStatusChange { status },
        ))
        .await
    }
}
