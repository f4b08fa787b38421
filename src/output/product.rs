// (c) Meta Platforms, Inc. and affiliates.
//
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::output as tv;
use crate::spec;
use tv::{config, emitter, error::OutputError, evidence_set, run_set, state};

/// A product on the results server; the root of every upload.
///
/// All test run sets and evidence sets created through one product share a
/// single journal and id space.
pub struct Product {
    name: String,
    state: Arc<Mutex<state::SinkState>>,
}

impl Product {
    /// Creates a new [`ProductBuilder`] object.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use farm_uploader::output::*;
    ///
    /// let product = Product::builder("my_app").build();
    /// ```
    pub fn builder(name: &str) -> ProductBuilder {
        ProductBuilder::new(name)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Creates a test run set in the `UPLOADING` status.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # tokio_test::block_on(async {
    /// # use farm_uploader::output::*;
    ///
    /// let product = Product::builder("my_app").build();
    /// let trs = product
    ///     .create_test_run_set(
    ///         &TestRunSet::builder("nightly")
    ///             .description("Pixel 7")
    ///             .add_tag("android")
    ///             .build(),
    ///     )
    ///     .await?;
    /// trs.set_status(TestRunSetStatus::Standard).await?;
    ///
    /// # Ok::<(), OutputError>(())
    /// # });
    /// ```
    pub async fn create_test_run_set(
        &self,
        test_run_set: &run_set::TestRunSet,
    ) -> Result<run_set::StartedTestRunSet, OutputError> {
        let mut state = self.state.lock().await;
        let id = state.register_test_run_set();

        let artifact = spec::TestRunSetArtifact {
            test_run_set_id: id,
            artifact: spec::TestRunSetArtifactImpl::TestRunSetStart(
                test_run_set.to_artifact(&self.name),
            ),
        };
        state.emitter.emit(artifact).await?;

        Ok(run_set::StartedTestRunSet::new(
            id,
            self.name.clone(),
            Arc::clone(&self.state),
        ))
    }

    /// Creates an evidence set combining the given test run sets.
    ///
    /// The returned summary tallies the test runs recorded so far in every
    /// source set.
    pub async fn create_evidence_set(
        &self,
        evidence_set: &evidence_set::EvidenceSet,
    ) -> Result<evidence_set::EvidenceSetSummary, OutputError> {
        let mut state = self.state.lock().await;

        let counts = state.counts(&evidence_set.source_ids())?;
        let id = state.register_evidence_set();

        let artifact = spec::EvidenceSetArtifact {
            evidence_set_id: id,
            artifact: spec::EvidenceSetArtifactImpl::EvidenceSetCreate(
                evidence_set.to_artifact(&self.name, counts),
            ),
        };
        state.emitter.emit(artifact).await?;

        Ok(evidence_set::EvidenceSetSummary {
            id,
            successful_tests: counts.successful_tests,
            failed_tests: counts.failed_tests,
            erroring_tests: counts.erroring_tests,
        })
    }
}

/// Builder for the [`Product`] object.
pub struct ProductBuilder {
    name: String,
    config: Option<config::Config>,
}

impl ProductBuilder {
    pub fn new(name: &str) -> Self {
        ProductBuilder {
            name: name.to_owned(),
            config: None,
        }
    }

    /// Sets where and how the upload journal is written.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use farm_uploader::output::*;
    ///
    /// let product = Product::builder("my_app")
    ///     .config(Config::builder().timezone(chrono_tz::Europe::London).build())
    ///     .build();
    /// ```
    pub fn config(mut self, value: config::Config) -> Self {
        self.config = Some(value);
        self
    }

    pub fn build(self) -> Product {
        let config = self.config.unwrap_or_else(|| config::Config::builder().build());
        let emitter = emitter::JournalEmitter::new(config.timestamp_provider, config.target);

        Product {
            name: self.name,
            state: Arc::new(Mutex::new(state::SinkState::new(emitter, config.files_dir))),
        }
    }
}
