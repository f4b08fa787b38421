// (c) Meta Platforms, Inc. and affiliates.
//
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use std::collections::BTreeMap;
use std::path::{Component, Path, PathBuf};

use tokio::fs;

use crate::output::{emitter, error::OutputError};
use crate::spec;

/// Shared bookkeeping for one product's upload session.
pub(crate) struct SinkState {
    pub emitter: emitter::JournalEmitter,
    files_dir: Option<PathBuf>,

    next_test_run_set_id: u64,
    next_test_run_id: u64,
    next_evidence_set_id: u64,

    statuses: BTreeMap<u64, Vec<spec::TestRunStatus>>,
}

impl SinkState {
    pub fn new(emitter: emitter::JournalEmitter, files_dir: Option<PathBuf>) -> Self {
        SinkState {
            emitter,
            files_dir,
            next_test_run_set_id: 1,
            next_test_run_id: 1,
            next_evidence_set_id: 1,
            statuses: BTreeMap::new(),
        }
    }

    pub fn register_test_run_set(&mut self) -> u64 {
        let id = self.next_test_run_set_id;
        self.next_test_run_set_id += 1;
        self.statuses.insert(id, vec![]);
        id
    }

    pub fn register_test_run(
        &mut self,
        test_run_set_id: u64,
        status: spec::TestRunStatus,
    ) -> Result<u64, OutputError> {
        let statuses = self
            .statuses
            .get_mut(&test_run_set_id)
            .ok_or(OutputError::UnknownTestRunSet(test_run_set_id))?;
        statuses.push(status);

        let id = self.next_test_run_id;
        self.next_test_run_id += 1;
        Ok(id)
    }

    pub fn register_evidence_set(&mut self) -> u64 {
        let id = self.next_evidence_set_id;
        self.next_evidence_set_id += 1;
        id
    }

    /// Tallies the test runs of the given sets.
    pub fn counts(&self, test_run_set_ids: &[u64]) -> Result<spec::EvidenceSetCounts, OutputError> {
        let mut counts = spec::EvidenceSetCounts::default();
        for id in test_run_set_ids {
            let statuses = self
                .statuses
                .get(id)
                .ok_or(OutputError::UnknownTestRunSet(*id))?;

            for status in statuses {
                match status {
                    spec::TestRunStatus::Passed => counts.successful_tests += 1,
                    spec::TestRunStatus::Failed => counts.failed_tests += 1,
                    spec::TestRunStatus::Exception => counts.erroring_tests += 1,
                }
            }
        }
        Ok(counts)
    }

    /// Stores a published file's content below the files directory, if one
    /// is configured, and returns where it went.
    pub async fn store_file(
        &self,
        location: &Path,
        name: &str,
        content: &[u8],
    ) -> Result<Option<PathBuf>, OutputError> {
        if !is_plain_file_name(name) {
            return Err(OutputError::InvalidFileName(name.to_owned()));
        }

        let Some(root) = &self.files_dir else {
            return Ok(None);
        };

        let dir = root.join(location);
        fs::create_dir_all(&dir).await?;

        let path = dir.join(name);
        fs::write(&path, content).await?;
        Ok(Some(path))
    }
}

fn is_plain_file_name(name: &str) -> bool {
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}
