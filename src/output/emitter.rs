// (c) Meta Platforms, Inc. and affiliates.
//
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use std::io;
use std::sync::atomic::{self, Ordering};

use crate::output::{config, writer::JournalTarget};
use crate::spec;

/// Serializes journal artifacts, one JSON object per line.
///
/// The first line written by an emitter is always the schema version.
pub struct JournalEmitter {
    timestamp_provider: Box<dyn config::TimestampProvider + Send + Sync + 'static>,
    target: JournalTarget,
    seqno: atomic::AtomicU64,
}

impl JournalEmitter {
    pub(crate) fn new(
        timestamp_provider: Box<dyn config::TimestampProvider + Send + Sync + 'static>,
        target: JournalTarget,
    ) -> Self {
        JournalEmitter {
            timestamp_provider,
            target,
            seqno: atomic::AtomicU64::new(0),
        }
    }

    fn serialize(&self, artifact: spec::RootImpl, seqno: u64) -> String {
        let root = spec::Root {
            artifact,
            timestamp: self.timestamp_provider.now(),
            seqno,
        };

        serde_json::json!(root).to_string()
    }

    /// Writes `artifact`, preceded by the schema version if nothing was
    /// written yet.
    pub async fn emit<A: Into<spec::RootImpl>>(&self, artifact: A) -> Result<(), io::Error> {
        let mut seqno = self.seqno.fetch_add(1, Ordering::AcqRel);
        if seqno == 0 {
            let header = spec::RootImpl::SchemaVersion(spec::SchemaVersion::default());
            self.target.write_line(&self.serialize(header, 0)).await?;
            seqno = self.seqno.fetch_add(1, Ordering::AcqRel);
        }

        let line = self.serialize(artifact.into(), seqno);
        self.target.write_line(&line).await
    }
}
