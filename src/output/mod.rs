// (c) Meta Platforms, Inc. and affiliates.
//
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Results-server side of the upload: products, test run sets, test runs
//! and evidence sets, recorded as a JSON-lines journal.

mod config;
mod emitter;
mod error;
mod evidence_set;
mod file;
mod product;
mod run_set;
mod state;
mod test_run;
mod trait_ext;
mod writer;

pub use config::*;
pub use error::*;
pub use evidence_set::*;
pub use file::*;
pub use product::*;
pub use run_set::*;
pub use test_run::*;
pub use writer::*;

pub use crate::spec::MultipleSourceTestRunsBehaviour;
pub use crate::spec::TestRunSelectionMode;
pub use crate::spec::TestRunSetStatus;
pub use crate::spec::TestRunStatus;
pub use crate::spec::SPEC_VERSION;
