// (c) Meta Platforms, Inc. and affiliates.
//
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum OutputError {
    #[error("failed to write upload output")]
    IoError(#[from] io::Error),

    #[error("'{0}' cannot be used as a file name")]
    InvalidFileName(String),

    #[error("test run set #{0} was not created by this product")]
    UnknownTestRunSet(u64),
}
