// (c) Meta Platforms, Inc. and affiliates.
//
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

mod models;
mod snapshot;
mod source;

pub use models::*;
pub use snapshot::*;
pub use source::*;
