// (c) Meta Platforms, Inc. and affiliates.
//
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Token substitution for user supplied names, descriptions and tags.
//!
//! Templates reference properties of a device-farm job with `{job.path}`
//! placeholders; `{{` is the escape for a literal brace.

mod context;
mod error;
mod scanner;

pub use context::*;
pub use error::*;
pub use scanner::expand;
