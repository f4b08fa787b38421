// (c) Meta Platforms, Inc. and affiliates.
//
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use thiserror::Error;

/// Failure of a single [`crate::template::expand`] call.
///
/// Any of these aborts the whole expansion; no partial output is produced.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TemplateError {
    /// A `{` showed up inside a placeholder body that already had content.
    #[error("'{{' found in the middle of placeholder '{body}'")]
    NestedBrace { body: String },

    /// The template ended while a placeholder was still open.
    #[error("unclosed '{{' found, placeholder '{body}' was never terminated")]
    UnterminatedPlaceholder { body: String },

    /// The first path segment was not `job`.
    #[error("don't know how to handle root property '{0}'")]
    UnknownRoot(String),

    /// A path segment named no field of the record it was resolved against.
    #[error("unknown property '{0}'")]
    UnknownProperty(String),
}
