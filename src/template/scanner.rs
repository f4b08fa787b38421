// (c) Meta Platforms, Inc. and affiliates.
//
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::template::context::{JobContext, Record, Value};
use crate::template::error::TemplateError;

const ROOT: &str = "job";

#[derive(Clone, Copy)]
enum State {
    Normal,
    InPlaceholder,
}

/// Expands every `{job.path}` placeholder in `template` against `context`.
///
/// `{{` produces a literal `{`. A `}` outside a placeholder is plain text.
/// Path segments are matched case-insensitively; a missing intermediate value
/// resolves to an empty string.
///
/// # Examples
///
/// ```rust
/// # use farm_uploader::template::*;
/// let job = JobContext {
///     name: Some("smoke".to_owned()),
///     ..Default::default()
/// };
///
/// assert_eq!(expand("{{{JOB.NAME}}", &job)?, "{smoke}");
/// # Ok::<(), TemplateError>(())
/// ```
pub fn expand(template: &str, context: &JobContext) -> Result<String, TemplateError> {
    let mut state = State::Normal;
    let mut body = String::new();
    let mut output = String::with_capacity(template.len());

    for c in template.chars() {
        match state {
            State::Normal => {
                if c == '{' {
                    state = State::InPlaceholder;
                    body.clear();
                } else {
                    output.push(c);
                }
            }
            State::InPlaceholder => match c {
                '{' if body.is_empty() => {
                    output.push('{');
                    state = State::Normal;
                }
                '{' => return Err(TemplateError::NestedBrace { body }),
                '}' => {
                    let value = resolve(&body, context)?;
                    output.push_str(&value.to_string());
                    state = State::Normal;
                }
                _ => body.push(c),
            },
        }
    }

    match state {
        State::Normal => Ok(output),
        State::InPlaceholder => Err(TemplateError::UnterminatedPlaceholder { body }),
    }
}

fn resolve<'a>(path: &str, context: &'a JobContext) -> Result<Value<'a>, TemplateError> {
    let mut segments = path.split('.');

    let root = segments.next().unwrap_or_default();
    if !root.eq_ignore_ascii_case(ROOT) {
        return Err(TemplateError::UnknownRoot(root.to_owned()));
    }

    let mut current = Value::Record(context as &dyn Record);
    for segment in segments {
        current = match current {
            Value::Record(record) => record
                .field(segment)
                .ok_or_else(|| TemplateError::UnknownProperty(segment.to_owned()))?,
            // null parents propagate silently
            Value::Absent => break,
            Value::Text(_) => {
                return Err(TemplateError::UnknownProperty(segment.to_owned()));
            }
        };
    }

    Ok(current)
}
