// (c) Meta Platforms, Inc. and affiliates.
//
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use std::collections::{HashMap, VecDeque};
use std::io::{self, BufRead};

const SUMMARY_SECTION: &str = "short test summary info";
const DETAIL_SECTIONS: [&str; 3] = ["FAILURES", "ERRORS", "PASSES"];
const ERROR_PHASES: [&str; 2] = ["ERROR at setup of ", "ERROR at teardown of "];

/// The outcome and captured output of a single test.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TestEntry {
    /// Dotted test name, e.g. `tests.test_login.TestLogin.test_ok`.
    pub test_name: String,
    pub passed: bool,
    pub body: Vec<String>,
    pub stdout_lines: Vec<String>,
    pub log_messages: Vec<String>,
}

#[derive(Default)]
struct Detail {
    body: Vec<String>,
    stdout_lines: Vec<String>,
    log_messages: Vec<String>,
}

#[derive(Clone, Copy)]
enum Capture {
    Body,
    Stdout,
    Log,
    Ignored,
}

enum Section {
    Other,
    Details,
    Summary,
}

/// Parses the console output of a pytest session run with `-rA`.
///
/// Outcomes come from the short test summary; detail blocks in the
/// FAILURES, ERRORS and PASSES sections supply the body and captured output.
pub fn process_log<R: BufRead>(reader: R) -> Result<Vec<TestEntry>, io::Error> {
    let mut section = Section::Other;
    let mut details: HashMap<String, VecDeque<Detail>> = HashMap::new();
    let mut current: Option<String> = None;
    let mut capture = Capture::Ignored;

    let mut entries: Vec<TestEntry> = Vec::new();
    let mut titles: Vec<String> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for line in lossy_lines(reader) {
        let line = line?;

        if let Some(title) = banner(&line, '=') {
            section = if title.eq_ignore_ascii_case(SUMMARY_SECTION) {
                Section::Summary
            } else if DETAIL_SECTIONS.contains(&title) {
                Section::Details
            } else {
                Section::Other
            };
            current = None;
            continue;
        }

        match section {
            Section::Other => {}
            Section::Details => {
                if let Some(title) = banner(&line, '_') {
                    let title = ERROR_PHASES
                        .iter()
                        .find_map(|p| title.strip_prefix(p))
                        .unwrap_or(title);
                    current = Some(title.to_owned());
                    capture = Capture::Body;
                    details
                        .entry(title.to_owned())
                        .or_default()
                        .push_back(Detail::default());
                    continue;
                }
                if let Some(title) = banner(&line, '-') {
                    capture = capture_kind(title);
                    continue;
                }

                let Some(detail) = current
                    .as_ref()
                    .and_then(|c| details.get_mut(c))
                    .and_then(|d| d.back_mut())
                else {
                    continue;
                };
                match capture {
                    Capture::Body => detail.body.push(line),
                    Capture::Stdout => detail.stdout_lines.push(line),
                    Capture::Log => detail.log_messages.push(line),
                    Capture::Ignored => {}
                }
            }
            Section::Summary => {
                let Some((node_id, passed)) = summary_outcome(&line) else {
                    continue;
                };

                let name = dotted_name(node_id);
                match index.get(&name) {
                    Some(&i) => entries[i].passed &= passed,
                    None => {
                        index.insert(name.clone(), entries.len());
                        titles.push(detail_title(node_id));
                        entries.push(TestEntry {
                            test_name: name,
                            passed,
                            ..Default::default()
                        });
                    }
                }
            }
        }
    }

    for (entry, title) in entries.iter_mut().zip(&titles) {
        if let Some(detail) = details.get_mut(title).and_then(|d| d.pop_front()) {
            entry.body = detail.body;
            entry.stdout_lines = detail.stdout_lines;
            entry.log_messages = detail.log_messages;
        }
    }

    Ok(entries)
}

/// Lines of `reader` with invalid UTF-8 replaced rather than rejected.
fn lossy_lines<R: BufRead>(mut reader: R) -> impl Iterator<Item = Result<String, io::Error>> {
    let mut buf = Vec::new();
    std::iter::from_fn(move || {
        buf.clear();
        match reader.read_until(b'\n', &mut buf) {
            Ok(0) => None,
            Ok(_) => {
                let line = buf.strip_suffix(b"\n").unwrap_or(&buf[..]);
                let line = line.strip_suffix(b"\r").unwrap_or(line);
                Some(Ok(String::from_utf8_lossy(line).into_owned()))
            }
            Err(e) => Some(Err(e)),
        }
    })
}

/// Returns the title of a line like `==== title ====` drawn with `fill`.
fn banner(line: &str, fill: char) -> Option<&str> {
    let line = line.trim_end();
    if !line.starts_with(fill) || !line.ends_with(fill) {
        return None;
    }

    let title = line.trim_matches(fill);
    let leading = line.len() - line.trim_start_matches(fill).len();
    let trailing = line.len() - line.trim_end_matches(fill).len();
    if leading < 3 || trailing < 3 || !title.starts_with(' ') || !title.ends_with(' ') {
        return None;
    }

    let title = title.trim();
    (!title.is_empty()).then_some(title)
}

fn capture_kind(title: &str) -> Capture {
    let title = title.to_ascii_lowercase();
    if !title.starts_with("captured") {
        return Capture::Ignored;
    }
    if title.contains("stdout") || title.contains("stderr") {
        Capture::Stdout
    } else if title.contains("log") {
        Capture::Log
    } else {
        Capture::Ignored
    }
}

/// Parses `PASSED path::test` or `FAILED path::test - reason`.
fn summary_outcome(line: &str) -> Option<(&str, bool)> {
    let (outcome, rest) = line.split_once(' ')?;
    let passed = match outcome {
        "PASSED" | "XPASS" => true,
        "FAILED" | "ERROR" => false,
        _ => return None,
    };

    let node_id = rest.split(" - ").next()?.trim();
    node_id.contains("::").then_some((node_id, passed))
}

/// `tests/test_login.py::TestLogin::test_ok` → `tests.test_login.TestLogin.test_ok`
fn dotted_name(node_id: &str) -> String {
    let (path, rest) = node_id.split_once("::").unwrap_or((node_id, ""));
    let module = path
        .strip_suffix(".py")
        .unwrap_or(path)
        .replace(['/', '\\'], ".");

    if rest.is_empty() {
        module
    } else {
        format!("{}.{}", module, rest.replace("::", "."))
    }
}

/// Detail blocks are headed by the node id without its module path.
fn detail_title(node_id: &str) -> String {
    match node_id.split_once("::") {
        Some((_, rest)) => rest.replace("::", "."),
        None => node_id.to_owned(),
    }
}
