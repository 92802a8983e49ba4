//! Structured-document normalization and diffing.
//!
//! Running and candidate datastores come back from devices with arbitrary
//! whitespace, attribute order and the occasional corrupted namespace URI.
//! [`normalize`] repairs and canonicalizes a document so that [`config_diff`]
//! only reports semantic changes.

pub mod error;
pub mod repair;
pub mod tree;

use similar::TextDiff;
use tracing::debug;

pub use error::{DiffError, DiffResult};
pub use repair::repair;
pub use tree::{local_name, parse, Node};

/// Label of the old side of every diff
pub const RUNNING_LABEL: &str = "running-config";

/// Label of the new side of every diff
pub const CANDIDATE_LABEL: &str = "candidate-config";

/// Lines of context around each hunk
pub const CONTEXT_LINES: usize = 3;

/// Repairs, parses and re-serializes a document in canonical form.
///
/// Whitespace-only text is dropped, attributes are sorted and the tree is
/// printed with two-space indentation. Normalizing the output again yields
/// the same text.
pub fn normalize(xml: &str) -> DiffResult<String> {
    let repaired = repair(xml);
    let mut root = parse(&repaired)?;
    root.canonicalize();
    Ok(root.to_pretty_string())
}

/// Unified diff between two texts, labelled running/candidate.
///
/// Empty when the texts are equal.
pub fn unified_diff(running: &str, candidate: &str) -> String {
    TextDiff::from_lines(running, candidate)
        .unified_diff()
        .context_radius(CONTEXT_LINES)
        .header(RUNNING_LABEL, CANDIDATE_LABEL)
        .to_string()
}

/// Normalizes both documents, then diffs them.
pub fn config_diff(running: &str, candidate: &str) -> DiffResult<String> {
    let running = normalize(running)?;
    let candidate = normalize(candidate)?;
    let diff = unified_diff(&running, &candidate);
    debug!(changed_lines = diff.lines().count(), "computed structured diff");
    Ok(diff)
}
