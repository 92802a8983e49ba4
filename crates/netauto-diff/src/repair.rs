//! Pre-parse repair of documents returned by devices.
//!
//! Devices are known to inject whitespace into namespace URIs. Each fixup
//! here targets one observed corruption; they run in order before the
//! document reaches the parser.

use once_cell::sync::Lazy;
use regex::Regex;
use std::borrow::Cow;
use tracing::debug;

/// Whitespace inside an `xmlns`/`xmlns:prefix` attribute value.
///
/// One run is removed per attribute per pass.
static NAMESPACE_WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(xmlns(:\w+)?="[^"]*)\s+([^"]*")"#).expect("Invalid regex pattern")
});

/// Upper bound on namespace passes; each pass strictly shortens the input.
const MAX_NAMESPACE_PASSES: usize = 64;

/// Literal corruptions seen in interface replies.
pub const LITERAL_FIXUPS: &[(&str, &str)] = &[
    ("ipi-if-ext ended", "ipi-if-extended"),
    ("ipi-if-ex tended", "ipi-if-extended"),
];

/// Collapses whitespace inside namespace URI values until none is left.
pub fn collapse_namespace_whitespace(xml: &str) -> String {
    let mut current = xml.to_string();
    for _ in 0..MAX_NAMESPACE_PASSES {
        let fixed = match NAMESPACE_WHITESPACE_RE.replace_all(&current, "$1$3") {
            Cow::Borrowed(_) => break,
            Cow::Owned(fixed) => fixed,
        };
        current = fixed;
    }
    current
}

/// Applies every fixup: literal replacements, then namespace whitespace.
pub fn repair(xml: &str) -> String {
    let mut fixed = xml.to_string();
    for (broken, good) in LITERAL_FIXUPS {
        if fixed.contains(broken) {
            debug!(broken, good, "repairing literal corruption");
            fixed = fixed.replace(broken, good);
        }
    }
    collapse_namespace_whitespace(&fixed)
}
