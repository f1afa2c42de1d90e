//! Changed-file-to-task lookup.
//!
//! A changed path matches a group either by suffix against one of its
//! literal source filenames, or by one of its declared wildcard watch
//! patterns. The first matching task wins, in manifest declaration order.

use crate::task::Task;

/// Find the one task responsible for rebuilding `changed`. Returns `None`
/// when no group claims the path; the caller decides how loudly to warn.
pub(crate) fn find_task<'a>(tasks: &'a [Task], changed: &str) -> Option<&'a Task> {
    // Backslashes are normalized so Windows file paths work.
    let changed = changed.replace('\\', "/");
    let cleaned = trim_edges(&changed);

    tasks.iter().find(|task| {
        let spec = task.spec();
        spec.sources
            .iter()
            .any(|source| cleaned.ends_with(trim_edges(source)))
            || spec.watch.iter().any(|pattern| wildcard(pattern, &changed))
    })
}

fn trim_edges(s: &str) -> &str {
    s.trim_start_matches(['.', '/'])
}

/// Simple wildcard matcher: `*` matches any run of characters, `?` exactly
/// one, everything else is literal. Unanchored, so a pattern may match
/// anywhere inside the text.
pub(crate) fn wildcard(pattern: &str, text: &str) -> bool {
    let pattern: Vec<char> = pattern.chars().collect();
    let text: Vec<char> = text.chars().collect();

    (0..=text.len()).any(|start| matches_prefix(&pattern, &text[start..]))
}

fn matches_prefix(pattern: &[char], text: &[char]) -> bool {
    match pattern.split_first() {
        None => true,
        Some((&'*', rest)) => {
            (0..=text.len()).any(|taken| matches_prefix(rest, &text[taken..]))
        }
        Some((&'?', rest)) => !text.is_empty() && matches_prefix(rest, &text[1..]),
        Some((&expected, rest)) => {
            text.first() == Some(&expected) && matches_prefix(rest, &text[1..])
        }
    }
}
