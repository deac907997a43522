// src/rewrite.rs

//! Content rewriting
//!
//! Substitutes migrated resource references with their new locations. All
//! occurrences of every mapped reference are replaced in a single pass over
//! the original text; output produced by one substitution is never
//! re-scanned for matches of a different key.

use regex::Regex;
use std::collections::BTreeMap;

/// Old reference -> new location substitutions, scoped to one record
///
/// Built only from successful migration outcomes; a failed reference never
/// has an entry and therefore survives rewriting untouched.
pub type UpdateMap = BTreeMap<String, String>;

/// Replace every occurrence of every mapped reference in `content`
///
/// Keys are matched literally, longest first, so a reference that is a
/// substring of another (a rooted path inside an absolute URL, say) can
/// never corrupt the longer occurrence. An empty map returns the content
/// unchanged.
pub fn rewrite(content: &str, updates: &UpdateMap) -> String {
    if updates.is_empty() {
        return content.to_string();
    }

    let mut keys: Vec<&String> = updates.keys().collect();
    keys.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));

    let alternation = keys
        .iter()
        .map(|key| regex::escape(key))
        .collect::<Vec<_>>()
        .join("|");

    match Regex::new(&alternation) {
        Ok(pattern) => pattern
            .replace_all(content, |caps: &regex::Captures<'_>| updates[&caps[0]].clone())
            .into_owned(),
        // Alternations past the compiled-pattern size limit get a manual
        // scan with the same single-pass contract.
        Err(_) => replace_longest_first(content, &keys, updates),
    }
}

/// One cursor over `content`: at each position the longest matching key
/// wins, and its replacement is never re-scanned.
fn replace_longest_first(content: &str, keys: &[&String], updates: &UpdateMap) -> String {
    let mut rewritten = String::with_capacity(content.len());
    let mut rest = content;

    'scan: while !rest.is_empty() {
        for key in keys {
            if rest.starts_with(key.as_str()) {
                rewritten.push_str(&updates[key.as_str()]);
                rest = &rest[key.len()..];
                continue 'scan;
            }
        }
        let step = rest.chars().next().map_or(1, char::len_utf8);
        rewritten.push_str(&rest[..step]);
        rest = &rest[step..];
    }

    rewritten
}
