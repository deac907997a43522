// src/extract.rs

//! Resource reference extraction
//!
//! Scans record content for references to binary resources (images and
//! archives) hosted under the origin being migrated away from. A reference
//! is kept verbatim, exactly as it occurs in the text, so the rewriter can
//! later substitute the same occurrence.
//!
//! Extraction is pure: no side effects, and content without matches simply
//! yields an empty set.

use crate::error::{Error, Result};
use regex::Regex;
use std::collections::BTreeSet;

/// File extensions recognized as migratable binary resources
const RESOURCE_EXTENSIONS: &str = "jpe?g|png|gif|bmp|webp|svg|zip|tar|tgz|gz|bz2|rar|7z";

/// Extracts the unique resource references contained in record content
///
/// Matches rooted paths (`/uploads/photo.jpg`) and absolute URLs on the
/// configured origin host (`https://forum.example.com/uploads/photo.jpg`).
/// Absolute URLs on any other host are ignored wholesale, including their
/// path component. An optional prefix list narrows rooted matches to known
/// resource directories.
#[derive(Debug, Clone)]
pub struct ResourceExtractor {
    pattern: Regex,
    origin_host: String,
    path_prefixes: Vec<String>,
}

impl ResourceExtractor {
    /// Compile an extractor for the given origin
    ///
    /// `origin` must be an absolute http(s) URL; its host (including any
    /// port) is the only host accepted in absolute references. An empty
    /// `path_prefixes` accepts any rooted path.
    pub fn new(origin: &str, path_prefixes: &[String]) -> Result<Self> {
        let trimmed = origin.trim_end_matches('/');
        let origin_host = trimmed
            .split_once("://")
            .map(|(_, rest)| rest.split('/').next().unwrap_or(rest).to_ascii_lowercase())
            .filter(|host| !host.is_empty())
            .ok_or_else(|| {
                Error::ParseError(format!("Origin must be an absolute http(s) URL: {origin}"))
            })?;

        let pattern = format!(
            r"(?i)(https?://[A-Za-z0-9.-]+(?::\d+)?)?(/[A-Za-z0-9_%./-]+\.(?:{RESOURCE_EXTENSIONS}))\b"
        );
        let pattern = Regex::new(&pattern)
            .map_err(|e| Error::ParseError(format!("Invalid extraction pattern: {e}")))?;

        Ok(Self {
            pattern,
            origin_host,
            path_prefixes: path_prefixes.to_vec(),
        })
    }

    /// Return the unique set of resource references in `content`
    pub fn extract(&self, content: &str) -> BTreeSet<String> {
        let mut references = BTreeSet::new();

        for caps in self.pattern.captures_iter(content) {
            let path_match = match caps.get(2) {
                Some(m) => m,
                None => continue,
            };
            let path = path_match.as_str();
            // Protocol-relative URLs carry a foreign host in the path slot.
            if path.starts_with("//") {
                continue;
            }
            // A recognized extension must end the token; `.tar` inside
            // `.tar.gz2` is not a reference.
            if has_extension_tail(content, path_match.end()) {
                continue;
            }
            if let Some(host) = caps.get(1) {
                if !self.is_origin(host.as_str()) {
                    continue;
                }
            }
            if !self.matches_prefix(path) {
                continue;
            }
            references.insert(caps[0].to_string());
        }

        references
    }

    fn is_origin(&self, absolute: &str) -> bool {
        match absolute.split_once("://") {
            Some((_, host)) => host.eq_ignore_ascii_case(&self.origin_host),
            None => false,
        }
    }

    fn matches_prefix(&self, path: &str) -> bool {
        self.path_prefixes.is_empty()
            || self
                .path_prefixes
                .iter()
                .any(|prefix| path.starts_with(prefix.as_str()))
    }
}

fn has_extension_tail(content: &str, end: usize) -> bool {
    let mut rest = content[end..].chars();
    rest.next() == Some('.')
        && rest
            .next()
            .is_some_and(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extractor() -> ResourceExtractor {
        ResourceExtractor::new("https://forum.example.com", &[]).unwrap()
    }

    #[test]
    fn test_duplicate_references_collapse() {
        let refs = extractor().extract("see /stuff/a.jpg and /stuff/a.jpg");
        assert_eq!(refs.len(), 1);
        assert!(refs.contains("/stuff/a.jpg"));
    }

    #[test]
    fn test_no_matches_yields_empty_set() {
        assert!(extractor().extract("").is_empty());
        assert!(extractor().extract("plain text without resources").is_empty());
        assert!(extractor().extract("a stray /path/with.no-known-ext").is_empty());
    }

    #[test]
    fn test_absolute_reference_on_origin_host() {
        let refs = extractor().extract("img at https://forum.example.com/uploads/photo.png here");
        assert_eq!(refs.len(), 1);
        assert!(refs.contains("https://forum.example.com/uploads/photo.png"));
    }

    #[test]
    fn test_foreign_host_is_ignored_entirely() {
        let refs = extractor().extract("hotlinked: https://other.example.net/stuff/pic.jpg");
        assert!(refs.is_empty());
    }

    #[test]
    fn test_origin_host_comparison_is_case_insensitive() {
        let refs = extractor().extract("see HTTPS://FORUM.EXAMPLE.COM/stuff/a.jpg");
        assert_eq!(refs.len(), 1);
        assert!(refs.contains("HTTPS://FORUM.EXAMPLE.COM/stuff/a.jpg"));
    }

    #[test]
    fn test_extension_matching_is_case_insensitive() {
        let refs = extractor().extract("archive at /files/backup.ZIP");
        assert!(refs.contains("/files/backup.ZIP"));
    }

    #[test]
    fn test_mixed_references() {
        let content = "photo /uploads/a.jpg, archive /files/dump.tar.gz, \
                       absolute https://forum.example.com/uploads/b.png";
        let refs = extractor().extract(content);
        assert_eq!(refs.len(), 3);
        assert!(refs.contains("/uploads/a.jpg"));
        assert!(refs.contains("/files/dump.tar.gz"));
        assert!(refs.contains("https://forum.example.com/uploads/b.png"));
    }

    #[test]
    fn test_path_prefix_filter() {
        let prefixes = vec!["/uploads".to_string()];
        let extractor = ResourceExtractor::new("https://forum.example.com", &prefixes).unwrap();

        let refs = extractor.extract("/uploads/a.jpg and /elsewhere/b.jpg");
        assert_eq!(refs.len(), 1);
        assert!(refs.contains("/uploads/a.jpg"));
    }

    #[test]
    fn test_prefix_applies_to_absolute_references() {
        let prefixes = vec!["/uploads".to_string()];
        let extractor = ResourceExtractor::new("https://forum.example.com", &prefixes).unwrap();

        let refs = extractor
            .extract("https://forum.example.com/uploads/a.jpg https://forum.example.com/other/b.jpg");
        assert_eq!(refs.len(), 1);
        assert!(refs.contains("https://forum.example.com/uploads/a.jpg"));
    }

    #[test]
    fn test_query_string_is_not_part_of_the_reference() {
        let refs = extractor().extract("cached /stuff/a.jpg?v=2");
        assert_eq!(refs.len(), 1);
        assert!(refs.contains("/stuff/a.jpg"));
    }

    #[test]
    fn test_extension_must_end_the_token() {
        // `.tar` is a prefix of `.tar.gz2`; extracting it would corrupt the
        // occurrence on rewrite.
        assert!(extractor().extract("odd /stuff/a.tar.gz2 name").is_empty());
        assert!(extractor().extract("page /docs/a.jpg.html").is_empty());

        // A sentence period after the reference is not an extension tail.
        let refs = extractor().extract("see /stuff/a.jpg. next sentence");
        assert_eq!(refs.len(), 1);
        assert!(refs.contains("/stuff/a.jpg"));
    }

    #[test]
    fn test_protocol_relative_url_is_skipped() {
        assert!(extractor().extract("see //cdn.example.net/stuff/a.jpg").is_empty());
    }

    #[test]
    fn test_already_migrated_content_yields_nothing() {
        // References rewritten to a foreign storage host no longer match.
        let migrated = "photo at https://static.example-cdn.net/migrated/42/a.jpg";
        assert!(extractor().extract(migrated).is_empty());
    }

    #[test]
    fn test_extraction_is_idempotent() {
        let content = "see /stuff/a.jpg and /files/b.zip";
        let first = extractor().extract(content);
        let second = extractor().extract(content);
        assert_eq!(first, second);
    }

    #[test]
    fn test_rejects_origin_without_scheme() {
        assert!(ResourceExtractor::new("forum.example.com", &[]).is_err());
    }
}
