//! CURIE expansion against the prefix maps accumulated from SSSOM headers.
//!
//! Every SSSOM file carries a `curie_map` in its header. The maps of all
//! files in a run are merged into one table, later files overwriting earlier
//! ones on collision, and node identifiers are expanded against it.
//!
//! An unknown prefix is not an error: the node still gets a row, with an
//! empty URI.

use std::collections::{BTreeMap, HashMap};

use tracing::debug;

/// A CURIE split into its parts, with the URI it expands to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedCurie {
    pub prefix: String,
    pub local_part: String,
    /// Expanded URI, or empty when the prefix is not in the table.
    pub uri: String,
}

impl ResolvedCurie {
    pub fn is_resolved(&self) -> bool {
        !self.uri.is_empty()
    }
}

/// Split a CURIE at its first `:`.
///
/// An id without a colon has an empty prefix and is its own local part.
pub fn split_curie(curie: &str) -> (&str, &str) {
    match curie.split_once(':') {
        Some((prefix, local)) => (prefix, local),
        None => ("", curie),
    }
}

/// Run-wide prefix -> URI base table.
#[derive(Debug, Clone, Default)]
pub struct CurieResolver {
    prefixes: HashMap<String, String>,
}

impl CurieResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install the entries of one file's `curie_map`. Last merge wins.
    pub fn merge_header(&mut self, curie_map: &BTreeMap<String, String>) {
        for (prefix, base) in curie_map {
            self.prefixes.insert(prefix.clone(), base.clone());
        }
        debug!(
            merged = curie_map.len(),
            total = self.prefixes.len(),
            "merged curie_map into prefix table"
        );
    }

    /// URI base currently registered for `prefix`, without case folding.
    #[cfg(test)]
    fn base_for(&self, prefix: &str) -> Option<&str> {
        self.prefixes.get(prefix).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.prefixes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prefixes.is_empty()
    }

    /// Expand `curie` into a [`ResolvedCurie`].
    ///
    /// The prefix is looked up verbatim first, then upper-cased. A hit on the
    /// upper-cased key repairs the table: the base is stored under the
    /// verbatim prefix as well, so the next lookup of that spelling hits
    /// directly and later merges of the upper-cased key do not affect it.
    pub fn resolve(&mut self, curie: &str) -> ResolvedCurie {
        let (prefix, local_part) = split_curie(curie);

        let base = if prefix.is_empty() {
            None
        } else if let Some(base) = self.prefixes.get(prefix) {
            Some(base.clone())
        } else {
            let upper = prefix.to_uppercase();
            match self.prefixes.get(&upper).cloned() {
                Some(base) => {
                    debug!(prefix, upper = %upper, "prefix resolved by upper-case fallback");
                    self.prefixes.insert(prefix.to_string(), base.clone());
                    Some(base)
                }
                None => None,
            }
        };

        let uri = match base {
            Some(base) => format!("{base}{local_part}"),
            None => String::new(),
        };

        ResolvedCurie {
            prefix: prefix.to_string(),
            local_part: local_part.to_string(),
            uri,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(entries: &[(&str, &str)]) -> BTreeMap<String, String> {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_resolve_verbatim_prefix() {
        let mut resolver = CurieResolver::new();
        resolver.merge_header(&map(&[("HP", "http://purl.obolibrary.org/obo/HP_")]));

        let resolved = resolver.resolve("HP:0000001");
        assert_eq!(resolved.prefix, "HP");
        assert_eq!(resolved.local_part, "0000001");
        assert_eq!(resolved.uri, "http://purl.obolibrary.org/obo/HP_0000001");
        assert!(resolved.is_resolved());
    }

    #[test]
    fn test_unknown_prefix_gives_empty_uri() {
        let mut resolver = CurieResolver::new();
        resolver.merge_header(&map(&[("HP", "http://purl.obolibrary.org/obo/HP_")]));

        let resolved = resolver.resolve("MONDO:0000001");
        assert_eq!(resolved.prefix, "MONDO");
        assert_eq!(resolved.local_part, "0000001");
        assert_eq!(resolved.uri, "");
        assert!(!resolved.is_resolved());
    }

    #[test]
    fn test_resolve_is_idempotent() {
        let mut resolver = CurieResolver::new();
        resolver.merge_header(&map(&[("GO", "http://purl.obolibrary.org/obo/GO_")]));

        let first = resolver.resolve("go:0008150");
        let second = resolver.resolve("go:0008150");
        assert_eq!(first, second);

        let first = resolver.resolve("XX:1");
        let second = resolver.resolve("XX:1");
        assert_eq!(first, second);
    }

    #[test]
    fn test_upper_case_fallback_repairs_table() {
        let mut resolver = CurieResolver::new();
        resolver.merge_header(&map(&[("MESH", "http://id.nlm.nih.gov/mesh/")]));
        assert!(resolver.base_for("mesh").is_none());

        let lower = resolver.resolve("mesh:D001");
        assert_eq!(lower.uri, "http://id.nlm.nih.gov/mesh/D001");
        assert_eq!(lower.prefix, "mesh");

        // repaired: the lower-case spelling is now a direct hit
        assert_eq!(resolver.base_for("mesh"), Some("http://id.nlm.nih.gov/mesh/"));

        let upper = resolver.resolve("MESH:D002");
        assert_eq!(upper.uri, "http://id.nlm.nih.gov/mesh/D002");
    }

    #[test]
    fn test_later_merge_overwrites_earlier() {
        let mut resolver = CurieResolver::new();
        resolver.merge_header(&map(&[("EX", "http://old.example/")]));
        resolver.merge_header(&map(&[("EX", "http://new.example/")]));

        assert_eq!(resolver.len(), 1);
        assert_eq!(resolver.resolve("EX:1").uri, "http://new.example/1");
    }

    #[test]
    fn test_curie_without_colon() {
        let mut resolver = CurieResolver::new();
        resolver.merge_header(&map(&[("", "http://should-not-match/")]));

        let resolved = resolver.resolve("orphan");
        assert_eq!(resolved.prefix, "");
        assert_eq!(resolved.local_part, "orphan");
        assert_eq!(resolved.uri, "");
    }

    #[test]
    fn test_split_curie_uses_first_colon() {
        assert_eq!(split_curie("a:b:c"), ("a", "b:c"));
        assert_eq!(split_curie("x"), ("", "x"));
        assert_eq!(split_curie(":y"), ("", "y"));
    }
}
