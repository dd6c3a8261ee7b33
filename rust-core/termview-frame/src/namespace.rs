// SPDX-License-Identifier: PMPL-1.0-or-later
//! Prefix handling for compact (`rdf:type`) and full IRIs.
//!
//! Identifiers coming back from the server may be in either form depending on
//! the endpoint and the document `@context`, so every ID comparison goes
//! through [`Namespaces::ids_match`].

use std::collections::BTreeMap;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Prefix of blank-node identifiers (documents without a permanent id).
pub const BLANK_NODE_PREFIX: &str = "_:";

/// Compact prefix of WOQL result variables.
pub const VARIABLE_PREFIX: &str = "v:";

const STANDARD_PREFIXES: [(&str, &str); 10] = [
    ("rdf", "http://www.w3.org/1999/02/22-rdf-syntax-ns#"),
    ("rdfs", "http://www.w3.org/2000/01/rdf-schema#"),
    ("xsd", "http://www.w3.org/2001/XMLSchema#"),
    ("owl", "http://www.w3.org/2002/07/owl#"),
    ("xdd", "http://terminusdb.com/schema/xdd#"),
    ("tcs", "http://terminusdb.com/schema/tcs#"),
    ("terminus", "http://terminusdb.com/schema/terminus#"),
    ("vio", "http://terminusdb.com/schema/vio#"),
    ("docs", "http://terminusdb.com/schema/documentation#"),
    ("v", "http://terminusdb.com/schema/woql/variable/"),
];

/// A prefix -> IRI map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Namespaces {
    prefixes: BTreeMap<String, String>,
}

impl Namespaces {
    /// The built-in prefixes every database shares.
    pub fn standard() -> Self {
        let prefixes = STANDARD_PREFIXES
            .iter()
            .map(|(p, iri)| (p.to_string(), iri.to_string()))
            .collect();
        Self { prefixes }
    }

    /// Shared instance of [`Namespaces::standard`].
    pub fn standard_ref() -> &'static Namespaces {
        static STANDARD: OnceLock<Namespaces> = OnceLock::new();
        STANDARD.get_or_init(Namespaces::standard)
    }

    /// Register (or replace) a prefix.
    pub fn insert(&mut self, prefix: impl Into<String>, iri: impl Into<String>) {
        self.prefixes.insert(prefix.into(), iri.into());
    }

    /// IRI bound to `prefix`, if any.
    pub fn iri(&self, prefix: &str) -> Option<&str> {
        self.prefixes.get(prefix).map(String::as_str)
    }

    /// Register every string-valued entry of a JSON-LD `@context`.
    ///
    /// Returns the number of prefixes added.
    pub fn extend_from_context(&mut self, context: &Value) -> usize {
        let Some(map) = context.as_object() else {
            return 0;
        };
        let mut added = 0;
        for (prefix, iri) in map {
            if prefix.starts_with('@') {
                continue;
            }
            if let Some(iri) = iri.as_str() {
                self.insert(prefix.clone(), iri);
                added += 1;
            }
        }
        added
    }

    /// Expand `prefix:local` into a full IRI. Unknown prefixes are returned unchanged.
    pub fn expand(&self, id: &str) -> String {
        if let Some((prefix, local)) = id.split_once(':') {
            if !local.starts_with("//") {
                if let Some(iri) = self.prefixes.get(prefix) {
                    return format!("{iri}{local}");
                }
            }
        }
        id.to_string()
    }

    /// Compact a full IRI using the longest matching prefix.
    pub fn shorten(&self, id: &str) -> String {
        self.prefixes
            .iter()
            .filter(|(_, iri)| id.starts_with(iri.as_str()) && id.len() > iri.len())
            .max_by_key(|(_, iri)| iri.len())
            .map(|(prefix, iri)| format!("{prefix}:{}", &id[iri.len()..]))
            .unwrap_or_else(|| id.to_string())
    }

    /// Compare two identifiers regardless of compact or full form.
    pub fn ids_match(&self, a: &str, b: &str) -> bool {
        a == b || self.expand(a) == self.expand(b)
    }
}

impl Default for Namespaces {
    fn default() -> Self {
        Self::standard()
    }
}

/// Whether `id` names a blank node.
pub fn is_blank_node(id: &str) -> bool {
    id.starts_with(BLANK_NODE_PREFIX)
}

/// Mint a fresh blank-node identifier.
pub fn mint_blank_node() -> String {
    format!("{BLANK_NODE_PREFIX}{}", Uuid::new_v4().simple())
}

/// Strip the WOQL variable prefix (compact or full) from a variable name.
pub fn normalize_variable(name: &str) -> String {
    if let Some(rest) = name.strip_prefix(VARIABLE_PREFIX) {
        return rest.to_string();
    }
    match Namespaces::standard_ref().iri("v") {
        Some(full) => name.strip_prefix(full).unwrap_or(name).to_string(),
        None => name.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_expand_and_shorten() {
        let ns = Namespaces::standard();
        assert_eq!(
            ns.expand("rdf:type"),
            "http://www.w3.org/1999/02/22-rdf-syntax-ns#type"
        );
        assert_eq!(
            ns.shorten("http://www.w3.org/1999/02/22-rdf-syntax-ns#type"),
            "rdf:type"
        );
        assert_eq!(ns.expand("http://example.org/x"), "http://example.org/x");
        assert_eq!(ns.expand("nope:x"), "nope:x");
    }

    #[test]
    fn test_ids_match_across_forms() {
        let ns = Namespaces::standard();
        assert!(ns.ids_match("rdf:type", "http://www.w3.org/1999/02/22-rdf-syntax-ns#type"));
        assert!(ns.ids_match("xsd:string", "xsd:string"));
        assert!(!ns.ids_match("xsd:string", "xsd:integer"));
    }

    #[test]
    fn test_context_prefixes() {
        let mut ns = Namespaces::standard();
        let added = ns.extend_from_context(&json!({
            "@base": "ignored",
            "scm": "http://example.org/schema#",
            "doc": "http://example.org/data/"
        }));
        assert_eq!(added, 2);
        assert!(ns.ids_match("scm:Person", "http://example.org/schema#Person"));
    }

    #[test]
    fn test_blank_nodes() {
        let id = mint_blank_node();
        assert!(is_blank_node(&id));
        assert_ne!(id, mint_blank_node());
        assert!(!is_blank_node("doc:bob"));
    }

    #[test]
    fn test_normalize_variable() {
        assert_eq!(normalize_variable("v:Status"), "Status");
        assert_eq!(
            normalize_variable("http://terminusdb.com/schema/woql/variable/Status"),
            "Status"
        );
        assert_eq!(normalize_variable("Status"), "Status");
    }
}
