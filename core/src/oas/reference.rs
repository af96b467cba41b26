#![deny(missing_docs)]

//! # Reference Paths
//!
//! Parses `$ref` strings into canonical, document-local JSON Pointers.
//!
//! Only references into the current document (`#/...`) are supported. The
//! pointer is canonicalized segment by segment so that `#/components/schemas/User%20Profile`
//! and a component registered as `User Profile` compare equal.

use crate::error::ResolveError;
use derive_more::Display;
use percent_encoding::percent_decode_str;

/// Prefix of every component schema pointer.
const COMPONENT_SCHEMAS: &str = "/components/schemas/";

/// A canonical JSON Pointer into the current document, without the leading `#`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Display)]
pub struct ReferencePath(String);

impl ReferencePath {
    /// Parses a raw `$ref`.
    ///
    /// Anything with a document part (absolute URIs, relative file names) is rejected.
    pub fn parse(raw: &str) -> Result<Self, ResolveError> {
        match raw.split_once('#') {
            Some(("", fragment)) => Ok(Self::canonical(fragment)),
            _ => Err(ResolveError::InvalidReference {
                reference: raw.to_string(),
            }),
        }
    }

    /// The pointer of a schema declared under `components/schemas`.
    pub fn for_component(name: &str) -> Self {
        Self(format!("{}{}", COMPONENT_SCHEMAS, encode_pointer_segment(name)))
    }

    /// The pointer as a string slice, e.g. `/components/schemas/Pet`.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn canonical(fragment: &str) -> Self {
        if fragment.is_empty() {
            return Self(String::new());
        }
        let segments: Vec<String> = fragment
            .trim_start_matches('/')
            .split('/')
            .map(|segment| encode_pointer_segment(&decode_pointer_segment(segment)))
            .collect();
        Self(format!("/{}", segments.join("/")))
    }
}

/// Decodes a JSON Pointer segment (handles `~1`, `~0` and percent-encoding).
pub(crate) fn decode_pointer_segment(segment: &str) -> String {
    let decoded = segment.replace("~1", "/").replace("~0", "~");
    percent_decode_str(&decoded)
        .decode_utf8_lossy()
        .into_owned()
}

fn encode_pointer_segment(segment: &str) -> String {
    segment.replace('~', "~0").replace('/', "~1")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_local_reference() {
        let path = ReferencePath::parse("#/components/schemas/User").unwrap();
        assert_eq!(path.as_str(), "/components/schemas/User");
    }

    #[test]
    fn test_parse_matches_component_pointer() {
        let parsed = ReferencePath::parse("#/components/schemas/User%20Profile").unwrap();
        assert_eq!(parsed, ReferencePath::for_component("User Profile"));

        let escaped = ReferencePath::parse("#/components/schemas/a~1b").unwrap();
        assert_eq!(escaped, ReferencePath::for_component("a/b"));
        assert_eq!(escaped.as_str(), "/components/schemas/a~1b");
    }

    #[test]
    fn test_remote_references_rejected() {
        for raw in [
            "https://example.com/openapi.yaml#/components/schemas/User",
            "other.yaml#/components/schemas/User",
            "User",
        ] {
            let err = ReferencePath::parse(raw).unwrap_err();
            assert!(matches!(err, ResolveError::InvalidReference { .. }), "{raw}");
        }
    }

    #[test]
    fn test_decode_pointer_segment_percent_encoding() {
        let encoded = "User%20Profile~1details";
        let decoded = decode_pointer_segment(encoded);
        assert_eq!(decoded, "User Profile/details");
    }
}
