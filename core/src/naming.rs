#![deny(missing_docs)]

//! # Identifier Sanitizing
//!
//! Turns raw schema names into generated type names, module names and field
//! identifiers.

use crate::config::Config;
use crate::oas::reference::decode_pointer_segment;
use derive_more::Display;
use regex::Regex;
use std::borrow::Borrow;
use std::sync::OnceLock;

/// Words that cannot be used verbatim as an identifier in generated code.
const RESERVED_WORDS: &[&str] = &[
    "as", "async", "await", "break", "const", "continue", "crate", "dyn", "else", "enum",
    "extern", "false", "fn", "for", "if", "impl", "in", "let", "loop", "match", "mod", "move",
    "mut", "pub", "ref", "return", "self", "Self", "static", "struct", "super", "trait", "true",
    "type", "unsafe", "use", "where", "while", "abstract", "become", "box", "do", "final",
    "macro", "override", "priv", "try", "typeof", "unsized", "virtual", "yield", "Box", "Err",
    "None", "Ok", "Option", "Result", "Some", "String", "Vec",
];

/// Removes every character that is not a word character or a known delimiter.
pub fn sanitize(value: &str) -> String {
    static INVALID_RE: OnceLock<Regex> = OnceLock::new();
    let invalid_re =
        INVALID_RE.get_or_init(|| Regex::new(r"[^\w. _-]+").expect("Invalid regex"));
    invalid_re.replace_all(value, "").into_owned()
}

/// Splits a string on camel-case boundaries and on the delimiters `. _-` and space.
///
/// Camel-case splitting only happens when the value contains an uppercase letter.
pub fn split_words(value: &str) -> Vec<String> {
    static CAMEL_RE: OnceLock<Regex> = OnceLock::new();
    let camel_re = CAMEL_RE.get_or_init(|| Regex::new(r"[A-Z]?[a-z]+").expect("Invalid regex"));

    static WORD_RE: OnceLock<Regex> = OnceLock::new();
    let word_re = WORD_RE.get_or_init(|| Regex::new(r"[^. _-]+").expect("Invalid regex"));

    let spaced = if value.chars().any(char::is_uppercase) {
        let mut pieces = Vec::new();
        let mut last = 0;
        for m in camel_re.find_iter(value) {
            pieces.push(&value[last..m.start()]);
            pieces.push(m.as_str());
            last = m.end();
        }
        pieces.push(&value[last..]);
        pieces.join(" ")
    } else {
        value.to_string()
    };

    word_re
        .find_iter(&spaced)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// `fooBar-baz` -> `foo_bar_baz`
pub fn snake_case(value: &str) -> String {
    split_words(&sanitize(value)).join("_").to_lowercase()
}

/// `foo_bar` -> `FooBar`. Fully uppercase words (`HTTP`) are kept as they are.
pub fn pascal_case(value: &str) -> String {
    split_words(&sanitize(value))
        .iter()
        .map(|word| {
            if is_upper(word) {
                word.clone()
            } else {
                capitalize(word)
            }
        })
        .collect()
}

/// Appends `_` to words that are reserved in generated code.
pub fn fix_reserved_words(value: &str) -> String {
    if RESERVED_WORDS.contains(&value) {
        format!("{}_", value)
    } else {
        value.to_string()
    }
}

fn is_upper(word: &str) -> bool {
    word.chars().any(char::is_uppercase) && !word.chars().any(char::is_lowercase)
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

fn is_identifier(value: &str) -> bool {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) if first.is_alphabetic() || first == '_' => {
            chars.all(|c| c.is_alphanumeric() || c == '_')
        }
        _ => false,
    }
}

/// A sanitized, PascalCase name for a generated type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Display)]
pub struct ClassName(String);

impl ClassName {
    /// Builds a type name, prefixing it when the result is not a valid identifier.
    pub fn new(value: &str, prefix: &str) -> Self {
        let name = fix_reserved_words(&pascal_case(&sanitize(value)));
        if is_identifier(&name) {
            Self(name)
        } else {
            Self(format!("{}{}", prefix, name))
        }
    }

    /// The name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for ClassName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// A sanitized field (or module) identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Display)]
pub struct FieldName(String);

impl FieldName {
    /// Builds an identifier from a raw name.
    ///
    /// `skip_snake_case` keeps the sanitized raw casing; it is the forced
    /// policy used to separate names such as `fooBar` and `foo_bar`.
    pub fn new(value: &str, prefix: &str, skip_snake_case: bool) -> Self {
        let sanitized = sanitize(value);
        let cased = if skip_snake_case {
            sanitized
        } else {
            snake_case(&sanitized)
        };
        let name = fix_reserved_words(&cased);
        if !is_identifier(&name) || value.starts_with('_') {
            Self(format!("{}{}", prefix, name))
        } else {
            Self(name)
        }
    }

    /// The identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// The identity of a generated type: its name and the module it lives in.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Class {
    /// Generated type name.
    pub name: ClassName,
    /// Generated module name.
    pub module_name: FieldName,
}

impl Class {
    /// Derives a type identity from an arbitrary string.
    ///
    /// Only the segment after the last `/` is used, so reference paths such as
    /// `/components/schemas/Pet` yield `Pet`.
    pub fn from_string(string: &str, config: &Config) -> Self {
        let last = string.rsplit('/').next().unwrap_or(string);
        let decoded = decode_pointer_segment(last);
        let prefix = config.field_prefix.as_str();

        let mut name = ClassName::new(&decoded, prefix);
        let class_override = config.class_overrides.get(name.as_str()).cloned();
        if let Some(class_name) = class_override.as_ref().and_then(|o| o.class_name.as_deref()) {
            name = ClassName::new(class_name, prefix);
        }
        let module_source = class_override
            .and_then(|o| o.module_name)
            .unwrap_or_else(|| name.to_string());
        let module_name = FieldName::new(&module_source, prefix, false);

        Self { name, module_name }
    }
}
