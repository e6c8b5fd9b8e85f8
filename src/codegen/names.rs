//! Identifier sanitising
//!
//! Turns schema titles and property keys into record and field names, and
//! renders those names as Rust identifiers.
//!
//! Schema-level names are PascalCase segments: every character that is not a
//! letter or digit splits the source, each segment gets its first letter
//! upper-cased. A source with no lowercase letter at all is lower-cased first
//! so that `"MY FOO BAR"` does not turn into a shouting identifier.

use std::sync::LazyLock;

use regex::Regex;

static LOWERCASE: LazyLock<Regex> = LazyLock::new(|| Regex::new("[a-z]").expect("valid regex"));

static SEPARATOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\p{L}\p{N}]").expect("valid regex"));

/// Names the emitted file already uses for its own plumbing
const RESERVED_TYPE_NAMES: &[&str] = &[
    "Self", "String", "Vec", "Option", "Box", "BTreeMap", "Result", "Value",
    "FieldRequired", "Serialize", "Deserialize", "SerializeMap", "Default",
    "Some", "None", "Ok", "Err",
];

const RUST_KEYWORDS: &[&str] = &[
    "as", "break", "const", "continue", "else", "enum", "extern",
    "false", "fn", "for", "if", "impl", "in", "let", "loop", "match", "mod",
    "move", "mut", "pub", "ref", "return", "static", "struct",
    "trait", "true", "type", "unsafe", "use", "where", "while",
    "async", "await", "dyn", "abstract", "become", "box", "do", "final",
    "macro", "override", "priv", "typeof", "unsized", "virtual", "yield", "try",
];

/// Keywords that cannot be written as raw identifiers
const NON_RAW_KEYWORDS: &[&str] = &["self", "Self", "super", "crate", "_"];

/// Sanitise a title or key into a record/field name.
///
/// Returns an empty string when the source has no letters or digits.
pub fn record_name(source: &str) -> String {
    let lowered;
    let source = if LOWERCASE.is_match(source) {
        source
    } else {
        lowered = source.to_lowercase();
        lowered.as_str()
    };

    let mut result = String::with_capacity(source.len());
    for segment in SEPARATOR.split(source) {
        if segment.is_empty() {
            continue;
        }
        if result.is_empty() && segment.chars().next().is_some_and(|c| c.is_numeric()) {
            // Identifiers may not start with a digit
            result.push('_');
        }
        result.push_str(&capitalise_first(segment));
    }
    result
}

fn capitalise_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => first.to_uppercase().chain(chars).collect(),
    }
}

/// Render a record or alias name as a Rust type identifier
pub fn type_ident(name: &str) -> String {
    if RESERVED_TYPE_NAMES.contains(&name) {
        format!("{}_", name)
    } else {
        name.to_string()
    }
}

/// Render a generated field name as a Rust field identifier
pub fn field_ident(name: &str) -> String {
    escape_keyword(&to_snake_case(name))
}

/// Escape a keyword if needed
pub fn escape_keyword(name: &str) -> String {
    if NON_RAW_KEYWORDS.contains(&name) {
        format!("{}_", name)
    } else if RUST_KEYWORDS.contains(&name) {
        format!("r#{}", name)
    } else {
        name.to_string()
    }
}

/// Convert to snake_case
pub fn to_snake_case(s: &str) -> String {
    let mut result = String::with_capacity(s.len() + 4);
    let mut prev_lower = false;

    for c in s.chars() {
        if c.is_uppercase() {
            if prev_lower {
                result.push('_');
            }
            result.extend(c.to_lowercase());
            prev_lower = false;
        } else if c == '-' || c == ' ' {
            result.push('_');
            prev_lower = false;
        } else {
            result.push(c);
            prev_lower = c.is_lowercase() || c.is_numeric();
        }
    }

    result
}

/// Clean a package name into a module identifier, `models` when nothing is left
pub fn package_ident(package: &str) -> String {
    let cleaned: String = package.chars().filter(|c| *c != '.' && *c != '-').collect();
    let cleaned = to_snake_case(cleaned.trim());
    if cleaned.is_empty() {
        return "models".to_string();
    }
    escape_keyword(&cleaned)
}
