// cleanvars-core/src/fields.rs
//! Field-name classification and value-shape checks.
//!
//! The deny-list stems come from the keyword plugin of detect_secrets
//! (Apache v2 License). A candidate key is sensitive when any stem matches
//! anywhere in its name, case-insensitively, with an arbitrary trailing
//! word-character suffix (`password_secure`, `quayPassword`). A small
//! allow-list of exact names overrides the stems: `NOPASSWD` is a sudoers
//! keyword, not a secret holder.
//!
//! License: MIT OR APACHE 2.0

use once_cell::sync::Lazy;
use regex::{Regex, RegexBuilder};

const DENYLIST: &[&str] = &[
    "api_?key",
    "auth_?key",
    "service_?key",
    "account_?key",
    "db_?key",
    "database_?key",
    "priv_?key",
    "private_?key",
    "client_?key",
    r"host\w*_key",
    "db_?pass",
    "database_?pass",
    "key_?pass",
    "key_?data",
    "key_?name",
    "password",
    "passwd",
    "pass",
    "pwd",
    "secret",
    "contraseña",
    "contrasena",
    "access_key",
];

// Suffix support after a keyword, i.e. `password_secure = "value"`.
const AFFIX: &str = r"\w*";

static DENYLIST_RE: Lazy<Regex> = Lazy::new(|| {
    let alternation = DENYLIST.join("|");
    RegexBuilder::new(&format!("({alternation}){AFFIX}"))
        .case_insensitive(true)
        .multi_line(true)
        .build()
        .expect("deny-list regex is statically valid")
});

/// Exact names that must never be treated as secret holders, matched
/// case-sensitively.
const ALLOWED_FIELD_NAMES: &[&str] = &["NOPASSWD"];

/// Return true if `field_name` is explicitly allowed to look like a
/// password field without being one.
pub fn is_allowed_field_name(field_name: &str) -> bool {
    ALLOWED_FIELD_NAMES.contains(&field_name)
}

/// Return true if `name` looks like the name of a field holding a secret.
pub fn is_sensitive_field_name(name: &str) -> bool {
    if is_allowed_field_name(name) {
        return false;
    }
    DENYLIST_RE.is_match(name)
}

static PATH_RE: Lazy<Regex> = Lazy::new(|| {
    RegexBuilder::new(r"^(|~)[a-z0-9_/\.-]+$")
        .case_insensitive(true)
        .build()
        .expect("path regex is statically valid")
});

/// Return true if `content` is a filesystem path.
pub fn is_path(content: &str) -> bool {
    // Rather conservative on purpose to avoid a false positive.
    if !content.contains('/') {
        return false;
    }
    PATH_RE.is_match(content)
}

static UUID_RE: Lazy<Regex> = Lazy::new(|| {
    RegexBuilder::new(r"^[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}$")
        .case_insensitive(true)
        .build()
        .expect("uuid regex is statically valid")
});

/// Return true if `value` is a UUID string.
pub fn is_uuid_string(value: &str) -> bool {
    UUID_RE.is_match(value)
}

static JINJA2_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*\{\{\s*.*?\s*\}\}\s*$").expect("jinja2 regex is statically valid"));

/// Strip one layer of matching surrounding quotes, if any.
fn unquote(value: &str) -> &str {
    let trimmed = value.trim();
    let mut chars = trimmed.chars();
    match (chars.next(), trimmed.chars().last()) {
        (Some(first), Some(last))
            if trimmed.len() >= 2 && first == last && (first == '"' || first == '\'') =>
        {
            &trimmed[first.len_utf8()..trimmed.len() - last.len_utf8()]
        }
        _ => trimmed,
    }
}

/// Return true if `value`, possibly wrapped in one layer of quotes, holds
/// a Jinja2 expression and nothing else.
pub fn is_jinja2_expression(value: &str) -> bool {
    JINJA2_RE.is_match(unquote(value))
}

/// Sanitize a key name into a string suitable as a Jinja2 variable name:
/// `-` becomes `_`, anything outside `[A-Za-z0-9_]` is dropped, the result
/// is lowercased and leading underscores are stripped.
pub fn variable_name(name: &str) -> String {
    let mut out: String = name
        .chars()
        .map(|c| if c == '-' { '_' } else { c })
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_')
        .collect();
    out.make_ascii_lowercase();
    out.trim_start_matches('_').to_string()
}
