// messages.rs
// Static message catalog: dotted key -> template, with positional `{}`
// formatting. Single source of user-visible error and warning text; lookups
// never fail (unknown keys get a fallback string) and never drive control flow.

use std::fmt::Display;

/// Fallback prefix when a key is not in the catalog.
const DEFAULT_MESSAGE: &str = "Message not found";

/// Message definitions, keyed by dot notation (`namespace.name`).
const CATALOG: &[(&str, &str)] = &[
    // Validation
    ("validation.secret_empty", "The secret key cannot be empty."),
    ("validation.secret_length", "The secret key is invalid. Its length must be a multiple of 8."),
    ("validation.secret_characters", "The secret key contains invalid characters."),
    ("validation.code_format", "The code must be a {}-digit number."),
    // Configuration
    ("configuration.unsupported_algorithm", "Unsupported hash algorithm."),
    ("configuration.invalid_digits", "Digits must be either 6 or 8."),
    ("configuration.invalid_period", "Period must be a positive integer."),
    ("configuration.invalid_discrepancy", "Discrepancy must be between 0 and {}."),
    // Encoding
    ("encoding.invalid_base32_char", "Invalid Base32 character: {}"),
    // Security
    ("security.secret_generation_failed", "Failed to generate a secret from the system random source."),
    (
        "security.weak_secret_log",
        "TOTP Security Warning: Weak secret detected ({} bytes, recommend >= 20 bytes)",
    ),
    ("security.audit_secret_empty", "Secret is empty (0 bytes)."),
    ("security.audit_invalid_base32", "Secret is not valid Base32 format."),
    ("security.audit_zero_bytes", "Secret decodes to 0 bytes."),
    (
        "security.audit_weak_secret",
        "Secret is weak ({} bytes); recommend >= 20 bytes for adequate security.",
    ),
];

/// Retrieves a message by key, filling `{}` placeholders from `args` in order.
///
/// Unknown keys return `"Message not found: <key>"` instead of failing.
pub fn get(key: &str, args: &[&dyn Display]) -> String {
    match lookup(key) {
        Some(template) => format_template(template, args),
        None => format!("{DEFAULT_MESSAGE}: {key}"),
    }
}

/// Checks whether a message key exists in the catalog.
pub fn has(key: &str) -> bool {
    lookup(key).is_some()
}

fn lookup(key: &str) -> Option<&'static str> {
    CATALOG
        .iter()
        .find(|(k, _)| *k == key)
        .map(|(_, template)| *template)
}

fn format_template(template: &str, args: &[&dyn Display]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    let mut next = args.iter();

    while let Some(pos) = rest.find("{}") {
        out.push_str(&rest[..pos]);
        match next.next() {
            Some(arg) => out.push_str(&arg.to_string()),
            // Not enough arguments: keep the placeholder visible
            None => out.push_str("{}"),
        }
        rest = &rest[pos + 2..];
    }
    out.push_str(rest);
    out
}
