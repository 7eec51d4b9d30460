//! Mechanism property lookup.
//!
//! Mechanism properties arrive as a free-form document, usually parsed from
//! connection-string options. GSSAPI reads two of them; lookups are
//! tolerant of the spellings seen in the wild and fall back to defaults on
//! anything unusable.

use bson::Document;

/// Service name property, in both accepted spellings. The all-lowercase
/// form wins when both are present.
pub const SERVICE_NAME_KEYS: [&str; 2] = ["gssapiservicename", "gssapiServiceName"];

/// Hostname canonicalization property.
pub const CANONICALIZE_HOST_NAME_KEY: &str = "gssapiCanonicalizeHostName";

/// Service name used when none is configured.
pub const DEFAULT_SERVICE_NAME: &str = "mongodb";

/// The configured GSSAPI service name, or `"mongodb"`.
#[must_use]
pub fn service_name(properties: &Document) -> &str {
    SERVICE_NAME_KEYS
        .iter()
        .find_map(|key| properties.get_str(key).ok())
        .unwrap_or(DEFAULT_SERVICE_NAME)
}

/// Whether hostname canonicalization was requested. Anything other than a
/// boolean `true` means no.
#[must_use]
pub fn canonicalize_host_name(properties: &Document) -> bool {
    properties
        .get_bool(CANONICALIZE_HOST_NAME_KEY)
        .unwrap_or(false)
}
