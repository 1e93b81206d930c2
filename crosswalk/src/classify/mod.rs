//! Risk level and governance pillar classification.
//!
//! Both are static lookups initialized once on first use. Unknown keys
//! fall back to a default and log a warning; they never fail.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;
use tracing::warn;

/// Risk level used when a validation-scale marker is not recognized.
pub const DEFAULT_RISK_LEVEL: &str = "General Risk";

/// Pillar used when an identifier prefix is not recognized.
pub const DEFAULT_PILLAR: &str = "Accountability";

/// Marker assumed when a record has no validation-scale value.
pub const DEFAULT_VALIDATION_MARKER: &str = "\u{1F7E1}";

/// Validation-scale marker to risk level.
static VALIDATION_SCALE_TO_RISK: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("\u{1F7E2}", "Low Risk"),     // green
        ("\u{1F7E1}", "General Risk"), // yellow
        ("\u{1F534}", "High Risk"),    // red
        ("\u{1F535}", "General Risk"), // blue
    ])
});

/// Identifier prefix to governance pillar.
static PREFIX_TO_PILLAR: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("DAT", "Accountability"),   // Data Governance & Quality
        ("MOD", "Interpretability"), // Model Development
        ("SEC", "Security"),         // Security & Privacy
        ("MON", "Monitoring"),       // Monitoring & Performance
        ("GOV", "Oversight"),        // Governance & Compliance
        ("TRA", "Accountability"),   // Transparency & Explainability
        ("VAL", "Verification"),     // Validation & Testing
        ("DOC", "Accountability"),   // Documentation
    ])
});

static IDENTIFIER_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z]+-\d+$").expect("identifier pattern is valid"));

/// Strip whitespace and emoji presentation selectors around a marker.
fn normalize_marker(marker: &str) -> &str {
    marker.trim().trim_end_matches('\u{FE0F}')
}

/// Look up a marker without logging.
pub fn lookup_risk(marker: &str) -> Option<&'static str> {
    VALIDATION_SCALE_TO_RISK.get(normalize_marker(marker)).copied()
}

/// Map a validation-scale marker to its risk level.
///
/// ```
/// use crosswalk::classify_risk;
///
/// assert_eq!(classify_risk("\u{1F534}"), "High Risk");
/// assert_eq!(classify_risk("?"), "General Risk");
/// ```
pub fn classify_risk(marker: &str) -> &'static str {
    lookup_risk(marker).unwrap_or_else(|| {
        warn!(marker, "unrecognized validation-scale marker, using '{}'", DEFAULT_RISK_LEVEL);
        DEFAULT_RISK_LEVEL
    })
}

/// Like [`classify_risk`], treating a missing marker as [`DEFAULT_VALIDATION_MARKER`].
pub fn classify_risk_opt(marker: Option<&str>) -> &'static str {
    match marker {
        Some(m) if !m.trim().is_empty() => classify_risk(m),
        _ => classify_risk(DEFAULT_VALIDATION_MARKER),
    }
}

/// Prefix of an identifier: everything before the first `-`.
pub fn identifier_prefix(identifier: &str) -> &str {
    identifier.split('-').next().unwrap_or(identifier).trim()
}

/// Look up a pillar without logging.
pub fn lookup_pillar(identifier: &str) -> Option<&'static str> {
    PREFIX_TO_PILLAR.get(identifier_prefix(identifier)).copied()
}

/// Map a control identifier to its governance pillar via its prefix.
///
/// ```
/// use crosswalk::classify_pillar;
///
/// assert_eq!(classify_pillar("SEC-07"), "Security");
/// assert_eq!(classify_pillar("ZZZ-01"), "Accountability");
/// ```
pub fn classify_pillar(identifier: &str) -> &'static str {
    lookup_pillar(identifier).unwrap_or_else(|| {
        warn!(identifier, "unrecognized identifier prefix, using '{}'", DEFAULT_PILLAR);
        DEFAULT_PILLAR
    })
}

/// Whether an identifier has the `<PREFIX>-<NN>` shape.
pub fn is_well_formed_identifier(identifier: &str) -> bool {
    IDENTIFIER_PATTERN.is_match(identifier.trim())
}
