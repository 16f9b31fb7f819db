/// The control families defined by the catalog, paired with their two-letter
/// codes.
///
/// Names are matched exactly as they appear in the source document
/// (uppercase).
pub const FAMILIES: [(&str, &str); 18] = [
    ("ACCESS CONTROL", "AC"),
    ("AUDIT AND ACCOUNTABILITY", "AU"),
    ("AWARENESS AND TRAINING", "AT"),
    ("CONFIGURATION MANAGEMENT", "CM"),
    ("CONTINGENCY PLANNING", "CP"),
    ("IDENTIFICATION AND AUTHENTICATION", "IA"),
    ("INCIDENT RESPONSE", "IR"),
    ("MAINTENANCE", "MA"),
    ("MEDIA PROTECTION", "MP"),
    ("PERSONNEL SECURITY", "PS"),
    ("PHYSICAL AND ENVIRONMENTAL PROTECTION", "PE"),
    ("PLANNING", "PL"),
    ("PROGRAM MANAGEMENT", "PM"),
    ("RISK ASSESSMENT", "RA"),
    ("SECURITY ASSESSMENT AND AUTHORIZATION", "CA"),
    ("SYSTEM AND COMMUNICATIONS PROTECTION", "SC"),
    ("SYSTEM AND INFORMATION INTEGRITY", "SI"),
    ("SYSTEM AND SERVICES ACQUISITION", "SA"),
];

/// Returns the two-letter code for a family name.
///
/// Names outside the known vocabulary yield an empty string.
///
/// # Examples
///
/// ```
/// use control_catalog::domain::family;
///
/// assert_eq!(family::code("ACCESS CONTROL"), "AC");
/// assert_eq!(family::code("Access Control"), "");
/// ```
#[must_use]
pub fn code(name: &str) -> &'static str {
    FAMILIES
        .iter()
        .find(|(family, _)| *family == name)
        .map_or("", |(_, code)| code)
}
