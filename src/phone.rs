//! Phone number normalization and display formatting.
//!
//! Numbers in the backup store are inconsistently formatted: the same
//! counterpart can appear as "(555) 555-1212", "+15555551212", or
//! "5555551212". Everything here works on the digits-only projection.

/// Remove every character that is not a decimal digit.
pub fn strip(phone: &str) -> String {
    phone.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Format a phone number consistently for output.
///
/// US-centric: 10 digits, or 11 digits with a leading 1, become
/// "(555) 555-1212" from the last 10 digits. Shorter numbers (shortcodes)
/// and longer non-US numbers are returned as stripped digits, unformatted.
pub fn format_for_display(phone: &str) -> String {
    let digits = strip(phone);
    let us_number = digits.len() == 10 || (digits.len() == 11 && digits.starts_with('1'));
    if us_number {
        let last10 = &digits[digits.len() - 10..];
        format!("({}) {}-{}", &last10[..3], &last10[3..6], &last10[6..])
    } else {
        digits
    }
}

/// Simple validation of a user-supplied phone number: at least 5 digits
/// after stripping. A heuristic acceptance threshold, not a full validator.
pub fn is_valid(phone: &str) -> bool {
    strip(phone).len() >= 5
}
