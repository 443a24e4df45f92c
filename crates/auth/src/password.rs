//! Password strength policy.
//!
//! Pure validation, no IO, no state. All rules run against the *trimmed*
//! candidate: leading/trailing whitespace is treated as accidental padding,
//! whitespace inside the body is a hard failure.

/// Minimum length of the trimmed password.
pub const MIN_LENGTH: usize = 10;
/// Minimum number of uppercase letters.
pub const MIN_UPPERCASE: usize = 1;
/// Minimum number of lowercase letters.
pub const MIN_LOWERCASE: usize = 1;
/// Minimum number of decimal digits.
pub const MIN_DIGITS: usize = 1;
/// Minimum number of characters from [`SPECIAL_CHARACTERS`].
pub const MIN_SPECIAL: usize = 1;
/// The fixed special-character set counted by the policy.
pub const SPECIAL_CHARACTERS: &str = "!@#$%^&*()-_=+[]{};:'\",.<>/?\\|`~";

/// Returns true when the candidate violates the policy.
///
/// Polarity follows the call sites: gates ask "is this invalid?" and bail.
pub fn is_invalid(candidate: &str) -> bool {
    let trimmed = candidate.trim();
    if trimmed.is_empty() || trimmed.chars().count() < MIN_LENGTH {
        return true;
    }
    // Whitespace is only legal as padding, never inside the body.
    if trimmed.chars().any(char::is_whitespace) {
        return true;
    }

    let mut upper = 0usize;
    let mut lower = 0usize;
    let mut digits = 0usize;
    let mut special = 0usize;
    for c in trimmed.chars() {
        if c.is_uppercase() {
            upper += 1;
        } else if c.is_lowercase() {
            lower += 1;
        } else if c.is_ascii_digit() {
            digits += 1;
        }
        if SPECIAL_CHARACTERS.contains(c) {
            special += 1;
        }
    }

    upper < MIN_UPPERCASE || lower < MIN_LOWERCASE || digits < MIN_DIGITS || special < MIN_SPECIAL
}

/// Human-readable policy description, returned with `InvalidPassword`.
pub fn policy_text() -> String {
    format!(
        "Invalid password. It must have: length at least {MIN_LENGTH}, including \
         {MIN_UPPERCASE} letter(s) in upper and lower cases, \
         {MIN_SPECIAL} special character(s), {MIN_DIGITS} digit(s)."
    )
}
