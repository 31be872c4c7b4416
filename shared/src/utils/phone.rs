//! Phone number utilities

use once_cell::sync::Lazy;
use regex::Regex;

// International phone number regex (E.164 format)
static INTERNATIONAL_PHONE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\+[1-9]\d{1,14}$").expect("valid E.164 pattern")
});

// National number without country code
static NATIONAL_PHONE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\d{6,15}$").expect("valid national pattern")
});

/// Normalize a phone number by removing common formatting characters
pub fn normalize_phone_number(phone: &str) -> String {
    phone
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '+')
        .collect()
}

/// Check if a phone number looks dialable (E.164 or a plain national number)
///
/// This is a hint for input forms only. The verification API stays the
/// authority on what it accepts.
pub fn is_plausible_phone(phone: &str) -> bool {
    let normalized = normalize_phone_number(phone);
    INTERNATIONAL_PHONE_REGEX.is_match(&normalized) || NATIONAL_PHONE_REGEX.is_match(&normalized)
}

/// Mask a phone number for logging
///
/// Shows only the last 4 digits of the phone number.
///
/// # Example
///
/// ```
/// use pv_shared::phone::mask_phone_number;
///
/// assert_eq!(mask_phone_number("+12345678901"), "+*******8901");
/// assert_eq!(mask_phone_number("555"), "***");
/// ```
pub fn mask_phone_number(phone: &str) -> String {
    let chars: Vec<char> = phone.chars().collect();
    let visible_digits = 4;
    if chars.len() <= visible_digits {
        return "*".repeat(chars.len());
    }

    let last_digits: String = chars[chars.len() - visible_digits..].iter().collect();
    let masked_count = chars.len() - visible_digits;

    if chars[0] == '+' {
        format!("+{}{}", "*".repeat(masked_count - 1), last_digits)
    } else {
        format!("{}{}", "*".repeat(masked_count), last_digits)
    }
}
