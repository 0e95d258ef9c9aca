//! Phone number normalization and JID helpers.
//!
//! Numbers are stored and sent in international form without a `+`:
//! digits only, 10-15 characters. A configurable default country code is
//! prefixed when a number arrives in local form ("0300..." or bare 10
//! digits). Normalization is idempotent: feeding a normalized number back
//! in returns it unchanged.

use crate::error::WagonError;

/// Minimum digits in a normalized number.
pub const MIN_PHONE_DIGITS: usize = 10;
/// Maximum digits in a normalized number.
pub const MAX_PHONE_DIGITS: usize = 15;

/// Normalize a raw phone number into international digit form.
///
/// Accepts separators (spaces, dashes, dots, parens) and an optional leading
/// `+`. Returns `Validation` for anything that is not a plausible number.
pub fn normalize_phone(raw: &str, default_country_code: &str) -> Result<String, WagonError> {
    let had_plus = raw.trim_start().starts_with('+');
    let digits: String = raw
        .chars()
        .filter(|c| !matches!(c, ' ' | '-' | '.' | '(' | ')' | '+'))
        .collect();

    if digits.is_empty() {
        return Err(WagonError::Validation("phone number is empty".into()));
    }
    if !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(WagonError::Validation(format!(
            "phone number '{raw}' contains non-digit characters"
        )));
    }

    let cc = default_country_code;
    let normalized = if had_plus {
        // Explicit international form, take as-is.
        digits
    } else if digits.starts_with(cc) && digits.len() > MIN_PHONE_DIGITS {
        digits
    } else if let Some(rest) = digits.strip_prefix('0') {
        // Local form with trunk zero: 03001234567 -> 923001234567.
        format!("{cc}{rest}")
    } else if digits.len() <= MIN_PHONE_DIGITS {
        format!("{cc}{digits}")
    } else {
        digits
    };

    if normalized.len() < MIN_PHONE_DIGITS || normalized.len() > MAX_PHONE_DIGITS {
        return Err(WagonError::Validation(format!(
            "phone number '{raw}' must normalize to {MIN_PHONE_DIGITS}-{MAX_PHONE_DIGITS} digits, got {}",
            normalized.len()
        )));
    }

    Ok(normalized)
}

/// Build the individual-chat JID for a normalized number.
pub fn user_jid(number: &str) -> String {
    format!("{number}@s.whatsapp.net")
}

/// Whether a JID names a live WhatsApp group.
pub fn is_group_jid(jid: &str) -> bool {
    jid.ends_with("@g.us")
}

/// Extract the bare number from a user JID ("92300...@s.whatsapp.net" -> "92300...").
pub fn jid_number(jid: &str) -> &str {
    jid.split('@').next().unwrap_or(jid)
}
