// cleanvars-core/src/validators.rs
//! Programmatic validation for data shapes the regex scrubbers match.
//!
//! Regular expressions alone over-match digit runs; the checks here apply
//! structural rules so that only genuinely valid-looking values get
//! redacted. An invalid candidate keeps its original text.
//!
//! License: MIT OR APACHE 2.0

/// Validates an SSN candidate against US Social Security Administration
/// structure rules.
///
/// # Arguments
///
/// * `ssn` - The candidate string slice. Expected format "XXX-XX-XXXX".
///
/// # Returns
///
/// `true` if the SSN passes the structural checks, `false` otherwise.
pub fn is_us_ssn(ssn: &str) -> bool {
    let mut parts = ssn.split('-');
    let (Some(area), Some(group), Some(serial), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return false;
    };

    if area.len() != 3 || group.len() != 2 || serial.len() != 4 {
        return false;
    }

    let Ok(area_num) = area.parse::<u16>() else {
        return false;
    };
    let Ok(group_num) = group.parse::<u8>() else {
        return false;
    };
    let Ok(serial_num) = serial.parse::<u16>() else {
        return false;
    };

    // Area 666 and the 900 series have never been assigned.
    let invalid_area = area_num == 0 || area_num == 666 || area_num >= 900;
    let invalid_group = group_num == 0;
    let invalid_serial = serial_num == 0;

    !(invalid_area || invalid_group || invalid_serial)
}

/// Validates a number using the Luhn algorithm.
///
/// # Arguments
///
/// * `num_str` - A string slice containing only digits.
///
/// # Returns
///
/// `true` if the number is valid according to the Luhn algorithm, `false`
/// otherwise.
pub fn is_valid_luhn(num_str: &str) -> bool {
    let mut sum = 0;
    let mut alternate = false;

    for c in num_str.chars().rev() {
        let Some(mut digit) = c.to_digit(10) else {
            return false;
        };
        if alternate {
            digit *= 2;
            if digit > 9 {
                digit -= 9;
            }
        }
        sum += digit;
        alternate = !alternate;
    }

    sum % 10 == 0
}

/// Validates a credit-card candidate: strips the spaces and dashes the
/// matcher allows between digits, then applies the Luhn check.
///
/// # Arguments
///
/// * `cc_number` - The candidate string slice, digits possibly separated
///   by spaces or dashes.
///
/// # Returns
///
/// `true` if the digit string passes the Luhn check, `false` otherwise.
pub fn is_valid_credit_card(cc_number: &str) -> bool {
    let digits: String = cc_number.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return false;
    }
    is_valid_luhn(&digits)
}
