// cleanvars-core/src/scrubbers.rs
//! Regex-based scrubbers running around the node-chain pipeline.
//!
//! Each scrubber is a pure `&str -> String` pass. Replacements are
//! deterministic: emails, MAC addresses and IP addresses derive their
//! substitute from a CRC32 of the original value, so the same input
//! always scrubs to the same output across runs. Well-known public
//! resolver addresses pass through untouched so playbooks keep working.
//!
//! [`scrub`] chains every pass in order over one block of text.
//!
//! License: MIT OR APACHE 2.0

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

use once_cell::sync::Lazy;
use regex::{Captures, Regex, RegexBuilder};

use crate::render::{hide_secrets, ValueTemplate};
use crate::validators::{is_us_ssn, is_valid_credit_card};

const EMAIL_SAMPLES: &[&str] = &[
    "liam",
    "olivia",
    "noah",
    "emma",
    "oliver",
    "charlotte",
    "elijah",
    "amelia",
    "james",
    "ava",
    "william",
    "sophia",
    "benjamin",
    "isabella",
    "lucas",
    "mia",
    "henry",
    "evelyn",
    "theodore",
    "harper",
];

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    RegexBuilder::new(r"\b(?P<email>\S+@[a-z\.]+[a-z]{2,})\b")
        .case_insensitive(true)
        .build()
        .expect("email regex is statically valid")
});

/// Replace every email address with a sample address picked from a fixed
/// name list by CRC32 of the original.
pub fn hide_emails(block: &str) -> String {
    EMAIL_RE
        .replace_all(block, |caps: &Captures| {
            let email = &caps["email"];
            let idx = crc32fast::hash(email.as_bytes()) as usize % EMAIL_SAMPLES.len();
            format!("{}{}@example.com", EMAIL_SAMPLES[idx], idx)
        })
        .into_owned()
}

const COMMON_IPV4_ADDRESSES: &[Ipv4Addr] = &[
    Ipv4Addr::new(1, 0, 0, 1),
    Ipv4Addr::new(1, 1, 1, 1),
    Ipv4Addr::new(149, 112, 112, 112),
    Ipv4Addr::new(208, 67, 220, 220),
    Ipv4Addr::new(208, 67, 222, 222),
    Ipv4Addr::new(76, 223, 122, 150),
    Ipv4Addr::new(76, 76, 19, 19),
    Ipv4Addr::new(8, 20, 247, 20),
    Ipv4Addr::new(8, 26, 56, 26),
    Ipv4Addr::new(8, 8, 4, 4),
    Ipv4Addr::new(8, 8, 8, 8),
    Ipv4Addr::new(9, 9, 9, 9),
    Ipv4Addr::new(94, 140, 14, 14),
    Ipv4Addr::new(94, 140, 15, 15),
];

fn is_common_ipv4(value: Ipv4Addr) -> bool {
    // The 240.0.0.0/4 reserved block, including broadcast, stays as is.
    COMMON_IPV4_ADDRESSES.contains(&value) || u32::from(value) >> 28 == 0xF
}

fn redact_ipv4_address(value: Ipv4Addr) -> Ipv4Addr {
    if is_common_ipv4(value) {
        return value;
    }
    let as_int = u32::from(value);
    match as_int.checked_add(as_int % 100) {
        Some(new) => Ipv4Addr::from(new),
        None => value,
    }
}

const COMMON_IPV6_ADDRESSES: &[Ipv6Addr] = &[
    Ipv6Addr::new(0x2001, 0x4860, 0x4860, 0, 0, 0, 0, 0x8888),
    Ipv6Addr::new(0x2001, 0x4860, 0x4860, 0, 0, 0, 0, 0x8844),
];

static IPV6_HEXTET_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r":[0-9a-f]+").expect("hextet regex is statically valid"));

fn redact_ipv6_address(value: Ipv6Addr) -> Ipv6Addr {
    if COMMON_IPV6_ADDRESSES.contains(&value) {
        return value;
    }
    // Perturb each group of the compressed form, then reparse so the
    // result is still a valid address.
    let compressed = value.to_string();
    let rewritten = IPV6_HEXTET_RE.replace_all(&compressed, |caps: &Captures| {
        let field = &caps[0][1..];
        match u32::from_str_radix(field, 16) {
            Ok(as_int) => format!(":{:x}", as_int % 1024),
            Err(_) => caps[0].to_string(),
        }
    });
    match rewritten.parse::<Ipv6Addr>() {
        Ok(new) => new,
        Err(_) => value,
    }
}

/// Redact one address, preserving its family. Well-known resolvers pass
/// through unchanged.
pub fn redact_ip_address(value: &str) -> String {
    match value.parse::<IpAddr>() {
        Ok(IpAddr::V4(ip)) => redact_ipv4_address(ip).to_string(),
        Ok(IpAddr::V6(ip)) => redact_ipv6_address(ip).to_string(),
        Err(_) => value.to_string(),
    }
}

static IP_RE: Lazy<Regex> = Lazy::new(|| {
    RegexBuilder::new(r"(?P<ip_address>(\d{1,3}\.\d{1,3}\.\d{1,3}\.\d{1,3})|[a-f\d:]{3,32})")
        .case_insensitive(true)
        .build()
        .expect("ip regex is statically valid")
});

/// Replace every IPv4/IPv6 address with its redacted form. Candidates
/// that do not parse as an address stay untouched.
pub fn hide_ip_addresses(block: &str) -> String {
    IP_RE
        .replace_all(block, |caps: &Captures| {
            redact_ip_address(&caps["ip_address"])
        })
        .into_owned()
}

static SSN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b\d{3}-\d{2}-\d{4}\b").expect("ssn regex is statically valid"));

/// Replace every structurally valid US Social Security number with a
/// fixed placeholder.
pub fn hide_us_ssn(block: &str) -> String {
    SSN_RE
        .replace_all(block, |caps: &Captures| {
            if is_us_ssn(&caps[0]) {
                "{{ ssn }}".to_string()
            } else {
                caps[0].to_string()
            }
        })
        .into_owned()
}

static MAC_RE: Lazy<Regex> = Lazy::new(|| {
    RegexBuilder::new(
        r"(?P<mac>\b(?:[0-9a-f]{2}[:-]){5}[0-9a-f]{2}|[0-9a-f]{4}\.[0-9a-f]{4}\.[0-9a-f]{4}\b)",
    )
    .case_insensitive(true)
    .build()
    .expect("mac regex is statically valid")
});

/// Perturb every MAC address digit by a CRC32-derived offset, keeping the
/// separator style of the original.
pub fn hide_mac_addresses(block: &str) -> String {
    MAC_RE
        .replace_all(block, |caps: &Captures| {
            let mac = &caps["mac"];
            let offset = crc32fast::hash(mac.as_bytes()) % 0xF;
            mac.chars()
                .map(|c| match c.to_digit(16) {
                    Some(d) => char::from_digit((d + offset) % 16, 16).unwrap_or(c),
                    None => c,
                })
                .collect::<String>()
        })
        .into_owned()
}

static PHONE_RES: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"\d{10}",
        r"1\d{10}",
        r"\d{3}-\d{3}-\d{4}",
        r"\d{3} \d{3}-\d{4}",
        r"\(\d{3}\) \d{3}-\d{4}",
    ]
    .iter()
    .map(|number| {
        RegexBuilder::new(&format!(
            r"(?P<before>([^\d\.]|^))(?P<number>{number})(?P<after>([^\d\.]|$))"
        ))
        .case_insensitive(true)
        .multi_line(true)
        .build()
        .expect("phone regex is statically valid")
    })
    .collect()
});

/// Replace every US phone number, in its common literal formats, with the
/// Ghostbusters number.
pub fn hide_us_phone_numbers(block: &str) -> String {
    let mut block = block.to_string();
    for re in PHONE_RES.iter() {
        block = re
            .replace_all(&block, |caps: &Captures| {
                format!("{}(311) 555-2368{}", &caps["before"], &caps["after"])
            })
            .into_owned();
    }
    block
}

static CC_RE: Lazy<Regex> = Lazy::new(|| {
    RegexBuilder::new(r"(?P<before>([^\d-]|^))(?P<cc>(?:\d[ -]*?){13,16})(?P<after>([^\d-]|$))")
        .case_insensitive(true)
        .multi_line(true)
        .build()
        .expect("credit card regex is statically valid")
});

/// Replace credit-card-shaped digit runs that pass the Luhn check with a
/// fixed placeholder. Digit runs failing the check (UUID fragments,
/// decimals of pi) keep their text.
pub fn hide_credit_cards(block: &str) -> String {
    CC_RE
        .replace_all(block, |caps: &Captures| {
            let cc = &caps["cc"];
            let new_value = if is_valid_credit_card(cc) {
                "{{ credit_card_number }}"
            } else {
                cc
            };
            format!("{}{}{}", &caps["before"], new_value, &caps["after"])
        })
        .into_owned()
}

/// Strip `#` comments that start outside quotes, along with the spaces
/// preceding the `#`. Quoting state resets at each newline.
pub fn hide_comments(block: &str) -> String {
    let mut out = String::with_capacity(block.len());
    let mut quotes: Vec<char> = Vec::new();
    let mut in_comment = false;
    for c in block.chars() {
        if c == '\n' {
            in_comment = false;
            quotes.clear();
            out.push(c);
        } else if in_comment {
            continue;
        } else if c == '"' || c == '\'' {
            if quotes.last() == Some(&c) {
                quotes.pop();
            } else {
                quotes.push(c);
            }
            out.push(c);
        } else if c == '#' && quotes.is_empty() {
            in_comment = true;
            while out.ends_with(' ') {
                out.pop();
            }
        } else {
            out.push(c);
        }
    }
    out
}

const KNOWN_USERS: &[&str] = &["cloud-user", "ec2-user", "fedora", "root", "ubuntu", "user"];

static USER_NAME_RES: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        // Unbounded repetition: a bounded Unicode `\w{0,255}` compiles
        // past the regex crate's default size limit.
        r"(?P<before>[c-z]:\\users\\)(?P<user_name>\{\{[^{}]*\}\}|\w*)",
        r"(?P<before>/(home|Users)/)(?P<user_name>\{\{[^{}]*\}\}|[a-z0-9_-]*)",
    ]
    .iter()
    .map(|re| {
        RegexBuilder::new(re)
            .case_insensitive(true)
            .build()
            .expect("user name regex is statically valid")
    })
    .collect()
});

/// Replace the user segment of home-directory paths with `ano-user`.
/// Generic account names and templated segments pass through.
pub fn hide_user_name(block: &str) -> String {
    let mut block = block.to_string();
    for re in USER_NAME_RES.iter() {
        block = re
            .replace_all(&block, |caps: &Captures| {
                let user = &caps["user_name"];
                let keep = KNOWN_USERS.contains(&user) || user.starts_with("{{");
                format!("{}{}", &caps["before"], if keep { user } else { "ano-user" })
            })
            .into_owned();
    }
    block
}

/// Run every scrubber over `block` with the default value template.
pub fn scrub(block: &str) -> String {
    scrub_with_template(block, &ValueTemplate::default())
}

/// Run every scrubber over `block`, using `template` for secret values
/// found by the field pipeline. Order matters: comments go first so a
/// stripped comment cannot shield a secret, and the pattern scrubbers run
/// over the field pipeline's output.
pub fn scrub_with_template(block: &str, template: &ValueTemplate) -> String {
    let mut out = hide_comments(block);
    out = hide_secrets(&out, template);
    out = hide_emails(&out);
    out = hide_ip_addresses(&out);
    out = hide_us_ssn(&out);
    out = hide_mac_addresses(&out);
    out = hide_us_phone_numbers(&out);
    out = hide_credit_cards(&out);
    out = hide_user_name(&out);
    out
}
