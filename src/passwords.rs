//! Candidate password dictionary.
//!
//! The list is ordered by how likely a weak password is in practice: the
//! empty string (owner-only protection, or no protection at all) first, then
//! the usual suspects, then capitalised/decorated variants, years, and words
//! people pick for documents. Order only changes how quickly a hit is found;
//! every entry is visited before a strategy gives up.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::time::{SystemTime, UNIX_EPOCH};

/// The common dictionary, tried by strategies A and B in this order.
#[rustfmt::skip]
pub const COMMON_PASSWORDS: &[&str] = &[
    "", "123456", "password", "admin", "user", "test", "demo",
    "123", "1234", "12345", "123456789", "qwerty", "abc123", "password123",
    "admin123", "root", "guest", "default", "pass", "pwd", "login",
    "secret", "welcome", "master", "owner", "unlock", "open", "free",
    "document", "file", "pdf", "secure", "protected", "private",
    "confidential", "restricted", "access", "enter", "key", "code",
    "temp", "temporary", "draft", "copy", "backup", "archive",
    // variations
    "Password", "PASSWORD", "Admin", "ADMIN", "Test", "TEST",
    "123456a", "123456A", "password1", "Password1", "admin1", "Admin1",
    "password!", "password@", "admin!", "admin@", "123!@#", "qwerty123",
    // dates
    "2024", "2023", "2022", "2021", "2020", "01012024", "12345678",
    // organisation / document terms
    "company", "internal", "official", "report", "finance", "data",
];

/// How many leading non-empty common entries get generated variations.
const VARIATION_SEEDS: usize = 20;

/// First year the exhaustive tier generates candidates for.
pub const FIRST_YEAR: i32 = 1990;

/// Prefixes combined with every year in the exhaustive tier.
const YEAR_PREFIXES: &[&str] = &["password", "admin", "pdf", "document", "test", "demo"];

/// Repeated and sequential three-character patterns (keyboard rows included).
#[rustfmt::skip]
const TRIPLES: &[&str] = &[
    "000", "001", "002", "010", "011", "100", "101", "110", "111",
    "123", "234", "345", "456", "567", "678", "789", "987", "876", "765", "654",
    "abc", "def", "ghi", "jkl", "mno", "pqr", "stu", "vwx", "xyz",
    "qwe", "asd", "zxc", "rty", "fgh", "vbn", "uio", "hjk", "bnm", "wer", "sdf",
];

/// Which dictionary the pipeline draws candidates from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DictionaryTier {
    /// [`COMMON_PASSWORDS`] only. (default)
    #[default]
    Common,
    /// Common list followed by generated case/suffix variations.
    Extended,
    /// Extended list followed by years from [`FIRST_YEAR`] to next year
    /// (bare, two-digit and prefixed) and every one- and two-character
    /// password of digits or letters plus common three-character patterns.
    Exhaustive,
}

impl DictionaryTier {
    pub fn passwords(&self) -> &'static [String] {
        match self {
            DictionaryTier::Common => &COMMON,
            DictionaryTier::Extended => &EXTENDED,
            DictionaryTier::Exhaustive => &EXHAUSTIVE,
        }
    }
}

static COMMON: Lazy<Vec<String>> =
    Lazy::new(|| COMMON_PASSWORDS.iter().map(|p| p.to_string()).collect());

static EXTENDED: Lazy<Vec<String>> = Lazy::new(build_extended);

static EXHAUSTIVE: Lazy<Vec<String>> = Lazy::new(|| build_exhaustive(current_year() + 1));

fn build_extended() -> Vec<String> {
    let mut out: Vec<String> = COMMON.clone();
    let seeds: Vec<&str> = COMMON_PASSWORDS
        .iter()
        .copied()
        .filter(|p| !p.is_empty())
        .take(VARIATION_SEEDS)
        .collect();

    for seed in seeds {
        for variant in variations(seed) {
            if !out.contains(&variant) {
                out.push(variant);
            }
        }
    }
    out
}

fn build_exhaustive(last_year: i32) -> Vec<String> {
    let mut out: Vec<String> = EXTENDED.clone();
    let mut seen: HashSet<String> = out.iter().cloned().collect();
    let mut push = |candidate: String| {
        if seen.insert(candidate.clone()) {
            out.push(candidate);
        }
    };

    for year in FIRST_YEAR..=last_year {
        let full = year.to_string();
        push(full.clone());
        for prefix in YEAR_PREFIXES {
            push(format!("{prefix}{full}"));
        }
        push(full[full.len() - 2..].to_string());
    }

    for c in ('0'..='9').chain('a'..='z').chain('A'..='Z') {
        push(c.to_string());
    }
    for n in 0..100 {
        push(format!("{n:02}"));
    }
    for c in 'a'..='z' {
        push(format!("{c}{c}"));
        push(format!("{c}{c}").to_uppercase());
    }
    for pair in ["ab", "bc", "cd", "de"] {
        push(pair.to_string());
        push(pair.to_uppercase());
    }
    for triple in TRIPLES {
        push(triple.to_string());
        push(triple.to_uppercase());
    }
    out
}

/// Calendar year of the system clock, close enough for candidate generation.
fn current_year() -> i32 {
    const SECS_PER_YEAR: u64 = 31_556_952;
    let secs = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default();
    1970 + (secs / SECS_PER_YEAR) as i32
}

fn variations(seed: &str) -> [String; 7] {
    [
        seed.to_uppercase(),
        capitalise(seed),
        format!("{seed}1"),
        format!("{seed}123"),
        format!("1{seed}"),
        format!("{seed}!"),
        format!("{seed}@"),
    ]
}

fn capitalise(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

/// Assemble the ordered candidate list for one call.
///
/// The hint comes first, then `extra`, then the dictionary. An entry equal to
/// an earlier one is dropped so a hint is not tried twice.
pub fn candidates(hint: Option<&str>, extra: &[String], tier: DictionaryTier) -> Vec<String> {
    let dictionary = tier.passwords();
    let mut out: Vec<String> = Vec::with_capacity(dictionary.len() + extra.len() + 1);
    let leading = hint.into_iter().chain(extra.iter().map(String::as_str));
    for p in leading {
        if !out.iter().any(|seen| seen == p) {
            out.push(p.to_string());
        }
    }
    if out.is_empty() {
        out.extend(dictionary.iter().cloned());
    } else {
        for p in dictionary {
            if !out.contains(p) {
                out.push(p.clone());
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_password_comes_first() {
        assert_eq!(COMMON_PASSWORDS[0], "");
        assert_eq!(DictionaryTier::Common.passwords()[0], "");
        assert_eq!(DictionaryTier::Extended.passwords()[0], "");
        assert_eq!(DictionaryTier::Exhaustive.passwords()[0], "");
    }

    #[test]
    fn ordering_is_stable() {
        let a = DictionaryTier::Common.passwords();
        let b = DictionaryTier::Common.passwords();
        assert_eq!(a, b);
        let pos = |p: &str| a.iter().position(|x| x == p).unwrap();
        assert!(pos("123456") < pos("admin"));
        assert!(pos("admin") < pos("Admin"));
        assert!(pos("Admin") < pos("2024"));
        assert!(pos("2024") < pos("report"));
    }

    #[test]
    fn extended_is_a_superset_in_order() {
        let common = DictionaryTier::Common.passwords();
        let ext = DictionaryTier::Extended.passwords();
        assert!(ext.len() > common.len());
        assert_eq!(&ext[..common.len()], common);
        for p in ["PASSWORD", "Qwerty", "root123", "1guest", "pass!", "login@"] {
            assert!(ext.iter().any(|x| x == p), "missing {p}");
        }
    }

    #[test]
    fn extended_has_no_duplicate_variations() {
        let ext = DictionaryTier::Extended.passwords();
        let common_len = DictionaryTier::Common.passwords().len();
        for (i, p) in ext.iter().enumerate().skip(common_len) {
            assert!(!ext[..i].contains(p), "duplicate {p}");
        }
    }

    #[test]
    fn exhaustive_extends_the_extended_tier() {
        let ext = DictionaryTier::Extended.passwords();
        let all = build_exhaustive(2025);
        assert_eq!(&all[..ext.len()], ext);

        for p in [
            "1990", "2025", "90", "25", "password2019", "admin2001", "pdf1999", "document2025",
            "7", "q", "Q", "00", "42", "99", "zz", "ZZ", "ab", "DE", "qwe", "XYZ", "654",
        ] {
            assert!(all.iter().any(|x| x == p), "missing {p}");
        }
        assert!(!all.iter().any(|x| x == "2026"));
        assert!(!all.iter().any(|x| x == "admin1989"));

        let unique: HashSet<&String> = all.iter().collect();
        assert_eq!(unique.len(), all.len());
    }

    #[test]
    fn exhaustive_tier_reaches_next_year() {
        let next = (current_year() + 1).to_string();
        let tier = DictionaryTier::Exhaustive.passwords();
        assert!(tier.iter().any(|x| *x == next));
        assert!(current_year() >= 2024);
    }

    #[test]
    fn capitalise_lowercases_the_tail() {
        assert_eq!(capitalise("qwerty"), "Qwerty");
        assert_eq!(capitalise("abc123"), "Abc123");
        assert_eq!(capitalise(""), "");
    }

    #[test]
    fn hint_and_extras_lead_without_repeats() {
        let extra = vec!["s3cret".to_string(), "admin".to_string()];
        let list = candidates(Some("admin"), &extra, DictionaryTier::Common);
        assert_eq!(&list[..2], &["admin".to_string(), "s3cret".to_string()]);
        assert_eq!(list.iter().filter(|p| *p == "admin").count(), 1);
        assert_eq!(list[2], "");
    }

    #[test]
    fn no_hint_yields_the_dictionary_verbatim() {
        let list = candidates(None, &[], DictionaryTier::Common);
        assert_eq!(list.len(), COMMON_PASSWORDS.len());
        assert!(list.iter().zip(COMMON_PASSWORDS).all(|(a, b)| a == b));
    }
}
