//! USE flag tokens and their canonical ordering
//!
//! A set entry may carry per-package USE overrides, each requested bare
//! (`flag`), forced on (`+flag`) or forced off (`-flag`). Display and
//! `package.use` output use a fixed three-bucket order: bare flags first,
//! then `+` flags, then `-` flags, each bucket alphabetical.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Sign prefix of a requested USE flag
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UseSign {
    /// No prefix
    #[default]
    Bare,
    /// `+flag` - forced on
    Plus,
    /// `-flag` - forced off
    Minus,
}

/// A single requested USE flag token
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UseFlag {
    /// Sign prefix, if any
    pub sign: UseSign,
    /// Flag name without the prefix
    pub name: String,
}

impl UseFlag {
    /// Parse a flag token (e.g. "ssl", "+ssl" or "-ssl")
    pub fn parse(token: &str) -> Self {
        if let Some(name) = token.strip_prefix('+') {
            Self {
                sign: UseSign::Plus,
                name: name.to_string(),
            }
        } else if let Some(name) = token.strip_prefix('-') {
            Self {
                sign: UseSign::Minus,
                name: name.to_string(),
            }
        } else {
            Self {
                sign: UseSign::Bare,
                name: token.to_string(),
            }
        }
    }

    /// The flag name with any sign prefix stripped
    pub fn bare_name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for UseFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.sign {
            UseSign::Bare => {}
            UseSign::Plus => write!(f, "+")?,
            UseSign::Minus => write!(f, "-")?,
        }
        write!(f, "{}", self.name)
    }
}

/// Sort flags into the canonical [bare, +flag, -flag] order
///
/// Three successive stable sorts: alphabetical on the raw token, then flags
/// starting with `+` to the back, then flags starting with `-` to the back.
/// The net effect is three contiguous buckets, each alphabetical within
/// itself. Duplicates are preserved and stay adjacent.
pub fn sort_use_flags(flags: &mut [UseFlag]) {
    flags.sort_by(|a, b| a.to_string().cmp(&b.to_string()));
    flags.sort_by_key(|f| f.sign == UseSign::Plus);
    flags.sort_by_key(|f| f.sign == UseSign::Minus);
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn flags(tokens: &[&str]) -> Vec<UseFlag> {
        tokens.iter().map(|t| UseFlag::parse(t)).collect()
    }

    fn tokens(flags: &[UseFlag]) -> Vec<String> {
        flags.iter().map(|f| f.to_string()).collect()
    }

    #[test]
    fn test_parse_signs() {
        assert_eq!(UseFlag::parse("ssl").sign, UseSign::Bare);
        assert_eq!(UseFlag::parse("+ssl").sign, UseSign::Plus);
        assert_eq!(UseFlag::parse("-ssl").sign, UseSign::Minus);
        assert_eq!(UseFlag::parse("-ssl").bare_name(), "ssl");
    }

    #[test]
    fn test_display_round_trip() {
        for token in ["ssl", "+ssl", "-debug", "cpu_flags_x86_avx2"] {
            assert_eq!(UseFlag::parse(token).to_string(), token);
        }
    }

    #[test]
    fn test_canonical_sort() {
        let mut uses = flags(&["-foo", "+bar", "baz", "+alpha", "-zed"]);
        sort_use_flags(&mut uses);
        assert_eq!(tokens(&uses), ["baz", "+alpha", "+bar", "-foo", "-zed"]);
    }

    #[test]
    fn test_sort_is_idempotent() {
        let mut uses = flags(&["-foo", "+bar", "baz", "+alpha", "-zed"]);
        sort_use_flags(&mut uses);
        let once = uses.clone();
        sort_use_flags(&mut uses);
        assert_eq!(uses, once);
    }

    #[test]
    fn test_sort_keeps_duplicates() {
        let mut uses = flags(&["ssl", "-X", "ssl", "+gtk"]);
        sort_use_flags(&mut uses);
        assert_eq!(tokens(&uses), ["ssl", "ssl", "+gtk", "-X"]);
    }

    #[test]
    fn test_sort_empty_and_single() {
        let mut none: Vec<UseFlag> = vec![];
        sort_use_flags(&mut none);
        assert!(none.is_empty());

        let mut one = flags(&["-X"]);
        sort_use_flags(&mut one);
        assert_eq!(tokens(&one), ["-X"]);
    }
}
