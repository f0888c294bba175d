//! Package atom parsing and matching
//!
//! Implements Gentoo-style package atoms as they appear in set definition
//! files:
//! - `category/package`
//! - `>=category/package-1.0`
//! - `category/package:slot`
//! - `category/package::repo`

use crate::{Result, SetError};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Version comparison operators
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VersionOp {
    /// No version constraint
    #[default]
    Any,
    /// Exact version match (=)
    Equal,
    /// Greater than (>)
    Greater,
    /// Greater than or equal (>=)
    GreaterEqual,
    /// Less than (<)
    Less,
    /// Less than or equal (<=)
    LessEqual,
    /// Version glob match (=*), e.g. =category/package-1.0*
    GlobEqual,
    /// Revision bump match (~)
    RevisionBump,
}

/// A package atom naming a package with an optional version constraint
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PackageAtom {
    /// Version operator
    pub operator: VersionOp,
    /// Package category (e.g. "sys-apps")
    pub category: String,
    /// Package name (e.g. "systemd")
    pub name: String,
    /// Version string (optional)
    pub version: Option<String>,
    /// Slot specification (optional)
    pub slot: Option<String>,
    /// Repository restriction (optional)
    pub repository: Option<String>,
}

impl PackageAtom {
    /// Create a new package atom with just category and name
    pub fn new(category: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            operator: VersionOp::Any,
            category: category.into(),
            name: name.into(),
            version: None,
            slot: None,
            repository: None,
        }
    }

    /// Get the fully qualified package name (category/name)
    pub fn cpn(&self) -> String {
        format!("{}/{}", self.category, self.name)
    }

    /// Check if this atom names a given category/name
    pub fn matches_cpn(&self, category: &str, name: &str) -> bool {
        self.category == category && self.name == name
    }

    /// Check if a concrete version satisfies this atom's constraint
    pub fn version_matches(&self, candidate: &str) -> bool {
        let Some(ref wanted) = self.version else {
            return true;
        };
        match self.operator {
            VersionOp::Any => true,
            VersionOp::Equal => candidate == wanted,
            VersionOp::GlobEqual => candidate.starts_with(wanted.as_str()),
            VersionOp::Greater => cmp_versions(candidate, wanted) == Ordering::Greater,
            VersionOp::GreaterEqual => cmp_versions(candidate, wanted) != Ordering::Less,
            VersionOp::Less => cmp_versions(candidate, wanted) == Ordering::Less,
            VersionOp::LessEqual => cmp_versions(candidate, wanted) != Ordering::Greater,
            // ~ matches any revision of the same base version
            VersionOp::RevisionBump => strip_revision(candidate) == strip_revision(wanted),
        }
    }
}

/// Check whether a character is legal in a category or package name
fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '+' | '.')
}

impl FromStr for PackageAtom {
    type Err = SetError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.is_empty() {
            return Err(SetError::InvalidAtom("empty atom".to_string()));
        }

        let mut remaining = s;

        // Parse operator
        let operator = if let Some(rest) = remaining.strip_prefix(">=") {
            remaining = rest;
            VersionOp::GreaterEqual
        } else if let Some(rest) = remaining.strip_prefix("<=") {
            remaining = rest;
            VersionOp::LessEqual
        } else if let Some(rest) = remaining.strip_prefix('>') {
            remaining = rest;
            VersionOp::Greater
        } else if let Some(rest) = remaining.strip_prefix('<') {
            remaining = rest;
            VersionOp::Less
        } else if let Some(rest) = remaining.strip_prefix('~') {
            remaining = rest;
            VersionOp::RevisionBump
        } else if let Some(rest) = remaining.strip_prefix('=') {
            remaining = rest;
            if remaining.ends_with('*') {
                VersionOp::GlobEqual
            } else {
                VersionOp::Equal
            }
        } else {
            VersionOp::Any
        };

        // Extract repository ::repo
        let mut repository = None;
        if let Some(idx) = remaining.find("::") {
            repository = Some(remaining[idx + 2..].to_string());
            remaining = &remaining[..idx];
        }

        // Extract slot :slot
        let mut slot = None;
        if let Some(idx) = remaining.find(':') {
            slot = Some(remaining[idx + 1..].to_string());
            remaining = &remaining[..idx];
        }

        // Remove trailing * for glob matches
        if remaining.ends_with('*') && operator == VersionOp::GlobEqual {
            remaining = &remaining[..remaining.len() - 1];
        }

        // Parse category/name-version
        let slash_idx = remaining
            .find('/')
            .ok_or_else(|| SetError::InvalidAtom(format!("missing category: {}", s)))?;

        let category = remaining[..slash_idx].to_string();
        let name_version = &remaining[slash_idx + 1..];

        // A version is only meaningful together with an operator
        let (name, version) = if operator != VersionOp::Any {
            match find_version_start(name_version) {
                Some(idx) => (
                    name_version[..idx].to_string(),
                    Some(name_version[idx + 1..].to_string()),
                ),
                None => (name_version.to_string(), None),
            }
        } else {
            (name_version.to_string(), None)
        };

        if category.is_empty() || name.is_empty() {
            return Err(SetError::InvalidAtom(format!("invalid atom: {}", s)));
        }
        if operator != VersionOp::Any && version.is_none() {
            return Err(SetError::InvalidAtom(format!(
                "operator without version: {}",
                s
            )));
        }
        if !category.chars().all(is_name_char) || !name.chars().all(is_name_char) {
            return Err(SetError::InvalidAtom(format!("invalid atom: {}", s)));
        }

        Ok(PackageAtom {
            operator,
            category,
            name,
            version,
            slot,
            repository,
        })
    }
}

impl fmt::Display for PackageAtom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.operator {
            VersionOp::Any => {}
            VersionOp::Equal => write!(f, "=")?,
            VersionOp::Greater => write!(f, ">")?,
            VersionOp::GreaterEqual => write!(f, ">=")?,
            VersionOp::Less => write!(f, "<")?,
            VersionOp::LessEqual => write!(f, "<=")?,
            VersionOp::GlobEqual => write!(f, "=")?,
            VersionOp::RevisionBump => write!(f, "~")?,
        }

        write!(f, "{}/{}", self.category, self.name)?;

        if let Some(ref ver) = self.version {
            write!(f, "-{}", ver)?;
        }
        if self.operator == VersionOp::GlobEqual {
            write!(f, "*")?;
        }
        if let Some(ref slot) = self.slot {
            write!(f, ":{}", slot)?;
        }
        if let Some(ref repo) = self.repository {
            write!(f, "::{}", repo)?;
        }

        Ok(())
    }
}

/// Find the index of the `-` that starts the version suffix, if any
///
/// The version begins at the last `-` followed by a digit, e.g.
/// `gtk+-3.24` splits into `gtk+` and `3.24`.
fn find_version_start(name_version: &str) -> Option<usize> {
    let bytes = name_version.as_bytes();
    for i in (0..bytes.len().saturating_sub(1)).rev() {
        if bytes[i] == b'-' && bytes[i + 1].is_ascii_digit() {
            return Some(i);
        }
    }
    None
}

/// Split a concrete `category/name-version` string into its parts
pub fn split_cpv(cpv: &str) -> Option<(&str, &str, &str)> {
    let (category, name_version) = cpv.split_once('/')?;
    let (name, version) = split_pv(name_version)?;
    Some((category, name, version))
}

/// Split a concrete `name-version` string into name and version
pub fn split_pv(name_version: &str) -> Option<(&str, &str)> {
    let idx = find_version_start(name_version)?;
    Some((&name_version[..idx], &name_version[idx + 1..]))
}

/// Strip a trailing `-rN` revision suffix
fn strip_revision(version: &str) -> &str {
    match version.rfind("-r") {
        Some(idx) if version[idx + 2..].chars().all(|c| c.is_ascii_digit()) => &version[..idx],
        _ => version,
    }
}

#[derive(Debug, PartialEq, Eq)]
enum VersionComponent {
    Num(u64),
    Text(String),
}

/// Split a version into numeric and textual runs, separators dropped
///
/// `"1.0-r2"` becomes `[Num 1, Num 0, Text "r", Num 2]`, so revision and
/// patch-level suffixes compare numerically.
fn version_components(version: &str) -> Vec<VersionComponent> {
    let mut components = Vec::new();
    let mut run = String::new();
    let mut run_is_num = false;

    for c in version.chars() {
        if matches!(c, '.' | '_' | '-') {
            if !run.is_empty() {
                components.push(finish_run(&mut run, run_is_num));
            }
            continue;
        }
        let is_num = c.is_ascii_digit();
        if !run.is_empty() && is_num != run_is_num {
            components.push(finish_run(&mut run, run_is_num));
        }
        run_is_num = is_num;
        run.push(c);
    }
    if !run.is_empty() {
        components.push(finish_run(&mut run, run_is_num));
    }
    components
}

fn finish_run(run: &mut String, is_num: bool) -> VersionComponent {
    let component = if is_num {
        // Falls back to text for numbers too large for u64
        run.parse::<u64>()
            .map(VersionComponent::Num)
            .unwrap_or_else(|_| VersionComponent::Text(run.clone()))
    } else {
        VersionComponent::Text(run.clone())
    };
    run.clear();
    component
}

/// Whether a textual component marks a pre-release: `1.0_rc1` < `1.0`
fn is_pre_release(component: &VersionComponent) -> bool {
    matches!(
        component,
        VersionComponent::Text(t) if matches!(t.as_str(), "alpha" | "beta" | "pre" | "rc")
    )
}

/// Compare two version strings component-wise
///
/// Numeric runs compare numerically, textual runs lexically, a missing
/// component loses unless the extra components are a pre-release suffix,
/// which ranks below the bare version. Good enough to rank ebuild versions
/// of the same package for best-match selection.
pub fn cmp_versions(a: &str, b: &str) -> Ordering {
    let pa = version_components(a);
    let pb = version_components(b);

    for (ca, cb) in pa.iter().zip(pb.iter()) {
        let ord = match (ca, cb) {
            (VersionComponent::Num(na), VersionComponent::Num(nb)) => na.cmp(nb),
            (VersionComponent::Text(ta), VersionComponent::Text(tb)) => ta.cmp(tb),
            // Numbered component ranks above a textual one: 1.0.1 > 1.0b
            (VersionComponent::Num(_), VersionComponent::Text(_)) => Ordering::Greater,
            (VersionComponent::Text(_), VersionComponent::Num(_)) => Ordering::Less,
        };
        if ord != Ordering::Equal {
            return ord;
        }
    }

    // `_rc`/`_p` style suffixes on the longer version decide the tie
    let tail = |extra: &[VersionComponent]| match extra.first() {
        Some(c) if is_pre_release(c) => Ordering::Less,
        Some(_) => Ordering::Greater,
        None => Ordering::Equal,
    };
    match pa.len().cmp(&pb.len()) {
        Ordering::Greater => tail(&pa[pb.len()..]),
        Ordering::Less => tail(&pb[pa.len()..]).reverse(),
        Ordering::Equal => Ordering::Equal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_atom() {
        let atom: PackageAtom = "sys-apps/systemd".parse().unwrap();
        assert_eq!(atom.category, "sys-apps");
        assert_eq!(atom.name, "systemd");
        assert_eq!(atom.operator, VersionOp::Any);
        assert_eq!(atom.version, None);
    }

    #[test]
    fn test_parse_versioned_atom() {
        let atom: PackageAtom = ">=sys-apps/systemd-250".parse().unwrap();
        assert_eq!(atom.category, "sys-apps");
        assert_eq!(atom.name, "systemd");
        assert_eq!(atom.version, Some("250".to_string()));
        assert_eq!(atom.operator, VersionOp::GreaterEqual);
    }

    #[test]
    fn test_parse_slotted_atom() {
        let atom: PackageAtom = "dev-lang/python:3.11".parse().unwrap();
        assert_eq!(atom.name, "python");
        assert_eq!(atom.slot, Some("3.11".to_string()));
    }

    #[test]
    fn test_parse_name_with_plus() {
        let atom: PackageAtom = "=x11-libs/gtk+-3.24.40".parse().unwrap();
        assert_eq!(atom.name, "gtk+");
        assert_eq!(atom.version, Some("3.24.40".to_string()));
    }

    #[test]
    fn test_parse_invalid_atoms() {
        assert!("???".parse::<PackageAtom>().is_err());
        assert!("".parse::<PackageAtom>().is_err());
        assert!("no-category".parse::<PackageAtom>().is_err());
        assert!(">=sys-apps/systemd".parse::<PackageAtom>().is_err());
        assert!("sys-apps/bad!name".parse::<PackageAtom>().is_err());
    }

    #[test]
    fn test_atom_display_round_trip() {
        for s in [
            "sys-apps/systemd",
            ">=sys-apps/systemd-250",
            "~dev-libs/glib-2.78.0",
            "dev-lang/python:3.11",
            "app-shells/bash::gentoo",
        ] {
            let atom: PackageAtom = s.parse().unwrap();
            assert_eq!(atom.to_string(), s);
        }
    }

    #[test]
    fn test_split_cpv() {
        let (c, n, v) = split_cpv("sys-apps/systemd-250.5").unwrap();
        assert_eq!(c, "sys-apps");
        assert_eq!(n, "systemd");
        assert_eq!(v, "250.5");
        assert!(split_cpv("sys-apps/systemd").is_none());
    }

    #[test]
    fn test_cmp_versions() {
        assert_eq!(cmp_versions("1.2", "1.10"), Ordering::Less);
        assert_eq!(cmp_versions("2.0", "2.0"), Ordering::Equal);
        assert_eq!(cmp_versions("1.2.3", "1.2"), Ordering::Greater);
        assert_eq!(cmp_versions("1.0-r2", "1.0-r10"), Ordering::Less);
    }

    #[test]
    fn test_cmp_versions_pre_release_ranks_below_release() {
        assert_eq!(cmp_versions("1.0_alpha", "1.0"), Ordering::Less);
        assert_eq!(cmp_versions("1.0_beta2", "1.0"), Ordering::Less);
        assert_eq!(cmp_versions("1.0_rc1", "1.0"), Ordering::Less);
        assert_eq!(cmp_versions("1.0", "1.0_rc1"), Ordering::Greater);
        assert_eq!(cmp_versions("1.0_alpha", "1.0_beta"), Ordering::Less);
        // Patch levels and revisions still rank above the bare version
        assert_eq!(cmp_versions("1.0_p1", "1.0"), Ordering::Greater);
        assert_eq!(cmp_versions("1.0-r1", "1.0"), Ordering::Greater);
    }

    #[test]
    fn test_version_matches() {
        let atom: PackageAtom = ">=sys-apps/systemd-250".parse().unwrap();
        assert!(atom.version_matches("251"));
        assert!(atom.version_matches("250"));
        assert!(!atom.version_matches("249"));

        let tilde: PackageAtom = "~dev-libs/glib-2.78.0".parse().unwrap();
        assert!(tilde.version_matches("2.78.0-r1"));
        assert!(!tilde.version_matches("2.78.1"));
    }
}
