//! Package database access
//!
//! The validator never talks to a concrete package database directly; it
//! goes through the [`PackageDatabase`] trait so callers can inject a real
//! ebuild repository or an in-memory fake.
//!
//! Two implementations are provided:
//! - [`MemoryDatabase`]: in-memory package list, used by tests and embedders
//! - [`CacheDatabase`]: reads an ebuild repository's `metadata/md5-cache`

use crate::atom::{cmp_versions, split_cpv, split_pv, PackageAtom};
use crate::{Result, SetError};
use indexmap::IndexSet;
use std::path::{Path, PathBuf};

/// A concrete package version selected by [`PackageDatabase::best_match`]
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResolvedPackage {
    /// Package category (e.g. "sys-apps")
    pub category: String,
    /// Package name (e.g. "systemd")
    pub name: String,
    /// Concrete version (e.g. "250.5")
    pub version: String,
}

impl ResolvedPackage {
    /// The full category/name-version string
    pub fn cpv(&self) -> String {
        format!("{}/{}-{}", self.category, self.name, self.version)
    }
}

/// Read-only oracle over an external package database
pub trait PackageDatabase {
    /// Whether a string is syntactically a valid package atom
    fn is_valid_atom(&self, atom: &str) -> bool;

    /// Best visible match for an atom, or None if no package satisfies it
    fn best_match(&self, atom: &str) -> Option<ResolvedPackage>;

    /// The IUSE tokens a resolved package declares, default-sign prefixes
    /// (`+`/`-`) included
    fn declared_use_flags(&self, package: &ResolvedPackage) -> IndexSet<String>;
}

/// In-memory package database
///
/// Packages are registered with a concrete cpv and their IUSE tokens.
#[derive(Debug, Clone, Default)]
pub struct MemoryDatabase {
    packages: Vec<MemoryPackage>,
}

#[derive(Debug, Clone)]
struct MemoryPackage {
    category: String,
    name: String,
    version: String,
    iuse: Vec<String>,
}

impl MemoryDatabase {
    /// Create an empty database
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a package version with its declared IUSE tokens
    pub fn insert(&mut self, cpv: &str, iuse: &[&str]) -> Result<()> {
        let (category, name, version) =
            split_cpv(cpv).ok_or_else(|| SetError::InvalidAtom(cpv.to_string()))?;
        self.packages.push(MemoryPackage {
            category: category.to_string(),
            name: name.to_string(),
            version: version.to_string(),
            iuse: iuse.iter().map(|s| s.to_string()).collect(),
        });
        Ok(())
    }
}

impl PackageDatabase for MemoryDatabase {
    fn is_valid_atom(&self, atom: &str) -> bool {
        atom.parse::<PackageAtom>().is_ok()
    }

    fn best_match(&self, atom: &str) -> Option<ResolvedPackage> {
        let atom: PackageAtom = atom.parse().ok()?;
        self.packages
            .iter()
            .filter(|p| atom.matches_cpn(&p.category, &p.name) && atom.version_matches(&p.version))
            .max_by(|a, b| cmp_versions(&a.version, &b.version))
            .map(|p| ResolvedPackage {
                category: p.category.clone(),
                name: p.name.clone(),
                version: p.version.clone(),
            })
    }

    fn declared_use_flags(&self, package: &ResolvedPackage) -> IndexSet<String> {
        self.packages
            .iter()
            .find(|p| {
                p.category == package.category
                    && p.name == package.name
                    && p.version == package.version
            })
            .map(|p| p.iuse.iter().cloned().collect())
            .unwrap_or_default()
    }
}

/// Standard ebuild repository locations (in search order)
pub const STANDARD_REPO_LOCATIONS: &[&str] = &["/var/db/repos/gentoo", "/usr/portage"];

/// Package database backed by an ebuild repository's md5-cache
///
/// The cache lives at `<repo>/metadata/md5-cache/<category>/<name>-<version>`
/// with one `KEY=value` pair per line; only the `IUSE` key is consulted.
#[derive(Debug, Clone)]
pub struct CacheDatabase {
    root: PathBuf,
}

impl CacheDatabase {
    /// Open a repository at a known location
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Probe the standard repository locations
    pub fn detect() -> Result<Self> {
        for location in STANDARD_REPO_LOCATIONS {
            let root = PathBuf::from(location);
            if root.join("metadata/md5-cache").is_dir() {
                tracing::debug!(repo = %root.display(), "using ebuild repository");
                return Ok(Self::new(root));
            }
        }
        Err(SetError::NotFound(PathBuf::from(STANDARD_REPO_LOCATIONS[0])))
    }

    /// The repository root
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn cache_dir(&self) -> PathBuf {
        self.root.join("metadata/md5-cache")
    }

    /// All cached versions of a category/name pair
    fn versions_of(&self, category: &str, name: &str) -> Vec<String> {
        let dir = self.cache_dir().join(category);
        let entries = match std::fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(_) => return Vec::new(),
        };

        let mut versions = Vec::new();
        for entry in entries.flatten() {
            let file_name = entry.file_name();
            let Some(file_name) = file_name.to_str() else {
                continue;
            };
            // Cache file names are "<name>-<version>"; the version starts at
            // the last "-<digit>", so "gtk+-3.24" does not match "gtk".
            if let Some((entry_name, version)) = split_pv(file_name) {
                if entry_name == name {
                    versions.push(version.to_string());
                }
            }
        }
        versions
    }
}

impl PackageDatabase for CacheDatabase {
    fn is_valid_atom(&self, atom: &str) -> bool {
        atom.parse::<PackageAtom>().is_ok()
    }

    fn best_match(&self, atom: &str) -> Option<ResolvedPackage> {
        let atom: PackageAtom = atom.parse().ok()?;
        self.versions_of(&atom.category, &atom.name)
            .into_iter()
            .filter(|v| atom.version_matches(v))
            .max_by(|a, b| cmp_versions(a, b))
            .map(|version| ResolvedPackage {
                category: atom.category.clone(),
                name: atom.name.clone(),
                version,
            })
    }

    fn declared_use_flags(&self, package: &ResolvedPackage) -> IndexSet<String> {
        let path = self
            .cache_dir()
            .join(&package.category)
            .join(format!("{}-{}", package.name, package.version));

        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(err) => {
                tracing::warn!(cache = %path.display(), %err, "failed to read md5-cache entry");
                return IndexSet::new();
            }
        };

        content
            .lines()
            .find_map(|line| line.strip_prefix("IUSE="))
            .map(|iuse| iuse.split_whitespace().map(|s| s.to_string()).collect())
            .unwrap_or_default()
    }
}
