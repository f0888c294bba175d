//! Set file entries
//!
//! A set definition file is line-oriented. Each line is either a comment
//! (blank, or first non-whitespace character `#`) stored verbatim, or an
//! ebuild entry: an optional leading marker token (`!` keyworded, `-`
//! skipped), a mandatory package atom, and zero or more USE flag tokens.
//!
//! Every entry can be validated against a [`PackageDatabase`] and rendered
//! into the three generated configuration dialects.

use crate::error::{Result, SetError};
use crate::repo::PackageDatabase;
use crate::use_flags::{sort_use_flags, UseFlag, UseSign};
use console::Style;
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Output dialect for entry formatting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Destination {
    /// package.accept_keywords fragment
    AcceptKeywords,
    /// package.use fragment
    UseFlags,
    /// sets/ member file
    Sets,
}

impl Destination {
    /// All destinations, in write order
    pub const ALL: [Destination; 3] = [
        Destination::AcceptKeywords,
        Destination::UseFlags,
        Destination::Sets,
    ];

    /// Directory name under the output root
    pub fn dir_name(&self) -> &'static str {
        match self {
            Destination::AcceptKeywords => "package.accept_keywords",
            Destination::UseFlags => "package.use",
            Destination::Sets => "sets",
        }
    }
}

/// Selection status parsed from the optional leading marker token
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntryStatus {
    /// No marker
    #[default]
    Normal,
    /// `!` - accepted despite not being in the default stability channel
    Keyworded,
    /// `-` - listed for USE bookkeeping but not selected for installation
    Skipped,
}

/// An ebuild entry: one selected package with optional USE overrides
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EBuild {
    /// The package atom string as written
    pub cpv: String,
    /// Requested USE flags, marker token excluded, duplicates preserved
    pub uses: Vec<UseFlag>,
    /// Selection status from the leading marker
    pub status: EntryStatus,
    /// Source set file
    pub path: PathBuf,
    /// 1-based line number within the source file
    pub line_no: usize,
}

impl EBuild {
    fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }

    /// The requested flags in canonical [bare, +flag, -flag] order
    pub fn sorted_uses(&self) -> Vec<UseFlag> {
        let mut uses = self.uses.clone();
        sort_use_flags(&mut uses);
        uses
    }

    /// Validate this entry against the package database
    ///
    /// Checks run in order and stop at the first failure: atom syntax,
    /// resolvability, USE flag legality. Diagnostics go to stdout with a
    /// `file:line:` prefix; the return value only says whether all checks
    /// passed.
    pub fn check(&self, db: &dyn PackageDatabase) -> bool {
        let file = self.file_name();

        if !db.is_valid_atom(&self.cpv) {
            println!(
                "{}:{}: error: not a valid portage atom: {}",
                file, self.line_no, self.cpv
            );
            return false;
        }

        let Some(resolved) = db.best_match(&self.cpv) else {
            println!(
                "{}:{}: error: portage atom not in any repo: {}",
                file, self.line_no, self.cpv
            );
            return false;
        };

        // Both sides compare by bare name: IUSE entries carry default-sign
        // prefixes and requested flags carry request signs.
        let declared: IndexSet<String> = db
            .declared_use_flags(&resolved)
            .iter()
            .map(|f| UseFlag::parse(f).name)
            .collect();
        let unknown = self.unknown_against(&declared);

        if !unknown.is_empty() {
            let requested: Vec<String> = self.uses.iter().map(|f| f.to_string()).collect();
            println!(
                "{}:{}: error: \"{}\" not a valid use flag: {} {}",
                file,
                self.line_no,
                unknown.join(" "),
                self.cpv,
                requested.join(" ")
            );
            let declared: Vec<&str> = declared.iter().map(|s| s.as_str()).collect();
            println!("└─ available USE flags: {}", declared.join(" "));
            return false;
        }
        true
    }

    /// Requested bare names absent from a declared bare-name set, deduplicated
    fn unknown_against<'a>(&'a self, declared: &IndexSet<String>) -> Vec<&'a str> {
        let unknown: IndexSet<&str> = self
            .uses
            .iter()
            .map(|f| f.bare_name())
            .filter(|name| !declared.contains(*name))
            .collect();
        unknown.into_iter().collect()
    }

    /// Render this entry for a destination file
    pub fn format(&self, destination: Destination) -> String {
        match destination {
            Destination::AcceptKeywords => {
                if self.status == EntryStatus::Keyworded {
                    self.cpv.clone()
                } else {
                    format!("#{}", self.cpv)
                }
            }
            Destination::UseFlags => {
                if self.uses.is_empty() {
                    format!("#{}", self.cpv)
                } else {
                    let uses: Vec<String> =
                        self.sorted_uses().iter().map(|f| f.to_string()).collect();
                    format!("{} {}", self.cpv, uses.join(" "))
                }
            }
            Destination::Sets => {
                if self.status == EntryStatus::Skipped {
                    format!("#{} (skipped)", self.cpv)
                } else {
                    self.cpv.clone()
                }
            }
        }
    }

    /// Render this entry for terminal display
    ///
    /// Cosmetic only; never feeds the destination files. The atom is green,
    /// flags are colored by sign bucket (bare bright white, `+` blue, `-`
    /// red).
    pub fn pretty(&self, color: bool) -> String {
        let uses = self.sorted_uses();
        if !color {
            let mut out = self.cpv.clone();
            for flag in &uses {
                out.push(' ');
                out.push_str(&flag.to_string());
            }
            return out;
        }

        let green = Style::new().green().force_styling(true);
        let mut out = green.apply_to(&self.cpv).to_string();
        for flag in &uses {
            let style = match flag.sign {
                UseSign::Bare => Style::new().white().bright(),
                UseSign::Plus => Style::new().blue(),
                UseSign::Minus => Style::new().red(),
            }
            .force_styling(true);
            out.push(' ');
            out.push_str(&style.apply_to(flag.to_string()).to_string());
        }
        out
    }
}

/// One line of a set definition file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Entry {
    /// Blank line or `#` comment, stored verbatim
    Comment {
        /// The raw line text
        line: String,
        /// Source set file
        path: PathBuf,
        /// 1-based line number
        line_no: usize,
    },
    /// A selected package
    EBuild(EBuild),
}

impl Entry {
    /// Parse one source line into an entry
    ///
    /// `line_no` is 1-based. A line consisting only of a marker token is
    /// malformed and fails the whole load.
    pub fn parse(path: &Path, line_no: usize, line: &str) -> Result<Entry> {
        let file_name = || {
            path.file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string())
        };

        // Windows line endings are stripped before tokenizing
        let line = line.strip_suffix('\r').unwrap_or(line);

        let trimmed = line.trim_start();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            return Ok(Entry::Comment {
                line: line.to_string(),
                path: path.to_path_buf(),
                line_no,
            });
        }

        let mut tokens = line.split_whitespace().peekable();
        let status = match tokens.peek() {
            Some(&"!") => {
                tokens.next();
                EntryStatus::Keyworded
            }
            Some(&"-") => {
                tokens.next();
                EntryStatus::Skipped
            }
            _ => EntryStatus::Normal,
        };

        let cpv = tokens.next().ok_or_else(|| SetError::Parse {
            file: file_name(),
            line: line_no,
            reason: "marker token without a package atom".to_string(),
        })?;

        // At most one marker, and only in leading position
        if cpv == "!" || cpv == "-" {
            return Err(SetError::Parse {
                file: file_name(),
                line: line_no,
                reason: "more than one leading marker token".to_string(),
            });
        }

        Ok(Entry::EBuild(EBuild {
            cpv: cpv.to_string(),
            uses: tokens.map(UseFlag::parse).collect(),
            status,
            path: path.to_path_buf(),
            line_no,
        }))
    }

    /// 1-based line number within the source file
    pub fn line_no(&self) -> usize {
        match self {
            Entry::Comment { line_no, .. } => *line_no,
            Entry::EBuild(ebuild) => ebuild.line_no,
        }
    }

    /// Whether this entry is a comment
    pub fn is_comment(&self) -> bool {
        matches!(self, Entry::Comment { .. })
    }

    /// Validate this entry; comments always pass
    pub fn check(&self, db: &dyn PackageDatabase) -> bool {
        match self {
            Entry::Comment { .. } => true,
            Entry::EBuild(ebuild) => ebuild.check(db),
        }
    }

    /// Render this entry for a destination file
    ///
    /// Comments pass through verbatim for every destination.
    pub fn format(&self, destination: Destination) -> String {
        match self {
            Entry::Comment { line, .. } => line.clone(),
            Entry::EBuild(ebuild) => ebuild.format(destination),
        }
    }

    /// Render this entry for terminal display; comments are dimmed
    pub fn pretty(&self, color: bool) -> String {
        match self {
            Entry::Comment { line, .. } => {
                if color {
                    Style::new()
                        .dim()
                        .force_styling(true)
                        .apply_to(line)
                        .to_string()
                } else {
                    line.clone()
                }
            }
            Entry::EBuild(ebuild) => ebuild.pretty(color),
        }
    }
}
