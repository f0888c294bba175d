//! Run orchestration for the portsets CLI
//!
//! All configuration flows through one immutable [`Options`] value: load
//! every set, validate every entry, echo the sets, then regenerate the
//! output files.

use anyhow::{bail, Context, Result};
use config::{CacheDatabase, Entry, OutputLayout, PortageSet};
use console::Style;
use std::path::PathBuf;

/// Resolved command line configuration
#[derive(Debug, Clone)]
pub struct Options {
    /// Overwrite existing generated files
    pub force: bool,
    /// Validate and echo only; touch nothing
    pub dry_run: bool,
    /// Suppress the set echo
    pub quiet: bool,
    /// Treat any validation failure as fatal
    pub strict: bool,
    /// Color the set echo
    pub color: bool,
    /// Output root (portage configuration directory)
    pub output: PathBuf,
    /// Ebuild repository root, if not auto-detected
    pub repo: Option<PathBuf>,
    /// Set definition files to process
    pub sets: Vec<PathBuf>,
}

/// Execute one run over all requested sets
pub fn run(options: &Options) -> Result<()> {
    let db = match &options.repo {
        Some(root) => CacheDatabase::new(root),
        None => CacheDatabase::detect().context("no ebuild repository found")?,
    };
    tracing::debug!(repo = %db.root().display(), sets = options.sets.len(), "starting run");

    let mut sets = Vec::with_capacity(options.sets.len());
    for path in &options.sets {
        let set = PortageSet::load(path)
            .with_context(|| format!("failed to load set {}", path.display()))?;
        sets.push(set);
    }

    // Every set is validated in full before any outcome is decided, so one
    // run surfaces every problem.
    let mut all_valid = true;
    for set in &sets {
        if !set.check(&db) {
            all_valid = false;
        }
    }
    if options.strict && !all_valid {
        bail!("validation failed (strict mode)");
    }

    if !options.quiet {
        for (i, set) in sets.iter().enumerate() {
            if i > 0 {
                println!();
            }
            print_set(set, options.color);
        }
    }

    if options.dry_run {
        return Ok(());
    }

    let layout = OutputLayout::new(&options.output);
    let written = layout.write_all(&sets, options.force)?;
    if !options.quiet {
        println!();
        for path in &written {
            println!("{}", path.display());
        }
    }
    Ok(())
}

/// Echo one set as a tree: header line, then entries with connectors
fn print_set(set: &PortageSet, color: bool) {
    if color {
        let header = Style::new().bold().white().bright().force_styling(true);
        println!(
            "{} ({})",
            header.apply_to(format!("@{}", set.name())),
            set.path().display()
        );
    } else {
        println!("@{} ({})", set.name(), set.path().display());
    }

    let last = set.len().saturating_sub(1);
    for (i, entry) in set.iter().enumerate() {
        let connector = if i == last {
            "└─"
        } else if matches!(entry, Entry::Comment { .. }) {
            "│ "
        } else {
            "├─"
        };
        println!("{} {}", connector, entry.pretty(color));
    }
}
