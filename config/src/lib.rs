//! Portage set definitions
//!
//! This crate is the core of portsets: it parses line-oriented portage set
//! definition files into typed entries, validates entries against a package
//! database, and projects each entry into the three generated configuration
//! file families.
//!
//! # Overview
//!
//! - [`entry`]: the Comment/EBuild entry model and destination formatting
//! - [`set`]: the ordered entry container bound to a source file
//! - [`use_flags`]: USE flag tokens and their canonical ordering
//! - [`atom`]: package atom parsing and version matching
//! - [`repo`]: the package database oracle and its implementations
//! - [`emit`]: output layout, collision detection and file writing
//! - [`error`]: error types
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use portsets_config::{CacheDatabase, Destination, OutputLayout, PortageSet};
//!
//! let db = CacheDatabase::detect().unwrap();
//! let set = PortageSet::load("/etc/portage/sets.d/desktop").unwrap();
//!
//! if set.check(&db) {
//!     let layout = OutputLayout::new("/etc/portage");
//!     layout.write_all(std::slice::from_ref(&set), false).unwrap();
//! }
//! ```
//!
//! # Set file format
//!
//! ```text
//! # comments and blank lines pass through verbatim
//! app-editors/vim -X +lua     # atom plus USE overrides
//! ! app-misc/some-tool        # '!' accepts unstable keywords
//! - x11-libs/gtk+ wayland     # '-' records flags without selecting
//! ```

pub mod atom;
pub mod emit;
pub mod entry;
pub mod error;
pub mod repo;
pub mod set;
pub mod use_flags;

// Re-exports for convenience
pub use atom::{cmp_versions, split_cpv, split_pv, PackageAtom, VersionOp};
pub use emit::OutputLayout;
pub use entry::{Destination, EBuild, Entry, EntryStatus};
pub use error::{Result, SetError};
pub use repo::{
    CacheDatabase, MemoryDatabase, PackageDatabase, ResolvedPackage, STANDARD_REPO_LOCATIONS,
};
pub use set::PortageSet;
pub use use_flags::{sort_use_flags, UseFlag, UseSign};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        Destination, EBuild, Entry, EntryStatus, MemoryDatabase, OutputLayout, PackageDatabase,
        PortageSet, Result, SetError, UseFlag,
    };
}
