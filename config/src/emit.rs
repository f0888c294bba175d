//! Generated file emission
//!
//! Projects every loaded set into the three generated file families below an
//! output root:
//!
//! ```text
//! <root>/package.accept_keywords/<set-name>
//! <root>/package.use/<set-name>
//! <root>/sets/<set-name>
//! ```
//!
//! Collisions are detected over the full (destination, set) cross product
//! before the first write, so a run without `--force` either writes
//! everything or nothing.

use crate::entry::Destination;
use crate::error::{Result, SetError};
use crate::set::PortageSet;
use std::path::{Path, PathBuf};

/// Maps (destination, set) pairs to output paths and writes them
#[derive(Debug, Clone)]
pub struct OutputLayout {
    root: PathBuf,
}

impl OutputLayout {
    /// Create a layout rooted at a portage configuration directory
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The output root
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The output path for one set and destination
    pub fn path_for(&self, destination: Destination, set: &PortageSet) -> PathBuf {
        self.root.join(destination.dir_name()).join(set.name())
    }

    /// Fail if any output path for any set already exists
    pub fn check_collisions(&self, sets: &[PortageSet]) -> Result<()> {
        for destination in Destination::ALL {
            for set in sets {
                let path = self.path_for(destination, set);
                if path.exists() {
                    return Err(SetError::OutputCollision(path));
                }
            }
        }
        Ok(())
    }

    /// Write one set to one destination file, one line per entry
    pub fn write_set(&self, destination: Destination, set: &PortageSet) -> Result<PathBuf> {
        let path = self.path_for(destination, set);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let mut content = String::new();
        for entry in set {
            content.push_str(&entry.format(destination));
            content.push('\n');
        }
        std::fs::write(&path, content)?;

        tracing::info!(
            set = set.name(),
            destination = destination.dir_name(),
            path = %path.display(),
            "wrote set file"
        );
        Ok(path)
    }

    /// Write every set to every destination
    ///
    /// Unless `force` is set, an existing output file anywhere in the cross
    /// product aborts before anything is written.
    pub fn write_all(&self, sets: &[PortageSet], force: bool) -> Result<Vec<PathBuf>> {
        if !force {
            self.check_collisions(sets)?;
        }

        let mut written = Vec::new();
        for destination in Destination::ALL {
            for set in sets {
                written.push(self.write_set(destination, set)?);
            }
        }
        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample_set(dir: &Path) -> PortageSet {
        let path = dir.join("desktop");
        std::fs::write(&path, "# editors\n! app-editors/vim -X +lua\n- x/y qt5\nx/z\n").unwrap();
        PortageSet::load(path).unwrap()
    }

    #[test]
    fn test_write_all_produces_three_dialects() {
        let input = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();
        let sets = vec![sample_set(input.path())];

        let layout = OutputLayout::new(output.path());
        let written = layout.write_all(&sets, false).unwrap();
        assert_eq!(written.len(), 3);

        let read = |dir: &str| {
            std::fs::read_to_string(output.path().join(dir).join("desktop")).unwrap()
        };
        assert_eq!(
            read("package.accept_keywords"),
            "# editors\napp-editors/vim\n#x/y\n#x/z\n"
        );
        assert_eq!(
            read("package.use"),
            "# editors\napp-editors/vim +lua -X\nx/y qt5\n#x/z\n"
        );
        assert_eq!(read("sets"), "# editors\napp-editors/vim\n#x/y (skipped)\nx/z\n");
    }

    #[test]
    fn test_collision_writes_nothing() {
        let input = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();
        let sets = vec![sample_set(input.path())];

        // Pre-existing file in the LAST destination checked: nothing at all
        // may be written, not even the earlier destinations.
        let sets_dir = output.path().join("sets");
        std::fs::create_dir_all(&sets_dir).unwrap();
        std::fs::write(sets_dir.join("desktop"), "old\n").unwrap();

        let err = OutputLayout::new(output.path())
            .write_all(&sets, false)
            .unwrap_err();
        assert!(matches!(err, SetError::OutputCollision(_)));
        assert!(!output.path().join("package.accept_keywords").exists());
        assert!(!output.path().join("package.use").exists());
        assert_eq!(
            std::fs::read_to_string(sets_dir.join("desktop")).unwrap(),
            "old\n"
        );
    }

    #[test]
    fn test_force_overwrites() {
        let input = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();
        let sets = vec![sample_set(input.path())];

        let sets_dir = output.path().join("sets");
        std::fs::create_dir_all(&sets_dir).unwrap();
        std::fs::write(sets_dir.join("desktop"), "old\n").unwrap();

        OutputLayout::new(output.path())
            .write_all(&sets, true)
            .unwrap();
        let new = std::fs::read_to_string(sets_dir.join("desktop")).unwrap();
        assert!(new.starts_with("# editors\n"));
    }
}
