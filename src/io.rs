use anyhow::{Context, Result};
use std::{
    fs,
    path::{Path, PathBuf},
};
use tempfile::TempDir;

/// Candidate file shared by all oracle runs. Lives in a private temporary
/// directory that is removed on drop.
pub(crate) struct Scratch {
    _dir: TempDir,
    path: PathBuf,
}

impl Scratch {
    pub(crate) fn new(parent: Option<&Path>) -> Result<Self> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("deltabtor");
        let dir = match parent {
            Some(parent) => builder.tempdir_in(parent),
            None => builder.tempdir(),
        }
        .context("can not create scratch directory")?;
        let path = dir.path().join("candidate.btor");
        Ok(Self { _dir: dir, path })
    }

    pub(crate) fn path(&self) -> &Path {
        &self.path
    }

    pub(crate) fn write(&self, contents: &[u8]) -> Result<()> {
        fs::write(&self.path, contents)
            .with_context(|| format!("can not write to '{}'", self.path.display()))
    }

    /// Moves the candidate to `output`, copying if a rename is not possible
    /// (e.g. across file systems).
    pub(crate) fn promote(&self, output: &Path) -> Result<()> {
        if fs::rename(&self.path, output).is_ok() {
            return Ok(());
        }
        fs::copy(&self.path, output)
            .with_context(|| format!("can not write to '{}'", output.display()))?;
        fs::remove_file(&self.path)
            .with_context(|| format!("can not remove '{}'", self.path.display()))
    }
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;

    #[test]
    fn test_write_and_promote() -> Result<()> {
        let out_dir = tempfile::tempdir()?;
        let output = out_dir.path().join("out.btor");
        let scratch = Scratch::new(None)?;
        scratch.write(b"1 zero 1\n")?;
        assert_eq!(fs::read_to_string(scratch.path())?, "1 zero 1\n");
        scratch.promote(&output)?;
        assert!(!scratch.path().exists());
        assert_eq!(fs::read_to_string(&output)?, "1 zero 1\n");

        // The scratch file is simply recreated for the next candidate.
        scratch.write(b"2 zero 2\n")?;
        scratch.promote(&output)?;
        assert_eq!(fs::read_to_string(&output)?, "2 zero 2\n");
        Ok(())
    }

    #[test]
    fn test_scratch_dir_removed_on_drop() -> Result<()> {
        let parent = tempfile::tempdir()?;
        let scratch = Scratch::new(Some(parent.path()))?;
        scratch.write(b"")?;
        let dir = scratch.path().parent().unwrap().to_owned();
        assert!(dir.exists());
        drop(scratch);
        assert!(!dir.exists());
        Ok(())
    }
}
