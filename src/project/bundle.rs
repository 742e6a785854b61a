use std::collections::BTreeMap;
use std::path::Path;

use anyhow::Context;

use crate::foundation::error::{PlayerError, PlayerResult};

/// Raw files of an app bundle keyed by normalized relative path.
#[derive(Clone, Debug, Default)]
pub struct ProjectBundle {
    files: BTreeMap<String, Vec<u8>>,
}

impl ProjectBundle {
    /// Empty bundle.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a bundle from in-memory `(path, bytes)` pairs.
    pub fn from_files<I, P, B>(files: I) -> PlayerResult<Self>
    where
        I: IntoIterator<Item = (P, B)>,
        P: AsRef<str>,
        B: Into<Vec<u8>>,
    {
        let mut out = Self::new();
        for (path, bytes) in files {
            out.insert(path.as_ref(), bytes)?;
        }
        Ok(out)
    }

    /// Read every regular file below `root`.
    #[tracing::instrument(skip_all, fields(root = %root.as_ref().display()))]
    pub fn from_dir(root: impl AsRef<Path>) -> PlayerResult<Self> {
        let root = root.as_ref();
        if !root.is_dir() {
            return Err(PlayerError::project_load(format!(
                "bundle root '{}' is not a directory",
                root.display()
            )));
        }
        let mut out = Self::new();
        let mut stack = vec![root.to_path_buf()];
        while let Some(dir) = stack.pop() {
            let entries = std::fs::read_dir(&dir)
                .with_context(|| format!("read bundle dir '{}'", dir.display()))?;
            for entry in entries {
                let entry = entry.context("read bundle dir entry")?;
                let path = entry.path();
                let file_type = entry.file_type().context("stat bundle entry")?;
                if file_type.is_dir() {
                    stack.push(path);
                    continue;
                }
                if !file_type.is_file() {
                    continue;
                }
                let rel = path
                    .strip_prefix(root)
                    .context("bundle entry outside root")?
                    .to_string_lossy()
                    .into_owned();
                let bytes = std::fs::read(&path)
                    .with_context(|| format!("read bundle file '{}'", path.display()))?;
                out.insert(&rel, bytes)?;
            }
        }
        tracing::debug!(files = out.files.len(), "bundle read");
        Ok(out)
    }

    /// Add or replace one file.
    pub fn insert(&mut self, path: &str, bytes: impl Into<Vec<u8>>) -> PlayerResult<()> {
        let key = normalize_rel_path(path).map_err(PlayerError::project_load)?;
        self.files.insert(key, bytes.into());
        Ok(())
    }

    /// Bytes of `path`, if present.
    pub fn get(&self, path: &str) -> Option<&[u8]> {
        let key = normalize_rel_path(path).ok()?;
        self.files.get(&key).map(Vec::as_slice)
    }

    /// Number of files.
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// `true` when the bundle has no files.
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub(crate) fn into_files(self) -> BTreeMap<String, Vec<u8>> {
        self.files
    }
}

/// Normalize a bundle-relative path: `/` separators, no `.` segments, no escapes.
pub(crate) fn normalize_rel_path(source: &str) -> Result<String, String> {
    let s = source.replace('\\', "/");
    if s.starts_with('/') {
        return Err(format!("path '{source}' must be relative"));
    }
    let mut out = Vec::<&str>::new();
    for part in s.split('/') {
        if part.is_empty() || part == "." {
            continue;
        }
        if part == ".." {
            return Err(format!("path '{source}' must not contain '..'"));
        }
        out.push(part);
    }
    if out.is_empty() {
        return Err(format!("path '{source}' must contain a file name"));
    }
    Ok(out.join("/"))
}

#[cfg(test)]
#[path = "../../tests/unit/project/bundle.rs"]
mod tests;
