//! Source directory scanning.
//!
//! Walks each configured directory (top level only unless
//! `sources.recursive` is set), keeps regular files whose extension is on
//! the allow-list and whose relative path matches no exclude glob, and
//! returns them sorted for deterministic indexing order.

use anyhow::{Context, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};
use std::path::{Path, PathBuf};
use tracing::warn;
use walkdir::WalkDir;

use crate::config::Config;
use crate::extract::extension_of;

/// A file selected for indexing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub path: PathBuf,
    /// Stable identifier used as the tracker key and chunk id prefix.
    pub file_id: String,
}

pub fn scan_sources(config: &Config) -> Result<Vec<SourceFile>> {
    let exclude_set = build_globset(&config.sources.exclude_globs)?;
    let mut files = Vec::new();

    for dir in config.source_directories() {
        if !dir.is_dir() {
            warn!(directory = %dir.display(), "source directory does not exist, skipping");
            continue;
        }
        scan_directory(config, &dir, &exclude_set, &mut files)
            .with_context(|| format!("Failed to scan {}", dir.display()))?;
    }

    files.sort_by(|a, b| a.file_id.cmp(&b.file_id));
    files.dedup_by(|a, b| a.file_id == b.file_id);
    Ok(files)
}

fn scan_directory(
    config: &Config,
    root: &Path,
    exclude_set: &GlobSet,
    files: &mut Vec<SourceFile>,
) -> Result<()> {
    let mut walker = WalkDir::new(root).follow_links(config.sources.follow_symlinks);
    if !config.sources.recursive {
        walker = walker.max_depth(1);
    }

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!(error = %e, "unreadable entry, skipping");
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        let ext = extension_of(path);
        if !config.sources.extensions.iter().any(|e| *e == ext) {
            continue;
        }

        let relative = path.strip_prefix(root).unwrap_or(path);
        if exclude_set.is_match(relative) {
            continue;
        }

        files.push(SourceFile {
            path: path.to_path_buf(),
            file_id: file_id_for(path),
        });
    }
    Ok(())
}

/// Absolute path string of `path`, falling back to the path as given.
pub fn file_id_for(path: &Path) -> String {
    std::fs::canonicalize(path)
        .unwrap_or_else(|_| path.to_path_buf())
        .to_string_lossy()
        .to_string()
}

fn build_globset(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        builder.add(Glob::new(pattern).with_context(|| format!("Invalid glob: {}", pattern))?);
    }
    Ok(builder.build()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::parse_config;
    use std::fs;
    use tempfile::TempDir;

    fn config_for(root: &Path, extra: &str) -> Config {
        let text = format!(
            "[db]\npath = \"{}/db.sqlite\"\n\n[sources]\ndirectories = [\"{}\"]\n{}",
            root.display(),
            root.join("docs").display(),
            extra
        );
        parse_config(&text).unwrap()
    }

    fn names(files: &[SourceFile]) -> Vec<String> {
        files
            .iter()
            .map(|f| f.path.file_name().unwrap().to_string_lossy().to_string())
            .collect()
    }

    fn setup() -> TempDir {
        let tmp = TempDir::new().unwrap();
        let docs = tmp.path().join("docs");
        fs::create_dir_all(docs.join("nested")).unwrap();
        fs::write(docs.join("b.txt"), "b").unwrap();
        fs::write(docs.join("a.PDF"), "a").unwrap();
        fs::write(docs.join("c.rs"), "c").unwrap();
        fs::write(docs.join("draft.html"), "d").unwrap();
        fs::write(docs.join("nested/deep.txt"), "deep").unwrap();
        tmp
    }

    #[test]
    fn top_level_only_by_default() {
        let tmp = setup();
        let files = scan_sources(&config_for(tmp.path(), "")).unwrap();
        assert_eq!(names(&files), vec!["a.PDF", "b.txt", "draft.html"]);
    }

    #[test]
    fn recursive_and_excludes() {
        let tmp = setup();
        let cfg = config_for(
            tmp.path(),
            "recursive = true\nexclude_globs = [\"draft.*\"]\n",
        );
        let files = scan_sources(&cfg).unwrap();
        assert_eq!(names(&files), vec!["a.PDF", "b.txt", "deep.txt"]);
        assert!(files.iter().all(|f| Path::new(&f.file_id).is_absolute()));
    }

    #[test]
    fn missing_directory_is_skipped() {
        let tmp = TempDir::new().unwrap();
        let files = scan_sources(&config_for(tmp.path(), "")).unwrap();
        assert!(files.is_empty());
    }
}
