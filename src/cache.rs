//! On-disk location and writing of rendered pages.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::info;

use crate::Result;

/// `<base>/<slug>.<section>`, with `/` in the slug written as `%2F` so an
/// article name never reaches outside `base`.
pub fn cache_path(base: &Path, slug: &str, section: u8) -> PathBuf {
    base.join(format!("{}.{section}", slug.replace('/', "%2F")))
}

/// Writes `contents` to `path` in one step: the page is staged in a
/// temporary file beside `path` and renamed over it, so a failed run never
/// leaves a truncated page behind.
pub fn write_artifact(path: &Path, contents: &str) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir)?;
    let mut staged = NamedTempFile::new_in(dir)?;
    staged.write_all(contents.as_bytes())?;
    staged.persist(path).map_err(|err| err.error)?;
    info!(path = %path.display(), bytes = contents.len(), "wrote manpage");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cache_path_uses_slug_and_section() {
        let path = cache_path(Path::new("/var/cache/wikiman"), "Rust_(language)", 1);
        assert_eq!(path, PathBuf::from("/var/cache/wikiman/Rust_(language).1"));
    }

    #[test]
    fn cache_path_keeps_slashes_out_of_the_tree() {
        let path = cache_path(Path::new("man"), "AC/DC", 7);
        assert_eq!(path, PathBuf::from("man/AC%2FDC.7"));
    }

    #[test]
    fn write_artifact_creates_directories_and_replaces() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested").join("Page.1");
        write_artifact(&path, "first").expect("first write");
        write_artifact(&path, "second").expect("second write");
        assert_eq!(fs::read_to_string(&path).expect("read"), "second");
        assert_eq!(fs::read_dir(path.parent().expect("parent")).expect("dir").count(), 1);
    }
}
