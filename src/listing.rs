//! Directory listings for sidebars and index pages.
//!
//! A listing holds the immediate, publishable children of one directory:
//! subdirectories and markdown documents, minus anything hidden (`.`/`_`
//! prefix) and minus the output directory. Below the root, a synthetic `..`
//! entry leads one level up.
//!
//! Ordering is directories first, then files, each group sorted by ordinal
//! byte comparison of the name, so `B.md` sorts before `a.md`.

use crate::paths::{self, OutputPaths};
use crate::types::FileEntry;
use std::cmp::Ordering;
use std::fs;
use std::io;
use std::path::Path;

/// List the navigable children of `dir`.
///
/// `paths` supplies the source root (which gets no `..` entry), the output
/// directory (whose base name is excluded at every level) and the URL mapping.
pub fn directory_listing(dir: &Path, paths: &OutputPaths) -> io::Result<Vec<FileEntry>> {
    let output_name = paths.output().file_name();
    let mut entries = Vec::new();

    if dir != paths.root()
        && let Some(parent) = dir.parent()
    {
        entries.push(FileEntry {
            name: "..".to_string(),
            is_dir: true,
            path: parent.to_path_buf(),
            route_path: paths::route_path(parent),
            url: paths.url_for(parent, true),
        });
    }

    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let file_name = entry.file_name();
        if Some(file_name.as_os_str()) == output_name {
            continue;
        }

        let name = file_name.to_string_lossy().into_owned();
        if paths::is_ignored(&name) {
            continue;
        }

        let is_dir = entry.file_type()?.is_dir();
        if !is_dir && !paths::is_markdown(&name) {
            continue;
        }

        let path = entry.path();
        entries.push(FileEntry {
            route_path: paths::route_path(&path),
            url: paths.url_for(&path, is_dir),
            name,
            is_dir,
            path,
        });
    }

    entries.sort_by(compare_entries);
    Ok(entries)
}

/// Directories before files, then ordinal name order.
fn compare_entries(a: &FileEntry, b: &FileEntry) -> Ordering {
    b.is_dir
        .cmp(&a.is_dir)
        .then_with(|| a.name.as_bytes().cmp(b.name.as_bytes()))
}
