//! Removed-directory archive packages.
//!
//! When a scope's sidecar folder no longer matches any content directory, its
//! override and metadata folders are copied into a self-describing package.
//! The live folders stay where they are, so recreating the directory brings
//! the human edits back without a restore step.
//!
//! ```text
//! .archive/
//! ├── README.md                              # index of all packages
//! └── removed_directories/
//!     └── concepts_removed_2025-06-06/
//!         ├── README.md                      # restoration note
//!         ├── backup_info.json               # manifest
//!         ├── config/concepts/…
//!         └── metadata/concepts/…
//! ```

use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::StoreError;
use crate::layout::{SidecarLayout, signature_path};

const REMOVED_DIR: &str = "removed_directories";
const README: &str = "README.md";
const MANIFEST: &str = "backup_info.json";

/// Reason recorded when a content directory vanished.
pub const REASON_DIRECTORY_REMOVED: &str = "Directory no longer exists in filesystem";

/// Manifest written into every package.
#[derive(Debug, Serialize)]
struct BackupInfo<'a> {
    #[serde(rename = "type")]
    backup_type: &'static str,
    original_path: &'a str,
    language: &'a str,
    removed_date: String,
    reason: &'a str,
    package_name: &'a str,
    contents: BackupContents,
}

#[derive(Debug, Default, Serialize)]
struct BackupContents {
    config_files: Vec<String>,
    metadata_files: Vec<String>,
}

/// Result of archiving one scope.
#[derive(Debug)]
pub struct ArchivedDirectory {
    /// Package directory.
    pub package: PathBuf,
    /// Files copied into `config/`, relative to the package.
    pub config_files: Vec<String>,
    /// Files copied into `metadata/`, relative to the package.
    pub metadata_files: Vec<String>,
}

/// Creates archive packages below `<overrides>/.archive`.
#[derive(Debug, Clone)]
pub struct ArchiveService {
    layout: SidecarLayout,
}

impl ArchiveService {
    #[must_use]
    pub fn new(layout: SidecarLayout) -> Self {
        Self { layout }
    }

    /// Copy the sidecar and metadata folders of `signature` into a new package.
    ///
    /// The source folders are left untouched. Returns `None` when neither
    /// folder exists.
    pub fn archive_removed_directory(&self, lang: &str, signature: &str, reason: &str) -> Result<Option<ArchivedDirectory>, StoreError> {
        let config_src = self.layout.config_dir(lang, signature);
        let metadata_src = self.layout.metadata_dir(lang, signature);
        if !config_src.is_dir() && !metadata_src.is_dir() {
            return Ok(None);
        }

        let name = signature.rsplit('/').next().unwrap_or(signature);
        let now = chrono::Local::now();
        let package = self.unique_package_dir(name, &now.format("%Y-%m-%d").to_string());
        let package_name = package
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        let mut contents = BackupContents::default();
        if config_src.is_dir() {
            let target = package.join("config").join(name);
            copy_dir(&config_src, &target)?;
            contents.config_files = list_files(&target, &format!("config/{name}"));
        }
        if metadata_src.is_dir() {
            let target = package.join("metadata").join(name);
            copy_dir(&metadata_src, &target)?;
            contents.metadata_files = list_files(&target, &format!("metadata/{name}"));
        }

        let info = BackupInfo {
            backup_type: "removed_directory",
            original_path: signature,
            language: lang,
            removed_date: now.to_rfc3339(),
            reason,
            package_name: &package_name,
            contents,
        };
        let manifest = serde_json::to_string_pretty(&info).map_err(|e| StoreError::json(e, package.join(MANIFEST)))?;
        write_file(&package.join(MANIFEST), &manifest)?;
        write_file(&package.join(README), &self.restore_note(&info, name))?;
        self.update_index()?;

        tracing::info!(package = %package.display(), signature, lang, "Archived removed directory");

        Ok(Some(ArchivedDirectory {
            package,
            config_files: info.contents.config_files,
            metadata_files: info.contents.metadata_files,
        }))
    }

    /// All package directories, sorted by name.
    #[must_use]
    pub fn packages(&self) -> Vec<PathBuf> {
        let Ok(entries) = fs::read_dir(self.layout.archive_root().join(REMOVED_DIR)) else {
            return Vec::new();
        };
        let mut packages: Vec<PathBuf> = entries
            .filter_map(Result::ok)
            .map(|e| e.path())
            .filter(|p| p.is_dir())
            .collect();
        packages.sort();
        packages
    }

    fn unique_package_dir(&self, name: &str, date: &str) -> PathBuf {
        let base = self.layout.archive_root().join(REMOVED_DIR);
        let first = base.join(format!("{name}_removed_{date}"));
        if !first.exists() {
            return first;
        }
        (2..)
            .map(|n| base.join(format!("{name}_removed_{date}_{n}")))
            .find(|candidate| !candidate.exists())
            .unwrap_or(first)
    }

    fn restore_note(&self, info: &BackupInfo<'_>, name: &str) -> String {
        let language = if info.language.is_empty() {
            "(default)"
        } else {
            info.language
        };
        let config_target = relative_to(&self.layout.config_dir(info.language, info.original_path), self.layout.root());
        let metadata_target = relative_to(&self.layout.metadata_dir(info.language, info.original_path), self.layout.root());

        let mut note = String::new();
        let _ = writeln!(note, "# Restore: {name}\n");
        let _ = writeln!(note, "- **Language**: {language}");
        let _ = writeln!(note, "- **Directory**: `{}`", signature_path(info.original_path));
        let _ = writeln!(note, "- **Removed on**: {}", info.removed_date);
        let _ = writeln!(note, "- **Reason**: {}\n", info.reason);
        let _ = writeln!(note, "## Contents\n");
        let _ = writeln!(note, "- `config/{name}/` override values (labels, order, collapse, visibility)");
        let _ = writeln!(note, "- `metadata/{name}/` provenance of those values");
        let _ = writeln!(note, "- `{MANIFEST}` list of archived files\n");
        let _ = writeln!(note, "## How to restore\n");
        let _ = writeln!(note, "The live folders `{config_target}/` and `{metadata_target}/` are kept in the override root.");
        let _ = writeln!(note, "Recreating `{}` and regenerating brings the values back.", signature_path(info.original_path));
        let _ = writeln!(note, "If those folders were deleted since:\n");
        let _ = writeln!(note, "1. Copy `config/{name}/` to `{config_target}/` in the override root.");
        let _ = writeln!(note, "2. Copy `metadata/{name}/` to `{metadata_target}/` in the override root.");
        let _ = writeln!(note, "3. Regenerate navigation. Entries marked `isUserSet` are kept as they are.");
        note
    }

    fn update_index(&self) -> Result<(), StoreError> {
        let mut index = String::from("# Sidebar archive\n\n");
        index.push_str("Snapshots of override folders whose content directory was removed.\n");
        index.push_str("Each package holds a `README.md` with restore steps and a `backup_info.json` manifest.\n\n");
        index.push_str("## Packages\n\n");
        for package in self.packages() {
            if let Some(name) = package.file_name() {
                let _ = writeln!(index, "- [`{0}`]({REMOVED_DIR}/{0}/{README})", name.to_string_lossy());
            }
        }
        write_file(&self.layout.archive_root().join(README), &index)
    }
}

fn copy_dir(from: &Path, to: &Path) -> Result<(), StoreError> {
    fs::create_dir_all(to).map_err(|e| StoreError::io(e, to).with_operation("archive"))?;
    let entries = fs::read_dir(from).map_err(|e| StoreError::io(e, from).with_operation("archive"))?;
    for entry in entries {
        let entry = entry.map_err(|e| StoreError::io(e, from).with_operation("archive"))?;
        let source = entry.path();
        let target = to.join(entry.file_name());
        if source.is_dir() {
            copy_dir(&source, &target)?;
        } else {
            fs::copy(&source, &target).map_err(|e| StoreError::io(e, &source).with_operation("archive"))?;
        }
    }
    Ok(())
}

fn write_file(path: &Path, content: &str) -> Result<(), StoreError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| StoreError::io(e, parent).with_operation("archive"))?;
    }
    fs::write(path, content).map_err(|e| StoreError::io(e, path).with_operation("archive"))
}

/// Files below `dir`, as `prefix/…` paths, sorted.
fn list_files(dir: &Path, prefix: &str) -> Vec<String> {
    let mut files = Vec::new();
    collect_files(dir, prefix, &mut files);
    files.sort();
    files
}

fn collect_files(dir: &Path, prefix: &str, files: &mut Vec<String>) {
    let Ok(entries) = fs::read_dir(dir) else {
        return;
    };
    for entry in entries.filter_map(Result::ok) {
        let name = entry.file_name().to_string_lossy().into_owned();
        let rel = format!("{prefix}/{name}");
        if entry.path().is_dir() {
            collect_files(&entry.path(), &rel, files);
        } else {
            files.push(rel);
        }
    }
}

fn relative_to(path: &Path, base: &Path) -> String {
    let rel = path.strip_prefix(base).unwrap_or(path);
    let text = rel
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/");
    if text.is_empty() { ".".to_owned() } else { text }
}
