// Recursive traversal that trims every file whose name ends with a suffix.
use std::ffi::OsStr;
use std::path::Path;

use walkdir::WalkDir;

use crate::core::error::{Error, ErrorKind, io_error_kind};
use crate::core::trim::{TrimOutcome, plan_trim, trim_last_line};

pub const DEFAULT_SUFFIX: &str = ".samples";

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct WalkOptions {
    pub suffix: String,
    pub dry_run: bool,
}

impl Default for WalkOptions {
    fn default() -> Self {
        Self {
            suffix: DEFAULT_SUFFIX.to_string(),
            dry_run: false,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct WalkReport {
    pub matched: u64,
    pub trimmed: u64,
    pub empty: u64,
}

/// Returns true when `file_name` ends with `suffix`, compared byte-wise.
pub fn is_match(file_name: &OsStr, suffix: &str) -> bool {
    file_name.as_encoded_bytes().ends_with(suffix.as_bytes())
}

/// Walks `root` and trims the last line of every matching file.
///
/// `on_match` runs with each matching path before it is touched. The first
/// failure stops the walk; files already trimmed stay trimmed. That includes
/// directories that cannot be read: they abort the walk instead of being
/// skipped.
///
/// # Errors
/// - `NotFound` when `root` does not exist.
/// - `Usage` when `root` is not a directory or the suffix is empty.
/// - Any trimmer or directory-read error met during the walk.
pub fn trim_tree<F>(
    root: &Path,
    options: &WalkOptions,
    mut on_match: F,
) -> Result<WalkReport, Error>
where
    F: FnMut(&Path),
{
    validate(root, options)?;

    let mut report = WalkReport::default();
    for entry in WalkDir::new(root).follow_links(false) {
        let entry = entry.map_err(|err| walk_error(err, root))?;
        if entry.file_type().is_dir() || !is_match(entry.file_name(), &options.suffix) {
            continue;
        }
        let path = entry.path();
        // Unfollowed symlinks to directories show up as non-directory entries.
        if entry.path_is_symlink() && path.is_dir() {
            continue;
        }

        report.matched += 1;
        on_match(path);

        let outcome = if options.dry_run {
            plan_trim(path)?
        } else {
            trim_last_line(path)?
        };
        match outcome {
            TrimOutcome::Trimmed { .. } => report.trimmed += 1,
            TrimOutcome::Empty => report.empty += 1,
        }
    }

    tracing::info!(
        root = %root.display(),
        suffix = %options.suffix,
        dry_run = options.dry_run,
        matched = report.matched,
        trimmed = report.trimmed,
        empty = report.empty,
        "walk complete"
    );
    Ok(report)
}

fn validate(root: &Path, options: &WalkOptions) -> Result<(), Error> {
    if options.suffix.is_empty() {
        return Err(Error::new(ErrorKind::Usage)
            .with_message("suffix must not be empty")
            .with_hint("Pass a file-name suffix such as --suffix .samples."));
    }
    let metadata = std::fs::metadata(root).map_err(|err| {
        Error::from_io(err, root).with_message("cannot access root directory")
    })?;
    if !metadata.is_dir() {
        return Err(Error::new(ErrorKind::Usage)
            .with_message("root is not a directory")
            .with_path(root));
    }
    Ok(())
}

fn walk_error(err: walkdir::Error, root: &Path) -> Error {
    let path = err.path().unwrap_or(root).to_path_buf();
    let kind = err.io_error().map(io_error_kind).unwrap_or(ErrorKind::Io);
    Error::new(kind)
        .with_message("cannot read directory entry")
        .with_path(path)
        .with_source(err)
}
