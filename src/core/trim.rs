// In-place removal of the final line of a text file.
use std::fs;
use std::path::Path;

use bstr::ByteSlice;

use crate::core::error::{Error, ErrorKind};

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum TrimOutcome {
    /// The last line was (or would be) removed; `kept_lines` remain.
    Trimmed { removed: Vec<u8>, kept_lines: usize },
    /// The file had no content; nothing was written.
    Empty,
}

/// Splits `content` into the bytes to keep and the last line.
///
/// Lines end at `\n` and keep their terminator, so `\r\n` endings survive
/// untouched. A trailing segment without a terminator still counts as a
/// line. Returns `None` for empty content.
pub fn split_last_line(content: &[u8]) -> Option<(&[u8], &[u8])> {
    let last = content.lines_with_terminator().last()?;
    Some(content.split_at(content.len() - last.len()))
}

/// Reads `path` and reports what trimming would do, without writing.
pub fn plan_trim(path: &Path) -> Result<TrimOutcome, Error> {
    let content = read_text(path)?;
    Ok(outcome_for(&content))
}

/// Rewrites `path` without its last line.
///
/// The file is truncated and rewritten at the same path; an interrupted
/// write can leave it partially written. Empty files are not reopened.
pub fn trim_last_line(path: &Path) -> Result<TrimOutcome, Error> {
    let content = read_text(path)?;
    let Some((kept, _)) = split_last_line(&content) else {
        tracing::debug!(path = %path.display(), "empty file left unchanged");
        return Ok(TrimOutcome::Empty);
    };

    fs::write(path, kept).map_err(|err| Error::from_io(err, path))?;

    let outcome = outcome_for(&content);
    if let TrimOutcome::Trimmed {
        removed,
        kept_lines,
    } = &outcome
    {
        tracing::debug!(
            path = %path.display(),
            removed_bytes = removed.len(),
            kept_lines,
            "trimmed last line"
        );
    }
    Ok(outcome)
}

fn outcome_for(content: &[u8]) -> TrimOutcome {
    match split_last_line(content) {
        Some((kept, removed)) => TrimOutcome::Trimmed {
            removed: removed.to_vec(),
            kept_lines: kept.lines_with_terminator().count(),
        },
        None => TrimOutcome::Empty,
    }
}

fn read_text(path: &Path) -> Result<Vec<u8>, Error> {
    let content = fs::read(path).map_err(|err| Error::from_io(err, path))?;
    if let Err(err) = std::str::from_utf8(&content) {
        return Err(Error::new(ErrorKind::Encoding)
            .with_message("file is not valid UTF-8")
            .with_path(path)
            .with_source(err));
    }
    Ok(content)
}
