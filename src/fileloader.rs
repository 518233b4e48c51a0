//! Reading text assets from disk.

use std::path::Path;

use crate::error::{Error, Result};

/// Reads the whole file at `path` into a string, byte for byte.
///
/// A failed read is logged once and returned as [`Error::Io`], so an empty
/// file and a missing file are no longer the same thing to the caller.
pub fn load_text_file(path: impl AsRef<Path>) -> Result<String> {
    let path = path.as_ref();
    std::fs::read_to_string(path).map_err(|source| {
        log::error!("Failed to open file: {}: {}", path.display(), source);
        Error::Io {
            path: path.to_path_buf(),
            source,
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testlog;

    #[test]
    fn test_load_returns_exact_contents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("basic.vert");
        let source = "#version 330 core\r\nvoid main() {}\n\n  trailing  ";
        std::fs::write(&path, source).unwrap();

        assert_eq!(load_text_file(&path).unwrap(), source);
    }

    #[test]
    fn test_load_empty_file_is_ok() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.frag");
        std::fs::write(&path, "").unwrap();

        assert_eq!(load_text_file(&path).unwrap(), "");
    }

    #[test]
    fn test_load_missing_file_logs_once() {
        testlog::install();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("does-not-exist.vert");

        let err = load_text_file(&path).unwrap_err();
        match &err {
            Error::Io { path: p, source } => {
                assert_eq!(p, &path);
                assert_eq!(source.kind(), std::io::ErrorKind::NotFound);
            }
            other => panic!("unexpected error: {other:?}"),
        }

        let lines = testlog::lines_containing(&path.display().to_string());
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].0, log::Level::Error);
    }

    #[test]
    fn test_load_invalid_utf8_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("binary.frag");
        std::fs::write(&path, [0xff, 0xfe, 0x00]).unwrap();

        match load_text_file(&path) {
            Err(Error::Io { source, .. }) => {
                assert_eq!(source.kind(), std::io::ErrorKind::InvalidData)
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
