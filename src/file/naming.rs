//! Filename and file ID sanitization, and conflict-free name candidates.

use crate::{CloudboxError, Result};

/// Maximum stored filename length in bytes.
pub const MAX_FILENAME_BYTES: usize = 255;

/// Reduce a client-declared filename to a safe final path component.
///
/// Both `/` and `\` count as separators, so `C:\tmp\a.txt` becomes `a.txt`.
pub fn sanitize_filename(declared: &str) -> Result<String> {
    let name = declared
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
        .trim();

    if name.is_empty() || name == "." || name == ".." {
        return Err(CloudboxError::Validation("invalid filename".to_string()));
    }
    if name.chars().any(char::is_control) {
        return Err(CloudboxError::Validation(
            "filename contains control characters".to_string(),
        ));
    }
    if name.len() > MAX_FILENAME_BYTES {
        return Err(CloudboxError::Validation(format!(
            "filename must be at most {MAX_FILENAME_BYTES} bytes"
        )));
    }
    Ok(name.to_string())
}

/// Reject file IDs that could escape a lookup or a directory.
pub fn sanitize_file_id(id: &str) -> Result<&str> {
    let invalid = id.is_empty()
        || id.contains("..")
        || id.contains('/')
        || id.contains('\\')
        || id.starts_with('~')
        || id.contains(':')
        || id.chars().any(char::is_control);

    if invalid {
        return Err(CloudboxError::Validation("invalid file id".to_string()));
    }
    Ok(id)
}

/// Split a filename into stem and extension (with the dot).
///
/// A leading dot does not start an extension: `.bashrc` has none.
fn split_extension(name: &str) -> (&str, &str) {
    match name.rfind('.') {
        Some(pos) if pos > 0 => name.split_at(pos),
        _ => (name, ""),
    }
}

/// Longest prefix of `s` that fits in `max` bytes without splitting a char.
fn truncate_at_char_boundary(s: &str, max: usize) -> &str {
    if s.len() <= max {
        return s;
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

/// The `attempt`-th candidate name for `name`.
///
/// Attempt 0 is the name itself; attempt n inserts `(n)` before the
/// extension: `report.txt`, `report(1).txt`, `report(2).txt`, ...
///
/// The stem is shortened so a candidate never exceeds
/// [`MAX_FILENAME_BYTES`]. An extension too long to keep is treated as
/// part of the stem.
pub fn candidate_name(name: &str, attempt: u32) -> String {
    if attempt == 0 {
        return name.to_string();
    }
    let suffix = format!("({attempt})");
    let (stem, ext) = match split_extension(name) {
        (stem, ext) if ext.len() + suffix.len() < MAX_FILENAME_BYTES => (stem, ext),
        _ => (name, ""),
    };
    let budget = MAX_FILENAME_BYTES - suffix.len() - ext.len();
    let stem = truncate_at_char_boundary(stem, budget);
    format!("{stem}{suffix}{ext}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_candidate_name() {
        assert_eq!(candidate_name("report.txt", 0), "report.txt");
        assert_eq!(candidate_name("report.txt", 1), "report(1).txt");
        assert_eq!(candidate_name("report.txt", 12), "report(12).txt");
        assert_eq!(candidate_name("archive.tar.gz", 1), "archive.tar(1).gz");
        assert_eq!(candidate_name("README", 2), "README(2)");
        assert_eq!(candidate_name(".bashrc", 1), ".bashrc(1)");
    }

    #[test]
    fn test_candidate_name_stays_within_limit() {
        let long = format!("{}.txt", "a".repeat(MAX_FILENAME_BYTES - 4));
        assert_eq!(long.len(), MAX_FILENAME_BYTES);

        for attempt in [1, 9, 10, 999] {
            let candidate = candidate_name(&long, attempt);
            assert!(candidate.len() <= MAX_FILENAME_BYTES, "{}", candidate.len());
            assert!(candidate.ends_with(&format!("({attempt}).txt")));
        }
        assert_ne!(candidate_name(&long, 1), candidate_name(&long, 2));

        // Multi-byte stems are cut on a char boundary
        let wide = format!("{}.md", "é".repeat(126));
        assert_eq!(wide.len(), 255);
        let candidate = candidate_name(&wide, 1);
        assert!(candidate.len() <= MAX_FILENAME_BYTES);
        assert!(candidate.ends_with("(1).md"));

        // No room for the extension: the whole name is the stem
        let ext_only = format!("a.{}", "b".repeat(MAX_FILENAME_BYTES - 2));
        let candidate = candidate_name(&ext_only, 1);
        assert_eq!(candidate.len(), MAX_FILENAME_BYTES);
        assert!(candidate.ends_with("(1)"));
    }

    #[test]
    fn test_sanitize_filename_keeps_final_component() {
        assert_eq!(sanitize_filename("a.txt").unwrap(), "a.txt");
        assert_eq!(sanitize_filename("dir/sub/a.txt").unwrap(), "a.txt");
        assert_eq!(sanitize_filename("C:\\tmp\\a.txt").unwrap(), "a.txt");
        assert_eq!(sanitize_filename("../../etc/passwd").unwrap(), "passwd");
        assert_eq!(sanitize_filename("my file.pdf").unwrap(), "my file.pdf");
    }

    #[test]
    fn test_sanitize_filename_rejects() {
        for bad in ["", "  ", ".", "..", "dir/", "a/..", "bad\nname", "nul\0"] {
            assert!(sanitize_filename(bad).is_err(), "accepted {:?}", bad);
        }
        assert!(sanitize_filename(&"x".repeat(MAX_FILENAME_BYTES + 1)).is_err());
    }

    #[test]
    fn test_sanitize_file_id() {
        assert!(sanitize_file_id("6f1c2a4e-0d7b-4a53-9c1e-2b8f0e6a1d11").is_ok());

        for bad in [
            "",
            "..",
            "../etc/passwd",
            "/abs",
            "a/b",
            "a\\b",
            "C:evil",
            "~root",
            "id\n",
        ] {
            assert!(sanitize_file_id(bad).is_err(), "accepted {:?}", bad);
        }
    }
}
