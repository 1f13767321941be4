//! Local filesystem helpers for document intake.

use chrono::Local;
use rag_twin_shared::{ErrorCode, RagError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::File;
use std::path::{Path, PathBuf};

/// Extensions accepted for ingestion.
pub const SUPPORTED_FILE_TYPES: [&str; 3] = [".pdf", ".txt", ".md"];

const INVALID_FILENAME_CHARS: [char; 9] = ['<', '>', ':', '"', '/', '\\', '|', '?', '*'];
const UNNAMED_FILE: &str = "unnamed_file";
const SIZE_UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];
const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// Document type, by extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileType {
    /// `.pdf`
    Pdf,
    /// `.txt`
    Txt,
    /// `.md` / `.markdown`
    Md,
    /// Anything else.
    Unknown,
}

impl FileType {
    /// Classify `path` by its extension (case-insensitive).
    #[must_use]
    pub fn from_path(path: &Path) -> Self {
        match extension_lowercase(path).as_deref() {
            Some("pdf") => Self::Pdf,
            Some("txt") => Self::Txt,
            Some("md" | "markdown") => Self::Md,
            _ => Self::Unknown,
        }
    }

    /// Lowercase label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Txt => "txt",
            Self::Md => "md",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for FileType {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Outcome of [`validate_file`].
#[derive(Debug, Clone, PartialEq)]
pub enum FileCheck {
    /// The file can be processed.
    Valid,
    /// Nothing exists at the path.
    Missing(PathBuf),
    /// The path exists but is not a regular file.
    NotAFile(PathBuf),
    /// The file exceeds the size limit.
    TooLarge {
        /// Checked path.
        path: PathBuf,
        /// Actual size in MiB.
        size_mb: f64,
        /// Limit in MiB.
        max_size_mb: u64,
    },
    /// The file cannot be opened for reading.
    Unreadable(PathBuf),
}

impl FileCheck {
    /// True for [`FileCheck::Valid`].
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }

    /// Human-readable reason; empty when valid.
    #[must_use]
    pub fn message(&self) -> String {
        match self {
            Self::Valid => String::new(),
            Self::Missing(path) => format!("File does not exist: {}", path.display()),
            Self::NotAFile(path) => format!("Path is not a file: {}", path.display()),
            Self::TooLarge {
                size_mb,
                max_size_mb,
                ..
            } => format!("File too large: {size_mb:.1}MB > {max_size_mb}MB"),
            Self::Unreadable(path) => format!("File is not readable: {}", path.display()),
        }
    }

    /// Convert a failed check into a document error.
    pub fn into_result(self) -> Result<()> {
        let (code, path) = match &self {
            Self::Valid => return Ok(()),
            Self::Missing(path) => (ErrorCode::DocumentNotFound, path),
            Self::TooLarge { path, .. } => (ErrorCode::DocumentTooLarge, path),
            Self::NotAFile(path) | Self::Unreadable(path) => {
                (ErrorCode::DocumentInvalidFormat, path)
            },
        };
        Err(RagError::document(
            self.message(),
            code,
            &path.display().to_string(),
        ))
    }
}

/// Create `path` and any missing parents; returns the path.
pub fn ensure_directory(path: &Path) -> Result<PathBuf> {
    std::fs::create_dir_all(path).map_err(|error| io_error("create directory", path, error))?;
    Ok(path.to_path_buf())
}

/// Size of the file at `path` in bytes.
pub fn file_size(path: &Path) -> Result<u64> {
    std::fs::metadata(path)
        .map(|metadata| metadata.len())
        .map_err(|error| io_error("read metadata of", path, error))
}

/// Check that `path` is an existing, readable file within `max_size_mb`.
/// A missing or zero limit disables the size check.
pub fn validate_file(path: &Path, max_size_mb: Option<u64>) -> FileCheck {
    let Ok(metadata) = std::fs::metadata(path) else {
        return FileCheck::Missing(path.to_path_buf());
    };
    if !metadata.is_file() {
        return FileCheck::NotAFile(path.to_path_buf());
    }
    if let Some(limit) = max_size_mb.filter(|limit| *limit > 0) {
        let size_mb = bytes_to_f64(metadata.len()) / BYTES_PER_MB;
        if size_mb > bytes_to_f64(limit) {
            return FileCheck::TooLarge {
                path: path.to_path_buf(),
                size_mb,
                max_size_mb: limit,
            };
        }
    }
    if File::open(path).is_err() {
        return FileCheck::Unreadable(path.to_path_buf());
    }
    FileCheck::Valid
}

/// True when the extension is in [`SUPPORTED_FILE_TYPES`].
#[must_use]
pub fn is_supported_file_type(path: &Path) -> bool {
    extension_lowercase(path).is_some_and(|ext| {
        SUPPORTED_FILE_TYPES
            .iter()
            .any(|supported| supported.strip_prefix('.') == Some(ext.as_str()))
    })
}

/// Replace characters most filesystems reject, trim spaces and dots from
/// both ends, and fall back to `unnamed_file`.
#[must_use]
pub fn clean_filename(filename: &str) -> String {
    let replaced: String = filename
        .chars()
        .map(|ch| if INVALID_FILENAME_CHARS.contains(&ch) { '_' } else { ch })
        .collect();
    let trimmed = replaced.trim_matches(|ch| ch == ' ' || ch == '.');
    if trimmed.is_empty() {
        UNNAMED_FILE.to_owned()
    } else {
        trimmed.to_owned()
    }
}

/// Copy `path` to `<stem>_<YYYYmmdd_HHMMSS><ext>` in `backup_dir`, or next to
/// the source when no directory is given. Returns the backup path.
pub fn backup_file(path: &Path, backup_dir: Option<&Path>) -> Result<PathBuf> {
    let target_dir = match backup_dir {
        Some(dir) => ensure_directory(dir)?,
        None => path.parent().map(Path::to_path_buf).unwrap_or_default(),
    };
    let stem = path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default();
    let suffix = path
        .extension()
        .map(|ext| format!(".{}", ext.to_string_lossy()))
        .unwrap_or_default();
    let timestamp = Local::now().format("%Y%m%d_%H%M%S");
    let target = target_dir.join(format!("{stem}_{timestamp}{suffix}"));

    std::fs::copy(path, &target).map_err(|error| io_error("back up", path, error))?;
    if let Ok(modified) = std::fs::metadata(path).and_then(|metadata| metadata.modified()) {
        let preserved = File::options()
            .write(true)
            .open(&target)
            .and_then(|file| file.set_modified(modified));
        if let Err(error) = preserved {
            tracing::debug!(path = %target.display(), %error, "could not preserve mtime on backup");
        }
    }
    Ok(target)
}

/// Files under `dir` matching `pattern`, sorted.
///
/// Each `/`-separated pattern segment matches one path component with `*`,
/// `?` and `[...]` classes (`[!...]` negates), so `sub/*.md` matches markdown
/// files in a `sub` directory and a single segment matches file names. With
/// `recursive` the pattern may match at any depth below `dir`. `**` is not
/// special. A missing or non-directory `dir` yields no files. Symlinked
/// directories are not descended into.
pub fn find_files(dir: &Path, pattern: &str, recursive: bool) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }
    let segments: Vec<Vec<char>> = pattern
        .split('/')
        .filter(|segment| !segment.is_empty())
        .map(|segment| segment.chars().collect())
        .collect();
    let max_depth = if recursive {
        usize::MAX
    } else {
        segments.len().saturating_sub(1)
    };
    let mut found = Vec::new();
    let mut pending = vec![(dir.to_path_buf(), Vec::<String>::new())];

    while let Some((current, relative)) = pending.pop() {
        let entries =
            std::fs::read_dir(&current).map_err(|error| io_error("read directory", &current, error))?;
        for entry in entries {
            let entry = entry.map_err(|error| io_error("read directory", &current, error))?;
            let path = entry.path();
            let mut entry_relative = relative.clone();
            entry_relative.push(entry.file_name().to_string_lossy().into_owned());

            if entry.file_type().is_ok_and(|kind| kind.is_dir()) {
                if relative.len() < max_depth {
                    pending.push((path, entry_relative));
                }
                continue;
            }
            if path.is_file() && segments_match(&segments, &entry_relative, recursive) {
                found.push(path);
            }
        }
    }

    found.sort();
    Ok(found)
}

/// Total size of all files under `dir`, recursively. Files that vanish or
/// cannot be inspected mid-walk are skipped.
pub fn directory_size(dir: &Path) -> Result<u64> {
    let total = find_files(dir, "*", true)?
        .iter()
        .filter_map(|path| file_size(path).ok())
        .fold(0_u64, u64::saturating_add);
    Ok(total)
}

/// Human-readable size: `0 B`, `512.0 B`, `1.5 KB`, ... up to `TB`.
#[must_use]
pub fn format_file_size(size_bytes: u64) -> String {
    if size_bytes == 0 {
        return "0 B".to_owned();
    }
    let mut size = bytes_to_f64(size_bytes);
    let mut unit = 0;
    while size >= 1024.0 && unit < SIZE_UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }
    let label = SIZE_UNITS.get(unit).copied().unwrap_or("TB");
    format!("{size:.1} {label}")
}

fn extension_lowercase(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
}

#[allow(clippy::cast_precision_loss)]
fn bytes_to_f64(value: u64) -> f64 {
    value as f64
}

/// Glob match over whole names; `*` spans any run, `?` one character.
fn segments_match(pattern: &[Vec<char>], relative: &[String], anywhere: bool) -> bool {
    if pattern.is_empty() || relative.len() < pattern.len() {
        return false;
    }
    if !anywhere && relative.len() != pattern.len() {
        return false;
    }
    let tail = relative
        .get(relative.len() - pattern.len()..)
        .unwrap_or_default();
    pattern
        .iter()
        .zip(tail)
        .all(|(segment, name)| wildcard_match(segment, &name.chars().collect::<Vec<_>>()))
}

fn wildcard_match(pattern: &[char], name: &[char]) -> bool {
    let (mut p, mut n) = (0, 0);
    let mut backtrack: Option<(usize, usize)> = None;

    while let Some(actual) = name.get(n) {
        if pattern.get(p) == Some(&'*') {
            backtrack = Some((p, n));
            p += 1;
            continue;
        }
        if let Some(next) = match_one(pattern, p, *actual) {
            p = next;
            n += 1;
            continue;
        }
        match backtrack {
            Some((star, matched)) => {
                p = star + 1;
                n = matched + 1;
                backtrack = Some((star, matched + 1));
            },
            None => return false,
        }
    }
    pattern.get(p..).is_some_and(|rest| rest.iter().all(|ch| *ch == '*'))
}

/// Pattern index after the element at `p`, if that element matches `actual`.
fn match_one(pattern: &[char], p: usize, actual: char) -> Option<usize> {
    match pattern.get(p)? {
        '?' => Some(p + 1),
        '[' => match class_end(pattern, p) {
            Some(end) => class_contains(pattern.get(p + 1..end)?, actual).then_some(end + 1),
            None => (actual == '[').then_some(p + 1),
        },
        expected => (*expected == actual).then_some(p + 1),
    }
}

/// Index of the `]` closing the class opened at `open`. A `]` right after
/// the opening bracket (or its negation) is a literal member.
fn class_end(pattern: &[char], open: usize) -> Option<usize> {
    let mut index = open + 1;
    if matches!(pattern.get(index), Some('!' | '^')) {
        index += 1;
    }
    if pattern.get(index) == Some(&']') {
        index += 1;
    }
    while let Some(ch) = pattern.get(index) {
        if *ch == ']' {
            return Some(index);
        }
        index += 1;
    }
    None
}

fn class_contains(body: &[char], actual: char) -> bool {
    let (negated, body) = match body.split_first() {
        Some(('!' | '^', rest)) => (true, rest),
        _ => (false, body),
    };
    let mut found = false;
    let mut index = 0;
    while let Some(start) = body.get(index) {
        if let (Some('-'), Some(end)) = (body.get(index + 1), body.get(index + 2)) {
            found |= (*start..=*end).contains(&actual);
            index += 3;
        } else {
            found |= *start == actual;
            index += 1;
        }
    }
    found != negated
}

fn io_error(action: &str, path: &Path, error: std::io::Error) -> RagError {
    let code = if error.kind() == std::io::ErrorKind::TimedOut {
        ErrorCode::SystemTimeout
    } else {
        ErrorCode::SystemUnknownError
    };
    RagError::system(
        format!("Failed to {action} {}: {error}", path.display()),
        code,
        "filesystem",
    )
    .with_detail("path", path.display().to_string())
    .with_cause(error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::time::{SystemTime, UNIX_EPOCH};

    struct ScratchDir(PathBuf);

    impl ScratchDir {
        fn new(prefix: &str) -> Result<Self, Box<dyn std::error::Error>> {
            let nanos = SystemTime::now().duration_since(UNIX_EPOCH)?.as_nanos();
            let path = std::env::temp_dir().join(format!("rag-twin-fs-{prefix}-{nanos}"));
            std::fs::create_dir_all(&path)?;
            Ok(Self(path))
        }

        fn write(&self, relative: &str, contents: &[u8]) -> Result<PathBuf, Box<dyn std::error::Error>> {
            let path = self.0.join(relative);
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(&path, contents)?;
            Ok(path)
        }
    }

    impl Drop for ScratchDir {
        fn drop(&mut self) {
            let _ = std::fs::remove_dir_all(&self.0);
        }
    }

    fn matches(pattern: &str, name: &str) -> bool {
        let pattern: Vec<char> = pattern.chars().collect();
        let name: Vec<char> = name.chars().collect();
        wildcard_match(&pattern, &name)
    }

    #[test]
    fn formats_sizes() {
        assert_eq!(format_file_size(0), "0 B");
        assert_eq!(format_file_size(512), "512.0 B");
        assert_eq!(format_file_size(1536), "1.5 KB");
        assert_eq!(format_file_size(5 * 1024 * 1024), "5.0 MB");
        assert_eq!(format_file_size(1024_u64.pow(5) * 2), "2048.0 TB");
    }

    #[test]
    fn cleans_filenames() {
        assert_eq!(clean_filename("report:v1?.pdf"), "report_v1_.pdf");
        assert_eq!(clean_filename("  ..notes.md.. "), "notes.md");
        assert_eq!(clean_filename("a<b>c|d*e\"f\\g/h"), "a_b_c_d_e_f_g_h");
        assert_eq!(clean_filename(" . . "), "unnamed_file");
        assert_eq!(clean_filename(""), "unnamed_file");
    }

    #[test]
    fn classifies_file_types() {
        assert_eq!(FileType::from_path(Path::new("a.PDF")), FileType::Pdf);
        assert_eq!(FileType::from_path(Path::new("a.txt")), FileType::Txt);
        assert_eq!(FileType::from_path(Path::new("a.markdown")), FileType::Md);
        assert_eq!(FileType::from_path(Path::new("a.docx")), FileType::Unknown);
        assert_eq!(FileType::from_path(Path::new("README")), FileType::Unknown);
        assert_eq!(FileType::Md.to_string(), "md");

        assert!(is_supported_file_type(Path::new("notes.MD")));
        assert!(is_supported_file_type(Path::new("paper.pdf")));
        assert!(!is_supported_file_type(Path::new("notes.markdown")));
        assert!(!is_supported_file_type(Path::new("archive.zip")));
    }

    #[test]
    fn wildcard_matching() {
        assert!(matches("*", "anything.txt"));
        assert!(matches("*.md", "notes.md"));
        assert!(!matches("*.md", "notes.md.bak"));
        assert!(matches("file?.txt", "file1.txt"));
        assert!(!matches("file?.txt", "file10.txt"));
        assert!(matches("a*b*c", "aXXbYYc"));
        assert!(!matches("a*b*c", "aXXbYY"));
        assert!(matches("**", ""));
    }

    #[test]
    fn character_classes() {
        assert!(matches("chapter[0-9].md", "chapter3.md"));
        assert!(!matches("chapter[0-9].md", "chapterX.md"));
        assert!(matches("[!.]*", "notes.md"));
        assert!(!matches("[!.]*", ".hidden"));
        assert!(matches("[ab]*.txt", "b-side.txt"));
        assert!(matches("[]]x", "]x"));
        assert!(matches("a[b", "a[b"));
        assert!(matches("*[a-c]", "xyzb"));
    }

    #[test]
    fn validates_files() -> Result<(), Box<dyn std::error::Error>> {
        let dir = ScratchDir::new("validate")?;
        let small = dir.write("small.txt", b"hello")?;
        let big = dir.write("big.txt", &vec![b'x'; 2 * 1024 * 1024 + 1])?;

        assert!(validate_file(&small, Some(1)).is_valid());
        assert!(validate_file(&big, None).is_valid());
        assert!(validate_file(&big, Some(0)).is_valid());

        let too_large = validate_file(&big, Some(1));
        assert_eq!(too_large.message(), "File too large: 2.0MB > 1MB");
        let error = too_large.into_result().err();
        assert_eq!(error.map(|error| error.code()), Some(ErrorCode::DocumentTooLarge));

        let missing = dir.0.join("missing.txt");
        let check = validate_file(&missing, None);
        assert_eq!(
            check.message(),
            format!("File does not exist: {}", missing.display())
        );
        let error = check.into_result().err();
        assert_eq!(error.as_ref().map(RagError::code), Some(ErrorCode::DocumentNotFound));
        assert_eq!(
            error.and_then(|error| error.details().get("file_path").cloned()),
            Some(serde_json::Value::from(missing.display().to_string()))
        );

        let check = validate_file(&dir.0, None);
        assert!(matches!(check, FileCheck::NotAFile(_)));
        assert!(check.message().starts_with("Path is not a file: "));
        assert!(FileCheck::Valid.into_result().is_ok());
        Ok(())
    }

    #[test]
    fn finds_files_by_pattern() -> Result<(), Box<dyn std::error::Error>> {
        let dir = ScratchDir::new("find")?;
        let top = dir.write("a.md", b"# a")?;
        let nested = dir.write("sub/deeper/b.md", b"# b")?;
        dir.write("sub/c.txt", b"c")?;

        assert_eq!(find_files(&dir.0, "*.md", true)?, {
            let mut expected = vec![top.clone(), nested];
            expected.sort();
            expected
        });
        assert_eq!(find_files(&dir.0, "*.md", false)?, vec![top.clone()]);
        assert_eq!(find_files(&dir.0, "*", true)?.len(), 3);
        assert!(find_files(&dir.0.join("absent"), "*", true)?.is_empty());
        assert!(find_files(&top, "*", true)?.is_empty());
        Ok(())
    }

    #[test]
    fn finds_files_by_path_pattern() -> Result<(), Box<dyn std::error::Error>> {
        let dir = ScratchDir::new("find-path")?;
        let direct = dir.write("sub/a.md", b"# a")?;
        let deep = dir.write("x/sub/b.md", b"# b")?;
        dir.write("sub/c.txt", b"c")?;
        dir.write("other/d.md", b"# d")?;

        assert_eq!(find_files(&dir.0, "sub/*.md", false)?, vec![direct.clone()]);
        assert_eq!(find_files(&dir.0, "sub/*.md", true)?, {
            let mut expected = vec![direct, deep];
            expected.sort();
            expected
        });
        assert_eq!(find_files(&dir.0, "[a-o]*/*.md", false)?.len(), 1);
        Ok(())
    }

    #[test]
    fn sums_directory_size() -> Result<(), Box<dyn std::error::Error>> {
        let dir = ScratchDir::new("size")?;
        dir.write("one.txt", b"12345")?;
        dir.write("nested/two.txt", b"123")?;
        assert_eq!(directory_size(&dir.0)?, 8);
        assert_eq!(file_size(&dir.0.join("one.txt"))?, 5);
        assert_eq!(directory_size(&dir.0.join("absent"))?, 0);
        Ok(())
    }

    #[test]
    fn file_size_of_missing_file_is_system_error() -> Result<(), Box<dyn std::error::Error>> {
        let dir = ScratchDir::new("missing-size")?;
        let error = file_size(&dir.0.join("nope.txt"))
            .err()
            .ok_or("expected error")?;
        assert_eq!(error.code(), ErrorCode::SystemUnknownError);
        assert!(error.cause().is_some());
        Ok(())
    }

    #[test]
    fn backs_up_files() -> Result<(), Box<dyn std::error::Error>> {
        let dir = ScratchDir::new("backup")?;
        let source = dir.write("notes.md", b"content")?;

        let beside = backup_file(&source, None)?;
        assert_eq!(beside.parent(), source.parent());
        let name = beside
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        assert!(name.starts_with("notes_"));
        assert!(name.ends_with(".md"));
        // notes_ + YYYYmmdd_HHMMSS + .md
        assert_eq!(name.len(), "notes_".len() + 15 + ".md".len());

        let elsewhere = backup_file(&source, Some(&dir.0.join("backups").join("daily")))?;
        assert!(elsewhere.starts_with(dir.0.join("backups").join("daily")));
        assert_eq!(std::fs::read(&elsewhere)?, b"content");

        let ensured = ensure_directory(&dir.0.join("x").join("y"))?;
        assert!(ensured.is_dir());
        Ok(())
    }

    proptest! {
        #[test]
        fn cleaned_names_are_safe(name in ".{0,40}") {
            let cleaned = clean_filename(&name);
            prop_assert!(!cleaned.is_empty());
            prop_assert!(!cleaned.chars().any(|ch| INVALID_FILENAME_CHARS.contains(&ch)));
            prop_assert!(!cleaned.starts_with(['.', ' ']));
            prop_assert!(!cleaned.ends_with(['.', ' ']));
        }
    }
}
