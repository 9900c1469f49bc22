/*
 * Plain data types shared by the enumerator, the scanner and the presenter.
 * `FileHandle` identifies a project file, `MatchRecord` is a single located
 * occurrence of the query, and `SearchQuery` is the validated user input.
 */
use std::fmt;
use std::path::{Path, PathBuf};

// Identifies a project file. Equality and hashing are by path only.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FileHandle {
    path: PathBuf,
    name: String,
}

impl FileHandle {
    /*
     * Creates a handle for `path`. The display name is the final path component,
     * falling back to the whole path for roots or paths ending in `..`.
     */
    pub fn new(path: PathBuf) -> Self {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.to_string_lossy().into_owned());
        FileHandle { path, name }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn display_path(&self) -> String {
        self.path.display().to_string()
    }
}

/*
 * One occurrence of the query inside one file.
 * `line_number` and `column_number` are 0-based; the column counts characters from
 * the start of the line. `line_text` is the untrimmed line as it was when scanned.
 */
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchRecord {
    pub file: FileHandle,
    pub line_number: usize,
    pub line_text: String,
    pub column_number: usize,
}

impl MatchRecord {
    // Label used by list views: "name (path:line) - trimmed text", with a 1-based line.
    pub fn display_label(&self) -> String {
        format!(
            "{} ({}:{}) - {}",
            self.file.name(),
            self.file.display_path(),
            self.line_number + 1,
            self.line_text.trim()
        )
    }
}

// A trimmed, non-empty search string. Construct with `SearchQuery::parse`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    text: String,
    char_len: usize,
}

impl SearchQuery {
    // Returns `None` when the input is empty or only whitespace.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }
        Some(SearchQuery {
            text: trimmed.to_string(),
            char_len: trimmed.chars().count(),
        })
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    // Length in characters; a match always spans exactly this many characters of text.
    pub fn char_len(&self) -> usize {
        self.char_len
    }
}

impl fmt::Display for SearchQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}
