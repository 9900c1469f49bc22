/*
 * Loads file text for scanning and resolves character offsets to lines.
 * `LineIndex` maps any character offset to its containing line and exposes the
 * start/end offsets of each line; offsets count `char`s, not bytes. The
 * `TextContentOperations` trait abstracts where text comes from so the search
 * pipeline can be tested without touching the disk.
 */
use super::models::FileHandle;
use std::fs;
use std::io;
use std::path::PathBuf;

// Number of leading bytes inspected for a NUL byte when deciding if a file is binary.
const BINARY_SNIFF_LEN: usize = 8 * 1024;

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

/*
 * Reasons a file's text cannot be provided. Every variant is a per-file skip for
 * the search; none of them abort a running session.
 */
#[derive(Debug)]
pub enum ContentError {
    Io(io::Error),
    Binary(PathBuf),
    NotUtf8(PathBuf),
    TooLarge { path: PathBuf, size: u64, limit: u64 },
}

impl From<io::Error> for ContentError {
    fn from(err: io::Error) -> Self {
        ContentError::Io(err)
    }
}

impl std::fmt::Display for ContentError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ContentError::Io(e) => write!(f, "I/O error: {e}"),
            ContentError::Binary(p) => write!(f, "Binary content in {p:?}"),
            ContentError::NotUtf8(p) => write!(f, "Content of {p:?} is not valid UTF-8"),
            ContentError::TooLarge { path, size, limit } => {
                write!(f, "{path:?} is {size} bytes, over the {limit} byte limit")
            }
        }
    }
}

impl std::error::Error for ContentError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ContentError::Io(e) => Some(e),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, ContentError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct LineSpan {
    start: usize,
    end: usize,
    byte_start: usize,
    byte_end: usize,
}

/*
 * Line boundaries of a text. "\r\n", a lone '\n' and a lone '\r' each end a line
 * and are not part of it. The text after the last separator is always a line, so
 * an empty text has exactly one empty line.
 */
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineIndex {
    lines: Vec<LineSpan>,
}

impl LineIndex {
    pub fn new(text: &str) -> Self {
        let mut lines = Vec::new();
        let mut start_char = 0;
        let mut start_byte = 0;
        let mut char_pos = 0;
        let mut chars = text.char_indices().peekable();

        while let Some((byte_pos, ch)) = chars.next() {
            let separator_len = match ch {
                '\n' => 1,
                '\r' if matches!(chars.peek(), Some((_, '\n'))) => {
                    chars.next();
                    2
                }
                '\r' => 1,
                _ => {
                    char_pos += 1;
                    continue;
                }
            };
            lines.push(LineSpan {
                start: start_char,
                end: char_pos,
                byte_start: start_byte,
                byte_end: byte_pos,
            });
            // Both separator characters are single-byte.
            char_pos += separator_len;
            start_char = char_pos;
            start_byte = byte_pos + separator_len;
        }

        lines.push(LineSpan {
            start: start_char,
            end: char_pos,
            byte_start: start_byte,
            byte_end: text.len(),
        });

        LineIndex { lines }
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    // Line containing `offset`. Offsets inside a separator resolve to the line it ends.
    pub fn line_of_offset(&self, offset: usize) -> usize {
        self.lines
            .partition_point(|line| line.start <= offset)
            .saturating_sub(1)
    }

    pub fn line_start_offset(&self, line: usize) -> Option<usize> {
        self.lines.get(line).map(|span| span.start)
    }

    // Offset just past the last character of `line`, excluding the separator.
    pub fn line_end_offset(&self, line: usize) -> Option<usize> {
        self.lines.get(line).map(|span| span.end)
    }

    // Flat caret offset for a (line, column) pair: line start plus column.
    pub fn offset_of(&self, line: usize, column: usize) -> Option<usize> {
        self.line_start_offset(line).map(|start| start + column)
    }

    pub fn line_text<'a>(&self, text: &'a str, line: usize) -> Option<&'a str> {
        self.lines
            .get(line)
            .and_then(|span| text.get(span.byte_start..span.byte_end))
    }
}

// Full text of a file together with its line boundaries.
#[derive(Debug, Clone)]
pub struct TextDocument {
    text: String,
    line_index: LineIndex,
}

impl TextDocument {
    pub fn new(text: String) -> Self {
        let line_index = LineIndex::new(&text);
        TextDocument { text, line_index }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn line_index(&self) -> &LineIndex {
        &self.line_index
    }
}

pub trait TextContentOperations: Send + Sync {
    fn load(&self, file: &FileHandle) -> Result<TextDocument>;
}

/*
 * Reads file text from disk. Files over the optional size limit, files with a NUL
 * byte near the start and files that are not UTF-8 are refused. A UTF-8 byte
 * order mark is dropped so it never shows up in line text or column offsets.
 */
pub struct CoreTextContentProvider {
    max_file_size_bytes: Option<u64>,
}

impl CoreTextContentProvider {
    pub fn new(max_file_size_bytes: Option<u64>) -> Self {
        CoreTextContentProvider {
            max_file_size_bytes,
        }
    }
}

impl Default for CoreTextContentProvider {
    fn default() -> Self {
        Self::new(None)
    }
}

impl TextContentOperations for CoreTextContentProvider {
    fn load(&self, file: &FileHandle) -> Result<TextDocument> {
        let path = file.path();
        if let Some(limit) = self.max_file_size_bytes {
            let size = fs::metadata(path)?.len();
            if size > limit {
                return Err(ContentError::TooLarge {
                    path: path.to_path_buf(),
                    size,
                    limit,
                });
            }
        }

        let mut bytes = fs::read(path)?;
        let sniff_len = bytes.len().min(BINARY_SNIFF_LEN);
        if bytes[..sniff_len].contains(&0) {
            return Err(ContentError::Binary(path.to_path_buf()));
        }
        if bytes.starts_with(UTF8_BOM) {
            bytes.drain(..UTF8_BOM.len());
        }

        let text = String::from_utf8(bytes).map_err(|_| ContentError::NotUtf8(path.to_path_buf()))?;
        log::trace!(
            "TextContentProvider: Loaded {} bytes from {:?}.",
            text.len(),
            path
        );
        Ok(TextDocument::new(text))
    }
}
