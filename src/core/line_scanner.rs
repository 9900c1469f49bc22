/*
 * Finds every case-insensitive occurrence of a query in a file and resolves each
 * one to a line number, column and line text.
 *
 * The search resumes one character after the start of the previous match, so
 * overlapping occurrences are all reported ("aa" is found twice in "aaa").
 */
use super::models::{FileHandle, MatchRecord, SearchQuery};
use super::text_content::{TextContentOperations, TextDocument};

/*
 * Scans `file` for `query` using text from `content`. A file whose text cannot be
 * provided yields no records; the reason is only logged.
 */
pub fn scan(
    file: &FileHandle,
    query: &SearchQuery,
    content: &dyn TextContentOperations,
) -> Vec<MatchRecord> {
    match content.load(file) {
        Ok(document) => scan_document(file, &document, query),
        Err(e) => {
            log::debug!("LineScanner: Skipping {:?}: {e}", file.path());
            Vec::new()
        }
    }
}

// Records are returned in the order the matches occur in the text.
pub fn scan_document(
    file: &FileHandle,
    document: &TextDocument,
    query: &SearchQuery,
) -> Vec<MatchRecord> {
    let text = document.text();
    let line_index = document.line_index();
    let haystack: Vec<char> = text.chars().collect();
    let needle: Vec<char> = query.as_str().chars().collect();

    let mut records = Vec::new();
    let mut next = find_ignore_case(&haystack, &needle, 0);
    while let Some(offset) = next {
        let line_number = line_index.line_of_offset(offset);
        let (Some(line_start), Some(line_text)) = (
            line_index.line_start_offset(line_number),
            line_index.line_text(text, line_number),
        ) else {
            log::warn!(
                "LineScanner: No line found for offset {offset} in {:?}; stopping scan of this file.",
                file.path()
            );
            break;
        };

        records.push(MatchRecord {
            file: file.clone(),
            line_number,
            line_text: line_text.to_string(),
            column_number: offset - line_start,
        });
        next = find_ignore_case(&haystack, &needle, offset + 1);
    }

    records
}

/*
 * Character offset of the first case-insensitive occurrence of `needle` in
 * `haystack` at or after `from`.
 */
pub fn find_ignore_case(haystack: &[char], needle: &[char], from: usize) -> Option<usize> {
    if needle.is_empty() || needle.len() > haystack.len() {
        return None;
    }
    let last_start = haystack.len() - needle.len();
    (from..=last_start).find(|&start| {
        haystack[start..start + needle.len()]
            .iter()
            .zip(needle)
            .all(|(&a, &b)| chars_eq_ignore_case(a, b))
    })
}

// Two chars are equal ignoring case if their uppercase forms, or the lowercase forms of those, agree.
pub fn chars_eq_ignore_case(a: char, b: char) -> bool {
    if a == b {
        return true;
    }
    if a.is_ascii() && b.is_ascii() {
        return a.eq_ignore_ascii_case(&b);
    }
    let upper_a = simple_uppercase(a);
    let upper_b = simple_uppercase(b);
    upper_a == upper_b || simple_lowercase(upper_a) == simple_lowercase(upper_b)
}

// Single-char case mappings only; expansions like 'ß' -> "SS" leave the char unchanged.
fn simple_uppercase(c: char) -> char {
    let mut mapped = c.to_uppercase();
    match (mapped.next(), mapped.next()) {
        (Some(upper), None) => upper,
        _ => c,
    }
}

fn simple_lowercase(c: char) -> char {
    let mut mapped = c.to_lowercase();
    match (mapped.next(), mapped.next()) {
        (Some(lower), None) => lower,
        _ => c,
    }
}
