// In-memory stand-ins for the file tree and text providers, shared by unit tests.
use super::file_system::{FileEnumeratorOperations, FileSystemError, Result as EnumResult};
use super::models::FileHandle;
use super::text_content::{ContentError, Result as ContentResult, TextContentOperations, TextDocument};
use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::mpsc::Receiver;
use std::sync::{Arc, Mutex};

pub fn handles(paths: &[&str]) -> Vec<FileHandle> {
    paths
        .iter()
        .map(|p| FileHandle::new(PathBuf::from(p)))
        .collect()
}

pub struct StaticEnumerator {
    files: Vec<FileHandle>,
    fail: bool,
}

impl StaticEnumerator {
    pub fn new(files: Vec<FileHandle>) -> Self {
        StaticEnumerator { files, fail: false }
    }

    pub fn failing() -> Self {
        StaticEnumerator {
            files: Vec::new(),
            fail: true,
        }
    }
}

impl FileEnumeratorOperations for StaticEnumerator {
    fn enumerate(&self, root_path: &Path) -> EnumResult<Vec<FileHandle>> {
        if self.fail {
            return Err(FileSystemError::InvalidPath(root_path.to_path_buf()));
        }
        Ok(self.files.clone())
    }
}

pub struct InMemoryContent {
    texts: HashMap<PathBuf, String>,
}

impl InMemoryContent {
    pub fn new(entries: &[(&str, &str)]) -> Self {
        InMemoryContent {
            texts: entries
                .iter()
                .map(|(path, text)| (PathBuf::from(path), text.to_string()))
                .collect(),
        }
    }
}

impl TextContentOperations for InMemoryContent {
    fn load(&self, file: &FileHandle) -> ContentResult<TextDocument> {
        self.texts
            .get(file.path())
            .map(|text| TextDocument::new(text.clone()))
            .ok_or_else(|| ContentError::Io(io::Error::new(io::ErrorKind::NotFound, "not mocked")))
    }
}

/*
 * Serves the same text for every file, but each load first waits for a token on
 * `gate`. Dropping the sending side releases all pending and future loads.
 */
pub struct GatedContent {
    gate: Mutex<Receiver<()>>,
    text: String,
    loads: Arc<Mutex<usize>>,
}

impl GatedContent {
    pub fn new(gate: Receiver<()>, text: &str) -> Self {
        GatedContent {
            gate: Mutex::new(gate),
            text: text.to_string(),
            loads: Arc::new(Mutex::new(0)),
        }
    }

    pub fn load_counter(&self) -> Arc<Mutex<usize>> {
        Arc::clone(&self.loads)
    }
}

impl TextContentOperations for GatedContent {
    fn load(&self, _file: &FileHandle) -> ContentResult<TextDocument> {
        *self.loads.lock().unwrap() += 1;
        let _ = self.gate.lock().unwrap().recv();
        Ok(TextDocument::new(self.text.clone()))
    }
}

pub struct PanickingContent;

impl TextContentOperations for PanickingContent {
    fn load(&self, _file: &FileHandle) -> ContentResult<TextDocument> {
        panic!("content provider exploded");
    }
}
