//! Word containment predicates over text and files.
//!
//! Both the scanner's inclusion check ("all search words present") and its
//! exclusion check ("any exclusion word present") go through [`WordMatcher`].
//! Files are read in bounded chunks so large files never have to fit in
//! memory at once.

use std::borrow::Cow;
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

use crate::cancel::CancellationToken;

/// Upper bound on how much of a file is held in memory at once
pub const CHUNK_SIZE: usize = 200 * 1024 * 1024;

/// Files whose content is never searched
pub const NOISE_FILE_NAMES: &[&str] = &[".DS_Store", "Thumbs.db", "desktop.ini", "Icon\r"];

/// How a word list is tested against content
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WordMode {
    /// Every word must appear somewhere
    All,
    /// At least one word must appear
    Any,
}

/// Case-aware word list predicate
#[derive(Debug, Clone)]
pub struct WordMatcher {
    words: Vec<String>,
    mode: WordMode,
    match_case: bool,
    chunk_size: usize,
}

impl WordMatcher {
    pub fn new<S: AsRef<str>>(words: &[S], mode: WordMode, match_case: bool) -> Self {
        let words = words
            .iter()
            .map(|w| w.as_ref())
            .filter(|w| !w.is_empty())
            .map(|w| {
                if match_case {
                    w.to_string()
                } else {
                    w.to_lowercase()
                }
            })
            .collect();

        Self {
            words,
            mode,
            match_case,
            chunk_size: CHUNK_SIZE,
        }
    }

    pub fn all<S: AsRef<str>>(words: &[S], match_case: bool) -> Self {
        Self::new(words, WordMode::All, match_case)
    }

    pub fn any<S: AsRef<str>>(words: &[S], match_case: bool) -> Self {
        Self::new(words, WordMode::Any, match_case)
    }

    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Test the word list against in-memory text
    pub fn matches_text(&self, text: &str) -> bool {
        let haystack = self.normalize(text);
        match self.mode {
            WordMode::All => self.words.iter().all(|w| haystack.contains(w.as_str())),
            WordMode::Any => self.words.iter().any(|w| haystack.contains(w.as_str())),
        }
    }

    /// Test the word list against a file's content, chunk by chunk.
    ///
    /// Zero-length files and noise files never match. Returns `Ok(false)` if
    /// cancellation is observed between chunks.
    pub fn matches_file(&self, path: &Path, cancel: &CancellationToken) -> io::Result<bool> {
        if is_noise_file(path) {
            return Ok(false);
        }

        let mut file = File::open(path)?;
        if file.metadata()?.len() == 0 {
            return Ok(false);
        }
        if self.words.is_empty() {
            return Ok(self.mode == WordMode::All);
        }

        let overlap = self.overlap_len();
        let mut found = vec![false; self.words.len()];
        let mut carry: Vec<u8> = Vec::new();

        loop {
            if cancel.is_cancelled() {
                return Ok(false);
            }

            let mut chunk = std::mem::take(&mut carry);
            let read = (&mut file)
                .take(self.chunk_size as u64)
                .read_to_end(&mut chunk)?;
            if read == 0 {
                break;
            }

            let text = String::from_utf8_lossy(&chunk);
            let haystack = self.normalize(&text);

            match self.mode {
                WordMode::Any => {
                    if self.words.iter().any(|w| haystack.contains(w.as_str())) {
                        return Ok(true);
                    }
                }
                WordMode::All => {
                    for (seen, word) in found.iter_mut().zip(&self.words) {
                        if !*seen && haystack.contains(word.as_str()) {
                            *seen = true;
                        }
                    }
                    if found.iter().all(|&seen| seen) {
                        return Ok(true);
                    }
                }
            }

            if read < self.chunk_size {
                break;
            }

            // Keep the tail so words straddling the boundary are still seen
            let keep = overlap.min(chunk.len());
            carry = chunk.split_off(chunk.len() - keep);
        }

        Ok(false)
    }

    fn normalize<'t>(&self, text: &'t str) -> Cow<'t, str> {
        if self.match_case {
            Cow::Borrowed(text)
        } else {
            Cow::Owned(text.to_lowercase())
        }
    }

    fn overlap_len(&self) -> usize {
        // Extra bytes cover a multi-byte character split at the boundary
        self.words.iter().map(|w| w.len()).max().unwrap_or(0) + 3
    }
}

/// Whether every word appears in `text`
pub fn contains_all_words<S: AsRef<str>>(text: &str, words: &[S], match_case: bool) -> bool {
    WordMatcher::all(words, match_case).matches_text(text)
}

/// Whether any word appears in `text`
pub fn contains_any_word<S: AsRef<str>>(text: &str, words: &[S], match_case: bool) -> bool {
    WordMatcher::any(words, match_case).matches_text(text)
}

/// Whether every word appears in the file at `path`
pub fn file_contains_all_words<S: AsRef<str>>(
    path: &Path,
    words: &[S],
    match_case: bool,
    cancel: &CancellationToken,
) -> io::Result<bool> {
    WordMatcher::all(words, match_case).matches_file(path, cancel)
}

/// Whether any word appears in the file at `path`
pub fn file_contains_any_word<S: AsRef<str>>(
    path: &Path,
    words: &[S],
    match_case: bool,
    cancel: &CancellationToken,
) -> io::Result<bool> {
    WordMatcher::any(words, match_case).matches_file(path, cancel)
}

pub fn is_noise_file(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|name| NOISE_FILE_NAMES.contains(&name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write(dir: &TempDir, name: &str, content: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_text_all_words() {
        let words = ["hello", "world"];
        assert!(contains_all_words("Hello World Test", &words, false));
        assert!(!contains_all_words("Hello World Test", &words, true));
        assert!(!contains_all_words("Hello Test", &words, false));
    }

    #[test]
    fn test_text_any_word() {
        let words = ["secret", "token"];
        assert!(contains_any_word("my TOKEN here", &words, false));
        assert!(!contains_any_word("my TOKEN here", &words, true));
        assert!(!contains_any_word("nothing", &words, false));
    }

    #[test]
    fn test_empty_words_are_ignored() {
        let words = ["", "abc"];
        assert!(contains_all_words("xabcx", &words, true));
        assert!(!contains_any_word("anything", &[""], true));
    }

    #[test]
    fn test_file_case_sensitivity() {
        let temp = TempDir::new().unwrap();
        let path = write(&temp, "a.txt", "Hello World Test");
        let cancel = CancellationToken::new();
        let words = ["hello", "world"];

        assert!(file_contains_all_words(&path, &words, false, &cancel).unwrap());
        assert!(!file_contains_all_words(&path, &words, true, &cancel).unwrap());
    }

    #[test]
    fn test_file_missing_word_never_matches_all() {
        let temp = TempDir::new().unwrap();
        let path = write(&temp, "a.txt", "Hello Test");
        let cancel = CancellationToken::new();

        assert!(!file_contains_all_words(&path, &["hello", "world"], false, &cancel).unwrap());
    }

    #[test]
    fn test_zero_length_and_noise_files_never_match() {
        let temp = TempDir::new().unwrap();
        let empty = write(&temp, "empty.txt", "");
        let noise = write(&temp, ".DS_Store", "hello world");
        let cancel = CancellationToken::new();
        let words = ["hello"];

        assert!(!file_contains_all_words(&empty, &words, false, &cancel).unwrap());
        assert!(!file_contains_any_word(&empty, &words, false, &cancel).unwrap());
        assert!(!file_contains_any_word(&noise, &words, false, &cancel).unwrap());
    }

    #[test]
    fn test_all_words_across_chunks() {
        let temp = TempDir::new().unwrap();
        let content = format!("alpha{}omega", " ".repeat(64));
        let path = write(&temp, "big.txt", &content);
        let cancel = CancellationToken::new();

        let matcher = WordMatcher::all(&["alpha", "omega"], true).with_chunk_size(16);
        assert!(matcher.matches_file(&path, &cancel).unwrap());
    }

    #[test]
    fn test_word_straddling_chunk_boundary() {
        let temp = TempDir::new().unwrap();
        // "needle" spans bytes 6..12, chunk boundary at 8
        let path = write(&temp, "edge.txt", "xxxxxxneedlexxxxxxxx");
        let cancel = CancellationToken::new();

        let matcher = WordMatcher::any(&["needle"], true).with_chunk_size(8);
        assert!(matcher.matches_file(&path, &cancel).unwrap());
    }

    #[test]
    fn test_cancelled_search_does_not_match() {
        let temp = TempDir::new().unwrap();
        let path = write(&temp, "a.txt", "hello");
        let cancel = CancellationToken::new();
        cancel.cancel();

        assert!(!file_contains_any_word(&path, &["hello"], false, &cancel).unwrap());
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let temp = TempDir::new().unwrap();
        let cancel = CancellationToken::new();
        let result = file_contains_any_word(&temp.path().join("gone"), &["x"], false, &cancel);
        assert!(result.is_err());
    }
}
