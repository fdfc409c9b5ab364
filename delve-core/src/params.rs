use std::path::PathBuf;

use globset::{GlobBuilder, GlobSet, GlobSetBuilder};

use crate::error::{DelveError, Result};

/// Which kinds of entries a directory listing enumerates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ItemTypeMask {
    pub files: bool,
    pub directories: bool,
    pub symlinks: bool,
    /// List hidden entries too
    pub hidden: bool,
}

impl Default for ItemTypeMask {
    fn default() -> Self {
        Self {
            files: true,
            directories: true,
            symlinks: true,
            hidden: false,
        }
    }
}

/// Scan configuration, built once per run and read-only while the scan runs
#[derive(Debug, Clone)]
pub struct ScanParameters {
    /// Directory the breadth-first walk starts from
    pub root_path: PathBuf,
    /// Name globs (e.g. `*.log`); when non-empty only matching entries are listed
    pub name_filters: Vec<String>,
    /// Kinds of entries enumerated by each directory listing
    pub item_types: ItemTypeMask,
    /// Case sensitivity for words, exclusion substrings and name globs
    pub match_case: bool,
    /// Report matching files
    pub include_files: bool,
    /// Report matching folders
    pub include_folders: bool,
    /// Report matching symlinks
    pub include_symlinks: bool,
    /// Skip hidden entries and everything beneath hidden directories
    pub exclude_hidden: bool,
    /// All of these must appear in a file's content (empty = no content check)
    pub search_words: Vec<String>,
    /// Any of these appearing in a file's content excludes it
    pub exclusion_words: Vec<String>,
    /// Substrings that exclude a file by name
    pub exclude_file_name_patterns: Vec<String>,
    /// Substrings that exclude a folder (and its subtree) by root-relative path
    pub exclude_folder_name_patterns: Vec<String>,
    /// Deepest directory level listed, the root being level 0 (None = unlimited)
    pub max_depth: Option<usize>,
}

impl Default for ScanParameters {
    fn default() -> Self {
        Self {
            root_path: PathBuf::new(),
            name_filters: Vec::new(),
            item_types: ItemTypeMask::default(),
            match_case: false,
            include_files: true,
            include_folders: true,
            include_symlinks: true,
            exclude_hidden: true,
            search_words: Vec::new(),
            exclusion_words: Vec::new(),
            exclude_file_name_patterns: Vec::new(),
            exclude_folder_name_patterns: Vec::new(),
            max_depth: None,
        }
    }
}

impl ScanParameters {
    pub fn new(root_path: impl Into<PathBuf>) -> Self {
        Self {
            root_path: root_path.into(),
            ..Self::default()
        }
    }

    /// Reject configurations that cannot start a scan.
    ///
    /// Called before any worker is spawned, so these errors reach the caller
    /// synchronously instead of as a mid-run event.
    pub fn validate(&self) -> Result<()> {
        if self.root_path.as_os_str().is_empty() {
            return Err(DelveError::EmptyRoot);
        }
        if !self.root_path.exists() {
            return Err(DelveError::RootNotFound(self.root_path.clone()));
        }
        if !self.root_path.is_dir() {
            return Err(DelveError::NotADirectory(self.root_path.clone()));
        }
        if !(self.include_files || self.include_folders || self.include_symlinks) {
            return Err(DelveError::NoItemTypeSelected);
        }
        self.compile_name_filters()?;
        Ok(())
    }

    /// Compile `name_filters` into a glob set (None when no filters are set)
    pub fn compile_name_filters(&self) -> Result<Option<GlobSet>> {
        let patterns: Vec<&str> = self
            .name_filters
            .iter()
            .map(|p| p.trim())
            .filter(|p| !p.is_empty())
            .collect();
        if patterns.is_empty() {
            return Ok(None);
        }

        let mut builder = GlobSetBuilder::new();
        for pattern in patterns {
            let glob = GlobBuilder::new(pattern)
                .case_insensitive(!self.match_case)
                .literal_separator(true)
                .build()
                .map_err(|source| DelveError::InvalidNamePattern {
                    pattern: pattern.to_string(),
                    source,
                })?;
            builder.add(glob);
        }
        let set = builder
            .build()
            .map_err(|source| DelveError::InvalidNamePattern {
                pattern: self.name_filters.join(";"),
                source,
            })?;
        Ok(Some(set))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_validate_rejects_empty_root() {
        let params = ScanParameters::default();
        assert!(matches!(params.validate(), Err(DelveError::EmptyRoot)));
    }

    #[test]
    fn test_validate_rejects_missing_root() {
        let temp = TempDir::new().unwrap();
        let params = ScanParameters::new(temp.path().join("nope"));
        assert!(matches!(
            params.validate(),
            Err(DelveError::RootNotFound(_))
        ));
    }

    #[test]
    fn test_validate_rejects_file_root() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("a.txt");
        std::fs::write(&file, "x").unwrap();
        let params = ScanParameters::new(file);
        assert!(matches!(
            params.validate(),
            Err(DelveError::NotADirectory(_))
        ));
    }

    #[test]
    fn test_validate_rejects_no_item_type() {
        let temp = TempDir::new().unwrap();
        let params = ScanParameters {
            include_files: false,
            include_folders: false,
            include_symlinks: false,
            ..ScanParameters::new(temp.path())
        };
        assert!(matches!(
            params.validate(),
            Err(DelveError::NoItemTypeSelected)
        ));
    }

    #[test]
    fn test_validate_rejects_bad_glob() {
        let temp = TempDir::new().unwrap();
        let params = ScanParameters {
            name_filters: vec!["[unclosed".to_string()],
            ..ScanParameters::new(temp.path())
        };
        assert!(matches!(
            params.validate(),
            Err(DelveError::InvalidNamePattern { .. })
        ));
    }

    #[test]
    fn test_name_filters_respect_case() {
        let params = ScanParameters {
            name_filters: vec!["*.LOG".to_string(), "  ".to_string()],
            ..ScanParameters::default()
        };
        let set = params.compile_name_filters().unwrap().unwrap();
        assert!(set.is_match("server.log"));

        let strict = ScanParameters {
            match_case: true,
            ..params
        };
        let set = strict.compile_name_filters().unwrap().unwrap();
        assert!(!set.is_match("server.log"));
        assert!(set.is_match("SERVER.LOG"));
    }

    #[test]
    fn test_blank_name_filters_compile_to_none() {
        let params = ScanParameters {
            name_filters: vec![String::new()],
            ..ScanParameters::default()
        };
        assert!(params.compile_name_filters().unwrap().is_none());
    }
}
