use std::path::PathBuf;

use clap::Parser;
use delve_core::{ItemTypeMask, ScanParameters};

/// DELVE - Deep search a directory tree by name and content, then remove matches
#[derive(Parser, Debug)]
#[command(name = "delve")]
#[command(about = "Deep search a directory tree by name and content, then remove matches")]
#[command(version)]
pub struct Args {
    /// Directory to search (defaults to current directory)
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Only list entries whose name matches this glob (repeatable)
    #[arg(short, long = "name", value_name = "GLOB")]
    pub names: Vec<String>,

    /// Word that must appear in file content (repeatable, all must match)
    #[arg(short, long = "word", value_name = "WORD")]
    pub words: Vec<String>,

    /// Exclude files whose content contains this word (repeatable)
    #[arg(long = "exclude-word", value_name = "WORD")]
    pub exclude_words: Vec<String>,

    /// Exclude files whose name contains this text (repeatable)
    #[arg(long = "exclude-file", value_name = "TEXT")]
    pub exclude_files: Vec<String>,

    /// Exclude folders (and their contents) whose path contains this text (repeatable)
    #[arg(long = "exclude-folder", value_name = "TEXT")]
    pub exclude_folders: Vec<String>,

    /// Case-sensitive matching for words, names and patterns
    #[arg(short = 'c', long)]
    pub match_case: bool,

    /// Do not report files
    #[arg(long)]
    pub no_files: bool,

    /// Do not report folders
    #[arg(long)]
    pub no_folders: bool,

    /// Do not report symlinks
    #[arg(long)]
    pub no_symlinks: bool,

    /// Search hidden entries too
    #[arg(short = 'H', long)]
    pub include_hidden: bool,

    /// Maximum directory depth to search (root is 0)
    #[arg(short, long)]
    pub max_depth: Option<usize>,

    /// Depth used by limited removal (D); negative means unlimited
    #[arg(long, default_value_t = 1, allow_negative_numbers = true)]
    pub remove_depth: i64,

    /// Print matches and exit instead of starting the interactive UI
    #[arg(short, long)]
    pub list: bool,

    /// With --list, print one JSON object per match
    #[arg(long, requires = "list")]
    pub json: bool,
}

impl Args {
    pub fn scan_parameters(&self, root: PathBuf) -> ScanParameters {
        ScanParameters {
            root_path: root,
            name_filters: self.names.clone(),
            item_types: ItemTypeMask {
                hidden: self.include_hidden,
                ..ItemTypeMask::default()
            },
            match_case: self.match_case,
            include_files: !self.no_files,
            include_folders: !self.no_folders,
            include_symlinks: !self.no_symlinks,
            exclude_hidden: !self.include_hidden,
            search_words: self.words.clone(),
            exclusion_words: self.exclude_words.clone(),
            exclude_file_name_patterns: self.exclude_files.clone(),
            exclude_folder_name_patterns: self.exclude_folders.clone(),
            max_depth: self.max_depth,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = Args::try_parse_from(["delve"]).unwrap();
        let params = args.scan_parameters(PathBuf::from("/tmp"));

        assert_eq!(args.path, PathBuf::from("."));
        assert!(params.include_files && params.include_folders && params.include_symlinks);
        assert!(params.exclude_hidden);
        assert!(!params.match_case);
        assert_eq!(args.remove_depth, 1);
        assert!(params.max_depth.is_none());
    }

    #[test]
    fn test_filters_map_to_parameters() {
        let args = Args::try_parse_from([
            "delve",
            "/srv",
            "-n",
            "*.log",
            "-w",
            "hello",
            "-w",
            "world",
            "--exclude-word",
            "draft",
            "--exclude-folder",
            "node_modules",
            "--no-folders",
            "-H",
            "--max-depth",
            "3",
            "--remove-depth",
            "-1",
        ])
        .unwrap();
        let params = args.scan_parameters(args.path.clone());

        assert_eq!(params.root_path, PathBuf::from("/srv"));
        assert_eq!(params.name_filters, vec!["*.log"]);
        assert_eq!(params.search_words, vec!["hello", "world"]);
        assert_eq!(params.exclusion_words, vec!["draft"]);
        assert_eq!(params.exclude_folder_name_patterns, vec!["node_modules"]);
        assert!(!params.include_folders);
        assert!(!params.exclude_hidden);
        assert!(params.item_types.hidden);
        assert_eq!(params.max_depth, Some(3));
        assert_eq!(args.remove_depth, -1);
    }

    #[test]
    fn test_json_requires_list() {
        assert!(Args::try_parse_from(["delve", "--json"]).is_err());
        assert!(Args::try_parse_from(["delve", "--list", "--json"]).is_ok());
    }
}
