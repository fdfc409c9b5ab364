use std::collections::HashSet;
use std::path::PathBuf;

/// Opaque row identifier supplied by the presentation layer
pub type EntryId = u64;

/// One user-selected item to remove
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionEntry {
    pub id: EntryId,
    pub path: PathBuf,
}

impl SelectionEntry {
    pub fn new(id: EntryId, path: impl Into<PathBuf>) -> Self {
        Self {
            id,
            path: path.into(),
        }
    }
}

/// Drop entries whose ancestor is also selected, keeping the original order
pub fn dedup_nested(selection: Vec<SelectionEntry>) -> Vec<SelectionEntry> {
    let selected: HashSet<PathBuf> = selection.iter().map(|e| e.path.clone()).collect();
    let mut seen: HashSet<PathBuf> = HashSet::new();

    selection
        .into_iter()
        .filter(|entry| {
            let ancestor_selected = entry
                .path
                .ancestors()
                .skip(1)
                .any(|ancestor| selected.contains(ancestor));
            !ancestor_selected && seen.insert(entry.path.clone())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dedup_nested_drops_descendants() {
        let selection = vec![
            SelectionEntry::new(1, "/data/a/file.txt"),
            SelectionEntry::new(2, "/data/a"),
            SelectionEntry::new(3, "/data/b.txt"),
            SelectionEntry::new(4, "/data/ab/x"),
        ];

        let ids: Vec<EntryId> = dedup_nested(selection).iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![2, 3, 4]);
    }

    #[test]
    fn test_dedup_nested_drops_duplicates() {
        let selection = vec![
            SelectionEntry::new(1, "/data/a"),
            SelectionEntry::new(2, "/data/a"),
        ];

        let ids: Vec<EntryId> = dedup_nested(selection).iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![1]);
    }
}
