//! Pure snapshot differ: partitions a fresh listing against the previous one
//! into added, modified, and deleted sets.

use std::collections::HashMap;

use drivewatch_model::FileRecord;

/// Result of one [`detect_changes`] pass.
///
/// `added` and `modified` follow the order of the current snapshot; `deleted`
/// follows the order of the previous one. Callers must treat `modified` as
/// invalidating any existing scan record for that id and `deleted` as
/// clearing both the scan record and activity-lock membership.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChangeSet {
    pub added: Vec<FileRecord>,
    pub modified: Vec<FileRecord>,
    pub deleted: Vec<FileRecord>,
}

impl ChangeSet {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.modified.is_empty() && self.deleted.is_empty()
    }
}

/// Diff two point-in-time listings by id. O(n) with id-keyed lookups.
///
/// A location change counts as a modification: a manual move must trigger the
/// same re-evaluation path as a content edit, since scan validity is
/// location-sensitive.
pub fn detect_changes(previous: &[FileRecord], current: &[FileRecord]) -> ChangeSet {
    let prior: HashMap<&str, &FileRecord> =
        previous.iter().map(|f| (f.id.as_str(), f)).collect();
    let fresh: HashMap<&str, &FileRecord> =
        current.iter().map(|f| (f.id.as_str(), f)).collect();

    let mut changes = ChangeSet::default();

    for file in current {
        match prior.get(file.id.as_str()) {
            None => changes.added.push(file.clone()),
            Some(old) => {
                if old.modified_at != file.modified_at || old.location != file.location {
                    changes.modified.push(file.clone());
                }
            }
        }
    }

    for file in previous {
        if !fresh.contains_key(file.id.as_str()) {
            changes.deleted.push(file.clone());
        }
    }

    changes
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use drivewatch_model::FolderLocation;
    use std::collections::HashSet;

    fn record(id: &str, location: FolderLocation) -> FileRecord {
        FileRecord {
            id: id.into(),
            name: format!("{id}.bin"),
            mime_type: "application/octet-stream".into(),
            size_bytes: Some(42),
            modified_at: Utc::now(),
            view_link: None,
            download_link: None,
            content_digest: None,
            location,
        }
    }

    #[test]
    fn identical_snapshots_produce_no_changes() {
        let snapshot = vec![
            record("a", FolderLocation::Scan),
            record("b", FolderLocation::Quarantine),
        ];
        assert!(detect_changes(&snapshot, &snapshot).is_empty());
    }

    #[test]
    fn partitions_are_exhaustive_and_disjoint() {
        let previous = vec![
            record("stays", FolderLocation::Scan),
            record("edited", FolderLocation::Scan),
            record("gone", FolderLocation::Scan),
        ];
        let mut edited = previous[1].clone();
        edited.modified_at += Duration::seconds(5);
        let current = vec![
            previous[0].clone(),
            edited,
            record("fresh", FolderLocation::Scan),
        ];

        let changes = detect_changes(&previous, &current);

        let added: HashSet<_> = changes.added.iter().map(|f| f.id.as_str()).collect();
        let modified: HashSet<_> = changes.modified.iter().map(|f| f.id.as_str()).collect();
        let deleted: HashSet<_> = changes.deleted.iter().map(|f| f.id.as_str()).collect();

        assert_eq!(added, HashSet::from(["fresh"]));
        assert_eq!(modified, HashSet::from(["edited"]));
        assert_eq!(deleted, HashSet::from(["gone"]));
        assert!(added.is_disjoint(&modified));

        // added ∪ modified ∪ unchanged covers exactly the current ids
        let current_ids: HashSet<_> = current.iter().map(|f| f.id.as_str()).collect();
        assert!(added.union(&modified).all(|id| current_ids.contains(id)));
    }

    #[test]
    fn location_change_counts_as_modified() {
        let previous = vec![record("f", FolderLocation::Scan)];
        let mut moved = previous[0].clone();
        moved.location = FolderLocation::Quarantine;

        let changes = detect_changes(&previous, &[moved]);
        assert_eq!(changes.modified.len(), 1);
        assert!(changes.added.is_empty());
        assert!(changes.deleted.is_empty());
    }

    #[test]
    fn output_order_follows_input_order() {
        let current = vec![
            record("z", FolderLocation::Scan),
            record("a", FolderLocation::Scan),
            record("m", FolderLocation::Scan),
        ];
        let changes = detect_changes(&[], &current);
        let ids: Vec<_> = changes.added.iter().map(|f| f.id.as_str()).collect();
        assert_eq!(ids, vec!["z", "a", "m"]);
    }
}
