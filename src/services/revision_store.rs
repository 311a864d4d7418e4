use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};
use time::UtcOffset;

use crate::errors::WikiError;
use crate::types::RevisionId;
use crate::utils::ensure_safe_path;

/// Filesystem-backed store of page revisions.
///
/// Each page is a directory under `base_dir` mirroring its title; each
/// revision is a file named after its timestamp.
#[derive(Clone)]
pub struct RevisionStore {
    base_dir: PathBuf,
    offset: UtcOffset,
}

impl RevisionStore {
    /// Create a new revision store
    pub fn new(base_dir: PathBuf, offset: UtcOffset) -> Self {
        debug!("Creating RevisionStore with base directory: {:?}", base_dir);
        Self { base_dir, offset }
    }

    /// Directory holding the revisions of `title`
    pub fn page_dir(&self, title: &str) -> Result<PathBuf, WikiError> {
        ensure_safe_path(title)?;
        Ok(self.base_dir.join(title))
    }

    /// All revisions of a page, newest first. Missing pages have none.
    pub fn list_revisions(&self, title: &str) -> Result<Vec<RevisionId>, WikiError> {
        let dir = self.page_dir(title)?;
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) if matches!(e.kind(), io::ErrorKind::NotFound | io::ErrorKind::NotADirectory) => {
                return Ok(Vec::new());
            }
            Err(e) => return Err(WikiError::Io(e)),
        };

        let mut revisions = Vec::new();
        for entry in entries {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("Failed to read directory entry in {:?}: {}", dir, e);
                    continue;
                }
            };
            let is_file = entry.file_type().map(|ft| ft.is_file()).unwrap_or(false);
            let name = entry.file_name().to_string_lossy().to_string();
            match RevisionId::from_file_name(&name) {
                Some(id) if is_file => revisions.push(id),
                _ => debug!("Skipping non-revision entry {:?} in {:?}", name, dir),
            }
        }

        revisions.sort_unstable_by(|a, b| b.cmp(a));
        Ok(revisions)
    }

    pub fn latest(&self, title: &str) -> Result<Option<RevisionId>, WikiError> {
        Ok(self.list_revisions(title)?.into_iter().next())
    }

    pub fn revision_count(&self, title: &str) -> Result<usize, WikiError> {
        Ok(self.list_revisions(title)?.len())
    }

    /// A page exists iff it has at least one revision
    pub fn exists(&self, title: &str) -> Result<bool, WikiError> {
        Ok(self.revision_count(title)? > 0)
    }

    /// Read the content of one revision
    pub fn read(&self, title: &str, id: &RevisionId) -> Result<String, WikiError> {
        let path = self.page_dir(title)?.join(id.file_name());
        debug!("Reading revision {} of '{}'", id, title);

        if !path.is_file() {
            warn!("Revision does not exist: {:?}", path);
            return Err(WikiError::NotFound);
        }

        let content = fs::read_to_string(&path)?;
        Ok(content)
    }

    /// Store `content` as a new revision stamped with the current second
    pub fn write(&self, title: &str, content: &str) -> Result<RevisionId, WikiError> {
        let id = RevisionId::now(self.offset);
        self.write_revision(title, &id, content)?;
        Ok(id)
    }

    /// Store `content` under an explicit revision id, overwriting any
    /// revision with the same timestamp
    pub fn write_revision(&self, title: &str, id: &RevisionId, content: &str) -> Result<(), WikiError> {
        let dir = self.page_dir(title)?;
        fs::create_dir_all(&dir).map_err(WikiError::Io)?;

        let path = dir.join(id.file_name());
        if path.exists() {
            warn!("Revision {} of '{}' already exists and will be overwritten", id, title);
        }
        fs::write(&path, content).map_err(WikiError::Io)?;
        info!("Wrote revision {} of '{}' ({} bytes)", id, title, content.len());
        Ok(())
    }

    /// Remove one revision. Removing the last one also removes the page
    /// directory and any ancestors it leaves empty.
    pub fn delete(&self, title: &str, id: &RevisionId) -> Result<(), WikiError> {
        let dir = self.page_dir(title)?;
        let path = dir.join(id.file_name());

        if !path.is_file() {
            warn!("Cannot delete missing revision: {:?}", path);
            return Err(WikiError::NotFound);
        }

        fs::remove_file(&path)?;
        info!("Deleted revision {} of '{}'", id, title);

        if self.list_revisions(title)?.is_empty() {
            self.prune_empty_dirs(&dir)?;
        }
        Ok(())
    }

    /// Remove `dir` and its ancestors while they are empty, stopping at the base directory
    fn prune_empty_dirs(&self, dir: &Path) -> Result<(), WikiError> {
        let mut current = Some(dir);
        while let Some(path) = current {
            if path == self.base_dir.as_path() || !path.starts_with(&self.base_dir) {
                break;
            }
            if fs::read_dir(path)?.next().is_some() {
                debug!("Keeping non-empty directory {:?}", path);
                break;
            }
            fs::remove_dir(path).map_err(WikiError::Io)?;
            info!("Removed empty page directory {:?}", path);
            current = path.parent();
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use rstest::{fixture, rstest};
    use tempfile::TempDir;
    use time::macros::{datetime, offset};
    use time::{Duration, OffsetDateTime, PrimitiveDateTime};

    use super::*;

    struct StoreCtx {
        tmp: TempDir,
        store: RevisionStore,
    }

    impl StoreCtx {
        fn root(&self) -> &Path {
            self.tmp.path()
        }
    }

    #[fixture]
    fn ctx() -> StoreCtx {
        let tmp = tempfile::tempdir().expect("tempdir");
        let store = RevisionStore::new(tmp.path().to_path_buf(), offset!(+9));
        StoreCtx { tmp, store }
    }

    fn rev(label: &str) -> RevisionId {
        label.parse().expect("revision label")
    }

    #[rstest]
    fn missing_page_has_no_revisions(ctx: StoreCtx) {
        assert!(ctx.store.list_revisions("nowhere").expect("list").is_empty());
        assert_eq!(ctx.store.latest("nowhere").expect("latest"), None);
        assert!(!ctx.store.exists("nowhere").expect("exists"));
    }

    #[rstest]
    fn revisions_are_listed_newest_first(ctx: StoreCtx) {
        for label in ["2024-01-02_00-00-00", "2023-12-31_10-00-00", "2024-01-01_12-30-00"] {
            ctx.store.write_revision("notes", &rev(label), label).expect("write");
        }

        let listed = ctx.store.list_revisions("notes").expect("list");
        assert_eq!(
            listed,
            vec![rev("2024-01-02_00-00-00"), rev("2024-01-01_12-30-00"), rev("2023-12-31_10-00-00")]
        );
        assert_eq!(ctx.store.latest("notes").expect("latest"), listed.iter().max().copied());
        assert_eq!(ctx.store.revision_count("notes").expect("count"), 3);
    }

    #[rstest]
    fn foreign_entries_are_ignored(ctx: StoreCtx) {
        ctx.store.write_revision("notes", &rev("2024-01-01_00-00-00"), "a").expect("write");
        let dir = ctx.root().join("notes");
        fs::write(dir.join("README.txt"), "x").expect("seed txt");
        fs::write(dir.join("draft.md"), "x").expect("seed md");
        fs::create_dir(dir.join("2024-02-02_00-00-00.md")).expect("seed dir");

        assert_eq!(ctx.store.list_revisions("notes").expect("list"), vec![rev("2024-01-01_00-00-00")]);
    }

    #[rstest]
    fn write_then_read_latest_round_trips(ctx: StoreCtx) {
        let id = ctx.store.write("foo/bar", "# Hello\n\nWorld").expect("write");
        assert!(ctx.root().join("foo/bar").join(id.file_name()).is_file());
        assert_eq!(ctx.store.latest("foo/bar").expect("latest"), Some(id));
        assert_eq!(ctx.store.read("foo/bar", &id).expect("read"), "# Hello\n\nWorld");
    }

    #[rstest]
    fn empty_content_is_stored_verbatim(ctx: StoreCtx) {
        let id = ctx.store.write("blank", "").expect("write");
        assert_eq!(ctx.store.read("blank", &id).expect("read"), "");
    }

    #[rstest]
    fn same_second_write_overwrites(ctx: StoreCtx) {
        let id = RevisionId::from_timestamp(datetime!(2024-05-05 05:05:05));
        ctx.store.write_revision("page", &id, "first").expect("first");
        ctx.store.write_revision("page", &id, "second").expect("second");
        assert_eq!(ctx.store.revision_count("page").expect("count"), 1);
        assert_eq!(ctx.store.read("page", &id).expect("read"), "second");
    }

    #[rstest]
    fn reading_missing_revision_is_not_found(ctx: StoreCtx) {
        let id = rev("2024-01-01_00-00-00");
        assert!(matches!(ctx.store.read("page", &id), Err(WikiError::NotFound)));
        ctx.store.write_revision("page", &rev("2024-01-02_00-00-00"), "x").expect("write");
        assert!(matches!(ctx.store.read("page", &id), Err(WikiError::NotFound)));
    }

    #[rstest]
    fn deleting_sole_revision_removes_page_dir(ctx: StoreCtx) {
        let id = rev("2024-01-01_00-00-00");
        ctx.store.write_revision("solo", &id, "only").expect("write");

        ctx.store.delete("solo", &id).expect("delete");

        assert!(!ctx.root().join("solo").exists());
        assert!(ctx.root().exists());
        assert_eq!(ctx.store.latest("solo").expect("latest"), None);
        assert!(matches!(ctx.store.read("solo", &id), Err(WikiError::NotFound)));
    }

    #[rstest]
    fn deleting_non_last_revision_keeps_the_rest(ctx: StoreCtx) {
        let old = rev("2024-01-01_00-00-00");
        let new = rev("2024-01-02_00-00-00");
        ctx.store.write_revision("page", &old, "old body").expect("old");
        ctx.store.write_revision("page", &new, "new body").expect("new");

        ctx.store.delete("page", &new).expect("delete");

        assert_eq!(ctx.store.latest("page").expect("latest"), Some(old));
        assert_eq!(ctx.store.read("page", &old).expect("read"), "old body");
        assert!(ctx.root().join("page").is_dir());
    }

    #[rstest]
    fn empty_ancestors_are_pruned_but_child_pages_survive(ctx: StoreCtx) {
        let id = rev("2024-01-01_00-00-00");
        ctx.store.write_revision("a/b/c", &id, "deep").expect("deep");
        ctx.store.delete("a/b/c", &id).expect("delete deep");
        assert!(!ctx.root().join("a").exists());

        ctx.store.write_revision("parent", &id, "parent").expect("parent");
        ctx.store.write_revision("parent/child", &id, "child").expect("child");
        ctx.store.delete("parent", &id).expect("delete parent");
        assert!(ctx.root().join("parent/child").is_dir());
        assert!(!ctx.store.exists("parent").expect("exists"));
        assert!(ctx.store.exists("parent/child").expect("exists"));
    }

    #[rstest]
    fn deleting_missing_revision_is_not_found(ctx: StoreCtx) {
        let id = rev("2024-01-01_00-00-00");
        assert!(matches!(ctx.store.delete("ghost", &id), Err(WikiError::NotFound)));
    }

    #[rstest]
    fn escaping_titles_are_rejected(ctx: StoreCtx) {
        assert!(matches!(ctx.store.list_revisions("../outside"), Err(WikiError::InvalidPath)));
        assert!(matches!(ctx.store.write("../outside", "x"), Err(WikiError::InvalidPath)));
    }

    fn local_now(offset: UtcOffset) -> PrimitiveDateTime {
        let now = OffsetDateTime::now_utc().to_offset(offset);
        PrimitiveDateTime::new(now.date(), now.time())
    }

    #[rstest]
    #[case(offset!(-5))]
    #[case(UtcOffset::UTC)]
    fn write_stamps_local_wall_clock(#[case] offset: UtcOffset) {
        let tmp = tempfile::tempdir().expect("tempdir");
        let store = RevisionStore::new(tmp.path().to_path_buf(), offset);

        let id = store.write("clock", "tick").expect("write");

        let drift = local_now(offset) - id.timestamp();
        assert!(drift.abs() <= Duration::seconds(2), "drift {drift}");
    }

    #[rstest]
    fn stores_with_different_offsets_stamp_apart() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let utc = RevisionStore::new(tmp.path().join("utc"), UtcOffset::UTC);
        let west = RevisionStore::new(tmp.path().join("west"), offset!(-5));

        let utc_id = utc.write("clock", "tick").expect("utc write");
        let west_id = west.write("clock", "tick").expect("west write");

        let gap = west_id.timestamp() - utc_id.timestamp();
        assert!((gap + Duration::hours(5)).abs() <= Duration::seconds(2), "gap {gap}");
    }
}
