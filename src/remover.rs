//! Removal of files and directory trees
//!
//! The remover tries `rmdir` first, asks before emptying a non-empty
//! directory, and falls back to `unlink` for everything else. It never
//! `stat`s the target up front.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::confirm::Confirm;
use crate::error::FmError;
use crate::logger::{Operation, OperationLogger, Outcome, Status};
use crate::path_checker::PathChecker;

/// 一括削除が最初の失敗の後にどうするか
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RemoveFailurePolicy {
    /// 残りの削除を続け、失敗をすべて集める
    #[default]
    Continue,
    /// 最初の失敗で止める
    Abort,
}

/// 一括削除の結果（トランザクションではなく、ロールバックしない）
#[derive(Debug, Default)]
pub struct BulkDeleteReport {
    pub files_removed: usize,
    pub dirs_removed: usize,
    pub failures: Vec<(PathBuf, io::Error)>,
}

impl BulkDeleteReport {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// 成功した削除の結果
#[derive(Debug)]
pub enum RemoveOutcome {
    RemovedEmptyDir,
    RemovedTree(BulkDeleteReport),
    RemovedFile,
    /// 操作者が拒否した（エントリはそのまま）
    Canceled,
}

impl Outcome for RemoveOutcome {
    fn terminal_status(&self) -> Status {
        match self {
            Self::Canceled => Status::Canceled,
            _ => Status::Completed,
        }
    }
}

struct Aborted;

/// `root` とその配下をボトムアップで削除
///
/// シンボリックリンクは辿らずにリンク自体を削除する。
pub fn bulk_delete(root: &Path, policy: RemoveFailurePolicy) -> BulkDeleteReport {
    let mut report = BulkDeleteReport::default();
    let _ = delete_tree(root, policy, &mut report);
    report
}

fn delete_tree(
    dir: &Path,
    policy: RemoveFailurePolicy,
    report: &mut BulkDeleteReport,
) -> Result<(), Aborted> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => return fail(dir, e, policy, report),
    };

    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                fail(dir, e, policy, report)?;
                continue;
            }
        };
        let path = entry.path();
        let is_dir = entry.file_type().map(|t| t.is_dir()).unwrap_or(false);

        if is_dir {
            delete_tree(&path, policy, report)?;
        } else {
            match fs::remove_file(&path) {
                Ok(()) => report.files_removed += 1,
                Err(e) => fail(&path, e, policy, report)?,
            }
        }
    }

    match fs::remove_dir(dir) {
        Ok(()) => {
            report.dirs_removed += 1;
            Ok(())
        }
        Err(e) => fail(dir, e, policy, report),
    }
}

fn fail(
    path: &Path,
    error: io::Error,
    policy: RemoveFailurePolicy,
    report: &mut BulkDeleteReport,
) -> Result<(), Aborted> {
    report.failures.push((path.to_path_buf(), error));
    match policy {
        RemoveFailurePolicy::Continue => Ok(()),
        RemoveFailurePolicy::Abort => Err(Aborted),
    }
}

/// ファイル・空ディレクトリ・（確認後に）ディレクトリツリーを削除
pub struct Remover<C: Confirm> {
    confirm: C,
    policy: RemoveFailurePolicy,
    cwd: PathBuf,
}

impl<C: Confirm> Remover<C> {
    /// `cwd` は削除を拒否する基準ディレクトリ
    pub fn new(confirm: C, cwd: impl Into<PathBuf>) -> Self {
        Self {
            confirm,
            policy: RemoveFailurePolicy::default(),
            cwd: cwd.into(),
        }
    }

    pub fn with_policy(mut self, policy: RemoveFailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn confirm(&self) -> &C {
        &self.confirm
    }

    /// `path` を削除し、REMOVE とその終了状態を記録
    pub fn remove(
        &mut self,
        log: &mut OperationLogger,
        path: &Path,
    ) -> Result<RemoveOutcome, FmError> {
        log.track(Operation::Remove, path, || self.remove_entry(path))
    }

    fn remove_entry(&mut self, path: &Path) -> Result<RemoveOutcome, FmError> {
        PathChecker::require_non_empty(path, "target")?;
        PathChecker::verify_removable(&self.cwd, path)?;

        match fs::remove_dir(path) {
            Ok(()) => return Ok(RemoveOutcome::RemovedEmptyDir),
            Err(e) if e.kind() == io::ErrorKind::DirectoryNotEmpty => {
                return self.remove_tree(path);
            }
            // not a directory, or missing: unlink decides
            Err(_) => {}
        }

        fs::remove_file(path)
            .map(|()| RemoveOutcome::RemovedFile)
            .map_err(|e| FmError::io("cannot remove", path, e))
    }

    fn remove_tree(&mut self, path: &Path) -> Result<RemoveOutcome, FmError> {
        let prompt = format!("Directory {} is not empty. Remove anyway?", path.display());
        if !self.confirm.confirm(&prompt) {
            return Ok(RemoveOutcome::Canceled);
        }

        let report = bulk_delete(path, self.policy);
        if report.is_complete() {
            return Ok(RemoveOutcome::RemovedTree(report));
        }

        for (failed, e) in &report.failures {
            eprintln!("tfm: cannot remove '{}': {}", failed.display(), e);
        }
        Err(FmError::BulkDelete {
            path: path.to_path_buf(),
            failed: report.failures.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::confirm::{AssumeNo, ScriptedConfirm};
    use crate::logger::tests::memory_logger;
    use tempfile::TempDir;

    fn scratch() -> (TempDir, PathBuf) {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().canonicalize().unwrap();
        (temp_dir, root)
    }

    fn remover(answers: &[&str], cwd: &Path) -> Remover<ScriptedConfirm> {
        Remover::new(ScriptedConfirm::new(answers.iter().copied()), cwd)
    }

    fn populate_tree(dir: &Path) {
        fs::create_dir_all(dir.join("sub").join("deep")).unwrap();
        fs::write(dir.join("top.txt"), "1").unwrap();
        fs::write(dir.join("sub").join("mid.txt"), "2").unwrap();
        fs::write(dir.join("sub").join("deep").join("leaf.txt"), "3").unwrap();
    }

    #[test]
    fn test_remove_empty_directory() {
        let (_tmp, root) = scratch();
        let dir = root.join("empty_dir");
        fs::create_dir(&dir).unwrap();
        let (mut log, buf) = memory_logger();

        let outcome = remover(&[], &root).remove(&mut log, &dir).unwrap();

        assert!(matches!(outcome, RemoveOutcome::RemovedEmptyDir));
        assert!(!dir.exists());
        let lines = buf.lines();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].ends_with(&format!(
            "Operation: REMOVE, Path: {}, Status: STARTED",
            dir.display()
        )));
        assert!(lines[1].ends_with(&format!(
            "Operation: REMOVE, Path: {}, Status: COMPLETED",
            dir.display()
        )));
    }

    #[test]
    fn test_remove_plain_file() {
        let (_tmp, root) = scratch();
        let file = root.join("notes.txt");
        fs::write(&file, "x").unwrap();
        let (mut log, buf) = memory_logger();

        let mut remover = remover(&[], &root);
        let outcome = remover.remove(&mut log, &file).unwrap();

        assert!(matches!(outcome, RemoveOutcome::RemovedFile));
        assert!(!file.exists());
        assert!(remover.confirm().prompts.is_empty(), "files need no prompt");
        assert!(buf.lines()[1].ends_with("Status: COMPLETED"));
    }

    #[test]
    fn test_remove_full_dir_declined() {
        let (_tmp, root) = scratch();
        let dir = root.join("full_dir");
        fs::create_dir(&dir).unwrap();
        fs::write(dir.join("keep.txt"), "keep").unwrap();
        let (mut log, buf) = memory_logger();

        let mut remover = remover(&["no"], &root);
        let outcome = remover.remove(&mut log, &dir).unwrap();

        assert!(matches!(outcome, RemoveOutcome::Canceled));
        assert_eq!(fs::read_to_string(dir.join("keep.txt")).unwrap(), "keep");
        assert_eq!(
            remover.confirm().prompts,
            vec![format!(
                "Directory {} is not empty. Remove anyway?",
                dir.display()
            )]
        );
        let lines = buf.lines();
        assert_eq!(lines.len(), 2);
        assert!(lines[1].ends_with("Status: CANCELED"));
    }

    #[test]
    fn test_remove_full_dir_anything_but_yes_cancels() {
        let (_tmp, root) = scratch();
        let dir = root.join("full_dir");
        populate_tree(&dir);
        let (mut log, _buf) = memory_logger();

        for answer in ["YES", "y", "", "yes!"] {
            let outcome = remover(&[answer], &root).remove(&mut log, &dir).unwrap();
            assert!(matches!(outcome, RemoveOutcome::Canceled), "{answer:?}");
        }
        assert!(dir.join("sub").join("deep").join("leaf.txt").exists());
    }

    #[test]
    fn test_remove_full_dir_confirmed() {
        let (_tmp, root) = scratch();
        let dir = root.join("full_dir");
        populate_tree(&dir);
        let (mut log, buf) = memory_logger();

        let outcome = remover(&["yes"], &root).remove(&mut log, &dir).unwrap();

        match outcome {
            RemoveOutcome::RemovedTree(report) => {
                assert_eq!(report.files_removed, 3);
                assert_eq!(report.dirs_removed, 3);
                assert!(report.is_complete());
            }
            other => panic!("Expected RemovedTree, got {:?}", other),
        }
        assert!(!dir.exists());
        assert!(buf.lines()[1].ends_with("Status: COMPLETED"));
    }

    #[test]
    fn test_remove_missing_path_is_error() {
        let (_tmp, root) = scratch();
        let missing = root.join("ghost");
        let (mut log, buf) = memory_logger();

        let result = remover(&[], &root).remove(&mut log, &missing);

        assert!(matches!(result, Err(FmError::Io { .. })));
        let lines = buf.lines();
        assert_eq!(lines.len(), 2);
        assert!(lines[1].ends_with("Status: ERROR"));
        assert!(!lines.iter().any(|l| l.ends_with("Status: COMPLETED")));
    }

    #[test]
    fn test_remove_protected_cwd() {
        let (_tmp, root) = scratch();
        fs::write(root.join("file_manager.log"), "").unwrap();
        let (mut log, buf) = memory_logger();

        let result = Remover::new(AssumeNo, &root).remove(&mut log, &root);

        assert!(matches!(result, Err(FmError::Protected(_))));
        assert!(root.join("file_manager.log").exists());
        assert!(buf.lines()[1].ends_with("Status: ERROR"));
    }

    #[test]
    fn test_remove_empty_path_is_error() {
        let (_tmp, root) = scratch();
        let (mut log, _buf) = memory_logger();
        let result = remover(&[], &root).remove(&mut log, Path::new(""));
        assert!(matches!(result, Err(FmError::InvalidPath(_))));
    }

    #[test]
    #[cfg(unix)]
    fn test_remove_symlink_to_directory_keeps_target() {
        let (_tmp, root) = scratch();
        let target = root.join("target");
        populate_tree(&target);
        let link = root.join("link");
        std::os::unix::fs::symlink(&target, &link).unwrap();
        let (mut log, _buf) = memory_logger();

        let outcome = remover(&[], &root).remove(&mut log, &link).unwrap();

        assert!(matches!(outcome, RemoveOutcome::RemovedFile));
        assert!(fs::symlink_metadata(&link).is_err());
        assert!(target.join("top.txt").exists());
    }

    #[test]
    #[cfg(unix)]
    fn test_bulk_delete_does_not_follow_symlinks() {
        let (_tmp, root) = scratch();
        let outside = root.join("outside");
        fs::create_dir(&outside).unwrap();
        fs::write(outside.join("precious.txt"), "keep").unwrap();

        let tree = root.join("tree");
        populate_tree(&tree);
        std::os::unix::fs::symlink(&outside, tree.join("sub").join("escape")).unwrap();

        let report = bulk_delete(&tree, RemoveFailurePolicy::Continue);

        assert!(report.is_complete());
        assert!(!tree.exists());
        assert!(outside.join("precious.txt").exists());
    }

    #[test]
    #[cfg(unix)]
    fn test_remove_symlink_to_cwd_unlinks_only_the_link() {
        let (_tmp, root) = scratch();
        let link = root.join("here");
        std::os::unix::fs::symlink(&root, &link).unwrap();
        fs::write(root.join("file_manager.log"), "").unwrap();
        let (mut log, buf) = memory_logger();

        let outcome = Remover::new(AssumeNo, &root).remove(&mut log, &link).unwrap();

        assert!(matches!(outcome, RemoveOutcome::RemovedFile));
        assert!(fs::symlink_metadata(&link).is_err());
        assert!(root.join("file_manager.log").exists());
        assert!(buf.lines()[1].ends_with("Status: COMPLETED"));
    }

    /// tree/{a.txt, z.txt, locked/{one.txt, two.txt}} で locked を書き込み不可にする
    ///
    /// root 権限ではパーミッションが効かないので `None` を返す。
    #[cfg(unix)]
    fn locked_tree(root: &Path) -> Option<(PathBuf, PathBuf)> {
        use std::os::unix::fs::PermissionsExt;

        let tree = root.join("tree");
        let locked = tree.join("locked");
        fs::create_dir_all(&locked).unwrap();
        fs::write(tree.join("a.txt"), "a").unwrap();
        fs::write(tree.join("z.txt"), "z").unwrap();
        fs::write(locked.join("one.txt"), "1").unwrap();
        fs::write(locked.join("two.txt"), "2").unwrap();
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o500)).unwrap();

        if fs::write(locked.join("writable"), "").is_ok() {
            unlock(&locked);
            return None;
        }
        Some((tree, locked))
    }

    #[cfg(unix)]
    fn unlock(dir: &Path) {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(dir, fs::Permissions::from_mode(0o755)).unwrap();
    }

    #[test]
    #[cfg(unix)]
    fn test_bulk_delete_continue_collects_every_failure() {
        let (_tmp, root) = scratch();
        let Some((tree, locked)) = locked_tree(&root) else {
            return;
        };

        let report = bulk_delete(&tree, RemoveFailurePolicy::Continue);
        unlock(&locked);

        // one.txt, two.txt, locked/ and tree/ itself
        assert_eq!(report.failures.len(), 4);
        assert_eq!(report.files_removed, 2);
        assert!(!tree.join("a.txt").exists());
        assert!(!tree.join("z.txt").exists());
        assert!(locked.join("one.txt").exists());
        assert!(locked.join("two.txt").exists());
    }

    #[test]
    #[cfg(unix)]
    fn test_bulk_delete_abort_stops_at_first_failure() {
        let (_tmp, root) = scratch();
        let Some((tree, locked)) = locked_tree(&root) else {
            return;
        };

        let report = bulk_delete(&tree, RemoveFailurePolicy::Abort);
        unlock(&locked);

        assert_eq!(report.failures.len(), 1);
        assert!(report.failures[0].0.starts_with(&locked));
        assert_eq!(report.dirs_removed, 0);
        assert!(tree.exists());
    }

    #[test]
    #[cfg(unix)]
    fn test_remove_tree_with_failures_is_error() {
        let (_tmp, root) = scratch();
        let Some((tree, locked)) = locked_tree(&root) else {
            return;
        };
        let (mut log, buf) = memory_logger();

        let result = remover(&["yes"], &root).remove(&mut log, &tree);
        unlock(&locked);

        match result {
            Err(FmError::BulkDelete { path, failed }) => {
                assert_eq!(path, tree);
                assert_eq!(failed, 4);
            }
            other => panic!("Expected BulkDelete, got {:?}", other),
        }
        assert!(!tree.join("a.txt").exists(), "siblings are still removed");
        let lines = buf.lines();
        assert_eq!(lines.len(), 2);
        assert!(lines[1].ends_with("Status: ERROR"));
    }

    #[test]
    #[cfg(unix)]
    fn test_remove_tree_abort_policy_is_error() {
        let (_tmp, root) = scratch();
        let Some((tree, locked)) = locked_tree(&root) else {
            return;
        };
        let (mut log, buf) = memory_logger();

        let result = remover(&["yes"], &root)
            .with_policy(RemoveFailurePolicy::Abort)
            .remove(&mut log, &tree);
        unlock(&locked);

        assert!(matches!(result, Err(FmError::BulkDelete { failed: 1, .. })));
        assert!(buf.lines()[1].ends_with("Status: ERROR"));
    }

    #[test]
    fn test_bulk_delete_missing_root_reports_failure() {
        let (_tmp, root) = scratch();
        let report = bulk_delete(&root.join("ghost"), RemoveFailurePolicy::Abort);
        assert!(!report.is_complete());
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.files_removed + report.dirs_removed, 0);
    }

    #[test]
    fn test_policy_deserializes_lowercase() {
        #[derive(Deserialize)]
        struct Wrapper {
            policy: RemoveFailurePolicy,
        }
        let w: Wrapper = toml::from_str("policy = \"abort\"").unwrap();
        assert_eq!(w.policy, RemoveFailurePolicy::Abort);
        let w: Wrapper = toml::from_str("policy = \"continue\"").unwrap();
        assert_eq!(w.policy, RemoveFailurePolicy::Continue);
        assert!(toml::from_str::<Wrapper>("policy = \"maybe\"").is_err());
    }
}
