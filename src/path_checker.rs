//! Path helpers for tfm
//!
//! Lexical normalization, destination resolution for copy/move, and the
//! guard that keeps bulk removal away from the root and the working directory.

use crate::error::FmError;
use path_clean::PathClean;
use std::path::{Path, PathBuf};

/// パスユーティリティ
pub struct PathChecker;

impl PathChecker {
    /// 空のパス引数を拒否
    pub fn require_non_empty(path: &Path, what: &'static str) -> Result<(), FmError> {
        if path.as_os_str().is_empty() {
            return Err(FmError::InvalidPath(what));
        }
        Ok(())
    }

    /// コピー・移動先を解決
    ///
    /// `destination` が既存ディレクトリなら `destination/<basename(source)>`、
    /// それ以外は `destination` をそのまま返す。
    pub fn resolve_destination(source: &Path, destination: &Path) -> PathBuf {
        if destination.is_dir() {
            if let Some(name) = source.file_name() {
                return destination.join(name).clean();
            }
        }
        destination.to_path_buf()
    }

    /// 2つのパスが同じファイルを指しているか
    ///
    /// どちらかが存在しなければ `false`。unix では (dev, ino) で比較するため
    /// ハードリンクやシンボリックリンク経由でも検出できる。
    pub fn is_same_file(a: &Path, b: &Path) -> bool {
        #[cfg(unix)]
        {
            use std::os::unix::fs::MetadataExt;
            match (std::fs::metadata(a), std::fs::metadata(b)) {
                (Ok(ma), Ok(mb)) => ma.dev() == mb.dev() && ma.ino() == mb.ino(),
                _ => false,
            }
        }
        #[cfg(not(unix))]
        {
            match (a.canonicalize(), b.canonicalize()) {
                (Ok(ca), Ok(cb)) => ca == cb,
                _ => false,
            }
        }
    }

    /// 削除してはいけないパスかを検証
    ///
    /// # Arguments
    /// * `cwd` - カレントディレクトリ（ログファイルの置き場所）
    /// * `target` - 削除対象（相対または絶対）
    ///
    /// # Returns
    /// * `Ok(())` - 削除可能
    /// * `Err(FmError::Protected)` - ルート、または cwd を含むディレクトリ
    ///
    /// シンボリックリンク自体はリンク先ではなくリンクだけが消えるので、
    /// リンク先がルートや cwd でも拒否しない。
    pub fn verify_removable(cwd: &Path, target: &Path) -> Result<(), FmError> {
        // 1. 絶対パスに変換して字句的に正規化（.. を解決）
        let cleaned = Self::to_absolute(cwd, target).clean();

        // 2. 親ディレクトリまでのシンボリックリンクを解決（末尾のリンクは辿らない）
        let canonical_target = Self::canonicalize_no_follow(&cleaned);
        let canonical_cwd = Self::try_canonicalize(&cwd.clean());

        if Self::is_root(&canonical_target) || canonical_cwd.starts_with(&canonical_target) {
            return Err(FmError::Protected(target.to_path_buf()));
        }

        Ok(())
    }

    /// 相対パスを絶対パスに変換
    fn to_absolute(base: &Path, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            base.join(path)
        }
    }

    /// 末尾要素がシンボリックリンクなら親だけを canonicalize して名前を戻す
    fn canonicalize_no_follow(path: &Path) -> PathBuf {
        let is_symlink = std::fs::symlink_metadata(path)
            .map(|m| m.file_type().is_symlink())
            .unwrap_or(false);
        if is_symlink {
            if let (Some(parent), Some(name)) = (path.parent(), path.file_name()) {
                return Self::try_canonicalize(parent).join(name);
            }
        }
        Self::try_canonicalize(path)
    }

    /// 可能であれば canonicalize、失敗時は元のパスを返す
    fn try_canonicalize(path: &Path) -> PathBuf {
        path.canonicalize().unwrap_or_else(|_| path.to_path_buf())
    }

    fn is_root(path: &Path) -> bool {
        path.parent().is_none()
    }
}
