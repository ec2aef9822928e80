//! Error types for tfm
//!
//! Defines FmError, the failure type every file operation returns.

use std::fmt;
use std::path::PathBuf;

/// tfm のエラー型
#[derive(Debug)]
pub enum FmError {
    // 起動時エラー（致命的）
    /// ログファイルを開けない
    LogInit {
        path: PathBuf,
        source: std::io::Error,
    },

    // 入力検証エラー
    /// 空のパス引数
    InvalidPath(&'static str),
    /// 8進数として解釈できないパーミッション
    InvalidMode(String),

    // ファイル操作エラー
    /// 排他作成で既存ファイルに衝突
    AlreadyExists(PathBuf),
    /// 対象が存在しない
    NotFound(PathBuf),
    /// 削除が拒否されたパス
    Protected(PathBuf),
    /// コピー元とコピー先が同一ファイル
    SameFile(PathBuf),
    /// 一括削除で削除しきれなかったエントリがある
    BulkDelete { path: PathBuf, failed: usize },
    /// プラットフォームが未対応
    Unsupported(&'static str),
    /// シェル内から実行できないコマンド
    NestedCommand(&'static str),
    /// その他の I/O エラー
    Io {
        action: &'static str,
        path: PathBuf,
        source: std::io::Error,
    },
}

impl FmError {
    /// コンテキスト付きの I/O エラーを作成
    pub fn io(action: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            action,
            path: path.into(),
            source,
        }
    }

    /// 終了コードを取得
    pub fn exit_code(&self) -> u8 {
        1
    }

    /// 人間向けのエラーメッセージ
    pub fn user_message(&self) -> String {
        match self {
            Self::LogInit { path, source } => {
                format!("cannot open log file '{}': {}", path.display(), source)
            }
            Self::InvalidPath(what) => format!("invalid {} path: must not be empty", what),
            Self::InvalidMode(text) => {
                format!("invalid permission format '{}' (example: 755)", text)
            }
            Self::AlreadyExists(path) => format!("file already exists: {}", path.display()),
            Self::NotFound(path) => {
                format!("'{}': No such file or directory", path.display())
            }
            Self::Protected(path) => format!(
                "refusing to remove '{}': it is the filesystem root or contains the working directory",
                path.display()
            ),
            Self::BulkDelete { path, failed } => format!(
                "could not remove '{}' and its contents: {} entr{} left behind",
                path.display(),
                failed,
                if *failed == 1 { "y" } else { "ies" }
            ),
            Self::SameFile(path) => format!(
                "'{}' and its destination are the same file",
                path.display()
            ),
            Self::Unsupported(what) => format!("{} is not supported on this platform", what),
            Self::NestedCommand(name) => {
                format!("'{}' cannot be run from inside the shell", name)
            }
            Self::Io { action, path, source } if path.as_os_str().is_empty() => {
                format!("{}: {}", action, source)
            }
            Self::Io {
                action,
                path,
                source,
            } => format!("{} '{}': {}", action, path.display(), source),
        }
    }
}

impl fmt::Display for FmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.user_message())
    }
}

impl From<std::io::Error> for FmError {
    fn from(err: std::io::Error) -> Self {
        Self::io("I/O error", PathBuf::new(), err)
    }
}

impl std::error::Error for FmError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::LogInit { source, .. } | Self::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}
