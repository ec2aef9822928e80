//! Operation log for tfm
//!
//! Every file operation records a STARTED line and exactly one terminal line
//! (COMPLETED, ERROR or CANCELED) in an append-only text file:
//!
//! ```text
//! [Sat Oct 17 14:03:09 2026] Operation: REMOVE, Path: /tmp/empty_dir, Status: STARTED
//! [Sat Oct 17 14:03:09 2026] Operation: REMOVE, Path: /tmp/empty_dir, Status: COMPLETED
//! ```

use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

use chrono::Local;

use crate::error::FmError;

/// デフォルトのログファイル名（作業ディレクトリからの相対パス）
pub const DEFAULT_LOG_FILE: &str = "file_manager.log";

/// ctime(3) 形式（末尾の改行なし）
const TIMESTAMP_FORMAT: &str = "%a %b %e %H:%M:%S %Y";

/// ログに書き出す操作タグ
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    ListDir,
    Create,
    CopyFile,
    MoveFile,
    ViewFile,
    SearchFile,
    Remove,
    ChangePerm,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ListDir => "LIST_DIR",
            Self::Create => "CREATE",
            Self::CopyFile => "COPY_FILE",
            Self::MoveFile => "MOVE_FILE",
            Self::ViewFile => "VIEW_FILE",
            Self::SearchFile => "SEARCH_FILE",
            Self::Remove => "REMOVE",
            Self::ChangePerm => "CHANGE_PERM",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 操作のライフサイクル上の状態
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Started,
    Completed,
    Error,
    Canceled,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Started => "STARTED",
            Self::Completed => "COMPLETED",
            Self::Error => "ERROR",
            Self::Canceled => "CANCELED",
        }
    }

    /// 操作を終わらせる状態（COMPLETED・ERROR・CANCELED）か
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Started)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// ログの1行
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub timestamp: String,
    pub operation: Operation,
    pub path: String,
    pub status: Status,
}

impl LogEntry {
    /// 現在のローカル時刻でエントリを作成
    pub fn now(operation: Operation, path: &Path, status: Status) -> Self {
        Self {
            timestamp: Local::now().format(TIMESTAMP_FORMAT).to_string(),
            operation,
            path: path.display().to_string(),
            status,
        }
    }
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] Operation: {}, Path: {}, Status: {}",
            self.timestamp, self.operation, self.path, self.status
        )
    }
}

/// 成功した操作結果を終了状態に対応付ける
///
/// 既定は COMPLETED。削除を断られた場合は CANCELED を返す。
pub trait Outcome {
    fn terminal_status(&self) -> Status {
        Status::Completed
    }
}

impl Outcome for () {}

/// 追記専用の操作ロガー
///
/// コマンドディスパッチャが所有し、各操作には `&mut` で渡す。
/// 無効なロガーは記録を受け付けて捨てる。
pub struct OperationLogger {
    sink: Option<Box<dyn Write>>,
}

impl OperationLogger {
    /// ログファイルを追記モードで開く（なければ作成）
    pub fn open(path: &Path) -> Result<Self, FmError> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|source| FmError::LogInit {
                path: path.to_path_buf(),
                source,
            })?;
        Ok(Self {
            sink: Some(Box::new(file)),
        })
    }

    /// 初期化されていないロガー（記録はすべて捨てる）
    pub fn disabled() -> Self {
        Self { sink: None }
    }

    /// 任意の Writer に記録する
    pub fn from_writer(writer: impl Write + 'static) -> Self {
        Self {
            sink: Some(Box::new(writer)),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.sink.is_some()
    }

    /// 1エントリを追記して flush
    pub fn record(&mut self, operation: Operation, path: &Path, status: Status) {
        let Some(sink) = self.sink.as_mut() else {
            return;
        };

        let entry = LogEntry::now(operation, path, status);
        let written = writeln!(sink, "{}", entry).and_then(|()| sink.flush());
        if let Err(e) = written {
            eprintln!("tfm: warning: cannot write operation log: {}", e);
        }
    }

    /// STARTED と、ちょうど1つの終了レコードの間で `f` を実行
    pub fn track<T, F>(&mut self, operation: Operation, path: &Path, f: F) -> Result<T, FmError>
    where
        T: Outcome,
        F: FnOnce() -> Result<T, FmError>,
    {
        self.record(operation, path, Status::Started);
        let result = f();
        let status = match &result {
            Ok(outcome) => outcome.terminal_status(),
            Err(_) => Status::Error,
        };
        self.record(operation, path, status);
        result
    }

    /// 出力先を解放
    pub fn shutdown(mut self) {
        if let Some(mut sink) = self.sink.take() {
            let _ = sink.flush();
        }
    }
}
