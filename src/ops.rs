//! File operations for tfm
//!
//! Each operation is wrapped in [`OperationLogger::track`], so it logs
//! STARTED and exactly one terminal status whatever path it returns on.
//! Operations return data; printing is left to the caller.

use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

use crate::error::FmError;
use crate::logger::{Operation, OperationLogger, Outcome};
use crate::path_checker::PathChecker;

#[cfg(unix)]
use std::os::unix::fs::{DirBuilderExt, OpenOptionsExt, PermissionsExt};

/// `create` で作るディレクトリのモード
pub const DIR_MODE: u32 = 0o755;
/// `create` で作るファイルのモード
pub const FILE_MODE: u32 = 0o644;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Directory,
    Symlink,
}

impl EntryKind {
    pub fn label(&self) -> &'static str {
        match self {
            Self::File => "File",
            Self::Directory => "Directory",
            Self::Symlink => "Symlink",
        }
    }
}

/// ディレクトリ一覧の1行
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryInfo {
    pub name: String,
    pub size: u64,
    pub kind: EntryKind,
}

/// 名前順のディレクトリ一覧
#[derive(Debug, Default)]
pub struct Listing {
    pub entries: Vec<EntryInfo>,
    /// メタデータを読めなかったエントリ
    pub skipped: Vec<(String, io::Error)>,
}

impl Outcome for Listing {}

pub fn list_dir(
    log: &mut OperationLogger,
    path: &Path,
    show_hidden: bool,
) -> Result<Listing, FmError> {
    log.track(Operation::ListDir, path, || {
        let read = fs::read_dir(path).map_err(|e| FmError::io("cannot open directory", path, e))?;
        let mut listing = Listing::default();

        for entry in read {
            let entry = entry.map_err(|e| FmError::io("cannot read directory", path, e))?;
            let name = entry.file_name().to_string_lossy().into_owned();
            if !show_hidden && name.starts_with('.') {
                continue;
            }

            match entry_info(&entry.path(), name.clone()) {
                Ok(info) => listing.entries.push(info),
                Err(e) => listing.skipped.push((name, e)),
            }
        }

        listing.entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(listing)
    })
}

fn entry_info(path: &Path, name: String) -> io::Result<EntryInfo> {
    let link_meta = fs::symlink_metadata(path)?;
    if link_meta.file_type().is_symlink() {
        // size and kind of what the link points at, when reachable
        if let Ok(meta) = fs::metadata(path) {
            return Ok(EntryInfo {
                name,
                size: meta.len(),
                kind: if meta.is_dir() {
                    EntryKind::Directory
                } else {
                    EntryKind::File
                },
            });
        }
        return Ok(EntryInfo {
            name,
            size: link_meta.len(),
            kind: EntryKind::Symlink,
        });
    }

    Ok(EntryInfo {
        name,
        size: link_meta.len(),
        kind: if link_meta.is_dir() {
            EntryKind::Directory
        } else {
            EntryKind::File
        },
    })
}

#[derive(Debug, PartialEq, Eq)]
pub enum Created {
    File(PathBuf),
    Directory(PathBuf),
    /// ディレクトリは既に存在（エラーではない）
    DirectoryExists(PathBuf),
}

impl Outcome for Created {}

/// `path` が '/' で終わればディレクトリ、それ以外は空ファイルを新規作成
pub fn create(log: &mut OperationLogger, path: &str) -> Result<Created, FmError> {
    log.track(Operation::Create, Path::new(path), || {
        PathChecker::require_non_empty(Path::new(path), "target")?;

        if let Some(dir) = path.strip_suffix('/') {
            let dir = if dir.is_empty() { "/" } else { dir };
            return create_directory(Path::new(dir));
        }

        let file = Path::new(path);
        let mut options = OpenOptions::new();
        options.write(true).create_new(true);
        #[cfg(unix)]
        options.mode(FILE_MODE);

        match options.open(file) {
            Ok(_) => Ok(Created::File(file.to_path_buf())),
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                Err(FmError::AlreadyExists(file.to_path_buf()))
            }
            Err(e) => Err(FmError::io("cannot create file", file, e)),
        }
    })
}

fn create_directory(dir: &Path) -> Result<Created, FmError> {
    let mut builder = fs::DirBuilder::new();
    #[cfg(unix)]
    builder.mode(DIR_MODE);

    match builder.create(dir) {
        Ok(()) => Ok(Created::Directory(dir.to_path_buf())),
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists && dir.is_dir() => {
            Ok(Created::DirectoryExists(dir.to_path_buf()))
        }
        Err(e) => Err(FmError::io("cannot create directory", dir, e)),
    }
}

/// コピー・移動の結果
#[derive(Debug, PartialEq, Eq)]
pub struct Transfer {
    pub source: PathBuf,
    pub destination: PathBuf,
    pub bytes: u64,
}

impl Outcome for Transfer {}

/// `source` を `destination` に書き出す（作成または切り詰め）
///
/// 既存ディレクトリが指定されたら `<dir>/<basename(source)>` に書く。
/// コピー元と同じファイルになる場合は `FmError::SameFile` で拒否する。
pub fn copy_file(
    log: &mut OperationLogger,
    source: &Path,
    destination: &Path,
) -> Result<Transfer, FmError> {
    log.track(Operation::CopyFile, source, || {
        PathChecker::require_non_empty(source, "source")?;
        PathChecker::require_non_empty(destination, "destination")?;

        let target = PathChecker::resolve_destination(source, destination);
        let mut reader =
            File::open(source).map_err(|e| FmError::io("cannot open source file", source, e))?;
        // creating the writer would truncate the source
        if PathChecker::is_same_file(source, &target) {
            return Err(FmError::SameFile(source.to_path_buf()));
        }
        let mut writer = File::create(&target)
            .map_err(|e| FmError::io("cannot open destination file", &target, e))?;
        let bytes = io::copy(&mut reader, &mut writer)
            .map_err(|e| FmError::io("cannot copy to", &target, e))?;

        Ok(Transfer {
            source: source.to_path_buf(),
            destination: target,
            bytes,
        })
    })
}

/// `source` を `destination` にリネーム（ディレクトリならその中へ）
pub fn move_file(
    log: &mut OperationLogger,
    source: &Path,
    destination: &Path,
) -> Result<Transfer, FmError> {
    log.track(Operation::MoveFile, source, || {
        PathChecker::require_non_empty(source, "source")?;
        PathChecker::require_non_empty(destination, "destination")?;

        let target = PathChecker::resolve_destination(source, destination);
        let bytes = fs::symlink_metadata(source).map(|m| m.len()).unwrap_or(0);
        fs::rename(source, &target).map_err(|e| FmError::io("cannot move", source, e))?;

        Ok(Transfer {
            source: source.to_path_buf(),
            destination: target,
            bytes,
        })
    })
}

/// 表示用のファイル内容
#[derive(Debug)]
pub struct FileView {
    pub path: PathBuf,
    pub contents: String,
}

impl Outcome for FileView {}

pub fn view_file(log: &mut OperationLogger, path: &Path) -> Result<FileView, FmError> {
    log.track(Operation::ViewFile, path, || {
        PathChecker::require_non_empty(path, "file")?;
        let bytes = fs::read(path).map_err(|e| FmError::io("cannot open file", path, e))?;
        Ok(FileView {
            path: path.to_path_buf(),
            contents: String::from_utf8_lossy(&bytes).into_owned(),
        })
    })
}

/// 検索結果（空なら見つからなかっただけで、エラーではない）
#[derive(Debug, Default)]
pub struct SearchResult {
    pub matches: Vec<PathBuf>,
}

impl SearchResult {
    pub fn found(&self) -> bool {
        !self.matches.is_empty()
    }
}

impl Outcome for SearchResult {}

/// `dir` から名前が `name` と一致するエントリを探す
///
/// 非再帰では最初の一致で止まる。再帰ではシンボリックリンクを辿らずに
/// サブディレクトリを走査し、一致をすべて集める。
pub fn search_file(
    log: &mut OperationLogger,
    dir: &Path,
    name: &str,
    recursive: bool,
) -> Result<SearchResult, FmError> {
    log.track(Operation::SearchFile, dir, || {
        let mut result = SearchResult::default();
        search_in(dir, name, recursive, true, &mut result)?;
        result.matches.sort();
        Ok(result)
    })
}

fn search_in(
    dir: &Path,
    name: &str,
    recursive: bool,
    top: bool,
    result: &mut SearchResult,
) -> Result<(), FmError> {
    let read = match fs::read_dir(dir) {
        Ok(read) => read,
        Err(e) if top => return Err(FmError::io("cannot open directory", dir, e)),
        Err(e) => {
            eprintln!("tfm: warning: skipping '{}': {}", dir.display(), e);
            return Ok(());
        }
    };

    let mut subdirs = Vec::new();
    for entry in read.flatten() {
        if entry.file_name() == name {
            result.matches.push(entry.path());
            if !recursive {
                return Ok(());
            }
        }
        if recursive && entry.file_type().map(|t| t.is_dir()).unwrap_or(false) {
            subdirs.push(entry.path());
        }
    }

    for sub in subdirs {
        search_in(&sub, name, recursive, false, result)?;
    }
    Ok(())
}

/// "755" のような8進数のパーミッション文字列を解釈
///
/// 8進数字のみ受け付け、値は 0777 以下。
pub fn parse_mode(text: &str) -> Result<u32, FmError> {
    let invalid = || FmError::InvalidMode(text.to_string());
    if text.is_empty() || !text.bytes().all(|b| (b'0'..=b'7').contains(&b)) {
        return Err(invalid());
    }
    let mode = u32::from_str_radix(text, 8).map_err(|_| invalid())?;
    if mode > 0o777 {
        return Err(invalid());
    }
    Ok(mode)
}

#[derive(Debug, PartialEq, Eq)]
pub struct PermissionChange {
    pub path: PathBuf,
    pub mode: u32,
}

impl Outcome for PermissionChange {}

pub fn change_permissions(
    log: &mut OperationLogger,
    path: &Path,
    mode_text: &str,
) -> Result<PermissionChange, FmError> {
    log.track(Operation::ChangePerm, path, || {
        let mode = parse_mode(mode_text)?;
        PathChecker::require_non_empty(path, "target")?;
        if fs::symlink_metadata(path).is_err() {
            return Err(FmError::NotFound(path.to_path_buf()));
        }
        set_mode(path, mode)?;
        Ok(PermissionChange {
            path: path.to_path_buf(),
            mode,
        })
    })
}

#[cfg(unix)]
fn set_mode(path: &Path, mode: u32) -> Result<(), FmError> {
    fs::set_permissions(path, fs::Permissions::from_mode(mode))
        .map_err(|e| FmError::io("cannot change permissions of", path, e))
}

#[cfg(not(unix))]
fn set_mode(_path: &Path, _mode: u32) -> Result<(), FmError> {
    Err(FmError::Unsupported("changing octal permissions"))
}
