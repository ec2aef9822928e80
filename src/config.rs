//! Configuration for tfm
//!
//! Loads user configuration from `~/.config/tfm/config.toml`.

use serde::Deserialize;
use std::path::PathBuf;

use crate::logger::DEFAULT_LOG_FILE;
use crate::remover::RemoveFailurePolicy;

/// 設定
///
/// config.toml の例:
/// ```toml
/// # Operation log, relative to the working directory unless absolute
/// log_file = "file_manager.log"
///
/// # Show dot-files in `tfm list`
/// show_hidden = false
///
/// # "continue" keeps deleting after a failure, "abort" stops at the first one
/// remove_failure = "continue"
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 操作ログの追記先
    pub log_file: PathBuf,

    /// 一覧に '.' で始まるエントリを含める
    pub show_hidden: bool,

    /// 一括削除で失敗した後の動作
    pub remove_failure: RemoveFailurePolicy,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_file: PathBuf::from(DEFAULT_LOG_FILE),
            show_hidden: false,
            remove_failure: RemoveFailurePolicy::Continue,
        }
    }
}

impl Config {
    /// 設定ファイルのパスを取得: ~/.config/tfm/config.toml
    ///
    /// 環境変数 TFM_CONFIG があればそのパスを使う。
    pub fn config_path() -> Option<PathBuf> {
        if let Ok(path) = std::env::var("TFM_CONFIG") {
            return Some(PathBuf::from(path));
        }
        dirs::home_dir().map(|d| d.join(".config").join("tfm").join("config.toml"))
    }

    /// デフォルトのパスから設定を読み込む
    pub fn load() -> Self {
        Self::load_from_path(Self::config_path())
    }

    /// 指定したパスから設定を読み込む
    ///
    /// ファイルがなければデフォルト値。読めない・壊れている場合は
    /// 警告を出してデフォルト値を返す。
    pub fn load_from_path(path: Option<PathBuf>) -> Self {
        let Some(path) = path else {
            return Self::default();
        };

        if !path.exists() {
            return Self::default();
        }

        match std::fs::read_to_string(&path) {
            Ok(content) => match toml::from_str::<Config>(&content) {
                Ok(config) => config,
                Err(e) => {
                    eprintln!(
                        "tfm: warning: config parse error ({}): {}",
                        path.display(),
                        e
                    );
                    Self::default()
                }
            },
            Err(e) => {
                eprintln!(
                    "tfm: warning: cannot read config ({}): {}",
                    path.display(),
                    e
                );
                Self::default()
            }
        }
    }
}
