//! Configuration initialization for tfm
//!
//! Generates a default config file at ~/.config/tfm/config.toml

use crate::config::Config;
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

/// 設定ファイルのテンプレート（値はすべて組み込みのデフォルトと同じ）
const CONFIG_TEMPLATE: &str = r#"# tfm configuration
# Location: ~/.config/tfm/config.toml (override with TFM_CONFIG)

# Operation log, appended to on every command.
# Relative paths are resolved against the working directory.
log_file = "file_manager.log"

# Show entries starting with '.' in `tfm list`
show_hidden = false

# What a confirmed recursive removal does when an entry cannot be deleted:
#   "continue" - keep deleting the rest and report every failure
#   "abort"    - stop at the first failure
remove_failure = "continue"
"#;

/// `init` が新しいファイルを書いたか
#[derive(Debug, PartialEq, Eq)]
pub enum InitOutcome {
    Created,
    AlreadyExists,
}

/// init サブコマンドを実行
pub fn run_init() -> Result<()> {
    let config_path = Config::config_path().context("Cannot determine config directory")?;

    match run_init_at(&config_path)? {
        InitOutcome::Created => {
            println!("Created config file: {}", config_path.display());
            println!();
            println!("Edit the file to change the log location or removal behavior.");
        }
        InitOutcome::AlreadyExists => {
            eprintln!("Config file already exists: {}", config_path.display());
            eprintln!("To regenerate, delete the file first and run `tfm init` again.");
        }
    }
    Ok(())
}

/// ファイルがなければ `config_path` にテンプレートを書く
pub fn run_init_at(config_path: &Path) -> Result<InitOutcome> {
    if config_path.exists() {
        return Ok(InitOutcome::AlreadyExists);
    }

    if let Some(config_dir) = config_path.parent() {
        if !config_dir.as_os_str().is_empty() && !config_dir.exists() {
            fs::create_dir_all(config_dir)
                .with_context(|| format!("Cannot create directory {}", config_dir.display()))?;
        }
    }

    fs::write(config_path, CONFIG_TEMPLATE)
        .with_context(|| format!("Cannot write config file {}", config_path.display()))?;

    Ok(InitOutcome::Created)
}

/// 表示用の設定ファイルパスを取得
pub fn config_path_display() -> String {
    Config::config_path()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "~/.config/tfm/config.toml".to_string())
}
