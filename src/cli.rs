//! CLI argument parser for tfm
//!
//! Provides type-safe argument parsing using clap derive. Path arguments are
//! plain strings so an empty value reaches the operation (and its log line)
//! instead of being rejected as a usage error.

use clap::{Parser, Subcommand};

/// tfm のコマンドライン引数
#[derive(Parser, Debug)]
#[command(
    name = "tfm",
    version,
    about = "Terminal file manager with an append-only operation log",
    long_about = "List, create, copy, move, remove, view, search and chmod files.\n\
                  Every operation is appended to an operation log (file_manager.log\n\
                  in the working directory by default) with a timestamp and its outcome.",
    arg_required_else_help = true
)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Commands,

    /// Append the operation log to FILE instead of the configured location
    #[arg(long, global = true, value_name = "FILE")]
    pub log_file: Option<String>,

    /// Answer "yes" when asked to remove a non-empty directory
    #[arg(short = 'y', long, global = true, conflicts_with = "no")]
    pub yes: bool,

    /// Answer "no" when asked to remove a non-empty directory
    #[arg(long, global = true)]
    pub no: bool,
}

/// サブコマンド
#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    /// List directory contents
    #[command(visible_alias = "slist")]
    List {
        #[arg(value_name = "DIR")]
        path: String,

        /// Include entries whose names start with '.'
        #[arg(short, long)]
        all: bool,
    },

    /// Create a file, or a directory when PATH ends with '/'
    #[command(visible_alias = "screate")]
    Create {
        #[arg(value_name = "PATH")]
        path: String,
    },

    /// Copy a file
    #[command(visible_alias = "scopy")]
    Copy {
        source: String,
        destination: String,
    },

    /// Move or rename a file
    #[command(visible_alias = "smove")]
    Move {
        source: String,
        destination: String,
    },

    /// Remove a file or directory (asks before removing a non-empty directory)
    #[command(visible_alias = "sremove")]
    Remove {
        #[arg(value_name = "PATH")]
        path: String,
    },

    /// Print the contents of a file
    #[command(visible_alias = "sview")]
    View {
        #[arg(value_name = "FILE")]
        path: String,
    },

    /// Search a directory for an entry with the given name
    #[command(visible_alias = "ssearch")]
    Search {
        #[arg(value_name = "DIR")]
        dir: String,

        name: String,

        /// Descend into subdirectories
        #[arg(short, long)]
        recursive: bool,
    },

    /// Change permissions using an octal mode such as 755
    #[command(visible_alias = "spermission")]
    Chmod {
        path: String,

        #[arg(value_name = "MODE")]
        mode: String,
    },

    /// Read commands interactively until `exit`
    Shell,

    /// Initialize configuration file (~/.config/tfm/config.toml)
    Init,
}

impl CliArgs {
    /// コマンドライン引数を解析
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
