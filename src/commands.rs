//! Command dispatch for tfm
//!
//! Runs one parsed command against a session and prints its result.

use std::path::{Path, PathBuf};

use crate::cli::Commands;
use crate::config::Config;
use crate::confirm::{AssumeNo, AssumeYes, Confirm};
use crate::error::FmError;
use crate::logger::OperationLogger;
use crate::ops::{self, Created};
use crate::remover::{RemoveOutcome, Remover};

const RULE: &str = "------------------------------------";

/// 1プロセス（または1シェルセッション）の全コマンドで共有する状態
pub struct Session<'a> {
    pub log: &'a mut OperationLogger,
    pub config: &'a Config,
    pub cwd: PathBuf,
}

impl<'a> Session<'a> {
    pub fn new(log: &'a mut OperationLogger, config: &'a Config) -> Result<Self, FmError> {
        let cwd = std::env::current_dir()
            .map_err(|e| FmError::io("cannot determine working directory", ".", e))?;
        Ok(Self { log, config, cwd })
    }

    /// `command` を実行（`confirm` が空でないディレクトリの確認に答える）
    pub fn execute(&mut self, command: &Commands, confirm: &mut dyn Confirm) -> Result<(), FmError> {
        match command {
            Commands::List { path, all } => {
                let listing =
                    ops::list_dir(self.log, Path::new(path), *all || self.config.show_hidden)?;
                for (name, e) in &listing.skipped {
                    eprintln!("tfm: warning: cannot stat '{}': {}", name, e);
                }
                println!("Contents of directory {}:", path);
                println!("Name\t\tSize\t\tType");
                println!("{}", RULE);
                for entry in &listing.entries {
                    println!(
                        "{:<15}\t{} bytes\t{}",
                        entry.name,
                        entry.size,
                        entry.kind.label()
                    );
                }
            }
            Commands::Create { path } => match ops::create(self.log, path)? {
                Created::File(p) => println!("File {} created.", p.display()),
                Created::Directory(p) => println!("Directory {} created.", p.display()),
                Created::DirectoryExists(p) => {
                    println!("Directory {} already exists.", p.display())
                }
            },
            Commands::Copy {
                source,
                destination,
            } => {
                let t = ops::copy_file(self.log, Path::new(source), Path::new(destination))?;
                println!(
                    "File copied: {} -> {}",
                    t.source.display(),
                    t.destination.display()
                );
            }
            Commands::Move {
                source,
                destination,
            } => {
                let t = ops::move_file(self.log, Path::new(source), Path::new(destination))?;
                println!(
                    "File moved: {} -> {}",
                    t.source.display(),
                    t.destination.display()
                );
            }
            Commands::Remove { path } => {
                let mut remover = Remover::new(confirm, self.cwd.clone())
                    .with_policy(self.config.remove_failure);
                match remover.remove(self.log, Path::new(path))? {
                    RemoveOutcome::RemovedEmptyDir => println!("Directory {} removed.", path),
                    RemoveOutcome::RemovedTree(report) => println!(
                        "Directory {} and contents removed ({} files, {} directories).",
                        path, report.files_removed, report.dirs_removed
                    ),
                    RemoveOutcome::RemovedFile => println!("File {} removed.", path),
                    RemoveOutcome::Canceled => println!("Remove operation cancelled."),
                }
            }
            Commands::View { path } => {
                let view = ops::view_file(self.log, Path::new(path))?;
                println!("* Contents of {} *", view.path.display());
                println!("{}", RULE);
                print!("{}", view.contents);
                if !view.contents.is_empty() && !view.contents.ends_with('\n') {
                    println!();
                }
                println!("{}", RULE);
            }
            Commands::Search {
                dir,
                name,
                recursive,
            } => {
                let result = ops::search_file(self.log, Path::new(dir), name, *recursive)?;
                if !result.found() {
                    println!("File {} not found in directory {}", name, dir);
                } else if *recursive {
                    for hit in &result.matches {
                        println!("Found: {}", hit.display());
                    }
                } else {
                    println!("File {} found in directory {}", name, dir);
                }
            }
            Commands::Chmod { path, mode } => {
                let change = ops::change_permissions(self.log, Path::new(path), mode)?;
                println!(
                    "Changed permissions of {} to {:03o}",
                    change.path.display(),
                    change.mode
                );
            }
            Commands::Shell | Commands::Init => {
                return Err(FmError::NestedCommand(command_name(command)));
            }
        }
        Ok(())
    }
}

/// `--yes` / `--no` から確認の回答元を選ぶ
pub fn confirmer_for<'c>(
    yes: bool,
    no: bool,
    interactive: &'c mut dyn Confirm,
) -> Box<dyn Confirm + 'c> {
    if yes {
        Box::new(AssumeYes)
    } else if no {
        Box::new(AssumeNo)
    } else {
        Box::new(interactive)
    }
}

fn command_name(command: &Commands) -> &'static str {
    match command {
        Commands::List { .. } => "list",
        Commands::Create { .. } => "create",
        Commands::Copy { .. } => "copy",
        Commands::Move { .. } => "move",
        Commands::Remove { .. } => "remove",
        Commands::View { .. } => "view",
        Commands::Search { .. } => "search",
        Commands::Chmod { .. } => "chmod",
        Commands::Shell => "shell",
        Commands::Init => "init",
    }
}
