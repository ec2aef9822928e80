//! Interactive shell
//!
//! Reads one command line at a time, splits it with shell quoting rules and
//! runs it through the same parser and dispatcher as the command line. The
//! operation log stays open for the whole session.

use std::io::{BufRead, Write};

use clap::Parser;

use crate::cli::CliArgs;
use crate::commands::{confirmer_for, Session};
use crate::confirm::PromptConfirm;
use crate::init::config_path_display;

const PROMPT: &str = "tfm> ";

const HELP: &str = "\
Commands:
  list DIR [-a]             List directory contents
  create PATH               Create a file (a directory if PATH ends with '/')
  copy SOURCE DESTINATION   Copy a file
  move SOURCE DESTINATION   Move or rename a file
  remove PATH [--yes|--no]  Remove a file or directory
  view FILE                 Print file contents
  search DIR NAME [-r]      Search for an entry by name
  chmod PATH MODE           Change permissions (octal, e.g. 755)
  help                      Show this help
  exit                      Leave the shell";

/// 1シェルセッションの集計
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ShellSummary {
    pub succeeded: usize,
    pub failed: usize,
}

/// `exit`・`quit` か入力の終わりまでシェルを実行
///
/// `input` は削除の確認にも使うので、スクリプトからコマンドと
/// 回答をまとめてパイプで渡せる。
pub fn run_shell<R: BufRead, W: Write>(
    session: &mut Session<'_>,
    mut input: R,
    mut output: W,
) -> ShellSummary {
    let mut summary = ShellSummary::default();
    let mut line = String::new();

    loop {
        let _ = write!(output, "{}", PROMPT);
        let _ = output.flush();

        line.clear();
        match input.read_line(&mut line) {
            Ok(0) => {
                let _ = writeln!(output);
                break;
            }
            Ok(_) => {}
            Err(e) => {
                eprintln!("tfm: cannot read input: {}", e);
                break;
            }
        }

        let trimmed = line.trim();
        match trimmed {
            "" => continue,
            "exit" | "quit" => {
                let _ = writeln!(output, "Exiting program...");
                break;
            }
            "help" => {
                let _ = writeln!(output, "{}", HELP);
                let _ = writeln!(output, "Config: {}", config_path_display());
                continue;
            }
            _ => {}
        }

        let Some(words) = shlex::split(trimmed) else {
            eprintln!("tfm: unbalanced quotes in: {}", trimmed);
            summary.failed += 1;
            continue;
        };

        let args = match CliArgs::try_parse_from(std::iter::once("tfm".to_string()).chain(words))
        {
            Ok(args) => args,
            Err(e) => {
                let _ = e.print();
                if e.use_stderr() {
                    summary.failed += 1;
                }
                continue;
            }
        };

        if args.log_file.is_some() {
            eprintln!("tfm: warning: --log-file is ignored inside the shell");
        }

        let mut prompt = PromptConfirm::new(&mut input, &mut output);
        let mut confirm = confirmer_for(args.yes, args.no, &mut prompt);
        match session.execute(&args.command, &mut *confirm) {
            Ok(()) => summary.succeeded += 1,
            Err(e) => {
                eprintln!("tfm: {}", e);
                summary.failed += 1;
            }
        }
    }

    summary
}
