//! tfm: terminal file manager
//!
//! Runs one file operation per invocation (or many through `tfm shell`),
//! recording each in the operation log.

use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;

use tfm::cli::{CliArgs, Commands};
use tfm::commands::{confirmer_for, Session};
use tfm::config::Config;
use tfm::confirm::StdinConfirm;
use tfm::error::FmError;
use tfm::init::run_init;
use tfm::logger::OperationLogger;
use tfm::shell::run_shell;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => match e.downcast_ref::<FmError>() {
            // already carries its own cause
            Some(fm) => {
                eprintln!("tfm: {}", fm);
                fm.exit_code().into()
            }
            None => {
                eprintln!("tfm: {:#}", e);
                ExitCode::FAILURE
            }
        },
    }
}

/// メインの実行ロジック
fn run() -> Result<()> {
    let args = CliArgs::parse_args();

    if args.command == Commands::Init {
        return run_init();
    }

    let config = Config::load();
    let log_path = args
        .log_file
        .as_ref()
        .map(PathBuf::from)
        .unwrap_or_else(|| config.log_file.clone());

    // The only fatal error: without a log there is no audit trail
    let mut log = OperationLogger::open(&log_path)?;
    let result = dispatch(&args, &mut log, &config);
    log.shutdown();
    result
}

fn dispatch(args: &CliArgs, log: &mut OperationLogger, config: &Config) -> Result<()> {
    let mut session = Session::new(log, config)?;

    if args.command == Commands::Shell {
        let summary = run_shell(&mut session, io::stdin().lock(), io::stdout());
        if summary.failed > 0 {
            eprintln!(
                "tfm: {} command(s) succeeded, {} failed",
                summary.succeeded, summary.failed
            );
        }
        return Ok(());
    }

    let mut interactive = StdinConfirm;
    let mut confirm = confirmer_for(args.yes, args.no, &mut interactive);
    session.execute(&args.command, &mut *confirm)?;
    Ok(())
}
