use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use reedline::Signal;
use rill_common::error::{report_errors, ErrorKind, ErrorS};
use rill_interpreter::Interpreter;
use termcolor::{ColorChoice, StandardStream};

use crate::repl::{self, Prompt};
use crate::system::Stdio;

#[derive(Debug, Parser)]
#[command(about, author, disable_help_subcommand = true, propagate_version = true, version)]
pub enum Cmd {
    /// Start an interactive session.
    Repl,
    /// Run a script.
    Run { path: PathBuf },
}

impl Cmd {
    pub fn run(&self) -> Result<ExitCode> {
        match self {
            Cmd::Repl => repl(),
            Cmd::Run { path } => run(path),
        }
    }
}

fn repl() -> Result<ExitCode> {
    let mut editor = repl::editor().context("could not start REPL")?;
    let mut interpreter = Interpreter::new(Stdio::default());

    loop {
        match editor.read_line(&Prompt).context("could not read line")? {
            Signal::Success(line) => {
                if let Err(errors) = interpreter.run_source(&line) {
                    report("<stdin>", &line, &errors)?;
                }
            }
            Signal::CtrlC => eprintln!("CTRL-C"),
            Signal::CtrlD => {
                eprintln!("CTRL-D");
                return Ok(ExitCode::SUCCESS);
            }
        }
    }
}

fn run(path: &Path) -> Result<ExitCode> {
    let source = fs::read_to_string(path)
        .with_context(|| format!("could not read file: {}", path.display()))?;
    let mut interpreter = Interpreter::new(Stdio::default());
    match interpreter.run_source(&source) {
        Ok(()) => Ok(ExitCode::SUCCESS),
        Err(errors) => {
            report(&path.display().to_string(), &source, &errors)?;
            Ok(exit_code(&errors))
        }
    }
}

fn report(name: &str, source: &str, errors: &[ErrorS]) -> Result<()> {
    let stderr = StandardStream::stderr(ColorChoice::Auto);
    let result =
        report_errors(&mut stderr.lock(), name, source, errors).context("could not report errors");
    result
}

/// 65 for programs that failed to compile, 70 for runtime failures.
fn exit_code(errors: &[ErrorS]) -> ExitCode {
    match errors.first().map(|(e, _)| e.kind()) {
        Some(ErrorKind::Runtime) => ExitCode::from(70),
        Some(ErrorKind::Lexical | ErrorKind::Parse) => ExitCode::from(65),
        None => ExitCode::SUCCESS,
    }
}
