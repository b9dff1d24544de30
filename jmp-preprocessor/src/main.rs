use anyhow::Context;
use clap::{CommandFactory, Parser};
use jmp_common::{ExitStatus, JmpError};
use jmp_preprocessor::{Engine, EngineOptions};
use log::error;
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "jmp", about = "Simple macro processor, a reduced TeX macro layer")]
#[command(disable_help_flag = true)]
struct Args {
    /// Input text file (defaults to stdin)
    #[arg(long, value_name = "FILE")]
    input: Option<PathBuf>,

    /// Output text file (defaults to stdout)
    #[arg(long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Text processed before the input
    #[arg(long, value_name = "TEXT")]
    cmd: Option<String>,

    /// Redefining an already defined macro is an error
    #[arg(short = 'r')]
    redefinition_forbidden: bool,

    /// Print help (must be the only option)
    #[arg(long)]
    help: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let status = match run() {
        Ok(()) => ExitStatus::Success,
        Err(err) => {
            error!("{err}");
            eprintln!("jmp: {err}");
            err.status()
        }
    };

    std::process::exit(status.code());
}

fn run() -> jmp_common::Result<()> {
    let args = Args::try_parse().map_err(|e| JmpError::params(e.to_string().trim_end()))?;

    if args.verbose {
        env_logger::init();
    }

    if args.help {
        let alone = args.input.is_none()
            && args.output.is_none()
            && args.cmd.is_none()
            && !args.redefinition_forbidden
            && !args.verbose;
        if !alone {
            return Err(JmpError::params("--help cannot be combined with other options"));
        }
        return Args::command()
            .print_help()
            .map_err(|e| JmpError::output(format!("failed to print help: {e}")));
    }

    // Open order matters for the exit status when both paths are bad
    let input: Box<dyn BufRead> = match &args.input {
        Some(path) => Box::new(BufReader::new(
            open_input(path).map_err(|e| JmpError::input(format!("{e:#}")))?,
        )),
        None => Box::new(io::stdin().lock()),
    };

    let output: Box<dyn Write> = match &args.output {
        Some(path) => Box::new(BufWriter::new(
            create_output(path).map_err(|e| JmpError::output(format!("{e:#}")))?,
        )),
        None => Box::new(BufWriter::new(io::stdout().lock())),
    };

    let options = EngineOptions {
        redefinition_forbidden: args.redefinition_forbidden,
        seed: args.cmd,
    };

    let mut engine = Engine::with_options(input, output, options);
    let result = engine.run();

    // Text produced before a failure is still delivered
    let flushed = engine.into_output().flush();
    result?;
    flushed.map_err(|e| JmpError::output(format!("failed to flush output: {e}")))
}

fn open_input(path: &Path) -> anyhow::Result<File> {
    File::open(path).with_context(|| format!("cannot open input file '{}'", path.display()))
}

fn create_output(path: &Path) -> anyhow::Result<File> {
    File::create(path).with_context(|| format!("cannot open output file '{}'", path.display()))
}
