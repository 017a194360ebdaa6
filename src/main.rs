use anyhow::{bail, Result};
use clap::{ArgAction, Parser};
use deltabtor_rust::{BtorProgram, CommandOracle, ReduceOptions};
use simplelog::{ColorChoice, Config, LevelFilter, TermLogger, TerminalMode};
use std::{path::PathBuf, process::ExitCode};

/// Delta debugger for BTOR word-level programs.
#[derive(Parser, Debug)]
#[command(about)]
struct Args {
    /// Failing BTOR program to shrink.
    #[arg(index = 1)]
    input: PathBuf,

    /// Where the reduced program is written.
    #[arg(index = 2)]
    output: PathBuf,

    /// Checker invoked as `ORACLE <candidate>`; only its exit status is observed.
    #[arg(index = 3)]
    oracle: PathBuf,

    /// Increases verbosity, may be repeated.
    #[arg(short, action = ArgAction::Count)]
    v: u8,
}

fn run(args: Args) -> Result<()> {
    if args.input == args.output {
        bail!("<input> and <output> are the same");
    }
    if args.input == args.oracle {
        bail!("<input> and <oracle> are the same");
    }
    if args.output == args.oracle {
        bail!("<output> and <oracle> are the same");
    }

    let level = match args.v {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    TermLogger::init(
        level,
        Config::default(),
        TerminalMode::Stdout,
        ColorChoice::Auto,
    )?;

    let mut program = BtorProgram::from_file(&args.input)?;
    let oracle = CommandOracle::new(&args.oracle);
    program.reduce(&args.output, oracle, &ReduceOptions::default())?;
    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();
    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("*** deltabtor-rust: {:#}", err);
            ExitCode::FAILURE
        }
    }
}
