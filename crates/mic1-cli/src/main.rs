//! CLI entry point for the Mic-1 emulator.

mod terminal;

use std::env;
use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};

use mic1_core::{
    disassemble_listing, load_control_store, Machine, MachineConfig, RunLimit, StopReason,
};
#[cfg(test)]
use tempfile as _;
use tracing_subscriber::EnvFilter;

use crate::terminal::TerminalInspector;

const USAGE_TEXT: &str = "\
Usage: mic1 [options] <program>

Options:
  -r, --rom <file>      Microprogram ROM (default: microprog.rom)
  -n, --cycles <count>  Stop after <count> cycles instead of running unbounded
      --no-pause        Print status each cycle without waiting for input
  -q, --quiet           Do not print the status report
  -l, --listing         Print a disassembly of the control store and exit
  -h, --help            Show this help message

Environment:
  MIC1_LOG              Log filter for stderr diagnostics (default: warn)

Examples:
  mic1 program.exe
  mic1 --rom microprog.rom --cycles 100 --no-pause program.exe
  mic1 --listing
";

const DEFAULT_ROM: &str = "microprog.rom";
const LOG_ENV: &str = "MIC1_LOG";

const EXIT_USAGE: i32 = 1;
const EXIT_LOAD: i32 = 2;
const EXIT_FAULT: i32 = 3;

#[derive(Debug, PartialEq, Eq)]
struct RunArgs {
    program: Option<PathBuf>,
    rom: PathBuf,
    cycles: Option<u64>,
    pause: bool,
    quiet: bool,
    listing: bool,
}

impl Default for RunArgs {
    fn default() -> Self {
        Self {
            program: None,
            rom: PathBuf::from(DEFAULT_ROM),
            cycles: None,
            pause: true,
            quiet: false,
            listing: false,
        }
    }
}

#[derive(Debug)]
enum ParseResult {
    Run(RunArgs),
    Help,
}

#[allow(clippy::while_let_on_iterator)]
fn parse_args(mut args: impl Iterator<Item = OsString>) -> Result<ParseResult, String> {
    let mut parsed = RunArgs::default();

    while let Some(arg) = args.next() {
        if arg == "--help" || arg == "-h" {
            return Ok(ParseResult::Help);
        }

        if arg == "--rom" || arg == "-r" {
            let value = args
                .next()
                .ok_or_else(|| "missing value for --rom".to_string())?;
            parsed.rom = PathBuf::from(value);
            continue;
        }

        if arg == "--cycles" || arg == "-n" {
            let value = args
                .next()
                .ok_or_else(|| "missing value for --cycles".to_string())?;
            let text = value.to_string_lossy();
            let count = text
                .parse::<u64>()
                .map_err(|_| format!("invalid cycle count: {text}"))?;
            parsed.cycles = Some(count);
            continue;
        }

        if arg == "--no-pause" {
            parsed.pause = false;
            continue;
        }

        if arg == "--quiet" || arg == "-q" {
            parsed.quiet = true;
            continue;
        }

        if arg == "--listing" || arg == "-l" {
            parsed.listing = true;
            continue;
        }

        if arg.to_string_lossy().starts_with('-') {
            return Err(format!("unknown option: {}", arg.to_string_lossy()));
        }

        if parsed.program.is_some() {
            return Err("multiple program paths provided".to_string());
        }
        parsed.program = Some(PathBuf::from(arg));
    }

    if parsed.program.is_none() && !parsed.listing {
        return Err("missing program path".to_string());
    }
    Ok(ParseResult::Run(parsed))
}

fn init_logging() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    if let Err(err) = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init()
    {
        eprintln!("warning: diagnostics disabled: {err}");
    }
}

fn run_listing(rom: &Path) -> Result<(), i32> {
    let store = load_control_store(rom).map_err(|e| {
        eprintln!("error: {e}");
        EXIT_LOAD
    })?;

    for row in disassemble_listing(&store) {
        println!("{:03X}: {:09X}  {}", row.addr, row.mir, row.text);
    }
    Ok(())
}

fn run_machine(args: &RunArgs, program: &Path) -> Result<(), i32> {
    let mut machine =
        Machine::from_files(MachineConfig::default(), &args.rom, program).map_err(|e| {
            eprintln!("error: {e}");
            EXIT_LOAD
        })?;

    let limit = args.cycles.map_or(RunLimit::Unbounded, RunLimit::Cycles);
    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut inspector = TerminalInspector::new(stdin.lock(), stdout.lock(), args.pause, args.quiet);

    match machine.run(limit, &mut inspector) {
        Ok(outcome) => {
            if outcome.stop == StopReason::CycleLimit {
                inspector.print_final(&machine);
            }
            tracing::info!(cycles = outcome.cycles, stop = ?outcome.stop, "run finished");
            Ok(())
        }
        Err(fault) => {
            inspector.print_final(&machine);
            eprintln!("error: {fault} after {} cycles", machine.cycles());
            Err(EXIT_FAULT)
        }
    }
}

fn run(args: &RunArgs) -> Result<(), i32> {
    match &args.program {
        Some(program) if !args.listing => run_machine(args, program),
        _ => run_listing(&args.rom),
    }
}

fn main() {
    init_logging();

    let exit_code = match parse_args(env::args_os().skip(1)) {
        Ok(ParseResult::Help) => {
            println!("{USAGE_TEXT}");
            0
        }
        Ok(ParseResult::Run(args)) => match run(&args) {
            Ok(()) => 0,
            Err(code) => code,
        },
        Err(error) => {
            eprintln!("error: {error}");
            eprintln!("{USAGE_TEXT}");
            EXIT_USAGE
        }
    };

    std::process::exit(exit_code);
}
