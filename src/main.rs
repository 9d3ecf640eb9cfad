use std::io::{self, Write};
use std::path::PathBuf;

use clap::{ArgAction, Parser};
use color_eyre::eyre::{bail, Result, WrapErr};
use log::LevelFilter;
use simple_logger::SimpleLogger;

use ls8::memory::{Memory, StdMem};
use ls8::processor::{Processor, State};

#[derive(Parser, Debug)]
#[command(name = "ls8")]
#[command(about = "Runs an LS-8 program listing", long_about = None)]
struct Args {
    /// Path to the program listing (one binary byte per line)
    program: PathBuf,

    /// Log every fetched instruction together with the registers
    #[arg(long, action = ArgAction::SetTrue)]
    trace: bool,

    /// Maximum level of log messages written to stderr
    #[arg(long, default_value_t = LevelFilter::Warn)]
    log_level: LevelFilter,

    /// Abort after this many instructions (0 means no limit)
    #[arg(long, default_value_t = 0)]
    max_steps: u64,
}

fn main() -> Result<()> {
    color_eyre::install()?; // rust error handling
    let args = Args::parse();

    let level = if args.trace {
        LevelFilter::Trace
    } else {
        args.log_level
    };
    SimpleLogger::new().with_level(level).init()?; // logging

    let mut mem = StdMem::from_file(&args.program)?;
    let mut cpu = Processor::default();

    let stdout = io::stdout();
    let mut out = stdout.lock();

    let steps = run_bounded(&mut cpu, &mut mem, &mut out, args.max_steps)
        .wrap_err_with(|| format!("`{}` did not halt", args.program.display()))?;

    out.flush()?;
    log::info!("Executed {} instructions", steps);

    Ok(())
}

/// Runs `cpu` until it halts, giving up after `max_steps` instructions
/// (0 means no limit). Returns the number of instructions executed.
fn run_bounded<const S: usize, W: Write>(
    cpu: &mut Processor,
    memory: &mut Memory<S>,
    out: &mut W,
    max_steps: u64,
) -> Result<u64> {
    let mut steps = 0u64;
    while cpu.state == State::Running {
        if max_steps != 0 && steps >= max_steps {
            bail!(
                "stopped after {} instructions at 0x{:02X}",
                steps,
                cpu.pc
            );
        }

        cpu.execute(memory, out)?;
        steps += 1;
    }

    Ok(steps)
}
