use acemu::{
    config::Config,
    hooks::{dump::Dump, serial::Serial, trace::Trace, Hook},
    io::IoController,
    Machine, Outcome, RunError,
};
use clap::Parser;
use color_print::ceprintln;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[clap(name = "acemu", version, about = "Simulator for the AC32 architecture")]
struct Args {
    /// Machine-code artifact produced by acasm
    program: PathBuf,

    /// File fed to the console device
    input: PathBuf,

    /// YAML machine config
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Fault after this many instructions
    #[arg(short = 't', long)]
    tmax: Option<u64>,

    /// Execution log [default: cpu.log]
    #[arg(short, long)]
    log: Option<PathBuf>,

    /// Start the execution log from scratch instead of appending
    #[arg(long)]
    truncate_log: bool,

    /// Dump registers after every instruction
    #[arg(short = 'a', long)]
    dump_all: bool,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .without_time()
        .init();

    let args = Args::parse();
    match start(args) {
        Ok(Outcome::Halted { .. }) => ExitCode::SUCCESS,
        Ok(Outcome::Faulted { ticks, fault }) => {
            ceprintln!(
                "<red,bold>fault</>: {} (pc 0x{:04X}, tick {})",
                fault,
                fault.pc(),
                ticks
            );
            ExitCode::from(2)
        }
        Err(err) => {
            ceprintln!("<red,bold>error</>: {}", err);
            ExitCode::from(1)
        }
    }
}

fn start(args: Args) -> Result<Outcome, RunError> {
    // ------------------------------------------------------------------------
    // Configuration: flags override the config file
    let config = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    let tmax = args.tmax.or(config.tmax);
    let log = args.log.unwrap_or(config.log);
    let truncate = args.truncate_log || config.truncate_log;

    // ------------------------------------------------------------------------
    // Initialize machine
    let program = acemu::load_program(&args.program)?;
    let input = acemu::read_file(&args.input)?;
    info!(program = %args.program.display(), input = input.len(), "starting");

    let mut machine = Machine::new(config.memory_size, IoController::standard(input));
    machine
        .load(&program)
        .map_err(acemu::LoadError::Program)?;

    // ------------------------------------------------------------------------
    // Initialize hooks
    let mut trace = Trace::open(&log, truncate)?;
    let mut serial = Serial::new(std::io::stdout().lock());
    let mut dump = Dump::new(config.dump, args.dump_all, std::io::stderr());

    // ------------------------------------------------------------------------
    // Main loop
    let mut hooks: [&mut dyn Hook; 3] = [&mut trace, &mut serial, &mut dump];
    let outcome = acemu::run(&mut machine, &mut hooks, tmax)?;
    Ok(outcome)
}
