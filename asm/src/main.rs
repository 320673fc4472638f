use acasm::{error::FileError, error::LineError, layout::Layout, parser, util};
use color_print::ceprintln;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::info;
use tracing_subscriber::EnvFilter;

const HELP_TEMPLATE: &str = "\
{before-help}{bin} {version}
  {about}

{usage-heading}
{tab}{usage}

{all-args}{after-help}";

#[derive(Debug, clap::Parser)]
#[clap(author, version, about, help_template = HELP_TEMPLATE)]
struct Args {
    /// Assembly source file
    source: PathBuf,

    /// Output artifact [default: <source stem>.json]
    output: Option<PathBuf>,

    /// Print the assembled listing to stderr
    #[clap(short, long)]
    dump: bool,
}

fn main() -> ExitCode {
    use clap::Parser;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .without_time()
        .init();

    let args = Args::parse();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(()) => ExitCode::FAILURE,
    }
}

fn report(path: &str, source: &str, errors: &[LineError]) {
    for err in errors {
        err.print_diag(path, source);
    }
    ceprintln!(
        "<red,bold>error</>: aborting due to {} previous error{}",
        errors.len(),
        if errors.len() == 1 { "" } else { "s" }
    );
}

fn run(args: &Args) -> Result<(), ()> {
    let path = args.source.display().to_string();
    let source = std::fs::read_to_string(&args.source).map_err(|e| {
        ceprintln!("<red,bold>error</>: {}", FileError::FileOpen(path.clone(), e));
    })?;

    info!("1. parse and lay out {}", path);
    let lines = parser::parse(&source).map_err(|errors| report(&path, &source, &errors))?;
    let layout = Layout::build(&lines).map_err(|errors| report(&path, &source, &errors))?;

    info!("2. resolve labels and encode");
    let program = layout
        .encode()
        .map_err(|errors| report(&path, &source, &errors))?;

    if args.dump {
        util::print_dump(&source, &lines, &layout);
    }

    let output = args
        .output
        .clone()
        .unwrap_or_else(|| acasm::default_output(&args.source));
    info!("3. write {}", output.display());
    acasm::emit(&program, &output).map_err(|e| {
        ceprintln!("<red,bold>error</>: {}", e);
    })
}
