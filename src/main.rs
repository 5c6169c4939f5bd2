use std::fs::read_to_string;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use tpyc::error::CompileError;
use tpyc::{CompileOptions, DEFAULT_CLASS_NAME, backend, compile};

/// tpyc - compiles tiny Python programs to Jasmin assembly
#[derive(Parser, Debug)]
#[command(name = "tpyc")]
#[command(about = "Compile a tiny Python program to Jasmin assembly", long_about = None)]
struct Args {
    /// Source file to compile
    input: PathBuf,

    /// Where to write the assembly (defaults to `<class>.j`)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Name of the generated class
    #[arg(long = "class", default_value = DEFAULT_CLASS_NAME)]
    class_name: String,

    /// Print the assembly to stdout instead of writing a file
    #[arg(long)]
    emit_stdout: bool,
}

fn run(args: Args) -> Result<(), CompileError> {
    let source = read_to_string(&args.input).map_err(|source| CompileError::Io {
        path: args.input.clone(),
        source,
    })?;

    let options = CompileOptions {
        class_name: args.class_name,
    };
    let text = compile(&source, &options)?;

    if args.emit_stdout {
        return backend::emit(&text, std::io::stdout()).map_err(|source| CompileError::Io {
            path: PathBuf::from("<stdout>"),
            source,
        });
    }

    let output = args
        .output
        .unwrap_or_else(|| PathBuf::from(format!("{}.j", options.class_name)));
    backend::write_output(&output, &text)?;
    info!(input = %args.input.display(), output = %output.display(), "compiled");
    Ok(())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let input = args.input.clone();
    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(input = %input.display(), "compilation failed");
            eprintln!("tpyc: {}: {}", input.display(), err);
            ExitCode::FAILURE
        }
    }
}
