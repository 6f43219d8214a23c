use anyhow::{bail, Context, Result};
use cadjson_core::{ConversionRequest, ConvertConfig, ConvertError, Converter};
use cadjson_core::export::Tolerances;
use cadjson_export_js::JsLiteralExporter;
use cadjson_import_step::{StepAssemblyBackend, StepBrepBackend, StepTopology};
use clap::Parser;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::Level;

const USAGE_HINT: &str = "Hint: run `cadjson --help` for usage; pass -v or -vv for conversion logs.";

#[derive(Debug, Parser)]
#[command(name = "cadjson")]
#[command(about = "Convert a STEP assembly to three-cad-viewer JSON.")]
struct Cli {
    /// Input STEP file.
    #[arg(long = "in", value_name = "PATH")]
    input: PathBuf,
    /// Output JSON file.
    #[arg(long = "out", value_name = "PATH")]
    output: PathBuf,
    /// Model name (defaults to the input file stem).
    #[arg(long)]
    name: Option<String>,
    /// Color override for parts that carry a color, e.g. #ff0000.
    #[arg(long)]
    color: Option<String>,
    /// Linear deflection used for tessellation.
    #[arg(long, default_value_t = 0.1)]
    deflection: f64,
    /// Angular tolerance in degrees.
    #[arg(long, default_value_t = 12.0)]
    angle: f64,
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(&cli) {
        Ok(()) => {
            println!("Wrote JSON to {}", cli.output.display());
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("Error: {err:#}");
            eprintln!("{}", failure_hint(&err));
            ExitCode::from(2)
        }
    }
}

/// Dependency failures carry their own install hint; everything else gets the usage hint.
fn failure_hint(err: &anyhow::Error) -> &str {
    err.downcast_ref::<ConvertError>()
        .and_then(ConvertError::hint)
        .unwrap_or(USAGE_HINT)
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        _ => Level::DEBUG,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: &Cli) -> Result<()> {
    ensure_input_file(&cli.input)?;
    if !(cli.deflection > 0.0) || !(cli.angle > 0.0) {
        bail!("--deflection and --angle must be positive");
    }

    let mut req = ConversionRequest::new(&cli.input, &cli.output);
    req.model_name = cli.name.clone();
    req.color = cli.color.clone();
    req.tolerances = Tolerances {
        linear: cli.deflection,
        angular_deg: cli.angle,
    };

    let converter = build_converter();
    let doc = converter.convert(&req)?;
    tracing::info!(parts = doc.parts().len(), "converted {:?}", cli.input);
    Ok(())
}

fn build_converter() -> Converter {
    let converter = Converter::new(ConvertConfig::default())
        .with_backend(StepAssemblyBackend {
            enabled: cfg!(feature = "step-assembly"),
        })
        .with_backend(StepBrepBackend {
            enabled: cfg!(feature = "step-brep"),
        })
        .with_topology(StepTopology);
    if cfg!(feature = "js-export") {
        converter.with_exporter(JsLiteralExporter::default())
    } else {
        converter
    }
}

fn ensure_input_file(input: &Path) -> Result<()> {
    match std::fs::metadata(input) {
        Ok(meta) => {
            if meta.is_file() {
                Ok(())
            } else {
                bail!("input is not a file: {input:?}");
            }
        }
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
            bail!("input not found: {input:?} (cwd: {cwd:?}).");
        }
        Err(err) => Err(err).with_context(|| format!("stat input: {input:?}")),
    }
}
