use bmpcipher::cli::{process_file, FileOptions};
use bmpcipher::{
    CipherConfig, CipherContext, Mode, Operation, PayloadLayout, ProcessOptions, ProcessReport,
    Result, SaltPolicy,
};
use clap::Parser;
use std::ffi::OsString;
use std::path::PathBuf;
use std::process::ExitCode;
use zeroize::Zeroizing;

/// Version info from build.rs
const VERSION: &str = concat!(
    env!("BMPCIPHER_VERSION"),
    " (",
    env!("BMPCIPHER_PROFILE"),
    ", ",
    env!("BMPCIPHER_GIT_HASH"),
    ")"
);

#[derive(Parser)]
#[command(name = "bmpcipher")]
#[command(version = VERSION, long_about = None)]
#[command(about = "Encrypt or decrypt a bitmap (or raw file) with AES-256")]
struct Cli {
    /// Input file
    input: PathBuf,

    /// Passphrase the key and IV are derived from (any bytes)
    passphrase: OsString,

    /// Output file (written only if the whole run succeeds)
    output: PathBuf,

    /// encrypt or decrypt
    operation: String,

    /// ECB or CBC
    mode: String,

    /// Treat the input as headerless and transform every byte
    #[arg(long)]
    raw: bool,

    /// Use a random per-file salt stored after the header (must be given for decrypt too)
    #[arg(long)]
    random_salt: bool,

    /// PBKDF2 iterations (overrides the config file)
    #[arg(long)]
    iterations: Option<u32>,

    /// Worker threads for ECB (overrides the config file)
    #[arg(long)]
    threads: Option<usize>,

    /// JSON configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print the run report as JSON
    #[arg(long)]
    json: bool,

    /// More log output (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

fn run(cli: &Cli) -> Result<ProcessReport> {
    let operation: Operation = cli.operation.parse()?;
    let mode: Mode = cli.mode.parse()?;

    let mut config = match &cli.config {
        Some(path) => CipherConfig::from_json_file(path)?,
        None => CipherConfig::default(),
    };
    if let Some(iterations) = cli.iterations {
        config.iterations = iterations;
    }
    if let Some(threads) = cli.threads {
        config.threads = Some(threads);
    }
    let ctx = CipherContext::new(config)?;

    let options = FileOptions {
        passphrase: Zeroizing::new(cli.passphrase.as_encoded_bytes().to_vec()),
        process: ProcessOptions {
            operation,
            mode,
            layout: if cli.raw {
                PayloadLayout::Raw
            } else {
                PayloadLayout::Bitmap
            },
            salt: if cli.random_salt {
                SaltPolicy::Embedded
            } else {
                SaltPolicy::Fixed
            },
        },
    };

    process_file(&ctx, &cli.input, &cli.output, &options)
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            // --help / --version land here too and are not failures
            let code = if e.use_stderr() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
            let _ = e.print();
            return code;
        }
    };

    init_logging(cli.verbose);

    let result = run(&cli).and_then(|report| {
        if cli.json {
            println!("{}", serde_json::to_string(&report)?);
        } else {
            println!(
                "{} -> {}: {}",
                cli.input.display(),
                cli.output.display(),
                report
            );
        }
        Ok(())
    });

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error ({}): {}", e.stage(), e);
            ExitCode::FAILURE
        }
    }
}
