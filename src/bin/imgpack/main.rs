//! imgpack CLI - download a dataset and package it as a ZIP of PNGs.

use std::env;
use std::path::Path;
use std::process;

use imgpack::pipeline::{cifar10, mnist, synthetic, Cifar10Options, MnistOptions, OutputArchive, Summary, SyntheticOptions};
use imgpack::{Downloader, Result};
use tracing_subscriber::EnvFilter;

/// Environment variable overriding the `-v`/`-q` log level.
const LOG_ENV: &str = "IMGPACK_LOG";

fn main() {
    let args: Vec<String> = env::args().collect();

    // Parse global flags
    let mut level = "info";
    let mut filtered_args: Vec<&str> = Vec::new();
    for arg in &args[1..] {
        match arg.as_str() {
            "-v" | "--verbose" => level = "debug",
            "-vv" | "--trace" => level = "trace",
            "-q" | "--quiet" => level = "error",
            _ => filtered_args.push(arg),
        }
    }

    init_tracing(level);

    if filtered_args.is_empty() {
        print_help();
        return;
    }

    let command = filtered_args[0];
    if matches!(command, "h" | "help" | "-h" | "--help") {
        print_help();
        return;
    }

    let Some(&out) = filtered_args.get(1) else {
        usage_error(&format!("missing output path for '{command}'"));
    };
    let rest = &filtered_args[2..];

    let result = match parse_command(command, rest) {
        Ok(Command::Mnist(options)) => {
            run_async(|downloader| async move { mnist::run(&downloader, &options).await })
        }
        Ok(Command::Cifar10(options)) => {
            run_async(|downloader| async move { cifar10::run(&downloader, &options).await })
        }
        Ok(Command::Synthetic(options)) => synthetic::assemble(&options),
        Err(msg) => usage_error(&msg),
    };

    match result.and_then(|(archive, summary)| write_output(&archive, summary, Path::new(out))) {
        Ok(summary) => println!("{summary}"),
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(1);
        }
    }
}

fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Run a network-backed pipeline on a current-thread runtime.
fn run_async<F, Fut>(f: F) -> Result<(OutputArchive, Summary)>
where
    F: FnOnce(Downloader) -> Fut,
    Fut: std::future::Future<Output = Result<(OutputArchive, Summary)>>,
{
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let downloader = Downloader::new()?;
    runtime.block_on(f(downloader))
}

fn write_output(archive: &OutputArchive, summary: Summary, out: &Path) -> Result<Summary> {
    archive.write_zip(out)?;
    Ok(summary)
}

/// A dataset command with its options resolved.
#[derive(Debug)]
enum Command {
    Mnist(MnistOptions),
    Cifar10(Cifar10Options),
    Synthetic(SyntheticOptions),
}

/// Build the options for `command` from its positional arguments (after
/// the output path). Missing arguments take the per-dataset defaults.
fn parse_command(command: &str, args: &[&str]) -> std::result::Result<Command, String> {
    match command {
        "mnist" => {
            let defaults = MnistOptions::default();
            Ok(Command::Mnist(MnistOptions {
                max_per_class: parse_arg(args, 0, "maxPerClass", defaults.max_per_class)?,
                include_test: include_test(args, 1),
                ..defaults
            }))
        }
        "cifar10" | "cifar" => {
            let defaults = Cifar10Options::default();
            Ok(Command::Cifar10(Cifar10Options {
                max_per_class: parse_arg(args, 0, "maxPerClass", defaults.max_per_class)?,
                include_test: include_test(args, 1),
                ..defaults
            }))
        }
        "synthetic" | "synth" => {
            let defaults = SyntheticOptions::default();
            Ok(Command::Synthetic(SyntheticOptions {
                max_per_class: parse_arg(args, 0, "maxPerClass", defaults.max_per_class)?,
                size: parse_arg(args, 1, "size", defaults.size)?,
                per_class: parse_arg(args, 2, "perClass", defaults.per_class)?,
                seed: parse_arg(args, 3, "seed", defaults.seed)?,
            }))
        }
        other => Err(format!("unknown command '{other}'")),
    }
}

/// Positional numeric argument, or `default` when absent.
fn parse_arg<T: std::str::FromStr>(
    args: &[&str],
    index: usize,
    name: &str,
    default: T,
) -> std::result::Result<T, String> {
    match args.get(index) {
        None => Ok(default),
        Some(raw) => raw
            .parse()
            .map_err(|_| format!("{name} must be a non-negative integer, got '{raw}'")),
    }
}

/// Only the literal "0" disables the test split.
fn include_test(args: &[&str], index: usize) -> bool {
    args.get(index).map_or(true, |v| *v != "0")
}

fn usage_error(msg: &str) -> ! {
    eprintln!("Error: {msg}");
    eprintln!("Run 'imgpack help' for usage");
    process::exit(1);
}

fn print_help() {
    println!("imgpack {} - dataset to PNG/ZIP packager", env!("CARGO_PKG_VERSION"));
    println!();
    println!("USAGE:");
    println!("    imgpack [OPTIONS] <COMMAND> <out.zip> [ARGS]");
    println!();
    println!("COMMANDS:");
    println!("    mnist     <out.zip> [maxPerClass=600] [includeTest]");
    println!("    cifar10   <out.zip> [maxPerClass=1000] [includeTest]");
    println!("    synthetic <out.zip> [maxPerClass=40] [size=32] [perClass=50] [seed=42]");
    println!("    h, help                          Show this help");
    println!();
    println!("OPTIONS:");
    println!("    -v, --verbose    Show debug output");
    println!("    -vv, --trace     Show trace output (very verbose)");
    println!("    -q, --quiet      Errors only");
    println!();
    println!("EXAMPLES:");
    println!("    imgpack mnist out/mnist.zip 100 0        # 100 per digit, train only");
    println!("    imgpack cifar10 out/cifar.zip 0          # everything");
    println!("    imgpack -v synthetic out/synth.zip 5 16  # small offline set");
    println!();
    println!("NOTES:");
    println!("    - maxPerClass 0 means unlimited");
    println!("    - includeTest: only the literal 0 disables the test split");
    println!("    - {LOG_ENV} overrides the log filter (e.g. {LOG_ENV}=imgpack=trace)");
}
