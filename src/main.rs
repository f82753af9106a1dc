use std::io::{self, BufRead, Write};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;

use passgen::{generate, logging};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Pattern to generate from (first line of stdin when omitted)
    #[arg(value_name = "PATTERN")]
    pattern: Option<String>,

    /// Number of samples to generate
    #[arg(short = 'n', long, default_value_t = 1)]
    count: usize,

    /// Print the entropy in bits after each sample
    #[arg(short = 'e', long)]
    entropy: bool,

    /// Increase log verbosity (repeatable)
    #[arg(short = 'v', long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> ExitCode {
    let args = Args::parse();
    match run(&args) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("passgen: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<ExitCode> {
    logging::init(args.verbose)?;
    let pattern = match &args.pattern {
        Some(pattern) => pattern.clone(),
        None => read_pattern()?,
    };

    let mut stdout = io::stdout().lock();
    for _ in 0..args.count {
        match generate(&pattern) {
            Ok(out) if args.entropy => writeln!(stdout, "{}\t{:.2}", out.text, out.entropy)?,
            Ok(out) => writeln!(stdout, "{}", out.text)?,
            Err(err) => {
                eprintln!("{}", err.render(&pattern));
                return Ok(ExitCode::FAILURE);
            }
        }
    }
    Ok(ExitCode::SUCCESS)
}

fn read_pattern() -> Result<String> {
    let mut line = String::new();
    io::stdin()
        .lock()
        .read_line(&mut line)
        .context("failed to read pattern from stdin")?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}
