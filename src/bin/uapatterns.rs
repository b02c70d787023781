//! Print the candidate units for one or more identifiers.
//!
//! ```text
//! uapatterns <config.yaml> <identifier>...
//! ```
//!
//! Log verbosity follows `RUST_LOG` (default `info`).

use std::error::Error;
use std::process::ExitCode;

use tracing::error;
use tracing_subscriber::EnvFilter;
use uapatterns::open_lookup_from_file;

fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(error = %err, "lookup_failed");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), Box<dyn Error>> {
    let mut args = std::env::args().skip(1);
    let config_path = args
        .next()
        .ok_or("usage: uapatterns <config.yaml> <identifier>...")?;
    let lookup = open_lookup_from_file(&config_path)?;

    for identifier in args {
        println!("{identifier}");
        let batches = lookup.candidates(&identifier)?;
        for (index, unit) in batches.enumerate() {
            if unit.is_empty() {
                println!("  [{index}] <end>");
            } else {
                println!("  [{index}] {unit}");
            }
        }
    }
    Ok(())
}
