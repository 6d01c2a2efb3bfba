//! The `ninec` binary.
//!
//! Usage: `ninec <source>` — the source program is the single
//! argument, and the assembly goes to stdout. A wrong argument count
//! prints a message to stderr and exits normally; any compilation
//! failure exits non-zero.

use std::io::Write;

use anyhow::{Context, Result};

fn main() {
    if let Err(e) = run() {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();
    if args.len() != 2 {
        eprintln!("The number of arguments is incorrect.");
        return Ok(());
    }

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    ninec_drv::compile(&args[1], &mut out)?;
    out.flush().context("flushing assembly to stdout")?;
    Ok(())
}
