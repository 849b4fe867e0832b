//! Output formatting helpers.
//!
//! Results go to stdout; progress notes go to stderr so piped output stays
//! machine readable.

use std::fmt::Display;
use std::io::{self, Write};

use anyhow::Result;
use colored::Colorize;
use serde::Serialize;

/// Print a dimmed note to stderr.
pub fn note(msg: &str) {
    eprintln!("{}", msg.dimmed());
}

/// Print a labeled field, padded so values line up.
pub fn field(label: &str, value: impl Display) {
    println!("{:>12} {}", format!("{}:", label).dimmed(), value);
}

/// Write a value as one line of JSON.
pub fn json<T: Serialize>(value: &T) -> Result<()> {
    let mut out = io::stdout().lock();
    serde_json::to_writer(&mut out, value)?;
    writeln!(out)?;
    Ok(())
}

/// Write a value as indented JSON.
pub fn json_pretty<T: Serialize>(value: &T) -> Result<()> {
    let mut out = io::stdout().lock();
    serde_json::to_writer_pretty(&mut out, value)?;
    writeln!(out)?;
    Ok(())
}
