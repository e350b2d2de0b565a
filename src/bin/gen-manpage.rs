//! Man page generator for spivip
//!
//! Writes `spivip.1` plus one page per subcommand (`spivip-read.1`, ...).
//!
//! Usage: cargo run --bin gen-manpage -- [output-dir]

use clap::CommandFactory;
use std::fs;
use std::path::{Path, PathBuf};

#[path = "../cli.rs"]
#[allow(dead_code)]
mod cli;

fn render(cmd: clap::Command, title: &str, path: &Path) -> std::io::Result<()> {
    let mut buffer = Vec::new();
    clap_mangen::Man::new(cmd).title(title).render(&mut buffer)?;
    fs::write(path, buffer)?;
    println!("Man page generated at: {}", path.display());
    Ok(())
}

fn main() -> std::io::Result<()> {
    let output_dir = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("man"));
    fs::create_dir_all(&output_dir)?;

    let cmd = cli::Cli::command();
    for sub in cmd.get_subcommands() {
        let name = format!("spivip-{}", sub.get_name());
        render(sub.clone(), &name, &output_dir.join(format!("{}.1", name)))?;
    }
    render(cmd, "spivip", &output_dir.join("spivip.1"))?;

    println!("\nTo view: man -l {}", output_dir.join("spivip.1").display());
    Ok(())
}
