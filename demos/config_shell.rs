//! A small CLI over [`memfs_jim::FileSystem`]: loads a [`Configuration`]
//! from an optional TOML file (falling back to the `unix()` preset) and
//! runs one filesystem operation per invocation.

use std::io::{Read, Write};
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use memfs_jim::channel::ChannelMode;
use memfs_jim::{Configuration, FileSystem};
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "memfs-shell", about = "Exercise an in-memory filesystem from the command line")]
struct Cli {
    /// Path to a TOML file deserializing to `memfs_jim::Configuration`.
    /// Falls back to the `unix()` preset when omitted.
    #[arg(long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List a directory's entries.
    Ls { path: String },
    /// Print a file's contents to stdout.
    Cat { path: String },
    /// Create a file and write stdin to it.
    Write { path: String },
    /// Create a directory.
    Mkdir { path: String },
    /// Remove an empty directory or a file.
    Rm { path: String },
}

fn load_configuration(config_path: Option<PathBuf>) -> Configuration {
    match config_path {
        None => Configuration::unix(),
        Some(path) => {
            let text = std::fs::read_to_string(&path).unwrap_or_else(|err| {
                error!(path = %path.display(), error = %err, "failed to read configuration file");
                std::process::exit(1);
            });
            toml::from_str(&text).unwrap_or_else(|err| {
                error!(path = %path.display(), error = %err, "failed to parse configuration file");
                std::process::exit(1);
            })
        }
    }
}

fn run(fs: &FileSystem, command: Command) -> memfs_jim::FsResult<()> {
    match command {
        Command::Ls { path } => {
            for name in fs.read_directory(&fs.path(&path)?)? {
                println!("{name}");
            }
        }
        Command::Cat { path } => {
            let channel = fs.open_channel(&fs.path(&path)?, ChannelMode::READ, false)?;
            let mut buf = vec![0u8; channel.size() as usize];
            channel.read_at(0, &mut buf)?;
            std::io::stdout().write_all(&buf).ok();
        }
        Command::Write { path } => {
            let mut data = Vec::new();
            std::io::stdin().read_to_end(&mut data).ok();
            let channel = fs.open_channel(&fs.path(&path)?, ChannelMode::WRITE, true)?;
            channel.truncate(0)?;
            channel.write(&data)?;
        }
        Command::Mkdir { path } => fs.create_directory(&fs.path(&path)?)?,
        Command::Rm { path } => fs.delete(&fs.path(&path)?)?,
    }
    Ok(())
}

fn main() {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let fs = FileSystem::new(load_configuration(cli.config)).unwrap_or_else(|err| {
        error!(error = %err, "failed to build filesystem from configuration");
        std::process::exit(1);
    });
    info!(name = %fs.name(), "filesystem ready");

    if let Err(err) = run(&fs, cli.command) {
        error!(error = %err, "operation failed");
        std::process::exit(1);
    }

    fs.close().ok();
}
