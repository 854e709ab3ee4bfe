//! xattr-handle CLI - inspect and edit extended attributes of one path

use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use xattr_handle::{Config, IoResultExt, SetOptions, ValueEncoding};

#[derive(Parser)]
#[command(name = "xattr-handle")]
#[command(about = "list, read, write and remove extended file attributes")]
#[command(version)]
struct Cli {
    /// config file with defaults
    #[arg(short, long, env = "XATTR_HANDLE_CONFIG")]
    config: Option<PathBuf>,

    /// act on symbolic links themselves instead of their targets
    #[arg(short = 'P', long)]
    no_dereference: bool,

    /// value encoding for output and for `set` input
    #[arg(short, long)]
    encoding: Option<ValueEncoding>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// list attribute names
    List {
        path: PathBuf,
    },

    /// print the value of one attribute
    Get {
        path: PathBuf,

        /// attribute name
        name: String,
    },

    /// set an attribute
    Set {
        path: PathBuf,

        /// attribute name
        name: String,

        /// new value
        value: String,

        /// fail if the attribute already exists
        #[arg(long)]
        create: bool,

        /// fail if the attribute does not exist
        #[arg(long)]
        replace: bool,
    },

    /// remove an attribute, printing its last value
    Rm {
        path: PathBuf,

        /// attribute name
        name: String,
    },

    /// print every attribute as name=value
    Dump {
        path: PathBuf,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("error: {}", e);
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

fn run(cli: Cli) -> xattr_handle::Result<()> {
    let mut config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    if cli.no_dereference {
        config.follow_symlinks = false;
    }
    if let Some(encoding) = cli.encoding {
        config.encoding = encoding;
    }
    debug!(?config, "effective config");

    let mut out = io::stdout().lock();

    match cli.command {
        Commands::List { path } => {
            let handle = config.handle(path);
            for name in handle.list()? {
                writeln!(out, "{}", name).with_path("stdout")?;
            }
        }

        Commands::Get { path, name } => {
            let handle = config.handle(path);
            let value = handle.get(&name)?;
            write_value(&mut out, config.encoding, &value)?;
        }

        Commands::Set {
            path,
            name,
            value,
            create,
            replace,
        } => {
            let handle = config.handle(path);
            let value = config.encoding.decode(&value)?;
            handle.set(&name, value, SetOptions { create, replace })?;
        }

        Commands::Rm { path, name } => {
            let handle = config.handle(path);
            let value = handle.remove(&name)?;
            write_value(&mut out, config.encoding, &value)?;
        }

        Commands::Dump { path } => {
            let handle = config.handle(path);
            for xattr in handle.attributes()? {
                write!(out, "{}=", xattr.name).with_path("stdout")?;
                write_value(&mut out, config.encoding, &xattr.value)?;
            }
        }
    }

    out.flush().with_path("stdout")
}

fn write_value(
    out: &mut impl Write,
    encoding: ValueEncoding,
    value: &[u8],
) -> xattr_handle::Result<()> {
    out.write_all(&encoding.encode(value)).with_path("stdout")?;
    if encoding != ValueEncoding::Raw {
        writeln!(out).with_path("stdout")?;
    }
    Ok(())
}
