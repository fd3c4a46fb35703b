use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use hgssh_keys::{authorized_lines, collect_keys, merge, read_authorized_keys, render_block, write_authorized_keys};
use tracing_subscriber::EnvFilter;

/// Regenerate the hgssh block of `authorized_keys` from a directory of `<user>.pub` files.
#[derive(Parser, Debug)]
#[command(name = "hgssh-authorized-keys", version, about, long_about = None)]
struct Args {
    /// Directory searched recursively for `<user>.pub` files.
    #[arg(long, value_name = "DIR")]
    keys_dir: PathBuf,

    /// The policy file passed to the gateway.
    #[arg(long, value_name = "FILE")]
    config: PathBuf,

    /// The gateway executable [default: `hgssh` next to this program]
    #[arg(long, value_name = "FILE")]
    gateway: Option<PathBuf>,

    /// The file to update [default: `~/.ssh/authorized_keys`]
    #[arg(long, value_name = "FILE")]
    authorized_keys: Option<PathBuf>,

    /// Print the resulting file instead of writing it.
    #[arg(long)]
    dry_run: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::try_from_env("HGSSH_LOG").unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let cwd = std::env::current_dir().context("could not determine the working directory")?;
    let gateway = match args.gateway {
        Some(gateway) => gateway,
        None => std::env::current_exe()
            .context("could not locate this program")?
            .with_file_name("hgssh"),
    };
    let authorized_keys = match args.authorized_keys {
        Some(path) => path,
        None => dirs::home_dir()
            .context("could not determine the home directory")?
            .join(".ssh")
            .join("authorized_keys"),
    };

    let entries = collect_keys(&args.keys_dir)
        .with_context(|| format!("could not collect keys from {}", args.keys_dir.display()))?;
    let lines = authorized_lines(&absolute(&cwd, &gateway), &absolute(&cwd, &args.config), &entries)?;
    let text = merge(&read_authorized_keys(&authorized_keys)?, &render_block(&lines));

    if args.dry_run {
        print!("{text}");
        return Ok(());
    }
    write_authorized_keys(&authorized_keys, &text)?;
    tracing::info!(path = %authorized_keys.display(), keys = lines.len(), "updated authorized keys");
    Ok(())
}

fn absolute(cwd: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_owned()
    } else {
        cwd.join(path)
    }
}
