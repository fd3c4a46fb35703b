use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Mutex;

use clap::Parser;
use hgssh::command::{RemoteCommand, UNKNOWN_COMMAND};
use hgssh::invocation::DEFAULT_REJECT_HOOK;
use hgssh::{Error, Gateway, GatewayOptions};
use hgssh_acl::PolicyConfig;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Environment variable holding the command the client asked to run.
const ORIGINAL_COMMAND_ENV: &str = "SSH_ORIGINAL_COMMAND";

/// Serve Mercurial repositories over a shared SSH account, with per-user access control.
///
/// Bind each key in `authorized_keys` to `command="hgssh <user> <policy-file>"`.
#[derive(Parser, Debug)]
#[command(name = "hgssh", version, about, long_about = None)]
struct Args {
    /// The user the connecting key belongs to.
    user: String,

    /// The policy file with `[groups]`, `[system]`, `[defaults]` and `[r:<name>]` sections.
    config: PathBuf,

    /// The Mercurial executable.
    #[arg(long, env = "HGSSH_HG", default_value = hgssh::command::HG)]
    hg: PathBuf,

    /// Shell command run as `prechangegroup` and `prepushkey` hook in read-only sessions.
    #[arg(long, env = "HGSSH_REJECT_HOOK", default_value = DEFAULT_REJECT_HOOK)]
    reject_hook: String,
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_tracing();

    let command = std::env::var(ORIGINAL_COMMAND_ENV).unwrap_or_else(|_| UNKNOWN_COMMAND.to_owned());
    match run(&args, &command) {
        Ok(code) => ExitCode::from(code),
        Err(err) => {
            eprintln!("{err}");
            ExitCode::from(err.exit_code())
        }
    }
}

fn run(args: &Args, command: &str) -> Result<u8, Error> {
    RemoteCommand::parse(command)?;
    let cwd = std::env::current_dir().map_err(Error::CurrentDir)?;
    let config = PolicyConfig::load(&args.config)?;

    let mut options = GatewayOptions::default()
        .with_hg(&args.hg)
        .with_reject_hook(&args.reject_hook);
    options.home = dirs::home_dir();

    let mut gateway = Gateway::with_hg_process(config, options)?;
    Ok(gateway.run(&args.user, command, &cwd)?.code)
}

/// Stderr reaches the SSH client, so it stays quiet unless `HGSSH_LOG` asks otherwise.
/// `HGSSH_LOG_FILE` adds a log file filtered by `HGSSH_LOG_FILE_LEVEL`. If it can't be opened,
/// that is reported on stderr once and file logging stays off.
fn init_tracing() {
    let stderr_filter = EnvFilter::try_from_env("HGSSH_LOG").unwrap_or_else(|_| EnvFilter::new("off"));
    let stderr_layer = fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_filter(stderr_filter);

    let file_layer = std::env::var_os("HGSSH_LOG_FILE")
        .and_then(|path| match OpenOptions::new().create(true).append(true).open(&path) {
            Ok(file) => Some(file),
            Err(err) => {
                eprintln!("hgssh: logging to {} is disabled: {err}", Path::new(&path).display());
                None
            }
        })
        .map(|file| {
            let filter = EnvFilter::try_from_env("HGSSH_LOG_FILE_LEVEL").unwrap_or_else(|_| EnvFilter::new("info"));
            fmt::layer()
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .with_filter(filter)
        });

    tracing_subscriber::registry().with(stderr_layer).with(file_layer).init();
}
