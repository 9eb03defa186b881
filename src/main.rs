use std::process;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use modinstall::cli::Args;
use modinstall::error::InstallError;
use modinstall::installer::Installer;

fn main() {
    // Diagnostics go to stderr so piped stdout stays clean.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(err) => {
            // clap exits 2 on usage errors by default; this tool's contract
            // is exit 1 for any bad invocation, 0 for --help/--version.
            let _ = err.print();
            let code = match err.kind() {
                clap::error::ErrorKind::DisplayHelp | clap::error::ErrorKind::DisplayVersion => 0,
                _ => 1,
            };
            process::exit(code);
        }
    };

    if let Err(err) = run(args) {
        tracing::error!("{err:#}");
        process::exit(exit_code(&err));
    }
}

fn run(args: Args) -> Result<()> {
    let installer = Installer::new(args)?;
    installer.run()
}

/// A failing module install script propagates its own exit status;
/// everything else exits 1.
fn exit_code(err: &anyhow::Error) -> i32 {
    match err.downcast_ref::<InstallError>() {
        Some(InstallError::ModuleExecution { code, .. }) => *code,
        _ => 1,
    }
}
