use std::{
    env,
    ffi::OsString,
    io::{self, Write as _},
    process::ExitCode,
};

use anyhow::Context as _;
use causal_args::{
    BuiltinCatalog, Invocation, OptionRegistry, interpret,
    printers::{print_commands, print_failure, print_help},
};
use tracing_subscriber::EnvFilter;

const COMMAND: &str = "causal-cmd";
const DESCRIPTION: &str = "Causal discovery from tabular or covariance data";

/// Logs go to stderr, so that stdout only carries the requested output
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn main() -> anyhow::Result<ExitCode> {
    init_tracing();

    let args: Vec<OsString> = env::args_os().skip(1).collect();
    let tokens: Vec<&[u8]> = args.iter().map(|arg| arg.as_encoded_bytes()).collect();

    let catalog = BuiltinCatalog;
    let registry = OptionRegistry::with_catalog(&catalog);

    let mut stdout = io::stdout().lock();

    match interpret(&tokens, &registry, &catalog) {
        Ok(Invocation::Run(resolved)) => {
            writeln!(stdout, "{:#?}", resolved.configuration)
                .context("failed to print the configuration")?;
        }
        Ok(Invocation::Help {
            request,
            projection,
        }) => {
            print_help(&mut stdout, COMMAND, DESCRIPTION, &projection, request)
                .context("failed to print help")?;
        }
        Ok(Invocation::Describe { kind, commands }) => {
            print_commands(&mut stdout, kind, &commands)
                .with_context(|| format!("failed to print the list of {kind} commands"))?;
        }
        Ok(Invocation::Version) => {
            writeln!(stdout, "{COMMAND} {}", env!("CARGO_PKG_VERSION"))
                .context("failed to print the version")?;
        }
        Err(failure) => {
            let mut stderr = io::stderr().lock();
            print_failure(&mut stderr, COMMAND, DESCRIPTION, &failure)
                .context("failed to print the error")?;

            return Ok(ExitCode::FAILURE);
        }
    }

    Ok(ExitCode::SUCCESS)
}
