mod cli;

use std::process::ExitCode;

fn main() -> anyhow::Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let command_line_interface = cli::CommandLineInterface::load();
    let passed = command_line_interface.run()?;
    Ok(if passed { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}
