mod cli;
mod settings;
mod workflow;

use anyhow::Result;
use cli::{OutputFormat, parse_cli, print_json, print_plain};
use settings::ResolvedConfig;
use workflow::ResolveWorkflow;

#[tokio::main]
async fn main() -> Result<()> {
	let cli = parse_cli();
	select_list::logging::initialize(cli.debug.unwrap_or(false));

	let resolved = settings::load(&cli)?;

	if cli.print_config {
		resolved.print_summary();
	}

	run_resolution(cli.output, resolved).await
}

/// Execute the resolution workflow and print output in the chosen format.
async fn run_resolution(format: OutputFormat, settings: ResolvedConfig) -> Result<()> {
	let workflow = ResolveWorkflow::from_config(settings)?;
	let outcome = workflow.run().await?;

	match format {
		OutputFormat::Plain => print_plain(&outcome),
		OutputFormat::Json => print_json(&outcome)?,
	}

	Ok(())
}
