use clap::Parser;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;
	let args = repi_api::Args::parse();
	repi_api::run(args).await
}
