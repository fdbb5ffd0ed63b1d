use std::io::Write;

use anyhow::Result;
use clap::Parser;
use env_logger::Env;
use mf_app::cli::Cli;
use mf_app::pipeline;

fn main() -> Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let config = pipeline::resolve_config(&cli)?;
    let samples = pipeline::load_samples(&cli)?;

    let stdout = std::io::stdout();
    let mut out = std::io::BufWriter::new(stdout.lock());
    pipeline::run(&cli, &samples, &config, &mut out)?;
    out.flush()?;
    Ok(())
}
