mod config;
mod node_id;
mod telemetry;

use std::io::{self, BufWriter, Write};

use clap::Parser;
use config::{CliArgs, CliConfig, Command};
use ferroflake::{Generator, ParsedId, parse_id};
use telemetry::init_telemetry;

fn main() -> anyhow::Result<()> {
    // Load from .env
    let _ = dotenvy::dotenv();
    let args = CliArgs::parse();
    let config = CliConfig::try_from(args)?;

    init_telemetry()?;

    let generator = Generator::builder().config(config.generator).try_build()?;
    tracing::debug!(
        node_id = generator.node_id(),
        epoch_millis = config.generator.epoch_millis,
        "generator configured"
    );

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    match config.command {
        Command::Generate { count, parse } => {
            for _ in 0..count {
                let id = generator.try_next_id()?;
                if parse {
                    write_parsed(&mut out, &generator, &parse_id(id))?;
                } else {
                    writeln!(out, "{id}")?;
                }
            }
            tracing::info!(count, "generated ids");
        }
        Command::Parse { ids } => {
            for id in ids {
                write_parsed(&mut out, &generator, &parse_id(id))?;
            }
        }
    }
    out.flush()?;

    Ok(())
}

fn write_parsed<R, T>(
    out: &mut impl Write,
    generator: &Generator<R, T>,
    parsed: &ParsedId,
) -> io::Result<()> {
    writeln!(
        out,
        "{parsed} unix_ms={}",
        generator.generate_time(parsed).as_millis()
    )
}
