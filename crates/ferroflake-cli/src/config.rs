use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use ferroflake::{GeneratorConfig, MAX_NODE_ID, SystemClock, TimeSource};

use crate::node_id;

/// Runtime configuration for the `ferroflake` binary.
///
/// The generator settings are parsed from CLI arguments or environment
/// variables (a `.env` file is loaded first), with the library defaults when
/// neither is given.
#[derive(Parser, Debug, Clone)]
#[command(
    name = "ferroflake",
    version,
    about = "Generate and decode 64-bit Snowflake IDs"
)]
pub struct CliArgs {
    /// Node ID embedded in every generated ID, `0..=1023`.
    ///
    /// Every process generating IDs concurrently must use a distinct node ID;
    /// nothing detects a collision.
    ///
    /// Environment variable: `FERROFLAKE_NODE_ID`
    #[arg(long, env = "FERROFLAKE_NODE_ID", default_value_t = 0, global = true)]
    pub node_id: u16,

    /// Derive the node ID from the low 10 bits of this host's private IPv4
    /// address instead. Takes precedence over `--node-id`.
    #[arg(long, default_value_t = false, global = true)]
    pub node_id_from_private_ip: bool,

    /// Epoch in milliseconds since the Unix epoch.
    ///
    /// Defaults to 2008-11-10T23:00:00Z. IDs must be decoded with the epoch
    /// they were generated against.
    ///
    /// Environment variable: `FERROFLAKE_EPOCH_MILLIS`
    #[arg(long, env = "FERROFLAKE_EPOCH_MILLIS", global = true)]
    pub epoch_millis: Option<u64>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Generate IDs, one per line.
    Generate {
        /// Number of IDs to generate.
        #[arg(short, long, default_value_t = 1)]
        count: usize,

        /// Print the decoded fields next to each ID.
        #[arg(long, default_value_t = false)]
        parse: bool,
    },
    /// Decode IDs into timestamp, node ID and sequence.
    Parse {
        #[arg(required = true)]
        ids: Vec<u64>,
    },
}

#[derive(Debug, Clone)]
pub struct CliConfig {
    pub generator: GeneratorConfig,
    pub command: Command,
}

impl TryFrom<CliArgs> for CliConfig {
    type Error = anyhow::Error;

    fn try_from(args: CliArgs) -> Result<Self, Self::Error> {
        if args.node_id > MAX_NODE_ID {
            bail!(
                "FERROFLAKE_NODE_ID ({}) exceeds the node ID space (max = {})",
                args.node_id,
                MAX_NODE_ID
            );
        }

        let node_id = if args.node_id_from_private_ip {
            node_id::from_private_ip().context("--node-id-from-private-ip")?
        } else {
            args.node_id
        };

        let mut generator = GeneratorConfig {
            node_id,
            ..GeneratorConfig::default()
        };
        if let Some(epoch_millis) = args.epoch_millis {
            generator.epoch_millis = epoch_millis;
        }
        generator
            .validate(SystemClock.current_millis())
            .context("invalid FERROFLAKE_EPOCH_MILLIS")?;

        if let Command::Generate { count: 0, .. } = args.command {
            bail!("--count must be greater than 0");
        }

        Ok(Self {
            generator,
            command: args.command,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ferroflake::DEFAULT_EPOCH;

    fn parse(args: &[&str]) -> anyhow::Result<CliConfig> {
        let args = CliArgs::try_parse_from(args)?;
        CliConfig::try_from(args)
    }

    #[test]
    fn defaults_match_the_library() {
        let config = parse(&["ferroflake", "generate"]).unwrap();
        assert_eq!(config.generator.epoch(), DEFAULT_EPOCH);
        assert_eq!(config.generator.node_id, 0);
        assert_eq!(
            config.command,
            Command::Generate {
                count: 1,
                parse: false
            }
        );
    }

    #[test]
    fn flags_override_defaults() {
        let config = parse(&[
            "ferroflake",
            "generate",
            "--node-id",
            "1023",
            "--epoch-millis",
            "1420070400000",
            "--count",
            "3",
        ])
        .unwrap();
        assert_eq!(config.generator.node_id, 1023);
        assert_eq!(config.generator.epoch_millis, 1_420_070_400_000);
    }

    #[test]
    fn out_of_range_node_id_is_rejected() {
        let err = parse(&["ferroflake", "generate", "--node-id", "1024"]).unwrap_err();
        assert!(err.to_string().contains("exceeds the node ID space"));
    }

    #[test]
    fn future_epoch_is_rejected() {
        let future = (SystemClock.current_millis() + 60_000).to_string();
        let err = parse(&["ferroflake", "generate", "--epoch-millis", &future]).unwrap_err();
        assert!(err.to_string().contains("FERROFLAKE_EPOCH_MILLIS"));
    }

    #[test]
    fn private_ip_flag_is_global() {
        let args =
            CliArgs::try_parse_from(["ferroflake", "generate", "--node-id-from-private-ip"])
                .unwrap();
        assert!(args.node_id_from_private_ip);
        assert!(!CliArgs::try_parse_from(["ferroflake", "generate"])
            .unwrap()
            .node_id_from_private_ip);
    }

    #[test]
    fn parse_requires_ids() {
        assert!(CliArgs::try_parse_from(["ferroflake", "parse"]).is_err());
        let config = parse(&["ferroflake", "parse", "1", "2"]).unwrap();
        assert_eq!(config.command, Command::Parse { ids: vec![1, 2] });
    }
}
