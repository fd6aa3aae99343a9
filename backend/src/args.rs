use clap::{Parser, Subcommand};
use std::path::PathBuf;
use varstore_commons::{VariableIdentity, VariableType};

/// varstore - inspect persisted pipeline variables
#[derive(Parser, Debug)]
#[command(name = "varstore")]
#[command(version)]
#[command(about = "Inspect, preview, export and delete persisted pipeline variables", long_about = None)]
pub struct Cli {
    /// Configuration file (default: ./varstore.toml when present)
    #[arg(short = 'c', long = "config")]
    pub config: Option<PathBuf>,

    /// Pipeline directory the variable belongs to
    #[arg(short = 'p', long = "pipeline")]
    pub pipeline: PathBuf,

    /// Block that produced the variable
    #[arg(short = 'b', long = "block")]
    pub block: String,

    /// Variable uuid
    #[arg(short = 'u', long = "uuid")]
    pub uuid: String,

    /// Partition below the variables directory
    #[arg(long = "partition")]
    pub partition: Option<String>,

    /// Variant tag to use instead of classifying from disk
    #[arg(short = 't', long = "type")]
    pub variable_type: Option<VariableType>,

    /// Attach a distributed engine context (needed for distributed variables)
    #[arg(long = "engine")]
    pub engine: bool,

    /// Override the configured log level
    #[arg(long = "log-level")]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Show paths, tag and files of the variable
    Show,
    /// Print the tag resolved from disk
    Classify,
    /// Print the stored value as JSON
    Read {
        /// Read the sample instead of the full data
        #[arg(long = "sample")]
        sample: bool,

        /// Row bound for the sample (implies --sample)
        #[arg(short = 'n', long = "rows")]
        rows: Option<usize>,

        /// Fail on unreadable files instead of falling back
        #[arg(long = "strict")]
        strict: bool,

        /// Frame analysis documents to load
        #[arg(long = "keys", value_delimiter = ',')]
        keys: Option<Vec<String>>,
    },
    /// Write data.csv for a tabular variable
    ExportCsv,
    /// Delete every file of the variable
    Delete,
}

impl Cli {
    pub fn identity(&self) -> VariableIdentity {
        let identity = VariableIdentity::new(&self.pipeline, self.block.as_str(), self.uuid.as_str());
        match &self.partition {
            Some(partition) => identity.with_partition(partition.clone()),
            None => identity,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_read() {
        let cli = Cli::try_parse_from([
            "varstore", "-p", "/pipelines/etl", "-b", "load", "-u", "output_0", "read", "-n", "5",
            "--keys", "metadata,statistics",
        ])
        .unwrap();
        assert_eq!(
            cli.command,
            Command::Read {
                sample: false,
                rows: Some(5),
                strict: false,
                keys: Some(vec!["metadata".to_string(), "statistics".to_string()]),
            }
        );
        assert_eq!(cli.identity().uuid.as_str(), "output_0");
    }

    #[test]
    fn test_parse_type_and_partition() {
        let cli = Cli::try_parse_from([
            "varstore", "-p", "/p", "-b", "b", "-u", "u", "--partition", "2024", "-t", "series",
            "show",
        ])
        .unwrap();
        assert_eq!(cli.variable_type, Some(VariableType::Series));
        assert_eq!(cli.identity().partition.as_deref(), Some("2024"));
    }

    #[test]
    fn test_unknown_type_rejected() {
        let result = Cli::try_parse_from([
            "varstore", "-p", "/p", "-b", "b", "-u", "u", "-t", "spreadsheet", "show",
        ]);
        assert!(result.is_err());
    }
}
