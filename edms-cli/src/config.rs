//! Configuration for the edms command
//!
//! CLI arguments and environment variable handling using clap.

use clap::{Args as ClapArgs, Parser, Subcommand, ValueEnum};
use edms::MetadataMap;
use mayan_client::ConnectionConfig;
use serde_json::Value;
use url::Url;

/// edms - reconcile classified document metadata into mayan-edms
#[derive(Parser, Debug, Clone)]
#[command(name = "edms")]
#[command(about = "Reconciles classified document metadata into mayan-edms")]
pub struct Args {
    /// mayan-edms connection
    #[command(flatten)]
    pub mayan: MayanArgs,

    /// Analyzer endpoint that accepts documents for classification
    #[arg(
        long,
        env = "ANALYZER_URL",
        default_value = "http://localhost:9292/analyses/documents"
    )]
    pub analyzer_url: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Command,
}

/// Credentials and location of the mayan-edms server
#[derive(ClapArgs, Debug, Clone)]
pub struct MayanArgs {
    /// Base URL of the mayan-edms server (the API lives under /api/)
    #[arg(long = "mayan-url", env = "MAYAN_EDMS_URL")]
    pub url: String,

    #[arg(long = "mayan-user", env = "MAYAN_EDMS_USER")]
    pub user: String,

    #[arg(long = "mayan-password", env = "MAYAN_EDMS_PASSWORD", hide_env_values = true)]
    pub password: String,
}

impl MayanArgs {
    pub fn connection(&self) -> ConnectionConfig {
        ConnectionConfig::new(&self.url, &self.user, &self.password)
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Write desired metadata onto a document
    Decorate {
        /// Backend document id
        #[arg(long)]
        document: u64,

        /// Document type the metadata was classified against
        #[arg(long)]
        document_type: Option<u64>,

        /// JSON object of metadata keys to values
        #[arg(long, value_parser = parse_metadata)]
        metadata: MetadataMap,
    },

    /// Send documents back to the analyzer
    Reanalyze {
        #[arg(required = true)]
        ids: Vec<u64>,
    },

    /// Print a document's text
    Text {
        id: u64,

        #[arg(long, value_enum, default_value_t = TextSource::Ocr)]
        source: TextSource,
    },
}

/// Where document text is read from
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextSource {
    /// OCR output of the latest version
    Ocr,
    /// Extracted content of the first file
    File,
}

fn parse_metadata(raw: &str) -> Result<MetadataMap, String> {
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(format!("expected a JSON object, got {}", other)),
        Err(e) => Err(format!("invalid JSON: {}", e)),
    }
}

impl Args {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        self.mayan
            .connection()
            .api_root()
            .map_err(|e| format!("MAYAN_EDMS_URL: {}", e))?;

        if matches!(self.command, Command::Reanalyze { .. }) {
            Url::parse(&self.analyzer_url).map_err(|e| format!("ANALYZER_URL: {}", e))?;
        }

        Ok(())
    }

    /// Default tracing filter for this process
    pub fn log_filter(&self) -> String {
        format!(
            "edms={level},mayan_client={level},info",
            level = self.log_level
        )
    }
}
