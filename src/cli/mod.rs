//! Command-line interface for fhirsearch
//!
//! This module handles:
//! - Command-line argument parsing using clap
//! - Configuration loading and validation
//! - One-shot subcommands (classify, suggest, apply)
//! - Mode selection (subcommand vs interactive console)

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;

use crate::capability::CapabilityStore;
use crate::completion::SuggestionEngine;
use crate::config::{Config, LogLevel, OutputFormat};
use crate::error::{FhirSearchError, Result};
use crate::formatter::Formatter;

mod completion;

pub use completion::generate_completion;

/// FHIR search query completion tool
#[derive(Parser, Debug)]
#[command(
    name = "fhirsearch",
    version,
    about = "Context-aware completion for FHIR search queries",
    long_about = "Classifies the cursor position inside a FHIR search query and suggests
resource types, search parameters, modifiers, operators and values, either
as one-shot commands or in an interactive console."
)]
pub struct CliArgs {
    /// CapabilityStatement JSON file with server-declared search parameters
    #[arg(long, value_name = "FILE")]
    pub capability: Option<PathBuf>,

    /// Configuration file path
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    pub config_file: Option<PathBuf>,

    /// Output format (plain, json, json-pretty, table)
    #[arg(long, value_name = "FORMAT")]
    pub format: Option<String>,

    /// Disable colored output
    #[arg(long = "no-color")]
    pub no_color: bool,

    /// Quiet mode (minimal output)
    #[arg(short = 'q', long)]
    pub quiet: bool,

    /// Verbose mode (detailed logging)
    #[arg(short = 'v', long)]
    pub verbose: bool,

    /// Very verbose mode (debug logging)
    #[arg(long = "vv")]
    pub very_verbose: bool,

    /// Subcommands
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Subcommands for fhirsearch
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Classify the cursor context of a query
    Classify {
        /// Query text, e.g. "/Patient?name=Al"
        #[arg(value_name = "QUERY")]
        query: String,

        /// Cursor byte offset (defaults to end of query)
        #[arg(long, value_name = "POS")]
        cursor: Option<usize>,
    },

    /// List suggestions for a query position
    Suggest {
        /// Query text
        #[arg(value_name = "QUERY")]
        query: String,

        /// Cursor byte offset (defaults to end of query)
        #[arg(long, value_name = "POS")]
        cursor: Option<usize>,

        /// Maximum number of suggestions (defaults to config)
        #[arg(long, value_name = "N")]
        limit: Option<usize>,
    },

    /// Apply a suggestion to a query and print the edited text
    Apply {
        /// Query text
        #[arg(value_name = "QUERY")]
        query: String,

        /// Cursor byte offset (defaults to end of query)
        #[arg(long, value_name = "POS")]
        cursor: Option<usize>,

        /// Label of the suggestion to apply (defaults to the top one)
        #[arg(long, value_name = "LABEL")]
        pick: Option<String>,
    },

    /// Show version information
    Version,

    /// Generate shell completion script
    Completion {
        /// Shell type (bash, zsh, fish)
        #[arg(value_name = "SHELL")]
        shell: String,
    },

    /// Show configuration
    Config {
        /// Show effective configuration
        #[arg(long)]
        show: bool,

        /// Validate configuration file
        #[arg(long)]
        validate: bool,
    },
}

/// CLI interface handler
pub struct CliInterface {
    /// Parsed command-line arguments
    args: CliArgs,

    /// Loaded configuration
    config: Config,
}

impl CliInterface {
    /// Create a new CLI interface
    pub fn new() -> Result<Self> {
        let args = CliArgs::parse();
        let config = Self::load_config(&args)?;

        Ok(Self { args, config })
    }

    /// Load configuration from file and merge with arguments
    fn load_config(args: &CliArgs) -> Result<Config> {
        let mut config = match &args.config_file {
            Some(path) => Config::from_file(path)?,
            None => Config::load().unwrap_or_else(|e| {
                eprintln!("Warning: failed to load configuration: {e}");
                eprintln!("Using default configuration instead.");
                Config::default()
            }),
        };

        Self::apply_args_to_config(&mut config, args);
        Ok(config)
    }

    /// Apply CLI arguments to configuration
    fn apply_args_to_config(config: &mut Config, args: &CliArgs) {
        if let Some(format_str) = &args.format {
            config.display.format = Self::parse_output_format(format_str);
        }

        if args.no_color {
            config.display.color_output = false;
        }

        config.logging.level = if args.very_verbose {
            LogLevel::Trace
        } else if args.verbose {
            LogLevel::Debug
        } else if args.quiet {
            LogLevel::Error
        } else {
            config.logging.level
        };

        if let Some(path) = &args.capability {
            config.capability.file = Some(path.clone());
        }
    }

    /// Parse output format string
    fn parse_output_format(format_str: &str) -> OutputFormat {
        match format_str.to_lowercase().as_str() {
            "plain" => OutputFormat::Plain,
            "json" => OutputFormat::Json,
            "json-pretty" | "jsonpretty" => OutputFormat::JsonPretty,
            "table" => OutputFormat::Table,
            _ => {
                eprintln!("Warning: Unknown format '{format_str}', using default");
                OutputFormat::Plain
            }
        }
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Get the CLI arguments
    pub fn args(&self) -> &CliArgs {
        &self.args
    }

    /// Build the capability store, loading the configured statement file if
    /// one is set. A missing file is an error; an unset file just means an
    /// empty store.
    pub fn build_store(&self) -> Result<CapabilityStore> {
        let store = CapabilityStore::new();
        if let Some(path) = &self.config.capability.file {
            let json = std::fs::read_to_string(path)?;
            store.load_json(&json)?;
        }
        Ok(store)
    }

    /// Handle subcommands
    ///
    /// # Returns
    /// * `Result<bool>` - True if a subcommand was handled, false to start
    ///   the interactive console
    pub fn handle_subcommand(&self) -> Result<bool> {
        match &self.args.command {
            Some(Commands::Classify { query, cursor }) => {
                let engine = self.build_engine()?;
                let parsed = engine.classify(query, cursor.unwrap_or(query.len()));
                println!("{}", self.formatter().format_parsed(&parsed)?);
                Ok(true)
            }
            Some(Commands::Suggest { query, cursor, limit }) => {
                let engine = self.build_engine()?;
                let (_, mut suggestions) =
                    engine.suggest_at(query, cursor.unwrap_or(query.len()));
                suggestions.truncate(limit.unwrap_or(self.config.display.max_suggestions));
                println!("{}", self.formatter().format_suggestions(&suggestions)?);
                Ok(true)
            }
            Some(Commands::Apply { query, cursor, pick }) => {
                let edit = self.run_apply(query, *cursor, pick.as_deref())?;
                println!("{}", self.formatter().format_edit(&edit)?);
                Ok(true)
            }
            Some(Commands::Version) => {
                self.show_version();
                Ok(true)
            }
            Some(Commands::Completion { shell }) => {
                generate_completion(shell)?;
                Ok(true)
            }
            Some(Commands::Config { show, validate }) => {
                self.handle_config_command(*show, *validate)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn build_engine(&self) -> Result<SuggestionEngine> {
        Ok(SuggestionEngine::new(Arc::new(self.build_store()?)))
    }

    fn formatter(&self) -> Formatter {
        Formatter::new(self.config.display.format, self.config.display.color_output)
    }

    fn run_apply(
        &self,
        query: &str,
        cursor: Option<usize>,
        pick: Option<&str>,
    ) -> Result<crate::completion::AppliedEdit> {
        let engine = self.build_engine()?;
        let cursor = cursor.unwrap_or(query.len());
        let (_, suggestions) = engine.suggest_at(query, cursor);

        let suggestion = match pick {
            Some(label) => suggestions
                .iter()
                .find(|s| s.label.eq_ignore_ascii_case(label))
                .ok_or_else(|| {
                    FhirSearchError::Generic(format!("no suggestion labelled '{label}'"))
                })?,
            None => suggestions
                .first()
                .ok_or_else(|| FhirSearchError::Generic("no suggestions to apply".to_string()))?,
        };

        engine.apply(query, cursor, suggestion)
    }

    /// Show version information
    fn show_version(&self) {
        println!("fhirsearch version {}", env!("CARGO_PKG_VERSION"));
    }

    /// Handle config subcommand
    fn handle_config_command(&self, show: bool, validate: bool) -> Result<()> {
        if validate {
            self.validate_config_file()?;
        }

        if show {
            self.show_config()?;
        }

        Ok(())
    }

    /// Validate configuration file
    fn validate_config_file(&self) -> Result<()> {
        let path = self.get_config_path();
        println!("Validating configuration file: {}", path.display());

        if !path.exists() {
            println!("Configuration file does not exist");
            return Ok(());
        }

        match Config::from_file(&path) {
            Ok(_) => println!("Configuration is valid"),
            Err(e) => println!("Configuration validation failed: {e}"),
        }

        Ok(())
    }

    /// Show effective configuration
    fn show_config(&self) -> Result<()> {
        let path = self.get_config_path();
        println!("Configuration file: {}", path.display());
        println!();

        match toml::to_string_pretty(&self.config) {
            Ok(toml_str) => println!("{toml_str}"),
            Err(e) => {
                eprintln!("Error formatting configuration: {e}");
                println!("{:#?}", self.config);
            }
        }

        Ok(())
    }

    /// Get configuration file path (from args or default)
    fn get_config_path(&self) -> PathBuf {
        self.args
            .config_file
            .clone()
            .unwrap_or_else(Config::default_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_args_parsing() {
        let args = CliArgs::try_parse_from(vec!["fhirsearch"]).unwrap();
        assert!(args.command.is_none());
        assert!(args.capability.is_none());
    }

    #[test]
    fn test_cli_args_with_flags() {
        let args = CliArgs::try_parse_from(vec!["fhirsearch", "--no-color", "--quiet"]).unwrap();
        assert!(args.no_color);
        assert!(args.quiet);
    }

    #[test]
    fn test_classify_subcommand() {
        let args =
            CliArgs::try_parse_from(vec!["fhirsearch", "classify", "/Pat", "--cursor", "4"])
                .unwrap();
        match args.command {
            Some(Commands::Classify { query, cursor }) => {
                assert_eq!(query, "/Pat");
                assert_eq!(cursor, Some(4));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_apply_subcommand_with_pick() {
        let args = CliArgs::try_parse_from(vec![
            "fhirsearch",
            "apply",
            "Patient?_c",
            "--pick",
            "_count",
        ])
        .unwrap();
        match args.command {
            Some(Commands::Apply { query, cursor, pick }) => {
                assert_eq!(query, "Patient?_c");
                assert_eq!(cursor, None);
                assert_eq!(pick.as_deref(), Some("_count"));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_args_override_config() {
        let args =
            CliArgs::try_parse_from(vec!["fhirsearch", "--format", "json", "--no-color", "-v"])
                .unwrap();
        let mut config = Config::default();
        CliInterface::apply_args_to_config(&mut config, &args);
        assert_eq!(config.display.format, OutputFormat::Json);
        assert!(!config.display.color_output);
        assert_eq!(config.logging.level, LogLevel::Debug);
    }

    #[test]
    fn test_parse_output_format() {
        assert_eq!(
            CliInterface::parse_output_format("json-pretty"),
            OutputFormat::JsonPretty
        );
        assert_eq!(CliInterface::parse_output_format("TABLE"), OutputFormat::Table);
        assert_eq!(CliInterface::parse_output_format("nope"), OutputFormat::Plain);
    }

    #[test]
    fn test_run_apply_end_to_end() {
        let args = CliArgs::try_parse_from(vec!["fhirsearch"]).unwrap();
        let cli = CliInterface {
            args,
            config: Config::default(),
        };
        let edit = cli.run_apply("Patient?_c", None, Some("_count")).unwrap();
        assert_eq!(edit.new_query, "Patient?_count=");
    }

    #[test]
    fn test_run_apply_unknown_pick_fails() {
        let args = CliArgs::try_parse_from(vec!["fhirsearch"]).unwrap();
        let cli = CliInterface {
            args,
            config: Config::default(),
        };
        assert!(cli.run_apply("Patient?_c", None, Some("bogus")).is_err());
    }
}
