//! Interactive query console
//!
//! This module provides the interactive mode:
//! - Line editing and history with reedline
//! - Tab-completion through the suggestion engine
//! - Query syntax highlighting
//! - Console commands (load, clear, explain, help, exit)
//!
//! Any input that is not a console command is treated as a query: it is
//! classified at the end-of-line cursor position and the top suggestions
//! are printed.

mod completer;
mod highlighter;
mod prompt;

use std::sync::Arc;

use reedline::{
    ColumnarMenu, Emacs, FileBackedHistory, KeyCode, KeyModifiers, MenuBuilder, Reedline,
    ReedlineEvent, ReedlineMenu, Signal, default_emacs_keybindings,
};
use tracing::info;

use crate::capability::CapabilityStore;
use crate::completion::SuggestionEngine;
use crate::config::Config;
use crate::error::{FhirSearchError, Result};
use crate::formatter::Formatter;

pub use completer::QueryCompleter;
pub use highlighter::QueryHighlighter;
pub use prompt::SearchPrompt;

const COMPLETION_MENU: &str = "completion_menu";

/// Interactive console over the completion engine
pub struct Console {
    /// Line editor
    editor: Reedline,

    /// Capability store shared with the completer
    store: Arc<CapabilityStore>,

    /// Suggestion engine for explain and query output
    engine: SuggestionEngine,

    /// Output formatter
    formatter: Formatter,

    /// Maximum number of suggestions printed per query
    max_suggestions: usize,

    /// Whether to continue running
    running: bool,
}

impl Console {
    /// Create a new console
    ///
    /// # Arguments
    /// * `config` - Loaded configuration
    /// * `store` - Capability store (possibly pre-loaded)
    ///
    /// # Returns
    /// * `Result<Self>` - New console or error
    pub fn new(config: &Config, store: Arc<CapabilityStore>) -> Result<Self> {
        let metadata: Arc<dyn crate::capability::MetadataSource> = store.clone();
        let completer = QueryCompleter::new(metadata.clone(), config.display.max_suggestions);

        let menu = ColumnarMenu::default().with_name(COMPLETION_MENU);

        let mut keybindings = default_emacs_keybindings();
        keybindings.add_binding(
            KeyModifiers::NONE,
            KeyCode::Tab,
            ReedlineEvent::UntilFound(vec![
                ReedlineEvent::Menu(COMPLETION_MENU.to_string()),
                ReedlineEvent::MenuNext,
            ]),
        );

        let history = if config.history.persist {
            FileBackedHistory::with_file(config.history.max_size, config.history.file_path.clone())
        } else {
            FileBackedHistory::new(config.history.max_size)
        }
        .map_err(|e| FhirSearchError::Generic(format!("failed to set up history: {e}")))?;

        let mut editor = Reedline::create()
            .with_completer(Box::new(completer))
            .with_menu(ReedlineMenu::EngineCompleter(Box::new(menu)))
            .with_edit_mode(Box::new(Emacs::new(keybindings)))
            .with_history(Box::new(history));

        if config.display.syntax_highlighting {
            editor = editor.with_highlighter(Box::new(QueryHighlighter::new(true)));
        }

        Ok(Self {
            editor,
            engine: SuggestionEngine::new(metadata),
            store,
            formatter: Formatter::new(config.display.format, config.display.color_output),
            max_suggestions: config.display.max_suggestions,
            running: true,
        })
    }

    /// Run the console until exit
    pub fn run(&mut self) -> Result<()> {
        println!("Type a query for suggestions, 'help' for commands, Tab to complete.");

        while self.running {
            let prompt = SearchPrompt::new(self.store.is_loaded());
            match self.editor.read_line(&prompt) {
                Ok(Signal::Success(line)) => {
                    if let Err(e) = self.handle_line(&line) {
                        eprintln!("Error: {e}");
                    }
                }
                Ok(Signal::CtrlC) => continue,
                Ok(Signal::CtrlD) => break,
                Err(e) => {
                    return Err(FhirSearchError::Generic(format!("console input failed: {e}")));
                }
            }
        }

        Ok(())
    }

    /// Handle a single input line
    fn handle_line(&mut self, line: &str) -> Result<()> {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return Ok(());
        }

        let (command, rest) = match trimmed.split_once(char::is_whitespace) {
            Some((command, rest)) => (command, rest.trim()),
            None => (trimmed, ""),
        };

        match command {
            "exit" | "quit" => {
                self.running = false;
                Ok(())
            }
            "help" => {
                self.print_help();
                Ok(())
            }
            "load" if !rest.is_empty() => self.load_capability(rest),
            "clear" => {
                self.store.clear();
                println!("Capability metadata cleared.");
                Ok(())
            }
            "explain" if !rest.is_empty() => {
                let parsed = self.engine.classify(rest, rest.len());
                println!("{}", self.formatter.format_parsed(&parsed)?);
                Ok(())
            }
            _ => self.show_query(trimmed),
        }
    }

    /// Load a CapabilityStatement JSON file into the store
    fn load_capability(&self, path: &str) -> Result<()> {
        let json = std::fs::read_to_string(path)?;
        self.store.load_json(&json)?;
        let count = self.store.snapshot().map(|s| s.resource_count()).unwrap_or(0);
        info!(path, resources = count, "capability statement loaded");
        println!("Loaded capability statement: {count} resource type(s).");
        Ok(())
    }

    /// Print the classification and top suggestions for a query
    fn show_query(&self, query: &str) -> Result<()> {
        let (parsed, mut suggestions) = self.engine.suggest_at(query, query.len());
        suggestions.truncate(self.max_suggestions);

        println!("context: {}", parsed.context);
        if suggestions.is_empty() {
            println!("no suggestions");
        } else {
            println!("{}", self.formatter.format_suggestions(&suggestions)?);
        }
        Ok(())
    }

    fn print_help(&self) {
        println!("Commands:");
        println!("  load <file>      Load a CapabilityStatement JSON file");
        println!("  clear            Drop the loaded capability metadata");
        println!("  explain <query>  Show how the cursor context is classified");
        println!("  help             Show this help");
        println!("  exit, quit       Leave the console");
        println!();
        println!("Anything else is treated as a query; suggestions are listed for");
        println!("the end-of-line position. Press Tab while typing to complete.");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_console() -> Console {
        let mut config = Config::default();
        config.history.persist = false;
        Console::new(&config, Arc::new(CapabilityStore::new())).unwrap()
    }

    #[test]
    fn test_exit_stops_console() {
        let mut console = test_console();
        assert!(console.running);
        console.handle_line("exit").unwrap();
        assert!(!console.running);
    }

    #[test]
    fn test_blank_line_is_ignored() {
        let mut console = test_console();
        console.handle_line("   ").unwrap();
        assert!(console.running);
    }

    #[test]
    fn test_load_missing_file_is_an_error() {
        let mut console = test_console();
        assert!(console.handle_line("load /nonexistent/cap.json").is_err());
        assert!(!console.store.is_loaded());
    }

    #[test]
    fn test_clear_unloads_store() {
        let console = test_console();
        console
            .store
            .load_json(r#"{"rest": [{"mode": "server", "resource": [{"type": "Patient"}]}]}"#)
            .unwrap();
        assert!(console.store.is_loaded());
        console.store.clear();
        assert!(!console.store.is_loaded());
    }

    #[test]
    fn test_query_line_is_handled() {
        let mut console = test_console();
        console.handle_line("Patient?_c").unwrap();
        console.handle_line("explain /Pat").unwrap();
        assert!(console.running);
    }
}
