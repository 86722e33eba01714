//! typeconv REPL: check raw configuration values against a type signature.
//!
//! Pick a signature with `/type`, then type values. Each value is validated
//! at offset 0 and its diagnostics are printed as `[start..end] code: message`.
//!
//! - Meta-commands: `/type`, `/parse`, `/status`, `/reset`, `/help`, `/quit`

pub mod config;
pub mod paths;

use std::sync::Arc;

use anyhow::{Context, Result};
use owo_colors::OwoColorize;
use rustyline::error::ReadlineError;
use rustyline::history::DefaultHistory;
use rustyline::Editor;
use tracing::debug;

use typeconv_kernel::{parse_signature, ConverterSession, ResolveError};
use typeconv_types::Diagnostic;

pub use config::ReplConfig;

/// REPL state: one session over an in-memory project, plus the current signature.
pub struct Repl {
    session: ConverterSession,
    signature: Option<String>,
    quit: bool,
}

impl Repl {
    /// Create a REPL from the user's config file.
    pub fn new() -> Result<Self> {
        Ok(Self::with_config(&ReplConfig::load()?))
    }

    pub fn with_config(config: &ReplConfig) -> Self {
        let project = Arc::new(config.project());
        Self {
            session: ConverterSession::new(project, config.session_config()),
            signature: config.signature.clone(),
            quit: false,
        }
    }

    /// The signature values are currently checked against.
    pub fn signature(&self) -> Option<&str> {
        self.signature.as_deref()
    }

    pub fn should_quit(&self) -> bool {
        self.quit
    }

    /// Process a single line of input.
    pub fn process_line(&mut self, line: &str) -> Result<Option<String>> {
        let trimmed = line.trim();

        if trimmed.starts_with('/') {
            return self.handle_meta_command(trimmed);
        }
        if trimmed.is_empty() {
            return Ok(None);
        }

        let Some(signature) = &self.signature else {
            return Ok(Some(
                "No signature set. Use /type <signature> first.".to_string(),
            ));
        };

        // The raw line is the value: surrounding spaces are part of it.
        let value = line.trim_end_matches(['\r', '\n']);
        let mut diagnostics: Vec<Diagnostic> = Vec::new();
        match self.session.try_validate(value, signature, 0, &mut diagnostics) {
            Ok(()) if diagnostics.is_empty() => {
                if self.session.has_capability() {
                    Ok(Some("ok".to_string()))
                } else {
                    Ok(Some("unchecked (no conversion capability)".to_string()))
                }
            }
            Ok(()) => Ok(Some(format_diagnostics(&diagnostics))),
            Err(error) => Ok(Some(format!("Error: {error}"))),
        }
    }

    fn handle_meta_command(&mut self, cmd: &str) -> Result<Option<String>> {
        let (command, arg) = match cmd.split_once(char::is_whitespace) {
            Some((command, arg)) => (command, arg.trim()),
            None => (cmd, ""),
        };

        match command {
            "/quit" | "/q" | "/exit" => {
                self.quit = true;
                Ok(None)
            }
            "/help" | "/h" | "/?" => Ok(Some(HELP_TEXT.to_string())),
            "/type" | "/t" => Ok(Some(self.set_type(arg))),
            "/parse" | "/p" => {
                let signature = if arg.is_empty() {
                    self.signature.as_deref().unwrap_or_default()
                } else {
                    arg
                };
                match parse_signature(signature) {
                    Ok(descriptor) => Ok(Some(
                        serde_json::to_string_pretty(&descriptor)
                            .context("serializing descriptor")?,
                    )),
                    Err(error) => Ok(Some(format!("Parse error: {error}"))),
                }
            }
            "/status" => Ok(Some(self.status())),
            "/reset" => {
                self.session.reset();
                Ok(Some("Session reset; capability will be rediscovered.".to_string()))
            }
            _ => Ok(Some(format!(
                "Unknown command: {command}\nType /help for available commands."
            ))),
        }
    }

    /// Resolve and select a signature. A signature that fails to resolve is
    /// not selected.
    fn set_type(&mut self, arg: &str) -> String {
        if arg.is_empty() {
            return match &self.signature {
                Some(signature) => format!("Current signature: {signature}"),
                None => "No signature set.".to_string(),
            };
        }

        match self.session.validator_for(arg) {
            Ok(Some(validator)) => {
                debug!(signature = arg, %validator, "signature selected");
                self.signature = Some(arg.to_string());
                format!("{arg}\n  {validator}")
            }
            Ok(None) => {
                self.signature = Some(arg.to_string());
                format!("{arg}\n  (no conversion capability; values will not be checked)")
            }
            Err(error @ ResolveError::Syntax(_)) => format!("Parse error: {error}"),
            Err(error) => format!("Error: {error}"),
        }
    }

    fn status(&self) -> String {
        let provider = self
            .session
            .bridge()
            .get_capability()
            .map(|c| c.provider().to_string())
            .unwrap_or_else(|| "(none)".to_string());

        format!(
            "Project:    {}\nProvider:   {}\nSignature:  {}\nCached:     {} validator(s)",
            self.session.bridge().project().name(),
            provider,
            self.signature.as_deref().unwrap_or("(none)"),
            self.session.cached_validators(),
        )
    }
}

fn format_diagnostics(diagnostics: &[Diagnostic]) -> String {
    diagnostics
        .iter()
        .map(|d| d.to_string())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Color diagnostic lines for the terminal.
fn paint(output: &str) -> String {
    output
        .lines()
        .map(|line| {
            if line.starts_with('[') || line.starts_with("Error") || line.starts_with("Parse error") {
                line.red().to_string()
            } else if line == "ok" {
                line.green().to_string()
            } else {
                line.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

const HELP_TEXT: &str = r#"typeconv: check configuration values against Java type signatures

Commands:
  /help, /h, /?        Show this help
  /quit, /q, /exit     Exit the REPL
  /type, /t <sig>      Select the signature values are checked against
  /parse, /p [sig]     Show the parsed descriptor as JSON
  /status              Show project, capability provider and cache size
  /reset               Drop the capability and all cached validators

Anything else is a raw value, validated against the current signature.

Examples:
  /type java.util.List<java.lang.Integer>
  1,2X,3x,4
  /type java.util.Optional<double>
  1.5
"#;

/// Run the REPL.
pub fn run() -> Result<()> {
    println!("typeconv v{}", env!("CARGO_PKG_VERSION"));
    println!("Type /help for commands, /quit to exit.\n");

    let mut rl: Editor<(), DefaultHistory> = Editor::new().context("Failed to create editor")?;

    let history_path = paths::history_file();
    let _ = rl.load_history(&history_path);

    let mut repl = Repl::new()?;

    loop {
        let prompt = match repl.signature() {
            Some(signature) => format!("{signature}> "),
            None => "typeconv> ".to_string(),
        };

        match rl.readline(&prompt) {
            Ok(line) => {
                let _ = rl.add_history_entry(line.as_str());

                match repl.process_line(&line) {
                    Ok(Some(output)) => println!("{}", paint(&output)),
                    Ok(None) => {}
                    Err(e) => eprintln!("Error: {e}"),
                }
                if repl.should_quit() {
                    break;
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("^C");
                continue;
            }
            Err(ReadlineError::Eof) => {
                println!("^D");
                break;
            }
            Err(err) => {
                eprintln!("Error: {err}");
                break;
            }
        }
    }

    if let Some(parent) = history_path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }
    let _ = rl.save_history(&history_path);

    Ok(())
}
