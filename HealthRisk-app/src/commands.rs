use std::str::FromStr;

use thiserror::Error;

/// A line of user input, parsed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Edit a field: `set <field> [value]`
    Set { field: String, value: String },
    /// Click a checkbox: `toggle <field>`
    Toggle { field: String },
    /// Show the current form
    ShowForm,
    /// Send the form to the prediction service
    Submit,
    /// Show the assessment panel
    ShowResult,
    /// Query the prediction service health endpoint
    Health,
    /// Describe the models behind the prediction service
    ModelInfo,
    Help,
    Quit,
}

/// Command parsing errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("Empty command")]
    Empty,

    #[error("Unknown command '{0}'. Type 'help' for a list of commands.")]
    Unknown(String),

    #[error("Usage: {0}")]
    Usage(&'static str),
}

impl FromStr for Command {
    type Err = CommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let (verb, rest) = match line.split_once(char::is_whitespace) {
            Some((verb, rest)) => (verb, rest.trim()),
            None => (line, ""),
        };

        match verb.to_ascii_lowercase().as_str() {
            "" => Err(CommandError::Empty),
            "set" => {
                let (field, value) = match rest.split_once(char::is_whitespace) {
                    Some((field, value)) => (field, value.trim()),
                    None => (rest, ""),
                };
                if field.is_empty() {
                    return Err(CommandError::Usage("set <field> [value]"));
                }
                Ok(Command::Set {
                    field: field.to_string(),
                    value: value.to_string(),
                })
            }
            "toggle" => {
                if rest.is_empty() || rest.contains(char::is_whitespace) {
                    return Err(CommandError::Usage("toggle <field>"));
                }
                Ok(Command::Toggle {
                    field: rest.to_string(),
                })
            }
            "form" | "show" => Ok(Command::ShowForm),
            "submit" | "predict" => Ok(Command::Submit),
            "result" | "results" => Ok(Command::ShowResult),
            "health" => Ok(Command::Health),
            "model-info" | "models" => Ok(Command::ModelInfo),
            "help" | "?" => Ok(Command::Help),
            "quit" | "exit" => Ok(Command::Quit),
            other => Err(CommandError::Unknown(other.to_string())),
        }
    }
}

/// Parse one line of input
pub fn parse_command(line: &str) -> Result<Command, CommandError> {
    line.parse()
}
