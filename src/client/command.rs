//! REPL input parsing.

/// One line of REPL input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `.tables`: list tables with their selection state
    Tables,
    /// `.toggle <n|name>...`
    Toggle(Vec<String>),
    /// `.all`
    All,
    /// `.none`
    None,
    /// `.schema`: print the full schema text
    Schema,
    /// `.reload`: fetch the schema again
    Reload,
    Help,
    Quit,
    /// Anything that is not a dot command
    Question(String),
}

impl Command {
    /// Parse a non-empty, trimmed input line.
    pub fn parse(line: &str) -> Result<Command, String> {
        let line = line.trim();
        let Some(rest) = line.strip_prefix('.') else {
            return Ok(Command::Question(line.to_string()));
        };

        let mut words = rest.split_whitespace();
        let name = words.next().unwrap_or_default().to_ascii_lowercase();
        let args: Vec<String> = words.map(str::to_string).collect();

        let command = match name.as_str() {
            "tables" | "t" => Command::Tables,
            "toggle" | "s" => {
                if args.is_empty() {
                    return Err(".toggle needs at least one table number or name".to_string());
                }
                return Ok(Command::Toggle(args));
            }
            "all" => Command::All,
            "none" => Command::None,
            "schema" => Command::Schema,
            "reload" => Command::Reload,
            "help" | "h" | "?" => Command::Help,
            "quit" | "q" | "exit" => Command::Quit,
            other => return Err(format!("Unknown command: .{other} (type .help)")),
        };

        if !args.is_empty() {
            return Err(format!(".{name} takes no arguments"));
        }
        Ok(command)
    }
}

pub const HELP: &str = "\
Commands:
  .tables             List tables (* = selected)
  .toggle <n|name>... Select/deselect tables by number or name
  .all                Select every table
  .none               Clear the selection
  .schema             Print the full schema
  .reload             Fetch the schema again
  .help               Show this help
  .quit               Exit

Any other line is sent as a question about the selected tables.";
