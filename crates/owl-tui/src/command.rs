//! Input modes and command-line parsing

/// Current input mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// Keys go to the screen reader
    #[default]
    Normal,
    /// Command line (`:` prefix)
    Command,
    /// Help panel shown; any key closes it
    Help,
}

impl Mode {
    /// Get the mode indicator string
    pub fn indicator(&self) -> &'static str {
        match self {
            Mode::Normal => "READER",
            Mode::Command => "COMMAND",
            Mode::Help => "HELP",
        }
    }
}

/// Parsed command from command mode
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Quit the application
    Quit,
    /// Open a URL or file
    Open(String),
    /// Scan the page again
    Rescan,
    /// Set a configuration option
    Set(String, String),
    /// Show the keyboard help
    Help,
    /// Unknown command
    Unknown(String),
    /// Empty command
    Empty,
}

impl Command {
    /// Parse a command string
    pub fn parse(input: &str) -> Self {
        let input = input.trim();
        if input.is_empty() {
            return Command::Empty;
        }

        let (cmd, arg) = match input.split_once(' ') {
            Some((cmd, arg)) => (cmd, Some(arg.trim()).filter(|a| !a.is_empty())),
            None => (input, None),
        };

        match cmd {
            "q" | "quit" | "exit" => Command::Quit,
            "o" | "open" | "e" | "edit" => match arg {
                Some(source) => Command::Open(source.to_string()),
                None => Command::Unknown("open requires a URL or path".to_string()),
            },
            "rescan" | "r" => Command::Rescan,
            "help" | "h" => Command::Help,
            "set" => match arg.and_then(|setting| setting.split_once('=')) {
                Some((key, value)) => Command::Set(key.trim().to_string(), value.trim().to_string()),
                None => Command::Unknown("set requires key=value format".to_string()),
            },
            _ => Command::Unknown(cmd.to_string()),
        }
    }
}
