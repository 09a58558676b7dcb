//! Inbound command vocabulary.
//!
//! The host forwards generic `do_command` requests as a name → argument
//! map. The controller recognizes `start` and `stop`; anything else is
//! echoed back as `false` in the result map.

/// Commands the controller understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Start the control loop (no-op if already running).
    Start,
    /// Stop the control loop (no-op if idle).
    Stop,
}

impl Command {
    /// Parse a command name. Arguments are ignored — neither command
    /// takes any.
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "start" => Some(Self::Start),
            "stop" => Some(Self::Stop),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_names_parse() {
        assert_eq!(Command::parse("start"), Some(Command::Start));
        assert_eq!(Command::parse("stop"), Some(Command::Stop));
    }

    #[test]
    fn unknown_names_do_not_parse() {
        assert_eq!(Command::parse("restart"), None);
        assert_eq!(Command::parse("START"), None);
        assert_eq!(Command::parse(""), None);
    }
}
