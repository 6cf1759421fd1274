//! REPL input parsing
//!
//! A line starting with `/` is a command: the first word names it and the
//! rest are whitespace-separated arguments. Anything else is a chat message.
//! Free-text arguments (`rest`) are sliced from the typed line, so spacing
//! inside them is kept.

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandInvocation {
    pub name: String,
    pub args: Vec<String>,
    /// Everything after the command name, trimmed
    raw_args: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Empty,
    Chat(String),
    Command(CommandInvocation),
}

impl CommandInvocation {
    pub fn new(name: &str, args: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            args: args.iter().map(|a| a.to_string()).collect(),
            raw_args: args.join(" "),
        }
    }

    pub fn arg(&self, index: usize) -> Option<&str> {
        self.args.get(index).map(String::as_str)
    }

    /// Typed text from argument `index` on
    pub fn rest(&self, index: usize) -> Option<String> {
        let mut remaining = self.raw_args.as_str();
        for _ in 0..index {
            remaining = remaining.trim_start();
            let end = remaining.find(char::is_whitespace).unwrap_or(remaining.len());
            remaining = &remaining[end..];
        }

        let rest = remaining.trim();
        if rest.is_empty() {
            None
        } else {
            Some(rest.to_string())
        }
    }
}

pub fn parse_input(line: &str) -> Input {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Input::Empty;
    }

    let Some(command) = trimmed.strip_prefix('/') else {
        return Input::Chat(line.trim_end_matches(['\r', '\n']).to_string());
    };

    let end = command.find(char::is_whitespace).unwrap_or(command.len());
    let (name, raw_args) = command.split_at(end);
    Input::Command(CommandInvocation {
        name: name.to_ascii_lowercase(),
        args: raw_args.split_whitespace().map(str::to_string).collect(),
        raw_args: raw_args.trim().to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_chat_and_empty() {
        assert_eq!(parse_input("   "), Input::Empty);
        assert_eq!(
            parse_input("Why are my basil leaves yellow?\n"),
            Input::Chat("Why are my basil leaves yellow?".into())
        );
    }

    #[test]
    fn test_parse_command() {
        let Input::Command(invocation) = parse_input("/Remind 3  09:00 Fiddle Leaf") else {
            panic!("expected a command");
        };
        assert_eq!(invocation.name, "remind");
        assert_eq!(invocation.arg(0), Some("3"));
        assert_eq!(invocation.arg(1), Some("09:00"));
        assert_eq!(invocation.rest(2).as_deref(), Some("Fiddle Leaf"));
        assert_eq!(invocation.rest(4), None);
        assert_eq!(invocation.rest(9), None);
    }

    #[test]
    fn test_rest_keeps_typed_spacing() {
        let Input::Command(invocation) = parse_input("/edit 3 Water  it\tweekly,   not daily ") else {
            panic!("expected a command");
        };
        assert_eq!(invocation.arg(0), Some("3"));
        assert_eq!(invocation.rest(1).as_deref(), Some("Water  it\tweekly,   not daily"));
        assert_eq!(invocation.rest(0).as_deref(), Some("3 Water  it\tweekly,   not daily"));

        let built = CommandInvocation::new("garden", &["add", "Cherry", "Tomato"]);
        assert_eq!(built.rest(1).as_deref(), Some("Cherry Tomato"));
    }

    #[test]
    fn test_bare_slash() {
        assert_eq!(parse_input("/"), Input::Command(CommandInvocation::new("", &[])));
    }
}
