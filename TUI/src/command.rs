use crate::action::Action;

pub struct CommandParser;

impl CommandParser {
    pub fn parse(input: &str) -> Result<Action, String> {
        let input = input.trim();
        if !input.starts_with('/') {
            return Err("Not a command".to_string());
        }

        let (cmd, args) = input.split_once(' ').unwrap_or((input, ""));
        let args = args.trim();

        match cmd {
            "/select" => {
                if args.is_empty() {
                    Err("Usage: /select <layer id>\n  Example: /select network".to_string())
                } else {
                    Ok(Action::Select { id: args.to_string() })
                }
            }
            "/deselect" => Ok(Action::Deselect),
            "/generate" => Ok(Action::Generate),
            "/copy" => Ok(Action::CopyChecklist),
            "/activity" => Ok(Action::ToggleActivity),
            "/help" => Ok(Action::Help),
            "/quit" => Ok(Action::Quit),
            _ => Err(format!("Unknown command: {}. Type /help for available commands.", cmd)),
        }
    }
}
