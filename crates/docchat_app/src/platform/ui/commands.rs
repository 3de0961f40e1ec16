use std::path::PathBuf;

/// One line of terminal input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Upload(PathBuf),
    /// Free text: a path on the upload screen, a question in the chat.
    Text(String),
    Suggest(usize),
    Sources(u64),
    Reset,
    Back,
    Help,
    Quit,
    Empty,
}

pub fn parse(line: &str) -> Result<Command, String> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(Command::Empty);
    }

    let (head, rest) = match line.split_once(char::is_whitespace) {
        Some((head, rest)) => (head, rest.trim()),
        None => (line, ""),
    };

    match head {
        "upload" | "/upload" => {
            if rest.is_empty() {
                Err("usage: upload <path>".to_string())
            } else {
                Ok(Command::Upload(PathBuf::from(rest)))
            }
        }
        "/suggest" => rest
            .parse::<usize>()
            .ok()
            .filter(|n| *n > 0)
            .map(Command::Suggest)
            .ok_or_else(|| "usage: /suggest <n>".to_string()),
        "/sources" => rest
            .parse::<u64>()
            .map(Command::Sources)
            .map_err(|_| "usage: /sources <message id>".to_string()),
        "/reset" => Ok(Command::Reset),
        "/back" => Ok(Command::Back),
        "/help" => Ok(Command::Help),
        "/quit" | "/exit" => Ok(Command::Quit),
        other if other.starts_with('/') => Err(format!("unknown command {other}; try /help")),
        _ => Ok(Command::Text(line.to_string())),
    }
}
