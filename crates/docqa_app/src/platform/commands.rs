use std::path::PathBuf;

pub const HELP_TEXT: &str = "\
Commands:
  file <path>      select a .txt or .pdf document to upload (clears pasted text)
  text <content>   use <content> as the document (clears the selected file)
  paste            paste a multi-line document; finish with a line containing only `.`
  process          send the selected document to the backend
  ask [question]   ask a question; without one, re-asks the current question
  show             print the current state
  help             print this help
  quit             exit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    SelectFile(PathBuf),
    SetText(String),
    Process,
    Ask(Option<String>),
    Show,
    Help,
    Quit,
    Invalid(String),
}

/// Turns input lines into commands. Stateful only while a `paste` block is
/// being collected.
#[derive(Debug, Default)]
pub struct CommandParser {
    paste: Option<Vec<String>>,
}

impl CommandParser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_pasting(&self) -> bool {
        self.paste.is_some()
    }

    pub fn feed(&mut self, line: &str) -> Option<Command> {
        if let Some(buffer) = self.paste.as_mut() {
            if line.trim_end() == "." {
                let text = buffer.join("\n");
                self.paste = None;
                return Some(Command::SetText(text));
            }
            buffer.push(line.trim_end_matches(['\r', '\n']).to_string());
            return None;
        }

        let line = line.trim();
        if line.is_empty() {
            return None;
        }
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };

        let command = match word.to_ascii_lowercase().as_str() {
            "file" if rest.is_empty() => Command::Invalid("usage: file <path>".to_string()),
            "file" => Command::SelectFile(PathBuf::from(rest)),
            "text" => Command::SetText(rest.to_string()),
            "paste" => {
                self.paste = Some(Vec::new());
                return None;
            }
            "process" => Command::Process,
            "ask" if rest.is_empty() => Command::Ask(None),
            "ask" => Command::Ask(Some(rest.to_string())),
            "show" => Command::Show,
            "help" | "?" => Command::Help,
            "quit" | "exit" => Command::Quit,
            other => Command::Invalid(format!("unknown command `{other}`; type `help`")),
        };
        Some(command)
    }

    /// Ends input; an unfinished paste block is kept rather than dropped.
    pub fn finish(&mut self) -> Option<Command> {
        self.paste
            .take()
            .map(|buffer| Command::SetText(buffer.join("\n")))
    }
}
