use std::{
    io::{self, BufRead, Write},
    process::exit,
};

use rustyline::{error::ReadlineError, DefaultEditor};

use crate::error::CsrError;

/// Source of operator answers.
pub trait LineSource {
    /// Reads one line. `None` means the input is exhausted.
    fn read_line(&mut self, prompt: &str) -> Result<Option<String>, CsrError>;

    /// Reads one line without echoing it back.
    fn read_secret(&mut self, prompt: &str) -> Result<String, CsrError>;
}

impl LineSource for DefaultEditor {
    fn read_line(&mut self, prompt: &str) -> Result<Option<String>, CsrError> {
        match self.readline(prompt) {
            Ok(line) => Ok(Some(line)),
            Err(ReadlineError::Eof) => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn read_secret(&mut self, prompt: &str) -> Result<String, CsrError> {
        rpassword::prompt_password(prompt).map_err(CsrError::PasswordPrompt)
    }
}

/// Plain stdin, for when the line editor can't be set up.
impl LineSource for io::Stdin {
    fn read_line(&mut self, prompt: &str) -> Result<Option<String>, CsrError> {
        print!("{prompt}");
        io::stdout().flush().map_err(ReadlineError::Io)?;
        let mut line = String::new();
        match self.lock().read_line(&mut line).map_err(ReadlineError::Io)? {
            0 => Ok(None),
            _ => Ok(Some(line.trim_end_matches(['\r', '\n']).to_owned())),
        }
    }

    fn read_secret(&mut self, prompt: &str) -> Result<String, CsrError> {
        rpassword::prompt_password(prompt).map_err(CsrError::PasswordPrompt)
    }
}

/// Free text answer, end of input reads as empty.
pub fn prompt_string(
    input: &mut impl LineSource,
    question: &str,
) -> Result<String, CsrError> {
    Ok(input.read_line(question)?.unwrap_or_default())
}

pub fn prompt_selection(
    input: &mut impl LineSource,
    question: &str,
) -> Result<u32, CsrError> {
    let answer = input.read_line(question)?.ok_or(CsrError::InputClosed)?;
    answer
        .trim()
        .parse()
        .map_err(|source| CsrError::InvalidSelection {
            input: answer.clone(),
            source,
        })
}

/// Prints `message`, waits for the operator to press Enter and exits with 1.
pub fn exit_with_msg(input: &mut impl LineSource, message: &str) -> ! {
    eprintln!("{message}");
    let _ = input.read_line("Press Enter to exit the application");
    exit(1)
}

#[cfg(test)]
pub mod scripted {
    use std::collections::VecDeque;

    use super::LineSource;
    use crate::error::CsrError;

    /// Replays canned answers in order.
    #[derive(Debug, Default)]
    pub struct ScriptedInput {
        lines: VecDeque<String>,
        secrets: VecDeque<String>,
        pub prompts: Vec<String>,
    }

    impl ScriptedInput {
        pub fn new(lines: &[&str]) -> Self {
            Self {
                lines: lines.iter().map(|line| line.to_string()).collect(),
                ..Default::default()
            }
        }

        pub fn with_secret(mut self, secret: &str) -> Self {
            self.secrets.push_back(secret.to_owned());
            self
        }

        pub fn remaining(&self) -> usize {
            self.lines.len()
        }
    }

    impl LineSource for ScriptedInput {
        fn read_line(
            &mut self,
            prompt: &str,
        ) -> Result<Option<String>, CsrError> {
            self.prompts.push(prompt.to_owned());
            Ok(self.lines.pop_front())
        }

        fn read_secret(&mut self, prompt: &str) -> Result<String, CsrError> {
            self.prompts.push(prompt.to_owned());
            self.secrets.pop_front().ok_or(CsrError::InputClosed)
        }
    }
}
