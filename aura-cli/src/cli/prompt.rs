//! Line-oriented console used by the interactive flow.
//!
//! The interactive flow is a fixed sequence of questions: any missing
//! positional values, then (in debug mode) model, instruction and chunk size,
//! then a final yes/no confirmation. [`Step`] enumerates that sequence.

use std::io::{self, BufRead, Write};

/// Question asked at each point of the interactive flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Step {
    Entity,
    Input,
    Output,
    Model,
    Instruction,
    ChunkSize,
    Confirm,
}

impl Step {
    /// The step after `self`, or `None` once confirmation has been asked.
    pub(super) const fn next(self) -> Option<Self> {
        match self {
            Self::Entity => Some(Self::Input),
            Self::Input => Some(Self::Output),
            Self::Output => Some(Self::Model),
            Self::Model => Some(Self::Instruction),
            Self::Instruction => Some(Self::ChunkSize),
            Self::ChunkSize => Some(Self::Confirm),
            Self::Confirm => None,
        }
    }

    /// Whether the step is only asked in debug mode.
    pub(super) const fn debug_only(self) -> bool {
        matches!(self, Self::Model | Self::Instruction | Self::ChunkSize)
    }
}

/// Buffered question/answer channel over any reader and writer.
///
/// # Examples
/// ```
/// use std::io::Cursor;
/// use aura_cli::cli::Console;
///
/// let mut console = Console::new(Cursor::new("orders.txt\n"), Vec::new());
/// let answer = console.ask("Please enter the input file path: ")?;
/// assert_eq!(answer, "orders.txt");
/// assert_eq!(console.output().as_slice(), b"Please enter the input file path: ");
/// # Ok::<(), std::io::Error>(())
/// ```
#[derive(Debug)]
pub struct Console<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Console<R, W> {
    /// Wraps `input` and `output`.
    pub const fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Returns the output half, for progress lines and summaries.
    pub fn output(&mut self) -> &mut W {
        &mut self.output
    }

    /// Writes one line.
    ///
    /// # Errors
    /// Propagates write failures.
    pub fn say(&mut self, line: &str) -> io::Result<()> {
        writeln!(self.output, "{line}")?;
        self.output.flush()
    }

    /// Writes `question` without a newline and reads one answer line with
    /// its line terminator removed.
    ///
    /// # Errors
    /// Returns [`io::ErrorKind::UnexpectedEof`] when input is exhausted, and
    /// propagates read or write failures.
    pub fn ask(&mut self, question: &str) -> io::Result<String> {
        write!(self.output, "{question}")?;
        self.output.flush()?;
        let mut answer = String::new();
        if self.input.read_line(&mut answer)? == 0 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "input closed before an answer was given",
            ));
        }
        let trimmed = answer.trim_end_matches(['\n', '\r']).len();
        answer.truncate(trimmed);
        Ok(answer)
    }

    /// Like [`Self::ask`], returning `default` when the answer is blank.
    ///
    /// # Errors
    /// See [`Self::ask`].
    pub fn ask_or(&mut self, question: &str, default: &str) -> io::Result<String> {
        let answer = self.ask(question)?;
        if answer.trim().is_empty() {
            Ok(default.to_owned())
        } else {
            Ok(answer)
        }
    }

    /// Asks a yes/no question. `yes`, `y`, and a blank answer accept, in
    /// any letter case; everything else declines.
    ///
    /// # Errors
    /// See [`Self::ask`].
    pub fn confirm(&mut self, question: &str) -> io::Result<bool> {
        let answer = self.ask(question)?;
        Ok(is_affirmative(&answer))
    }
}

pub(super) fn is_affirmative(answer: &str) -> bool {
    matches!(
        answer.trim().to_ascii_lowercase().as_str(),
        "yes" | "y" | ""
    )
}
