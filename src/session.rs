//! Interactive console driver.
//!
//! The input is a stream of whitespace-separated integers: a key count, that
//! many keys to load, then operations as `code key` pairs (1: insert,
//! 2: delete) until the stop code 0 or the end of input. The tree diagram is
//! printed after the initial load and after every operation.

use std::collections::VecDeque;
use std::convert::TryFrom;
use std::io::{self, BufRead, Write};

use log::{debug, info, warn};
use thiserror::Error;

use crate::command::{Command, Opcode};
use crate::tree::AvlTree;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("i/o error: {0}")]
    Io(#[from] io::Error),
    #[error("line {line}: expected {expected}, found {found:?}")]
    InvalidInteger {
        expected: &'static str,
        found: String,
        line: usize,
    },
    #[error("input ended while reading {0}")]
    UnexpectedEof(&'static str),
    #[error("key count must not be negative, found {0}")]
    NegativeCount(i64),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Options {
    /// Print prompts before reading each value.
    pub prompts: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self { prompts: true }
    }
}

pub struct Session<R, W> {
    tokens: Tokens<R>,
    output: W,
    tree: AvlTree<i64>,
    options: Options,
}

struct Tokens<R> {
    reader: R,
    pending: VecDeque<String>,
    line: usize,
}

impl<R: BufRead, W: Write> Session<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self::with_options(input, output, Options::default())
    }

    pub fn with_options(input: R, output: W, options: Options) -> Self {
        Self {
            tokens: Tokens {
                reader: input,
                pending: VecDeque::new(),
                line: 0,
            },
            output,
            tree: AvlTree::new(),
            options,
        }
    }

    pub fn tree(&self) -> &AvlTree<i64> {
        &self.tree
    }

    pub fn into_tree(self) -> AvlTree<i64> {
        self.tree
    }

    /// Runs the whole session: initial load, then operations until stopped.
    pub fn run(&mut self) -> Result<(), SessionError> {
        self.prompt("Number of keys: ")?;
        let count = self.tokens.require_int("key count")?;
        if count < 0 {
            return Err(SessionError::NegativeCount(count));
        }

        self.prompt(&format!("Enter {} keys: ", count))?;
        for _ in 0..count {
            let key = self.tokens.require_int("key")?;
            self.tree.insert(key);
        }
        info!(
            "loaded {} distinct keys, height {}",
            self.tree.len(),
            self.tree.height()
        );
        self.display()?;

        loop {
            self.prompt("Operation (1: insert, 2: delete, 0: stop): ")?;
            let code = match self.tokens.next_int("operation code")? {
                Some(code) => code,
                None => {
                    debug!("input ended, stopping");
                    break;
                }
            };
            let opcode = match Opcode::try_from(code) {
                Ok(Opcode::Stop) => break,
                Ok(opcode) => Some(opcode),
                Err(err) => {
                    warn!("{}, skipping its key", err);
                    None
                }
            };

            self.prompt("Key: ")?;
            let key = self.tokens.require_int("key")?;
            match opcode {
                Some(opcode) => {
                    self.execute(opcode.with_key(key))?;
                }
                None => self.display()?,
            }
        }
        Ok(())
    }

    /// Applies a single command and prints the resulting diagram.
    /// Returns whether the tree changed.
    pub fn execute(&mut self, command: Command) -> Result<bool, SessionError> {
        let changed = command.apply(&mut self.tree);
        debug!(
            "{:?}: {}",
            command,
            if changed { "applied" } else { "no change" }
        );
        if command != Command::Stop {
            self.display()?;
        }
        Ok(changed)
    }

    fn prompt(&mut self, text: &str) -> io::Result<()> {
        if self.options.prompts {
            self.output.write_all(text.as_bytes())?;
            self.output.flush()?;
        }
        Ok(())
    }

    fn display(&mut self) -> io::Result<()> {
        writeln!(self.output, "AVL tree:")?;
        write!(self.output, "{}", self.tree.diagram())?;
        writeln!(self.output)?;
        self.output.flush()
    }
}

impl<R: BufRead> Tokens<R> {
    fn next_token(&mut self) -> io::Result<Option<String>> {
        while self.pending.is_empty() {
            let mut buf = String::new();
            if self.reader.read_line(&mut buf)? == 0 {
                return Ok(None);
            }
            self.line += 1;
            self.pending
                .extend(buf.split_whitespace().map(str::to_owned));
        }
        Ok(self.pending.pop_front())
    }

    fn next_int(&mut self, expected: &'static str) -> Result<Option<i64>, SessionError> {
        let token = match self.next_token()? {
            Some(token) => token,
            None => return Ok(None),
        };
        match token.parse() {
            Ok(value) => Ok(Some(value)),
            Err(_) => Err(SessionError::InvalidInteger {
                expected,
                found: token,
                line: self.line,
            }),
        }
    }

    fn require_int(&mut self, expected: &'static str) -> Result<i64, SessionError> {
        self.next_int(expected)?
            .ok_or(SessionError::UnexpectedEof(expected))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_quiet(input: &str) -> (Result<(), SessionError>, AvlTree<i64>, String) {
        let mut output = Vec::new();
        let mut session = Session::with_options(
            input.as_bytes(),
            &mut output,
            Options { prompts: false },
        );
        let result = session.run();
        let tree = session.into_tree();
        (result, tree, String::from_utf8(output).unwrap())
    }

    #[test]
    fn test_transcript() {
        let (result, tree, output) = run_quiet("3\n10 20 30\n1 25\n2 10\n0\n");
        assert!(result.is_ok());
        assert_eq!(tree.iter().copied().collect::<Vec<_>>(), vec![20, 25, 30]);
        assert_eq!(
            output,
            "AVL tree:\n\
             |-- 20\n\
             |   |-- 10\n\
             |   |__ 30\n\
             \n\
             AVL tree:\n\
             |-- 20\n\
             |   |-- 10\n\
             |   |__ 30\n\
             |       |-- 25\n\
             \n\
             AVL tree:\n\
             |-- 25\n\
             |   |-- 20\n\
             |   |__ 30\n\
             \n"
        );
    }

    #[test]
    fn test_prompts() {
        let mut output = Vec::new();
        let mut session = Session::new("1\n7\n0\n".as_bytes(), &mut output);
        session.run().unwrap();
        assert_eq!(session.tree().len(), 1);
        drop(session);
        assert_eq!(
            String::from_utf8(output).unwrap(),
            "Number of keys: Enter 1 keys: AVL tree:\n\
             |-- 7\n\
             \n\
             Operation (1: insert, 2: delete, 0: stop): "
        );
    }

    #[test]
    fn test_end_of_input_stops() {
        let (result, tree, _) = run_quiet("2 1 2\n1 3");
        assert!(result.is_ok());
        assert_eq!(tree.len(), 3);
    }

    #[test]
    fn test_duplicates_and_absent_keys() {
        let (result, tree, _) = run_quiet("3\n4 4 8\n1 8\n2 100\n0\n");
        assert!(result.is_ok());
        assert_eq!(tree.iter().copied().collect::<Vec<_>>(), vec![4, 8]);
    }

    #[test]
    fn test_unknown_code_is_skipped() {
        let (result, tree, output) = run_quiet("1\n5\n7 99\n1 6\n0\n");
        assert!(result.is_ok());
        assert!(!tree.contains(&99));
        assert_eq!(tree.iter().copied().collect::<Vec<_>>(), vec![5, 6]);
        assert_eq!(output.matches("AVL tree:").count(), 3);
    }

    #[test]
    fn test_invalid_integer() {
        let (result, tree, _) = run_quiet("2\n1 x\n");
        match result {
            Err(SessionError::InvalidInteger {
                expected,
                found,
                line,
            }) => {
                assert_eq!(expected, "key");
                assert_eq!(found, "x");
                assert_eq!(line, 2);
            }
            other => panic!("unexpected result {:?}", other),
        }
        assert_eq!(tree.len(), 1);
    }

    #[test]
    fn test_truncated_input() {
        let (result, _, _) = run_quiet("3\n1 2\n");
        assert!(matches!(result, Err(SessionError::UnexpectedEof("key"))));

        let (result, _, _) = run_quiet("");
        assert!(matches!(result, Err(SessionError::UnexpectedEof("key count"))));

        let (result, _, _) = run_quiet("1\n5\n2\n");
        assert!(matches!(result, Err(SessionError::UnexpectedEof("key"))));
    }

    #[test]
    fn test_negative_count() {
        let (result, _, output) = run_quiet("-1\n");
        assert!(matches!(result, Err(SessionError::NegativeCount(-1))));
        assert!(output.is_empty());
    }

    #[test]
    fn test_execute() {
        let mut output = Vec::new();
        let mut session =
            Session::with_options(io::empty(), &mut output, Options { prompts: false });
        assert!(session.execute(Command::Insert(1)).unwrap());
        assert!(!session.execute(Command::Insert(1)).unwrap());
        assert!(!session.execute(Command::Stop).unwrap());
        assert!(session.execute(Command::Delete(1)).unwrap());
        assert!(session.tree().is_empty());
        drop(session);
        assert_eq!(
            String::from_utf8(output).unwrap(),
            "AVL tree:\n|-- 1\n\nAVL tree:\n|-- 1\n\nAVL tree:\n\n"
        );
    }
}
