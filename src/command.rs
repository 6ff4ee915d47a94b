//! Operations a driver can feed to a tree of integer keys.

use std::convert::TryFrom;

use thiserror::Error;

use crate::tree::AvlTree;

/// Numeric operation codes read by the console driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Opcode {
    Stop = 0,
    Insert = 1,
    Delete = 2,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Insert(i64),
    Delete(i64),
    Stop,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("unknown operation code {0} (expected 1: insert, 2: delete, 0: stop)")]
    UnknownCode(i64),
}

impl TryFrom<i64> for Opcode {
    type Error = CommandError;

    fn try_from(code: i64) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(Opcode::Stop),
            1 => Ok(Opcode::Insert),
            2 => Ok(Opcode::Delete),
            other => Err(CommandError::UnknownCode(other)),
        }
    }
}

impl Opcode {
    /// Whether a key follows this code in the input.
    pub fn takes_key(self) -> bool {
        self != Opcode::Stop
    }

    /// Builds the command for this code; the key is ignored for `Stop`.
    pub fn with_key(self, key: i64) -> Command {
        match self {
            Opcode::Stop => Command::Stop,
            Opcode::Insert => Command::Insert(key),
            Opcode::Delete => Command::Delete(key),
        }
    }
}

impl Command {
    /// Applies the command to the tree.
    /// Returns whether the tree changed; duplicate inserts and deletes of
    /// absent keys leave it untouched.
    pub fn apply(&self, tree: &mut AvlTree<i64>) -> bool {
        match *self {
            Command::Insert(key) => tree.insert(key),
            Command::Delete(key) => tree.remove(&key),
            Command::Stop => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opcodes() {
        assert_eq!(Opcode::try_from(0), Ok(Opcode::Stop));
        assert_eq!(Opcode::try_from(1), Ok(Opcode::Insert));
        assert_eq!(Opcode::try_from(2), Ok(Opcode::Delete));
        assert_eq!(Opcode::try_from(3), Err(CommandError::UnknownCode(3)));
        assert_eq!(Opcode::try_from(-1), Err(CommandError::UnknownCode(-1)));

        assert!(!Opcode::Stop.takes_key());
        assert!(Opcode::Insert.takes_key());
        assert_eq!(Opcode::Delete.with_key(7), Command::Delete(7));
        assert_eq!(Opcode::Stop.with_key(7), Command::Stop);
    }

    #[test]
    fn test_apply() {
        let mut tree = AvlTree::new();
        assert!(Command::Insert(5).apply(&mut tree));
        assert!(!Command::Insert(5).apply(&mut tree));
        assert_eq!(tree.len(), 1);

        assert!(!Command::Delete(6).apply(&mut tree));
        assert!(!Command::Stop.apply(&mut tree));
        assert!(Command::Delete(5).apply(&mut tree));
        assert!(tree.is_empty());
    }

    #[test]
    fn test_error_message() {
        let err = Opcode::try_from(9).unwrap_err();
        assert_eq!(
            err.to_string(),
            "unknown operation code 9 (expected 1: insert, 2: delete, 0: stop)"
        );
    }
}
