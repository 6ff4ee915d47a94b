//! A height-balanced (AVL) binary search tree over unique keys, plus the
//! diagram formatter and console driver built on top of it.
//!
//! ```
//! use avl_tree::AvlTree;
//! let mut tree = AvlTree::new();
//! for key in [30, 10, 20] {
//!     tree.insert(key);
//! }
//! assert_eq!(tree.iter().copied().collect::<Vec<_>>(), vec![10, 20, 30]);
//! print!("{}", tree.diagram());
//! ```

pub mod command;
pub mod diagram;
pub mod session;
pub mod tree;

pub use command::{Command, CommandError, Opcode};
pub use diagram::Diagram;
pub use session::{Options, Session, SessionError};
pub use tree::{AvlTree, Side, Visit};
