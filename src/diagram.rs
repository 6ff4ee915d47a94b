//! Prefix-indented tree diagrams.
//!
//! Every node is printed on its own line in pre-order. Left children (and the
//! root) are drawn with `|-- `, right children with `|__ `. Below a left node
//! the indentation continues the vertical line, below a right node it is blank:
//!
//! ```text
//! |-- 20
//! |   |-- 10
//! |   |__ 30
//! ```

use std::fmt;

use crate::tree::{AvlTree, Side};

const LEFT_BRANCH: &str = "|-- ";
const RIGHT_BRANCH: &str = "|__ ";
const LEFT_INDENT: &str = "|   ";
const RIGHT_INDENT: &str = "    ";

/// A borrowed view of a tree that renders as a diagram via [`fmt::Display`].
pub struct Diagram<'a, K> {
    tree: &'a AvlTree<K>,
}

impl<K> AvlTree<K> {
    /// Returns a displayable diagram of the tree's current shape.
    pub fn diagram(&self) -> Diagram<'_, K> {
        Diagram { tree: self }
    }
}

impl<K: fmt::Display> fmt::Display for Diagram<'_, K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Sides of the ancestors of the current node, root first
        let mut ancestors: Vec<Side> = Vec::new();
        for visit in self.tree.preorder() {
            ancestors.truncate(visit.depth);
            for side in &ancestors {
                f.write_str(match side {
                    Side::Left => LEFT_INDENT,
                    Side::Right => RIGHT_INDENT,
                })?;
            }
            let branch = match visit.side {
                Side::Left => LEFT_BRANCH,
                Side::Right => RIGHT_BRANCH,
            };
            writeln!(f, "{}{}", branch, visit.key)?;
            ancestors.push(visit.side);
        }
        Ok(())
    }
}
