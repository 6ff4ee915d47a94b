//! A height-balanced binary search tree over unique keys.

use std::cmp::{self, Ordering};
use std::fmt;
use std::iter::FromIterator;
use std::marker::PhantomData;
use std::ptr::NonNull;

use log::trace;

/// An AVL tree holding unique, totally ordered keys.
///
/// ```
/// use avl_tree::AvlTree;
/// let mut tree = AvlTree::new();
/// tree.insert(10);
/// tree.insert(20);
/// tree.insert(30);
/// assert_eq!(tree.height(), 2);
/// assert!(tree.remove(&20));
/// assert!(!tree.contains(&20));
/// ```
pub struct AvlTree<K> {
    root: Link<K>,
    num_nodes: usize,
    _marker: PhantomData<Box<Node<K>>>,
}

struct Node<K> {
    key: K,
    left: Link<K>,
    right: Link<K>,
    parent: Link<K>,
    height: usize,
}

type NodePtr<K> = NonNull<Node<K>>;
type Link<K> = Option<NodePtr<K>>;
type LinkPtr<K> = NonNull<Link<K>>;

/// Which child slot of its parent a node occupies.
///
/// The root has no parent and is reported as `Left`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Left,
    Right,
}

/// One step of a pre-order walk, as produced by [`AvlTree::preorder`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Visit<'a, K> {
    pub key: &'a K,
    /// Distance from the root, which has depth 0.
    pub depth: usize,
    pub side: Side,
    /// Height of the subtree rooted at this node; leaves have height 1.
    pub height: usize,
}

/// An iterator over the keys of a tree in ascending order.
pub struct Iter<'a, K> {
    stack: Vec<NodePtr<K>>,
    remaining: usize,
    _marker: PhantomData<&'a Node<K>>,
}

/// A pre-order iterator over the nodes of a tree.
pub struct Preorder<'a, K> {
    stack: Vec<(NodePtr<K>, usize, Side)>,
    _marker: PhantomData<&'a Node<K>>,
}

#[allow(clippy::enum_variant_names)]
enum Direction {
    FromParent,
    FromLeft,
    FromRight,
}

// Nodes are exclusively owned through the root link, like `Box<Node<K>>`.
unsafe impl<K: Send> Send for AvlTree<K> {}
unsafe impl<K: Sync> Sync for AvlTree<K> {}

impl<K> AvlTree<K> {
    /// Creates an empty tree.
    /// No memory is allocated until the first key is inserted.
    pub fn new() -> Self {
        Self {
            root: None,
            num_nodes: 0,
            _marker: PhantomData,
        }
    }

    /// Returns true if the tree contains no keys.
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Returns the number of keys in the tree.
    pub fn len(&self) -> usize {
        self.num_nodes
    }

    /// Returns the height of the tree: 0 when empty, 1 for a single node.
    pub fn height(&self) -> usize {
        Self::link_height(self.root)
    }

    /// Clears the tree, deallocating all memory.
    pub fn clear(&mut self) {
        self.postorder(|node_ptr| unsafe { Node::destroy(node_ptr) });
        self.root = None;
        self.num_nodes = 0;
    }

    /// Gets an iterator over the keys in ascending order.
    pub fn iter(&self) -> Iter<'_, K> {
        let mut iter = Iter {
            stack: Vec::new(),
            remaining: self.num_nodes,
            _marker: PhantomData,
        };
        iter.push_left(self.root);
        iter
    }

    /// Gets an iterator visiting every node before its subtrees,
    /// left subtree before right subtree.
    pub fn preorder(&self) -> Preorder<'_, K> {
        Preorder {
            stack: self
                .root
                .map(|root_ptr| (root_ptr, 0, Side::Left))
                .into_iter()
                .collect(),
            _marker: PhantomData,
        }
    }

    /// Calls `visitor` for every node in pre-order.
    pub fn traverse<F>(&self, visitor: F)
    where
        F: FnMut(Visit<'_, K>),
    {
        self.preorder().for_each(visitor);
    }

    fn link_height(link: Link<K>) -> usize {
        match link {
            None => 0,
            Some(node_ptr) => unsafe { node_ptr.as_ref().height },
        }
    }

    fn balance(node_ptr: NodePtr<K>) -> isize {
        unsafe {
            let node = node_ptr.as_ref();
            Self::link_height(node.left) as isize - Self::link_height(node.right) as isize
        }
    }

    fn adjust_height(mut node_ptr: NodePtr<K>) {
        unsafe {
            let height = 1 + cmp::max(
                Self::link_height(node_ptr.as_ref().left),
                Self::link_height(node_ptr.as_ref().right),
            );
            node_ptr.as_mut().height = height;
        }
    }

    // Points the parent's link (or the root) that referred to `old` at `new`.
    fn replace_child(&mut self, parent: Link<K>, old: NodePtr<K>, new: Link<K>) {
        match parent {
            None => self.root = new,
            Some(mut parent_ptr) => unsafe {
                if parent_ptr.as_ref().left == Some(old) {
                    parent_ptr.as_mut().left = new;
                } else {
                    parent_ptr.as_mut().right = new;
                }
            },
        }
    }

    fn rotate_left(&mut self, mut node_ptr: NodePtr<K>) {
        unsafe {
            if let Some(mut right_ptr) = node_ptr.as_ref().right {
                node_ptr.as_mut().right = right_ptr.as_ref().left;
                if let Some(mut right_left_ptr) = right_ptr.as_ref().left {
                    right_left_ptr.as_mut().parent = Some(node_ptr);
                }

                right_ptr.as_mut().parent = node_ptr.as_ref().parent;
                self.replace_child(node_ptr.as_ref().parent, node_ptr, Some(right_ptr));

                right_ptr.as_mut().left = Some(node_ptr);
                node_ptr.as_mut().parent = Some(right_ptr);

                // Former root first, it is now the child
                Self::adjust_height(node_ptr);
                Self::adjust_height(right_ptr);
                trace!("rotated left, new subtree height {}", right_ptr.as_ref().height);
            }
        }
    }

    fn rotate_right(&mut self, mut node_ptr: NodePtr<K>) {
        unsafe {
            if let Some(mut left_ptr) = node_ptr.as_ref().left {
                node_ptr.as_mut().left = left_ptr.as_ref().right;
                if let Some(mut left_right_ptr) = left_ptr.as_ref().right {
                    left_right_ptr.as_mut().parent = Some(node_ptr);
                }

                left_ptr.as_mut().parent = node_ptr.as_ref().parent;
                self.replace_child(node_ptr.as_ref().parent, node_ptr, Some(left_ptr));

                left_ptr.as_mut().right = Some(node_ptr);
                node_ptr.as_mut().parent = Some(left_ptr);

                Self::adjust_height(node_ptr);
                Self::adjust_height(left_ptr);
                trace!("rotated right, new subtree height {}", left_ptr.as_ref().height);
            }
        }
    }

    /// Rebalances nodes starting from given position up to the root node,
    /// choosing rotations by the balance factor of the heavier child.
    /// Used after removal, where a single rotation may not be enough.
    fn rebalance(&mut self, start_from: Link<K>) {
        let mut current = start_from;
        while let Some(node_ptr) = current {
            let parent = unsafe { node_ptr.as_ref().parent };
            self.rebalance_node(node_ptr);
            current = parent;
        }
    }

    /// Adjusts height and restores the AVL condition at the given node.
    /// Initial balance must not exceed +2 or -2, which always holds after a single update.
    fn rebalance_node(&mut self, node_ptr: NodePtr<K>) {
        Self::adjust_height(node_ptr);
        let balance = Self::balance(node_ptr);
        debug_assert!((-2..=2).contains(&balance));
        unsafe {
            if balance > 1 {
                if let Some(left_ptr) = node_ptr.as_ref().left {
                    if Self::balance(left_ptr) < 0 {
                        self.rotate_left(left_ptr);
                    }
                    self.rotate_right(node_ptr);
                }
            } else if balance < -1 {
                if let Some(right_ptr) = node_ptr.as_ref().right {
                    if Self::balance(right_ptr) > 0 {
                        self.rotate_right(right_ptr);
                    }
                    self.rotate_left(node_ptr);
                }
            }
        }
    }

    fn postorder<F: FnMut(NodePtr<K>)>(&self, f: F) {
        self.walk(|_| {}, f);
    }

    // Stackless depth-first walk over the parent links.
    fn walk<Pre, Post>(&self, mut preorder: Pre, mut postorder: Post)
    where
        Pre: FnMut(NodePtr<K>),
        Post: FnMut(NodePtr<K>),
    {
        if let Some(mut node_ptr) = self.root {
            let mut dir = Direction::FromParent;
            loop {
                match dir {
                    Direction::FromParent => {
                        preorder(node_ptr);
                        if let Some(left_ptr) = unsafe { node_ptr.as_ref().left } {
                            node_ptr = left_ptr;
                        } else {
                            dir = Direction::FromLeft;
                        }
                    }
                    Direction::FromLeft => {
                        if let Some(right_ptr) = unsafe { node_ptr.as_ref().right } {
                            node_ptr = right_ptr;
                            dir = Direction::FromParent;
                        } else {
                            dir = Direction::FromRight;
                        }
                    }
                    Direction::FromRight => {
                        // Post order traversal is used for node deletion,
                        // so make sure not to use node pointer after postorder call.
                        if let Some(parent_ptr) = unsafe { node_ptr.as_ref().parent } {
                            if Some(node_ptr) == unsafe { parent_ptr.as_ref().left } {
                                dir = Direction::FromLeft;
                            } else {
                                dir = Direction::FromRight;
                            }
                            postorder(node_ptr);
                            node_ptr = parent_ptr;
                        } else {
                            postorder(node_ptr);
                            break;
                        }
                    }
                }
            }
        }
    }
}

impl<K: Ord> AvlTree<K> {
    /// Returns true if the tree contains the key.
    pub fn contains(&self, key: &K) -> bool {
        self.find(key).is_some()
    }

    /// Returns a reference to the stored key equal to the given one.
    pub fn get(&self, key: &K) -> Option<&K> {
        self.find(key)
            .map(|node_ptr| &unsafe { &*node_ptr.as_ptr() }.key)
    }

    /// Inserts a key into the tree.
    /// Returns false, leaving the tree untouched, if the key was already present.
    pub fn insert(&mut self, key: K) -> bool {
        if let Some((parent, mut link_ptr)) = self.find_insert_pos(&key) {
            let node_ptr = Node::create(parent, key);
            unsafe {
                *link_ptr.as_mut() = Some(node_ptr);
            }
            self.num_nodes += 1;
            self.rebalance_inserted(parent, node_ptr);
            return true;
        }
        false
    }

    /// Removes a key from the tree.
    /// Returns whether the key was previously in the tree.
    pub fn remove(&mut self, key: &K) -> bool {
        if let Some(node_ptr) = self.find(key) {
            debug_assert!(self.num_nodes >= 1);
            self.unlink_node(node_ptr);
            unsafe { Node::destroy(node_ptr) };
            self.num_nodes -= 1;
            debug_assert!(self.find(key).is_none());
            return true;
        }
        false
    }

    /// Asserts that the internal tree structure is consistent.
    #[cfg(any(test, feature = "consistency_check"))]
    pub fn check_consistency(&self) {
        unsafe {
            // Check root link
            if let Some(root_node_ptr) = self.root {
                assert!(root_node_ptr.as_ref().parent.is_none());
            }

            // Check tree nodes
            let mut num_nodes = 0;
            self.walk(
                |node_ptr| {
                    let mut left_height = 0;
                    let mut right_height = 0;

                    // Check link for left child node
                    if let Some(left_ptr) = node_ptr.as_ref().left {
                        assert!(left_ptr.as_ref().parent == Some(node_ptr));
                        assert!(left_ptr.as_ref().key < node_ptr.as_ref().key);
                        left_height = left_ptr.as_ref().height;
                    }

                    // Check link for right child node
                    if let Some(right_ptr) = node_ptr.as_ref().right {
                        assert!(right_ptr.as_ref().parent == Some(node_ptr));
                        assert!(right_ptr.as_ref().key > node_ptr.as_ref().key);
                        right_height = right_ptr.as_ref().height;
                    }

                    // Check height
                    assert_eq!(
                        node_ptr.as_ref().height,
                        1 + cmp::max(left_height, right_height)
                    );

                    // Check AVL condition (nearly balance)
                    assert!(left_height <= right_height + 1);
                    assert!(right_height <= left_height + 1);

                    num_nodes += 1;
                },
                |_| {},
            );

            // Check number of nodes
            assert_eq!(num_nodes, self.num_nodes);

            // Keys ascend in order
            let mut iter = self.iter();
            if let Some(mut prev) = iter.next() {
                for key in iter {
                    assert!(prev < key);
                    prev = key;
                }
            }
        }
    }

    fn find(&self, key: &K) -> Link<K> {
        let mut current = self.root;
        while let Some(node_ptr) = current {
            current = unsafe {
                match key.cmp(&node_ptr.as_ref().key) {
                    Ordering::Equal => break,
                    Ordering::Less => node_ptr.as_ref().left,
                    Ordering::Greater => node_ptr.as_ref().right,
                }
            }
        }
        current
    }

    fn find_insert_pos(&mut self, key: &K) -> Option<(Link<K>, LinkPtr<K>)> {
        let mut parent: Link<K> = None;
        let mut link_ptr: LinkPtr<K> = NonNull::from(&mut self.root);
        unsafe {
            while let Some(mut node_ptr) = *link_ptr.as_ref() {
                parent = Some(node_ptr);
                link_ptr = match key.cmp(&node_ptr.as_ref().key) {
                    Ordering::Equal => return None,
                    Ordering::Less => NonNull::from(&mut node_ptr.as_mut().left),
                    Ordering::Greater => NonNull::from(&mut node_ptr.as_mut().right),
                };
            }
        }
        Some((parent, link_ptr))
    }

    /// Rebalances the ancestors of a freshly inserted node, choosing rotations
    /// by comparing the inserted key against the heavy child's key.
    /// Stops after the first rotation, which restores the subtree's previous height.
    fn rebalance_inserted(&mut self, start_from: Link<K>, inserted_ptr: NodePtr<K>) {
        let mut current = start_from;
        while let Some(node_ptr) = current {
            let parent = unsafe { node_ptr.as_ref().parent };
            Self::adjust_height(node_ptr);
            let balance = Self::balance(node_ptr);
            unsafe {
                let key = &(*inserted_ptr.as_ptr()).key;
                if balance > 1 {
                    if let Some(left_ptr) = node_ptr.as_ref().left {
                        if *key > left_ptr.as_ref().key {
                            self.rotate_left(left_ptr);
                        }
                        self.rotate_right(node_ptr);
                        break;
                    }
                } else if balance < -1 {
                    if let Some(right_ptr) = node_ptr.as_ref().right {
                        if *key < right_ptr.as_ref().key {
                            self.rotate_right(right_ptr);
                        }
                        self.rotate_left(node_ptr);
                        break;
                    }
                }
            }
            current = parent;
        }
    }

    fn unlink_node(&mut self, node_ptr: NodePtr<K>) {
        unsafe {
            let parent = node_ptr.as_ref().parent;
            match (node_ptr.as_ref().left, node_ptr.as_ref().right) {
                (Some(mut left_ptr), Some(mut min_child_ptr)) => {
                    // Find smallest child node in right sub tree
                    let mut min_child_parent_ptr = node_ptr;
                    while let Some(next_ptr) = min_child_ptr.as_ref().left {
                        min_child_parent_ptr = min_child_ptr;
                        min_child_ptr = next_ptr;
                    }

                    // Smallest child node is stem or leaf, unlink from tree
                    debug_assert!(min_child_ptr.as_ref().left.is_none());
                    let min_child_right = min_child_ptr.as_ref().right;
                    self.replace_child(Some(min_child_parent_ptr), min_child_ptr, min_child_right);
                    if let Some(mut right_ptr) = min_child_right {
                        right_ptr.as_mut().parent = Some(min_child_parent_ptr);
                    }

                    // Put smallest child node in place of node to-unlink
                    min_child_ptr.as_mut().left = Some(left_ptr);
                    left_ptr.as_mut().parent = Some(min_child_ptr);

                    min_child_ptr.as_mut().right = node_ptr.as_ref().right;
                    if let Some(mut right_ptr) = node_ptr.as_ref().right {
                        right_ptr.as_mut().parent = Some(min_child_ptr);
                    }

                    min_child_ptr.as_mut().parent = parent;
                    self.replace_child(parent, node_ptr, Some(min_child_ptr));

                    // Parent of smallest child node might be out of balance now
                    let mut rebalance_from = min_child_parent_ptr;
                    if rebalance_from == node_ptr {
                        // Parent is node to-unlink and has been replaced by smallest child
                        rebalance_from = min_child_ptr;
                    }
                    self.rebalance(Some(rebalance_from));
                }
                (child, None) | (None, child) => {
                    // Node to-unlink is stem or leaf, splice in its only child
                    if let Some(mut child_ptr) = child {
                        child_ptr.as_mut().parent = parent;
                    }
                    self.replace_child(parent, node_ptr, child);
                    self.rebalance(parent);
                }
            }
        }
    }
}

impl<K> Drop for AvlTree<K> {
    fn drop(&mut self) {
        self.clear();
    }
}

impl<K> Default for AvlTree<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Clone> Clone for AvlTree<K> {
    fn clone(&self) -> Self {
        Self {
            root: Node::clone_subtree(self.root, None),
            num_nodes: self.num_nodes,
            _marker: PhantomData,
        }
    }
}

impl<K: fmt::Debug> fmt::Debug for AvlTree<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl<K: Ord> Extend<K> for AvlTree<K> {
    fn extend<I: IntoIterator<Item = K>>(&mut self, iter: I) {
        for key in iter {
            self.insert(key);
        }
    }
}

impl<K: Ord> FromIterator<K> for AvlTree<K> {
    fn from_iter<I: IntoIterator<Item = K>>(iter: I) -> Self {
        let mut tree = Self::new();
        tree.extend(iter);
        tree
    }
}

impl<'a, K> IntoIterator for &'a AvlTree<K> {
    type Item = &'a K;
    type IntoIter = Iter<'a, K>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, K> Iter<'a, K> {
    fn push_left(&mut self, mut link: Link<K>) {
        while let Some(node_ptr) = link {
            self.stack.push(node_ptr);
            link = unsafe { node_ptr.as_ref().left };
        }
    }
}

impl<'a, K> Iterator for Iter<'a, K> {
    type Item = &'a K;

    fn next(&mut self) -> Option<Self::Item> {
        let node_ptr = self.stack.pop()?;
        let node = unsafe { &*node_ptr.as_ptr() };
        self.push_left(node.right);
        self.remaining -= 1;
        Some(&node.key)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K> ExactSizeIterator for Iter<'_, K> {}

impl<'a, K> Iterator for Preorder<'a, K> {
    type Item = Visit<'a, K>;

    fn next(&mut self) -> Option<Self::Item> {
        let (node_ptr, depth, side) = self.stack.pop()?;
        let node = unsafe { &*node_ptr.as_ptr() };
        // Right is pushed first so the left subtree is visited first
        if let Some(right_ptr) = node.right {
            self.stack.push((right_ptr, depth + 1, Side::Right));
        }
        if let Some(left_ptr) = node.left {
            self.stack.push((left_ptr, depth + 1, Side::Left));
        }
        Some(Visit {
            key: &node.key,
            depth,
            side,
            height: node.height,
        })
    }
}

impl<K> Node<K> {
    fn create(parent: Link<K>, key: K) -> NodePtr<K> {
        let boxed = Box::new(Node {
            key,
            parent,
            left: None,
            right: None,
            height: 1,
        });
        NonNull::from(Box::leak(boxed))
    }

    unsafe fn destroy(node_ptr: NodePtr<K>) {
        drop(Box::from_raw(node_ptr.as_ptr()));
    }

    fn clone_subtree(link: Link<K>, parent: Link<K>) -> Link<K>
    where
        K: Clone,
    {
        link.map(|node_ptr| unsafe {
            let node = node_ptr.as_ref();
            let mut copy_ptr = Node::create(parent, node.key.clone());
            copy_ptr.as_mut().height = node.height;
            copy_ptr.as_mut().left = Self::clone_subtree(node.left, Some(copy_ptr));
            copy_ptr.as_mut().right = Self::clone_subtree(node.right, Some(copy_ptr));
            copy_ptr
        })
    }
}
