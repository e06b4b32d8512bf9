//! Read-only view of a concrete syntax tree
//!
//! [`CstNode`] is the only thing the serializer knows about a parsed tree.
//! Grammar engines expose their trees through it, and tests implement it on
//! hand-built fake trees.

/// A node of a concrete syntax tree
///
/// Offsets are byte offsets into the source buffer the tree was parsed from,
/// with `start_offset <= end_offset`. A well-behaved engine also keeps
/// `end_offset <= len(source)`; consumers must not rely on it.
pub trait CstNode: Sized {
    /// Grammar rule or token name of this node.
    fn kind(&self) -> &str;

    /// Inclusive start of the node's byte span.
    fn start_offset(&self) -> usize;

    /// Exclusive end of the node's byte span.
    fn end_offset(&self) -> usize;

    /// Children in source order; empty for leaves.
    fn children(&self) -> Vec<Self>;

    fn is_leaf(&self) -> bool {
        self.children().is_empty()
    }
}
