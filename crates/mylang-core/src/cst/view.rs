//! [`CstNode`] view over the Rowan tree
//!
//! The Rowan tree is lossless and keeps whitespace tokens; the view hides
//! them, which leaves exactly the node shape a tree-sitter style consumer
//! expects: named nodes, anonymous tokens and comments.

use rowan::NodeOrToken;

use super::{MylangSyntaxElement, MylangSyntaxNode};
use crate::tree::CstNode;

impl CstNode for MylangSyntaxElement {
    fn kind(&self) -> &str {
        match self {
            NodeOrToken::Node(node) => node.kind().as_str(),
            NodeOrToken::Token(token) => token.kind().as_str(),
        }
    }

    fn start_offset(&self) -> usize {
        self.text_range().start().into()
    }

    fn end_offset(&self) -> usize {
        self.text_range().end().into()
    }

    fn children(&self) -> Vec<Self> {
        match self {
            NodeOrToken::Node(node) => visible_children(node),
            NodeOrToken::Token(_) => Vec::new(),
        }
    }
}

fn visible_children(node: &MylangSyntaxNode) -> Vec<MylangSyntaxElement> {
    node.children_with_tokens()
        .filter(|child| !child.kind().is_trivia())
        .collect()
}
