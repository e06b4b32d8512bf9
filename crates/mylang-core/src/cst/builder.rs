//! Thin wrapper over Rowan's green tree builder

use rowan::{Checkpoint, GreenNodeBuilder};

use super::{MylangSyntaxKind, MylangSyntaxNode};

/// Builds a mylang CST node by node
///
/// Nodes are opened and closed in source order; [`CstBuilder::start_node_at`]
/// retroactively wraps everything added since a [`Checkpoint`], which is how
/// left-recursive constructs (binary expressions, postfix calls, array types)
/// get their parent after the left operand has already been built.
#[derive(Default)]
pub struct CstBuilder {
    inner: GreenNodeBuilder<'static>,
}

impl CstBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start_node(&mut self, kind: MylangSyntaxKind) {
        self.inner.start_node(kind.into());
    }

    pub fn start_node_at(&mut self, checkpoint: Checkpoint, kind: MylangSyntaxKind) {
        self.inner.start_node_at(checkpoint, kind.into());
    }

    pub fn checkpoint(&self) -> Checkpoint {
        self.inner.checkpoint()
    }

    pub fn token(&mut self, kind: MylangSyntaxKind, text: &str) {
        self.inner.token(kind.into(), text);
    }

    pub fn finish_node(&mut self) {
        self.inner.finish_node();
    }

    pub fn finish(self) -> MylangSyntaxNode {
        MylangSyntaxNode::new_root(self.inner.finish())
    }
}
