//! Rowan language implementation for mylang
//!
//! This module implements the `rowan::Language` trait, which connects
//! [`MylangSyntaxKind`] to Rowan's generic CST infrastructure.

use rowan::Language;

use super::MylangSyntaxKind;

/// Language implementation for mylang
///
/// This is a zero-sized type that implements `rowan::Language` to provide
/// the connection between our syntax kinds and Rowan's generic tree types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MylangLanguage;

impl Language for MylangLanguage {
    type Kind = MylangSyntaxKind;

    fn kind_from_raw(raw: rowan::SyntaxKind) -> Self::Kind {
        // Only kinds produced by kind_to_raw ever reach the tree
        MylangSyntaxKind::from_raw(raw.0).unwrap_or_else(|| {
            tracing::warn!(raw = raw.0, "unknown syntax kind");
            MylangSyntaxKind::Error
        })
    }

    fn kind_to_raw(kind: Self::Kind) -> rowan::SyntaxKind {
        kind.into()
    }
}

/// Syntax node of the mylang CST
pub type MylangSyntaxNode = rowan::SyntaxNode<MylangLanguage>;
/// Syntax token of the mylang CST
pub type MylangSyntaxToken = rowan::SyntaxToken<MylangLanguage>;
/// Either a node or a token
pub type MylangSyntaxElement = rowan::SyntaxElement<MylangLanguage>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_roundtrip() {
        for &kind in MylangSyntaxKind::ALL {
            let raw = MylangLanguage::kind_to_raw(kind);
            let back = MylangLanguage::kind_from_raw(raw);
            assert_eq!(kind, back, "Roundtrip failed for {kind:?}");
        }
    }

    #[test]
    fn test_unknown_raw_kind_maps_to_error() {
        let back = MylangLanguage::kind_from_raw(rowan::SyntaxKind(u16::MAX));
        assert_eq!(back, MylangSyntaxKind::Error);
    }
}
