//! Tree serializer
//!
//! Walks a concrete syntax tree once, from the root, and produces one
//! [`NodeRecord`] per node. The mapping is purely structural: records are
//! never reordered, merged, dropped or synthesized, so the record tree has
//! exactly the shape of the syntax tree.
//!
//! What a record carries besides its `type` is decided by the
//! [`TextPolicy`] of the [`TreeSerializer`]:
//!
//! - [`TextPolicy::Cleaned`] attaches the node's source text with every CR
//!   and LF byte removed.
//! - [`TextPolicy::Raw`] attaches the text verbatim together with the
//!   node's `start_byte`/`end_byte`.
//!
//! Nodes with an empty span never get text or offsets.

use serde::ser::Error as _;
use serde::{Deserialize, Serialize, Serializer};
use tracing::{trace, warn};

use crate::tree::CstNode;
use crate::{MylangError, Result};

/// Default limit on syntax tree depth
pub const DEFAULT_MAX_DEPTH: usize = 1024;

/// How node text is attached to records
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextPolicy {
    /// Text without CR/LF bytes, no offsets
    #[default]
    Cleaned,
    /// Verbatim text plus byte offsets
    Raw,
}

/// Serialized form of one syntax tree node
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NodeRecord {
    #[serde(rename = "type")]
    pub kind: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<NodeText>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_byte: Option<usize>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_byte: Option<usize>,

    /// `None` for leaves; interior nodes always carry their children
    #[serde(skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<NodeRecord>>,
}

impl NodeRecord {
    /// Number of records in this subtree, including `self`
    pub fn node_count(&self) -> usize {
        1 + self
            .children
            .iter()
            .flatten()
            .map(NodeRecord::node_count)
            .sum::<usize>()
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_none()
    }
}

/// Source bytes covered by a node
///
/// The serializer copies bytes without validating them; serializing a
/// record whose text is not valid UTF-8 fails in the encoder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeText(Vec<u8>);

impl NodeText {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn as_str(&self) -> Option<&str> {
        std::str::from_utf8(&self.0).ok()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<&str> for NodeText {
    fn from(text: &str) -> Self {
        Self(text.as_bytes().to_vec())
    }
}

impl From<Vec<u8>> for NodeText {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl Serialize for NodeText {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match std::str::from_utf8(&self.0) {
            Ok(text) => serializer.serialize_str(text),
            Err(err) => Err(S::Error::custom(format!(
                "node text is not valid UTF-8: {err}"
            ))),
        }
    }
}

/// Remove every CR and LF byte
pub fn clean_text(raw: &[u8]) -> Vec<u8> {
    raw.iter()
        .copied()
        .filter(|byte| !is_line_break(*byte))
        .collect()
}

fn is_line_break(byte: u8) -> bool {
    matches!(byte, b'\r' | b'\n')
}

/// Converts syntax trees into [`NodeRecord`] trees
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TreeSerializer {
    policy: TextPolicy,
    max_depth: usize,
}

impl Default for TreeSerializer {
    fn default() -> Self {
        Self::new(TextPolicy::default())
    }
}

impl TreeSerializer {
    pub fn new(policy: TextPolicy) -> Self {
        Self {
            policy,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// Limit the number of nested levels, root included
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn policy(&self) -> TextPolicy {
        self.policy
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Serialize the tree rooted at `root`
    ///
    /// Only fails when the tree is deeper than the configured limit or a
    /// text buffer cannot be allocated.
    pub fn serialize<N: CstNode>(&self, root: &N, source: &[u8]) -> Result<NodeRecord> {
        self.serialize_node(root, source, 0)
    }

    fn serialize_node<N: CstNode>(&self, node: &N, source: &[u8], depth: usize) -> Result<NodeRecord> {
        if depth >= self.max_depth {
            return Err(MylangError::DepthLimitExceeded {
                limit: self.max_depth,
            });
        }

        let start = node.start_offset();
        let end = node.end_offset();
        let mut record = NodeRecord {
            kind: node.kind().to_string(),
            text: None,
            start_byte: None,
            end_byte: None,
            children: None,
        };

        if end > start {
            record.text = self.extract_text(node.kind(), start, end, source)?;
            if self.policy == TextPolicy::Raw {
                record.start_byte = Some(start);
                record.end_byte = Some(end);
            }
        }

        let children = node.children();
        if !children.is_empty() {
            let mut records = Vec::new();
            records
                .try_reserve_exact(children.len())
                .map_err(|_| MylangError::allocation_error(children.len()))?;
            for child in &children {
                records.push(self.serialize_node(child, source, depth + 1)?);
            }
            record.children = Some(records);
        }

        trace!(kind = %record.kind, start, end, depth, "Serialized node");
        Ok(record)
    }

    fn extract_text(
        &self,
        kind: &str,
        start: usize,
        end: usize,
        source: &[u8],
    ) -> Result<Option<NodeText>> {
        let Some(raw) = source.get(start..end) else {
            warn!(
                kind,
                start,
                end,
                source_len = source.len(),
                "Node span is outside the source buffer, omitting text"
            );
            return Ok(None);
        };

        let mut text = Vec::new();
        text.try_reserve_exact(raw.len())
            .map_err(|_| MylangError::allocation_error(raw.len()))?;
        match self.policy {
            TextPolicy::Cleaned => {
                text.extend(raw.iter().copied().filter(|byte| !is_line_break(*byte)))
            }
            TextPolicy::Raw => text.extend_from_slice(raw),
        }

        Ok((!text.is_empty()).then_some(NodeText(text)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;

    #[derive(Debug, Clone)]
    struct FakeNode {
        kind: &'static str,
        start: usize,
        end: usize,
        children: Vec<FakeNode>,
    }

    impl FakeNode {
        fn leaf(kind: &'static str, start: usize, end: usize) -> Self {
            Self {
                kind,
                start,
                end,
                children: Vec::new(),
            }
        }

        fn node(kind: &'static str, start: usize, end: usize, children: Vec<FakeNode>) -> Self {
            Self {
                kind,
                start,
                end,
                children,
            }
        }
    }

    impl CstNode for FakeNode {
        fn kind(&self) -> &str {
            self.kind
        }

        fn start_offset(&self) -> usize {
            self.start
        }

        fn end_offset(&self) -> usize {
            self.end
        }

        fn children(&self) -> Vec<Self> {
            self.children.clone()
        }
    }

    fn text_of(record: &NodeRecord) -> Option<&str> {
        record.text.as_ref().and_then(NodeText::as_str)
    }

    #[test]
    fn test_arithmetic_scenario() {
        let tree = FakeNode::node(
            "expr",
            0,
            3,
            vec![
                FakeNode::leaf("ident", 0, 1),
                FakeNode::leaf("op", 1, 2),
                FakeNode::leaf("ident", 2, 3),
            ],
        );

        let record = TreeSerializer::default().serialize(&tree, b"a+b").unwrap();
        assert_eq!(record.kind, "expr");
        assert_eq!(text_of(&record), Some("a+b"));

        let children = record.children.as_ref().unwrap();
        let pairs: Vec<_> = children
            .iter()
            .map(|child| (child.kind.as_str(), text_of(child).unwrap()))
            .collect();
        assert_eq!(pairs, vec![("ident", "a"), ("op", "+"), ("ident", "b")]);
        assert!(children.iter().all(NodeRecord::is_leaf));
        assert_eq!(record.node_count(), 4);
    }

    #[test]
    fn test_cleaned_policy_strips_line_breaks() {
        let source = b"line1\nline2\r\n";
        let tree = FakeNode::leaf("str", 0, source.len());

        let record = TreeSerializer::new(TextPolicy::Cleaned)
            .serialize(&tree, source)
            .unwrap();
        assert_eq!(text_of(&record), Some("line1line2"));
        assert_eq!(record.start_byte, None);
        assert_eq!(record.end_byte, None);
    }

    #[test]
    fn test_cleaned_text_that_becomes_empty_is_omitted() {
        let tree = FakeNode::leaf("newline", 0, 2);
        let record = TreeSerializer::default().serialize(&tree, b"\r\n").unwrap();
        assert!(record.text.is_none());
    }

    #[test]
    fn test_raw_policy_keeps_text_and_offsets() {
        let source = b"x\nyz";
        let tree = FakeNode::node("root", 0, 4, vec![FakeNode::leaf("yz", 2, 4)]);

        let record = TreeSerializer::new(TextPolicy::Raw)
            .serialize(&tree, source)
            .unwrap();
        assert_eq!(text_of(&record), Some("x\nyz"));
        assert_eq!((record.start_byte, record.end_byte), (Some(0), Some(4)));

        let child = &record.children.as_ref().unwrap()[0];
        assert_eq!(text_of(child), Some("yz"));
        assert_eq!((child.start_byte, child.end_byte), (Some(2), Some(4)));
    }

    #[test]
    fn test_empty_span_has_no_text_or_offsets() {
        let tree = FakeNode::node("stmt", 0, 1, vec![FakeNode::leaf(";", 1, 1)]);

        for policy in [TextPolicy::Cleaned, TextPolicy::Raw] {
            let record = TreeSerializer::new(policy).serialize(&tree, b"x").unwrap();
            let missing = &record.children.as_ref().unwrap()[0];
            assert_eq!(missing.kind, ";");
            assert!(missing.text.is_none());
            assert!(missing.start_byte.is_none());
            assert!(missing.is_leaf());
        }
    }

    #[test]
    fn test_interior_node_with_only_empty_children_keeps_children() {
        let tree = FakeNode::node(
            "block",
            0,
            0,
            vec![FakeNode::leaf("a", 0, 0), FakeNode::leaf("b", 0, 0)],
        );
        let record = TreeSerializer::default().serialize(&tree, b"").unwrap();
        assert!(record.text.is_none());
        assert_eq!(record.children.as_ref().map(Vec::len), Some(2));
    }

    #[test]
    fn test_out_of_range_span_omits_text() {
        let tree = FakeNode::node("root", 0, 10, vec![FakeNode::leaf("tail", 2, 10)]);

        let record = TreeSerializer::new(TextPolicy::Raw)
            .serialize(&tree, b"abc")
            .unwrap();
        assert!(record.text.is_none());
        // Offsets are reported unmodified
        assert_eq!(record.end_byte, Some(10));
        assert!(record.children.as_ref().unwrap()[0].text.is_none());
    }

    #[test]
    fn test_depth_limit() {
        let tree = FakeNode::node(
            "a",
            0,
            1,
            vec![FakeNode::node("b", 0, 1, vec![FakeNode::leaf("c", 0, 1)])],
        );

        let serializer = TreeSerializer::default().with_max_depth(3);
        assert!(serializer.serialize(&tree, b"x").is_ok());

        let err = TreeSerializer::default()
            .with_max_depth(2)
            .serialize(&tree, b"x")
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DepthLimit);
        assert_eq!(
            err.to_string(),
            "Syntax tree exceeds the maximum depth of 2"
        );
    }

    #[test]
    fn test_binary_bytes_pass_through_until_encoding() {
        let source = [b'"', 0xff, b'"'];
        let tree = FakeNode::leaf("str", 0, 3);

        let record = TreeSerializer::default().serialize(&tree, &source).unwrap();
        assert_eq!(record.text.as_ref().unwrap().as_bytes(), &source);

        let err = serde_json::to_string(&record).unwrap_err();
        assert!(err.to_string().contains("not valid UTF-8"));
    }

    #[test]
    fn test_record_json_shape() {
        let tree = FakeNode::node("root", 0, 2, vec![FakeNode::leaf("x", 0, 2)]);
        let record = TreeSerializer::new(TextPolicy::Raw)
            .serialize(&tree, b"hi")
            .unwrap();

        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "type": "root",
                "text": "hi",
                "start_byte": 0,
                "end_byte": 2,
                "children": [
                    {"type": "x", "text": "hi", "start_byte": 0, "end_byte": 2}
                ]
            })
        );
    }

    #[test]
    fn test_clean_text() {
        assert_eq!(clean_text(b"a\r\nb\rc\n"), b"abc");
        assert_eq!(clean_text(b""), b"");
        assert_eq!(clean_text(b"\t tab stays"), b"\t tab stays");
    }

    #[test]
    fn test_cleaned_extraction_fills_reserved_buffer() {
        let source = "ab\r\n".repeat(1000);
        let text = TreeSerializer::default()
            .extract_text("str", 0, source.len(), source.as_bytes())
            .unwrap()
            .unwrap();
        assert_eq!(text.as_bytes(), clean_text(source.as_bytes()).as_slice());
        assert_eq!(text.len(), 2000);
    }
}
