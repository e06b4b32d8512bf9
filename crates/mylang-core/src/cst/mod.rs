//! Concrete Syntax Tree (CST) for mylang
//!
//! This module implements a lossless syntax tree using the Rowan library.
//! The CST preserves all source information including whitespace and
//! comments, so `parse(source).text() == source` always holds, and every
//! node knows its exact byte range in the input.
//!
//! ## Architecture
//!
//! - [`lex_with_trivia`] turns source text into tokens, trivia included.
//! - The parser arranges the tokens into a Rowan green tree whose node kinds
//!   follow the mylang grammar rules ([`MylangSyntaxKind`]).
//! - The [`CstNode`](crate::tree::CstNode) view over [`MylangSyntaxElement`]
//!   hides whitespace and is what the serializer walks.
//!
//! ## Example
//!
//! ```rust
//! use mylang_core::cst::{MylangSyntaxKind, parse_mylang};
//!
//! let (cst, _lexer_errors, errors) = parse_mylang("def f() g(1); end // done");
//! assert!(errors.is_empty());
//!
//! let comment = cst
//!     .descendants_with_tokens()
//!     .filter_map(|element| element.into_token())
//!     .find(|token| token.kind() == MylangSyntaxKind::Comment)
//!     .unwrap();
//! assert_eq!(comment.text(), "// done");
//! ```

mod builder;
mod language;
mod lexer;
mod parser;
mod syntax_kind;
mod view;

pub use builder::CstBuilder;
pub use language::{MylangLanguage, MylangSyntaxElement, MylangSyntaxNode, MylangSyntaxToken};
pub use lexer::{CstLexResult, CstSpan, CstToken, LexerError, lex_with_trivia};
pub use parser::{MAX_CHAIN, MAX_NESTING, SyntaxError, parse_mylang};
pub use syntax_kind::MylangSyntaxKind;
