//! CST-aware lexer that preserves all trivia (whitespace, comments)
//!
//! Every byte of the input ends up in exactly one token, so concatenating the
//! token texts reproduces the source. Characters that do not start any token
//! are emitted as [`MylangSyntaxKind::Error`] tokens and reported as
//! [`LexerError`]s; lexing itself never fails.

use crate::cst::MylangSyntaxKind;
use std::ops::Range;

/// Simple span representing a byte range in the source
pub type CstSpan = Range<usize>;

/// A lexer error
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexerError {
    pub message: String,
    pub span: CstSpan,
}

impl LexerError {
    pub fn new(message: impl Into<String>, span: CstSpan) -> Self {
        Self {
            message: message.into(),
            span,
        }
    }
}

/// A token with its syntax kind and span
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CstToken {
    pub kind: MylangSyntaxKind,
    pub text: String,
    pub span: CstSpan,
}

impl CstToken {
    pub fn new(kind: MylangSyntaxKind, text: impl Into<String>, span: CstSpan) -> Self {
        Self {
            kind,
            text: text.into(),
            span,
        }
    }
}

/// Result returned by the CST lexer
pub type CstLexResult = (Vec<CstToken>, Vec<LexerError>);

/// Lex input preserving ALL trivia for CST construction
pub fn lex_with_trivia(input: &str) -> CstLexResult {
    let mut tokens = Vec::new();
    let mut errors = Vec::new();
    let len = input.len();
    let mut i = 0usize;

    while i < len {
        let Some((current, size)) = next_char(input, i) else {
            break;
        };
        let start = i;

        let (kind, end) = match current {
            c if c.is_whitespace() => {
                let mut end = i + size;
                while let Some((next, next_size)) = next_char(input, end) {
                    if !next.is_whitespace() {
                        break;
                    }
                    end += next_size;
                }
                (MylangSyntaxKind::Whitespace, end)
            }

            '/' if peek(input, i + size) == Some('/') => {
                // Runs to the end of the line, line terminator excluded
                let end = input[start..]
                    .find(['\n', '\r'])
                    .map_or(len, |offset| start + offset);
                (MylangSyntaxKind::Comment, end)
            }

            '"' => match lex_string(input, start) {
                Ok(end) => (MylangSyntaxKind::Str, end),
                Err(end) => {
                    errors.push(LexerError::new(
                        "unterminated string literal",
                        span(start, end),
                    ));
                    (MylangSyntaxKind::Error, end)
                }
            },

            '\'' => match lex_char(input, start) {
                Some(end) => (MylangSyntaxKind::Char, end),
                None => {
                    errors.push(LexerError::new(
                        "invalid character literal",
                        span(start, i + size),
                    ));
                    (MylangSyntaxKind::Error, i + size)
                }
            },

            '0'..='9' => lex_number(input, start),

            c if c.is_ascii_alphabetic() || c == '_' => {
                let end = scan_while(input, start, |c| c.is_ascii_alphanumeric() || c == '_');
                let kind = MylangSyntaxKind::from_keyword(&input[start..end])
                    .unwrap_or(MylangSyntaxKind::Identifier);
                (kind, end)
            }

            _ => match lex_punctuation(input, start, current, size) {
                Some(token) => token,
                None => {
                    errors.push(LexerError::new(
                        format!("unexpected character '{}'", current.escape_debug()),
                        span(start, i + size),
                    ));
                    (MylangSyntaxKind::Error, i + size)
                }
            },
        };

        tokens.push(CstToken::new(kind, &input[start..end], span(start, end)));
        i = end;
    }

    (tokens, errors)
}

/// Lex a double-quoted string starting at `start`.
///
/// Strings may span lines and use backslash escapes. An unterminated string
/// consumes the rest of its line and is returned as `Err(end)`.
fn lex_string(input: &str, start: usize) -> Result<usize, usize> {
    let mut end = start + 1;
    while let Some((c, size)) = next_char(input, end) {
        match c {
            '"' => return Ok(end + size),
            '\\' => {
                end += size;
                if let Some((_, escaped)) = next_char(input, end) {
                    end += escaped;
                }
            }
            _ => end += size,
        }
    }

    let line_end = input[start..]
        .find('\n')
        .map_or(input.len(), |offset| start + offset);
    Err(line_end)
}

/// Lex a character literal: exactly one character between single quotes.
fn lex_char(input: &str, start: usize) -> Option<usize> {
    let (inner, inner_size) = next_char(input, start + 1)?;
    if inner == '\'' {
        return None;
    }
    let close = start + 1 + inner_size;
    (peek(input, close) == Some('\'')).then_some(close + 1)
}

fn lex_number(input: &str, start: usize) -> (MylangSyntaxKind, usize) {
    let bytes = input.as_bytes();
    if bytes[start] == b'0' {
        match bytes.get(start + 1) {
            Some(b'x' | b'X') => {
                let end = scan_while(input, start + 2, |c| c.is_ascii_hexdigit());
                if end > start + 2 {
                    return (MylangSyntaxKind::Hex, end);
                }
            }
            Some(b'b' | b'B') => {
                let end = scan_while(input, start + 2, |c| c == '0' || c == '1');
                if end > start + 2 {
                    return (MylangSyntaxKind::Bits, end);
                }
            }
            _ => {}
        }
    }
    (
        MylangSyntaxKind::Dec,
        scan_while(input, start, |c| c.is_ascii_digit()),
    )
}

fn lex_punctuation(
    input: &str,
    start: usize,
    current: char,
    size: usize,
) -> Option<(MylangSyntaxKind, usize)> {
    use crate::cst::MylangSyntaxKind as K;

    let next = peek(input, start + size);
    let single = |kind| Some((kind, start + size));
    let double = |kind| Some((kind, start + size + 1));

    match (current, next) {
        ('.', Some('.')) => double(K::DotDot),
        ('|', Some('|')) => double(K::PipePipe),
        ('&', Some('&')) => double(K::AmpAmp),
        ('=', Some('=')) => double(K::EqEq),
        ('!', Some('=')) => double(K::BangEq),
        ('<', Some('=')) => double(K::LtEq),
        ('<', Some('<')) => double(K::Shl),
        ('>', Some('=')) => double(K::GtEq),
        ('>', Some('>')) => double(K::Shr),
        ('(', _) => single(K::LParen),
        (')', _) => single(K::RParen),
        ('[', _) => single(K::LBracket),
        (']', _) => single(K::RBracket),
        ('{', _) => single(K::LBrace),
        ('}', _) => single(K::RBrace),
        (',', _) => single(K::Comma),
        (';', _) => single(K::Semicolon),
        ('|', _) => single(K::Pipe),
        ('^', _) => single(K::Caret),
        ('&', _) => single(K::Amp),
        ('<', _) => single(K::Lt),
        ('>', _) => single(K::Gt),
        ('+', _) => single(K::Plus),
        ('-', _) => single(K::Minus),
        ('*', _) => single(K::Star),
        ('/', _) => single(K::Slash),
        ('%', _) => single(K::Percent),
        ('!', _) => single(K::Bang),
        ('~', _) => single(K::Tilde),
        _ => None,
    }
}

fn scan_while(input: &str, start: usize, accept: impl Fn(char) -> bool) -> usize {
    let mut end = start;
    while let Some((c, size)) = next_char(input, end) {
        if !accept(c) {
            break;
        }
        end += size;
    }
    end
}

fn next_char(input: &str, index: usize) -> Option<(char, usize)> {
    input
        .get(index..)
        .and_then(|rest| rest.chars().next())
        .map(|c| (c, c.len_utf8()))
}

fn peek(input: &str, index: usize) -> Option<char> {
    next_char(input, index).map(|(c, _)| c)
}

fn span(start: usize, end: usize) -> CstSpan {
    start..end
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cst::MylangSyntaxKind as K;

    fn kinds(input: &str) -> Vec<MylangSyntaxKind> {
        let (tokens, errors) = lex_with_trivia(input);
        assert!(errors.is_empty(), "unexpected errors: {errors:?}");
        tokens
            .into_iter()
            .filter(|t| !t.kind.is_trivia())
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn test_lossless() {
        let input = "def main() // entry\n  x = 1;\n\t@ end";
        let (tokens, _) = lex_with_trivia(input);
        let rebuilt: String = tokens.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(rebuilt, input);
        for token in &tokens {
            assert_eq!(&input[token.span.clone()], token.text);
        }
    }

    #[test]
    fn test_keywords_and_identifiers() {
        assert_eq!(
            kinds("def iffy if int integer"),
            vec![K::DefKw, K::Identifier, K::IfKw, K::IntKw, K::Identifier]
        );
    }

    #[test]
    fn test_numbers() {
        assert_eq!(
            kinds("42 0x1F 0b101 0x 0b2"),
            vec![
                K::Dec,
                K::Hex,
                K::Bits,
                K::Dec,
                K::Identifier,
                K::Dec,
                K::Identifier
            ]
        );
    }

    #[test]
    fn test_operators_prefer_longest_match() {
        assert_eq!(
            kinds("|| | && & == != <= << < >= >> > .."),
            vec![
                K::PipePipe,
                K::Pipe,
                K::AmpAmp,
                K::Amp,
                K::EqEq,
                K::BangEq,
                K::LtEq,
                K::Shl,
                K::Lt,
                K::GtEq,
                K::Shr,
                K::Gt,
                K::DotDot
            ]
        );
    }

    #[test]
    fn test_comment_stops_at_line_end() {
        let (tokens, _) = lex_with_trivia("a // note\r\nb");
        let comment = tokens.iter().find(|t| t.kind == K::Comment).unwrap();
        assert_eq!(comment.text, "// note");
        assert_eq!(tokens.last().unwrap().kind, K::Identifier);
    }

    #[test]
    fn test_multiline_string() {
        let (tokens, errors) = lex_with_trivia("\"line1\nline2\" \"a\\\"b\"");
        assert!(errors.is_empty());
        assert_eq!(tokens[0].kind, K::Str);
        assert_eq!(tokens[0].text, "\"line1\nline2\"");
        assert_eq!(tokens[2].text, "\"a\\\"b\"");
    }

    #[test]
    fn test_char_literal() {
        assert_eq!(kinds("'a' ' '"), vec![K::Char, K::Char]);
    }

    #[test]
    fn test_errors_are_tokens() {
        let (tokens, errors) = lex_with_trivia("x = 1");
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].span, 2..3);
        assert!(tokens.iter().any(|t| t.kind == K::Error && t.text == "="));
    }

    #[test]
    fn test_unterminated_string_stops_at_line_end() {
        let (tokens, errors) = lex_with_trivia("\"open\nnext");
        assert_eq!(errors.len(), 1);
        assert_eq!(tokens[0].kind, K::Error);
        assert_eq!(tokens[0].text, "\"open");
        assert_eq!(tokens.last().unwrap().text, "next");
    }

    #[test]
    fn test_empty_char_literal_is_error() {
        let (tokens, errors) = lex_with_trivia("''");
        assert_eq!(errors.len(), 2);
        assert!(tokens.iter().all(|t| t.kind == K::Error));
    }
}
