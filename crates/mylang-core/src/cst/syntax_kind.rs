//! Syntax kinds for the mylang grammar
//!
//! Every token and node in the CST carries one of these kinds. The textual
//! name returned by [`MylangSyntaxKind::as_str`] is the node type that ends up
//! in serialized documents: named rules use their rule name (`func_def`,
//! `binary_expr`, ...) and anonymous tokens use their literal spelling
//! (`def`, `(`, `;`, ...).

/// All syntax kinds of the mylang CST.
///
/// Discriminants are contiguous so that raw rowan kinds map back through
/// [`MylangSyntaxKind::ALL`] by index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u16)]
pub enum MylangSyntaxKind {
    // Trivia
    Whitespace = 0,
    Comment,

    // Keywords
    DefKw,
    EndKw,
    OfKw,
    ArrayKw,
    IfKw,
    ThenKw,
    ElseKw,
    WhileKw,
    UntilKw,
    BreakKw,
    BeginKw,
    TrueKw,
    FalseKw,

    // Builtin type keywords
    BoolKw,
    ByteKw,
    IntKw,
    UintKw,
    LongKw,
    UlongKw,
    CharKw,
    StringKw,

    // Punctuation
    LParen,
    RParen,
    LBracket,
    RBracket,
    LBrace,
    RBrace,
    Comma,
    Semicolon,
    DotDot,

    // Operators
    PipePipe,
    AmpAmp,
    Pipe,
    Caret,
    Amp,
    EqEq,
    BangEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    Shl,
    Shr,
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Bang,
    Tilde,

    // Literals & identifiers
    Identifier,
    Str,
    Char,
    Hex,
    Bits,
    Dec,

    // Operator tokens re-labelled by the parser
    BinOp,
    UnOp,

    // Structure nodes
    Source,
    FuncDef,
    FuncSignature,
    Arg,
    TypeRef,
    BuiltinType,
    CustomType,
    ArrayType,
    IfStmt,
    LoopStmt,
    RepeatStmt,
    BreakStmt,
    ExprStmt,
    BlockStmt,
    BinaryExpr,
    UnaryExpr,
    CallExpr,
    SliceExpr,
    ParenthesizedExpr,
    PrimaryExpr,
    Range,
    Literal,

    // Special
    Error,
    Eof,
}

impl MylangSyntaxKind {
    /// Every kind, indexed by its discriminant.
    pub const ALL: &'static [MylangSyntaxKind] = &[
        Self::Whitespace,
        Self::Comment,
        Self::DefKw,
        Self::EndKw,
        Self::OfKw,
        Self::ArrayKw,
        Self::IfKw,
        Self::ThenKw,
        Self::ElseKw,
        Self::WhileKw,
        Self::UntilKw,
        Self::BreakKw,
        Self::BeginKw,
        Self::TrueKw,
        Self::FalseKw,
        Self::BoolKw,
        Self::ByteKw,
        Self::IntKw,
        Self::UintKw,
        Self::LongKw,
        Self::UlongKw,
        Self::CharKw,
        Self::StringKw,
        Self::LParen,
        Self::RParen,
        Self::LBracket,
        Self::RBracket,
        Self::LBrace,
        Self::RBrace,
        Self::Comma,
        Self::Semicolon,
        Self::DotDot,
        Self::PipePipe,
        Self::AmpAmp,
        Self::Pipe,
        Self::Caret,
        Self::Amp,
        Self::EqEq,
        Self::BangEq,
        Self::Lt,
        Self::LtEq,
        Self::Gt,
        Self::GtEq,
        Self::Shl,
        Self::Shr,
        Self::Plus,
        Self::Minus,
        Self::Star,
        Self::Slash,
        Self::Percent,
        Self::Bang,
        Self::Tilde,
        Self::Identifier,
        Self::Str,
        Self::Char,
        Self::Hex,
        Self::Bits,
        Self::Dec,
        Self::BinOp,
        Self::UnOp,
        Self::Source,
        Self::FuncDef,
        Self::FuncSignature,
        Self::Arg,
        Self::TypeRef,
        Self::BuiltinType,
        Self::CustomType,
        Self::ArrayType,
        Self::IfStmt,
        Self::LoopStmt,
        Self::RepeatStmt,
        Self::BreakStmt,
        Self::ExprStmt,
        Self::BlockStmt,
        Self::BinaryExpr,
        Self::UnaryExpr,
        Self::CallExpr,
        Self::SliceExpr,
        Self::ParenthesizedExpr,
        Self::PrimaryExpr,
        Self::Range,
        Self::Literal,
        Self::Error,
        Self::Eof,
    ];

    /// Look up a kind by its raw discriminant.
    pub fn from_raw(raw: u16) -> Option<Self> {
        Self::ALL.get(usize::from(raw)).copied()
    }

    /// Node type name as it appears in serialized documents.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Whitespace => "whitespace",
            Self::Comment => "comment",
            Self::DefKw => "def",
            Self::EndKw => "end",
            Self::OfKw => "of",
            Self::ArrayKw => "array",
            Self::IfKw => "if",
            Self::ThenKw => "then",
            Self::ElseKw => "else",
            Self::WhileKw => "while",
            Self::UntilKw => "until",
            Self::BreakKw => "break",
            Self::BeginKw => "begin",
            Self::TrueKw => "true",
            Self::FalseKw => "false",
            Self::BoolKw => "bool",
            Self::ByteKw => "byte",
            Self::IntKw => "int",
            Self::UintKw => "uint",
            Self::LongKw => "long",
            Self::UlongKw => "ulong",
            Self::CharKw => "char",
            Self::StringKw => "string",
            Self::LParen => "(",
            Self::RParen => ")",
            Self::LBracket => "[",
            Self::RBracket => "]",
            Self::LBrace => "{",
            Self::RBrace => "}",
            Self::Comma => ",",
            Self::Semicolon => ";",
            Self::DotDot => "..",
            Self::PipePipe => "||",
            Self::AmpAmp => "&&",
            Self::Pipe => "|",
            Self::Caret => "^",
            Self::Amp => "&",
            Self::EqEq => "==",
            Self::BangEq => "!=",
            Self::Lt => "<",
            Self::LtEq => "<=",
            Self::Gt => ">",
            Self::GtEq => ">=",
            Self::Shl => "<<",
            Self::Shr => ">>",
            Self::Plus => "+",
            Self::Minus => "-",
            Self::Star => "*",
            Self::Slash => "/",
            Self::Percent => "%",
            Self::Bang => "!",
            Self::Tilde => "~",
            Self::Identifier => "identifier",
            Self::Str => "str",
            Self::Char => "char",
            Self::Hex => "hex",
            Self::Bits => "bits",
            Self::Dec => "dec",
            Self::BinOp => "bin_op",
            Self::UnOp => "un_op",
            Self::Source => "source",
            Self::FuncDef => "func_def",
            Self::FuncSignature => "func_signature",
            Self::Arg => "arg",
            Self::TypeRef => "type_ref",
            Self::BuiltinType => "builtin_type",
            Self::CustomType => "custom_type",
            Self::ArrayType => "array_type",
            Self::IfStmt => "if_stmt",
            Self::LoopStmt => "loop_stmt",
            Self::RepeatStmt => "repeat_stmt",
            Self::BreakStmt => "break_stmt",
            Self::ExprStmt => "expr_stmt",
            Self::BlockStmt => "block_stmt",
            Self::BinaryExpr => "binary_expr",
            Self::UnaryExpr => "unary_expr",
            Self::CallExpr => "call_expr",
            Self::SliceExpr => "slice_expr",
            Self::ParenthesizedExpr => "parenthesized_expr",
            Self::PrimaryExpr => "primary_expr",
            Self::Range => "range",
            Self::Literal => "literal",
            Self::Error => "ERROR",
            Self::Eof => "end_of_file",
        }
    }

    /// Resolve a reserved word to its keyword kind.
    pub fn from_keyword(word: &str) -> Option<Self> {
        let kind = match word {
            "def" => Self::DefKw,
            "end" => Self::EndKw,
            "of" => Self::OfKw,
            "array" => Self::ArrayKw,
            "if" => Self::IfKw,
            "then" => Self::ThenKw,
            "else" => Self::ElseKw,
            "while" => Self::WhileKw,
            "until" => Self::UntilKw,
            "break" => Self::BreakKw,
            "begin" => Self::BeginKw,
            "true" => Self::TrueKw,
            "false" => Self::FalseKw,
            "bool" => Self::BoolKw,
            "byte" => Self::ByteKw,
            "int" => Self::IntKw,
            "uint" => Self::UintKw,
            "long" => Self::LongKw,
            "ulong" => Self::UlongKw,
            "char" => Self::CharKw,
            "string" => Self::StringKw,
            _ => return None,
        };
        Some(kind)
    }

    /// Whitespace is lossless in the CST but invisible to serialization.
    pub fn is_trivia(self) -> bool {
        matches!(self, Self::Whitespace)
    }

    /// Tokens that may appear between any two grammar tokens.
    pub fn is_extra(self) -> bool {
        matches!(self, Self::Whitespace | Self::Comment)
    }

    pub fn is_builtin_type(self) -> bool {
        matches!(
            self,
            Self::BoolKw
                | Self::ByteKw
                | Self::IntKw
                | Self::UintKw
                | Self::LongKw
                | Self::UlongKw
                | Self::CharKw
                | Self::StringKw
        )
    }

    pub fn is_literal_token(self) -> bool {
        matches!(
            self,
            Self::TrueKw
                | Self::FalseKw
                | Self::Str
                | Self::Char
                | Self::Hex
                | Self::Bits
                | Self::Dec
        )
    }

    pub fn is_unary_operator(self) -> bool {
        matches!(self, Self::Bang | Self::Minus | Self::Tilde)
    }

    /// Binding power of a binary operator, 1 (loosest) to 10 (tightest).
    ///
    /// All binary operators are left associative.
    pub fn binary_precedence(self) -> Option<u8> {
        let prec = match self {
            Self::PipePipe => 1,
            Self::AmpAmp => 2,
            Self::Pipe => 3,
            Self::Caret => 4,
            Self::Amp => 5,
            Self::EqEq | Self::BangEq => 6,
            Self::Lt | Self::LtEq | Self::Gt | Self::GtEq => 7,
            Self::Shl | Self::Shr => 8,
            Self::Plus | Self::Minus => 9,
            Self::Star | Self::Slash | Self::Percent => 10,
            _ => return None,
        };
        Some(prec)
    }

    /// Named kinds are grammar rules and named tokens; the rest are
    /// anonymous literal tokens.
    pub fn is_named(self) -> bool {
        matches!(
            self,
            Self::Comment
                | Self::Identifier
                | Self::Str
                | Self::Char
                | Self::Hex
                | Self::Bits
                | Self::Dec
                | Self::BinOp
                | Self::UnOp
                | Self::Error
        ) || self >= Self::Source && self <= Self::Literal
    }
}

impl From<MylangSyntaxKind> for rowan::SyntaxKind {
    fn from(kind: MylangSyntaxKind) -> Self {
        rowan::SyntaxKind(kind as u16)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_is_indexed_by_discriminant() {
        for (index, kind) in MylangSyntaxKind::ALL.iter().enumerate() {
            assert_eq!(*kind as usize, index, "{kind:?} is out of place");
        }
        assert_eq!(
            MylangSyntaxKind::ALL.last(),
            Some(&MylangSyntaxKind::Eof),
            "ALL must end with the last variant"
        );
    }

    #[test]
    fn keywords_resolve() {
        assert_eq!(
            MylangSyntaxKind::from_keyword("def"),
            Some(MylangSyntaxKind::DefKw)
        );
        assert_eq!(
            MylangSyntaxKind::from_keyword("ulong"),
            Some(MylangSyntaxKind::UlongKw)
        );
        assert_eq!(MylangSyntaxKind::from_keyword("define"), None);
    }

    #[test]
    fn anonymous_tokens_use_their_spelling() {
        assert_eq!(MylangSyntaxKind::LtEq.as_str(), "<=");
        assert_eq!(MylangSyntaxKind::DotDot.as_str(), "..");
        assert!(!MylangSyntaxKind::LtEq.is_named());
        assert!(MylangSyntaxKind::BinaryExpr.is_named());
        assert!(MylangSyntaxKind::Dec.is_named());
    }

    #[test]
    fn precedence_table() {
        assert_eq!(MylangSyntaxKind::PipePipe.binary_precedence(), Some(1));
        assert_eq!(MylangSyntaxKind::Percent.binary_precedence(), Some(10));
        assert_eq!(MylangSyntaxKind::Bang.binary_precedence(), None);
    }
}
