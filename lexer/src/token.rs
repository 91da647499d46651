use logos::Logos;
use std::fmt;

/// The full token alphabet this lexer recognizes.
///
/// Keyword/operator coverage follows ISO C's declarator and statement
/// grammar to the extent `semantic_analysis` needs it: storage classes
/// (`static`, `extern`), the four loop/jump statements plus `goto` and
/// labels, the full scalar type family, and the compound-assignment
/// operator family.
#[derive(Debug, PartialEq, Clone, Copy, Logos)]
#[logos(skip r"[ \t\r\n\f]+")]
#[logos(skip r"//[^\n]*")]
#[logos(skip r"/\*([^*]|\*+[^*/])*\*+/")]
pub enum Token {
    // Keywords
    #[token("return")]
    Return,
    #[token("int")]
    Int,
    #[token("long")]
    Long,
    #[token("unsigned")]
    Unsigned,
    #[token("double")]
    Double,
    #[token("void")]
    Void,
    #[token("if")]
    If,
    #[token("else")]
    Else,
    #[token("while")]
    While,
    #[token("do")]
    Do,
    #[token("for")]
    For,
    #[token("break")]
    Break,
    #[token("continue")]
    Continue,
    #[token("goto")]
    Goto,
    #[token("static")]
    Static,
    #[token("extern")]
    Extern,

    // Identifiers and literals.
    //
    // Suffix letters on an integer constant are matched greedily by one
    // regex per combination rather than stripped in a later pass, since
    // `logos` picks the longest match and a shorter `ConstantInt` regex
    // would otherwise win over, say, `10L`.
    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*", priority = 0)]
    Identifier,
    #[regex(r"\d+[uU][lL]|\d+[lL][uU]")]
    ConstantULong,
    #[regex(r"\d+[lL]")]
    ConstantLong,
    #[regex(r"\d+[uU]")]
    ConstantUInt,
    #[regex(r"\d+")]
    ConstantInt,
    #[regex(r"(\d+\.\d*|\.\d+|\d+)[eE][+-]?\d+|\d+\.\d*|\.\d+")]
    ConstantDouble,

    // Invalid patterns: a numeric literal immediately followed by an
    // identifier character, e.g. `9main`.
    #[regex(r"\d+[a-zA-Z_][a-zA-Z0-9_]*")]
    Invalid,

    // Multi-character operators and punctuation must be listed before
    // their single-character prefixes so `logos`'s longest-match rule
    // picks them correctly.
    #[token("--")]
    Dec,
    #[token("+=")]
    AddAssign,
    #[token("-=")]
    SubAssign,
    #[token("*=")]
    MulAssign,
    #[token("/=")]
    DivAssign,
    #[token("%=")]
    ModAssign,
    #[token("&&")]
    LogicalAnd,
    #[token("||")]
    LogicalOr,
    #[token("==")]
    Equal,
    #[token("!=")]
    NotEqual,
    #[token("<=")]
    LessThanOrEq,
    #[token(">=")]
    GreaterThanOrEq,

    #[token("-")]
    Neg,
    #[token("+")]
    Add,
    #[token("*")]
    Mul,
    #[token("/")]
    Div,
    #[token("%")]
    Mod,
    #[token("!")]
    LogicalNot,
    #[token("~")]
    Not,
    #[token("&")]
    Ampersand,
    #[token("<")]
    LessThan,
    #[token(">")]
    GreaterThan,
    #[token("=")]
    Assignment,
    #[token("?")]
    QuestionMark,
    #[token(":")]
    Colon,
    #[token(",")]
    Comma,
    #[token(";")]
    Semicolon,
    #[token("(")]
    LeftParenthesis,
    #[token(")")]
    RightParenthesis,
    #[token("{")]
    LeftCurlyBracket,
    #[token("}")]
    RightCurlyBracket,
    #[token("[")]
    LeftBracket,
    #[token("]")]
    RightBracket,
}

impl Token {
    pub fn is_unary(&self) -> bool {
        matches!(self, Token::Neg | Token::Not | Token::LogicalNot)
    }

    pub fn is_binary(&self) -> bool {
        matches!(
            self,
            Token::Add
                | Token::Neg
                | Token::Mul
                | Token::Div
                | Token::Mod
                | Token::LogicalAnd
                | Token::LogicalOr
                | Token::Equal
                | Token::NotEqual
                | Token::LessThan
                | Token::GreaterThan
                | Token::LessThanOrEq
                | Token::GreaterThanOrEq
        )
    }

    pub fn is_compound_assignment(&self) -> bool {
        matches!(
            self,
            Token::AddAssign
                | Token::SubAssign
                | Token::MulAssign
                | Token::DivAssign
                | Token::ModAssign
        )
    }

    /// Binding power for expression-grammar binary operators. Assignment
    /// and the ternary sit below every binary operator since they are
    /// parsed right-associatively by the caller, not through this table.
    pub fn precedence(&self) -> usize {
        match self {
            Token::Mul | Token::Div | Token::Mod => 50,
            Token::Add | Token::Neg => 45,
            Token::LessThan | Token::LessThanOrEq | Token::GreaterThan | Token::GreaterThanOrEq => {
                35
            }
            Token::Equal | Token::NotEqual => 30,
            Token::Ampersand => 20,
            Token::LogicalAnd => 10,
            Token::LogicalOr => 5,
            Token::QuestionMark => 3,
            Token::Assignment
            | Token::AddAssign
            | Token::SubAssign
            | Token::MulAssign
            | Token::DivAssign
            | Token::ModAssign => 1,
            _ => 0,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Identifier => write!(f, "identifier"),
            Token::ConstantInt => write!(f, "int constant"),
            Token::ConstantLong => write!(f, "long constant"),
            Token::ConstantUInt => write!(f, "unsigned int constant"),
            Token::ConstantULong => write!(f, "unsigned long constant"),
            Token::ConstantDouble => write!(f, "double constant"),
            Token::Invalid => write!(f, "invalid token"),

            Token::Return => write!(f, "return"),
            Token::Int => write!(f, "int"),
            Token::Long => write!(f, "long"),
            Token::Unsigned => write!(f, "unsigned"),
            Token::Double => write!(f, "double"),
            Token::Void => write!(f, "void"),
            Token::If => write!(f, "if"),
            Token::Else => write!(f, "else"),
            Token::While => write!(f, "while"),
            Token::Do => write!(f, "do"),
            Token::For => write!(f, "for"),
            Token::Break => write!(f, "break"),
            Token::Continue => write!(f, "continue"),
            Token::Goto => write!(f, "goto"),
            Token::Static => write!(f, "static"),
            Token::Extern => write!(f, "extern"),

            Token::Assignment => write!(f, "="),
            Token::AddAssign => write!(f, "+="),
            Token::SubAssign => write!(f, "-="),
            Token::MulAssign => write!(f, "*="),
            Token::DivAssign => write!(f, "/="),
            Token::ModAssign => write!(f, "%="),
            Token::Neg => write!(f, "-"),
            Token::Dec => write!(f, "--"),
            Token::Add => write!(f, "+"),
            Token::Mul => write!(f, "*"),
            Token::Div => write!(f, "/"),
            Token::Mod => write!(f, "%"),

            Token::LogicalAnd => write!(f, "&&"),
            Token::LogicalOr => write!(f, "||"),
            Token::LogicalNot => write!(f, "!"),

            Token::Equal => write!(f, "=="),
            Token::NotEqual => write!(f, "!="),
            Token::LessThan => write!(f, "<"),
            Token::GreaterThan => write!(f, ">"),
            Token::LessThanOrEq => write!(f, "<="),
            Token::GreaterThanOrEq => write!(f, ">="),

            Token::Not => write!(f, "~"),
            Token::Ampersand => write!(f, "&"),

            Token::LeftParenthesis => write!(f, "("),
            Token::RightParenthesis => write!(f, ")"),
            Token::LeftCurlyBracket => write!(f, "{{"),
            Token::RightCurlyBracket => write!(f, "}}"),
            Token::LeftBracket => write!(f, "["),
            Token::RightBracket => write!(f, "]"),
            Token::Semicolon => write!(f, ";"),
            Token::Colon => write!(f, ":"),
            Token::Comma => write!(f, ","),
            Token::QuestionMark => write!(f, "?"),
        }
    }
}
