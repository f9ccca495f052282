use serde::Serialize;
use std::fmt;

/// A location in the source text. Lines and columns both start at 1.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

#[derive(Debug, PartialEq, Clone, Serialize)]
pub struct Token {
    pub kind: Kind,
    pub value: String,
    pub start: Position,
    /// One past the last character of the token.
    pub end: Position,
}

impl Token {
    pub fn new(kind: Kind, value: impl Into<String>, start: Position, end: Position) -> Self {
        Self {
            kind,
            value: value.into(),
            start,
            end,
        }
    }

    pub fn is(&self, kind: Kind, value: &str) -> bool {
        self.kind == kind && self.value == value
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize)]
pub enum Kind {
    // Keywords
    Const,       // const
    Var,         // var
    Identifier,  // x y foo _bar

    // Literals
    Null,        // null
    Void,        // void
    Byte,        // 0b 100b 255B
    Integer,     // 10 1995 999i
    Float,       // 10f .15f 19.1
    Double,      // 10d .45d 78D
    Long,        // 10l 78944013500L
    Char,        // 'c' '\n' 'A'
    String,      // "Hello World"
    Boolean,     // true false

    // Operators
    EqualsOperator,     // =
    BinaryOperator,     // + - * / %
    AssignmentOperator, // += -= *= /= %= ++ --
    CompareOperator,    // == != <= >= < >
    JointOperator,      // && || and or
    NotOperator,        // ! not

    // Punctuation
    AtSign,       // @
    DollarSign,   // $
    QuestionMark, // ?
    Ampersand,    // &
    Comma,        // ,
    Dot,          // .
    Colon,        // :
    DoubleColon,  // ::
    Semicolon,    // ;

    // Brackets
    OpenParen,    // (
    CloseParen,   // )
    OpenBrace,    // {
    CloseBrace,   // }
    OpenBracket,  // [
    CloseBracket, // ]

    EndOfFile,
    EmptyToken,   // comments, never emitted
}

/// Reserved words and the token kind each one scans to.
pub static KEYWORDS: &[(&str, Kind)] = &[
    ("const", Kind::Const),
    ("var", Kind::Var),
    ("void", Kind::Void),
    ("null", Kind::Null),
    ("true", Kind::Boolean),
    ("false", Kind::Boolean),
    ("and", Kind::JointOperator),
    ("or", Kind::JointOperator),
    ("not", Kind::NotOperator),
];

pub fn keyword(ident: &str) -> Option<Kind> {
    KEYWORDS
        .iter()
        .find(|(word, _)| *word == ident)
        .map(|(_, kind)| *kind)
}
