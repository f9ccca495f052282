use crate::error::LexError;
use crate::token::{keyword, Kind, Position, Token};

pub struct Lexer {
    chars: Vec<char>,
    current: usize,
    line: usize,
    column: usize,
    start: Position,
}

impl Lexer {
    pub fn new(input: &str) -> Self {
        Self {
            chars: input.chars().collect(),
            current: 0,
            line: 1,
            column: 1,
            start: Position::new(1, 1),
        }
    }

    fn at(&self) -> char {
        if self.current >= self.chars.len() {
            '\0'
        } else {
            self.chars[self.current]
        }
    }

    fn peek(&self) -> char {
        self.chars.get(self.current + 1).copied().unwrap_or('\0')
    }

    fn advance(&mut self) -> char {
        let ch = self.at();
        self.current += 1;
        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        ch
    }

    fn is_eof(&self) -> bool {
        self.current >= self.chars.len()
    }

    fn location(&self) -> Position {
        Position::new(self.line, self.column)
    }

    fn create_token(&self, kind: Kind, value: impl Into<String>) -> Token {
        Token::new(kind, value, self.start, self.location())
    }

    fn error(&self, message: impl Into<String>) -> LexError {
        LexError::new(message, self.start)
    }

    pub fn tokenize(&mut self) -> Result<Vec<Token>, LexError> {
        let mut tokens = Vec::new();

        while !self.is_eof() {
            if matches!(self.at(), ' ' | '\t' | '\r' | '\n') {
                self.advance();
                continue;
            }

            self.start = self.location();
            let token = self.scan_token()?;
            if token.kind != Kind::EmptyToken {
                tokens.push(token);
            }
        }

        self.start = self.location();
        tokens.push(self.create_token(Kind::EndOfFile, ""));

        Ok(tokens)
    }

    fn scan_token(&mut self) -> Result<Token, LexError> {
        let ch = self.at();
        let punctuation = match ch {
            '@' => Some(Kind::AtSign),
            '$' => Some(Kind::DollarSign),
            '?' => Some(Kind::QuestionMark),
            ',' => Some(Kind::Comma),
            ';' => Some(Kind::Semicolon),
            '(' => Some(Kind::OpenParen),
            ')' => Some(Kind::CloseParen),
            '{' => Some(Kind::OpenBrace),
            '}' => Some(Kind::CloseBrace),
            '[' => Some(Kind::OpenBracket),
            ']' => Some(Kind::CloseBracket),
            _ => None,
        };

        if let Some(kind) = punctuation {
            self.advance();
            return Ok(self.create_token(kind, ch.to_string()));
        }

        match ch {
            c if c.is_ascii_digit() => self.scan_number(false),
            c if c.is_alphabetic() || c == '_' => self.scan_identifier(),
            '.' => {
                self.advance();
                if self.at().is_ascii_digit() {
                    self.scan_number(true)
                } else {
                    Ok(self.create_token(Kind::Dot, "."))
                }
            }
            '"' => self.scan_string(),
            '\'' => self.scan_char(),
            _ => self.scan_operator(),
        }
    }

    fn scan_identifier(&mut self) -> Result<Token, LexError> {
        let mut ident = String::new();
        while !self.is_eof() && (self.at().is_alphanumeric() || self.at() == '_') {
            ident.push(self.advance());
        }

        if ident.chars().all(|c| c == '_') {
            return Err(self.error(format!("Invalid identifier name: '{}'", ident)));
        }

        let kind = keyword(&ident).unwrap_or(Kind::Identifier);
        Ok(self.create_token(kind, ident))
    }

    /// Scans digits with an optional fraction and kind suffix. When `dot_started`
    /// the leading `.` has already been consumed.
    fn scan_number(&mut self, dot_started: bool) -> Result<Token, LexError> {
        let mut number = String::from(if dot_started { "0." } else { "" });
        let mut is_fractional = dot_started;

        loop {
            let c = self.at();
            if c.is_ascii_digit() {
                number.push(self.advance());
            } else if !is_fractional && c == '.' && self.peek().is_ascii_digit() {
                is_fractional = true;
                number.push(self.advance());
            } else {
                break;
            }
        }

        let kind = match self.at().to_ascii_lowercase() {
            'b' => Kind::Byte,
            'i' => Kind::Integer,
            'l' => Kind::Long,
            'f' => Kind::Float,
            'd' => Kind::Double,
            _ if is_fractional => return Ok(self.create_token(Kind::Float, number)),
            _ => return Ok(self.create_token(Kind::Integer, number)),
        };
        self.advance();

        if kind == Kind::Byte && !matches!(number.parse::<u32>(), Ok(0..=255)) {
            return Err(self.error(format!("Invalid byte value: '{}'", number)));
        }

        Ok(self.create_token(kind, number))
    }

    fn scan_string(&mut self) -> Result<Token, LexError> {
        self.advance(); // opening quote
        let mut value = String::new();

        loop {
            if self.is_eof() {
                return Err(self.error("Missing string closing quote"));
            }
            match self.at() {
                '\\' => value.push(self.scan_escape()?),
                '"' => {
                    self.advance();
                    break;
                }
                _ => value.push(self.advance()),
            }
        }

        Ok(self.create_token(Kind::String, value))
    }

    fn scan_char(&mut self) -> Result<Token, LexError> {
        self.advance(); // opening quote

        let value = match self.at() {
            _ if self.is_eof() => return Err(self.error("Missing char closing quote")),
            '\'' => return Err(self.error("Missing char value")),
            '\\' => self.scan_escape()?,
            '\n' | '\r' | '\t' => return Err(self.error("Invalid character in char literal")),
            _ => self.advance(),
        };

        if self.is_eof() {
            return Err(self.error("Missing char closing quote"));
        }
        if self.at() != '\'' {
            return Err(self.error("Char literal expects exactly one character"));
        }
        self.advance();

        Ok(self.create_token(Kind::Char, value.to_string()))
    }

    /// Decodes one escape sequence starting at the backslash.
    fn scan_escape(&mut self) -> Result<char, LexError> {
        let position = self.location();
        self.advance(); // backslash

        if self.is_eof() {
            return Err(LexError::new("Incomplete escape sequence", position));
        }

        let decoded = match self.advance() {
            'u' => self.scan_code_point(4, "Unicode", position)?,
            'x' => self.scan_code_point(2, "Hexadecimal", position)?,
            'n' => '\n',
            't' => '\t',
            'r' => '\r',
            '0' => '\0',
            'a' => '\u{07}',
            'b' => '\u{08}',
            'f' => '\u{0C}',
            'v' => '\u{0B}',
            'e' => '\u{1B}',
            other => other,
        };

        Ok(decoded)
    }

    fn scan_code_point(&mut self, length: usize, name: &str, position: Position) -> Result<char, LexError> {
        let mut digits = String::with_capacity(length);
        for _ in 0..length {
            if self.is_eof() {
                return Err(LexError::new(format!("Incomplete {} escape sequence", name), position));
            }
            if !self.at().is_ascii_alphanumeric() {
                return Err(LexError::new(format!("Invalid {} escape sequence", name), position));
            }
            digits.push(self.advance());
        }

        u32::from_str_radix(&digits, 16)
            .ok()
            .and_then(char::from_u32)
            .ok_or_else(|| LexError::new(format!("Invalid {} escape sequence '{}'", name, digits), position))
    }

    fn scan_operator(&mut self) -> Result<Token, LexError> {
        let ch = self.advance();
        let next = if self.is_eof() { '\0' } else { self.at() };

        let (kind, value) = match (ch, next) {
            ('=', '=') => (Kind::CompareOperator, "=="),
            ('=', _) => (Kind::EqualsOperator, "="),
            ('!', '=') => (Kind::CompareOperator, "!="),
            ('!', _) => (Kind::NotOperator, "!"),
            ('<', '=') => (Kind::CompareOperator, "<="),
            ('<', _) => (Kind::CompareOperator, "<"),
            ('>', '=') => (Kind::CompareOperator, ">="),
            ('>', _) => (Kind::CompareOperator, ">"),
            ('|', '|') => (Kind::JointOperator, "||"),
            ('|', _) => return Err(self.error("Missing second vertical bar: |")),
            ('&', '&') => (Kind::JointOperator, "&&"),
            ('&', _) => (Kind::Ampersand, "&"),
            (':', ':') => (Kind::DoubleColon, "::"),
            (':', _) => (Kind::Colon, ":"),
            ('+', '+') => (Kind::AssignmentOperator, "++"),
            ('+', '=') => (Kind::AssignmentOperator, "+="),
            ('+', _) => (Kind::BinaryOperator, "+"),
            ('-', '-') => (Kind::AssignmentOperator, "--"),
            ('-', '=') => (Kind::AssignmentOperator, "-="),
            ('-', _) => (Kind::BinaryOperator, "-"),
            ('*', '=') => (Kind::AssignmentOperator, "*="),
            ('*', _) => (Kind::BinaryOperator, "*"),
            ('/', '/') => return Ok(self.skip_line_comment()),
            ('/', '*') => return self.skip_block_comment(),
            ('/', '=') => (Kind::AssignmentOperator, "/="),
            ('/', _) => (Kind::BinaryOperator, "/"),
            ('%', '=') => (Kind::AssignmentOperator, "%="),
            ('%', _) => (Kind::BinaryOperator, "%"),
            _ => return Err(self.error(format!("Unrecognized character '{}'", ch))),
        };

        if value.len() == 2 {
            self.advance();
        }

        Ok(self.create_token(kind, value))
    }

    fn skip_line_comment(&mut self) -> Token {
        while !self.is_eof() && self.at() != '\n' {
            self.advance();
        }
        self.create_token(Kind::EmptyToken, "")
    }

    fn skip_block_comment(&mut self) -> Result<Token, LexError> {
        self.advance(); // '*'
        loop {
            if self.is_eof() {
                return Err(self.error("Unterminated multi-line comment"));
            }
            if self.at() == '*' && self.peek() == '/' {
                self.advance();
                self.advance();
                return Ok(self.create_token(Kind::EmptyToken, ""));
            }
            self.advance();
        }
    }
}

pub fn tokenize(source: &str) -> Result<Vec<Token>, LexError> {
    Lexer::new(source).tokenize()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn kinds(source: &str) -> Vec<Kind> {
        tokenize(source).unwrap().into_iter().map(|t| t.kind).collect()
    }

    fn values(source: &str) -> Vec<String> {
        tokenize(source).unwrap().into_iter().map(|t| t.value).collect()
    }

    #[test]
    fn simple_addition() {
        let tokens = tokenize("1 + 2").unwrap();
        assert_eq!(
            tokens,
            vec![
                Token::new(Kind::Integer, "1", Position::new(1, 1), Position::new(1, 2)),
                Token::new(Kind::BinaryOperator, "+", Position::new(1, 3), Position::new(1, 4)),
                Token::new(Kind::Integer, "2", Position::new(1, 5), Position::new(1, 6)),
                Token::new(Kind::EndOfFile, "", Position::new(1, 6), Position::new(1, 6)),
            ]
        );
    }

    #[test]
    fn empty_source_is_only_eof() {
        assert_eq!(kinds(""), vec![Kind::EndOfFile]);
        assert_eq!(kinds("  \n\t "), vec![Kind::EndOfFile]);
    }

    #[test]
    fn integer_literals_round_trip() {
        for n in [0i32, 7, 42, 1995, 65535, i32::MAX] {
            let tokens = tokenize(&n.to_string()).unwrap();
            assert_eq!(tokens[0].kind, Kind::Integer);
            assert_eq!(tokens[0].value.parse::<i32>().unwrap(), n);
        }
    }

    #[test]
    fn number_suffixes() {
        assert_eq!(
            kinds("1b 2i 3l 4f 5d 6L 7D 8"),
            vec![
                Kind::Byte,
                Kind::Integer,
                Kind::Long,
                Kind::Float,
                Kind::Double,
                Kind::Long,
                Kind::Double,
                Kind::Integer,
                Kind::EndOfFile
            ]
        );
        assert_eq!(values("255b 1.5d"), vec!["255", "1.5", ""]);
    }

    #[test]
    fn fractional_literals() {
        assert_eq!(kinds("1.5"), vec![Kind::Float, Kind::EndOfFile]);
        assert_eq!(values(".25"), vec!["0.25", ""]);
        assert_eq!(kinds(".5d"), vec![Kind::Double, Kind::EndOfFile]);
        assert_eq!(kinds("a.b"), vec![Kind::Identifier, Kind::Dot, Kind::Identifier, Kind::EndOfFile]);
    }

    #[test]
    fn byte_out_of_range() {
        let err = tokenize("256b").unwrap_err();
        assert_eq!(err.position, Position::new(1, 1));
        assert!(err.message.contains("byte"));
        assert!(tokenize("1.5b").is_err());
    }

    #[test]
    fn keywords_and_identifiers() {
        assert_eq!(
            kinds("const var void null true false and or not foo _bar x1"),
            vec![
                Kind::Const,
                Kind::Var,
                Kind::Void,
                Kind::Null,
                Kind::Boolean,
                Kind::Boolean,
                Kind::JointOperator,
                Kind::JointOperator,
                Kind::NotOperator,
                Kind::Identifier,
                Kind::Identifier,
                Kind::Identifier,
                Kind::EndOfFile
            ]
        );
    }

    #[test]
    fn underscore_only_identifier_is_rejected() {
        let err = tokenize("x + __").unwrap_err();
        assert_eq!(err.position, Position::new(1, 5));
    }

    #[test]
    fn operators() {
        assert_eq!(
            values("== != <= >= < > && || :: : += -= *= /= %= ++ -- = ! & + - * / %"),
            vec![
                "==", "!=", "<=", ">=", "<", ">", "&&", "||", "::", ":", "+=", "-=", "*=", "/=",
                "%=", "++", "--", "=", "!", "&", "+", "-", "*", "/", "%", ""
            ]
        );
        assert_eq!(kinds("%"), vec![Kind::BinaryOperator, Kind::EndOfFile]);
        assert_eq!(kinds("--"), vec![Kind::AssignmentOperator, Kind::EndOfFile]);
    }

    #[test]
    fn lone_vertical_bar_fails() {
        assert!(tokenize("a | b").is_err());
    }

    #[test]
    fn punctuation() {
        assert_eq!(
            kinds("@$?,;(){}[]"),
            vec![
                Kind::AtSign,
                Kind::DollarSign,
                Kind::QuestionMark,
                Kind::Comma,
                Kind::Semicolon,
                Kind::OpenParen,
                Kind::CloseParen,
                Kind::OpenBrace,
                Kind::CloseBrace,
                Kind::OpenBracket,
                Kind::CloseBracket,
                Kind::EndOfFile
            ]
        );
    }

    #[test]
    fn string_escapes_are_decoded() {
        let tokens = tokenize(r#""a\tb\"cA\x42\q""#).unwrap();
        assert_eq!(tokens[0].kind, Kind::String);
        assert_eq!(tokens[0].value, "a\tb\"cABq");
    }

    #[test]
    fn unterminated_string_points_at_opening_quote() {
        let err = tokenize("1 + \"abc").unwrap_err();
        assert_eq!(err.position, Position::new(1, 5));
    }

    #[test]
    fn unicode_escapes_are_decoded() {
        let tokens = tokenize(r#""\u0041\u00e9" '\u0042'"#).unwrap();
        assert_eq!(tokens[0].kind, Kind::String);
        assert_eq!(tokens[0].value, "A\u{e9}");
        assert_eq!(tokens[1].kind, Kind::Char);
        assert_eq!(tokens[1].value, "B");
    }

    #[test]
    fn surrogate_code_points_are_rejected() {
        let err = tokenize(r#""ab\uD800""#).unwrap_err();
        assert!(err.message.contains("Unicode"));
        assert_eq!(err.position, Position::new(1, 4));
        assert!(tokenize(r"'\uDFFF'").is_err());
    }

    #[test]
    fn bad_escape_lengths() {
        assert!(tokenize(r#""\u41""#).is_err());
        assert!(tokenize(r#""\x4""#).is_err());
        assert!(tokenize(r#""\uZZZZ""#).is_err());
    }

    #[test]
    fn char_literals() {
        assert_eq!(values(r"'c' '\n' 'A'"), vec!["c", "\n", "A", ""]);
        assert!(tokenize("''").is_err());
        assert!(tokenize("'ab'").is_err());
        assert!(tokenize("'a").is_err());
    }

    #[test]
    fn comments_produce_no_tokens() {
        assert_eq!(
            kinds("1 // one\n/* two\n three */ 3"),
            vec![Kind::Integer, Kind::Integer, Kind::EndOfFile]
        );
        assert!(tokenize("/* never closed").is_err());
    }

    #[test]
    fn newline_tracks_lines() {
        let tokens = tokenize("1\n  22").unwrap();
        assert_eq!(tokens[1].start, Position::new(2, 3));
        assert_eq!(tokens[1].end, Position::new(2, 5));
    }

    #[test]
    fn unrecognized_character() {
        let err = tokenize("1 # 2").unwrap_err();
        assert_eq!(err.position, Position::new(1, 3));
    }
}
