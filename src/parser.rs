use crate::error::ParseError;
use crate::token::{Kind, Position, Token};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize)]
pub enum NodeKind {
    Tree,

    // Statements
    ScopeStatement,
    VariableStatement,
    AssignmentStatement,

    // Expressions
    BinaryExpression,
    BooleanComparisonExpression,
    BooleanJointExpression,
    BooleanNotExpression,

    Identifier,
    Integer,
    Long,
    Float,
    Double,
    Byte,
    Null,
    Boolean,
    String,
    Char,
}

/// Root of a parsed compilation unit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Tree {
    pub body: Vec<Statement>,
}

impl Tree {
    pub fn kind(&self) -> NodeKind {
        NodeKind::Tree
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Statement {
    Scope(Vec<Statement>),
    Variable {
        identifier: String,
        constant: bool,
        value: Option<Expression>,
    },
    /// `name = value`, or `name op= value` when `operator` is set.
    Assignment {
        identifier: String,
        operator: Option<BinaryOperator>,
        value: Expression,
    },
    Expression(Expression),
}

impl Statement {
    pub fn kind(&self) -> NodeKind {
        match self {
            Statement::Scope(_) => NodeKind::ScopeStatement,
            Statement::Variable { .. } => NodeKind::VariableStatement,
            Statement::Assignment { .. } => NodeKind::AssignmentStatement,
            Statement::Expression(expression) => expression.kind(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Expression {
    Literal(Literal),
    Identifier(String),
    Binary {
        left: Box<Expression>,
        right: Box<Expression>,
        operator: BinaryOperator,
    },
    Comparison {
        left: Box<Expression>,
        right: Box<Expression>,
        operator: CompareOperator,
    },
    Joint {
        left: Box<Expression>,
        right: Box<Expression>,
        operator: JointOperator,
    },
    Not(Box<Expression>),
}

impl Expression {
    pub fn kind(&self) -> NodeKind {
        match self {
            Expression::Literal(literal) => literal.kind(),
            Expression::Identifier(_) => NodeKind::Identifier,
            Expression::Binary { .. } => NodeKind::BinaryExpression,
            Expression::Comparison { .. } => NodeKind::BooleanComparisonExpression,
            Expression::Joint { .. } => NodeKind::BooleanJointExpression,
            Expression::Not(_) => NodeKind::BooleanNotExpression,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Literal {
    Null,
    Boolean(bool),
    String(String),
    Char(char),
    Byte(u8),
    Integer(i32),
    Long(i64),
    Float(#[serde(serialize_with = "crate::value::serialize_f32")] f32),
    Double(#[serde(serialize_with = "crate::value::serialize_f64")] f64),
}

impl Literal {
    pub fn kind(&self) -> NodeKind {
        match self {
            Literal::Null => NodeKind::Null,
            Literal::Boolean(_) => NodeKind::Boolean,
            Literal::String(_) => NodeKind::String,
            Literal::Char(_) => NodeKind::Char,
            Literal::Byte(_) => NodeKind::Byte,
            Literal::Integer(_) => NodeKind::Integer,
            Literal::Long(_) => NodeKind::Long,
            Literal::Float(_) => NodeKind::Float,
            Literal::Double(_) => NodeKind::Double,
        }
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize)]
pub enum BinaryOperator {
    Add,
    Subtract,
    Multiply,
    Divide,
    Remainder,
}

impl BinaryOperator {
    pub fn symbol(&self) -> &'static str {
        match self {
            BinaryOperator::Add => "+",
            BinaryOperator::Subtract => "-",
            BinaryOperator::Multiply => "*",
            BinaryOperator::Divide => "/",
            BinaryOperator::Remainder => "%",
        }
    }

    fn from_symbol(symbol: &str) -> Option<Self> {
        match symbol {
            "+" => Some(BinaryOperator::Add),
            "-" => Some(BinaryOperator::Subtract),
            "*" => Some(BinaryOperator::Multiply),
            "/" => Some(BinaryOperator::Divide),
            "%" => Some(BinaryOperator::Remainder),
            _ => None,
        }
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize)]
pub enum CompareOperator {
    Equal,
    NotEqual,
    GreaterOrEqual,
    LessOrEqual,
    Greater,
    Less,
    Is,
}

impl CompareOperator {
    pub fn symbol(&self) -> &'static str {
        match self {
            CompareOperator::Equal => "==",
            CompareOperator::NotEqual => "!=",
            CompareOperator::GreaterOrEqual => ">=",
            CompareOperator::LessOrEqual => "<=",
            CompareOperator::Greater => ">",
            CompareOperator::Less => "<",
            CompareOperator::Is => "is",
        }
    }

    fn from_token(token: &Token) -> Option<Self> {
        match (token.kind, token.value.as_str()) {
            (Kind::CompareOperator, "==") => Some(CompareOperator::Equal),
            (Kind::CompareOperator, "!=") => Some(CompareOperator::NotEqual),
            (Kind::CompareOperator, ">=") => Some(CompareOperator::GreaterOrEqual),
            (Kind::CompareOperator, "<=") => Some(CompareOperator::LessOrEqual),
            (Kind::CompareOperator, ">") => Some(CompareOperator::Greater),
            (Kind::CompareOperator, "<") => Some(CompareOperator::Less),
            (Kind::Identifier, "is") => Some(CompareOperator::Is),
            _ => None,
        }
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize)]
pub enum JointOperator {
    And,
    Or,
}

impl JointOperator {
    pub fn symbol(&self) -> &'static str {
        match self {
            JointOperator::And => "&&",
            JointOperator::Or => "||",
        }
    }
}

impl fmt::Display for BinaryOperator {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl fmt::Display for CompareOperator {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl fmt::Display for JointOperator {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Deepest expression tree the parser builds. Evaluation, serialization and
/// drop all recurse over the tree.
pub const MAX_EXPRESSION_DEPTH: usize = 256;
/// Deepest nesting of parentheses and blocks.
pub const MAX_NESTING: usize = 128;

pub struct Parser {
    tokens: Vec<Token>,
    current: usize,
    nesting: usize,
    /// Depth of the expression most recently returned by a `parse_*` method.
    depth: usize,
}

impl Parser {
    pub fn new(mut tokens: Vec<Token>) -> Self {
        if tokens.last().map(|t| t.kind) != Some(Kind::EndOfFile) {
            let end = tokens.last().map(|t| t.end).unwrap_or(Position::new(1, 1));
            tokens.push(Token::new(Kind::EndOfFile, "", end, end));
        }
        Self {
            tokens,
            current: 0,
            nesting: 0,
            depth: 0,
        }
    }

    fn at(&self) -> &Token {
        &self.tokens[self.current]
    }

    fn peek(&self) -> &Token {
        let index = (self.current + 1).min(self.tokens.len() - 1);
        &self.tokens[index]
    }

    fn next_token(&mut self) -> Token {
        let token = self.tokens[self.current].clone();
        if !self.is_eof() {
            self.current += 1;
        }
        token
    }

    fn is_eof(&self) -> bool {
        self.at().kind == Kind::EndOfFile
    }

    fn eat(&mut self, expecting: Kind) -> Result<Token, ParseError> {
        if self.at().kind != expecting {
            return Err(ParseError::from_token(
                self.at(),
                format!("Expected [{:?}] but found [{:?}]", expecting, self.at().kind),
            ));
        }

        Ok(self.next_token())
    }

    fn enter(&mut self) -> Result<(), ParseError> {
        if self.nesting >= MAX_NESTING {
            return Err(ParseError::from_token(
                self.at(),
                format!("Nesting exceeds the limit of {}", MAX_NESTING),
            ));
        }
        self.nesting += 1;
        Ok(())
    }

    fn leave(&mut self) {
        self.nesting -= 1;
    }

    /// Records a node built over a child of depth `left` and the child just
    /// parsed.
    fn grow(&mut self, left: usize, token: &Token) -> Result<(), ParseError> {
        self.depth = left.max(self.depth) + 1;
        if self.depth > MAX_EXPRESSION_DEPTH {
            return Err(ParseError::from_token(
                token,
                format!("Expression exceeds the depth limit of {}", MAX_EXPRESSION_DEPTH),
            ));
        }
        Ok(())
    }

    pub fn parse(&mut self) -> Result<Tree, ParseError> {
        let mut tree = Tree { body: Vec::new() };

        while !self.is_eof() {
            let statement = self.parse_statement()?;
            tree.body.push(statement);
        }

        Ok(tree)
    }

    fn parse_statement(&mut self) -> Result<Statement, ParseError> {
        let statement = match self.at().kind {
            Kind::Var | Kind::Const => self.parse_variable_statement()?,
            Kind::OpenBrace => self.parse_scope_statement()?,
            Kind::Identifier
                if matches!(self.peek().kind, Kind::EqualsOperator | Kind::AssignmentOperator) =>
            {
                self.parse_assignment_statement()?
            }
            _ => Statement::Expression(self.parse_expression()?),
        };

        if self.at().kind == Kind::Semicolon {
            self.eat(Kind::Semicolon)?;
        }

        Ok(statement)
    }

    fn parse_variable_statement(&mut self) -> Result<Statement, ParseError> {
        let constant = self.next_token().kind == Kind::Const;
        let identifier = self.eat(Kind::Identifier)?.value;

        let value = if self.at().kind == Kind::EqualsOperator {
            self.eat(Kind::EqualsOperator)?;
            Some(self.parse_expression()?)
        } else if constant {
            return Err(ParseError::from_token(
                self.at(),
                format!("Constant '{}' must be initialized", identifier),
            ));
        } else {
            None
        };

        Ok(Statement::Variable {
            identifier,
            constant,
            value,
        })
    }

    fn parse_scope_statement(&mut self) -> Result<Statement, ParseError> {
        self.enter()?;
        self.eat(Kind::OpenBrace)?;

        let mut statements = Vec::new();
        while !self.is_eof() && self.at().kind != Kind::CloseBrace {
            statements.push(self.parse_statement()?);
        }

        self.eat(Kind::CloseBrace)?;
        self.leave();
        Ok(Statement::Scope(statements))
    }

    fn parse_assignment_statement(&mut self) -> Result<Statement, ParseError> {
        let identifier = self.eat(Kind::Identifier)?.value;
        let operator_token = self.next_token();

        let (operator, value) = match operator_token.value.as_str() {
            "=" => (None, self.parse_expression()?),
            "++" => (Some(BinaryOperator::Add), Expression::Literal(Literal::Integer(1))),
            "--" => (Some(BinaryOperator::Subtract), Expression::Literal(Literal::Integer(1))),
            compound => {
                let operator = compound
                    .strip_suffix('=')
                    .and_then(BinaryOperator::from_symbol)
                    .ok_or_else(|| {
                        ParseError::from_token(&operator_token, "Unknown assignment operator")
                    })?;
                (Some(operator), self.parse_expression()?)
            }
        };

        Ok(Statement::Assignment {
            identifier,
            operator,
            value,
        })
    }

    pub fn parse_expression(&mut self) -> Result<Expression, ParseError> {
        self.parse_joint_expression()
    }

    fn parse_joint_expression(&mut self) -> Result<Expression, ParseError> {
        let mut left = self.parse_comparison_expression()?;

        while self.at().kind == Kind::JointOperator {
            let left_depth = self.depth;
            let token = self.next_token();
            let operator = match token.value.as_str() {
                "&&" | "and" => JointOperator::And,
                _ => JointOperator::Or,
            };
            let right = self.parse_comparison_expression()?;
            self.grow(left_depth, &token)?;

            left = Expression::Joint {
                left: Box::new(left),
                right: Box::new(right),
                operator,
            };
        }

        Ok(left)
    }

    fn parse_comparison_expression(&mut self) -> Result<Expression, ParseError> {
        let mut left = self.parse_not_expression()?;

        while let Some(operator) = CompareOperator::from_token(self.at()) {
            let left_depth = self.depth;
            let token = self.next_token();
            let right = self.parse_not_expression()?;
            self.grow(left_depth, &token)?;

            left = Expression::Comparison {
                left: Box::new(left),
                right: Box::new(right),
                operator,
            };
        }

        Ok(left)
    }

    fn parse_not_expression(&mut self) -> Result<Expression, ParseError> {
        if self.at().kind != Kind::NotOperator {
            return self.parse_additive_expression();
        }

        let token = self.eat(Kind::NotOperator)?;
        let expression = self.parse_additive_expression()?;
        self.grow(0, &token)?;
        Ok(Expression::Not(Box::new(expression)))
    }

    fn parse_additive_expression(&mut self) -> Result<Expression, ParseError> {
        let mut left = self.parse_multiplicative_expression()?;

        while self.at().is(Kind::BinaryOperator, "+") || self.at().is(Kind::BinaryOperator, "-") {
            let left_depth = self.depth;
            let (token, operator) = self.binary_operator()?;
            let right = self.parse_multiplicative_expression()?;
            self.grow(left_depth, &token)?;

            left = Expression::Binary {
                left: Box::new(left),
                right: Box::new(right),
                operator,
            };
        }

        Ok(left)
    }

    fn parse_multiplicative_expression(&mut self) -> Result<Expression, ParseError> {
        let mut left = self.parse_primary_expression()?;

        while self.at().kind == Kind::BinaryOperator && matches!(self.at().value.as_str(), "*" | "/" | "%") {
            let left_depth = self.depth;
            let (token, operator) = self.binary_operator()?;
            let right = self.parse_primary_expression()?;
            self.grow(left_depth, &token)?;

            left = Expression::Binary {
                left: Box::new(left),
                right: Box::new(right),
                operator,
            };
        }

        Ok(left)
    }

    fn binary_operator(&mut self) -> Result<(Token, BinaryOperator), ParseError> {
        let token = self.next_token();
        match BinaryOperator::from_symbol(&token.value) {
            Some(operator) => Ok((token, operator)),
            None => Err(ParseError::from_token(&token, "Unknown binary operator")),
        }
    }

    fn parse_primary_expression(&mut self) -> Result<Expression, ParseError> {
        let literal = match self.at().kind {
            Kind::OpenParen => {
                self.enter()?;
                self.eat(Kind::OpenParen)?;
                let expression = self.parse_expression()?;
                self.eat(Kind::CloseParen)?;
                self.leave();
                return Ok(expression);
            }
            Kind::Identifier => {
                self.depth = 1;
                return Ok(Expression::Identifier(self.next_token().value));
            }
            Kind::BinaryOperator
                if matches!(self.at().value.as_str(), "+" | "-")
                    && matches!(self.peek().kind, Kind::Integer | Kind::Float | Kind::Long | Kind::Double) =>
            {
                self.parse_signed_number()?
            }
            Kind::Boolean => Literal::Boolean(self.next_token().value == "true"),
            Kind::Null => {
                self.next_token();
                Literal::Null
            }
            Kind::String => Literal::String(self.next_token().value),
            Kind::Char => {
                let token = self.next_token();
                let mut chars = token.value.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Literal::Char(c),
                    _ => return Err(ParseError::from_token(&token, "Char literal must hold exactly one character")),
                }
            }
            Kind::Byte => {
                let token = self.next_token();
                Literal::Byte(convert(&token, &token.value)?)
            }
            Kind::Integer | Kind::Long | Kind::Float | Kind::Double => {
                let token = self.next_token();
                number_literal(&token, &token.value)?
            }
            _ => {
                return Err(ParseError::from_token(
                    self.at(),
                    format!("Invalid or unimplemented token [{:?}]", self.at().kind),
                ))
            }
        };

        self.depth = 1;
        Ok(Expression::Literal(literal))
    }

    /// `-5`, `+2.5d`: the sign becomes part of the literal's value.
    fn parse_signed_number(&mut self) -> Result<Literal, ParseError> {
        let sign = self.next_token();
        let token = self.next_token();
        let text = if sign.value == "-" {
            format!("-{}", token.value)
        } else {
            token.value.clone()
        };

        number_literal(&token, &text)
    }
}

fn number_literal(token: &Token, text: &str) -> Result<Literal, ParseError> {
    Ok(match token.kind {
        Kind::Integer => Literal::Integer(convert(token, text)?),
        Kind::Long => Literal::Long(convert(token, text)?),
        Kind::Float => Literal::Float(convert(token, text)?),
        Kind::Double => Literal::Double(convert(token, text)?),
        other => {
            return Err(ParseError::from_token(
                token,
                format!("[{:?}] is not a signed numeric literal", other),
            ))
        }
    })
}

fn convert<T: FromStr>(token: &Token, text: &str) -> Result<T, ParseError> {
    text.parse::<T>().map_err(|_| {
        ParseError::from_token(
            token,
            format!("Invalid {:?} literal '{}'", token.kind, text),
        )
    })
}

pub fn parse(tokens: Vec<Token>) -> Result<Tree, ParseError> {
    Parser::new(tokens).parse()
}
