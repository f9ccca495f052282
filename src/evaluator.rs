use crate::error::InterpreterError;
use crate::parser::{BinaryOperator, CompareOperator, Expression, JointOperator, Literal, Statement, Tree};
use crate::promotion;
use crate::scope::{ScopeId, Scopes};
use crate::value::{Number, Value};
use tracing::debug;

/// Tree-walking interpreter. The root scope lives as long as the interpreter
/// and is shared by every top-level statement.
pub struct Interpreter {
    scopes: Scopes,
    root: ScopeId,
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

impl Interpreter {
    pub fn new() -> Self {
        let mut scopes = Scopes::new();
        let root = scopes.push_root();
        Self { scopes, root }
    }

    pub fn root(&self) -> ScopeId {
        self.root
    }

    pub fn scopes(&self) -> &Scopes {
        &self.scopes
    }

    /// Evaluates every top-level statement in the root scope and collects
    /// their values.
    pub fn evaluate_tree(&mut self, tree: &Tree) -> Result<Vec<Value>, InterpreterError> {
        let root = self.root;
        let mut values = Vec::with_capacity(tree.body.len());
        for statement in &tree.body {
            values.push(self.evaluate(statement, root)?);
        }

        debug!("evaluated {} statements", values.len());
        Ok(values)
    }

    pub fn evaluate(&mut self, statement: &Statement, scope: ScopeId) -> Result<Value, InterpreterError> {
        match statement {
            Statement::Expression(expression) => self.evaluate_expression(expression, scope),

            Statement::Variable {
                identifier,
                constant,
                value,
            } => {
                let value = match value {
                    Some(expression) => self.evaluate_expression(expression, scope)?,
                    None => Value::Null,
                };
                self.scopes.define(scope, identifier, value, *constant)?;
                Ok(Value::Null)
            }

            Statement::Assignment {
                identifier,
                operator,
                value,
            } => {
                let right = self.evaluate_expression(value, scope)?;
                let value = match operator {
                    Some(operator) => {
                        let current = self.scopes.lookup(scope, identifier)?.value.clone();
                        binary(*operator, current, right)?
                    }
                    None => right,
                };

                self.scopes.update(scope, identifier, value.clone())?;
                Ok(value)
            }

            Statement::Scope(statements) => {
                let child = self.scopes.push(scope)?;
                let result = self.evaluate_block(statements, child);
                self.scopes.release(child)?;
                result
            }
        }
    }

    fn evaluate_block(&mut self, statements: &[Statement], scope: ScopeId) -> Result<Value, InterpreterError> {
        let mut last = Value::Null;
        for statement in statements {
            last = self.evaluate(statement, scope)?;
        }
        Ok(last)
    }

    pub fn evaluate_expression(&mut self, expression: &Expression, scope: ScopeId) -> Result<Value, InterpreterError> {
        match expression {
            Expression::Literal(literal) => Ok(literal_value(literal)),

            Expression::Identifier(name) => Ok(self.scopes.lookup(scope, name)?.value.clone()),

            Expression::Binary { left, right, operator } => {
                let left = self.evaluate_expression(left, scope)?;
                let right = self.evaluate_expression(right, scope)?;
                binary(*operator, left, right)
            }

            Expression::Comparison { left, right, operator } => {
                let left = self.evaluate_expression(left, scope)?;
                let right = self.evaluate_expression(right, scope)?;
                comparison(*operator, &left, &right).map(Value::Boolean)
            }

            Expression::Joint { left, right, operator } => {
                let left = self.evaluate_expression(left, scope)?;
                let right = self.evaluate_expression(right, scope)?;
                let (left, right) = match (&left, &right) {
                    (Value::Boolean(l), Value::Boolean(r)) => (*l, *r),
                    (Value::Boolean(_), other) | (other, _) => {
                        return Err(InterpreterError::NonBooleanOperand {
                            operator: operator.symbol().to_string(),
                            operand: other.type_name(),
                        })
                    }
                };

                Ok(Value::Boolean(match operator {
                    JointOperator::And => left && right,
                    JointOperator::Or => left || right,
                }))
            }

            Expression::Not(operand) => match self.evaluate_expression(operand, scope)? {
                Value::Boolean(value) => Ok(Value::Boolean(!value)),
                other => Err(InterpreterError::NonBooleanOperand {
                    operator: "!".to_string(),
                    operand: other.type_name(),
                }),
            },
        }
    }
}

fn literal_value(literal: &Literal) -> Value {
    match literal {
        Literal::Null => Value::Null,
        Literal::Boolean(value) => Value::Boolean(*value),
        Literal::String(value) => Value::String(value.clone()),
        Literal::Char(value) => Value::Number(Number::Char(*value)),
        Literal::Byte(value) => Value::Number(Number::Byte(*value)),
        Literal::Integer(value) => Value::Number(Number::Integer(*value)),
        Literal::Long(value) => Value::Number(Number::Long(*value)),
        Literal::Float(value) => Value::Number(Number::Float(*value)),
        Literal::Double(value) => Value::Number(Number::Double(*value)),
    }
}

/// Numbers that take part in string concatenation. Byte does not.
fn concatenable(number: &Number) -> bool {
    !matches!(number, Number::Byte(_))
}

fn binary(operator: BinaryOperator, left: Value, right: Value) -> Result<Value, InterpreterError> {
    match (&left, &right) {
        (Value::Number(l), Value::Number(r)) => Ok(Value::Number(promotion::arithmetic(operator, *l, *r)?)),

        (Value::String(l), Value::String(r)) if operator == BinaryOperator::Add => {
            Ok(Value::String(format!("{}{}", l, r)))
        }
        (Value::String(l), Value::Number(r)) if operator == BinaryOperator::Add && concatenable(r) => {
            Ok(Value::String(format!("{}{}", l, r)))
        }
        (Value::Number(l), Value::String(r)) if operator == BinaryOperator::Add && concatenable(l) => {
            Ok(Value::String(format!("{}{}", l, r)))
        }

        _ => Err(InterpreterError::UnsupportedOperation {
            operator: operator.symbol().to_string(),
            left: left.type_name(),
            right: right.type_name(),
        }),
    }
}

fn comparison(operator: CompareOperator, left: &Value, right: &Value) -> Result<bool, InterpreterError> {
    let equality = match operator {
        CompareOperator::Equal => Some(true),
        CompareOperator::NotEqual => Some(false),
        _ => None,
    };

    let result = match (left, right) {
        (Value::Number(l), Value::Number(r)) => promotion::compare(operator, *l, *r),
        (Value::Null, other) | (other, Value::Null) => {
            equality.map(|equal| matches!(other, Value::Null) == equal)
        }
        (Value::Boolean(l), Value::Boolean(r)) => equality.map(|equal| (l == r) == equal),
        (Value::String(l), Value::String(r)) => equality.map(|equal| (l == r) == equal),
        _ => None,
    };

    result.ok_or_else(|| InterpreterError::UnsupportedComparison {
        operator: operator.symbol().to_string(),
        left: left.type_name(),
        right: right.type_name(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ScopeError;
    use crate::lexer::tokenize;
    use crate::parser::parse;
    use pretty_assertions::assert_eq;

    fn run(source: &str) -> Result<Vec<Value>, InterpreterError> {
        let tree = parse(tokenize(source).unwrap()).unwrap();
        Interpreter::new().evaluate_tree(&tree)
    }

    fn last(source: &str) -> Value {
        run(source).unwrap().pop().unwrap()
    }

    fn number(number: Number) -> Value {
        Value::Number(number)
    }

    #[test]
    fn arithmetic_follows_the_promotion_table() {
        assert_eq!(last("1 + 2"), number(Number::Integer(3)));
        assert_eq!(last("1 + 2.0"), number(Number::Float(3.0)));
        assert_eq!(last("7 / 2"), number(Number::Integer(3)));
        assert_eq!(last("5L * 2"), number(Number::Long(10)));
        assert_eq!(last("1b + 2b"), number(Number::Integer(3)));
        assert_eq!(last("1b + 2"), number(Number::Double(3.0)));
        assert_eq!(last("'a' + 1"), number(Number::Double(98.0)));
        assert_eq!(last("1 + 'a'"), number(Number::Integer(98)));
    }

    #[test]
    fn remainder_between_double_and_char_is_integer() {
        assert_eq!(last("100.5d % 'a'"), number(Number::Integer(3)));
        assert_eq!(last("1.5d + 'a'"), number(Number::Double(98.5)));
    }

    #[test]
    fn integral_division_by_zero_fails() {
        assert_eq!(run("1 / 0"), Err(InterpreterError::DivisionByZero));
        assert_eq!(run("1L % 0"), Err(InterpreterError::DivisionByZero));
        assert_eq!(last("1.0d / 0"), number(Number::Double(f64::INFINITY)));
    }

    #[test]
    fn string_concatenation() {
        assert_eq!(last("\"a\" + 1"), Value::String("a1".into()));
        assert_eq!(last("2.5 + \"x\""), Value::String("2.5x".into()));
        assert_eq!(last("\"a\" + 'b' + \"c\""), Value::String("abc".into()));
        assert!(matches!(
            run("\"a\" + 1b"),
            Err(InterpreterError::UnsupportedOperation { left: "String", right: "Byte", .. })
        ));
        assert!(matches!(
            run("\"a\" - \"b\""),
            Err(InterpreterError::UnsupportedOperation { .. })
        ));
    }

    #[test]
    fn equality_uses_epsilon() {
        assert_eq!(last("1.0 == 1.0000001"), Value::Boolean(true));
        assert_eq!(last("1 == 1.0000001"), Value::Boolean(true));
        assert_eq!(last("1.0 == 1.00001"), Value::Boolean(false));
        assert_eq!(last("1 == 1.00001"), Value::Boolean(true));
        assert_eq!(last("1.0d != 1.1d"), Value::Boolean(true));
    }

    #[test]
    fn ordering_is_exact() {
        assert_eq!(last("1 < 1.00001"), Value::Boolean(true));
        assert_eq!(last("2 >= 2L"), Value::Boolean(true));
        assert_eq!(last("'b' > 'a'"), Value::Boolean(true));
    }

    #[test]
    fn comparison_of_non_numbers() {
        assert_eq!(last("null == null"), Value::Boolean(true));
        assert_eq!(last("null == 0"), Value::Boolean(false));
        assert_eq!(last("\"x\" != null"), Value::Boolean(true));
        assert_eq!(last("true == true"), Value::Boolean(true));
        assert_eq!(last("\"ab\" == \"ab\""), Value::Boolean(true));
        assert!(matches!(
            run("null < 1"),
            Err(InterpreterError::UnsupportedComparison { .. })
        ));
        assert!(matches!(
            run("true == 1"),
            Err(InterpreterError::UnsupportedComparison { left: "Boolean", right: "Integer", .. })
        ));
        assert!(matches!(
            run("1 is 1"),
            Err(InterpreterError::UnsupportedComparison { .. })
        ));
    }

    #[test]
    fn joint_and_not_require_booleans() {
        assert_eq!(last("true && false"), Value::Boolean(false));
        assert_eq!(last("false or true"), Value::Boolean(true));
        assert_eq!(last("!false"), Value::Boolean(true));
        assert_eq!(last("1 < 2 and 2 < 3"), Value::Boolean(true));
        assert_eq!(
            run("true && 1"),
            Err(InterpreterError::NonBooleanOperand {
                operator: "&&".into(),
                operand: "Integer",
            })
        );
        assert_eq!(
            run("not 1"),
            Err(InterpreterError::NonBooleanOperand {
                operator: "!".into(),
                operand: "Integer",
            })
        );
    }

    #[test]
    fn variables_and_assignment() {
        assert_eq!(
            run("var x = 1; x += 2; x++; x"),
            Ok(vec![
                Value::Null,
                number(Number::Integer(3)),
                number(Number::Integer(4)),
                number(Number::Integer(4)),
            ])
        );
        assert_eq!(last("var y; y"), Value::Null);
        assert_eq!(
            run("const c = 1; c = 2"),
            Err(InterpreterError::Scope(ScopeError::Constant("c".into())))
        );
        assert_eq!(
            run("z = 1"),
            Err(InterpreterError::Scope(ScopeError::Undefined("z".into())))
        );
    }

    #[test]
    fn blocks_open_a_child_scope() {
        assert_eq!(last("var x = 1; { var x = 2; x }"), number(Number::Integer(2)));
        assert_eq!(last("var x = 1; { var x = 2 } x"), number(Number::Integer(1)));
        assert_eq!(last("var x = 1; { x = 5 } x"), number(Number::Integer(5)));
        assert_eq!(last("{}"), Value::Null);
        assert_eq!(
            run("{ var inner = 1 } inner"),
            Err(InterpreterError::Scope(ScopeError::Undefined("inner".into())))
        );
    }

    #[test]
    fn failed_block_still_releases_its_scope() {
        let tree = parse(tokenize("{ var a = 1; a / 0 }").unwrap()).unwrap();
        let mut interpreter = Interpreter::new();
        assert!(interpreter.evaluate_tree(&tree).is_err());
        assert_eq!(interpreter.scopes().len(), 1);
    }

    #[test]
    fn duplicate_definition_fails() {
        assert_eq!(
            run("var a = 1; var a = 2"),
            Err(InterpreterError::Scope(ScopeError::AlreadyDefined("a".into())))
        );
    }

    #[test]
    fn foreign_scope_is_an_error() {
        let tree = parse(tokenize("var a = 1; a; { a }").unwrap()).unwrap();
        let foreign = Interpreter::new().root();
        let mut interpreter = Interpreter::new();

        for statement in &tree.body {
            assert_eq!(
                interpreter.evaluate(statement, foreign),
                Err(InterpreterError::Scope(ScopeError::InvalidScope))
            );
        }
        assert_eq!(interpreter.scopes().len(), 1);
    }
}
