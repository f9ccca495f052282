//! Numeric promotion and comparison rules.
//!
//! Arithmetic runs in the operands' native domain (the C-like widening of both
//! operands) and the result is then tagged with the kind from [`RESULT_KIND`].
//! The table is not a plain "widest wins" rule: `Byte + Integer` is a Double
//! and `Double % Char` is an Integer.

use crate::error::InterpreterError;
use crate::parser::{BinaryOperator, CompareOperator};
use crate::value::{Number, NumberKind};
use std::cmp::Ordering;
use std::ops::{Add, Div, Mul, Rem, Sub};

const INTEGER: NumberKind = NumberKind::Integer;
const FLOAT: NumberKind = NumberKind::Float;
const LONG: NumberKind = NumberKind::Long;
const DOUBLE: NumberKind = NumberKind::Double;
const CHAR: NumberKind = NumberKind::Char;

/// Result kind of `left op right`. Rows are the left operand, columns the
/// right, both in `NumberKind` declaration order.
pub const RESULT_KIND: [[NumberKind; 6]; 6] = [
    //  Byte     Integer  Float   Long    Double  Char
    [INTEGER, DOUBLE, DOUBLE, DOUBLE, DOUBLE, INTEGER], // Byte
    [INTEGER, INTEGER, FLOAT, LONG, DOUBLE, INTEGER],   // Integer
    [FLOAT, FLOAT, FLOAT, FLOAT, DOUBLE, FLOAT],        // Float
    [LONG, LONG, FLOAT, LONG, DOUBLE, LONG],            // Long
    [DOUBLE, DOUBLE, DOUBLE, DOUBLE, DOUBLE, DOUBLE],   // Double
    [DOUBLE, DOUBLE, DOUBLE, DOUBLE, DOUBLE, INTEGER],  // Char
];

/// Entries of [`RESULT_KIND`] that depend on the operator:
/// `(operator, left, right, result)`.
pub const OPERATOR_OVERRIDES: &[(BinaryOperator, NumberKind, NumberKind, NumberKind)] =
    &[(BinaryOperator::Remainder, DOUBLE, CHAR, INTEGER)];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tolerance {
    Exact,
    /// Float against a non-floating kind, compared in f32.
    FloatMixed,
    FloatSingle,
    /// Double against any other kind, compared in f64.
    DoubleMixed,
    DoubleSingle,
}

impl Tolerance {
    pub fn epsilon(self) -> f64 {
        match self {
            Tolerance::Exact => 0.0,
            Tolerance::FloatMixed => 1e-4,
            Tolerance::FloatSingle => 1e-6,
            Tolerance::DoubleMixed => 1e-6,
            Tolerance::DoubleSingle => 1e-12,
        }
    }
}

const EX: Tolerance = Tolerance::Exact;
const FM: Tolerance = Tolerance::FloatMixed;
const FS: Tolerance = Tolerance::FloatSingle;
const DM: Tolerance = Tolerance::DoubleMixed;
const DS: Tolerance = Tolerance::DoubleSingle;

/// Tolerance used by `==` and `!=`, indexed like [`RESULT_KIND`].
pub const TOLERANCE: [[Tolerance; 6]; 6] = [
    // Byte Integer Float Long Double Char
    [EX, EX, FM, EX, DM, EX], // Byte
    [EX, EX, FM, EX, DM, EX], // Integer
    [FM, FM, FS, FM, DM, FM], // Float
    [EX, EX, FM, EX, DM, EX], // Long
    [DM, DM, DM, DM, DS, DM], // Double
    [EX, EX, FM, EX, DM, EX], // Char
];

/// Primitive type an operation is carried out in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Domain {
    Int,
    Long,
    Float,
    Double,
}

fn native_domain(kind: NumberKind) -> Domain {
    match kind {
        NumberKind::Byte | NumberKind::Integer | NumberKind::Char => Domain::Int,
        NumberKind::Long => Domain::Long,
        NumberKind::Float => Domain::Float,
        NumberKind::Double => Domain::Double,
    }
}

pub fn domain(left: NumberKind, right: NumberKind) -> Domain {
    native_domain(left).max(native_domain(right))
}

pub fn result_kind(operator: BinaryOperator, left: NumberKind, right: NumberKind) -> NumberKind {
    OPERATOR_OVERRIDES
        .iter()
        .find(|(op, l, r, _)| *op == operator && *l == left && *r == right)
        .map(|(_, _, _, result)| *result)
        .unwrap_or(RESULT_KIND[left.index()][right.index()])
}

pub fn tolerance(left: NumberKind, right: NumberKind) -> Tolerance {
    TOLERANCE[left.index()][right.index()]
}

macro_rules! integral_arithmetic {
    ($name:ident, $ty:ty) => {
        fn $name(operator: BinaryOperator, a: $ty, b: $ty) -> Result<$ty, InterpreterError> {
            Ok(match operator {
                BinaryOperator::Divide | BinaryOperator::Remainder if b == 0 => {
                    return Err(InterpreterError::DivisionByZero)
                }
                BinaryOperator::Add => a.wrapping_add(b),
                BinaryOperator::Subtract => a.wrapping_sub(b),
                BinaryOperator::Multiply => a.wrapping_mul(b),
                BinaryOperator::Divide => a.wrapping_div(b),
                BinaryOperator::Remainder => a.wrapping_rem(b),
            })
        }
    };
}

integral_arithmetic!(int_arithmetic, i32);
integral_arithmetic!(long_arithmetic, i64);

fn floating_arithmetic<T>(operator: BinaryOperator, a: T, b: T) -> T
where
    T: Add<Output = T> + Sub<Output = T> + Mul<Output = T> + Div<Output = T> + Rem<Output = T>,
{
    match operator {
        BinaryOperator::Add => a + b,
        BinaryOperator::Subtract => a - b,
        BinaryOperator::Multiply => a * b,
        BinaryOperator::Divide => a / b,
        BinaryOperator::Remainder => a % b,
    }
}

fn retag(number: Number, kind: NumberKind) -> Number {
    match kind {
        NumberKind::Byte => Number::Byte(number.as_i32() as u8),
        NumberKind::Integer => Number::Integer(number.as_i32()),
        NumberKind::Float => Number::Float(number.as_f32()),
        NumberKind::Long => Number::Long(number.as_i64()),
        NumberKind::Double => Number::Double(number.as_f64()),
        NumberKind::Char => Number::Char(
            char::from_u32(number.as_i32() as u32).unwrap_or(char::REPLACEMENT_CHARACTER),
        ),
    }
}

/// Applies `operator` to two numbers following the promotion table.
pub fn arithmetic(operator: BinaryOperator, left: Number, right: Number) -> Result<Number, InterpreterError> {
    let native = match domain(left.kind(), right.kind()) {
        Domain::Int => Number::Integer(int_arithmetic(operator, left.as_i32(), right.as_i32())?),
        Domain::Long => Number::Long(long_arithmetic(operator, left.as_i64(), right.as_i64())?),
        Domain::Float => Number::Float(floating_arithmetic(operator, left.as_f32(), right.as_f32())),
        Domain::Double => Number::Double(floating_arithmetic(operator, left.as_f64(), right.as_f64())),
    };

    Ok(retag(native, result_kind(operator, left.kind(), right.kind())))
}

fn equality(left: Number, right: Number, equal: bool) -> bool {
    let tolerance = tolerance(left.kind(), right.kind());
    match tolerance {
        Tolerance::Exact => {
            let same = match domain(left.kind(), right.kind()) {
                Domain::Int => left.as_i32() == right.as_i32(),
                _ => left.as_i64() == right.as_i64(),
            };
            same == equal
        }
        Tolerance::FloatMixed | Tolerance::FloatSingle => {
            let difference = (left.as_f32() - right.as_f32()).abs();
            let epsilon = tolerance.epsilon() as f32;
            if equal {
                difference < epsilon
            } else {
                difference > epsilon
            }
        }
        Tolerance::DoubleMixed | Tolerance::DoubleSingle => {
            let difference = (left.as_f64() - right.as_f64()).abs();
            if equal {
                difference < tolerance.epsilon()
            } else {
                difference > tolerance.epsilon()
            }
        }
    }
}

fn native_ordering(left: Number, right: Number) -> Option<Ordering> {
    match domain(left.kind(), right.kind()) {
        Domain::Int => left.as_i32().partial_cmp(&right.as_i32()),
        Domain::Long => left.as_i64().partial_cmp(&right.as_i64()),
        Domain::Float => left.as_f32().partial_cmp(&right.as_f32()),
        Domain::Double => left.as_f64().partial_cmp(&right.as_f64()),
    }
}

/// Compares two numbers. Returns `None` for operators numbers do not support.
pub fn compare(operator: CompareOperator, left: Number, right: Number) -> Option<bool> {
    let ordering = native_ordering(left, right);
    Some(match operator {
        CompareOperator::Equal => equality(left, right, true),
        CompareOperator::NotEqual => equality(left, right, false),
        CompareOperator::Greater => ordering == Some(Ordering::Greater),
        CompareOperator::GreaterOrEqual => matches!(ordering, Some(Ordering::Greater | Ordering::Equal)),
        CompareOperator::Less => ordering == Some(Ordering::Less),
        CompareOperator::LessOrEqual => matches!(ordering, Some(Ordering::Less | Ordering::Equal)),
        CompareOperator::Is => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const BYTE: NumberKind = NumberKind::Byte;

    #[test]
    fn same_kind_keeps_kind_except_small_integrals() {
        for kind in [INTEGER, FLOAT, LONG, DOUBLE] {
            assert_eq!(result_kind(BinaryOperator::Add, kind, kind), kind);
        }
        assert_eq!(result_kind(BinaryOperator::Add, BYTE, BYTE), INTEGER);
        assert_eq!(result_kind(BinaryOperator::Add, CHAR, CHAR), INTEGER);
    }

    #[test]
    fn irregular_entries_are_preserved() {
        assert_eq!(result_kind(BinaryOperator::Add, INTEGER, FLOAT), FLOAT);
        assert_eq!(result_kind(BinaryOperator::Add, INTEGER, LONG), LONG);
        assert_eq!(result_kind(BinaryOperator::Add, INTEGER, DOUBLE), DOUBLE);
        assert_eq!(result_kind(BinaryOperator::Add, BYTE, INTEGER), DOUBLE);
        assert_eq!(result_kind(BinaryOperator::Add, INTEGER, BYTE), INTEGER);
        assert_eq!(result_kind(BinaryOperator::Add, CHAR, INTEGER), DOUBLE);
        assert_eq!(result_kind(BinaryOperator::Add, LONG, FLOAT), FLOAT);
    }

    #[test]
    fn double_char_depends_on_operator() {
        assert_eq!(result_kind(BinaryOperator::Remainder, DOUBLE, CHAR), INTEGER);
        for op in [
            BinaryOperator::Add,
            BinaryOperator::Subtract,
            BinaryOperator::Multiply,
            BinaryOperator::Divide,
        ] {
            assert_eq!(result_kind(op, DOUBLE, CHAR), DOUBLE);
        }
        assert_eq!(result_kind(BinaryOperator::Remainder, CHAR, DOUBLE), DOUBLE);
    }

    #[test]
    fn arithmetic_runs_in_native_domain_then_retags() {
        // 5 / 2 is integer division even though the result is tagged Double.
        assert_eq!(
            arithmetic(BinaryOperator::Divide, Number::Byte(5), Number::Integer(2)),
            Ok(Number::Double(2.0))
        );
        assert_eq!(
            arithmetic(BinaryOperator::Add, Number::Byte(200), Number::Byte(100)),
            Ok(Number::Integer(300))
        );
        assert_eq!(
            arithmetic(BinaryOperator::Remainder, Number::Double(70.5), Number::Char('A')),
            Ok(Number::Integer(5))
        );
        assert_eq!(
            arithmetic(BinaryOperator::Add, Number::Char('a'), Number::Char('b')),
            Ok(Number::Integer(97 + 98))
        );
        assert_eq!(
            arithmetic(BinaryOperator::Multiply, Number::Integer(3), Number::Long(4)),
            Ok(Number::Long(12))
        );
    }

    #[test]
    fn integral_overflow_wraps() {
        assert_eq!(
            arithmetic(BinaryOperator::Add, Number::Integer(i32::MAX), Number::Integer(1)),
            Ok(Number::Integer(i32::MIN))
        );
    }

    #[test]
    fn integral_division_by_zero_fails() {
        assert_eq!(
            arithmetic(BinaryOperator::Divide, Number::Integer(1), Number::Integer(0)),
            Err(InterpreterError::DivisionByZero)
        );
        assert_eq!(
            arithmetic(BinaryOperator::Remainder, Number::Long(1), Number::Byte(0)),
            Err(InterpreterError::DivisionByZero)
        );
    }

    #[test]
    fn floating_division_by_zero_is_ieee() {
        match arithmetic(BinaryOperator::Divide, Number::Float(1.0), Number::Integer(0)) {
            Ok(Number::Float(v)) => assert!(v.is_infinite()),
            other => panic!("unexpected {:?}", other),
        }
        match arithmetic(BinaryOperator::Remainder, Number::Double(1.0), Number::Double(0.0)) {
            Ok(Number::Double(v)) => assert!(v.is_nan()),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn tolerance_table_is_symmetric() {
        for left in NumberKind::ALL {
            for right in NumberKind::ALL {
                assert_eq!(tolerance(left, right), tolerance(right, left));
            }
        }
    }

    #[test]
    fn same_kind_float_equality_is_tighter() {
        let a = Number::Float(1.0);
        let b = Number::Float(1.00001);
        assert_eq!(compare(CompareOperator::Equal, a, b), Some(false));
        assert_eq!(compare(CompareOperator::NotEqual, a, b), Some(true));
        assert_eq!(compare(CompareOperator::Equal, Number::Integer(1), b), Some(true));
        assert_eq!(compare(CompareOperator::Equal, Number::Integer(1), Number::Float(1.001)), Some(false));
    }

    #[test]
    fn double_equality() {
        assert_eq!(
            compare(CompareOperator::Equal, Number::Double(0.1 + 0.2), Number::Double(0.3)),
            Some(true)
        );
        assert_eq!(
            compare(CompareOperator::Equal, Number::Double(1.0), Number::Double(1.0 + 1e-9)),
            Some(false)
        );
        assert_eq!(
            compare(CompareOperator::Equal, Number::Long(1), Number::Double(1.0 + 1e-9)),
            Some(true)
        );
    }

    #[test]
    fn ordering_is_exact() {
        let a = Number::Float(1.0);
        let b = Number::Float(1.0000001);
        assert_eq!(compare(CompareOperator::Less, a, b), Some(true));
        assert_eq!(compare(CompareOperator::GreaterOrEqual, Number::Char('b'), Number::Byte(98)), Some(true));
        assert_eq!(compare(CompareOperator::Greater, Number::Long(3), Number::Integer(2)), Some(true));
        assert_eq!(compare(CompareOperator::LessOrEqual, Number::Double(f64::NAN), Number::Integer(1)), Some(false));
    }

    #[test]
    fn is_is_not_numeric() {
        assert_eq!(compare(CompareOperator::Is, Number::Integer(1), Number::Integer(1)), None);
    }
}
