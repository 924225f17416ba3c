//! Binary and unary operators on runtime values.
//!
//! Operand types were checked when the IR was built and again at lowering,
//! so a variant mismatch here means a value of the wrong runtime type came
//! in through the parameter and is reported as a type mismatch.

use std::cmp::Ordering;

use reshape_ir::{BinaryOp, UnaryOp};
use reshape_types::{type_mismatch, EvalError, EvalResult, Value};

#[inline]
fn checked_arith<T>(result: Option<T>, wrap: fn(T) -> Value, op_name: &'static str) -> EvalResult {
    result
        .map(wrap)
        .ok_or(EvalError::IntegerOverflow { operation: op_name })
}

#[inline]
fn checked_div<T>(
    is_zero: bool,
    op: impl FnOnce() -> Option<T>,
    wrap: fn(T) -> Value,
) -> EvalResult {
    if is_zero {
        Err(EvalError::DivisionByZero)
    } else {
        checked_arith(op(), wrap, "division")
    }
}

macro_rules! int_binary {
    ($a:expr, $b:expr, $op:expr, $wrap:path) => {{
        let (a, b) = ($a, $b);
        match $op {
            BinaryOp::Add => checked_arith(a.checked_add(b), $wrap, "addition"),
            BinaryOp::Sub => checked_arith(a.checked_sub(b), $wrap, "subtraction"),
            BinaryOp::Mul => checked_arith(a.checked_mul(b), $wrap, "multiplication"),
            BinaryOp::Div => checked_div(b == 0, || a.checked_div(b), $wrap),
            op => compare_with(a.cmp(&b), op),
        }
    }};
}

macro_rules! float_binary {
    ($a:expr, $b:expr, $op:expr, $wrap:path) => {{
        let (a, b) = ($a, $b);
        match $op {
            BinaryOp::Add => Ok($wrap(a + b)),
            BinaryOp::Sub => Ok($wrap(a - b)),
            BinaryOp::Mul => Ok($wrap(a * b)),
            BinaryOp::Div => Ok($wrap(a / b)),
            BinaryOp::Eq => Ok(Value::Bool(a == b)),
            BinaryOp::NotEq => Ok(Value::Bool(a != b)),
            // NaN compares false under every ordering.
            op if op.is_comparison() => Ok(Value::Bool(
                a.partial_cmp(&b).is_some_and(|ord| ordering_holds(ord, op)),
            )),
            op => Err(invalid_op(op, "floats")),
        }
    }};
}

fn ordering_holds(ord: Ordering, op: BinaryOp) -> bool {
    match op {
        BinaryOp::Eq => ord == Ordering::Equal,
        BinaryOp::NotEq => ord != Ordering::Equal,
        BinaryOp::Lt => ord == Ordering::Less,
        BinaryOp::LtEq => ord != Ordering::Greater,
        BinaryOp::Gt => ord == Ordering::Greater,
        BinaryOp::GtEq => ord != Ordering::Less,
        _ => false,
    }
}

fn compare_with(ord: Ordering, op: BinaryOp) -> EvalResult {
    if op.is_comparison() {
        Ok(Value::Bool(ordering_holds(ord, op)))
    } else {
        Err(invalid_op(op, "these operands"))
    }
}

fn invalid_op(op: BinaryOp, operands: &str) -> EvalError {
    type_mismatch(format!("operands supporting `{}`", op.as_symbol()), operands)
}

/// Equality as the generated code sees it: scalars and strings by value,
/// references (records, collections, host objects, null) by identity.
pub fn values_equal(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (
            Value::Null | Value::Object(_) | Value::List(_) | Value::Map(_) | Value::Host(_),
            _,
        )
        | (
            _,
            Value::Null | Value::Object(_) | Value::List(_) | Value::Map(_) | Value::Host(_),
        ) => left.same_ref(right),
        _ => left == right,
    }
}

/// String concatenation. Null operands contribute nothing.
pub fn concat(left: &Value, right: &Value) -> Value {
    let mut text = left.to_text();
    text.push_str(&right.to_text());
    Value::string(text)
}

/// Evaluate a non-short-circuit binary operator.
///
/// `And`/`Or` are lowered with short-circuiting and only reach this
/// function when both operands are already evaluated.
#[expect(
    clippy::needless_pass_by_value,
    reason = "callers hand over freshly evaluated operands"
)]
pub fn evaluate_binary(left: Value, right: Value, op: BinaryOp) -> EvalResult {
    if matches!(op, BinaryOp::Eq | BinaryOp::NotEq) {
        let eq = values_equal(&left, &right);
        return Ok(Value::Bool(if op == BinaryOp::Eq { eq } else { !eq }));
    }
    match (&left, &right) {
        (Value::I8(a), Value::I8(b)) => int_binary!(*a, *b, op, Value::I8),
        (Value::I16(a), Value::I16(b)) => int_binary!(*a, *b, op, Value::I16),
        (Value::I32(a), Value::I32(b)) => int_binary!(*a, *b, op, Value::I32),
        (Value::I64(a), Value::I64(b)) => int_binary!(*a, *b, op, Value::I64),
        (Value::U8(a), Value::U8(b)) => int_binary!(*a, *b, op, Value::U8),
        (Value::U16(a), Value::U16(b)) => int_binary!(*a, *b, op, Value::U16),
        (Value::U32(a), Value::U32(b)) => int_binary!(*a, *b, op, Value::U32),
        (Value::U64(a), Value::U64(b)) => int_binary!(*a, *b, op, Value::U64),
        (Value::F32(a), Value::F32(b)) => float_binary!(*a, *b, op, Value::F32),
        (Value::F64(a), Value::F64(b)) => float_binary!(*a, *b, op, Value::F64),
        (Value::Bool(a), Value::Bool(b)) => match op {
            BinaryOp::And => Ok(Value::Bool(*a && *b)),
            BinaryOp::Or => Ok(Value::Bool(*a || *b)),
            _ => Err(invalid_op(op, "Bool")),
        },
        (Value::Char(a), Value::Char(b)) => compare_with(a.cmp(b), op),
        (Value::DateTime(a), Value::DateTime(b)) => compare_with(a.cmp(b), op),
        (Value::Str(a), Value::Str(b)) => compare_with(a.cmp(b), op),
        _ => Err(type_mismatch(left.type_name(), right.type_name())),
    }
}

#[expect(
    clippy::needless_pass_by_value,
    reason = "callers hand over a freshly evaluated operand"
)]
pub fn evaluate_unary(operand: Value, op: UnaryOp) -> EvalResult {
    let negation = || EvalError::IntegerOverflow {
        operation: "negation",
    };
    match (op, &operand) {
        (UnaryOp::Not, Value::Bool(b)) => Ok(Value::Bool(!b)),
        (UnaryOp::Neg, Value::I8(v)) => v.checked_neg().map(Value::I8).ok_or_else(negation),
        (UnaryOp::Neg, Value::I16(v)) => v.checked_neg().map(Value::I16).ok_or_else(negation),
        (UnaryOp::Neg, Value::I32(v)) => v.checked_neg().map(Value::I32).ok_or_else(negation),
        (UnaryOp::Neg, Value::I64(v)) => v.checked_neg().map(Value::I64).ok_or_else(negation),
        (UnaryOp::Neg, Value::F32(v)) => Ok(Value::F32(-v)),
        (UnaryOp::Neg, Value::F64(v)) => Ok(Value::F64(-v)),
        _ => Err(type_mismatch(
            format!("operand supporting `{}`", op.as_symbol()),
            operand.type_name(),
        )),
    }
}

/// The value one of the same numeric kind as `value`, for increments.
pub fn one_like(value: &Value) -> EvalResult {
    Ok(match value {
        Value::I8(_) => Value::I8(1),
        Value::I16(_) => Value::I16(1),
        Value::I32(_) => Value::I32(1),
        Value::I64(_) => Value::I64(1),
        Value::U8(_) => Value::U8(1),
        Value::U16(_) => Value::U16(1),
        Value::U32(_) => Value::U32(1),
        Value::U64(_) => Value::U64(1),
        Value::F32(_) => Value::F32(1.0),
        Value::F64(_) => Value::F64(1.0),
        other => return Err(type_mismatch("numeric", other.type_name())),
    })
}
