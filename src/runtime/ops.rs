use super::*;
use std::cmp::Ordering;

use num_bigint::BigInt;
use num_traits::{Pow, ToPrimitive, Zero};

use crate::ast::BinOp;

/// Numeric view of a value, for arithmetic promotion. i64 arithmetic is
/// attempted first and widens to `BigInt` on overflow; any float operand
/// switches the whole operation to f64.
enum Num {
    I(i64),
    B(BigInt),
    F(f64),
}

fn as_num(value: &Value) -> Option<Num> {
    match value {
        Value::Int(i) => Some(Num::I(*i)),
        Value::BigInt(b) => Some(Num::B(b.clone())),
        Value::Float(f) => Some(Num::F(*f)),
        Value::Bool(b) => Some(Num::I(i64::from(*b))),
        _ => None,
    }
}

/// Narrow a BigInt back to `Value::Int` when it fits.
pub(super) fn norm_big(b: BigInt) -> Value {
    match b.to_i64() {
        Some(i) => Value::Int(i),
        None => Value::BigInt(b),
    }
}

fn to_f64(n: &Num) -> f64 {
    match n {
        Num::I(i) => *i as f64,
        Num::B(b) => b.to_f64().unwrap_or(f64::INFINITY),
        Num::F(f) => *f,
    }
}

fn to_big(n: &Num) -> BigInt {
    match n {
        Num::I(i) => BigInt::from(*i),
        Num::B(b) => b.clone(),
        // Only reached for integer-valued floats.
        Num::F(f) => BigInt::from(*f as i64),
    }
}

fn python_floor_div_i64(a: i64, b: i64) -> i64 {
    let q = a / b;
    if a % b != 0 && (a < 0) != (b < 0) { q - 1 } else { q }
}

fn python_mod_i64(a: i64, b: i64) -> i64 {
    let r = a % b;
    if r != 0 && (r < 0) != (b < 0) { r + b } else { r }
}

fn python_floor_div_big(a: &BigInt, b: &BigInt) -> BigInt {
    let q = a / b;
    let r = a % b;
    if !r.is_zero() && (a.sign() != b.sign()) {
        q - 1
    } else {
        q
    }
}

fn python_mod_big(a: &BigInt, b: &BigInt) -> BigInt {
    let r = a % b;
    if !r.is_zero() && r.sign() != b.sign() {
        r + b
    } else {
        r
    }
}

impl Interpreter {
    pub(super) fn binary_op(
        op: BinOp,
        left: &Value,
        right: &Value,
    ) -> Result<Value, RuntimeError> {
        match op {
            BinOp::Eq => return Ok(Value::Bool(Self::values_equal(left, right))),
            BinOp::NotEq => return Ok(Value::Bool(!Self::values_equal(left, right))),
            BinOp::Lt | BinOp::LtEq | BinOp::Gt | BinOp::GtEq => {
                let ord = Self::compare_values(left, right).ok_or_else(|| {
                    RuntimeError::type_mismatch(format!(
                        "comparison not supported between instances of '{}' and '{}'",
                        left.type_name(),
                        right.type_name()
                    ))
                })?;
                let result = match op {
                    BinOp::Lt => ord == Ordering::Less,
                    BinOp::LtEq => ord != Ordering::Greater,
                    BinOp::Gt => ord == Ordering::Greater,
                    _ => ord != Ordering::Less,
                };
                return Ok(Value::Bool(result));
            }
            _ => {}
        }
        if let (Some(a), Some(b)) = (as_num(left), as_num(right)) {
            return Self::numeric_op(op, &a, &b);
        }
        match (op, left, right) {
            (BinOp::Add, Value::Str(a), Value::Str(b)) => Ok(Value::Str(format!("{}{}", a, b))),
            (BinOp::Add, Value::List(a), Value::List(b)) => {
                let mut items = a.clone();
                items.extend(b.clone());
                Ok(Value::List(items))
            }
            (BinOp::Add, Value::Tuple(a), Value::Tuple(b)) => {
                let mut items = a.clone();
                items.extend(b.clone());
                Ok(Value::Tuple(items))
            }
            (BinOp::Mul, Value::Str(s), Value::Int(n))
            | (BinOp::Mul, Value::Int(n), Value::Str(s)) => {
                Ok(Value::Str(s.repeat((*n).max(0) as usize)))
            }
            (BinOp::Mul, Value::List(items), Value::Int(n)) => {
                let mut out = Vec::new();
                for _ in 0..(*n).max(0) {
                    out.extend(items.clone());
                }
                Ok(Value::List(out))
            }
            _ => Err(RuntimeError::type_mismatch(format!(
                "unsupported operand type(s): '{}' and '{}'",
                left.type_name(),
                right.type_name()
            ))),
        }
    }

    fn numeric_op(op: BinOp, a: &Num, b: &Num) -> Result<Value, RuntimeError> {
        let float_mode = matches!(a, Num::F(_)) || matches!(b, Num::F(_));
        match op {
            BinOp::Add | BinOp::Sub | BinOp::Mul => {
                if float_mode {
                    let (x, y) = (to_f64(a), to_f64(b));
                    let r = match op {
                        BinOp::Add => x + y,
                        BinOp::Sub => x - y,
                        _ => x * y,
                    };
                    return Ok(Value::Float(r));
                }
                if let (Num::I(x), Num::I(y)) = (a, b) {
                    let checked = match op {
                        BinOp::Add => x.checked_add(*y),
                        BinOp::Sub => x.checked_sub(*y),
                        _ => x.checked_mul(*y),
                    };
                    if let Some(r) = checked {
                        return Ok(Value::Int(r));
                    }
                }
                let (x, y) = (to_big(a), to_big(b));
                let r = match op {
                    BinOp::Add => x + y,
                    BinOp::Sub => x - y,
                    _ => x * y,
                };
                Ok(norm_big(r))
            }
            BinOp::Div => {
                let y = to_f64(b);
                if y == 0.0 {
                    return Err(RuntimeError::zero_division());
                }
                Ok(Value::Float(to_f64(a) / y))
            }
            BinOp::FloorDiv => {
                if float_mode {
                    let y = to_f64(b);
                    if y == 0.0 {
                        return Err(RuntimeError::zero_division());
                    }
                    return Ok(Value::Float((to_f64(a) / y).floor()));
                }
                if let (Num::I(x), Num::I(y)) = (a, b) {
                    if *y == 0 {
                        return Err(RuntimeError::zero_division());
                    }
                    if !(*x == i64::MIN && *y == -1) {
                        return Ok(Value::Int(python_floor_div_i64(*x, *y)));
                    }
                }
                let (x, y) = (to_big(a), to_big(b));
                if y.is_zero() {
                    return Err(RuntimeError::zero_division());
                }
                Ok(norm_big(python_floor_div_big(&x, &y)))
            }
            BinOp::Mod => {
                if float_mode {
                    let y = to_f64(b);
                    if y == 0.0 {
                        return Err(RuntimeError::zero_division());
                    }
                    let x = to_f64(a);
                    let mut r = x % y;
                    if r != 0.0 && (r < 0.0) != (y < 0.0) {
                        r += y;
                    }
                    return Ok(Value::Float(r));
                }
                if let (Num::I(x), Num::I(y)) = (a, b) {
                    if *y == 0 {
                        return Err(RuntimeError::zero_division());
                    }
                    if !(*x == i64::MIN && *y == -1) {
                        return Ok(Value::Int(python_mod_i64(*x, *y)));
                    }
                }
                let (x, y) = (to_big(a), to_big(b));
                if y.is_zero() {
                    return Err(RuntimeError::zero_division());
                }
                Ok(norm_big(python_mod_big(&x, &y)))
            }
            BinOp::Pow => Self::power(a, b),
            _ => Err(RuntimeError::type_mismatch("unsupported numeric operation")),
        }
    }

    fn power(a: &Num, b: &Num) -> Result<Value, RuntimeError> {
        if matches!(a, Num::F(_)) || matches!(b, Num::F(_)) {
            return Ok(Value::Float(to_f64(a).powf(to_f64(b))));
        }
        let exp = to_big(b);
        if exp.sign() == num_bigint::Sign::Minus {
            return Ok(Value::Float(to_f64(a).powf(to_f64(b))));
        }
        let Some(exp) = exp.to_u32() else {
            return Err(RuntimeError::with_code(
                "exponent too large",
                crate::value::RuntimeErrorCode::ValueInvalid,
            ));
        };
        if let Num::I(x) = a
            && let Some(r) = x.checked_pow(exp)
        {
            return Ok(Value::Int(r));
        }
        Ok(norm_big(Pow::pow(to_big(a), exp)))
    }

    pub(super) fn negate(value: &Value) -> Result<Value, RuntimeError> {
        match value {
            Value::Int(i) => match i.checked_neg() {
                Some(r) => Ok(Value::Int(r)),
                None => Ok(norm_big(-BigInt::from(*i))),
            },
            Value::BigInt(b) => Ok(norm_big(-b.clone())),
            Value::Float(f) => Ok(Value::Float(-f)),
            Value::Bool(b) => Ok(Value::Int(-i64::from(*b))),
            other => Err(RuntimeError::type_mismatch(format!(
                "bad operand type for unary -: '{}'",
                other.type_name()
            ))),
        }
    }

    /// Python `==`: numeric values compare across int/bigint/float; anything
    /// else falls back to structural equality.
    pub(super) fn values_equal(left: &Value, right: &Value) -> bool {
        if let (Some(a), Some(b)) = (as_num(left), as_num(right)) {
            if matches!(a, Num::F(_)) || matches!(b, Num::F(_)) {
                return to_f64(&a) == to_f64(&b);
            }
            return to_big(&a) == to_big(&b);
        }
        left == right
    }

    /// Ordering for `<`/`>` style comparisons; `None` when the operand types
    /// do not support ordering.
    pub(super) fn compare_values(left: &Value, right: &Value) -> Option<Ordering> {
        if let (Some(a), Some(b)) = (as_num(left), as_num(right)) {
            if matches!(a, Num::F(_)) || matches!(b, Num::F(_)) {
                return to_f64(&a).partial_cmp(&to_f64(&b));
            }
            return Some(to_big(&a).cmp(&to_big(&b)));
        }
        match (left, right) {
            (Value::Str(a), Value::Str(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }
}
