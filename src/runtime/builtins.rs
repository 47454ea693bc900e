use super::*;
use num_bigint::BigInt;
use num_traits::Signed;

use crate::builtins::BUILD_CLASS_HOOK;
use crate::value::RuntimeErrorCode;

use super::ops::norm_big;

fn expect_arity(name: &str, args: &[Value], n: usize) -> Result<(), RuntimeError> {
    if args.len() == n {
        Ok(())
    } else {
        Err(RuntimeError::type_mismatch(format!(
            "{}() takes exactly {} argument{} ({} given)",
            name,
            n,
            if n == 1 { "" } else { "s" },
            args.len()
        )))
    }
}

impl Interpreter {
    /// Dispatch a `Value::Builtin` slot by name. Reaching an unknown name is
    /// only possible through a hand-constructed slot value; it reports a
    /// resolution failure rather than falling back to anything.
    pub(super) fn call_native(
        &mut self,
        name: &str,
        args: &[Value],
    ) -> Result<Value, RuntimeError> {
        match name {
            "print" => self.builtin_print(args),
            "abs" => Self::builtin_abs(args),
            "len" => Self::builtin_len(args),
            "repr" => {
                expect_arity("repr", args, 1)?;
                Ok(Value::Str(args[0].repr_value()))
            }
            "str" => {
                expect_arity("str", args, 1)?;
                Ok(Value::Str(args[0].to_display_string()))
            }
            "int" => Self::builtin_int(args),
            "bool" => {
                expect_arity("bool", args, 1)?;
                Ok(Value::Bool(args[0].truthy()))
            }
            "type" => Self::builtin_type(args),
            "range" => Self::builtin_range(args),
            "min" => self.builtin_min_max("min", args),
            "max" => self.builtin_min_max("max", args),
            BUILD_CLASS_HOOK => self.default_build_class(args),
            other => Err(RuntimeError::name_resolution(other)),
        }
    }

    fn builtin_print(&mut self, args: &[Value]) -> Result<Value, RuntimeError> {
        let text = args
            .iter()
            .map(|v| v.to_display_string())
            .collect::<Vec<_>>()
            .join(" ");
        self.write_out(&text);
        self.write_out("\n");
        Ok(Value::None)
    }

    fn builtin_abs(args: &[Value]) -> Result<Value, RuntimeError> {
        expect_arity("abs", args, 1)?;
        match &args[0] {
            Value::Int(i) => match i.checked_abs() {
                Some(r) => Ok(Value::Int(r)),
                None => Ok(norm_big(BigInt::from(*i).abs())),
            },
            Value::BigInt(b) => Ok(norm_big(b.abs())),
            Value::Float(f) => Ok(Value::Float(f.abs())),
            Value::Bool(b) => Ok(Value::Int(i64::from(*b))),
            other => Err(RuntimeError::type_mismatch(format!(
                "bad operand type for abs(): '{}'",
                other.type_name()
            ))),
        }
    }

    fn builtin_len(args: &[Value]) -> Result<Value, RuntimeError> {
        expect_arity("len", args, 1)?;
        match &args[0] {
            Value::Str(s) => Ok(Value::Int(s.chars().count() as i64)),
            Value::Tuple(items) | Value::List(items) => Ok(Value::Int(items.len() as i64)),
            Value::Range(a, b) => Ok(Value::Int((b - a).max(0))),
            other => Err(RuntimeError::type_mismatch(format!(
                "object of type '{}' has no len()",
                other.type_name()
            ))),
        }
    }

    fn builtin_int(args: &[Value]) -> Result<Value, RuntimeError> {
        expect_arity("int", args, 1)?;
        match &args[0] {
            Value::Int(_) | Value::BigInt(_) => Ok(args[0].clone()),
            Value::Bool(b) => Ok(Value::Int(i64::from(*b))),
            Value::Float(f) => Ok(Value::Int(f.trunc() as i64)),
            Value::Str(s) => {
                let trimmed = s.trim();
                if let Ok(i) = trimmed.parse::<i64>() {
                    return Ok(Value::Int(i));
                }
                match trimmed.parse::<BigInt>() {
                    Ok(b) => Ok(norm_big(b)),
                    Err(_) => Err(RuntimeError::with_code(
                        format!(
                            "invalid literal for int() with base 10: {}",
                            args[0].repr_value()
                        ),
                        RuntimeErrorCode::ValueInvalid,
                    )),
                }
            }
            other => Err(RuntimeError::type_mismatch(format!(
                "int() argument must be a string or a number, not '{}'",
                other.type_name()
            ))),
        }
    }

    fn builtin_type(args: &[Value]) -> Result<Value, RuntimeError> {
        expect_arity("type", args, 1)?;
        match &args[0] {
            Value::Instance(inst) => Ok(Value::Class(inst.borrow().class.clone())),
            other => Ok(Value::Str(format!("<class '{}'>", other.type_name()))),
        }
    }

    fn builtin_range(args: &[Value]) -> Result<Value, RuntimeError> {
        let as_int = |v: &Value| -> Result<i64, RuntimeError> {
            match v {
                Value::Int(i) => Ok(*i),
                Value::Bool(b) => Ok(i64::from(*b)),
                other => Err(RuntimeError::type_mismatch(format!(
                    "'{}' object cannot be interpreted as an integer",
                    other.type_name()
                ))),
            }
        };
        match args {
            [end] => Ok(Value::Range(0, as_int(end)?)),
            [start, end] => Ok(Value::Range(as_int(start)?, as_int(end)?)),
            _ => Err(RuntimeError::type_mismatch(format!(
                "range() takes 1 or 2 arguments ({} given)",
                args.len()
            ))),
        }
    }

    fn builtin_min_max(&mut self, name: &str, args: &[Value]) -> Result<Value, RuntimeError> {
        if args.is_empty() {
            return Err(RuntimeError::type_mismatch(format!(
                "{} expected at least 1 argument, got 0",
                name
            )));
        }
        let candidates = if args.len() == 1 {
            self.iterate(args[0].clone())?
        } else {
            args.to_vec()
        };
        if candidates.is_empty() {
            return Err(RuntimeError::with_code(
                format!("{}() arg is an empty sequence", name),
                RuntimeErrorCode::ValueInvalid,
            ));
        }
        let mut best = candidates[0].clone();
        for candidate in &candidates[1..] {
            let ord = Self::compare_values(candidate, &best).ok_or_else(|| {
                RuntimeError::type_mismatch(format!(
                    "comparison not supported between instances of '{}' and '{}'",
                    candidate.type_name(),
                    best.type_name()
                ))
            })?;
            let better = if name == "min" {
                ord == std::cmp::Ordering::Less
            } else {
                ord == std::cmp::Ordering::Greater
            };
            if better {
                best = candidate.clone();
            }
        }
        Ok(best)
    }
}
