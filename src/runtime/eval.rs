use super::*;
use crate::ast::{BoolOpKind, Expr, Stmt, UnaryOp};
use crate::value::RuntimeErrorCode;

impl Interpreter {
    pub(crate) fn eval_expr(&mut self, expr: &Expr) -> Result<Value, RuntimeError> {
        match expr {
            Expr::Literal(value) => Ok(value.clone()),
            Expr::Name(name) => self.lookup_name(name),
            Expr::Tuple(items) => {
                let mut values = Vec::with_capacity(items.len());
                for item in items {
                    values.push(self.eval_expr(item)?);
                }
                Ok(Value::Tuple(values))
            }
            Expr::List(items) => {
                let mut values = Vec::with_capacity(items.len());
                for item in items {
                    values.push(self.eval_expr(item)?);
                }
                Ok(Value::List(values))
            }
            Expr::Attribute { target, name } => {
                let object = self.eval_expr(target)?;
                self.attribute_get(&object, name)
            }
            Expr::Subscript { target, index } => {
                let object = self.eval_expr(target)?;
                let index = self.eval_expr(index)?;
                Self::subscript(&object, &index)
            }
            Expr::Call { func, args } => {
                let func = self.eval_expr(func)?;
                let mut values = Vec::with_capacity(args.len());
                for arg in args {
                    values.push(self.eval_expr(arg)?);
                }
                self.call_value(func, values)
            }
            Expr::Lambda { params, body } => {
                let body = vec![Stmt::Return(Some((**body).clone()))];
                Ok(self.make_function("<lambda>", params, &body))
            }
            Expr::Binary { op, left, right } => {
                let left = self.eval_expr(left)?;
                let right = self.eval_expr(right)?;
                Self::binary_op(*op, &left, &right)
            }
            Expr::BoolOp { op, left, right } => {
                let left = self.eval_expr(left)?;
                match op {
                    BoolOpKind::And => {
                        if left.truthy() {
                            self.eval_expr(right)
                        } else {
                            Ok(left)
                        }
                    }
                    BoolOpKind::Or => {
                        if left.truthy() {
                            Ok(left)
                        } else {
                            self.eval_expr(right)
                        }
                    }
                }
            }
            Expr::Unary { op, operand } => {
                let operand = self.eval_expr(operand)?;
                match op {
                    UnaryOp::Neg => Self::negate(&operand),
                    UnaryOp::Not => Ok(Value::Bool(!operand.truthy())),
                }
            }
        }
    }

    fn subscript(object: &Value, index: &Value) -> Result<Value, RuntimeError> {
        let idx = match index {
            Value::Int(i) => *i,
            Value::Bool(b) => i64::from(*b),
            other => {
                return Err(RuntimeError::type_mismatch(format!(
                    "{} indices must be integers, not {}",
                    object.type_name(),
                    other.type_name()
                )));
            }
        };
        let index_of = |len: usize| -> Result<usize, RuntimeError> {
            let effective = if idx < 0 { idx + len as i64 } else { idx };
            if effective < 0 || effective as usize >= len {
                Err(RuntimeError::with_code(
                    format!("{} index out of range", object.type_name()),
                    RuntimeErrorCode::Index,
                ))
            } else {
                Ok(effective as usize)
            }
        };
        match object {
            Value::Tuple(items) | Value::List(items) => {
                let i = index_of(items.len())?;
                Ok(items[i].clone())
            }
            Value::Str(s) => {
                let chars: Vec<char> = s.chars().collect();
                let i = index_of(chars.len())?;
                Ok(Value::Str(chars[i].to_string()))
            }
            other => Err(RuntimeError::type_mismatch(format!(
                "'{}' object is not subscriptable",
                other.type_name()
            ))),
        }
    }
}
