use super::*;
use crate::ast::{ExceptHandler, Stmt};
use crate::value::RuntimeErrorCode;

impl Interpreter {
    pub(crate) fn run_block(&mut self, stmts: &[Stmt]) -> Result<(), RuntimeError> {
        for stmt in stmts {
            self.exec_stmt(stmt)?;
        }
        Ok(())
    }

    fn exec_stmt(&mut self, stmt: &Stmt) -> Result<(), RuntimeError> {
        match stmt {
            Stmt::Expr(expr) => {
                let value = self.eval_expr(expr)?;
                self.last_value = Some(value);
                Ok(())
            }
            Stmt::Assign { target, value } => {
                let value = self.eval_expr(value)?;
                self.assign_target(target, value)
            }
            Stmt::Delete(target) => self.delete_target(target),
            Stmt::Import { module } => {
                if module == "builtins" {
                    self.assign_name("builtins", Value::Module("builtins".to_string()));
                    Ok(())
                } else {
                    Err(RuntimeError::with_code(
                        format!("no module named '{}'", module),
                        RuntimeErrorCode::Import,
                    ))
                }
            }
            Stmt::FuncDef { name, params, body } => {
                let func = self.make_function(name, params, body);
                self.assign_name(name, func);
                Ok(())
            }
            Stmt::ClassDef { name, bases, body } => self.exec_class_def(name, bases, body),
            Stmt::Return(value) => {
                let value = match value {
                    Some(expr) => self.eval_expr(expr)?,
                    None => Value::None,
                };
                Err(RuntimeError::ret(value))
            }
            Stmt::If {
                branches,
                else_body,
            } => {
                for (cond, body) in branches {
                    if self.eval_expr(cond)?.truthy() {
                        return self.run_block(body);
                    }
                }
                if let Some(body) = else_body {
                    return self.run_block(body);
                }
                Ok(())
            }
            Stmt::While { cond, body } => {
                while self.eval_expr(cond)?.truthy() {
                    match self.run_block(body) {
                        Err(e) if e.is_break => break,
                        Err(e) if e.is_continue => continue,
                        other => other?,
                    }
                }
                Ok(())
            }
            Stmt::For { var, iter, body } => {
                let items = {
                    let value = self.eval_expr(iter)?;
                    self.iterate(value)?
                };
                for item in items {
                    self.assign_name(var, item);
                    match self.run_block(body) {
                        Err(e) if e.is_break => break,
                        Err(e) if e.is_continue => continue,
                        other => other?,
                    }
                }
                Ok(())
            }
            Stmt::Try {
                body,
                handlers,
                finally,
            } => self.exec_try(body, handlers, finally.as_deref()),
            Stmt::Raise { exc_type, message } => {
                let message = match message {
                    Some(expr) => self.eval_expr(expr)?.to_display_string(),
                    None => String::new(),
                };
                Err(RuntimeError::raised(exc_type.clone(), message))
            }
            Stmt::Pass => Ok(()),
            Stmt::Break => Err(RuntimeError::brk()),
            Stmt::Continue => Err(RuntimeError::cont()),
        }
    }

    fn exec_try(
        &mut self,
        body: &[Stmt],
        handlers: &[ExceptHandler],
        finally: Option<&[Stmt]>,
    ) -> Result<(), RuntimeError> {
        let result = match self.run_block(body) {
            Ok(()) => Ok(()),
            // return/break/continue unwind past handlers; everything else may
            // be caught.
            Err(err) if err.is_control_flow() => Err(err),
            Err(err) => self.dispatch_to_handlers(err, handlers),
        };
        if let Some(finally_body) = finally {
            // The finally block always runs; its own failure wins over the
            // pending result.
            self.run_block(finally_body)?;
        }
        result
    }

    fn dispatch_to_handlers(
        &mut self,
        err: RuntimeError,
        handlers: &[ExceptHandler],
    ) -> Result<(), RuntimeError> {
        let exc_type = err.exception_type().to_string();
        for handler in handlers {
            let matches = match handler.exc_type.as_deref() {
                // Bare `except:` and `except Exception:` catch everything
                // except SystemExit.
                None | Some("Exception") => exc_type != "SystemExit",
                Some(name) => name == exc_type,
            };
            if !matches {
                continue;
            }
            if let Some(binding) = &handler.binding {
                self.assign_name(binding, Value::Str(err.message.clone()));
            }
            return self.run_block(&handler.body);
        }
        Err(err)
    }

    pub(super) fn iterate(&mut self, value: Value) -> Result<Vec<Value>, RuntimeError> {
        match value {
            Value::List(items) | Value::Tuple(items) => Ok(items),
            Value::Range(start, end) => Ok((start..end).map(Value::Int).collect()),
            Value::Str(s) => Ok(s.chars().map(|c| Value::Str(c.to_string())).collect()),
            other => Err(RuntimeError::type_mismatch(format!(
                "'{}' object is not iterable",
                other.type_name()
            ))),
        }
    }
}
