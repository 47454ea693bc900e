use super::*;
use std::rc::Rc;

use crate::ast::{AssignTarget, Stmt};
use crate::trace::trace_log;

impl Interpreter {
    /// Resolve an unqualified name: innermost frame, then module globals,
    /// then the builtin namespace. The builtin lookup happens at use time, so
    /// an override applied earlier in the program is always observed.
    pub(crate) fn lookup_name(&mut self, name: &str) -> Result<Value, RuntimeError> {
        if let Some(frame) = self.scopes.last()
            && let Some(value) = frame.vars.get(name)
        {
            return Ok(value.clone());
        }
        if self.scopes.len() > 1
            && let Some(value) = self.scopes[0].vars.get(name)
        {
            return Ok(value.clone());
        }
        if let Some(value) = self.builtins.get(name) {
            trace_log!("resolve", "'{}' resolved via builtin namespace", name);
            return Ok(value);
        }
        Err(RuntimeError::name_resolution(name))
    }

    pub(crate) fn assign_name(&mut self, name: &str, value: Value) {
        if let Some(frame) = self.scopes.last_mut() {
            frame.vars.insert(name.to_string(), value);
        }
    }

    pub(super) fn assign_target(
        &mut self,
        target: &AssignTarget,
        value: Value,
    ) -> Result<(), RuntimeError> {
        match target {
            AssignTarget::Name(name) => {
                self.assign_name(name, value);
                Ok(())
            }
            AssignTarget::Attribute { target, name } => {
                let object = self.eval_expr(target)?;
                self.attribute_set(&object, name, value)
            }
        }
    }

    pub(super) fn delete_target(&mut self, target: &AssignTarget) -> Result<(), RuntimeError> {
        match target {
            AssignTarget::Name(name) => {
                let removed = self
                    .scopes
                    .last_mut()
                    .map(|frame| frame.vars.remove(name).is_some())
                    .unwrap_or(false);
                if removed {
                    Ok(())
                } else {
                    Err(RuntimeError::name_resolution(name))
                }
            }
            AssignTarget::Attribute { target, name } => {
                let object = self.eval_expr(target)?;
                match &object {
                    Value::Module(module) if module == "builtins" => {
                        if self.builtins.remove(name)? {
                            Ok(())
                        } else {
                            Err(RuntimeError::attribute("module 'builtins'", name))
                        }
                    }
                    Value::Instance(inst) => {
                        if inst.borrow_mut().attrs.remove(name).is_some() {
                            Ok(())
                        } else {
                            Err(RuntimeError::attribute(
                                format!("'{}' object", object.type_name()),
                                name,
                            ))
                        }
                    }
                    other => Err(RuntimeError::attribute(
                        format!("'{}' object", other.type_name()),
                        name,
                    )),
                }
            }
        }
    }

    pub(super) fn attribute_get(
        &mut self,
        object: &Value,
        name: &str,
    ) -> Result<Value, RuntimeError> {
        match object {
            // Attribute reads on the builtins module are namespace lookups.
            Value::Module(module) if module == "builtins" => self
                .builtins
                .get(name)
                .ok_or_else(|| RuntimeError::attribute("module 'builtins'", name)),
            Value::Instance(_) => self.instance_attr(object, name),
            Value::Class(cls) => Self::class_attr(cls, name).ok_or_else(|| {
                RuntimeError::attribute(format!("type object '{}'", cls.name), name)
            }),
            other => Err(RuntimeError::attribute(
                format!("'{}' object", other.type_name()),
                name,
            )),
        }
    }

    pub(super) fn attribute_set(
        &mut self,
        object: &Value,
        name: &str,
        value: Value,
    ) -> Result<(), RuntimeError> {
        match object {
            // Attribute writes on the builtins module are namespace writes,
            // immediately visible to every later resolution.
            Value::Module(module) if module == "builtins" => self.builtins.set(name, value),
            Value::Instance(inst) => {
                inst.borrow_mut().attrs.insert(name.to_string(), value);
                Ok(())
            }
            other => Err(RuntimeError::attribute(
                format!("'{}' object", other.type_name()),
                name,
            )),
        }
    }

    /// Build a function value. Functions defined inside another function
    /// capture its locals by value; at module level (and in class bodies)
    /// free names resolve live through the global scope instead.
    pub(super) fn make_function(&self, name: &str, params: &[String], body: &[Stmt]) -> Value {
        let env = match self.scopes.last() {
            Some(frame) if frame.kind == FrameKind::Function => frame.vars.clone(),
            _ => HashMap::new(),
        };
        Value::Function {
            name: name.to_string(),
            params: params.to_vec(),
            body: Rc::new(body.to_vec()),
            env,
        }
    }
}
