use super::*;
use std::cell::RefCell;
use std::rc::Rc;

use crate::ast::{Expr, Stmt};
use crate::builtins::BUILD_CLASS_HOOK;
use crate::trace::trace_log;
use crate::value::{ClassObj, InstanceObj};

impl Interpreter {
    /// Execute a class statement: evaluate the header, resolve the
    /// build-class hook from the builtin namespace at this moment, invoke it
    /// with the body unit and the class name, and bind whatever it returns.
    ///
    /// The hook is re-read on every class statement. The value is never
    /// cached, and there is no hidden fallback: if the entry is missing the
    /// resolution failure propagates to the caller.
    pub(super) fn exec_class_def(
        &mut self,
        name: &str,
        bases: &[Expr],
        body: &[Stmt],
    ) -> Result<(), RuntimeError> {
        let mut base_values = Vec::with_capacity(bases.len());
        for base in bases {
            base_values.push(self.eval_expr(base)?);
        }
        let hook = self
            .builtins
            .get(BUILD_CLASS_HOOK)
            .ok_or_else(|| RuntimeError::name_resolution(BUILD_CLASS_HOOK))?;
        trace_log!("class", "building '{}' via {}", name, hook.repr_value());
        let mut args = vec![
            Value::Code(Rc::new(body.to_vec())),
            Value::Str(name.to_string()),
        ];
        args.extend(base_values);
        let result = self.call_value(hook, args)?;
        self.assign_name(name, result);
        Ok(())
    }

    /// The default build-class hook: run the body unit in a fresh class
    /// frame and collect that frame into a genuine class object. Seeded into
    /// the builtin namespace as an ordinary, overridable entry.
    pub(super) fn default_build_class(&mut self, args: &[Value]) -> Result<Value, RuntimeError> {
        let (Some(Value::Code(body)), Some(Value::Str(name))) = (args.first(), args.get(1)) else {
            return Err(RuntimeError::type_mismatch(
                "__build_class__ expects a code object and a name",
            ));
        };
        let body = body.clone();
        let mut bases = Vec::new();
        for base in &args[2..] {
            match base {
                Value::Class(cls) => bases.push(cls.clone()),
                other => {
                    return Err(RuntimeError::type_mismatch(format!(
                        "bases must be types, not '{}'",
                        other.type_name()
                    )));
                }
            }
        }
        self.scopes.push(Frame::new(FrameKind::Class));
        let result = self.run_block(&body);
        let frame = self.scopes.pop();
        result?;
        let attrs = frame.map(|f| f.vars).unwrap_or_default();
        Ok(Value::Class(Rc::new(ClassObj {
            name: name.clone(),
            bases,
            attrs,
        })))
    }

    /// Depth-first attribute lookup through a class and its bases.
    pub(super) fn class_attr(cls: &Rc<ClassObj>, name: &str) -> Option<Value> {
        if let Some(value) = cls.attrs.get(name) {
            return Some(value.clone());
        }
        for base in &cls.bases {
            if let Some(value) = Self::class_attr(base, name) {
                return Some(value);
            }
        }
        None
    }

    /// Instance attribute lookup: own attributes first, then the class
    /// hierarchy; plain functions found on the class bind as methods.
    pub(super) fn instance_attr(
        &mut self,
        object: &Value,
        name: &str,
    ) -> Result<Value, RuntimeError> {
        let Value::Instance(inst) = object else {
            return Err(RuntimeError::attribute(
                format!("'{}' object", object.type_name()),
                name,
            ));
        };
        if let Some(value) = inst.borrow().attrs.get(name) {
            return Ok(value.clone());
        }
        let class = inst.borrow().class.clone();
        match Self::class_attr(&class, name) {
            Some(func @ Value::Function { .. }) => Ok(Value::BoundMethod {
                receiver: Box::new(object.clone()),
                func: Box::new(func),
            }),
            Some(value) => Ok(value),
            None => Err(RuntimeError::attribute(
                format!("'{}' object", class.name),
                name,
            )),
        }
    }

    pub(super) fn instantiate(
        &mut self,
        cls: &Rc<ClassObj>,
        args: Vec<Value>,
    ) -> Result<Value, RuntimeError> {
        let instance = Value::Instance(Rc::new(RefCell::new(InstanceObj {
            class: cls.clone(),
            attrs: HashMap::new(),
        })));
        match Self::class_attr(cls, "__init__") {
            Some(init) => {
                let mut call_args = Vec::with_capacity(args.len() + 1);
                call_args.push(instance.clone());
                call_args.extend(args);
                self.call_value(init, call_args)?;
            }
            None => {
                if !args.is_empty() {
                    return Err(RuntimeError::type_mismatch(format!(
                        "{}() takes no arguments",
                        cls.name
                    )));
                }
            }
        }
        Ok(instance)
    }
}
