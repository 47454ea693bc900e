use super::*;
use crate::trace::trace_log;

impl Interpreter {
    pub(crate) fn call_value(&mut self, func: Value, args: Vec<Value>) -> Result<Value, RuntimeError> {
        match func {
            Value::Builtin(name) => {
                trace_log!("call", "native {} ({} args)", name, args.len());
                self.call_native(&name, &args)
            }
            Value::Function {
                name,
                params,
                body,
                env,
            } => {
                trace_log!("call", "{} ({} args)", name, args.len());
                if args.len() != params.len() {
                    return Err(RuntimeError::type_mismatch(format!(
                        "{}() takes {} positional arguments but {} were given",
                        name,
                        params.len(),
                        args.len()
                    )));
                }
                let mut frame = Frame::new(FrameKind::Function);
                frame.vars = env;
                for (param, arg) in params.iter().zip(args) {
                    frame.vars.insert(param.clone(), arg);
                }
                self.scopes.push(frame);
                let result = self.run_block(&body);
                self.scopes.pop();
                match result {
                    Ok(()) => Ok(Value::None),
                    Err(mut e) => match e.return_value.take() {
                        Some(value) => Ok(value),
                        None => Err(e),
                    },
                }
            }
            Value::BoundMethod { receiver, func } => {
                let mut all = Vec::with_capacity(args.len() + 1);
                all.push(*receiver);
                all.extend(args);
                self.call_value(*func, all)
            }
            Value::Class(cls) => self.instantiate(&cls, args),
            other => Err(RuntimeError::type_mismatch(format!(
                "'{}' object is not callable",
                other.type_name()
            ))),
        }
    }
}
