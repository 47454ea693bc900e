use mamushi::{Interpreter, RuntimeErrorCode, Value};

#[test]
fn host_set_then_resolve_returns_replacement() {
    let mut interp = Interpreter::new();
    interp
        .set_builtin("answer", Value::Int(42))
        .expect("install new builtin");
    let output = interp.run("print(answer)\n").expect("run program");
    assert_eq!(output, "42\n");
}

#[test]
fn host_override_is_visible_to_the_fallback_path() {
    let mut interp = Interpreter::new();
    interp
        .set_builtin("abs", Value::Int(7))
        .expect("override abs");
    let output = interp.run("print(abs)\n").expect("run program");
    assert_eq!(output, "7\n");
}

#[test]
fn get_is_idempotent_without_intervening_set() {
    let interp = Interpreter::new();
    let first = interp.builtin("abs");
    let second = interp.builtin("abs");
    assert_eq!(first, second);
    assert_eq!(first, Some(Value::Builtin("abs".to_string())));
}

#[test]
fn protected_entry_rejects_override_and_keeps_binding() {
    let mut interp = Interpreter::new();
    assert!(interp.protect_builtin("abs"));
    let err = interp.set_builtin("abs", Value::Int(0)).unwrap_err();
    assert_eq!(err.code, Some(RuntimeErrorCode::WriteProtected));
    assert_eq!(interp.builtin("abs"), Some(Value::Builtin("abs".to_string())));
    // Resolution still reaches the original implementation.
    let output = interp.run("print(abs(-3))\n").expect("run program");
    assert_eq!(output, "3\n");
}

#[test]
fn protected_write_surfaces_as_attribute_error() {
    let mut interp = Interpreter::new();
    interp.protect_builtin("abs");
    let program = "\
import builtins
try:
    builtins.abs = 1
except AttributeError:
    print('unsupported')
print(abs(-3))
";
    let output = interp.run(program).expect("run program");
    assert_eq!(output, "unsupported\n3\n");
}

#[test]
fn frozen_namespace_rejects_creation_too() {
    let mut interp = Interpreter::new();
    interp.freeze_builtins();
    let err = interp.set_builtin("shiny", Value::Int(1)).unwrap_err();
    assert_eq!(err.code, Some(RuntimeErrorCode::WriteProtected));
    // In-language writes to a fresh name fail the same way.
    let program = "\
import builtins
try:
    builtins.shiny = 1
except AttributeError:
    print('unsupported')
";
    let output = interp.run(program).expect("run program");
    assert_eq!(output, "unsupported\n");
}

#[test]
fn missing_name_is_a_recoverable_name_error() {
    let mut interp = Interpreter::new();
    let err = interp.run("no_such_name\n").unwrap_err();
    assert_eq!(err.code, Some(RuntimeErrorCode::NameResolution));
    assert_eq!(err.exception_type(), "NameError");

    let program = "\
try:
    no_such_name
except NameError:
    print('recovered')
";
    let output = interp.run(program).expect("run program");
    assert_eq!(output, "recovered\n");
}

#[test]
fn local_and_global_scopes_shadow_builtins() {
    let program = "\
def abs(x):
    return 'shadowed'
print(abs(-3))
";
    let mut interp = Interpreter::new();
    let output = interp.run(program).expect("run program");
    assert_eq!(output, "shadowed\n");
}

#[test]
fn attribute_reads_on_builtins_module_route_through_namespace() {
    let program = "\
import builtins
print(builtins.abs(-3))
";
    let mut interp = Interpreter::new();
    let output = interp.run(program).expect("run program");
    assert_eq!(output, "3\n");
}
