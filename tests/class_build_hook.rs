use mamushi::{Interpreter, RuntimeErrorCode, Value};

#[test]
fn overridden_hook_result_is_bound_as_the_class() {
    let program = "\
import builtins
builtins.__build_class__ = lambda x, y: ('class', y)
class A:
    pass
class B:
    pass
print(A)
print(B)
";
    let mut interp = Interpreter::new();
    let output = interp.run(program).expect("run program");
    assert_eq!(output, "('class', 'A')\n('class', 'B')\n");
}

#[test]
fn hook_is_re_resolved_per_class_statement() {
    let program = "\
import builtins
orig = builtins.__build_class__
builtins.__build_class__ = lambda x, y: ('class', y)
class A:
    pass
builtins.__build_class__ = orig
class B:
    pass
print(A)
print(B)
";
    let mut interp = Interpreter::new();
    let output = interp.run(program).expect("run program");
    assert_eq!(output, "('class', 'A')\n<class 'B'>\n");
}

#[test]
fn hook_restored_through_host_api() {
    let mut interp = Interpreter::new();
    let orig = interp.builtin("__build_class__").expect("seeded hook");
    let program = "\
import builtins
builtins.__build_class__ = lambda x, y: ('class', y)
class A:
    pass
print(A)
";
    let output = interp.run(program).expect("run program");
    assert_eq!(output, "('class', 'A')\n");
    interp.set_builtin("__build_class__", orig).expect("restore");
    let output = interp.run("class B:\n    pass\nprint(B)\n").expect("run");
    assert_eq!(output, "('class', 'A')\n<class 'B'>\n");
}

#[test]
fn missing_hook_propagates_name_resolution_failure() {
    let mut interp = Interpreter::new();
    assert!(interp.remove_builtin("__build_class__").expect("remove hook"));
    let err = interp.run("class C:\n    pass\n").unwrap_err();
    assert_eq!(err.code, Some(RuntimeErrorCode::NameResolution));
}

#[test]
fn deleted_hook_is_detectable_from_the_language() {
    let program = "\
import builtins
del builtins.__build_class__
try:
    class C:
        pass
except NameError:
    print('unresolved')
";
    let mut interp = Interpreter::new();
    let output = interp.run(program).expect("run program");
    assert_eq!(output, "unresolved\n");
}

#[test]
fn hook_receives_body_unit_name_and_bases() {
    let program = "\
import builtins
def hook(code, name, base):
    return (name, base)
class Base:
    pass
builtins.__build_class__ = hook
class Child(Base):
    pass
print(Child)
";
    let mut interp = Interpreter::new();
    let output = interp.run(program).expect("run program");
    assert_eq!(output, "('Child', <class 'Base'>)\n");
}

#[test]
fn hook_failure_propagates_unchanged() {
    let program = "\
import builtins
def broken(code, name):
    raise ValueError('hook failed')
builtins.__build_class__ = broken
class A:
    pass
";
    let mut interp = Interpreter::new();
    let err = interp.run(program).unwrap_err();
    assert_eq!(err.exception_type(), "ValueError");
    assert_eq!(err.message, "hook failed");
}

#[test]
fn host_installed_hook_value_is_used_verbatim() {
    // The dispatcher accepts whatever the current binding produces; a hook
    // that is not even callable surfaces its own call failure.
    let mut interp = Interpreter::new();
    interp
        .set_builtin("__build_class__", Value::Int(3))
        .expect("override hook");
    let err = interp.run("class A:\n    pass\n").unwrap_err();
    assert_eq!(err.exception_type(), "TypeError");
}
