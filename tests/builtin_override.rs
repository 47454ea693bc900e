use mamushi::Interpreter;

// The override program: replace a generic builtin, then replace the
// build-class hook and observe its value bound in place of a real class.
const PROGRAM: &str = "\
import builtins

try:
    builtins.abs = lambda x: x + 1
except AttributeError:
    print('SKIP')
    raise SystemExit

print(abs(1))

builtins.__build_class__ = lambda x, y: ('class', y)
class A:
    pass
print(A)
";

#[test]
fn builtin_override_with_mutable_namespace() {
    let mut interp = Interpreter::new();
    let output = interp.run(PROGRAM).expect("run override program");
    assert_eq!(output, "2\n('class', 'A')\n");
}

#[test]
fn builtin_override_with_frozen_namespace_skips() {
    let mut interp = Interpreter::new();
    interp.freeze_builtins();
    let output = interp.run(PROGRAM).expect("run override program");
    assert_eq!(output, "SKIP\n");
}

#[test]
fn override_is_visible_to_later_resolutions_only() {
    let program = "\
import builtins
print(abs(-3))
builtins.abs = lambda x: x + 1
print(abs(-3))
";
    let mut interp = Interpreter::new();
    let output = interp.run(program).expect("run program");
    assert_eq!(output, "3\n-2\n");
}
