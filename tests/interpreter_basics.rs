use mamushi::Interpreter;

#[test]
fn arithmetic_follows_python_semantics() {
    let program = "\
print(7 / 2)
print(-7 // 2)
print(-7 % 2)
print(2 ** 10)
";
    let mut interp = Interpreter::new();
    let output = interp.run(program).expect("run program");
    assert_eq!(output, "3.5\n-4\n1\n1024\n");
}

#[test]
fn integers_promote_past_machine_width() {
    let mut interp = Interpreter::new();
    let output = interp.run("print(2 ** 100)\n").expect("run program");
    assert_eq!(output, "1267650600228229401496703205376\n");

    let output = interp
        .run("print(10000000000000000000 + 1)\n")
        .expect("run program");
    assert!(output.ends_with("10000000000000000001\n"));
}

#[test]
fn for_loops_with_break_and_continue() {
    let program = "\
total = 0
for i in range(10):
    if i == 3:
        continue
    if i == 6:
        break
    total = total + i
print(total)
";
    let mut interp = Interpreter::new();
    let output = interp.run(program).expect("run program");
    assert_eq!(output, "12\n");
}

#[test]
fn strings_and_subscripts() {
    let program = "\
s = 'hello'
print(len(s))
print(s[1])
print(s[-1])
print('ab' * 3)
print('ab' + 'cd')
";
    let mut interp = Interpreter::new();
    let output = interp.run(program).expect("run program");
    assert_eq!(output, "5\ne\no\nababab\nabcd\n");
}

#[test]
fn closures_capture_enclosing_locals() {
    let program = "\
def make_adder(n):
    return lambda x: x + n
add2 = make_adder(2)
print(add2(5))
";
    let mut interp = Interpreter::new();
    let output = interp.run(program).expect("run program");
    assert_eq!(output, "7\n");
}

#[test]
fn module_level_functions_see_later_globals() {
    let program = "\
def double_base():
    return base * 2
base = 21
print(double_base())
";
    let mut interp = Interpreter::new();
    let output = interp.run(program).expect("run program");
    assert_eq!(output, "42\n");
}

#[test]
fn boolean_operators_short_circuit() {
    let program = "\
def boom():
    raise ValueError('should not run')
print(False and boom())
print(True or boom())
print(1 < 2 and 3 > 2)
";
    let mut interp = Interpreter::new();
    let output = interp.run(program).expect("run program");
    assert_eq!(output, "False\nTrue\nTrue\n");
}

#[test]
fn lists_tuples_and_aggregates() {
    let program = "\
t = [1, 2] + [3]
print(t)
print(len(t))
print(min(3, 1, 2), max([4, 9]))
pair = 1, 2
print(pair)
";
    let mut interp = Interpreter::new();
    let output = interp.run(program).expect("run program");
    assert_eq!(output, "[1, 2, 3]\n3\n1 9\n(1, 2)\n");
}
