use mamushi::Interpreter;

#[test]
fn instances_hold_state_across_method_calls() {
    let program = "\
class Counter:
    def __init__(self, start):
        self.count = start
    def bump(self):
        self.count = self.count + 1
        return self.count
    def current(self):
        return self.count

c = Counter(10)
print(c.bump())
print(c.bump())
print(c.current())
";
    let mut interp = Interpreter::new();
    let output = interp.run(program).expect("run program");
    assert_eq!(output, "11\n12\n12\n");
}

#[test]
fn methods_resolve_through_base_classes() {
    let program = "\
class Base:
    def greet(self):
        return 'hi'

class Child(Base):
    pass

print(Child().greet())
";
    let mut interp = Interpreter::new();
    let output = interp.run(program).expect("run program");
    assert_eq!(output, "hi\n");
}

#[test]
fn child_methods_shadow_base_methods() {
    let program = "\
class Base:
    def label(self):
        return 'base'

class Child(Base):
    def label(self):
        return 'child'

print(Child().label())
print(Base().label())
";
    let mut interp = Interpreter::new();
    let output = interp.run(program).expect("run program");
    assert_eq!(output, "child\nbase\n");
}

#[test]
fn class_attributes_are_readable_from_instances() {
    let program = "\
class Config:
    limit = 8

c = Config()
print(Config.limit)
print(c.limit)
";
    let mut interp = Interpreter::new();
    let output = interp.run(program).expect("run program");
    assert_eq!(output, "8\n8\n");
}

#[test]
fn instance_attributes_shadow_class_attributes() {
    let program = "\
class Box:
    tag = 'shared'

b = Box()
b.tag = 'mine'
print(b.tag)
print(Box.tag)
";
    let mut interp = Interpreter::new();
    let output = interp.run(program).expect("run program");
    assert_eq!(output, "mine\nshared\n");
}

#[test]
fn constructor_without_init_rejects_arguments() {
    let program = "\
class Empty:
    pass

Empty(1)
";
    let mut interp = Interpreter::new();
    let err = interp.run(program).unwrap_err();
    assert_eq!(err.exception_type(), "TypeError");
}

#[test]
fn type_of_instance_is_its_class() {
    let program = "\
class Widget:
    pass

w = Widget()
print(type(w))
";
    let mut interp = Interpreter::new();
    let output = interp.run(program).expect("run program");
    assert_eq!(output, "<class 'Widget'>\n");
}
