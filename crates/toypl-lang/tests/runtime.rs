//! Runtime behavior tests.
//!
//! Tests the full stack: parse → Interpreter::run. Globals are inspected after
//! the run to verify definitions and assignments.

use std::io::{self, Write};
use std::thread;

use toypl_lang::{
    evaluate, parse, Config, Error, ErrorCode, ErrorKind, Interpreter, Output, Value, EVAL_STACK_SIZE,
};

// ─── Helpers ─────────────────────────────────────────────────────────────────

fn run(src: &str) -> (Interpreter, Value) {
    let program = parse(src).unwrap_or_else(|e| panic!("parse failed: {e}"));
    let interp = Interpreter::with_config(Config::default().capture_output());
    let result = interp.run(&program).unwrap_or_else(|e| panic!("run failed: {e}"));
    (interp, result)
}

fn eval(src: &str) -> Value {
    run(src).1
}

fn run_err(src: &str) -> Error {
    let program = parse(src).unwrap_or_else(|e| {
        panic!("parse failed (expected runtime error, not parse error): {e}");
    });
    let interp = Interpreter::with_config(Config::default().capture_output());
    match interp.run(&program) {
        Ok(v) => panic!("expected run to fail but it produced {v}"),
        Err(e) => e,
    }
}

fn global(interp: &Interpreter, name: &str) -> Value {
    interp.global().lookup(name).unwrap_or_else(|e| panic!("global `{name}`: {e}"))
}

fn num(v: Value) -> f64 {
    match v {
        Value::Number(n) => n,
        other => panic!("expected Number, got {other:?}"),
    }
}

// ─── Literals ────────────────────────────────────────────────────────────────

#[test]
fn number_literal() {
    assert_eq!(eval("1"), Value::Number(1.0));
}

#[test]
fn string_literal() {
    assert_eq!(eval(r#""hello""#), Value::str("hello"));
}

#[test]
fn boolean_and_null_literals() {
    assert_eq!(eval("true"), Value::Bool(true));
    assert_eq!(eval("false"), Value::Bool(false));
    assert_eq!(eval("null"), Value::Null);
}

#[test]
fn program_result_is_last_expression() {
    assert_eq!(eval("1 2 3"), Value::Number(3.0));
}

// ─── Definitions ─────────────────────────────────────────────────────────────

#[test]
fn def_binds_immutable() {
    let (interp, result) = run("def x 1");
    assert_eq!(result, Value::Number(1.0));
    let binding = interp.global().get_own("x").unwrap();
    assert_eq!(binding.value, Value::Number(1.0));
    assert!(!binding.mutable);
}

#[test]
fn def_mut_binds_mutable() {
    let (interp, _) = run("def mut x 1");
    assert!(interp.global().get_own("x").unwrap().mutable);
}

#[test]
fn def_literals() {
    let (interp, _) = run("def a true def b false def c null");
    assert_eq!(global(&interp, "a"), Value::Bool(true));
    assert_eq!(global(&interp, "b"), Value::Bool(false));
    assert_eq!(global(&interp, "c"), Value::Null);
}

#[test]
fn set_mutable_succeeds() {
    let (interp, result) = run("def mut x 10\nset x 20");
    assert_eq!(result, Value::Number(20.0));
    assert_eq!(global(&interp, "x"), Value::Number(20.0));
}

#[test]
fn set_immutable_fails() {
    let e = run_err("def x 10\nset x 20");
    assert_eq!(e.code(), ErrorCode::R002);
    assert_eq!(e.kind(), ErrorKind::Runtime);
    assert!(e.message().contains("`x`"), "{e}");
}

#[test]
fn undefined_variable_fails() {
    let e = run_err("+(x 1)");
    assert_eq!(e.code(), ErrorCode::R001);
    assert!(e.message().contains("`x`"), "{e}");
}

#[test]
fn set_undefined_fails() {
    assert_eq!(run_err("set nope 1").code(), ErrorCode::R001);
}

// ─── Scoping ─────────────────────────────────────────────────────────────────

#[test]
fn block_definitions_stay_local() {
    let (interp, result) = run("def x 1\ndef y {\n  def x 2\n}\nx");
    assert_eq!(result, Value::Number(1.0));
    assert_eq!(global(&interp, "x"), Value::Number(1.0));
    assert_eq!(global(&interp, "y"), Value::Number(2.0));
}

#[test]
fn block_sees_outer_bindings() {
    assert_eq!(eval("def x 10\n{\n  def y 20\n  +(x y)\n}"), Value::Number(30.0));
}

#[test]
fn block_set_reaches_outer_binding() {
    let (interp, _) = run("def mut x 1 { set x 5 }");
    assert_eq!(global(&interp, "x"), Value::Number(5.0));
}

#[test]
fn empty_block_is_undefined() {
    assert_eq!(eval("{}"), Value::Undefined);
}

// ─── Builtins ────────────────────────────────────────────────────────────────

#[test]
fn native_add() {
    assert_eq!(eval("+ (1 2)"), Value::Number(3.0));
}

#[test]
fn native_unary_minus() {
    assert_eq!(eval("-(2)"), Value::Number(-2.0));
}

#[test]
fn native_divide() {
    assert_eq!(eval("/(6 3)"), Value::Number(2.0));
}

#[test]
fn native_equality() {
    assert_eq!(eval("=(+(1 1) 2)"), Value::Bool(true));
    assert_eq!(eval(r#"=("a" "b")"#), Value::Bool(false));
}

#[test]
fn native_type_error() {
    assert_eq!(run_err(r#"*(2 "x")"#).code(), ErrorCode::R006);
}

#[test]
fn native_missing_argument() {
    let e = run_err(">(1)");
    assert_eq!(e.code(), ErrorCode::R006);
    assert!(e.message().contains("at least 2"), "{e}");
}

#[test]
fn print_is_captured() {
    let (interp, result) = run(r#"def x 3 print("x is" x) print()"#);
    assert_eq!(result, Value::Undefined);
    assert_eq!(interp.take_output(), vec!["x is 3", ""]);
}

struct ClosedPipe;

impl Write for ClosedPipe {
    fn write(&mut self, _: &[u8]) -> io::Result<usize> {
        Err(io::Error::new(io::ErrorKind::BrokenPipe, "pipe closed"))
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[test]
fn print_to_closed_output_is_runtime_error() {
    let program = parse("def mut i 0 while <(i 3) { print(i) set i +(i 1) }").unwrap();
    let interp = Interpreter::with_config(Config::default().with_output(Output::writer(ClosedPipe)));
    let e = interp.run(&program).unwrap_err();
    assert_eq!(e.code(), ErrorCode::R007);
    assert_eq!(e.kind(), ErrorKind::Runtime);
    assert!(e.message().contains("pipe closed"), "{e}");
}

#[test]
fn version_comes_from_config() {
    let program = parse("VERSION").unwrap();
    let interp = Interpreter::with_config(Config::default().with_version("v1.2.3"));
    assert_eq!(interp.run(&program).unwrap(), Value::str("v1.2.3"));
}

#[test]
fn builtins_cannot_be_reassigned() {
    assert_eq!(run_err("set + 1").code(), ErrorCode::R002);
}

#[test]
fn builtins_can_be_shadowed_locally() {
    assert_eq!(eval("{ def + λ(a b) 42  +(1 2) }"), Value::Number(42.0));
}

// ─── Control flow ────────────────────────────────────────────────────────────

#[test]
fn if_takes_else_branch() {
    let (interp, result) = run("def x 10\ndef mut y 0\nif >(x 10)\n  then set y 20\n  else set y 30\n");
    assert_eq!(result, Value::Number(30.0));
    assert_eq!(global(&interp, "y"), Value::Number(30.0));
}

#[test]
fn else_if_chain() {
    let src = "
        def x 10
        def mut y 0
        if <(x 9)
            then set y 20
            else if >(x 9)
                 then set y 30
                 else set y 40
    ";
    assert_eq!(eval(src), Value::Number(30.0));
}

#[test]
fn truthiness_rule() {
    assert_eq!(eval("if 0 then 1 else 2"), Value::Number(2.0));
    assert_eq!(eval(r#"if "" then 1 else 2"#), Value::Number(2.0));
    assert_eq!(eval("if null then 1 else 2"), Value::Number(2.0));
    assert_eq!(eval(r#"if "a" then 1 else 2"#), Value::Number(1.0));
    assert_eq!(eval("if -(1) then 1 else 2"), Value::Number(1.0));
    assert_eq!(eval("if λ() 0 then 1 else 2"), Value::Number(1.0));
}

#[test]
fn while_loop() {
    let (interp, result) = run("def mut x 20\nwhile > (x 10)\n  set x -(x 1)");
    assert_eq!(result, Value::Number(10.0));
    assert_eq!(global(&interp, "x"), Value::Number(10.0));
}

#[test]
fn while_never_runs_is_undefined() {
    assert_eq!(eval("while false 1"), Value::Undefined);
}

#[test]
fn do_while_loop() {
    let (interp, result) = run("def mut x 0\ndo set x +(x 1)\n  while < (x 10)");
    assert_eq!(result, Value::Number(10.0));
    assert_eq!(global(&interp, "x"), Value::Number(10.0));
}

#[test]
fn do_while_runs_at_least_once() {
    let (interp, result) = run("def mut x 0  do set x +(x 1) while <(x 3)");
    assert_eq!(result, Value::Number(3.0));
    assert_eq!(global(&interp, "x"), Value::Number(3.0));

    let (interp, _) = run("def mut n 0  do set n 7 while false");
    assert_eq!(global(&interp, "n"), Value::Number(7.0));
}

// ─── Functions ───────────────────────────────────────────────────────────────

#[test]
fn square() {
    assert_eq!(eval("def square λ(x) *(x x)\nsquare(4)"), Value::Number(16.0));
}

#[test]
fn lambda_keyword() {
    assert_eq!(eval("def square lambda(x) *(x x) square(2)"), Value::Number(4.0));
}

#[test]
fn function_with_block_body() {
    let src = "
        def calc λ(x y) {
            def z 30
            +(*(x y) z)
        }
        calc(10 20)
    ";
    assert_eq!(eval(src), Value::Number(230.0));
}

#[test]
fn closure_captures_outer_locals() {
    let src = "
        def value 100
        def calc λ(x y) {
            def z +(x y)

            def inner λ(foo) +(+(foo z) value)
        }
        def fn calc(10 20)
        fn(30)
    ";
    assert_eq!(eval(src), Value::Number(160.0));
}

#[test]
fn callback_argument() {
    let src = "
        def onClick λ(callback) {
            def x 10
            def y 20
            callback( +(x y) )
        }

        onClick( λ(data) *(data 10) )
    ";
    assert_eq!(eval(src), Value::Number(300.0));
}

#[test]
fn recursive_factorial() {
    let src = "
        def factorial λ(x) if =(x 1)
                           then 1
                           else *( x factorial( -(x 1) ) )

        factorial(5)
    ";
    assert_eq!(eval(src), Value::Number(120.0));
}

#[test]
fn iterative_factorial() {
    let src = "
        def factorial λ(x) {
            def mut result x
            def mut i x
            while >(i 1) {
                set i -(i 1)
                set result *(result i)
            }
        }

        factorial(5)
    ";
    assert_eq!(eval(src), Value::Number(120.0));
}

#[test]
fn counter_keeps_state_between_calls() {
    let src = "
        def make-counter λ() {
            def mut count 0
            λ() set count +(count 1)
        }
        def counter make-counter()
        counter()
        counter()
        counter()
    ";
    assert_eq!(eval(src), Value::Number(3.0));
}

#[test]
fn counters_are_independent() {
    let src = "
        def make-counter λ() {
            def mut count 0
            λ() set count +(count 1)
        }
        def a make-counter()
        def b make-counter()
        a() a() a()
        def from-b b()
    ";
    let (interp, _) = run(src);
    assert_eq!(global(&interp, "from-b"), Value::Number(1.0));
}

#[test]
fn deep_recursion_on_eval_stack() {
    let depth = thread::Builder::new()
        .stack_size(EVAL_STACK_SIZE)
        .spawn(|| {
            let src = "def count λ(n) if =(n 0) then 0 else +(1 count(-(n 1)))\ncount(5000)";
            num(eval(src))
        })
        .unwrap()
        .join()
        .unwrap();
    assert_eq!(depth, 5000.0);
}

#[test]
fn curried_call() {
    assert_eq!(eval("def add λ(a) λ(b) +(a b)\nadd(2)(3)"), Value::Number(5.0));
}

#[test]
fn closures_are_lexically_scoped() {
    let src = "
        def x 1
        def f λ() x
        def g λ(x) f()
        g(2)
    ";
    assert_eq!(eval(src), Value::Number(1.0));
}

#[test]
fn missing_arguments_are_undefined() {
    assert_eq!(eval("def f λ(a b) b\nf(1)"), Value::Undefined);
}

#[test]
fn extra_arguments_are_ignored() {
    assert_eq!(eval("def f λ(a) a\nf(1 2 3)"), Value::Number(1.0));
}

#[test]
fn parameters_are_immutable() {
    assert_eq!(run_err("def f λ(a) set a 2\nf(1)").code(), ErrorCode::R002);
}

#[test]
fn calling_a_number_fails() {
    let e = run_err("def x 1\nx()");
    assert_eq!(e.code(), ErrorCode::R004);
}

#[test]
fn def_on_call_target_fails() {
    let e = run_err("def f(x) 1");
    assert_eq!(e.code(), ErrorCode::R003);
    assert!(e.message().contains("CallExpression"), "{e}");
}

// ─── Classes ─────────────────────────────────────────────────────────────────

#[test]
fn method_call() {
    let src = "
        def Point class {
            calc(x y) +(x y)
        }

        def point new Point()
        point.calc(10 20)
    ";
    assert_eq!(eval(src), Value::Number(30.0));
}

#[test]
fn init_and_this() {
    let src = "
        def Point class {
            init(x y) {
                def mut this.x x
                def mut this.y y
            }
            calc() +(this.x this.y)
            calc2() {
                set this.x 20
                set this.y 30
                this.calc()
            }
        }

        def point new Point(10 20)
        def calced point.calc()
        def calced2 point.calc2()
    ";
    let (interp, _) = run(src);
    assert_eq!(global(&interp, "calced"), Value::Number(30.0));
    assert_eq!(global(&interp, "calced2"), Value::Number(50.0));
}

#[test]
fn nested_member_paths() {
    let src = "
        def Point class {
          init(x) {
            def this.x x
          }
        }

        def Point3D class {
          init(y) {
            def this.y y
          }
        }

        def point3D new Point3D(20)
        def point new Point(point3D)
        def prop point.x.y
        def point.x.z 100
        def sub-prop point.x.z
    ";
    let (interp, _) = run(src);
    assert_eq!(global(&interp, "prop"), Value::Number(20.0));
    assert_eq!(global(&interp, "sub-prop"), Value::Number(100.0));
}

#[test]
fn class_composition() {
    let src = "
        def Point class {
          init(x y) {
            def this.x x
            def this.y y
          }
        }

        def Point3D class {
          init(p x y z) {
            def parent new p(x y)
            def this.x parent.x
            def this.y parent.y
            def this.z z
          }
        }

        def point3D new Point3D(Point 10 20 30)
        def point3D-2 new Point3D(Point 100 200 300)

        def test1 point3D.x
        def test2 point3D.y
        def test3 point3D-2.x
        def test4 point3D-2.z
    ";
    let (interp, _) = run(src);
    assert_eq!(num(global(&interp, "test1")), 10.0);
    assert_eq!(num(global(&interp, "test2")), 20.0);
    assert_eq!(num(global(&interp, "test3")), 100.0);
    assert_eq!(num(global(&interp, "test4")), 300.0);
}

#[test]
fn sibling_instances_have_independent_fields() {
    let src = "
        def P class {
          init(x) { def mut this.x x }
          get() this.x
        }
        def a new P(1)
        def b new P(2)
        set a.x 10
        def ax a.get()
        def bx b.get()
        def same-method =(a.get b.get)
    ";
    let (interp, _) = run(src);
    assert_eq!(global(&interp, "ax"), Value::Number(10.0));
    assert_eq!(global(&interp, "bx"), Value::Number(2.0));
    assert_eq!(global(&interp, "same-method"), Value::Bool(true));
}

#[test]
fn instance_fields_do_not_leak_into_class() {
    let src = "
        def P class { init() { def this.f 1 } }
        def a new P()
    ";
    let (interp, _) = run(src);
    let class = global(&interp, "P");
    assert!(!class.as_object().unwrap().has_own("f"));
    let a = global(&interp, "a");
    assert!(a.as_object().unwrap().has_own("f"));
}

#[test]
fn methods_see_instance_bindings_without_this() {
    let src = "
        def C class {
          init(v) { def this.v v }
          get() v
        }
        def c new C(7)
        c.get()
    ";
    assert_eq!(eval(src), Value::Number(7.0));
}

#[test]
fn methods_can_call_siblings() {
    let src = "
        def C class {
          double(n) *(n 2)
          quad(n) double(double(n))
        }
        def c new C()
        c.quad(3)
    ";
    assert_eq!(eval(src), Value::Number(12.0));
}

#[test]
fn this_is_the_instance() {
    let (interp, _) = run("def C class {} def c new C() def same =(c c.this)");
    assert_eq!(global(&interp, "same"), Value::Bool(true));
}

#[test]
fn this_is_immutable() {
    assert_eq!(run_err("def C class { init() set this 1 } new C()").code(), ErrorCode::R002);
}

#[test]
fn immutable_field_cannot_be_set() {
    let src = "
        def P class { init(x) { def this.x x } }
        def p new P(1)
        set p.x 2
    ";
    assert_eq!(run_err(src).code(), ErrorCode::R002);
}

#[test]
fn init_result_is_discarded() {
    let (_, result) = run("def C class { init() 99 } new C()");
    assert!(result.as_object().is_some());
}

#[test]
fn computed_member_access() {
    let src = r#"
        def P class { init() { def mut this.k 1 } }
        def p new P()
        def key "k"
        def a p["k"]
        def b p[key]
        def p["z"] 5
        def c p.z
    "#;
    let (interp, _) = run(src);
    assert_eq!(global(&interp, "a"), Value::Number(1.0));
    assert_eq!(global(&interp, "b"), Value::Number(1.0));
    assert_eq!(global(&interp, "c"), Value::Number(5.0));
}

#[test]
fn new_on_non_class_fails() {
    assert_eq!(run_err("def x 1\nnew x()").code(), ErrorCode::R005);
}

#[test]
fn member_of_non_object_fails() {
    assert_eq!(run_err("def x 1\nx.y").code(), ErrorCode::R005);
}

#[test]
fn missing_member_fails() {
    assert_eq!(run_err("def C class {} def c new C() c.nope").code(), ErrorCode::R001);
}

// ─── Public entry points ─────────────────────────────────────────────────────

#[test]
fn evaluate_runs_source() {
    assert_eq!(evaluate("def square λ(x) *(x x) square(4)").unwrap(), Value::Number(16.0));
}

#[test]
fn evaluate_reports_each_error_kind() {
    assert_eq!(evaluate("@").unwrap_err().kind(), ErrorKind::Lexical);
    assert_eq!(evaluate("def").unwrap_err().kind(), ErrorKind::Syntax);
    assert_eq!(evaluate("undefined-name").unwrap_err().kind(), ErrorKind::Runtime);
}

#[test]
fn interpreter_keeps_globals_between_runs() {
    let interp = Interpreter::with_config(Config::default().capture_output());
    interp.run(&parse("def mut total 1").unwrap()).unwrap();
    let result = interp.run(&parse("set total +(total 41)").unwrap()).unwrap();
    assert_eq!(result, Value::Number(42.0));
}

#[test]
fn error_aborts_remaining_expressions() {
    let interp = Interpreter::with_config(Config::default().capture_output());
    let program = parse("print(1) undefined-name print(2)").unwrap();
    assert!(interp.run(&program).is_err());
    assert_eq!(interp.take_output(), vec!["1"]);
}
