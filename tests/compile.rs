mod common;

use indoc::indoc;
use pretty_assertions::assert_eq;

use tpyc::error::CompileError;
use tpyc::{CompileOptions, compile};

fn build(source: &str) -> String {
    compile(source, &CompileOptions::default()).unwrap()
}

fn build_err(source: &str) -> CompileError {
    compile(source, &CompileOptions::default()).unwrap_err()
}

/// Lines of the `main` method body, without its header and limits
fn main_body(asm: &str) -> Vec<&str> {
    asm.lines()
        .skip_while(|l| !l.starts_with(".method public static main"))
        .skip(3)
        .take_while(|l| *l != ".end method")
        .collect()
}

#[test]
fn function_call_full_output() {
    let asm = build(indoc! {"
        def f(a, b):
            return a + b
        print(f(2, 3))
    "});
    assert_eq!(
        asm,
        indoc! {"
            .class public Test
            .super java/lang/Object
            ; standard initializer
            .method public <init>()V
                aload_0
                invokenonvirtual java/lang/Object/<init>()V
                return
            .end method
            .method public static f(II)I
                .limit stack 32
                .limit locals 32
                iload_0
                iload_1
                iadd
                ireturn
            .end method
            .method public static main([Ljava/lang/String;)V
                .limit stack 32
                .limit locals 32
                getstatic java/lang/System/out Ljava/io/PrintStream;
                ldc 2
                ldc 3
                invokestatic Test/f(II)I
                invokevirtual java/io/PrintStream/println(I)V
                return
            .end method
        "}
    );
    assert_eq!(common::run(&asm), vec!["5"]);
}

#[test]
fn class_name_is_configurable() {
    let options = CompileOptions {
        class_name: "Hello".to_string(),
    };
    let asm = compile("def g():\n    return 1\nprint(g())\n", &options).unwrap();
    assert!(asm.starts_with(".class public Hello\n"));
    assert!(asm.contains("    invokestatic Hello/g()I\n"));
}

#[test]
fn elif_else_takes_only_matching_branch() {
    let asm = build(indoc! {r#"
        x = 0
        if x < 0:
            print("neg")
        elif x == 0:
            print("zero")
        else:
            print("pos")
    "#});
    assert_eq!(
        main_body(&asm),
        vec![
            "    ldc 0",
            "    istore_1",
            "    iload_1",
            "    ldc 0",
            "    if_icmpge elif1Label1",
            "    getstatic java/lang/System/out Ljava/io/PrintStream;",
            "    ldc \"neg\"",
            "    invokevirtual java/io/PrintStream/println(Ljava/lang/String;)V",
            "    goto endLabel1",
            "elif1Label1:",
            "    iload_1",
            "    ldc 0",
            "    if_icmpne elif2Label1",
            "    getstatic java/lang/System/out Ljava/io/PrintStream;",
            "    ldc \"zero\"",
            "    invokevirtual java/io/PrintStream/println(Ljava/lang/String;)V",
            "    goto endLabel1",
            "elif2Label1:",
            "    getstatic java/lang/System/out Ljava/io/PrintStream;",
            "    ldc \"pos\"",
            "    invokevirtual java/io/PrintStream/println(Ljava/lang/String;)V",
            "endLabel1:",
            "    return",
        ]
    );
    assert_eq!(common::run(&asm), vec!["zero"]);
}

#[test]
fn every_shape_runs_correctly() {
    let source = indoc! {r#"
        def sign(x):
            if x < 0:
                s = 0 - 1
            elif x == 0:
                s = 0
            else:
                s = 1
            return s
        def clamp(x):
            if x > 10:
                x = 10
            return x
        def pick(x):
            if x >= 5:
                x = 5
            else:
                x = x + 0
            return x
        def bucket(x):
            r = 0
            if x <= 1:
                r = 1
            elif x <= 2:
                r = 2
            elif x != 9:
                r = 3
            return r
        print(sign(0 - 4))
        print(sign(0))
        print(sign(7))
        print(clamp(42))
        print(clamp(3))
        print(pick(8))
        print(pick(2))
        print(bucket(1))
        print(bucket(2))
        print(bucket(5))
        print(bucket(9))
    "#};
    let asm = build(source);
    assert_eq!(
        common::run(&asm),
        vec!["-1", "0", "1", "10", "3", "5", "2", "1", "2", "3", "0"]
    );
}

#[test]
fn last_elif_without_else_jumps_to_end() {
    let asm = build(indoc! {r#"
        x = 3
        if x == 1:
            print("one")
        elif x == 2:
            print("two")
    "#});
    let body = main_body(&asm);
    assert!(body.contains(&"    if_icmpne elif1Label1"));
    assert!(body.contains(&"    if_icmpne endLabel1"));
    assert!(!asm.contains("elif2Label1"));
    assert_eq!(body.iter().filter(|l| **l == "endLabel1:").count(), 1);
    assert!(common::run(&asm).is_empty());
}

#[test]
fn break_leaves_after_one_iteration() {
    let asm = build(indoc! {r#"
        i = 0
        while i < 10:
            print(i)
            if i == 0:
                break
            i = i + 1
        print("done")
    "#});
    let body = main_body(&asm);
    let brk = body.iter().position(|l| *l == "    goto loop_end1").unwrap();
    assert_eq!(body[brk + 1], "endLabel1:");
    assert_eq!(common::run(&asm), vec!["0", "done"]);
}

#[test]
fn nested_loops_break_and_continue_innermost() {
    let asm = build(indoc! {"
        total = 0
        i = 0
        while i < 3:
            i = i + 1
            j = 0
            while j < 10:
                j = j + 1
                if j == 2:
                    continue
                if j > 3:
                    break
                total = total + 1
            if i == 2:
                continue
            total = total + 100
        print(total)
    "});
    // Inner loop counts j = 1 and 3 each time; the outer adds 100 except when i == 2
    assert_eq!(common::run(&asm), vec!["206"]);
    assert!(asm.contains("goto loop_start2"));
    assert!(asm.contains("goto loop_end2"));
}

#[test]
fn nested_ifs_get_their_own_labels() {
    let asm = build(indoc! {r#"
        def classify(a, b):
            if a < 10:
                if b < 10:
                    return 1
                else:
                    return 2
            elif a < 20:
                if b == 0:
                    return 3
                return 4
            else:
                return 5
            return 0
        print(classify(1, 1))
        print(classify(1, 50))
        print(classify(15, 0))
        print(classify(15, 1))
        print(classify(99, 0))
    "#});
    for label in ["endLabel1:", "endLabel2:", "endLabel3:", "elseLabel2:"] {
        assert_eq!(asm.lines().filter(|l| *l == label).count(), 1, "{}", label);
    }
    assert_eq!(common::run(&asm), vec!["1", "2", "3", "4", "5"]);
}

#[test]
fn recursion_and_wide_slots() {
    let asm = build(indoc! {"
        def fib(n):
            if n < 2:
                return n
            return fib(n - 1) + fib(n - 2)
        a = 1
        b = 2
        c = 3
        d = 4
        e = fib(10)
        print(e + a - b)
    "});
    assert!(asm.contains("    istore 5\n"));
    assert!(asm.contains("    iload 5\n"));
    assert_eq!(common::run(&asm), vec!["54"]);
}

#[test]
fn compiling_twice_is_identical() {
    let source = indoc! {r#"
        def f(x):
            while x > 0:
                x = x - 1
            return x
        y = f(3)
        if y == 0:
            print("ok")
    "#};
    assert_eq!(build(source), build(source));
}

#[test]
fn block_local_names_are_not_visible_afterwards() {
    let err = build_err(indoc! {"
        x = 1
        if x == 1:
            y = 2
        print(y)
    "});
    assert!(matches!(err, CompileError::UndeclaredVariable { name } if name == "y"));
}

#[test]
fn errors_abort_compilation() {
    assert!(matches!(
        build_err("print(z)\n"),
        CompileError::UndeclaredVariable { .. }
    ));
    assert!(matches!(
        build_err("x = 1\nif x =< 2:\n    x = 2\n"),
        CompileError::UnsupportedOperator { op } if op == "=<"
    ));
    assert!(matches!(build_err("break\n"), CompileError::BreakOutsideLoop));
    assert!(matches!(
        build_err("return 1\n"),
        CompileError::ReturnValueOutsideFunction
    ));
    assert!(matches!(
        build_err("print(f(1))\n"),
        CompileError::UndefinedFunction { .. }
    ));
    assert!(matches!(
        build_err("x = 1 *\n"),
        CompileError::Lex(_)
    ));
}

#[test]
fn branches_that_all_return_still_close_the_method() {
    let asm = build(indoc! {"
        def pick(x):
            if x >= 5:
                return 5
            else:
                return x
        print(pick(8))
    "});
    let pick: Vec<&str> = asm
        .lines()
        .skip_while(|l| !l.starts_with(".method public static pick"))
        .take_while(|l| *l != ".end method")
        .collect();
    // Without a trailing statement the end label is the last line of the method
    assert_eq!(pick.last(), Some(&"endLabel1:"));
}

#[test]
fn operand_stack_limit_is_respected() {
    let nested = |depth: usize| {
        format!(
            "x = {}1{}\nprint(x)\n",
            "1 + (".repeat(depth),
            ")".repeat(depth)
        )
    };
    let asm = build(&nested(31));
    assert_eq!(common::run(&asm), vec!["32"]);
    assert!(matches!(
        build_err(&nested(40)),
        CompileError::StackTooDeep { function, limit: 32 } if function == "main"
    ));
}

#[test]
fn wide_call_overflows_operand_stack() {
    let params: Vec<String> = (0..32).map(|i| format!("p{}", i)).collect();
    let ones = vec!["1"; 32].join(", ");
    let source = format!(
        "def f({}):\n    return p0\nprint(f({}))\n",
        params.join(", "),
        ones
    );
    // The stream reference plus 32 arguments
    assert!(matches!(
        build_err(&source),
        CompileError::StackTooDeep { function, .. } if function == "main"
    ));
}

#[test]
fn too_many_locals_is_rejected() {
    let source: String = (0..40).map(|i| format!("v{} = {}\n", i, i)).collect();
    assert!(matches!(
        build_err(&source),
        CompileError::TooManyLocals { function, .. } if function == "main"
    ));
}
