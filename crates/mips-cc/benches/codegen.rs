// Use codspeed-criterion-compat when running on CodSpeed (CI), real criterion otherwise.
#[cfg(codspeed)]
use codspeed_criterion_compat::{black_box, criterion_group, criterion_main, Criterion};
#[cfg(not(codspeed))]
use criterion::{black_box, criterion_group, criterion_main, Criterion};

use mips_cc::{
    compile_unit, ArgumentList, AssignOp, BinaryOp, DeclarationList, DeclarationNode, Node,
    ParametersList, StatementList, UnaryOp, Variable,
};

fn int(value: i64) -> Node {
    Node::IntegerConstant(value)
}

fn var(id: &str) -> Node {
    Node::Variable(Variable::normal(id))
}

fn binary(op: BinaryOp, lhs: Node, rhs: Node) -> Node {
    Node::Binary { op, lhs: Box::new(lhs), rhs: Box::new(rhs) }
}

fn decl_int(id: &str, init: Node) -> Node {
    Node::Declaration(DeclarationList {
        ty: "int".to_owned(),
        head: DeclarationNode { var: Variable::normal(id), init: Some(Box::new(init)), next: None },
    })
}

fn ret(value: Node) -> Node {
    Node::Return(Some(Box::new(value)))
}

fn stmt_list(items: Vec<Node>) -> StatementList {
    let mut rev = items.into_iter().rev();
    let Some(last) = rev.next() else {
        return StatementList::empty();
    };
    let mut list = StatementList { head: Some(Box::new(last)), tail: None };
    for item in rev {
        list = StatementList { head: Some(Box::new(item)), tail: Some(Box::new(list)) };
    }
    list
}

fn arg_list(names: &[&str]) -> ArgumentList {
    let mut rev = names.iter().rev();
    let Some(&last) = rev.next() else {
        return ArgumentList { head: None, tail: None };
    };
    let mut list = ArgumentList { head: Some(Box::new(Variable::normal(last))), tail: None };
    for &name in rev {
        list = ArgumentList { head: Some(Box::new(Variable::normal(name))), tail: Some(Box::new(list)) };
    }
    list
}

fn func_def(name: &str, args: &[&str], body: Vec<Node>) -> Node {
    Node::FunctionDefinition {
        ty: "int".to_owned(),
        name: Variable::normal(name),
        args: arg_list(args),
        body: stmt_list(body),
    }
}

/// `int fact(int n){ if (n <= 1) return 1; return n * fact(n-1); } int main(){ return fact(10); }`
///
/// Exercises the recursive-call path (spill/reload around `jal`) and the `<=`/`*` lowerings.
fn factorial_unit() -> Vec<Node> {
    let params = ParametersList { head: Some(Box::new(binary(BinaryOp::Sub, var("n"), int(1)))), tail: None };
    vec![
        func_def(
            "fact",
            &["n"],
            vec![
                Node::If {
                    cond: Box::new(binary(BinaryOp::Le, var("n"), int(1))),
                    then_body: Box::new(ret(int(1))),
                    else_body: None,
                },
                ret(binary(BinaryOp::Mul, var("n"), Node::FunctionCall { callee_id: "fact".to_owned(), args: params })),
            ],
        ),
        func_def("main", &[], vec![ret(Node::FunctionCall { callee_id: "fact".to_owned(), args: ParametersList { head: Some(Box::new(int(10))), tail: None } })]),
    ]
}

/// `int main(){ int s = 0; for (int i = 0; i < 1000; i++) s += i; return s; }`
///
/// A tight accumulation loop: mostly lowering pressure on the register allocator and the branch
/// shapes of `for`, not on call spilling.
fn loop_unit() -> Vec<Node> {
    let init = decl_int("i", int(0));
    let cond = binary(BinaryOp::Lt, var("i"), int(1000));
    let increment = Node::Postfix { op: mips_cc::PostfixOp::PostIncrement, operand: Box::new(var("i")) };
    let body = Node::Assignment { target: Variable::normal("s"), op: AssignOp::AddAssign, rhs: Box::new(var("i")) };
    vec![func_def(
        "main",
        &[],
        vec![
            decl_int("s", int(0)),
            Node::For { init: Box::new(init), cond: Box::new(cond), increment: Some(Box::new(increment)), body: Box::new(body) },
            ret(var("s")),
        ],
    )]
}

/// A right-nested additive expression deep enough to sit near the 8-temporary ceiling, stressing
/// the register allocator's request/release balance rather than control flow.
fn deep_expression_unit() -> Vec<Node> {
    let mut expr = var("a");
    for _ in 0..7 {
        expr = binary(BinaryOp::Add, var("a"), expr);
    }
    expr = Node::Unary { op: UnaryOp::Minus, operand: Box::new(expr) };
    vec![func_def("main", &[], vec![decl_int("a", int(1)), ret(expr)])]
}

fn criterion_benchmark(c: &mut Criterion) {
    let factorial = factorial_unit();
    c.bench_function("compile_unit__recursive_factorial", |b| {
        b.iter(|| black_box(compile_unit(black_box(&factorial)).unwrap()));
    });

    let looped = loop_unit();
    c.bench_function("compile_unit__for_loop_accumulator", |b| {
        b.iter(|| black_box(compile_unit(black_box(&looped)).unwrap()));
    });

    let deep = deep_expression_unit();
    c.bench_function("compile_unit__near_ceiling_register_pressure", |b| {
        b.iter(|| black_box(compile_unit(black_box(&deep)).unwrap()));
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
