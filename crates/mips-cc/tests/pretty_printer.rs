//! Golden-file-style determinism checks for `Node::pretty_print`.
//!
//! The printer has no test-visible contract beyond "identical trees print identically" (§8); these
//! tests also pin a couple of representative renderings so a future change to the indentation
//! scheme is a visible diff, not a silent behavior change.
mod support;

use mips_cc::{AssignOp, BinaryOp};
use support::{assign, binary, decl_int, func_def, if_stmt, int, ret, var};

#[test]
fn identical_trees_print_identically() {
    let tree = func_def(
        "fact",
        vec!["n"],
        vec![
            if_stmt(binary(BinaryOp::Le, var("n"), int(1)), ret(Some(int(1))), None),
            ret(Some(binary(BinaryOp::Mul, var("n"), int(0)))),
        ],
    );

    let first = tree.pretty_print();
    let second = tree.pretty_print();
    assert_eq!(first, second);
}

#[test]
fn pretty_print_labels_every_node_kind_it_touches() {
    let tree = func_def("main", vec![], vec![decl_int("a", Some(int(5))), ret(Some(var("a")))]);
    let printed = tree.pretty_print();

    assert!(printed.starts_with("FunctionDefinition [ int main\n"));
    assert!(printed.contains("Declaration [ int\n"));
    assert!(printed.contains("a (Normal)\n"));
    assert!(printed.contains("IntegerConstant [ 5 ]\n"));
    assert!(printed.contains("Return [\n"));
    assert!(printed.contains("Variable [ a (Normal) ]\n"));
}

#[test]
fn nested_scopes_increase_indentation_monotonically() {
    let tree = if_stmt(int(1), if_stmt(int(2), ret(Some(int(3))), None), None);
    let printed = tree.pretty_print();
    let lines: Vec<&str> = printed.lines().filter(|l| l.trim_start().starts_with("If [")).collect();

    assert_eq!(lines.len(), 2);
    let outer_indent = lines[0].len() - lines[0].trim_start().len();
    let inner_indent = lines[1].len() - lines[1].trim_start().len();
    assert!(inner_indent > outer_indent);
}

#[test]
fn assignment_target_and_op_are_rendered() {
    let tree = assign("x", AssignOp::AddAssign, int(1));
    let printed = tree.pretty_print();
    assert!(printed.contains("Assignment [ \"x\" AddAssign"));
}
