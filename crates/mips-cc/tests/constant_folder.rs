//! Additional `fold_constant` coverage beyond the inline unit tests in `globals.rs`, focused on the
//! parts of its contract that are easy to get subtly wrong: truncating division, unsigned
//! logical-shift-right, and rejection of non-constant subtrees.
//!
//! `fold_constant` itself is an implementation seam, not part of the public surface a real front end
//! would call, so this drives it the same way every real caller does: through a global initializer,
//! which §3.5/§4.4 require to be constant-foldable, and reads the emitted `.word` back out.
mod support;

use mips_cc::{compile_unit, BinaryOp, DeclarationList, DeclarationNode, Node, UnaryOp, Variable};
use support::{binary, unary};

fn fold(expr: Node) -> Result<i32, mips_cc::CompileError> {
    let decl = Node::Declaration(DeclarationList {
        ty: "int".to_owned(),
        head: DeclarationNode { var: Variable::normal("probe"), init: Some(Box::new(expr)), next: None },
    });
    let asm = compile_unit(&[decl])?;
    let line = asm.lines().find(|l| l.starts_with("probe:")).expect("global emitted");
    Ok(line.rsplit(' ').next().expect("`.word N`").parse().expect("emitted word is a plain decimal literal"))
}

#[test]
fn division_truncates_toward_zero() {
    let expr = binary(BinaryOp::Div, Node::IntegerConstant(-7), Node::IntegerConstant(2));
    assert_eq!(fold(expr).unwrap(), -3);
}

#[test]
fn shift_right_is_logical_not_arithmetic() {
    let expr = binary(BinaryOp::Shr, Node::IntegerConstant(-1), Node::IntegerConstant(28));
    // -1 as u32 is 0xFFFF_FFFF; logical >>28 leaves the low 4 bits set, i.e. 0xF = 15.
    assert_eq!(fold(expr).unwrap(), 15);
}

#[test]
fn bitwise_not_matches_twos_complement() {
    let expr = unary(UnaryOp::BitwiseNot, Node::IntegerConstant(0));
    assert_eq!(fold(expr).unwrap(), -1);
}

#[test]
fn conditional_picks_the_taken_branch_only() {
    let expr = Node::Conditional {
        cond: Box::new(Node::IntegerConstant(0)),
        then_expr: Box::new(Node::IntegerConstant(10)),
        else_expr: Box::new(Node::IntegerConstant(20)),
    };
    assert_eq!(fold(expr).unwrap(), 20);
}

#[test]
fn non_constant_subtree_is_rejected() {
    let expr = binary(BinaryOp::Add, Node::Variable(Variable::normal("x")), Node::IntegerConstant(1));
    assert!(fold(expr).is_err());
}

#[test]
fn division_by_zero_is_rejected_not_a_panic() {
    let expr = binary(BinaryOp::Div, Node::IntegerConstant(1), Node::IntegerConstant(0));
    assert!(fold(expr).is_err());
}
