//! Small AST-construction helpers shared by the integration tests in this directory.
//!
//! The AST in `mips_cc::ast` is a forest of cons-cells and boxed nodes with no builder API of its
//! own (that's the code generator's input contract, not something a real front end would want
//! pre-built); these helpers exist only so the tests below can write C-shaped snippets without
//! hand-nesting `Box::new` everywhere.
#![allow(dead_code)]

use mips_cc::{
    ArgumentList, AssignOp, BinaryOp, CaseList, DeclarationList, DeclarationNode, Node,
    ParametersList, PostfixOp, StatementList, UnaryOp, Variable, VariableInfo,
};

pub fn int(value: i64) -> Node {
    Node::IntegerConstant(value)
}

pub fn var(id: &str) -> Node {
    Node::Variable(Variable::normal(id))
}

pub fn array_use(id: &str, index: Node) -> Node {
    Node::Variable(Variable { id: id.to_owned(), info: VariableInfo::Array, index_or_size: Some(Box::new(index)) })
}

pub fn binary(op: BinaryOp, lhs: Node, rhs: Node) -> Node {
    Node::Binary { op, lhs: Box::new(lhs), rhs: Box::new(rhs) }
}

pub fn unary(op: UnaryOp, operand: Node) -> Node {
    Node::Unary { op, operand: Box::new(operand) }
}

pub fn postfix(op: PostfixOp, operand: Node) -> Node {
    Node::Postfix { op, operand: Box::new(operand) }
}

pub fn assign(id: &str, op: AssignOp, rhs: Node) -> Node {
    Node::Assignment { target: Variable::normal(id), op, rhs: Box::new(rhs) }
}

pub fn ret(value: Option<Node>) -> Node {
    Node::Return(value.map(Box::new))
}

pub fn if_stmt(cond: Node, then_body: Node, else_body: Option<Node>) -> Node {
    Node::If { cond: Box::new(cond), then_body: Box::new(then_body), else_body: else_body.map(Box::new) }
}

pub fn while_stmt(cond: Node, body: Node) -> Node {
    Node::While { cond: Box::new(cond), body: Box::new(body) }
}

pub fn for_stmt(init: Node, cond: Node, increment: Option<Node>, body: Node) -> Node {
    Node::For { init: Box::new(init), cond: Box::new(cond), increment: increment.map(Box::new), body: Box::new(body) }
}

pub fn switch_stmt(test: Node, cases: Vec<Node>) -> Node {
    Node::Switch { test: Box::new(test), body: case_list(cases) }
}

pub fn case(label: Node, body: Vec<Node>) -> Node {
    Node::Case { label_expr: Box::new(label), body: Some(stmt_list(body)) }
}

pub fn default_case(body: Vec<Node>) -> Node {
    Node::Default { body: Some(stmt_list(body)) }
}

pub fn call(callee_id: &str, args: Vec<Node>) -> Node {
    Node::FunctionCall { callee_id: callee_id.to_owned(), args: param_list(args) }
}

pub fn compound(body: Vec<Node>) -> Node {
    Node::CompoundStatement(Some(stmt_list(body)))
}

pub fn decl_int(id: &str, init: Option<Node>) -> Node {
    single_declaration(Variable::normal(id), init)
}

pub fn decl_pointer(id: &str, init: Option<Node>) -> Node {
    let var = Variable { id: id.to_owned(), info: VariableInfo::Pointer, index_or_size: None };
    single_declaration(var, init)
}

pub fn decl_array(id: &str, size: i64) -> Node {
    let var = Variable {
        id: id.to_owned(),
        info: VariableInfo::Array,
        index_or_size: Some(Box::new(Node::IntegerConstant(size))),
    };
    single_declaration(var, None)
}

fn single_declaration(var: Variable, init: Option<Node>) -> Node {
    Node::Declaration(DeclarationList {
        ty: "int".to_owned(),
        head: DeclarationNode { var, init: init.map(Box::new), next: None },
    })
}

pub fn global_int(id: &str, init: Option<i64>) -> Node {
    decl_int(id, init.map(Node::IntegerConstant))
}

pub fn func_def(name: &str, args: Vec<&str>, body: Vec<Node>) -> Node {
    Node::FunctionDefinition {
        ty: "int".to_owned(),
        name: Variable::normal(name),
        args: arg_list(args),
        body: stmt_list(body),
    }
}

pub fn func_decl(name: &str, args: Vec<&str>) -> Node {
    Node::FunctionDeclaration { ty: "int".to_owned(), name: Variable::normal(name), args: arg_list(args) }
}

pub fn stmt_list(items: Vec<Node>) -> StatementList {
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

fn case_list(items: Vec<Node>) -> CaseList {
    let mut rev = items.into_iter().rev();
    let Some(last) = rev.next() else {
        return CaseList { head: None, tail: None };
    };
    let mut list = CaseList { head: Some(Box::new(last)), tail: None };
    for item in rev {
        list = CaseList { head: Some(Box::new(item)), tail: Some(Box::new(list)) };
    }
    list
}

fn param_list(items: Vec<Node>) -> ParametersList {
    let mut rev = items.into_iter().rev();
    let Some(last) = rev.next() else {
        return ParametersList { head: None, tail: None };
    };
    let mut list = ParametersList { head: Some(Box::new(last)), tail: None };
    for item in rev {
        list = ParametersList { head: Some(Box::new(item)), tail: Some(Box::new(list)) };
    }
    list
}

fn arg_list(names: Vec<&str>) -> ArgumentList {
    let mut rev = names.into_iter().rev();
    let Some(last) = rev.next() else {
        return ArgumentList { head: None, tail: None };
    };
    let mut list = ArgumentList { head: Some(Box::new(Variable::normal(last))), tail: None };
    for name in rev {
        list = ArgumentList { head: Some(Box::new(Variable::normal(name))), tail: Some(Box::new(list)) };
    }
    list
}
