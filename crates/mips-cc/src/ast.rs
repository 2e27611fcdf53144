//! The abstract syntax tree handed to this crate by an external C front end.
//!
//! `Node` is a closed sum of every syntactic form the code generator understands. It derives
//! `serde::Serialize`/`Deserialize` because the CLI's wire format for a translation unit is a JSON
//! array of root `Node`s (see the crate-level CLI contract).

use serde::{Deserialize, Serialize};

/// How a [`Variable`] is stored: a plain scalar, a fixed-size array, or a pointer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "arbitrary", derive(arbitrary::Arbitrary))]
pub enum VariableInfo {
    Normal,
    Array,
    Pointer,
}

/// A reference to a declared C identifier.
///
/// `index_or_size` holds the subscript expression on use (`a[i]`) or the declared size expression
/// on declaration (`int a[N]`) when `info` is [`VariableInfo::Array`]; it is `None` otherwise.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "arbitrary", derive(arbitrary::Arbitrary))]
pub struct Variable {
    pub id: String,
    pub info: VariableInfo,
    pub index_or_size: Option<Box<Node>>,
}

impl Variable {
    pub fn normal(id: impl Into<String>) -> Self {
        Self { id: id.into(), info: VariableInfo::Normal, index_or_size: None }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[cfg_attr(feature = "arbitrary", derive(arbitrary::Arbitrary))]
#[strum(serialize_all = "lowercase")]
pub enum UnaryOp {
    PreIncrement,
    PreDecrement,
    Minus,
    Plus,
    BitwiseNot,
    LogicalNot,
    AddressOf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[cfg_attr(feature = "arbitrary", derive(arbitrary::Arbitrary))]
#[strum(serialize_all = "lowercase")]
pub enum PostfixOp {
    PostIncrement,
    PostDecrement,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "arbitrary", derive(arbitrary::Arbitrary))]
pub enum BinaryOp {
    Mul,
    Div,
    Mod,
    Add,
    Sub,
    Shl,
    Shr,
    Lt,
    Gt,
    Le,
    Ge,
    Eq,
    Ne,
    BitAnd,
    BitXor,
    BitOr,
    LogicalAnd,
    LogicalOr,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "arbitrary", derive(arbitrary::Arbitrary))]
pub enum AssignOp {
    Assign,
    MulAssign,
    DivAssign,
    ModAssign,
    AddAssign,
    SubAssign,
    ShlAssign,
    ShrAssign,
    AndAssign,
    XorAssign,
    OrAssign,
}

/// A cons-cell list of statements. An empty list is a single node with `head = None`; a singleton
/// has `tail = None`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "arbitrary", derive(arbitrary::Arbitrary))]
pub struct StatementList {
    pub head: Option<Box<Node>>,
    pub tail: Option<Box<StatementList>>,
}

impl StatementList {
    pub fn empty() -> Self {
        Self { head: None, tail: None }
    }

    /// Iterates the list's statement nodes in source order, skipping the empty-list sentinel.
    pub fn iter(&self) -> impl Iterator<Item = &Node> {
        let mut cur = Some(self);
        std::iter::from_fn(move || {
            let node = cur?;
            let next = node.tail.as_deref();
            let head = node.head.as_deref();
            cur = next;
            head
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "arbitrary", derive(arbitrary::Arbitrary))]
pub struct CaseList {
    pub head: Option<Box<Node>>,
    pub tail: Option<Box<CaseList>>,
}

impl CaseList {
    pub fn iter(&self) -> impl Iterator<Item = &Node> {
        let mut cur = Some(self);
        std::iter::from_fn(move || {
            let node = cur?;
            let next = node.tail.as_deref();
            let head = node.head.as_deref();
            cur = next;
            head
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "arbitrary", derive(arbitrary::Arbitrary))]
pub struct ArgumentList {
    pub head: Option<Box<Variable>>,
    pub tail: Option<Box<ArgumentList>>,
}

impl ArgumentList {
    pub fn names(&self) -> Vec<&Variable> {
        let mut out = Vec::new();
        let mut cur = Some(self);
        while let Some(node) = cur {
            if let Some(head) = &node.head {
                out.push(head.as_ref());
            }
            cur = node.tail.as_deref();
        }
        out
    }
}

/// Actual parameters at a call site.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "arbitrary", derive(arbitrary::Arbitrary))]
pub struct ParametersList {
    pub head: Option<Box<Node>>,
    pub tail: Option<Box<ParametersList>>,
}

impl ParametersList {
    pub fn iter(&self) -> impl Iterator<Item = &Node> {
        let mut cur = Some(self);
        std::iter::from_fn(move || {
            let node = cur?;
            let next = node.tail.as_deref();
            let head = node.head.as_deref();
            cur = next;
            head
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "arbitrary", derive(arbitrary::Arbitrary))]
pub struct DeclarationNode {
    pub var: Variable,
    pub init: Option<Box<Node>>,
    pub next: Option<Box<DeclarationNode>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "arbitrary", derive(arbitrary::Arbitrary))]
pub struct DeclarationList {
    /// Always `"int"` in this C subset; kept as a string so the model mirrors the source grammar.
    pub ty: String,
    pub head: DeclarationNode,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "arbitrary", derive(arbitrary::Arbitrary))]
pub struct EnumDecl {
    pub id: String,
    pub init: Option<Box<Node>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "arbitrary", derive(arbitrary::Arbitrary))]
pub struct EnumList {
    pub head: EnumDecl,
    pub tail: Option<Box<EnumList>>,
}

impl EnumList {
    pub fn iter(&self) -> impl Iterator<Item = &EnumDecl> {
        let mut cur = Some(self);
        std::iter::from_fn(move || {
            let node = cur?;
            let head = &node.head;
            cur = node.tail.as_deref();
            Some(head)
        })
    }
}

/// Every syntactic form the code generator dispatches on.
///
/// This is a closed, exhaustively-matched enum rather than a trait-object visitor: the node set is
/// fixed by the C subset this crate targets and never grows at runtime.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "arbitrary", derive(arbitrary::Arbitrary))]
pub enum Node {
    IntegerConstant(i64),
    Variable(Variable),
    Unary { op: UnaryOp, operand: Box<Node> },
    Postfix { op: PostfixOp, operand: Box<Node> },
    Binary { op: BinaryOp, lhs: Box<Node>, rhs: Box<Node> },
    Conditional { cond: Box<Node>, then_expr: Box<Node>, else_expr: Box<Node> },
    Assignment { target: Variable, op: AssignOp, rhs: Box<Node> },
    FunctionCall { callee_id: String, args: ParametersList },
    EmptyExpression,

    Return(Option<Box<Node>>),
    Break,
    Continue,
    If { cond: Box<Node>, then_body: Box<Node>, else_body: Option<Box<Node>> },
    While { cond: Box<Node>, body: Box<Node> },
    For { init: Box<Node>, cond: Box<Node>, increment: Option<Box<Node>>, body: Box<Node> },
    Switch { test: Box<Node>, body: CaseList },
    Case { label_expr: Box<Node>, body: Option<StatementList> },
    Default { body: Option<StatementList> },
    CompoundStatement(Option<StatementList>),
    Declaration(DeclarationList),
    Enum(EnumList),
    FunctionDeclaration { ty: String, name: Variable, args: ArgumentList },
    FunctionDefinition { ty: String, name: Variable, args: ArgumentList, body: StatementList },
}

impl Node {
    /// Returns a stable, human-readable tag used in diagnostics and internal dispatch errors. Not
    /// the same thing as a Rust `Debug` dump: kept short and independent of field layout.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::IntegerConstant(_) => "IntegerConstant",
            Self::Variable(_) => "Variable",
            Self::Unary { .. } => "Unary",
            Self::Postfix { .. } => "Postfix",
            Self::Binary { .. } => "Binary",
            Self::Conditional { .. } => "Conditional",
            Self::Assignment { .. } => "Assignment",
            Self::FunctionCall { .. } => "FunctionCall",
            Self::EmptyExpression => "EmptyExpression",
            Self::Return(_) => "Return",
            Self::Break => "Break",
            Self::Continue => "Continue",
            Self::If { .. } => "If",
            Self::While { .. } => "While",
            Self::For { .. } => "For",
            Self::Switch { .. } => "Switch",
            Self::Case { .. } => "Case",
            Self::Default { .. } => "Default",
            Self::CompoundStatement(_) => "CompoundStatement",
            Self::Declaration(_) => "Declaration",
            Self::Enum(_) => "Enum",
            Self::FunctionDeclaration { .. } => "FunctionDeclaration",
            Self::FunctionDefinition { .. } => "FunctionDefinition",
        }
    }

    /// Renders the node as an indented, labelled block: `Kind [ ...children... ]`, one child per
    /// line. Deterministic: identical trees always print identically.
    pub fn pretty_print(&self) -> String {
        let mut out = String::new();
        self.print_indented(&mut out, "");
        out
    }

    fn print_indented(&self, out: &mut String, indent: &str) {
        let child_indent = format!("{indent}  ");
        match self {
            Self::IntegerConstant(v) => {
                out.push_str(&format!("{indent}IntegerConstant [ {v} ]\n"));
            }
            Self::Variable(var) => {
                out.push_str(&format!("{indent}Variable [ {} ({:?}) ]\n", var.id, var.info));
            }
            Self::Unary { op, operand } => {
                out.push_str(&format!("{indent}Unary [ {op:?}\n"));
                operand.print_indented(out, &child_indent);
                out.push_str(&format!("{indent}]\n"));
            }
            Self::Postfix { op, operand } => {
                out.push_str(&format!("{indent}Postfix [ {op:?}\n"));
                operand.print_indented(out, &child_indent);
                out.push_str(&format!("{indent}]\n"));
            }
            Self::Binary { op, lhs, rhs } => {
                out.push_str(&format!("{indent}Binary [ {op:?}\n"));
                lhs.print_indented(out, &child_indent);
                rhs.print_indented(out, &child_indent);
                out.push_str(&format!("{indent}]\n"));
            }
            Self::Conditional { cond, then_expr, else_expr } => {
                out.push_str(&format!("{indent}Conditional [\n"));
                cond.print_indented(out, &child_indent);
                then_expr.print_indented(out, &child_indent);
                else_expr.print_indented(out, &child_indent);
                out.push_str(&format!("{indent}]\n"));
            }
            Self::Assignment { target, op, rhs } => {
                out.push_str(&format!("{indent}Assignment [ {:?} {op:?}\n", target.id));
                rhs.print_indented(out, &child_indent);
                out.push_str(&format!("{indent}]\n"));
            }
            Self::FunctionCall { callee_id, args } => {
                out.push_str(&format!("{indent}FunctionCall [ {callee_id}\n"));
                for arg in args.iter() {
                    arg.print_indented(out, &child_indent);
                }
                out.push_str(&format!("{indent}]\n"));
            }
            Self::EmptyExpression => out.push_str(&format!("{indent}EmptyExpression [ ]\n")),
            Self::Return(value) => {
                out.push_str(&format!("{indent}Return [\n"));
                if let Some(value) = value {
                    value.print_indented(out, &child_indent);
                }
                out.push_str(&format!("{indent}]\n"));
            }
            Self::Break => out.push_str(&format!("{indent}Break [ ]\n")),
            Self::Continue => out.push_str(&format!("{indent}Continue [ ]\n")),
            Self::If { cond, then_body, else_body } => {
                out.push_str(&format!("{indent}If [\n"));
                cond.print_indented(out, &child_indent);
                then_body.print_indented(out, &child_indent);
                if let Some(else_body) = else_body {
                    else_body.print_indented(out, &child_indent);
                }
                out.push_str(&format!("{indent}]\n"));
            }
            Self::While { cond, body } => {
                out.push_str(&format!("{indent}While [\n"));
                cond.print_indented(out, &child_indent);
                body.print_indented(out, &child_indent);
                out.push_str(&format!("{indent}]\n"));
            }
            Self::For { init, cond, increment, body } => {
                out.push_str(&format!("{indent}For [\n"));
                init.print_indented(out, &child_indent);
                cond.print_indented(out, &child_indent);
                if let Some(increment) = increment {
                    increment.print_indented(out, &child_indent);
                }
                body.print_indented(out, &child_indent);
                out.push_str(&format!("{indent}]\n"));
            }
            Self::Switch { test, body } => {
                out.push_str(&format!("{indent}Switch [\n"));
                test.print_indented(out, &child_indent);
                for case in body.iter() {
                    case.print_indented(out, &child_indent);
                }
                out.push_str(&format!("{indent}]\n"));
            }
            Self::Case { label_expr, body } => {
                out.push_str(&format!("{indent}Case [\n"));
                label_expr.print_indented(out, &child_indent);
                if let Some(body) = body {
                    for stmt in body.iter() {
                        stmt.print_indented(out, &child_indent);
                    }
                }
                out.push_str(&format!("{indent}]\n"));
            }
            Self::Default { body } => {
                out.push_str(&format!("{indent}Default [\n"));
                if let Some(body) = body {
                    for stmt in body.iter() {
                        stmt.print_indented(out, &child_indent);
                    }
                }
                out.push_str(&format!("{indent}]\n"));
            }
            Self::CompoundStatement(body) => {
                out.push_str(&format!("{indent}CompoundStatement [\n"));
                if let Some(body) = body {
                    for stmt in body.iter() {
                        stmt.print_indented(out, &child_indent);
                    }
                }
                out.push_str(&format!("{indent}]\n"));
            }
            Self::Declaration(decl) => {
                out.push_str(&format!("{indent}Declaration [ {}\n", decl.ty));
                let mut cur = Some(&decl.head);
                while let Some(node) = cur {
                    out.push_str(&format!("{child_indent}{} ({:?})\n", node.var.id, node.var.info));
                    if let Some(init) = &node.init {
                        init.print_indented(out, &format!("{child_indent}  "));
                    }
                    cur = node.next.as_deref();
                }
                out.push_str(&format!("{indent}]\n"));
            }
            Self::Enum(list) => {
                out.push_str(&format!("{indent}Enum [\n"));
                for decl in list.iter() {
                    out.push_str(&format!("{child_indent}{}\n", decl.id));
                }
                out.push_str(&format!("{indent}]\n"));
            }
            Self::FunctionDeclaration { ty, name, .. } => {
                out.push_str(&format!("{indent}FunctionDeclaration [ {ty} {} ]\n", name.id));
            }
            Self::FunctionDefinition { ty, name, args, body } => {
                out.push_str(&format!("{indent}FunctionDefinition [ {ty} {}\n", name.id));
                for arg in args.names() {
                    out.push_str(&format!("{child_indent}arg {}\n", arg.id));
                }
                for stmt in body.iter() {
                    stmt.print_indented(out, &child_indent);
                }
                out.push_str(&format!("{indent}]\n"));
            }
        }
    }
}
