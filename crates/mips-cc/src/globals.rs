//! Whole-compilation state: the global-variable/enum/extern registries, the unique-label counter,
//! and the free functions (`count_declaration_bytes`, `extract_argument_names`, `fold_constant`)
//! that don't need any per-function context.

use indexmap::{IndexMap, IndexSet};

use crate::{
    ast::{AssignOp, BinaryOp, Node, UnaryOp},
    error::CompileError,
};

pub const NO_FUNC_ARGUMENT: &str = "?NO_FUNC_ARGUMENT";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GlobalCategory {
    Normal,
    Array,
    Pointer,
    Enum,
}

#[derive(Debug, Default)]
pub struct GlobalEnvironment {
    globals: IndexMap<String, GlobalCategory>,
    extern_functions: IndexSet<String>,
    defined_functions: IndexSet<String>,
    unique_counter: u32,
}

impl GlobalEnvironment {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `"_{base}_{n}"` with a monotonically increasing `n`; used for every
    /// compile-time-generated label so labels never collide within one translation unit.
    pub fn unique_id(&mut self, base: &str) -> String {
        let id = self.unique_counter;
        self.unique_counter += 1;
        format!("_{base}_{id}")
    }

    pub fn add_global(&mut self, id: impl Into<String>, category: GlobalCategory) -> Result<(), CompileError> {
        let id = id.into();
        if self.globals.contains_key(&id) {
            return Err(CompileError::unsupported("Declaration", format!("global `{id}` redeclared")));
        }
        self.globals.insert(id, category);
        Ok(())
    }

    pub fn contains_global(&self, id: &str) -> bool {
        self.globals.contains_key(id)
    }

    pub fn global_category(&self, id: &str) -> Option<GlobalCategory> {
        self.globals.get(id).copied()
    }

    pub fn global_ids(&self) -> impl Iterator<Item = &String> {
        self.globals.keys()
    }

    pub fn add_extern_function(&mut self, id: impl Into<String>) {
        self.extern_functions.insert(id.into());
    }

    /// Records `id` as having a definition in this translation unit. A prototype for an id that is
    /// also defined here does not make it extern (§3.5: externs "appear only as declarations, never
    /// as definitions"); checked independently of declaration/definition order within the root list.
    pub fn mark_defined_function(&mut self, id: impl Into<String>) {
        self.defined_functions.insert(id.into());
    }

    pub fn is_extern_function(&self, id: &str) -> bool {
        self.extern_functions.contains(id) && !self.defined_functions.contains(id)
    }
}

/// Recursively sums the stack storage required by every declaration reachable from `node`: `int`
/// and pointers cost one word, arrays cost `size` words. Walks into compound statements, loops, and
/// both branches of `if`/`else`.
pub fn count_declaration_bytes(node: &Node) -> Result<i32, CompileError> {
    match node {
        Node::Declaration(decl) => {
            let mut bytes = 0;
            let mut cur = Some(&decl.head);
            while let Some(decl_node) = cur {
                bytes += match decl_node.var.info {
                    crate::ast::VariableInfo::Normal | crate::ast::VariableInfo::Pointer => 4,
                    crate::ast::VariableInfo::Array => {
                        let size_expr = decl_node.var.index_or_size.as_deref().ok_or_else(|| {
                            CompileError::unsupported("Variable", format!("array `{}` missing a size", decl_node.var.id))
                        })?;
                        4 * fold_constant(size_expr)?
                    }
                };
                cur = decl_node.next.as_deref();
            }
            Ok(bytes)
        }
        Node::CompoundStatement(body) => body.as_ref().map_or(Ok(0), sum_statement_list),
        Node::If { then_body, else_body, .. } => {
            let mut bytes = count_declaration_bytes(then_body)?;
            if let Some(else_body) = else_body {
                bytes += count_declaration_bytes(else_body)?;
            }
            Ok(bytes)
        }
        Node::While { body, .. } | Node::For { body, .. } => count_declaration_bytes(body),
        Node::Switch { body, .. } => {
            let mut bytes = 0;
            for case in body.iter() {
                bytes += count_declaration_bytes(case)?;
            }
            Ok(bytes)
        }
        Node::Case { body, .. } | Node::Default { body } => body.as_ref().map_or(Ok(0), sum_statement_list),
        Node::FunctionDefinition { body, .. } => sum_statement_list(body),
        _ => Ok(0),
    }
}

pub(crate) fn sum_statement_list(list: &crate::ast::StatementList) -> Result<i32, CompileError> {
    let mut bytes = 0;
    for stmt in list.iter() {
        bytes += count_declaration_bytes(stmt)?;
    }
    Ok(bytes)
}

/// Returns the function's formal parameter names, padded to at least four entries with the
/// sentinel [`NO_FUNC_ARGUMENT`] (a string that cannot start a real C identifier).
pub fn extract_argument_names(args: &crate::ast::ArgumentList) -> Vec<String> {
    let mut names: Vec<String> = args.names().into_iter().map(|v| v.id.clone()).collect();
    while names.len() < 4 {
        names.push(NO_FUNC_ARGUMENT.to_string());
    }
    names
}

/// Evaluates a constant-foldable expression with 32-bit signed two's-complement semantics. Used for
/// global initializers, array sizes, and `case` labels.
pub fn fold_constant(node: &Node) -> Result<i32, CompileError> {
    match node {
        Node::IntegerConstant(v) => Ok(*v as i32),
        Node::Unary { op, operand } => {
            let value = fold_constant(operand)?;
            match op {
                UnaryOp::Minus => Ok(value.wrapping_neg()),
                UnaryOp::Plus => Ok(value),
                UnaryOp::BitwiseNot => Ok(!value),
                UnaryOp::LogicalNot => Ok(i32::from(value == 0)),
                UnaryOp::PreIncrement | UnaryOp::PreDecrement | UnaryOp::AddressOf => Err(
                    CompileError::unsupported("Unary", format!("`{op}` is not a constant expression")),
                ),
            }
        }
        Node::Binary { op, lhs, rhs } => {
            let l = fold_constant(lhs)?;
            let r = fold_constant(rhs)?;
            fold_binary(*op, l, r)
        }
        Node::Conditional { cond, then_expr, else_expr } => {
            if fold_constant(cond)? != 0 { fold_constant(then_expr) } else { fold_constant(else_expr) }
        }
        other => Err(CompileError::unsupported(other.kind(), "not a constant expression")),
    }
}

fn fold_binary(op: BinaryOp, l: i32, r: i32) -> Result<i32, CompileError> {
    match op {
        BinaryOp::Add => Ok(l.wrapping_add(r)),
        BinaryOp::Sub => Ok(l.wrapping_sub(r)),
        BinaryOp::Mul => Ok(l.wrapping_mul(r)),
        BinaryOp::Div => {
            if r == 0 {
                return Err(CompileError::unsupported("Binary", "division by zero in constant expression"));
            }
            Ok(l.wrapping_div(r))
        }
        BinaryOp::Mod => {
            if r == 0 {
                return Err(CompileError::unsupported("Binary", "modulo by zero in constant expression"));
            }
            Ok(l.wrapping_rem(r))
        }
        BinaryOp::Shl => Ok(l.wrapping_shl(r as u32)),
        BinaryOp::Shr => Ok(((l as u32).wrapping_shr(r as u32)) as i32),
        BinaryOp::Lt => Ok(i32::from(l < r)),
        BinaryOp::Gt => Ok(i32::from(l > r)),
        BinaryOp::Le => Ok(i32::from(l <= r)),
        BinaryOp::Ge => Ok(i32::from(l >= r)),
        BinaryOp::Eq => Ok(i32::from(l == r)),
        BinaryOp::Ne => Ok(i32::from(l != r)),
        BinaryOp::BitAnd => Ok(l & r),
        BinaryOp::BitXor => Ok(l ^ r),
        BinaryOp::BitOr => Ok(l | r),
        BinaryOp::LogicalAnd => Ok(i32::from(l != 0 && r != 0)),
        BinaryOp::LogicalOr => Ok(i32::from(l != 0 || r != 0)),
    }
}

/// Used at assignment-lowering time to map a compound-assignment operator onto the binary operator
/// that computes its new value (`x += y` folds through the same machinery as `x + y`).
pub fn assign_op_to_binary(op: AssignOp) -> Option<BinaryOp> {
    match op {
        AssignOp::Assign => None,
        AssignOp::MulAssign => Some(BinaryOp::Mul),
        AssignOp::DivAssign => Some(BinaryOp::Div),
        AssignOp::ModAssign => Some(BinaryOp::Mod),
        AssignOp::AddAssign => Some(BinaryOp::Add),
        AssignOp::SubAssign => Some(BinaryOp::Sub),
        AssignOp::ShlAssign => Some(BinaryOp::Shl),
        AssignOp::ShrAssign => Some(BinaryOp::Shr),
        AssignOp::AndAssign => Some(BinaryOp::BitAnd),
        AssignOp::XorAssign => Some(BinaryOp::BitXor),
        AssignOp::OrAssign => Some(BinaryOp::BitOr),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Variable;

    #[test]
    fn unique_id_never_repeats() {
        let mut env = GlobalEnvironment::new();
        let ids: Vec<_> = (0..50).map(|_| env.unique_id("L")).collect();
        let mut sorted = ids.clone();
        sorted.sort();
        sorted.dedup();
        assert_eq!(sorted.len(), ids.len());
    }

    #[test]
    fn redeclared_global_is_rejected() {
        let mut env = GlobalEnvironment::new();
        env.add_global("g", GlobalCategory::Normal).unwrap();
        assert!(env.add_global("g", GlobalCategory::Normal).is_err());
    }

    #[test]
    fn fold_constant_matches_two_complement_semantics() {
        let expr = Node::Binary {
            op: BinaryOp::Add,
            lhs: Box::new(Node::IntegerConstant(i64::from(i32::MAX))),
            rhs: Box::new(Node::IntegerConstant(1)),
        };
        assert_eq!(fold_constant(&expr).unwrap(), i32::MIN);
    }

    #[test]
    fn extract_argument_names_pads_sentinel() {
        let args = crate::ast::ArgumentList {
            head: Some(Box::new(Variable::normal("a"))),
            tail: None,
        };
        let names = extract_argument_names(&args);
        assert_eq!(names, vec!["a", NO_FUNC_ARGUMENT, NO_FUNC_ARGUMENT, NO_FUNC_ARGUMENT]);
    }
}
