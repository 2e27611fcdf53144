#![doc = include_str!("../../../README.md")]
#![expect(clippy::module_name_repetitions, reason = "Node/Op naming mirrors the grammar")]

mod ast;
mod codegen;
mod context;
mod error;
mod globals;
mod register;

pub use crate::{
    ast::{
        ArgumentList, AssignOp, BinaryOp, CaseList, DeclarationList, DeclarationNode, EnumDecl,
        EnumList, Node, ParametersList, PostfixOp, StatementList, UnaryOp, Variable, VariableInfo,
    },
    codegen::compile_unit,
    error::CompileError,
    globals::fold_constant,
    register::RegisterAllocator,
};
