//! Root-level two-pass emission: a `.data` pass that populates the global environment, followed by
//! a `.text` pass that lowers every function definition.

use super::CodeGenerator;
use crate::{
    ast::{Node, VariableInfo},
    error::CompileError,
    globals::{fold_constant, GlobalCategory},
};

impl CodeGenerator {
    pub(super) fn lower_data_root(&mut self, node: &Node) -> Result<(), CompileError> {
        match node {
            Node::Declaration(decl) => {
                let mut cur = Some(&decl.head);
                while let Some(decl_node) = cur {
                    match decl_node.var.info {
                        VariableInfo::Array => {
                            let size_expr = decl_node.var.index_or_size.as_deref().ok_or_else(|| {
                                CompileError::unsupported("Variable", format!("array `{}` missing a size", decl_node.var.id))
                            })?;
                            let size = fold_constant(size_expr)?;
                            self.emit(format!("{}: .space {}", decl_node.var.id, 4 * size));
                            self.globals.add_global(&decl_node.var.id, GlobalCategory::Array)?;
                        }
                        VariableInfo::Normal | VariableInfo::Pointer => {
                            let value = decl_node.init.as_deref().map(fold_constant).transpose()?.unwrap_or(0);
                            self.emit(format!("{}: .word {value}", decl_node.var.id));
                            let category =
                                if decl_node.var.info == VariableInfo::Pointer { GlobalCategory::Pointer } else { GlobalCategory::Normal };
                            self.globals.add_global(&decl_node.var.id, category)?;
                        }
                    }
                    cur = decl_node.next.as_deref();
                }
                Ok(())
            }
            Node::Enum(list) => {
                let mut next_value = 0i32;
                for decl in list.iter() {
                    if let Some(init) = &decl.init {
                        next_value = fold_constant(init)?;
                    }
                    self.emit(format!("{}: .word {next_value}", decl.id));
                    self.globals.add_global(&decl.id, GlobalCategory::Enum)?;
                    next_value = next_value.wrapping_add(1);
                }
                Ok(())
            }
            Node::FunctionDeclaration { name, .. } => {
                self.globals.add_extern_function(&name.id);
                Ok(())
            }
            Node::FunctionDefinition { name, .. } => {
                self.globals.mark_defined_function(&name.id);
                Ok(())
            }
            other => Err(CompileError::unsupported(other.kind(), "not allowed at file scope")),
        }
    }

    pub(super) fn lower_text_root(&mut self, node: &Node) -> Result<(), CompileError> {
        match node {
            Node::FunctionDefinition { name, args, body, .. } => self.lower_function_definition(name, args, body),
            Node::Declaration(_) | Node::Enum(_) | Node::FunctionDeclaration { .. } => Ok(()),
            other => Err(CompileError::unsupported(other.kind(), "not allowed at file scope")),
        }
    }
}
