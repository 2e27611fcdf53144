//! Statement lowering: declarations, control flow, and the bare-expression-as-statement case.

use super::CodeGenerator;
use crate::{
    ast::{DeclarationList, Node, StatementList, VariableInfo},
    context::FunctionContext,
    error::CompileError,
    globals::fold_constant,
};

fn is_expression(node: &Node) -> bool {
    matches!(
        node,
        Node::IntegerConstant(_)
            | Node::Variable(_)
            | Node::Unary { .. }
            | Node::Postfix { .. }
            | Node::Binary { .. }
            | Node::Conditional { .. }
            | Node::Assignment { .. }
            | Node::FunctionCall { .. }
    )
}

impl CodeGenerator {
    pub(super) fn lower_statement(&mut self, ctx: &mut FunctionContext, node: &Node) -> Result<(), CompileError> {
        match node {
            Node::Declaration(decl) => self.lower_declaration(ctx, decl),
            Node::Return(value) => self.lower_return(ctx, value.as_deref()),
            Node::Break => {
                let label = ctx.break_label()?.to_string();
                self.emit(format!("b {label}"));
                self.emit("nop");
                Ok(())
            }
            Node::Continue => {
                let label = ctx.continue_label()?.to_string();
                self.emit(format!("b {label}"));
                self.emit("nop");
                Ok(())
            }
            Node::If { cond, then_body, else_body } => self.lower_if(ctx, cond, then_body, else_body.as_deref()),
            Node::While { cond, body } => self.lower_while(ctx, cond, body),
            Node::For { init, cond, increment, body } => self.lower_for(ctx, init, cond, increment.as_deref(), body),
            Node::Switch { test, body } => self.lower_switch(ctx, test, body),
            Node::CompoundStatement(body) => self.lower_compound(ctx, body.as_ref()),
            Node::EmptyExpression => Ok(()),
            other if is_expression(other) => {
                let tmp = self.regs.request_free()?;
                self.lower_expr(ctx, other, &tmp)?;
                self.regs.release(&tmp)?;
                Ok(())
            }
            other => Err(CompileError::internal(format!("{} cannot appear as a statement", other.kind()))),
        }
    }

    fn lower_declaration(&mut self, ctx: &mut FunctionContext, decl: &DeclarationList) -> Result<(), CompileError> {
        let mut cur = Some(&decl.head);
        while let Some(decl_node) = cur {
            match decl_node.var.info {
                VariableInfo::Array => {
                    let size_expr = decl_node.var.index_or_size.as_deref().ok_or_else(|| {
                        CompileError::unsupported("Variable", format!("array `{}` missing a size", decl_node.var.id))
                    })?;
                    let size = fold_constant(size_expr)?;
                    ctx.reserve_array(&decl_node.var.id, size)?;
                    if decl_node.init.is_some() {
                        return Err(CompileError::unsupported("Declaration", "array initializers are not supported"));
                    }
                }
                VariableInfo::Normal | VariableInfo::Pointer => {
                    let tmp = self.regs.request_free()?;
                    if let Some(init) = &decl_node.init {
                        self.lower_expr(ctx, init, &tmp)?;
                    } else {
                        self.emit(format!("move {tmp}, $0"));
                    }
                    self.store_variable(ctx, &decl_node.var, &tmp, true)?;
                    self.regs.release(&tmp)?;
                }
            }
            cur = decl_node.next.as_deref();
        }
        Ok(())
    }

    fn lower_return(&mut self, ctx: &mut FunctionContext, value: Option<&Node>) -> Result<(), CompileError> {
        if let Some(value) = value {
            let tmp = self.regs.request_free()?;
            self.lower_expr(ctx, value, &tmp)?;
            self.emit(format!("move $v0, {tmp}"));
            self.regs.release(&tmp)?;
        }
        let epilogue = ctx.epilogue_label.clone();
        self.emit(format!("b {epilogue}"));
        self.emit("nop");
        Ok(())
    }

    fn lower_if(
        &mut self,
        ctx: &mut FunctionContext,
        cond: &Node,
        then_body: &Node,
        else_body: Option<&Node>,
    ) -> Result<(), CompileError> {
        let tmp = self.regs.request_free()?;
        self.lower_expr(ctx, cond, &tmp)?;
        let top_else = self.globals.unique_id("top_else");
        let end_if = self.globals.unique_id("end_if");
        self.emit(format!("beq {tmp}, $0, {top_else}"));
        self.emit("nop");
        self.regs.release(&tmp)?;

        let then_scope = self.globals.unique_id("if_then");
        ctx.enter_scope(then_scope);
        self.lower_statement(ctx, then_body)?;
        ctx.exit_scope();
        self.emit(format!("b {end_if}"));
        self.emit("nop");

        self.emit(format!("{top_else}:"));
        let else_scope = self.globals.unique_id("if_else");
        ctx.enter_scope(else_scope);
        if let Some(else_body) = else_body {
            self.lower_statement(ctx, else_body)?;
        }
        ctx.exit_scope();
        self.emit(format!("{end_if}:"));
        Ok(())
    }

    fn lower_while(&mut self, ctx: &mut FunctionContext, cond: &Node, body: &Node) -> Result<(), CompileError> {
        let top = self.globals.unique_id("top_while");
        let end = self.globals.unique_id("end_while");
        self.emit(format!("{top}:"));
        let tmp = self.regs.request_free()?;
        self.lower_expr(ctx, cond, &tmp)?;
        self.emit(format!("beq {tmp}, $0, {end}"));
        self.emit("nop");
        self.regs.release(&tmp)?;

        ctx.push_loop_labels(top.clone(), end.clone());
        let scope = self.globals.unique_id("while_body");
        ctx.enter_scope(scope);
        self.lower_statement(ctx, body)?;
        ctx.exit_scope();
        ctx.pop_loop_labels();

        self.emit(format!("b {top}"));
        self.emit("nop");
        self.emit(format!("{end}:"));
        Ok(())
    }

    fn lower_for(
        &mut self,
        ctx: &mut FunctionContext,
        init: &Node,
        cond: &Node,
        increment: Option<&Node>,
        body: &Node,
    ) -> Result<(), CompileError> {
        let scope = self.globals.unique_id("for_body");
        ctx.enter_scope(scope);
        self.lower_statement(ctx, init)?;

        let top = self.globals.unique_id("top_for");
        let end = self.globals.unique_id("end_for");
        let top_increment = self.globals.unique_id("top_increment");
        self.emit(format!("{top}:"));
        if !matches!(cond, Node::EmptyExpression) {
            let tmp = self.regs.request_free()?;
            self.lower_expr(ctx, cond, &tmp)?;
            self.emit(format!("beq {tmp}, $0, {end}"));
            self.emit("nop");
            self.regs.release(&tmp)?;
        }

        ctx.push_loop_labels(top_increment.clone(), end.clone());
        self.lower_statement(ctx, body)?;
        ctx.pop_loop_labels();

        self.emit(format!("{top_increment}:"));
        if let Some(increment) = increment {
            let tmp = self.regs.request_free()?;
            self.lower_expr(ctx, increment, &tmp)?;
            self.regs.release(&tmp)?;
        }
        self.emit(format!("b {top}"));
        self.emit("nop");
        self.emit(format!("{end}:"));
        ctx.exit_scope();
        Ok(())
    }

    fn lower_switch(&mut self, ctx: &mut FunctionContext, test: &Node, body: &crate::ast::CaseList) -> Result<(), CompileError> {
        let test_reg = self.regs.request_free()?;
        self.lower_expr(ctx, test, &test_reg)?;
        let def_reg = self.regs.request_free()?;
        self.emit(format!("li {def_reg}, 1"));

        let default_label = self.globals.unique_id("top_default");
        let break_label = self.globals.unique_id("end_switch");
        ctx.push_switch_labels(default_label.clone(), break_label.clone());

        let mut saw_default = false;
        for case_node in body.iter() {
            match case_node {
                Node::Case { label_expr, body: case_body } => {
                    self.lower_expr(ctx, test, &test_reg)?;
                    let label_reg = self.regs.request_free()?;
                    self.lower_expr(ctx, label_expr, &label_reg)?;
                    let end_case = self.globals.unique_id("end_case");
                    self.emit(format!("bne {test_reg}, {label_reg}, {end_case}"));
                    self.emit("nop");
                    self.regs.release(&label_reg)?;
                    self.emit(format!("li {def_reg}, 0"));
                    if let Some(case_body) = case_body {
                        for stmt in case_body.iter() {
                            self.lower_statement(ctx, stmt)?;
                        }
                    }
                    self.emit(format!("{end_case}:"));
                }
                Node::Default { body: default_body } => {
                    saw_default = true;
                    let end_default = self.globals.unique_id("end_default");
                    self.emit(format!("b {end_default}"));
                    self.emit("nop");
                    self.emit(format!("{default_label}:"));
                    if let Some(default_body) = default_body {
                        for stmt in default_body.iter() {
                            self.lower_statement(ctx, stmt)?;
                        }
                    }
                    self.emit(format!("b {break_label}"));
                    self.emit("nop");
                    self.emit(format!("{end_default}:"));
                }
                other => {
                    return Err(CompileError::internal(format!("{} cannot appear in a switch body", other.kind())));
                }
            }
        }
        if saw_default {
            self.emit(format!("bne {def_reg}, $0, {default_label}"));
            self.emit("nop");
        }
        self.regs.release(&test_reg)?;
        self.regs.release(&def_reg)?;
        ctx.pop_switch_labels();
        self.emit(format!("{break_label}:"));
        Ok(())
    }

    fn lower_compound(&mut self, ctx: &mut FunctionContext, body: Option<&StatementList>) -> Result<(), CompileError> {
        let scope = self.globals.unique_id("block");
        ctx.enter_scope(scope);
        if let Some(body) = body {
            for stmt in body.iter() {
                self.lower_statement(ctx, stmt)?;
            }
        }
        ctx.exit_scope();
        Ok(())
    }
}
