//! Expression lowering. Every emitter guarantees that after its emitted code runs, the
//! expression's value sits in `dest`.

use super::CodeGenerator;
use crate::{
    ast::{AssignOp, BinaryOp, Node, PostfixOp, UnaryOp, Variable, VariableInfo},
    context::FunctionContext,
    error::CompileError,
    globals::{assign_op_to_binary, fold_constant},
};

/// Where a variable's value lives: a fixed stack offset, or the `.data` section under its own
/// symbol.
enum VarLocation {
    Local(i32),
    Global,
}

impl CodeGenerator {
    fn resolve_location(&self, ctx: &FunctionContext, name: &str) -> Result<VarLocation, CompileError> {
        if ctx.is_local(name) {
            Ok(VarLocation::Local(ctx.offset_of(name)?))
        } else if self.globals.contains_global(name) {
            Ok(VarLocation::Global)
        } else {
            Err(CompileError::unsupported("Variable", format!("`{name}` is not declared")))
        }
    }

    pub(super) fn lower_expr(&mut self, ctx: &mut FunctionContext, node: &Node, dest: &str) -> Result<(), CompileError> {
        match node {
            Node::IntegerConstant(value) => {
                self.emit(format!("li {dest}, {value}"));
                Ok(())
            }
            Node::Variable(var) => self.load_variable(ctx, var, dest),
            Node::Unary { op, operand } => self.lower_unary(ctx, *op, operand, dest),
            Node::Postfix { op, operand } => self.lower_postfix(ctx, *op, operand, dest),
            Node::Binary { op, lhs, rhs } => self.lower_binary(ctx, *op, lhs, rhs, dest),
            Node::Conditional { cond, then_expr, else_expr } => {
                self.lower_conditional(ctx, cond, then_expr, else_expr, dest)
            }
            Node::Assignment { target, op, rhs } => self.lower_assignment(ctx, target, *op, rhs, dest),
            Node::FunctionCall { callee_id, args } => self.lower_call(ctx, callee_id, args, dest),
            Node::EmptyExpression => Ok(()),
            other => Err(CompileError::internal(format!("{} is not an expression", other.kind()))),
        }
    }

    fn lower_binary(
        &mut self,
        ctx: &mut FunctionContext,
        op: BinaryOp,
        lhs: &Node,
        rhs: &Node,
        dest: &str,
    ) -> Result<(), CompileError> {
        match op {
            BinaryOp::LogicalAnd => self.lower_logical_and(ctx, lhs, rhs, dest),
            BinaryOp::LogicalOr => self.lower_logical_or(ctx, lhs, rhs, dest),
            _ => {
                self.lower_expr(ctx, lhs, dest)?;
                let rhs_reg = self.regs.request_free()?;
                self.lower_expr(ctx, rhs, &rhs_reg)?;
                self.emit_binary_op(op, dest, &rhs_reg)?;
                self.regs.release(&rhs_reg)?;
                Ok(())
            }
        }
    }

    fn emit_binary_op(&mut self, op: BinaryOp, d: &str, r: &str) -> Result<(), CompileError> {
        match op {
            BinaryOp::Mul => {
                self.emit(format!("mult {d}, {r}"));
                self.emit(format!("mflo {d}"));
                self.emit("nop");
                self.emit("nop");
            }
            BinaryOp::Div => {
                self.emit(format!("div {d}, {r}"));
                self.emit(format!("mflo {d}"));
                self.emit("nop");
                self.emit("nop");
            }
            BinaryOp::Mod => {
                self.emit(format!("div {d}, {r}"));
                self.emit(format!("mfhi {d}"));
                self.emit("nop");
                self.emit("nop");
            }
            BinaryOp::Add => self.emit(format!("addu {d}, {d}, {r}")),
            BinaryOp::Sub => self.emit(format!("subu {d}, {d}, {r}")),
            BinaryOp::Shl => self.emit(format!("sllv {d}, {d}, {r}")),
            // logical shift-right, matching the pinned instruction table; see DESIGN.md for the
            // arithmetic-shift deviation this leaves on the table for negative operands.
            BinaryOp::Shr => self.emit(format!("srlv {d}, {d}, {r}")),
            BinaryOp::Lt => self.emit(format!("slt {d}, {d}, {r}")),
            BinaryOp::Gt => self.emit(format!("slt {d}, {r}, {d}")),
            BinaryOp::Le => {
                self.emit(format!("slt {d}, {r}, {d}"));
                self.emit(format!("xori {d}, {d}, 1"));
            }
            BinaryOp::Ge => {
                self.emit(format!("slt {d}, {d}, {r}"));
                self.emit(format!("xori {d}, {d}, 1"));
            }
            BinaryOp::Eq => {
                self.emit(format!("xor {d}, {d}, {r}"));
                self.emit(format!("sltiu {d}, {d}, 1"));
            }
            BinaryOp::Ne => {
                self.emit(format!("xor {d}, {d}, {r}"));
                self.emit(format!("sltu {d}, $0, {d}"));
            }
            BinaryOp::BitAnd => self.emit(format!("and {d}, {d}, {r}")),
            BinaryOp::BitXor => self.emit(format!("xor {d}, {d}, {r}")),
            BinaryOp::BitOr => self.emit(format!("or {d}, {d}, {r}")),
            BinaryOp::LogicalAnd | BinaryOp::LogicalOr => {
                return Err(CompileError::internal("short-circuit operators must not reach emit_binary_op"));
            }
        }
        Ok(())
    }

    fn lower_logical_and(&mut self, ctx: &mut FunctionContext, lhs: &Node, rhs: &Node, dest: &str) -> Result<(), CompileError> {
        self.lower_expr(ctx, lhs, dest)?;
        let eval_rhs = self.globals.unique_id("and_rhs");
        let end = self.globals.unique_id("end_and");
        self.emit(format!("bne {dest}, $0, {eval_rhs}"));
        self.emit("nop");
        self.emit(format!("b {end}"));
        self.emit("nop");
        self.emit(format!("{eval_rhs}:"));
        let rhs_reg = self.regs.request_free()?;
        self.lower_expr(ctx, rhs, &rhs_reg)?;
        self.emit(format!("sltu {dest}, $0, {rhs_reg}"));
        self.regs.release(&rhs_reg)?;
        self.emit(format!("{end}:"));
        Ok(())
    }

    fn lower_logical_or(&mut self, ctx: &mut FunctionContext, lhs: &Node, rhs: &Node, dest: &str) -> Result<(), CompileError> {
        self.lower_expr(ctx, lhs, dest)?;
        let eval_rhs = self.globals.unique_id("or_rhs");
        let end = self.globals.unique_id("end_or");
        self.emit(format!("beq {dest}, $0, {eval_rhs}"));
        self.emit("nop");
        self.emit(format!("li {dest}, 1"));
        self.emit(format!("b {end}"));
        self.emit("nop");
        self.emit(format!("{eval_rhs}:"));
        let rhs_reg = self.regs.request_free()?;
        self.lower_expr(ctx, rhs, &rhs_reg)?;
        self.emit(format!("sltu {dest}, $0, {rhs_reg}"));
        self.regs.release(&rhs_reg)?;
        self.emit(format!("{end}:"));
        Ok(())
    }

    fn lower_unary(&mut self, ctx: &mut FunctionContext, op: UnaryOp, operand: &Node, dest: &str) -> Result<(), CompileError> {
        match op {
            UnaryOp::Minus => {
                self.lower_expr(ctx, operand, dest)?;
                self.emit(format!("subu {dest}, $0, {dest}"));
                Ok(())
            }
            UnaryOp::Plus => self.lower_expr(ctx, operand, dest),
            UnaryOp::BitwiseNot => {
                self.lower_expr(ctx, operand, dest)?;
                self.emit(format!("nor {dest}, {dest}, $0"));
                Ok(())
            }
            UnaryOp::LogicalNot => {
                self.lower_expr(ctx, operand, dest)?;
                self.emit(format!("sltiu {dest}, {dest}, 1"));
                Ok(())
            }
            UnaryOp::AddressOf => {
                let Node::Variable(var) = operand else {
                    return Err(CompileError::unsupported("Unary", "`&` requires a variable operand"));
                };
                self.lower_address_of(ctx, var, dest)
            }
            UnaryOp::PreIncrement | UnaryOp::PreDecrement => {
                let Node::Variable(var) = operand else {
                    return Err(CompileError::unsupported("Unary", format!("`{op}` requires a variable operand")));
                };
                self.load_variable(ctx, var, dest)?;
                let delta = if op == UnaryOp::PreIncrement { 1 } else { -1 };
                self.emit(format!("addiu {dest}, {dest}, {delta}"));
                self.store_variable(ctx, var, dest, false)
            }
        }
    }

    fn lower_postfix(&mut self, ctx: &mut FunctionContext, op: PostfixOp, operand: &Node, dest: &str) -> Result<(), CompileError> {
        let Node::Variable(var) = operand else {
            return Err(CompileError::unsupported("Postfix", format!("`{op}` requires a variable operand")));
        };
        self.load_variable(ctx, var, dest)?;
        let updated = self.regs.request_free()?;
        let delta = if op == PostfixOp::PostIncrement { 1 } else { -1 };
        self.emit(format!("addiu {updated}, {dest}, {delta}"));
        self.store_variable(ctx, var, &updated, false)?;
        self.regs.release(&updated)?;
        Ok(())
    }

    fn lower_conditional(
        &mut self,
        ctx: &mut FunctionContext,
        cond: &Node,
        then_expr: &Node,
        else_expr: &Node,
        dest: &str,
    ) -> Result<(), CompileError> {
        self.lower_expr(ctx, cond, dest)?;
        let end_cond = self.globals.unique_id("end_cond");
        self.emit(format!("beq {dest}, $0, {end_cond}"));
        self.emit("nop");
        let then_reg = self.regs.request_free()?;
        self.lower_expr(ctx, then_expr, &then_reg)?;
        // Both branches are emitted in sequence; the false path branches straight past the move
        // below, so `dest` keeps whatever `cond`'s evaluation left in it on that path.
        self.lower_expr(ctx, else_expr, dest)?;
        self.emit(format!("move {dest}, {then_reg}"));
        self.regs.release(&then_reg)?;
        self.emit(format!("{end_cond}:"));
        Ok(())
    }

    fn lower_assignment(
        &mut self,
        ctx: &mut FunctionContext,
        target: &Variable,
        op: AssignOp,
        rhs: &Node,
        dest: &str,
    ) -> Result<(), CompileError> {
        let rhs_reg = self.regs.request_free()?;
        self.lower_expr(ctx, rhs, &rhs_reg)?;
        match assign_op_to_binary(op) {
            None => self.emit(format!("move {dest}, {rhs_reg}")),
            Some(bin_op) => {
                self.load_variable(ctx, target, dest)?;
                self.emit_binary_op(bin_op, dest, &rhs_reg)?;
            }
        }
        self.store_variable(ctx, target, dest, false)?;
        self.regs.release(&rhs_reg)?;
        Ok(())
    }

    fn lower_address_of(&mut self, ctx: &FunctionContext, var: &Variable, dest: &str) -> Result<(), CompileError> {
        match var.info {
            VariableInfo::Normal | VariableInfo::Pointer => match self.resolve_location(ctx, &var.id)? {
                VarLocation::Local(offset) => {
                    self.emit(format!("addiu {dest}, $fp, {offset}"));
                    Ok(())
                }
                VarLocation::Global => {
                    self.emit(format!("lui {dest}, %hi({})", var.id));
                    self.emit(format!("addiu {dest}, {dest}, %lo({})", var.id));
                    Ok(())
                }
            },
            VariableInfo::Array => {
                let base_offset = match self.resolve_location(ctx, &var.id)? {
                    VarLocation::Local(offset) => offset,
                    VarLocation::Global => {
                        self.emit(format!("lui {dest}, %hi({})", var.id));
                        self.emit(format!("addiu {dest}, {dest}, %lo({})", var.id));
                        0
                    }
                };
                match &var.index_or_size {
                    None => {
                        if matches!(self.resolve_location(ctx, &var.id)?, VarLocation::Local(_)) {
                            self.emit(format!("addiu {dest}, $fp, {base_offset}"));
                        }
                        Ok(())
                    }
                    Some(index) => Err(CompileError::unsupported(
                        "Unary",
                        format!("`&{}[{index:?}]` is not supported", var.id),
                    )),
                }
            }
        }
    }

    pub(super) fn load_variable(&mut self, ctx: &FunctionContext, var: &Variable, dest: &str) -> Result<(), CompileError> {
        match var.info {
            VariableInfo::Normal => match self.resolve_location(ctx, &var.id)? {
                VarLocation::Local(offset) => {
                    self.emit(format!("lw {dest}, {offset}($fp)"));
                    Ok(())
                }
                VarLocation::Global => {
                    self.emit(format!("lui {dest}, %hi({})", var.id));
                    self.emit(format!("lw {dest}, %lo({})({dest})", var.id));
                    self.emit("nop");
                    Ok(())
                }
            },
            VariableInfo::Array => {
                let index = var
                    .index_or_size
                    .as_deref()
                    .ok_or_else(|| CompileError::unsupported("Variable", format!("`{}` used without a subscript", var.id)))?;
                let idx_reg = self.regs.request_free()?;
                self.lower_expr(ctx, index, &idx_reg)?;
                self.emit(format!("sll {idx_reg}, {idx_reg}, 2"));
                match self.resolve_location(ctx, &var.id)? {
                    VarLocation::Local(base) => {
                        self.emit(format!("addu {dest}, $fp, {idx_reg}"));
                        self.emit(format!("lw {dest}, {base}({dest})"));
                    }
                    VarLocation::Global => {
                        self.emit(format!("lui {dest}, %hi({})", var.id));
                        self.emit(format!("addiu {dest}, {dest}, %lo({})", var.id));
                        self.emit(format!("addu {dest}, {dest}, {idx_reg}"));
                        self.emit(format!("lw {dest}, 0({dest})"));
                    }
                }
                self.emit("nop");
                self.regs.release(&idx_reg)?;
                Ok(())
            }
            VariableInfo::Pointer => {
                match self.resolve_location(ctx, &var.id)? {
                    VarLocation::Local(offset) => self.emit(format!("lw {dest}, {offset}($fp)")),
                    VarLocation::Global => {
                        self.emit(format!("lui {dest}, %hi({})", var.id));
                        self.emit(format!("lw {dest}, %lo({})({dest})", var.id));
                    }
                }
                self.emit("nop");
                if let Some(index) = &var.index_or_size {
                    let idx_reg = self.regs.request_free()?;
                    self.lower_expr(ctx, index, &idx_reg)?;
                    self.emit(format!("sll {idx_reg}, {idx_reg}, 2"));
                    self.emit(format!("addu {dest}, {dest}, {idx_reg}"));
                    self.regs.release(&idx_reg)?;
                }
                self.emit(format!("lw {dest}, 0({dest})"));
                self.emit("nop");
                Ok(())
            }
        }
    }

    pub(super) fn store_variable(
        &mut self,
        ctx: &mut FunctionContext,
        var: &Variable,
        src: &str,
        is_declaration: bool,
    ) -> Result<(), CompileError> {
        match var.info {
            VariableInfo::Normal => {
                let location = if is_declaration {
                    VarLocation::Local(ctx.place_local(&var.id)?)
                } else {
                    self.resolve_location(ctx, &var.id)?
                };
                match location {
                    VarLocation::Local(offset) => self.emit(format!("sw {src}, {offset}($fp)")),
                    VarLocation::Global => {
                        let addr = self.regs.request_free()?;
                        self.emit(format!("lui {addr}, %hi({})", var.id));
                        self.emit(format!("sw {src}, %lo({})({addr})", var.id));
                        self.regs.release(&addr)?;
                    }
                }
                Ok(())
            }
            VariableInfo::Pointer if is_declaration => {
                let offset = ctx.place_local(&var.id)?;
                self.emit(format!("sw {src}, {offset}($fp)"));
                Ok(())
            }
            VariableInfo::Pointer => {
                let addr = self.regs.request_free()?;
                match self.resolve_location(ctx, &var.id)? {
                    VarLocation::Local(offset) => self.emit(format!("lw {addr}, {offset}($fp)")),
                    VarLocation::Global => {
                        self.emit(format!("lui {addr}, %hi({})", var.id));
                        self.emit(format!("lw {addr}, %lo({})({addr})", var.id));
                    }
                }
                self.emit("nop");
                if let Some(index) = &var.index_or_size {
                    let idx_reg = self.regs.request_free()?;
                    self.lower_expr(ctx, index, &idx_reg)?;
                    self.emit(format!("sll {idx_reg}, {idx_reg}, 2"));
                    self.emit(format!("addu {addr}, {addr}, {idx_reg}"));
                    self.regs.release(&idx_reg)?;
                }
                self.emit(format!("sw {src}, 0({addr})"));
                self.regs.release(&addr)?;
                Ok(())
            }
            VariableInfo::Array => {
                let index = var
                    .index_or_size
                    .as_deref()
                    .ok_or_else(|| CompileError::unsupported("Variable", format!("`{}` assigned without a subscript", var.id)))?;
                let idx_reg = self.regs.request_free()?;
                self.lower_expr(ctx, index, &idx_reg)?;
                self.emit(format!("sll {idx_reg}, {idx_reg}, 2"));
                let addr = self.regs.request_free()?;
                match self.resolve_location(ctx, &var.id)? {
                    VarLocation::Local(base) => {
                        self.emit(format!("addu {addr}, $fp, {idx_reg}"));
                        self.emit(format!("sw {src}, {base}({addr})"));
                    }
                    VarLocation::Global => {
                        self.emit(format!("lui {addr}, %hi({})", var.id));
                        self.emit(format!("addiu {addr}, {addr}, %lo({})", var.id));
                        self.emit(format!("addu {addr}, {addr}, {idx_reg}"));
                        self.emit(format!("sw {src}, 0({addr})"));
                    }
                }
                self.regs.release(&addr)?;
                self.regs.release(&idx_reg)?;
                Ok(())
            }
        }
    }
}
