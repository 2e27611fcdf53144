//! Function-call lowering: GCC PIC call setup for externs, live-temporary spilling around the
//! call, argument marshalling into `$a0..$a3`, and result retrieval.

use super::CodeGenerator;
use crate::{ast::{Node, ParametersList}, context::FunctionContext, error::CompileError};

impl CodeGenerator {
    pub(super) fn lower_call(
        &mut self,
        ctx: &mut FunctionContext,
        callee_id: &str,
        args: &ParametersList,
        dest: &str,
    ) -> Result<(), CompileError> {
        let params: Vec<&Node> = args.iter().collect();
        if params.len() > 4 {
            return Err(CompileError::unsupported(
                "FunctionCall",
                format!("`{callee_id}` called with {} arguments, at most 4 are supported", params.len()),
            ));
        }

        let is_extern = self.globals.is_extern_function(callee_id);
        if is_extern {
            self.emit("lui $28, %hi(__gnu_local_gp)");
            self.emit("addiu $28, $28, %lo(__gnu_local_gp)");
        }

        let live = self.regs.live_set();
        let spill_scope = self.globals.unique_id("call_args");
        ctx.enter_scope(spill_scope);
        let mut spill_slots = Vec::new();
        for reg in &live {
            let offset = ctx.place_local(reg)?;
            self.emit(format!("sw {reg}, {offset}($fp)"));
            spill_slots.push((reg.clone(), offset));
        }

        let mut arg_regs = Vec::new();
        for param in &params {
            let reg = self.regs.request_free()?;
            self.lower_expr(ctx, param, &reg)?;
            arg_regs.push(reg);
        }
        for (i, reg) in arg_regs.iter().enumerate() {
            self.emit(format!("move $a{i}, {reg}"));
        }
        for reg in &arg_regs {
            self.regs.release(reg)?;
        }

        if is_extern {
            self.emit(format!("lw $25, %call16({callee_id})($28)"));
            self.emit(format!(".reloc 1f,R_MIPS_JALR,{callee_id}"));
            self.emit("1: jalr $25");
        } else {
            self.emit(format!("jal {callee_id}"));
        }
        self.emit("nop");

        for (reg, offset) in &spill_slots {
            self.emit(format!("lw {reg}, {offset}($fp)"));
        }
        ctx.exit_scope();

        self.emit(format!("move {dest}, $v0"));
        Ok(())
    }
}
