//! Function-definition lowering: frame sizing, prologue/epilogue, and argument marshalling.

use super::CodeGenerator;
use crate::{
    ast::{ArgumentList, StatementList, Variable},
    context::{frame_size_for, FunctionContext},
    error::CompileError,
    globals::{extract_argument_names, NO_FUNC_ARGUMENT},
};

impl CodeGenerator {
    pub(super) fn lower_function_definition(
        &mut self,
        name: &Variable,
        args: &ArgumentList,
        body: &StatementList,
    ) -> Result<(), CompileError> {
        let declarations_bytes = crate::globals::sum_statement_list(body)?;
        let frame_size = frame_size_for(declarations_bytes);
        let epilogue_label = self.globals.unique_id(&format!("epilogue_{}", name.id));
        let mut ctx = FunctionContext::new(frame_size, epilogue_label.clone());

        self.emit(".align 2");
        self.emit(format!(".globl {}", name.id));
        self.emit(".set nomips16");
        self.emit(".set nomicromips");
        self.emit(format!(".ent {}", name.id));
        self.emit(format!(".type {}, @function", name.id));
        self.emit(format!("{}:", name.id));
        self.emit(format!("addiu $sp, $sp, -{frame_size}"));
        self.emit(format!("sw $ra, {}($sp)", frame_size - 4));
        self.emit(format!("sw $fp, {}($sp)", frame_size - 8));
        self.emit("move $fp, $sp");

        ctx.enter_scope("fn_root");
        let arg_names = extract_argument_names(args);
        let is_main = name.id == "main";
        if !is_main {
            for (i, arg_name) in arg_names.iter().enumerate() {
                let offset = frame_size + (i as i32) * 4;
                self.emit(format!("sw $a{i}, {offset}($sp)"));
                if arg_name != NO_FUNC_ARGUMENT {
                    ctx.place_argument(arg_name, offset)?;
                }
            }
        }

        for stmt in body.iter() {
            self.lower_statement(&mut ctx, stmt)?;
        }

        self.emit(format!("{epilogue_label}:"));
        if !is_main {
            for (i, _) in arg_names.iter().enumerate() {
                let offset = frame_size + (i as i32) * 4;
                self.emit(format!("lw $a{i}, {offset}($sp)"));
            }
        }
        self.emit(format!("lw $ra, {}($sp)", frame_size - 4));
        self.emit(format!("lw $fp, {}($sp)", frame_size - 8));
        self.emit(format!("addiu $sp, $sp, {frame_size}"));
        self.emit("j $ra");
        self.emit("nop");
        self.emit(".set macro");
        self.emit(".set reorder");
        self.emit(format!(".end {}", name.id));
        self.emit(format!(".size {0}, .-{0}", name.id));
        ctx.exit_scope();
        Ok(())
    }
}
