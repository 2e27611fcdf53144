use std::{env, fs, process::ExitCode};

use mips_cc::{compile_unit, CompileError, Node};

fn main() -> ExitCode {
    let args: Vec<String> = env::args().collect();

    if args.len() == 5 && args[1] == "-S" && args[3] == "-o" {
        return run_compile(&args[2], &args[4]);
    }
    if args.len() == 5 && args[1] == "--translate" && args[3] == "-o" {
        report(&CompileError::Usage(
            "--translate is not implemented by this crate; translation is a separate AST consumer".to_owned(),
        ));
        return ExitCode::FAILURE;
    }

    eprintln!("Usage:");
    eprintln!("-> for compiler: -S source_file -o destination_file");
    eprintln!("-> for translator: --translate source_file -o destination_file");
    ExitCode::FAILURE
}

fn run_compile(source_file_name: &str, destination_file_name: &str) -> ExitCode {
    let roots = match read_ast(source_file_name) {
        Ok(roots) => roots,
        Err(err) => {
            report(&err);
            return ExitCode::FAILURE;
        }
    };

    let asm = match compile_unit(&roots) {
        Ok(asm) => asm,
        Err(err) => {
            report(&err);
            return exit_code_for(&err);
        }
    };

    if let Err(err) = fs::write(destination_file_name, asm) {
        report(&CompileError::from(err));
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

/// Reads the `Node` forest this CLI accepts in place of raw C text (§1 puts parsing out of scope;
/// see the crate-level CLI contract for why the wire format is JSON rather than `.c` source).
fn read_ast(source_file_name: &str) -> Result<Vec<Node>, CompileError> {
    let text = fs::read_to_string(source_file_name)
        .map_err(|err| CompileError::Usage(format!("cannot open source file '{source_file_name}': {err}")))?;
    serde_json::from_str(&text)
        .map_err(|err| CompileError::Usage(format!("'{source_file_name}' is not a valid AST document: {err}")))
}

fn exit_code_for(err: &CompileError) -> ExitCode {
    match err {
        CompileError::Usage(_) => ExitCode::FAILURE,
        CompileError::Unsupported { .. } | CompileError::Internal { .. } => ExitCode::from(2),
    }
}

/// Diagnostics in debug builds include the offending node kind and identifier; release builds just
/// report that compilation failed, per the error-handling design's debug/release split.
fn report(err: &CompileError) {
    if cfg!(debug_assertions) {
        eprintln!("error: {err}");
    } else {
        eprintln!("error: compilation failed");
    }
}
