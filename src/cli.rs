//! Argument dispatch and pipeline orchestration.
//!
//! Hand-rolled over `std::env::args()` rather than a derive-style argument
//! parser: zero args or a help token print usage and exit 0; a missing
//! source file is a non-fatal message, not an error; trailing arguments are
//! an open-ended list of library references. The historical tool's own
//! `Main(string[] args)` dispatch looked the same way, and none of those
//! behaviors fit a flags/subcommands model.

use std::path::Path;

use vc_ast::{Expr, Program, Stmt};
use vc_backend::{Assembler, FileAssembler};
use vc_base::{Arena, Interner, Sink};
use vc_lexer::Scanner;
use vc_reflect::{StdlibProvider, TypeProvider};

/// The library every compilation references implicitly, regardless of what
/// the command line adds (spec: "a default standard-library reference is
/// always added implicitly").
const DEFAULT_LIBRARY: &str = "Stdlib";

pub fn run(args: &[String]) {
    match args.first() {
        None => print_help(),
        Some(first) if is_help_token(first) => print_help(),
        Some(source_path) => {
            if !Path::new(source_path).is_file() {
                println!("Source file '{source_path}' not found");
                return;
            }
            let mut libraries: Vec<String> = args[1..].to_vec();
            libraries.push(DEFAULT_LIBRARY.to_string());
            if let Err(e) = compile_file(source_path, libraries) {
                eprintln!("{e}");
            }
        }
    }
}

fn is_help_token(arg: &str) -> bool {
    let stripped = arg.strip_prefix('-').or_else(|| arg.strip_prefix('/')).unwrap_or(arg);
    stripped.eq_ignore_ascii_case("help") || stripped == "?"
}

fn print_help() {
    println!("vc - compiler for the V language");
    println!();
    println!("USAGE:");
    println!("    vc <source-file> [library-reference ...]");
    println!("    vc help | ? | -? | /?");
}

/// Runs the full scan -> parse -> evaluate -> emit pipeline for one source
/// file, per spec.md's end-of-phase gating: emission only happens once
/// parsing and evaluation have both recorded zero errors. A compile failure
/// is reported but is not itself a process error (spec.md §6: the exit code
/// is always zero regardless of compile success); only I/O or a lexical
/// fatal error is propagated here.
fn compile_file(path: &str, libraries: Vec<String>) -> Result<(), Box<dyn std::error::Error>> {
    let source = std::fs::read_to_string(path)?;
    let mut interner = Interner::new();
    let scanner = Scanner::new(&source, &mut interner)?;

    let expr_arena: Arena<Expr> = Arena::new();
    let stmt_arena: Arena<Stmt> = Arena::new();
    let (mut program, mut scopes, mut sink) =
        vc_parser::parse(scanner, &expr_arena, &stmt_arena, libraries)?;

    log::debug!(
        "parsed '{}': {} function(s), {} syntax error(s)",
        path,
        program.functions.len(),
        sink.error_count()
    );

    if sink.has_errors() {
        print_diagnostics(&sink);
        println!("Compilation aborted");
        print_summary(&sink);
        return Ok(());
    }

    let providers: Vec<Box<dyn TypeProvider>> = vec![Box::new(StdlibProvider)];
    vc_sema::evaluate(&mut program, &mut scopes, &providers, &mut interner, &expr_arena, &stmt_arena, &mut sink);
    log::debug!("evaluated '{}': {} semantic error(s)", path, sink.error_count());

    print_diagnostics(&sink);
    if sink.has_errors() {
        println!("Compilation aborted");
        print_summary(&sink);
        return Ok(());
    }

    emit_artifact(&program, &mut interner, path)?;
    print_summary(&sink);
    Ok(())
}

fn emit_artifact(program: &Program<'_>, interner: &mut Interner, source_path: &str) -> Result<(), Box<dyn std::error::Error>> {
    let dir = Path::new(source_path).parent().filter(|p| !p.as_os_str().is_empty()).unwrap_or_else(|| Path::new("."));
    let mut assembler = FileAssembler::new(dir);
    vc_backend::compile(program, interner, &mut assembler);
    let artifact = assembler.finish(interner)?;
    log::info!("wrote {artifact}");
    println!("Compiled {artifact}");
    Ok(())
}

fn print_diagnostics(sink: &Sink) {
    for diagnostic in sink.diagnostics() {
        eprintln!("{diagnostic}");
    }
}

fn print_summary(sink: &Sink) {
    println!("{} error(s), {} warning(s)", sink.error_count(), sink.warning_count());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn help_token_matches_every_documented_spelling() {
        for spelling in ["help", "HELP", "Help", "?", "-?", "/?", "-help", "/help"] {
            assert!(is_help_token(spelling), "{spelling} should be recognized as help");
        }
    }

    #[test]
    fn a_source_path_is_not_mistaken_for_a_help_token() {
        assert!(!is_help_token("program.v"));
    }
}
