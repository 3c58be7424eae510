//! Subcommand implementations.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use owo_colors::OwoColorize;
use rayon::prelude::*;
use tracing::{debug, info};
use trellis_compiler::ast::Template;
use trellis_compiler::{PrecompileOptions, WireFormatDebugger, compile, precompile};
use trellis_opcode::{Instruction, Program};

use crate::cli::{DebugArgs, LowerArgs, PrecompileArgs};
use crate::config::Config;

/// Reads a template AST from JSON.
fn read_template(path: &Path) -> Result<Template> {
    let source = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&source).with_context(|| format!("invalid template AST in {}", path.display()))
}

/// `trellis precompile`
pub fn precompile_files(args: &PrecompileArgs, config: &Config) -> Result<()> {
    if args.id.is_some() && args.files.len() > 1 {
        bail!("--id can only be used with a single file");
    }
    let meta = config.meta_json()?;

    let results: Vec<(&PathBuf, Result<String>)> = args
        .files
        .par_iter()
        .map(|path| {
            let result = read_template(path).and_then(|template| {
                let options = PrecompileOptions {
                    id: args.id.clone(),
                    meta: meta.clone(),
                    compile: config.compile_options(),
                };
                precompile(&template, options)
                    .with_context(|| format!("failed to compile {}", path.display()))
            });
            (path, result)
        })
        .collect();

    if let Some(dir) = &args.out_dir {
        fs::create_dir_all(dir).with_context(|| format!("failed to create {}", dir.display()))?;
    }

    let mut failures = 0;
    for (path, result) in results {
        match result {
            Ok(json) => match &args.out_dir {
                Some(dir) => {
                    let stem = path.file_stem().unwrap_or(path.as_os_str());
                    let out = dir.join(format!("{}.json", stem.to_string_lossy()));
                    fs::write(&out, json)
                        .with_context(|| format!("failed to write {}", out.display()))?;
                    info!(input = %path.display(), output = %out.display(), "precompiled");
                }
                None => println!("{json}"),
            },
            Err(error) => {
                failures += 1;
                eprintln!("{}: {error:#}", "Error".red().bold());
            }
        }
    }

    debug!(files = args.files.len(), failures, "precompile finished");
    if failures > 0 {
        bail!("{failures} of {} templates failed to compile", args.files.len());
    }
    Ok(())
}

/// `trellis debug`
pub fn debug_file(args: &DebugArgs, config: &Config) -> Result<()> {
    let template = read_template(&args.file)?;
    let block = compile(&template, &config.compile_options())?;
    let value = WireFormatDebugger::new(&block).format();
    println!("{}", serde_json::to_string_pretty(&value)?);
    Ok(())
}

/// `trellis lower`
pub fn lower_file(args: &LowerArgs, config: &Config) -> Result<()> {
    let template = read_template(&args.file)?;
    let block = compile(&template, &config.compile_options())?;
    let program = trellis_opcode::lower(&block, &config.resolver())?;
    if args.json {
        println!("{}", serde_json::to_string_pretty(&program)?);
    } else {
        print!("{}", listing(&program));
    }
    Ok(())
}

/// A human-readable listing of a program.
fn listing(program: &Program) -> String {
    fn section(out: &mut String, title: &str, instructions: &[Instruction]) {
        out.push_str(title);
        out.push('\n');
        for (index, instruction) in instructions.iter().enumerate() {
            out.push_str(&format!("  {index:04} {instruction}\n"));
        }
    }

    let mut out = String::new();
    section(&mut out, "main:", &program.instructions);
    for (index, block) in program.blocks.iter().enumerate() {
        let title = format!("block{index} {:?}:", block.parameters);
        section(&mut out, &title, &block.instructions);
    }
    if !program.constants.is_empty() {
        out.push_str("constants:\n");
        for (index, constant) in program.constants.iter().enumerate() {
            let value = serde_json::to_string(constant).unwrap_or_default();
            out.push_str(&format!("  #{index} {value}\n"));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use trellis_opcode::{Constant, OpCode, Operand};

    #[test]
    fn test_listing() {
        let mut program = Program::new();
        let text = program.add_constant(Constant::from("hi"));
        program
            .instructions
            .push(Instruction::with_operand(OpCode::Text, Operand::Constant(text)));
        assert_eq!(
            listing(&program),
            "main:\n  0000 Text #0\nconstants:\n  #0 \"hi\"\n"
        );
    }
}
