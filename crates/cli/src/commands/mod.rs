pub(crate) mod check;
pub(crate) mod flows;
pub(crate) mod fmt;
pub(crate) mod parse;
pub(crate) mod print;
pub(crate) mod symbols;

use std::fs;
use std::path::{Path, PathBuf};
use std::process;

use ec_core::{Compilation, Diagnostic, FileSystemProvider};

use crate::{report_error, Context, OutputFormat};

/// Load and compile the unit named by `paths`, exiting on I/O failure.
pub(crate) fn compile_unit(paths: Vec<PathBuf>, ctx: &Context) -> Compilation {
    let paths = ctx.unit_paths(paths);
    let sources = match ec_core::load_unit(&paths, &FileSystemProvider, &ctx.options.extension) {
        Ok(s) => s,
        Err(e) => {
            report_error(&e.to_string(), ctx.output, ctx.quiet);
            process::exit(1);
        }
    };
    ec_core::compile(&sources, &ctx.options)
}

pub(crate) fn read_file(file: &Path, ctx: &Context) -> String {
    match fs::read_to_string(file) {
        Ok(s) => s,
        Err(e) => {
            let msg = format!("cannot read '{}': {}", file.display(), e);
            report_error(&msg, ctx.output, ctx.quiet);
            process::exit(1);
        }
    }
}

/// Diagnostics that accompany another command's output go to stderr.
pub(crate) fn report_diagnostics(diagnostics: &[Diagnostic], ctx: &Context) {
    if ctx.quiet || diagnostics.is_empty() {
        return;
    }
    match ctx.output {
        OutputFormat::Text => {
            for d in diagnostics {
                eprintln!("{}", d);
            }
        }
        OutputFormat::Json => {
            eprintln!("{}", to_json(&diagnostics));
        }
    }
}

pub(crate) fn to_json<T: serde::Serialize + ?Sized>(value: &T) -> String {
    serde_json::to_string_pretty(value)
        .unwrap_or_else(|e| format!("{{\"error\": \"serialization: {}\"}}", e))
}
