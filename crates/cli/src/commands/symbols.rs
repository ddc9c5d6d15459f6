use std::path::PathBuf;

use super::{compile_unit, report_diagnostics, to_json};
use crate::{Context, OutputFormat};

pub(crate) fn cmd_symbols(paths: Vec<PathBuf>, ctx: &Context) {
    let compilation = compile_unit(paths, ctx);
    let errors: Vec<_> = compilation.errors().cloned().collect();
    report_diagnostics(&errors, ctx);

    match ctx.output {
        OutputFormat::Json => println!("{}", to_json(compilation.index.symbols())),
        OutputFormat::Text => {
            for symbol in compilation.index.symbols() {
                let version = symbol
                    .version
                    .as_ref()
                    .map(|v| format!("@{}", v))
                    .unwrap_or_default();
                println!(
                    "{} {}{}\t{}:{}",
                    symbol.kind, symbol.name, version, symbol.file, symbol.span.line
                );
            }
        }
    }
}
