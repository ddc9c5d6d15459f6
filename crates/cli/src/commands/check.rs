use std::path::PathBuf;
use std::process;

use ec_core::Severity;

use super::{compile_unit, to_json};
use crate::{Context, OutputFormat};

pub(crate) fn cmd_check(paths: Vec<PathBuf>, ctx: &Context) {
    let compilation = compile_unit(paths, ctx);
    let count = |severity: Severity| {
        compilation
            .diagnostics
            .iter()
            .filter(|d| d.severity == severity)
            .count()
    };
    let errors = count(Severity::Error);
    let warnings = count(Severity::Warning);

    match ctx.output {
        OutputFormat::Json => {
            let report = serde_json::json!({
                "files": compilation.documents.len(),
                "symbols": compilation.index.len(),
                "errors": errors,
                "warnings": warnings,
                "diagnostics": compilation.diagnostics,
            });
            println!("{}", to_json(&report));
        }
        OutputFormat::Text => {
            for d in &compilation.diagnostics {
                println!("{}", d);
            }
            if !ctx.quiet {
                println!(
                    "{} file(s), {} symbol(s): {} error(s), {} warning(s)",
                    compilation.documents.len(),
                    compilation.index.len(),
                    errors,
                    warnings
                );
            }
        }
    }

    if errors > 0 {
        process::exit(1);
    }
}
