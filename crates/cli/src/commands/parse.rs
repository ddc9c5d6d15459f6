use std::path::Path;
use std::process;

use ec_core::SourceFile;

use super::{read_file, report_diagnostics, to_json};
use crate::Context;

/// The AST is always JSON; `--output` only shapes the diagnostics.
pub(crate) fn cmd_parse(file: &Path, ctx: &Context) {
    let text = read_file(file, ctx);
    let source = SourceFile::new(file.display().to_string(), text);
    let compilation = ec_core::compile(std::slice::from_ref(&source), &ctx.options);

    report_diagnostics(&compilation.diagnostics, ctx);
    if let Some(doc) = compilation.documents.first() {
        println!("{}", to_json(&doc.program));
    }
    if compilation.has_errors() {
        process::exit(1);
    }
}
