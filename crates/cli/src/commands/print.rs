use std::path::Path;
use std::process;

use super::{read_file, report_diagnostics};
use crate::Context;

pub(crate) fn cmd_print(file: &Path, ctx: &Context) {
    let text = read_file(file, ctx);
    let filename = file.display().to_string();
    let out = ec_core::parse_source(&text, &filename, ctx.options.max_errors);

    // A partial tree would print as a different program.
    if out.has_errors() {
        report_diagnostics(&out.diagnostics, ctx);
        process::exit(1);
    }
    print!("{}", ec_core::print_program(&out.program));
}
