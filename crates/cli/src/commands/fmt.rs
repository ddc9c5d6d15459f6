use std::path::Path;
use std::process;

use super::read_file;
use crate::{report_error, Context};

pub(crate) fn cmd_fmt(file: &Path, check: bool, ctx: &Context) {
    let text = read_file(file, ctx);
    let formatted = ec_core::format_source(&text);

    if !check {
        print!("{}", formatted);
        return;
    }
    if formatted != text {
        let msg = format!("{} is not formatted", file.display());
        report_error(&msg, ctx.output, ctx.quiet);
        process::exit(1);
    }
    tracing::debug!(file = %file.display(), "already formatted");
}
