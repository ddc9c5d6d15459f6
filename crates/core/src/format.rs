//! Source formatter.
//!
//! Works on text, not on the AST, so comments and statement order survive
//! untouched. Lines are re-indented by brace depth (two spaces per level),
//! trailing whitespace is trimmed, runs of blank lines collapse to one and
//! trailing blank lines are dropped. Braces inside strings and comments do
//! not count. A line starting with `->` continues the previous one and gets
//! one extra level. Actions of a `when` block sit one level below the
//! `when`; which lines are actions is decided from the input's own
//! indentation, the same way the parser decides it.

use crate::parser::FLOW_STATEMENT_WORDS;

const INDENT: &str = "  ";

/// A `when` line whose actions are still being read.
struct OpenWhen {
    /// Leading whitespace of the `when` line in the input, in chars.
    column: usize,
    has_action: bool,
}

#[derive(Debug, Default)]
struct Scan {
    opens: usize,
    closes: usize,
    /// Closing braces before any other significant character.
    leading_closes: usize,
    /// Whether the line ends inside a block comment.
    in_comment: bool,
}

/// Count the braces that matter on one line.
fn scan_line(line: &str, mut in_comment: bool) -> Scan {
    let mut scan = Scan::default();
    let mut leading = true;
    let mut in_string = false;
    let mut chars = line.chars().peekable();
    while let Some(c) = chars.next() {
        if in_comment {
            if c == '*' && chars.peek() == Some(&'/') {
                chars.next();
                in_comment = false;
            }
            continue;
        }
        if in_string {
            match c {
                '\\' => {
                    chars.next();
                }
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match c {
            '/' if chars.peek() == Some(&'/') => break,
            '/' if chars.peek() == Some(&'*') => {
                chars.next();
                in_comment = true;
            }
            '"' => {
                in_string = true;
                leading = false;
            }
            '{' => {
                scan.opens += 1;
                leading = false;
            }
            '}' => {
                scan.closes += 1;
                if leading {
                    scan.leading_closes += 1;
                }
            }
            c if c.is_whitespace() => {}
            _ => leading = false,
        }
    }
    scan.in_comment = in_comment;
    scan
}

pub fn format_source(src: &str) -> String {
    let mut out = String::with_capacity(src.len());
    let mut depth = 0usize;
    let mut in_comment = false;
    let mut pending_blank = false;
    let mut when: Option<OpenWhen> = None;

    for raw in src.lines() {
        let line = raw.trim_end();
        if in_comment {
            // Block comment bodies keep their own layout.
            out.push_str(line);
            out.push('\n');
            in_comment = scan_line(line, true).in_comment;
            continue;
        }
        let trimmed = line.trim_start();
        if trimmed.is_empty() {
            pending_blank = !out.is_empty();
            continue;
        }
        if pending_blank {
            out.push('\n');
            pending_blank = false;
        }

        let scan = scan_line(trimmed, false);
        let mut level = depth.saturating_sub(scan.leading_closes);
        let column = line.chars().count() - trimmed.chars().count();
        let arrow = trimmed.starts_with("->") || trimmed.starts_with('\u{2192}');
        let comment = trimmed.starts_with("//") || trimmed.starts_with("/*");
        let first_word = trimmed.split_whitespace().next().unwrap_or_default();

        if let Some(block) = &mut when {
            let ends = scan.leading_closes > 0
                || trimmed.starts_with('@')
                || FLOW_STATEMENT_WORDS.contains(&first_word)
                || (block.has_action && !arrow && !comment && column <= block.column);
            if ends {
                when = None;
            } else {
                block.has_action |= !arrow && !comment;
                level += 1;
            }
        }
        if arrow {
            level += 1;
        }
        for _ in 0..level {
            out.push_str(INDENT);
        }
        out.push_str(trimmed);
        out.push('\n');

        depth = (depth + scan.opens).saturating_sub(scan.closes);
        in_comment = scan.in_comment;
        if first_word == "when" {
            when = Some(OpenWhen {
                column,
                has_action: false,
            });
        }
    }
    out
}

/// Whether `src` is already formatted.
pub fn is_formatted(src: &str) -> bool {
    format_source(src) == src
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reindents_by_brace_depth() {
        let src = "domain Sales {\nversion 1.0.0\n      service Orders {\n  version 1.0.0\n}\n}\n";
        assert_eq!(
            format_source(src),
            "domain Sales {\n  version 1.0.0\n  service Orders {\n    version 1.0.0\n  }\n}\n"
        );
    }

    #[test]
    fn collapses_blank_lines_and_trims() {
        let src = "\n\nevent A   \n\n\n\nevent B\n\n\n";
        assert_eq!(format_source(src), "event A\n\nevent B\n");
    }

    #[test]
    fn braces_in_strings_and_comments_are_ignored() {
        let src = "channel c {\naddress \"orders.{env}\" // { not a brace\n/* { */\n}\n";
        assert_eq!(
            format_source(src),
            "channel c {\n  address \"orders.{env}\" // { not a brace\n  /* { */\n}\n"
        );
    }

    #[test]
    fn block_comment_bodies_are_preserved() {
        let src = "/*\n   keep { me\n*/\nevent A\n";
        assert_eq!(format_source(src), src);
    }

    #[test]
    fn arrow_continuations_get_one_more_level() {
        let src = "flow F {\nW\n-> \"ok\": X\n}\n";
        assert_eq!(format_source(src), "flow F {\n  W\n    -> \"ok\": X\n}\n");
    }

    #[test]
    fn when_actions_are_indented_below_the_when() {
        let src = "flow F {\nwhen A\n  Billing\n  -> \"ok\": B\n  Notifier\nCustomer -> X\n}\n";
        assert_eq!(
            format_source(src),
            "flow F {\n  when A\n    Billing\n      -> \"ok\": B\n    Notifier\n  Customer -> X\n}\n"
        );
    }

    #[test]
    fn formatting_keeps_when_block_membership() {
        use crate::parser::parse;
        let src = "flow F {\n      when A\n  Svc -> B\n  Customer -> X -> Y\n    when C\n    Notifier\n}\n";
        let formatted = format_source(src);
        assert_eq!(
            parse(src, "a.ec").program.structure(),
            parse(&formatted, "a.ec").program.structure()
        );
        assert!(is_formatted(&formatted));
    }

    #[test]
    fn formatting_is_idempotent() {
        let src = "service S {\n version 1.0.0\n\n\n   sends event E {\n summary \"s\" }\n}";
        let once = format_source(src);
        assert_eq!(format_source(&once), once);
        assert!(is_formatted(&once));
    }
}
