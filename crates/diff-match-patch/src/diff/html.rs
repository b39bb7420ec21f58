//! HTML rendering of an edit script.

use super::{Diff, Op};

/// Pretty-prints a script as HTML, with insertions and deletions on tinted
/// backgrounds and newlines shown as pilcrows.
pub fn pretty_html(diffs: &[Diff]) -> String {
    let mut html = String::new();
    for d in diffs {
        let text = d
            .text()
            .replace('&', "&amp;")
            .replace('<', "&lt;")
            .replace('>', "&gt;")
            .replace('\n', "&para;<br>");
        match d.op {
            Op::Insert => {
                html.push_str("<ins style=\"background:#e6ffe6;\">");
                html.push_str(&text);
                html.push_str("</ins>");
            }
            Op::Delete => {
                html.push_str("<del style=\"background:#ffe6e6;\">");
                html.push_str(&text);
                html.push_str("</del>");
            }
            Op::Equal => {
                html.push_str("<span>");
                html.push_str(&text);
                html.push_str("</span>");
            }
        }
    }
    html
}
