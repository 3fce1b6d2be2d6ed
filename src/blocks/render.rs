//! Block to text export.

use super::types::{Block, BlockKind, Workspace};

const INDENT: &str = "    ";

/// Render a workspace back to canonical source text.
///
/// Each nesting level is indented by four spaces. Continuation lines of a
/// logical line are emitted verbatim, blank separators are kept, and
/// trailing blank lines are dropped. Lines are joined with `\n` whatever
/// line endings the source used.
pub fn render(workspace: &Workspace) -> String {
    let mut lines = Vec::new();
    for block in workspace.roots() {
        render_block(block, 0, &mut lines);
    }
    while lines.last().is_some_and(String::is_empty) {
        lines.pop();
    }
    lines.join("\n")
}

fn render_block(block: &Block, depth: usize, out: &mut Vec<String>) {
    if block.kind == BlockKind::Blank {
        out.push(String::new());
        return;
    }
    out.push(format!("{}{}", INDENT.repeat(depth), block.header));
    out.extend(block.continuation.iter().cloned());
    for child in &block.children {
        render_block(child, depth + 1, out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blocks::parse;

    fn roundtrip(source: &str) -> String {
        render(&parse(source).unwrap())
    }

    #[test]
    fn test_render_reindents_to_four_spaces() {
        assert_eq!(roundtrip("if x:\n  a\n  if y:\n     b"), "if x:\n    a\n    if y:\n        b");
    }

    #[test]
    fn test_render_drops_trailing_blank_lines() {
        assert_eq!(roundtrip("0\n0\n0\n0\n"), "0\n0\n0\n0");
    }

    #[test]
    fn test_render_keeps_interior_blank_lines() {
        let source = "#hello world!\n# Another comment\n#: int\n\na";
        assert_eq!(roundtrip(source), source);
    }

    #[test]
    fn test_render_preserves_internal_whitespace() {
        assert_eq!(roundtrip("a  = 0"), "a  = 0");
    }

    #[test]
    fn test_render_multiline_string_in_nested_body() {
        let source =
            "class X Alpha:\n    def beta():\n        '''\n        Hello World!\n        Testing.\n        '''";
        assert_eq!(roundtrip(source), source);
    }

    #[test]
    fn test_render_empty_workspace() {
        assert_eq!(render(&Workspace::empty()), "");
    }
}
