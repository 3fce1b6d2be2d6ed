//! Text to block import.
//!
//! Source is split into logical lines first: a logical line keeps going
//! while a bracket is open, a triple-quoted string is unterminated, or the
//! physical line ends in a backslash. Logical lines are then nested by
//! indentation.

use thiserror::Error;

use super::types::{Block, Workspace};

const TAB_WIDTH: usize = 8;

/// Errors raised while importing text into blocks.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("unterminated triple-quoted string starting on line {line}")]
    UnterminatedString { line: usize },
}

/// Parse source text into a block workspace.
///
/// # Example
///
/// ```
/// use mirrorcheck::blocks::{parse, BlockKind};
///
/// let workspace = parse("for x in y:\n    pass").unwrap();
/// assert_eq!(workspace.roots()[0].kind, BlockKind::Compound);
/// assert_eq!(workspace.block_count(), 2);
/// ```
///
/// # Errors
/// Returns [`ParseError::UnterminatedString`] if the text ends inside a
/// triple-quoted string.
pub fn parse(source: &str) -> Result<Workspace, ParseError> {
    let lines = logical_lines(source)?;
    Ok(Workspace::from_roots(build_tree(lines)))
}

#[derive(Debug)]
struct LogicalLine {
    /// One-based physical line the logical line starts on
    number: usize,
    indent: usize,
    header: String,
    continuation: Vec<String>,
}

impl LogicalLine {
    fn finish(mut self) -> Self {
        if self.continuation.is_empty() {
            let trimmed = self.header.trim_end().len();
            self.header.truncate(trimmed);
        }
        self
    }
}

#[derive(Debug)]
enum Line {
    Blank,
    Logical(LogicalLine),
}

/// Tracks open brackets and strings across physical lines.
#[derive(Debug, Default)]
struct Scanner {
    depth: usize,
    triple: Option<char>,
}

impl Scanner {
    /// Feed one physical line. Returns true if the logical line continues
    /// onto the next physical line.
    fn feed(&mut self, line: &str) -> bool {
        let chars: Vec<char> = line.chars().collect();
        let mut single: Option<char> = None;
        let mut in_comment = false;
        let mut i = 0;
        while i < chars.len() {
            let c = chars[i];
            if let Some(quote) = self.triple {
                if c == '\\' {
                    i += 2;
                    continue;
                }
                if c == quote && opens_triple(&chars, i, quote) {
                    self.triple = None;
                    i += 3;
                    continue;
                }
                i += 1;
                continue;
            }
            if let Some(quote) = single {
                if c == '\\' {
                    i += 2;
                    continue;
                }
                if c == quote {
                    single = None;
                }
                i += 1;
                continue;
            }
            match c {
                '#' => {
                    in_comment = true;
                    break;
                }
                '\'' | '"' => {
                    if opens_triple(&chars, i, c) {
                        self.triple = Some(c);
                        i += 3;
                        continue;
                    }
                    single = Some(c);
                }
                '(' | '[' | '{' => self.depth += 1,
                ')' | ']' | '}' => self.depth = self.depth.saturating_sub(1),
                _ => {}
            }
            i += 1;
        }

        if self.triple.is_some() || self.depth > 0 {
            return true;
        }
        if !in_comment && single.is_none() && chars.last() == Some(&'\\') {
            return true;
        }
        self.depth = 0;
        false
    }
}

fn opens_triple(chars: &[char], i: usize, quote: char) -> bool {
    chars.get(i + 1) == Some(&quote) && chars.get(i + 2) == Some(&quote)
}

fn indent_width(line: &str) -> usize {
    let mut width = 0;
    for c in line.chars() {
        match c {
            ' ' => width += 1,
            '\t' => width = (width / TAB_WIDTH + 1) * TAB_WIDTH,
            _ => break,
        }
    }
    width
}

fn logical_lines(source: &str) -> Result<Vec<Line>, ParseError> {
    let mut out = Vec::new();
    let mut scanner = Scanner::default();
    let mut open: Option<LogicalLine> = None;

    for (idx, raw) in source.lines().enumerate() {
        if let Some(mut line) = open.take() {
            line.continuation.push(raw.to_string());
            if scanner.feed(raw) {
                open = Some(line);
            } else {
                out.push(Line::Logical(line.finish()));
            }
            continue;
        }

        if raw.trim().is_empty() {
            out.push(Line::Blank);
            continue;
        }

        let line = LogicalLine {
            number: idx + 1,
            indent: indent_width(raw),
            header: raw.trim_start().to_string(),
            continuation: Vec::new(),
        };
        if scanner.feed(raw) {
            open = Some(line);
        } else {
            out.push(Line::Logical(line.finish()));
        }
    }

    if let Some(line) = open {
        if scanner.triple.is_some() {
            return Err(ParseError::UnterminatedString { line: line.number });
        }
        // Unclosed brackets at end of input are left for the text side to
        // report; the block keeps what was written.
        out.push(Line::Logical(line.finish()));
    }
    Ok(out)
}

fn build_tree(lines: Vec<Line>) -> Vec<Block> {
    let mut roots = Vec::new();
    let mut stack: Vec<(usize, Block)> = Vec::new();
    let mut pending_blanks = 0usize;

    for line in lines {
        let line = match line {
            Line::Blank => {
                pending_blanks += 1;
                continue;
            }
            Line::Logical(line) => line,
        };

        while stack.last().is_some_and(|(indent, _)| *indent >= line.indent) {
            close_top(&mut stack, &mut roots);
        }

        let siblings = match stack.last_mut() {
            Some((_, parent)) => &mut parent.children,
            None => &mut roots,
        };
        siblings.extend(std::iter::repeat_with(Block::blank).take(pending_blanks));
        pending_blanks = 0;

        stack.push((line.indent, Block::from_logical(line.header, line.continuation)));
    }

    while !stack.is_empty() {
        close_top(&mut stack, &mut roots);
    }
    roots
}

fn close_top(stack: &mut Vec<(usize, Block)>, roots: &mut Vec<Block>) {
    let Some((_, block)) = stack.pop() else {
        return;
    };
    match stack.last_mut() {
        Some((_, parent)) => parent.children.push(block),
        None => roots.push(block),
    }
}
