//! Core block types.

use serde::Serialize;

/// What a block represents in the workspace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockKind {
    /// A simple statement or expression
    Statement,
    /// A statement that opens a body (`if`, `for`, `def`, ...)
    Compound,
    /// A `#` comment on its own line
    Comment,
    /// A blank separator line
    Blank,
}

/// One block: a logical source line plus its nested body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Block {
    pub kind: BlockKind,
    /// First physical line, without indentation
    pub header: String,
    /// Further physical lines of the same logical line, kept verbatim
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub continuation: Vec<String>,
    /// Nested body
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Block>,
}

impl Block {
    pub(crate) fn blank() -> Self {
        Self {
            kind: BlockKind::Blank,
            header: String::new(),
            continuation: Vec::new(),
            children: Vec::new(),
        }
    }

    pub(crate) fn from_logical(header: String, continuation: Vec<String>) -> Self {
        let kind = classify(&header, &continuation);
        Self {
            kind,
            header,
            continuation,
            children: Vec::new(),
        }
    }

    /// Number of blocks in this subtree, this one included.
    pub fn size(&self) -> usize {
        1 + self.children.iter().map(Self::size).sum::<usize>()
    }
}

fn classify(header: &str, continuation: &[String]) -> BlockKind {
    if header.starts_with('#') {
        return BlockKind::Comment;
    }
    let last = continuation.last().map_or(header, String::as_str);
    if last.trim_end().ends_with(':') {
        BlockKind::Compound
    } else {
        BlockKind::Statement
    }
}

/// The block side of a converter: an ordered forest of top-level blocks.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Workspace {
    roots: Vec<Block>,
}

impl Workspace {
    /// Create an empty workspace.
    pub const fn empty() -> Self {
        Self { roots: Vec::new() }
    }

    pub(crate) const fn from_roots(roots: Vec<Block>) -> Self {
        Self { roots }
    }

    /// Top-level blocks in source order.
    pub fn roots(&self) -> &[Block] {
        &self.roots
    }

    /// Total number of blocks, nested ones included.
    pub fn block_count(&self) -> usize {
        self.roots.iter().map(Block::size).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }
}
