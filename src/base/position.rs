/// Position tracking for declarations and call sites
///
/// Stores the source location (line/column) of methods, fields and call
/// expressions so results can point back into the code.
use std::fmt;

use super::FileId;

/// A position in source code (0-indexed)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Position {
    pub line: u32,
    pub column: u32,
}

impl Position {
    pub fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }
}

/// A position inside a specific file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct CodeLocation {
    pub file: FileId,
    pub position: Position,
}

impl CodeLocation {
    pub fn new(file: FileId, line: u32, column: u32) -> Self {
        Self {
            file,
            position: Position::new(line, column),
        }
    }

    pub fn line(&self) -> u32 {
        self.position.line
    }
}

impl fmt::Display for CodeLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}",
            self.file, self.position.line, self.position.column
        )
    }
}
