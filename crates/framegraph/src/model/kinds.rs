//! Core enums: frame kinds, edge kinds, provenance tags, confidence tiers.

use serde::{Deserialize, Serialize};

/// In-session handle for a frame in the arena (monotonic counter).
pub type FrameId = u64;

/// In-session identifier for an edge (monotonic counter).
pub type EdgeId = u64;

/// Kind of a frame in the semantic graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FrameKind {
    /// Root of one indexed source tree
    Codebase,
    /// Per-language root under the codebase
    Language,
    /// Package, module, or namespace
    Package,
    /// Class, struct, or type definition
    Class,
    /// Function, method, or procedure
    Callable,
    /// Anonymous lexical scope
    Scope,
    /// `if` branch
    IfBlock,
    /// `elif`/`else if` branch
    ElifBlock,
    /// `else` branch
    ElseBlock,
    /// `for` loop body
    ForLoop,
    /// `while` loop body
    WhileLoop,
    /// `try` body
    TryBlock,
    /// `except`/`catch` handler
    ExceptBlock,
    /// `finally` body
    FinallyBlock,
    /// `switch`/`match` body
    SwitchBlock,
    /// One `case` arm
    CaseBlock,
    /// `with`/resource-scoped body
    WithBlock,
}

impl FrameKind {
    /// Control-flow frames have no stable name; they are keyed by location.
    pub fn is_control_flow(&self) -> bool {
        matches!(
            self,
            FrameKind::IfBlock
                | FrameKind::ElifBlock
                | FrameKind::ElseBlock
                | FrameKind::ForLoop
                | FrameKind::WhileLoop
                | FrameKind::TryBlock
                | FrameKind::ExceptBlock
                | FrameKind::FinallyBlock
                | FrameKind::SwitchBlock
                | FrameKind::CaseBlock
                | FrameKind::WithBlock
        )
    }

    /// Structural frames organize the tree above file contents.
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            FrameKind::Codebase | FrameKind::Language | FrameKind::Package
        )
    }

    /// Frames that open a containment scope on the frame stack.
    pub fn creates_context(&self) -> bool {
        matches!(
            self,
            FrameKind::Package | FrameKind::Class | FrameKind::Callable | FrameKind::Scope
        ) || self.is_control_flow()
    }

    /// Frames whose qualified name participates in symbol resolution.
    pub fn is_semantic(&self) -> bool {
        matches!(
            self,
            FrameKind::Package | FrameKind::Class | FrameKind::Callable
        )
    }
}

impl std::fmt::Display for FrameKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            FrameKind::Codebase => "CODEBASE",
            FrameKind::Language => "LANGUAGE",
            FrameKind::Package => "PACKAGE",
            FrameKind::Class => "CLASS",
            FrameKind::Callable => "CALLABLE",
            FrameKind::Scope => "SCOPE",
            FrameKind::IfBlock => "IF_BLOCK",
            FrameKind::ElifBlock => "ELIF_BLOCK",
            FrameKind::ElseBlock => "ELSE_BLOCK",
            FrameKind::ForLoop => "FOR_LOOP",
            FrameKind::WhileLoop => "WHILE_LOOP",
            FrameKind::TryBlock => "TRY_BLOCK",
            FrameKind::ExceptBlock => "EXCEPT_BLOCK",
            FrameKind::FinallyBlock => "FINALLY_BLOCK",
            FrameKind::SwitchBlock => "SWITCH_BLOCK",
            FrameKind::CaseBlock => "CASE_BLOCK",
            FrameKind::WithBlock => "WITH_BLOCK",
        };
        write!(f, "{name}")
    }
}

/// Kind of a typed relationship between two frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EdgeKind {
    /// Parent contains child (hierarchy)
    Contains,
    /// Package imports package/symbol
    Imports,
    /// Callable calls callable
    Calls,
    /// Class inherits from class
    Inherits,
    /// Class implements interface/trait
    Implements,
    /// Callable reads or writes a class field
    Uses,
}

impl std::fmt::Display for EdgeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            EdgeKind::Contains => "CONTAINS",
            EdgeKind::Imports => "IMPORTS",
            EdgeKind::Calls => "CALLS",
            EdgeKind::Inherits => "INHERITS",
            EdgeKind::Implements => "IMPLEMENTS",
            EdgeKind::Uses => "USES",
        };
        write!(f, "{name}")
    }
}

/// How a frame or edge was derived. Seeds its confidence score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Provenance {
    /// Directly extracted from source
    Parsed,
    /// Followed from an import statement
    Imported,
    /// Deduced from usage, not declaration
    Inferred,
    /// Placeholder for a symbol outside the indexed tree
    External,
    /// Created while degrading from a parse failure
    ParseFailed,
    /// Import whose target could not be located
    UnknownImport,
    /// Placeholder created while walking a relative import
    RelativeImport,
}

impl Provenance {
    /// Stable string form used in store rows and edge metadata.
    pub fn as_str(&self) -> &'static str {
        match self {
            Provenance::Parsed => "parsed",
            Provenance::Imported => "imported",
            Provenance::Inferred => "inferred",
            Provenance::External => "external",
            Provenance::ParseFailed => "parse_failed",
            Provenance::UnknownImport => "unknown_import",
            Provenance::RelativeImport => "relative_import",
        }
    }
}

impl std::fmt::Display for Provenance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Coarse trust bucket derived from a continuous confidence score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConfidenceTier {
    High,
    Medium,
    Low,
    Speculative,
}

impl ConfidenceTier {
    /// Bucket a score: HIGH >= 0.8, MEDIUM >= 0.5, LOW >= 0.2, else SPECULATIVE.
    pub fn from_score(score: f64) -> Self {
        if score >= 0.8 {
            ConfidenceTier::High
        } else if score >= 0.5 {
            ConfidenceTier::Medium
        } else if score >= 0.2 {
            ConfidenceTier::Low
        } else {
            ConfidenceTier::Speculative
        }
    }
}

impl std::fmt::Display for ConfidenceTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ConfidenceTier::High => "HIGH",
            ConfidenceTier::Medium => "MEDIUM",
            ConfidenceTier::Low => "LOW",
            ConfidenceTier::Speculative => "SPECULATIVE",
        };
        write!(f, "{name}")
    }
}
