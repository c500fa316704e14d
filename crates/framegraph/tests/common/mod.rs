//! Shared test fixture: a tiny indentation-based Python front-end.
//!
//! Good enough to exercise the pipeline end to end: classes, functions,
//! and control-flow blocks become raw nodes scoped by indentation, and
//! everything else stays part of the enclosing block's content. Lines
//! indented by anything other than a multiple of four are rejected so
//! tests can trigger per-file parse failures on demand.

use framegraph_parser_api::{LanguageParser, ParserError, ParserResult, RawNode};
use std::fs;
use std::path::{Path, PathBuf};

pub struct PyLiteParser;

struct SourceLine<'a> {
    text: &'a str,
    indent: usize,
    start_byte: usize,
    number: usize,
}

impl PyLiteParser {
    fn classify(text: &str) -> Option<&'static str> {
        if text.starts_with("class ") {
            Some("class_definition")
        } else if text.starts_with("def ") || text.starts_with("async def ") {
            Some("function_definition")
        } else if text.starts_with("if ") {
            Some("if_statement")
        } else if text.starts_with("elif ") {
            Some("elif_clause")
        } else if text.starts_with("else") && text.trim_end().ends_with(':') {
            Some("else_clause")
        } else if text.starts_with("for ") {
            Some("for_statement")
        } else if text.starts_with("while ") {
            Some("while_statement")
        } else if text.starts_with("try") && text.trim_end().ends_with(':') {
            Some("try_statement")
        } else if text.starts_with("except") {
            Some("except_clause")
        } else if text.starts_with("finally") {
            Some("finally_clause")
        } else if text.starts_with("with ") {
            Some("with_statement")
        } else {
            None
        }
    }

    fn scan_lines<'a>(source: &'a str, path: &Path) -> ParserResult<Vec<SourceLine<'a>>> {
        let mut lines = Vec::new();
        let mut offset = 0;
        for (index, raw) in source.lines().enumerate() {
            let start_byte = offset;
            offset += raw.len() + 1;

            let trimmed = raw.trim_start();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            let indent = raw.len() - trimmed.len();
            if indent % 4 != 0 {
                return Err(ParserError::Syntax(
                    path.to_path_buf(),
                    index + 1,
                    indent,
                    format!("indentation of {indent} is not a multiple of four"),
                ));
            }
            lines.push(SourceLine {
                text: trimmed,
                indent,
                start_byte,
                number: index + 1,
            });
        }
        Ok(lines)
    }

    fn parse_block(
        source: &str,
        path: &Path,
        lines: &[SourceLine<'_>],
        lo: usize,
        hi: usize,
        parent: usize,
        nodes: &mut Vec<RawNode>,
    ) {
        let mut i = lo;
        while i < hi {
            let line = &lines[i];
            let kind = match Self::classify(line.text) {
                Some(kind) => kind,
                None => {
                    i += 1;
                    continue;
                }
            };

            let mut j = i + 1;
            while j < hi && lines[j].indent > line.indent {
                j += 1;
            }
            let last = &lines[j - 1];
            let end_byte = last.start_byte + last.text.len() + last.indent;

            let index = nodes.len();
            nodes.push(RawNode {
                kind: kind.to_string(),
                start_line: line.number,
                end_line: last.number,
                start_byte: line.start_byte,
                end_byte,
                content: source[line.start_byte..end_byte].to_string(),
                file_path: path.to_path_buf(),
                children: Vec::new(),
                parent: Some(parent),
            });
            nodes[parent].children.push(index);
            Self::parse_block(source, path, lines, i + 1, j, index, nodes);
            i = j;
        }
    }
}

impl LanguageParser for PyLiteParser {
    fn language(&self) -> &'static str {
        "python"
    }

    fn file_extensions(&self) -> &[&'static str] {
        &["py"]
    }

    fn extract_raw_nodes(&self, path: &Path) -> ParserResult<Vec<RawNode>> {
        let source =
            fs::read_to_string(path).map_err(|e| ParserError::Io(path.to_path_buf(), e))?;
        self.extract_from_source(&source, path)
    }

    fn extract_from_source(&self, source: &str, path: &Path) -> ParserResult<Vec<RawNode>> {
        let lines = Self::scan_lines(source, path)?;
        let mut nodes = vec![RawNode {
            kind: "module".to_string(),
            start_line: 1,
            end_line: source.lines().count().max(1),
            start_byte: 0,
            end_byte: source.len(),
            content: source.to_string(),
            file_path: path.to_path_buf(),
            children: Vec::new(),
            parent: None,
        }];
        Self::parse_block(source, path, &lines, 0, lines.len(), 0, &mut nodes);
        Ok(nodes)
    }
}

/// Write one source file under `dir`, creating parent directories.
pub fn write_file(dir: &Path, relative: &str, content: &str) -> PathBuf {
    let path = dir.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, content).unwrap();
    path
}
