//! Line-based extraction of Python function definitions.
//!
//! The scanner walks the file once and records every `def` (nested ones
//! included) with its 1-based line span, source text, and the indentation of
//! the `def` line. It does not validate Python syntax; a file with no
//! recognizable functions is rejected during the prepare phase.

use std::fs;
use std::path::Path;

use regex::Regex;

use quillon_core::error::{QuillonError, Result};
use quillon_core::types::FunctionRecord;

/// Read a source file, failing with a preparation error when it is absent.
pub fn read_source(path: &Path) -> Result<String> {
    if !path.is_file() {
        return Err(QuillonError::Preparation(format!(
            "File not found: {}",
            path.display()
        )));
    }
    fs::read_to_string(path)
        .map_err(|e| QuillonError::Preparation(format!("Failed to read {}: {}", path.display(), e)))
}

/// Extract every function definition from Python source.
///
/// Errors when the source contains no functions at all; callers treat that
/// as an input problem, not an empty result.
pub fn extract_functions(source: &str) -> Result<Vec<FunctionRecord>> {
    let functions = scan_functions(source);
    if functions.is_empty() {
        return Err(QuillonError::Preparation(
            "No functions found in the file.".to_string(),
        ));
    }
    Ok(functions)
}

fn scan_functions(source: &str) -> Vec<FunctionRecord> {
    // A def inside a triple-quoted string will be picked up too; callers
    // accept that limitation.
    let pattern = Regex::new(r"^(\s*)(?:async\s+)?def\s+([A-Za-z_][A-Za-z0-9_]*)\s*\(").unwrap();
    let lines: Vec<&str> = source.lines().collect();
    let mut functions = Vec::new();

    for (idx, line) in lines.iter().enumerate() {
        let captures = match pattern.captures(line) {
            Some(c) => c,
            None => continue,
        };
        let indentation = captures[1].to_string();
        let name = captures[2].to_string();
        let end_idx = block_end(&lines, idx, indentation.len());

        functions.push(FunctionRecord {
            name,
            source: lines[idx..=end_idx].join("\n"),
            start_line: idx + 1,
            end_line: end_idx + 1,
            indentation,
        });
    }

    functions
}

/// Index of the last line belonging to the block opened at `def_idx`.
///
/// A block ends before the first non-blank line indented at or left of the
/// `def` line. Trailing blank lines are not part of the block.
fn block_end(lines: &[&str], def_idx: usize, def_indent: usize) -> usize {
    let mut last = def_idx;
    for (idx, line) in lines.iter().enumerate().skip(def_idx + 1) {
        if line.trim().is_empty() {
            continue;
        }
        let indent = line.len() - line.trim_start().len();
        if indent <= def_indent {
            break;
        }
        last = idx;
    }
    last
}

/// Index (relative to the function's first line) of the line where the `def`
/// signature ends, tracking brackets so multi-line signatures work.
pub fn signature_end(func_lines: &[&str]) -> usize {
    let mut depth: i32 = 0;
    for (idx, line) in func_lines.iter().enumerate() {
        for ch in line.chars() {
            match ch {
                '(' | '[' | '{' => depth += 1,
                ')' | ']' | '}' => depth -= 1,
                _ => {}
            }
        }
        if depth <= 0 && line.trim_end().ends_with(':') {
            return idx;
        }
    }
    0
}
