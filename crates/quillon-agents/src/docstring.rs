//! Docstring cleanup and insertion for generated documentation.
//!
//! Model output arrives with stray code fences or triple quotes more often
//! than not; [`clean_docstring`] normalizes it to the bare body. The splice
//! keeps 1-based function spans valid across edits by carrying a running
//! line offset.

use regex::Regex;

use quillon_core::error::Result;
use quillon_core::types::FunctionRecord;

use crate::extract::signature_end;

/// Strip code fences and surrounding triple quotes from a generated
/// docstring, leaving the body text.
pub fn clean_docstring(raw: &str) -> String {
    let mut doc = raw.trim().to_string();

    let open_fence = Regex::new(r"(?i)^```(?:python)?").unwrap();
    doc = open_fence.replace(&doc, "").trim().to_string();
    let close_fence = Regex::new(r"```$").unwrap();
    doc = close_fence.replace(&doc, "").trim().to_string();

    if let Some(stripped) = doc.strip_prefix("\"\"\"") {
        doc = stripped.trim().to_string();
    }
    if let Some(stripped) = doc.strip_suffix("\"\"\"") {
        doc = stripped.trim().to_string();
    }
    doc
}

/// Splice generated docstrings into the source, one function at a time.
///
/// `approve` is consulted with the function name before each splice; a
/// declined function keeps its current docstring. Existing docstrings are
/// replaced, and the new block lands after the full `def` signature even
/// when the signature spans several lines.
pub fn apply_docstrings<F>(
    source: &str,
    functions: &[FunctionRecord],
    docstrings: &[String],
    mut approve: F,
) -> Result<String>
where
    F: FnMut(&str) -> Result<bool>,
{
    let mut lines: Vec<String> = source.lines().map(str::to_string).collect();
    let mut offset: i64 = 0;

    for (func, raw_doc) in functions.iter().zip(docstrings.iter()) {
        if !approve(&func.name)? {
            continue;
        }

        let start = (func.start_line as i64 - 1 + offset) as usize;
        let end = (func.end_line as i64 - 1 + offset) as usize;
        let func_lines: Vec<&str> = lines[start..=end].iter().map(String::as_str).collect();

        let sig_end = signature_end(&func_lines);
        let body_start = sig_end + 1;
        let body_idx = match existing_docstring_end(&func_lines, body_start) {
            Some(doc_end) => doc_end + 1,
            None => body_start,
        };

        let inner_indent = format!("{}    ", func.indentation);
        let clean = clean_docstring(raw_doc);

        let mut new_func_lines: Vec<String> = func_lines[..=sig_end]
            .iter()
            .map(|l| l.to_string())
            .collect();
        new_func_lines.push(format!("{}\"\"\"", inner_indent));
        for doc_line in clean.lines() {
            new_func_lines.push(format!("{}{}", inner_indent, doc_line));
        }
        new_func_lines.push(format!("{}\"\"\"", inner_indent));
        new_func_lines.extend(func_lines[body_idx.min(func_lines.len())..].iter().map(|l| l.to_string()));

        offset += new_func_lines.len() as i64 - func_lines.len() as i64;
        lines.splice(start..=end, new_func_lines);
    }

    Ok(lines.join("\n"))
}

/// Index (within the function's lines) of the last line of an existing
/// docstring starting at `body_start`, or `None` when the body does not
/// open with one.
fn existing_docstring_end(func_lines: &[&str], body_start: usize) -> Option<usize> {
    let first = func_lines.get(body_start)?.trim_start();
    let quote = if first.starts_with("\"\"\"") {
        "\"\"\""
    } else if first.starts_with("'''") {
        "'''"
    } else {
        return None;
    };

    // Single-line docstring closes on its own line
    let rest = &first[quote.len()..];
    if rest.contains(quote) {
        return Some(body_start);
    }

    for (idx, line) in func_lines.iter().enumerate().skip(body_start + 1) {
        if line.contains(quote) {
            return Some(idx);
        }
    }
    // Unterminated docstring: treat the opening line as the whole of it
    Some(body_start)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::extract_functions;

    fn always(_: &str) -> Result<bool> {
        Ok(true)
    }

    #[test]
    fn test_clean_strips_fences_and_quotes() {
        assert_eq!(
            clean_docstring("```python\n\"\"\"Adds two numbers.\"\"\"\n```"),
            "Adds two numbers."
        );
        assert_eq!(clean_docstring("```\nPlain body.\n```"), "Plain body.");
        assert_eq!(clean_docstring("  Already clean.  "), "Already clean.");
        assert_eq!(clean_docstring("\"\"\"Quoted only.\"\"\""), "Quoted only.");
    }

    #[test]
    fn test_clean_keeps_interior_content() {
        let doc = "Summary line.\n\nArgs:\n    a (int): Left operand.";
        assert_eq!(clean_docstring(doc), doc);
    }

    #[test]
    fn test_inserts_docstring_after_def_line() {
        let source = "def add(a, b):\n    return a + b\n";
        let functions = extract_functions(source).unwrap();
        let docs = vec!["Adds two numbers.".to_string()];

        let updated = apply_docstrings(source, &functions, &docs, always).unwrap();
        let expected = "\
def add(a, b):
    \"\"\"
    Adds two numbers.
    \"\"\"
    return a + b";
        assert_eq!(updated, expected);
    }

    #[test]
    fn test_replaces_existing_single_line_docstring() {
        let source = "def add(a, b):\n    \"\"\"old\"\"\"\n    return a + b\n";
        let functions = extract_functions(source).unwrap();
        let docs = vec!["New body.".to_string()];

        let updated = apply_docstrings(source, &functions, &docs, always).unwrap();
        assert!(updated.contains("New body."));
        assert!(!updated.contains("old"));
        assert!(updated.contains("return a + b"));
    }

    #[test]
    fn test_replaces_existing_multi_line_docstring() {
        let source = "\
def add(a, b):
    \"\"\"Old summary.

    Old details.
    \"\"\"
    return a + b
";
        let functions = extract_functions(source).unwrap();
        let docs = vec!["Fresh.".to_string()];

        let updated = apply_docstrings(source, &functions, &docs, always).unwrap();
        assert!(updated.contains("Fresh."));
        assert!(!updated.contains("Old summary."));
        assert!(!updated.contains("Old details."));
    }

    #[test]
    fn test_method_docstring_gets_nested_indent() {
        let source = "\
class C:
    def m(self):
        return 1
";
        let functions = extract_functions(source).unwrap();
        let docs = vec!["Does m.".to_string()];

        let updated = apply_docstrings(source, &functions, &docs, always).unwrap();
        assert!(updated.contains("        \"\"\""));
        assert!(updated.contains("        Does m."));
    }

    #[test]
    fn test_multi_line_signature_keeps_signature_intact() {
        let source = "\
def long(
    a,
    b,
):
    return a + b
";
        let functions = extract_functions(source).unwrap();
        let docs = vec!["Long one.".to_string()];

        let updated = apply_docstrings(source, &functions, &docs, always).unwrap();
        let lines: Vec<&str> = updated.lines().collect();
        assert_eq!(lines[3], "):");
        assert_eq!(lines[4], "    \"\"\"");
        assert_eq!(lines[5], "    Long one.");
    }

    #[test]
    fn test_declined_function_is_left_alone() {
        let source = "def a():\n    pass\n\ndef b():\n    pass\n";
        let functions = extract_functions(source).unwrap();
        let docs = vec!["Doc a.".to_string(), "Doc b.".to_string()];

        let updated = apply_docstrings(source, &functions, &docs, |name| Ok(name == "b")).unwrap();
        assert!(!updated.contains("Doc a."));
        assert!(updated.contains("Doc b."));
    }

    #[test]
    fn test_offset_tracks_across_multiple_functions() {
        let source = "def a():\n    pass\n\ndef b():\n    pass\n";
        let functions = extract_functions(source).unwrap();
        let docs = vec!["Doc a.".to_string(), "Doc b.".to_string()];

        let updated = apply_docstrings(source, &functions, &docs, always).unwrap();
        let expected = "\
def a():
    \"\"\"
    Doc a.
    \"\"\"
    pass

def b():
    \"\"\"
    Doc b.
    \"\"\"
    pass";
        assert_eq!(updated, expected);
    }
}
