//! Python synopsis via tree-sitter.

use super::{Summary, SYNTAX_ERROR_MESSAGE};
use crate::IndexerError;
use tracing::debug;

const LANGUAGE: &str = "Python";

#[derive(Debug, Default)]
struct PythonOutline {
    imports: Vec<String>,
    local_imports: Vec<String>,
    definitions: Vec<String>,
}

/// Summarize Python source. Syntax errors yield an error summary.
pub(super) fn summarize(content: &str) -> Summary {
    match outline(content) {
        Ok(o) => Summary::Python {
            imports: o.imports,
            local_imports: o.local_imports,
            definitions: o.definitions,
        },
        Err(e) => {
            debug!(error = %e, "Python summary failed");
            Summary::error(SYNTAX_ERROR_MESSAGE)
        }
    }
}

fn outline(content: &str) -> Result<PythonOutline, IndexerError> {
    let mut parser = tree_sitter::Parser::new();
    parser
        .set_language(&tree_sitter_python::LANGUAGE.into())
        .map_err(|e| IndexerError::Parse {
            language: LANGUAGE,
            message: format!("Failed to set language: {}", e),
        })?;

    let tree = parser
        .parse(content, None)
        .ok_or_else(|| IndexerError::Parse {
            language: LANGUAGE,
            message: "Failed to parse content".to_string(),
        })?;

    let root = tree.root_node();
    if root.has_error() {
        return Err(IndexerError::Parse {
            language: LANGUAGE,
            message: "syntax error".to_string(),
        });
    }

    let src = content.as_bytes();
    let mut out = PythonOutline::default();
    collect_imports(root, src, &mut out);

    let mut cursor = root.walk();
    for child in root.named_children(&mut cursor) {
        if let Some(sig) = definition_signature(child, src) {
            out.definitions.push(sig);
        }
    }

    Ok(out)
}

/// Imports anywhere in the module, including inside functions and branches.
fn collect_imports(node: tree_sitter::Node, src: &[u8], out: &mut PythonOutline) {
    match node.kind() {
        "import_statement" => {
            let mut cursor = node.walk();
            for name in node.children_by_field_name("name", &mut cursor) {
                let module = if name.kind() == "aliased_import" {
                    name.child_by_field_name("name")
                } else {
                    Some(name)
                };
                if let Some(module) = module.and_then(|m| text(m, src)) {
                    push_unique(&mut out.imports, module);
                }
            }
        }
        "import_from_statement" => {
            if let Some(module) = node.child_by_field_name("module_name") {
                if let Some(name) = text(module, src) {
                    if module.kind() == "relative_import" {
                        push_unique(&mut out.local_imports, name);
                    } else {
                        push_unique(&mut out.imports, name);
                    }
                }
            }
        }
        "future_import_statement" => {
            push_unique(&mut out.imports, "__future__".to_string());
        }
        _ => {
            let mut cursor = node.walk();
            for child in node.named_children(&mut cursor) {
                collect_imports(child, src, out);
            }
        }
    }
}

fn definition_signature(node: tree_sitter::Node, src: &[u8]) -> Option<String> {
    match node.kind() {
        "function_definition" => {
            let name = text(node.child_by_field_name("name")?, src)?;
            Some(format!("def {}(...):", name))
        }
        "class_definition" => {
            let name = text(node.child_by_field_name("name")?, src)?;
            Some(format!("class {}:", name))
        }
        "decorated_definition" => {
            definition_signature(node.child_by_field_name("definition")?, src)
        }
        _ => None,
    }
}

/// Node text with interior whitespace removed ("from . pkg" style spacing).
fn text(node: tree_sitter::Node, src: &[u8]) -> Option<String> {
    let raw = node.utf8_text(src).ok()?;
    let cleaned: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
    if cleaned.is_empty() {
        None
    } else {
        Some(cleaned)
    }
}

fn push_unique(list: &mut Vec<String>, item: String) {
    if !list.contains(&item) {
        list.push(item);
    }
}
