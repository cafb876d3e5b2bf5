//! AST-based function extraction using tree-sitter's Python grammar

use tree_sitter::{Node, Parser};
use trickle_core::SubUnit;

/// A function definition found in the tree, with the row its text starts at
/// (the first decorator for decorated functions)
struct FoundDef<'tree> {
    def: Node<'tree>,
    start_row: usize,
}

// ─── Public entry point ───────────────────────────────────────────────────────

/// Parses Python source and returns one sub-unit per function, in source order.
///
/// Collected: module-level functions and methods of (possibly nested) classes.
/// Functions nested inside other functions stay part of their parent.
/// Returns an empty Vec when the source has syntax errors.
pub fn extract_functions(path: &str, content: &str) -> Vec<SubUnit> {
    let mut parser = Parser::new();
    if let Err(e) = parser.set_language(&tree_sitter_python::LANGUAGE.into()) {
        log::warn!("[AST] failed to load Python grammar: {}", e);
        return vec![];
    }

    let Some(tree) = parser.parse(content, None) else {
        log::debug!("[AST] parser gave up on '{}'", path);
        return vec![];
    };

    let root = tree.root_node();
    if root.has_error() {
        log::debug!("[AST] syntax error(s) in '{}', no sub-units", path);
        return vec![];
    }
    if !indentation_is_consistent(root) {
        log::debug!("[AST] inconsistent indentation in '{}', no sub-units", path);
        return vec![];
    }

    let mut found = Vec::new();
    collect_defs(root, &mut found);

    let lines: Vec<&str> = content.lines().collect();
    let source = content.as_bytes();
    let mut units = Vec::with_capacity(found.len());
    let mut floor = 0;

    for FoundDef { def, start_row } in found {
        let Some(name) = def
            .child_by_field_name("name")
            .and_then(|n| n.utf8_text(source).ok())
        else {
            continue;
        };

        let end = def.end_position();
        let mut end_row = end.row;
        if end.column == 0 && end_row > start_row {
            end_row -= 1;
        }
        let end_row = end_row.min(lines.len().saturating_sub(1));

        let start_row = extend_over_comments(&lines, start_row, floor);
        if start_row > end_row {
            continue;
        }

        units.push(SubUnit::new(units.len(), name, lines[start_row..=end_row].join("\n")));
        floor = end_row + 1;
    }

    units
}

// ─── Tree walk ────────────────────────────────────────────────────────────────

fn collect_defs<'tree>(node: Node<'tree>, found: &mut Vec<FoundDef<'tree>>) {
    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        match child.kind() {
            "function_definition" => found.push(FoundDef {
                def: child,
                start_row: child.start_position().row,
            }),
            "decorated_definition" => match child.child_by_field_name("definition") {
                Some(def) if def.kind() == "function_definition" => found.push(FoundDef {
                    def,
                    start_row: child.start_position().row,
                }),
                // Decorated class: look for methods inside
                _ => collect_defs(child, found),
            },
            _ => collect_defs(child, found),
        }
    }
}

// ─── Indentation ──────────────────────────────────────────────────────────────

/// Clauses that must line up with the statement they continue
const CLAUSE_KINDS: &[&str] = &[
    "elif_clause",
    "else_clause",
    "except_clause",
    "except_group_clause",
    "finally_clause",
];

/// Checks the layouts CPython rejects with `IndentationError`
///
/// tree-sitter-python recovers from these without any error node:
/// - module-level statements must start at column 0
/// - a body on its own lines must be indented past its header
/// - statements of one body, and a decorator stack, share one column
/// - a body cannot be empty
fn indentation_is_consistent(root: Node<'_>) -> bool {
    lines_up(&statements_of(root), 0) && descendants_consistent(root)
}

fn descendants_consistent(node: Node<'_>) -> bool {
    let mut cursor = node.walk();
    let children: Vec<Node<'_>> = node.named_children(&mut cursor).collect();
    children
        .into_iter()
        .all(|child| node_is_consistent(child) && descendants_consistent(child))
}

fn node_is_consistent(node: Node<'_>) -> bool {
    let kind = node.kind();
    if kind == "block" {
        return block_is_consistent(node);
    }
    if kind == "decorated_definition" {
        return lines_up(&statements_of(node), node.start_position().column);
    }
    if CLAUSE_KINDS.contains(&kind) {
        if let Some(parent) = node.parent() {
            let start = node.start_position();
            return start.row == parent.start_position().row
                || start.column == parent.start_position().column;
        }
    }
    true
}

fn block_is_consistent(block: Node<'_>) -> bool {
    let statements = statements_of(block);
    let Some(first) = statements.first() else {
        return false;
    };

    // Row of the `:` ending the header
    let header_row = block
        .prev_sibling()
        .or_else(|| block.parent())
        .map(|n| n.end_position().row)
        .unwrap_or(0);
    if first.start_position().row == header_row {
        // Body written on the header line: `if ready: go()`
        return true;
    }

    let header_column = block.parent().map(|p| p.start_position().column).unwrap_or(0);
    let column = first.start_position().column;
    column > header_column && lines_up(&statements, column)
}

/// True when every statement starting a new line starts at `column`
fn lines_up(statements: &[Node<'_>], column: usize) -> bool {
    let mut previous_end_row = None;
    for statement in statements {
        let start = statement.start_position();
        if previous_end_row != Some(start.row) && start.column != column {
            return false;
        }
        previous_end_row = Some(statement.end_position().row);
    }
    true
}

/// Named children other than comments, which may sit at any column
fn statements_of<'tree>(node: Node<'tree>) -> Vec<Node<'tree>> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor)
        .filter(|child| child.kind() != "comment")
        .collect()
}

/// Moves `start_row` up over comment lines directly above it, never past `floor`
fn extend_over_comments(lines: &[&str], mut start_row: usize, floor: usize) -> usize {
    while start_row > floor
        && lines
            .get(start_row - 1)
            .map(|line| line.trim_start().starts_with('#'))
            .unwrap_or(false)
    {
        start_row -= 1;
    }
    start_row
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(source: &str) -> tree_sitter::Tree {
        let mut parser = Parser::new();
        parser
            .set_language(&tree_sitter_python::LANGUAGE.into())
            .unwrap();
        parser.parse(source, None).unwrap()
    }

    #[test]
    fn test_well_indented_source_is_consistent() {
        let source = "\
import os


class Box:
    # size in cm
    @staticmethod
    @cached
    def size():
        if os.name:  # posix
            return 1
        elif True: return 2
        else:
            return 3

    def empty(self): pass


try:
    x = 1; y = 2
except ValueError:
    pass
finally:
    pass
";
        assert!(indentation_is_consistent(parse(source).root_node()));
    }

    #[test]
    fn test_misaligned_clause_is_inconsistent() {
        let source = "if a:\n    pass\n  else:\n    pass\n";
        let tree = parse(source);
        assert!(tree.root_node().has_error() || !indentation_is_consistent(tree.root_node()));
    }

    #[test]
    fn test_extend_over_comments_stops_at_blank_line() {
        let lines = ["# unrelated", "", "# attached", "def f():", "    pass"];
        assert_eq!(extend_over_comments(&lines, 3, 0), 2);
    }

    #[test]
    fn test_extend_over_comments_respects_floor() {
        let lines = ["# a", "# b", "def f():"];
        assert_eq!(extend_over_comments(&lines, 2, 1), 1);
    }
}
