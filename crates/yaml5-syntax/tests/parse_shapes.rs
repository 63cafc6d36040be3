//! Integration test: tree shapes and positions produced by the parser.
//!
//! Each tree is rendered as one `kind line:col` line per node, children
//! indented under their parent.

use yaml5_syntax::{parse, Node, NodeKind};

fn render(node: &Node, depth: usize, out: &mut Vec<String>) {
    out.push(format!("{}{} {}", "  ".repeat(depth), node.kind_name(), node.pos));
    match &node.kind {
        NodeKind::Alias { name } => render(name, depth + 1, out),
        NodeKind::Anchor { name, value } => {
            render(name, depth + 1, out);
            render(value, depth + 1, out);
        }
        NodeKind::Tag { value, .. } | NodeKind::MappingKey { key: value } => {
            render(value, depth + 1, out);
        }
        NodeKind::Sequence { items: children, .. } | NodeKind::Mapping { entries: children, .. } => {
            for child in children {
                render(child, depth + 1, out);
            }
        }
        NodeKind::MappingValue { key, value } => {
            render(key, depth + 1, out);
            render(value, depth + 1, out);
        }
        _ => {}
    }
}

fn tree(src: &str) -> String {
    let file = parse(src).expect("source should parse");
    let mut lines = Vec::new();
    for doc in &file.docs {
        lines.push(format!("doc {}", doc.pos));
        render(&doc.body, 1, &mut lines);
    }
    lines.join("\n")
}

#[test]
fn flow_collections_with_anchor_and_alias() {
    insta::assert_snapshot!(tree(r#"{"name": "x", list: [1, &a two, *a]}"#), @r"
    doc 1:1
      mapping 1:1
        mapping-value 1:8
          string 1:2
          string 1:10
        mapping-value 1:19
          string 1:15
          sequence 1:21
            integer 1:22
            anchor 1:25
              string 1:26
              string 1:28
            alias 1:33
              string 1:34
    ");
}

#[test]
fn block_collections() {
    let src = "a: 1\nb:\n  - x\n  - ? k\n    : v\nc: |\n  text\n";
    insta::assert_snapshot!(tree(src), @r"
    doc 1:2
      mapping 1:2
        mapping-value 1:2
          string 1:1
          integer 1:4
        mapping-value 2:2
          string 2:1
          sequence 3:3
            string 3:5
            mapping-value 5:5
              mapping-key 4:5
                string 4:7
              string 5:7
        mapping-value 6:2
          string 6:1
          literal 6:4
    ");
}

#[test]
fn directives_and_documents() {
    let src = "%YAML 1.1\n---\n{}\n---\n!!str x\n";
    insta::assert_snapshot!(tree(src), @r"
    doc 1:1
      directive 1:1
    doc 3:1
      mapping 3:1
    doc 5:1
      tag 5:1
        string 5:7
    ");
}

#[test]
fn missing_values_are_empty_nulls() {
    insta::assert_snapshot!(tree("{a: , b}"), @r"
    doc 1:1
      mapping 1:1
        mapping-value 1:3
          string 1:2
          null 1:4
        mapping-value 1:7
          string 1:7
          null 1:7
    ");
}

#[test]
fn parse_error_reports_position() {
    let err = parse("{\n  \"a\": [1, 2\n}").expect_err("unbalanced brackets");
    assert_eq!(err.to_string(), "expected ',' or ']' in flow sequence at 3:1");
}
