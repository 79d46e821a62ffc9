use std::collections::VecDeque;
use std::fmt;

use crate::ast::{Ast, AstNode, NodeIdx, NodeKind, TermValue};

/// Predicate deciding whether a walk descends into a symbol
pub type Filter<'a> = &'a dyn Fn(&AstNode) -> bool;

/// Callbacks for tree walks. Every hook defaults to doing nothing, and the
/// per-kind term hooks fall through to `visit_term`.
pub trait Visitor {
  fn visit_symbol(&mut self, _ast: &Ast, _idx: NodeIdx) {}

  /// Called once a symbol's subtree has been walked depth-first
  fn leave_symbol(&mut self, _ast: &Ast, _idx: NodeIdx) {}

  fn visit_term(&mut self, _ast: &Ast, _idx: NodeIdx) {}

  fn visit_int(&mut self, ast: &Ast, idx: NodeIdx, _value: i64) {
    self.visit_term(ast, idx)
  }

  fn visit_float(&mut self, ast: &Ast, idx: NodeIdx, _value: f32) {
    self.visit_term(ast, idx)
  }

  fn visit_string(&mut self, ast: &Ast, idx: NodeIdx, _value: &str) {
    self.visit_term(ast, idx)
  }

  fn visit_char(&mut self, ast: &Ast, idx: NodeIdx, _value: char) {
    self.visit_term(ast, idx)
  }

  fn visit_ident(&mut self, ast: &Ast, idx: NodeIdx, _value: &str) {
    self.visit_term(ast, idx)
  }

  /// Only called for absent children when `visits_absent` is true
  fn visit_absent(&mut self) {}

  fn visits_absent(&self) -> bool {
    false
  }
}

/// Calls the visitor hook matching the node's kind
pub fn dispatch<V: Visitor + ?Sized>(ast: &Ast, node: Option<NodeIdx>, visitor: &mut V) {
  let Some(idx) = node else {
    if visitor.visits_absent() {
      visitor.visit_absent();
    }
    return;
  };

  match &ast.get(idx).kind {
    NodeKind::Symbol { .. } => visitor.visit_symbol(ast, idx),
    NodeKind::Term(TermValue::Int(v)) => visitor.visit_int(ast, idx, *v),
    NodeKind::Term(TermValue::Float(v)) => visitor.visit_float(ast, idx, *v),
    NodeKind::Term(TermValue::String(s)) => visitor.visit_string(ast, idx, s),
    NodeKind::Term(TermValue::Char(c)) => visitor.visit_char(ast, idx, *c),
    NodeKind::Term(TermValue::Ident(s)) => visitor.visit_ident(ast, idx, s),
  }
}

fn rejects(filter: Option<Filter>, node: &AstNode) -> bool {
  filter.is_some_and(|f| !f(node))
}

/// Pre-order walk from `root`. If the filter rejects the root nothing is
/// visited; any other symbol it rejects is visited but not descended into.
/// `leave_symbol` runs after each visited symbol's children.
pub fn depth_first_walk<V: Visitor + ?Sized>(
  ast: &Ast,
  root: NodeIdx,
  visitor: &mut V,
  filter: Option<Filter>,
) {
  if rejects(filter, ast.get(root)) {
    return;
  }
  walk_subtree(ast, Some(root), visitor, filter);
}

fn walk_subtree<V: Visitor + ?Sized>(
  ast: &Ast,
  node: Option<NodeIdx>,
  visitor: &mut V,
  filter: Option<Filter>,
) {
  dispatch(ast, node, visitor);

  let Some(idx) = node else { return };
  let current = ast.get(idx);
  if !current.is_symbol() {
    return;
  }

  for child in current.children().iter().copied() {
    match child {
      Some(c) if ast.get(c).is_symbol() && rejects(filter, ast.get(c)) => {
        dispatch(ast, child, visitor);
        visitor.leave_symbol(ast, c);
      }
      _ => walk_subtree(ast, child, visitor, filter),
    }
  }

  visitor.leave_symbol(ast, idx);
}

/// Level-order walk from `root` with the same filter contract as
/// `depth_first_walk`. Stamps each dequeued node with its bfs index.
pub fn breadth_first_walk<V: Visitor + ?Sized>(
  ast: &Ast,
  root: NodeIdx,
  visitor: &mut V,
  filter: Option<Filter>,
) {
  if rejects(filter, ast.get(root)) {
    return;
  }

  let mut queue = VecDeque::from([Some(root)]);
  let mut bfs_index = 0;
  while let Some(node) = queue.pop_front() {
    if let Some(idx) = node {
      ast.get(idx).set_bfs_index(bfs_index);
      bfs_index += 1;
    }

    dispatch(ast, node, visitor);

    let Some(idx) = node else { continue };
    let current = ast.get(idx);
    if idx != root && current.is_symbol() && rejects(filter, current) {
      continue;
    }
    queue.extend(current.children().iter().copied());
  }
}

/// Computes depth top-down and height bottom-up in one depth-first pass
#[derive(Default)]
struct TreeAnnotator {
  depth: usize,
}

impl Visitor for TreeAnnotator {
  fn visit_symbol(&mut self, ast: &Ast, idx: NodeIdx) {
    ast.get(idx).set_depth(self.depth);
    self.depth += 1;
  }

  fn leave_symbol(&mut self, ast: &Ast, idx: NodeIdx) {
    self.depth -= 1;
    let node = ast.get(idx);
    let max_height = node
      .children()
      .iter()
      .flatten()
      .filter_map(|c| ast.get(*c).height())
      .max()
      .unwrap_or(0);
    node.set_height(max_height + 1);
  }

  fn visit_term(&mut self, ast: &Ast, idx: NodeIdx) {
    let node = ast.get(idx);
    node.set_height(0);
    node.set_depth(self.depth);
  }
}

/// The breadth-first walk does the stamping itself
struct TreeAnnotatorBfs;

impl Visitor for TreeAnnotatorBfs {}

/// Fills in depth, height and bfs index for every node under `root`.
/// Running it again yields the same values.
pub fn annotate(ast: &Ast, root: NodeIdx) {
  depth_first_walk(ast, root, &mut TreeAnnotator::default(), None);
  breadth_first_walk(ast, root, &mut TreeAnnotatorBfs, None);
}

/// Indented lisp rendering, one node per line
struct LispPrinter<'f, 'a> {
  f: &'f mut fmt::Formatter<'a>,
  indent: usize,
  result: fmt::Result,
}

impl LispPrinter<'_, '_> {
  fn line(&mut self, text: fmt::Arguments) {
    if self.result.is_ok() {
      self.result = writeln!(self.f, "{:indent$}{}", "", text, indent = self.indent * 4);
    }
  }
}

impl Visitor for LispPrinter<'_, '_> {
  fn visit_symbol(&mut self, ast: &Ast, idx: NodeIdx) {
    let name = ast.get(idx).name().unwrap_or_default();
    self.line(format_args!("({}", name));
    self.indent += 1;
  }

  fn leave_symbol(&mut self, _ast: &Ast, _idx: NodeIdx) {
    self.indent -= 1;
    self.line(format_args!(")"));
  }

  fn visit_term(&mut self, ast: &Ast, idx: NodeIdx) {
    if let Some(value) = ast.get(idx).value() {
      self.line(format_args!("{}", value));
    }
  }

  fn visit_absent(&mut self) {
    self.line(format_args!("NULL"));
  }

  fn visits_absent(&self) -> bool {
    true
  }
}

impl fmt::Display for Ast {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let Some(root) = self.root() else {
      return Ok(());
    };
    let mut printer = LispPrinter {
      f,
      indent: 0,
      result: Ok(()),
    };
    depth_first_walk(self, root, &mut printer, None);
    printer.result
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::ast::TermValue;
  use crate::lexer_id::{ID_CLAUSE, ID_N, ID_S, ID_V, ID_VP};

  /// (S (CLAUSE i (VP gave it)) NULL)
  fn sample() -> (Ast, Vec<NodeIdx>) {
    let mut ast = Ast::new();
    let i = ast.alloc_term(ID_N, TermValue::Ident("i".to_string()));
    let gave = ast.alloc_term(ID_V, TermValue::Ident("gave".to_string()));
    let it = ast.alloc_term(ID_N, TermValue::Ident("it".to_string()));
    let vp = ast.alloc_symbol(ID_VP, "VP", vec![Some(gave), Some(it)]);
    let clause = ast.alloc_symbol(ID_CLAUSE, "CLAUSE", vec![Some(i), Some(vp)]);
    let s = ast.alloc_symbol(ID_S, "S", vec![Some(clause), None]);
    ast.set_root(s);
    (ast, vec![s, clause, i, vp, gave, it])
  }

  #[derive(Default)]
  struct Recorder {
    seen: Vec<String>,
    absent: usize,
    want_absent: bool,
  }

  impl Visitor for Recorder {
    fn visit_symbol(&mut self, ast: &Ast, idx: NodeIdx) {
      self.seen.push(ast.get(idx).name().unwrap().to_string());
    }

    fn visit_ident(&mut self, _ast: &Ast, _idx: NodeIdx, value: &str) {
      self.seen.push(value.to_string());
    }

    fn visit_absent(&mut self) {
      self.absent += 1;
    }

    fn visits_absent(&self) -> bool {
      self.want_absent
    }
  }

  #[test]
  fn test_depth_first_is_preorder() {
    let (ast, nodes) = sample();
    let mut r = Recorder::default();
    depth_first_walk(&ast, nodes[0], &mut r, None);
    assert_eq!(r.seen, vec!["S", "CLAUSE", "i", "VP", "gave", "it"]);
    assert_eq!(r.absent, 0);

    let mut r = Recorder {
      want_absent: true,
      ..Default::default()
    };
    depth_first_walk(&ast, nodes[0], &mut r, None);
    assert_eq!(r.absent, 1);
  }

  #[test]
  fn test_filter_stops_descent_but_visits_node() {
    let (ast, nodes) = sample();
    let not_vp = |n: &AstNode| n.name() != Some("VP");

    let mut r = Recorder::default();
    depth_first_walk(&ast, nodes[0], &mut r, Some(&not_vp));
    assert_eq!(r.seen, vec!["S", "CLAUSE", "i", "VP"]);

    let mut r = Recorder::default();
    breadth_first_walk(&ast, nodes[0], &mut r, Some(&not_vp));
    assert_eq!(r.seen, vec!["S", "CLAUSE", "i", "VP"]);

    // rejecting the root means nothing happens at all
    let mut r = Recorder::default();
    depth_first_walk(&ast, nodes[3], &mut r, Some(&not_vp));
    assert!(r.seen.is_empty());
  }

  #[test]
  fn test_breadth_first_is_level_order() {
    let (ast, nodes) = sample();
    let mut r = Recorder::default();
    breadth_first_walk(&ast, nodes[0], &mut r, None);
    assert_eq!(r.seen, vec!["S", "CLAUSE", "i", "VP", "gave", "it"]);
  }

  #[test]
  fn test_annotate() {
    let (ast, nodes) = sample();
    let [s, clause, i, vp, gave, it] = nodes[..] else {
      unreachable!()
    };
    annotate(&ast, s);

    let depths: Vec<_> = [s, clause, i, vp, gave, it]
      .iter()
      .map(|n| ast.get(*n).depth().unwrap())
      .collect();
    assert_eq!(depths, vec![0, 1, 2, 2, 3, 3]);

    assert_eq!(ast.get(s).height(), Some(3));
    assert_eq!(ast.get(vp).height(), Some(1));
    assert_eq!(ast.get(i).height(), Some(0));

    let bfs: Vec<_> = [s, clause, i, vp, gave, it]
      .iter()
      .map(|n| ast.get(*n).bfs_index().unwrap())
      .collect();
    assert_eq!(bfs, vec![0, 1, 2, 3, 4, 5]);
  }

  #[test]
  fn test_annotate_is_idempotent() {
    let (ast, nodes) = sample();
    annotate(&ast, nodes[0]);
    let snapshot = |ast: &Ast| {
      nodes
        .iter()
        .map(|n| {
          let n = ast.get(*n);
          (n.depth(), n.height(), n.bfs_index())
        })
        .collect::<Vec<_>>()
    };
    let first = snapshot(&ast);
    annotate(&ast, nodes[0]);
    assert_eq!(first, snapshot(&ast));
  }

  #[test]
  fn test_lisp_display() {
    let (ast, _) = sample();
    let expected = concat!(
      "(S\n",
      "    (CLAUSE\n",
      "        i\n",
      "        (VP\n",
      "            gave\n",
      "            it\n",
      "        )\n",
      "    )\n",
      "    NULL\n",
      ")\n",
    );
    assert_eq!(ast.to_string(), expected);
  }
}
