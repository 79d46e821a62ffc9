use std::cell::Cell;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::lexer_id::LexerId;

static NEXT_UID: AtomicUsize = AtomicUsize::new(0);

/// Index type for the AST arena
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeIdx(pub u32);

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum TermKind {
  Int,
  Float,
  String,
  Char,
  Ident,
}

/// The value owned by a leaf
#[derive(Debug, Clone, PartialEq)]
pub enum TermValue {
  Int(i64),
  Float(f32),
  String(String),
  Char(char),
  Ident(String),
}

impl TermValue {
  pub fn kind(&self) -> TermKind {
    match self {
      Self::Int(_) => TermKind::Int,
      Self::Float(_) => TermKind::Float,
      Self::String(_) => TermKind::String,
      Self::Char(_) => TermKind::Char,
      Self::Ident(_) => TermKind::Ident,
    }
  }

  pub fn as_ident(&self) -> Option<&str> {
    match self {
      Self::Ident(s) => Some(s),
      _ => None,
    }
  }
}

impl fmt::Display for TermValue {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Int(v) => write!(f, "{}", v),
      Self::Float(v) => write!(f, "{}", v),
      Self::String(s) => write!(f, "\"{}\"", s.escape_debug()),
      Self::Char(c) => write!(f, "'{}'", c.escape_debug()),
      Self::Ident(s) => write!(f, "{}", s),
    }
  }
}

#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
  /// A leaf
  Term(TermValue),
  /// A production. Children may be absent (an elided optional part).
  Symbol {
    name: String,
    children: Vec<Option<NodeIdx>>,
  },
}

/// A node in the parse tree. Shape is fixed once allocated; only the
/// annotations (depth, height, bfs index) change, through `annotate`.
#[derive(Debug, Clone)]
pub struct AstNode {
  pub lexer_id: LexerId,
  pub kind: NodeKind,
  parent: Option<NodeIdx>,
  index: usize,
  uid: usize,
  depth: Cell<Option<usize>>,
  height: Cell<Option<usize>>,
  bfs_index: Cell<Option<usize>>,
}

impl AstNode {
  fn new(lexer_id: LexerId, kind: NodeKind) -> Self {
    Self {
      lexer_id,
      kind,
      parent: None,
      index: 0,
      uid: NEXT_UID.fetch_add(1, Ordering::Relaxed),
      depth: Cell::new(None),
      height: Cell::new(None),
      bfs_index: Cell::new(None),
    }
  }

  pub fn is_term(&self) -> bool {
    matches!(self.kind, NodeKind::Term(_))
  }

  pub fn is_symbol(&self) -> bool {
    matches!(self.kind, NodeKind::Symbol { .. })
  }

  pub fn is_root(&self) -> bool {
    self.parent.is_none()
  }

  pub fn parent(&self) -> Option<NodeIdx> {
    self.parent
  }

  /// Position among the parent's children
  pub fn index(&self) -> usize {
    self.index
  }

  /// Unique across every tree built in this process
  pub fn uid(&self) -> usize {
    self.uid
  }

  pub fn value(&self) -> Option<&TermValue> {
    match &self.kind {
      NodeKind::Term(v) => Some(v),
      NodeKind::Symbol { .. } => None,
    }
  }

  /// The surface word of an ident leaf
  pub fn word(&self) -> Option<&str> {
    self.value().and_then(TermValue::as_ident)
  }

  /// Symbol name, or None for leaves
  pub fn name(&self) -> Option<&str> {
    match &self.kind {
      NodeKind::Symbol { name, .. } => Some(name),
      NodeKind::Term(_) => None,
    }
  }

  /// Children of a symbol; leaves have none
  pub fn children(&self) -> &[Option<NodeIdx>] {
    match &self.kind {
      NodeKind::Symbol { children, .. } => children,
      NodeKind::Term(_) => &[],
    }
  }

  pub fn depth(&self) -> Option<usize> {
    self.depth.get()
  }

  pub fn height(&self) -> Option<usize> {
    self.height.get()
  }

  pub fn bfs_index(&self) -> Option<usize> {
    self.bfs_index.get()
  }

  pub(crate) fn set_depth(&self, depth: usize) {
    self.depth.set(Some(depth));
  }

  pub(crate) fn set_height(&self, height: usize) {
    self.height.set(Some(height));
  }

  pub(crate) fn set_bfs_index(&self, bfs_index: usize) {
    self.bfs_index.set(Some(bfs_index));
  }
}

/// Arena owning every node of one parse tree
#[derive(Debug, Default, Clone)]
pub struct Ast {
  nodes: Vec<AstNode>,
  root: Option<NodeIdx>,
}

impl Ast {
  pub fn new() -> Self {
    Default::default()
  }

  fn alloc(&mut self, node: AstNode) -> NodeIdx {
    let idx = self.nodes.len() as u32;
    self.nodes.push(node);
    NodeIdx(idx)
  }

  pub fn alloc_term(&mut self, lexer_id: LexerId, value: TermValue) -> NodeIdx {
    self.alloc(AstNode::new(lexer_id, NodeKind::Term(value)))
  }

  /// Allocates a symbol and adopts `children`, which must not already have a parent
  pub fn alloc_symbol(
    &mut self,
    lexer_id: LexerId,
    name: impl Into<String>,
    children: Vec<Option<NodeIdx>>,
  ) -> NodeIdx {
    let idx = NodeIdx(self.nodes.len() as u32);
    for (index, child) in children.iter().enumerate() {
      if let Some(child) = child {
        let child = self.get_mut(*child);
        assert!(child.parent.is_none(), "node adopted twice");
        child.parent = Some(idx);
        child.index = index;
      }
    }

    self.alloc(AstNode::new(
      lexer_id,
      NodeKind::Symbol {
        name: name.into(),
        children,
      },
    ))
  }

  pub fn set_root(&mut self, idx: NodeIdx) {
    assert!(self.get(idx).is_root(), "root cannot have a parent");
    self.root = Some(idx);
  }

  pub fn root(&self) -> Option<NodeIdx> {
    self.root
  }

  /// Get an idx. Assumes valid, panics on OOB
  pub fn get(&self, idx: NodeIdx) -> &AstNode {
    self.nodes.get(idx.0 as usize).expect("Invalid NodeIdx")
  }

  fn get_mut(&mut self, idx: NodeIdx) -> &mut AstNode {
    self.nodes.get_mut(idx.0 as usize).expect("Invalid NodeIdx")
  }

  pub fn len(&self) -> usize {
    self.nodes.len()
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }

  /// Every allocated index, in allocation order
  pub fn indices(&self) -> impl Iterator<Item = NodeIdx> + '_ {
    (0..self.nodes.len() as u32).map(NodeIdx)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::lexer_id::{ID_CLAUSE, ID_N, ID_S};

  #[test]
  fn test_parent_links_follow_children() {
    let mut ast = Ast::new();
    let i = ast.alloc_term(ID_N, TermValue::Ident("i".to_string()));
    let it = ast.alloc_term(ID_N, TermValue::Ident("it".to_string()));
    let clause = ast.alloc_symbol(ID_CLAUSE, "CLAUSE", vec![Some(i), None, Some(it)]);
    let s = ast.alloc_symbol(ID_S, "S", vec![Some(clause)]);
    ast.set_root(s);

    assert_eq!(ast.get(i).parent(), Some(clause));
    assert_eq!(ast.get(it).index(), 2);
    assert_eq!(ast.get(clause).parent(), Some(s));
    assert!(ast.get(s).is_root());
    assert_eq!(ast.get(it).word(), Some("it"));
    assert_eq!(ast.get(clause).name(), Some("CLAUSE"));
    assert_ne!(ast.get(i).uid(), ast.get(it).uid());
    assert_eq!(ast.get(i).depth(), None);
  }

  #[test]
  #[should_panic(expected = "node adopted twice")]
  fn test_node_cannot_have_two_parents() {
    let mut ast = Ast::new();
    let n = ast.alloc_term(ID_N, TermValue::Ident("i".to_string()));
    ast.alloc_symbol(ID_CLAUSE, "CLAUSE", vec![Some(n)]);
    ast.alloc_symbol(ID_CLAUSE, "CLAUSE", vec![Some(n)]);
  }

  #[test]
  fn test_term_display() {
    assert_eq!(TermValue::String("a\"b".to_string()).to_string(), "\"a\\\"b\"");
    assert_eq!(TermValue::Char('x').to_string(), "'x'");
    assert_eq!(TermValue::Int(-3).to_string(), "-3");
    assert_eq!(TermValue::Ident("gave".to_string()).kind(), TermKind::Ident);
  }
}
