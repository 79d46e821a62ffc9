//! Ancestor, common-ancestor and document-order queries over an `Ast`

use std::collections::HashSet;

use crate::ast::{Ast, AstNode, NodeIdx};
use crate::Err;

impl Ast {
  /// Iterates strictly upward from `idx`, excluding `idx` itself
  pub fn ancestors(&self, idx: NodeIdx) -> impl Iterator<Item = NodeIdx> + '_ {
    std::iter::successors(self.get(idx).parent(), move |n| self.get(*n).parent())
  }

  /// Strict ancestry: a node is never its own descendant
  pub fn is_descendant_of(&self, child: NodeIdx, ancestor: NodeIdx) -> bool {
    self.ancestors(child).any(|n| n == ancestor)
  }

  /// Nearest ancestor matching `filter` when `first_hit`, otherwise the
  /// topmost one
  pub fn find_ancestor<F>(&self, idx: NodeIdx, filter: F, first_hit: bool) -> Option<NodeIdx>
  where
    F: Fn(&AstNode) -> bool,
  {
    let mut matches = self.ancestors(idx).filter(|n| filter(self.get(*n)));
    if first_hit {
      matches.next()
    } else {
      matches.last()
    }
  }

  /// Lowest common ancestor, counting each node as its own ancestor.
  /// None if the nodes are in disconnected trees.
  pub fn find_first_common_ancestor(&self, a: NodeIdx, b: NodeIdx) -> Option<NodeIdx> {
    let lineage: HashSet<NodeIdx> = std::iter::once(a).chain(self.ancestors(a)).collect();
    std::iter::once(b)
      .chain(self.ancestors(b))
      .find(|n| lineage.contains(n))
  }

  /// Whether `a` comes before `b` in pre-order. Errors when the question
  /// has no answer: the same node twice, disconnected nodes, or one node
  /// being an ancestor of the other.
  pub fn is_before(&self, a: NodeIdx, b: NodeIdx) -> Result<bool, Err> {
    if a == b {
      return Err(format!("is_before: {:?} compared with itself", a).into());
    }

    let lca = self.find_first_common_ancestor(a, b).ok_or_else(|| -> Err {
      format!("is_before: {:?} and {:?} share no ancestor", a, b).into()
    })?;

    let a_branch = self.child_of_ancestor(a, lca)?;
    let b_branch = self.child_of_ancestor(b, lca)?;

    Ok(self.get(a_branch).index() < self.get(b_branch).index())
  }

  /// The node on the path from `idx` up to `ancestor` that is a direct
  /// child of `ancestor`
  fn child_of_ancestor(&self, idx: NodeIdx, ancestor: NodeIdx) -> Result<NodeIdx, Err> {
    let mut node = idx;
    loop {
      match self.get(node).parent() {
        Some(parent) if parent == ancestor => return Ok(node),
        Some(parent) => node = parent,
        None => {
          return Err(format!("is_before: no child of {:?} above {:?}", ancestor, idx).into());
        }
      }
    }
  }
}
