use crate::ast::{Ast, AstNode, NodeIdx};
use crate::lexer_id::*;
use crate::visitor::{depth_first_walk, Visitor};

pub fn is_sentence(node: &AstNode) -> bool {
  node.lexer_id == ID_S
}

pub fn is_clause(node: &AstNode) -> bool {
  node.lexer_id == ID_CLAUSE
}

pub fn is_noun(node: &AstNode) -> bool {
  matches!(node.lexer_id, ID_N | ID_DEM)
}

pub fn is_verb(node: &AstNode) -> bool {
  matches!(
    node.lexer_id,
    ID_V
      | ID_VPAST
      | ID_VGERUND
      | ID_VPASTPERF
      | ID_BE
      | ID_BEING
      | ID_BEEN
      | ID_DO
      | ID_HAVE
      | ID_MODAL
  )
}

pub fn is_verb_phrase(node: &AstNode) -> bool {
  matches!(
    node.lexer_id,
    ID_VP
      | ID_V_NP
      | ID_VPAST_NP
      | ID_VGERUND_NP
      | ID_AUX_V
      | ID_AUX_NOT_V
      | ID_HAVE_TARGET
      | ID_BE_NOT_OR_FREQ
      | ID_DO_NOT_OR_FREQ
      | ID_HAVE_NOT_OR_FREQ
      | ID_MODAL_NOT_OR_FREQ
  )
}

pub fn is_prep(node: &AstNode) -> bool {
  node.lexer_id == ID_PREP
}

pub fn is_prep_phrase(node: &AstNode) -> bool {
  node.lexer_id == ID_PREP_NP
}

pub fn is_not(node: &AstNode) -> bool {
  node.lexer_id == ID_NOT
}

/// Verb groups whose verb fills the auxiliary slot
pub fn is_aux_verb(node: &AstNode) -> bool {
  matches!(
    node.lexer_id,
    ID_AUX_V | ID_BE_NOT_OR_FREQ | ID_DO_NOT_OR_FREQ | ID_HAVE_NOT_OR_FREQ
  )
}

pub fn is_modal_verb(node: &AstNode) -> bool {
  node.lexer_id == ID_MODAL_NOT_OR_FREQ
}

pub fn is_been(node: &AstNode) -> bool {
  node.lexer_id == ID_BEEN
}

pub fn is_aux_not_v(node: &AstNode) -> bool {
  node.lexer_id == ID_AUX_NOT_V
}

pub fn is_be_target(node: &AstNode) -> bool {
  node.lexer_id == ID_BE_TARGET
}

/// Nodes sorted into the roles extraction works on, each list in
/// document order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Classified {
  pub sentences: Vec<NodeIdx>,
  pub clauses: Vec<NodeIdx>,
  pub verb_phrases: Vec<NodeIdx>,
  pub prep_phrases: Vec<NodeIdx>,
  pub nots: Vec<NodeIdx>,
  pub nouns: Vec<NodeIdx>,
  pub verbs: Vec<NodeIdx>,
  pub preps: Vec<NodeIdx>,
}

impl Visitor for Classified {
  fn visit_symbol(&mut self, ast: &Ast, idx: NodeIdx) {
    let node = ast.get(idx);
    if is_sentence(node) {
      self.sentences.push(idx);
    }
    if is_clause(node) {
      self.clauses.push(idx);
    }
    if is_verb_phrase(node) {
      self.verb_phrases.push(idx);
    }
    if is_prep_phrase(node) {
      self.prep_phrases.push(idx);
    }
  }

  fn visit_term(&mut self, ast: &Ast, idx: NodeIdx) {
    let node = ast.get(idx);
    if is_not(node) {
      self.nots.push(idx);
    }
    if is_noun(node) {
      self.nouns.push(idx);
    }
    if is_verb(node) {
      self.verbs.push(idx);
    }
    if is_prep(node) {
      self.preps.push(idx);
    }
  }
}

/// One depth-first pass gathering every role set under `root`
pub fn classify(ast: &Ast, root: NodeIdx) -> Classified {
  let mut classified = Classified::default();
  depth_first_walk(ast, root, &mut classified, None);
  classified
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::ast::TermValue;

  #[test]
  fn test_classify_keeps_document_order() {
    let mut ast = Ast::new();
    let word = |s: &str| TermValue::Ident(s.to_string());

    let i = ast.alloc_term(ID_N, word("i"));
    let not = ast.alloc_term(ID_NOT, word("not"));
    let give = ast.alloc_term(ID_V, word("give"));
    let it = ast.alloc_term(ID_N, word("it"));
    let to = ast.alloc_term(ID_PREP, word("to"));
    let him = ast.alloc_term(ID_N, word("him"));
    let pp = ast.alloc_symbol(ID_PREP_NP, "PREP_NP", vec![Some(to), Some(him)]);
    let v_np = ast.alloc_symbol(ID_V_NP, "V_NP", vec![Some(give), Some(it), Some(pp)]);
    let vp = ast.alloc_symbol(ID_VP, "VP", vec![Some(not), Some(v_np)]);
    let clause = ast.alloc_symbol(ID_CLAUSE, "CLAUSE", vec![Some(i), Some(vp)]);
    let s = ast.alloc_symbol(ID_S, "S", vec![Some(clause)]);
    ast.set_root(s);

    let c = classify(&ast, s);
    assert_eq!(c.sentences, vec![s]);
    assert_eq!(c.clauses, vec![clause]);
    assert_eq!(c.verb_phrases, vec![vp, v_np]);
    assert_eq!(c.prep_phrases, vec![pp]);
    assert_eq!(c.nots, vec![not]);
    assert_eq!(c.nouns, vec![i, it, him]);
    assert_eq!(c.verbs, vec![give]);
    assert_eq!(c.preps, vec![to]);
  }
}
