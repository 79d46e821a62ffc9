use std::fmt;
use std::rc::Rc;

use crate::ast::{Ast, NodeIdx, TermValue};
use crate::grammar::Grammar;
use crate::lexer_id::LexerId;
use crate::rules::Rule;

/// A completed rule over a span of input
#[derive(Debug, PartialEq, Clone)]
pub struct Constituent {
  pub rule: Rc<Rule>,
  pub span: (usize, usize),
}

impl fmt::Display for Constituent {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}..{}: {}", self.span.0, self.span.1, self.rule)
  }
}

/// A scanned token: its category and input position
#[derive(Debug, PartialEq, Clone)]
pub struct Token {
  pub category: String,
  pub position: usize,
}

/// One tree read off the parse forest
#[derive(Debug, PartialEq, Clone)]
pub enum SynTree {
  Branch(Constituent, Vec<SynTree>),
  Leaf(Token),
}

impl SynTree {
  pub fn is_leaf(&self) -> bool {
    matches!(self, Self::Leaf(_))
  }

  pub fn get_branch(&self) -> Option<(&Constituent, &Vec<SynTree>)> {
    match self {
      Self::Branch(c, cs) => Some((c, cs)),
      _ => None,
    }
  }

  /// Allocates this tree into `ast` bottom-up and returns the index of its
  /// top node. Branches become symbols named after their rule; leaves
  /// become identifier terms holding the surface word at their position.
  pub fn build_ast(&self, g: &Grammar, words: &[&str], ast: &mut Ast) -> NodeIdx {
    let id_of = |name: &str| -> LexerId { g.name_to_id(name).unwrap_or_default() };

    match self {
      Self::Leaf(token) => ast.alloc_term(
        id_of(&token.category),
        TermValue::Ident(words[token.position].to_string()),
      ),
      Self::Branch(cons, children) => {
        let children = children
          .iter()
          .map(|child| Some(child.build_ast(g, words, ast)))
          .collect();
        let name = cons.rule.symbol_str();
        ast.alloc_symbol(id_of(name), name, children)
      }
    }
  }

  fn fmt_indented(&self, f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
    write!(f, "{:indent$}", "", indent = depth * 2)?;
    match self {
      Self::Leaf(token) => writeln!(f, "{}@{}", token.category, token.position),
      Self::Branch(cons, children) => {
        writeln!(f, "{}", cons.rule.symbol)?;
        for child in children {
          child.fmt_indented(f, depth + 1)?;
        }
        Ok(())
      }
    }
  }
}

impl fmt::Display for SynTree {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    self.fmt_indented(f, 0)
  }
}
