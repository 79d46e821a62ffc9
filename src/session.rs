//! The seam between tagging and parsing: one session per tagged path, and
//! a parser that either turns it into an `Ast` or rejects it.

use tracing::{debug, trace};

use crate::ast::Ast;
use crate::earley::parse_chart;
use crate::forest::Forest;
use crate::grammar::Grammar;
use crate::pos::{TaggedPath, TaggedWord};
use crate::Err;

/// Owns one tagging of a sentence and the arena its tree will live in
#[derive(Debug)]
pub struct ParserSession {
  path: TaggedPath,
  ast: Ast,
}

impl ParserSession {
  pub fn new(path: &[TaggedWord]) -> Self {
    Self {
      path: path.to_vec(),
      ast: Ast::new(),
    }
  }

  pub fn path(&self) -> &[TaggedWord] {
    &self.path
  }

  pub fn into_parts(self) -> (TaggedPath, Ast) {
    (self.path, self.ast)
  }
}

/// Anything that can parse a tagged path. A successful parse returns the
/// session's tree with its root set.
pub trait AttemptParse {
  fn attempt_parse(&self, session: ParserSession) -> Result<Ast, Err>;
}

impl AttemptParse for Grammar {
  fn attempt_parse(&self, session: ParserSession) -> Result<Ast, Err> {
    let (path, mut ast) = session.into_parts();

    let categories = path
      .iter()
      .map(|tagged| self.categorize(tagged))
      .collect::<Result<Vec<_>, _>>()?;
    debug!("attempt: {}", categories.join(" "));

    let forest = Forest::from(parse_chart(self, &categories));
    trace!("forest:\n{}", forest);

    // the first tree stands for the path when the grammar is ambiguous
    let tree = forest
      .first_tree(self)
      .ok_or_else(|| -> Err { format!("no parse for: {}", categories.join(" ")).into() })?;

    let words = path.iter().map(|t| t.word.as_str()).collect::<Vec<_>>();
    let root = tree.build_ast(self, &words, &mut ast);
    ast.set_root(root);

    Ok(ast)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::ast::NodeKind;
  use crate::lexer_id::{ID_CLAUSE, ID_N, ID_S};

  fn session(words: &[(&str, &str)]) -> ParserSession {
    let path = words
      .iter()
      .map(|(w, t)| TaggedWord::new(*w, *t))
      .collect::<Vec<_>>();
    ParserSession::new(&path)
  }

  #[test]
  fn test_attempt_parse_builds_tree() {
    let g = Grammar::english().unwrap();
    let ast = g
      .attempt_parse(session(&[("i", "i"), ("gave", "gave"), ("it", "it")]))
      .unwrap();

    let root = ast.root().unwrap();
    assert_eq!(ast.get(root).lexer_id, ID_S);
    assert!(ast.get(root).is_root());

    let words = ast
      .indices()
      .filter(|n| ast.get(*n).is_term())
      .map(|n| (ast.get(n).lexer_id, ast.get(n).word().unwrap_or("").to_string()))
      .collect::<Vec<_>>();
    assert!(words.contains(&(ID_N, "i".to_string())));
    assert!(words.contains(&(ID_N, "it".to_string())));

    let has_clause = ast.indices().any(|n| {
      ast.get(n).lexer_id == ID_CLAUSE && matches!(ast.get(n).kind, NodeKind::Symbol { .. })
    });
    assert!(has_clause);
  }

  #[test]
  fn test_attempt_parse_rejects() {
    let g = Grammar::english().unwrap();
    // wrong tag for "to"
    assert!(g
      .attempt_parse(session(&[
        ("i", "i"),
        ("gave", "gave"),
        ("it", "it"),
        ("to", "to-V"),
        ("him", "him"),
      ]))
      .is_err());
    // unknown word
    assert!(g
      .attempt_parse(session(&[("i", "i"), ("gave", "gave"), ("zebra", "zebra")]))
      .is_err());
    assert!(g.attempt_parse(session(&[])).is_err());
  }

  #[test]
  fn test_attempt_parse_with_trailing_empty_rule() {
    let g: Grammar = r#"
      S -> N V TAIL;
      TAIL -> ;
      N: i;
      V: left;
    "#
    .parse()
    .unwrap();

    let ast = g
      .attempt_parse(session(&[("i", "i"), ("left", "left")]))
      .unwrap();
    let root = ast.root().unwrap();
    assert_eq!(ast.get(root).children().len(), 3);

    let tail = ast
      .indices()
      .find(|n| ast.get(*n).name() == Some("TAIL"))
      .unwrap();
    assert_eq!(ast.get(tail).parent(), Some(root));
    assert!(ast.get(tail).children().is_empty());
  }
}
