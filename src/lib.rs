#[macro_use]
extern crate lazy_static;

#[macro_use]
pub mod utils;

pub mod ancestry;
pub mod ast;
pub mod earley;
pub mod forest;
pub mod grammar;
pub mod lexer_id;
pub mod ontology;
pub mod parse_grammar;
pub mod pos;
pub mod rules;
pub mod session;
pub mod syntree;
pub mod visitor;

use tracing::{debug, info};

use crate::ast::Ast;
use crate::grammar::Grammar;
use crate::ontology::{extract_ontology, Ontology};
use crate::pos::{resolve, TaggedPath};
use crate::session::{AttemptParse, ParserSession};
pub use crate::utils::Err;

/// One tagging of a sentence that the parser accepted, with its tree and
/// the semantic structure read off it
#[derive(Debug)]
pub struct Parse {
  pub path: TaggedPath,
  pub ast: Ast,
  pub ontology: Ontology,
}

/// Tries every tagging of `sentence` against `parser` and extracts each
/// tree that comes back. Rejected taggings are skipped.
pub fn parse_sentence<P: AttemptParse + ?Sized>(parser: &P, sentence: &str) -> Vec<Parse> {
  let mut parses = Vec::new();

  for (path_index, path) in resolve(sentence).into_iter().enumerate() {
    let ast = match parser.attempt_parse(ParserSession::new(&path)) {
      Ok(ast) => ast,
      Err(e) => {
        debug!("path #{} rejected: {}", path_index, e);
        continue;
      }
    };
    debug!("path #{} parsed", path_index);

    if let Some(root) = ast.root() {
      visitor::annotate(&ast, root);
    }
    let ontology = extract_ontology(&ast);
    parses.push(Parse {
      path,
      ast,
      ontology,
    });
  }

  if parses.is_empty() {
    info!("no valid parse: {}", sentence);
  }
  parses
}

impl Grammar {
  pub fn parse_sentence(&self, sentence: &str) -> Vec<Parse> {
    parse_sentence(self, sentence)
  }
}
