use std::collections::{HashMap, HashSet};

use tracing::{info, trace};

use super::classify::*;
use super::{Clause, NounList, Ontology, PrepPhrase, Sentence, VerbPhrase, WrapperIdx, WrapperKind};
use crate::ast::{Ast, AstNode, NodeIdx};

/// Rebuilds a parse tree as a semantic tree. Nodes whose enclosing
/// phrase can't be found are left out; extraction itself never fails.
pub fn extract_ontology(ast: &Ast) -> Ontology {
  let Some(root) = ast.root() else {
    trace!("extract: tree has no root");
    return Ontology::new();
  };

  info!("classify nodes");
  let sets = classify(ast, root);

  let mut ex = Extractor {
    ast,
    wrappers: HashMap::new(),
    ontology: Ontology::new(),
  };

  info!("instantiate wrappers");
  ex.instantiate(&sets);

  info!("link clauses to sentences");
  ex.link_clauses(&sets.clauses);
  info!("link verb phrases to clauses");
  ex.link_verb_phrases(&sets.verb_phrases);
  info!("link prep phrases to verb phrases");
  ex.link_prep_phrases(&sets.prep_phrases);
  info!("link verbs to verb phrases");
  ex.link_verbs(&sets.verbs);
  info!("link nouns");
  ex.link_nouns(&sets.nouns);
  info!("link preps to prep phrases");
  ex.link_preps(&sets.preps);
  info!("negate verb phrases");
  ex.negate(&sets.nots);
  info!("prune empty verb phrases");
  ex.prune_verb_phrases(&sets.verb_phrases);
  info!("transpose passive voice");
  ex.transpose_passives(&sets.verbs);

  for sentence in sets.sentences.iter() {
    if let Some(w) = ex.wrapper(*sentence) {
      ex.ontology.push_sentence(w);
    }
  }

  ex.ontology
}

#[derive(Clone, Copy)]
enum VerbSlot {
  Main,
  Aux,
  Modal,
  Been,
}

struct Extractor<'a> {
  ast: &'a Ast,
  wrappers: HashMap<NodeIdx, WrapperIdx>,
  ontology: Ontology,
}

fn node_tag(node: &AstNode) -> String {
  match node.value() {
    Some(value) => value.to_string(),
    None => node.name().unwrap_or_default().to_string(),
  }
}

impl Extractor<'_> {
  fn wrap(&mut self, nodes: &[NodeIdx], make: fn() -> WrapperKind) {
    for node in nodes.iter().copied() {
      if self.wrappers.contains_key(&node) {
        continue;
      }
      let idx = self.ontology.alloc(Some(node), node_tag(self.ast.get(node)), make());
      self.wrappers.insert(node, idx);
    }
  }

  /// One wrapper per classified node. A node in two role sets keeps the
  /// first kind it was given.
  fn instantiate(&mut self, sets: &Classified) {
    self.wrap(&sets.sentences, || WrapperKind::Sentence(Sentence::default()));
    self.wrap(&sets.clauses, || WrapperKind::Clause(Clause::default()));
    self.wrap(&sets.verb_phrases, || WrapperKind::VerbPhrase(VerbPhrase::default()));
    self.wrap(&sets.prep_phrases, || WrapperKind::PrepPhrase(PrepPhrase::default()));
    self.wrap(&sets.verbs, || WrapperKind::Verb);
    self.wrap(&sets.preps, || WrapperKind::Prep);
    self.wrap(&sets.nouns, || WrapperKind::Noun);
  }

  fn wrapper(&self, node: NodeIdx) -> Option<WrapperIdx> {
    let w = self.wrappers.get(&node).copied();
    if w.is_none() {
      trace!("no wrapper for {:?}", node);
    }
    w
  }

  /// Wrapper of the matching ancestor, nearest or topmost
  fn enclosing(
    &self,
    node: NodeIdx,
    filter: fn(&AstNode) -> bool,
    first_hit: bool,
  ) -> Option<WrapperIdx> {
    match self.ast.find_ancestor(node, filter, first_hit) {
      Some(ancestor) => self.wrapper(ancestor),
      None => {
        trace!("no enclosing match above {:?}", node);
        None
      }
    }
  }

  fn link_clauses(&mut self, clauses: &[NodeIdx]) {
    for clause in clauses.iter().copied() {
      let Some(w) = self.wrapper(clause) else {
        continue;
      };
      let Some(sentence) = self.enclosing(clause, is_sentence, false) else {
        continue;
      };
      if let Some(s) = self.ontology.sentence_mut(sentence) {
        s.clauses.push(w);
        self.ontology.set_parent(w, sentence);
      }
    }
  }

  fn link_verb_phrases(&mut self, verb_phrases: &[NodeIdx]) {
    for vp in verb_phrases.iter().copied() {
      let (Some(w), Some(clause)) = (self.wrapper(vp), self.enclosing(vp, is_clause, false)) else {
        continue;
      };
      if let Some(c) = self.ontology.clause_mut(clause) {
        c.verb_phrases.push(w);
        self.ontology.set_parent(w, clause);
      }
    }
  }

  fn link_prep_phrases(&mut self, prep_phrases: &[NodeIdx]) {
    for pp in prep_phrases.iter().copied() {
      let (Some(w), Some(vp)) = (self.wrapper(pp), self.enclosing(pp, is_verb_phrase, false)) else {
        continue;
      };
      if let Some(v) = self.ontology.verb_phrase_mut(vp) {
        v.prep_phrases.push(w);
        self.ontology.set_parent(w, vp);
      }
    }
  }

  fn link_verbs(&mut self, verbs: &[NodeIdx]) {
    for verb in verbs.iter().copied() {
      let Some(w) = self.wrapper(verb) else {
        continue;
      };
      let Some(vp) = self.enclosing(verb, is_verb_phrase, false) else {
        continue;
      };

      let passive = self.ast.find_ancestor(verb, is_aux_not_v, true).is_some()
        && self.ast.find_ancestor(verb, is_be_target, true).is_some();

      let slot = if is_been(self.ast.get(verb)) {
        VerbSlot::Been
      } else {
        // the verb group right above the verb decides its slot
        match self.ast.find_ancestor(verb, is_verb_phrase, true) {
          Some(group) if is_aux_verb(self.ast.get(group)) => VerbSlot::Aux,
          Some(group) if is_modal_verb(self.ast.get(group)) => VerbSlot::Modal,
          _ => VerbSlot::Main,
        }
      };

      let Some(v) = self.ontology.verb_phrase_mut(vp) else {
        continue;
      };
      if passive {
        v.passive = true;
      }
      match slot {
        VerbSlot::Main => v.verb = Some(w),
        VerbSlot::Aux => v.aux_verb = Some(w),
        VerbSlot::Modal => v.modal_verb = Some(w),
        VerbSlot::Been => v.been = Some(w),
      }
      self.ontology.set_parent(w, vp);
    }
  }

  /// A made-up "to" phrase hung on `vp`
  fn synthesize_to_phrase(&mut self, vp: WrapperIdx) -> WrapperIdx {
    let prep = self.ontology.alloc(None, "to", WrapperKind::Prep);
    let pp = self.ontology.alloc(
      None,
      "to",
      WrapperKind::PrepPhrase(PrepPhrase {
        prep: Some(prep),
        indirect_objects: Vec::new(),
      }),
    );
    self.ontology.set_parent(prep, pp);

    if let Some(v) = self.ontology.verb_phrase_mut(vp) {
      v.prep_phrases.push(pp);
      self.ontology.set_parent(pp, vp);
    }
    pp
  }

  fn link_nouns(&mut self, nouns: &[NodeIdx]) {
    for noun in nouns.iter().copied() {
      let Some(w) = self.wrapper(noun) else {
        continue;
      };
      let Some(clause) = self.enclosing(noun, is_clause, false) else {
        continue;
      };

      let Some(vp_node) = self.ast.find_ancestor(noun, is_verb_phrase, false) else {
        if let Some(c) = self.ontology.clause_mut(clause) {
          c.subjects.push(w);
          self.ontology.set_parent(w, clause);
        }
        continue;
      };
      let Some(vp) = self.wrapper(vp_node) else {
        continue;
      };

      if let Some(pp) = self.enclosing(noun, is_prep_phrase, true) {
        if let Some(p) = self.ontology.prep_phrase_mut(pp) {
          p.indirect_objects.push(w);
          self.ontology.set_parent(w, pp);
        }
        continue;
      }

      let Some(v) = self.ontology.verb_phrase_mut(vp) else {
        continue;
      };
      if v.direct_objects.is_empty() {
        v.direct_objects.push(w);
        self.ontology.set_parent(w, vp);
        continue;
      }

      // a second bare object: the earlier one was the indirect object
      let pp = self.synthesize_to_phrase(vp);
      if let Some(p) = self.ontology.prep_phrase_mut(pp) {
        p.indirect_objects.push(w);
        self.ontology.set_parent(w, pp);
      }
      self.ontology.swap_nouns(NounList::DirectObjects(vp), NounList::IndirectObjects(pp));
    }
  }

  fn link_preps(&mut self, preps: &[NodeIdx]) {
    for prep in preps.iter().copied() {
      let Some(w) = self.wrapper(prep) else {
        continue;
      };
      let Some(pp) = self.enclosing(prep, is_prep_phrase, true) else {
        continue;
      };
      if let Some(p) = self.ontology.prep_phrase_mut(pp) {
        p.prep = Some(w);
        self.ontology.set_parent(w, pp);
      }
    }
  }

  fn negate(&mut self, nots: &[NodeIdx]) {
    for not in nots.iter().copied() {
      let Some(vp) = self.enclosing(not, is_verb_phrase, false) else {
        continue;
      };
      if let Some(v) = self.ontology.verb_phrase_mut(vp) {
        v.negated = true;
      }
    }
  }

  fn prune_verb_phrases(&mut self, verb_phrases: &[NodeIdx]) {
    for vp_node in verb_phrases.iter().rev().copied() {
      let Some(vp) = self.wrapper(vp_node) else {
        continue;
      };
      if !self.ontology.verb_phrase(vp).is_some_and(VerbPhrase::is_empty) {
        continue;
      }

      let Some(clause) = self.ontology.get(vp).parent else {
        continue;
      };
      if let Some(c) = self.ontology.clause_mut(clause) {
        c.verb_phrases.retain(|v| *v != vp);
        self.ontology.detach(vp);
        trace!("pruned empty verb phrase {:?}", vp_node);
      }
    }
  }

  /// Moves arguments of passive verb phrases back to their logical roles.
  /// Only handles a clause-final "by" agent with objects in canonical order.
  fn transpose_passives(&mut self, verbs: &[NodeIdx]) {
    let mut visited = HashSet::new();

    for verb in verbs.iter().copied() {
      let Some(vp) = self.enclosing(verb, is_verb_phrase, false) else {
        continue;
      };
      if visited.contains(&vp) || !self.ontology.verb_phrase(vp).is_some_and(|v| v.passive) {
        continue;
      }
      let Some(clause) = self.enclosing(verb, is_clause, false) else {
        continue;
      };
      visited.insert(vp);

      let prep_phrases = self
        .ontology
        .verb_phrase(vp)
        .map(|v| v.prep_phrases.clone())
        .unwrap_or_default();

      if prep_phrases.is_empty() {
        let pp = self.synthesize_to_phrase(vp);
        self.ontology.swap_nouns(NounList::Subjects(clause), NounList::IndirectObjects(pp));
        continue;
      }

      self.ontology.swap_nouns(NounList::Subjects(clause), NounList::DirectObjects(vp));
      let by = prep_phrases
        .iter()
        .copied()
        .find(|pp| self.ontology.prep_word(*pp) == Some("by"));
      if let Some(by) = by {
        self.ontology.swap_nouns(NounList::Subjects(clause), NounList::IndirectObjects(by));
        if let Some(v) = self.ontology.verb_phrase_mut(vp) {
          v.prep_phrases.retain(|pp| *pp != by);
        }
        self.ontology.detach(by);
      }
    }
  }
}
