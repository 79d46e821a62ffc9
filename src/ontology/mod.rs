//! The semantic tree rebuilt from a parse: sentences, clauses, verb
//! phrases and prepositional phrases over nouns, verbs and preps.
//!
//! Wrappers live in one arena and refer to each other by [`WrapperIdx`].
//! Children are owned through the index lists of their parent's kind;
//! `parent` is a plain back-reference.

mod classify;
mod extract;

use std::fmt;

use crate::ast::NodeIdx;

pub use classify::{classify, Classified};
pub use extract::extract_ontology;

/// Index type for the wrapper arena
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WrapperIdx(pub u32);

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Sentence {
  pub clauses: Vec<WrapperIdx>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Clause {
  pub subjects: Vec<WrapperIdx>,
  pub verb_phrases: Vec<WrapperIdx>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct VerbPhrase {
  pub verb: Option<WrapperIdx>,
  pub aux_verb: Option<WrapperIdx>,
  pub modal_verb: Option<WrapperIdx>,
  pub been: Option<WrapperIdx>,
  pub direct_objects: Vec<WrapperIdx>,
  pub prep_phrases: Vec<WrapperIdx>,
  pub negated: bool,
  pub passive: bool,
}

impl VerbPhrase {
  /// No verb slot filled, no objects and no prep phrases
  pub fn is_empty(&self) -> bool {
    self.verb.is_none()
      && self.aux_verb.is_none()
      && self.modal_verb.is_none()
      && self.been.is_none()
      && self.direct_objects.is_empty()
      && self.prep_phrases.is_empty()
  }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PrepPhrase {
  pub prep: Option<WrapperIdx>,
  pub indirect_objects: Vec<WrapperIdx>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum WrapperKind {
  Sentence(Sentence),
  Clause(Clause),
  VerbPhrase(VerbPhrase),
  PrepPhrase(PrepPhrase),
  Verb,
  Noun,
  Prep,
}

/// One node of the semantic tree
#[derive(Debug, Clone, PartialEq)]
pub struct Wrapper {
  /// The parse node this came from; None for wrappers made up during extraction
  pub node: Option<NodeIdx>,
  /// Surface word for leaves, symbol name for phrases, or the synthetic tag
  pub tag: String,
  pub parent: Option<WrapperIdx>,
  pub kind: WrapperKind,
}

/// Which noun list of which wrapper
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum NounList {
  Subjects(WrapperIdx),
  DirectObjects(WrapperIdx),
  IndirectObjects(WrapperIdx),
}

impl NounList {
  fn owner(self) -> WrapperIdx {
    match self {
      Self::Subjects(idx) | Self::DirectObjects(idx) | Self::IndirectObjects(idx) => idx,
    }
  }
}

/// Arena owning every wrapper built from one parse tree
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Ontology {
  wrappers: Vec<Wrapper>,
  sentences: Vec<WrapperIdx>,
}

impl Ontology {
  pub fn new() -> Self {
    Default::default()
  }

  pub fn alloc(
    &mut self,
    node: Option<NodeIdx>,
    tag: impl Into<String>,
    kind: WrapperKind,
  ) -> WrapperIdx {
    let idx = WrapperIdx(self.wrappers.len() as u32);
    self.wrappers.push(Wrapper {
      node,
      tag: tag.into(),
      parent: None,
      kind,
    });
    idx
  }

  /// Get an idx. Assumes valid, panics on OOB
  pub fn get(&self, idx: WrapperIdx) -> &Wrapper {
    self.wrappers.get(idx.0 as usize).expect("Invalid WrapperIdx")
  }

  fn get_mut(&mut self, idx: WrapperIdx) -> &mut Wrapper {
    self.wrappers.get_mut(idx.0 as usize).expect("Invalid WrapperIdx")
  }

  pub fn len(&self) -> usize {
    self.wrappers.len()
  }

  pub fn is_empty(&self) -> bool {
    self.wrappers.is_empty()
  }

  /// Every wrapper, in allocation order
  pub fn iter(&self) -> impl Iterator<Item = &Wrapper> {
    self.wrappers.iter()
  }

  /// Top-level sentences, in document order
  pub fn sentences(&self) -> &[WrapperIdx] {
    &self.sentences
  }

  pub fn push_sentence(&mut self, idx: WrapperIdx) {
    self.sentences.push(idx);
  }

  pub fn set_parent(&mut self, child: WrapperIdx, parent: WrapperIdx) {
    self.get_mut(child).parent = Some(parent);
  }

  /// Clears the back-reference of a wrapper its parent no longer lists
  pub fn detach(&mut self, idx: WrapperIdx) {
    self.get_mut(idx).parent = None;
  }

  pub fn tag(&self, idx: WrapperIdx) -> &str {
    &self.get(idx).tag
  }

  pub fn sentence(&self, idx: WrapperIdx) -> Option<&Sentence> {
    match &self.get(idx).kind {
      WrapperKind::Sentence(s) => Some(s),
      _ => None,
    }
  }

  pub fn sentence_mut(&mut self, idx: WrapperIdx) -> Option<&mut Sentence> {
    match &mut self.get_mut(idx).kind {
      WrapperKind::Sentence(s) => Some(s),
      _ => None,
    }
  }

  pub fn clause(&self, idx: WrapperIdx) -> Option<&Clause> {
    match &self.get(idx).kind {
      WrapperKind::Clause(c) => Some(c),
      _ => None,
    }
  }

  pub fn clause_mut(&mut self, idx: WrapperIdx) -> Option<&mut Clause> {
    match &mut self.get_mut(idx).kind {
      WrapperKind::Clause(c) => Some(c),
      _ => None,
    }
  }

  pub fn verb_phrase(&self, idx: WrapperIdx) -> Option<&VerbPhrase> {
    match &self.get(idx).kind {
      WrapperKind::VerbPhrase(vp) => Some(vp),
      _ => None,
    }
  }

  pub fn verb_phrase_mut(&mut self, idx: WrapperIdx) -> Option<&mut VerbPhrase> {
    match &mut self.get_mut(idx).kind {
      WrapperKind::VerbPhrase(vp) => Some(vp),
      _ => None,
    }
  }

  pub fn prep_phrase(&self, idx: WrapperIdx) -> Option<&PrepPhrase> {
    match &self.get(idx).kind {
      WrapperKind::PrepPhrase(pp) => Some(pp),
      _ => None,
    }
  }

  pub fn prep_phrase_mut(&mut self, idx: WrapperIdx) -> Option<&mut PrepPhrase> {
    match &mut self.get_mut(idx).kind {
      WrapperKind::PrepPhrase(pp) => Some(pp),
      _ => None,
    }
  }

  /// The surface word of a prep phrase's head, if it has one
  pub fn prep_word(&self, pp: WrapperIdx) -> Option<&str> {
    self.prep_phrase(pp)?.prep.map(|prep| self.tag(prep))
  }

  fn noun_list_mut(&mut self, list: NounList) -> Option<&mut Vec<WrapperIdx>> {
    match list {
      NounList::Subjects(idx) => self.clause_mut(idx).map(|c| &mut c.subjects),
      NounList::DirectObjects(idx) => {
        self.verb_phrase_mut(idx).map(|vp| &mut vp.direct_objects)
      }
      NounList::IndirectObjects(idx) => {
        self.prep_phrase_mut(idx).map(|pp| &mut pp.indirect_objects)
      }
    }
  }

  /// Exchanges two noun lists wholesale and points every moved noun at its
  /// new owner. Does nothing if either list doesn't exist.
  pub fn swap_nouns(&mut self, a: NounList, b: NounList) {
    if a == b {
      return;
    }
    let Some(a_nouns) = self.noun_list_mut(a).map(std::mem::take) else {
      return;
    };
    let b_nouns = self
      .noun_list_mut(b)
      .map(|list| std::mem::replace(list, a_nouns.clone()));
    let Some(b_nouns) = b_nouns else {
      // put a back untouched
      if let Some(list) = self.noun_list_mut(a) {
        *list = a_nouns;
      }
      return;
    };

    for noun in a_nouns.iter() {
      self.set_parent(*noun, b.owner());
    }
    for noun in b_nouns.iter() {
      self.set_parent(*noun, a.owner());
    }
    if let Some(list) = self.noun_list_mut(a) {
      *list = b_nouns;
    }
  }
}

impl Ontology {
  /// `(NOUN "it")`, `(VERB "gave")` or `(PREP "to")`
  fn fmt_word(&self, f: &mut fmt::Formatter<'_>, idx: WrapperIdx, indent: usize) -> fmt::Result {
    let label = match self.get(idx).kind {
      WrapperKind::Verb => "VERB",
      WrapperKind::Prep => "PREP",
      _ => "NOUN",
    };
    writeln!(f, "{:pad$}({} \"{}\")", "", label, self.tag(idx), pad = indent * 4)
  }

  /// A labelled list of words, one per line. Nothing is written for an
  /// empty list.
  fn fmt_words(
    &self,
    f: &mut fmt::Formatter<'_>,
    label: &str,
    words: &[WrapperIdx],
    indent: usize,
  ) -> fmt::Result {
    if words.is_empty() {
      return Ok(());
    }
    let pad = indent * 4;
    writeln!(f, "{:pad$}({}", "", label)?;
    for w in words {
      self.fmt_word(f, *w, indent + 1)?;
    }
    writeln!(f, "{:pad$})", "")
  }

  fn fmt_verb_phrase(
    &self,
    f: &mut fmt::Formatter<'_>,
    vp: &VerbPhrase,
    indent: usize,
  ) -> fmt::Result {
    let pad = indent * 4;
    writeln!(f, "{:pad$}(VERB_PHRASE", "")?;
    // NOT follows the first auxiliary slot that is filled
    self.fmt_words(f, "MODAL_VERB", vp.modal_verb.as_slice(), indent + 1)?;
    if vp.negated && vp.modal_verb.is_some() {
      writeln!(f, "{:pad$}(NOT)", "", pad = pad + 4)?;
    }
    self.fmt_words(f, "AUX_VERB", vp.aux_verb.as_slice(), indent + 1)?;
    if vp.negated && vp.modal_verb.is_none() && vp.aux_verb.is_some() {
      writeln!(f, "{:pad$}(NOT)", "", pad = pad + 4)?;
    }
    self.fmt_words(f, "BEEN", vp.been.as_slice(), indent + 1)?;
    if vp.passive {
      writeln!(f, "{:pad$}(PASSIVE_VOICE)", "", pad = pad + 4)?;
    }
    if let Some(verb) = vp.verb {
      self.fmt_word(f, verb, indent + 1)?;
    }
    self.fmt_words(f, "DIRECT_OBJECTS", &vp.direct_objects, indent + 1)?;

    if !vp.prep_phrases.is_empty() {
      writeln!(f, "{:pad$}(PREP_PHRASES", "", pad = pad + 4)?;
      for pp in vp.prep_phrases.iter().filter_map(|pp| self.prep_phrase(*pp)) {
        writeln!(f, "{:pad$}(PREP_PHRASE", "", pad = pad + 8)?;
        if let Some(prep) = pp.prep {
          self.fmt_word(f, prep, indent + 3)?;
        }
        self.fmt_words(f, "INDIRECT_OBJECTS", &pp.indirect_objects, indent + 3)?;
        writeln!(f, "{:pad$})", "", pad = pad + 8)?;
      }
      writeln!(f, "{:pad$})", "", pad = pad + 4)?;
    }
    writeln!(f, "{:pad$})", "")
  }
}

impl fmt::Display for Ontology {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    for sentence in self.sentences.iter().filter_map(|s| self.sentence(*s)) {
      writeln!(f, "(SENTENCE")?;
      if !sentence.clauses.is_empty() {
        writeln!(f, "    (CLAUSES")?;
        for clause in sentence.clauses.iter().filter_map(|c| self.clause(*c)) {
          writeln!(f, "        (CLAUSE")?;
          self.fmt_words(f, "SUBJECTS", &clause.subjects, 3)?;
          if !clause.verb_phrases.is_empty() {
            writeln!(f, "            (VERB_PHRASES")?;
            for vp in clause.verb_phrases.iter().filter_map(|vp| self.verb_phrase(*vp)) {
              self.fmt_verb_phrase(f, vp, 4)?;
            }
            writeln!(f, "            )")?;
          }
          writeln!(f, "        )")?;
        }
        writeln!(f, "    )")?;
      }
      writeln!(f, ")")?;
    }
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_swap_nouns_reparents() {
    let mut o = Ontology::new();
    let clause = o.alloc(None, "CLAUSE", WrapperKind::Clause(Clause::default()));
    let vp = o.alloc(None, "VP", WrapperKind::VerbPhrase(VerbPhrase::default()));
    let it = o.alloc(None, "it", WrapperKind::Noun);
    let me = o.alloc(None, "me", WrapperKind::Noun);

    o.clause_mut(clause).unwrap().subjects.push(it);
    o.set_parent(it, clause);
    o.verb_phrase_mut(vp).unwrap().direct_objects.push(me);
    o.set_parent(me, vp);

    o.swap_nouns(NounList::Subjects(clause), NounList::DirectObjects(vp));

    assert_eq!(o.clause(clause).unwrap().subjects, vec![me]);
    assert_eq!(o.verb_phrase(vp).unwrap().direct_objects, vec![it]);
    assert_eq!(o.get(me).parent, Some(clause));
    assert_eq!(o.get(it).parent, Some(vp));
  }

  #[test]
  fn test_swap_with_wrong_kind_is_noop() {
    let mut o = Ontology::new();
    let clause = o.alloc(None, "CLAUSE", WrapperKind::Clause(Clause::default()));
    let noun = o.alloc(None, "it", WrapperKind::Noun);
    o.clause_mut(clause).unwrap().subjects.push(noun);

    o.swap_nouns(NounList::Subjects(clause), NounList::DirectObjects(noun));
    assert_eq!(o.clause(clause).unwrap().subjects, vec![noun]);
  }

  #[test]
  fn test_empty_verb_phrase() {
    let mut vp = VerbPhrase::default();
    assert!(vp.is_empty());
    vp.negated = true;
    vp.passive = true;
    assert!(vp.is_empty());
    vp.prep_phrases.push(WrapperIdx(0));
    assert!(!vp.is_empty());
  }

  /// A one-clause sentence around the verb phrase `build` makes, rendered
  fn render(build: impl FnOnce(&mut Ontology) -> VerbPhrase) -> String {
    let mut o = Ontology::new();
    let s = o.alloc(None, "S", WrapperKind::Sentence(Sentence::default()));
    let clause = o.alloc(None, "CLAUSE", WrapperKind::Clause(Clause::default()));
    let vp = build(&mut o);
    let vp = o.alloc(None, "VP", WrapperKind::VerbPhrase(vp));
    o.sentence_mut(s).unwrap().clauses.push(clause);
    o.clause_mut(clause).unwrap().verb_phrases.push(vp);
    o.push_sentence(s);
    o.to_string()
  }

  #[test]
  fn test_not_follows_auxiliary() {
    let text = render(|o| VerbPhrase {
      aux_verb: Some(o.alloc(None, "did", WrapperKind::Verb)),
      verb: Some(o.alloc(None, "give", WrapperKind::Verb)),
      negated: true,
      ..VerbPhrase::default()
    });
    let expected = concat!(
      "                    (AUX_VERB\n",
      "                        (VERB \"did\")\n",
      "                    )\n",
      "                    (NOT)\n",
      "                    (VERB \"give\")\n",
    );
    assert!(text.contains(expected), "{}", text);

    // with no auxiliary there is nothing for NOT to follow
    let text = render(|o| VerbPhrase {
      verb: Some(o.alloc(None, "give", WrapperKind::Verb)),
      negated: true,
      ..VerbPhrase::default()
    });
    assert!(!text.contains("(NOT)"));
  }
}
