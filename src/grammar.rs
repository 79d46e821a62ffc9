use std::collections::{HashMap, HashSet};
use std::fmt;
use std::fs;
use std::path::Path;
use std::rc::Rc;
use std::str::FromStr;

use regex::Regex;
use tracing::debug;

use crate::lexer_id::{known_id, known_name, LexerId, FIRST_GRAMMAR_ID};
use crate::parse_grammar::{parse, LexiconEntry, RawRule};
use crate::pos::TaggedWord;
use crate::rules::{Production, Rule, Symbol};
use crate::Err;

/// A context-free grammar over token categories, plus a lexicon mapping
/// tag labels and bare words onto those categories.
#[derive(Debug)]
pub struct Grammar {
  pub start: String,
  pub rules: HashMap<String, Vec<Rc<Rule>>>,
  nullables: HashSet<String>,
  lexicon: HashMap<String, String>,
  ids: HashMap<String, LexerId>,
  names: HashMap<LexerId, String>,
}

impl fmt::Display for Grammar {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    writeln!(f, "//** start: {}", self.start)?;

    write!(f, "//** nullables:")?;
    for nt in self.nullables.iter() {
      write!(f, " {}", nt)?;
    }
    writeln!(f)?;

    for rule in self.rules.values().flatten() {
      writeln!(f, "{}", rule)?;
    }

    let mut by_category: HashMap<&str, Vec<&str>> = HashMap::new();
    for (label, category) in self.lexicon.iter() {
      by_category
        .entry(category.as_str())
        .or_default()
        .push(label.as_str());
    }
    for (category, mut labels) in by_category {
      labels.sort_unstable();
      writeln!(f, "{}: {};", category, labels.join(" "))?;
    }

    Ok(())
  }
}

impl Grammar {
  /// Builds a grammar from parsed items. The first rule's symbol is the
  /// start symbol; names that never head a rule are terminals.
  pub fn new(raw_rules: Vec<RawRule>, entries: Vec<LexiconEntry>) -> Result<Self, Err> {
    if raw_rules.is_empty() {
      return Err("empty ruleset".into());
    }

    let start = raw_rules[0].symbol.clone();
    let heads: HashSet<&str> = raw_rules.iter().map(|r| r.symbol.as_str()).collect();

    let mut ids = HashMap::new();
    let mut names = HashMap::new();
    let mut next_id = FIRST_GRAMMAR_ID;
    let mut assign = |name: &str| {
      if ids.contains_key(name) {
        return;
      }
      let id = known_id(name).unwrap_or_else(|| {
        next_id += 1;
        next_id - 1
      });
      ids.insert(name.to_string(), id);
      names.insert(id, name.to_string());
    };

    let mut rules: HashMap<String, Vec<Rc<Rule>>> = HashMap::new();
    for raw in raw_rules.iter() {
      assign(&raw.symbol);
      let productions = raw
        .productions
        .iter()
        .map(|name| {
          assign(name);
          if heads.contains(name.as_str()) {
            Production::Nonterminal(Symbol::new(name.clone()))
          } else {
            Production::Terminal(name.clone())
          }
        })
        .collect();

      rules.entry(raw.symbol.clone()).or_default().push(Rc::new(Rule {
        symbol: Symbol::new(raw.symbol.clone()),
        productions,
      }));
    }

    let mut lexicon = HashMap::new();
    for entry in entries {
      if heads.contains(entry.category.as_str()) {
        return Err(format!("lexicon category {} is also a rule", entry.category).into());
      }
      assign(&entry.category);
      for label in entry.labels {
        if let Some(prev) = lexicon.insert(label.clone(), entry.category.clone()) {
          if prev != entry.category {
            return Err(
              format!("{} is listed as both {} and {}", label, prev, entry.category).into(),
            );
          }
        }
      }
    }

    let nullables = Self::find_nullables(&rules);

    Ok(Self {
      start,
      rules,
      nullables,
      lexicon,
      ids,
      names,
    })
  }

  pub fn read_from_file<P: AsRef<Path>>(path: P) -> Result<Self, Err> {
    fs::read_to_string(path)?.parse()
  }

  /// The bundled grammar of simple English clauses
  pub fn english() -> Result<Self, Err> {
    include_str!("../grammars/english.cfg").parse()
  }

  fn rule_is_nullable(nullables: &HashSet<String>, rule: &Rule) -> bool {
    rule.is_empty()
      || rule
        .productions
        .iter()
        .all(|p| nullables.contains(p.symbol_str()))
  }

  fn find_nullables(rules: &HashMap<String, Vec<Rc<Rule>>>) -> HashSet<String> {
    let mut nullables: HashSet<String> = HashSet::new();

    let mut last_length = 1;
    while last_length != nullables.len() {
      last_length = nullables.len();
      for r in rules.values().flatten() {
        if !nullables.contains(&r.symbol.name) && Self::rule_is_nullable(&nullables, r) {
          nullables.insert(r.symbol.name.clone());
        }
      }
    }

    nullables
  }

  pub fn is_nullable(&self, s: &str) -> bool {
    self.nullables.contains(s)
  }

  /// Rules headed by `symbol`; empty for terminals
  pub fn rules_for(&self, symbol: &str) -> &[Rc<Rule>] {
    self.rules.get(symbol).map(Vec::as_slice).unwrap_or(&[])
  }

  pub fn name_to_id(&self, name: &str) -> Option<LexerId> {
    self.ids.get(name).copied()
  }

  pub fn id_to_name(&self, id: LexerId) -> Option<&str> {
    self
      .names
      .get(&id)
      .map(String::as_str)
      .or_else(|| known_name(id))
  }

  /// The token category a tagged word scans as. The lexicon is consulted
  /// first; otherwise a real tag is normalized (`X(word)` to `X`,
  /// `X(QUAL)` to `X_QUAL`, `-` to `_`). An untagged word the lexicon
  /// doesn't list is unknown.
  pub fn categorize(&self, tagged: &TaggedWord) -> Result<String, Err> {
    if let Some(category) = self.lexicon.get(&tagged.tag) {
      return Ok(category.clone());
    }
    if tagged.is_untagged() {
      return Err(format!("unknown word: {}", tagged.word).into());
    }

    let category = normalize_tag(&tagged.tag);
    debug!("{} scans as {}", tagged, category);
    Ok(category)
  }
}

fn normalize_tag(tag: &str) -> String {
  regex_static!(QUALIFIED, r"^([^()]+)\(([^()]*)\)$");

  let base = match QUALIFIED.captures(tag) {
    Some(caps) => {
      let qualifier = &caps[2];
      if !qualifier.is_empty() && qualifier.chars().all(|c| c.is_ascii_uppercase()) {
        format!("{}_{}", &caps[1], qualifier)
      } else {
        caps[1].to_string()
      }
    }
    None => tag.to_string(),
  };

  base.replace('-', "_").to_ascii_uppercase()
}

impl FromStr for Grammar {
  type Err = Err;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let (rules, lexicon) = parse(s)?;
    Self::new(rules, lexicon)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::lexer_id::{ID_N, ID_S, ID_VP};

  fn toy() -> Grammar {
    r#"
      S -> NP VP;
      NP -> N;
      NP -> DET N;
      VP -> V NP;
      OPT -> ;
      N: cat dog;
      DET: the;
      HAVE: AUX(have);
    "#
    .parse()
    .unwrap()
  }

  #[test]
  fn test_terminals_and_nullables() {
    let g = toy();
    assert_eq!(g.start, "S");
    assert!(g.rules_for("N").is_empty());
    assert_eq!(g.rules_for("NP").len(), 2);
    assert!(g.rules_for("VP")[0].productions[0].is_terminal());
    assert!(g.rules_for("S")[0].productions[1].is_nonterminal());
    assert!(g.is_nullable("OPT"));
    assert!(!g.is_nullable("NP"));
  }

  #[test]
  fn test_ids() {
    let g = toy();
    assert_eq!(g.name_to_id("S"), Some(ID_S));
    assert_eq!(g.name_to_id("VP"), Some(ID_VP));
    assert_eq!(g.name_to_id("N"), Some(ID_N));

    let np = g.name_to_id("NP").unwrap();
    let det = g.name_to_id("DET").unwrap();
    assert!(np >= FIRST_GRAMMAR_ID && det >= FIRST_GRAMMAR_ID);
    assert_ne!(np, det);
    assert_eq!(g.id_to_name(np), Some("NP"));
    assert_eq!(g.id_to_name(ID_VP), Some("VP"));
    assert_eq!(g.name_to_id("nope"), None);
  }

  #[test]
  fn test_categorize() {
    let g = toy();
    let cat = |word: &str, tag: &str| g.categorize(&TaggedWord::new(word, tag)).ok();

    assert_eq!(cat("cat", "cat"), Some("N".to_string()));
    assert_eq!(cat("has", "AUX(have)"), Some("HAVE".to_string()));
    assert_eq!(cat("to", "PREP"), Some("PREP".to_string()));
    assert_eq!(cat("to", "to-V"), Some("TO_V".to_string()));
    assert_eq!(cat("did", "DO(do)"), Some("DO".to_string()));
    assert_eq!(cat(",", "CLAUSE(CONJ)"), Some("CLAUSE_CONJ".to_string()));
    assert_eq!(cat(",", "then"), Some("THEN".to_string()));
    assert_eq!(cat("zebra", "zebra"), None);
  }

  #[test]
  fn test_invalid_grammars() {
    assert!("".parse::<Grammar>().is_err());
    assert!("N: cat;".parse::<Grammar>().is_err());
    assert!("S -> N; S: cat;".parse::<Grammar>().is_err());
    assert!("S -> N V; N: walk; V: walk;".parse::<Grammar>().is_err());
  }

  #[test]
  fn test_bundled_grammar_loads() {
    let g = Grammar::english().unwrap();
    assert_eq!(g.start, "S");
    assert!(!g.rules_for("CLAUSE").is_empty());
    assert_eq!(g.name_to_id("PREP_NP"), known_id("PREP_NP"));
  }
}
