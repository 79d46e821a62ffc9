use std::fmt;
use std::rc::Rc;

use crate::grammar::Grammar;
use crate::rules::{Production, Rule};

/// A dotted rule together with where it started
#[derive(Debug, Clone, PartialEq)]
pub struct Item {
  pub rule: Rc<Rule>,
  pub dot: usize,
  pub origin: usize,
}

impl Item {
  pub fn new(rule: &Rc<Rule>, origin: usize) -> Self {
    Self {
      rule: rule.clone(),
      dot: 0,
      origin,
    }
  }

  pub fn is_complete(&self) -> bool {
    self.dot >= self.rule.len()
  }

  pub fn advance(&self) -> Self {
    assert!(!self.is_complete(), "tried to advance a complete item");
    Self {
      rule: self.rule.clone(),
      dot: self.dot + 1,
      origin: self.origin,
    }
  }

  pub fn next_production(&self) -> Option<&Production> {
    self.rule.productions.get(self.dot)
  }
}

impl fmt::Display for Item {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{} →", self.rule.symbol)?;
    for (idx, p) in self.rule.productions.iter().enumerate() {
      if idx == self.dot {
        write!(f, " ・")?;
      }
      write!(f, " {}", p)?;
    }
    if self.is_complete() {
      write!(f, " ・")?;
    }
    Ok(())
  }
}

/// Item sets, one per input position plus one for the end
#[derive(Debug)]
pub struct Chart(Vec<Vec<Item>>);

impl Chart {
  pub fn new(length: usize) -> Self {
    Self(vec![Vec::new(); length])
  }

  pub fn len(&self) -> usize {
    self.0.len()
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }

  pub fn len_at(&self, k: usize) -> usize {
    self.0[k].len()
  }

  pub fn add(&mut self, k: usize, item: Item) {
    if !self.0[k].contains(&item) {
      self.0[k].push(item);
    }
  }

  /// An owned copy, so the chart can be mutated while the item is processed
  fn get_item(&self, k: usize, idx: usize) -> Item {
    self.0[k][idx].clone()
  }
}

impl IntoIterator for Chart {
  type Item = (usize, Vec<Item>);
  type IntoIter = std::iter::Enumerate<std::vec::IntoIter<Vec<Item>>>;

  fn into_iter(self) -> Self::IntoIter {
    self.0.into_iter().enumerate()
  }
}

impl fmt::Display for Chart {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    for (k, items) in self.0.iter().enumerate() {
      writeln!(f, "Set {}:", k)?;
      for item in items {
        writeln!(f, "  {}..{}: {}", item.origin, k, item)?;
      }
    }
    Ok(())
  }
}

/// Runs the recognizer over a sequence of token categories
pub fn parse_chart<S: AsRef<str>>(g: &Grammar, input: &[S]) -> Chart {
  let mut chart = Chart::new(input.len() + 1);

  for rule in g.rules_for(&g.start) {
    chart.add(0, Item::new(rule, 0));
  }

  for k in 0..chart.len() {
    // the set at k grows while it is being processed
    let mut idx = 0;
    while idx < chart.len_at(k) {
      let item = chart.get_item(k, idx);
      idx += 1;

      match item.next_production() {
        None => completer(&mut chart, k, &item),
        Some(Production::Nonterminal(symbol)) => predictor(g, &mut chart, k, &item, &symbol.name),
        Some(Production::Terminal(category)) => {
          if input.get(k).is_some_and(|token| token.as_ref() == category.as_str()) {
            chart.add(k + 1, item.advance());
          }
        }
      }
    }
  }

  chart
}

/// Advances every item at the origin that was waiting on the completed
/// item's symbol
fn completer(chart: &mut Chart, k: usize, item: &Item) {
  for idx in 0..chart.len_at(item.origin) {
    let waiting = chart.get_item(item.origin, idx);
    if waiting
      .next_production()
      .is_some_and(|p| p.symbol_str() == item.rule.symbol_str())
    {
      chart.add(k, waiting.advance());
    }
  }
}

fn predictor(g: &Grammar, chart: &mut Chart, k: usize, item: &Item, needed: &str) {
  for rule in g.rules_for(needed) {
    chart.add(k, Item::new(rule, k));
  }

  // completion won't revisit this item for an empty match, so skip the
  // nullable symbol here
  if g.is_nullable(needed) {
    chart.add(k, item.advance());
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_recognizes_sentence() {
    let g: Grammar = r#"
      S -> NP VP;
      NP -> N;
      NP -> DET N;
      VP -> V NP;
    "#
    .parse()
    .unwrap();

    let accepts = |input: &[&str]| {
      let chart = parse_chart(&g, input);
      chart
        .into_iter()
        .last()
        .is_some_and(|(_, items)| {
          items
            .iter()
            .any(|i| i.origin == 0 && i.is_complete() && i.rule.symbol_str() == "S")
        })
    };

    assert!(accepts(&["N", "V", "DET", "N"]));
    assert!(!accepts(&["N", "V"]));
    assert!(!accepts(&[]));
  }

  #[test]
  fn test_nullable_is_skipped() {
    let g: Grammar = r#"
      S -> OPT x;
      OPT -> ;
      OPT -> y;
    "#
    .parse()
    .unwrap();

    let chart = parse_chart(&g, &["x"]);
    let (_, last) = chart.into_iter().last().unwrap();
    assert!(last.iter().any(|i| i.rule.symbol_str() == "S" && i.is_complete()));
  }
}
