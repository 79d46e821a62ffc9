use std::fmt;
use std::rc::Rc;

use crate::earley::Chart;
use crate::grammar::Grammar;
use crate::rules::Rule;
use crate::syntree::{Constituent, SynTree, Token};
use crate::utils::combinations;

/// Completed items, indexed by origin. There is one origin per input
/// position plus one for the end, where only empty constituents start.
#[derive(Debug, Clone, PartialEq)]
pub struct Forest(Vec<Vec<Constituent>>);

impl Forest {
  pub fn len(&self) -> usize {
    self.0.len()
  }

  /// The position after the last token
  fn end(&self) -> usize {
    self.len().saturating_sub(1)
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }

  /// A branch with no children yet still needs `extend_out`; leaves and
  /// filled-in branches are done
  fn subtree_is_complete(node: &SynTree) -> bool {
    match node.get_branch() {
      Some((cons, children)) => cons.rule.len() == children.len(),
      None => true,
    }
  }

  /// Every sequence of subtrees that covers `search_start..search_end`
  /// with `rule`'s productions from `prod_idx` on. Nonterminals are
  /// returned as unfilled branches.
  fn extend_out(
    &self,
    rule: &Rule,
    prod_idx: usize,
    search_start: usize,
    search_end: usize,
  ) -> Vec<Vec<SynTree>> {
    if prod_idx == rule.len() {
      return if search_start == search_end {
        vec![Vec::new()]
      } else {
        Vec::new()
      };
    }

    let next_production = &rule.productions[prod_idx];
    if next_production.is_nonterminal() {
      // a used-up span can still take empty constituents
      let wanted_symbol = next_production.symbol_str();
      self.0[search_start]
        .iter()
        .filter(|c| c.span.1 <= search_end && c.rule.symbol_str() == wanted_symbol)
        .flat_map(|cons| {
          self
            .extend_out(rule, prod_idx + 1, cons.span.1, search_end)
            .into_iter()
            .map(move |mut seq| {
              seq.insert(0, SynTree::Branch(cons.clone(), Vec::new()));
              seq
            })
        })
        .collect()
    } else if search_start == search_end {
      Vec::new()
    } else {
      let leaf = SynTree::Leaf(Token {
        category: next_production.symbol_str().to_string(),
        position: search_start,
      });

      self
        .extend_out(rule, prod_idx + 1, search_start + 1, search_end)
        .into_iter()
        .map(move |mut seq| {
          seq.insert(0, leaf.clone());
          seq
        })
        .collect()
    }
  }

  /// All trees an unfilled branch stands for
  fn make_trees(&self, tree: SynTree) -> Vec<SynTree> {
    if Self::subtree_is_complete(&tree) {
      return vec![tree];
    }

    let SynTree::Branch(cons, _) = tree else {
      return Vec::new();
    };

    self
      .extend_out(&cons.rule, 0, cons.span.0, cons.span.1)
      .into_iter()
      .flat_map(|children| {
        let child_sets = children
          .into_iter()
          .map(|child| self.make_trees(child))
          .collect::<Vec<_>>();
        combinations(&child_sets)
          .into_iter()
          .map(|set| SynTree::Branch(cons.clone(), set))
          .collect::<Vec<_>>()
      })
      .collect()
  }

  /// The tree `make_trees` would list first, found without building the
  /// others
  fn first_completion(&self, tree: SynTree) -> Option<SynTree> {
    if Self::subtree_is_complete(&tree) {
      return Some(tree);
    }

    let SynTree::Branch(cons, _) = tree else {
      return None;
    };

    self
      .extend_out(&cons.rule, 0, cons.span.0, cons.span.1)
      .into_iter()
      .find_map(|children| {
        children
          .into_iter()
          .map(|child| self.first_completion(child))
          .collect::<Option<Vec<_>>>()
          .map(|children| SynTree::Branch(cons.clone(), children))
      })
  }

  /// Start-symbol constituents spanning the whole input, as unfilled
  /// branches
  fn roots<'a>(&'a self, g: &'a Grammar) -> impl Iterator<Item = SynTree> + 'a {
    let end = self.end();
    self
      .0
      .first()
      .into_iter()
      .flatten()
      .filter(move |c| c.span.1 == end && c.rule.symbol_str() == g.start)
      .map(|c| SynTree::Branch(c.clone(), Vec::new()))
  }

  /// Every tree rooted at the start symbol spanning the whole input
  pub fn trees(&self, g: &Grammar) -> Vec<SynTree> {
    self.roots(g).flat_map(|root| self.make_trees(root)).collect()
  }

  /// The first of `trees`, without enumerating the rest
  pub fn first_tree(&self, g: &Grammar) -> Option<SynTree> {
    self.roots(g).find_map(|root| self.first_completion(root))
  }
}

impl From<Chart> for Forest {
  fn from(chart: Chart) -> Self {
    let mut v = vec![Vec::new(); chart.len()];

    for (k, items) in chart.into_iter() {
      for item in items {
        if item.is_complete() {
          v[item.origin].push(Constituent {
            rule: Rc::clone(&item.rule),
            span: (item.origin, k),
          });
        }
      }
    }

    Self(v)
  }
}

impl fmt::Display for Forest {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    for (k, constituents) in self.0.iter().enumerate() {
      writeln!(f, "Origin {}:", k)?;
      for c in constituents {
        writeln!(f, "  {}", c)?;
      }
    }
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::earley::parse_chart;

  fn ambiguous() -> Grammar {
    r#"
      S -> x;
      S -> S S;
    "#
    .parse()
    .unwrap()
  }

  #[test]
  fn test_forest_from_chart() {
    let g = ambiguous();
    let forest: Forest = parse_chart(&g, &["x", "x", "x"]).into();

    assert_eq!(forest.len(), 4);
    let spans = |origin: usize| {
      let mut spans = forest.0[origin].iter().map(|c| c.span).collect::<Vec<_>>();
      spans.sort_unstable();
      spans.dedup();
      spans
    };
    assert_eq!(spans(0), vec![(0, 1), (0, 2), (0, 3)]);
    assert_eq!(spans(1), vec![(1, 2), (1, 3)]);
    assert_eq!(spans(2), vec![(2, 3)]);
    assert!(spans(3).is_empty());
  }

  #[test]
  fn test_tree_generation() {
    // [x][xx] and [xx][x], with no spurious [x][x] or [xx][xx]
    let g = ambiguous();
    let forest: Forest = parse_chart(&g, &["x", "x", "x"]).into();
    let trees = forest.trees(&g);
    assert_eq!(trees.len(), 2);

    for tree in &trees {
      let (cons, children) = tree.get_branch().unwrap();
      assert_eq!(cons.span, (0, 3));
      assert_eq!(children.len(), 2);
    }
  }

  #[test]
  fn test_no_trees_for_rejected_input() {
    let g = ambiguous();
    let forest: Forest = parse_chart(&g, &["y"]).into();
    assert!(forest.trees(&g).is_empty());

    let empty: Forest = parse_chart::<&str>(&g, &[]).into();
    assert_eq!(empty.len(), 1);
    assert!(empty.trees(&g).is_empty());
    assert!(empty.first_tree(&g).is_none());
  }

  #[test]
  fn test_first_tree_is_first_of_trees() {
    let g = ambiguous();
    let forest: Forest = parse_chart(&g, &["x", "x", "x", "x"]).into();
    let trees = forest.trees(&g);
    assert_eq!(trees.len(), 5);
    assert_eq!(forest.first_tree(&g), trees.into_iter().next());
  }

  #[test]
  fn test_empty_constituents() {
    let trailing: Grammar = "S -> x A; A -> ;".parse().unwrap();
    let forest: Forest = parse_chart(&trailing, &["x"]).into();
    let trees = forest.trees(&trailing);
    assert_eq!(trees.len(), 1);
    let (cons, children) = trees[0].get_branch().unwrap();
    assert_eq!(cons.span, (0, 1));
    assert_eq!(children.len(), 2);
    let (empty, grandchildren) = children[1].get_branch().unwrap();
    assert_eq!(empty.span, (1, 1));
    assert!(grandchildren.is_empty());
    assert_eq!(forest.first_tree(&trailing).as_ref(), trees.first());

    let leading: Grammar = "S -> A x; A -> ;".parse().unwrap();
    let forest: Forest = parse_chart(&leading, &["x"]).into();
    assert_eq!(forest.trees(&leading).len(), 1);

    // a nullable start symbol accepts no input at all
    let only_empty: Grammar = "S -> A; A -> ;".parse().unwrap();
    let forest: Forest = parse_chart::<&str>(&only_empty, &[]).into();
    assert_eq!(forest.trees(&only_empty).len(), 1);
    assert!(forest.first_tree(&only_empty).is_some());
  }
}
