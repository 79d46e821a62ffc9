//! Part-of-speech ambiguity: every word gets a closed list of candidate
//! tags, and every combination of choices is a tagging to try against the
//! grammar.

use std::fmt;

use regex::{Captures, Regex};
use tracing::{debug, info};

/// A word paired with one of its candidate tags
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaggedWord {
  pub word: String,
  pub tag: String,
}

impl TaggedWord {
  pub fn new(word: impl Into<String>, tag: impl Into<String>) -> Self {
    Self {
      word: word.into(),
      tag: tag.into(),
    }
  }

  /// True when the dictionary had nothing for this word
  pub fn is_untagged(&self) -> bool {
    self.word == self.tag
  }
}

impl fmt::Display for TaggedWord {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{{{}}}{}", self.word, self.tag)
  }
}

/// One entry per word, each a non-empty list of candidates
pub type PosTable = Vec<Vec<TaggedWord>>;

/// One index per word into that word's candidates
pub type CandidatePath = Vec<usize>;

/// A complete tagging of a sentence
pub type TaggedPath = Vec<TaggedWord>;

/// Candidate tags for a word from the closed dictionary of ambiguous
/// forms. A word the dictionary doesn't know is its own only candidate.
pub fn candidate_tags(word: &str) -> Vec<String> {
  const CONJ: &[&str] = &[
    "CLAUSE(CONJ)",
    "NP(CONJ)",
    "VP(CONJ)",
    "ADJ(CONJ)",
    "PREP(CONJ)",
  ];

  let tags: &[&str] = match word {
    "be" => &["BE(be)", "CMD(be)"],
    "do" | "does" | "did" => &["DO(do)", "V(do)"],
    "done" => &["VPASTPERF(do)"],
    "for" => &[
      "CLAUSE(CONJ)",
      "NP(CONJ)",
      "VP(CONJ)",
      "ADJ(CONJ)",
      "PREP(CONJ)",
      "PREP",
    ],
    "and" | "nor" | "but" | "or" | "yet" => CONJ,
    "because" => &["CLAUSE(CONJ)"],
    "," => &[
      "CLAUSE(CONJ)",
      "NP(CONJ)",
      "VP(CONJ)",
      "ADJ(CONJ)",
      "PREP(CONJ)",
      "then",
    ],
    "have" | "has" => &["AUX(have)", "V", "V-INFIN"],
    "had" => &["AUX(have)", "V-INFIN", "VPAST", "VPASTPERF"],
    "come" | "run" | "put" => &["V", "VPASTPERF"],
    "read" => &["V", "VPAST", "VPASTPERF"],
    "like" | "likes" | "need" | "needs" | "want" | "wants" | "hate" | "hates" | "kill"
    | "kills" | "meet" | "meets" => &["V", "V-INFIN"],
    "walked" | "jumped" | "crawled" | "lent" | "bought" | "sold" | "told" | "said" | "heard"
    | "listened" | "looked" | "worked" | "slept" | "died" | "liked" | "needed" | "wanted"
    | "hated" | "killed" | "met" => &["VPAST", "VPASTPERF"],
    "quickly" => &["ADV-ADJ", "ADV-V", "ADV-VGERUND_PRE", "ADV-VGERUND_POST"],
    "very" => &["ADV-ADJ"],
    "so" => &["CLAUSE(CONJ)", "ADV-ADJ"],
    "to" => &["to-V", "PREP"],
    "are_or_were" => &["are", "were"],
    "did_or_had_or_would" => &["VPAST(do)", "AUX(have)", "would"],
    "is_or_has_or_poss" => &["SUFFIX-POSS", "is", "AUX(have)"],
    "that" => &["DEM(that)", "WH-WORD(that)"],
    "never" | "ever" | "only" | "just" | "also" | "as-well" | "neither" | "either" | "seldom"
    | "rarely" | "sometimes" | "always" | "often" | "usually" | "frequently" => {
      &["FREQ", "FREQ_EOS"]
    }
    _ => return vec![word.to_string()],
  };

  tags.iter().map(|t| t.to_string()).collect()
}

/// Lower-cases, expands clitics into the pseudo-words the dictionary
/// knows, and splits into words and single punctuation marks
pub fn tokenize(sentence: &str) -> Vec<String> {
  regex_static!(CLITIC, r"(ca|wo)?n't\b|'(re|d|s|ve|ll|m)\b");
  regex_static!(TOKEN, r"[\w\-]+|[^\s\w\-]");

  let lowered = sentence.to_lowercase().replace('\u{2019}', "'");
  let expanded = CLITIC.replace_all(&lowered, |caps: &Captures| {
    match (
      caps.get(1).map(|m| m.as_str()),
      caps.get(2).map(|m| m.as_str()),
    ) {
      (Some("ca"), _) => "can not",
      (Some(_), _) => "will not",
      (None, Some("re")) => " are_or_were",
      (None, Some("d")) => " did_or_had_or_would",
      (None, Some("s")) => " is_or_has_or_poss",
      (None, Some("ve")) => " have",
      (None, Some("ll")) => " will",
      (None, Some("m")) => " am",
      _ => " not",
    }
  });

  TOKEN
    .find_iter(&expanded)
    .map(|m| m.as_str().to_string())
    .collect()
}

/// Tokenizes and looks up every word's candidates
pub fn build_pos_table(sentence: &str) -> PosTable {
  info!("tag pos: {}", sentence);

  tokenize(sentence)
    .into_iter()
    .map(|word| {
      let tags = candidate_tags(&word);
      info!("{{{}}}: {}", word, tags.join(" "));
      tags
        .into_iter()
        .map(|tag| TaggedWord::new(word.clone(), tag))
        .collect::<Vec<_>>()
    })
    .collect()
}

/// Every path through the table, by backtracking over word positions.
/// There are as many paths as the product of the candidate counts; an
/// empty table has exactly one, empty, path.
pub fn enumerate_paths<T>(table: &[Vec<T>]) -> Vec<CandidatePath> {
  let mut paths = Vec::new();
  let mut path_so_far = vec![0; table.len()];
  extend_paths(table, &mut path_so_far, 0, &mut paths);
  paths
}

fn extend_paths<T>(
  table: &[Vec<T>],
  path_so_far: &mut CandidatePath,
  word_index: usize,
  paths: &mut Vec<CandidatePath>,
) {
  if word_index == table.len() {
    // the buffer keeps changing as we backtrack, so record a copy
    paths.push(path_so_far.clone());
    return;
  }

  for pos_index in 0..table[word_index].len() {
    path_so_far[word_index] = pos_index;
    extend_paths(table, path_so_far, word_index + 1, paths);
  }
}

/// The concrete tagging a path picks out of the table
pub fn materialize(table: &PosTable, path: &[usize]) -> TaggedPath {
  table
    .iter()
    .zip(path)
    .map(|(candidates, idx)| candidates[*idx].clone())
    .collect()
}

/// Every tagging of a sentence, in enumeration order
pub fn resolve(sentence: &str) -> Vec<TaggedPath> {
  let table = build_pos_table(sentence);

  info!("enumerate pos paths");
  enumerate_paths(&table)
    .iter()
    .enumerate()
    .map(|(path_index, path)| {
      let tagged = materialize(&table, path);
      debug!(
        "path #{}: {}",
        path_index,
        tagged
          .iter()
          .map(|t| t.to_string())
          .collect::<Vec<_>>()
          .join(" ")
      );
      tagged
    })
    .collect()
}
