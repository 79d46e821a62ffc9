/// Simple recursive-descent parsing of grammar files
use regex::Regex;

use crate::Err;

/// A rule as written, before names are sorted into terminals and
/// nonterminals
#[derive(Debug, Clone, PartialEq)]
pub struct RawRule {
  pub symbol: String,
  pub productions: Vec<String>,
}

/// `Category: label label ...;` maps every label to the category
#[derive(Debug, Clone, PartialEq)]
pub struct LexiconEntry {
  pub category: String,
  pub labels: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
enum Item {
  Rule(RawRule),
  Lexicon(LexiconEntry),
}

type Infallible<'a, T> = (T, &'a str);
type ParseResult<'a, T> = Result<(T, &'a str), Err>;

/// Try to consume a regex, returning None if it doesn't match
fn optional_re<'a>(re: &'static Regex, s: &'a str) -> Infallible<'a, Option<&'a str>> {
  match re.find(s) {
    Some(m) if m.start() == 0 => {
      let (_, rest) = s.split_at(m.end());
      (Some(m.as_str()), rest)
    }
    _ => (None, s),
  }
}

/// Try to consume a regex, failing if it doesn't match
fn needed_re<'a>(re: &'static Regex, s: &'a str) -> ParseResult<'a, &'a str> {
  if let (Some(c), rest) = optional_re(re, s) {
    Ok((c, rest))
  } else {
    Err(format!("couldn't match {} at {}", re, snippet(s)).into())
  }
}

/// Try to consume a char, returning None if it doesn't match
fn optional_char(c: char, s: &str) -> Infallible<Option<char>> {
  match s.strip_prefix(c) {
    Some(rest) => (Some(c), rest),
    None => (None, s),
  }
}

/// The start of the remaining input, for error messages
fn snippet(s: &str) -> &str {
  let end = s.char_indices().nth(24).map_or(s.len(), |(idx, _)| idx);
  &s[..end]
}

/// Skips whitespace and // comments
fn skip_whitespace(s: &str) -> &str {
  regex_static!(WHITESPACE_OR_COMMENT, r"(?:\s+|//[^\n]*)+");
  optional_re(&WHITESPACE_OR_COMMENT, s).1
}

/// Tries to parse a name made of letters, numbers, - and _
fn parse_name(s: &str) -> ParseResult<&str> {
  regex_static!(NAME, r"[a-zA-Z0-9\-_]+");
  needed_re(&NAME, s).map_err(|err| format!("name: {}", err).into())
}

/// A lexicon label is anything up to whitespace or `;`, so raw tag labels
/// like `AUX(have)` and punctuation can be listed
fn parse_label(s: &str) -> ParseResult<&str> {
  regex_static!(LABEL, r"[^\s;]+");
  needed_re(&LABEL, s).map_err(|err| format!("label: {}", err).into())
}

/// Parses `;`-terminated words with `parse_word`
fn parse_list<'a>(
  s: &'a str,
  parse_word: fn(&'a str) -> ParseResult<'a, &'a str>,
) -> ParseResult<'a, Vec<String>> {
  let mut words = Vec::new();
  let mut rem = s;
  loop {
    rem = skip_whitespace(rem);
    if let (Some(_), s) = optional_char(';', rem) {
      return Ok((words, s));
    }
    if rem.is_empty() {
      return Err("unterminated item, expected ;".into());
    }
    let (word, s) = parse_word(rem)?;
    words.push(word.to_string());
    rem = s;
  }
}

/// `Name -> productions;` or `Category: labels;`
fn parse_item(s: &str) -> ParseResult<Item> {
  #![allow(clippy::trivial_regex)]
  regex_static!(ARROW, "->");

  let (name, s) = parse_name(s)?;
  let s = skip_whitespace(s);

  if let (Some(_), s) = optional_char(':', s) {
    let (labels, s) = parse_list(s, parse_label).map_err(|e| format!("lexicon {}: {}", name, e))?;
    return Ok((
      Item::Lexicon(LexiconEntry {
        category: name.to_string(),
        labels,
      }),
      s,
    ));
  }

  let (_, s) = needed_re(&ARROW, s).map_err(|e| -> Err { format!("rule arrow: {}", e).into() })?;
  let (productions, s) =
    parse_list(s, parse_name).map_err(|e| format!("rule {}: {}", name, e))?;
  Ok((
    Item::Rule(RawRule {
      symbol: name.to_string(),
      productions,
    }),
    s,
  ))
}

/// Parses grammar text into its rules and lexicon entries, in order
pub fn parse(s: &str) -> Result<(Vec<RawRule>, Vec<LexiconEntry>), Err> {
  let mut rules = Vec::new();
  let mut lexicon = Vec::new();
  let mut rem = s;
  loop {
    rem = skip_whitespace(rem);
    if rem.is_empty() {
      return Ok((rules, lexicon));
    }
    let (item, s) = parse_item(rem)?;
    match item {
      Item::Rule(rule) => rules.push(rule),
      Item::Lexicon(entry) => lexicon.push(entry),
    }
    rem = s;
  }
}
