//! Fixed lexer ids for the token categories and productions that the
//! ontology extractor classifies on. Grammars are free to declare other
//! names; those get ids above [`FIRST_GRAMMAR_ID`].

use std::collections::HashMap;

/// Opaque integer identifying a grammar production or token category
pub type LexerId = u32;

/// Ids below this are reserved for the fixed table
pub const FIRST_GRAMMAR_ID: LexerId = 1000;

macro_rules! lexer_ids {
  ($($id:ident = $value:expr => $name:expr,)*) => {
    $(pub const $id: LexerId = $value;)*

    const KNOWN: &[(&str, LexerId)] = &[$(($name, $id),)*];
  };
}

lexer_ids! {
  ID_S = 1 => "S",
  ID_CLAUSE = 2 => "CLAUSE",
  ID_N = 3 => "N",
  ID_DEM = 4 => "DEM",
  ID_V = 5 => "V",
  ID_VPAST = 6 => "VPAST",
  ID_VGERUND = 7 => "VGERUND",
  ID_VPASTPERF = 8 => "VPASTPERF",
  ID_BE = 9 => "BE",
  ID_BEING = 10 => "BEING",
  ID_BEEN = 11 => "BEEN",
  ID_DO = 12 => "DO",
  ID_HAVE = 13 => "HAVE",
  ID_MODAL = 14 => "MODAL",
  ID_AUX_V = 15 => "AUX_V",
  ID_AUX_NOT_V = 16 => "AUX_NOT_V",
  ID_BE_TARGET = 17 => "BE_TARGET",
  ID_HAVE_TARGET = 18 => "HAVE_TARGET",
  ID_VP = 19 => "VP",
  ID_V_NP = 20 => "V_NP",
  ID_VPAST_NP = 21 => "VPAST_NP",
  ID_VGERUND_NP = 22 => "VGERUND_NP",
  ID_BE_NOT_OR_FREQ = 23 => "BE_NOT_OR_FREQ",
  ID_DO_NOT_OR_FREQ = 24 => "DO_NOT_OR_FREQ",
  ID_HAVE_NOT_OR_FREQ = 25 => "HAVE_NOT_OR_FREQ",
  ID_MODAL_NOT_OR_FREQ = 26 => "MODAL_NOT_OR_FREQ",
  ID_PREP = 27 => "PREP",
  ID_PREP_NP = 28 => "PREP_NP",
  ID_NOT = 29 => "NOT",
}

lazy_static! {
  static ref BY_NAME: HashMap<&'static str, LexerId> = KNOWN.iter().copied().collect();
  static ref BY_ID: HashMap<LexerId, &'static str> =
    KNOWN.iter().map(|(name, id)| (*id, *name)).collect();
}

/// Id of a name in the fixed table, if it has one
pub fn known_id(name: &str) -> Option<LexerId> {
  BY_NAME.get(name).copied()
}

/// Name of an id in the fixed table, if it has one
pub fn known_name(id: LexerId) -> Option<&'static str> {
  BY_ID.get(&id).copied()
}

#[test]
fn test_known_ids_round_trip() {
  assert_eq!(known_id("PREP_NP"), Some(ID_PREP_NP));
  assert_eq!(known_name(ID_BE_TARGET), Some("BE_TARGET"));
  assert_eq!(known_id("NOM"), None);
  assert!(KNOWN.iter().all(|(_, id)| *id < FIRST_GRAMMAR_ID));
}
