use std::error::Error;

/// Boxed static error type
pub type Err = Box<dyn Error + 'static>;

/// helper macro for initializing a regex with lazy_static!
macro_rules! regex_static {
  ($name:ident, $pattern:expr) => {
    lazy_static! {
      static ref $name: Regex = Regex::new($pattern).unwrap();
    }
  };
}

/// Every way of picking one element from each set of choices, in
/// lexicographic order of the choices. Clones the elements. An empty list
/// has exactly one (empty) pick; any empty set of choices leaves none.
///
/// ```
/// let v = vec![
///   vec![1],
///   vec![2, 3],
///   vec![4, 5],
/// ];
///
/// assert_eq!(ontoparse::utils::combinations(&v), vec![
///   vec![1, 2, 4],
///   vec![1, 2, 5],
///   vec![1, 3, 4],
///   vec![1, 3, 5],
/// ]);
/// ```
pub fn combinations<T>(list: &[Vec<T>]) -> Vec<Vec<T>>
where
  T: Clone,
{
  list.iter().fold(vec![Vec::new()], |picks, choices| {
    picks
      .iter()
      .flat_map(|pick| {
        choices.iter().map(move |choice| {
          let mut next = pick.clone();
          next.push(choice.clone());
          next
        })
      })
      .collect()
  })
}

#[test]
fn test_combinations_edge_cases() {
  let empty: Vec<Vec<u8>> = Vec::new();
  assert_eq!(combinations(&empty), vec![Vec::<u8>::new()]);
  assert!(combinations(&[vec![1], vec![], vec![2]]).is_empty());
}
