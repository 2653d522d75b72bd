use std::borrow::Cow;
use std::collections::BTreeMap;

/// The replaceable table of emitted assets, keyed by asset name.
///
/// Names are output-relative, forward-slash paths such as `pages/home/index.js`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AssetTable {
  assets: BTreeMap<String, Vec<u8>>,
}

impl AssetTable {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn insert(&mut self, name: impl Into<String>, contents: impl Into<Vec<u8>>) {
    self.assets.insert(name.into(), contents.into());
  }

  pub fn contains(&self, name: &str) -> bool {
    self.assets.contains_key(name)
  }

  pub fn get(&self, name: &str) -> Option<&[u8]> {
    self.assets.get(name).map(Vec::as_slice)
  }

  /// Source text of an asset. Invalid UTF-8 is replaced rather than rejected.
  pub fn source(&self, name: &str) -> Option<Cow<'_, str>> {
    self.get(name).map(String::from_utf8_lossy)
  }

  /// Replaces the contents of an existing asset. Returns false when there is no such asset.
  pub fn replace(&mut self, name: &str, contents: impl Into<Vec<u8>>) -> bool {
    match self.assets.get_mut(name) {
      Some(existing) => {
        *existing = contents.into();
        true
      }
      None => false,
    }
  }

  pub fn names(&self) -> impl Iterator<Item = &str> {
    self.assets.keys().map(String::as_str)
  }

  pub fn iter(&self) -> impl Iterator<Item = (&str, &[u8])> {
    self
      .assets
      .iter()
      .map(|(name, contents)| (name.as_str(), contents.as_slice()))
  }

  pub fn len(&self) -> usize {
    self.assets.len()
  }

  pub fn is_empty(&self) -> bool {
    self.assets.is_empty()
  }
}

impl<N: Into<String>, C: Into<Vec<u8>>> FromIterator<(N, C)> for AssetTable {
  fn from_iter<T: IntoIterator<Item = (N, C)>>(iter: T) -> Self {
    let mut table = AssetTable::new();
    for (name, contents) in iter {
      table.insert(name, contents);
    }
    table
  }
}
