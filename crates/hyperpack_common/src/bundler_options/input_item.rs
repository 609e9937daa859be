use std::borrow::Cow;

use serde::{Deserialize, Serialize};

/// An entry point: `"src/main.js"` or `{ "name": "main", "import": "src/main.js" }`.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawInputItem")]
pub struct InputItem {
  pub name: Option<String>,
  pub import: String,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawInputItem {
  Import(String),
  Item { name: Option<String>, import: String },
}

impl From<RawInputItem> for InputItem {
  fn from(value: RawInputItem) -> Self {
    match value {
      RawInputItem::Import(import) => Self { name: None, import },
      RawInputItem::Item { name, import } => Self { name, import },
    }
  }
}

impl From<&str> for InputItem {
  fn from(value: &str) -> Self {
    Self { name: None, import: value.to_string() }
  }
}

impl From<Cow<'_, str>> for InputItem {
  fn from(value: Cow<'_, str>) -> Self {
    Self { name: None, import: value.to_string() }
  }
}
