//! Loosely-typed engine values.
//!
//! libmpv hands back every property as a tagged `mpv_node`. This module is the
//! single place where those trees are decoded into host-native types, with a
//! fixed default whenever the tag does not match what the caller asked for.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A value as the engine sees it.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Node {
  #[default]
  None,
  Flag(bool),
  Int64(i64),
  Double(f64),
  String(String),
  Array(Vec<Node>),
  Map(BTreeMap<String, Node>),
}

impl Node {
  pub fn is_none(&self) -> bool {
    matches!(self, Node::None)
  }

  /// Boolean view. Strings follow mpv's `yes`/`no` convention; numbers are
  /// true when non-zero.
  pub fn as_bool(&self) -> bool {
    match self {
      Node::Flag(b) => *b,
      Node::Int64(n) => *n != 0,
      Node::Double(d) => *d != 0.0,
      Node::String(s) => !matches!(s.as_str(), "" | "no" | "false" | "0"),
      _ => false,
    }
  }

  /// Integer view, `0` on mismatch. Doubles are truncated.
  pub fn as_i64(&self) -> i64 {
    match self {
      Node::Int64(n) => *n,
      Node::Double(d) => *d as i64,
      Node::Flag(b) => i64::from(*b),
      Node::String(s) => {
        let s = s.trim();
        s.parse::<i64>()
          .ok()
          .or_else(|| s.parse::<f64>().ok().map(|d| d as i64))
          .unwrap_or(0)
      }
      _ => 0,
    }
  }

  /// Floating point view, `0.0` on mismatch.
  pub fn as_f64(&self) -> f64 {
    match self {
      Node::Double(d) => *d,
      Node::Int64(n) => *n as f64,
      Node::Flag(b) => f64::from(u8::from(*b)),
      Node::String(s) => s.trim().parse::<f64>().unwrap_or(0.0),
      _ => 0.0,
    }
  }

  /// String view, empty on mismatch. Flags render as `yes`/`no`.
  pub fn as_string(&self) -> String {
    match self {
      Node::String(s) => s.clone(),
      Node::Int64(n) => n.to_string(),
      Node::Double(d) => d.to_string(),
      Node::Flag(b) => if *b { "yes" } else { "no" }.to_string(),
      _ => String::new(),
    }
  }

  pub fn as_array(&self) -> &[Node] {
    match self {
      Node::Array(items) => items,
      _ => &[],
    }
  }

  pub fn as_map(&self) -> Option<&BTreeMap<String, Node>> {
    match self {
      Node::Map(map) => Some(map),
      _ => None,
    }
  }

  /// Look up a key in a map node. Missing keys and non-maps yield `Node::None`.
  pub fn get(&self, key: &str) -> &Node {
    static NONE: Node = Node::None;
    self.as_map().and_then(|map| map.get(key)).unwrap_or(&NONE)
  }
}

impl From<bool> for Node {
  fn from(value: bool) -> Self {
    Node::Flag(value)
  }
}

impl From<i64> for Node {
  fn from(value: i64) -> Self {
    Node::Int64(value)
  }
}

impl From<i32> for Node {
  fn from(value: i32) -> Self {
    Node::Int64(i64::from(value))
  }
}

impl From<f64> for Node {
  fn from(value: f64) -> Self {
    Node::Double(value)
  }
}

impl From<&str> for Node {
  fn from(value: &str) -> Self {
    Node::String(value.to_string())
  }
}

impl From<String> for Node {
  fn from(value: String) -> Self {
    Node::String(value)
  }
}

impl From<Vec<Node>> for Node {
  fn from(value: Vec<Node>) -> Self {
    Node::Array(value)
  }
}

impl From<BTreeMap<String, Node>> for Node {
  fn from(value: BTreeMap<String, Node>) -> Self {
    Node::Map(value)
  }
}

impl From<serde_json::Value> for Node {
  fn from(value: serde_json::Value) -> Self {
    match value {
      serde_json::Value::Null => Node::None,
      serde_json::Value::Bool(b) => Node::Flag(b),
      serde_json::Value::Number(n) => match n.as_i64() {
        Some(i) => Node::Int64(i),
        None => Node::Double(n.as_f64().unwrap_or(0.0)),
      },
      serde_json::Value::String(s) => Node::String(s),
      serde_json::Value::Array(items) => Node::Array(items.into_iter().map(Node::from).collect()),
      serde_json::Value::Object(map) => {
        Node::Map(map.into_iter().map(|(k, v)| (k, Node::from(v))).collect())
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_defaults_on_mismatch() {
    let map = Node::Map(BTreeMap::new());
    assert!(!map.as_bool());
    assert_eq!(map.as_i64(), 0);
    assert_eq!(map.as_f64(), 0.0);
    assert_eq!(map.as_string(), "");
    assert!(map.as_array().is_empty());
    assert!(Node::None.as_map().is_none());
  }

  #[test]
  fn test_numeric_coercions() {
    assert_eq!(Node::Double(42.9).as_i64(), 42);
    assert_eq!(Node::Int64(7).as_f64(), 7.0);
    assert_eq!(Node::from("12").as_i64(), 12);
    assert_eq!(Node::from("12.5").as_i64(), 12);
    assert_eq!(Node::from("1.5").as_f64(), 1.5);
    assert_eq!(Node::Flag(true).as_i64(), 1);
  }

  #[test]
  fn test_string_flags() {
    assert!(Node::from("yes").as_bool());
    assert!(Node::from("absolute").as_bool());
    assert!(!Node::from("no").as_bool());
    assert!(!Node::from("").as_bool());
    assert_eq!(Node::Flag(false).as_string(), "no");
  }

  #[test]
  fn test_map_lookup() {
    let node = Node::from(serde_json::json!({"type": "video", "id": 1, "demux-fps": 23.976}));
    assert_eq!(node.get("type").as_string(), "video");
    assert_eq!(node.get("id").as_i64(), 1);
    assert_eq!(node.get("demux-fps").as_f64(), 23.976);
    assert!(node.get("missing").is_none());
    assert!(Node::Int64(3).get("type").is_none());
  }
}
