//! Read-time reconstruction of a nested value from leaf documents

use serde_json::{Map, Value};
use vapor_core::{segments, Param};

/// Fold the leaves found under `query_path` into the value at that path.
///
/// `params` must be ordered oldest first. Each leaf overwrites whatever
/// sits at its own key, so the newest leaf wins per key. A leaf nested
/// below an older scalar replaces that scalar with a mapping.
///
/// Returns the whole tree for the root query and `None` when nothing is
/// stored at or under `query_path`.
pub fn fold(query_path: &str, params: &[Param]) -> Option<Value> {
    let steps = segments(query_path);
    let mut tree = fold_tree(steps.len(), params);

    match steps.last() {
        None => Some(Value::Object(tree)),
        Some(last) => tree.remove(*last),
    }
}

/// Build the tree rooted at the query's last step. For a query of `depth`
/// segments, every leaf keeps its path from segment `depth - 1` on; the
/// root query keeps full paths.
fn fold_tree(depth: usize, params: &[Param]) -> Map<String, Value> {
    let skip = depth.saturating_sub(1);
    let mut tree = Map::new();

    for param in params {
        let keys: Vec<&str> = segments(&param.key_path).into_iter().skip(skip).collect();
        insert_path(&mut tree, &keys, param.value.to_json());
    }
    tree
}

fn insert_path(node: &mut Map<String, Value>, keys: &[&str], value: Value) {
    match keys {
        [] => {}
        [last] => {
            node.insert(last.to_string(), value);
        }
        [first, rest @ ..] => {
            let slot = node
                .entry(first.to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            match slot {
                Value::Object(child) => insert_path(child, rest, value),
                _ => {
                    let mut child = Map::new();
                    insert_path(&mut child, rest, value);
                    *slot = Value::Object(child);
                }
            }
        }
    }
}
