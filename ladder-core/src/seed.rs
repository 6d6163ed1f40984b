//! Seed trees — arbitrarily nested groups of agents handed to `Ladder::start`.
//!
//! A tree is flattened iteratively with an explicit stack, and the nesting
//! depth is bounded so hostile input cannot exhaust memory.

use serde_json::Value;

use crate::agent::AgentParams;
use crate::error::{LadderError, Result};

/// Maximum nesting depth accepted by [`Seed::flatten`].
pub const MAX_SEED_DEPTH: usize = 64;

/// A single item or a nested group of seeds.
#[derive(Debug, Clone, PartialEq)]
pub enum Seed<T> {
    One(T),
    Many(Vec<Seed<T>>),
}

impl<T> Seed<T> {
    pub fn one(item: T) -> Self {
        Self::One(item)
    }

    pub fn many(items: impl IntoIterator<Item = Seed<T>>) -> Self {
        Self::Many(items.into_iter().collect())
    }

    /// A flat group of plain items.
    pub fn flat(items: impl IntoIterator<Item = T>) -> Self {
        Self::Many(items.into_iter().map(Seed::One).collect())
    }

    /// Leaves in depth-first, left-to-right order.
    pub fn flatten(self) -> Result<Vec<T>> {
        self.flatten_bounded(MAX_SEED_DEPTH)
    }

    pub fn flatten_bounded(self, max_depth: usize) -> Result<Vec<T>> {
        let mut out = Vec::new();
        let mut stack = vec![vec![self].into_iter()];

        while let Some(top) = stack.last_mut() {
            match top.next() {
                None => {
                    stack.pop();
                }
                Some(Seed::One(item)) => out.push(item),
                Some(Seed::Many(children)) => {
                    if stack.len() > max_depth {
                        return Err(LadderError::invalid_argument(format!(
                            "seed nesting exceeds depth {max_depth}"
                        )));
                    }
                    stack.push(children.into_iter());
                }
            }
        }
        Ok(out)
    }
}

impl<T> From<T> for Seed<T> {
    fn from(item: T) -> Self {
        Seed::One(item)
    }
}

impl<T> FromIterator<Seed<T>> for Seed<T> {
    fn from_iter<I: IntoIterator<Item = Seed<T>>>(iter: I) -> Self {
        Seed::many(iter)
    }
}

impl Seed<AgentParams> {
    /// Parse a JSON seed tree: objects are agents, arrays are groups.
    ///
    /// Any other leaf (number, string, null, bool) is not an agent and is
    /// rejected, as are objects that fail agent validation.
    pub fn from_json(value: &Value) -> Result<Self> {
        parse_json(value, 0)
    }
}

fn parse_json(value: &Value, depth: usize) -> Result<Seed<AgentParams>> {
    match value {
        Value::Object(_) => {
            let params: AgentParams = serde_json::from_value(value.clone()).map_err(|e| {
                LadderError::invalid_argument(format!("invalid agent in seed: {e}"))
            })?;
            Ok(Seed::One(params))
        }
        Value::Array(items) => {
            if depth >= MAX_SEED_DEPTH {
                return Err(LadderError::invalid_argument(format!(
                    "seed nesting exceeds depth {MAX_SEED_DEPTH}"
                )));
            }
            items
                .iter()
                .map(|v| parse_json(v, depth + 1))
                .collect::<Result<Vec<_>>>()
                .map(Seed::Many)
        }
        other => Err(LadderError::invalid_argument(format!(
            "start takes agents or nested lists of agents, got {other}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn single_item_flattens_to_itself() {
        assert_eq!(Seed::one(7).flatten().unwrap(), vec![7]);
    }

    #[test]
    fn nested_groups_keep_order() {
        let seed = Seed::many([
            Seed::one(1),
            Seed::flat([2, 3]),
            Seed::many([Seed::many([Seed::one(4)]), Seed::one(5)]),
        ]);
        assert_eq!(seed.flatten().unwrap(), vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn empty_groups_are_fine() {
        let seed: Seed<u8> = Seed::many([Seed::many([]), Seed::many([])]);
        assert!(seed.flatten().unwrap().is_empty());
    }

    #[test]
    fn depth_is_bounded() {
        let mut seed = Seed::one(0);
        for _ in 0..10 {
            seed = Seed::many([seed]);
        }
        assert!(seed.clone().flatten_bounded(10).is_ok());
        assert!(matches!(
            seed.flatten_bounded(9),
            Err(LadderError::InvalidArgument(_))
        ));
    }

    #[test]
    fn json_tree_parses() {
        let value = json!([
            {"stay_probability": 0.0, "up_probability": 0.5, "id": "verbose"},
            [
                {"stay_probability": 0.5, "up_probability": 0.5},
                {"stay_probability": 0.5, "up_probability": 0.5}
            ]
        ]);
        let agents = Seed::from_json(&value).unwrap().flatten().unwrap();
        assert_eq!(agents.len(), 3);
        assert_eq!(agents[0].id(), "verbose");
    }

    #[test]
    fn json_non_agent_leaf_is_rejected() {
        let value = json!([{"stay_probability": 0.5, "up_probability": 0.5}, 42]);
        assert!(matches!(
            Seed::from_json(&value),
            Err(LadderError::InvalidArgument(_))
        ));
    }

    #[test]
    fn json_invalid_agent_is_rejected() {
        let value = json!({"stay_probability": 1.5, "up_probability": 0.5});
        assert!(matches!(
            Seed::from_json(&value),
            Err(LadderError::InvalidArgument(_))
        ));
    }
}
