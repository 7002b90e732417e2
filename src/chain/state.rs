//! State representation

use serde::{Deserialize, Serialize};

pub type StateId = String;

/// A state of the chain
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct State {
    pub id: StateId,

    /// Display label, never used by the algorithms
    #[serde(default)]
    pub name: String,

    /// Start state for generation and automaton runs
    #[serde(default, alias = "is_initial")]
    pub is_initial: bool,

    /// Accepting state for automaton runs
    #[serde(default, alias = "is_final")]
    pub is_final: bool,
}

impl State {
    pub fn new(id: impl Into<StateId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            is_initial: false,
            is_final: false,
        }
    }

    pub fn initial(mut self) -> Self {
        self.is_initial = true;
        self
    }

    pub fn accepting(mut self) -> Self {
        self.is_final = true;
        self
    }

    /// Name if set, id otherwise
    pub fn display_name(&self) -> &str {
        if self.name.is_empty() {
            &self.id
        } else {
            &self.name
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_flags() {
        let state = State::new("q0", "Start").initial().accepting();
        assert!(state.is_initial);
        assert!(state.is_final);
        assert_eq!(state.display_name(), "Start");
    }

    #[test]
    fn test_deserialize_camel_and_snake_case() {
        let camel: State =
            serde_json::from_str(r#"{"id":"a","name":"A","isInitial":true}"#).unwrap();
        assert!(camel.is_initial);
        assert!(!camel.is_final);

        let snake: State = toml::from_str("id = \"b\"\nis_final = true\n").unwrap();
        assert!(snake.is_final);
        assert_eq!(snake.display_name(), "b");
    }
}
