//! Transition representation

use crate::chain::StateId;
use serde::{Deserialize, Serialize};

/// A probabilistic, optionally labeled, transition between states
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transition {
    #[serde(default)]
    pub id: String,
    pub from: StateId,
    pub to: StateId,
    #[serde(default)]
    pub probability: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl Transition {
    pub fn new(
        id: impl Into<String>,
        from: impl Into<StateId>,
        to: impl Into<StateId>,
        probability: f64,
    ) -> Self {
        Self {
            id: id.into(),
            from: from.into(),
            to: to.into(),
            probability,
            label: None,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Label usable as an automaton symbol. Empty labels count as absent.
    pub fn symbol(&self) -> Option<&str> {
        self.label.as_deref().filter(|l| !l.is_empty())
    }

    /// Get display label for the transition
    pub fn display_label(&self) -> String {
        match self.symbol() {
            Some(label) => format!("{} / {}", label, self.probability),
            None => format!("{}", self.probability),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_label_is_not_a_symbol() {
        let t = Transition::new("t1", "a", "b", 0.5).with_label("");
        assert_eq!(t.symbol(), None);
        assert_eq!(t.display_label(), "0.5");

        let t = t.with_label("x");
        assert_eq!(t.symbol(), Some("x"));
        assert_eq!(t.display_label(), "x / 0.5");
    }
}
