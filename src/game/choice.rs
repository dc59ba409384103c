use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::Ruleset;
use crate::errors::validation::validate_chosen_numbers;
use crate::AppResult;

/// Numbers a player picked, in the order they were entered.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChosenSet(Vec<u32>);

impl ChosenSet {
    /// Accepts at most `rules.picks` distinct numbers within `[1, R*C]`.
    pub fn new(values: Vec<u32>, rules: &Ruleset) -> AppResult<Self> {
        validate_chosen_numbers(&values, rules)?;
        Ok(Self(values))
    }

    /// Wraps values without checking them. Use `new` at trust boundaries.
    pub fn from_values(values: Vec<u32>) -> Self {
        Self(values)
    }

    pub fn contains(&self, value: u32) -> bool {
        self.0.contains(&value)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn values(&self) -> &[u32] {
        &self.0
    }

    pub fn into_values(self) -> Vec<u32> {
        self.0
    }
}

impl fmt::Display for ChosenSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for value in &self.0 {
            if !first {
                write!(f, " ")?;
            }
            write!(f, "[{:02}]", value)?;
            first = false;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::AppError;

    #[test]
    fn test_new_validates() {
        let rules = Ruleset::default();

        let set = ChosenSet::new(vec![3, 1, 25], &rules).unwrap();
        assert_eq!(set.values(), &[3, 1, 25]);
        assert!(set.contains(25));
        assert!(!set.contains(2));

        assert!(matches!(
            ChosenSet::new(vec![3, 3], &rules),
            Err(AppError::MalformedChoice { .. })
        ));
    }

    #[test]
    fn test_display() {
        let set = ChosenSet::from_values(vec![4, 17]);
        assert_eq!(set.to_string(), "[04] [17]");
        assert_eq!(ChosenSet::default().to_string(), "");
    }

    #[test]
    fn test_serializes_as_plain_list() {
        let set = ChosenSet::from_values(vec![5, 6]);
        assert_eq!(serde_json::to_string(&set).unwrap(), "[5,6]");
    }
}
