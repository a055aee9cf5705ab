//! Filter configuration for dataset extraction.

use std::collections::HashSet;
use std::fmt;
use std::hash::BuildHasher;

use itertools::Itertools;
use serde::Serialize;

use crate::error::{ExtractError, Result};

/// Configuration for subject filtering
#[derive(Debug, Clone, Serialize)]
pub struct FilterConfig {
    /// Ethnicity label to keep
    pub ethnicity: String,
    /// Age group labels to keep, OR-combined
    pub ages: Vec<String>,
    /// Reserved for future indicator-score thresholding; accepted and
    /// carried but not applied by the current filter
    pub threshold: f64,
}

impl FilterConfig {
    /// Create a configuration with the default threshold
    #[must_use]
    pub fn new(ethnicity: impl Into<String>, ages: Vec<String>) -> Self {
        Self {
            ethnicity: ethnicity.into(),
            ages,
            threshold: 0.0,
        }
    }

    /// Set the reserved threshold value
    #[must_use]
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    /// Validate the configuration against the available data columns
    ///
    /// # Errors
    /// Returns a validation error if the ethnicity is not an available
    /// column, or if any requested age group is missing. The age error
    /// enumerates every missing value, not just the first.
    pub fn validate<S: BuildHasher>(&self, available_columns: &HashSet<String, S>) -> Result<()> {
        if !available_columns.contains(&self.ethnicity) {
            return Err(ExtractError::Validation(format!(
                "Ethnicity '{}' not found in dataset",
                self.ethnicity
            )));
        }

        let missing_ages: Vec<&str> = self
            .ages
            .iter()
            .filter(|age| !available_columns.contains(*age))
            .map(String::as_str)
            .collect();
        if !missing_ages.is_empty() {
            return Err(ExtractError::Validation(format!(
                "Age groups [{}] not found in dataset",
                missing_ages.iter().join(", ")
            )));
        }

        Ok(())
    }
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            ethnicity: "Asian".to_string(),
            ages: vec![
                "Child".to_string(),
                "Youth".to_string(),
                "Middle Aged".to_string(),
            ],
            threshold: 0.0,
        }
    }
}

impl fmt::Display for FilterConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Filter Configuration:")?;
        writeln!(f, "  Ethnicity: {}", self.ethnicity)?;
        writeln!(f, "  Age Groups: {}", self.ages.iter().join(", "))?;
        writeln!(f, "  Threshold: {} (reserved)", self.threshold)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ExtractError;

    fn columns(names: &[&str]) -> HashSet<String> {
        names.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn accepts_known_columns() {
        let config = FilterConfig::new("Asian", vec!["Child".into(), "Youth".into()]);
        let available = columns(&["person", "Asian", "Child", "Youth"]);
        assert!(config.validate(&available).is_ok());
    }

    #[test]
    fn rejects_unknown_ethnicity() {
        let config = FilterConfig::new("Martian", vec!["Child".into()]);
        let available = columns(&["person", "Asian", "Child"]);
        let err = config.validate(&available).unwrap_err();
        match err {
            ExtractError::Validation(msg) => assert!(msg.contains("Martian")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn enumerates_every_missing_age_group() {
        let config = FilterConfig::new(
            "Asian",
            vec!["Child".into(), "Toddler".into(), "Centenarian".into()],
        );
        let available = columns(&["person", "Asian", "Child"]);
        let err = config.validate(&available).unwrap_err();
        match err {
            ExtractError::Validation(msg) => {
                assert!(msg.contains("Toddler"));
                assert!(msg.contains("Centenarian"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
