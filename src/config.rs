//! Quiz configuration.
//!
//! Configuration arrives from the outside world in stringly form (a choice
//! count of "3", "6" or "9" and a list of region names); [`QuizConfig::parse`]
//! turns that into a validated value. An empty region list is rejected here
//! rather than silently repaired — substituting a default region is the
//! caller's decision.

use std::fmt;

/// The choice counts a question grid can show.
pub const CHOICE_COUNTS: [usize; 3] = [3, 6, 9];

/// Validated quiz settings: how many choices per flag, which regions to
/// draw flags from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizConfig {
    pub choice_count: usize,
    pub regions: Vec<String>,
}

impl QuizConfig {
    pub fn new(choice_count: usize, regions: Vec<String>) -> Self {
        Self {
            choice_count,
            regions,
        }
    }

    /// Parse the stringified external form.
    pub fn parse(choice_count: &str, regions: &[String]) -> Result<Self, ConfigError> {
        let count: usize = choice_count
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidChoiceCount(choice_count.to_string()))?;

        let mut seen = Vec::new();
        for region in regions {
            let region = region.trim();
            if !region.is_empty() && !seen.iter().any(|r: &String| r == region) {
                seen.push(region.to_string());
            }
        }

        let config = Self::new(count, seen);
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !CHOICE_COUNTS.contains(&self.choice_count) {
            return Err(ConfigError::InvalidChoiceCount(
                self.choice_count.to_string(),
            ));
        }
        if self.regions.is_empty() {
            return Err(ConfigError::EmptyRegionSet);
        }
        Ok(())
    }

    /// Choice rows in the grid (three choices per row).
    pub fn guess_rows(&self) -> usize {
        self.choice_count / 3
    }
}

/// Why a configuration was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Choice count was not one of 3, 6 or 9.
    InvalidChoiceCount(String),
    /// No regions were selected.
    EmptyRegionSet,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidChoiceCount(got) => {
                write!(f, "choice count must be 3, 6 or 9, got {:?}", got)
            }
            ConfigError::EmptyRegionSet => write!(f, "at least one region must be selected"),
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;

    fn regions(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn parses_valid_choice_counts() {
        for raw in ["3", "6", "9"] {
            let config = QuizConfig::parse(raw, &regions(&["Europe"])).unwrap();
            assert_eq!(config.choice_count.to_string(), raw);
        }
    }

    #[test]
    fn rejects_bad_choice_counts() {
        for raw in ["0", "4", "12", "three", ""] {
            let err = QuizConfig::parse(raw, &regions(&["Europe"])).unwrap_err();
            assert!(matches!(err, ConfigError::InvalidChoiceCount(_)), "{raw}");
        }
    }

    #[test]
    fn rejects_empty_region_set() {
        assert_eq!(
            QuizConfig::parse("3", &[]).unwrap_err(),
            ConfigError::EmptyRegionSet
        );
        // Whitespace-only entries do not count as regions.
        assert_eq!(
            QuizConfig::parse("3", &regions(&["", "  "])).unwrap_err(),
            ConfigError::EmptyRegionSet
        );
    }

    #[test]
    fn deduplicates_regions_preserving_order() {
        let config =
            QuizConfig::parse("6", &regions(&["Europe", "Africa", "Europe", " Africa "])).unwrap();
        assert_eq!(config.regions, regions(&["Europe", "Africa"]));
    }

    #[test]
    fn guess_rows_follow_choice_count() {
        assert_eq!(QuizConfig::new(3, regions(&["Europe"])).guess_rows(), 1);
        assert_eq!(QuizConfig::new(9, regions(&["Europe"])).guess_rows(), 3);
    }
}
