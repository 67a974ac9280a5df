// Significance classification of p-values

use crate::config::AnalysisConfig;
use serde::Serialize;

/// How strongly a p-value rejects the null hypothesis
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum Significance {
    NotSignificant,
    Significant,
    HighlySignificant,
    VeryHighlySignificant,
}

impl Significance {
    /// Classify `pvalue` against the configured levels
    pub fn classify(pvalue: f64, config: &AnalysisConfig) -> Self {
        if pvalue < config.very_high_significance_level {
            Self::VeryHighlySignificant
        } else if pvalue < config.high_significance_level {
            Self::HighlySignificant
        } else if pvalue < config.significance_level {
            Self::Significant
        } else {
            Self::NotSignificant
        }
    }

    pub fn is_significant(self) -> bool {
        self != Self::NotSignificant
    }

    /// `***`, `**`, `*` or `ns`
    pub fn stars(self) -> &'static str {
        match self {
            Self::VeryHighlySignificant => "***",
            Self::HighlySignificant => "**",
            Self::Significant => "*",
            Self::NotSignificant => "ns",
        }
    }

    /// Verdict line of the stratified rank test, which stops at two stars
    pub fn rank_test_verdict(self) -> &'static str {
        match self {
            Self::VeryHighlySignificant | Self::HighlySignificant => {
                "Highly significant difference (**) across strata"
            }
            Self::Significant => "Significant difference (*) across strata",
            Self::NotSignificant => "No significant difference (-)",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_levels() {
        let config = AnalysisConfig::default();
        assert_eq!(
            Significance::classify(0.0005, &config),
            Significance::VeryHighlySignificant
        );
        assert_eq!(
            Significance::classify(0.005, &config),
            Significance::HighlySignificant
        );
        assert_eq!(Significance::classify(0.03, &config), Significance::Significant);
        assert_eq!(
            Significance::classify(0.05, &config),
            Significance::NotSignificant
        );
    }

    #[test]
    fn test_stars() {
        assert_eq!(Significance::VeryHighlySignificant.stars(), "***");
        assert_eq!(Significance::NotSignificant.stars(), "ns");
    }

    #[test]
    fn test_rank_test_verdict_caps_at_two_stars() {
        assert!(Significance::VeryHighlySignificant
            .rank_test_verdict()
            .contains("(**)"));
        assert!(Significance::NotSignificant
            .rank_test_verdict()
            .starts_with("No significant"));
    }

    #[test]
    fn test_strict_config_shifts_levels() {
        let config = AnalysisConfig::strict();
        assert_eq!(
            Significance::classify(0.03, &config),
            Significance::NotSignificant
        );
    }
}
