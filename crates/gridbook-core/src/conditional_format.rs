//! Conditional formatting rules
//!
//! Rules are kept as data: the ranges they apply to, the comparison or
//! expression that triggers them, and a style handle to apply. Row shifting
//! rewrites both the ranges and any formulas inside the rules.

use crate::address::CellRange;
use crate::resource::Handle;
use crate::style::Color;

/// Comparison operator for cell-value rules
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CfOperator {
    LessThan,
    LessThanOrEqual,
    Equal,
    NotEqual,
    GreaterThanOrEqual,
    GreaterThan,
    Between,
    NotBetween,
}

/// What a rule tests
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CfRuleType {
    /// Compare each cell value against one or two formulas
    CellIs {
        operator: CfOperator,
        formula1: String,
        formula2: Option<String>,
    },
    /// Apply when a formula evaluates to TRUE
    Expression { formula: String },
    /// Cells containing the given text
    ContainsText { text: String },
    /// Top or bottom N values (or percent)
    Top10 { rank: u32, percent: bool, bottom: bool },
    /// Interpolate cell fill between color stops
    ColorScale { colors: Vec<Color> },
    /// In-cell bar sized by value
    DataBar { color: Color, show_value: bool },
}

/// One conditional formatting rule
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ConditionalFormatRule {
    pub rule_type: CfRuleType,
    /// Cell ranges the rule applies to
    pub ranges: Vec<CellRange>,
    /// Lower number wins when rules conflict
    pub priority: u32,
    /// Stop evaluating lower-priority rules on a match
    pub stop_if_true: bool,
    /// Style to apply on a match (None for scale/bar rules)
    pub style: Option<Handle>,
}

impl ConditionalFormatRule {
    pub fn new(rule_type: CfRuleType) -> Self {
        Self {
            rule_type,
            ranges: Vec::new(),
            priority: 1,
            stop_if_true: false,
            style: None,
        }
    }

    /// Highlight cells greater than a value
    pub fn cell_is_greater_than(value: impl Into<String>) -> Self {
        Self::new(CfRuleType::CellIs {
            operator: CfOperator::GreaterThan,
            formula1: value.into(),
            formula2: None,
        })
    }

    /// Highlight cells less than a value
    pub fn cell_is_less_than(value: impl Into<String>) -> Self {
        Self::new(CfRuleType::CellIs {
            operator: CfOperator::LessThan,
            formula1: value.into(),
            formula2: None,
        })
    }

    /// Highlight cells between two values
    pub fn cell_is_between(value1: impl Into<String>, value2: impl Into<String>) -> Self {
        Self::new(CfRuleType::CellIs {
            operator: CfOperator::Between,
            formula1: value1.into(),
            formula2: Some(value2.into()),
        })
    }

    /// Highlight cells where the formula evaluates to TRUE
    pub fn expression(formula: impl Into<String>) -> Self {
        Self::new(CfRuleType::Expression {
            formula: formula.into(),
        })
    }

    /// Highlight cells containing the text
    pub fn contains_text(text: impl Into<String>) -> Self {
        Self::new(CfRuleType::ContainsText { text: text.into() })
    }

    /// Highlight the top N values
    pub fn top_n(n: u32) -> Self {
        Self::new(CfRuleType::Top10 {
            rank: n,
            percent: false,
            bottom: false,
        })
    }

    /// Two-stop color scale from min to max
    pub fn color_scale(min_color: Color, max_color: Color) -> Self {
        Self::new(CfRuleType::ColorScale {
            colors: vec![min_color, max_color],
        })
    }

    pub fn with_range(mut self, range: CellRange) -> Self {
        self.ranges.push(range);
        self
    }

    pub fn with_style(mut self, style: Handle) -> Self {
        self.style = Some(style);
        self
    }

    pub fn with_priority(mut self, priority: u32) -> Self {
        self.priority = priority;
        self
    }

    /// The formulas embedded in this rule, if any
    pub fn formulas(&self) -> impl Iterator<Item = &str> {
        let (a, b) = match &self.rule_type {
            CfRuleType::CellIs {
                formula1, formula2, ..
            } => (Some(formula1.as_str()), formula2.as_deref()),
            CfRuleType::Expression { formula } => (Some(formula.as_str()), None),
            _ => (None, None),
        };
        a.into_iter().chain(b)
    }

    /// Mutable access to the embedded formulas, for reference rewriting
    pub(crate) fn formulas_mut(&mut self) -> impl Iterator<Item = &mut String> {
        let (a, b) = match &mut self.rule_type {
            CfRuleType::CellIs {
                formula1, formula2, ..
            } => (Some(formula1), formula2.as_mut()),
            CfRuleType::Expression { formula } => (Some(formula), None),
            _ => (None, None),
        };
        a.into_iter().chain(b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builders() {
        let rule = ConditionalFormatRule::cell_is_between("10", "20")
            .with_range(CellRange::parse("A1:A10").unwrap())
            .with_style(3)
            .with_priority(2);

        assert_eq!(rule.ranges.len(), 1);
        assert_eq!(rule.style, Some(3));
        assert_eq!(rule.priority, 2);
        assert_eq!(rule.formulas().collect::<Vec<_>>(), vec!["10", "20"]);
    }

    #[test]
    fn test_non_formula_rules_have_no_formulas() {
        let rule = ConditionalFormatRule::top_n(5);
        assert_eq!(rule.formulas().count(), 0);

        let scale = ConditionalFormatRule::color_scale(Color::WHITE, Color::RED);
        assert_eq!(scale.formulas().count(), 0);
    }
}
