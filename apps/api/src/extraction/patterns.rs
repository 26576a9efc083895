//! Ordered split rules. A rule list is evaluated top to bottom and the first
//! rule whose pattern matches decides how the line is split.

use regex::Regex;

/// How a rule's capture groups map onto entry fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleLayout {
    /// Groups: primary, secondary, date.
    Triple,
    /// Groups: primary, date. The secondary field lives elsewhere (usually the next line).
    PrimaryDate,
    /// Groups: primary, secondary.
    Pair,
}

#[derive(Debug)]
pub struct SplitRule {
    pub label: &'static str,
    pattern: Regex,
    layout: RuleLayout,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitMatch {
    pub label: &'static str,
    pub primary: String,
    pub secondary: Option<String>,
    pub date: Option<String>,
}

impl SplitRule {
    /// Panics on an invalid pattern; rule tables are static and covered by tests.
    pub fn new(label: &'static str, pattern: &str, layout: RuleLayout) -> Self {
        Self {
            label,
            pattern: Regex::new(pattern).expect("split rule regex is valid"),
            layout,
        }
    }

    pub fn apply(&self, line: &str) -> Option<SplitMatch> {
        let caps = self.pattern.captures(line)?;
        let group = |i: usize| {
            caps.get(i)
                .map(|m| m.as_str().trim().to_string())
                .filter(|s| !s.is_empty())
        };

        let primary = group(1)?;
        let (secondary, date) = match self.layout {
            RuleLayout::Triple => (group(2), group(3)),
            RuleLayout::PrimaryDate => (None, group(2)),
            RuleLayout::Pair => (group(2), None),
        };

        Some(SplitMatch {
            label: self.label,
            primary,
            secondary,
            date,
        })
    }
}

/// First-match-wins evaluation: earlier rules always take priority.
pub fn first_match(rules: &[SplitRule], line: &str) -> Option<SplitMatch> {
    rules.iter().find_map(|rule| rule.apply(line))
}
