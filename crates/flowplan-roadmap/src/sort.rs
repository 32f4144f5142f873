//! Display ordering
//!
//! Sorting produces a view; it never touches priorities. Flows without a
//! value for the sort column go last in either direction.

use flowplan_metrics::{opportunity_score, roi, usage, value};
use flowplan_model::{Flow, ModelError};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Column a section table can be sorted by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortColumn {
    #[default]
    Priority,
    Name,
    Category,
    Role,
    Complexity,
    Usage,
    Value,
    Roi,
    Opportunity,
}

impl SortColumn {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            SortColumn::Priority => "priority",
            SortColumn::Name => "name",
            SortColumn::Category => "category",
            SortColumn::Role => "role",
            SortColumn::Complexity => "complexity",
            SortColumn::Usage => "usage",
            SortColumn::Value => "value",
            SortColumn::Roi => "roi",
            SortColumn::Opportunity => "opportunity",
        }
    }
}

impl fmt::Display for SortColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortColumn {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let columns = [
            SortColumn::Priority,
            SortColumn::Name,
            SortColumn::Category,
            SortColumn::Role,
            SortColumn::Complexity,
            SortColumn::Usage,
            SortColumn::Value,
            SortColumn::Roi,
            SortColumn::Opportunity,
        ];
        columns
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ModelError::invalid_value("sort column", format!("unknown column '{s}'")))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

/// A column-sort request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct SortSpec {
    pub column: SortColumn,
    #[serde(default)]
    pub direction: SortDirection,
}

impl SortSpec {
    #[inline]
    #[must_use]
    pub fn new(column: SortColumn, direction: SortDirection) -> Self {
        Self { column, direction }
    }

    /// Priority ascending: the only order in which dragging is enabled
    #[inline]
    #[must_use]
    pub fn by_priority() -> Self {
        Self::default()
    }

    #[inline]
    #[must_use]
    pub fn is_priority(&self) -> bool {
        self.column == SortColumn::Priority
    }
}

/// Text keys are lowercased so "alpha" sorts before "Bravo"
#[derive(Debug, PartialEq, PartialOrd)]
enum Key {
    Number(f64),
    Text(String),
}

fn text(s: &str) -> Key {
    Key::Text(s.to_lowercase())
}

fn key(flow: &Flow, column: SortColumn) -> Option<Key> {
    match column {
        SortColumn::Priority => flow.priority.map(|p| Key::Number(f64::from(p))),
        SortColumn::Name => Some(text(&flow.name)),
        SortColumn::Category => flow.category.as_deref().map(text),
        SortColumn::Role => flow.role.as_deref().map(text),
        SortColumn::Complexity => flow.complexity.map(|c| Key::Number(f64::from(c.ordinal()))),
        SortColumn::Usage => Some(Key::Number(usage(flow) as f64)),
        SortColumn::Value => Some(Key::Number(value(flow))),
        SortColumn::Roi => Some(Key::Number(roi(flow).percent() as f64)),
        SortColumn::Opportunity => opportunity_score(flow).map(|s| Key::Number(f64::from(s))),
    }
}

/// Flows in display order for `spec`
///
/// Stable: ties keep their priority order.
#[must_use]
pub fn sort_flows<'a>(flows: &'a [Flow], spec: SortSpec) -> Vec<&'a Flow> {
    let mut keyed: Vec<(Option<Key>, &'a Flow)> =
        flows.iter().map(|f| (key(f, spec.column), f)).collect();

    keyed.sort_by(|(a, _), (b, _)| match (a, b) {
        (Some(a), Some(b)) => {
            let ord = a.partial_cmp(b).unwrap_or(Ordering::Equal);
            match spec.direction {
                SortDirection::Asc => ord,
                SortDirection::Desc => ord.reverse(),
            }
        }
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });

    keyed.into_iter().map(|(_, f)| f).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use flowplan_model::{Complexity, Section};

    fn flows() -> Vec<Flow> {
        vec![
            Flow::new("a", "Charlie", Section::Backlog)
                .with_priority(1)
                .with_complexity(Complexity::Complex),
            Flow::new("b", "alpha", Section::Backlog).with_priority(2),
            Flow::new("c", "Bravo", Section::Backlog)
                .with_priority(3)
                .with_complexity(Complexity::Trivial),
        ]
    }

    fn ids(sorted: &[&Flow]) -> Vec<String> {
        sorted.iter().map(|f| f.id.to_string()).collect()
    }

    #[test]
    fn priority_order_is_default() {
        let flows = flows();
        assert_eq!(ids(&sort_flows(&flows, SortSpec::by_priority())), ["a", "b", "c"]);
    }

    #[test]
    fn sorting_leaves_priorities_untouched() {
        let flows = flows();
        let sorted = sort_flows(&flows, SortSpec::new(SortColumn::Name, SortDirection::Desc));
        assert_eq!(ids(&sorted), ["a", "c", "b"]);
        assert_eq!(flows[0].priority, Some(1));
    }

    #[test]
    fn text_columns_ignore_case() {
        let flows = flows();
        let by_name = sort_flows(&flows, SortSpec::new(SortColumn::Name, SortDirection::Asc));
        assert_eq!(ids(&by_name), ["b", "c", "a"]);

        let roles = vec![
            Flow::new("x", "X", Section::Backlog).with_role("support"),
            Flow::new("y", "Y", Section::Backlog).with_role("Billing"),
        ];
        let by_role = sort_flows(&roles, SortSpec::new(SortColumn::Role, SortDirection::Asc));
        assert_eq!(ids(&by_role), ["y", "x"]);
    }

    #[test]
    fn missing_values_sort_last_both_ways() {
        let flows = flows();
        let asc = sort_flows(&flows, SortSpec::new(SortColumn::Complexity, SortDirection::Asc));
        assert_eq!(ids(&asc), ["c", "a", "b"]);

        let desc = sort_flows(&flows, SortSpec::new(SortColumn::Complexity, SortDirection::Desc));
        assert_eq!(ids(&desc), ["a", "c", "b"]);
    }

    #[test]
    fn parses_column_names() {
        assert_eq!("ROI".parse::<SortColumn>().unwrap(), SortColumn::Roi);
        assert!("speed".parse::<SortColumn>().is_err());
    }
}
