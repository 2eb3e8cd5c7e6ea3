//! JQL construction
//!
//! Delivered work is selected by resolution date, upcoming work by due date.

use crate::period::ReportingPeriod;
use chrono::{Duration, NaiveDate};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Date field a period filters on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateField {
    Resolution,
    Due,
}

impl DateField {
    pub fn as_str(&self) -> &'static str {
        match self {
            DateField::Resolution => "resolutiondate",
            DateField::Due => "duedate",
        }
    }
}

/// Project and label scope shared by both report queries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JqlBuilder {
    projects: Vec<String>,
    labels: Vec<String>,
}

impl JqlBuilder {
    /// Scope from comma-separated project keys/names and labels.
    pub fn new(projects: &str, labels: &str) -> Self {
        Self {
            projects: split_list(projects)
                .map(|p| p.trim_matches(|c| c == '\'' || c == '"').to_string())
                .filter(|p| !p.is_empty())
                .collect(),
            labels: split_list(labels).map(str::to_string).collect(),
        }
    }

    /// Query for work resolved within `period`.
    pub fn for_achievements(&self, period: &ReportingPeriod, today: NaiveDate) -> String {
        self.build(DateField::Resolution, Some(period), today)
    }

    /// Query for work due within `period`.
    pub fn for_next_steps(&self, period: &ReportingPeriod, today: NaiveDate) -> String {
        self.build(DateField::Due, Some(period), today)
    }

    /// Scope only, no date filter.
    pub fn scope(&self) -> String {
        self.build(DateField::Resolution, None, NaiveDate::MIN)
    }

    fn build(&self, field: DateField, period: Option<&ReportingPeriod>, today: NaiveDate) -> String {
        let mut parts = Vec::new();

        match self.projects.as_slice() {
            [] => {}
            [single] => parts.push(format!("project = {}", quote_project(single))),
            many => parts.push(format!(
                "project in ({})",
                many.iter()
                    .map(|p| quote_project(p))
                    .collect::<Vec<_>>()
                    .join(", ")
            )),
        }

        if !self.labels.is_empty() {
            parts.push(format!(
                "labels IN ({})",
                self.labels
                    .iter()
                    .map(|l| quote(l))
                    .collect::<Vec<_>>()
                    .join(", ")
            ));
        }

        if let Some(period) = period {
            parts.push(date_clause(field, period, today));
        }

        if parts.is_empty() {
            "project IS NOT EMPTY".to_string()
        } else {
            parts.join(" AND ")
        }
    }
}

fn split_list(raw: &str) -> impl Iterator<Item = &str> {
    raw.split(',').map(str::trim).filter(|s| !s.is_empty())
}

fn quote_project(name: &str) -> String {
    if name.contains([' ', '"', '\\']) {
        quote(name)
    } else {
        name.to_string()
    }
}

/// JQL string literal; `"` and `\` are backslash-escaped.
fn quote(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        if c == '"' || c == '\\' {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('"');
    out
}

fn date_clause(field: DateField, period: &ReportingPeriod, today: NaiveDate) -> String {
    let field = field.as_str();
    match period {
        ReportingPeriod::Range { start, end } => format!(
            "{} >= {} AND {} <= {}",
            field,
            start.format(DATE_FORMAT),
            field,
            end.format(DATE_FORMAT)
        ),
        relative => {
            let days = relative.relative_days().unwrap_or(7);
            let start = today - Duration::days(days);
            format!("{} >= {}", field, start.format(DATE_FORMAT))
        }
    }
}
