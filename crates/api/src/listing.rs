//! Search, sort and aggregation for list endpoints.
//!
//! The data sets are small (tens to hundreds of rows), so listings are
//! shaped in memory after a plain store read.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::str::FromStr;

use sentry_core::error::CoreError;
use sentry_core::issue_status::IssueStatus;
use sentry_core::types::DbId;
use sentry_db::models::branch::{Branch, BranchListItem};
use sentry_db::models::issue::Issue;
use sentry_db::models::spare_part::SparePart;
use serde::Serialize;

use crate::query::OpenIssueDashboardParams;

// ---------------------------------------------------------------------------
// Sort keys
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BranchSort {
    #[default]
    NameAsc,
    NameDesc,
    CodeAsc,
    CodeDesc,
    LastWorkedDesc,
    LastWorkedAsc,
    TicketsDesc,
    TicketsAsc,
}

impl FromStr for BranchSort {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim() {
            "name-asc" => BranchSort::NameAsc,
            "name-desc" => BranchSort::NameDesc,
            "code-asc" => BranchSort::CodeAsc,
            "code-desc" => BranchSort::CodeDesc,
            "last-worked-desc" => BranchSort::LastWorkedDesc,
            "last-worked-asc" => BranchSort::LastWorkedAsc,
            "tickets-desc" => BranchSort::TicketsDesc,
            "tickets-asc" => BranchSort::TicketsAsc,
            other => {
                return Err(CoreError::Validation(format!(
                    "Unknown branch sort '{other}'"
                )))
            }
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SparePartSort {
    #[default]
    NameAsc,
    NameDesc,
    QuantityAsc,
    QuantityDesc,
}

impl FromStr for SparePartSort {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim() {
            "name-asc" => SparePartSort::NameAsc,
            "name-desc" => SparePartSort::NameDesc,
            "quantity-asc" => SparePartSort::QuantityAsc,
            "quantity-desc" => SparePartSort::QuantityDesc,
            other => {
                return Err(CoreError::Validation(format!(
                    "Unknown spare part sort '{other}'"
                )))
            }
        })
    }
}

/// Parse an optional sort key, falling back to the default on absence.
pub fn parse_sort<T: FromStr<Err = CoreError> + Default>(raw: Option<&str>) -> Result<T, CoreError> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        Some(key) => key.parse(),
        None => Ok(T::default()),
    }
}

// ---------------------------------------------------------------------------
// Comparisons
// ---------------------------------------------------------------------------

fn compare_names(a: &str, b: &str) -> Ordering {
    a.to_lowercase().cmp(&b.to_lowercase()).then_with(|| a.cmp(b))
}

/// Natural ordering: runs of digits compare by value, so `"BR-9"` sorts
/// before `"BR-10"`.
pub fn compare_codes(a: &str, b: &str) -> Ordering {
    let mut left = a.chars().peekable();
    let mut right = b.chars().peekable();

    loop {
        match (left.peek().copied(), right.peek().copied()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(l), Some(r)) if l.is_ascii_digit() && r.is_ascii_digit() => {
                let l_run = take_digits(&mut left);
                let r_run = take_digits(&mut right);
                let l_trim = l_run.trim_start_matches('0');
                let r_trim = r_run.trim_start_matches('0');
                let ord = l_trim
                    .len()
                    .cmp(&r_trim.len())
                    .then_with(|| l_trim.cmp(r_trim));
                if ord != Ordering::Equal {
                    return ord;
                }
            }
            (Some(l), Some(r)) => {
                let ord = l.to_ascii_lowercase().cmp(&r.to_ascii_lowercase());
                if ord != Ordering::Equal {
                    return ord;
                }
                left.next();
                right.next();
            }
        }
    }
}

fn take_digits(chars: &mut std::iter::Peekable<std::str::Chars<'_>>) -> String {
    let mut run = String::new();
    while let Some(c) = chars.next_if(char::is_ascii_digit) {
        run.push(c);
    }
    run
}

/// Missing values go last regardless of direction.
fn compare_missing_last<T: Ord>(a: Option<T>, b: Option<T>, descending: bool) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) if descending => b.cmp(&a),
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

fn non_blank(filter: Option<&str>) -> Option<&str> {
    filter.map(str::trim).filter(|f| !f.is_empty())
}

// ---------------------------------------------------------------------------
// Branches
// ---------------------------------------------------------------------------

/// Branches with their linked ticket counts, searched and sorted.
pub fn branch_listing(
    branches: Vec<Branch>,
    issues: &[Issue],
    search: Option<&str>,
    sort: BranchSort,
) -> Vec<BranchListItem> {
    let mut ticket_counts: HashMap<DbId, usize> = HashMap::new();
    for issue in issues.iter().filter(|i| i.has_ticket()) {
        *ticket_counts.entry(issue.branch_id).or_default() += 1;
    }

    let search = non_blank(search);
    let mut items: Vec<BranchListItem> = branches
        .into_iter()
        .filter(|b| search.is_none_or(|s| contains_ci(&b.name, s) || contains_ci(&b.code, s)))
        .map(|branch| BranchListItem {
            linked_ticket_count: ticket_counts.get(&branch.id).copied().unwrap_or(0),
            branch,
        })
        .collect();

    items.sort_by(|a, b| {
        let (a_branch, b_branch) = (&a.branch, &b.branch);
        match sort {
            BranchSort::NameAsc => compare_names(&a_branch.name, &b_branch.name),
            BranchSort::NameDesc => compare_names(&b_branch.name, &a_branch.name),
            BranchSort::CodeAsc => compare_codes(&a_branch.code, &b_branch.code),
            BranchSort::CodeDesc => compare_codes(&b_branch.code, &a_branch.code),
            BranchSort::LastWorkedDesc => {
                compare_missing_last(a_branch.last_worked, b_branch.last_worked, true)
            }
            BranchSort::LastWorkedAsc => {
                compare_missing_last(a_branch.last_worked, b_branch.last_worked, false)
            }
            BranchSort::TicketsDesc => b.linked_ticket_count.cmp(&a.linked_ticket_count),
            BranchSort::TicketsAsc => a.linked_ticket_count.cmp(&b.linked_ticket_count),
        }
    });
    items
}

// ---------------------------------------------------------------------------
// Spare parts
// ---------------------------------------------------------------------------

pub fn spare_part_listing(
    parts: Vec<SparePart>,
    search: Option<&str>,
    sort: SparePartSort,
) -> Vec<SparePart> {
    let search = non_blank(search);
    let mut parts: Vec<SparePart> = parts
        .into_iter()
        .filter(|p| {
            search.is_none_or(|s| {
                contains_ci(&p.name, s)
                    || p.part_number.as_deref().is_some_and(|n| contains_ci(n, s))
            })
        })
        .collect();

    parts.sort_by(|a, b| match sort {
        SparePartSort::NameAsc => compare_names(&a.name, &b.name),
        SparePartSort::NameDesc => compare_names(&b.name, &a.name),
        SparePartSort::QuantityAsc => a.quantity.cmp(&b.quantity),
        SparePartSort::QuantityDesc => b.quantity.cmp(&a.quantity),
    });
    parts
}

// ---------------------------------------------------------------------------
// Dashboard
// ---------------------------------------------------------------------------

/// A branch paired with its most recently opened `Open` issue.
#[derive(Debug, Clone, Serialize)]
pub struct BranchOpenIssue {
    pub branch: Branch,
    pub latest_open_issue: Issue,
}

/// Branches with at least one `Open` issue, filtered by branch name,
/// description and assignee (case-insensitive substrings).
pub fn latest_open_issues(
    branches: Vec<Branch>,
    issues: &[Issue],
    filters: &OpenIssueDashboardParams,
) -> Vec<BranchOpenIssue> {
    let mut latest: HashMap<DbId, &Issue> = HashMap::new();
    for issue in issues.iter().filter(|i| i.status == IssueStatus::Open) {
        latest
            .entry(issue.branch_id)
            .and_modify(|current| {
                if issue.opened_at > current.opened_at {
                    *current = issue;
                }
            })
            .or_insert(issue);
    }

    let branch_filter = non_blank(filters.branch.as_deref());
    let description_filter = non_blank(filters.description.as_deref());
    let assignee_filter = non_blank(filters.assigned_to.as_deref());

    branches
        .into_iter()
        .filter_map(|branch| {
            let issue = *latest.get(&branch.id)?;
            let keep = branch_filter.is_none_or(|f| contains_ci(&branch.name, f))
                && description_filter.is_none_or(|f| contains_ci(&issue.description, f))
                && assignee_filter.is_none_or(|f| contains_ci(issue.responsibility.as_str(), f));
            keep.then(|| BranchOpenIssue {
                branch,
                latest_open_issue: issue.clone(),
            })
        })
        .collect()
}
