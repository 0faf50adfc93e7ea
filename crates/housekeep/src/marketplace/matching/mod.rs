//! Provider-side job board: conjunctive filters and the three sort orders.

mod board;

#[cfg(test)]
mod tests;

use std::cmp::Ordering;
use std::collections::HashSet;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::domain::JobPostId;
use super::jobs::{JobPost, ScheduleKind};

pub use board::{JobBoard, OpenJobPostView};

/// Partition by whether the viewing provider already applied.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppliedFilter {
    #[default]
    All,
    Applied,
    NotApplied,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PostOrder {
    #[default]
    Newest,
    MostApplicants,
    SoonestStartDate,
}

/// Search constraints; every supplied constraint must hold.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobSearch {
    #[serde(default)]
    pub query: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub budget_max: Option<Decimal>,
    #[serde(default)]
    pub schedule: Option<ScheduleKind>,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub applied: AppliedFilter,
    #[serde(default)]
    pub order: PostOrder,
}

fn needle(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(str::to_lowercase)
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(needle)
}

impl JobSearch {
    pub fn matches(&self, post: &JobPost, applied_to: &HashSet<JobPostId>) -> bool {
        if let Some(query) = needle(&self.query) {
            if !contains_ignore_case(&post.title, &query)
                && !contains_ignore_case(&post.description, &query)
            {
                return false;
            }
        }

        if let Some(location) = needle(&self.location) {
            if !contains_ignore_case(&post.location, &location) {
                return false;
            }
        }

        if let Some(ceiling) = self.budget_max {
            // Posts without an upper bound are not excluded by a ceiling.
            if post.budget.ceiling().is_some_and(|amount| amount > ceiling) {
                return false;
            }
        }

        if let Some(kind) = self.schedule {
            if post.schedule.kind() != kind {
                return false;
            }
        }

        let keywords: Vec<String> = self
            .skills
            .iter()
            .map(|keyword| keyword.trim().to_lowercase())
            .filter(|keyword| !keyword.is_empty())
            .collect();
        if !keywords.is_empty() {
            let overlaps = post.skills.iter().any(|tag| {
                let tag = tag.to_lowercase();
                keywords.iter().any(|keyword| tag.contains(keyword.as_str()))
            });
            if !overlaps {
                return false;
            }
        }

        match self.applied {
            AppliedFilter::All => true,
            AppliedFilter::Applied => applied_to.contains(&post.id),
            AppliedFilter::NotApplied => !applied_to.contains(&post.id),
        }
    }
}

/// Visible subset of `posts`, ordered by `search.order`.
pub fn filter(
    posts: &[JobPost],
    search: &JobSearch,
    applied_to: &HashSet<JobPostId>,
) -> Vec<JobPost> {
    let mut visible: Vec<JobPost> = posts
        .iter()
        .filter(|post| search.matches(post, applied_to))
        .cloned()
        .collect();
    sort_posts(&mut visible, search.order);
    visible
}

fn newest_first(left: &JobPost, right: &JobPost) -> Ordering {
    right
        .created_at
        .cmp(&left.created_at)
        .then_with(|| left.id.cmp(&right.id))
}

/// Sort in place. Posts without a start date go last under `SoonestStartDate`.
pub fn sort_posts(posts: &mut [JobPost], order: PostOrder) {
    match order {
        PostOrder::Newest => posts.sort_by(newest_first),
        PostOrder::MostApplicants => posts.sort_by(|left, right| {
            right
                .active_applicant_count()
                .cmp(&left.active_applicant_count())
                .then_with(|| newest_first(left, right))
        }),
        PostOrder::SoonestStartDate => posts.sort_by(|left, right| {
            match (left.schedule.start_date(), right.schedule.start_date()) {
                (Some(a), Some(b)) => a.cmp(&b),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            }
            .then_with(|| newest_first(left, right))
        }),
    }
}
