use rust_decimal::Decimal;

use super::domain::{Budget, JobPostDraft, JobSchedule};
use crate::marketplace::error::MarketplaceError;

pub(crate) fn required(field: &str, value: String) -> Result<String, MarketplaceError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(MarketplaceError::validation(format!("{field} is required")))
    } else {
        Ok(trimmed.to_string())
    }
}

/// Trim, drop blank tags, and de-duplicate while keeping the requester's order.
pub(crate) fn normalize_tags(skills: Vec<String>) -> Vec<String> {
    let mut normalized: Vec<String> = Vec::with_capacity(skills.len());
    for skill in skills {
        let trimmed = skill.trim();
        if trimmed.is_empty() {
            continue;
        }
        if normalized
            .iter()
            .any(|existing| existing.eq_ignore_ascii_case(trimmed))
        {
            continue;
        }
        normalized.push(trimmed.to_string());
    }
    normalized
}

fn check_schedule(schedule: &JobSchedule) -> Result<(), MarketplaceError> {
    match schedule {
        JobSchedule::OneTime { .. } => Ok(()),
        JobSchedule::Recurring { days, .. } if days.is_empty() => Err(
            MarketplaceError::validation("recurring schedules need at least one weekday"),
        ),
        JobSchedule::Recurring { .. } => Ok(()),
    }
}

fn check_budget(budget: &Budget) -> Result<(), MarketplaceError> {
    match budget {
        Budget::Fixed { amount, .. } if *amount <= Decimal::ZERO => Err(
            MarketplaceError::validation("fixed budget amount must be positive"),
        ),
        Budget::Range { min, .. } if *min <= Decimal::ZERO => Err(MarketplaceError::validation(
            "budget range minimum must be positive",
        )),
        Budget::Range {
            min,
            max: Some(max),
            ..
        } if max < min => Err(MarketplaceError::validation(
            "budget range maximum must not be below the minimum",
        )),
        _ => Ok(()),
    }
}

/// Validate a requester payload and return its normalized form.
pub(crate) fn normalize_draft(draft: JobPostDraft) -> Result<JobPostDraft, MarketplaceError> {
    let JobPostDraft {
        title,
        description,
        location,
        skills,
        schedule,
        budget,
    } = draft;

    let title = required("title", title)?;
    let description = required("description", description)?;
    let location = required("location", location)?;

    let skills = normalize_tags(skills);
    if skills.is_empty() {
        return Err(MarketplaceError::validation(
            "at least one required skill is needed",
        ));
    }

    check_schedule(&schedule)?;
    check_budget(&budget)?;

    Ok(JobPostDraft {
        title,
        description,
        location,
        skills,
        schedule,
        budget,
    })
}
