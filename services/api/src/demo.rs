use crate::infra::{in_memory_marketplace, parse_amount, parse_hire_policy, MemoryMarketplace};
use chrono::{Duration, NaiveDate, NaiveTime, Utc};
use clap::Args;
use housekeep::config::MarketplaceConfig;
use housekeep::error::AppError;
use housekeep::marketplace::memory::ManualClock;
use housekeep::marketplace::{
    AdminId, ApplicationDraft, Budget, DocumentKind, DocumentUpload, Frequency, HirePolicy,
    JobPostDraft, JobSchedule, JobSearch, PostOrder, ProviderId, RateUnit, RequesterId,
    ReviewDecision, ServiceDraft, WeeklyAvailability, Weekday,
};
use rust_decimal::Decimal;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// What happens to other applicants on hire (leave_pending or reject_others).
    #[arg(long, value_parser = parse_hire_policy)]
    pub(crate) hire_policy: Option<HirePolicy>,
    /// Budget ceiling applied when the provider browses the job board.
    #[arg(long, value_parser = parse_amount)]
    pub(crate) budget_max: Option<Decimal>,
    /// Location keyword applied when the provider browses the job board.
    #[arg(long)]
    pub(crate) location: Option<String>,
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        hire_policy,
        budget_max,
        location,
    } = args;

    let config = MarketplaceConfig {
        hire_policy: hire_policy.unwrap_or_default(),
        ..MarketplaceConfig::default()
    };
    let clock = ManualClock::starting_at(Utc::now());
    let market = in_memory_marketplace(&config, Arc::new(clock.clone()));
    let today = Utc::now().date_naive();

    let rhea = RequesterId::new("rhea");
    let admin = AdminId::new("ops-admin");

    println!("Housekeep marketplace demo");
    println!("Hire policy: {}", config.hire_policy.label());

    println!("\nRequester publishes job posts");
    let drafts = [
        one_time_job("Move-out deep clean", "Makati City", 2500, today + Duration::days(3)),
        one_time_job("Post-party cleanup", "Makati City", 6000, today + Duration::days(1)),
        recurring_job("Weekly cook and laundry", "Quezon City", today + Duration::days(7)),
    ];
    let mut posts = Vec::with_capacity(drafts.len());
    for draft in drafts {
        clock.advance(Duration::minutes(1));
        let post = market.posts.create(&rhea, draft)?;
        println!(
            "  {} | {} | {} | budget ceiling {}",
            post.id,
            post.title,
            post.location,
            post.budget
                .ceiling()
                .map(|amount| amount.to_string())
                .unwrap_or_else(|| "open".to_string())
        );
        posts.push(post);
    }
    let target = posts[0].id.clone();

    println!("\nProvider onboarding");
    let maria = ProviderId::new("maria");
    match market.applications.apply(&maria, &target, pitch(today)) {
        Ok(application) => println!("  Unexpectedly accepted {}", application.id),
        Err(err) => println!("  Before upload: {err}"),
    }

    clock.advance(Duration::minutes(5));
    upload_id(&market, &maria, "id-blurry.jpg")?;
    clock.advance(Duration::minutes(5));
    market.eligibility.review_documents(
        &admin,
        &maria,
        ReviewDecision::Rejected,
        Some("ID photo is unreadable".to_string()),
    )?;
    print_verdict(&market, &maria)?;

    clock.advance(Duration::minutes(5));
    upload_id(&market, &maria, "id-clear.jpg")?;
    print_verdict(&market, &maria)?;

    clock.advance(Duration::minutes(5));
    market
        .eligibility
        .review_documents(&admin, &maria, ReviewDecision::Approved, None)?;
    print_verdict(&market, &maria)?;

    let joy = ProviderId::new("joy");
    upload_id(&market, &joy, "joy-id.jpg")?;
    clock.advance(Duration::minutes(1));
    market
        .eligibility
        .review_documents(&admin, &joy, ReviewDecision::Approved, None)?;

    println!("\nJob board for {maria}");
    let search = JobSearch {
        location,
        budget_max,
        order: PostOrder::SoonestStartDate,
        ..JobSearch::default()
    };
    for view in market.board.open_posts(&maria, &search)? {
        println!(
            "  {} | {} | starts {} | {} applicant(s)",
            view.id,
            view.title,
            view.schedule
                .start_date()
                .map(|date| date.to_string())
                .unwrap_or_else(|| "unscheduled".to_string()),
            view.applicant_count
        );
    }

    println!("\nApplications");
    clock.advance(Duration::minutes(1));
    let chosen = market.applications.apply(&maria, &target, pitch(today))?;
    println!("  {maria} applied to {target} as {}", chosen.id);
    clock.advance(Duration::minutes(1));
    let other = market.applications.apply(&joy, &target, pitch(today))?;
    println!("  {joy} applied to {target} as {}", other.id);
    if let Err(err) = market.applications.apply(&maria, &target, pitch(today)) {
        println!("  Second attempt by {maria}: {err}");
    }

    println!("\nHiring");
    clock.advance(Duration::minutes(1));
    let outcome = market.applications.accept(&rhea, &target, &chosen.id)?;
    println!(
        "  Hired {} on {}; post is now {}",
        outcome.hired.provider_id,
        target,
        outcome.post.status.label()
    );
    if !outcome.rejected.is_empty() {
        println!("  Closed out {} other applicant(s)", outcome.rejected.len());
    }
    if let Err(err) = market.applications.accept(&rhea, &target, &other.id) {
        println!("  Accepting {joy} as well: {err}");
    }
    for view in market.applications.my_applications(&joy)? {
        println!(
            "  {joy} sees {} on '{}' ({})",
            view.application.status.label(),
            view.job_title,
            view.job_status.label()
        );
    }

    println!("\nRequester dashboard");
    for view in market.posts.list_my_posts(&rhea, None, PostOrder::MostApplicants)? {
        println!(
            "  {} | {} | {} active applicant(s)",
            view.post.title,
            view.post.status.label(),
            view.active_applicant_count
        );
    }

    println!("\nService catalog");
    let service = market.catalog.create(&maria, cleaning_service())?;
    println!("  {maria} published {} ({})", service.title, service.id);
    market
        .eligibility
        .set_account_status(&admin, &maria, false, Some("Pending dispute".to_string()))?;
    match market
        .catalog
        .update(&maria, &service.id, cleaning_service())
    {
        Ok(_) => println!("  Update unexpectedly allowed"),
        Err(err) => println!("  Update after account was disabled: {err}"),
    }
    let hidden = market
        .catalog
        .set_availability(&maria, &service.id, false)?;
    println!(
        "  Availability toggle still works: is_available = {}",
        hidden.is_available
    );

    Ok(())
}

fn upload_id(
    market: &MemoryMarketplace,
    provider: &ProviderId,
    name: &str,
) -> Result<(), AppError> {
    let documents = market.eligibility.submit_documents(
        provider,
        DocumentKind::IdentificationCard,
        vec![DocumentUpload {
            name: name.to_string(),
            storage_key: format!("uploads/{provider}/{name}"),
        }],
    )?;
    println!("  {provider} uploaded {name}: documents {}", documents.status.label());
    Ok(())
}

fn print_verdict(market: &MemoryMarketplace, provider: &ProviderId) -> Result<(), AppError> {
    let verdict = market.eligibility.verdict(provider)?;
    println!(
        "  {provider}: {}{}",
        verdict.status.guidance(),
        verdict
            .reason
            .map(|reason| format!(" ({reason})"))
            .unwrap_or_default()
    );
    Ok(())
}

fn nine_am() -> NaiveTime {
    NaiveTime::from_hms_opt(9, 0, 0).unwrap_or_default()
}

fn one_time_job(title: &str, location: &str, amount: i64, date: NaiveDate) -> JobPostDraft {
    JobPostDraft {
        title: title.to_string(),
        description: format!("{title} for a two-bedroom condo unit"),
        location: location.to_string(),
        skills: vec!["Deep cleaning".to_string(), "Organizing".to_string()],
        schedule: JobSchedule::OneTime {
            date,
            time: nine_am(),
        },
        budget: Budget::Fixed {
            amount: Decimal::new(amount, 0),
            rate: RateUnit::PerJob,
        },
    }
}

fn recurring_job(title: &str, location: &str, starts_on: NaiveDate) -> JobPostDraft {
    JobPostDraft {
        title: title.to_string(),
        description: "Meal prep and laundry for a family of four".to_string(),
        location: location.to_string(),
        skills: vec!["Cooking".to_string(), "Laundry".to_string()],
        schedule: JobSchedule::Recurring {
            days: BTreeSet::from([Weekday::Tuesday, Weekday::Friday]),
            frequency: Frequency::Weekly,
            time: nine_am(),
            starts_on: Some(starts_on),
        },
        budget: Budget::Range {
            min: Decimal::new(800, 0),
            max: None,
            rate: RateUnit::Daily,
        },
    }
}

fn pitch(today: NaiveDate) -> ApplicationDraft {
    ApplicationDraft {
        cover_message: "Experienced with condo move-outs; I bring my own supplies.".to_string(),
        proposed_rate: Decimal::new(2400, 0),
        experience: Some("6 years".to_string()),
        availability: BTreeMap::from([(Weekday::Saturday, true), (Weekday::Sunday, true)]),
        requested_start: today + Duration::days(3),
    }
}

fn cleaning_service() -> ServiceDraft {
    ServiceDraft {
        title: "Condo deep cleaning".to_string(),
        category: "Cleaning".to_string(),
        tags: vec!["deep clean".to_string(), "move-out".to_string()],
        description: "Kitchen, bathrooms, and floors in one visit".to_string(),
        location: "Makati City".to_string(),
        availability: WeeklyAvailability {
            days: BTreeSet::from([Weekday::Monday, Weekday::Wednesday, Weekday::Saturday]),
            start_time: NaiveTime::from_hms_opt(8, 0, 0).unwrap_or_default(),
            end_time: NaiveTime::from_hms_opt(17, 0, 0).unwrap_or_default(),
        },
        price: Decimal::new(1800, 0),
        contact_number: "+63 917 555 0101".to_string(),
        image: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn demo_runs_with_defaults() {
        run_demo(DemoArgs::default()).expect("demo completes");
    }

    #[test]
    fn demo_runs_with_cascade_and_filters() {
        run_demo(DemoArgs {
            hire_policy: Some(HirePolicy::RejectOthers),
            budget_max: Some(Decimal::new(3000, 0)),
            location: Some("makati".to_string()),
        })
        .expect("demo completes");
    }
}
