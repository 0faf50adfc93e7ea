use super::lifecycle::check_transition;
use super::*;
use crate::marketplace::domain::JobPostId;
use crate::marketplace::error::{MarketplaceError, RepositoryError};
use crate::marketplace::matching::PostOrder;
use crate::marketplace::test_support::*;
use rust_decimal::Decimal;

#[test]
fn transition_table_matches_the_state_machine() {
    use JobPostStatus::*;

    for (from, to) in [
        (Active, Paused),
        (Paused, Active),
        (Active, Archived),
        (Paused, Archived),
        (Hired, Archived),
    ] {
        assert!(check_transition(from, to).is_ok(), "{from:?} -> {to:?}");
    }

    for (from, to) in [
        (Archived, Active),
        (Archived, Paused),
        (Archived, Archived),
        (Active, Hired),
        (Paused, Hired),
        (Hired, Active),
        (Hired, Paused),
        (Active, Active),
    ] {
        assert!(
            matches!(check_transition(from, to), Err(MarketplaceError::InvalidState(_))),
            "{from:?} -> {to:?}"
        );
    }
}

#[test]
fn create_publishes_an_active_post_with_normalized_skills() {
    let harness = Harness::new();
    let mut draft = one_time_draft("  Deep clean  ", "Makati City", 2000);
    draft.skills = vec![
        " Laundry ".to_string(),
        "laundry".to_string(),
        String::new(),
        "Ironing".to_string(),
    ];

    let post = harness
        .market
        .posts
        .create(&requester("rhea"), draft)
        .expect("post created");

    assert_eq!(post.status, JobPostStatus::Active);
    assert_eq!(post.title, "Deep clean");
    assert_eq!(post.skills, vec!["Laundry".to_string(), "Ironing".to_string()]);
    assert!(post.applicants.is_empty());
    assert!(post.id.as_str().starts_with("post-"));
    assert_eq!(post.created_at, start_time());
}

#[test]
fn create_rejects_invalid_drafts() {
    let harness = Harness::new();
    let posts = &harness.market.posts;
    let owner = requester("rhea");

    let mut no_skills = one_time_draft("Deep clean", "Makati City", 2000);
    no_skills.skills = vec!["   ".to_string()];
    assert!(matches!(
        posts.create(&owner, no_skills),
        Err(MarketplaceError::Validation(_))
    ));

    let mut inverted = recurring_draft("Weekly upkeep", None);
    inverted.budget = Budget::Range {
        min: Decimal::new(900, 0),
        max: Some(Decimal::new(500, 0)),
        rate: RateUnit::Daily,
    };
    assert!(matches!(
        posts.create(&owner, inverted),
        Err(MarketplaceError::Validation(_))
    ));

    let mut no_days = recurring_draft("Weekly upkeep", None);
    if let JobSchedule::Recurring { days, .. } = &mut no_days.schedule {
        days.clear();
    }
    assert!(matches!(
        posts.create(&owner, no_days),
        Err(MarketplaceError::Validation(_))
    ));

    assert!(matches!(
        posts.create(&owner, one_time_draft("Deep clean", "   ", 2000)),
        Err(MarketplaceError::Validation(_))
    ));
}

#[test]
fn update_is_limited_to_owner_and_open_posts() {
    let harness = Harness::new();
    let posts = &harness.market.posts;
    let owner = requester("rhea");
    let post = posts
        .create(&owner, one_time_draft("Deep clean", "Makati City", 2000))
        .expect("post created");

    harness.tick();
    let updated = posts
        .update(&owner, &post.id, one_time_draft("Move-out clean", "Makati City", 2500))
        .expect("active post is editable");
    assert_eq!(updated.title, "Move-out clean");
    assert_eq!(updated.version, post.version + 1);
    assert!(updated.updated_at > updated.created_at);

    let stranger = posts.update(
        &requester("intruder"),
        &post.id,
        one_time_draft("Hijacked", "Makati City", 1),
    );
    assert!(matches!(stranger, Err(MarketplaceError::Unauthorized(_))));

    posts
        .set_status(&owner, &post.id, JobPostStatus::Archived)
        .expect("archive");
    let archived = posts.update(&owner, &post.id, one_time_draft("Late edit", "Makati City", 2000));
    assert!(matches!(archived, Err(MarketplaceError::InvalidState(_))));
}

#[test]
fn pause_resume_archive_round_trip() {
    let harness = Harness::new();
    let posts = &harness.market.posts;
    let owner = requester("rhea");
    let post = posts
        .create(&owner, one_time_draft("Deep clean", "Makati City", 2000))
        .expect("post created");

    let paused = posts
        .set_status(&owner, &post.id, JobPostStatus::Paused)
        .expect("pause");
    assert_eq!(paused.status, JobPostStatus::Paused);

    let resumed = posts
        .set_status(&owner, &post.id, JobPostStatus::Active)
        .expect("resume");
    assert_eq!(resumed.status, JobPostStatus::Active);

    let hired = posts.set_status(&owner, &post.id, JobPostStatus::Hired);
    assert!(matches!(hired, Err(MarketplaceError::InvalidState(_))));

    posts
        .set_status(&owner, &post.id, JobPostStatus::Archived)
        .expect("archive");
    let reopened = posts.set_status(&owner, &post.id, JobPostStatus::Active);
    assert!(matches!(reopened, Err(MarketplaceError::InvalidState(_))));

    let stored = harness
        .market
        .posts
        .get(&owner, &post.id)
        .expect("owner reads post");
    assert_eq!(stored.post.status, JobPostStatus::Archived);
}

#[test]
fn archiving_a_hired_post_clears_the_hired_person() {
    let harness = Harness::new();
    let owner = requester("rhea");
    let maria = harness.verified("maria");
    let post = harness
        .market
        .posts
        .create(&owner, one_time_draft("Deep clean", "Makati City", 2000))
        .expect("post created");
    let application = harness
        .market
        .applications
        .apply(&maria, &post.id, application_draft())
        .expect("maria applies");
    let outcome = harness
        .market
        .applications
        .accept(&owner, &post.id, &application.id)
        .expect("hire");
    assert!(outcome.post.hired.is_some());

    harness.tick();
    let archived = harness
        .market
        .posts
        .set_status(&owner, &post.id, JobPostStatus::Archived)
        .expect("archive after the job is done");
    assert_eq!(archived.status, JobPostStatus::Archived);
    assert!(archived.hired.is_none());
    assert_eq!(
        archived
            .application(&application.id)
            .map(|application| application.status),
        Some(crate::marketplace::applications::ApplicationStatus::Accepted)
    );
}

#[test]
fn delete_removes_post_and_its_applications() {
    let harness = Harness::new();
    let owner = requester("rhea");
    let maria = harness.verified("maria");
    let post = harness
        .market
        .posts
        .create(&owner, one_time_draft("Deep clean", "Makati City", 2000))
        .expect("post created");
    harness
        .market
        .applications
        .apply(&maria, &post.id, application_draft())
        .expect("application submitted");

    let denied = harness.market.posts.delete(&requester("intruder"), &post.id);
    assert!(matches!(denied, Err(MarketplaceError::Unauthorized(_))));

    let removed = harness
        .market
        .posts
        .delete(&owner, &post.id)
        .expect("owner deletes");
    assert_eq!(removed.applicants.len(), 1);

    assert!(harness.posts.fetch(&post.id).expect("fetch").is_none());
    assert!(harness
        .market
        .applications
        .my_applications(&maria)
        .expect("list")
        .is_empty());
    assert!(matches!(
        harness.market.posts.delete(&owner, &post.id),
        Err(MarketplaceError::NotFound(_))
    ));
}

#[test]
fn list_my_posts_filters_by_status_and_sorts() {
    let harness = Harness::new();
    let posts = &harness.market.posts;
    let owner = requester("rhea");

    let first = posts
        .create(&owner, recurring_draft("Weekly upkeep", Some(date(2025, 4, 1))))
        .expect("first");
    harness.tick();
    let second = posts
        .create(&owner, recurring_draft("Open-ended upkeep", None))
        .expect("second");
    harness.tick();
    let third = posts
        .create(&owner, one_time_draft("Deep clean", "Makati City", 2000))
        .expect("third");
    posts
        .create(&requester("someone-else"), one_time_draft("Other", "Pasig", 900))
        .expect("other requester");

    let newest: Vec<_> = posts
        .list_my_posts(&owner, None, PostOrder::Newest)
        .expect("list")
        .into_iter()
        .map(|view| view.post.id)
        .collect();
    assert_eq!(newest, vec![third.id.clone(), second.id.clone(), first.id.clone()]);

    let soonest: Vec<_> = posts
        .list_my_posts(&owner, None, PostOrder::SoonestStartDate)
        .expect("list")
        .into_iter()
        .map(|view| view.post.id)
        .collect();
    assert_eq!(soonest, vec![third.id.clone(), first.id.clone(), second.id.clone()]);

    posts
        .set_status(&owner, &first.id, JobPostStatus::Paused)
        .expect("pause");
    let paused = posts
        .list_my_posts(&owner, Some(JobPostStatus::Paused), PostOrder::Newest)
        .expect("list");
    assert_eq!(paused.len(), 1);
    assert_eq!(paused[0].post.id, first.id);
}

#[test]
fn requester_view_hides_rejected_applicants() {
    let harness = Harness::new();
    let owner = requester("rhea");
    let maria = harness.verified("maria");
    let joy = harness.verified("joy");
    let post = harness
        .market
        .posts
        .create(&owner, one_time_draft("Deep clean", "Makati City", 2000))
        .expect("post created");

    let rejected = harness
        .market
        .applications
        .apply(&maria, &post.id, application_draft())
        .expect("maria applies");
    harness
        .market
        .applications
        .apply(&joy, &post.id, application_draft())
        .expect("joy applies");
    harness
        .market
        .applications
        .reject(&owner, &post.id, &rejected.id)
        .expect("reject maria");

    let view = harness.market.posts.get(&owner, &post.id).expect("view");
    assert_eq!(view.active_applicant_count, 1);
    assert_eq!(view.rejected_count, 1);
    assert!(view
        .post
        .applicants
        .iter()
        .all(|application| application.provider_id == joy));

    let stored = harness.posts.fetch(&post.id).expect("fetch").expect("stored");
    assert_eq!(stored.applicants.len(), 2);
}

#[test]
fn missing_post_reports_not_found() {
    let harness = Harness::new();
    let missing = harness.market.posts.set_status(
        &requester("rhea"),
        &JobPostId::new("post-missing"),
        JobPostStatus::Paused,
    );
    assert!(matches!(missing, Err(MarketplaceError::NotFound(_))));
    assert!(matches!(
        harness.posts.delete(&JobPostId::new("post-missing")),
        Err(RepositoryError::NotFound)
    ));
}
