use std::collections::HashSet;

use chrono::Duration;
use rust_decimal::Decimal;

use super::*;
use crate::marketplace::domain::{JobPostId, RequesterId};
use crate::marketplace::jobs::{Budget, JobPost, JobPostDraft, JobPostStatus, RateUnit};
use crate::marketplace::test_support::*;

fn post(id: &str, draft: JobPostDraft, minutes: i64) -> JobPost {
    JobPost::from_draft(
        JobPostId::new(id),
        RequesterId::new("rhea"),
        draft,
        start_time() + Duration::minutes(minutes),
    )
}

fn ids(posts: &[JobPost]) -> Vec<&str> {
    posts.iter().map(|post| post.id.as_str()).collect()
}

fn none_applied() -> HashSet<JobPostId> {
    HashSet::new()
}

#[test]
fn budget_ceiling_keeps_posts_at_or_below_it() {
    let posts = vec![
        post("p-2000", one_time_draft("Deep clean", "Makati City", 2000), 0),
        post("p-3000", one_time_draft("Deep clean", "Makati City", 3000), 1),
        post("p-5000", one_time_draft("Deep clean", "Makati City", 5000), 2),
    ];
    let search = JobSearch {
        budget_max: Some(Decimal::new(3000, 0)),
        ..JobSearch::default()
    };

    let visible = filter(&posts, &search, &none_applied());
    assert_eq!(ids(&visible), vec!["p-3000", "p-2000"]);
}

#[test]
fn open_ended_range_is_not_excluded_by_ceiling() {
    let mut draft = recurring_draft("Weekly upkeep", None);
    draft.budget = Budget::Range {
        min: Decimal::new(700, 0),
        max: None,
        rate: RateUnit::Daily,
    };
    let posts = vec![post("p-open", draft, 0)];
    let search = JobSearch {
        budget_max: Some(Decimal::new(500, 0)),
        ..JobSearch::default()
    };
    assert_eq!(ids(&filter(&posts, &search, &none_applied())), vec!["p-open"]);
}

#[test]
fn constraints_combine_conjunctively_in_any_order() {
    let posts = vec![
        post("makati-cheap", one_time_draft("Deep clean", "Makati City", 2000), 0),
        post("makati-pricey", one_time_draft("Deep clean", "Makati City", 6000), 1),
        post("pasig-cheap", one_time_draft("Deep clean", "Pasig", 1500), 2),
    ];

    let location_first = JobSearch {
        location: Some("makati".to_string()),
        budget_max: Some(Decimal::new(5000, 0)),
        ..JobSearch::default()
    };
    let mut budget_only = JobSearch {
        budget_max: Some(Decimal::new(5000, 0)),
        ..JobSearch::default()
    };
    let narrowed = filter(&posts, &budget_only, &none_applied());
    budget_only.location = Some("MAKATI".to_string());

    let a = filter(&posts, &location_first, &none_applied());
    let b = filter(&narrowed, &budget_only, &none_applied());
    assert_eq!(ids(&a), vec!["makati-cheap"]);
    assert_eq!(ids(&a), ids(&b));
}

#[test]
fn text_schedule_and_skill_filters() {
    let posts = vec![
        post("clean", one_time_draft("Deep clean", "Makati City", 2000), 0),
        post("cook", recurring_draft("Family cook", Some(date(2025, 4, 1))), 1),
    ];

    let by_text = JobSearch {
        query: Some("CONDO".to_string()),
        ..JobSearch::default()
    };
    assert_eq!(ids(&filter(&posts, &by_text, &none_applied())), vec!["clean"]);

    let by_schedule = JobSearch {
        schedule: Some(ScheduleKind::Recurring),
        ..JobSearch::default()
    };
    assert_eq!(ids(&filter(&posts, &by_schedule, &none_applied())), vec!["cook"]);

    let by_skill = JobSearch {
        skills: vec!["cook".to_string(), "  ".to_string()],
        ..JobSearch::default()
    };
    assert_eq!(ids(&filter(&posts, &by_skill, &none_applied())), vec!["cook"]);

    let either_skill = JobSearch {
        skills: vec!["laundry".to_string(), "cooking".to_string()],
        ..JobSearch::default()
    };
    assert_eq!(filter(&posts, &either_skill, &none_applied()).len(), 2);

    let blank_text = JobSearch {
        query: Some("   ".to_string()),
        ..JobSearch::default()
    };
    assert_eq!(filter(&posts, &blank_text, &none_applied()).len(), 2);
}

#[test]
fn applied_filter_partitions_the_board() {
    let posts = vec![
        post("a", one_time_draft("Deep clean", "Makati City", 2000), 0),
        post("b", one_time_draft("Deep clean", "Makati City", 2000), 1),
    ];
    let applied_to = HashSet::from([JobPostId::new("a")]);

    let applied = JobSearch {
        applied: AppliedFilter::Applied,
        ..JobSearch::default()
    };
    let not_applied = JobSearch {
        applied: AppliedFilter::NotApplied,
        ..JobSearch::default()
    };
    assert_eq!(ids(&filter(&posts, &applied, &applied_to)), vec!["a"]);
    assert_eq!(ids(&filter(&posts, &not_applied, &applied_to)), vec!["b"]);
    assert_eq!(filter(&posts, &JobSearch::default(), &applied_to).len(), 2);
}

#[test]
fn sort_orders() {
    let mut busy = post("busy", recurring_draft("Upkeep", None), 0);
    let applicant = |id: &str| {
        crate::marketplace::applications::Application::from_draft(
            crate::marketplace::domain::ApplicationId::new(id),
            JobPostId::new("busy"),
            provider(id),
            application_draft(),
            start_time(),
        )
    };
    busy.applicants = vec![applicant("x"), applicant("y")];
    let mut rejected_only = post("rejected", one_time_draft("Deep clean", "Makati City", 2000), 1);
    let mut gone = applicant("z");
    gone.status = crate::marketplace::applications::ApplicationStatus::Rejected;
    rejected_only.applicants = vec![gone.clone(), gone.clone(), gone];
    let early = post("early", recurring_draft("Cook", Some(date(2025, 3, 2))), 2);

    let mut posts = vec![busy, rejected_only, early];

    sort_posts(&mut posts, PostOrder::Newest);
    assert_eq!(ids(&posts), vec!["early", "rejected", "busy"]);

    sort_posts(&mut posts, PostOrder::MostApplicants);
    assert_eq!(ids(&posts), vec!["busy", "early", "rejected"]);

    sort_posts(&mut posts, PostOrder::SoonestStartDate);
    assert_eq!(ids(&posts), vec!["early", "rejected", "busy"]);
}

#[test]
fn board_lists_active_posts_and_redacts_other_applicants() {
    let harness = Harness::new();
    let owner = requester("rhea");
    let maria = harness.verified("maria");
    let joy = harness.verified("joy");

    let open = harness
        .market
        .posts
        .create(&owner, one_time_draft("Deep clean", "Makati City", 2000))
        .expect("open post");
    let paused = harness
        .market
        .posts
        .create(&owner, one_time_draft("Laundry", "Makati City", 800))
        .expect("paused post");
    harness
        .market
        .posts
        .set_status(&owner, &paused.id, JobPostStatus::Paused)
        .expect("pause");
    harness
        .market
        .applications
        .apply(&joy, &open.id, application_draft())
        .expect("joy applies");

    let board = harness
        .market
        .board
        .open_posts(&maria, &JobSearch::default())
        .expect("board");
    assert_eq!(board.len(), 1);
    assert_eq!(board[0].id, open.id);
    assert_eq!(board[0].applicant_count, 1);
    assert!(board[0].my_application.is_none());

    let mine = harness
        .market
        .applications
        .apply(&maria, &open.id, application_draft())
        .expect("maria applies");
    let applied = harness
        .market
        .board
        .open_posts(
            &maria,
            &JobSearch {
                applied: AppliedFilter::Applied,
                ..JobSearch::default()
            },
        )
        .expect("board");
    assert_eq!(applied.len(), 1);
    assert_eq!(
        applied[0].my_application.as_ref().map(|app| app.id.clone()),
        Some(mine.id)
    );
    assert_eq!(applied[0].applicant_count, 2);

    let payload = serde_json::to_value(&applied[0]).expect("serializes");
    assert!(payload.get("applicants").is_none());
}
