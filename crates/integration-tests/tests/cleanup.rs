//! Expired account cleanup.

use chrono::{Months, TimeDelta};
use esa_gatekeeper::commands::{CommandError, CommandOutcome};
use esa_gatekeeper::workflow::{Action, Color, ExecutionReport, Target};
use esa_gatekeeper_core::RequestKind;
use esa_gatekeeper_integration_tests::{ADMIN, OWNER, TestContext};

/// A time `months` months and one day before the context's clock.
fn months_ago(ctx: &TestContext, months: u32) -> chrono::DateTime<chrono::Utc> {
    ctx.clock
        .now()
        .checked_sub_months(Months::new(months))
        .unwrap()
        - TimeDelta::days(1)
}

#[tokio::test]
async fn test_month_below_minimum_is_rejected_before_query() {
    let ctx = TestContext::new();

    let err = ctx.command(OWNER, "cleanup 3").await.unwrap_err();
    assert!(matches!(err, CommandError::InvalidMonth { min: 6, .. }));
    assert!(matches!(
        ctx.command(OWNER, "cleanup soon").await,
        Err(CommandError::InvalidMonth { .. })
    ));

    assert_eq!(ctx.directory.list_calls(), 0);
    assert!(ctx.store.is_empty().await);
}

#[tokio::test]
async fn test_nothing_to_clean_up() {
    let ctx = TestContext::new();
    let recent = ctx.clock.now() - TimeDelta::days(3);
    ctx.directory.add_member("active", recent);

    let outcome = ctx.command(OWNER, "cleanup").await.unwrap();
    assert_eq!(outcome, CommandOutcome::Replied);
    assert_eq!(ctx.chat.last_posted().text, "No accounts match the conditions");
    assert!(ctx.store.is_empty().await);
}

#[tokio::test]
async fn test_discovery_is_a_prefix_scan() {
    let ctx = TestContext::new();
    ctx.directory.add_member("stale1", months_ago(&ctx, 24));
    ctx.directory.add_member("stale2", months_ago(&ctx, 12));
    ctx.directory.add_member("fresh", ctx.clock.now() - TimeDelta::days(1));
    // Stale, but listed after the first fresh member.
    ctx.directory.add_member("late", months_ago(&ctx, 36));

    let id = ctx.propose(OWNER, "cleanup").await;
    let stored = ctx.store.get(&id).await.unwrap();
    assert_eq!(stored.target.value(), "stale1,stale2");

    let proposal = ctx.chat.last_posted();
    let text = &proposal.attachments[0].text;
    assert!(text.contains("https://docs.esa.io/members/stale1"));
    assert!(!text.contains("members/fresh"));
    assert!(!text.contains("members/late"));
}

#[tokio::test]
async fn test_cleanup_stops_at_first_failure() {
    let ctx = TestContext::new();
    for (name, months) in [("one", 30), ("two", 20), ("three", 10)] {
        ctx.directory.add_member(name, months_ago(&ctx, months));
    }
    ctx.directory.mark_missing("two");

    let id = ctx.propose(OWNER, "cleanup 6").await;
    let stored = ctx.store.get(&id).await.unwrap();
    assert!(matches!(&stored.target, Target::Cleanup(batch) if batch.len() == 3));

    let confirmed = ctx
        .click(
            &id,
            Action::Confirm(RequestKind::Cleanup),
            OWNER,
            None,
            ctx.chat.last_posted(),
        )
        .await;
    let approved = ctx
        .click(&id, Action::Approve(RequestKind::Cleanup), ADMIN, None, confirmed.message)
        .await;
    let report = approved.execution.unwrap().await.unwrap();

    match report {
        ExecutionReport::Failed {
            processed,
            target,
            position,
            total,
            ..
        } => {
            assert_eq!(processed, vec!["one"]);
            assert_eq!(target, "two");
            assert_eq!((position, total), (2, 3));
        }
        ExecutionReport::Completed { .. } => panic!("cleanup should have failed"),
    }
    assert_eq!(ctx.directory.deleted(), vec!["one"]);

    let last = ctx.chat.updates().pop().unwrap();
    let result = last.attachments.last().unwrap();
    assert_eq!(result.color, Color::Red.hex());
    assert!(result.text.contains("failed for target 2/3"));
    assert!(result.text.contains("one"));
    assert!(!result.text.contains("three"));
}

#[tokio::test]
async fn test_cleanup_success_lists_deleted_accounts() {
    let ctx = TestContext::new();
    ctx.directory.add_member("one", months_ago(&ctx, 30));
    ctx.directory.add_member("two", months_ago(&ctx, 20));

    let id = ctx.propose(OWNER, "cleanup").await;
    let confirmed = ctx
        .click(
            &id,
            Action::Confirm(RequestKind::Cleanup),
            OWNER,
            None,
            ctx.chat.last_posted(),
        )
        .await;
    let approved = ctx
        .click(&id, Action::Approve(RequestKind::Cleanup), ADMIN, None, confirmed.message)
        .await;
    approved.execution.unwrap().await.unwrap();

    assert_eq!(ctx.directory.deleted(), vec!["one", "two"]);
    let last = ctx.chat.updates().pop().unwrap();
    let result = last.attachments.last().unwrap();
    assert_eq!(result.color, Color::Green.hex());
    assert!(result.text.contains("https://docs.esa.io/team?keyword=two"));
}
