//! End-to-end workflow scenarios.
//!
//! Each test drives the command interpreter and the workflow engine the way
//! Slack would, and checks both the stored request and the rendered message.

use chrono::TimeDelta;
use esa_gatekeeper::commands::CommandError;
use esa_gatekeeper::workflow::{Action, Color, ExecutionReport, Outcome, RequestState, Verdict};
use esa_gatekeeper_core::RequestKind;
use esa_gatekeeper_integration_tests::{ADMIN, OUTSIDER, OWNER, Options, TestContext};

// =============================================================================
// Invite
// =============================================================================

#[tokio::test]
async fn test_invite_is_approved_and_executed() {
    let ctx = TestContext::new();

    let id = ctx.propose(OWNER, "invite a@example.com").await;
    let stored = ctx.store.get(&id).await.unwrap();
    assert_eq!(stored.target.value(), "a@example.com");
    assert_eq!(stored.organization, None);
    assert_eq!(stored.state, RequestState::AwaitingOrganization);

    let proposal = ctx.chat.last_posted();
    assert_eq!(proposal.attachments[0].callback_id, id.as_str());

    let selected = ctx
        .click(&id, Action::SelectOrganization, OWNER, Some("Org1"), proposal)
        .await;
    assert_eq!(selected.verdict, Verdict::Advanced);
    let stored = ctx.store.get(&id).await.unwrap();
    assert_eq!(stored.target.value(), "a@example.com");
    assert_eq!(stored.organization.as_deref(), Some("Org1"));
    assert_eq!(selected.message.attachments.len(), 2);

    let confirmed = ctx
        .click(&id, Action::Confirm(RequestKind::Invite), OWNER, None, selected.message)
        .await;
    assert_eq!(confirmed.verdict, Verdict::Advanced);
    let review = confirmed.message.attachments.last().unwrap();
    assert!(review.text.contains(&format!("<@{ADMIN}>")));

    let approved = ctx
        .click(&id, Action::Approve(RequestKind::Invite), ADMIN, None, confirmed.message)
        .await;
    assert_eq!(approved.verdict, Verdict::Approved);
    let report = approved.execution.unwrap().await.unwrap();
    assert_eq!(
        report,
        ExecutionReport::Completed {
            processed: vec!["a@example.com".to_string()]
        }
    );
    assert_eq!(ctx.directory.invited(), vec!["a@example.com"]);

    let last = ctx.chat.updates().pop().unwrap();
    let result = last.attachments.last().unwrap();
    assert_eq!(result.color, Color::Green.hex());
    assert!(result.text.starts_with(":+1:"));
}

#[tokio::test]
async fn test_invite_defaults_to_requester() {
    let ctx = TestContext::new();
    let id = ctx.propose(OWNER, "invite").await;
    let stored = ctx.store.get(&id).await.unwrap();
    assert_eq!(stored.target.value(), "owner@example.com");
}

#[tokio::test]
async fn test_invite_strips_mailto() {
    let ctx = TestContext::new();
    let id = ctx
        .propose(OWNER, "invite <mailto:b@example.com|b@example.com>")
        .await;
    let stored = ctx.store.get(&id).await.unwrap();
    assert_eq!(stored.target.value(), "b@example.com");
}

#[tokio::test]
async fn test_invite_domain_allow_list() {
    let ctx = TestContext::with_options(Options {
        allowed_email_domains: vec!["example.com".to_string()],
        ..Options::default()
    });

    let err = ctx.command(OWNER, "invite a@elsewhere.org").await.unwrap_err();
    assert!(matches!(err, CommandError::DisallowedDomain { .. }));
    assert!(err.to_string().contains("`example.com`"));
    assert!(ctx.store.is_empty().await);

    ctx.propose(OWNER, "invite a@EXAMPLE.com").await;
}

#[tokio::test]
async fn test_empty_organization_is_not_persisted() {
    let ctx = TestContext::new();
    let id = ctx.propose(OWNER, "invite a@example.com").await;
    let before = ctx.store.get(&id).await.unwrap();

    let refused = ctx
        .click(&id, Action::SelectOrganization, OWNER, Some(""), ctx.chat.last_posted())
        .await;
    assert_eq!(refused.verdict, Verdict::Invalid);
    let hinted = refused.message.attachments.last().unwrap();
    assert_eq!(hinted.color, Color::Orange.hex());
    assert!(!hinted.actions.is_empty());

    let after = ctx.store.get(&id).await.unwrap();
    assert_eq!(after, before);
    assert_eq!(after.organization, None);
}

// =============================================================================
// Delete
// =============================================================================

#[tokio::test]
async fn test_owner_cannot_approve_own_delete() {
    let ctx = TestContext::new();
    let id = ctx.propose(OWNER, "delete alice").await;

    let confirmed = ctx
        .click(
            &id,
            Action::Confirm(RequestKind::Delete),
            OWNER,
            None,
            ctx.chat.last_posted(),
        )
        .await;
    let before = ctx.store.get(&id).await.unwrap();
    assert_eq!(before.state, RequestState::AwaitingApproval);

    let refused = ctx
        .click(&id, Action::Approve(RequestKind::Delete), OWNER, None, confirmed.message)
        .await;
    assert_eq!(refused.verdict, Verdict::Unauthorized);
    assert!(refused.execution.is_none());
    let hint = refused.message.attachments.last().unwrap();
    assert!(hint.fields[0].value.contains("does not have approve permission"));

    assert_eq!(ctx.store.get(&id).await.unwrap(), before);
    assert!(ctx.directory.deleted().is_empty());
}

#[tokio::test]
async fn test_delete_requires_target() {
    let ctx = TestContext::new();
    let err = ctx.command(OWNER, "delete").await.unwrap_err();
    assert!(matches!(err, CommandError::MissingTarget));
    assert!(ctx.store.is_empty().await);
}

#[tokio::test]
async fn test_delete_of_missing_account_fails() {
    let ctx = TestContext::new();
    ctx.directory.mark_missing("ghost");
    let id = ctx.propose(OWNER, "delete ghost").await;

    let confirmed = ctx
        .click(
            &id,
            Action::Confirm(RequestKind::Delete),
            OWNER,
            None,
            ctx.chat.last_posted(),
        )
        .await;
    let approved = ctx
        .click(&id, Action::Approve(RequestKind::Delete), ADMIN, None, confirmed.message)
        .await;
    let report = approved.execution.unwrap().await.unwrap();
    assert!(matches!(report, ExecutionReport::Failed { .. }));

    let last = ctx.chat.updates().pop().unwrap();
    let result = last.attachments.last().unwrap();
    assert_eq!(result.color, Color::Red.hex());
    assert!(result.text.contains("already been deleted"));
}

#[tokio::test]
async fn test_reject_and_stale_buttons() {
    let ctx = TestContext::new();
    let id = ctx.propose(OWNER, "delete alice").await;
    let confirmed = ctx
        .click(
            &id,
            Action::Confirm(RequestKind::Delete),
            OWNER,
            None,
            ctx.chat.last_posted(),
        )
        .await;
    let review = confirmed.message.clone();

    let rejected = ctx
        .click(&id, Action::Reject, ADMIN, None, confirmed.message)
        .await;
    assert_eq!(rejected.verdict, Verdict::Rejected);
    assert_eq!(
        ctx.store.get(&id).await.unwrap().state,
        RequestState::Terminated {
            outcome: Outcome::Rejected
        }
    );

    // A second client still showing the review step.
    let stale = ctx
        .click(&id, Action::Approve(RequestKind::Delete), ADMIN, None, review)
        .await;
    assert_eq!(stale.verdict, Verdict::Stale);
    assert!(stale.execution.is_none());
    assert!(ctx.directory.deleted().is_empty());
}

#[tokio::test]
async fn test_concurrent_approvals_execute_once() {
    let ctx = TestContext::new();
    let id = ctx.propose(OWNER, "delete alice").await;
    let confirmed = ctx
        .click(
            &id,
            Action::Confirm(RequestKind::Delete),
            OWNER,
            None,
            ctx.chat.last_posted(),
        )
        .await;

    let (first, second) = tokio::join!(
        ctx.click(
            &id,
            Action::Approve(RequestKind::Delete),
            ADMIN,
            None,
            confirmed.message.clone()
        ),
        ctx.click(
            &id,
            Action::Approve(RequestKind::Delete),
            ADMIN,
            None,
            confirmed.message.clone()
        ),
    );

    let mut verdicts = [first.verdict, second.verdict];
    verdicts.sort_by_key(|v| *v == Verdict::Stale);
    assert_eq!(verdicts, [Verdict::Approved, Verdict::Stale]);

    for execution in [first.execution, second.execution].into_iter().flatten() {
        execution.await.unwrap();
    }
    assert_eq!(ctx.directory.deleted(), vec!["alice"]);
}

// =============================================================================
// Permissions and expiry
// =============================================================================

#[tokio::test]
async fn test_outsider_is_unauthorized_everywhere() {
    let ctx = TestContext::new();
    let id = ctx.propose(OWNER, "delete alice").await;
    let before = ctx.store.get(&id).await.unwrap();

    for action in [
        Action::Confirm(RequestKind::Delete),
        Action::Approve(RequestKind::Delete),
        Action::Cancel,
        Action::Reject,
    ] {
        let refused = ctx
            .click(&id, action, OUTSIDER, None, ctx.chat.last_posted())
            .await;
        assert_eq!(refused.verdict, Verdict::Unauthorized, "{action:?}");
        assert_eq!(ctx.store.get(&id).await.unwrap(), before);
    }
}

#[tokio::test]
async fn test_outsider_cannot_drive_an_invite() {
    let ctx = TestContext::new();
    let id = ctx.propose(OWNER, "invite a@example.com").await;
    let before = ctx.store.get(&id).await.unwrap();

    for (action, selection) in [
        (Action::SelectOrganization, Some("Org1")),
        (Action::Confirm(RequestKind::Invite), None),
        (Action::Cancel, None),
    ] {
        let refused = ctx
            .click(&id, action, OUTSIDER, selection, ctx.chat.last_posted())
            .await;
        assert_eq!(refused.verdict, Verdict::Unauthorized, "{action:?}");
        let after = ctx.store.get(&id).await.unwrap();
        assert_eq!(after, before);
        assert_eq!(after.organization, None);
    }

    let selected = ctx
        .click(&id, Action::SelectOrganization, OWNER, Some("Org1"), ctx.chat.last_posted())
        .await;
    assert_eq!(selected.verdict, Verdict::Advanced);
    let chosen = ctx.store.get(&id).await.unwrap();

    let refused = ctx
        .click(
            &id,
            Action::Confirm(RequestKind::Invite),
            OUTSIDER,
            None,
            selected.message,
        )
        .await;
    assert_eq!(refused.verdict, Verdict::Unauthorized);
    let after = ctx.store.get(&id).await.unwrap();
    assert_eq!(after, chosen);
    assert_eq!(after.state, RequestState::AwaitingConfirmation);
    assert!(ctx.directory.invited().is_empty());
}

#[tokio::test]
async fn test_request_expires_after_retention() {
    let ctx = TestContext::new();
    let id = ctx.propose(OWNER, "delete alice").await;

    ctx.clock.advance(TimeDelta::days(7));
    assert!(ctx.store.get(&id).await.is_some());

    ctx.clock.advance(TimeDelta::seconds(1));
    let expired = ctx
        .click(
            &id,
            Action::Confirm(RequestKind::Delete),
            OWNER,
            None,
            ctx.chat.last_posted(),
        )
        .await;
    assert_eq!(expired.verdict, Verdict::Expired);
    let notice = expired.message.attachments.last().unwrap();
    assert_eq!(notice.color, Color::Red.hex());
    assert!(notice.text.contains(id.as_str()));
    assert!(ctx.store.is_empty().await);
}

#[tokio::test]
async fn test_repeated_get_is_identical() {
    let ctx = TestContext::new();
    let id = ctx.propose(OWNER, "invite a@example.com").await;
    let first = ctx.store.get(&id).await.unwrap();
    let second = ctx.store.get(&id).await.unwrap();
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_owner_can_cancel() {
    let ctx = TestContext::new();
    let id = ctx.propose(OWNER, "invite a@example.com").await;
    let cancelled = ctx
        .click(&id, Action::Cancel, OWNER, None, ctx.chat.last_posted())
        .await;
    assert_eq!(cancelled.verdict, Verdict::Cancelled);
    let last = cancelled.message.attachments.last().unwrap();
    assert_eq!(last.color, Color::Yellow.hex());
    assert!(last.actions.is_empty());
    assert!(last.text.contains("canceled the request"));
}
