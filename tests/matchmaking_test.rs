mod common;

use tvo_coordinator::coordinator::{MatchOutcome, Pool};
use tvo_coordinator::error::CoordinatorError;

use common::{connect, connect_announced, coordinator};

#[tokio::test]
async fn first_requester_waits_second_is_paired() {
    let coordinator = coordinator();
    let mut alice = connect_announced(&coordinator, "peer-alice");
    let mut bob = connect_announced(&coordinator, "peer-bob");

    assert_eq!(
        coordinator.request_match(alice.id, Pool::Video),
        Ok(MatchOutcome::Waiting)
    );
    let waiting = alice.take("waiting");
    assert_eq!(waiting.len(), 1);
    assert_eq!(waiting[0]["payload"]["pool"], "video");

    assert_eq!(
        coordinator.request_match(bob.id, Pool::Video),
        Ok(MatchOutcome::Paired(alice.id))
    );

    let to_alice = alice.take("match-found");
    let to_bob = bob.take("match-found");
    assert_eq!(to_alice.len(), 1);
    assert_eq!(to_bob.len(), 1);
    assert_eq!(to_alice[0]["payload"]["partnerId"], "peer-bob");
    assert_eq!(to_bob[0]["payload"]["partnerId"], "peer-alice");

    assert_eq!(coordinator.partner_of(alice.id), Some(bob.id));
    assert_eq!(coordinator.partner_of(bob.id), Some(alice.id));
    assert_eq!(coordinator.pool_of(alice.id), None);
    assert_eq!(coordinator.stats().pair_sessions, 1);
    assert_eq!(coordinator.stats().waiting_video, 0);
}

#[tokio::test]
async fn duplicate_request_never_pairs_with_self() {
    let coordinator = coordinator();
    let alice = connect_announced(&coordinator, "peer-alice");

    assert_eq!(
        coordinator.request_match(alice.id, Pool::Video),
        Ok(MatchOutcome::Waiting)
    );
    assert_eq!(
        coordinator.request_match(alice.id, Pool::Video),
        Ok(MatchOutcome::Waiting)
    );

    assert_eq!(coordinator.partner_of(alice.id), None);
    assert_eq!(coordinator.stats().waiting_video, 1);
}

#[tokio::test]
async fn video_match_requires_announce() {
    let coordinator = coordinator();
    let mut anon = connect(&coordinator);

    let result = coordinator.request_match(anon.id, Pool::Video);
    assert!(matches!(result, Err(CoordinatorError::NotReady(_))));
    assert!(anon.drain().is_empty());
    assert_eq!(coordinator.pool_of(anon.id), None);
}

#[tokio::test]
async fn announce_can_trigger_video_match() {
    let coordinator = tvo_coordinator::coordinator::Coordinator::new(
        tvo_coordinator::hub::ConnectionHub::new(),
        true,
    );
    let mut alice = connect(&coordinator);
    let mut bob = connect(&coordinator);

    assert_eq!(coordinator.announce(alice.id, "peer-alice"), Ok(()));
    assert_eq!(alice.take("waiting").len(), 1);

    assert_eq!(coordinator.announce(bob.id, "peer-bob"), Ok(()));
    assert_eq!(coordinator.partner_of(bob.id), Some(alice.id));
    assert_eq!(bob.take("match-found")[0]["payload"]["partnerId"], "peer-alice");

    // A repeated announce keeps the first identifier and does not rematch.
    assert_eq!(coordinator.announce(alice.id, "someone-else"), Ok(()));
    assert_eq!(coordinator.partner_of(alice.id), Some(bob.id));
}

#[tokio::test]
async fn announce_rejects_empty_identifier() {
    let coordinator = coordinator();
    let alice = connect(&coordinator);
    assert!(matches!(
        coordinator.announce(alice.id, "   "),
        Err(CoordinatorError::InvalidPayload(_))
    ));
}

#[tokio::test]
async fn announce_from_departed_connection_is_noop() {
    let coordinator = coordinator();
    let alice = connect(&coordinator);
    coordinator.deregister(alice.id);

    assert_eq!(coordinator.announce(alice.id, ""), Ok(()));
    assert_eq!(coordinator.announce(alice.id, "peer-alice"), Ok(()));
    assert_eq!(coordinator.stats().connections, 0);
}

#[test]
fn events_arrive_in_commit_order() {
    for _ in 0..200 {
        let coordinator = coordinator();
        let alice = connect_announced(&coordinator, "peer-alice");
        let mut carol = connect_announced(&coordinator, "peer-carol");
        let _ = coordinator.request_match(alice.id, Pool::Video);

        std::thread::scope(|scope| {
            scope.spawn(|| coordinator.request_match(carol.id, Pool::Video));
            scope.spawn(|| coordinator.deregister(alice.id));
        });

        let types: Vec<String> = carol
            .drain()
            .iter()
            .map(|event| event["type"].as_str().unwrap_or_default().to_string())
            .collect();
        if let Some(left) = types.iter().position(|t| t == "partner-disconnected") {
            let found = types.iter().position(|t| t == "match-found");
            assert!(found.is_some_and(|found| found < left), "{types:?}");
        }
    }
}

#[tokio::test]
async fn pools_are_mutually_exclusive() {
    let coordinator = coordinator();
    let alice = connect_announced(&coordinator, "peer-alice");

    let _ = coordinator.request_match(alice.id, Pool::Chess);
    assert_eq!(coordinator.pool_of(alice.id), Some(Pool::Chess));

    let _ = coordinator.request_match(alice.id, Pool::Video);
    assert_eq!(coordinator.pool_of(alice.id), Some(Pool::Video));

    let stats = coordinator.stats();
    assert_eq!(stats.waiting_video, 1);
    assert_eq!(stats.waiting_chess, 0);

    assert!(coordinator.leave_pool(alice.id));
    assert!(!coordinator.leave_pool(alice.id));
    assert_eq!(coordinator.pool_of(alice.id), None);
}

#[tokio::test]
async fn paired_connection_cannot_join_chess_pool() {
    let coordinator = coordinator();
    let alice = connect_announced(&coordinator, "peer-alice");
    let bob = connect_announced(&coordinator, "peer-bob");
    let _ = coordinator.request_match(alice.id, Pool::Video);
    let _ = coordinator.request_match(bob.id, Pool::Video);

    let result = coordinator.request_match(alice.id, Pool::Chess);
    assert!(matches!(result, Err(CoordinatorError::Busy(_))));
    assert_eq!(coordinator.partner_of(alice.id), Some(bob.id));
}

#[tokio::test]
async fn relay_reaches_partner_only() {
    let coordinator = coordinator();
    let mut alice = connect_announced(&coordinator, "peer-alice");
    let mut bob = connect_announced(&coordinator, "peer-bob");
    let mut carol = connect_announced(&coordinator, "peer-carol");
    let _ = coordinator.request_match(alice.id, Pool::Video);
    let _ = coordinator.request_match(bob.id, Pool::Video);
    alice.drain();
    bob.drain();

    assert_eq!(coordinator.relay(alice.id, "hello"), Ok(()));

    let messages = bob.take("relayed-message");
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0]["payload"]["text"], "hello");
    assert_eq!(messages[0]["payload"]["sender"], "peer-alice");
    assert!(messages[0]["payload"]["timestamp"].is_i64());
    assert!(alice.drain().is_empty());
    assert!(carol.drain().is_empty());
}

#[tokio::test]
async fn relay_without_partner_is_noop() {
    let coordinator = coordinator();
    let mut alice = connect_announced(&coordinator, "peer-alice");
    assert_eq!(coordinator.relay(alice.id, "anyone?"), Ok(()));
    assert!(alice.drain().is_empty());
}

#[tokio::test]
async fn next_tears_down_and_rematches() {
    let coordinator = coordinator();
    let mut alice = connect_announced(&coordinator, "peer-alice");
    let mut bob = connect_announced(&coordinator, "peer-bob");
    let mut carol = connect_announced(&coordinator, "peer-carol");
    let _ = coordinator.request_match(alice.id, Pool::Video);
    let _ = coordinator.request_match(bob.id, Pool::Video);
    let _ = coordinator.request_match(carol.id, Pool::Video);
    alice.drain();
    bob.drain();
    carol.drain();

    assert_eq!(
        coordinator.request_next(alice.id),
        Ok(MatchOutcome::Paired(carol.id))
    );

    let left = bob.take("partner-disconnected");
    assert_eq!(left.len(), 1);
    assert_eq!(left[0]["payload"]["partnerId"], "peer-alice");
    assert_eq!(coordinator.partner_of(bob.id), None);
    // The former partner is not re-queued.
    assert_eq!(coordinator.pool_of(bob.id), None);

    assert_eq!(coordinator.partner_of(alice.id), Some(carol.id));
    assert_eq!(carol.take("match-found")[0]["payload"]["partnerId"], "peer-alice");
}

#[tokio::test]
async fn next_with_nobody_waiting_enters_pool() {
    let coordinator = coordinator();
    let mut alice = connect_announced(&coordinator, "peer-alice");
    let bob = connect_announced(&coordinator, "peer-bob");
    let _ = coordinator.request_match(alice.id, Pool::Video);
    let _ = coordinator.request_match(bob.id, Pool::Video);
    alice.drain();

    assert_eq!(coordinator.request_next(alice.id), Ok(MatchOutcome::Waiting));
    assert_eq!(coordinator.pool_of(alice.id), Some(Pool::Video));
    assert_eq!(coordinator.pool_of(bob.id), None);
    assert_eq!(alice.take("waiting").len(), 1);
}

#[tokio::test]
async fn disconnect_notifies_partner_and_is_idempotent() {
    let coordinator = coordinator();
    let alice = connect_announced(&coordinator, "peer-alice");
    let mut bob = connect_announced(&coordinator, "peer-bob");
    let _ = coordinator.request_match(alice.id, Pool::Video);
    let _ = coordinator.request_match(bob.id, Pool::Video);
    bob.drain();

    assert!(coordinator.deregister(alice.id));
    assert!(!coordinator.deregister(alice.id));

    let left = bob.take("partner-disconnected");
    assert_eq!(left.len(), 1);
    assert_eq!(left[0]["payload"]["partnerId"], "peer-alice");
    assert_eq!(coordinator.partner_of(bob.id), None);

    let stats = coordinator.stats();
    assert_eq!(stats.pair_sessions, 0);
    assert_eq!(stats.connections, 1);
}

#[tokio::test]
async fn disconnect_while_waiting_leaves_pool() {
    let coordinator = coordinator();
    let alice = connect_announced(&coordinator, "peer-alice");
    let _ = coordinator.request_match(alice.id, Pool::Video);

    coordinator.deregister(alice.id);
    assert_eq!(coordinator.stats().waiting_video, 0);

    let bob = connect_announced(&coordinator, "peer-bob");
    assert_eq!(
        coordinator.request_match(bob.id, Pool::Video),
        Ok(MatchOutcome::Waiting)
    );
}

#[tokio::test]
async fn sweep_reaps_dead_transport() {
    let coordinator = coordinator();
    let alice = connect_announced(&coordinator, "peer-alice");
    let mut bob = connect_announced(&coordinator, "peer-bob");
    let _ = coordinator.request_match(alice.id, Pool::Video);
    let _ = coordinator.request_match(bob.id, Pool::Video);
    bob.drain();

    // Alice's socket vanishes without a close frame.
    drop(alice.rx);
    assert!(!coordinator.is_live(alice.id));

    assert_eq!(coordinator.sweep(), 1);
    assert_eq!(coordinator.partner_of(bob.id), None);
    assert_eq!(bob.take("partner-disconnected").len(), 1);
    assert_eq!(coordinator.stats().connections, 1);

    assert_eq!(coordinator.sweep(), 0);
}

#[tokio::test]
async fn malformed_frame_yields_single_error() {
    let coordinator = coordinator();
    let mut alice = connect(&coordinator);

    coordinator.handle_frame(alice.id, "{not json");

    let events = alice.drain();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0]["type"], "error");
    assert_eq!(events[0]["payload"]["code"], "INVALID_PAYLOAD");
    assert_eq!(coordinator.pool_of(alice.id), None);
}

#[tokio::test]
async fn rejected_event_reports_error_code() {
    let coordinator = coordinator();
    let mut alice = connect(&coordinator);

    coordinator.handle_frame(alice.id, r#"{"type":"request-video-match"}"#);

    let errors = alice.take("error");
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0]["payload"]["code"], "NOT_READY");
}
