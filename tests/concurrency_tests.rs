//! Concurrency properties of the request table under load.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tether::{ClientContext, NetRuntime, PollStatus, RequestId};
use tether_testing::MockHttpTransport;

const TOTAL_REQUESTS: usize = 1000;
const CALLER_THREADS: usize = 8;

fn wait_all_terminal(client: &ClientContext, ids: &[RequestId]) {
    let deadline = Instant::now() + Duration::from_secs(30);
    for &id in ids {
        loop {
            if client.poll(id).is_terminal() {
                break;
            }
            assert!(Instant::now() < deadline, "request {id} never completed");
            std::thread::sleep(Duration::from_millis(1));
        }
    }
}

#[test]
fn thousand_concurrent_requests_transition_exactly_once() {
    let runtime = Arc::new(NetRuntime::new(4).expect("runtime"));
    let transport = Arc::new(MockHttpTransport::new().with_default_success(200, b"ok"));
    let client = Arc::new(ClientContext::new(transport));

    // Submit from several caller threads at once.
    let submitters: Vec<_> = (0..CALLER_THREADS)
        .map(|thread| {
            let runtime = Arc::clone(&runtime);
            let client = Arc::clone(&client);
            std::thread::spawn(move || {
                (0..TOTAL_REQUESTS / CALLER_THREADS)
                    .map(|n| client.submit_get(&runtime, format!("http://mock/{thread}/{n}")))
                    .collect::<Vec<_>>()
            })
        })
        .collect();

    let ids: Vec<RequestId> = submitters
        .into_iter()
        .flat_map(|t| t.join().expect("submitter thread"))
        .collect();

    // Identifiers are distinct across all callers.
    let distinct: HashSet<RequestId> = ids.iter().copied().collect();
    assert_eq!(distinct.len(), TOTAL_REQUESTS);

    wait_all_terminal(&client, &ids);

    // Every identifier reached Succeeded, and no identifier flaps between
    // terminal states on repeated observation.
    for &id in &ids {
        for _ in 0..3 {
            assert_eq!(client.poll(id), PollStatus::Succeeded);
        }
    }

    // The outcome moves out exactly once per identifier.
    for &id in &ids {
        assert!(client.take_response(id).is_ok());
        assert!(client.take_response(id).is_err());
    }
}

#[test]
fn removal_races_completion_without_corruption() {
    let runtime = Arc::new(NetRuntime::new(4).expect("runtime"));
    let transport = Arc::new(MockHttpTransport::new().with_default_success(200, b"ok"));
    let client = Arc::new(ClientContext::new(transport));

    let ids: Vec<RequestId> = (0..200)
        .map(|n| client.submit_get(&runtime, format!("http://mock/{n}")))
        .collect();

    // Remove every other entry while its task may still be running.
    let (removed, kept): (Vec<_>, Vec<_>) =
        ids.iter().copied().enumerate().partition(|(n, _)| n % 2 == 0);
    for &(_, id) in &removed {
        client.remove(id);
    }

    let kept_ids: Vec<RequestId> = kept.iter().map(|&(_, id)| id).collect();
    wait_all_terminal(&client, &kept_ids);

    for &(_, id) in &removed {
        assert_eq!(client.poll(id), PollStatus::NotFound);
    }
    for &id in &kept_ids {
        assert_eq!(client.poll(id), PollStatus::Succeeded);
    }
}

#[test]
fn polling_while_completing_never_observes_a_torn_state() {
    let runtime = Arc::new(NetRuntime::new(2).expect("runtime"));
    let transport = Arc::new(MockHttpTransport::new().with_default_success(204, b""));
    let client = Arc::new(ClientContext::new(transport));

    let id = client.submit_get(&runtime, "http://mock/racy");

    // Hammer the poll from several readers while the single writer task
    // completes; the only legal observations are Pending then Succeeded.
    let readers: Vec<_> = (0..4)
        .map(|_| {
            let client = Arc::clone(&client);
            std::thread::spawn(move || {
                let mut saw_terminal = false;
                for _ in 0..5000 {
                    match client.poll(id) {
                        PollStatus::Pending => {
                            assert!(!saw_terminal, "state flapped back to Pending");
                        }
                        PollStatus::Succeeded => saw_terminal = true,
                        other => panic!("unexpected state {other}"),
                    }
                }
            })
        })
        .collect();

    for reader in readers {
        reader.join().expect("reader thread");
    }
}
