//! Embedding surface: typed handles, stale-handle detection, full flows.

use std::sync::Arc;
use std::time::Duration;

use tether::{Hub, InboundFrame, MessageKind, OutboundFrame, PollStatus, TetherError};
use tether_testing::{MockHttpTransport, MockWsTransport};

fn wait_terminal(hub: &Hub, client: tether::ClientHandle, id: tether::RequestId) -> PollStatus {
    for _ in 0..1000 {
        let status = hub.poll(client, id).expect("live handle");
        if status.is_terminal() {
            return status;
        }
        std::thread::sleep(Duration::from_millis(2));
    }
    hub.poll(client, id).expect("live handle")
}

#[test]
fn request_flow_through_handles() {
    let hub = Hub::new(2).expect("hub");
    let transport = Arc::new(MockHttpTransport::new().with_success("http://mock/200", 200, b"ok"));
    let client = hub.client_create_with(transport);

    hub.add_header(client, "x-token", "abc").expect("header");
    hub.add_param(client, "page", "1").expect("param");
    hub.set_clear_expires_enabled(client, true).expect("flag");

    let id = hub.submit_get(client, "http://mock/200").expect("submit");
    assert_eq!(wait_terminal(&hub, client, id), PollStatus::Succeeded);

    let response = hub.take_response(client, id).expect("response");
    assert_eq!(response.status, 200);
    assert_eq!(response.body.as_bytes(), b"ok");

    hub.remove(client, id).expect("remove");
    assert_eq!(
        hub.poll(client, id).expect("live handle"),
        PollStatus::NotFound
    );
}

#[test]
fn destroyed_client_handle_is_stale() {
    let hub = Hub::new(1).expect("hub");
    let client = hub.client_create_with(Arc::new(MockHttpTransport::new()));
    let id = hub.submit_get(client, "http://mock/x").expect("submit");

    hub.client_destroy(client).expect("destroy");

    // Every later operation on the handle is a detectable fault, and the
    // identifiers it issued die with it.
    assert!(matches!(
        hub.poll(client, id),
        Err(TetherError::Handle(_))
    ));
    assert!(matches!(
        hub.submit_get(client, "http://mock/y"),
        Err(TetherError::Handle(_))
    ));
    assert!(matches!(
        hub.client_destroy(client),
        Err(TetherError::Handle(_))
    ));
}

#[test]
fn handles_are_not_recycled_onto_new_contexts() {
    let hub = Hub::new(1).expect("hub");
    let first = hub.client_create_with(Arc::new(MockHttpTransport::new()));
    hub.client_destroy(first).expect("destroy");

    let second = hub.client_create_with(Arc::new(MockHttpTransport::new()));
    assert_ne!(first, second);

    // The old handle stays dead even though the slot was reused.
    assert!(matches!(
        hub.add_header(first, "k", "v"),
        Err(TetherError::Handle(_))
    ));
    hub.add_header(second, "k", "v").expect("new handle lives");
}

#[test]
fn destroying_a_client_with_work_in_flight_is_safe() {
    let hub = Hub::new(2).expect("hub");
    let transport = Arc::new(MockHttpTransport::new().with_hang("http://mock/hang"));
    let client = hub.client_create_with(transport);

    for _ in 0..10 {
        hub.submit_get(client, "http://mock/hang").expect("submit");
    }
    hub.client_destroy(client).expect("destroy with tasks in flight");
}

#[test]
fn independent_clients_do_not_share_configuration() {
    let hub = Hub::new(1).expect("hub");
    let transport_a = Arc::new(MockHttpTransport::new());
    let transport_b = Arc::new(MockHttpTransport::new());
    let transport_a_dyn: Arc<dyn tether::HttpTransport> = transport_a.clone();
    let transport_b_dyn: Arc<dyn tether::HttpTransport> = transport_b.clone();
    let a = hub.client_create_with(transport_a_dyn);
    let b = hub.client_create_with(transport_b_dyn);

    hub.add_header(a, "x-origin", "a").expect("header a");
    hub.add_header(b, "x-origin", "b").expect("header b");

    let id_a = hub.submit_get(a, "http://mock/a").expect("submit a");
    let id_b = hub.submit_get(b, "http://mock/b").expect("submit b");
    wait_terminal(&hub, a, id_a);
    wait_terminal(&hub, b, id_b);

    assert_eq!(
        transport_a.snapshots()[0].headers.get("x-origin").map(String::as_str),
        Some("a")
    );
    assert_eq!(
        transport_b.snapshots()[0].headers.get("x-origin").map(String::as_str),
        Some("b")
    );
}

#[test]
fn stream_flow_through_handles() {
    let hub = Hub::new(2).expect("hub");
    let (transport, remote) = MockWsTransport::new();
    let stream = hub.ws_connect_with(transport, "ws://mock/duplex", Vec::new());

    hub.ws_send(stream, b"ping".to_vec()).expect("send");
    remote.push_inbound(InboundFrame::Text("pong".to_string()));

    let message = hub.ws_receive(stream).expect("message");
    assert_eq!(message.kind, MessageKind::Text);
    assert_eq!(message.payload.as_str(), Some("pong"));

    for _ in 0..1000 {
        if remote.sent_count() == 1 {
            break;
        }
        std::thread::sleep(Duration::from_millis(2));
    }
    assert_eq!(
        remote.sent_frames(),
        vec![OutboundFrame::Binary(b"ping".to_vec())]
    );

    hub.ws_close(stream).expect("close");
    assert!(matches!(
        hub.ws_receive(stream),
        Err(TetherError::Handle(_))
    ));
}

#[test]
fn malformed_cookie_json_is_rejected_up_front() {
    let hub = Hub::new(1).expect("hub");
    assert!(matches!(
        hub.ws_connect("ws://mock/x", Some("not json")),
        Err(TetherError::InvalidCookies(_))
    ));
}
