use std::io;

use crate::transfer::State;
use crate::{Error, MAX_HEAD_SIZE};

use super::scenario::{ok, Scenario};

#[test]
fn head_in_one_tick() {
    let mut scenario = Scenario::builder()
        .get("host.test/file")
        .respond(ok("hello"))
        .build();

    scenario.to_state(State::ReceivingHeader);

    assert_eq!(scenario.tick(), State::ParsingHeader);
    assert!(scenario.transfer.response().is_none());

    // Only the head is consumed.
    assert_eq!(scenario.peer(0).borrow().inbox.len(), 5);
}

#[test]
fn head_over_several_ticks() {
    let mut scenario = Scenario::builder()
        .get("host.test/file")
        .peer(|_| {})
        .build();

    scenario.to_state(State::ReceivingHeader);
    let peer = scenario.peer(0);

    assert_eq!(scenario.tick(), State::ReceivingHeader);

    peer.borrow_mut().push("HTTP/1.1 200 OK\r\n");
    assert_eq!(scenario.tick(), State::ReceivingHeader);

    peer.borrow_mut().push("Content-Length: 2\r\n\r");
    assert_eq!(scenario.tick(), State::ReceivingHeader);

    peer.borrow_mut().push("\nhi");
    assert_eq!(scenario.tick(), State::ParsingHeader);

    assert_eq!(scenario.run(), State::Closed);
    assert_eq!(scenario.body(), b"hi");
}

#[test]
fn peer_closed_before_head() {
    let mut scenario = Scenario::builder()
        .get("host.test/file")
        .peer(|p| {
            p.push("HTTP/1.1 200 OK\r\n");
            p.closed = true;
        })
        .build();

    assert_eq!(scenario.run(), State::Error);
    assert!(matches!(scenario.error(), Error::PeerClosed));
}

#[test]
fn recv_error() {
    let mut scenario = Scenario::builder()
        .get("host.test/file")
        .peer(|p| p.recv_error = Some(io::ErrorKind::ConnectionReset))
        .build();

    assert_eq!(scenario.run(), State::Error);
    assert!(matches!(
        scenario.error(),
        Error::Recv(e) if e.kind() == io::ErrorKind::ConnectionReset
    ));
}

#[test]
fn head_too_large() {
    let mut head = "HTTP/1.1 200 OK\r\nX-Filler: ".to_string();
    head.push_str(&"a".repeat(MAX_HEAD_SIZE));

    let mut scenario = Scenario::builder()
        .get("host.test/file")
        .respond(head)
        .build();

    assert_eq!(scenario.run(), State::Error);
    assert!(matches!(scenario.error(), Error::HeadTooLarge(_)));
}
