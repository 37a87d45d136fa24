use std::time::Duration;

use crate::transfer::State;
use crate::Error;

use super::scenario::Scenario;

#[test]
fn timeout_while_resolving() {
    let mut scenario = Scenario::builder()
        .get("host.test/file")
        .timeout(Duration::from_secs(1))
        .lookup_delay(usize::MAX)
        .build();

    // 10 x 100ms is exactly the timeout, which is still fine.
    for _ in 0..10 {
        assert_eq!(scenario.tick(), State::Resolving);
    }

    assert_eq!(scenario.tick(), State::Error);
    assert!(matches!(scenario.error(), Error::Timeout(_)));
}

#[test]
fn timeout_waiting_for_header() {
    let mut scenario = Scenario::builder()
        .get("host.test/file")
        .timeout(Duration::from_secs(5))
        .peer(|_| {})
        .build();

    scenario.to_state(State::ReceivingHeader);

    assert_eq!(scenario.run(), State::Error);
    assert!(matches!(scenario.error(), Error::Timeout(d) if *d == Duration::from_secs(5)));
}

#[test]
fn timeout_waiting_for_body() {
    let mut scenario = Scenario::builder()
        .get("host.test/file")
        .timeout(Duration::from_secs(5))
        .respond("HTTP/1.1 200 OK\r\nContent-Length: 10\r\n\r\nabc")
        .build();

    assert_eq!(scenario.run(), State::Error);
    assert!(matches!(scenario.error(), Error::Timeout(_)));
    assert_eq!(scenario.body(), b"abc");
}

#[test]
fn connect_restarts_timer() {
    let mut scenario = Scenario::builder()
        .get("host.test/file")
        .timeout(Duration::from_secs(1))
        .lookup_delay(8)
        .peer(|p| p.connect_after = 8)
        .build();

    // 0.9s resolving then 0.9s connecting, each under the timeout.
    scenario.to_state(State::ReceivingHeader);
}

#[test]
fn redirect_restarts_timer() {
    let mut scenario = Scenario::builder()
        .get("host.test/a")
        .timeout(Duration::from_secs(1))
        .max_redirects(1)
        .peer(|p| {
            p.connect_after = 6;
            p.push("HTTP/1.1 302 Found\r\nLocation: /b\r\n\r\n");
        })
        .peer(|p| {
            p.connect_after = 6;
            p.push("HTTP/1.1 200 OK\r\nContent-Length: 1\r\n\r\nb");
        })
        .build();

    assert_eq!(scenario.run(), State::Closed);
    assert_eq!(scenario.body(), b"b");
}

#[test]
fn finished_transfer_never_times_out() {
    let mut scenario = Scenario::builder()
        .get("host.test/file")
        .timeout(Duration::from_secs(1))
        .peer(|p| p.push("HTTP/1.1 200 OK\r\nContent-Length: 0\r\n\r\n"))
        .build();

    assert_eq!(scenario.run(), State::Closed);

    scenario.transfer.tick(Duration::from_secs(60));

    assert_eq!(scenario.transfer.state(), State::Closed);
    assert!(scenario.transfer.last_error().is_none());
}
