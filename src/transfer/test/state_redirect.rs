use crate::transfer::State;
use crate::Error;

use super::scenario::{addr, ok, redirect, Scenario};

#[test]
fn absolute_location() {
    let mut scenario = Scenario::builder()
        .get("host.test/old")
        .max_redirects(1)
        .respond(redirect(302, "http://other.test/new"))
        .respond(ok("moved"))
        .build();

    scenario.to_state(State::ParsingHeader);
    assert_eq!(scenario.tick(), State::Resolving);
    assert_eq!(scenario.transfer.redirects_left(), 0);
    assert_eq!(scenario.transfer.url().to_string(), "http://other.test/new");

    assert_eq!(scenario.run(), State::Closed);
    assert_eq!(scenario.body(), b"moved");
    assert_eq!(scenario.net.lookups(), vec!["host.test", "other.test"]);
    assert_eq!(
        scenario.net.connects(),
        vec![addr("10.0.0.1:80"), addr("10.0.0.2:80")]
    );
    assert!(scenario.sent(1).starts_with("GET /new HTTP/1.1\r\nHost: other.test\r\n"));
}

#[test]
fn moved_permanently() {
    let mut scenario = Scenario::builder()
        .get("host.test/old")
        .max_redirects(1)
        .respond(redirect(301, "/new"))
        .respond(ok("moved"))
        .build();

    assert_eq!(scenario.run(), State::Closed);
    assert_eq!(scenario.body(), b"moved");
}

#[test]
fn absolute_path_keeps_host() {
    let mut scenario = Scenario::builder()
        .get("host.test/a/b?x=1")
        .max_redirects(1)
        .respond(redirect(302, "/c"))
        .respond(ok(""))
        .build();

    assert_eq!(scenario.run(), State::Closed);
    assert_eq!(scenario.transfer.url().to_string(), "http://host.test/c");
    assert_eq!(scenario.net.lookups(), vec!["host.test", "host.test"]);
}

#[test]
fn relative_path() {
    let mut scenario = Scenario::builder()
        .get("host.test/x/foo.html")
        .max_redirects(1)
        .respond(redirect(302, "y/bar.html"))
        .respond(ok(""))
        .build();

    assert_eq!(scenario.run(), State::Closed);
    assert_eq!(scenario.transfer.url().path(), "/x/y/bar.html");
}

#[test]
fn scheme_marker_in_location_query() {
    let mut scenario = Scenario::builder()
        .get("host.test/a")
        .max_redirects(1)
        .respond(redirect(302, "/login?next=http://other.test/b"))
        .respond(ok("login"))
        .build();

    assert_eq!(scenario.run(), State::Closed);
    assert_eq!(scenario.body(), b"login");
    assert_eq!(scenario.net.lookups(), vec!["host.test", "host.test"]);
    assert!(scenario.sent(1).starts_with("GET /login?next=http://other.test/b HTTP/1.1\r\n"));
}

#[test]
fn port_reset_to_default() {
    let mut scenario = Scenario::builder()
        .get("host.test:8080/a")
        .max_redirects(1)
        .respond(redirect(302, "/b"))
        .respond(ok(""))
        .build();

    assert_eq!(scenario.run(), State::Closed);
    assert_eq!(
        scenario.net.connects(),
        vec![addr("10.0.0.1:8080"), addr("10.0.0.1:80")]
    );
}

#[test]
fn location_with_port() {
    let mut scenario = Scenario::builder()
        .get("host.test/a")
        .max_redirects(1)
        .respond(redirect(302, "http://other.test:8081/b"))
        .respond(ok(""))
        .build();

    assert_eq!(scenario.run(), State::Closed);
    assert_eq!(scenario.net.connects()[1], addr("10.0.0.2:8081"));
}

#[test]
fn port_override_persists() {
    let mut scenario = Scenario::builder()
        .get("host.test:8080/a")
        .port_override(9000)
        .max_redirects(1)
        .respond(redirect(302, "http://other.test/b"))
        .respond(ok(""))
        .build();

    assert_eq!(scenario.run(), State::Closed);
    assert_eq!(
        scenario.net.connects(),
        vec![addr("10.0.0.1:9000"), addr("10.0.0.2:9000")]
    );
}

#[test]
fn literal_ip_location() {
    let mut scenario = Scenario::builder()
        .get("host.test/a")
        .max_redirects(1)
        .respond(redirect(302, "http://10.9.9.9/b"))
        .respond(ok("ip"))
        .build();

    scenario.to_state(State::ParsingHeader);
    assert_eq!(scenario.tick(), State::Resolved);

    assert_eq!(scenario.run(), State::Closed);
    assert_eq!(scenario.net.lookups(), vec!["host.test"]);
    assert_eq!(scenario.net.connects()[1], addr("10.9.9.9:80"));
}

#[test]
fn chain_within_budget() {
    let mut scenario = Scenario::builder()
        .get("host.test/1")
        .max_redirects(2)
        .respond(redirect(302, "/2"))
        .respond(redirect(301, "/3"))
        .respond(ok("three"))
        .build();

    assert_eq!(scenario.run(), State::Closed);
    assert_eq!(scenario.body(), b"three");
    assert_eq!(scenario.transfer.redirects_left(), 0);
}

#[test]
fn budget_exhausted() {
    let mut scenario = Scenario::builder()
        .get("host.test/1")
        .max_redirects(1)
        .respond(redirect(302, "/2"))
        .respond(redirect(302, "/3"))
        .respond(ok("never"))
        .build();

    assert_eq!(scenario.run(), State::Error);
    assert!(matches!(scenario.error(), Error::RedirectLimit));
    assert_eq!(scenario.transfer.redirects_left(), 0);
    assert_eq!(scenario.net.connects().len(), 2);
    assert!(scenario.body().is_empty());
}

#[test]
fn form_never_redirects() {
    let mut scenario = Scenario::builder()
        .get("host.test/news")
        .extra_url_parameters("lang=en")
        .respond(redirect(302, "/elsewhere"))
        .build();

    assert_eq!(scenario.run(), State::Error);
    assert!(matches!(scenario.error(), Error::RedirectLimit));
}

#[test]
fn missing_location() {
    let mut scenario = Scenario::builder()
        .get("host.test/a")
        .max_redirects(1)
        .respond("HTTP/1.1 302 Found\r\nContent-Length: 0\r\n\r\n")
        .build();

    assert_eq!(scenario.run(), State::Error);
    assert!(matches!(scenario.error(), Error::NoLocationHeader));
    assert_eq!(scenario.transfer.redirects_left(), 1);
}

#[test]
fn bad_location() {
    let mut scenario = Scenario::builder()
        .get("host.test/a")
        .max_redirects(1)
        .respond(redirect(302, "https://other.test/b"))
        .build();

    assert_eq!(scenario.run(), State::Error);
    assert!(matches!(scenario.error(), Error::BadLocationHeader(_)));
}

#[test]
fn lowercase_location_header() {
    let mut scenario = Scenario::builder()
        .get("host.test/a")
        .max_redirects(1)
        .respond("HTTP/1.1 302 Found\r\nlocation: /b\r\n\r\n")
        .respond(ok("b"))
        .build();

    assert_eq!(scenario.run(), State::Closed);
    assert_eq!(scenario.body(), b"b");
}
