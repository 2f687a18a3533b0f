#![allow(clippy::unwrap_used, clippy::panic)]

mod common;

use common::{HTML, StaticTransport, XML, disco, loc, schema_ref, wsdl, xsd};
use disco_core::{Error, ReferenceKind, ResolutionState};

#[tokio::test]
async fn test_contract_is_found_and_children_registered() {
    let (transport, mut session) = StaticTransport::new()
        .serve("http://h/svc?wsdl", XML, &wsdl("Service", "types.xsd"))
        .into_session();

    let document = session.discover_any("http://h/svc?wsdl").await.unwrap();
    assert_eq!(document.kind(), ReferenceKind::Contract);
    assert_eq!(document.name(), Some("Service"));

    assert_eq!(transport.calls().len(), 1);
    let reference = session.reference(&loc("http://h/svc?wsdl")).unwrap();
    assert_eq!(reference.kind(), ReferenceKind::Contract);
    assert_eq!(reference.state(), ResolutionState::Resolved);
    assert_eq!(
        session.reference(&loc("http://h/types.xsd")).unwrap().state(),
        ResolutionState::Unresolved
    );
}

#[tokio::test]
async fn test_pointer_and_schema_are_recognized() {
    let (_, mut session) = StaticTransport::new()
        .serve("http://h/a.disco", XML, &disco(&schema_ref("c.xsd")))
        .serve("http://h/c.xsd", XML, &xsd("urn:c"))
        .into_session();

    let pointer = session.discover_any("http://h/a.disco").await.unwrap();
    assert_eq!(pointer.kind(), ReferenceKind::Pointer);
    let schema = session.discover_any("http://h/c.xsd").await.unwrap();
    assert_eq!(schema.kind(), ReferenceKind::Schema);
    assert_eq!(session.documents().len(), 2);
}

#[tokio::test]
async fn test_already_stored_location_is_not_fetched_again() {
    let (transport, mut session) = StaticTransport::new()
        .serve("http://h/c.xsd", XML, &xsd("urn:c"))
        .into_session();

    session.discover_any("http://h/c.xsd").await.unwrap();
    session.discover_any("http://h/c.xsd").await.unwrap();
    assert_eq!(transport.calls().len(), 1);
}

#[tokio::test]
async fn test_html_with_alternate_link_is_followed() {
    let page = r#"<html><head><link href="a.disco" type="text/xml" rel="alternate"></head></html>"#;
    let (transport, mut session) = StaticTransport::new()
        .serve("http://h/", HTML, page)
        .serve("http://h/a.disco", XML, &disco(""))
        .into_session();

    let document = session.discover_any("http://h/").await.unwrap();
    assert_eq!(document.kind(), ReferenceKind::Pointer);
    assert_eq!(transport.calls(), vec!["http://h/", "http://h/a.disco"]);
    assert!(session.documents().contains(&loc("http://h/a.disco")));
}

#[tokio::test]
async fn test_html_without_link_is_a_human_readable_page() {
    let (_, mut session) = StaticTransport::new()
        .serve("http://h/about", HTML, "<html><body>hello</body></html>")
        .into_session();

    let err = session.discover_any("http://h/about").await.unwrap_err();
    assert!(matches!(err, Error::HumanReadablePage { .. }));
    assert!(err.to_string().contains("human-readable page"));
}

#[tokio::test]
async fn test_identical_failures_collapse_to_one_error() {
    let (_, mut session) = StaticTransport::new()
        .serve(
            "http://h/broken",
            XML,
            r#"<discovery xmlns="http://schemas.xmlsoap.org/disco/"><discoveryRef ref="x">"#,
        )
        .into_session();

    let err = session.discover_any("http://h/broken").await.unwrap_err();
    assert!(
        !matches!(err, Error::AggregateDiscoveryFailure { .. }),
        "unexpected aggregate: {err}"
    );
    assert_eq!(err.category(), "xml");
}

#[tokio::test]
async fn test_heterogeneous_failures_are_aggregated() {
    let (_, mut session) = StaticTransport::new()
        .serve("http://h/feed", XML, r#"<feed xmlns="http://www.w3.org/2005/Atom"/>"#)
        .into_session();

    match session.discover_any("http://h/feed").await {
        Err(Error::AggregateDiscoveryFailure { url, failures }) => {
            assert_eq!(url, "http://h/feed");
            assert_eq!(failures.len(), 3);
            assert!(failures[0].contains("not a discovery document"));
            assert!(failures[1].contains("not a contract document"));
            assert!(failures[2].contains("not a schema document"));
        },
        other => panic!("expected aggregate failure, got {other:?}"),
    }
    assert!(session.documents().is_empty());
}

#[tokio::test]
async fn test_transport_errors_propagate() {
    let (_, mut session) = StaticTransport::new().into_session();
    let err = session.discover_any("http://h/nothing").await.unwrap_err();
    assert!(matches!(err, Error::Transport { status: 404, .. }));
}

#[tokio::test]
async fn test_alternate_link_onto_stored_location_is_not_fetched_again() {
    let page = r#"<html><head><link rel="alternate" type="text/xml" href="svc.disco"></head></html>"#;
    let (transport, mut session) = StaticTransport::new()
        .serve("http://h/svc.disco", XML, &disco(""))
        .serve("http://h/index.html", HTML, page)
        .into_session();

    session.resolve_all("http://h/svc.disco").await.unwrap();
    let document = session.discover_any("http://h/index.html").await.unwrap();
    assert_eq!(document.kind(), ReferenceKind::Pointer);

    assert_eq!(transport.count("http://h/svc.disco"), 1);
    assert_eq!(transport.count("http://h/index.html"), 1);
    assert!(session.reference(&loc("http://h/index.html")).is_none());
    assert_eq!(session.documents().len(), 1);
}

#[tokio::test]
async fn test_resolve_pending_continues_from_a_landing_page() {
    let page = r#"<html><head><link rel="alternate" type="text/xml" href="a.disco"></head></html>"#;
    let (transport, mut session) = StaticTransport::new()
        .serve("http://h/", HTML, page)
        .serve("http://h/a.disco", XML, &disco(&schema_ref("c.xsd")))
        .serve("http://h/c.xsd", XML, &xsd("urn:c"))
        .into_session();

    session.discover_any("http://h/").await.unwrap();
    session.resolve_pending().await.unwrap();

    assert_eq!(transport.calls(), vec!["http://h/", "http://h/a.disco", "http://h/c.xsd"]);
    assert_eq!(session.documents().len(), 2);
    assert!(session.errors().is_empty());
}
