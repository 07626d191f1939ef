//! Dispatch behavior against an in-memory backend.

mod common;

use common::MockBackend;
use triplecast_core::format::{decode_graph, RdfSyntax};
use triplecast_endpoint::dispatch::DispatchError;
use triplecast_endpoint::{dispatch, BufferSink, QueryShape};

const SELECT_QUERY: &str = "SELECT ?s WHERE { ?s ?p ?o }";
const CONSTRUCT_QUERY: &str = "CONSTRUCT { ?s ?p ?o } WHERE { ?s ?p ?o }";
const DESCRIBE_QUERY: &str = "DESCRIBE <http://example.org/alice>";

const N3_PAYLOAD: &str = "@prefix ex: <http://example.org/> .\n\
                          ex:alice a ex:Person ;\n\
                              ex:name \"Alice\" .\n";

fn run(
    query: &str,
    shape: QueryShape,
    tabular: &str,
    graph: &str,
    backend: &MockBackend,
) -> Result<BufferSink, DispatchError> {
    let mut sink = BufferSink::new();
    dispatch(query, shape, tabular, graph, backend, &mut sink)?;
    Ok(sink)
}

#[test]
fn select_streams_wire_bytes_unmodified() {
    // every no-conversion entry must produce output byte-identical to the
    // backend's stream, under that entry's media type
    let cases = [
        ("XML", "text/xml", "select:XML"),
        ("TEXT", "text/plain", "select:TEXT"),
        ("CSV", "text/csv", "select:CSV"),
        ("JSON", "application/javascript", "select:JSON"),
    ];
    for (name, media_type, expected_request) in cases {
        let payload = format!("raw {name} payload, \u{1F9EA} bytes included");
        let backend = MockBackend::new().with_select_payload(payload.clone());

        let sink = run(SELECT_QUERY, QueryShape::Select, name, "RDF/XML", &backend).unwrap();

        assert_eq!(sink.content_type(), Some(media_type), "format {name}");
        assert_eq!(sink.body_bytes(), payload.as_bytes(), "format {name}");
        assert_eq!(backend.requests(), [expected_request], "format {name}");
    }
}

#[test]
fn select_csv_matches_backend_bytes_exactly() {
    let csv = "s\nhttp://example.org/a\nhttp://example.org/b\n";
    let backend = MockBackend::new().with_select_payload(csv);

    let sink = run(SELECT_QUERY, QueryShape::Select, "CSV", "RDF/XML", &backend).unwrap();

    assert_eq!(sink.content_type(), Some("text/csv"));
    assert_eq!(sink.body_bytes(), csv.as_bytes());
}

#[test]
fn ask_writes_boolean_literal_for_any_formats() {
    for (value, expected) in [(true, "true"), (false, "false")] {
        // format parameters are irrelevant to the boolean path, even
        // nonsense ones that exist in neither registry
        for (tabular, graph) in [("XML", "TTL"), ("bogus", "alsobogus"), ("", "")] {
            let backend = MockBackend::new().with_ask_value(value);
            let sink = run("ASK { ?s ?p ?o }", QueryShape::Ask, tabular, graph, &backend).unwrap();

            assert_eq!(sink.content_type(), Some("text/plain"));
            assert_eq!(sink.body_bytes(), expected.as_bytes());
            assert_eq!(backend.requests(), ["ask"]);
        }
    }
}

#[test]
fn construct_ttl_converts_n3_wire_to_turtle() {
    let backend = MockBackend::new().with_graph_payload(N3_PAYLOAD);

    let sink = run(CONSTRUCT_QUERY, QueryShape::Construct, "XML", "TTL", &backend).unwrap();

    // the backend is asked for the N3 wire format
    assert_eq!(backend.requests(), ["graph:Construct:N3"]);
    assert_eq!(sink.content_type(), Some("application/x-turtle"));

    // the body is Turtle carrying the same statements
    let reparsed = decode_graph(sink.body_bytes(), RdfSyntax::Turtle).unwrap();
    let original = decode_graph(N3_PAYLOAD.as_bytes(), RdfSyntax::N3).unwrap();
    let mut expected: Vec<String> = original.iter().map(|t| t.to_string()).collect();
    let mut actual: Vec<String> = reparsed.iter().map(|t| t.to_string()).collect();
    expected.sort();
    actual.sort();
    assert_eq!(expected, actual);
}

#[test]
fn construct_rdfxml_abbrev_converts_n3_wire() {
    let backend = MockBackend::new().with_graph_payload(N3_PAYLOAD);

    let sink = run(
        CONSTRUCT_QUERY,
        QueryShape::Construct,
        "XML",
        "RDF/XML-ABBREV",
        &backend,
    )
    .unwrap();

    assert_eq!(backend.requests(), ["graph:Construct:N3"]);
    assert_eq!(sink.content_type(), Some("application/rdf+xml"));

    let text = String::from_utf8(sink.body_bytes().to_vec()).unwrap();
    assert!(text.contains("<rdf:RDF"));
    // abbreviated form: the rdf:type became a typed node element
    assert!(text.contains(":Person rdf:about=\"http://example.org/alice\""));
    assert!(!text.contains("rdf:Description"));
}

#[test]
fn construct_jsonld_entry_reemits_turtle() {
    // the JSON-LD registry row carries no re-encoding target, so the
    // conversion falls back to the wire syntax's display form
    let backend = MockBackend::new().with_graph_payload(N3_PAYLOAD);

    let sink = run(CONSTRUCT_QUERY, QueryShape::Construct, "XML", "JSON-LD", &backend).unwrap();

    assert_eq!(sink.content_type(), Some("application/x-turtle"));
    assert!(decode_graph(sink.body_bytes(), RdfSyntax::Turtle).is_ok());
}

#[test]
fn graph_stream_formats_pass_bytes_through() {
    let cases = [
        ("RDF/XML", "application/rdf+xml", "graph:Construct:RDF/XML"),
        ("N3", "text/n3", "graph:Construct:N3"),
        ("N-TRIPLE", "text/plain", "graph:Construct:N-Triples"),
    ];
    for (name, media_type, expected_request) in cases {
        // stream-through never inspects the payload, so even bytes that
        // are not valid in the wire format pass unmodified
        let payload = format!("opaque payload for {name}");
        let backend = MockBackend::new().with_graph_payload(payload.clone());

        let sink = run(CONSTRUCT_QUERY, QueryShape::Construct, "XML", name, &backend).unwrap();

        assert_eq!(sink.content_type(), Some(media_type), "format {name}");
        assert_eq!(sink.body_bytes(), payload.as_bytes(), "format {name}");
        assert_eq!(backend.requests(), [expected_request], "format {name}");
    }
}

#[test]
fn describe_reaches_backend_with_describe_shape() {
    let backend = MockBackend::new().with_graph_payload(N3_PAYLOAD);

    let sink = run(DESCRIBE_QUERY, QueryShape::Describe, "XML", "TTL", &backend).unwrap();

    assert_eq!(backend.requests(), ["graph:Describe:N3"]);
    assert_eq!(sink.content_type(), Some("application/x-turtle"));
    assert!(!sink.body_bytes().is_empty());
}

#[test]
fn unknown_formats_fail_dispatch_without_output() {
    let backend = MockBackend::new();
    let mut sink = BufferSink::new();

    let err = dispatch(
        SELECT_QUERY,
        QueryShape::Select,
        "MSGPACK",
        "RDF/XML",
        &backend,
        &mut sink,
    )
    .unwrap_err();
    assert!(matches!(err, DispatchError::FormatNotFound(name) if name == "MSGPACK"));

    let err = dispatch(
        CONSTRUCT_QUERY,
        QueryShape::Construct,
        "XML",
        "TRIG",
        &backend,
        &mut sink,
    )
    .unwrap_err();
    assert!(matches!(err, DispatchError::FormatNotFound(name) if name == "TRIG"));

    // the backend was never consulted and nothing was written
    assert!(backend.requests().is_empty());
    assert_eq!(sink.content_type(), None);
    assert!(sink.body_bytes().is_empty());
}

#[test]
fn backend_failure_propagates_without_retry() {
    let backend = MockBackend::new().failing();
    let mut sink = BufferSink::new();

    let err = dispatch(
        SELECT_QUERY,
        QueryShape::Select,
        "CSV",
        "RDF/XML",
        &backend,
        &mut sink,
    )
    .unwrap_err();

    assert!(matches!(err, DispatchError::Backend(_)));
    // exactly one attempt
    assert_eq!(backend.requests().len(), 1);
    assert_eq!(sink.content_type(), None);
}

#[test]
fn malformed_wire_payload_is_a_decode_error() {
    let backend = MockBackend::new().with_graph_payload("@prefix broken");
    let mut sink = BufferSink::new();

    let err = dispatch(
        CONSTRUCT_QUERY,
        QueryShape::Construct,
        "XML",
        "TTL",
        &backend,
        &mut sink,
    )
    .unwrap_err();

    assert!(matches!(err, DispatchError::Decode(_)));
    // decode failures happen before any response byte or header
    assert_eq!(sink.content_type(), None);
    assert!(sink.body_bytes().is_empty());
}
