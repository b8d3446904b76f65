use super::*;

#[test]
fn utterance_request_round_trips_through_wire_encoding() {
    let req = Request::Utterance {
        source: Source::Cli,
        text: "status".to_string(),
        sender_id: None,
    };
    let bytes = encode(&req).expect("encode");
    let decoded: Request = decode(&bytes).expect("decode");
    assert_eq!(decoded, req);
}

#[test]
fn query_tag_is_snake_case_on_the_wire() {
    let req = Request::Query {
        query: Query::AgentDetail {
            id: AgentId::new("a-1"),
        },
    };
    let bytes = encode(&req).expect("encode");
    let text = String::from_utf8(bytes).expect("utf8");
    assert!(text.contains("\"agent_detail\""));
    assert!(text.contains("\"a-1\""));
}

#[test]
fn response_error_variant_carries_message() {
    let resp = Response::Error {
        message: "boom".to_string(),
    };
    let bytes = encode(&resp).expect("encode");
    let decoded: Response = decode(&bytes).expect("decode");
    match decoded {
        Response::Error { message } => assert_eq!(message, "boom"),
        other => panic!("unexpected response: {other:?}"),
    }
}

#[test]
fn unknown_source_field_fails_closed_not_silently() {
    // Unlike `Event`'s `#[serde(other)]` fallback, the wire protocol has no
    // forward-compat story — a CLI and daemon on mismatched versions should
    // fail loudly rather than silently misroute an utterance.
    let bad = br#"{"type":"Utterance","source":"carrier_pigeon","text":"hi"}"#;
    let result: Result<Request, _> = decode(bad);
    assert!(result.is_err());
}
