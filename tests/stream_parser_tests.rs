use roundtable::workflow::stream::{AgentEvent, EventParser};

#[test]
fn test_fragmented_event_line() {
    let mut parser = EventParser::new();

    let events1 = parser
        .process(b"{\"type\":\"text\",\"te")
        .expect("first chunk parse");
    assert_eq!(events1.len(), 0);

    let events2 = parser
        .process(b"xt\":\"Hi\"}\n")
        .expect("second chunk parse");
    assert_eq!(
        events2,
        vec![AgentEvent::Text {
            text: "Hi".to_string()
        }]
    );
}

#[test]
fn test_malformed_json_line_is_skipped() {
    let mut parser = EventParser::new();
    let events = parser
        .process(b"{invalid json}\n{\"type\":\"text\",\"text\":\"ok\"}\n")
        .expect("error handling should not fail parser");
    assert_eq!(
        events,
        vec![AgentEvent::Text {
            text: "ok".to_string()
        }]
    );
}

#[test]
fn test_session_and_result_events() {
    let mut parser = EventParser::new();
    let events = parser
        .process(b"{\"type\":\"session\",\"id\":\"s-42\"}\n{\"type\":\"result\",\"text\":\"done\"}\n")
        .expect("parse");
    assert_eq!(
        events,
        vec![
            AgentEvent::Session {
                id: "s-42".to_string()
            },
            AgentEvent::Result {
                text: "done".to_string()
            },
        ]
    );
}

#[test]
fn test_crlf_lines_parse_like_lf_lines() {
    let mut parser = EventParser::new();
    let events = parser
        .process(b"{\"type\":\"text\",\"text\":\"a\"}\r\nplain line\r\n")
        .expect("parse");
    assert_eq!(
        events,
        vec![
            AgentEvent::Text {
                text: "a".to_string()
            },
            AgentEvent::Text {
                text: "plain line".to_string()
            },
        ]
    );
}

#[test]
fn test_chunking_does_not_change_events() {
    let payload = b"{\"type\":\"text\",\"text\":\"one\"}\n{\"type\":\"result\",\"text\":\"two\"}\n";

    let mut whole = EventParser::new();
    let whole_events = whole.process(payload).expect("parse");

    let mut split = EventParser::new();
    let mut split_events = Vec::new();
    for chunk in payload.chunks(7) {
        split_events.extend(split.process(chunk).expect("parse"));
    }

    assert_eq!(whole_events, split_events);
    assert_eq!(whole_events.len(), 2);
}
