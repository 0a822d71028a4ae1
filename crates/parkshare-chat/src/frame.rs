//! Wire helpers: inbound frame validation and endpoint construction.

use parkshare_core::{BookingId, ChatMessage, OutboundChatFrame};
use url::Url;

use crate::error::ChatError;
use crate::transport::CloseInfo;

/// Parse one inbound text frame into a [`ChatMessage`].
///
/// Every field of the message is required: `id` and `booking_id` must be
/// integers, `sender_id`/`receiver_id` UUID strings, `content` a string and
/// `sent_at` an ISO-8601 timestamp. Unknown keys are ignored. Each field
/// may use its camelCase spelling instead (`bookingId`, `sentAt`, ...), but
/// a frame carrying both spellings of the same field is malformed.
pub fn parse_chat_frame(raw: &str) -> Result<ChatMessage, ChatError> {
    serde_json::from_str::<ChatMessage>(raw).map_err(|e| ChatError::MalformedFrame(e.to_string()))
}

/// Serialize the outbound payload `{"content": ...}`.
pub fn encode_outbound(content: &str) -> Result<String, ChatError> {
    Ok(serde_json::to_string(&OutboundChatFrame::new(content))?)
}

/// Validate a configured chat endpoint prefix.
pub fn parse_endpoint(raw: &str) -> Result<Url, ChatError> {
    let url = Url::parse(raw).map_err(|e| ChatError::InvalidEndpoint(format!("{raw}: {e}")))?;
    match url.scheme() {
        "ws" | "wss" => {}
        other => {
            return Err(ChatError::InvalidEndpoint(format!(
                "{raw}: unsupported scheme {other:?}"
            )))
        }
    }
    if url.cannot_be_a_base() {
        return Err(ChatError::InvalidEndpoint(format!("{raw}: not a base URL")));
    }
    Ok(url)
}

/// `{base}/{booking_id}?token={token}`.
pub fn chat_url(base: &Url, booking_id: BookingId, token: &str) -> Result<Url, ChatError> {
    let mut url = base.clone();
    url.set_query(None);
    url.path_segments_mut()
        .map_err(|_| ChatError::InvalidEndpoint(base.to_string()))?
        .pop_if_empty()
        .push(&booking_id.to_string());
    url.query_pairs_mut().append_pair("token", token);
    Ok(url)
}

/// Close codes that end a session without an error: normal closure,
/// going away, and "no status received".
pub fn is_normal_close(info: Option<&CloseInfo>) -> bool {
    match info {
        None => true,
        Some(info) => matches!(info.code, 1000 | 1001 | 1005),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const ALICE: &str = "3fa85f64-5717-4562-b3fc-2c963f66afa6";
    const BOB: &str = "9b2e4c1a-0d7f-4e55-8a0b-1c2d3e4f5a6b";

    fn valid_frame() -> serde_json::Value {
        json!({
            "id": 1,
            "booking_id": 42,
            "sender_id": ALICE,
            "receiver_id": BOB,
            "content": "hi",
            "sent_at": "2024-01-01T00:00:00Z"
        })
    }

    #[test]
    fn test_parse_valid_frame() {
        let msg = parse_chat_frame(&valid_frame().to_string()).unwrap();
        assert_eq!(msg.id, 1);
        assert_eq!(msg.booking_id, 42);
        assert_eq!(msg.content, "hi");
    }

    #[test]
    fn test_parse_ignores_extra_keys() {
        let mut frame = valid_frame();
        frame["type"] = json!("message");
        assert!(parse_chat_frame(&frame.to_string()).is_ok());
    }

    #[test]
    fn test_parse_rejects_both_key_spellings() {
        let mut frame = valid_frame();
        frame["bookingId"] = json!(42);
        let err = parse_chat_frame(&frame.to_string()).unwrap_err();
        assert!(matches!(err, ChatError::MalformedFrame(_)));
    }

    #[test]
    fn test_parse_rejects_non_uuid_participants() {
        let raw = r#"{"id":1,"bookingId":42,"senderId":"u1","receiverId":"u2","content":"hi","sentAt":"2024-01-01T00:00:00Z"}"#;
        let err = parse_chat_frame(raw).unwrap_err();
        assert!(matches!(err, ChatError::MalformedFrame(_)));
    }

    #[test]
    fn test_parse_rejects_not_json() {
        let err = parse_chat_frame("hello there").unwrap_err();
        assert!(matches!(err, ChatError::MalformedFrame(_)));
    }

    #[test]
    fn test_parse_rejects_missing_each_field() {
        for field in ["id", "booking_id", "sender_id", "receiver_id", "content", "sent_at"] {
            let mut frame = valid_frame();
            frame.as_object_mut().unwrap().remove(field);
            let result = parse_chat_frame(&frame.to_string());
            assert!(
                matches!(result, Err(ChatError::MalformedFrame(_))),
                "frame without {field} should be rejected"
            );
        }
    }

    #[test]
    fn test_parse_rejects_wrong_types() {
        let mut bad_id = valid_frame();
        bad_id["id"] = json!("1");
        assert!(parse_chat_frame(&bad_id.to_string()).is_err());

        let mut bad_sender = valid_frame();
        bad_sender["sender_id"] = json!("u1");
        assert!(parse_chat_frame(&bad_sender.to_string()).is_err());

        let mut bad_time = valid_frame();
        bad_time["sent_at"] = json!("not a time");
        assert!(parse_chat_frame(&bad_time.to_string()).is_err());

        assert!(parse_chat_frame("[1, 2, 3]").is_err());
    }

    #[test]
    fn test_encode_outbound() {
        assert_eq!(encode_outbound("hello").unwrap(), r#"{"content":"hello"}"#);
        assert_eq!(
            encode_outbound("say \"hi\"").unwrap(),
            r#"{"content":"say \"hi\""}"#
        );
    }

    #[test]
    fn test_chat_url() {
        let base = parse_endpoint("ws://localhost:8000/api/v1/ws/chat").unwrap();
        let url = chat_url(&base, 42, "tok").unwrap();
        assert_eq!(url.as_str(), "ws://localhost:8000/api/v1/ws/chat/42?token=tok");
    }

    #[test]
    fn test_chat_url_trailing_slash_and_encoding() {
        let base = parse_endpoint("wss://parking.example.com/ws/chat/").unwrap();
        let url = chat_url(&base, 7, "a b&c").unwrap();
        assert_eq!(url.path(), "/ws/chat/7");
        assert_eq!(url.query(), Some("token=a+b%26c"));
    }

    #[test]
    fn test_parse_endpoint_rejects_http() {
        assert!(matches!(
            parse_endpoint("http://localhost:8000/ws/chat"),
            Err(ChatError::InvalidEndpoint(_))
        ));
        assert!(parse_endpoint("not a url").is_err());
    }

    #[test]
    fn test_normal_close_codes() {
        assert!(is_normal_close(None));
        let normal = CloseInfo { code: 1000, reason: String::new() };
        assert!(is_normal_close(Some(&normal)));
        let policy = CloseInfo { code: 1008, reason: "forbidden".into() };
        assert!(!is_normal_close(Some(&policy)));
        let internal = CloseInfo { code: 1011, reason: String::new() };
        assert!(!is_normal_close(Some(&internal)));
    }
}
