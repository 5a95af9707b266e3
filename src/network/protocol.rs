//! Socket.IO v4 framing over the Engine.IO WebSocket transport.
//!
//! Every text frame starts with an Engine.IO packet type digit. Type `4`
//! carries a Socket.IO packet whose own type digit follows immediately,
//! so a Socket.IO event arrives as `42["name",payload]`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::common::{LiveMessage, RoomId};

/// Handshake carried by the Engine.IO open packet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Handshake {
    pub sid: String,
    #[serde(default)]
    pub ping_interval: u64,
    #[serde(default)]
    pub ping_timeout: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Packet {
    Open(Handshake),
    Close,
    Ping(String),
    Pong(String),
    Noop,
    Connect,
    Disconnect,
    Event { name: String, data: Value },
    ConnectError(String),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProtocolError {
    #[error("empty frame")]
    Empty,
    #[error("unknown engine.io packet type `{0}`")]
    UnknownEnginePacket(char),
    #[error("unknown socket.io packet type `{0}`")]
    UnknownSocketPacket(char),
    #[error("malformed packet body: {0}")]
    Malformed(String),
}

impl Packet {
    pub fn decode(text: &str) -> Result<Self, ProtocolError> {
        let mut chars = text.chars();
        let kind = chars.next().ok_or(ProtocolError::Empty)?;
        let body = chars.as_str();

        match kind {
            '0' => serde_json::from_str(body)
                .map(Packet::Open)
                .map_err(|err| ProtocolError::Malformed(err.to_string())),
            '1' => Ok(Packet::Close),
            '2' => Ok(Packet::Ping(body.to_string())),
            '3' => Ok(Packet::Pong(body.to_string())),
            '4' => decode_socket_packet(body),
            '6' => Ok(Packet::Noop),
            other => Err(ProtocolError::UnknownEnginePacket(other)),
        }
    }

    pub fn encode(&self) -> String {
        match self {
            Packet::Open(handshake) => format!(
                "0{}",
                serde_json::to_string(handshake).unwrap_or_else(|_| "{}".to_string())
            ),
            Packet::Close => "1".to_string(),
            Packet::Ping(payload) => format!("2{payload}"),
            Packet::Pong(payload) => format!("3{payload}"),
            Packet::Noop => "6".to_string(),
            Packet::Connect => "40".to_string(),
            Packet::Disconnect => "41".to_string(),
            Packet::Event { name, data } => {
                format!("42{}", Value::Array(vec![Value::String(name.clone()), data.clone()]))
            }
            Packet::ConnectError(message) => {
                format!("44{}", serde_json::json!({ "message": message }))
            }
        }
    }
}

fn decode_socket_packet(body: &str) -> Result<Packet, ProtocolError> {
    let mut chars = body.chars();
    let kind = chars
        .next()
        .ok_or_else(|| ProtocolError::Malformed("missing socket.io packet type".into()))?;
    let rest = skip_namespace(chars.as_str());

    match kind {
        '0' => Ok(Packet::Connect),
        '1' => Ok(Packet::Disconnect),
        '2' => decode_event(rest),
        '4' => {
            let message = serde_json::from_str::<Value>(rest)
                .ok()
                .and_then(|value| value.get("message").and_then(Value::as_str).map(str::to_string))
                .unwrap_or_else(|| rest.to_string());
            Ok(Packet::ConnectError(message))
        }
        other => Err(ProtocolError::UnknownSocketPacket(other)),
    }
}

/// Drop an optional `/namespace,` prefix.
fn skip_namespace(body: &str) -> &str {
    if body.starts_with('/') {
        match body.find(',') {
            Some(idx) => &body[idx + 1..],
            None => "",
        }
    } else {
        body
    }
}

fn decode_event(body: &str) -> Result<Packet, ProtocolError> {
    // Acknowledgement ids sit between the type and the payload.
    let payload = body.trim_start_matches(|c: char| c.is_ascii_digit());
    let mut items: Vec<Value> =
        serde_json::from_str(payload).map_err(|err| ProtocolError::Malformed(err.to_string()))?;
    if items.is_empty() {
        return Err(ProtocolError::Malformed("event without a name".into()));
    }

    let name = match items.remove(0) {
        Value::String(name) => name,
        other => return Err(ProtocolError::Malformed(format!("event name {other}"))),
    };
    let data = if items.is_empty() {
        Value::Null
    } else {
        items.remove(0)
    };
    Ok(Packet::Event { name, data })
}

/// Events the client emits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientEvent {
    Join { room: RoomId },
    SendMessage(LiveMessage),
}

impl ClientEvent {
    pub fn into_packet(self) -> Result<Packet, serde_json::Error> {
        let (name, data) = match self {
            ClientEvent::Join { room } => ("join", serde_json::json!({ "room": room })),
            ClientEvent::SendMessage(message) => ("send_message", serde_json::to_value(message)?),
        };
        Ok(Packet::Event {
            name: name.to_string(),
            data,
        })
    }
}

/// Events the server pushes to the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerEvent {
    ReceiveMessage(LiveMessage),
    UpdateRecents,
    Unknown(String),
}

impl ServerEvent {
    pub fn from_event(name: &str, data: Value) -> Result<Self, serde_json::Error> {
        Ok(match name {
            "receive_message" => ServerEvent::ReceiveMessage(serde_json::from_value(data)?),
            "update_recents" => ServerEvent::UpdateRecents,
            other => ServerEvent::Unknown(other.to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::UserId;

    #[test]
    fn decodes_open_handshake() {
        let packet = Packet::decode(
            r#"0{"sid":"abc","upgrades":[],"pingInterval":25000,"pingTimeout":20000,"maxPayload":1000000}"#,
        )
        .unwrap();
        assert_eq!(
            packet,
            Packet::Open(Handshake {
                sid: "abc".into(),
                ping_interval: 25000,
                ping_timeout: 20000,
            })
        );
    }

    #[test]
    fn decodes_engine_control_packets() {
        assert_eq!(Packet::decode("1").unwrap(), Packet::Close);
        assert_eq!(Packet::decode("2").unwrap(), Packet::Ping(String::new()));
        assert_eq!(Packet::decode("2hello").unwrap(), Packet::Ping("hello".into()));
        assert_eq!(Packet::decode("6").unwrap(), Packet::Noop);
    }

    #[test]
    fn ping_answer_echoes_payload() {
        let Packet::Ping(payload) = Packet::decode("2hello").unwrap() else {
            panic!("expected ping");
        };
        assert_eq!(Packet::Pong(payload).encode(), "3hello");
        assert_eq!(Packet::Pong(String::new()).encode(), "3");
    }

    #[test]
    fn decodes_namespace_connect_with_and_without_payload() {
        assert_eq!(Packet::decode("40").unwrap(), Packet::Connect);
        assert_eq!(Packet::decode(r#"40{"sid":"x"}"#).unwrap(), Packet::Connect);
        assert_eq!(Packet::decode("41").unwrap(), Packet::Disconnect);
    }

    #[test]
    fn decodes_connect_error_message() {
        assert_eq!(
            Packet::decode(r#"44{"message":"unauthorized"}"#).unwrap(),
            Packet::ConnectError("unauthorized".into())
        );
    }

    #[test]
    fn decodes_events_with_namespace_and_ack_id() {
        let expected = Packet::Event {
            name: "update_recents".into(),
            data: Value::Null,
        };
        assert_eq!(Packet::decode(r#"42["update_recents"]"#).unwrap(), expected);
        assert_eq!(Packet::decode(r#"42/chat,["update_recents"]"#).unwrap(), expected);
        assert_eq!(Packet::decode(r#"4217["update_recents"]"#).unwrap(), expected);
    }

    #[test]
    fn rejects_malformed_frames() {
        assert_eq!(Packet::decode(""), Err(ProtocolError::Empty));
        assert_eq!(Packet::decode("9"), Err(ProtocolError::UnknownEnginePacket('9')));
        assert_eq!(Packet::decode("47"), Err(ProtocolError::UnknownSocketPacket('7')));
        assert!(matches!(Packet::decode("42{}"), Err(ProtocolError::Malformed(_))));
        assert!(matches!(Packet::decode("42[]"), Err(ProtocolError::Malformed(_))));
        assert!(matches!(Packet::decode("42[1]"), Err(ProtocolError::Malformed(_))));
    }

    #[test]
    fn encodes_join() {
        let packet = ClientEvent::Join {
            room: RoomId::between(UserId(9), UserId(5)),
        }
        .into_packet()
        .unwrap();
        assert_eq!(packet.encode(), r#"42["join",{"room":"chat_5_9"}]"#);
    }

    #[test]
    fn encodes_send_message_with_integer_ids() {
        let packet = ClientEvent::SendMessage(LiveMessage {
            sender: UserId(5),
            receiver: UserId(9),
            message: "hi".into(),
        })
        .into_packet()
        .unwrap();
        assert_eq!(
            packet.encode(),
            r#"42["send_message",{"message":"hi","receiver":9,"sender":5}]"#
        );
    }

    #[test]
    fn parses_receive_message_event() {
        let Packet::Event { name, data } =
            Packet::decode(r#"42["receive_message",{"sender":"9","receiver":5,"message":"yo"}]"#)
                .unwrap()
        else {
            panic!("expected event");
        };
        assert_eq!(
            ServerEvent::from_event(&name, data).unwrap(),
            ServerEvent::ReceiveMessage(LiveMessage {
                sender: UserId(9),
                receiver: UserId(5),
                message: "yo".into(),
            })
        );
    }

    #[test]
    fn unknown_events_are_named() {
        assert_eq!(
            ServerEvent::from_event("typing", Value::Null).unwrap(),
            ServerEvent::Unknown("typing".into())
        );
        assert!(ServerEvent::from_event("receive_message", Value::Null).is_err());
    }
}
