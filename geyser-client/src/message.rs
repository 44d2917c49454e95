//! Chat messages delivered by [`crate::ChatSession::poll`].
//!
//! Every entry in a poll batch is decoded twice: first for its type tag
//! alone, then into the [`MessageHeader`] and body of the variant that tag
//! selects. Entries with a tag not listed in [`Message`] become
//! [`UnknownMessage`]s, with a best-effort header, instead of failing the batch.

use geyser_ids::SteamId;
use serde::Deserialize;
use serde_json::value::RawValue;

use crate::errors::InvocationError;

// ─── MessageHeader ────────────────────────────────────────────────────────────

/// Fields every chat message carries.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct MessageHeader {
    /// Type tag as sent by the server, e.g. `"saytext"`.
    #[serde(rename = "type")]
    pub kind:           String,
    /// Server timestamp (milliseconds since the chat session started).
    #[serde(default)]
    pub timestamp:      u64,
    #[serde(default)]
    pub utc_timestamp:  u64,
    /// Sender's 32-bit account number.
    #[serde(default)]
    pub accountid_from: u32,
}

impl MessageHeader {
    /// The sender as an individual-account [`SteamId`].
    pub fn sender(&self) -> SteamId {
        SteamId::user(self.accountid_from)
    }
}

// ─── Variants ─────────────────────────────────────────────────────────────────

/// A chat line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TextMessage {
    pub header: MessageHeader,
    pub text:   String,
    /// `true` for `my_saytext`: a line this account sent, echoed back.
    pub echo:   bool,
}

/// A friend's name or online state changed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PersonaStateMessage {
    pub header:        MessageHeader,
    pub persona_name:  Option<String>,
    pub persona_state: Option<u32>,
}

/// A decoded chat message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Message {
    /// `saytext` / `my_saytext`
    Text(TextMessage),
    /// `typing`
    Typing(MessageHeader),
    /// `personastate`
    PersonaState(PersonaStateMessage),
    /// `leftconversation`
    LeftConversation(MessageHeader),
}

impl Message {
    pub fn header(&self) -> &MessageHeader {
        match self {
            Self::Text(m)             => &m.header,
            Self::Typing(h)           => h,
            Self::PersonaState(m)     => &m.header,
            Self::LeftConversation(h) => h,
        }
    }

    pub fn timestamp(&self) -> u64 { self.header().timestamp }

    pub fn sender(&self) -> SteamId { self.header().sender() }

    /// The text of a chat line, `None` for every other variant.
    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Text(m) => Some(&m.text),
            _             => None,
        }
    }
}

/// An entry whose type tag this client does not understand.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnknownMessage {
    pub header: MessageHeader,
    /// The entry's JSON exactly as received.
    pub raw:    String,
}

/// Result of one poll: decoded messages plus entries that could not be typed.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PollBatch {
    pub messages: Vec<Message>,
    pub unknown:  Vec<UnknownMessage>,
}

impl PollBatch {
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty() && self.unknown.is_empty()
    }
}

// ─── Decoding ─────────────────────────────────────────────────────────────────

/// First pass: only the type tag, so an unrecognised entry can never fail
/// on the shape of its other fields.
#[derive(Deserialize)]
struct Tag {
    #[serde(rename = "type")]
    kind: String,
}

#[derive(Deserialize)]
struct TextBody {
    /// The server sends `null` for an empty line.
    #[serde(default)]
    text: Option<String>,
}

#[derive(Deserialize)]
struct PersonaStateBody {
    #[serde(default)]
    persona_name:  Option<String>,
    #[serde(default)]
    persona_state: Option<u32>,
}

pub(crate) enum Decoded {
    Known(Message),
    Unknown(UnknownMessage),
}

/// Decode one raw poll entry.
pub(crate) fn decode(raw: &RawValue) -> Result<Decoded, InvocationError> {
    let Tag { kind } = serde_json::from_str(raw.get())?;
    let header = || serde_json::from_str::<MessageHeader>(raw.get());

    let msg = match kind.as_str() {
        "saytext" | "my_saytext" => {
            let body: TextBody = serde_json::from_str(raw.get())?;
            Message::Text(TextMessage {
                header: header()?,
                text:   body.text.unwrap_or_default(),
                echo:   kind == "my_saytext",
            })
        }
        "typing"           => Message::Typing(header()?),
        "leftconversation" => Message::LeftConversation(header()?),
        "personastate" => {
            let body: PersonaStateBody = serde_json::from_str(raw.get())?;
            Message::PersonaState(PersonaStateMessage {
                header:        header()?,
                persona_name:  body.persona_name,
                persona_state: body.persona_state,
            })
        }
        _ => {
            let header = lenient_header(kind, raw);
            return Ok(Decoded::Unknown(UnknownMessage { header, raw: raw.get().to_string() }));
        }
    };
    Ok(Decoded::Known(msg))
}

/// Header of an unrecognised entry; any field of an unexpected shape reads as 0.
fn lenient_header(kind: String, raw: &RawValue) -> MessageHeader {
    let value: serde_json::Value = serde_json::from_str(raw.get()).unwrap_or_default();
    let num = |key: &str| value.get(key).and_then(serde_json::Value::as_u64).unwrap_or(0);
    MessageHeader {
        kind,
        timestamp:      num("timestamp"),
        utc_timestamp:  num("utc_timestamp"),
        accountid_from: u32::try_from(num("accountid_from")).unwrap_or(0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(s: &str) -> Box<RawValue> { RawValue::from_string(s.to_string()).unwrap() }

    #[test]
    fn saytext_and_echo() {
        let Decoded::Known(m) = decode(&raw(
            r#"{"type":"my_saytext","timestamp":5,"utc_timestamp":1700000000,"accountid_from":22202,"text":"hi"}"#,
        )).unwrap() else { panic!("expected a known message") };

        let Message::Text(t) = &m else { panic!("expected text") };
        assert!(t.echo);
        assert_eq!(t.text, "hi");
        assert_eq!(m.sender(), SteamId::user(22202));
        assert_eq!(m.timestamp(), 5);
    }

    #[test]
    fn personastate_fields() {
        let Decoded::Known(Message::PersonaState(p)) = decode(&raw(
            r#"{"type":"personastate","accountid_from":1,"persona_name":"gaben","persona_state":1}"#,
        )).unwrap() else { panic!("expected personastate") };
        assert_eq!(p.persona_name.as_deref(), Some("gaben"));
        assert_eq!(p.persona_state, Some(1));
    }

    #[test]
    fn typing_and_left() {
        assert!(matches!(
            decode(&raw(r#"{"type":"typing","accountid_from":3}"#)).unwrap(),
            Decoded::Known(Message::Typing(h)) if h.accountid_from == 3
        ));
        assert!(matches!(
            decode(&raw(r#"{"type":"leftconversation","accountid_from":3}"#)).unwrap(),
            Decoded::Known(Message::LeftConversation(_))
        ));
    }

    #[test]
    fn unknown_tag_keeps_raw_entry() {
        let entry = r#"{"type":"frobnicate","accountid_from":9,"x":[1,2]}"#;
        let Decoded::Unknown(u) = decode(&raw(entry)).unwrap() else { panic!("expected unknown") };
        assert_eq!(u.header.kind, "frobnicate");
        assert_eq!(u.raw, entry);
    }

    #[test]
    fn unknown_tag_with_odd_fields_is_still_unknown() {
        let entry = r#"{"type":"frobnicate","accountid_from":"not-a-number","timestamp":null,"utc_timestamp":7}"#;
        let Decoded::Unknown(u) = decode(&raw(entry)).unwrap() else { panic!("expected unknown") };
        assert_eq!(u.header.kind, "frobnicate");
        assert_eq!(u.header.accountid_from, 0);
        assert_eq!(u.header.timestamp, 0);
        assert_eq!(u.header.utc_timestamp, 7);
        assert_eq!(u.raw, entry);
    }

    #[test]
    fn null_text_reads_as_empty() {
        let Decoded::Known(Message::Text(t)) = decode(&raw(
            r#"{"type":"saytext","accountid_from":1,"text":null}"#,
        )).unwrap() else { panic!("expected text") };
        assert_eq!(t.text, "");
    }

    #[test]
    fn known_tag_keeps_strict_header() {
        assert!(decode(&raw(r#"{"type":"typing","accountid_from":"x"}"#)).is_err());
    }

    #[test]
    fn missing_type_tag_is_an_error() {
        assert!(decode(&raw(r#"{"accountid_from":9}"#)).is_err());
    }
}
