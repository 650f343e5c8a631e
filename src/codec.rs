//! Binary-to-text transport codec for audio payloads.
//!
//! The message field only carries text, so recorded audio travels as a
//! `data:<mime>;base64,<payload>` data URL. Encoding never loses a byte and
//! the output length is fully determined by the input length.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

use crate::errors::ComposerError;

/// MIME type used when encoding a finished capture.
pub const RECORD_MIME: &str = "audio/ogg; codecs=opus";

/// MIME type every decoded clip is tagged with.
///
/// Decode deliberately ignores the MIME prefix of the transport text and
/// reconstructs the clip with this fixed audio type. Only audio is ever
/// composed, so the reinterpretation is an explicit design choice here, not a
/// lossy accident. Revisit before any non-audio payload is allowed in.
pub const PLAYBACK_MIME: &str = "audio/ogg; codecs=opus";

/// A decoded binary audio payload ready for playback.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AudioClip {
    pub data: Vec<u8>,
    pub mime_type: String,
}

/// Encode a binary payload into transport text.
pub fn encode(payload: &[u8], mime_type: &str) -> String {
    format!("data:{};base64,{}", mime_type, STANDARD.encode(payload))
}

/// Number of characters `encode` produces for a payload of `byte_len` bytes.
pub fn encoded_len(byte_len: usize, mime_type: &str) -> usize {
    // "data:" + mime + ";base64," + padded base64 body
    5 + mime_type.len() + 8 + byte_len.div_ceil(3) * 4
}

/// Decode transport text back into the original binary payload.
///
/// The text must contain a `,` separating the metadata prefix from the base64
/// body; the split happens on the first occurrence. Malformed input (missing
/// separator, invalid base64 alphabet) is a [`ComposerError::CodecError`].
pub fn decode(transport_text: &str) -> Result<AudioClip, ComposerError> {
    let (_, body) = transport_text.split_once(',').ok_or_else(|| {
        ComposerError::CodecError("transport text has no comma separator".to_string())
    })?;

    let data = STANDARD
        .decode(body)
        .map_err(|e| ComposerError::CodecError(format!("invalid base64 payload: {}", e)))?;

    Ok(AudioClip {
        data,
        mime_type: PLAYBACK_MIME.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_shape() {
        let text = encode(b"abc", RECORD_MIME);
        assert!(text.starts_with("data:audio/ogg; codecs=opus;base64,"));
        assert_eq!(text.len(), encoded_len(3, RECORD_MIME));
    }

    #[test]
    fn test_round_trip_is_byte_exact() {
        let payload: Vec<u8> = (0u8..=255).collect();
        let clip = decode(&encode(&payload, RECORD_MIME)).unwrap();
        assert_eq!(clip.data, payload);
    }

    #[test]
    fn test_empty_payload_round_trips() {
        let clip = decode(&encode(&[], RECORD_MIME)).unwrap();
        assert!(clip.data.is_empty());
    }

    #[test]
    fn test_decode_splits_on_first_comma_only() {
        // base64 never contains a comma, so the body is everything after the
        // first one even when the prefix looks unusual
        let text = encode(b"payload", "audio/weird");
        let clip = decode(&text).unwrap();
        assert_eq!(clip.data, b"payload");
    }

    #[test]
    fn test_decode_uses_fixed_playback_mime() {
        let text = encode(b"payload", "video/mp4");
        let clip = decode(&text).unwrap();
        assert_eq!(clip.mime_type, PLAYBACK_MIME);
    }

    #[test]
    fn test_decode_rejects_missing_separator() {
        let err = decode("data:audio/ogg;base64").unwrap_err();
        assert!(err.to_string().contains("no comma separator"));
    }

    #[test]
    fn test_decode_rejects_invalid_alphabet() {
        let err = decode("data:audio/ogg;base64,!!!not-base64!!!").unwrap_err();
        assert!(err.to_string().contains("invalid base64"));
    }
}
