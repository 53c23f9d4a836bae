use crate::codec::{encode, Frame, DEFAULT_MAX_FRAME_BYTES};
use crate::error::{FrameError, Result};

/// UTF-8 can expand a character to at most this many bytes; the initial
/// chunk-length estimate divides by it so the first candidate usually fits.
const MAX_BYTES_PER_CHAR: usize = 4;

/// Splitter configuration.
#[derive(Debug, Clone)]
pub struct SplitConfig {
    /// Hard ceiling on one encoded frame, in bytes.
    pub max_frame_bytes: usize,
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self {
            max_frame_bytes: DEFAULT_MAX_FRAME_BYTES,
        }
    }
}

/// Split chat text into an ordered sequence of chunk frames, each of which
/// encodes to at most `config.max_frame_bytes` bytes.
///
/// Slicing is by character, never by raw byte offset, so a multi-byte
/// character is never divided between two chunks. A message that fits in a
/// single frame is still emitted as one chunk (`idx: 0, fin: true`) so the
/// receive path is uniform.
pub fn split_chat(message_id: &str, text: &str, config: &SplitConfig) -> Result<Vec<Frame>> {
    if text.is_empty() {
        return Err(FrameError::EmptyContent);
    }

    let chars: Vec<char> = text.chars().collect();
    let estimate = initial_estimate(message_id, config)?;

    let mut frames = Vec::new();
    let mut pos = 0usize;
    let mut index = 0u32;

    while pos < chars.len() {
        let remaining = chars.len() - pos;
        let mut take = estimate.min(remaining);

        loop {
            let candidate: String = chars[pos..pos + take].iter().collect();
            let is_final = pos + take == chars.len();
            let frame = Frame::chat_chunk(message_id, index, is_final, &candidate);
            let encoded_len = encode(&frame)?.len();

            if encoded_len <= config.max_frame_bytes {
                frames.push(frame);
                break;
            }
            if take == 1 {
                return Err(FrameError::ChunkTooLarge {
                    limit: config.max_frame_bytes,
                });
            }
            take = take.div_ceil(2);
        }

        pos += take;
        index += 1;
    }

    Ok(frames)
}

/// Conservative first guess at a chunk length in characters: frame overhead
/// for this message id subtracted from the ceiling, divided by the UTF-8
/// worst case, floored at one character.
fn initial_estimate(message_id: &str, config: &SplitConfig) -> Result<usize> {
    let probe = Frame::chat_chunk(message_id, 0, false, "");
    let overhead = encode(&probe)?.len();
    let budget = config.max_frame_bytes.saturating_sub(overhead);
    Ok((budget / MAX_BYTES_PER_CHAR).max(1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{decode, FrameBody};

    fn chunk_text(frame: &Frame) -> &str {
        match &frame.body {
            FrameBody::Chat(p) => &p.text,
            _ => panic!("splitter must emit chat frames"),
        }
    }

    fn concat(frames: &[Frame]) -> String {
        frames.iter().map(chunk_text).collect()
    }

    #[test]
    fn empty_input_is_an_error() {
        let err = split_chat("m", "", &SplitConfig::default()).unwrap_err();
        assert!(matches!(err, FrameError::EmptyContent));
    }

    #[test]
    fn short_message_is_a_single_final_chunk() {
        let frames = split_chat("m", "hello", &SplitConfig::default()).unwrap();
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].chunk_index, Some(0));
        assert_eq!(frames[0].is_final, Some(true));
        assert_eq!(chunk_text(&frames[0]), "hello");
    }

    #[test]
    fn ascii_4000_splits_and_reconstructs() {
        let text = "a".repeat(4000);
        let config = SplitConfig::default();
        let frames = split_chat("m", &text, &config).unwrap();

        assert!(frames.len() > 1);
        for frame in &frames {
            let bytes = encode(frame).unwrap();
            assert!(bytes.len() <= config.max_frame_bytes);
            let decoded = decode(&bytes).unwrap();
            assert_eq!(&decoded, frame);
        }
        assert_eq!(concat(&frames), text);
    }

    #[test]
    fn indices_are_sequential_and_only_last_is_final() {
        let text = "x".repeat(3000);
        let frames = split_chat("m", &text, &SplitConfig::default()).unwrap();

        for (i, frame) in frames.iter().enumerate() {
            assert_eq!(frame.chunk_index, Some(i as u32));
            assert_eq!(frame.is_final, Some(i == frames.len() - 1));
        }
    }

    #[test]
    fn multibyte_characters_never_split() {
        // Mixed-width input: CJK (3 bytes), emoji (4 bytes), ASCII.
        let unit = "智能助手🤖ai试験テスト";
        let text = unit.repeat(120);
        let config = SplitConfig::default();
        let frames = split_chat("m", &text, &config).unwrap();

        assert!(frames.len() > 1);
        for frame in &frames {
            assert!(encode(frame).unwrap().len() <= config.max_frame_bytes);
            // Valid &str per chunk means no character was bisected.
            assert!(!chunk_text(frame).is_empty());
        }
        assert_eq!(concat(&frames), text);
    }

    #[test]
    fn tight_ceiling_still_splits() {
        let probe = Frame::chat_chunk("m", 0, false, "");
        let overhead = encode(&probe).unwrap().len();
        let config = SplitConfig {
            max_frame_bytes: overhead + 8,
        };

        let frames = split_chat("m", "abcdefghij", &config).unwrap();
        assert!(frames.len() > 1);
        for frame in &frames {
            assert!(encode(frame).unwrap().len() <= config.max_frame_bytes);
        }
        assert_eq!(concat(&frames), "abcdefghij");
    }

    #[test]
    fn unencodable_character_under_ceiling_is_rejected() {
        let probe = Frame::chat_chunk("m", 0, false, "");
        let overhead = encode(&probe).unwrap().len();
        // An emoji escapes to 4 raw bytes; leave room for fewer.
        let config = SplitConfig {
            max_frame_bytes: overhead + 1,
        };

        let err = split_chat("m", "🤖🤖", &config).unwrap_err();
        assert!(matches!(err, FrameError::ChunkTooLarge { .. }));
    }

    #[test]
    fn long_message_id_shrinks_chunks_but_still_fits() {
        let mid = "m".repeat(200);
        let text = "y".repeat(2000);
        let config = SplitConfig::default();
        let frames = split_chat(&mid, &text, &config).unwrap();

        for frame in &frames {
            assert!(encode(frame).unwrap().len() <= config.max_frame_bytes);
            assert_eq!(frame.message_id, mid);
        }
        assert_eq!(concat(&frames), text);
    }
}
