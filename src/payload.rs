//! Payload composition: filler followed by the password.
//!
//! ```text
//! text mode:  [filler: offset chars][password]                    UTF-8
//! byte mode:  [u32 BE][u32 BE]...   one record per character of the same sequence
//! ```
//!
//! The filler's content carries no information, only its length matters.
//! A "unit" is one character in text mode and one record in byte mode.

use rand::Rng;
use zeroize::Zeroize;

use crate::alphabet::Alphabet;
use crate::crypto::Password;

/// Size of one byte-mode record
pub const RECORD_SIZE: usize = 4;

/// Error types for payload composition
#[derive(Debug, thiserror::Error)]
pub enum PayloadError {
    #[error("Filler of {0} units does not fit in memory")]
    FillerTooLarge(u64),
}

/// How a payload is serialized on disk
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Encoding {
    /// UTF-8 text
    #[default]
    Text,
    /// Packed big-endian 32-bit records
    Bytes,
}

impl Encoding {
    /// File extension used for cards in this encoding
    #[must_use]
    pub fn extension(self) -> &'static str {
        match self {
            Self::Text => "pad",
            Self::Bytes => "enc",
        }
    }

    /// Name of the stored file for `label`
    #[must_use]
    pub fn file_name(self, label: &str) -> String {
        format!("{}.{}", label, self.extension())
    }
}

/// Random filler of `len` characters drawn from `alphabet`
pub fn generate_filler<R: Rng + ?Sized>(rng: &mut R, alphabet: &Alphabet, len: usize) -> String {
    (0..len).map(|_| alphabet.random_any(rng)).collect()
}

/// Pack every character as a 4-byte big-endian record
#[must_use]
pub fn encode_records(text: &str) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(text.chars().count() * RECORD_SIZE);
    for c in text.chars() {
        bytes.extend_from_slice(&u32::from(c).to_be_bytes());
    }
    bytes
}

/// Unpack records. A trailing partial record is ignored, values that are
/// not Unicode scalar values become U+FFFD.
#[must_use]
pub fn decode_records(bytes: &[u8]) -> Vec<char> {
    bytes
        .chunks_exact(RECORD_SIZE)
        .map(|r| u32::from_be_bytes([r[0], r[1], r[2], r[3]]))
        .map(|code| char::from_u32(code).unwrap_or(char::REPLACEMENT_CHARACTER))
        .collect()
}

/// Split a stored payload into units
#[must_use]
pub fn decode_units(payload: &[u8], encoding: Encoding) -> Vec<char> {
    match encoding {
        Encoding::Text => String::from_utf8_lossy(payload).chars().collect(),
        Encoding::Bytes => decode_records(payload),
    }
}

/// Emits `filler ++ password` in the requested encoding
pub struct PayloadComposer<'a> {
    alphabet: &'a Alphabet,
}

impl<'a> PayloadComposer<'a> {
    #[must_use]
    pub fn new(alphabet: &'a Alphabet) -> Self {
        Self { alphabet }
    }

    /// Compose the stored payload.
    ///
    /// Without padding the payload is the bare password; recovery still
    /// slices at `offset`, so padding must match between both paths.
    pub fn compose<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        offset: u64,
        password: &Password,
        pad: bool,
        encoding: Encoding,
    ) -> Result<Vec<u8>, PayloadError> {
        let mut text = if pad {
            let len = usize::try_from(offset).map_err(|_| PayloadError::FillerTooLarge(offset))?;
            generate_filler(rng, self.alphabet, len)
        } else {
            String::new()
        };
        text.push_str(password.as_str());

        let payload = match encoding {
            Encoding::Text => text.as_bytes().to_vec(),
            Encoding::Bytes => encode_records(&text),
        };
        text.zeroize();
        Ok(payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn compose(offset: u64, password: &str, pad: bool, encoding: Encoding) -> Vec<u8> {
        let alphabet = Alphabet::default();
        PayloadComposer::new(&alphabet)
            .compose(
                &mut StdRng::seed_from_u64(9),
                offset,
                &Password::new(password.to_string()),
                pad,
                encoding,
            )
            .unwrap()
    }

    #[test]
    fn test_padded_text_has_filler_then_password() {
        let payload = String::from_utf8(compose(1, "Pa$$", true, Encoding::Text)).unwrap();
        assert_eq!(payload.chars().count(), 5);
        assert!(payload.ends_with("Pa$$"));
        assert!(payload.chars().next().is_some_and(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn test_unpadded_is_bare_password() {
        assert_eq!(compose(500, "Pa$$", false, Encoding::Text), b"Pa$$");
    }

    #[test]
    fn test_zero_offset_starts_with_password() {
        assert_eq!(compose(0, "Pa$$", true, Encoding::Text), b"Pa$$");
    }

    #[test]
    fn test_filler_length_matches_offset() {
        let payload = compose(300, "x", true, Encoding::Text);
        assert_eq!(payload.len(), 301);
    }

    #[test]
    fn test_byte_mode_packs_big_endian_records() {
        let payload = compose(0, "Pa", true, Encoding::Bytes);
        assert_eq!(hex::encode(&payload), "0000005000000061");
    }

    #[test]
    fn test_byte_mode_is_same_sequence_as_text() {
        let text = compose(3, "Pa$$", true, Encoding::Text);
        let bytes = compose(3, "Pa$$", true, Encoding::Bytes);
        let from_text: Vec<char> = String::from_utf8(text).unwrap().chars().collect();
        assert_eq!(decode_records(&bytes), from_text);
        assert_eq!(bytes.len(), 7 * RECORD_SIZE);
    }

    #[test]
    fn test_records_handle_non_ascii() {
        let bytes = encode_records("€");
        assert_eq!(hex::encode(&bytes), "000020ac");
        assert_eq!(decode_records(&bytes), vec!['€']);
    }

    #[test]
    fn test_trailing_partial_record_ignored() {
        let mut bytes = encode_records("ab");
        bytes.extend_from_slice(&[0, 0]);
        assert_eq!(decode_records(&bytes), vec!['a', 'b']);
    }

    #[test]
    fn test_invalid_code_point_replaced() {
        let bytes = hex::decode("0000d800").unwrap();
        assert_eq!(decode_records(&bytes), vec![char::REPLACEMENT_CHARACTER]);
    }

    #[test]
    fn test_file_names_per_encoding() {
        assert_eq!(Encoding::Text.file_name("mail"), "mail.pad");
        assert_eq!(Encoding::Bytes.file_name("mail"), "mail.enc");
    }
}
