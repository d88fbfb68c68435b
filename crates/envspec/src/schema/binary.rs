use crate::error::ConfigError;
use crate::literal::Literal;
use crate::schema::Value;
use crate::schema::error::SchemaError;
use crate::schema::marshal::Marshaler;
use crate::schema::string::{check_length, finalize_lengths, length_summary};
use base64::Engine;
use base64::engine::general_purpose::{STANDARD, STANDARD_NO_PAD, URL_SAFE, URL_SAFE_NO_PAD};
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

/// Wire encoding of a binary value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, strum_macros::Display)]
pub enum BinaryEncoding {
    /// RFC 4648 base64 with padding.
    #[default]
    #[strum(serialize = "base64")]
    Base64,
    /// RFC 4648 base64 without padding.
    #[strum(serialize = "unpadded base64")]
    Base64NoPad,
    /// RFC 4648 URL-safe base64 with padding.
    #[strum(serialize = "base64url")]
    Base64Url,
    /// RFC 4648 URL-safe base64 without padding.
    #[strum(serialize = "unpadded base64url")]
    Base64UrlNoPad,
    /// Lowercase hexadecimal; decoding is case-insensitive.
    #[strum(serialize = "hex")]
    Hex,
}

impl BinaryEncoding {
    #[must_use]
    pub fn encode(self, bytes: &[u8]) -> String {
        match self {
            Self::Base64 => STANDARD.encode(bytes),
            Self::Base64NoPad => STANDARD_NO_PAD.encode(bytes),
            Self::Base64Url => URL_SAFE.encode(bytes),
            Self::Base64UrlNoPad => URL_SAFE_NO_PAD.encode(bytes),
            Self::Hex => hex::encode(bytes),
        }
    }

    /// Decodes `encoded` into raw bytes.
    ///
    /// # Errors
    /// Returns [`SchemaError::Unmarshal`] naming the encoding when `encoded` is malformed.
    pub fn decode(self, encoded: &str) -> Result<Vec<u8>, SchemaError> {
        let decoded = match self {
            Self::Base64 => STANDARD.decode(encoded).map_err(|e| e.to_string()),
            Self::Base64NoPad => STANDARD_NO_PAD.decode(encoded).map_err(|e| e.to_string()),
            Self::Base64Url => URL_SAFE.decode(encoded).map_err(|e| e.to_string()),
            Self::Base64UrlNoPad => URL_SAFE_NO_PAD.decode(encoded).map_err(|e| e.to_string()),
            Self::Hex => hex::decode(encoded).map_err(|e| e.to_string()),
        };
        decoded.map_err(|e| SchemaError::unmarshal(format!("must be {} encoded: {e}", self.article())))
    }

    pub(crate) const fn article(self) -> &'static str {
        match self {
            Self::Base64 => "base64",
            Self::Base64NoPad => "unpadded base64",
            Self::Base64Url => "base64url",
            Self::Base64UrlNoPad => "unpadded base64url",
            Self::Hex => "hex",
        }
    }
}

struct BytesMarshaler<T> {
    encoding: BinaryEncoding,
    _native: PhantomData<fn() -> T>,
}

impl<T: AsRef<[u8]> + From<Vec<u8>>> Marshaler<T> for BytesMarshaler<T> {
    fn marshal(&self, value: &T) -> Result<Literal, SchemaError> {
        Ok(Literal::new(self.encoding.encode(value.as_ref())))
    }

    fn unmarshal(&self, literal: &Literal) -> Result<T, SchemaError> {
        self.encoding.decode(literal.verbatim()).map(T::from)
    }
}

/// Schema for binary values transported as encoded text.
///
/// Length limits apply to the decoded bytes.
pub struct BinarySchema<T> {
    encoding: BinaryEncoding,
    min_len: Option<usize>,
    max_len: Option<usize>,
    byte_len: fn(&T) -> usize,
    marshaler: Arc<dyn Marshaler<T>>,
}

impl<T: Value + AsRef<[u8]> + From<Vec<u8>>> BinarySchema<T> {
    #[must_use]
    pub fn new(encoding: BinaryEncoding) -> Self {
        Self {
            encoding,
            min_len: None,
            max_len: None,
            byte_len: |value| value.as_ref().len(),
            marshaler: Arc::new(BytesMarshaler { encoding, _native: PhantomData }),
        }
    }
}

impl<T: Value> BinarySchema<T> {
    #[must_use]
    pub const fn min_len(mut self, min: usize) -> Self {
        self.min_len = Some(min);
        self
    }

    #[must_use]
    pub const fn max_len(mut self, max: usize) -> Self {
        self.max_len = Some(max);
        self
    }

    #[must_use]
    pub const fn encoding(&self) -> BinaryEncoding {
        self.encoding
    }

    #[must_use]
    pub const fn limits(&self) -> (Option<usize>, Option<usize>) {
        (self.min_len, self.max_len)
    }

    pub(crate) fn finalize(&self) -> Result<(), ConfigError> {
        finalize_lengths(self.min_len, self.max_len)
    }

    pub(crate) fn validate(&self, value: &T) -> Result<(), SchemaError> {
        check_length((self.byte_len)(value), self.min_len, self.max_len)
    }

    pub(crate) fn marshal(&self, value: &T) -> Result<Literal, SchemaError> {
        self.marshaler.marshal(value)
    }

    pub(crate) fn unmarshal(&self, literal: &Literal) -> Result<T, SchemaError> {
        let value = self.marshaler.unmarshal(literal)?;
        self.validate(&value)?;
        Ok(value)
    }

    /// An ascending byte sequence of the smallest permitted length.
    pub(crate) fn examples(&self, _conservative: bool) -> Vec<T> {
        let len = self.min_len.unwrap_or(16).min(self.max_len.unwrap_or(usize::MAX));
        #[allow(clippy::cast_possible_truncation)]
        let bytes: Vec<u8> = (0..len).map(|i| (i % 256) as u8).collect();
        let literal = Literal::new(self.encoding.encode(&bytes));
        self.unmarshal(&literal).into_iter().collect()
    }

    pub(crate) fn summary(&self) -> String {
        length_summary(&format!("{} data", self.encoding), self.min_len, self.max_len)
    }
}

impl<T> Clone for BinarySchema<T> {
    fn clone(&self) -> Self {
        Self {
            encoding: self.encoding,
            min_len: self.min_len,
            max_len: self.max_len,
            byte_len: self.byte_len,
            marshaler: Arc::clone(&self.marshaler),
        }
    }
}

impl<T> fmt::Debug for BinarySchema<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BinarySchema")
            .field("encoding", &self.encoding)
            .field("min_len", &self.min_len)
            .field("max_len", &self.max_len)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::error::LengthBound;

    #[test]
    fn decoded_length_is_checked() {
        let schema = BinarySchema::<Vec<u8>>::new(BinaryEncoding::Base64).min_len(5);
        let short = Literal::new(BinaryEncoding::Base64.encode(b"abc"));

        let err = schema.unmarshal(&short).unwrap_err();
        assert_eq!(err, SchemaError::Length { bound: LengthBound::Under, limit: 5, actual: 3 });
    }

    #[test]
    fn malformed_input_names_the_encoding() {
        let schema = BinarySchema::<Vec<u8>>::new(BinaryEncoding::Hex);
        let err = schema.unmarshal(&Literal::new("zz")).unwrap_err();
        assert!(err.to_string().starts_with("must be hex encoded"));
    }

    #[test]
    fn hex_is_case_insensitive_but_canonical_lowercase() {
        let schema = BinarySchema::<Vec<u8>>::new(BinaryEncoding::Hex);
        let value = schema.unmarshal(&Literal::new("DEADBEEF")).unwrap();
        assert_eq!(value, vec![0xde, 0xad, 0xbe, 0xef]);
        assert_eq!(schema.marshal(&value).unwrap().canonical(), "deadbeef");
    }

    #[test]
    fn every_encoding_roundtrips() {
        let data = b"\x00\xffenvspec?>".to_vec();
        for encoding in [
            BinaryEncoding::Base64,
            BinaryEncoding::Base64NoPad,
            BinaryEncoding::Base64Url,
            BinaryEncoding::Base64UrlNoPad,
            BinaryEncoding::Hex,
        ] {
            let schema = BinarySchema::<Vec<u8>>::new(encoding);
            let literal = schema.marshal(&data).unwrap();
            assert_eq!(schema.unmarshal(&literal).unwrap(), data, "{encoding}");
        }
    }

    #[test]
    fn examples_have_minimum_length() {
        let schema = BinarySchema::<Vec<u8>>::new(BinaryEncoding::Hex).min_len(4);
        assert_eq!(schema.examples(true), vec![vec![0, 1, 2, 3]]);
    }
}
