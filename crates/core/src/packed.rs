//! Length-prefixed packed buffers
//!
//! Catalog stores hand out their type directory and their per-type uid lists
//! as packed byte sequences. [`PackedBuffer`] is the forward-only reading
//! cursor, [`PackedWriter`] builds the bytes.
//!
//! ## Layout
//!
//! ```text
//! string: [length: u32 LE][utf-8 bytes]
//! bytes:  [length: u32 LE][raw bytes]
//! uid:    [16 raw bytes]
//! ```
//!
//! Values carry no type tags; the reader must know what comes next. A type
//! directory is a run of strings ending with the empty string, a uid list is
//! a run of uids ending with [`Uid::NULL`].

use crate::error::PackedError;
use crate::uid::{Uid, UID_SIZE};
use byteorder::{ByteOrder, LittleEndian};

const LEN_PREFIX_SIZE: usize = 4;

/// Forward-only cursor over packed bytes
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackedBuffer {
    bytes: Vec<u8>,
    position: usize,
}

impl PackedBuffer {
    /// Wrap packed bytes, positioned at the start
    pub fn new(bytes: Vec<u8>) -> Self {
        PackedBuffer { bytes, position: 0 }
    }

    /// Whether unread data remains
    pub fn has_more(&self) -> bool {
        self.position < self.bytes.len()
    }

    /// Bytes not yet consumed
    pub fn remaining(&self) -> usize {
        self.bytes.len() - self.position
    }

    /// Current read offset
    pub fn position(&self) -> usize {
        self.position
    }

    /// Read the next length-prefixed string
    pub fn next_string(&mut self) -> Result<String, PackedError> {
        let start = self.position;
        let raw = self.next_bytes()?;
        String::from_utf8(raw).map_err(|_| {
            self.position = start;
            PackedError::InvalidUtf8 { offset: start }
        })
    }

    /// Read the next length-prefixed byte run
    pub fn next_bytes(&mut self) -> Result<Vec<u8>, PackedError> {
        let start = self.position;
        let len = LittleEndian::read_u32(self.take(LEN_PREFIX_SIZE)?) as usize;
        match self.take(len) {
            Ok(raw) => Ok(raw.to_vec()),
            Err(e) => {
                self.position = start;
                Err(e)
            }
        }
    }

    /// Read the next uid
    pub fn next_uid(&mut self) -> Result<Uid, PackedError> {
        let raw = self.take(UID_SIZE)?;
        let mut bytes = [0u8; UID_SIZE];
        bytes.copy_from_slice(raw);
        Ok(Uid::from_bytes(bytes))
    }

    /// Consume `n` bytes; a short read leaves the position untouched.
    fn take(&mut self, n: usize) -> Result<&[u8], PackedError> {
        let remaining = self.remaining();
        if n > remaining {
            return Err(PackedError::Exhausted {
                offset: self.position,
                needed: n,
                remaining,
            });
        }
        let start = self.position;
        self.position += n;
        Ok(&self.bytes[start..self.position])
    }
}

/// Builder for packed bytes
#[derive(Debug, Clone, Default)]
pub struct PackedWriter {
    bytes: Vec<u8>,
}

impl PackedWriter {
    /// Create an empty writer
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a length-prefixed string
    pub fn put_string(&mut self, value: &str) -> &mut Self {
        self.put_bytes(value.as_bytes())
    }

    /// Append a length-prefixed byte run
    pub fn put_bytes(&mut self, value: &[u8]) -> &mut Self {
        let mut len = [0u8; LEN_PREFIX_SIZE];
        LittleEndian::write_u32(&mut len, value.len() as u32);
        self.bytes.extend_from_slice(&len);
        self.bytes.extend_from_slice(value);
        self
    }

    /// Append a uid
    pub fn put_uid(&mut self, uid: &Uid) -> &mut Self {
        self.bytes.extend_from_slice(uid.as_bytes());
        self
    }

    /// Bytes written so far
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Finish writing and return the raw bytes
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    /// Finish writing and return a reading cursor over the bytes
    pub fn into_buffer(self) -> PackedBuffer {
        PackedBuffer::new(self.bytes)
    }

    /// Build a type directory: the names followed by the `""` terminator
    pub fn type_directory<'a>(names: impl IntoIterator<Item = &'a str>) -> PackedBuffer {
        let mut writer = PackedWriter::new();
        for name in names {
            writer.put_string(name);
        }
        writer.put_string("");
        writer.into_buffer()
    }

    /// Build a uid list: the uids followed by the [`Uid::NULL`] terminator
    pub fn uid_list<'a>(uids: impl IntoIterator<Item = &'a Uid>) -> PackedBuffer {
        let mut writer = PackedWriter::new();
        for uid in uids {
            writer.put_uid(uid);
        }
        writer.put_uid(&Uid::NULL);
        writer.into_buffer()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strings_and_uids_in_order() {
        let uid = Uid::new();
        let mut writer = PackedWriter::new();
        writer.put_string("Alpha").put_uid(&uid).put_string("");

        let mut buffer = writer.into_buffer();
        assert!(buffer.has_more());
        assert_eq!(buffer.next_string().unwrap(), "Alpha");
        assert_eq!(buffer.next_uid().unwrap(), uid);
        assert_eq!(buffer.next_string().unwrap(), "");
        assert!(!buffer.has_more());
    }

    #[test]
    fn test_read_past_end_fails_loudly() {
        let mut buffer = PackedWriter::type_directory(["Alpha"]);
        buffer.next_string().unwrap();
        buffer.next_string().unwrap();

        let err = buffer.next_string().unwrap_err();
        assert!(matches!(err, PackedError::Exhausted { needed: 4, remaining: 0, .. }));
        assert!(matches!(
            buffer.next_uid(),
            Err(PackedError::Exhausted { needed: 16, .. })
        ));
    }

    #[test]
    fn test_truncated_string_body() {
        let mut bytes = PackedWriter::type_directory(["Alpha"]).bytes;
        bytes.truncate(6);
        let mut buffer = PackedBuffer::new(bytes);

        let err = buffer.next_string().unwrap_err();
        assert!(matches!(err, PackedError::Exhausted { offset: 4, needed: 5, remaining: 2 }));
        // A failed read does not advance the cursor
        assert_eq!(buffer.position(), 0);
    }

    #[test]
    fn test_truncated_uid() {
        let mut buffer = PackedBuffer::new(vec![1, 2, 3]);
        assert!(buffer.next_uid().is_err());
        assert_eq!(buffer.remaining(), 3);
    }

    #[test]
    fn test_invalid_utf8() {
        let mut bytes = vec![2, 0, 0, 0];
        bytes.extend_from_slice(&[0xC3, 0x28]);
        let mut buffer = PackedBuffer::new(bytes);
        assert_eq!(
            buffer.next_string().unwrap_err(),
            PackedError::InvalidUtf8 { offset: 0 }
        );
    }

    #[test]
    fn test_uid_list_ends_with_null() {
        let uids = [Uid::new(), Uid::new()];
        let mut buffer = PackedWriter::uid_list(uids.iter());
        assert_eq!(buffer.next_uid().unwrap(), uids[0]);
        assert_eq!(buffer.next_uid().unwrap(), uids[1]);
        assert!(buffer.next_uid().unwrap().is_null());
        assert!(!buffer.has_more());
    }

    #[test]
    fn test_empty_buffer() {
        let buffer = PackedBuffer::default();
        assert!(!buffer.has_more());
        assert_eq!(buffer.remaining(), 0);
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Reading any prefix of a directory never panics, and a failed read
        /// leaves the cursor where it was.
        #[test]
        fn truncated_directory_fails_without_moving(
            names in prop::collection::vec("[A-Za-z/]{1,12}", 1..6),
            cut in any::<prop::sample::Index>(),
        ) {
            let full = PackedWriter::type_directory(names.iter().map(String::as_str)).bytes;
            let len = cut.index(full.len());
            let mut buffer = PackedBuffer::new(full[..len].to_vec());

            let mut read = Vec::new();
            loop {
                let before = buffer.position();
                match buffer.next_string() {
                    Ok(name) => read.push(name),
                    Err(_) => {
                        prop_assert_eq!(buffer.position(), before);
                        break;
                    }
                }
                if !buffer.has_more() {
                    break;
                }
            }
            prop_assert!(read.len() <= names.len() + 1);
            for (got, want) in read.iter().zip(names.iter()) {
                prop_assert_eq!(got, want);
            }
        }
    }
}
