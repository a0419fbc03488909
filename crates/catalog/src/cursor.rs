//! Terminator-aware cursors over packed streams
//!
//! A type directory ends with `""` and a uid list ends with the null uid.
//! Running out of data ends a stream as well. Once a stream has ended, any
//! further read fails with [`PackedError::PastTerminator`] instead of
//! returning whatever bytes happen to follow.

use txjournal_core::{PackedBuffer, PackedError, Uid};

/// Cursor over a packed type directory
#[derive(Debug)]
pub struct DirectoryCursor {
    buffer: PackedBuffer,
    finished: bool,
}

impl DirectoryCursor {
    /// Wrap a directory buffer
    pub fn new(buffer: PackedBuffer) -> Self {
        DirectoryCursor {
            buffer,
            finished: false,
        }
    }

    /// Next type name, or `None` once the terminator or the end of data is reached
    ///
    /// # Errors
    ///
    /// Returns `PastTerminator` when called after the stream ended, or the
    /// underlying error for a malformed string.
    pub fn next_type(&mut self) -> Result<Option<String>, PackedError> {
        if self.finished {
            return Err(PackedError::PastTerminator { stream: "type" });
        }
        if !self.buffer.has_more() {
            self.finished = true;
            return Ok(None);
        }
        let name = self.buffer.next_string()?;
        if name.is_empty() {
            self.finished = true;
            return Ok(None);
        }
        Ok(Some(name))
    }

    /// Whether the stream has ended
    pub fn is_finished(&self) -> bool {
        self.finished
    }
}

/// Cursor over a packed uid list
#[derive(Debug)]
pub struct UidCursor {
    buffer: PackedBuffer,
    finished: bool,
}

impl UidCursor {
    /// Wrap a uid list buffer
    pub fn new(buffer: PackedBuffer) -> Self {
        UidCursor {
            buffer,
            finished: false,
        }
    }

    /// Next uid, or `None` once the null uid or the end of data is reached
    ///
    /// # Errors
    ///
    /// Returns `PastTerminator` when called after the stream ended, or
    /// `Exhausted` for a truncated uid.
    pub fn next_uid(&mut self) -> Result<Option<Uid>, PackedError> {
        if self.finished {
            return Err(PackedError::PastTerminator { stream: "uid" });
        }
        if !self.buffer.has_more() {
            self.finished = true;
            return Ok(None);
        }
        let uid = self.buffer.next_uid()?;
        if uid.is_null() {
            self.finished = true;
            return Ok(None);
        }
        Ok(Some(uid))
    }

    /// Whether the stream has ended
    pub fn is_finished(&self) -> bool {
        self.finished
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use txjournal_core::PackedWriter;

    #[test]
    fn test_directory_stops_at_terminator() {
        let mut writer = PackedWriter::new();
        writer.put_string("Alpha").put_string("").put_string("Hidden");
        let mut cursor = DirectoryCursor::new(writer.into_buffer());

        assert_eq!(cursor.next_type().unwrap(), Some("Alpha".to_string()));
        assert_eq!(cursor.next_type().unwrap(), None);
        assert!(cursor.is_finished());
        assert_eq!(
            cursor.next_type(),
            Err(PackedError::PastTerminator { stream: "type" })
        );
    }

    #[test]
    fn test_directory_without_terminator_ends_at_data() {
        let mut writer = PackedWriter::new();
        writer.put_string("Alpha");
        let mut cursor = DirectoryCursor::new(writer.into_buffer());
        assert_eq!(cursor.next_type().unwrap(), Some("Alpha".to_string()));
        assert_eq!(cursor.next_type().unwrap(), None);
    }

    #[test]
    fn test_uid_cursor_never_yields_null() {
        let uid = Uid::new();
        let mut cursor = UidCursor::new(PackedWriter::uid_list([&uid]));
        assert_eq!(cursor.next_uid().unwrap(), Some(uid));
        assert_eq!(cursor.next_uid().unwrap(), None);
        assert_eq!(
            cursor.next_uid(),
            Err(PackedError::PastTerminator { stream: "uid" })
        );
    }

    #[test]
    fn test_truncated_uid() {
        let mut writer = PackedWriter::new();
        writer.put_uid(&Uid::new());
        let mut bytes = writer.into_bytes();
        bytes.truncate(7);
        let mut cursor = UidCursor::new(PackedBuffer::new(bytes));
        assert!(matches!(
            cursor.next_uid(),
            Err(PackedError::Exhausted { .. })
        ));
    }
}
