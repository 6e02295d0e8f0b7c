use core::fmt;

/// `fmt::Write` sink over a byte buffer that silently truncates and always
/// leaves room for the terminating NUL.
pub struct BoundedWriter<'a> {
    buf: &'a mut [u8],
    len: usize,
}

impl<'a> BoundedWriter<'a> {
    pub fn new(buf: &'a mut [u8]) -> Self {
        Self { buf, len: 0 }
    }

    /// Terminates the buffer and returns the number of bytes before the NUL.
    pub fn finish(self) -> usize {
        if let Some(last) = self.buf.get_mut(self.len) {
            *last = 0;
        }
        self.len
    }
}

impl fmt::Write for BoundedWriter<'_> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        let room = self.buf.len().saturating_sub(1).saturating_sub(self.len);
        let n = core::cmp::min(room, s.len());
        self.buf[self.len..self.len + n].copy_from_slice(&s.as_bytes()[..n]);
        self.len += n;
        Ok(())
    }
}

/// Copies `msg` into `buf`, truncating if needed. `buf` is NUL-terminated
/// unless it is empty.
pub fn write_bounded(buf: &mut [u8], msg: &str) -> usize {
    use fmt::Write;

    let mut w = BoundedWriter::new(buf);
    let _ = w.write_str(msg);
    w.finish()
}

/// The text before the first NUL.
pub fn read_bounded(buf: &[u8]) -> &str {
    let end = buf.iter().position(|b| *b == 0).unwrap_or(buf.len());
    core::str::from_utf8(&buf[..end]).unwrap_or("")
}
