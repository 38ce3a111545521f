use std::io::{self, BufRead};

/// Declares how a parse call relates to the stream it reads from.
///
/// The distinction drives the abort policy when a targeted seek overshoots:
/// an exclusively owned stream is abandoned on the spot, while a shared one
/// is rewound so the next sequential call resumes at the overshot record
/// without re-reading any earlier bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StreamMode {
    /// The stream belongs to this call alone and will not be read again.
    Exclusive,
    /// The stream is driven across many sequential calls.
    #[default]
    Shared,
}

/// A line-oriented read cursor with pushback.
///
/// The cursor is the single piece of state shared between successive parse
/// calls on one stream. Lookahead is undone by pushing read lines back with
/// [`unread`](Self::unread); pushed-back lines are handed out again in LIFO
/// order before any new data is read.
#[derive(Debug)]
pub struct LineCursor<R> {
    reader: R,
    pushback: Vec<String>,
    line: usize,
}

impl<R: BufRead> LineCursor<R> {
    /// Wraps a buffered reader, starting at line zero.
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            pushback: Vec::new(),
            line: 0,
        }
    }

    /// Reads the next line, without its trailing newline.
    ///
    /// Returns `Ok(None)` at end of stream.
    pub fn next_line(&mut self) -> io::Result<Option<String>> {
        if let Some(line) = self.pushback.pop() {
            self.line += 1;
            return Ok(Some(line));
        }
        let mut buf = String::new();
        if self.reader.read_line(&mut buf)? == 0 {
            return Ok(None);
        }
        while buf.ends_with('\n') || buf.ends_with('\r') {
            buf.pop();
        }
        self.line += 1;
        Ok(Some(buf))
    }

    /// Pushes a line back so the next [`next_line`](Self::next_line) call
    /// returns it again.
    ///
    /// To restore several lines, unread them in reverse read order.
    pub fn unread(&mut self, line: String) {
        self.line = self.line.saturating_sub(1);
        self.pushback.push(line);
    }

    /// Returns the 1-based number of the most recently read line.
    pub fn line_number(&self) -> usize {
        self.line
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_lines_without_newlines() {
        let data = b"first\nsecond\r\nthird";
        let mut cursor = LineCursor::new(&data[..]);

        assert_eq!(cursor.next_line().unwrap().as_deref(), Some("first"));
        assert_eq!(cursor.next_line().unwrap().as_deref(), Some("second"));
        assert_eq!(cursor.next_line().unwrap().as_deref(), Some("third"));
        assert_eq!(cursor.next_line().unwrap(), None);
    }

    #[test]
    fn tracks_line_numbers() {
        let data = b"a\nb\n";
        let mut cursor = LineCursor::new(&data[..]);
        assert_eq!(cursor.line_number(), 0);
        cursor.next_line().unwrap();
        assert_eq!(cursor.line_number(), 1);
        cursor.next_line().unwrap();
        assert_eq!(cursor.line_number(), 2);
    }

    #[test]
    fn unread_hands_lines_back_in_lifo_order() {
        let data = b"a\nb\nc\n";
        let mut cursor = LineCursor::new(&data[..]);
        let a = cursor.next_line().unwrap().unwrap();
        let b = cursor.next_line().unwrap().unwrap();

        // Restore both by unreading in reverse read order.
        cursor.unread(b);
        cursor.unread(a);

        assert_eq!(cursor.next_line().unwrap().as_deref(), Some("a"));
        assert_eq!(cursor.next_line().unwrap().as_deref(), Some("b"));
        assert_eq!(cursor.next_line().unwrap().as_deref(), Some("c"));
    }

    #[test]
    fn unread_rewinds_the_line_number() {
        let data = b"a\nb\n";
        let mut cursor = LineCursor::new(&data[..]);
        let a = cursor.next_line().unwrap().unwrap();
        assert_eq!(cursor.line_number(), 1);
        cursor.unread(a);
        assert_eq!(cursor.line_number(), 0);
        cursor.next_line().unwrap();
        assert_eq!(cursor.line_number(), 1);
    }

    #[test]
    fn default_stream_mode_is_shared() {
        assert_eq!(StreamMode::default(), StreamMode::Shared);
    }
}
