use std::fmt;

use crate::error::{GreeterError, Result};

/// Size of the greeting buffer, terminator included.
pub const MAX_GREETING_BYTES: usize = 100;

/// Message category under which greetings travel between processes.
pub const GREETING_TAG: i32 = 0;

/// Text one process sends to the coordinator. The constructors guarantee that the text plus its
/// NUL terminator never exceeds [`MAX_GREETING_BYTES`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Greeting {
    text: String,
}

impl Greeting {
    pub fn new(rank: u32, size: u32) -> Result<Self> {
        Self::from_text(format!("Greetings from process {rank} of {size}!"))
    }

    pub fn from_text(text: impl Into<String>) -> Result<Self> {
        let text = text.into();
        check_len(text.len() + 1)?;
        Ok(Greeting { text })
    }

    /// Text bytes followed by a single NUL.
    pub fn to_wire(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(self.text.len() + 1);
        buf.extend_from_slice(self.text.as_bytes());
        buf.push(0);
        buf
    }

    /// Inverse of [`Greeting::to_wire`]. Everything after the first NUL is ignored, a missing
    /// terminator is tolerated as long as the payload fits into the buffer.
    pub fn from_wire(payload: &[u8]) -> Result<Self> {
        check_len(payload.len())?;
        let end = payload
            .iter()
            .position(|b| *b == 0)
            .unwrap_or(payload.len());
        let text = String::from_utf8(payload[..end].to_vec())?;
        Ok(Greeting { text })
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }
}

impl fmt::Display for Greeting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

fn check_len(len: usize) -> Result<()> {
    if len > MAX_GREETING_BYTES {
        return Err(GreeterError::GreetingTooLong {
            len,
            max: MAX_GREETING_BYTES,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::error::GreeterError;
    use crate::greeting::{Greeting, MAX_GREETING_BYTES};

    #[test]
    fn formats_rank_and_size() {
        let greeting = Greeting::new(3, 4).unwrap();
        assert_eq!("Greetings from process 3 of 4!", greeting.as_str());
        assert_eq!("Greetings from process 3 of 4!", greeting.to_string());
    }

    #[test]
    fn largest_ranks_still_fit() {
        let greeting = Greeting::new(u32::MAX - 1, u32::MAX).unwrap();
        assert!(greeting.to_wire().len() <= MAX_GREETING_BYTES);
    }

    #[test]
    fn wire_format_is_nul_terminated() {
        let wire = Greeting::new(1, 2).unwrap().to_wire();
        assert_eq!(Some(&0), wire.last());
        assert_eq!(b"Greetings from process 1 of 2!\0".to_vec(), wire);
    }

    #[test]
    fn from_wire_stops_at_terminator() {
        let greeting = Greeting::from_wire(b"hello\0garbage").unwrap();
        assert_eq!("hello", greeting.as_str());
    }

    #[test]
    fn from_wire_without_terminator() {
        let greeting = Greeting::from_wire(b"hello").unwrap();
        assert_eq!("hello", greeting.as_str());
    }

    #[test]
    fn text_at_limit_is_accepted() {
        let text = "a".repeat(MAX_GREETING_BYTES - 1);
        let greeting = Greeting::from_text(text.clone()).unwrap();
        assert_eq!(MAX_GREETING_BYTES, greeting.to_wire().len());
        assert_eq!(greeting, Greeting::from_wire(&greeting.to_wire()).unwrap());
    }

    #[test]
    fn text_over_limit_is_rejected() {
        let result = Greeting::from_text("a".repeat(MAX_GREETING_BYTES));
        assert!(matches!(
            result,
            Err(GreeterError::GreetingTooLong { len: 101, max: 100 })
        ));
    }

    #[test]
    fn payload_over_limit_is_rejected() {
        let payload = vec![b'a'; MAX_GREETING_BYTES + 1];
        assert!(matches!(
            Greeting::from_wire(&payload),
            Err(GreeterError::GreetingTooLong { .. })
        ));
    }

    #[test]
    fn invalid_utf8_is_rejected() {
        assert!(matches!(
            Greeting::from_wire(&[0xff, 0xfe, 0]),
            Err(GreeterError::InvalidEncoding(_))
        ));
    }
}
