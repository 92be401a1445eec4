//! Reply formatting: quote escaping and splitting into platform-sized messages.

/// Escape single quotes as `\'`.
pub fn escape_quotes(text: &str) -> String {
    text.replace('\'', "\\'")
}

#[derive(Debug, Clone)]
pub struct ResponseFormatter {
    max_chunk_chars: usize,
}

impl Default for ResponseFormatter {
    fn default() -> Self {
        Self::new(2000)
    }
}

impl ResponseFormatter {
    pub fn new(max_chunk_chars: usize) -> Self {
        Self {
            max_chunk_chars: max_chunk_chars.max(1),
        }
    }

    /// Escape and split a raw backend reply.
    pub fn format(&self, raw: &str) -> Vec<String> {
        self.split(&escape_quotes(raw))
    }

    /// Split into chunks of at most `max_chunk_chars` characters.
    ///
    /// Breaks at the last newline inside the window when there is one (the
    /// newline itself is dropped), otherwise cuts hard at the limit. A hard
    /// cut never separates an escaped quote from its backslash.
    pub fn split(&self, text: &str) -> Vec<String> {
        let mut chunks = Vec::new();
        let mut remaining = text;

        loop {
            let limit = match remaining.char_indices().nth(self.max_chunk_chars) {
                Some((idx, _)) => idx,
                None => {
                    chunks.push(remaining.to_string());
                    break;
                }
            };

            let mut cut = match remaining[..limit].rfind('\n') {
                Some(idx) if idx > 0 => idx,
                _ => limit,
            };
            if cut > 1 && remaining[..cut].ends_with('\\') && remaining[cut..].starts_with('\'') {
                cut -= 1;
            }

            chunks.push(remaining[..cut].to_string());
            remaining = &remaining[cut..];
            remaining = remaining.strip_prefix('\n').unwrap_or(remaining);
            if remaining.is_empty() {
                break;
            }
        }

        chunks
    }
}
