//! Chunked reply assembly.
//!
//! Telegram caps message length, so a reply is built as an ordered sequence of
//! bounded chunks. Fenced code blocks must stay balanced inside every chunk:
//! a rollover that happens mid-block closes the fence in the finished chunk
//! and reopens it in the next one.

const FENCE: &str = "```\n";

#[derive(Clone, Debug)]
pub struct MessageWriter {
    max_size: usize,
    messages: Vec<String>,
    code_mode: bool,
}

impl MessageWriter {
    pub const DEFAULT_MAX_SIZE: usize = 4096;

    /// `max_size` must leave room for a fence pair plus at least one byte of
    /// content in a single chunk.
    pub fn new(max_size: usize) -> Self {
        debug_assert!(max_size > 2 * FENCE.len());
        Self {
            max_size,
            messages: vec![String::new()],
            code_mode: false,
        }
    }

    /// Append one line (terminator added here). A line that alone exceeds a
    /// whole chunk's capacity is sliced into capacity-sized pieces; each piece
    /// goes through the rollover rule so every chunk stays bounded and fenced.
    pub fn add_line(&mut self, line: &str) {
        let text = format!("{line}\n");
        let capacity = self.chunk_capacity();
        if text.len() <= capacity {
            self.push_block(&text);
            return;
        }

        let mut rest = text.as_str();
        while !rest.is_empty() {
            let take = split_index(rest, capacity);
            self.push_block(&rest[..take]);
            rest = &rest[take..];
        }
    }

    /// Open a fenced code block in the current chunk.
    pub fn set_code_mode(&mut self) {
        // The opening fence and the (later) closing fence must fit together.
        if self.current().len() + 2 * FENCE.len() > self.max_size {
            self.messages.push(String::new());
        }
        self.current_mut().push_str(FENCE);
        self.code_mode = true;
    }

    /// Close the current fenced code block.
    pub fn set_plain_mode(&mut self) {
        // Room for this fence was reserved by every code-mode append.
        self.current_mut().push_str(FENCE);
        self.code_mode = false;
    }

    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    pub fn into_messages(self) -> Vec<String> {
        self.messages
    }

    /// Largest block an empty chunk can take, fences included.
    fn chunk_capacity(&self) -> usize {
        if self.code_mode {
            self.max_size - 2 * FENCE.len()
        } else {
            self.max_size
        }
    }

    fn push_block(&mut self, block: &str) {
        let reserve = if self.code_mode { FENCE.len() } else { 0 };
        if self.current().len() + block.len() + reserve > self.max_size {
            if self.code_mode {
                self.current_mut().push_str(FENCE);
            }
            self.messages.push(String::new());
            if self.code_mode {
                self.current_mut().push_str(FENCE);
            }
        }
        self.current_mut().push_str(block);
    }

    fn current(&self) -> &String {
        self.messages.last().expect("writer always has a chunk")
    }

    fn current_mut(&mut self) -> &mut String {
        self.messages.last_mut().expect("writer always has a chunk")
    }
}

/// Largest prefix of `s` not exceeding `max` bytes, cut on a char boundary.
/// Always makes progress even when the first char is wider than `max`.
fn split_index(s: &str, max: usize) -> usize {
    if s.len() <= max {
        return s.len();
    }
    let mut i = max;
    while i > 0 && !s.is_char_boundary(i) {
        i -= 1;
    }
    if i == 0 {
        i = s.chars().next().map(char::len_utf8).unwrap_or(s.len());
    }
    i
}
