/// Stack of output accumulators.
///
/// Text is always appended to the top buffer. Nested buffers isolate output
/// produced while scanning tag syntax or rendering a branch; closing one hands
/// its trimmed contents back to the caller. The root buffer is never popped.
#[derive(Debug, Default)]
pub(crate) struct BufferStack {
    root: String,
    nested: Vec<String>,
}

impl BufferStack {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn open(&mut self) {
        self.nested.push(String::new());
    }

    /// Pops the top buffer and returns its trimmed contents.
    pub(crate) fn close(&mut self) -> String {
        debug_assert!(!self.nested.is_empty(), "closed the root output buffer");
        trimmed(self.nested.pop().unwrap_or_default())
    }

    fn top(&mut self) -> &mut String {
        match self.nested.last_mut() {
            Some(buffer) => buffer,
            None => &mut self.root,
        }
    }

    pub(crate) fn push_str(&mut self, text: &str) {
        self.top().push_str(text);
    }

    /// Collapses a run of whitespace into at most one space.
    pub(crate) fn push_whitespace(&mut self) {
        let top = self.top();
        if !top.ends_with(' ') {
            top.push(' ');
        }
    }

    pub(crate) fn finish(self) -> String {
        debug_assert!(self.nested.is_empty(), "unclosed output buffers");
        trimmed(self.root)
    }
}

fn trimmed(buffer: String) -> String {
    let trimmed = buffer.trim();
    if trimmed.len() == buffer.len() {
        buffer
    } else {
        trimmed.to_owned()
    }
}
