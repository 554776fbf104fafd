use std::collections::VecDeque;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputStream {
    Stdout,
    Stderr,
}

impl OutputStream {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputStream::Stdout => "stdout",
            OutputStream::Stderr => "stderr",
        }
    }

    fn index(self) -> usize {
        match self {
            OutputStream::Stdout => 0,
            OutputStream::Stderr => 1,
        }
    }
}

/// Merged stdout/stderr of one process, split into lines as it arrives.
///
/// Complete lines keep their trailing `\n` and are merged in arrival order.
/// Each stream keeps its own unterminated tail, released only by
/// `take_lines(true)`, so fragments of the two streams never interleave.
#[derive(Debug, Default)]
pub struct OutputBuffer {
    complete: VecDeque<String>,
    partial: [Vec<u8>; 2],
}

impl OutputBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, stream: OutputStream, chunk: &[u8]) {
        let partial = &mut self.partial[stream.index()];
        let mut rest = chunk;
        while let Some(idx) = rest.iter().position(|b| *b == b'\n') {
            partial.extend_from_slice(&rest[..=idx]);
            self.complete
                .push_back(String::from_utf8_lossy(&partial[..]).into_owned());
            partial.clear();
            rest = &rest[idx + 1..];
        }
        partial.extend_from_slice(rest);
    }

    pub fn take_lines(&mut self, consume_all: bool) -> Vec<String> {
        let mut out: Vec<String> = self.complete.drain(..).collect();
        if consume_all {
            for partial in self.partial.iter_mut().filter(|p| !p.is_empty()) {
                out.push(String::from_utf8_lossy(&partial[..]).into_owned());
                partial.clear();
            }
        }
        out
    }
}
