use super::PixelBuffer;

/// Linear undo stack of full-buffer snapshots. Index 0 is the pristine load and the
/// stack is never empty.
#[derive(Debug, Clone)]
pub struct EditHistory {
    entries: Vec<PixelBuffer>,
    current_index: usize,
}

impl EditHistory {
    pub fn new(initial: PixelBuffer) -> Self {
        Self {
            entries: vec![initial],
            current_index: 0,
        }
    }

    pub fn reset(&mut self, initial: PixelBuffer) {
        self.entries.clear();
        self.entries.push(initial);
        self.current_index = 0;
    }

    pub fn current(&self) -> &PixelBuffer {
        &self.entries[self.current_index]
    }

    /// Pushes `buffer` as the new top, dropping any entries past the current index.
    /// Returns `false` when the buffer is pixel-identical to the current entry.
    pub fn commit(&mut self, buffer: PixelBuffer) -> bool {
        if buffer == *self.current() {
            return false;
        }
        self.entries.truncate(self.current_index + 1);
        self.entries.push(buffer);
        self.current_index = self.entries.len() - 1;
        true
    }

    pub fn undo(&mut self) -> bool {
        if self.current_index == 0 {
            return false;
        }
        self.current_index -= 1;
        true
    }

    pub fn can_undo(&self) -> bool {
        self.current_index > 0
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
