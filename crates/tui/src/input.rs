use unicode_width::UnicodeWidthChar;

const MAX_INPUT_LEN: usize = 200;

/// Single-line text field with a cursor counted in characters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextInput {
    value: String,
    cursor: usize,
}

impl TextInput {
    pub fn with_value(value: &str) -> Self {
        let value: String = value.chars().take(MAX_INPUT_LEN).collect();
        let cursor = value.chars().count();
        Self { value, cursor }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }

    /// Cursor position in characters.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Display width of the text left of the cursor in terminal cells.
    pub fn cursor_width(&self) -> usize {
        self.value
            .chars()
            .take(self.cursor)
            .map(|ch| ch.width().unwrap_or(0))
            .sum()
    }

    pub fn move_cursor(&mut self, delta: isize) {
        let len = self.value.chars().count() as isize;
        self.cursor = (self.cursor as isize + delta).clamp(0, len) as usize;
    }

    pub fn move_home(&mut self) {
        self.cursor = 0;
    }

    pub fn move_end(&mut self) {
        self.cursor = self.value.chars().count();
    }

    pub fn insert(&mut self, ch: char) {
        if ch.is_control() || self.value.chars().count() >= MAX_INPUT_LEN {
            return;
        }
        let at = self.byte_offset(self.cursor);
        self.value.insert(at, ch);
        self.cursor += 1;
    }

    pub fn backspace(&mut self) {
        if self.cursor == 0 {
            return;
        }
        self.cursor -= 1;
        let at = self.byte_offset(self.cursor);
        self.value.remove(at);
    }

    pub fn delete(&mut self) {
        if self.cursor < self.value.chars().count() {
            let at = self.byte_offset(self.cursor);
            self.value.remove(at);
        }
    }

    fn byte_offset(&self, chars: usize) -> usize {
        self.value
            .char_indices()
            .nth(chars)
            .map(|(idx, _)| idx)
            .unwrap_or(self.value.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edits_multibyte_text() {
        let mut input = TextInput::with_value("후추");
        input.move_cursor(-1);
        input.insert('a');
        assert_eq!(input.value(), "후a추");
        assert_eq!(input.cursor_width(), 3);
        input.backspace();
        input.backspace();
        assert_eq!(input.value(), "추");
        input.backspace();
        input.delete();
        assert_eq!(input.value(), "");
    }

    #[test]
    fn cursor_width_counts_terminal_cells() {
        let mut input = TextInput::with_value("a🚢항로");
        assert_eq!(input.cursor_width(), 7);
        input.move_home();
        input.move_cursor(2);
        assert_eq!(input.cursor_width(), 3);
        input.move_end();
        input.insert('\u{0301}');
        assert_eq!(input.cursor_width(), 7);
    }

    #[test]
    fn cursor_stays_in_bounds() {
        let mut input = TextInput::default();
        input.move_cursor(-3);
        assert_eq!(input.cursor(), 0);
        input.insert('x');
        input.move_cursor(5);
        assert_eq!(input.cursor(), 1);
        input.insert('\n');
        assert_eq!(input.value(), "x");
    }
}
