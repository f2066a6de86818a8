/// Convert a character index to a byte index for UTF-8 safe string operations
fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

/// The text the user is typing but hasn't sent yet, plus a cursor
/// measured in characters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DraftInput {
    text: String,
    cursor: usize,
}

impl DraftInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn insert(&mut self, c: char) {
        let byte_pos = char_to_byte_index(&self.text, self.cursor);
        self.text.insert(byte_pos, c);
        self.cursor += 1;
    }

    pub fn backspace(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
            let byte_pos = char_to_byte_index(&self.text, self.cursor);
            self.text.remove(byte_pos);
        }
    }

    pub fn delete(&mut self) {
        let char_count = self.text.chars().count();
        if self.cursor < char_count {
            let byte_pos = char_to_byte_index(&self.text, self.cursor);
            self.text.remove(byte_pos);
        }
    }

    pub fn move_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn move_right(&mut self) {
        let char_count = self.text.chars().count();
        self.cursor = (self.cursor + 1).min(char_count);
    }

    pub fn move_home(&mut self) {
        self.cursor = 0;
    }

    pub fn move_end(&mut self) {
        self.cursor = self.text.chars().count();
    }

    pub fn clear(&mut self) {
        self.text.clear();
        self.cursor = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn typed(s: &str) -> DraftInput {
        let mut draft = DraftInput::new();
        for c in s.chars() {
            draft.insert(c);
        }
        draft
    }

    #[test]
    fn test_insert_in_middle() {
        let mut draft = typed("helo");
        draft.move_left();
        draft.insert('l');
        assert_eq!(draft.text(), "hello");
        assert_eq!(draft.cursor(), 4);
    }

    #[test]
    fn test_multibyte_editing() {
        let mut draft = typed("café ☕");
        draft.backspace();
        assert_eq!(draft.text(), "café ");

        draft.move_home();
        draft.move_right();
        draft.move_right();
        draft.move_right();
        draft.delete();
        assert_eq!(draft.text(), "caf ");
    }

    #[test]
    fn test_cursor_stays_in_bounds() {
        let mut draft = typed("ab");
        draft.move_right();
        assert_eq!(draft.cursor(), 2);
        draft.delete();
        assert_eq!(draft.text(), "ab");

        draft.move_home();
        draft.move_left();
        draft.backspace();
        assert_eq!(draft.cursor(), 0);
        assert_eq!(draft.text(), "ab");
    }

    #[test]
    fn test_clear_resets_cursor() {
        let mut draft = typed("abc");
        draft.move_left();
        draft.clear();
        assert_eq!(draft, DraftInput::new());
    }
}
