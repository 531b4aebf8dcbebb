/// Multi-line edit buffer used by the cell editor popup.
///
/// `cursor` is a byte offset that always sits on a char boundary.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextEditor {
    buffer: String,
    cursor: usize,
}

impl TextEditor {
    /// Start editing `text` with the cursor at the end.
    pub fn new(text: impl Into<String>) -> Self {
        let buffer = text.into();
        let cursor = buffer.len();
        Self { buffer, cursor }
    }

    pub fn text(&self) -> &str {
        &self.buffer
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn into_text(self) -> String {
        self.buffer
    }

    pub fn insert(&mut self, ch: char) {
        self.buffer.insert(self.cursor, ch);
        self.cursor += ch.len_utf8();
    }

    pub fn insert_newline(&mut self) {
        let (text, cursor) = auto_indent_newline(&self.buffer, self.cursor);
        self.buffer = text;
        self.cursor = cursor;
    }

    pub fn backspace(&mut self) {
        if self.cursor > 0 {
            let prev = prev_boundary(&self.buffer, self.cursor);
            self.buffer.drain(prev..self.cursor);
            self.cursor = prev;
        }
    }

    pub fn delete(&mut self) {
        if self.cursor < self.buffer.len() {
            let next = next_boundary(&self.buffer, self.cursor);
            self.buffer.drain(self.cursor..next);
        }
    }

    pub fn left(&mut self) {
        self.cursor = prev_boundary(&self.buffer, self.cursor);
    }

    pub fn right(&mut self) {
        self.cursor = next_boundary(&self.buffer, self.cursor);
    }

    /// Start of the current line.
    pub fn home(&mut self) {
        self.cursor = line_start(&self.buffer, self.cursor);
    }

    /// End of the current line.
    pub fn end(&mut self) {
        self.cursor = self.buffer[self.cursor..]
            .find('\n')
            .map_or(self.buffer.len(), |i| self.cursor + i);
    }

    /// (line, column) of the cursor, column counted in chars.
    pub fn cursor_line_col(&self) -> (usize, usize) {
        let before = &self.buffer[..self.cursor];
        let line = before.matches('\n').count();
        let col = before[line_start(&self.buffer, self.cursor)..].chars().count();
        (line, col)
    }
}

/// Insert a newline at `cursor`, indenting the new line with the leading
/// whitespace of the line the cursor is on. Returns the new text and the
/// cursor placed right after the inserted indentation.
pub fn auto_indent_newline(text: &str, cursor: usize) -> (String, usize) {
    let cursor = cursor.min(text.len());
    let start = line_start(text, cursor);
    let indent: String = text[start..]
        .chars()
        .take_while(|c| c.is_whitespace() && *c != '\n')
        .collect();
    // the indent cannot extend past the cursor on the current line
    let indent = &indent[..indent.len().min(cursor - start)];

    let mut out = String::with_capacity(text.len() + indent.len() + 1);
    out.push_str(&text[..cursor]);
    out.push('\n');
    out.push_str(indent);
    out.push_str(&text[cursor..]);
    (out, cursor + 1 + indent.len())
}

fn line_start(s: &str, idx: usize) -> usize {
    s[..idx].rfind('\n').map_or(0, |i| i + 1)
}

fn prev_boundary(s: &str, idx: usize) -> usize {
    s[..idx].char_indices().next_back().map_or(0, |(i, _)| i)
}

fn next_boundary(s: &str, idx: usize) -> usize {
    s[idx..].chars().next().map_or(idx, |c| idx + c.len_utf8())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn newline_copies_indentation_of_current_line() {
        let text = "root:\n    child: 1";
        let (out, cursor) = auto_indent_newline(text, text.len());
        assert_eq!(out, "root:\n    child: 1\n    ");
        assert_eq!(cursor, out.len());
    }

    #[test]
    fn newline_in_the_middle_keeps_the_tail() {
        let text = "  a b";
        let (out, cursor) = auto_indent_newline(text, 3);
        assert_eq!(out, "  a\n   b");
        assert_eq!(cursor, 6);
        assert_eq!(&out[cursor..], " b");
    }

    #[test]
    fn newline_inside_indentation_does_not_overshoot() {
        let (out, cursor) = auto_indent_newline("    x", 2);
        assert_eq!(out, "  \n    x");
        assert_eq!(cursor, 5);
    }

    #[test]
    fn tabs_count_as_indentation() {
        let (out, _) = auto_indent_newline("a\n\tb", 4);
        assert_eq!(out, "a\n\tb\n\t");
    }

    #[test]
    fn editing_handles_multibyte_chars() {
        let mut ed = TextEditor::new("hé");
        ed.backspace();
        assert_eq!(ed.text(), "h");
        ed.insert('ö');
        ed.left();
        ed.left();
        ed.delete();
        assert_eq!(ed.text(), "ö");
        ed.end();
        assert_eq!(ed.cursor(), "ö".len());
    }

    #[test]
    fn home_and_end_stay_on_current_line() {
        let mut ed = TextEditor::new("first\n  second");
        ed.home();
        assert_eq!(ed.cursor(), 6);
        assert_eq!(ed.cursor_line_col(), (1, 0));
        ed.insert_newline();
        assert_eq!(ed.text(), "first\n\n  second");
        ed.end();
        assert_eq!(ed.cursor_line_col(), (2, 8));
    }
}
