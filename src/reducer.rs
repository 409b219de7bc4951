//! Keystroke-to-buffer transformation.
//!
//! Every operation takes the current [`TypingState`] by reference and returns
//! a fresh one, so callers can replay or compare states freely.

use tracing::trace;

/// A key the reducer understands. Anything else is filtered out before it
/// gets here (see [`crate::runtime::keystroke_from_event`]).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Keystroke {
    Char(char),
    Enter,
    Tab,
    Backspace,
    Left,
    Right,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TypingState {
    pub buffer: Vec<char>,
    pub cursor: usize,
    /// Keystrokes that missed their target character. Never decreases.
    pub errors: u32,
}

impl TypingState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(&self) -> String {
        self.buffer.iter().collect()
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }
}

pub fn apply_backspace(state: &TypingState) -> TypingState {
    let mut next = state.clone();
    let cursor = next.cursor.min(next.buffer.len());
    if cursor > 0 {
        next.buffer.remove(cursor - 1);
        next.cursor = cursor - 1;
    }
    next
}

pub fn move_left(state: &TypingState) -> TypingState {
    let mut next = state.clone();
    next.cursor = next.cursor.min(next.buffer.len()).saturating_sub(1);
    next
}

pub fn move_right(state: &TypingState) -> TypingState {
    let mut next = state.clone();
    if next.cursor < next.buffer.len() {
        next.cursor += 1;
    }
    next
}

/// Bounds `[start, end)` of the line holding `cursor`, newlines excluded.
fn line_bounds(buffer: &[char], cursor: usize) -> (usize, usize) {
    let start = buffer[..cursor]
        .iter()
        .rposition(|&c| c == '\n')
        .map_or(0, |pos| pos + 1);
    let end = buffer[cursor..]
        .iter()
        .position(|&c| c == '\n')
        .map_or(buffer.len(), |pos| cursor + pos);
    (start, end)
}

/// Insert `ch` at the cursor, soft-wrapping when the line it lands in
/// (including the text after the cursor) would reach `max_line_length`.
///
/// On a wrap the text after the cursor follows `ch` onto the new line, and
/// is broken onto a line of its own if that line would reach the limit too.
///
/// The error check compares `ch` with the target character at the cursor
/// position *before* insertion. When a wrap newline is injected the buffer
/// drifts one slot ahead of the target, and later keystrokes are still
/// judged against the unshifted index.
pub fn apply_printable_char(
    state: &TypingState,
    ch: char,
    target: &[char],
    max_line_length: usize,
) -> TypingState {
    let mut next = state.clone();
    let cursor = next.cursor.min(next.buffer.len());
    let (start, end) = line_bounds(&next.buffer, cursor);
    let tail = end - cursor;

    if ch != '\n' && (cursor - start) + 1 + tail >= max_line_length {
        next.buffer.insert(cursor, '\n');
        next.buffer.insert(cursor + 1, ch);
        next.cursor = cursor + 2;
        if tail > 0 && 1 + tail >= max_line_length {
            next.buffer.insert(cursor + 2, '\n');
        }
        trace!(cursor, tail, "soft wrap inserted");
    } else {
        next.buffer.insert(cursor, ch);
        next.cursor = cursor + 1;
    }

    if target.get(cursor) != Some(&ch) {
        next.errors += 1;
    }

    next
}

/// Apply one keystroke.
pub fn reduce(
    state: &TypingState,
    target: &[char],
    key: Keystroke,
    max_line_length: usize,
) -> TypingState {
    match key {
        Keystroke::Char(c) => apply_printable_char(state, c, target, max_line_length),
        Keystroke::Enter => apply_printable_char(state, '\n', target, max_line_length),
        Keystroke::Tab => apply_printable_char(state, '\t', target, max_line_length),
        Keystroke::Backspace => apply_backspace(state),
        Keystroke::Left => move_left(state),
        Keystroke::Right => move_right(state),
    }
}
