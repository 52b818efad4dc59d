//! Greedy word wrap by character count.

/// Splits `line` into pieces of at most `width` characters.
///
/// A line that already fits is returned unchanged, blank lines included.
/// Longer lines are wrapped greedily on whitespace; a word longer than
/// `width` is broken into chunks. Always yields at least one piece.
pub fn wrap_line(line: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    if line.chars().count() <= width {
        return vec![line.to_string()];
    }

    let mut lines = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for word in line.split_whitespace() {
        let mut word = word;
        let mut word_len = word.chars().count();
        let sep = usize::from(current_len > 0);

        if current_len + sep + word_len <= width {
            if sep == 1 {
                current.push(' ');
            }
            current.push_str(word);
            current_len += sep + word_len;
            continue;
        }

        if word_len <= width {
            lines.push(std::mem::replace(&mut current, word.to_string()));
            current_len = word_len;
            continue;
        }

        // Long word: fill what is left of the current line first.
        if current_len > 0 {
            let room = width.saturating_sub(current_len + 1);
            if room > 0 {
                let (head, tail) = split_at_char(word, room);
                current.push(' ');
                current.push_str(head);
                word = tail;
                word_len -= room;
            }
            lines.push(std::mem::take(&mut current));
        }
        while word_len > width {
            let (head, tail) = split_at_char(word, width);
            lines.push(head.to_string());
            word = tail;
            word_len -= width;
        }
        current = word.to_string();
        current_len = word_len;
    }

    if current_len > 0 || lines.is_empty() {
        lines.push(current);
    }
    lines
}

fn split_at_char(s: &str, n: usize) -> (&str, &str) {
    match s.char_indices().nth(n) {
        Some((idx, _)) => s.split_at(idx),
        None => (s, ""),
    }
}
