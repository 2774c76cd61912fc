use unicode_segmentation::UnicodeSegmentation;

const PREVIEW_LEN: usize = 20;

pub fn substr_up_to_len(s: &str, max_len: usize) -> String {
    if s.graphemes(true).count() > max_len {
        s.graphemes(true).take(max_len).collect::<String>()
    } else {
        s.to_owned()
    }
}

/// First line of `s`, cut to a few graphemes, for log messages.
pub fn preview(s: &str) -> String {
    let line = s.lines().next().unwrap_or_default();
    let short = substr_up_to_len(line, PREVIEW_LEN);
    if short.len() < s.len() {
        format!("{short}...")
    } else {
        short
    }
}
