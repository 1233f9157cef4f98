//! Keyboard command reference shown by `?`

/// Keys and what they do, in display order
pub const KEYBOARD_COMMANDS: &[(&str, &str)] = &[
    ("→ / ←", "Next / previous element"),
    ("Tab / Shift+Tab", "Next / previous interactive element"),
    ("↓ / ↑", "Next / previous element in document order"),
    ("h / H", "Next / previous heading"),
    ("k / K", "Next / previous link"),
    ("l / L", "Next / previous list"),
    ("f / F", "Next / previous form field"),
    ("b / B", "Next / previous button"),
    ("Esc", "Leave a text field"),
    ("c", "Show / hide the caption"),
    ("y", "Copy the caption"),
    (":", "Command line"),
    ("?", "Show / hide this help"),
];

/// Commands accepted on the command line
pub const LINE_COMMANDS: &[(&str, &str)] = &[
    (":o <url|path>", "Open a page"),
    (":rescan", "Scan the page again"),
    (":set key=value", "Change a setting"),
    (":q", "Quit"),
];

/// Help text, one line per command, keys right-aligned in a column
pub fn lines() -> Vec<String> {
    let width = KEYBOARD_COMMANDS
        .iter()
        .chain(LINE_COMMANDS)
        .map(|(keys, _)| unicode_width::UnicodeWidthStr::width(*keys))
        .max()
        .unwrap_or(0);

    let mut lines = vec!["Keyboard Commands".to_string(), String::new()];
    lines.extend(KEYBOARD_COMMANDS.iter().map(|row| format_row(row, width)));
    lines.push(String::new());
    lines.extend(LINE_COMMANDS.iter().map(|row| format_row(row, width)));
    lines
}

fn format_row((keys, description): &(&str, &str), width: usize) -> String {
    let pad = width - unicode_width::UnicodeWidthStr::width(*keys);
    format!("{}{}   {}", " ".repeat(pad), keys, description)
}
