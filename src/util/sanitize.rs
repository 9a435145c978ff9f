use regex::Regex;
use std::sync::LazyLock;

const MAX_LABEL_CHARS: usize = 160;

// CSI sequences (ESC [ params intermediates final)
static ANSI_CSI: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"\x1B\[[0-9;?]*[ -/]*[@-~]").ok());

// Remove escape sequences and control chars, collapse whitespace, truncate for one terminal row.
pub fn sanitize_for_terminal(s: &str) -> String {
    let no_ansi = match ANSI_CSI.as_ref() {
        Some(re) => re.replace_all(s, ""),
        None => s.into(),
    };

    let mut out = String::with_capacity(no_ansi.len());
    let mut pending_space = false;
    for ch in no_ansi.chars() {
        if ch.is_whitespace() {
            pending_space = !out.is_empty();
        } else if !ch.is_control() {
            if pending_space {
                out.push(' ');
                pending_space = false;
            }
            out.push(ch);
        }
    }

    match out.char_indices().nth(MAX_LABEL_CHARS) {
        Some((cut, _)) => {
            out.truncate(cut);
            out.push('…');
            out
        }
        None => out,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_escape_sequences() {
        assert_eq!(sanitize_for_terminal("\x1B[31mred\x1B[0m"), "red");
    }

    #[test]
    fn test_collapses_whitespace_and_controls() {
        assert_eq!(sanitize_for_terminal("  a\n\tb\x07c  \r\n"), "a bc");
    }

    #[test]
    fn test_truncates_long_text() {
        let long = "é".repeat(MAX_LABEL_CHARS + 10);
        let out = sanitize_for_terminal(&long);
        assert_eq!(out.chars().count(), MAX_LABEL_CHARS + 1);
        assert!(out.ends_with('…'));
    }

    #[test]
    fn test_keeps_plain_text() {
        assert_eq!(sanitize_for_terminal("Bitcoin hits new high"), "Bitcoin hits new high");
    }
}
