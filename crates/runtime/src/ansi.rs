//! Text styling decoder: engine screens to structured styled spans.
//!
//! The rule engine emits terminal-style text with a small fixed palette of
//! SGR color codes. This decoder turns that text into a span list the
//! presentation shell can render in any medium. Recognized color codes open
//! a styled span until the reset code; every other control sequence is
//! stripped. The output carries no markup or escapes of its own, so feeding
//! a decoded result's plain text back in is a no-op.

use serde::{Deserialize, Serialize};

/// Named style of a recognized color span.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextStyle {
    /// NPCs you can talk to.
    Blue,
    /// Ordinary fightable creatures.
    Yellow,
    /// Boss fights.
    Orange,
    /// Final-act bosses and missing health.
    Red,
    Green,
    /// Current health in HP bars.
    HealthGreen,
    /// Common items and equipment.
    ItemGreen,
    /// Rare or story-important rewards.
    Purple,
    /// Skill and training terms.
    Pink,
}

impl TextStyle {
    /// Map an SGR parameter string to a recognized style.
    fn from_sgr(code: &str) -> Option<Self> {
        match code {
            "38;5;39" => Some(TextStyle::Blue),
            "93" => Some(TextStyle::Yellow),
            "38;5;208" => Some(TextStyle::Orange),
            "91" => Some(TextStyle::Red),
            "92" => Some(TextStyle::Green),
            "38;5;82" => Some(TextStyle::HealthGreen),
            "38;5;120" => Some(TextStyle::ItemGreen),
            "95" => Some(TextStyle::Purple),
            "38;5;213" => Some(TextStyle::Pink),
            _ => None,
        }
    }

    /// SGR escape sequence opening this style.
    pub fn sgr(self) -> &'static str {
        match self {
            TextStyle::Blue => "\x1b[38;5;39m",
            TextStyle::Yellow => "\x1b[93m",
            TextStyle::Orange => "\x1b[38;5;208m",
            TextStyle::Red => "\x1b[91m",
            TextStyle::Green => "\x1b[92m",
            TextStyle::HealthGreen => "\x1b[38;5;82m",
            TextStyle::ItemGreen => "\x1b[38;5;120m",
            TextStyle::Purple => "\x1b[95m",
            TextStyle::Pink => "\x1b[38;5;213m",
        }
    }
}

/// One run of text under a single (possibly absent) style.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextSpan {
    pub style: Option<TextStyle>,
    pub text: String,
}

/// Decoded screen text as an ordered span list.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StyledText {
    pub spans: Vec<TextSpan>,
}

impl StyledText {
    /// The text with all styling dropped.
    pub fn plain(&self) -> String {
        self.spans.iter().map(|span| span.text.as_str()).collect()
    }

    /// True when no span carries a style.
    pub fn is_unstyled(&self) -> bool {
        self.spans.iter().all(|span| span.style.is_none())
    }
}

/// Decode engine screen text into a styled span list.
///
/// Pure and deterministic. Carriage returns are dropped, non-SGR control
/// sequences are stripped, unrecognized SGR codes leave the current style
/// untouched, a reset with no open span is a no-op, and a span still open at
/// end of input is closed cleanly.
pub fn decode(input: &str) -> StyledText {
    let mut spans = Vec::new();
    let mut current: Option<TextStyle> = None;
    let mut buffer = String::new();
    let mut chars = input.chars().peekable();

    let flush = |buffer: &mut String, style: Option<TextStyle>, spans: &mut Vec<TextSpan>| {
        if !buffer.is_empty() {
            spans.push(TextSpan {
                style,
                text: std::mem::take(buffer),
            });
        }
    };

    while let Some(ch) = chars.next() {
        match ch {
            '\r' => {}
            '\x1b' if chars.peek() == Some(&'[') => {
                chars.next();
                let mut params = String::new();
                let mut terminator = None;
                for seq_ch in chars.by_ref() {
                    if seq_ch.is_ascii_digit() || seq_ch == ';' {
                        params.push(seq_ch);
                    } else {
                        terminator = Some(seq_ch);
                        break;
                    }
                }

                // Only SGR sequences affect styling; cursor and clear codes
                // (and a dangling escape at end of input) are dropped.
                if terminator == Some('m') {
                    if params == "0" || params.is_empty() {
                        if current.is_some() {
                            flush(&mut buffer, current, &mut spans);
                            current = None;
                        }
                    } else if let Some(style) = TextStyle::from_sgr(&params) {
                        flush(&mut buffer, current, &mut spans);
                        current = Some(style);
                    }
                }
            }
            _ => buffer.push(ch),
        }
    }

    flush(&mut buffer, current, &mut spans);
    StyledText { spans }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_passes_through() {
        let decoded = decode("just words");
        assert_eq!(decoded.spans.len(), 1);
        assert_eq!(decoded.spans[0].style, None);
        assert_eq!(decoded.plain(), "just words");
    }

    #[test]
    fn recognized_color_opens_span_until_reset() {
        let decoded = decode("a \x1b[93mwolf\x1b[0m howls");
        assert_eq!(
            decoded.spans,
            vec![
                TextSpan {
                    style: None,
                    text: "a ".to_string()
                },
                TextSpan {
                    style: Some(TextStyle::Yellow),
                    text: "wolf".to_string()
                },
                TextSpan {
                    style: None,
                    text: " howls".to_string()
                },
            ]
        );
    }

    #[test]
    fn unterminated_span_closes_at_end_of_input() {
        let decoded = decode("\x1b[91mdanger");
        assert_eq!(decoded.spans.len(), 1);
        assert_eq!(decoded.spans[0].style, Some(TextStyle::Red));
        assert_eq!(decoded.plain(), "danger");
    }

    #[test]
    fn reset_without_open_span_is_noop() {
        let decoded = decode("\x1b[0mplain\x1b[0m");
        assert_eq!(decoded.plain(), "plain");
        assert!(decoded.is_unstyled());
    }

    #[test]
    fn unrecognized_sgr_leaves_text_plain() {
        let decoded = decode("\x1b[7mreverse\x1b[0m video");
        assert_eq!(decoded.plain(), "reverse video");
        assert!(decoded.is_unstyled());
    }

    #[test]
    fn cursor_and_clear_sequences_are_stripped() {
        let decoded = decode("\x1b[2J\x1b[Hhello\r\n");
        assert_eq!(decoded.plain(), "hello\n");
    }

    #[test]
    fn new_color_closes_previous_span() {
        let decoded = decode("\x1b[93mwolf\x1b[91mwitch\x1b[0m");
        assert_eq!(decoded.spans.len(), 2);
        assert_eq!(decoded.spans[0].style, Some(TextStyle::Yellow));
        assert_eq!(decoded.spans[1].style, Some(TextStyle::Red));
    }

    #[test]
    fn decode_is_idempotent_on_decoded_text() {
        let raw = "a \x1b[93mwolf\x1b[0m and \x1b[95mrelic\x1b[2Kend";
        let once = decode(raw);
        let twice = decode(&once.plain());
        assert_eq!(twice.plain(), once.plain());
        assert!(twice.is_unstyled());
    }
}
