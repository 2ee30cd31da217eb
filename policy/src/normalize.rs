//! Folding applied before escalation matching and guardrail rewriting, so that
//! "LAWSUIT" and "law\u{200B}suit" hit the same trigger as "lawsuit".

fn is_zero_width(ch: char) -> bool {
    matches!(ch, '\u{200B}' | '\u{200C}' | '\u{200D}' | '\u{2060}' | '\u{FEFF}')
}

/// Folded form of `s`: control and zero-width chars removed, lowercased.
pub fn for_rules(s: &str) -> String {
    chars_with_spans(s).0.into_iter().collect()
}

/// Normalized character view of `s` along with the original byte span of each
/// produced char. Characters removed by normalization emit no entries; chars
/// that lowercase to several codepoints share one span.
pub fn chars_with_spans(s: &str) -> (Vec<char>, Vec<(usize, usize)>) {
    let mut chars = Vec::with_capacity(s.len());
    let mut spans = Vec::with_capacity(s.len());
    for (start, ch) in s.char_indices() {
        if ch.is_control() {
            continue;
        }
        let end = start + ch.len_utf8();
        for lc in ch.to_lowercase() {
            if is_zero_width(lc) {
                continue;
            }
            chars.push(lc);
            spans.push((start, end));
        }
    }
    (chars, spans)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn folded_string_matches_span_view() {
        let raw = "Law\u{200B}SUIT\u{0007} filed";
        let (chars, _) = chars_with_spans(raw);
        assert_eq!(for_rules(raw), chars.into_iter().collect::<String>());
        assert_eq!(for_rules(raw), "lawsuit filed");
    }

    #[test]
    fn strips_zero_width_and_lowercases() {
        assert_eq!(for_rules("Fa\u{200B}KE"), "fake");
    }

    #[test]
    fn spans_point_back_into_original() {
        let (chars, spans) = chars_with_spans("Ab\u{200B}c");
        assert_eq!(chars, vec!['a', 'b', 'c']);
        assert_eq!(spans, vec![(0, 1), (1, 2), (5, 6)]);
    }
}
