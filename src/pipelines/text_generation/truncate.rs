const SENTENCE_ENDERS: &[char] = &['.', '!', '?'];
const CLOSERS: &[char] = &['"', '\'', ')', '\u{201D}', '\u{2019}'];

/// Cut `text` after its last complete sentence.
///
/// A sentence ends at `.`, `!` or `?`, together with any closing quotes or
/// brackets right after it, and only where whitespace or the end of the
/// text follows. A dot inside "3.5" does not count. Text with no sentence
/// end comes back whole.
pub fn truncate_to_sentence(text: &str) -> &str {
    let mut cut = None;
    for (i, c) in text.char_indices() {
        if !SENTENCE_ENDERS.contains(&c) {
            continue;
        }
        let rest = &text[i + c.len_utf8()..];
        let closers: usize = rest
            .chars()
            .take_while(|c| CLOSERS.contains(c))
            .map(char::len_utf8)
            .sum();
        let end = i + c.len_utf8() + closers;
        if text[end..].chars().next().map_or(true, char::is_whitespace) {
            cut = Some(end);
        }
    }
    cut.map_or(text, |end| &text[..end])
}
