// src/core/sanitize.rs

/// Decode character references in text or attribute values.
/// Handles the XML five, `&nbsp;`, a few common named entities and numeric
/// references (`&#160;`, `&#xA0;`). Anything unrecognised stays literal.
pub fn normalize_entities(s: &str) -> String {
    if !s.contains('&') {
        return s!(s);
    }
    let mut out = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let tail = &rest[amp..];
        // Entity names are short; don't scan the whole document for a ';'
        let semi = tail.char_indices().take(12).find(|&(_, c)| c == ';').map(|(i, _)| i);
        match semi.and_then(|end| decode_entity(&tail[1..end]).map(|ch| (ch, end))) {
            Some((ch, end)) => {
                out.push(ch);
                rest = &tail[end + 1..];
            }
            None => {
                out.push('&');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

fn decode_entity(name: &str) -> Option<char> {
    if let Some(num) = name.strip_prefix('#') {
        let code = match num.strip_prefix(['x', 'X']) {
            Some(hex) => u32::from_str_radix(hex, 16).ok()?,
            None => num.parse::<u32>().ok()?,
        };
        return char::from_u32(code);
    }
    let ch = match name {
        "amp" => '&',
        "lt" => '<',
        "gt" => '>',
        "quot" => '"',
        "apos" => '\'',
        "nbsp" => '\u{a0}',
        "copy" => '©',
        "reg" => '®',
        "pound" => '£',
        "euro" => '€',
        "yen" => '¥',
        "cent" => '¢',
        "middot" => '·',
        "ndash" => '–',
        "mdash" => '—',
        "hellip" => '…',
        "laquo" => '«',
        "raquo" => '»',
        "thinsp" => '\u{2009}',
        _ => return None,
    };
    Some(ch)
}

/// XPath `normalize-space`: trim, and collapse runs of XML whitespace
/// (space, tab, CR, LF) into one space. `&nbsp;` is kept as is.
pub fn normalize_space(s: &str) -> String {
    s.split([' ', '\t', '\r', '\n'])
        .filter(|w| !w.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Keep only ASCII digits, in order. `"$1,200.50"` → `"120050"`.
pub fn digits_only(s: &str) -> String {
    s.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// True when the fragment has at least one non-whitespace character.
/// `&nbsp;` counts as whitespace here.
pub fn has_content(s: &str) -> bool {
    s.chars().any(|c| !c.is_whitespace())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entities_decode_named_and_numeric() {
        assert_eq!(normalize_entities("a&amp;b"), "a&b");
        assert_eq!(normalize_entities("1&nbsp;200"), "1\u{a0}200");
        assert_eq!(normalize_entities("&#49;&#x32;3"), "123");
        assert_eq!(normalize_entities("&lt;tag&gt;"), "<tag>");
    }

    #[test]
    fn unknown_entities_stay_literal() {
        assert_eq!(normalize_entities("AT&T"), "AT&T");
        assert_eq!(normalize_entities("&bogus; x"), "&bogus; x");
        assert_eq!(normalize_entities("trailing &"), "trailing &");
    }

    #[test]
    fn digits_only_keeps_order() {
        assert_eq!(digits_only("550,234 activities"), "550234");
        assert_eq!(digits_only("12.5"), "125");
        assert_eq!(digits_only("N/A"), "");
    }

    #[test]
    fn nbsp_is_not_content() {
        assert!(!has_content(" \u{a0}\n\t"));
        assert!(has_content(" x "));
    }

    #[test]
    fn normalize_space_collapses_xml_whitespace_only() {
        assert_eq!(normalize_space("  a \t\n b\r\n"), "a b");
        assert_eq!(normalize_space("1\u{a0}200 "), "1\u{a0}200");
        assert_eq!(normalize_space(" \n "), "");
    }
}
