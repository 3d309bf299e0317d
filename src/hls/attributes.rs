use std::ops::Range;

/// One `NAME=VALUE` entry of an HLS attribute list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute<'a> {
    pub name: &'a str,
    /// Value with surrounding quotes removed.
    pub value: &'a str,
    pub quoted: bool,
    /// Byte range of `value` within the parsed attribute list.
    pub value_span: Range<usize>,
}

/// Split an attribute list (the part after `#EXT-X-FOO:`) into attributes.
///
/// Commas inside quoted strings do not separate attributes. Entries without
/// `=` are skipped.
pub fn parse(list: &str) -> Vec<Attribute<'_>> {
    let mut attrs = Vec::new();
    let mut start = 0;
    let mut in_quotes = false;

    for (i, c) in list.char_indices() {
        match c {
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => {
                push_attribute(list, start..i, &mut attrs);
                start = i + 1;
            }
            _ => {}
        }
    }

    if start < list.len() {
        push_attribute(list, start..list.len(), &mut attrs);
    }

    attrs
}

/// Find an attribute by name (case-insensitive).
pub fn find<'a>(list: &'a str, name: &str) -> Option<Attribute<'a>> {
    parse(list)
        .into_iter()
        .find(|attr| attr.name.eq_ignore_ascii_case(name))
}

fn push_attribute<'a>(list: &'a str, span: Range<usize>, attrs: &mut Vec<Attribute<'a>>) {
    let entry = &list[span.clone()];
    let Some(eq) = entry.find('=') else {
        return;
    };

    let name = entry[..eq].trim();
    if name.is_empty() {
        return;
    }

    let raw = &entry[eq + 1..];
    let leading = raw.len() - raw.trim_start().len();
    let mut start = span.start + eq + 1 + leading;
    let mut end = start + raw.trim().len();

    let value = &list[start..end];
    let quoted = value.len() >= 2 && value.starts_with('"') && value.ends_with('"');
    if quoted {
        start += 1;
        end -= 1;
    }

    attrs.push(Attribute {
        name,
        value: &list[start..end],
        quoted,
        value_span: start..end,
    });
}
