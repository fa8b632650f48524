//! Lexically aware scanning of script text
//!
//! The scanner never parses the script grammar. It only knows where comments
//! and string literals are, so that `@`, parentheses and keywords inside them
//! are ignored when locating annotations, declarations and the class header.

use std::ops::Range;

/// One annotation occurrence in source text: `@Name` or `@a.b.Name(...)`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotationSpan {
    /// Simple or dotted name, without the `@`
    pub name: String,
    /// Byte offset of the `@`
    pub start: usize,
    /// Byte offset just past the name, or past the closing parenthesis
    pub end: usize,
    pub has_arguments: bool,
}

impl AnnotationSpan {
    pub fn text<'a>(&self, source: &'a str) -> &'a str {
        &source[self.start..self.end]
    }

    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }
}

/// Location of the first `class Name` declaration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassHeader {
    pub keyword_start: usize,
    pub name: String,
    pub name_end: usize,
}

/// Mark every byte that is part of code, as opposed to a comment or a string
/// literal (quotes included).
pub fn code_mask(source: &str) -> Vec<bool> {
    let bytes = source.as_bytes();
    let mut mask = vec![true; bytes.len()];
    let mut i = 0;

    if source.starts_with("#!") {
        i = line_end(bytes, 0);
        mask[..i].fill(false);
    }

    while i < bytes.len() {
        let end = match (bytes[i], bytes.get(i + 1)) {
            (b'/', Some(b'/')) => line_end(bytes, i),
            (b'/', Some(b'*')) => block_comment_end(bytes, i),
            (b'\'' | b'"', _) => string_end(bytes, i),
            _ => {
                i += 1;
                continue;
            }
        };
        mask[i..end].fill(false);
        i = end;
    }
    mask
}

fn line_end(bytes: &[u8], from: usize) -> usize {
    bytes[from..]
        .iter()
        .position(|&b| b == b'\n')
        .map_or(bytes.len(), |offset| from + offset)
}

fn block_comment_end(bytes: &[u8], start: usize) -> usize {
    bytes[start + 2..]
        .windows(2)
        .position(|w| w == b"*/")
        .map_or(bytes.len(), |offset| start + 2 + offset + 2)
}

/// End of the string literal opening at `start`. Single-line literals end at
/// the line break when unterminated.
fn string_end(bytes: &[u8], start: usize) -> usize {
    let quote = bytes[start];
    let triple = bytes.get(start + 1) == Some(&quote) && bytes.get(start + 2) == Some(&quote);
    let mut j = start + if triple { 3 } else { 1 };

    while j < bytes.len() {
        match bytes[j] {
            b'\\' => j += 2,
            b if b == quote && !triple => return j + 1,
            b if b == quote && bytes.get(j + 1) == Some(&quote) && bytes.get(j + 2) == Some(&quote) => {
                return j + 3;
            }
            b'\n' if !triple => return j,
            _ => j += 1,
        }
    }
    bytes.len()
}

fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || c == '_' || c == '$'
}

fn is_ident_part(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}

fn char_at(source: &str, i: usize) -> Option<char> {
    source.get(i..)?.chars().next()
}

fn char_before(source: &str, i: usize) -> Option<char> {
    source.get(..i)?.chars().next_back()
}

/// End of the identifier starting at `start`, if there is one
fn identifier_end(source: &str, start: usize) -> Option<usize> {
    let rest = source.get(start..)?;
    if !rest.chars().next().is_some_and(is_ident_start) {
        return None;
    }
    let len = rest.find(|c: char| !is_ident_part(c)).unwrap_or(rest.len());
    Some(start + len)
}

/// End of a dotted identifier starting at `start`, if there is one
fn qualified_name_end(source: &str, start: usize) -> Option<usize> {
    let mut end = identifier_end(source, start)?;
    while char_at(source, end) == Some('.') {
        match identifier_end(source, end + 1) {
            Some(next) => end = next,
            None => break,
        }
    }
    Some(end)
}

/// End of a balanced argument list that follows `from` after horizontal
/// whitespace only
fn argument_end(bytes: &[u8], mask: &[bool], from: usize) -> Option<usize> {
    let mut open = from;
    while matches!(bytes.get(open), Some(b' ' | b'\t')) {
        open += 1;
    }
    if bytes.get(open) != Some(&b'(') || !mask[open] {
        return None;
    }

    let mut depth = 0usize;
    for j in open..bytes.len() {
        if !mask[j] {
            continue;
        }
        match bytes[j] {
            b'(' => depth += 1,
            b')' => {
                depth -= 1;
                if depth == 0 {
                    return Some(j + 1);
                }
            }
            _ => {}
        }
    }
    None
}

/// Find every annotation in code regions, in source order.
///
/// Arguments are skipped as a whole, so annotations nested inside another
/// annotation's arguments are not reported separately. Groovy's `.@field`
/// operator is not an annotation.
pub fn find_annotations(source: &str) -> Vec<AnnotationSpan> {
    let bytes = source.as_bytes();
    let mask = code_mask(source);
    let mut spans = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] != b'@' || !mask[i] || (i > 0 && bytes[i - 1] == b'.') {
            i += 1;
            continue;
        }
        let Some(name_end) = qualified_name_end(source, i + 1) else {
            i += 1;
            continue;
        };
        let name = &source[i + 1..name_end];
        if name == "interface" {
            i = name_end;
            continue;
        }

        let end = argument_end(bytes, &mask, name_end).unwrap_or(name_end);
        spans.push(AnnotationSpan {
            name: name.to_string(),
            start: i,
            end,
            has_arguments: end != name_end,
        });
        i = end;
    }
    spans
}

/// Find the first `class Name` declaration in code regions.
///
/// `Foo.class` literals are not declarations.
pub fn find_class_header(source: &str) -> Option<ClassHeader> {
    let mask = code_mask(source);

    source.match_indices("class").find_map(|(i, keyword)| {
        let after = i + keyword.len();
        let is_keyword = mask[i]
            && !char_before(source, i).is_some_and(|c| is_ident_part(c) || c == '.')
            && char_at(source, after).is_some_and(char::is_whitespace);
        if !is_keyword {
            return None;
        }
        let name_start = source.len() - source[after..].trim_start().len();
        let name_end = identifier_end(source, name_start)?;
        Some(ClassHeader {
            keyword_start: i,
            name: source[name_start..name_end].to_string(),
            name_end,
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(source: &str) -> Vec<String> {
        find_annotations(source).into_iter().map(|s| s.name).collect()
    }

    #[test]
    fn test_code_mask_skips_comments_and_strings() {
        let source = "a // @x\nb /* @y */ 'c' \"\"\"d\n@z\"\"\" e";
        let mask = code_mask(source);
        let code: String = source
            .char_indices()
            .filter(|(i, _)| mask[*i])
            .map(|(_, c)| c)
            .collect();
        assert_eq!(code, "a \nb    e");
    }

    #[test]
    fn test_find_annotations_with_arguments() {
        let source = "@Bootstrap\n@Updater(name = \"a (b\", path = '/x)')\nclass A {}";
        let spans = find_annotations(source);
        assert_eq!(spans.len(), 2);
        assert_eq!(spans[0].text(source), "@Bootstrap");
        assert!(!spans[0].has_arguments);
        assert_eq!(
            spans[1].text(source),
            "@Updater(name = \"a (b\", path = '/x)')"
        );
        assert!(spans[1].has_arguments);
    }

    #[test]
    fn test_find_annotations_ignores_comments_strings_and_field_access() {
        let source = "// @Updater(name='x')\ndef s = \"@Bootstrap\"\nobj.@field = 1\n/* @Updater */\n@Real";
        assert_eq!(names(source), vec!["Real"]);
    }

    #[test]
    fn test_find_annotations_dotted_and_multiline() {
        let source = "@nl.openweb.hippo.groovy.annotations.Updater(\n  name = 'x',\n  batchSize = 5\n)\nclass A {}";
        let spans = find_annotations(source);
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].name, "nl.openweb.hippo.groovy.annotations.Updater");
        assert!(spans[0].text(source).ends_with("batchSize = 5\n)"));
    }

    #[test]
    fn test_arguments_need_same_line() {
        let source = "@Field\n(x)";
        let spans = find_annotations(source);
        assert_eq!(spans[0].end, "@Field".len());

        let unbalanced = "@Grab('a'\nclass A {}";
        assert_eq!(find_annotations(unbalanced)[0].text(unbalanced), "@Grab");
    }

    #[test]
    fn test_find_class_header() {
        let source = "// class Fake\ndef t = Foo.class\nclass  Updater extends Base {\n}";
        let header = find_class_header(source);
        assert_eq!(header.as_ref().map(|h| h.name.as_str()), Some("Updater"));
        assert_eq!(
            header.map(|h| &source[h.keyword_start..h.name_end]),
            Some("class  Updater")
        );
        assert_eq!(find_class_header("def classy = 1"), None);
    }

    #[test]
    fn test_find_class_header_unicode() {
        let source = "@Updater(name = 'ü')\nclass Ärger$1 extends B {}";
        let header = find_class_header(source);
        assert_eq!(header.as_ref().map(|h| h.name.as_str()), Some("Ärger$1"));
        assert_eq!(
            header.map(|h| &source[h.keyword_start..h.name_end]),
            Some("class Ärger$1")
        );

        let glued = "def éclass Fake = 1\nclass Real {}";
        assert_eq!(find_class_header(glued).map(|h| h.name), Some("Real".to_string()));
    }

    #[test]
    fn test_find_annotations_unicode_names() {
        assert_eq!(names("@Größe(x = 1)\n@été class A {}"), vec!["Größe", "été"]);
    }
}
