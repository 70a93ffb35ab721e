// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::errors::SequenceWarning;
use crate::sequence::{Element, Repeat, Segment, Sequence};

const INFINITE_REPEAT: &str = "inf";

/// Parses a complete sequence string.
///
/// A single top-level group is the sequence itself; anything else is
/// wrapped in an implicit group played once.
pub(super) fn parse(text: &str) -> (Sequence, Vec<SequenceWarning>) {
    let mut warnings = Vec::new();
    let mut segments = parse_segments(text, 0, &mut warnings);
    let sequence = match segments.as_slice() {
        [Segment::Group(_)] => match segments.pop() {
            Some(Segment::Group(sequence)) => sequence,
            _ => Sequence::default(),
        },
        _ => Sequence::new(Repeat::Times(1), segments),
    };
    (sequence, warnings)
}

/// Splits `text` into segments with a single brace-depth scan.
///
/// At depth 0, a `{` opens a group whose repeat prefix is the text since
/// the previous segment; `,` (or a stray `}`) ends a bare element.
fn parse_segments(text: &str, base: usize, warnings: &mut Vec<SequenceWarning>) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut depth = 0usize;
    let mut chunk_start = 0usize;
    let mut group_open = 0usize;

    for (index, ch) in text.char_indices() {
        match ch {
            '{' => {
                if depth == 0 {
                    group_open = index;
                }
                depth += 1;
            }
            '}' if depth == 0 => {
                warnings.push(SequenceWarning::UnbalancedClose {
                    offset: base + index,
                });
                push_element(&mut segments, &text[chunk_start..index], warnings);
                chunk_start = index + 1;
            }
            '}' => {
                depth -= 1;
                if depth == 0 {
                    let repeat = parse_repeat(&text[chunk_start..group_open], warnings);
                    let body = &text[group_open + 1..index];
                    let children = parse_segments(body, base + group_open + 1, warnings);
                    segments.push(Segment::Group(Sequence::new(repeat, children)));
                    chunk_start = index + 1;
                }
            }
            ',' if depth == 0 => {
                push_element(&mut segments, &text[chunk_start..index], warnings);
                chunk_start = index + 1;
            }
            _ => {}
        }
    }

    if depth > 0 {
        warnings.push(SequenceWarning::UnclosedGroup { depth });
        let repeat = parse_repeat(&text[chunk_start..group_open], warnings);
        let body = &text[group_open + 1..];
        let children = parse_segments(body, base + group_open + 1, warnings);
        segments.push(Segment::Group(Sequence::new(repeat, children)));
    } else {
        push_element(&mut segments, &text[chunk_start..], warnings);
    }
    segments
}

fn parse_repeat(text: &str, warnings: &mut Vec<SequenceWarning>) -> Repeat {
    let text = text.trim();
    if text.is_empty() {
        return Repeat::Times(1);
    }
    if text == INFINITE_REPEAT {
        return Repeat::Infinite;
    }
    match text.parse::<i64>() {
        Ok(n) if n < 0 => Repeat::Infinite,
        Ok(n) if n > 0 => Repeat::Times(u32::try_from(n).unwrap_or(u32::MAX)),
        _ => {
            warnings.push(SequenceWarning::MalformedRepeat(text.to_string()));
            Repeat::Times(1)
        }
    }
}

fn push_element(segments: &mut Vec<Segment>, text: &str, warnings: &mut Vec<SequenceWarning>) {
    let text = text.trim();
    if text.is_empty() {
        return;
    }
    let fields: Vec<&str> = text.split(';').map(str::trim).collect();
    if fields.len() > 3 {
        warnings.push(SequenceWarning::ExtraFields(text.to_string()));
    }

    let start = parse_number(fields[0], "start", warnings);
    let duration_ms = match fields.get(1).filter(|field| !field.is_empty()) {
        None => None,
        Some(field) => parse_duration(field, warnings),
    };
    let end = match fields.get(2).filter(|field| !field.is_empty()) {
        Some(field) => parse_number(field, "end", warnings),
        None => start,
    };

    segments.push(Segment::Element(Element {
        start,
        duration_ms,
        end,
    }));
}

fn parse_number(text: &str, field: &'static str, warnings: &mut Vec<SequenceWarning>) -> f64 {
    match text.parse::<f64>() {
        Ok(value) if value.is_finite() => value,
        _ => {
            warnings.push(SequenceWarning::MalformedNumber {
                field,
                text: text.to_string(),
            });
            0.0
        }
    }
}

/// Negative durations mean "hold forever".
fn parse_duration(text: &str, warnings: &mut Vec<SequenceWarning>) -> Option<u64> {
    let millis = text
        .parse::<i64>()
        .ok()
        .or_else(|| text.parse::<f64>().ok().filter(|v| v.is_finite()).map(|v| v as i64));
    match millis {
        Some(ms) if ms < 0 => None,
        Some(ms) => Some(ms as u64),
        None => {
            warnings.push(SequenceWarning::MalformedNumber {
                field: "duration",
                text: text.to_string(),
            });
            Some(0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn element_field_counts() {
        let cases = [
            ("{40}", Element::hold(40.0)),
            ("{5;200}", Element::ramp(5.0, 200, 5.0)),
            ("{0;1000;100}", Element::ramp(0.0, 1000, 100.0)),
            ("{7;-1}", Element::hold(7.0)),
            ("{ 1 ; 10 ; 2 }", Element::ramp(1.0, 10, 2.0)),
        ];
        for (text, expected) in cases {
            let (sequence, warnings) = parse(text);
            assert!(warnings.is_empty(), "{}: {:?}", text, warnings);
            assert_eq!(sequence.segments, vec![Segment::Element(expected)], "{}", text);
        }
    }

    #[test]
    fn repeat_prefixes() {
        let cases = [
            ("{1}", Repeat::Times(1)),
            ("3{1}", Repeat::Times(3)),
            ("inf{1}", Repeat::Infinite),
            ("-1{1}", Repeat::Infinite),
        ];
        for (text, expected) in cases {
            assert_eq!(parse(text).0.repeat, expected, "{}", text);
        }
    }

    #[test]
    fn malformed_numbers_read_as_zero_with_warnings() {
        let (sequence, warnings) = parse("{abc;1000;x}");
        assert_eq!(sequence.segments, vec![Segment::Element(Element::ramp(0.0, 1000, 0.0))]);
        assert_eq!(
            warnings,
            vec![
                SequenceWarning::MalformedNumber { field: "start", text: "abc".to_string() },
                SequenceWarning::MalformedNumber { field: "end", text: "x".to_string() },
            ]
        );

        let (sequence, warnings) = parse("zz{1}");
        assert_eq!(sequence.repeat, Repeat::Times(1));
        assert_eq!(warnings, vec![SequenceWarning::MalformedRepeat("zz".to_string())]);

        let (_, warnings) = parse("{1;soon;2}");
        assert_eq!(
            warnings,
            vec![SequenceWarning::MalformedNumber { field: "duration", text: "soon".to_string() }]
        );
    }

    #[test]
    fn unbalanced_braces_are_tolerated() {
        let (sequence, warnings) = parse("{0;100;10");
        assert_eq!(sequence.segments, vec![Segment::Element(Element::ramp(0.0, 100, 10.0))]);
        assert_eq!(warnings, vec![SequenceWarning::UnclosedGroup { depth: 1 }]);

        let (sequence, warnings) = parse("5}");
        assert_eq!(sequence.segments, vec![Segment::Element(Element::hold(5.0))]);
        assert_eq!(warnings, vec![SequenceWarning::UnbalancedClose { offset: 1 }]);
    }

    #[test]
    fn extra_fields_are_ignored() {
        let (sequence, warnings) = parse("{0;10;1;99}");
        assert_eq!(sequence.segments, vec![Segment::Element(Element::ramp(0.0, 10, 1.0))]);
        assert_eq!(warnings, vec![SequenceWarning::ExtraFields("0;10;1;99".to_string())]);
    }

    #[test]
    fn sibling_groups_and_bare_elements() {
        let (sequence, warnings) = parse("{2{0;10;1},5;20;6,{9}}");
        assert!(warnings.is_empty());
        assert_eq!(
            sequence.segments,
            vec![
                Segment::Group(Sequence::new(Repeat::Times(2), vec![Segment::Element(Element::ramp(0.0, 10, 1.0))])),
                Segment::Element(Element::ramp(5.0, 20, 6.0)),
                Segment::Group(Sequence::new(Repeat::Times(1), vec![Segment::Element(Element::hold(9.0))])),
            ]
        );
    }
}
