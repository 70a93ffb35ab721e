// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Piecewise value generators.
//!
//! A sequence is written as `[repeat]{segment...}` where each segment is
//! either a nested sequence or an element `start[;duration[;end]]`. Bare
//! elements may also be separated by `,` on input:
//!
//! ```text
//! 2{0;1000;100}                 ramp 0 -> 100 over one second, twice
//! inf{{0;500;100}{100;500;0}}   triangle wave, forever
//! 40                            hold 40 forever
//! ```
//!
//! Evaluation is a pure function of the elapsed milliseconds.

mod mode;
mod parser;

pub use mode::{align_to_period, Mode};

use std::fmt;
use std::ops::{Add, Mul};

use crate::errors::SequenceWarning;

/// Length of a segment in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Duration {
    Finite(u64),
    Infinite,
}

impl Duration {
    /// Milliseconds, or `None` when infinite.
    pub fn as_millis(self) -> Option<u64> {
        match self {
            Duration::Finite(ms) => Some(ms),
            Duration::Infinite => None,
        }
    }
}

impl Add for Duration {
    type Output = Duration;

    fn add(self, rhs: Duration) -> Duration {
        match (self, rhs) {
            (Duration::Finite(a), Duration::Finite(b)) => Duration::Finite(a.saturating_add(b)),
            _ => Duration::Infinite,
        }
    }
}

impl Mul<Repeat> for Duration {
    type Output = Duration;

    fn mul(self, repeat: Repeat) -> Duration {
        match (self, repeat) {
            (Duration::Finite(ms), Repeat::Times(n)) => Duration::Finite(ms.saturating_mul(n as u64)),
            _ => Duration::Infinite,
        }
    }
}

/// How many passes a sequence makes over its children.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Repeat {
    Times(u32),
    Infinite,
}

impl Default for Repeat {
    fn default() -> Self {
        Repeat::Times(1)
    }
}

/// Leaf segment: a linear ramp from `start` to `end`, or a constant hold
/// forever when `duration_ms` is `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub start: f64,
    pub duration_ms: Option<u64>,
    pub end: f64,
}

impl Element {
    pub fn hold(value: f64) -> Self {
        Self {
            start: value,
            duration_ms: None,
            end: value,
        }
    }

    pub fn ramp(start: f64, duration_ms: u64, end: f64) -> Self {
        Self {
            start,
            duration_ms: Some(duration_ms),
            end,
        }
    }

    pub fn duration(&self) -> Duration {
        match self.duration_ms {
            Some(ms) => Duration::Finite(ms),
            None => Duration::Infinite,
        }
    }

    pub fn value_at(&self, elapsed_ms: u64) -> f64 {
        let Some(duration) = self.duration_ms else {
            return self.start;
        };
        if elapsed_ms == 0 {
            self.start
        } else if elapsed_ms >= duration {
            self.end
        } else {
            self.start + (self.end - self.start) * elapsed_ms as f64 / duration as f64
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Segment {
    Group(Sequence),
    Element(Element),
}

impl Segment {
    pub fn duration(&self) -> Duration {
        match self {
            Segment::Group(sequence) => sequence.total_duration(),
            Segment::Element(element) => element.duration(),
        }
    }

    pub fn value_at(&self, elapsed_ms: u64) -> f64 {
        match self {
            Segment::Group(sequence) => sequence.value_at(elapsed_ms),
            Segment::Element(element) => element.value_at(elapsed_ms),
        }
    }

    fn final_value(&self) -> f64 {
        match self {
            Segment::Group(sequence) => sequence.final_value(),
            Segment::Element(element) => element.end,
        }
    }
}

/// Ordered segments played `repeat` times.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Sequence {
    pub repeat: Repeat,
    pub segments: Vec<Segment>,
}

impl Sequence {
    pub fn new(repeat: Repeat, segments: Vec<Segment>) -> Self {
        Self { repeat, segments }
    }

    /// Lenient parse; problems are dropped. See [`Sequence::parse_with_warnings`].
    pub fn parse(text: &str) -> Self {
        parser::parse(text).0
    }

    /// Parses `text`, substituting neutral values for malformed fields and
    /// reporting each substitution.
    pub fn parse_with_warnings(text: &str) -> (Self, Vec<SequenceWarning>) {
        parser::parse(text)
    }

    /// Duration of one pass over the children.
    pub fn pass_duration(&self) -> Duration {
        self.segments
            .iter()
            .fold(Duration::Finite(0), |total, segment| total + segment.duration())
    }

    pub fn total_duration(&self) -> Duration {
        self.pass_duration() * self.repeat
    }

    /// Value after `elapsed_ms` milliseconds. Finite passes wrap, so a
    /// sequence evaluated past its end starts over.
    pub fn value_at(&self, elapsed_ms: u64) -> f64 {
        let mut elapsed = elapsed_ms;
        if let Duration::Finite(pass) = self.pass_duration() {
            if pass > 0 {
                elapsed %= pass;
            }
        }

        let mut offset = 0u64;
        for segment in &self.segments {
            match segment.duration() {
                Duration::Infinite => return segment.value_at(elapsed - offset),
                Duration::Finite(length) => {
                    if elapsed < offset + length {
                        return segment.value_at(elapsed - offset);
                    }
                    offset += length;
                }
            }
        }
        self.final_value()
    }

    fn final_value(&self) -> f64 {
        self.segments.last().map(Segment::final_value).unwrap_or(0.0)
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.duration_ms {
            None => write!(f, "{}", self.start),
            Some(duration) if self.end == self.start => write!(f, "{};{}", self.start, duration),
            Some(duration) => write!(f, "{};{};{}", self.start, duration, self.end),
        }
    }
}

impl fmt::Display for Sequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.repeat {
            Repeat::Times(1) => {}
            Repeat::Times(n) => write!(f, "{}", n)?,
            Repeat::Infinite => f.write_str("inf")?,
        }
        if let [Segment::Element(element)] = self.segments.as_slice() {
            return write!(f, "{{{}}}", element);
        }
        f.write_str("{")?;
        for segment in &self.segments {
            match segment {
                Segment::Group(sequence) => write!(f, "{}", sequence)?,
                Segment::Element(element) => write!(f, "{{{}}}", element)?,
            }
        }
        f.write_str("}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: f64, expected: f64, context: &str) {
        assert!((actual - expected).abs() < 1e-9, "{}: {} != {}", context, actual, expected);
    }

    #[test]
    fn repeated_ramp_wraps() {
        let sequence = Sequence::parse("2{0;1000;100}");
        assert_eq!(sequence.total_duration(), Duration::Finite(2000));

        let cases = [(0, 0.0), (500, 50.0), (1500, 50.0), (2500, 50.0), (999, 99.9)];
        for (elapsed, expected) in cases {
            assert_close(sequence.value_at(elapsed), expected, &format!("t={}", elapsed));
        }
    }

    #[test]
    fn leaves_hit_their_endpoints() {
        let element = Element::ramp(20.0, 400, 80.0);
        assert_close(element.value_at(0), 20.0, "start");
        assert_close(element.value_at(400), 80.0, "end");
        assert_close(element.value_at(10_000), 80.0, "past end");
        assert_close(element.value_at(100), 35.0, "quarter");

        let hold = Element::hold(7.0);
        assert_eq!(hold.duration(), Duration::Infinite);
        assert_close(hold.value_at(123_456), 7.0, "hold");
    }

    #[test]
    fn nested_groups_are_scanned_in_order() {
        let sequence = Sequence::parse("{{0;500;100}{100;500;0}}");
        assert_eq!(sequence.total_duration(), Duration::Finite(1000));

        let cases = [(0, 0.0), (250, 50.0), (500, 100.0), (750, 50.0), (1250, 50.0)];
        for (elapsed, expected) in cases {
            assert_close(sequence.value_at(elapsed), expected, &format!("t={}", elapsed));
        }
    }

    #[test]
    fn finite_repeat_of_nested_group_moves_on() {
        let sequence = Sequence::parse("{3{0;100;10},{50}}");
        assert_eq!(sequence.total_duration(), Duration::Infinite);
        assert_close(sequence.value_at(50), 5.0, "first pass");
        assert_close(sequence.value_at(250), 5.0, "third pass");
        assert_close(sequence.value_at(300), 50.0, "hold after repeats");
        assert_close(sequence.value_at(1_000_000), 50.0, "hold forever");
    }

    #[test]
    fn infinite_repeat_has_infinite_total() {
        let sequence = Sequence::parse("inf{0;1000;100}");
        assert_eq!(sequence.total_duration(), Duration::Infinite);
        assert_eq!(sequence.pass_duration(), Duration::Finite(1000));
        assert_close(sequence.value_at(5_500), 50.0, "wrapped pass");
    }

    #[test]
    fn infinite_repeat_of_an_empty_pass_is_infinite() {
        assert_eq!(Sequence::parse("inf{}").total_duration(), Duration::Infinite);
        assert_eq!(Sequence::parse("3{}").total_duration(), Duration::Finite(0));
        assert_eq!(Duration::Finite(0) * Repeat::Infinite, Duration::Infinite);
    }

    #[test]
    fn empty_sequence_is_zero() {
        let sequence = Sequence::parse("{}");
        assert_eq!(sequence.total_duration(), Duration::Finite(0));
        assert_close(sequence.value_at(42), 0.0, "empty");
    }

    #[test]
    fn display_renders_canonical_text() {
        let cases = [
            ("2{0;1000;100}", "2{0;1000;100}"),
            ("{ {0;500;100} {100;500;0} }", "{{0;500;100}{100;500;0}}"),
            ("{3{0;100;10},{50}}", "{3{0;100;10}{50}}"),
            ("inf{0.5;10;1.5}", "inf{0.5;10;1.5}"),
            ("40", "{40}"),
            ("{5;200}", "{5;200}"),
            ("{5;200;5}", "{5;200}"),
        ];
        for (input, expected) in cases {
            let rendered = Sequence::parse(input).to_string();
            assert_eq!(rendered, expected, "input {}", input);
            assert_eq!(Sequence::parse(&rendered), Sequence::parse(input), "reparse {}", input);
        }

        let siblings = Sequence::parse("{0;100;10,10;100;0}");
        let rendered = siblings.to_string();
        assert_eq!(rendered, "{{0;100;10}{10;100;0}}");
        let reparsed = Sequence::parse(&rendered);
        assert_eq!(reparsed.total_duration(), siblings.total_duration());
        for elapsed in [0, 50, 100, 150, 199] {
            assert_eq!(reparsed.value_at(elapsed), siblings.value_at(elapsed), "t={}", elapsed);
        }
    }
}
