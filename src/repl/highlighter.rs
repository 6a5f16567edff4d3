//! Syntax highlighter for FHIR search queries
//!
//! Colors the structural pieces of a query as it is typed: the resource
//! path, parameter names, modifiers, and values, with delimiters dimmed.

use nu_ansi_term::{Color, Style};
use reedline::{Highlighter, StyledText};

/// Part of the query currently being scanned
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Segment {
    /// Resource path before `?`
    Path,
    /// Parameter name after `?` or `&`
    Name,
    /// Modifier or chained path after `:`
    Modifier,
    /// Value after `=`
    Value,
}

impl Segment {
    fn style(self) -> Style {
        match self {
            Segment::Path => Color::Cyan.bold().into(),
            Segment::Name => Color::Green.into(),
            Segment::Modifier => Color::Magenta.into(),
            Segment::Value => Color::Yellow.into(),
        }
    }
}

/// Query syntax highlighter
pub struct QueryHighlighter {
    enabled: bool,
}

impl QueryHighlighter {
    /// Create a new highlighter
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }
}

impl Default for QueryHighlighter {
    fn default() -> Self {
        Self::new(true)
    }
}

impl Highlighter for QueryHighlighter {
    fn highlight(&self, line: &str, _cursor: usize) -> StyledText {
        let mut styled = StyledText::new();

        if !self.enabled {
            styled.push((Style::default(), line.to_string()));
            return styled;
        }

        let delimiter_style: Style = Color::DarkGray.into();
        let mut segment = Segment::Path;
        let mut buffer = String::new();

        for ch in line.chars() {
            let next = match (segment, ch) {
                (Segment::Path, '?') => Some(Segment::Name),
                (Segment::Path, '/') => Some(Segment::Path),
                (Segment::Name, ':') => Some(Segment::Modifier),
                (Segment::Name, '=') => Some(Segment::Value),
                (Segment::Modifier, '=') => Some(Segment::Value),
                (Segment::Modifier, '.') => Some(Segment::Modifier),
                (Segment::Value, '&') => Some(Segment::Name),
                (Segment::Value, ',') => Some(Segment::Value),
                _ => None,
            };

            match next {
                Some(next_segment) => {
                    if !buffer.is_empty() {
                        styled.push((segment.style(), buffer.clone()));
                        buffer.clear();
                    }
                    styled.push((delimiter_style, ch.to_string()));
                    segment = next_segment;
                }
                None => buffer.push(ch),
            }
        }

        if !buffer.is_empty() {
            styled.push((segment.style(), buffer));
        }

        styled
    }
}
