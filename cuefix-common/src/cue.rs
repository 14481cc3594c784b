//! Cue range parsing
//!
//! A cue is a free-text `"<start>-<end>"` string in the CSV, where `end` may be
//! the literal word `end` (any case). The word maps to a configured sentinel
//! because each output flavor uses a different ceiling.

/// Parsed start/end pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CueRange {
    pub start: i64,
    pub end: i64,
}

/// Classification of a raw cue cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CueOutcome {
    /// Empty or whitespace-only: no timing information supplied
    Empty,
    /// Well-formed range
    Parsed(CueRange),
    /// Non-empty but not in the expected shape
    Malformed,
}

impl CueOutcome {
    /// The parsed range, if any
    pub fn range(self) -> Option<CueRange> {
        match self {
            CueOutcome::Parsed(range) => Some(range),
            CueOutcome::Empty | CueOutcome::Malformed => None,
        }
    }
}

/// Cue parser bound to a flavor's end sentinel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CueParser {
    end_sentinel: i64,
}

impl CueParser {
    pub fn new(end_sentinel: i64) -> Self {
        Self { end_sentinel }
    }

    pub fn end_sentinel(&self) -> i64 {
        self.end_sentinel
    }

    /// Parse a cue; anything that is not a well-formed range is `None`
    pub fn parse(&self, raw: &str) -> Option<CueRange> {
        self.classify(raw).range()
    }

    /// Classify a cue cell as empty, parsed or malformed
    ///
    /// Exactly one `-` separator is accepted. Both halves are trimmed. The
    /// start must be a non-negative integer; the end is an integer or `end`.
    /// Values are not range-checked (`end < start` passes).
    pub fn classify(&self, raw: &str) -> CueOutcome {
        if raw.trim().is_empty() {
            return CueOutcome::Empty;
        }

        let mut parts = raw.split('-');
        let (Some(start), Some(end), None) = (parts.next(), parts.next(), parts.next()) else {
            return CueOutcome::Malformed;
        };

        let Ok(start) = start.trim().parse::<i64>() else {
            return CueOutcome::Malformed;
        };

        let end = end.trim();
        let end = if end.eq_ignore_ascii_case("end") {
            self.end_sentinel
        } else {
            match end.parse::<i64>() {
                Ok(value) => value,
                Err(_) => return CueOutcome::Malformed,
            }
        };

        CueOutcome::Parsed(CueRange { start, end })
    }
}

/// Parse `raw` with the given end sentinel
pub fn parse_cue(raw: &str, end_sentinel: i64) -> Option<CueRange> {
    CueParser::new(end_sentinel).parse(raw)
}
