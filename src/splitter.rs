use crate::{
    capacity::ErrorCorrection,
    error::{Error, Result},
};
use tracing::{debug, trace, warn};

/// Widest UTF-8 encoding of a single character.
const MIN_BUDGET: usize = 4;

/// A contiguous part of the input text, mapped to exactly one QR symbol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    /// Position in the sequence (1-based)
    pub index: usize,

    /// Number of segments the text was split into
    pub total: usize,

    /// Slice of the original text carried by this segment
    pub payload: String,
}

impl Segment {
    /// Creates a new segment.
    #[must_use]
    pub fn new(index: usize, total: usize, payload: impl Into<String>) -> Self {
        Self {
            index,
            total,
            payload: payload.into(),
        }
    }

    /// Returns true if this segment carries an `[i/n]` marker.
    #[must_use]
    pub const fn is_marked(&self) -> bool {
        self.total > 1
    }

    /// Returns the `[i/n]\n` marker, if any.
    #[must_use]
    pub fn marker(&self) -> Option<String> {
        self.is_marked()
            .then(|| format!("[{}/{}]\n", self.index, self.total))
    }

    /// Returns the text that goes into the QR symbol (marker included).
    #[must_use]
    pub fn text(&self) -> String {
        match self.marker() {
            Some(marker) => marker + &self.payload,
            None => self.payload.clone(),
        }
    }

    /// UTF-8 length of the payload alone.
    #[must_use]
    pub fn payload_bytes(&self) -> usize {
        self.payload.len()
    }

    /// UTF-8 length of the encoded text, marker included.
    #[must_use]
    pub fn text_bytes(&self) -> usize {
        self.marker().map_or(0, |m| m.len()) + self.payload.len()
    }
}

/// Splits text into UTF-8-safe segments that fit a byte budget.
#[derive(Debug, Clone, Copy)]
pub struct Splitter {
    budget: usize,
    symbol_limit: Option<usize>,
}

impl Splitter {
    /// Creates a splitter with an explicit byte budget.
    ///
    /// # Errors
    ///
    /// Returns an error if the budget cannot hold one character of every width.
    pub fn new(budget: usize) -> Result<Self> {
        if budget < MIN_BUDGET {
            return Err(Error::config(format!(
                "segment budget must be at least {MIN_BUDGET} bytes, got {budget}"
            )));
        }

        Ok(Self {
            budget,
            symbol_limit: None,
        })
    }

    /// Creates a splitter using the capacity budget of an error-correction level.
    #[must_use]
    pub const fn for_level(level: ErrorCorrection) -> Self {
        Self {
            budget: level.capacity(),
            symbol_limit: Some(level.symbol_limit()),
        }
    }

    /// Returns the payload budget in bytes.
    #[must_use]
    pub const fn budget(&self) -> usize {
        self.budget
    }

    /// Splits text into segments.
    ///
    /// # Algorithm
    ///
    /// 1. Text within the budget is returned verbatim as one unmarked segment
    /// 2. Otherwise windows of `budget` bytes are cut from the front, each
    ///    shortened until it ends on a character boundary
    /// 3. Every segment of a multi-part result gets an `[i/n]\n` marker
    ///
    /// Markers are added after partitioning and are not counted against the
    /// budget. Empty text yields a single empty segment.
    #[must_use]
    pub fn split(&self, text: &str) -> Vec<Segment> {
        let payloads: Vec<&str> = self.windows(text).collect();
        let total = payloads.len();

        let segments: Vec<Segment> = payloads
            .into_iter()
            .enumerate()
            .map(|(i, payload)| Segment::new(i + 1, total, payload))
            .collect();

        self.log_split_results(text, &segments);

        segments
    }

    /// Returns the number of segments [`split`](Self::split) would produce.
    #[must_use]
    pub fn count(&self, text: &str) -> usize {
        self.windows(text).count()
    }

    fn windows<'a>(&self, text: &'a str) -> Windows<'a> {
        Windows {
            rest: text,
            budget: self.budget,
            done: false,
        }
    }

    /// Logs results of the splitting operation.
    fn log_split_results(&self, text: &str, segments: &[Segment]) {
        debug!(
            "Split {} bytes into {} segment(s) (budget {} bytes)",
            text.len(),
            segments.len(),
            self.budget
        );

        for segment in segments.iter().filter(|s| s.is_marked()) {
            let bytes = segment.text_bytes();
            trace!(
                "Segment {}/{}: {} payload bytes, {} with marker",
                segment.index,
                segment.total,
                segment.payload_bytes(),
                bytes
            );

            match self.symbol_limit {
                Some(limit) if bytes > limit => warn!(
                    "Segment {}/{} is {} bytes with its marker, above the {} byte symbol limit",
                    segment.index, segment.total, bytes, limit
                ),
                _ if bytes > self.budget => warn!(
                    "Segment {}/{} marker pushes it {} bytes past the budget",
                    segment.index,
                    segment.total,
                    bytes - self.budget
                ),
                _ => {}
            }
        }
    }
}

/// Iterator over budget-sized, boundary-corrected slices of a text.
struct Windows<'a> {
    rest: &'a str,
    budget: usize,
    done: bool,
}

impl<'a> Iterator for Windows<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<&'a str> {
        if self.done {
            return None;
        }

        if self.rest.len() <= self.budget {
            self.done = true;
            return Some(self.rest);
        }

        // budget >= MIN_BUDGET, so a boundary exists before reaching 0
        let mut end = self.budget;
        while !self.rest.is_char_boundary(end) {
            end -= 1;
        }

        let (head, tail) = self.rest.split_at(end);
        self.rest = tail;
        Some(head)
    }
}

/// Joins scanned segment texts back into the original text.
///
/// Parts may be given in any order. A single part without a marker is
/// returned as is.
///
/// # Errors
///
/// Returns an error if the parts are unmarked, disagree on the total,
/// repeat an index, or leave an index missing.
pub fn reassemble<S: AsRef<str>>(parts: &[S]) -> Result<String> {
    if let [only] = parts {
        if parse_marker(only.as_ref()).is_none() {
            return Ok(only.as_ref().to_owned());
        }
    }

    if parts.is_empty() {
        return Err(Error::invalid_segment("no parts given"));
    }

    let mut slots: Vec<Option<&str>> = Vec::new();

    for part in parts {
        let (index, total, payload) = parse_marker(part.as_ref())
            .ok_or_else(|| Error::invalid_segment("part is missing its [i/n] marker"))?;

        if slots.is_empty() {
            if total > parts.len() {
                return Err(Error::invalid_segment(format!(
                    "expected {total} parts, got {}",
                    parts.len()
                )));
            }
            slots = vec![None; total];
        } else if total != slots.len() {
            return Err(Error::invalid_segment(format!(
                "parts disagree on the total ({} vs {total})",
                slots.len()
            )));
        }

        let slot = &mut slots[index - 1];
        if slot.is_some() {
            return Err(Error::invalid_segment(format!(
                "part {index}/{total} appears more than once"
            )));
        }
        *slot = Some(payload);
    }

    let missing: Vec<String> = slots
        .iter()
        .enumerate()
        .filter(|(_, slot)| slot.is_none())
        .map(|(i, _)| (i + 1).to_string())
        .collect();

    if !missing.is_empty() {
        return Err(Error::invalid_segment(format!(
            "missing part(s) {}",
            missing.join(", ")
        )));
    }

    Ok(slots.into_iter().flatten().collect())
}

/// Parses a leading `[i/n]\n` marker into `(i, n, payload)`.
fn parse_marker(text: &str) -> Option<(usize, usize, &str)> {
    let (header, payload) = text.strip_prefix('[')?.split_once("]\n")?;
    let (index, total) = header.split_once('/')?;

    if !index.bytes().chain(total.bytes()).all(|b| b.is_ascii_digit()) {
        return None;
    }

    let index: usize = index.parse().ok()?;
    let total: usize = total.parse().ok()?;

    (total > 1 && (1..=total).contains(&index)).then_some((index, total, payload))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{self, Write};
    use std::sync::{Arc, Mutex};

    fn payloads(segments: &[Segment]) -> String {
        segments.iter().map(|s| s.payload.as_str()).collect()
    }

    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

    impl Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn warnings_while_splitting(splitter: Splitter, text: &str) -> String {
        let logs = CapturedLogs::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::WARN)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();

        tracing::subscriber::with_default(subscriber, || splitter.split(text));

        let bytes = logs.0.lock().unwrap().clone();
        String::from_utf8(bytes).unwrap()
    }

    #[test]
    fn test_marker_past_budget_is_warned() {
        let splitter = Splitter::new(10).unwrap();

        let logs = warnings_while_splitting(splitter, &"a".repeat(20));
        assert!(logs.contains("WARN"));
        assert!(logs.contains("Segment 1/2 marker pushes it 6 bytes past the budget"));
        assert!(logs.contains("Segment 2/2"));

        assert!(warnings_while_splitting(splitter, &"a".repeat(10)).is_empty());
    }

    #[test]
    fn test_short_text_is_single_unmarked_segment() {
        let splitter = Splitter::for_level(ErrorCorrection::Medium);
        let segments = splitter.split("Hello, World!");

        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0], Segment::new(1, 1, "Hello, World!"));
        assert_eq!(segments[0].text(), "Hello, World!");
        assert!(segments[0].marker().is_none());
    }

    #[test]
    fn test_budget_boundary_at_medium() {
        let splitter = Splitter::for_level(ErrorCorrection::Medium);

        let exact = "a".repeat(2300);
        assert_eq!(splitter.split(&exact).len(), 1);
        assert_eq!(splitter.split(&exact)[0].text(), exact);

        let over = "a".repeat(2301);
        let segments = splitter.split(&over);
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].payload_bytes(), 2300);
        assert_eq!(segments[1].payload, "a");
    }

    #[test]
    fn test_ascii_count_at_high() {
        let splitter = Splitter::for_level(ErrorCorrection::High);
        let text = "x".repeat(5000);
        let segments = splitter.split(&text);

        assert_eq!(segments.len(), 5);
        for segment in &segments[..4] {
            assert_eq!(segment.payload_bytes(), 1200);
            assert!(segment.text().starts_with(&format!("[{}/5]\n", segment.index)));
        }
        assert_eq!(segments[4].payload_bytes(), 200);
        assert_eq!(segments[4].text(), format!("[5/5]\n{}", "x".repeat(200)));
        assert_eq!(payloads(&segments), text);
    }

    #[test]
    fn test_never_cuts_inside_a_character() {
        // 3-byte characters against a budget that is not a multiple of 3
        let splitter = Splitter::new(10).unwrap();
        let text = "你好世界和平万岁";
        let segments = splitter.split(text);

        for segment in &segments {
            assert!(!segment.payload.is_empty());
            assert!(segment.payload_bytes() <= 10);
            assert_eq!(segment.payload_bytes() % 3, 0);
        }
        assert_eq!(payloads(&segments), text);
    }

    #[test]
    fn test_boundary_correction_never_truncates() {
        // Windows shrink to 9 bytes. 24 bytes still fit in ceil(24/10) = 3,
        // 30 bytes need a fourth window beyond ceil(30/10) = 3.
        let splitter = Splitter::new(10).unwrap();
        let text = "你好世界和平万岁";

        let segments = splitter.split(text);
        assert_eq!(segments.len(), 3);
        assert_eq!(payloads(&segments), text);

        let text = "你好世界和平万岁你好";
        let segments = splitter.split(text);
        assert_eq!(segments.len(), 4);
        assert!(segments.iter().all(|s| s.total == 4));
        assert_eq!(payloads(&segments), text);
    }

    #[test]
    fn test_mixed_width_text_reconstructs() {
        let splitter = Splitter::new(7).unwrap();
        let text = "añ€😀b😀€ña".repeat(13);
        let segments = splitter.split(&text);

        assert!(segments.len() > 1);
        assert_eq!(payloads(&segments), text);
        assert_eq!(splitter.count(&text), segments.len());
    }

    #[test]
    fn test_empty_text_yields_one_empty_segment() {
        let splitter = Splitter::for_level(ErrorCorrection::Low);
        let segments = splitter.split("");

        assert_eq!(segments, vec![Segment::new(1, 1, "")]);
    }

    #[test]
    fn test_budget_too_small() {
        let err = Splitter::new(3).unwrap_err();
        assert!(err.is_config());
    }

    #[test]
    fn test_marker_is_added_after_budget() {
        let splitter = Splitter::new(8).unwrap();
        let segments = splitter.split("0123456789abcdef");

        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].text(), "[1/2]\n01234567");
        assert_eq!(segments[0].text_bytes(), 14);
        assert!(segments[0].text_bytes() > splitter.budget());
    }

    #[test]
    fn test_reassemble_out_of_order() {
        let splitter = Splitter::new(5).unwrap();
        let text = "the quick brown fox";
        let mut texts: Vec<String> = splitter.split(text).iter().map(Segment::text).collect();
        texts.reverse();

        assert_eq!(reassemble(&texts).unwrap(), text);
    }

    #[test]
    fn test_reassemble_single_unmarked_part() {
        assert_eq!(reassemble(&["[not a marker]"]).unwrap(), "[not a marker]");
    }

    #[test]
    fn test_reassemble_missing_part() {
        let err = reassemble(&["[1/3]\nab", "[3/3]\nef"]).unwrap_err();
        assert!(err.to_string().contains("expected 3 parts"));

        let err = reassemble(&["[1/3]\nab", "[3/3]\nef", "[3/3]\nef"]).unwrap_err();
        assert!(err.to_string().contains("more than once"));
    }

    #[test]
    fn test_reassemble_rejects_mismatched_totals() {
        let err = reassemble(&["[1/2]\nab", "[2/3]\ncd"]).unwrap_err();
        assert!(err.to_string().contains("disagree"));
    }

    #[test]
    fn test_reassemble_rejects_unmarked_part_in_set() {
        assert!(reassemble(&["[1/2]\nab", "cd"]).is_err());
        assert!(reassemble::<&str>(&[]).is_err());
    }

    #[test]
    fn test_parse_marker() {
        assert_eq!(parse_marker("[2/5]\nhello"), Some((2, 5, "hello")));
        assert_eq!(parse_marker("[0/5]\nhello"), None);
        assert_eq!(parse_marker("[6/5]\nhello"), None);
        assert_eq!(parse_marker("[1/1]\nhello"), None);
        assert_eq!(parse_marker("[+1/2]\nhello"), None);
        assert_eq!(parse_marker("[1/2] hello"), None);
    }
}
