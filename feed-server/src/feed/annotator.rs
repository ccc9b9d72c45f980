//! Diff annotator
//!
//! Turns unified diff text into HTML. Deletion and insertion runs are wrapped
//! in line-level spans and, for each deletion run followed by an insertion
//! run, the words that actually changed get a nested highlight.
//!
//! Styling is expressed as [`Annotation`]s: byte ranges over the original
//! text. Rendering walks the text once, opening and closing spans at those
//! offsets and escaping everything in between, so the diff itself is never
//! rewritten.

use std::time::Duration;

use similar::{Algorithm, ChangeTag, TextDiff};

use super::html::escape_into;

/// Deletion/insertion blocks larger than this skip word highlighting
const MAX_HIGHLIGHT_BYTES: usize = 32 * 1024;

/// Upper bound on the time spent diffing one block pair
const HIGHLIGHT_TIMEOUT: Duration = Duration::from_millis(100);

const CLOSE_TAG: &str = "</span>";

/// Markup applied to an annotated range
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Style {
    Removed,
    Added,
    RemovedWord,
    AddedWord,
    Hunk,
}

impl Style {
    fn open_tag(self) -> &'static str {
        match self {
            Style::Removed => r#"<span style="background-color:#ffebe9">"#,
            Style::Added => r#"<span style="background-color:#e6ffec">"#,
            Style::RemovedWord => r#"<span style="background-color:#ffc1c0">"#,
            Style::AddedWord => r#"<span style="background-color:#abf2bc">"#,
            Style::Hunk => r#"<span style="background-color:#ddf4ff">"#,
        }
    }

    /// Line styles enclose word styles when both start at the same offset
    fn depth(self) -> u8 {
        match self {
            Style::Removed | Style::Added | Style::Hunk => 0,
            Style::RemovedWord | Style::AddedWord => 1,
        }
    }
}

/// A styled byte range `[start, end)` over the original text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Annotation {
    pub start: usize,
    pub end: usize,
    pub style: Style,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LineKind {
    Insert,
    Delete,
    Boundary,
}

#[derive(Debug, Clone, Copy)]
struct Line<'a> {
    offset: usize,
    text: &'a str,
}

impl<'a> Line<'a> {
    fn kind(&self) -> LineKind {
        match self.text.as_bytes().first() {
            Some(b'+') => LineKind::Insert,
            Some(b'-') => LineKind::Delete,
            _ => LineKind::Boundary,
        }
    }

    fn is_hunk_header(&self) -> bool {
        self.text.starts_with('@')
    }

    /// Line content without its diff marker or line terminator
    fn content(&self) -> &'a str {
        let body = self.text.get(1..).unwrap_or("");
        body.trim_end_matches(['\n', '\r'])
    }
}

fn split_lines(text: &str) -> Vec<Line<'_>> {
    let mut offset = 0;
    text.split_inclusive('\n')
        .map(|line| {
            let l = Line { offset, text: line };
            offset += line.len();
            l
        })
        .collect()
}

struct Annotator<'a> {
    text: &'a str,
    lines: Vec<Line<'a>>,
    annotations: Vec<Annotation>,
}

impl<'a> Annotator<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            text,
            lines: split_lines(text),
            annotations: Vec::new(),
        }
    }

    /// Byte offset where line `idx` starts; one past the last line is end of input
    fn offset_of(&self, idx: usize) -> usize {
        self.lines
            .get(idx)
            .map(|l| l.offset)
            .unwrap_or(self.text.len())
    }

    fn push(&mut self, start: usize, end: usize, style: Style) {
        if start < end {
            self.annotations.push(Annotation { start, end, style });
        }
    }

    fn run(mut self) -> Vec<Annotation> {
        let mut del_start: Option<usize> = None;
        let mut ins_start: Option<usize> = None;

        for idx in 0..self.lines.len() {
            let line = self.lines[idx];
            match line.kind() {
                LineKind::Delete => {
                    // a deletion after an insertion starts a new pair
                    if ins_start.is_some() {
                        self.close_run(del_start, ins_start, idx, true);
                        ins_start = None;
                        del_start = None;
                    }
                    if del_start.is_none() {
                        del_start = Some(idx);
                    }
                }
                LineKind::Insert => {
                    if ins_start.is_none() {
                        ins_start = Some(idx);
                    }
                }
                LineKind::Boundary => {
                    if del_start.is_some() || ins_start.is_some() {
                        self.close_run(del_start, ins_start, idx, !line.is_hunk_header());
                    }
                    del_start = None;
                    ins_start = None;

                    if line.is_hunk_header() {
                        self.push(line.offset, line.offset + line.text.len(), Style::Hunk);
                    }
                }
            }
        }

        let end = self.lines.len();
        if del_start.is_some() || ins_start.is_some() {
            self.close_run(del_start, ins_start, end, true);
        }

        self.annotations
    }

    /// Wrap the deletion run `[del, ins)` and insertion run `[ins, end)`
    fn close_run(&mut self, del: Option<usize>, ins: Option<usize>, end: usize, highlight: bool) {
        if let Some(d) = del {
            let del_end = ins.unwrap_or(end);
            self.push(self.offset_of(d), self.offset_of(del_end), Style::Removed);
        }
        if let Some(i) = ins {
            self.push(self.offset_of(i), self.offset_of(end), Style::Added);
        }

        if let (Some(d), Some(i), true) = (del, ins, highlight) {
            self.highlight_words(d..i, i..end);
        }
    }

    fn highlight_words(&mut self, deleted: std::ops::Range<usize>, inserted: std::ops::Range<usize>) {
        let old = Block::new(&self.lines[deleted]);
        let new = Block::new(&self.lines[inserted]);
        if old.text.len() + new.text.len() > MAX_HIGHLIGHT_BYTES {
            return;
        }

        let diff = TextDiff::configure()
            .algorithm(Algorithm::Myers)
            .timeout(HIGHLIGHT_TIMEOUT)
            .diff_words(old.text.as_str(), new.text.as_str());

        let mut removed: Vec<(usize, usize)> = Vec::new();
        let mut added: Vec<(usize, usize)> = Vec::new();
        let (mut old_pos, mut new_pos) = (0, 0);

        for change in diff.iter_all_changes() {
            let len = change.value().len();
            match change.tag() {
                ChangeTag::Equal => {
                    old_pos += len;
                    new_pos += len;
                }
                ChangeTag::Delete => {
                    extend_range(&mut removed, old_pos, old_pos + len);
                    old_pos += len;
                }
                ChangeTag::Insert => {
                    extend_range(&mut added, new_pos, new_pos + len);
                    new_pos += len;
                }
            }
        }

        for (start, end) in removed {
            for (s, e) in old.to_absolute(start, end) {
                self.push(s, e, Style::RemovedWord);
            }
        }
        for (start, end) in added {
            for (s, e) in new.to_absolute(start, end) {
                self.push(s, e, Style::AddedWord);
            }
        }
    }
}

fn extend_range(ranges: &mut Vec<(usize, usize)>, start: usize, end: usize) {
    match ranges.last_mut() {
        Some(last) if last.1 == start => last.1 = end,
        _ => ranges.push((start, end)),
    }
}

/// Concatenated marker-stripped content of a run, with a map back to
/// absolute offsets in the original text
struct Block {
    text: String,
    /// (offset in `text`, offset in original, length) per line; line
    /// terminators are in `text` but not covered by any segment
    segments: Vec<(usize, usize, usize)>,
}

impl Block {
    fn new(lines: &[Line<'_>]) -> Self {
        let mut text = String::new();
        let mut segments = Vec::with_capacity(lines.len());
        for line in lines {
            let content = line.content();
            segments.push((text.len(), line.offset + 1, content.len()));
            text.push_str(content);
            text.push('\n');
        }
        Self { text, segments }
    }

    /// Split `[start, end)` of the block text into absolute ranges, one per line
    fn to_absolute(&self, start: usize, end: usize) -> Vec<(usize, usize)> {
        self.segments
            .iter()
            .filter_map(|&(block_start, abs_start, len)| {
                let s = start.max(block_start);
                let e = end.min(block_start + len);
                (s < e).then(|| (abs_start + s - block_start, abs_start + e - block_start))
            })
            .collect()
    }
}

/// Compute line-level and word-level annotations for a unified diff
pub fn annotate(diff: &str) -> Vec<Annotation> {
    Annotator::new(diff).run()
}

/// Line-level annotations only: each `+`, `-` and `@` line styled on its own
pub fn annotate_lines(diff: &str) -> Vec<Annotation> {
    split_lines(diff)
        .into_iter()
        .filter_map(|line| {
            let style = match line.kind() {
                LineKind::Insert => Style::Added,
                LineKind::Delete => Style::Removed,
                LineKind::Boundary if line.is_hunk_header() => Style::Hunk,
                LineKind::Boundary => return None,
            };
            Some(Annotation {
                start: line.offset,
                end: line.offset + line.text.len(),
                style,
            })
        })
        .collect()
}

/// Render `text` as escaped HTML with each annotation wrapped in its markup
///
/// Annotations are ordered by start offset, outer ranges first. A range that
/// would cross the end of its enclosing range is clipped so the output stays
/// well nested. Ranges that are empty, out of bounds or not on character
/// boundaries are ignored.
pub fn render(text: &str, annotations: &[Annotation]) -> String {
    let mut sorted: Vec<Annotation> = annotations
        .iter()
        .copied()
        .filter(|a| {
            a.start < a.end
                && a.end <= text.len()
                && text.is_char_boundary(a.start)
                && text.is_char_boundary(a.end)
        })
        .collect();
    sorted.sort_by(|a, b| {
        a.start
            .cmp(&b.start)
            .then(b.end.cmp(&a.end))
            .then(a.style.depth().cmp(&b.style.depth()))
    });

    let mut out = String::with_capacity(text.len() + text.len() / 4);
    let mut open: Vec<usize> = Vec::new();
    let mut pos = 0;

    for ann in sorted {
        while let Some(&end) = open.last() {
            if end > ann.start {
                break;
            }
            escape_into(&mut out, &text[pos..end]);
            out.push_str(CLOSE_TAG);
            pos = end;
            open.pop();
        }

        escape_into(&mut out, &text[pos..ann.start]);
        pos = ann.start;

        let end = open.last().map_or(ann.end, |&outer| ann.end.min(outer));
        out.push_str(ann.style.open_tag());
        open.push(end);
    }

    while let Some(end) = open.pop() {
        escape_into(&mut out, &text[pos..end]);
        out.push_str(CLOSE_TAG);
        pos = end;
    }
    escape_into(&mut out, &text[pos..]);

    out
}

/// How much of a diff gets highlighted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DiffHighlight {
    /// Line styling plus changed words
    #[default]
    Words,
    /// Line styling only
    Lines,
}

impl DiffHighlight {
    pub fn apply(self, diff: &str) -> String {
        match self {
            DiffHighlight::Words => annotate_diff(diff),
            DiffHighlight::Lines => render_lines(diff),
        }
    }
}

impl std::str::FromStr for DiffHighlight {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "words" => Ok(DiffHighlight::Words),
            "lines" => Ok(DiffHighlight::Lines),
            _ => Err(format!("Unknown diff highlight: {}", s)),
        }
    }
}

/// Full annotation: line styling plus word highlighting, in a `<pre>` block
pub fn annotate_diff(diff: &str) -> String {
    format!("<pre>{}</pre>", render(diff, &annotate(diff)))
}

/// Reduced annotation: line styling only, in a `<pre>` block
pub fn render_lines(diff: &str) -> String {
    format!("<pre>{}</pre>", render(diff, &annotate_lines(diff)))
}
