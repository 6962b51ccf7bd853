//! Rebuild a table from positioned words, stream style: no ruling lines,
//! only text alignment.
//!
//! Words are grouped into rows by vertical centre. Neighbouring words in a
//! row are joined into cell chunks, and column boundaries come from merging
//! the horizontal spans of every chunk on every page. The boundaries are
//! shared by the whole document, so a column index means the same field on
//! each page even when a page leaves that column blank.

use crate::extraction::{PageWords, RawGrid, Word};
use crate::registry::schema::Rectangle;

/// Two words on the same row belong to one chunk when the gap between them
/// is at most this many average character widths.
const CHUNK_GAP_CHARS: f32 = 1.2;

#[derive(Debug, Clone)]
struct Chunk {
    text: String,
    x_min: f32,
    x_max: f32,
    chars: usize,
}

impl Chunk {
    fn from_word(word: &Word) -> Self {
        Chunk {
            text: word.text.clone(),
            x_min: word.bbox.x_min,
            x_max: word.bbox.x_max,
            chars: word.text.chars().count(),
        }
    }
}

/// Words whose centre lies inside `region`.
pub fn words_in_region<'a>(words: &'a [Word], region: &Rectangle) -> Vec<&'a Word> {
    words
        .iter()
        .filter(|w| region.contains_center_of(&w.bbox))
        .collect()
}

/// One grid per page with text inside `region`, all sharing one set of
/// column boundaries.
pub fn grids_for_pages(pages: &[PageWords], region: &Rectangle) -> Vec<RawGrid> {
    let chunked: Vec<(usize, Vec<Vec<Chunk>>)> = pages
        .iter()
        .map(|page| {
            let rows = group_rows(words_in_region(&page.words, region))
                .iter()
                .map(|r| chunk_row(r))
                .collect::<Vec<_>>();
            (page.page_number, rows)
        })
        .filter(|(_, rows)| !rows.is_empty())
        .collect();

    let spans = column_spans(chunked.iter().flat_map(|(_, rows)| rows));
    chunked
        .into_iter()
        .map(|(page_number, rows)| RawGrid {
            page_number,
            rows: place(&rows, &spans),
        })
        .collect()
}

/// Arrange one set of words into a rectangular grid of cell strings.
pub fn build_grid(words: Vec<&Word>) -> Vec<Vec<String>> {
    let rows: Vec<Vec<Chunk>> = group_rows(words).iter().map(|r| chunk_row(r)).collect();
    let spans = column_spans(&rows);
    place(&rows, &spans)
}

fn place(rows: &[Vec<Chunk>], spans: &[(f32, f32)]) -> Vec<Vec<String>> {
    rows.iter()
        .map(|chunks| {
            let mut cells = vec![String::new(); spans.len()];
            for chunk in chunks {
                let col = spans
                    .iter()
                    .position(|(start, end)| chunk.x_min >= *start && chunk.x_min <= *end)
                    .unwrap_or(spans.len() - 1);
                let cell = &mut cells[col];
                if !cell.is_empty() {
                    cell.push(' ');
                }
                cell.push_str(&chunk.text);
            }
            cells
        })
        .collect()
}

/// Group words into lines, top to bottom, each line sorted left to right.
fn group_rows(mut words: Vec<&Word>) -> Vec<Vec<&Word>> {
    words.sort_by(|a, b| {
        a.bbox
            .y_min
            .total_cmp(&b.bbox.y_min)
            .then(a.bbox.x_min.total_cmp(&b.bbox.x_min))
    });

    let mut rows: Vec<(f32, f32, Vec<&Word>)> = Vec::new();
    for word in words {
        let (_, center_y) = word.bbox.center();
        match rows.last_mut() {
            Some((top, bottom, members)) if center_y >= *top && center_y <= *bottom => {
                *top = top.min(word.bbox.y_min);
                *bottom = bottom.max(word.bbox.y_max);
                members.push(word);
            }
            _ => rows.push((word.bbox.y_min, word.bbox.y_max, vec![word])),
        }
    }

    rows.into_iter()
        .map(|(_, _, mut members)| {
            members.sort_by(|a, b| a.bbox.x_min.total_cmp(&b.bbox.x_min));
            members
        })
        .collect()
}

/// Join adjacent words of one line into chunks.
///
/// The gap allowed between two words scales with their average character
/// width, so an inter-word space joins but a column gutter does not.
fn chunk_row(row: &[&Word]) -> Vec<Chunk> {
    let mut chunks: Vec<Chunk> = Vec::new();
    for word in row {
        let next = Chunk::from_word(word);
        if let Some(last) = chunks.last_mut() {
            let gap = next.x_min - last.x_max;
            let chars = (last.chars + next.chars).max(1) as f32;
            let char_width = ((last.x_max - last.x_min) + (next.x_max - next.x_min)) / chars;
            if gap <= CHUNK_GAP_CHARS * char_width {
                last.text.push(' ');
                last.text.push_str(&next.text);
                last.x_max = last.x_max.max(next.x_max);
                last.chars += next.chars + 1;
                continue;
            }
        }
        chunks.push(next);
    }
    chunks
}

/// Merge the horizontal spans of all chunks into disjoint column intervals.
fn column_spans<'a>(rows: impl IntoIterator<Item = &'a Vec<Chunk>>) -> Vec<(f32, f32)> {
    let mut spans: Vec<(f32, f32)> = rows
        .into_iter()
        .flatten()
        .map(|c| (c.x_min, c.x_max))
        .collect();
    spans.sort_by(|a, b| a.0.total_cmp(&b.0));

    let mut merged: Vec<(f32, f32)> = Vec::new();
    for (start, end) in spans {
        match merged.last_mut() {
            Some((_, last_end)) if start <= *last_end => *last_end = last_end.max(end),
            _ => merged.push((start, end)),
        }
    }
    merged
}
