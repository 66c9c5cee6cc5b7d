use super::transaction::EditError;
use std::collections::BTreeSet;
use std::fmt;
use std::ops::Range;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Mark {
    Error,
    Bold,
    Italic,
    Code,
}

impl Mark {
    /// Whether text typed right after the mark continues it.
    pub fn is_inclusive(&self) -> bool {
        !matches!(self, Mark::Error)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Mark::Error => "ErrorMark",
            Mark::Bold => "bold",
            Mark::Italic => "italic",
            Mark::Code => "code",
        }
    }
}

impl fmt::Display for Mark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

pub type MarkSet = BTreeSet<Mark>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Run {
    pub text: String,
    pub marks: MarkSet,
}

impl Run {
    pub fn plain(text: &str) -> Self {
        Self {
            text: text.to_string(),
            marks: MarkSet::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.text.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// A paragraph: runs are kept normalized, never empty and never two
/// neighbours with equal marks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Block {
    runs: Vec<Run>,
}

impl Block {
    pub fn from_runs(runs: Vec<Run>) -> Self {
        let mut block = Self { runs };
        block.normalize();
        block
    }

    pub fn runs(&self) -> &[Run] {
        &self.runs
    }

    pub fn text(&self) -> String {
        self.runs.iter().map(|run| run.text.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.runs.iter().map(Run::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }

    fn cells(&self) -> Vec<(char, MarkSet)> {
        self.runs
            .iter()
            .flat_map(|run| run.text.chars().map(move |ch| (ch, run.marks.clone())))
            .collect()
    }

    fn from_cells(cells: Vec<(char, MarkSet)>) -> Self {
        let mut runs: Vec<Run> = Vec::new();
        for (ch, marks) in cells {
            match runs.last_mut() {
                Some(last) if last.marks == marks => last.text.push(ch),
                _ => runs.push(Run {
                    text: ch.to_string(),
                    marks,
                }),
            }
        }
        Self { runs }
    }

    fn normalize(&mut self) {
        *self = Self::from_cells(self.cells());
    }

    fn map_marks(&mut self, range: Range<usize>, f: impl Fn(&mut MarkSet)) {
        let mut cells = self.cells();
        for (_, marks) in &mut cells[range] {
            f(marks);
        }
        *self = Self::from_cells(cells);
    }

    fn insert(&mut self, at: usize, text: &str, marks: &MarkSet) {
        let mut cells = self.cells();
        let inserted = text.chars().map(|ch| (ch, marks.clone()));
        cells.splice(at..at, inserted);
        *self = Self::from_cells(cells);
    }

    fn remove(&mut self, range: Range<usize>) {
        let mut cells = self.cells();
        cells.drain(range);
        *self = Self::from_cells(cells);
    }

    fn split_off(&mut self, at: usize) -> Block {
        let mut cells = self.cells();
        let tail = cells.split_off(at);
        *self = Self::from_cells(cells);
        Self::from_cells(tail)
    }

    fn marks_at(&self, offset: usize) -> Option<&MarkSet> {
        let mut start = 0;
        for run in &self.runs {
            let end = start + run.len();
            if offset < end {
                return Some(&run.marks);
            }
            start = end;
        }
        None
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedPos {
    pub pos: usize,
    pub block: usize,
    /// Absolute position of the block's first character.
    pub block_start: usize,
    /// Offset of `pos` inside the block's text.
    pub parent_offset: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextNode {
    pub text: String,
    pub marks: MarkSet,
    pub start: usize,
    pub end: usize,
}

impl TextNode {
    pub fn has_mark(&self, mark: Mark) -> bool {
        self.marks.contains(&mark)
    }

    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }
}

/// Ordered block nodes. Each block spans `len + 2` positions: one for its
/// opening boundary, its characters, one for its closing boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    blocks: Vec<Block>,
}

impl Default for Document {
    fn default() -> Self {
        Self {
            blocks: vec![Block::default()],
        }
    }
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_text(text: &str) -> Self {
        let blocks = text
            .split('\n')
            .map(|line| Block::from_runs(vec![Run::plain(line)]))
            .collect();
        Self { blocks }
    }

    pub fn from_blocks(blocks: Vec<Block>) -> Self {
        if blocks.is_empty() {
            return Self::default();
        }
        Self { blocks }
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn block(&self, index: usize) -> Option<&Block> {
        self.blocks.get(index)
    }

    pub fn text(&self) -> String {
        self.blocks
            .iter()
            .map(Block::text)
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn content_size(&self) -> usize {
        self.blocks.iter().map(|block| block.len() + 2).sum()
    }

    pub fn block_start(&self, index: usize) -> Option<usize> {
        if index >= self.blocks.len() {
            return None;
        }
        Some(self.blocks[..index].iter().map(|b| b.len() + 2).sum::<usize>() + 1)
    }

    pub fn end(&self) -> usize {
        self.content_size() - 1
    }

    /// Resolve `pos` to a text position. Block boundaries resolve to `None`.
    pub fn resolve(&self, pos: usize) -> Option<ResolvedPos> {
        let mut block_start = 1;
        for (block, content) in self.blocks.iter().enumerate() {
            let block_end = block_start + content.len();
            if pos < block_start {
                return None;
            }
            if pos <= block_end {
                return Some(ResolvedPos {
                    pos,
                    block,
                    block_start,
                    parent_offset: pos - block_start,
                });
            }
            block_start = block_end + 2;
        }
        None
    }

    /// The text run holding the character right after `pos`.
    pub fn text_node_at(&self, pos: usize) -> Option<TextNode> {
        let resolved = self.resolve(pos)?;
        let block = &self.blocks[resolved.block];
        let mut start = 0;
        for run in block.runs() {
            let end = start + run.len();
            if resolved.parent_offset < end {
                return Some(TextNode {
                    text: run.text.clone(),
                    marks: run.marks.clone(),
                    start: resolved.block_start + start,
                    end: resolved.block_start + end,
                });
            }
            start = end;
        }
        None
    }

    /// The contiguous stretch carrying `mark` around the character after
    /// `pos`, across neighbouring runs whose other marks differ.
    pub fn mark_extent(&self, pos: usize, mark: Mark) -> Option<TextNode> {
        let resolved = self.resolve(pos)?;
        let runs = self.blocks[resolved.block].runs();

        let mut offset = 0;
        let mut hit = None;
        for (index, run) in runs.iter().enumerate() {
            let end = offset + run.len();
            if resolved.parent_offset < end {
                hit = Some((index, offset));
                break;
            }
            offset = end;
        }
        let (index, offset) = hit?;
        if !runs[index].marks.contains(&mark) {
            return None;
        }

        let mut first = index;
        let mut start = offset;
        while first > 0 && runs[first - 1].marks.contains(&mark) {
            first -= 1;
            start -= runs[first].len();
        }
        let mut last = index;
        while last + 1 < runs.len() && runs[last + 1].marks.contains(&mark) {
            last += 1;
        }

        let text: String = runs[first..=last].iter().map(|run| run.text.as_str()).collect();
        let end = start + text.chars().count();
        Some(TextNode {
            text,
            marks: runs[index].marks.clone(),
            start: resolved.block_start + start,
            end: resolved.block_start + end,
        })
    }

    pub fn has_mark(&self, range: Range<usize>, mark: Mark) -> Result<bool, EditError> {
        let segments = self.segments(range)?;
        Ok(segments.into_iter().any(|(block, local)| {
            local
                .clone()
                .any(|offset| self.blocks[block].marks_at(offset).is_some_and(|m| m.contains(&mark)))
        }))
    }

    /// Whether every character in `range` carries `mark`. Empty ranges are not marked.
    pub fn is_fully_marked(&self, range: Range<usize>, mark: Mark) -> Result<bool, EditError> {
        let segments = self.segments(range)?;
        let mut any = false;
        for (block, local) in segments {
            for offset in local {
                any = true;
                if !self.blocks[block]
                    .marks_at(offset)
                    .is_some_and(|m| m.contains(&mark))
                {
                    return Ok(false);
                }
            }
        }
        Ok(any)
    }

    pub fn marked_nodes(&self, mark: Mark) -> Vec<TextNode> {
        let mut nodes = Vec::new();
        let mut block_start = 1;
        for block in &self.blocks {
            let mut start = 0;
            for run in block.runs() {
                let end = start + run.len();
                if run.marks.contains(&mark) {
                    nodes.push(TextNode {
                        text: run.text.clone(),
                        marks: run.marks.clone(),
                        start: block_start + start,
                        end: block_start + end,
                    });
                }
                start = end;
            }
            block_start += block.len() + 2;
        }
        nodes
    }

    pub(crate) fn add_mark(&mut self, range: Range<usize>, mark: Mark) -> Result<(), EditError> {
        for (block, local) in self.segments(range)? {
            self.blocks[block].map_marks(local, |marks| {
                marks.insert(mark);
            });
        }
        Ok(())
    }

    pub(crate) fn remove_mark(&mut self, range: Range<usize>, mark: Mark) -> Result<(), EditError> {
        for (block, local) in self.segments(range)? {
            self.blocks[block].map_marks(local, |marks| {
                marks.remove(&mark);
            });
        }
        Ok(())
    }

    /// Insert typed text at `pos`, continuing the inclusive marks of the preceding character.
    pub(crate) fn insert_text(&mut self, pos: usize, text: &str) -> Result<(), EditError> {
        let resolved = self.resolve(pos).ok_or(EditError::OutOfRange(pos))?;
        if text.contains('\n') {
            return Err(EditError::MultilineText);
        }
        let block = &mut self.blocks[resolved.block];
        let marks = resolved
            .parent_offset
            .checked_sub(1)
            .and_then(|before| block.marks_at(before))
            .map(|marks| marks.iter().copied().filter(Mark::is_inclusive).collect())
            .unwrap_or_default();
        block.insert(resolved.parent_offset, text, &marks);
        Ok(())
    }

    /// Replace `range` with unmarked text. The range must stay inside one block.
    pub(crate) fn replace(&mut self, range: Range<usize>, text: &str) -> Result<(), EditError> {
        if text.contains('\n') {
            return Err(EditError::MultilineText);
        }
        let (block, local) = self.single_segment(range)?;
        let block = &mut self.blocks[block];
        block.remove(local.clone());
        block.insert(local.start, text, &MarkSet::new());
        Ok(())
    }

    pub(crate) fn split_block(&mut self, pos: usize) -> Result<(), EditError> {
        let resolved = self.resolve(pos).ok_or(EditError::OutOfRange(pos))?;
        let tail = self.blocks[resolved.block].split_off(resolved.parent_offset);
        self.blocks.insert(resolved.block + 1, tail);
        Ok(())
    }

    fn single_segment(&self, range: Range<usize>) -> Result<(usize, Range<usize>), EditError> {
        let from = self.resolve(range.start).ok_or(EditError::OutOfRange(range.start))?;
        let to = self.resolve(range.end).ok_or(EditError::OutOfRange(range.end))?;
        if from.block != to.block {
            return Err(EditError::CrossesBlocks(range));
        }
        if from.parent_offset > to.parent_offset {
            return Err(EditError::Inverted(range));
        }
        Ok((from.block, from.parent_offset..to.parent_offset))
    }

    fn segments(&self, range: Range<usize>) -> Result<Vec<(usize, Range<usize>)>, EditError> {
        if range.start > range.end {
            return Err(EditError::Inverted(range));
        }
        if range.end > self.end() {
            return Err(EditError::OutOfRange(range.end));
        }

        let mut segments = Vec::new();
        let mut block_start = 1;
        for (index, block) in self.blocks.iter().enumerate() {
            let block_end = block_start + block.len();
            let lo = range.start.max(block_start);
            let hi = range.end.min(block_end);
            if lo < hi {
                segments.push((index, lo - block_start..hi - block_start));
            }
            block_start = block_end + 2;
        }
        Ok(segments)
    }
}
