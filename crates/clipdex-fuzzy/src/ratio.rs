//! Longest-matching-block similarity between two strings.
//!
//! The longest common run of characters is matched first, then the same
//! search repeats on the unmatched text to its left and to its right. The
//! ratio is `2 * matched / (len_a + len_b)`. When several runs share the
//! longest length, the one starting earliest in `a` (then in `b`) wins.

/// A run of `size` equal characters at `a[a_start..]` and `b[b_start..]`.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct MatchBlock {
    pub a_start: usize,
    pub b_start: usize,
    pub size: usize,
}

/// Similarity in `[0, 1]`; two empty strings are identical.
pub fn similarity_ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }
    let matched: usize = matching_blocks(&a, &b).iter().map(|m| m.size).sum();
    2.0 * matched as f64 / total as f64
}

/// All matching blocks, ordered by position, with adjacent runs merged.
pub fn matching_blocks<T: PartialEq>(a: &[T], b: &[T]) -> Vec<MatchBlock> {
    let mut pending = vec![(0, a.len(), 0, b.len())];
    let mut blocks = Vec::new();

    while let Some((alo, ahi, blo, bhi)) = pending.pop() {
        let found = longest_match(a, b, alo, ahi, blo, bhi);
        if found.size == 0 {
            continue;
        }
        blocks.push(found);
        if alo < found.a_start && blo < found.b_start {
            pending.push((alo, found.a_start, blo, found.b_start));
        }
        let a_end = found.a_start + found.size;
        let b_end = found.b_start + found.size;
        if a_end < ahi && b_end < bhi {
            pending.push((a_end, ahi, b_end, bhi));
        }
    }

    blocks.sort_by_key(|m| (m.a_start, m.b_start));
    let mut merged: Vec<MatchBlock> = Vec::with_capacity(blocks.len());
    for block in blocks {
        if let Some(last) = merged.last_mut()
            && last.a_start + last.size == block.a_start
            && last.b_start + last.size == block.b_start
        {
            last.size += block.size;
            continue;
        }
        merged.push(block);
    }
    merged
}

fn longest_match<T: PartialEq>(
    a: &[T],
    b: &[T],
    alo: usize,
    ahi: usize,
    blo: usize,
    bhi: usize,
) -> MatchBlock {
    let mut best = MatchBlock {
        a_start: alo,
        b_start: blo,
        size: 0,
    };
    // run_len[j + 1] = length of the common run ending at a[i - 1], b[j].
    let mut prev = vec![0usize; b.len() + 1];
    let mut cur = vec![0usize; b.len() + 1];

    for i in alo..ahi {
        for j in blo..bhi {
            cur[j + 1] = if a[i] == b[j] { prev[j] + 1 } else { 0 };
            let k = cur[j + 1];
            if k > best.size {
                best = MatchBlock {
                    a_start: i + 1 - k,
                    b_start: j + 1 - k,
                    size: k,
                };
            }
        }
        std::mem::swap(&mut prev, &mut cur);
        cur[blo..=bhi].fill(0);
    }
    best
}
