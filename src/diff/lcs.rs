//! Longest-common-subsequence alignment for sequence diffs.
//!
//! Sequences are aligned by computing their LCS and then walking both sides,
//! emitting one aligned pair per element. Elements on the subsequence come
//! out as unchanged pairs; everything else is a deletion, a creation, or —
//! when both heads are object-like — a paired in-place update, so two
//! similar objects diff as one update row instead of a delete/create pair.

/// Walk `before` and `after` in aligned order, calling `emit` once per
/// covered position.
///
/// The callback receives `(before_index, after_index)`; `None` on a side
/// means the element does not exist there (a pure creation or deletion).
/// Unchanged elements and paired object updates receive both indices.
pub fn process<T, O, F>(before: &[T], after: &[T], is_obj: O, mut emit: F)
where
    T: PartialEq,
    O: Fn(&T) -> bool,
    F: FnMut(Option<usize>, Option<usize>),
{
    let seq = lcs(before, after);

    let mut before_ix = 0;
    let mut after_ix = 0;
    let mut lcs_ix = 0;
    while before_ix < before.len() || after_ix < after.len() || lcs_ix < seq.len() {
        // Step through the before values until we hit the next item on the
        // subsequence, emitting deletions or paired object updates. The
        // subsequence item is compared by value, so duplicate elements
        // match at their earliest position.
        while before_ix < before.len()
            && (lcs_ix >= seq.len() || before[before_ix] != before[seq[lcs_ix].0])
        {
            let object_pair = is_obj(&before[before_ix])
                && after_ix < after.len()
                && is_obj(&after[after_ix])
                && (lcs_ix >= seq.len() || after[after_ix] != before[seq[lcs_ix].0]);
            if object_pair {
                emit(Some(before_ix), Some(after_ix));
                before_ix += 1;
                after_ix += 1;
                continue;
            }

            emit(Some(before_ix), None);
            before_ix += 1;
        }

        // Step through the after values until the next subsequence item;
        // these are all creations.
        while after_ix < after.len()
            && (lcs_ix >= seq.len() || after[after_ix] != before[seq[lcs_ix].0])
        {
            emit(None, Some(after_ix));
            after_ix += 1;
        }

        // Finally the item in common, as unchanged.
        if lcs_ix < seq.len() {
            emit(Some(before_ix), Some(after_ix));
            before_ix += 1;
            after_ix += 1;
            lcs_ix += 1;
        }
    }
}

/// Compute the longest common subsequence of `xs` and `ys` as index pairs.
fn lcs<T: PartialEq>(xs: &[T], ys: &[T]) -> Vec<(usize, usize)> {
    if xs.is_empty() || ys.is_empty() {
        return Vec::new();
    }

    let w = xs.len();
    let mut lengths = vec![0usize; xs.len() * ys.len()];
    // Equality tests can be expensive, so cache them.
    let mut eqs = vec![false; xs.len() * ys.len()];

    for y in 0..ys.len() {
        for x in 0..xs.len() {
            if xs[x] == ys[y] {
                eqs[w * y + x] = true;
                // One longer than the cell at top left, since we would
                // append a new item to the sequence here.
                lengths[w * y + x] = if x == 0 || y == 0 {
                    1
                } else {
                    lengths[w * (y - 1) + (x - 1)] + 1
                };
            } else {
                // Follow the longer of the sequences above and to the left.
                let left = if x > 0 { lengths[w * y + x - 1] } else { 0 };
                let up = if y > 0 { lengths[w * (y - 1) + x] } else { 0 };
                lengths[w * y + x] = left.max(up);
            }
        }
    }

    // Walk back from the bottom right cell, collecting the equal pairs.
    let mut seq = Vec::with_capacity(lengths[lengths.len() - 1]);
    let mut x = xs.len() as isize - 1;
    let mut y = ys.len() as isize - 1;
    while x >= 0 && y >= 0 {
        let (xi, yi) = (x as usize, y as usize);
        if eqs[w * yi + xi] {
            seq.push((xi, yi));
            x -= 1;
            y -= 1;
        } else {
            let left = if xi > 0 { lengths[w * yi + xi - 1] } else { 0 };
            let up = if yi > 0 { lengths[w * (yi - 1) + xi] } else { 0 };
            if left > up {
                x -= 1;
            } else {
                y -= 1;
            }
        }
    }
    seq.reverse();
    seq
}
