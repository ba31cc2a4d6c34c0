//! Exact longest common subsequence via Myers' O(ND) middle-snake bisection.

use crate::heckel::{common_prefix, common_suffix};

/// Returns matched `(old, new)` pairs of one longest common subsequence,
/// ordered by new index.
pub(crate) fn common_subsequence(old: &[usize], new: &[usize]) -> Vec<(usize, usize)> {
    let mut out = Vec::new();
    collect(old, new, 0, 0, &mut out);
    out
}

fn collect(a: &[usize], b: &[usize], a_off: usize, b_off: usize, out: &mut Vec<(usize, usize)>) {
    let prefix = common_prefix(a, b);
    out.extend((0..prefix).map(|k| (a_off + k, b_off + k)));
    let (a, b) = (&a[prefix..], &b[prefix..]);
    let (a_off, b_off) = (a_off + prefix, b_off + prefix);

    let suffix = common_suffix(a, b);
    let (a, b) = (&a[..a.len() - suffix], &b[..b.len() - suffix]);
    middle(a, b, a_off, b_off, out);

    let (a_end, b_end) = (a_off + a.len(), b_off + b.len());
    out.extend((0..suffix).map(|k| (a_end + k, b_end + k)));
}

/// Both slices are non-matching at their first and last positions.
fn middle(a: &[usize], b: &[usize], a_off: usize, b_off: usize, out: &mut Vec<(usize, usize)>) {
    if a.is_empty() || b.is_empty() {
        return;
    }

    // Shorter side contained in the longer one.
    let a_is_long = a.len() > b.len();
    let (long, short) = if a_is_long { (a, b) } else { (b, a) };
    if let Some(idx) = find(long, short) {
        out.extend((0..short.len()).map(|k| {
            if a_is_long {
                (a_off + idx + k, b_off + k)
            } else {
                (a_off + k, b_off + idx + k)
            }
        }));
        return;
    }
    if short.len() == 1 {
        return;
    }

    if let Some((x, y)) = bisect(a, b) {
        collect(&a[..x], &b[..y], a_off, b_off, out);
        collect(&a[x..], &b[y..], a_off + x, b_off + y, out);
    }
}

fn find(haystack: &[usize], needle: &[usize]) -> Option<usize> {
    if needle.len() > haystack.len() {
        return None;
    }
    haystack.windows(needle.len()).position(|w| w == needle)
}

/// Finds the middle snake and returns the split point in `(a, b)`.
fn bisect(a: &[usize], b: &[usize]) -> Option<(usize, usize)> {
    let n = a.len() as isize;
    let m = b.len() as isize;
    let max_d = (n + m + 1) / 2 + 1;
    let v_offset = max_d;
    let v_len = 2 * max_d;

    let mut v1: Vec<isize> = vec![-1; v_len as usize];
    let mut v2: Vec<isize> = vec![-1; v_len as usize];
    v1[(v_offset + 1) as usize] = 0;
    v2[(v_offset + 1) as usize] = 0;

    let delta = n - m;
    // Odd delta: the forward path detects the overlap.
    let front = delta % 2 != 0;

    let mut k1start = 0isize;
    let mut k1end = 0isize;
    let mut k2start = 0isize;
    let mut k2end = 0isize;

    for d in 0..max_d {
        // Forward path
        let mut k1 = -d + k1start;
        while k1 <= d - k1end {
            let k1_offset = (v_offset + k1) as usize;
            let mut x1 = if k1 == -d || (k1 != d && v1[k1_offset - 1] < v1[k1_offset + 1]) {
                v1[k1_offset + 1]
            } else {
                v1[k1_offset - 1] + 1
            };
            let mut y1 = x1 - k1;
            while x1 < n && y1 < m && a[x1 as usize] == b[y1 as usize] {
                x1 += 1;
                y1 += 1;
            }
            v1[k1_offset] = x1;
            if x1 > n {
                k1end += 2;
            } else if y1 > m {
                k1start += 2;
            } else if front {
                let k2_offset = v_offset + delta - k1;
                if (0..v_len).contains(&k2_offset) && v2[k2_offset as usize] != -1 {
                    let x2 = n - v2[k2_offset as usize];
                    if x1 >= x2 {
                        return Some((x1 as usize, y1 as usize));
                    }
                }
            }
            k1 += 2;
        }

        // Reverse path
        let mut k2 = -d + k2start;
        while k2 <= d - k2end {
            let k2_offset = (v_offset + k2) as usize;
            let mut x2 = if k2 == -d || (k2 != d && v2[k2_offset - 1] < v2[k2_offset + 1]) {
                v2[k2_offset + 1]
            } else {
                v2[k2_offset - 1] + 1
            };
            let mut y2 = x2 - k2;
            while x2 < n && y2 < m && a[(n - 1 - x2) as usize] == b[(m - 1 - y2) as usize] {
                x2 += 1;
                y2 += 1;
            }
            v2[k2_offset] = x2;
            if x2 > n {
                k2end += 2;
            } else if y2 > m {
                k2start += 2;
            } else if !front {
                let k1_offset = v_offset + delta - k2;
                if (0..v_len).contains(&k1_offset) && v1[k1_offset as usize] != -1 {
                    let x1 = v1[k1_offset as usize];
                    let y1 = v_offset + x1 - k1_offset;
                    if x1 >= n - x2 {
                        return Some((x1 as usize, y1 as usize));
                    }
                }
            }
            k2 += 2;
        }
    }

    None
}
