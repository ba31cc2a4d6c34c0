//! Translation between a composite's section space and its children's.
//!
//! `counts[k]` is the number of sections child `k` currently has.

use crate::error::{DataSourceError, Result};

/// Outer section index to `(child, inner section index)`.
pub fn map_inside(counts: &[usize], outer: usize) -> Result<(usize, usize)> {
    let mut rest = outer;
    for (child, &count) in counts.iter().enumerate() {
        if rest < count {
            return Ok((child, rest));
        }
        rest -= count;
    }
    Err(DataSourceError::SectionOutOfRange {
        index: outer,
        count: counts.iter().sum(),
    })
}

/// Inner-to-outer section mapping for `child`.
pub fn map_outside(counts: &[usize], child: usize) -> Result<impl Fn(usize) -> usize> {
    if child >= counts.len() {
        return Err(DataSourceError::ChildOutOfRange {
            index: child,
            count: counts.len(),
        });
    }
    let offset: usize = counts[..child].iter().sum();
    Ok(move |inner| inner + offset)
}

/// Sections before `child`; `child == counts.len()` gives the total.
pub fn section_offset(counts: &[usize], child: usize) -> Result<usize> {
    counts
        .get(..child)
        .map(|before| before.iter().sum())
        .ok_or(DataSourceError::ChildOutOfRange {
            index: child,
            count: counts.len(),
        })
}
