//! Heckel's linear-time matching (CACM 21(4), 1978) over element classes.

/// Returns matched `(old, new)` pairs ordered by new index.
pub(crate) fn matches(old: &[usize], new: &[usize]) -> Vec<(usize, usize)> {
    let mut links = Links::new(old.len(), new.len());

    let prefix = common_prefix(old, new);
    for k in 0..prefix {
        links.link(k, k);
    }
    let suffix = common_suffix(&old[prefix..], &new[prefix..]);
    let old_end = old.len() - suffix;
    let new_end = new.len() - suffix;
    for k in 0..suffix {
        links.link(old_end + k, new_end + k);
    }

    // Pass 1-3: occurrence table over the unmatched middle.
    let classes = old.iter().chain(new).copied().max().map_or(0, |c| c + 1);
    let mut table = vec![Entry::default(); classes];
    for (i, &class) in old.iter().enumerate().take(old_end).skip(prefix) {
        table[class].old_count += 1;
        table[class].old_pos = i;
    }
    for &class in &new[prefix..new_end] {
        table[class].new_count += 1;
    }

    // Pass 4: elements occurring exactly once on both sides.
    for (j, &class) in new.iter().enumerate().take(new_end).skip(prefix) {
        let entry = &table[class];
        if entry.old_count == 1 && entry.new_count == 1 {
            links.link(entry.old_pos, j);
        }
    }

    // Pass 5-6: grow matches into equal neighbours.
    loop {
        let mut grew = false;
        for j in 0..new.len().saturating_sub(1) {
            if let Some(i) = links.new[j] {
                if i + 1 < old.len() && links.free(i + 1, j + 1) && old[i + 1] == new[j + 1] {
                    links.link(i + 1, j + 1);
                    grew = true;
                }
            }
        }
        for j in (1..new.len()).rev() {
            if let Some(i) = links.new[j] {
                if i > 0 && links.free(i - 1, j - 1) && old[i - 1] == new[j - 1] {
                    links.link(i - 1, j - 1);
                    grew = true;
                }
            }
        }
        if !grew {
            break;
        }
    }

    links
        .new
        .iter()
        .enumerate()
        .filter_map(|(j, link)| link.map(|i| (i, j)))
        .collect()
}

pub(crate) fn common_prefix(a: &[usize], b: &[usize]) -> usize {
    a.iter().zip(b).take_while(|(x, y)| x == y).count()
}

pub(crate) fn common_suffix(a: &[usize], b: &[usize]) -> usize {
    a.iter()
        .rev()
        .zip(b.iter().rev())
        .take_while(|(x, y)| x == y)
        .count()
}

#[derive(Debug, Clone, Copy, Default)]
struct Entry {
    old_count: usize,
    new_count: usize,
    old_pos: usize,
}

struct Links {
    old: Vec<Option<usize>>,
    new: Vec<Option<usize>>,
}

impl Links {
    fn new(old_len: usize, new_len: usize) -> Self {
        Self {
            old: vec![None; old_len],
            new: vec![None; new_len],
        }
    }

    fn link(&mut self, i: usize, j: usize) {
        self.old[i] = Some(j);
        self.new[j] = Some(i);
    }

    fn free(&self, i: usize, j: usize) -> bool {
        self.old[i].is_none() && self.new[j].is_none()
    }
}
