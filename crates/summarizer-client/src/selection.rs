use std::collections::BTreeSet;

use crate::error::ClientError;

/// Indices of the hosts chosen for analysis. Iteration follows host-list order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection(BTreeSet<usize>);

impl Selection {
    /// Every index of a list of `len` hosts.
    pub fn all(len: usize) -> Self {
        Selection((0..len).collect())
    }

    pub fn contains(&self, index: usize) -> bool {
        self.0.contains(&index)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.0.iter().copied()
    }

    /// Remove if present, insert otherwise. Returns whether `index` is now selected.
    pub(crate) fn toggle(&mut self, index: usize) -> bool {
        if self.0.remove(&index) {
            false
        } else {
            self.0.insert(index);
            true
        }
    }

    pub(crate) fn clear(&mut self) {
        self.0.clear();
    }
}

/// Parse a list like `0,2-4` into sorted, deduplicated host indices.
pub fn parse_indices(list: &str) -> Result<Vec<usize>, ClientError> {
    let invalid = |part: &str| ClientError::InvalidSelection(part.to_string());
    let mut indices = Vec::new();
    for part in list.split(',').map(|s| s.trim()).filter(|s| !s.is_empty()) {
        if let Some((start, end)) = part.split_once('-') {
            let s: usize = start.trim().parse().map_err(|_| invalid(part))?;
            let e: usize = end.trim().parse().map_err(|_| invalid(part))?;
            if s > e {
                return Err(invalid(part));
            }
            indices.extend(s..=e);
        } else {
            indices.push(part.parse().map_err(|_| invalid(part))?);
        }
    }
    indices.sort_unstable();
    indices.dedup();
    Ok(indices)
}
