//! Cycle and depth tracking for recursive glyph traversal.

use std::ops::{Deref, DerefMut};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum DecyclerError {
    DepthLimitExceeded,
    CycleDetected,
}

/// Tracks the chain of nodes entered during a depth first traversal.
///
/// The chain lives in a fixed size array indexed by depth, so the traversal
/// depth is limited to `D`. Entering a node that is already on the chain is
/// a cycle.
pub(crate) struct Decycler<T, const D: usize> {
    chain: [T; D],
    depth: usize,
}

impl<T, const D: usize> Decycler<T, D>
where
    T: Copy + PartialEq + Default,
{
    pub fn new() -> Self {
        Self {
            chain: [T::default(); D],
            depth: 0,
        }
    }

    /// Pushes `node` onto the chain.
    ///
    /// The returned guard pops it again when dropped and derefs to the
    /// decycler, so it can be handed to the traversal of the node's children.
    pub fn enter(&mut self, node: T) -> Result<DecyclerGuard<'_, T, D>, DecyclerError> {
        if self.chain[..self.depth].contains(&node) {
            return Err(DecyclerError::CycleDetected);
        }
        if self.depth == D {
            return Err(DecyclerError::DepthLimitExceeded);
        }
        self.chain[self.depth] = node;
        self.depth += 1;
        Ok(DecyclerGuard { decycler: self })
    }

    #[cfg(test)]
    pub fn depth(&self) -> usize {
        self.depth
    }
}

pub(crate) struct DecyclerGuard<'a, T, const D: usize> {
    decycler: &'a mut Decycler<T, D>,
}

impl<T, const D: usize> Deref for DecyclerGuard<'_, T, D> {
    type Target = Decycler<T, D>;

    fn deref(&self) -> &Self::Target {
        self.decycler
    }
}

impl<T, const D: usize> DerefMut for DecyclerGuard<'_, T, D> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.decycler
    }
}

impl<T, const D: usize> Drop for DecyclerGuard<'_, T, D> {
    fn drop(&mut self) {
        self.decycler.depth -= 1;
    }
}
