use std::num::NonZeroUsize;

/// Slots between the window start and the spotlight, when the window is wide enough
const SPOTLIGHT_OFFSET: usize = 2;

/// Where the visible window sits over the ordered list for one run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowSelection {
    /// Stored position after clamping; the spotlight rank for this run
    pub position: usize,
    pub start: usize,
    pub end: usize,
    /// Position to store for the next run
    pub next_position: usize,
}

impl WindowSelection {
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Spotlight index relative to the window start, if it falls inside
    pub fn spotlight_offset(&self) -> Option<usize> {
        let offset = self.position.checked_sub(self.start)?;
        (offset < self.len()).then_some(offset)
    }

    pub fn window<'a, T>(&self, ordered: &'a [T]) -> &'a [T] {
        &ordered[self.start..self.end]
    }

    pub fn spotlight<'a, T>(&self, ordered: &'a [T]) -> Option<&'a T> {
        self.spotlight_offset()
            .and_then(|offset| self.window(ordered).get(offset))
    }
}

/// Clamp a stored position into `[0, len)`; anything out of range restarts at 0
pub fn clamp_position(position: usize, len: usize) -> usize {
    if position < len {
        position
    } else {
        0
    }
}

/// Compute this run's window over `len` ordered items
///
/// The spotlight sits two slots in when the window allows it. Near the end of
/// the list the window slides left so it stays full rather than centered.
/// Returns `None` for an empty list, in which case nothing should be stored.
pub fn select_window(len: usize, window: NonZeroUsize, stored_position: usize) -> Option<WindowSelection> {
    if len == 0 {
        return None;
    }
    let window = window.get();
    let position = clamp_position(stored_position, len);

    let offset = SPOTLIGHT_OFFSET.min(window / 2);
    let mut start = position.saturating_sub(offset);
    let end = (start + window).min(len);
    if end - start < window && start > 0 {
        start = end.saturating_sub(window);
    }

    let next_position = if position + 1 >= len { 0 } else { position + 1 };

    Some(WindowSelection {
        position,
        start,
        end,
        next_position,
    })
}
