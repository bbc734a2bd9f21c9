use serde::Serialize;

/// Handle to one server slot in the interlock.
///
/// The generation changes every time a one-shot unit is replaced, so a
/// handle held by a replaced unit is rejected instead of acting on its
/// successor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct ServerId {
    pub index: usize,
    pub generation: u64,
}

impl ServerId {
    pub fn new(index: usize, generation: u64) -> Self {
        Self { index, generation }
    }

    pub fn next_generation(&self) -> Self {
        Self {
            index: self.index,
            generation: self.generation + 1,
        }
    }
}

impl std::fmt::Display for ServerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}.{}", self.index, self.generation)
    }
}
