/// Two equally sized slots used as read-source and write-destination in
/// turn. `current` is the slot the next step reads; the other slot is the
/// one it writes. [`DoubleBuffer::swap`] flips the roles.
#[derive(Debug, Clone)]
pub struct DoubleBuffer<T> {
    slots: [T; 2],
    current: usize,
}

impl<T> DoubleBuffer<T> {
    pub fn new(first: T, second: T) -> Self {
        Self {
            slots: [first, second],
            current: 0,
        }
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn next_index(&self) -> usize {
        self.current ^ 1
    }

    pub fn current(&self) -> &T {
        &self.slots[self.current]
    }

    pub fn current_mut(&mut self) -> &mut T {
        &mut self.slots[self.current]
    }

    pub fn next(&self) -> &T {
        &self.slots[self.next_index()]
    }

    pub fn slot(&self, index: usize) -> &T {
        &self.slots[index & 1]
    }

    /// Splits the pair into the read-only source and the writable destination.
    pub fn current_and_next_mut(&mut self) -> (&T, &mut T) {
        let [first, second] = &mut self.slots;
        if self.current == 0 {
            (first, second)
        } else {
            (second, first)
        }
    }

    pub fn swap(&mut self) {
        self.current ^= 1;
    }
}

impl<T: Clone> DoubleBuffer<T> {
    /// Both slots start with the same contents.
    pub fn mirrored(value: T) -> Self {
        Self::new(value.clone(), value)
    }
}
