use std::collections::VecDeque;

/// Bounded FIFO of recent samples. The oldest sample is evicted on overflow.
#[derive(Debug, Clone)]
pub struct History<T> {
    samples: VecDeque<T>,
    capacity: usize,
}

impl<T> History<T> {
    pub fn new(capacity: usize) -> Self {
        Self {
            samples: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append a sample. Returns the evicted sample when the buffer was full.
    pub fn push(&mut self, sample: T) -> Option<T> {
        if self.capacity == 0 {
            return Some(sample);
        }
        let evicted = if self.samples.len() == self.capacity {
            self.samples.pop_front()
        } else {
            None
        };
        self.samples.push_back(sample);
        evicted
    }

    /// Iterate from oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.samples.iter()
    }

    pub fn oldest(&self) -> Option<&T> {
        self.samples.front()
    }

    pub fn newest(&self) -> Option<&T> {
        self.samples.back()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }
}

impl<T: Clone> History<T> {
    /// Copy the samples out, oldest first.
    pub fn to_vec(&self) -> Vec<T> {
        self.samples.iter().cloned().collect()
    }
}
