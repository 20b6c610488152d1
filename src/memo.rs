/// Single-slot cache for a pure computation: remembers the last input and
/// its output, recomputing only when the input changes.
#[derive(Debug)]
pub struct Memo<K, V> {
    last: Option<(K, V)>,
    computations: u64,
}

impl<K, V> Default for Memo<K, V> {
    fn default() -> Self {
        Self {
            last: None,
            computations: 0,
        }
    }
}

impl<K: PartialEq, V: Clone> Memo<K, V> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_compute(&mut self, key: K, compute: impl FnOnce(&K) -> V) -> V {
        if let Some((last_key, value)) = &self.last {
            if *last_key == key {
                return value.clone();
            }
        }
        let value = compute(&key);
        self.computations += 1;
        self.last = Some((key, value.clone()));
        value
    }

    /// How many times the computation actually ran.
    pub fn computations(&self) -> u64 {
        self.computations
    }

    pub fn invalidate(&mut self) {
        self.last = None;
    }
}
