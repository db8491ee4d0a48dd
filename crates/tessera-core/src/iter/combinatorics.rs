///
/// Cartesian
///
/// Lazy lexicographic cartesian product. Dimensions are materialized on the
/// first pull; the last dimension varies fastest.
///

pub struct Cartesian<I: IntoIterator> {
    pending: Option<Vec<I>>,
    dimensions: Vec<Vec<I::Item>>,
    indices: Vec<usize>,
    exhausted: bool,
}

impl<I> Cartesian<I>
where
    I: IntoIterator,
    I::Item: Clone,
{
    // Materialize every dimension; an empty dimension empties the product.
    fn materialize(&mut self, producers: Vec<I>) {
        self.dimensions = producers
            .into_iter()
            .map(|producer| producer.into_iter().collect())
            .collect();
        self.indices = vec![0; self.dimensions.len()];
        self.exhausted = self.dimensions.iter().any(Vec::is_empty);
    }

    fn current(&self) -> Vec<I::Item> {
        self.dimensions
            .iter()
            .zip(&self.indices)
            .map(|(dimension, &index)| dimension[index].clone())
            .collect()
    }

    // Odometer step; marks the product exhausted after the last tuple.
    fn advance(&mut self) {
        for position in (0..self.indices.len()).rev() {
            self.indices[position] += 1;
            if self.indices[position] < self.dimensions[position].len() {
                return;
            }
            self.indices[position] = 0;
        }
        self.exhausted = true;
    }
}

impl<I> Iterator for Cartesian<I>
where
    I: IntoIterator,
    I::Item: Clone,
{
    type Item = Vec<I::Item>;

    fn next(&mut self) -> Option<Vec<I::Item>> {
        if let Some(producers) = self.pending.take() {
            self.materialize(producers);
        }
        if self.exhausted {
            return None;
        }

        let tuple = self.current();
        self.advance();

        Some(tuple)
    }
}

/// Cartesian product of `producers`. Zero producers yield one empty tuple.
#[must_use]
pub fn cartesian<I>(producers: impl IntoIterator<Item = I>) -> Cartesian<I>
where
    I: IntoIterator,
    I::Item: Clone,
{
    Cartesian {
        pending: Some(producers.into_iter().collect()),
        dimensions: Vec::new(),
        indices: Vec::new(),
        exhausted: false,
    }
}

///
/// Permutations
///
/// Every ordering of a collection, generated in place by Heap's algorithm.
///

pub struct Permutations<T> {
    items: Vec<T>,
    counters: Vec<usize>,
    index: usize,
    started: bool,
}

impl<T: Clone> Iterator for Permutations<T> {
    type Item = Vec<T>;

    fn next(&mut self) -> Option<Vec<T>> {
        if !self.started {
            self.started = true;
            return Some(self.items.clone());
        }

        while self.index < self.items.len() {
            let i = self.index;
            if self.counters[i] < i {
                if i % 2 == 0 {
                    self.items.swap(0, i);
                } else {
                    self.items.swap(self.counters[i], i);
                }
                self.counters[i] += 1;
                self.index = 1;
                return Some(self.items.clone());
            }
            self.counters[i] = 0;
            self.index += 1;
        }

        None
    }
}

/// All `n!` orderings of `collection`. An empty collection yields one empty
/// permutation.
#[must_use]
pub fn permutation<T: Clone>(collection: impl IntoIterator<Item = T>) -> Permutations<T> {
    let items: Vec<T> = collection.into_iter().collect();
    let counters = vec![0; items.len()];

    Permutations {
        items,
        counters,
        index: 1,
        started: false,
    }
}
