use std::collections::VecDeque;

type Part<'a, T> = Box<dyn Iterator<Item = T> + 'a>;

///
/// Linked
///
/// Lazy concatenation: drains each part in turn and drops it once
/// exhausted.
///

pub struct Linked<'a, T> {
    parts: VecDeque<Part<'a, T>>,
}

impl<'a, T> Linked<'a, T> {
    #[must_use]
    pub fn new<I>(parts: impl IntoIterator<Item = I>) -> Self
    where
        I: IntoIterator<Item = T>,
        I::IntoIter: 'a,
    {
        Self {
            parts: parts
                .into_iter()
                .map(|part| Box::new(part.into_iter()) as Part<'a, T>)
                .collect(),
        }
    }

    /// Append one more part behind the current ones.
    #[must_use]
    pub fn then<I>(mut self, part: I) -> Self
    where
        I: IntoIterator<Item = T>,
        I::IntoIter: 'a,
    {
        self.parts.push_back(Box::new(part.into_iter()));
        self
    }
}

impl<T> Iterator for Linked<'_, T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        loop {
            let front = self.parts.front_mut()?;
            if let Some(item) = front.next() {
                return Some(item);
            }
            self.parts.pop_front();
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.parts.iter().fold((0, Some(0)), |(lo, hi), part| {
            let (part_lo, part_hi) = part.size_hint();
            (
                lo.saturating_add(part_lo),
                hi.zip(part_hi).and_then(|(a, b)| a.checked_add(b)),
            )
        })
    }
}

/// Concatenate `parts` lazily.
#[must_use]
pub fn link<'a, T, I>(parts: impl IntoIterator<Item = I>) -> Linked<'a, T>
where
    I: IntoIterator<Item = T>,
    I::IntoIter: 'a,
{
    Linked::new(parts)
}
