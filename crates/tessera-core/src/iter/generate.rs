///
/// Looping
///
/// Yields `seed`, `step(seed)`, `step(step(seed))`, … while `predicate`
/// holds for the value about to be yielded.
///

pub struct Looping<T, P, S> {
    current: Option<T>,
    predicate: P,
    step: S,
}

impl<T, P, S> Iterator for Looping<T, P, S>
where
    P: FnMut(&T) -> bool,
    S: FnMut(&T) -> T,
{
    type Item = T;

    fn next(&mut self) -> Option<T> {
        let current = self.current.take()?;
        if !(self.predicate)(&current) {
            return None;
        }
        self.current = Some((self.step)(&current));

        Some(current)
    }
}

/// Generate values from `seed` by repeated `step` while `predicate` holds.
pub const fn looping<T, P, S>(seed: T, predicate: P, step: S) -> Looping<T, P, S>
where
    P: FnMut(&T) -> bool,
    S: FnMut(&T) -> T,
{
    Looping {
        current: Some(seed),
        predicate,
        step,
    }
}

///
/// Tree
///
/// Lazy depth-first, pre-order walk. Children of a node are requested only
/// when the node itself is yielded.
///

pub struct Tree<T, F, I: IntoIterator<Item = T>> {
    root: Option<T>,
    children: F,
    stack: Vec<I::IntoIter>,
}

impl<T, F, I> Tree<T, F, I>
where
    F: FnMut(&T) -> I,
    I: IntoIterator<Item = T>,
{
    // Push `node`'s children and hand the node back.
    fn visit(&mut self, node: T) -> T {
        let children = (self.children)(&node).into_iter();
        self.stack.push(children);
        node
    }
}

impl<T, F, I> Iterator for Tree<T, F, I>
where
    F: FnMut(&T) -> I,
    I: IntoIterator<Item = T>,
{
    type Item = T;

    fn next(&mut self) -> Option<T> {
        if let Some(root) = self.root.take() {
            return Some(self.visit(root));
        }

        loop {
            let top = self.stack.last_mut()?;
            match top.next() {
                Some(node) => return Some(self.visit(node)),
                None => {
                    self.stack.pop();
                }
            }
        }
    }
}

/// Walk the tree rooted at `root` depth-first, pre-order.
pub fn tree<T, F, I>(root: T, children: F) -> Tree<T, F, I>
where
    F: FnMut(&T) -> I,
    I: IntoIterator<Item = T>,
{
    Tree {
        root: Some(root),
        children,
        stack: Vec::new(),
    }
}
