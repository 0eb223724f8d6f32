pub trait RetainIndexed {
    type Item;
    fn retain_indexed<F>(&mut self, f: F) where F: FnMut(usize, &Self::Item) -> bool;
}

impl<T> RetainIndexed for Vec<T> {
    type Item = T;

    fn retain_indexed<F>(&mut self, mut f: F) where F: FnMut(usize, &Self::Item) -> bool {
        let mut i = 0;
        self.retain(|item| {
            let ret = f(i, item);
            i += 1;
            ret
        });
    }
}

/// construct a vec that maps the old cells to the new ones, or [`usize::MAX`] if it's deleted.
/// `to_delete` must be sorted and free of duplicates
pub fn deletion_mapping(nocells: usize, to_delete: &[usize]) -> Vec<usize> {
    let mut m = Vec::with_capacity(nocells);

    let mut to = 0;
    let mut idel = 0;
    for from in 0..nocells {
        let del = *to_delete.get(idel).unwrap_or(&usize::MAX);
        if from < del {
            m.push(to);
            to += 1;
        } else if from == del {
            m.push(usize::MAX);
            idel += 1;
        } else {
            unreachable!("to_delete isn't sorted")
        }
    }
    debug_assert_eq!(to_delete.len(), m.iter().filter(|&&v| v == usize::MAX).count());
    m
}
