/// Host capability consulted on every move and finger-up.
///
/// Implementations must be side-effect free from the engine's point of view;
/// the answer may change between calls (e.g. the host learns it reached the
/// last page mid-gesture).
pub trait FlipPolicy {
    fn can_flip_forward(&self) -> bool;
    fn can_flip_backward(&self) -> bool;
}

/// Fixed answers, handy for hosts that track the page index themselves.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct Permissions {
    pub forward: bool,
    pub backward: bool,
}

impl Permissions {
    pub const ALL: Permissions = Permissions { forward: true, backward: true };
    pub const NONE: Permissions = Permissions { forward: false, backward: false };

    /// Permissions for a book of `page_count` pages currently showing `index`.
    pub fn for_book(index: usize, page_count: usize) -> Self {
        Self {
            forward: index + 1 < page_count,
            backward: index > 0,
        }
    }
}

impl FlipPolicy for Permissions {
    fn can_flip_forward(&self) -> bool {
        self.forward
    }

    fn can_flip_backward(&self) -> bool {
        self.backward
    }
}

impl<P: FlipPolicy + ?Sized> FlipPolicy for &P {
    fn can_flip_forward(&self) -> bool {
        (**self).can_flip_forward()
    }

    fn can_flip_backward(&self) -> bool {
        (**self).can_flip_backward()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn book_edges() {
        assert_eq!(Permissions::for_book(0, 3), Permissions { forward: true, backward: false });
        assert_eq!(Permissions::for_book(2, 3), Permissions { forward: false, backward: true });
        assert_eq!(Permissions::for_book(0, 1), Permissions::NONE);
    }

    #[test]
    fn usable_as_trait_object() {
        let p: &dyn FlipPolicy = &Permissions::ALL;
        assert!(p.can_flip_forward() && p.can_flip_backward());
    }
}
