use core::hash::Hash;

/// Seam between the recognizer and whatever produces its input: anything
/// that can hand out a hashable key matching the grammar's terminal type.
pub trait Terminal {
    type Key: Eq + Hash;
    fn get_key(&self) -> Self::Key;
}

impl Terminal for u8 {
    type Key = u8;
    fn get_key(&self) -> u8 {
        *self
    }
}

impl Terminal for char {
    type Key = char;
    fn get_key(&self) -> char {
        *self
    }
}

impl<T: Terminal> Terminal for &T {
    type Key = T::Key;
    fn get_key(&self) -> T::Key {
        T::get_key(self)
    }
}
