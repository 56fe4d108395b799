//! Controlled and uncontrolled values.
//!
//! A combobox field is either owned by the combobox (uncontrolled) or by its
//! host (controlled). A controlled field only changes when the host echoes a
//! new value; requests made by the combobox are reported as events instead.

/// A field that is either owned internally or supplied by the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Controlled<T> {
    /// Owned by the combobox.
    Owned(T),
    /// Supplied by the host; holds the last value it echoed.
    External(T),
}

impl<T: PartialEq> Controlled<T> {
    /// The value currently in effect.
    pub fn get(&self) -> &T {
        match self {
            Controlled::Owned(v) | Controlled::External(v) => v,
        }
    }

    /// Whether the host owns the value.
    pub fn is_controlled(&self) -> bool {
        matches!(self, Controlled::External(_))
    }

    /// Asks for `value`. Owned fields adopt it; external fields ignore it.
    ///
    /// Returns true when the effective value changed.
    pub fn request(&mut self, value: T) -> bool {
        match self {
            Controlled::Owned(v) if *v != value => {
                *v = value;
                true
            }
            _ => false,
        }
    }

    /// Sets the value regardless of ownership. Returns true on change.
    pub fn force(&mut self, value: T) -> bool {
        let v = match self {
            Controlled::Owned(v) | Controlled::External(v) => v,
        };
        if *v == value {
            return false;
        }
        *v = value;
        true
    }

    /// Applies a host prop: `Some` makes the field controlled with that
    /// value, `None` hands ownership back keeping the current value.
    ///
    /// Returns true when the effective value changed.
    pub fn sync(&mut self, prop: Option<T>) -> bool
    where
        T: Clone,
    {
        match prop {
            Some(value) => {
                let changed = *self.get() != value;
                *self = Controlled::External(value);
                changed
            }
            None => {
                if let Controlled::External(v) = self {
                    *self = Controlled::Owned(v.clone());
                }
                false
            }
        }
    }
}

impl<T: Default> Default for Controlled<T> {
    fn default() -> Self {
        Controlled::Owned(T::default())
    }
}
