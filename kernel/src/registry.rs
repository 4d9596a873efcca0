//! Component registry
//!
//! Fixed-capacity ordered list of component handles. Insertion order is the
//! broadcast delivery order, so removal shifts later entries down instead of
//! leaving holes: iterating `0..len()` never skips a registered component.

use crate::component::{same_component, ComponentRef};
use crate::error::{KernelError, Result};

pub struct Registry<'a, const N: usize> {
    entries: [Option<ComponentRef<'a>>; N],
    count: usize,
}

impl<'a, const N: usize> Registry<'a, N> {
    pub const fn new() -> Self {
        Self {
            entries: [None; N],
            count: 0,
        }
    }

    /// Append a component at the end of the broadcast order
    ///
    /// # Errors
    /// - `RegistryFull` when all `N` slots are taken
    /// - `AlreadyRegistered` when the handle is already present
    pub fn include(&mut self, component: ComponentRef<'a>) -> Result<()> {
        if self.find(component).is_some() {
            return Err(KernelError::AlreadyRegistered);
        }
        if self.count == N {
            return Err(KernelError::RegistryFull { capacity: N });
        }

        self.entries[self.count] = Some(component);
        self.count += 1;
        Ok(())
    }

    /// Position of `component` in the broadcast order
    pub fn find(&self, component: ComponentRef<'_>) -> Option<usize> {
        self.entries[..self.count]
            .iter()
            .position(|slot| slot.is_some_and(|entry| same_component(entry, component)))
    }

    /// Remove `component`, shifting every later entry down by one
    ///
    /// # Errors
    /// Returns `ComponentNotFound` if the handle is not registered
    pub fn exclude(&mut self, component: ComponentRef<'_>) -> Result<()> {
        let index = self.find(component).ok_or(KernelError::ComponentNotFound)?;

        self.entries.copy_within(index + 1..self.count, index);
        self.count -= 1;
        self.entries[self.count] = None;
        Ok(())
    }

    /// Component at broadcast position `index`
    pub fn get(&self, index: usize) -> Option<ComponentRef<'a>> {
        if index < self.count {
            self.entries[index]
        } else {
            None
        }
    }

    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub const fn capacity(&self) -> usize {
        N
    }

    pub fn iter(&self) -> impl Iterator<Item = ComponentRef<'a>> + '_ {
        self.entries[..self.count].iter().flatten().copied()
    }

    pub fn clear(&mut self) {
        self.entries = [None; N];
        self.count = 0;
    }
}

impl<const N: usize> Default for Registry<'_, N> {
    fn default() -> Self {
        Self::new()
    }
}
