//! Interrupt vectors and the vector ownership table
//!
//! A [`Vector`] identifies one hardware interrupt source the kernel knows
//! about. Interrupt translators put it in `Message::data1`; the router uses it
//! to find the owning component in the [`VectorTable`].
//!
//! ## Ownership
//!
//! - At most one component owns a vector at a time
//! - Installing a new owner hands back the previous one, the caller decides
//!   what to do with it (typically chain to it from its own callback)
//! - Raw ids coming from interrupt context are bounds-checked with
//!   [`Vector::from_raw`] before they touch the table

use crate::component::{same_component, ComponentRef};

/// Hardware interrupt sources recognized by the kernel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum Vector {
    Dma1Ch1,
    Dma1Ch2,
    Dma1Ch3,
    Dma1Ch4,
    Dma1Ch5,
    Dma1Ch6,
    Dma1Ch7,
    Dma2Ch1,
    Dma2Ch2,
    Dma2Ch3,
    Dma2Ch4,
    Dma2Ch5,
    Uart1,
    Uart2,
    Uart3,
    Uart4,
    Uart5,
    Spi1,
    Spi2,
    Spi3,
    I2c1,
    I2c2,
    Can1,
    Can2,
    Adc1,
    Adc2,
    Tim1,
    Tim2,
    Tim3,
    Tim4,
    Tim5,
    Tim6,
    Tim7,
    ExtInt0,
    ExtInt1,
    ExtInt2,
    ExtInt3,
    ExtInt4,
    ExtInt5,
    ExtInt6,
    ExtInt7,
    ExtInt8,
    ExtInt9,
    ExtInt10,
    ExtInt11,
    ExtInt12,
    ExtInt13,
    ExtInt14,
    ExtInt15,
}

impl Vector {
    /// Every vector, in discriminant order
    pub const ALL: [Vector; 49] = [
        Vector::Dma1Ch1,
        Vector::Dma1Ch2,
        Vector::Dma1Ch3,
        Vector::Dma1Ch4,
        Vector::Dma1Ch5,
        Vector::Dma1Ch6,
        Vector::Dma1Ch7,
        Vector::Dma2Ch1,
        Vector::Dma2Ch2,
        Vector::Dma2Ch3,
        Vector::Dma2Ch4,
        Vector::Dma2Ch5,
        Vector::Uart1,
        Vector::Uart2,
        Vector::Uart3,
        Vector::Uart4,
        Vector::Uart5,
        Vector::Spi1,
        Vector::Spi2,
        Vector::Spi3,
        Vector::I2c1,
        Vector::I2c2,
        Vector::Can1,
        Vector::Can2,
        Vector::Adc1,
        Vector::Adc2,
        Vector::Tim1,
        Vector::Tim2,
        Vector::Tim3,
        Vector::Tim4,
        Vector::Tim5,
        Vector::Tim6,
        Vector::Tim7,
        Vector::ExtInt0,
        Vector::ExtInt1,
        Vector::ExtInt2,
        Vector::ExtInt3,
        Vector::ExtInt4,
        Vector::ExtInt5,
        Vector::ExtInt6,
        Vector::ExtInt7,
        Vector::ExtInt8,
        Vector::ExtInt9,
        Vector::ExtInt10,
        Vector::ExtInt11,
        Vector::ExtInt12,
        Vector::ExtInt13,
        Vector::ExtInt14,
        Vector::ExtInt15,
    ];

    /// Number of recognized vectors
    pub const COUNT: usize = Self::ALL.len();

    /// Last recognized vector
    pub const LAST: Vector = Vector::ExtInt15;

    /// Bounds-checked conversion from a raw id (e.g. `Message::data1`)
    pub fn from_raw(raw: u32) -> Option<Self> {
        Self::ALL.get(raw as usize).copied()
    }

    pub const fn raw(self) -> u32 {
        self as u32
    }

    pub const fn index(self) -> usize {
        self as usize
    }

    /// External interrupt line `0..=15`
    pub fn ext_int(line: u8) -> Option<Self> {
        if line > 15 {
            return None;
        }
        Self::from_raw(Vector::ExtInt0.raw() + line as u32)
    }
}

/// Vector ownership table
///
/// Fixed array with one slot per [`Vector`]; an empty slot means no software
/// owner and messages for that vector are discarded.
pub struct VectorTable<'a> {
    owners: [Option<ComponentRef<'a>>; Vector::COUNT],
}

impl<'a> VectorTable<'a> {
    pub const fn new() -> Self {
        Self {
            owners: [None; Vector::COUNT],
        }
    }

    /// Install `owner` on `vector`, returning the previous owner
    pub fn install(&mut self, vector: Vector, owner: ComponentRef<'a>) -> Option<ComponentRef<'a>> {
        self.owners[vector.index()].replace(owner)
    }

    /// Clear `vector`, returning the owner it had
    pub fn remove(&mut self, vector: Vector) -> Option<ComponentRef<'a>> {
        self.owners[vector.index()].take()
    }

    pub fn owner(&self, vector: Vector) -> Option<ComponentRef<'a>> {
        self.owners[vector.index()]
    }

    /// First vector owned by `component`
    pub fn vector_of(&self, component: ComponentRef<'_>) -> Option<Vector> {
        self.owners
            .iter()
            .position(|slot| slot.is_some_and(|owner| same_component(owner, component)))
            .and_then(|index| Vector::ALL.get(index).copied())
    }

    pub fn clear(&mut self) {
        self.owners = [None; Vector::COUNT];
    }

    /// Number of vectors with an owner
    pub fn installed(&self) -> usize {
        self.owners.iter().filter(|slot| slot.is_some()).count()
    }
}

impl Default for VectorTable<'_> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::{Component, Priority};
    use crate::message::Message;

    // Identity is by address, so test components must not be zero-sized
    struct Dummy(u8);

    impl Component for Dummy {
        fn priority(&self) -> Priority {
            Priority::Normal
        }

        fn notify(&self, _message: &Message) -> Option<Message> {
            None
        }

        fn interrupt_callback(&self, _message: &Message) -> Option<Message> {
            None
        }
    }

    #[test]
    fn test_vector_catalogue_is_dense() {
        for (index, vector) in Vector::ALL.iter().enumerate() {
            assert_eq!(vector.index(), index);
        }
        assert_eq!(Vector::LAST.index(), Vector::COUNT - 1);
    }

    #[test]
    fn test_from_raw_bounds() {
        assert_eq!(Vector::from_raw(0), Some(Vector::Dma1Ch1));
        assert_eq!(Vector::from_raw(Vector::LAST.raw()), Some(Vector::LAST));
        assert_eq!(Vector::from_raw(Vector::COUNT as u32), None);
        assert_eq!(Vector::from_raw(u32::MAX), None);
    }

    #[test]
    fn test_ext_int_lines() {
        assert_eq!(Vector::ext_int(0), Some(Vector::ExtInt0));
        assert_eq!(Vector::ext_int(9), Some(Vector::ExtInt9));
        assert_eq!(Vector::ext_int(15), Some(Vector::ExtInt15));
        assert_eq!(Vector::ext_int(16), None);
    }

    #[test]
    fn test_install_returns_previous_owner() {
        let first = Dummy(1);
        let second = Dummy(2);
        let mut table = VectorTable::new();

        assert!(table.install(Vector::Uart1, &first).is_none());
        let previous = table.install(Vector::Uart1, &second).unwrap();
        assert!(same_component(previous, &first));
        assert!(same_component(table.owner(Vector::Uart1).unwrap(), &second));
        assert_eq!(table.installed(), 1);
    }

    #[test]
    fn test_vector_of() {
        let adc = Dummy(1);
        let other = Dummy(2);
        let mut table = VectorTable::new();
        table.install(Vector::Adc2, &adc);

        assert_eq!(table.vector_of(&adc), Some(Vector::Adc2));
        assert_eq!(table.vector_of(&other), None);

        table.remove(Vector::Adc2);
        assert_eq!(table.vector_of(&adc), None);
    }
}
