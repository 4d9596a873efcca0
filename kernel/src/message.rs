//! Kernel messages
//!
//! A [`Message`] is a fixed 16-byte record copied by value through every
//! queue. Interrupt translators fill it in as follows:
//!
//! | field   | meaning                                                      |
//! |---------|--------------------------------------------------------------|
//! | `kind`  | what happened (`DMA_DONE`, `UART_RX`, `ADC_EOC`, ...)         |
//! | `data1` | the originating [`Vector`](crate::Vector), used for lookup    |
//! | `data2` | kind dependent: status register, data register, channel, ... |
//! | `tag`   | rarely used, kind dependent                                   |

use core::fmt;

use static_assertions::const_assert_eq;

use crate::config::PRIORITY_BORDERLINE;
use crate::vector::Vector;

/// Semantic tag of a message
///
/// Kinds are open-ended: applications mint their own with [`MessageKind::user`]
/// and urgent ones with [`MessageKind::urgent`]. Everything strictly above
/// [`PRIORITY_BORDERLINE`] is delivered through the urgent queue.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[repr(transparent)]
pub struct MessageKind(pub u32);

impl MessageKind {
    /// No-op; never queued, never dispatched
    pub const NULL: Self = Self(0);

    // System kinds emitted by the heartbeat
    pub const TIME_TICK: Self = Self(0x0001);
    pub const KEY_SCAN: Self = Self(0x0002);
    pub const REPAINT: Self = Self(0x0003);

    /// Returned from `notify` to stop the current normal message from
    /// reaching the remaining components
    pub const EXTINGUISH: Self = Self(0x0004);

    // Timers
    pub const HARD_TICK: Self = Self(0x0100);
    pub const TIMER_CAPTURE: Self = Self(0x0101);
    pub const TIMER_CAPTURE_OVERRUN: Self = Self(0x0102);
    pub const TIMER_BREAK: Self = Self(0x0103);
    pub const TIMER_TRIGGER: Self = Self(0x0104);
    pub const TIMER_COMMUTATION: Self = Self(0x0105);

    // External interrupt lines
    pub const EXT_INT: Self = Self(0x0110);

    // DMA
    pub const DMA_DONE: Self = Self(0x0120);
    pub const DMA_HALF: Self = Self(0x0121);
    pub const DMA_ERROR: Self = Self(0x0122);

    // UART
    pub const UART_RX: Self = Self(0x0130);
    pub const UART_RX_IDLE: Self = Self(0x0131);
    pub const UART_TX: Self = Self(0x0132);
    pub const UART_CTS: Self = Self(0x0133);
    pub const UART_ERROR: Self = Self(0x0134);

    // SPI
    pub const SPI_RX: Self = Self(0x0140);
    pub const SPI_TX: Self = Self(0x0141);
    pub const SPI_ERROR: Self = Self(0x0142);

    // I2C
    pub const I2C_EVENT: Self = Self(0x0150);
    pub const I2C_ERROR: Self = Self(0x0151);

    // CAN
    pub const CAN_RX: Self = Self(0x0160);
    pub const CAN_RX_FULL: Self = Self(0x0161);
    pub const CAN_RX_FAULT: Self = Self(0x0162);
    pub const CAN_TX: Self = Self(0x0163);
    pub const CAN_ERROR: Self = Self(0x0164);

    // ADC
    pub const ADC_EOC: Self = Self(0x0170);
    pub const ADC_JEOC: Self = Self(0x0171);
    pub const ADC_AWD: Self = Self(0x0172);

    /// First kind available to applications
    pub const USER_BASE: u32 = 0x1000;

    /// Application-defined normal kind
    pub const fn user(offset: u32) -> Self {
        Self(Self::USER_BASE + offset)
    }

    /// Application-defined urgent kind
    ///
    /// `offset` is taken modulo the urgent range so the result always lies
    /// strictly above the borderline.
    pub const fn urgent(offset: u16) -> Self {
        let step = (offset as u32) % (u32::MAX - PRIORITY_BORDERLINE);
        Self(PRIORITY_BORDERLINE + 1 + step)
    }

    pub const fn is_null(self) -> bool {
        self.0 == Self::NULL.0
    }

    pub const fn is_urgent(self) -> bool {
        self.0 > PRIORITY_BORDERLINE
    }
}

impl fmt::Debug for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match *self {
            Self::NULL => "NULL",
            Self::TIME_TICK => "TIME_TICK",
            Self::KEY_SCAN => "KEY_SCAN",
            Self::REPAINT => "REPAINT",
            Self::EXTINGUISH => "EXTINGUISH",
            _ => return write!(f, "MessageKind({:#010x})", self.0),
        };
        f.write_str(name)
    }
}

impl From<u32> for MessageKind {
    fn from(raw: u32) -> Self {
        Self(raw)
    }
}

/// Fixed-size kernel message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(C)]
pub struct Message {
    pub kind: MessageKind,
    pub data1: u32,
    pub data2: u32,
    pub tag: u32,
}

const_assert_eq!(core::mem::size_of::<Message>(), 16);

impl Message {
    /// The null message; also the blank value of message queues
    pub const NULL: Self = Self::new(MessageKind::NULL, 0, 0);

    pub const fn new(kind: MessageKind, data1: u32, data2: u32) -> Self {
        Self {
            kind,
            data1,
            data2,
            tag: 0,
        }
    }

    /// Message as produced by an interrupt translator
    pub const fn from_irq(kind: MessageKind, vector: Vector, data2: u32) -> Self {
        Self::new(kind, vector.raw(), data2)
    }

    pub const fn with_tag(mut self, tag: u32) -> Self {
        self.tag = tag;
        self
    }

    pub const fn is_null(&self) -> bool {
        self.kind.is_null()
    }

    pub const fn is_urgent(&self) -> bool {
        self.kind.is_urgent()
    }

    /// Vector named by `data1`, if it is one the kernel recognizes
    pub fn vector(&self) -> Option<Vector> {
        Vector::from_raw(self.data1)
    }
}
