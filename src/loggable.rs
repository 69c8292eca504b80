use crate::log_value::LogValue;

/// A type that can be stored in a log record.
///
/// Implemented for the fixed-width integer and float types and for text.
/// `usize`/`isize` are widened to their 64-bit kinds. The conversion is
/// pure; nothing is allocated and nothing is formatted on the calling thread.
pub trait Loggable {
    /// Borrows `self` as a tagged value.
    fn log_value(&self) -> LogValue<'_>;
}

macro_rules! impl_loggable {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl Loggable for $ty {
                #[inline]
                fn log_value(&self) -> LogValue<'_> {
                    LogValue::$variant(*self)
                }
            }
        )*
    };
}

impl_loggable! {
    i8 => I8,
    u8 => U8,
    i16 => I16,
    u16 => U16,
    i32 => I32,
    u32 => U32,
    i64 => I64,
    u64 => U64,
    f32 => F32,
    f64 => F64,
}

impl Loggable for isize {
    #[inline]
    fn log_value(&self) -> LogValue<'_> {
        LogValue::I64(*self as i64)
    }
}

impl Loggable for usize {
    #[inline]
    fn log_value(&self) -> LogValue<'_> {
        LogValue::U64(*self as u64)
    }
}

impl Loggable for str {
    #[inline]
    fn log_value(&self) -> LogValue<'_> {
        LogValue::text(self)
    }
}

impl Loggable for String {
    #[inline]
    fn log_value(&self) -> LogValue<'_> {
        LogValue::text(self)
    }
}

impl<T: Loggable + ?Sized> Loggable for &T {
    #[inline]
    fn log_value(&self) -> LogValue<'_> {
        (**self).log_value()
    }
}
