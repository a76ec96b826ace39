//! Character display trait

/// Errors that can occur while driving the display
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DisplayError {
    /// Bus transfer failed (NACK, arbitration loss)
    Bus,
    /// Cursor position outside the panel
    InvalidPosition,
    /// Panel geometry the controller cannot address
    UnsupportedGeometry,
}

/// Trait for fixed-pitch character displays
///
/// Positions are zero-based. Text is written from the current cursor
/// position; how overflow past the last column behaves is up to the
/// implementation.
pub trait CharDisplay {
    /// Clear the panel and home the cursor
    fn clear(&mut self) -> impl core::future::Future<Output = Result<(), DisplayError>>;

    /// Move the cursor to `column`, `row`
    fn move_cursor(
        &mut self,
        column: u8,
        row: u8,
    ) -> impl core::future::Future<Output = Result<(), DisplayError>>;

    /// Write text at the cursor
    fn write_text(&mut self, text: &str)
        -> impl core::future::Future<Output = Result<(), DisplayError>>;
}

impl<T: CharDisplay + ?Sized> CharDisplay for &mut T {
    fn clear(&mut self) -> impl core::future::Future<Output = Result<(), DisplayError>> {
        T::clear(self)
    }

    fn move_cursor(
        &mut self,
        column: u8,
        row: u8,
    ) -> impl core::future::Future<Output = Result<(), DisplayError>> {
        T::move_cursor(self, column, row)
    }

    fn write_text(&mut self, text: &str)
        -> impl core::future::Future<Output = Result<(), DisplayError>> {
        T::write_text(self, text)
    }
}
