//! HD44780 Character LCD Driver
//!
//! Driver for HD44780-compatible character LCDs behind a PCF8574 I2C
//! port expander, in 4-bit mode. The common backpack wiring is assumed:
//!
//! | PCF8574 bit | LCD pin   |
//! |-------------|-----------|
//! | P0          | RS        |
//! | P1          | RW        |
//! | P2          | E         |
//! | P3          | Backlight |
//! | P4-P7       | D4-D7     |

use embedded_hal_async::delay::DelayNs;
use embedded_hal_async::i2c::I2c;

use livegrow_core::config::DisplayGeometry;
use livegrow_core::traits::{CharDisplay, DisplayError};

/// Expander bits
mod pin {
    pub const RS: u8 = 0x01;
    pub const ENABLE: u8 = 0x04;
    pub const BACKLIGHT: u8 = 0x08;
}

/// HD44780 commands
#[allow(dead_code)]
mod cmd {
    pub const CLEAR: u8 = 0x01;
    pub const HOME: u8 = 0x02;
    pub const ENTRY_MODE: u8 = 0x04;
    pub const ENTRY_INCREMENT: u8 = 0x02;
    pub const DISPLAY_CONTROL: u8 = 0x08;
    pub const DISPLAY_ON: u8 = 0x04;
    pub const FUNCTION_SET: u8 = 0x20;
    pub const FUNCTION_2LINES: u8 = 0x08;
    pub const FUNCTION_RESET: u8 = 0x30;
    pub const SET_DDRAM: u8 = 0x80;
}

/// Glyph written for characters outside the controller's ASCII range
const REPLACEMENT: u8 = b'?';

/// DDRAM address of `column`, `row` on a panel `columns` wide
///
/// Rows 0 and 1 start at 0x00 and 0x40; rows 2 and 3 continue those
/// lines one panel width further on. Only meaningful for geometries where
/// [`DisplayGeometry::single_controller`] holds; wider four-line panels
/// would run past the end of each 40-cell line.
pub fn ddram_address(column: u8, row: u8, columns: u8) -> u8 {
    let mut address = column & 0x3f;
    if row & 1 != 0 {
        address += 0x40;
    }
    if row & 2 != 0 {
        address += columns;
    }
    address
}

/// HD44780 over PCF8574 driver
pub struct Hd44780<I2C, D> {
    i2c: I2C,
    delay: D,
    address: u8,
    geometry: DisplayGeometry,
    column: u8,
    row: u8,
}

impl<I2C, D> Hd44780<I2C, D>
where
    I2C: I2c,
    D: DelayNs,
{
    /// Create a new driver; call [`Hd44780::init`] before use
    pub fn new(i2c: I2C, delay: D, address: u8, geometry: DisplayGeometry) -> Self {
        Self {
            i2c,
            delay,
            address,
            geometry,
            column: 0,
            row: 0,
        }
    }

    /// Panel geometry
    pub fn geometry(&self) -> DisplayGeometry {
        self.geometry
    }

    /// Initialize the controller into 4-bit mode and switch the panel on
    pub async fn init(&mut self) -> Result<(), DisplayError> {
        if !self.geometry.single_controller() {
            return Err(DisplayError::UnsupportedGeometry);
        }
        self.delay.delay_ms(20).await;

        // Reset by instruction: three 8-bit function sets, then 4-bit mode
        for wait_ms in [5, 1, 1] {
            self.write_init_nibble(cmd::FUNCTION_RESET).await?;
            self.delay.delay_ms(wait_ms).await;
        }
        self.write_init_nibble(cmd::FUNCTION_SET).await?;
        self.delay.delay_ms(1).await;

        let mut function = cmd::FUNCTION_SET;
        if self.geometry.rows() > 1 {
            function |= cmd::FUNCTION_2LINES;
        }
        self.command(function).await?;
        self.command(cmd::DISPLAY_CONTROL).await?;
        self.clear().await?;
        self.command(cmd::ENTRY_MODE | cmd::ENTRY_INCREMENT).await?;
        self.command(cmd::DISPLAY_CONTROL | cmd::DISPLAY_ON).await
    }

    async fn write(&mut self, bytes: &[u8]) -> Result<(), DisplayError> {
        self.i2c
            .write(self.address, bytes)
            .await
            .map_err(|_| DisplayError::Bus)
    }

    /// Clock the upper nibble of `value` in with no backlight or RS
    async fn write_init_nibble(&mut self, value: u8) -> Result<(), DisplayError> {
        let byte = value & 0xf0;
        self.write(&[byte | pin::ENABLE, byte]).await
    }

    /// Clock a full byte in as two nibbles
    async fn send(&mut self, value: u8, mode: u8) -> Result<(), DisplayError> {
        let flags = mode | pin::BACKLIGHT;
        let high = (value & 0xf0) | flags;
        let low = (value << 4) | flags;
        self.write(&[high | pin::ENABLE, high, low | pin::ENABLE, low])
            .await
    }

    async fn command(&mut self, value: u8) -> Result<(), DisplayError> {
        self.send(value, 0).await?;
        // Clear and home take up to 1.52 ms
        if value <= cmd::HOME {
            self.delay.delay_ms(5).await;
        }
        Ok(())
    }

    async fn set_address(&mut self) -> Result<(), DisplayError> {
        let address = ddram_address(self.column, self.row, self.geometry.columns());
        self.command(cmd::SET_DDRAM | address).await
    }

    async fn put_char(&mut self, c: char) -> Result<(), DisplayError> {
        let columns = self.geometry.columns();
        let rows = self.geometry.rows();

        if c == '\n' {
            self.column = columns;
        } else {
            let glyph = match c {
                ' '..='}' => c as u8,
                _ => REPLACEMENT,
            };
            self.send(glyph, pin::RS).await?;
            self.column += 1;
        }

        if self.column >= columns {
            self.column = 0;
            self.row = (self.row + 1) % rows;
            self.set_address().await?;
        }
        Ok(())
    }
}

impl<I2C, D> CharDisplay for Hd44780<I2C, D>
where
    I2C: I2c,
    D: DelayNs,
{
    async fn clear(&mut self) -> Result<(), DisplayError> {
        self.command(cmd::CLEAR).await?;
        self.column = 0;
        self.row = 0;
        Ok(())
    }

    async fn move_cursor(&mut self, column: u8, row: u8) -> Result<(), DisplayError> {
        if !self.geometry.single_controller() {
            return Err(DisplayError::UnsupportedGeometry);
        }
        if column >= self.geometry.columns() || row >= self.geometry.rows() {
            return Err(DisplayError::InvalidPosition);
        }
        self.column = column;
        self.row = row;
        self.set_address().await
    }

    async fn write_text(&mut self, text: &str) -> Result<(), DisplayError> {
        for c in text.chars() {
            self.put_char(c).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embassy_futures::block_on;
    use embedded_hal_async::i2c::{ErrorKind, ErrorType, Operation};
    use heapless::Vec;

    #[derive(Default)]
    struct MockI2c {
        writes: Vec<(u8, Vec<u8, 4>), 256>,
        fail: bool,
    }

    impl ErrorType for MockI2c {
        type Error = ErrorKind;
    }

    impl I2c for MockI2c {
        async fn transaction(
            &mut self,
            address: u8,
            operations: &mut [Operation<'_>],
        ) -> Result<(), ErrorKind> {
            if self.fail {
                return Err(ErrorKind::Other);
            }
            for op in operations.iter() {
                if let Operation::Write(bytes) = op {
                    let _ = self
                        .writes
                        .push((address, Vec::from_slice(bytes).unwrap()));
                }
            }
            Ok(())
        }
    }

    struct NoDelay;

    impl DelayNs for NoDelay {
        async fn delay_ns(&mut self, _ns: u32) {}
    }

    fn lcd() -> Hd44780<MockI2c, NoDelay> {
        Hd44780::new(MockI2c::default(), NoDelay, 0x27, DisplayGeometry::PANEL)
    }

    fn bytes(lcd: &Hd44780<MockI2c, NoDelay>, index: usize) -> &[u8] {
        &lcd.i2c.writes[index].1
    }

    #[test]
    fn test_ddram_addresses_20x4() {
        assert_eq!(ddram_address(0, 0, 20), 0x00);
        assert_eq!(ddram_address(0, 1, 20), 0x40);
        assert_eq!(ddram_address(0, 2, 20), 0x14);
        assert_eq!(ddram_address(0, 3, 20), 0x54);
        assert_eq!(ddram_address(5, 1, 20), 0x45);
    }

    #[test]
    fn test_ddram_addresses_16x2() {
        assert_eq!(ddram_address(15, 0, 16), 0x0f);
        assert_eq!(ddram_address(15, 1, 16), 0x4f);
    }

    #[test]
    fn test_init_sequence_starts_with_reset() {
        let mut lcd = lcd();
        block_on(lcd.init()).unwrap();

        assert!(lcd.i2c.writes.iter().all(|(address, _)| *address == 0x27));
        for i in 0..3 {
            assert_eq!(bytes(&lcd, i), &[0x34, 0x30]);
        }
        assert_eq!(bytes(&lcd, 3), &[0x24, 0x20]);
        // Function set: 4-bit, 2 lines (0x28)
        assert_eq!(bytes(&lcd, 4), &[0x2c, 0x28, 0x8c, 0x88]);
        // Last command switches the display on (0x0C)
        let last = lcd.i2c.writes.len() - 1;
        assert_eq!(bytes(&lcd, last), &[0x0c, 0x08, 0xcc, 0xc8]);
    }

    #[test]
    fn test_move_cursor_second_row() {
        let mut lcd = lcd();
        block_on(lcd.move_cursor(0, 1)).unwrap();

        // SET_DDRAM | 0x40 = 0xC0
        assert_eq!(bytes(&lcd, 0), &[0xcc, 0xc8, 0x0c, 0x08]);
    }

    #[test]
    fn test_write_text_sends_data_with_rs() {
        let mut lcd = lcd();
        block_on(lcd.write_text("H")).unwrap();

        // 'H' = 0x48
        assert_eq!(bytes(&lcd, 0), &[0x4d, 0x49, 0x8d, 0x89]);
    }

    #[test]
    fn test_non_ascii_replaced() {
        let mut lcd = lcd();
        block_on(lcd.write_text("é")).unwrap();

        // '?' = 0x3F
        assert_eq!(bytes(&lcd, 0), &[0x3d, 0x39, 0xfd, 0xf9]);
    }

    #[test]
    fn test_out_of_range_position() {
        let mut lcd = lcd();
        assert_eq!(
            block_on(lcd.move_cursor(20, 0)),
            Err(DisplayError::InvalidPosition)
        );
        assert_eq!(
            block_on(lcd.move_cursor(0, 4)),
            Err(DisplayError::InvalidPosition)
        );
        assert!(lcd.i2c.writes.is_empty());
    }

    #[test]
    fn test_wraps_to_next_row_at_line_end() {
        let mut lcd = Hd44780::new(
            MockI2c::default(),
            NoDelay,
            0x27,
            DisplayGeometry::new(2, 2).unwrap(),
        );
        block_on(lcd.write_text("abc")).unwrap();

        // a, b, then an address set to row 1 (0xC0), then c
        assert_eq!(lcd.i2c.writes.len(), 4);
        assert_eq!(bytes(&lcd, 2), &[0xcc, 0xc8, 0x0c, 0x08]);
        assert_eq!((lcd.column, lcd.row), (1, 1));
    }

    #[test]
    fn test_newline_moves_to_next_row() {
        let mut lcd = lcd();
        block_on(lcd.write_text("a\nb")).unwrap();

        assert_eq!(bytes(&lcd, 1), &[0xcc, 0xc8, 0x0c, 0x08]);
        assert_eq!((lcd.column, lcd.row), (1, 1));
    }

    #[test]
    fn test_rejects_dual_controller_panel() {
        let mut lcd = Hd44780::new(
            MockI2c::default(),
            NoDelay,
            0x27,
            DisplayGeometry::new(40, 4).unwrap(),
        );
        assert_eq!(block_on(lcd.init()), Err(DisplayError::UnsupportedGeometry));
        assert_eq!(
            block_on(lcd.move_cursor(0, 3)),
            Err(DisplayError::UnsupportedGeometry)
        );
        assert!(lcd.i2c.writes.is_empty());
    }

    #[test]
    fn test_ddram_addresses_stay_in_range_on_supported_panels() {
        for (columns, rows) in [(16, 2), (20, 4), (40, 2), (16, 4)] {
            let geometry = DisplayGeometry::new(columns, rows).unwrap();
            assert!(geometry.single_controller());
            for row in 0..rows {
                assert!(ddram_address(columns - 1, row, columns) < 0x68);
            }
        }
    }

    #[test]
    fn test_bus_error_mapped() {
        let mut lcd = lcd();
        lcd.i2c.fail = true;
        assert_eq!(block_on(lcd.clear()), Err(DisplayError::Bus));
    }
}
