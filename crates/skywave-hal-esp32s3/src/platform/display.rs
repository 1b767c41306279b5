use embedded_hal::{delay::DelayNs, digital::OutputPin, spi::SpiBus};
use ssd1309::{FrameBuffer, command};

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum DisplayError<SpiErr, DcErr, RstErr, CsErr> {
    Spi(SpiErr),
    Dc(DcErr),
    Rst(RstErr),
    Cs(CsErr),
}

pub type OledResult<SpiErr, DcErr, RstErr, CsErr> =
    Result<(), DisplayError<SpiErr, DcErr, RstErr, CsErr>>;

/// Minimal board-level adapter for a 4-wire SPI SSD1309 panel.
#[derive(Debug)]
pub struct OledDisplay<SPI, DC, RST, CS> {
    spi: SPI,
    dc: DC,
    rst: RST,
    cs: CS,
}

impl<SPI, DC, RST, CS> OledDisplay<SPI, DC, RST, CS>
where
    SPI: SpiBus<u8>,
    DC: OutputPin,
    RST: OutputPin,
    CS: OutputPin,
{
    pub fn new(spi: SPI, dc: DC, rst: RST, cs: CS) -> Self {
        Self { spi, dc, rst, cs }
    }

    /// Hardware reset pulse followed by the panel init sequence.
    pub fn initialize<D>(
        &mut self,
        delay: &mut D,
    ) -> OledResult<SPI::Error, DC::Error, RST::Error, CS::Error>
    where
        D: DelayNs,
    {
        self.rst.set_high().map_err(DisplayError::Rst)?;
        delay.delay_ms(1);
        self.rst.set_low().map_err(DisplayError::Rst)?;
        delay.delay_ms(10);
        self.rst.set_high().map_err(DisplayError::Rst)?;
        delay.delay_ms(10);

        self.write_commands(command::INIT_SEQUENCE)
    }

    /// Runtime brightness adjustment.
    pub fn set_contrast(
        &mut self,
        level: u8,
    ) -> OledResult<SPI::Error, DC::Error, RST::Error, CS::Error> {
        self.write_commands(&command::contrast_packet(level))
    }

    /// Pushes a full framebuffer through the panel's page window.
    pub fn flush_frame(
        &mut self,
        frame: &FrameBuffer,
    ) -> OledResult<SPI::Error, DC::Error, RST::Error, CS::Error> {
        self.write_commands(&command::FULL_WINDOW)?;
        self.write_data(frame.bytes())
    }

    fn write_commands(
        &mut self,
        bytes: &[u8],
    ) -> OledResult<SPI::Error, DC::Error, RST::Error, CS::Error> {
        self.dc.set_low().map_err(DisplayError::Dc)?;
        self.write_selected(bytes)
    }

    fn write_data(
        &mut self,
        bytes: &[u8],
    ) -> OledResult<SPI::Error, DC::Error, RST::Error, CS::Error> {
        self.dc.set_high().map_err(DisplayError::Dc)?;
        self.write_selected(bytes)
    }

    fn write_selected(
        &mut self,
        bytes: &[u8],
    ) -> OledResult<SPI::Error, DC::Error, RST::Error, CS::Error> {
        self.cs.set_low().map_err(DisplayError::Cs)?;
        let written = self
            .spi
            .write(bytes)
            .and_then(|()| self.spi.flush())
            .map_err(DisplayError::Spi);
        self.cs.set_high().map_err(DisplayError::Cs)?;
        written
    }
}
