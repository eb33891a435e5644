pub mod pins;
pub mod spi;
pub mod system;

pub use pins::{init_spi_pins, SpiPins};
pub use spi::{init_spi1, Spi, SpiConfig};
pub use system::{init_pll1, Pll1Clocks, Pll1Config};
