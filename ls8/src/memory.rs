use crate::FaultKind;

/// Number of addressable bytes on an LS-8.
pub const MEMORY_SIZE: usize = 256;

pub trait Memory {
    fn read_byte(&mut self, address: u16) -> Result<u8, FaultKind>;
    fn write_byte(&mut self, address: u16, data: u8) -> Result<(), FaultKind>;
}

/// The flat 256 bytes of RAM. No wraparound, no mirroring: touching anything
/// past the end is a fault.
pub struct Ram {
    bytes: [u8; MEMORY_SIZE],
}

impl Ram {
    pub fn new() -> Ram {
        Ram {
            bytes: [0; MEMORY_SIZE],
        }
    }

    /// Copy `image` into RAM starting at address 0.
    pub fn load(&mut self, image: &[u8]) -> Result<(), FaultKind> {
        if image.len() > MEMORY_SIZE {
            let address = u16::try_from(image.len()).unwrap_or(u16::MAX);
            return Err(FaultKind::AddressOutOfRange { address });
        }
        self.bytes[..image.len()].copy_from_slice(image);
        Ok(())
    }

    pub fn as_bytes(&self) -> &[u8; MEMORY_SIZE] {
        &self.bytes
    }

    fn slot(address: u16) -> Result<usize, FaultKind> {
        let index = address as usize;
        if index < MEMORY_SIZE {
            Ok(index)
        } else {
            Err(FaultKind::AddressOutOfRange { address })
        }
    }
}

impl Default for Ram {
    fn default() -> Self {
        Ram::new()
    }
}

impl Memory for Ram {
    fn read_byte(&mut self, address: u16) -> Result<u8, FaultKind> {
        let index = Ram::slot(address)?;
        Ok(self.bytes[index])
    }
    fn write_byte(&mut self, address: u16, data: u8) -> Result<(), FaultKind> {
        let index = Ram::slot(address)?;
        self.bytes[index] = data;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn last_byte_is_addressable() {
        let mut ram = Ram::new();
        ram.write_byte(0xFF, 0x42).unwrap();
        assert_eq!(ram.read_byte(0xFF).unwrap(), 0x42);
    }

    #[test]
    fn reads_past_the_end_do_not_wrap() {
        let mut ram = Ram::new();
        ram.write_byte(0x00, 0x99).unwrap();
        assert!(matches!(
            ram.read_byte(0x100),
            Err(FaultKind::AddressOutOfRange { address: 0x100 })
        ));
    }

    #[test]
    fn writes_past_the_end_fail() {
        let mut ram = Ram::new();
        assert!(matches!(
            ram.write_byte(0x1234, 1),
            Err(FaultKind::AddressOutOfRange { address: 0x1234 })
        ));
    }

    #[test]
    fn load_rejects_oversized_image() {
        let mut ram = Ram::new();
        let image = vec![0u8; MEMORY_SIZE + 1];
        assert!(ram.load(&image).is_err());
        assert!(ram.load(&image[..MEMORY_SIZE]).is_ok());
    }
}
