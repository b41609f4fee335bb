mod device;
mod geometry;

pub use self::device::Eeprom;

pub use self::geometry::Geometry;
