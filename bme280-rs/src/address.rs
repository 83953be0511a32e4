use bitfield_struct::bitfield;

#[bitfield(u8)]
/// Represents the slave address for the BME280 sensor.
/// The address is 7 bits long, the least significant bit follows the level of the SDO pin.
/// The default address is 0x76 (SDO to ground); pulling SDO high selects 0x77.
pub struct SlaveAddress {
    #[bits(1, default = false)]
    pub sdo: bool,
    #[bits(7, default = 0x76 >> 1, access = RO)]
    reserved: u8,
}
