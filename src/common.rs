use uuid::Uuid;

const BLUETOOTH_BASE_UUID: u128 = 0x00000000_0000_1000_8000_00805f9b34fb;

/// Expands a 16-bit SIG assigned number into a full UUID.
pub const fn uuid_from_u16(short: u16) -> Uuid {
    Uuid::from_u128(BLUETOOTH_BASE_UUID | ((short as u128) << 96))
}

pub mod services {
    use super::uuid_from_u16;
    use uuid::Uuid;

    pub const HEART_RATE: Uuid = uuid_from_u16(0x180D);
    pub const CUSTOM_MEASUREMENT: Uuid = Uuid::from_u128(0x398629c8_4757_4e72_9b0d_8ebdd6ac82a2);
}

pub mod characteristics {
    use super::uuid_from_u16;
    use uuid::Uuid;

    pub const HEART_RATE_MEASUREMENT: Uuid = uuid_from_u16(0x2A37);
    pub const BODY_SENSOR_LOCATION: Uuid = uuid_from_u16(0x2A38);
    pub const HEART_RATE_CONTROL_POINT: Uuid = uuid_from_u16(0x2A39);
    pub const CUSTOM_MEASUREMENT: Uuid = Uuid::from_u128(0x094bd4ad_3605_4912_b9d3_a6b91c573137);
}

/// GAP appearance of a generic heart rate sensor.
pub const HEART_RATE_SENSOR_APPEARANCE: u16 = 0x0340;
