use bitflags::bitflags;

bitflags! {
    /// Which object categories take part in mouse-over picking.
    #[derive(Default, Clone, Copy, Debug, PartialEq, Eq)]
    pub struct PickFlags: u8 {
        // Terrain, flat or stretched.
        const GROUND_TILES = 0b0000_0001;
        // Map statics.
        const STATICS      = 0b0000_0010;
        // Living creatures.
        const MOBILES      = 0b0000_0100;
        // Dynamic items and corpses.
        const ITEMS        = 0b0000_1000;

        const OBJECTS      = Self::STATICS.bits() | Self::MOBILES.bits() | Self::ITEMS.bits();
        const ALL          = Self::GROUND_TILES.bits() | Self::OBJECTS.bits();
    }
}

impl PickFlags {
    /// Parse the names accepted on the command line.
    pub fn from_cli_name(name: &str) -> Option<Self> {
        Some(match name {
            "nothing" => PickFlags::empty(),
            "ground" => PickFlags::GROUND_TILES,
            "statics" => PickFlags::STATICS,
            "mobiles" => PickFlags::MOBILES,
            "items" => PickFlags::ITEMS,
            "objects" => PickFlags::OBJECTS,
            "all" => PickFlags::ALL,
            _ => return None,
        })
    }
}
