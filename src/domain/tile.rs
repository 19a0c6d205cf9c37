/// Metatile indices and their properties.
/// A cell of the plane holds one 8-bit metatile index; what that index
/// means is decided here and nowhere else.
///
/// ## Index map
///   0-7    background patterns
///   8      ladder (climbable, floor when approached from above)
///   9      door with unfinished bottom
///   12, 13 closed door (top, bottom)
///   14, 15 open door (top, bottom)
///   16-31  block; low nibble = connections (+1 up, +2 right, +4 down, +8 left)
///   43     elevator signal
///   44     elevator door (solid)

pub const MT_EMPTY: u8 = 0;
pub const MT_LADDER: u8 = 8;
pub const MT_DOOR_UNFINISHED_BOTTOM: u8 = 9;
pub const MT_DOOR: u8 = 12;
pub const MT_OPEN_DOOR: u8 = 14;
pub const MT_BLOCK: u8 = 16;
pub const MT_ELEVATOR_SIGNAL: u8 = 43;
pub const MT_ELEVATOR_DOOR: u8 = 44;

pub const CONNECT_UP: u8 = 1;
pub const CONNECT_RIGHT: u8 = 2;
pub const CONNECT_DOWN: u8 = 4;
pub const CONNECT_LEFT: u8 = 8;

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default, Hash)]
pub struct Metatile(pub u8);

impl Metatile {
    pub const EMPTY: Metatile = Metatile(MT_EMPTY);

    #[inline]
    pub fn index(self) -> u8 {
        self.0
    }

    /// Any of the sixteen connected block variants.
    #[inline]
    pub fn is_block(self) -> bool {
        (MT_BLOCK..MT_BLOCK + 16).contains(&self.0)
    }

    #[inline]
    pub fn is_ladder(self) -> bool {
        self.0 == MT_LADDER
    }

    #[inline]
    pub fn is_elevator_door(self) -> bool {
        self.0 == MT_ELEVATOR_DOOR
    }

    /// Solid from every side. Ladders are handled by the collider
    /// because their solidity depends on the approach.
    #[inline]
    pub fn is_solid(self) -> bool {
        self.is_block() || self.is_elevator_door()
    }

    /// Bottom half of an open exit door: walking into it leaves the room.
    #[inline]
    pub fn is_open_door_bottom(self) -> bool {
        self.0 == MT_OPEN_DOOR + 1
    }

    /// Connection bits of a block tile, 0 for anything else.
    #[inline]
    pub fn connections(self) -> u8 {
        if self.is_block() { self.0 & 0x0F } else { 0 }
    }
}

impl From<u8> for Metatile {
    fn from(index: u8) -> Self {
        Metatile(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn block_range_is_sixteen_wide() {
        assert!(!Metatile(15).is_block());
        assert!(Metatile(16).is_block());
        assert!(Metatile(31).is_block());
        assert!(!Metatile(32).is_block());
    }

    #[test]
    fn elevator_door_is_solid_but_signal_is_not() {
        assert!(Metatile(MT_ELEVATOR_DOOR).is_solid());
        assert!(!Metatile(MT_ELEVATOR_SIGNAL).is_solid());
    }

    #[test]
    fn ladder_is_not_solid_by_itself() {
        assert!(Metatile(MT_LADDER).is_ladder());
        assert!(!Metatile(MT_LADDER).is_solid());
    }

    #[test]
    fn connections_only_for_blocks() {
        assert_eq!(Metatile(MT_BLOCK | CONNECT_UP | CONNECT_LEFT).connections(), 9);
        assert_eq!(Metatile(MT_DOOR).connections(), 0);
    }
}
