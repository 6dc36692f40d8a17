//! Server-assigned privilege flags.

use bitflags::bitflags;

bitflags! {
    /// Privilege bits broadcast by the server in privilege updates and
    /// presence packets. Presence packets carry only the low byte.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct Privileges: u32 {
        const NORMAL = 1 << 0;
        const MOD = 1 << 1;
        const SUPPORTER = 1 << 2;
        const PEPPY = 1 << 3;
        const DEVELOPER = 1 << 4;
    }
}
