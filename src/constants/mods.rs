use bitflags::bitflags;

use super::Gamemode;

bitflags! {
    #[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash)]
    pub struct Mods: u32 {
        const NOMOD        = 0;
        const NOFAIL       = 1 << 0;
        const EASY         = 1 << 1;
        const TOUCHSCREEN  = 1 << 2;
        const HIDDEN       = 1 << 3;
        const HARDROCK     = 1 << 4;
        const SUDDENDEATH  = 1 << 5;
        const DOUBLETIME   = 1 << 6;
        const RELAX        = 1 << 7;
        const HALFTIME     = 1 << 8;
        const NIGHTCORE    = 1 << 9;
        const FLASHLIGHT   = 1 << 10;
        const AUTOPLAY     = 1 << 11;
        const SPUNOUT      = 1 << 12;
        const AUTOPILOT    = 1 << 13;
        const PERFECT      = 1 << 14;
        const KEY4         = 1 << 15;
        const KEY5         = 1 << 16;
        const KEY6         = 1 << 17;
        const KEY7         = 1 << 18;
        const KEY8         = 1 << 19;
        const FADEIN       = 1 << 20;
        const RANDOM       = 1 << 21;
        const CINEMA       = 1 << 22;
        const TARGET       = 1 << 23;
        const KEY9         = 1 << 24;
        const KEYCOOP      = 1 << 25;
        const KEY1         = 1 << 26;
        const KEY3         = 1 << 27;
        const KEY2         = 1 << 28;
        const SCOREV2      = 1 << 29;
        const MIRROR       = 1 << 30;

        const KEY_MODS = Self::KEY1.bits() | Self::KEY2.bits() | Self::KEY3.bits()
            | Self::KEY4.bits() | Self::KEY5.bits() | Self::KEY6.bits()
            | Self::KEY7.bits() | Self::KEY8.bits() | Self::KEY9.bits()
            | Self::KEYCOOP.bits();
    }
}

impl Mods {
    const DIFFICULTY_CHANGING: Mods = Mods::DOUBLETIME
        .union(Mods::HALFTIME)
        .union(Mods::NIGHTCORE)
        .union(Mods::HARDROCK)
        .union(Mods::EASY)
        .union(Mods::FLASHLIGHT);

    /// Projects the bitset down to the mods that actually change difficulty
    /// attributes. Key counts only matter for mania charts.
    pub fn difficulty_mask(self, mode: Gamemode) -> Mods {
        let mut mask = Self::DIFFICULTY_CHANGING;

        if mode == Gamemode::Mania {
            mask |= Mods::KEY_MODS;
        }

        self & mask
    }
}

/// Acronym string for log lines, e.g. "DTHD". The acronyms are the usual
/// community two-letter codes; they are emitted in alphabetical order so the
/// output is stable no matter how the bitset was assembled.
pub fn repr(mods: Mods) -> String {
    if mods.is_empty() {
        return "NM".into();
    }

    MOD_ACRONYMS
        .iter()
        .filter(|(flag, _)| mods.contains(*flag))
        .map(|(_, acronym)| *acronym)
        .collect()
}

// Sorted by acronym.
const MOD_ACRONYMS: &[(Mods, &str)] = &[
    (Mods::AUTOPILOT, "AP"),
    (Mods::AUTOPLAY, "AT"),
    (Mods::CINEMA, "CN"),
    (Mods::DOUBLETIME, "DT"),
    (Mods::EASY, "EZ"),
    (Mods::FADEIN, "FI"),
    (Mods::FLASHLIGHT, "FL"),
    (Mods::HIDDEN, "HD"),
    (Mods::HARDROCK, "HR"),
    (Mods::HALFTIME, "HT"),
    (Mods::KEY1, "K1"),
    (Mods::KEY2, "K2"),
    (Mods::KEY3, "K3"),
    (Mods::KEY4, "K4"),
    (Mods::KEY5, "K5"),
    (Mods::KEY6, "K6"),
    (Mods::KEY7, "K7"),
    (Mods::KEY8, "K8"),
    (Mods::KEY9, "K9"),
    (Mods::KEYCOOP, "KC"),
    (Mods::MIRROR, "MR"),
    (Mods::NIGHTCORE, "NC"),
    (Mods::NOFAIL, "NF"),
    (Mods::PERFECT, "PF"),
    (Mods::RANDOM, "RD"),
    (Mods::RELAX, "RX"),
    (Mods::SUDDENDEATH, "SD"),
    (Mods::SPUNOUT, "SO"),
    (Mods::TOUCHSCREEN, "TD"),
    (Mods::TARGET, "TP"),
    (Mods::SCOREV2, "V2"),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn difficulty_mask_keeps_rate_and_visual_mods() {
        let mods = Mods::HIDDEN | Mods::DOUBLETIME | Mods::HARDROCK | Mods::NOFAIL;
        let masked = mods.difficulty_mask(Gamemode::Standard);

        assert_eq!(masked, Mods::DOUBLETIME | Mods::HARDROCK);
    }

    #[test]
    fn difficulty_mask_keeps_key_mods_for_mania_only() {
        let mods = Mods::KEY7 | Mods::HALFTIME | Mods::SUDDENDEATH;

        assert_eq!(
            mods.difficulty_mask(Gamemode::Mania),
            Mods::KEY7 | Mods::HALFTIME
        );
        assert_eq!(mods.difficulty_mask(Gamemode::Standard), Mods::HALFTIME);
    }

    #[test]
    fn repr_is_alphabetical_and_order_independent() {
        assert_eq!(repr(Mods::empty()), "NM");
        assert_eq!(repr(Mods::HIDDEN | Mods::DOUBLETIME), "DTHD");
        assert_eq!(repr(Mods::DOUBLETIME | Mods::HIDDEN), "DTHD");
        assert_eq!(repr(Mods::NOFAIL | Mods::EASY), "EZNF");
    }
}
