use bitflags::bitflags;

bitflags! {
    /// Misc flags on one relation cell.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
    pub struct FlagCell: u8 {
        /// the cell holds a link.
        const CONNECTED  = 0b0000_0001;
        /// the cell may be flipped by the optimizer.
        const MUTABLE    = 0b0000_0010;
        /// an immutable cell which must hold (compulsory fact).
        const FORCED     = 0b0000_0100;
        /// an immutable cell which must never hold.
        const IMPOSSIBLE = 0b0000_1000;
        /// the cell was added by saturation, not by the input data.
        const DERIVED    = 0b0001_0000;
    }
}
