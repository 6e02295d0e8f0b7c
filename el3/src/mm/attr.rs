//! Caller-facing memory attribute encoding and its stage 1 descriptor bits.
//!
//! ```text
//! [2:0] MAIR index   [3] read-only   [5:4] PAS   [7:6] shareability
//! [8]   execute-never                [63:9] reserved, zero
//! ```

use super::page_table::Desc;
use super::Error;

use armv9a::define_bits;

define_bits!(
    AttrArg,
    RESERVED[63 - 9],
    XN[8 - 8],
    SH[7 - 6],
    PAS[5 - 4],
    RO[3 - 3],
    INDEX[2 - 0]
);

pub mod mair_index {
    pub const DEVICE: u64 = 0;
    pub const NORMAL_NC: u64 = 1;
    pub const NORMAL_WB: u64 = 2;
}

pub mod shareable {
    pub const NON: u64 = 0b00;
    pub const OUTER: u64 = 0b10;
    pub const INNER: u64 = 0b11;
}

/// Physical address space.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Pas {
    Secure = 0,
    NonSecure = 1,
    Root = 2,
    Realm = 3,
}

impl Pas {
    pub fn from_bits(bits: u64) -> Option<Pas> {
        match bits {
            0 => Some(Pas::Secure),
            1 => Some(Pas::NonSecure),
            2 => Some(Pas::Root),
            3 => Some(Pas::Realm),
            _ => None,
        }
    }

    /// (NS, NSE) as used by EL3 descriptors, SCR_EL3 and PA-based CMOs.
    pub fn ns_nse(&self) -> (u64, u64) {
        match self {
            Pas::Secure => (0, 0),
            Pas::NonSecure => (1, 0),
            Pas::Root => (0, 1),
            Pas::Realm => (1, 1),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MemAttributes {
    pub index: u64,
    pub read_only: bool,
    pub pas: Pas,
    pub shareability: u64,
    pub execute_never: bool,
}

impl MemAttributes {
    /// Normal write-back, inner-shareable, read-write, non-executable.
    pub const fn normal(pas: Pas) -> Self {
        Self {
            index: mair_index::NORMAL_WB,
            read_only: false,
            pas,
            shareability: shareable::INNER,
            execute_never: true,
        }
    }

    pub fn encode(&self) -> u64 {
        AttrArg::new(0)
            .set_masked_value(AttrArg::INDEX, self.index)
            .set_masked_value(AttrArg::RO, self.read_only as u64)
            .set_masked_value(AttrArg::PAS, self.pas as u64)
            .set_masked_value(AttrArg::SH, self.shareability)
            .set_masked_value(AttrArg::XN, self.execute_never as u64)
            .get()
    }

    /// Lower and upper attributes of a stage 1 EL3 page descriptor.
    pub fn descriptor_bits(&self) -> u64 {
        let (ns, nse) = self.pas.ns_nse();
        let ap = match self.read_only {
            true => 0b10,
            false => 0b00,
        };
        Desc::new(0)
            .set_masked_value(Desc::ATTR_INDX, self.index)
            .set_masked_value(Desc::AP, ap)
            .set_masked_value(Desc::NS, ns)
            .set_masked_value(Desc::NSE, nse)
            .set_masked_value(Desc::SH, self.shareability)
            .set_masked_value(Desc::XN, self.execute_never as u64)
            .set_bits(Desc::AF)
            .get()
    }
}

impl TryFrom<u64> for MemAttributes {
    type Error = Error;

    fn try_from(raw: u64) -> Result<Self, Error> {
        let arg = AttrArg::new(raw);
        if arg.get_masked(AttrArg::RESERVED) != 0 {
            return Err(Error::InvalidAttributes);
        }

        let index = arg.get_masked_value(AttrArg::INDEX);
        if index > mair_index::NORMAL_WB {
            return Err(Error::InvalidAttributes);
        }

        let shareability = arg.get_masked_value(AttrArg::SH);
        if shareability == 0b01 {
            return Err(Error::InvalidAttributes);
        }

        let pas = Pas::from_bits(arg.get_masked_value(AttrArg::PAS)).ok_or(Error::InvalidAttributes)?;

        Ok(Self {
            index,
            read_only: arg.is_set(AttrArg::RO),
            pas,
            shareability,
            execute_never: arg.is_set(AttrArg::XN),
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn decode_valid_encoding() {
        // normal WB, read-only, realm, inner shareable, XN
        let attrs = MemAttributes::try_from(0b1_11_11_1_010).unwrap();
        assert_eq!(attrs.index, mair_index::NORMAL_WB);
        assert!(attrs.read_only);
        assert_eq!(attrs.pas, Pas::Realm);
        assert_eq!(attrs.shareability, shareable::INNER);
        assert!(attrs.execute_never);
        assert_eq!(attrs.encode(), 0b1_11_11_1_010);
    }

    #[test]
    fn reject_invalid_encodings() {
        assert_eq!(MemAttributes::try_from(0b011), Err(Error::InvalidAttributes));
        assert_eq!(MemAttributes::try_from(0b01_000000), Err(Error::InvalidAttributes));
        assert_eq!(MemAttributes::try_from(1 << 9), Err(Error::InvalidAttributes));
        assert_eq!(MemAttributes::try_from(1 << 63), Err(Error::InvalidAttributes));
    }

    #[test]
    fn descriptor_bits_follow_pas() {
        let ns = MemAttributes::normal(Pas::NonSecure).descriptor_bits();
        assert_eq!(ns & Desc::NS, Desc::NS);
        assert_eq!(ns & Desc::NSE, 0);
        assert_eq!(ns & Desc::AF, Desc::AF);
        assert_eq!(ns & Desc::XN, Desc::XN);

        let realm = MemAttributes::normal(Pas::Realm).descriptor_bits();
        assert_eq!(realm & (Desc::NS | Desc::NSE), Desc::NS | Desc::NSE);

        let root = MemAttributes::normal(Pas::Root).descriptor_bits();
        assert_eq!(root & (Desc::NS | Desc::NSE), Desc::NSE);
    }

    #[test]
    fn read_only_sets_ap() {
        let mut attrs = MemAttributes::normal(Pas::Secure);
        attrs.read_only = true;
        let bits = Desc::new(attrs.descriptor_bits());
        assert_eq!(bits.get_masked_value(Desc::AP), 0b10);
    }
}
