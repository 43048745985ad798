//! Records kept in durable storage.

use bytes::{Buf, BufMut};
use commonware_codec::{EncodeSize, Error, FixedSize, Read, ReadExt, Write};

/// Durable keys.
#[derive(Hash, Eq, PartialEq, Ord, PartialOrd, Clone, Copy, Debug)]
pub enum Key {
    /// The coin balance (tag 0).
    Balance,
}

impl Key {
    /// Stable name of the key, as shown in logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Balance => "coins",
        }
    }
}

impl Write for Key {
    fn write(&self, writer: &mut impl BufMut) {
        match self {
            Self::Balance => 0u8.write(writer),
        }
    }
}

impl Read for Key {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        match u8::read(reader)? {
            0 => Ok(Self::Balance),
            i => Err(Error::InvalidEnum(i)),
        }
    }
}

impl FixedSize for Key {
    const SIZE: usize = u8::SIZE;
}

/// Durable values.
#[derive(Clone, Copy, Eq, PartialEq, Debug)]
pub enum Value {
    /// A coin count (tag 0).
    Coins(u64),
}

impl Write for Value {
    fn write(&self, writer: &mut impl BufMut) {
        match self {
            Self::Coins(coins) => {
                0u8.write(writer);
                coins.write(writer);
            }
        }
    }
}

impl Read for Value {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        match u8::read(reader)? {
            0 => Ok(Self::Coins(u64::read(reader)?)),
            i => Err(Error::InvalidEnum(i)),
        }
    }
}

impl EncodeSize for Value {
    fn encode_size(&self) -> usize {
        u8::SIZE
            + match self {
                Self::Coins(coins) => coins.encode_size(),
            }
    }
}

/// One key/value pair as laid out in a journal file.
#[derive(Clone, Copy, Eq, PartialEq, Debug)]
pub struct Entry {
    pub key: Key,
    pub value: Value,
}

impl Write for Entry {
    fn write(&self, writer: &mut impl BufMut) {
        self.key.write(writer);
        self.value.write(writer);
    }
}

impl Read for Entry {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        Ok(Self {
            key: Key::read(reader)?,
            value: Value::read(reader)?,
        })
    }
}

impl EncodeSize for Entry {
    fn encode_size(&self) -> usize {
        self.key.encode_size() + self.value.encode_size()
    }
}
