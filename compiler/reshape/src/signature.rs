//! Cache keys for compiled artifacts.

use std::fmt;

use bitflags::bitflags;
use reshape_types::TypeId;

/// The operation an artifact performs.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum OpKind {
    Map,
    Copy,
    Project,
    Encode,
    Decode,
    MapList,
    CopyList,
    ProjectList,
}

impl OpKind {
    pub const fn name(self) -> &'static str {
        match self {
            OpKind::Map => "map",
            OpKind::Copy => "copy",
            OpKind::Project => "project",
            OpKind::Encode => "encode",
            OpKind::Decode => "decode",
            OpKind::MapList => "map_list",
            OpKind::CopyList => "copy_list",
            OpKind::ProjectList => "project_list",
        }
    }
}

bitflags! {
    /// Options that change the generated code.
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
    pub struct OpFlags: u8 {
        /// Share nested references instead of copying them.
        const SHALLOW = 1 << 0;
    }
}

/// Identity of one artifact: equal signatures always denote the same
/// generated code.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Signature {
    pub kind: OpKind,
    /// Element type for the list operations.
    pub source: TypeId,
    pub target: TypeId,
    pub flags: OpFlags,
}

impl Signature {
    pub fn new(kind: OpKind, source: TypeId, target: TypeId, shallow: bool) -> Self {
        let flags = if shallow {
            OpFlags::SHALLOW
        } else {
            OpFlags::empty()
        };
        Signature {
            kind,
            source,
            target,
            flags,
        }
    }

    #[inline]
    pub fn shallow(&self) -> bool {
        self.flags.contains(OpFlags::SHALLOW)
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} -> {}", self.kind.name(), self.source, self.target)?;
        if self.shallow() {
            f.write_str(" shallow")?;
        }
        Ok(())
    }
}
