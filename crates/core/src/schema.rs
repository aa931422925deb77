#![forbid(unsafe_code)]

mod primary;
mod secondary;

pub use primary::*;
pub use secondary::*;

use crate::ids::{Handle, RecordKind};
use serde::{Deserialize, Serialize};

/// Bookkeeping shared by every primary record.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Header {
    #[serde(default = "Handle::generate")]
    pub handle: Handle,
    /// Human-facing id, unique within its kind. Blank until the store assigns one.
    #[serde(default)]
    pub gramps_id: String,
    #[serde(default)]
    pub change_ms: i64,
    #[serde(default)]
    pub private: bool,
}

impl Header {
    pub fn new(handle: Handle) -> Self {
        Self {
            handle,
            gramps_id: String::new(),
            change_ms: 0,
            private: false,
        }
    }
}

impl Default for Header {
    fn default() -> Self {
        Self::new(Handle::generate())
    }
}

macro_rules! define_record {
    ($($variant:ident),* $(,)?) => {
        /// Any primary record, tagged by kind when serialized.
        #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
        #[serde(tag = "kind", rename_all = "snake_case")]
        pub enum Record {
            $($variant($variant),)*
        }

        impl Record {
            pub fn kind(&self) -> RecordKind {
                match self {
                    $(Record::$variant(_) => RecordKind::$variant,)*
                }
            }

            pub fn header(&self) -> &Header {
                match self {
                    $(Record::$variant(inner) => &inner.header,)*
                }
            }

            pub fn header_mut(&mut self) -> &mut Header {
                match self {
                    $(Record::$variant(inner) => &mut inner.header,)*
                }
            }
        }

        $(
            impl From<$variant> for Record {
                fn from(value: $variant) -> Self {
                    Record::$variant(value)
                }
            }
        )*
    };
}

define_record!(Person, Family, Event, Place, Source, Repository, Media, Note);

impl Record {
    pub fn handle(&self) -> &Handle {
        &self.header().handle
    }

    pub fn gramps_id(&self) -> &str {
        &self.header().gramps_id
    }

    pub fn is_private(&self) -> bool {
        self.header().private
    }
}
