use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Source {
    Format,
    Kategori,
}

impl Source {
    pub const ALL: [Source; 2] = [Source::Format, Source::Kategori];

    pub fn label(self) -> &'static str {
        match self {
            Source::Format => "Format",
            Source::Kategori => "Kategori",
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
