use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Invalid {field} value: {value}")]
pub struct InvalidEnum {
    pub field: String,
    pub value: String,
}

/// Macro to generate enum with as_str + std::str::FromStr pattern
macro_rules! str_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $s)] $variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$(Self::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }
        }

        impl std::str::FromStr for $name {
            type Err = InvalidEnum;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(InvalidEnum {
                        field: stringify!($name).into(),
                        value: s.into(),
                    }),
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

str_enum!(
    /// Canonical screening outcome. Keys are the literals used by the clinic's template.
    DiagnosisCategory {
        Normal => "NORMAL",
        DiagnosedNormal => "DG NORMAL",
        Cataract => "CATARATA",
        DiabeticRetinopathy => "RD",
        Other => "OTROS",
    }
);

/// Professional whose signature closes a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Signer {
    Ophthalmologist,
    Technician,
}

impl Signer {
    pub fn caption(&self) -> &'static str {
        match self {
            Self::Ophthalmologist => "Médico Oftalmólogo",
            Self::Technician => "Tecnólogo Médico",
        }
    }
}

impl DiagnosisCategory {
    /// Outcomes reviewed by an ophthalmologist are signed by one; screening-only
    /// outcomes carry the technician's signature.
    pub fn signer(&self) -> Signer {
        match self {
            Self::DiagnosedNormal | Self::DiabeticRetinopathy | Self::Other => {
                Signer::Ophthalmologist
            }
            Self::Normal | Self::Cataract => Signer::Technician,
        }
    }

    /// Folder name for this category inside a batch directory.
    pub fn folder_name(&self) -> String {
        self.as_str().replace(' ', "_")
    }
}
