use crate::erasure::{Codec, NovelPolyCodec, Rsgf8Codec};
use serde::{Deserialize, Deserializer};
use std::fmt::Display;

/// The codecs a square can be extended and repaired with
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CodecKind {
    /// GF(2^16) reed-solomon, supports wide squares
    NovelPoly,
    /// GF(2^8) reed-solomon, up to 128 original chunks per axis
    #[default]
    Rsgf8,
}

impl CodecKind {
    pub fn build(&self) -> Box<dyn Codec> {
        match self {
            Self::NovelPoly => Box::new(NovelPolyCodec),
            Self::Rsgf8 => Box::new(Rsgf8Codec),
        }
    }
}

impl<'de> Deserialize<'de> for CodecKind {
    fn deserialize<D>(deserializer: D) -> Result<CodecKind, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s: String = Deserialize::deserialize(deserializer)?;
        Self::try_from(s.as_str()).map_err(serde::de::Error::custom)
    }
}

impl TryFrom<&str> for CodecKind {
    type Error = String;
    fn try_from(s: &str) -> Result<Self, Self::Error> {
        match s.to_lowercase().as_str() {
            "novelpoly" | "leopard" | "ff16" => Ok(Self::NovelPoly),
            "rsgf8" | "ff8" => Ok(Self::Rsgf8),
            other => Err(format!("unknown codec: {}", other)),
        }
    }
}

impl Display for CodecKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::NovelPoly => "novelpoly",
            Self::Rsgf8 => "rsgf8",
        };
        write!(f, "{}", s)
    }
}

/// Repair configuration
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct Config {
    #[serde(default)]
    pub codec: CodecKind,
}
