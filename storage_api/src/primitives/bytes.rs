use std::{fmt::Display, str::FromStr};

/// Error returned when a byte count cannot be parsed.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseByteCountError {
    #[error("Missing numeric value in '{0}'")]
    MissingValue(String),

    #[error("Invalid numeric value '{0}'")]
    InvalidValue(String),

    #[error("Unknown unit '{0}'")]
    UnknownUnit(String),

    #[error("Byte count '{0}' is too large")]
    Overflow(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct ByteCount(pub u64);

impl From<u64> for ByteCount {
    fn from(x: u64) -> Self {
        ByteCount(x)
    }
}

const KIB: u64 = 1 << 10;
const MIB: u64 = 1 << 20;
const GIB: u64 = 1 << 30;
const TIB: u64 = 1 << 40;

/// Multiplier for each accepted unit suffix. Single letters are binary.
fn unit_multiplier(unit: &str) -> Option<u64> {
    Some(match unit {
        "" | "B" => 1,
        "K" | "KiB" => KIB,
        "M" | "MiB" => MIB,
        "G" | "GiB" => GIB,
        "T" | "TiB" => TIB,
        "KB" => 1_000,
        "MB" => 1_000_000,
        "GB" => 1_000_000_000,
        "TB" => 1_000_000_000_000,
        _ => return None,
    })
}

impl ByteCount {
    pub fn bytes(self) -> u64 {
        self.0
    }

    pub fn from_gib(gib: u64) -> Self {
        ByteCount(gib * GIB)
    }

    pub fn to_human_readable(&self) -> String {
        match self.0.trailing_zeros() {
            _ if self.0 == 0 => "0".to_owned(),
            0..=9 => format!("{}", self.0),
            10..=19 => format!("{}K", self.0 >> 10),
            20..=29 => format!("{}M", self.0 >> 20),
            30..=39 => format!("{}G", self.0 >> 30),
            _ => format!("{}T", self.0 >> 40),
        }
    }

    /// Parses values such as `1024`, `20K`, `30 GiB`, `1.5 TiB` or `10GB`.
    /// Fractional byte amounts are truncated.
    pub fn from_human_readable(s: &str) -> Result<Self, ParseByteCountError> {
        let s = s.trim();
        let split = s
            .find(|c: char| !c.is_ascii_digit() && c != '.')
            .unwrap_or(s.len());
        let (value, unit) = (&s[..split], s[split..].trim());

        if value.is_empty() {
            return Err(ParseByteCountError::MissingValue(s.to_owned()));
        }
        let multiplier =
            unit_multiplier(unit).ok_or_else(|| ParseByteCountError::UnknownUnit(unit.to_owned()))?;

        let (integer, fraction) = match value.split_once('.') {
            Some((i, f)) => (i, f),
            None => (value, ""),
        };
        if (integer.is_empty() && fraction.is_empty())
            || fraction.contains('.')
            || fraction.len() > 18
        {
            return Err(ParseByteCountError::InvalidValue(value.to_owned()));
        }

        let digits: u128 = format!("{integer}{fraction}")
            .parse()
            .map_err(|_| ParseByteCountError::InvalidValue(value.to_owned()))?;
        let scale = 10u128.pow(fraction.len() as u32);
        let bytes = digits
            .checked_mul(multiplier as u128)
            .map(|b| b / scale)
            .and_then(|b| u64::try_from(b).ok())
            .ok_or_else(|| ParseByteCountError::Overflow(s.to_owned()))?;

        Ok(Self(bytes))
    }
}

impl Display for ByteCount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_human_readable())
    }
}

impl FromStr for ByteCount {
    type Err = ParseByteCountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_human_readable(s)
    }
}

impl<'de> serde::Deserialize<'de> for ByteCount {
    fn deserialize<D>(deserializer: D) -> Result<ByteCount, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        // Size may be provided as a string (e.g. "1 GiB") or as a pure number
        // (e.g. 1024). Serde forces a number when only digits are provided, so
        // we need to deserialize as a generic value and then check the type.
        let value = serde_yaml::Value::deserialize(deserializer)?;

        match value {
            serde_yaml::Value::String(s) => ByteCount::from_str(s.as_str())
                .map_err(|e| serde::de::Error::custom(format!("invalid byte count size: {e}"))),
            serde_yaml::Value::Number(n) => {
                let n = n.as_u64().ok_or_else(|| {
                    serde::de::Error::custom("invalid byte count size, expected unsigned integer")
                })?;
                Ok(ByteCount(n))
            }
            _ => Err(serde::de::Error::custom("invalid byte count size")),
        }
    }
}

impl serde::Serialize for ByteCount {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        if self.0 & 0x3FF != 0 {
            serializer.serialize_u64(self.0)
        } else {
            serializer.serialize_str(self.to_human_readable().as_str())
        }
    }
}
