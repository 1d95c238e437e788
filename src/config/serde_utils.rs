// Copyright (C) 2025 FZI Forschungszentrum Informatik
// SPDX-License-Identifier: Apache-2.0
//! Serde-specific utilties

use core::fmt;

use serde::{Deserializer, Serializer};

/// Serde "module" for (de)serializing optional numbers as hex strings
///
/// Serialization produces `0x`-prefixed hex strings. Deserialization accepts
/// plain integers as well as hex strings with or without prefix. `null` and
/// `"N/A"` are read as `None`.
pub struct Hex;

impl Hex {
    pub fn serialize<S>(value: &Option<u64>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(v) => serializer.collect_str(&format_args!("{v:#x}")),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(NumVisitor { radix: 16 })
    }
}

/// Serde "module" for deserializing optional decimal numbers
///
/// Like [`Hex`], but strings without `0x` prefix are read as decimal numbers.
/// Values are serialized as plain integers.
pub struct Dec;

impl Dec {
    pub fn serialize<S>(value: &Option<u64>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(v) => serializer.serialize_u64(*v),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(NumVisitor { radix: 10 })
    }
}

/// [`Visitor`][serde::de::Visitor] for parsing lenient numbers
struct NumVisitor {
    /// Radix for strings without prefix
    radix: u32,
}

impl<'de> serde::de::Visitor<'de> for NumVisitor {
    type Value = Option<u64>;

    fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "an unsigned integer or a numeric string")
    }

    fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E>
    where
        E: serde::de::Error,
    {
        Ok(Some(v))
    }

    fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E>
    where
        E: serde::de::Error,
    {
        u64::try_from(v)
            .map(Some)
            .map_err(|_| E::invalid_value(serde::de::Unexpected::Signed(v), &self))
    }

    fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
    where
        E: serde::de::Error,
    {
        let v = v.trim();
        if v.is_empty() || v == "N/A" {
            return Ok(None);
        }
        let (digits, radix) = v
            .strip_prefix("0x")
            .or_else(|| v.strip_prefix("0X"))
            .map_or((v, self.radix), |d| (d, 16));
        u64::from_str_radix(digits, radix)
            .map(Some)
            .map_err(|_| E::invalid_value(serde::de::Unexpected::Str(v), &self))
    }

    fn visit_none<E>(self) -> Result<Self::Value, E>
    where
        E: serde::de::Error,
    {
        Ok(None)
    }

    fn visit_unit<E>(self) -> Result<Self::Value, E>
    where
        E: serde::de::Error,
    {
        Ok(None)
    }

    fn visit_some<D>(self, deserializer: D) -> Result<Self::Value, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(self)
    }
}
