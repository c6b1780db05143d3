use std::{cmp::Ordering, convert::Infallible, num::NonZeroU32, str::FromStr};

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

use crate::{
    is_default,
    primitives::{bytes::ByteCount, shortcuts::one_or_many},
    system::Device,
    DeviceName,
};

/// Name that selects every available device.
pub const SEARCH_ANY: &str = "*";

/// Describes how to find the device backing a config entry, and records the
/// result once the entry has been solved.
///
/// In YAML a search can be written as a device name, as `"*"` to select any
/// device (skipping the entry if nothing is found), or as a mapping:
///
/// ```yaml
/// search:
///   condition:
///     size:
///       greater: 15 GiB
///   sort: { size: desc }
///   max: 2
///   ifNotFound: skip
/// ```
#[derive(Serialize, Deserialize, Debug, Default, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Search {
    /// Condition a device must satisfy. Any device when omitted.
    #[serde(
        default,
        skip_serializing_if = "is_default",
        serialize_with = "serde_yaml::with::singleton_map_recursive::serialize",
        deserialize_with = "serde_yaml::with::singleton_map_recursive::deserialize"
    )]
    pub condition: SearchCondition,

    /// Order in which matching devices are considered. Either a single
    /// criterion or a list of them, the first one being the primary key.
    #[serde(
        default,
        skip_serializing_if = "Vec::is_empty",
        deserialize_with = "one_or_many",
        serialize_with = "serde_yaml::with::singleton_map_recursive::serialize"
    )]
    pub sort: Vec<SortCriterion>,

    /// Maximum number of devices to match. Unbounded when omitted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<NonZeroU32>,

    /// What to do with the entry when no device matches.
    #[serde(default, skip_serializing_if = "is_default")]
    pub if_not_found: IfNotFound,

    /// Result of the search. Never read from the configuration.
    #[serde(
        skip_deserializing,
        skip_serializing_if = "SearchResolution::is_unsolved",
        serialize_with = "serde_yaml::with::singleton_map_recursive::serialize"
    )]
    pub resolution: SearchResolution,
}

impl Search {
    /// Search matching any device, up to `max` of them.
    pub fn any(max: Option<NonZeroU32>) -> Self {
        Self {
            max,
            ..Default::default()
        }
    }

    /// Search used by drives that do not specify one: the first available
    /// disk, failing if there is none.
    pub fn default_drive() -> Self {
        Self::any(NonZeroU32::new(1))
    }

    pub fn by_name(name: impl Into<DeviceName>) -> Self {
        Self {
            condition: SearchCondition::Name(name.into()),
            ..Default::default()
        }
    }

    pub fn is_solved(&self) -> bool {
        !self.resolution.is_unsolved()
    }

    /// Name of the matched device, if the search found one.
    pub fn device(&self) -> Option<&DeviceName> {
        match &self.resolution {
            SearchResolution::Solved(device) => device.as_ref(),
            SearchResolution::Unsolved => None,
        }
    }

    /// Records the result of the search. Already solved searches keep their
    /// first result.
    pub fn solve(&mut self, device: Option<DeviceName>) {
        if self.resolution.is_unsolved() {
            self.resolution = SearchResolution::Solved(device);
        }
    }

    /// Whether the condition can select several devices. Only these searches
    /// expand their entry into one copy per matched device. Size conditions
    /// take the first device satisfying them.
    pub fn is_filter(&self) -> bool {
        matches!(self.condition, SearchCondition::Any)
    }

    /// Maximum number of devices the search can match.
    pub fn limit(&self) -> Option<usize> {
        if self.is_filter() {
            self.max.map(|max| max.get() as usize)
        } else {
            Some(1)
        }
    }

    /// Solved without a device, and no device will be created in its place.
    pub fn is_missing(&self) -> bool {
        self.resolution == SearchResolution::Solved(None)
            && self.if_not_found != IfNotFound::Create
    }

    /// Solved without a device, and the entry must be ignored.
    pub fn skip_device(&self) -> bool {
        self.resolution == SearchResolution::Solved(None) && self.if_not_found == IfNotFound::Skip
    }

    /// Solved without a device, and the entry must be created instead.
    pub fn create_device(&self) -> bool {
        self.resolution == SearchResolution::Solved(None)
            && self.if_not_found == IfNotFound::Create
    }

    /// Solved without a device, and the configuration cannot be honored.
    pub fn not_found_error(&self) -> bool {
        self.resolution == SearchResolution::Solved(None)
            && self.if_not_found == IfNotFound::Error
    }

    /// Compares two devices according to the sort criteria. Devices that
    /// compare equal keep their relative order.
    pub fn compare(&self, a: &Device, b: &Device) -> Ordering {
        self.sort
            .iter()
            .fold(Ordering::Equal, |ord, criterion| {
                ord.then_with(|| criterion.compare(a, b))
            })
    }
}

impl FromStr for Search {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(if s == SEARCH_ANY {
            Self {
                if_not_found: IfNotFound::Skip,
                ..Default::default()
            }
        } else {
            Self::by_name(s)
        })
    }
}

/// Condition a device must satisfy to be matched by a search.
#[derive(Serialize, Deserialize, Debug, Default, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub enum SearchCondition {
    /// Any device.
    #[default]
    Any,

    /// The device with the given name.
    Name(DeviceName),

    /// Devices whose size satisfies the comparison.
    Size(SizeCondition),

    /// The partition with the given number.
    Number(u32),
}

impl SearchCondition {
    pub fn matches(&self, device: &Device) -> bool {
        match self {
            SearchCondition::Any => true,
            SearchCondition::Name(name) => &device.name == name,
            SearchCondition::Size(size) => size.matches(device.size),
            SearchCondition::Number(number) => device.number == Some(*number),
        }
    }
}

/// Size comparison. A bare size means `equal`.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "camelCase", from = "SizeConditionRepr")]
pub enum SizeCondition {
    Equal(ByteCount),
    Greater(ByteCount),
    Less(ByteCount),
}

impl SizeCondition {
    pub fn matches(&self, size: ByteCount) -> bool {
        match *self {
            SizeCondition::Equal(value) => size == value,
            SizeCondition::Greater(value) => size > value,
            SizeCondition::Less(value) => size < value,
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
enum SizeConditionRepr {
    Equal(ByteCount),
    Greater(ByteCount),
    Less(ByteCount),
    #[serde(untagged)]
    Bare(ByteCount),
}

impl From<SizeConditionRepr> for SizeCondition {
    fn from(repr: SizeConditionRepr) -> Self {
        match repr {
            SizeConditionRepr::Equal(v) | SizeConditionRepr::Bare(v) => SizeCondition::Equal(v),
            SizeConditionRepr::Greater(v) => SizeCondition::Greater(v),
            SizeConditionRepr::Less(v) => SizeCondition::Less(v),
        }
    }
}

#[derive(
    Serialize, Deserialize, Copy, Clone, Debug, Hash, Eq, PartialEq, Display, EnumString,
)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum SortField {
    Name,
    Size,
    Number,
}

#[derive(
    Serialize, Deserialize, Copy, Clone, Debug, Default, Hash, Eq, PartialEq, Display, EnumString,
)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

/// One sort key. Written either as the field name (ascending) or as a
/// single-entry mapping from field to direction, e.g. `{ size: desc }`.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(from = "SortCriterionRepr", into = "SortCriterionRepr")]
pub struct SortCriterion {
    pub field: SortField,
    pub direction: SortDirection,
}

impl SortCriterion {
    pub fn new(field: SortField, direction: SortDirection) -> Self {
        Self { field, direction }
    }

    pub fn compare(&self, a: &Device, b: &Device) -> Ordering {
        let ord = match self.field {
            SortField::Name => a.name.cmp(&b.name),
            SortField::Size => a.size.cmp(&b.size),
            SortField::Number => a.number.cmp(&b.number),
        };
        match self.direction {
            SortDirection::Asc => ord,
            SortDirection::Desc => ord.reverse(),
        }
    }
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
enum SortCriterionRepr {
    Name(SortDirection),
    Size(SortDirection),
    Number(SortDirection),
    #[serde(untagged)]
    Field(SortField),
}

impl From<SortCriterionRepr> for SortCriterion {
    fn from(repr: SortCriterionRepr) -> Self {
        match repr {
            SortCriterionRepr::Name(d) => Self::new(SortField::Name, d),
            SortCriterionRepr::Size(d) => Self::new(SortField::Size, d),
            SortCriterionRepr::Number(d) => Self::new(SortField::Number, d),
            SortCriterionRepr::Field(f) => Self::new(f, SortDirection::Asc),
        }
    }
}

impl From<SortCriterion> for SortCriterionRepr {
    fn from(criterion: SortCriterion) -> Self {
        match criterion.field {
            SortField::Name => SortCriterionRepr::Name(criterion.direction),
            SortField::Size => SortCriterionRepr::Size(criterion.direction),
            SortField::Number => SortCriterionRepr::Number(criterion.direction),
        }
    }
}

#[derive(
    Serialize, Deserialize, Copy, Clone, Debug, Default, Hash, Eq, PartialEq, Display, EnumString,
)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum IfNotFound {
    /// The configuration is invalid if no device is found.
    #[default]
    Error,

    /// The entry is ignored.
    Skip,

    /// A new device is created for the entry.
    Create,
}

/// State of a search.
#[derive(Serialize, Debug, Default, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum SearchResolution {
    #[default]
    Unsolved,

    /// The search ran. Holds the name of the matched device, if any.
    Solved(Option<DeviceName>),
}

impl SearchResolution {
    pub fn is_unsolved(&self) -> bool {
        matches!(self, SearchResolution::Unsolved)
    }
}
