use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

macro_rules! string_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

string_newtype!(SlideId);
string_newtype!(PriceId);
string_newtype!(CheckoutSessionId);

/// Sheet-backed event ids arrive either as numbers or as strings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct EventId(pub String);

impl<'de> Deserialize<'de> for EventId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Text(String),
            Int(i64),
            Float(f64),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Text(value) => EventId(value),
            Raw::Int(value) => EventId(value.to_string()),
            Raw::Float(value) => EventId(value.to_string()),
        })
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckoutMode {
    Payment,
    Subscription,
}

impl CheckoutMode {
    pub fn as_str(self) -> &'static str {
        match self {
            CheckoutMode::Payment => "payment",
            CheckoutMode::Subscription => "subscription",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DonationFrequency {
    OneTime,
    Monthly,
}

impl DonationFrequency {
    pub fn is_recurring(self) -> bool {
        self == DonationFrequency::Monthly
    }

    pub fn checkout_mode(self) -> CheckoutMode {
        match self {
            DonationFrequency::OneTime => CheckoutMode::Payment,
            DonationFrequency::Monthly => CheckoutMode::Subscription,
        }
    }

    pub fn metadata_label(self) -> &'static str {
        match self {
            DonationFrequency::OneTime => "one-time",
            DonationFrequency::Monthly => "recurring",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MembershipLevel {
    Individual,
    Family,
    Student,
    Senior,
    Patron,
    Benefactor,
}

impl MembershipLevel {
    pub const ALL: [MembershipLevel; 6] = [
        MembershipLevel::Individual,
        MembershipLevel::Family,
        MembershipLevel::Student,
        MembershipLevel::Senior,
        MembershipLevel::Patron,
        MembershipLevel::Benefactor,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            MembershipLevel::Individual => "individual",
            MembershipLevel::Family => "family",
            MembershipLevel::Student => "student",
            MembershipLevel::Senior => "senior",
            MembershipLevel::Patron => "patron",
            MembershipLevel::Benefactor => "benefactor",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        Self::ALL
            .into_iter()
            .find(|level| level.as_str().eq_ignore_ascii_case(raw))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    Success,
    Error,
}
