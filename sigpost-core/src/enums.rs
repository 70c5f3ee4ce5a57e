//! Closed string enumerations with a fixed wire spelling
//!
//! Every enum field of a signal serializes as a lower-camel-case string.
//! Decoding tolerates case variations of the known spellings, but an
//! unrecognized value is a decode error, never a silent coercion.

use thiserror::Error;

/// A string did not match any member of a closed enumeration.
#[derive(Debug, Clone, Error)]
#[error("unrecognized {kind} value: `{value}`")]
pub struct UnknownEnumValue {
    /// Name of the enumeration.
    pub kind: &'static str,
    /// The offending input.
    pub value: String,
}

/// Defines a closed string enum: variants with their wire spelling,
/// case-insensitive `FromStr`, and serde impls over the string form.
macro_rules! str_enum {
    (
        $(#[$meta:meta])*
        $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident => $text:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $( $(#[$vmeta])* $variant, )+
        }

        impl $name {
            /// The wire spelling of this value.
            pub fn as_str(&self) -> &'static str {
                match self {
                    $( Self::$variant => $text, )+
                }
            }
        }

        impl ::std::str::FromStr for $name {
            type Err = $crate::enums::UnknownEnumValue;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                $(
                    if s.eq_ignore_ascii_case($text) {
                        return Ok(Self::$variant);
                    }
                )+
                Err($crate::enums::UnknownEnumValue {
                    kind: stringify!($name),
                    value: s.to_string(),
                })
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl ::serde::Serialize for $name {
            fn serialize<S: ::serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_str())
            }
        }

        impl<'de> ::serde::Deserialize<'de> for $name {
            fn deserialize<D: ::serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let raw = <String as ::serde::Deserialize>::deserialize(deserializer)?;
                raw.parse().map_err(::serde::de::Error::custom)
            }
        }
    };
}

pub(crate) use str_enum;

#[cfg(test)]
mod tests {
    str_enum! {
        Sample {
            One => "one",
            TwoWords => "twoWords",
        }
    }

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!("ONE".parse::<Sample>().unwrap(), Sample::One);
        assert_eq!("twowords".parse::<Sample>().unwrap(), Sample::TwoWords);
    }

    #[test]
    fn test_unknown_value_is_an_error() {
        let err = "three".parse::<Sample>().unwrap_err();
        assert_eq!(err.kind, "Sample");
        assert_eq!(err.value, "three");
    }

    #[test]
    fn test_serde_uses_wire_spelling() {
        let json = serde_json::to_string(&Sample::TwoWords).unwrap();
        assert_eq!(json, "\"twoWords\"");
        let back: Sample = serde_json::from_str("\"twoWords\"").unwrap();
        assert_eq!(back, Sample::TwoWords);
    }
}
