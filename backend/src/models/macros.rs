/// Defines a newtype ID wrapper around an integer-like scalar (typically `i64`)
/// and generates:
/// - derives (Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)
/// - `Display`
/// - `From<$inner> for $name` and `From<$name> for $inner`
///
/// The wrapper serializes transparently, so `ReadingId(7)` is `7` on the wire.
///
/// Usage:
///   define_id_type!(i64, ReadingId);
#[macro_export]
macro_rules! define_id_type {
    ($inner:ty, $name:ident) => {
        #[derive(
            Debug,
            Copy,
            Clone,
            PartialEq,
            Eq,
            PartialOrd,
            Ord,
            Hash,
            serde::Serialize,
            serde::Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub $inner);

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                ::std::write!(f, "{}", self.0)
            }
        }

        impl ::std::convert::From<$inner> for $name {
            fn from(v: $inner) -> Self {
                $name(v)
            }
        }

        impl ::std::convert::From<$name> for $inner {
            fn from(v: $name) -> Self {
                v.0
            }
        }

        impl $name {
            pub fn new(value: $inner) -> Self {
                $name(value)
            }

            pub fn value(&self) -> $inner {
                self.0
            }
        }
    };
}

#[cfg(test)]
mod tests {
    define_id_type!(i64, SampleKey);

    #[test]
    fn test_id_roundtrip_and_display() {
        let id = SampleKey::new(42);
        assert_eq!(id.value(), 42);
        assert_eq!(i64::from(id), 42);
        assert_eq!(SampleKey::from(42), id);
        assert_eq!(id.to_string(), "42");
    }

    #[test]
    fn test_id_serializes_transparently() {
        let json = serde_json::to_string(&SampleKey::new(9)).unwrap();
        assert_eq!(json, "9");
        let back: SampleKey = serde_json::from_str("9").unwrap();
        assert_eq!(back, SampleKey(9));
    }
}
