/// Serialize a closed enum as its string id and deserialize leniently:
/// unknown ids and non-string values resolve to the given fallback variant
/// with a warning, so presets written by newer versions still load.
///
/// The enum must provide `fn id(&self) -> &'static str` and
/// `fn from_id(&str) -> Option<Self>`.
macro_rules! lenient_string_enum {
    ($ty:ty, $fallback:expr, $what:literal) => {
        impl serde::Serialize for $ty {
            fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.id())
            }
        }

        impl<'de> serde::Deserialize<'de> for $ty {
            fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let value = <serde_json::Value as serde::Deserialize>::deserialize(deserializer)?;
                let found = match &value {
                    serde_json::Value::String(id) => <$ty>::from_id(id),
                    _ => None,
                };
                Ok(found.unwrap_or_else(|| {
                    tracing::warn!(value = %value, kind = $what, "unknown id, using none");
                    $fallback
                }))
            }
        }
    };
}
