use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

/// Shields a value from `Debug` and `Display` formatting. Request payloads
/// carry plaintext passwords through handlers that log with `tracing`
/// field captures; wrapping the field keeps the secret out of those lines.
#[derive(Clone, Deserialize)]
pub struct Masked<T>(pub T);

impl<T> Masked<T> {
    /// Consume the wrapper, e.g. to hand the plaintext to the hasher.
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T: fmt::Display> fmt::Debug for Masked<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("********")
    }
}

impl<T: fmt::Display> fmt::Display for Masked<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("********")
    }
}

// Serialization stays transparent: only the human-readable formats mask.
impl<T: Serialize> Serialize for Masked<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.0.serialize(serializer)
    }
}
