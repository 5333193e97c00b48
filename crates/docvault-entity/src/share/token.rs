//! Share token normalization.
//!
//! Tokens are minted by more than one subsystem and circulate in two
//! textual forms: 32-character lowercase hex and dashed UUID. Both must
//! resolve to the same record, so the token is normalized into a single
//! canonical type at the resolver boundary and every downstream component
//! operates on that type only.

use uuid::Uuid;

/// A normalized share token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ShareToken(Uuid);

impl ShareToken {
    /// Parse a raw token string.
    ///
    /// Accepts the 32-char hex form and the dashed-UUID form, in any
    /// letter case. Anything else is not a token (it may still be an
    /// alias slug, which the resolver tries next).
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        match raw.len() {
            32 => {
                if !raw.chars().all(|c| c.is_ascii_hexdigit()) {
                    return None;
                }
                Uuid::try_parse(raw).ok().map(Self)
            }
            36 => Uuid::try_parse(raw).ok().map(Self),
            _ => None,
        }
    }

    /// The canonical 32-char lowercase hex form (storage default).
    pub fn hex(&self) -> String {
        self.0.simple().to_string()
    }

    /// The dashed-UUID form (legacy minting path).
    pub fn dashed(&self) -> String {
        self.0.hyphenated().to_string()
    }

    /// Both textual candidate forms, tried against storage in one query.
    pub fn candidates(&self) -> [String; 2] {
        [self.hex(), self.dashed()]
    }
}

impl std::fmt::Display for ShareToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.hex())
    }
}
