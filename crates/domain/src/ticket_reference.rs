// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Passenger-facing booking codes.
//!
//! A ticket reference is `TKT-` followed by eight characters of the
//! Crockford base-32 alphabet, which omits `I`, `L`, `O` and `U` so the
//! code survives being read aloud or copied by hand.

use crate::error::DomainError;
use serde::{Deserialize, Serialize};

const PREFIX: &str = "TKT-";
const BODY_LEN: usize = 8;
const ALPHABET: &[u8; 32] = b"0123456789ABCDEFGHJKMNPQRSTVWXYZ";

/// A validated, upper-case ticket reference.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TicketReference(String);

impl TicketReference {
    /// Encodes the low 40 bits of `entropy` as a ticket reference.
    #[must_use]
    pub fn from_entropy(entropy: u64) -> Self {
        let mut value: String = String::with_capacity(PREFIX.len() + BODY_LEN);
        value.push_str(PREFIX);
        for index in (0..BODY_LEN).rev() {
            #[allow(clippy::cast_possible_truncation)]
            let symbol: usize = ((entropy >> (index * 5)) & 0x1F) as usize;
            value.push(char::from(ALPHABET[symbol]));
        }
        Self(value)
    }

    /// Parses user input, accepting any letter case.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTicketReference` if the input is not `TKT-` followed by
    /// eight Crockford base-32 characters.
    pub fn parse(input: &str) -> Result<Self, DomainError> {
        let normalized: String = input.trim().to_ascii_uppercase();
        let Some(body) = normalized.strip_prefix(PREFIX) else {
            return Err(DomainError::InvalidTicketReference(input.to_string()));
        };
        if body.len() != BODY_LEN || !body.bytes().all(|b| ALPHABET.contains(&b)) {
            return Err(DomainError::InvalidTicketReference(input.to_string()));
        }
        Ok(Self(normalized))
    }

    /// Returns the reference as stored and printed.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for TicketReference {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<TicketReference> for String {
    fn from(value: TicketReference) -> Self {
        value.0
    }
}

impl std::fmt::Display for TicketReference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
