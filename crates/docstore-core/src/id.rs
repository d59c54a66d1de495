// SPDX-FileCopyrightText: 2026 Docstore Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Auto-generated document identifiers.

use rand::distributions::Alphanumeric;
use rand::Rng;

/// Length of generated document ids.
pub const AUTO_ID_LEN: usize = 20;

/// Returns a random 20-character alphanumeric document id.
pub fn auto_id() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(AUTO_ID_LEN)
        .map(char::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn auto_ids_are_alphanumeric_and_distinct() {
        let ids: HashSet<String> = (0..500).map(|_| auto_id()).collect();
        assert_eq!(ids.len(), 500);
        for id in &ids {
            assert_eq!(id.len(), AUTO_ID_LEN);
            assert!(id.chars().all(|c| c.is_ascii_alphanumeric()));
        }
    }
}
