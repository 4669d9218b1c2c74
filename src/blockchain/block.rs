use chrono::Utc;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha512};

use crate::transaction::Transaction;

/// A sealed block. The hash is never stored; it is recomputed from the
/// canonical form whenever it is needed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    #[serde(alias = "index")]
    pub height: u64,
    pub proof: u64,
    pub previous_hash: String,
    #[serde(default)]
    pub timestamp: i64, // Unix timestamp (UTC)
    #[serde(default)]
    pub transactions: Vec<Transaction>,
}

// Fields are declared in sorted-key order so the JSON preimage is the same
// on every node whatever map type serde_json was built with.
#[derive(Serialize)]
struct CanonicalBlock<'a> {
    height: u64,
    previous_hash: &'a str,
    proof: u64,
    timestamp: i64,
    transactions: Vec<CanonicalTransaction<'a>>,
}

#[derive(Serialize)]
struct CanonicalTransaction<'a> {
    amount: u64,
    recipient: &'a str,
    sender: &'a str,
}

impl Block {
    /// Create a block stamped with the current time.
    pub fn new(
        height: u64,
        proof: u64,
        previous_hash: String,
        transactions: Vec<Transaction>,
    ) -> Self {
        Self::with_timestamp(
            height,
            proof,
            previous_hash,
            Utc::now().timestamp(),
            transactions,
        )
    }

    pub fn with_timestamp(
        height: u64,
        proof: u64,
        previous_hash: String,
        timestamp: i64,
        transactions: Vec<Transaction>,
    ) -> Self {
        Self {
            height,
            proof,
            previous_hash,
            timestamp,
            transactions,
        }
    }

    /// Sorted-key JSON encoding of every field except the hash itself.
    pub fn canonical_bytes(&self) -> Vec<u8> {
        let canonical = CanonicalBlock {
            height: self.height,
            previous_hash: &self.previous_hash,
            proof: self.proof,
            timestamp: self.timestamp,
            transactions: self
                .transactions
                .iter()
                .map(|t| CanonicalTransaction {
                    amount: t.amount,
                    recipient: &t.recipient,
                    sender: &t.sender,
                })
                .collect(),
        };
        // Plain structs of strings and integers always serialize.
        serde_json::to_vec(&canonical).expect("canonical block serializes")
    }

    /// SHA-512 of the canonical form, hex encoded (128 chars).
    pub fn hash(&self) -> String {
        hex::encode(Sha512::digest(self.canonical_bytes()))
    }
}

#[cfg(test)]
mod tests {
    use super::Block;
    use crate::transaction::Transaction;

    fn sample() -> Block {
        Block::with_timestamp(
            3,
            42,
            "abc".into(),
            1_700_000_000,
            vec![Transaction::new("a", "b", 1)],
        )
    }

    #[test]
    fn canonical_form_uses_sorted_keys() {
        let text = String::from_utf8(sample().canonical_bytes()).unwrap();
        assert_eq!(
            text,
            r#"{"height":3,"previous_hash":"abc","proof":42,"timestamp":1700000000,"transactions":[{"amount":1,"recipient":"b","sender":"a"}]}"#
        );
    }

    #[test]
    fn hash_is_sha512_hex() {
        let h = sample().hash();
        assert_eq!(h.len(), 128);
        assert!(h.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(h, sample().hash());
    }

    #[test]
    fn hash_changes_when_mutated() {
        let original = sample();
        let mut tampered = sample();
        tampered.transactions.push(Transaction::new("x", "y", 9));
        assert_ne!(original.hash(), tampered.hash());
    }

    #[test]
    fn deserializes_peer_records_with_index_and_hash() {
        let json = r#"{
            "index": 1,
            "proof": 7,
            "previous_hash": "p",
            "hash": "ignored",
            "timestamp": 5,
            "transactions": [{"sender": "a", "recipient": "b", "amount": 2}]
        }"#;
        let block: Block = serde_json::from_str(json).unwrap();
        assert_eq!(block.height, 1);
        assert_eq!(block.transactions[0].amount, 2);
    }
}
