use log::{debug, error};
use rusqlite::{Connection, OptionalExtension, Transaction as SqlTransaction, params};

use super::Store;
use crate::blockchain::Block;
use crate::error::Result;
use crate::network::PeerNode;
use crate::transaction::Transaction;

const SCHEMA: &str = "
    PRAGMA foreign_keys = ON;
    CREATE TABLE IF NOT EXISTS block (
        height        INTEGER PRIMARY KEY,
        proof         INTEGER NOT NULL,
        previous_hash TEXT NOT NULL,
        timestamp     INTEGER NOT NULL,
        hash          TEXT NOT NULL
    );
    CREATE TABLE IF NOT EXISTS txn (
        id           INTEGER PRIMARY KEY AUTOINCREMENT,
        block_height INTEGER NOT NULL REFERENCES block(height) ON DELETE CASCADE,
        position     INTEGER NOT NULL,
        sender       TEXT NOT NULL,
        recipient    TEXT NOT NULL,
        amount       INTEGER NOT NULL
    );
    CREATE TABLE IF NOT EXISTS node (
        address TEXT PRIMARY KEY
    );
";

/// SQLite-backed store. `":memory:"` opens a private in-memory database.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    pub fn open(name: &str) -> Result<Self> {
        let conn = Connection::open(name).inspect_err(|e| {
            error!("failed to open database {name}: {e}");
        })?;
        conn.execute_batch(SCHEMA)?;
        debug!("opened sqlite store {name}");
        Ok(Self { conn })
    }

    fn write_block(tx: &SqlTransaction<'_>, block: &Block) -> Result<()> {
        tx.execute(
            "INSERT INTO block (height, proof, previous_hash, timestamp, hash)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                block.height as i64,
                block.proof as i64,
                block.previous_hash,
                block.timestamp,
                block.hash(),
            ],
        )?;
        for (position, t) in block.transactions.iter().enumerate() {
            tx.execute(
                "INSERT INTO txn (block_height, position, sender, recipient, amount)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    block.height as i64,
                    position as i64,
                    t.sender,
                    t.recipient,
                    t.amount as i64,
                ],
            )?;
        }
        Ok(())
    }

    fn transactions_of(&self, height: u64) -> Result<Vec<Transaction>> {
        let mut stmt = self.conn.prepare_cached(
            "SELECT sender, recipient, amount FROM txn
             WHERE block_height = ?1 ORDER BY position",
        )?;
        let rows = stmt.query_map(params![height as i64], |row| {
            Ok(Transaction {
                sender: row.get(0)?,
                recipient: row.get(1)?,
                amount: row.get::<_, i64>(2)? as u64,
            })
        })?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    fn block_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Block> {
        Ok(Block::with_timestamp(
            row.get::<_, i64>(0)? as u64,
            row.get::<_, i64>(1)? as u64,
            row.get(2)?,
            row.get(3)?,
            Vec::new(),
        ))
    }
}

impl Store for SqliteStore {
    fn insert_block(&mut self, block: &Block) -> Result<()> {
        let tx = self.conn.transaction()?;
        Self::write_block(&tx, block)?;
        tx.commit()?;
        Ok(())
    }

    fn load_chain(&self) -> Result<Vec<Block>> {
        let mut stmt = self.conn.prepare(
            "SELECT height, proof, previous_hash, timestamp FROM block ORDER BY height",
        )?;
        let mut chain = stmt
            .query_map([], Self::block_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        for block in &mut chain {
            block.transactions = self.transactions_of(block.height)?;
        }
        Ok(chain)
    }

    fn last_block(&self) -> Result<Option<Block>> {
        let block = self
            .conn
            .query_row(
                "SELECT height, proof, previous_hash, timestamp FROM block
                 ORDER BY height DESC LIMIT 1",
                [],
                Self::block_from_row,
            )
            .optional()?;
        match block {
            Some(mut block) => {
                block.transactions = self.transactions_of(block.height)?;
                Ok(Some(block))
            }
            None => Ok(None),
        }
    }

    fn replace_chain(&mut self, chain: &[Block]) -> Result<()> {
        let tx = self.conn.transaction()?;
        tx.execute("DELETE FROM txn", [])?;
        tx.execute("DELETE FROM block", [])?;
        for block in chain {
            Self::write_block(&tx, block)?;
        }
        tx.commit()?;
        debug!("sqlite store now holds {} blocks", chain.len());
        Ok(())
    }

    fn insert_peer(&mut self, peer: &PeerNode) -> Result<bool> {
        let added = self.conn.execute(
            "INSERT OR IGNORE INTO node (address) VALUES (?1)",
            params![peer.address],
        )?;
        Ok(added == 1)
    }

    fn load_peers(&self) -> Result<Vec<PeerNode>> {
        let mut stmt = self
            .conn
            .prepare("SELECT address FROM node ORDER BY rowid")?;
        let peers = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .map(|r| r.map(PeerNode::from_location))
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(peers)
    }
}
