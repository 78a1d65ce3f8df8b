use std::path::Path;

use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::decimal::Money;
use crate::errors::{LedgerError, Result};
use crate::member::Member;
use crate::storage::{MemberStore, PaymentStore};
use crate::types::{PaymentId, PaymentRecord};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// sqlite-backed store; the connection lives as long as the store
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// open (or create) a database file and make sure the schema exists
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        Self::from_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    pub fn from_connection(conn: Connection) -> Result<Self> {
        setup_schema(&conn)?;
        Ok(Self { conn })
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

/// create tables and indexes if missing
pub fn setup_schema(conn: &Connection) -> Result<()> {
    conn.pragma_update(None, "foreign_keys", "ON")?;

    // rowid keeps insertion order for member listings
    conn.execute(
        "CREATE TABLE IF NOT EXISTS members (
            code TEXT PRIMARY KEY NOT NULL,
            name TEXT NOT NULL,
            guardian_name TEXT NOT NULL,
            address TEXT NOT NULL,
            contact TEXT NOT NULL,
            admission_date TEXT NOT NULL,
            monthly_fee TEXT NOT NULL
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS payments (
            id INTEGER PRIMARY KEY,
            code TEXT NOT NULL REFERENCES members(code),
            date TEXT NOT NULL,
            amount TEXT NOT NULL
        )",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_payments_code ON payments(code)",
        [],
    )?;

    Ok(())
}

fn parse_date(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value, DATE_FORMAT).map_err(|_| LedgerError::CorruptRow {
        message: format!("bad date '{}'", value),
    })
}

fn parse_money(value: &str) -> Result<Money> {
    Money::from_str_exact(value).map_err(|_| LedgerError::CorruptRow {
        message: format!("bad amount '{}'", value),
    })
}

/// raw member columns, converted after the row borrow ends
struct MemberRow {
    code: String,
    name: String,
    guardian_name: String,
    address: String,
    contact: String,
    admission_date: String,
    monthly_fee: String,
}

impl MemberRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            code: row.get(0)?,
            name: row.get(1)?,
            guardian_name: row.get(2)?,
            address: row.get(3)?,
            contact: row.get(4)?,
            admission_date: row.get(5)?,
            monthly_fee: row.get(6)?,
        })
    }

    fn into_member(self) -> Result<Member> {
        Ok(Member {
            admission_date: parse_date(&self.admission_date)?,
            monthly_fee: parse_money(&self.monthly_fee)?,
            code: self.code,
            name: self.name,
            guardian_name: self.guardian_name,
            address: self.address,
            contact: self.contact,
        })
    }
}

struct PaymentRow {
    id: i64,
    code: String,
    date: String,
    amount: String,
}

impl PaymentRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            code: row.get(1)?,
            date: row.get(2)?,
            amount: row.get(3)?,
        })
    }

    fn into_record(self) -> Result<PaymentRecord> {
        let id = PaymentId::try_from(self.id).map_err(|_| LedgerError::CorruptRow {
            message: format!("bad payment id {}", self.id),
        })?;
        Ok(PaymentRecord {
            id,
            date: parse_date(&self.date)?,
            amount: parse_money(&self.amount)?,
            code: self.code,
        })
    }
}

const MEMBER_COLUMNS: &str =
    "code, name, guardian_name, address, contact, admission_date, monthly_fee";

impl MemberStore for SqliteStore {
    fn load_all_members(&self) -> Result<Vec<Member>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM members ORDER BY rowid",
            MEMBER_COLUMNS
        ))?;
        let rows = stmt
            .query_map([], MemberRow::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        rows.into_iter().map(MemberRow::into_member).collect()
    }

    fn load_member(&self, code: &str) -> Result<Option<Member>> {
        let row = self
            .conn
            .query_row(
                &format!("SELECT {} FROM members WHERE code = ?1", MEMBER_COLUMNS),
                params![code],
                MemberRow::from_row,
            )
            .optional()?;
        row.map(MemberRow::into_member).transpose()
    }

    fn save_member(&mut self, member: &Member) -> Result<()> {
        // upsert keeps the original rowid, and with it the listing position
        self.conn.execute(
            "INSERT INTO members (code, name, guardian_name, address, contact, admission_date, monthly_fee)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
             ON CONFLICT(code) DO UPDATE SET
                name = excluded.name,
                guardian_name = excluded.guardian_name,
                address = excluded.address,
                contact = excluded.contact,
                admission_date = excluded.admission_date,
                monthly_fee = excluded.monthly_fee",
            params![
                member.code,
                member.name,
                member.guardian_name,
                member.address,
                member.contact,
                member.admission_date.format(DATE_FORMAT).to_string(),
                member.monthly_fee.as_decimal().to_string(),
            ],
        )?;
        Ok(())
    }
}

impl PaymentStore for SqliteStore {
    fn load_payments(&self, code: &str) -> Result<Vec<PaymentRecord>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, code, date, amount FROM payments WHERE code = ?1 ORDER BY id")?;
        let rows = stmt
            .query_map(params![code], PaymentRow::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        rows.into_iter().map(PaymentRow::into_record).collect()
    }

    fn load_all_payments(&self) -> Result<Vec<PaymentRecord>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, code, date, amount FROM payments ORDER BY id")?;
        let rows = stmt
            .query_map([], PaymentRow::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        rows.into_iter().map(PaymentRow::into_record).collect()
    }

    fn append_payment(&mut self, record: &PaymentRecord) -> Result<()> {
        let id = i64::try_from(record.id).map_err(|_| LedgerError::CorruptRow {
            message: format!("payment id {} out of range", record.id),
        })?;
        self.conn.execute(
            "INSERT INTO payments (id, code, date, amount) VALUES (?1, ?2, ?3, ?4)",
            params![
                id,
                record.code,
                record.date.format(DATE_FORMAT).to_string(),
                record.amount.as_decimal().to_string(),
            ],
        )?;
        Ok(())
    }

    fn next_payment_id(&self) -> Result<PaymentId> {
        let max: i64 = self
            .conn
            .query_row("SELECT COALESCE(MAX(id), 0) FROM payments", [], |row| row.get(0))?;
        PaymentId::try_from(max + 1).map_err(|_| LedgerError::CorruptRow {
            message: format!("bad payment id {}", max),
        })
    }

    fn payment_count(&self) -> Result<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM payments", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn member(code: &str, fee: i64) -> Member {
        Member::new(
            code,
            "Name",
            "Guardian",
            "Address",
            "555",
            NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
            Money::from_major(fee),
        )
        .unwrap()
    }

    #[test]
    fn test_member_round_trip() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        let mut m = member("LIB-7", 200);
        m.monthly_fee = Money::from_str_exact("250.50").unwrap();
        store.save_member(&m).unwrap();

        assert_eq!(store.load_member("LIB-7").unwrap(), Some(m));
        assert_eq!(store.load_member("nope").unwrap(), None);
    }

    #[test]
    fn test_listing_order_survives_upsert() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        store.save_member(&member("B", 100)).unwrap();
        store.save_member(&member("A", 100)).unwrap();
        store.save_member(&member("B", 300)).unwrap();

        let all = store.load_all_members().unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].code, "B");
        assert_eq!(all[0].monthly_fee, Money::from_major(300));
        assert_eq!(all[1].code, "A");
    }

    #[test]
    fn test_payments_append_and_load() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        store.save_member(&member("A", 200)).unwrap();

        assert_eq!(store.next_payment_id().unwrap(), 1);
        let record = PaymentRecord {
            id: 1,
            code: "A".to_string(),
            date: NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
            amount: Money::from_str_exact("99.99").unwrap(),
        };
        store.append_payment(&record).unwrap();

        assert_eq!(store.next_payment_id().unwrap(), 2);
        assert_eq!(store.payment_count().unwrap(), 1);
        assert_eq!(store.load_payments("A").unwrap(), vec![record.clone()]);
        assert_eq!(store.load_all_payments().unwrap(), vec![record]);
    }

    #[test]
    fn test_foreign_key_rejects_unknown_code() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        let result = store.append_payment(&PaymentRecord {
            id: 1,
            code: "ghost".to_string(),
            date: NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
            amount: Money::from_major(10),
        });
        assert!(matches!(result, Err(LedgerError::Storage(_))));
    }

    #[test]
    fn test_schema_setup_is_idempotent() {
        let store = SqliteStore::open_in_memory().unwrap();
        setup_schema(store.connection()).unwrap();
    }
}
