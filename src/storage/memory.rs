use std::collections::HashMap;

use crate::errors::Result;
use crate::member::Member;
use crate::storage::{MemberStore, PaymentStore};
use crate::types::{PaymentId, PaymentRecord};

/// volatile store, keeps insertion order for members and payments
#[derive(Debug, Default)]
pub struct InMemoryStore {
    members: Vec<Member>,
    index: HashMap<String, usize>,
    payments: Vec<PaymentRecord>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl MemberStore for InMemoryStore {
    fn load_all_members(&self) -> Result<Vec<Member>> {
        Ok(self.members.clone())
    }

    fn load_member(&self, code: &str) -> Result<Option<Member>> {
        Ok(self.index.get(code).map(|&i| self.members[i].clone()))
    }

    fn save_member(&mut self, member: &Member) -> Result<()> {
        match self.index.get(&member.code) {
            Some(&i) => self.members[i] = member.clone(),
            None => {
                self.index.insert(member.code.clone(), self.members.len());
                self.members.push(member.clone());
            }
        }
        Ok(())
    }
}

impl PaymentStore for InMemoryStore {
    fn load_payments(&self, code: &str) -> Result<Vec<PaymentRecord>> {
        Ok(self
            .payments
            .iter()
            .filter(|p| p.code == code)
            .cloned()
            .collect())
    }

    fn load_all_payments(&self) -> Result<Vec<PaymentRecord>> {
        Ok(self.payments.clone())
    }

    fn append_payment(&mut self, record: &PaymentRecord) -> Result<()> {
        self.payments.push(record.clone());
        Ok(())
    }

    fn next_payment_id(&self) -> Result<PaymentId> {
        Ok(self.payments.last().map(|p| p.id + 1).unwrap_or(1))
    }

    fn payment_count(&self) -> Result<usize> {
        Ok(self.payments.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decimal::Money;
    use chrono::NaiveDate;

    fn member(code: &str) -> Member {
        Member::new(
            code,
            "Name",
            "Guardian",
            "Address",
            "555",
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            Money::from_major(200),
        )
        .unwrap()
    }

    #[test]
    fn test_members_keep_insertion_order() {
        let mut store = InMemoryStore::new();
        for code in ["C", "A", "B"] {
            store.save_member(&member(code)).unwrap();
        }
        let codes: Vec<String> = store
            .load_all_members()
            .unwrap()
            .into_iter()
            .map(|m| m.code)
            .collect();
        assert_eq!(codes, vec!["C", "A", "B"]);
    }

    #[test]
    fn test_save_member_upserts_in_place() {
        let mut store = InMemoryStore::new();
        store.save_member(&member("A")).unwrap();
        store.save_member(&member("B")).unwrap();

        let mut updated = member("A");
        updated.contact = "999".to_string();
        store.save_member(&updated).unwrap();

        let all = store.load_all_members().unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].contact, "999");
    }

    #[test]
    fn test_payment_ids_increase() {
        let mut store = InMemoryStore::new();
        assert_eq!(store.next_payment_id().unwrap(), 1);

        store
            .append_payment(&PaymentRecord {
                id: 1,
                code: "A".to_string(),
                date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
                amount: Money::from_major(10),
            })
            .unwrap();
        assert_eq!(store.next_payment_id().unwrap(), 2);
        assert_eq!(store.payment_count().unwrap(), 1);
        assert!(store.load_payments("B").unwrap().is_empty());
    }
}
