use hourglass_rs::{SafeTimeProvider, TimeSource};
use tracing::{info, warn};

use crate::errors::{LedgerError, Result};
use crate::events::Event;
use crate::library::Library;
use crate::member::Member;
use crate::storage::Storage;

impl<S: Storage> Library<S> {
    /// register a member with system time
    pub fn add_member_now(&mut self, member: Member) -> Result<Member> {
        let time = SafeTimeProvider::new(TimeSource::System);
        self.add_member(member, &time)
    }

    /// register a new member; codes are unique
    pub fn add_member(&mut self, member: Member, time_provider: &SafeTimeProvider) -> Result<Member> {
        member.validate()?;
        member.check_limits(&self.config.limits)?;

        if self.store.load_member(&member.code)?.is_some() {
            warn!(code = %member.code, "duplicate member code rejected");
            return Err(LedgerError::DuplicateCode {
                code: member.code.clone(),
            });
        }

        self.store.save_member(&member)?;

        info!(
            code = %member.code,
            admission_date = %member.admission_date,
            monthly_fee = %member.monthly_fee,
            "member registered"
        );
        self.events.emit(Event::MemberRegistered {
            code: member.code.clone(),
            admission_date: member.admission_date,
            monthly_fee: member.monthly_fee,
            timestamp: time_provider.now(),
        });

        Ok(member)
    }

    /// member by code, `NotFound` on a miss
    pub fn get_member(&self, code: &str) -> Result<Member> {
        self.store
            .load_member(code.trim())?
            .ok_or_else(|| LedgerError::NotFound {
                code: code.to_string(),
            })
    }

    pub fn find_member(&self, code: &str) -> Result<Option<Member>> {
        self.store.load_member(code.trim())
    }

    /// all members in registration order
    pub fn list_members(&self) -> Result<Vec<Member>> {
        self.store.load_all_members()
    }

    pub fn member_count(&self) -> Result<usize> {
        Ok(self.store.load_all_members()?.len())
    }
}
