//! Proportional settlement of a debit against a family account.
//!
//! The family pool is drained first. Any shortfall is then apportioned across the members in proportion to their
//! personal balances, enumerating members by user id ascending:
//!
//! * every member except the last pays `floor(balance * remaining / members_total)`, capped at their balance;
//! * the last member pays whatever is still outstanding, capped at their balance;
//! * if the caps leave points outstanding (possible when the last member's balance is small), the remainder is swept
//!   from the members in the same order until it is covered.
//!
//! [`settle`] checks that the family can afford the amount before computing anything, so a successful settlement
//! always debits exactly `amount`. [`apportion`] runs the algorithm without that check and reports any shortfall in
//! [`Settlement::unrecovered`].
use log::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::db_types::{FamilyAccount, Owner, Points};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SettlementError {
    #[error("Settlement amounts must be positive, but {0} was requested")]
    InvalidAmount(Points),
    #[error("Insufficient balance. Required: {required}, available: {available}")]
    InsufficientBalance { required: Points, available: Points },
}

/// One debit produced by a settlement. `delta` is negative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettlementLine {
    pub owner: Owner,
    pub delta: Points,
    pub balance_after: Points,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settlement {
    pub lines: Vec<SettlementLine>,
    /// Points that could not be collected. Always zero for settlements produced by [`settle`].
    pub unrecovered: Points,
}

impl Settlement {
    pub fn total_debited(&self) -> Points {
        -self.lines.iter().map(|l| l.delta).sum::<Points>()
    }

    pub fn line_for(&self, owner: Owner) -> Option<&SettlementLine> {
        self.lines.iter().find(|l| l.owner == owner)
    }
}

/// Computes how `amount` is debited from `account`, failing if the family and its members cannot cover it.
pub fn settle(account: &FamilyAccount, amount: Points) -> Result<Settlement, SettlementError> {
    if !amount.is_positive() {
        return Err(SettlementError::InvalidAmount(amount));
    }
    let available = account.total_available();
    if available < amount {
        debug!("🧮️ Family #{} cannot cover {amount}. Available: {available}", account.family.id);
        return Err(SettlementError::InsufficientBalance { required: amount, available });
    }
    Ok(apportion(account, amount))
}

/// Runs the settlement algorithm without the affordability precondition.
pub fn apportion(account: &FamilyAccount, amount: Points) -> Settlement {
    let family = &account.family;
    let mut lines = Vec::with_capacity(account.members.len() + 1);
    let from_family = amount.min(family.balance).max(Points::zero());
    if from_family.is_positive() {
        lines.push(SettlementLine {
            owner: Owner::Family(family.id),
            delta: -from_family,
            balance_after: family.balance - from_family,
        });
    }
    let remaining = amount - from_family;
    trace!("🧮️ Family #{} pool pays {from_family}. {remaining} remains for the members", family.id);
    if !remaining.is_positive() || account.members.is_empty() {
        return Settlement { lines, unrecovered: remaining.max(Points::zero()) };
    }
    let members_total = account.members_total();
    if !members_total.is_positive() {
        warn!(
            "🧮️ Family #{} members hold no points, but {remaining} is still owed. The remainder cannot be collected.",
            family.id
        );
        return Settlement { lines, unrecovered: remaining };
    }

    let mut debits = vec![Points::zero(); account.members.len()];
    let last = account.members.len() - 1;
    let mut allocated = Points::zero();
    for (i, member) in account.members[..last].iter().enumerate() {
        let share = member.balance.scale(remaining, members_total).min(member.balance);
        debits[i] = share;
        allocated += share;
    }
    let tail = (remaining - allocated).min(account.members[last].balance);
    debits[last] = tail;
    allocated += tail;

    let mut outstanding = remaining - allocated;
    for (i, member) in account.members.iter().enumerate() {
        if !outstanding.is_positive() {
            break;
        }
        let take = outstanding.min(member.balance - debits[i]);
        if take.is_positive() {
            trace!("🧮️ Sweeping {take} of rounding remainder from user #{}", member.id);
            debits[i] += take;
            outstanding -= take;
        }
    }

    for (member, debit) in account.members.iter().zip(debits) {
        if debit.is_positive() {
            lines.push(SettlementLine {
                owner: Owner::User(member.id),
                delta: -debit,
                balance_after: member.balance - debit,
            });
        }
    }
    Settlement { lines, unrecovered: outstanding }
}
