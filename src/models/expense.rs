use std::collections::{BTreeMap, BTreeSet};

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use thiserror::Error;

/// One shared cost as submitted by a client.
///
/// Every field is lenient on input: a missing amount, a blank payer or an
/// empty participant list is a data-quality issue reported by
/// [`Expense::validate`], not a deserialization failure.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Expense {
    #[serde(default)]
    pub amount: Option<Decimal>,
    #[serde(default, alias = "payer_id")]
    pub payer: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub participants: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Decode error for an entry that could not be read as an expense at all
    #[serde(skip)]
    pub unreadable: Option<String>,
}

/// Why an expense was left out of a settlement batch
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ExpenseIssue {
    #[error("amount must be greater than zero")]
    NonPositiveAmount,
    #[error("payer is missing")]
    MissingPayer,
    #[error("participant list is empty")]
    NoParticipants,
    #[error("entry is not a readable expense: {0}")]
    Unreadable(String),
    #[error("amount pushes the batch total out of range")]
    AmountOutOfRange,
}

/// An expense that passed validation, borrowing from the submitted record
#[derive(Debug, Clone, PartialEq)]
pub struct ValidExpense<'a> {
    pub amount: Decimal,
    pub payer: &'a str,
    pub participants: BTreeSet<&'a str>,
}

impl Expense {
    pub fn new(amount: Decimal, payer: &str, participants: &[&str]) -> Self {
        Self {
            amount: Some(amount),
            payer: Some(payer.to_string()),
            participants: participants.iter().map(|p| p.to_string()).collect(),
            description: None,
            unreadable: None,
        }
    }

    /// Decodes one raw batch entry. An entry with the wrong shape becomes a
    /// placeholder that fails validation instead of failing the batch.
    pub fn from_value(value: Value) -> Self {
        serde_json::from_value(value).unwrap_or_else(|e| Self {
            unreadable: Some(e.to_string()),
            ..Self::default()
        })
    }

    /// Checks the expense invariants. Blank identifiers are ignored and
    /// duplicate participants collapse into one share.
    pub fn validate(&self) -> Result<ValidExpense<'_>, ExpenseIssue> {
        if let Some(reason) = &self.unreadable {
            return Err(ExpenseIssue::Unreadable(reason.clone()));
        }

        let amount = match self.amount {
            Some(amount) if amount > Decimal::ZERO => amount,
            _ => return Err(ExpenseIssue::NonPositiveAmount),
        };

        let payer = self
            .payer
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .ok_or(ExpenseIssue::MissingPayer)?;

        let participants: BTreeSet<&str> = self
            .participants
            .iter()
            .map(|p| p.trim())
            .filter(|p| !p.is_empty())
            .collect();

        if participants.is_empty() {
            return Err(ExpenseIssue::NoParticipants);
        }

        Ok(ValidExpense {
            amount,
            payer,
            participants,
        })
    }
}

/// Request body for the split endpoint. Only `expenses` itself must be a
/// list; each entry is decoded on its own.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SplitRequest {
    #[serde(deserialize_with = "lenient_entries")]
    pub expenses: Vec<Expense>,
}

fn lenient_entries<'de, D>(deserializer: D) -> Result<Vec<Expense>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Vec::<Value>::deserialize(deserializer)?;
    Ok(raw.into_iter().map(Expense::from_value).collect())
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}

/// A single payment that moves money from a debtor to a creditor
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SettlementTransaction {
    pub from: String,
    pub to: String,
    pub amount: Decimal,
}

/// Net balances for a batch of expenses and the payments that settle them
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct SplitSummary {
    /// Positive = is owed money, negative = owes money
    pub balances: BTreeMap<String, Decimal>,
    pub transactions: Vec<SettlementTransaction>,
    pub skipped_expenses: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}
