//! Certificate Issuer interface and in-memory implementation
//!
//! One certificate is issued to the lender for every originated loan. The
//! engine never reads anything back from the issuer.

use dashmap::DashMap;
use lendledger_common::{Address, LoanId};
use serde::Serialize;
use tracing::debug;

/// Issues non-fungible loan certificates
pub trait CertificateIssuer: Send + Sync {
    fn issue(&self, owner: &Address, loan_id: LoanId, metadata_uri: &str);
}

/// Issued certificate
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Certificate {
    pub owner: Address,
    pub loan_id: LoanId,
    pub metadata_uri: String,
    /// Issue timestamp (Unix millis)
    pub issued_at: i64,
}

/// Certificates kept in memory, keyed by loan id
#[derive(Default)]
pub struct InMemoryCertificateIssuer {
    certificates: DashMap<LoanId, Certificate>,
}

impl InMemoryCertificateIssuer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, loan_id: LoanId) -> Option<Certificate> {
        self.certificates.get(&loan_id).map(|c| c.clone())
    }

    /// Certificates held by one owner, ordered by loan id
    pub fn owned_by(&self, owner: &Address) -> Vec<Certificate> {
        let mut owned: Vec<Certificate> = self
            .certificates
            .iter()
            .filter(|c| &c.owner == owner)
            .map(|c| c.clone())
            .collect();
        owned.sort_by_key(|c| c.loan_id);
        owned
    }

    pub fn len(&self) -> usize {
        self.certificates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.certificates.is_empty()
    }
}

impl CertificateIssuer for InMemoryCertificateIssuer {
    fn issue(&self, owner: &Address, loan_id: LoanId, metadata_uri: &str) {
        debug!(%owner, %loan_id, metadata_uri, "certificate issued");
        self.certificates.insert(
            loan_id,
            Certificate {
                owner: owner.clone(),
                loan_id,
                metadata_uri: metadata_uri.to_string(),
                issued_at: chrono::Utc::now().timestamp_millis(),
            },
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issue_and_query() {
        let issuer = InMemoryCertificateIssuer::new();
        let alice = Address::new("alice");

        issuer.issue(&alice, LoanId::new(2), "lendledger://loan/2");
        issuer.issue(&alice, LoanId::new(1), "lendledger://loan/1");

        let owned = issuer.owned_by(&alice);
        assert_eq!(owned.len(), 2);
        assert_eq!(owned[0].loan_id, LoanId::new(1));
        assert_eq!(issuer.get(LoanId::new(2)).unwrap().metadata_uri, "lendledger://loan/2");
    }
}
