//! Chain query contract and balance wrapper

use crate::Result;
use async_trait::async_trait;
use tracing::debug;

/// External balance source
#[async_trait]
pub trait ChainQuery: Send + Sync {
    /// Balances for an owner (address or viewing key) as
    /// `(token, amount-string)` pairs.
    async fn query_balance(&self, owner: &str) -> Result<Vec<(String, String)>>;
}

/// A parsed token balance
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Balance {
    /// Token identifier
    pub token: String,
    /// Amount in base units
    pub amount: u128,
}

/// Query balances for an owner, re-parsing amount strings as integers.
///
/// Absent owners and transport failures yield an empty list; entries whose
/// amount does not parse are skipped.
pub async fn query_balances(source: &dyn ChainQuery, owner: &str) -> Vec<Balance> {
    let raw = match source.query_balance(owner).await {
        Ok(raw) => raw,
        Err(e) => {
            debug!(error = %e, "balance query failed");
            return Vec::new();
        }
    };

    raw.into_iter()
        .filter_map(|(token, amount)| {
            amount
                .parse::<u128>()
                .ok()
                .map(|amount| Balance { token, amount })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    struct FixedQuery(Vec<(String, String)>);

    #[async_trait]
    impl ChainQuery for FixedQuery {
        async fn query_balance(&self, _owner: &str) -> Result<Vec<(String, String)>> {
            Ok(self.0.clone())
        }
    }

    struct FailingQuery;

    #[async_trait]
    impl ChainQuery for FailingQuery {
        async fn query_balance(&self, _owner: &str) -> Result<Vec<(String, String)>> {
            Err(Error::Store("offline".to_string()))
        }
    }

    #[tokio::test]
    async fn test_amounts_parse_as_integers() {
        let source = FixedQuery(vec![
            ("vlm".to_string(), "1000000".to_string()),
            ("atom".to_string(), "42".to_string()),
        ]);
        let balances = query_balances(&source, "vlm1owner").await;
        assert_eq!(
            balances,
            vec![
                Balance {
                    token: "vlm".to_string(),
                    amount: 1_000_000
                },
                Balance {
                    token: "atom".to_string(),
                    amount: 42
                },
            ]
        );
    }

    #[tokio::test]
    async fn test_unparsable_amounts_skipped() {
        let source = FixedQuery(vec![
            ("vlm".to_string(), "not-a-number".to_string()),
            ("atom".to_string(), "7".to_string()),
        ]);
        let balances = query_balances(&source, "vlm1owner").await;
        assert_eq!(balances.len(), 1);
        assert_eq!(balances[0].token, "atom");
    }

    #[tokio::test]
    async fn test_failure_yields_empty() {
        assert!(query_balances(&FailingQuery, "vlm1owner").await.is_empty());
    }
}
