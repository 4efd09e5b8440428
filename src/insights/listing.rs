//! Sorting and filtering for the table endpoints.

use std::cmp::Ordering;

use serde::Deserialize;
use thiserror::Error;

use crate::models::{Chain, ChainProtocol, Protocol, ProtocolFee};

#[derive(Debug, Error, PartialEq)]
pub enum ListingError {
    #[error("unknown sort field '{0}'")]
    UnknownField(String),

    #[error("unknown sort order '{0}', expected 'asc' or 'desc'")]
    UnknownOrder(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl std::str::FromStr for SortOrder {
    type Err = ListingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "asc" | "ascending" => Ok(SortOrder::Asc),
            "desc" | "descending" => Ok(SortOrder::Desc),
            other => Err(ListingError::UnknownOrder(other.to_string())),
        }
    }
}

/// A value a record can be ordered by.
#[derive(Debug, Clone, PartialEq)]
pub enum SortKey {
    Number(f64),
    Text(String),
}

impl SortKey {
    fn compare(&self, other: &SortKey) -> Ordering {
        match (self, other) {
            (SortKey::Number(a), SortKey::Number(b)) => a.partial_cmp(b).unwrap_or(Ordering::Equal),
            (SortKey::Text(a), SortKey::Text(b)) => a.to_lowercase().cmp(&b.to_lowercase()),
            _ => Ordering::Equal,
        }
    }
}

/// Records that can be listed through [`ListQuery`].
pub trait Listable {
    const SORT_FIELDS: &'static [&'static str];

    /// Value of `field`, or `None` when the record has no such field.
    fn sort_key(&self, field: &str) -> Option<SortKey>;

    fn name(&self) -> &str;

    fn category(&self) -> Option<&str> {
        None
    }

    fn on_chain(&self, _chain: &str) -> bool {
        true
    }
}

/// Query string accepted by the table endpoints.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    pub sort_by: Option<String>,
    pub order: Option<String>,
    pub search: Option<String>,
    pub chain: Option<String>,
    pub category: Option<String>,
    pub limit: Option<usize>,
}

impl ListQuery {
    /// Filter, then sort, then truncate.
    pub fn apply<T: Listable>(&self, mut items: Vec<T>) -> Result<Vec<T>, ListingError> {
        let order = match &self.order {
            Some(o) => o.parse()?,
            None => SortOrder::default(),
        };

        if let Some(search) = self.search.as_deref().filter(|s| !s.is_empty()) {
            let needle = search.to_lowercase();
            items.retain(|i| i.name().to_lowercase().contains(&needle));
        }
        if let Some(chain) = self.chain.as_deref().filter(|s| !s.is_empty()) {
            items.retain(|i| i.on_chain(chain));
        }
        if let Some(category) = self.category.as_deref().filter(|s| !s.is_empty()) {
            items.retain(|i| i.category().is_some_and(|c| c.eq_ignore_ascii_case(category)));
        }

        if let Some(field) = &self.sort_by {
            sort_by_field(&mut items, field, order)?;
        }

        if let Some(limit) = self.limit {
            items.truncate(limit);
        }
        Ok(items)
    }
}

/// Stable sort on `field`.
pub fn sort_by_field<T: Listable>(
    items: &mut [T],
    field: &str,
    order: SortOrder,
) -> Result<(), ListingError> {
    if !T::SORT_FIELDS.contains(&field) {
        return Err(ListingError::UnknownField(field.to_string()));
    }

    items.sort_by(|a, b| {
        let ord = match (a.sort_key(field), b.sort_key(field)) {
            (Some(a), Some(b)) => a.compare(&b),
            _ => Ordering::Equal,
        };
        match order {
            SortOrder::Asc => ord,
            SortOrder::Desc => ord.reverse(),
        }
    });
    Ok(())
}

// ---------------------------------------------------------------------------
// Record impls
// ---------------------------------------------------------------------------

impl Listable for Chain {
    const SORT_FIELDS: &'static [&'static str] = &[
        "name", "tvl", "marketCap", "mcapToTvl", "change_24h", "change_7d", "protocols",
    ];

    fn sort_key(&self, field: &str) -> Option<SortKey> {
        let key = match field {
            "name" => SortKey::Text(self.name.clone()),
            "tvl" => SortKey::Number(self.tvl),
            "marketCap" => SortKey::Number(self.market_cap),
            "mcapToTvl" => SortKey::Number(self.mcap_to_tvl),
            "change_24h" => SortKey::Number(self.change_24h),
            "change_7d" => SortKey::Number(self.change_7d),
            "protocols" => SortKey::Number(f64::from(self.protocols)),
            _ => return None,
        };
        Some(key)
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn on_chain(&self, chain: &str) -> bool {
        self.name.eq_ignore_ascii_case(chain)
    }
}

impl Listable for Protocol {
    const SORT_FIELDS: &'static [&'static str] = &[
        "name", "category", "tvl", "change_24h", "change_7d", "marketCap", "mcapTvlRatio",
    ];

    fn sort_key(&self, field: &str) -> Option<SortKey> {
        let key = match field {
            "name" => SortKey::Text(self.name.clone()),
            "category" => SortKey::Text(self.category.clone()),
            "tvl" => SortKey::Number(self.tvl),
            "change_24h" => SortKey::Number(self.change_24h),
            "change_7d" => SortKey::Number(self.change_7d),
            "marketCap" => SortKey::Number(self.market_cap),
            "mcapTvlRatio" => SortKey::Number(self.mcap_tvl_ratio),
            _ => return None,
        };
        Some(key)
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn category(&self) -> Option<&str> {
        Some(&self.category)
    }

    fn on_chain(&self, chain: &str) -> bool {
        self.chain_tvls.keys().any(|c| c.eq_ignore_ascii_case(chain))
    }
}

impl Listable for ChainProtocol {
    const SORT_FIELDS: &'static [&'static str] =
        &["name", "category", "tvl", "change_1d", "change_7d"];

    fn sort_key(&self, field: &str) -> Option<SortKey> {
        let key = match field {
            "name" => SortKey::Text(self.name.clone()),
            "category" => SortKey::Text(self.category.clone()),
            "tvl" => SortKey::Number(self.tvl),
            "change_1d" => SortKey::Number(self.change_1d),
            "change_7d" => SortKey::Number(self.change_7d),
            _ => return None,
        };
        Some(key)
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn category(&self) -> Option<&str> {
        Some(&self.category)
    }
}

impl Listable for ProtocolFee {
    const SORT_FIELDS: &'static [&'static str] = &[
        "name", "category", "dailyFees", "weeklyFees", "monthlyFees", "totalFees",
        "dailyRevenue", "totalRevenue",
    ];

    fn sort_key(&self, field: &str) -> Option<SortKey> {
        let key = match field {
            "name" => SortKey::Text(self.name.clone()),
            "category" => SortKey::Text(self.category.clone()),
            "dailyFees" => SortKey::Number(self.fees.daily),
            "weeklyFees" => SortKey::Number(self.fees.weekly),
            "monthlyFees" => SortKey::Number(self.fees.monthly),
            "totalFees" => SortKey::Number(self.fees.cumulative),
            "dailyRevenue" => SortKey::Number(self.revenue.daily),
            "totalRevenue" => SortKey::Number(self.revenue.cumulative),
            _ => return None,
        };
        Some(key)
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn category(&self) -> Option<&str> {
        Some(&self.category)
    }

    fn on_chain(&self, chain: &str) -> bool {
        self.chains.iter().any(|c| c.eq_ignore_ascii_case(chain))
    }
}
