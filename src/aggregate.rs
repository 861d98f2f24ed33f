use std::collections::BTreeMap;

use crate::models::{Overview, Record, SectorTotal, Summary};

/// Groups records by sector and sums each group. Sectors come out in
/// ascending order; the total is the sum of the group sums.
pub fn summarize<'a, I>(records: I) -> Summary
where
    I: IntoIterator<Item = &'a Record>,
{
    let mut by_sector: BTreeMap<&str, f64> = BTreeMap::new();
    for record in records {
        *by_sector.entry(record.sector.as_str()).or_insert(0.0) += record.amount;
    }

    let by_sector = by_sector
        .into_iter()
        .map(|(sector, amount)| SectorTotal {
            sector: sector.to_string(),
            amount,
        })
        .collect::<Vec<_>>();
    let total = by_sector.iter().map(|group| group.amount).sum();

    Summary { total, by_sector }
}

pub fn overview(month: String, income: &Summary, spend: &Summary) -> Overview {
    Overview {
        month,
        income: income.total,
        spend: spend.total,
        net: income.total - spend.total,
    }
}
