use anyhow::{Context, Result, bail};
use chrono::{DateTime, Utc};

pub fn split_csv(s: &str) -> Vec<String> {
    s.split(',')
        .map(|x| x.trim().to_string())
        .filter(|x| !x.is_empty())
        .collect()
}

/// Parse `1,2,10..13` into seeds; ranges are half-open.
pub fn parse_seeds(s: &str) -> Result<Vec<u64>> {
    let mut seeds = Vec::new();
    for token in split_csv(s) {
        if let Some((start, end)) = token.split_once("..") {
            let start: u64 = start
                .parse()
                .with_context(|| format!("invalid range start in {token:?}"))?;
            let end: u64 = end
                .parse()
                .with_context(|| format!("invalid range end in {token:?}"))?;
            if end <= start {
                bail!("empty seed range {token:?}");
            }
            seeds.extend(start..end);
        } else {
            seeds.push(
                token
                    .parse()
                    .with_context(|| format!("invalid seed {token:?}"))?,
            );
        }
    }
    if seeds.is_empty() {
        bail!("no seeds given");
    }
    Ok(seeds)
}

pub fn report_timestamp(at: DateTime<Utc>) -> String {
    at.format("%Y-%m-%dT%H:%M:%SZ").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn split_csv_trims_and_filters() {
        let parts = split_csv(" alpha, ,beta,  gamma ");
        assert_eq!(parts, vec!["alpha", "beta", "gamma"]);
    }

    #[test]
    fn seeds_accept_lists_and_ranges() {
        assert_eq!(parse_seeds("7, 3..6").unwrap(), vec![7, 3, 4, 5]);
        assert!(parse_seeds("5..5").is_err());
        assert!(parse_seeds("x").is_err());
        assert!(parse_seeds(" , ").is_err());
    }

    #[test]
    fn timestamps_are_utc_seconds() {
        let at = Utc.with_ymd_and_hms(2024, 3, 9, 14, 5, 0).unwrap();
        assert_eq!(report_timestamp(at), "2024-03-09T14:05:00Z");
    }
}
