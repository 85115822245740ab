//! Strategy performance CSV importer.
//!
//! Rows of `period,strategy,benchmark` returns (values like `12.4%` or bare
//! numbers). The strategy-minus-benchmark difference is derived here so the
//! stored table never disagrees with its inputs. The whole table on the named
//! strategy page is replaced in one save.

use serde::Deserialize;
use tracing::warn;

use super::{ImportError, ImportSummary};
use crate::content::fields::{PageBody, ReturnRow};
use crate::content::kind::PageKind;
use crate::content::store::SiteContent;

#[derive(Debug, Deserialize)]
struct PerformanceRow {
    period: String,
    strategy: String,
    benchmark: String,
}

fn parse_percent(raw: &str) -> Option<f64> {
    raw.trim().trim_end_matches('%').trim().parse().ok()
}

fn format_percent(value: f64) -> String {
    format!("{value:+.1}%")
}

fn to_return_row(row: &PerformanceRow) -> Option<ReturnRow> {
    let strategy = parse_percent(&row.strategy)?;
    let benchmark = parse_percent(&row.benchmark)?;
    if row.period.trim().is_empty() {
        return None;
    }
    Some(ReturnRow {
        period: row.period.trim().to_string(),
        strategy: format_percent(strategy),
        benchmark: format_percent(benchmark),
        difference: format_percent(strategy - benchmark),
    })
}

/// Replace the return table of the strategy page titled `strategy_title`.
pub fn import_performance_csv(
    content: &mut SiteContent,
    strategy_title: &str,
    csv_data: &str,
) -> Result<ImportSummary, ImportError> {
    let page = content
        .tree
        .pages_of_kind(PageKind::Strategy)
        .into_iter()
        .find(|node| node.title == strategy_title)
        .map(|node| (node.id, node.title.clone(), node.body.clone()));
    let Some((id, title, PageBody::Strategy(mut fields))) = page else {
        return Err(ImportError::Malformed(format!(
            "strategy page not found: {strategy_title}"
        )));
    };

    let mut summary = ImportSummary::default();
    let mut rows = Vec::new();
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(csv_data.as_bytes());
    for record in reader.deserialize::<PerformanceRow>() {
        let row = match record {
            Ok(row) => row,
            Err(err) => {
                warn!(error = %err, "skipping unreadable performance row");
                summary.failed += 1;
                continue;
            }
        };
        match to_return_row(&row) {
            Some(parsed) => {
                rows.push(parsed);
                summary.created += 1;
            }
            None => {
                warn!(period = %row.period, "skipping performance row with bad values");
                summary.failed += 1;
            }
        }
    }

    if !rows.is_empty() {
        fields.performance = rows;
        content.tree.save(id, &title, PageBody::Strategy(fields))?;
    }
    Ok(summary)
}
