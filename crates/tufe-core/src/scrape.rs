//! Best-effort scraper for the central bank's CPI table page.
//!
//! The page markup changes without notice; anything that does not look like a
//! `period | annual % | monthly %` row is ignored and an unrecognisable page
//! yields empty series.

use std::sync::LazyLock;

use regex::Regex;

use crate::number::parse_number;
use crate::period::Period;
use crate::series::Series;

static ROW: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<tr[^>]*>(.*?)</tr>").expect("row pattern is valid"));
static CELL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<t[dh][^>]*>(.*?)</t[dh]>").expect("cell pattern is valid")
});
static TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<[^>]+>").expect("tag pattern is valid"));

const DEFAULT_ANNUAL_COLUMN: usize = 1;
const DEFAULT_MONTHLY_COLUMN: usize = 2;

/// Annual and monthly percentage-change columns scraped from one page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CpiTable {
    pub annual: Series,
    pub monthly: Series,
}

impl CpiTable {
    pub fn is_empty(&self) -> bool {
        self.annual.is_empty() && self.monthly.is_empty()
    }
}

pub fn scrape_cpi_table(html: &str) -> CpiTable {
    let mut annual_column = DEFAULT_ANNUAL_COLUMN;
    let mut monthly_column = DEFAULT_MONTHLY_COLUMN;
    let mut annual = Vec::new();
    let mut monthly = Vec::new();

    for row in ROW.captures_iter(html) {
        let cells = CELL
            .captures_iter(&row[1])
            .map(|cell| clean_cell(&cell[1]))
            .collect::<Vec<_>>();
        let Some(first) = cells.first() else {
            continue;
        };

        let Some(period) = Period::parse(first) else {
            locate_header_columns(&cells, &mut annual_column, &mut monthly_column);
            continue;
        };

        let period = period.canonical();
        let annual_value = cells.get(annual_column).and_then(|cell| parse_number(cell));
        let monthly_value = cells.get(monthly_column).and_then(|cell| parse_number(cell));
        annual.push((period.clone(), annual_value));
        monthly.push((period, monthly_value));
    }

    CpiTable {
        annual: Series::from_points(annual),
        monthly: Series::from_points(monthly),
    }
}

fn locate_header_columns(cells: &[String], annual: &mut usize, monthly: &mut usize) {
    for (index, cell) in cells.iter().enumerate().skip(1) {
        let lowered = cell.to_lowercase();
        if lowered.contains("yıllık") || lowered.contains("yillik") || lowered.contains("annual") {
            *annual = index;
        } else if lowered.contains("aylık") || lowered.contains("aylik") || lowered.contains("monthly") {
            *monthly = index;
        }
    }
}

fn clean_cell(raw: &str) -> String {
    let text = TAG.replace_all(raw, " ");
    text.replace("&nbsp;", " ")
        .replace('%', "")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}
