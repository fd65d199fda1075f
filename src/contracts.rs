//! Contract Board
//! Mission: Fixed board of completed contracts and its CSV report

use chrono::NaiveDate;
use serde::Serialize;
use std::borrow::Cow;

const CSV_DELIMITER: char = ';';
const CSV_HEADER: [&str; 3] = ["Monster", "Reward (gold)", "Completed on"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Contract {
    pub monster: String,
    pub reward: u64,
    pub date: NaiveDate,
}

impl Contract {
    fn new(monster: &str, reward: u64, (y, m, d): (i32, u32, u32)) -> Self {
        Self {
            monster: monster.to_string(),
            reward,
            date: NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default(),
        }
    }
}

/// The board shown to master witchers.
pub fn contract_board() -> Vec<Contract> {
    vec![
        Contract::new("Alghoul", 150, (2025, 5, 1)),
        Contract::new("Dragon", 1000, (2025, 4, 25)),
        Contract::new("Ghoul", 200, (2025, 5, 10)),
    ]
}

pub fn total_gold(contracts: &[Contract]) -> u64 {
    contracts.iter().map(|c| c.reward).sum()
}

/// `;`-separated CSV with a UTF-8 BOM so spreadsheet tools pick the encoding.
pub fn render_csv_report(contracts: &[Contract]) -> String {
    let mut out = String::from('\u{feff}');
    push_row(&mut out, CSV_HEADER.iter().map(|h| Cow::Borrowed(*h)));
    for c in contracts {
        push_row(
            &mut out,
            [
                Cow::Borrowed(c.monster.as_str()),
                Cow::Owned(c.reward.to_string()),
                Cow::Owned(c.date.format("%Y-%m-%d").to_string()),
            ],
        );
    }
    out
}

fn push_row<'a>(out: &mut String, fields: impl IntoIterator<Item = Cow<'a, str>>) {
    for (i, field) in fields.into_iter().enumerate() {
        if i > 0 {
            out.push(CSV_DELIMITER);
        }
        out.push_str(&escape_field(&field));
    }
    out.push_str("\r\n");
}

fn escape_field(field: &str) -> Cow<'_, str> {
    if field.contains([CSV_DELIMITER, '"', '\r', '\n']) {
        Cow::Owned(format!("\"{}\"", field.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(field)
    }
}
