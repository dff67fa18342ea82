use serde::Serialize;

use crate::errors::S2cError;

/// Portfolio table headers the model is known to emit, most specific first.
pub const KNOWN_HEADERS: [&str; 3] = [
    "Problem_ID,Theme,Impact,Control,Impact×Control,Savings_Band,Duration,Dept(s),Proposed_Start,Org_Tier(s)",
    "Problem_ID,Theme,Impact,Control,Savings_Band,Duration,Dept(s),Proposed_Start,Org_Tier(s)",
    "Problem_ID,Theme,Impact,Control,Savings_Band,Duration,Dept(s),Proposed_Start",
];

pub const CSV_FILE_NAME: &str = "portfolio.csv";
pub const CSV_MIME: &str = "text/csv";

/// Carves the portfolio CSV block out of free model text.
///
/// Headers are tried in priority order; the first one present anywhere in the
/// text wins, and the block runs from its first occurrence to the first blank
/// line. A blank line the model puts inside its own table truncates the block
/// there. Returns an empty string when nothing matches.
pub fn extract_csv_block(text: Option<&str>) -> String {
    let text = match text {
        Some(t) if !t.is_empty() => t,
        _ => return String::new(),
    };
    for header in KNOWN_HEADERS {
        if let Some(idx) = text.find(header) {
            let tail = &text[idx..];
            let block = tail.split("\n\n").next().unwrap_or_default();
            return block.trim().to_string();
        }
    }
    String::new()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PortfolioTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl PortfolioTable {
    /// Rows wider than the header are rejected; shorter rows are padded with empty cells.
    pub fn parse(block: &str) -> Result<Self, S2cError> {
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(block.as_bytes());

        let headers: Vec<String> = rdr
            .headers()
            .map_err(|e| S2cError::Csv(e.to_string()))?
            .iter()
            .map(str::to_string)
            .collect();
        if headers.is_empty() || headers.iter().all(|h| h.is_empty()) {
            return Err(S2cError::Csv("missing header row".into()));
        }

        let mut rows = Vec::new();
        for (i, rec) in rdr.records().enumerate() {
            let rec = rec.map_err(|e| S2cError::Csv(e.to_string()))?;
            if rec.len() > headers.len() {
                return Err(S2cError::Csv(format!(
                    "row {}: expected {} fields, saw {}",
                    i + 1,
                    headers.len(),
                    rec.len()
                )));
            }
            let mut row: Vec<String> = rec.iter().map(str::to_string).collect();
            row.resize(headers.len(), String::new());
            rows.push(row);
        }
        Ok(Self { headers, rows })
    }

    pub fn to_csv(&self) -> Result<String, S2cError> {
        let mut wtr = csv::Writer::from_writer(Vec::new());
        wtr.write_record(&self.headers).map_err(|e| S2cError::Csv(e.to_string()))?;
        for row in &self.rows {
            wtr.write_record(row).map_err(|e| S2cError::Csv(e.to_string()))?;
        }
        let bytes = wtr.into_inner().map_err(|e| S2cError::Csv(e.to_string()))?;
        String::from_utf8(bytes).map_err(|e| S2cError::Csv(e.to_string()))
    }
}

/// What gets offered as `portfolio.csv`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PortfolioExport {
    Parsed(PortfolioTable),
    Raw(String),
}

impl PortfolioExport {
    pub fn from_block(block: &str) -> Self {
        match PortfolioTable::parse(block) {
            Ok(table) => PortfolioExport::Parsed(table),
            Err(e) => {
                tracing::debug!(error = %e, "portfolio block did not parse; keeping raw text");
                PortfolioExport::Raw(block.to_string())
            }
        }
    }

    pub fn table(&self) -> Option<&PortfolioTable> {
        match self {
            PortfolioExport::Parsed(t) => Some(t),
            PortfolioExport::Raw(_) => None,
        }
    }

    pub fn bytes(&self) -> Vec<u8> {
        match self {
            PortfolioExport::Parsed(t) => match t.to_csv() {
                Ok(s) => s.into_bytes(),
                Err(e) => {
                    tracing::debug!(error = %e, "re-serializing portfolio failed");
                    Vec::new()
                }
            },
            PortfolioExport::Raw(s) => s.as_bytes().to_vec(),
        }
    }
}
