//! Business configuration: lines, bird types, drivers and report knobs.
//!
//! Loaded from `<data_dir>/ledger_config.json`. Tests use
//! `LedgerConfig::default_test()`.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BirdTypeConfig {
    pub name: String,
    /// Unit printed on bills, e.g. "kg" or "units".
    pub unit: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerConfig {
    pub lines:      Vec<String>,
    pub bird_types: Vec<BirdTypeConfig>,
    #[serde(default)]
    pub drivers:    Vec<String>,
    #[serde(default = "default_report_window_days")]
    pub report_window_days: u64,
    #[serde(default = "default_top_debtor_limit")]
    pub top_debtor_limit: usize,
}

fn default_report_window_days() -> u64 {
    7
}

fn default_top_debtor_limit() -> usize {
    5
}

impl LedgerConfig {
    /// Load from the data/ directory.
    pub fn load(data_dir: &str) -> anyhow::Result<Self> {
        let path = format!("{data_dir}/ledger_config.json");
        let content = std::fs::read_to_string(&path)
            .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
        let config: LedgerConfig = serde_json::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Cannot parse {path}: {e}"))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        if self.lines.is_empty() {
            anyhow::bail!("ledger config must name at least one line");
        }
        if self.bird_types.is_empty() {
            anyhow::bail!("ledger config must name at least one bird type");
        }
        for (i, bird) in self.bird_types.iter().enumerate() {
            if self.bird_types[..i].iter().any(|b| b.name == bird.name) {
                anyhow::bail!("bird type '{}' listed twice", bird.name);
            }
        }
        Ok(())
    }

    pub fn has_line(&self, line: &str) -> bool {
        self.lines.iter().any(|l| l == line)
    }

    pub fn bird_type(&self, name: &str) -> Option<&BirdTypeConfig> {
        self.bird_types.iter().find(|b| b.name == name)
    }

    pub fn bird_names(&self) -> impl Iterator<Item = &str> {
        self.bird_types.iter().map(|b| b.name.as_str())
    }

    /// Config with hardcoded defaults for use in unit tests.
    pub fn default_test() -> Self {
        Self {
            lines: ["Pati", "Amjhera+Gandhwani", "Anjad", "Dahi", "Local"]
                .into_iter()
                .map(String::from)
                .collect(),
            bird_types: vec![
                BirdTypeConfig { name: "Minar".into(),   unit: "units".into() },
                BirdTypeConfig { name: "Broiler".into(), unit: "kg".into() },
                BirdTypeConfig { name: "Parent".into(),  unit: "kg".into() },
            ],
            drivers: ["Deepu", "Firoj", "Ritesh", "Akram", "Kanha", "Rahul", "Other"]
                .into_iter()
                .map(String::from)
                .collect(),
            report_window_days: default_report_window_days(),
            top_debtor_limit:   default_top_debtor_limit(),
        }
    }
}
