use anyhow::{bail, Result};

pub const USAGE: &str = "\
Usage:
  moat-dashboard --symbol AAPL [--skip-moat] [--json]
  moat-dashboard --watch AAPL MSFT KO [--json]";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CliArgs {
    pub symbol: Option<String>,
    pub watch: Vec<String>,
    pub skip_moat: bool,
    pub json: bool,
}

impl CliArgs {
    pub fn parse(args: &[String]) -> Result<Self> {
        let mut parsed = CliArgs {
            skip_moat: args.iter().any(|a| a == "--skip-moat"),
            json: args.iter().any(|a| a == "--json"),
            ..Default::default()
        };

        parsed.symbol = args
            .iter()
            .position(|a| a == "--symbol")
            .and_then(|i| args.get(i + 1))
            .filter(|s| !s.starts_with("--"))
            .cloned();

        if let Some(idx) = args.iter().position(|a| a == "--watch") {
            parsed.watch = args[idx + 1..]
                .iter()
                .take_while(|a| !a.starts_with("--"))
                .cloned()
                .collect();
        }

        if parsed.symbol.is_none() && parsed.watch.is_empty() {
            bail!("no symbol given\n{}", USAGE);
        }
        Ok(parsed)
    }

    /// Every symbol to report on, selected symbol first, without duplicates
    pub fn symbols(&self) -> Vec<String> {
        let mut out: Vec<String> = Vec::new();
        for s in self.symbol.iter().chain(self.watch.iter()) {
            let s = s.trim().to_uppercase();
            if !s.is_empty() && !out.contains(&s) {
                out.push(s);
            }
        }
        out
    }
}
