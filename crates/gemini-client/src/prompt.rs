use chrono::NaiveDate;
use moat_core::MoatFactor;

/// Build the moat evaluation prompt for `ticker` as of `date`.
pub fn build_prompt(ticker: &str, date: NaiveDate) -> String {
    let criteria: String = MoatFactor::ALL
        .iter()
        .enumerate()
        .map(|(i, factor)| format!("{}. {}\n", i + 1, factor.to_label()))
        .collect();

    let schema: String = MoatFactor::ALL
        .iter()
        .map(|factor| format!("  \"{}\": \"High/Low/None\",\n", factor.json_key()))
        .collect();

    format!(
        "Evaluate the economic moat of the stock with code: {ticker}.\n\
         Current Date: {date}.\n\
         Please evaluate based on the latest information available as of this date.\n\
         \n\
         Criteria to evaluate:\n\
         {criteria}\
         \n\
         For each criteria, provide an evaluation of exactly one of these three values: \"High\", \"Low\", or \"None\".\n\
         Also provide a short description (around 3 short sentences) explaining why you evaluated the stock this way.\n\
         \n\
         Return the response in the following JSON format ONLY, do not include markdown formatting or explanations outside the JSON:\n\
         {{\n\
         {schema}  \"description\": \"Your short explanation here\"\n\
         }}\n",
        ticker = ticker,
        date = date.format("%Y-%m-%d"),
        criteria = criteria,
        schema = schema,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_embeds_ticker_and_date() {
        let date = NaiveDate::from_ymd_opt(2026, 3, 7).unwrap();
        let prompt = build_prompt("MSFT", date);
        assert!(prompt.contains("stock with code: MSFT."));
        assert!(prompt.contains("Current Date: 2026-03-07."));
    }

    #[test]
    fn test_prompt_names_every_factor_and_field() {
        let date = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();
        let prompt = build_prompt("AAPL", date);
        for factor in MoatFactor::ALL {
            assert!(prompt.contains(factor.to_label()), "missing {}", factor.to_label());
            assert!(prompt.contains(&format!("\"{}\"", factor.json_key())));
        }
        assert!(prompt.contains("\"description\""));
        assert!(prompt.contains("\"High\", \"Low\", or \"None\""));
        assert!(prompt.contains("do not include markdown"));
    }

    #[test]
    fn test_prompt_is_deterministic() {
        let date = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();
        assert_eq!(build_prompt("KO", date), build_prompt("KO", date));
    }
}
