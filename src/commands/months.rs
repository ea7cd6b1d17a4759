use crate::commands::{repository, Out};
use crate::model::{month_name, Months};
use crate::screens::MonthsScreen;
use crate::state::GenericState;
use crate::{Config, Result};
use anyhow::bail;

/// Lists the months that have data, grouped by year.
pub async fn months(config: Config) -> Result<Out<Months>> {
    let screen = MonthsScreen::create(repository(&config).await?);
    screen.load();
    let months = match screen.wait_for(|s| s.is_terminal()).await {
        GenericState::Success(months) => months,
        GenericState::Error(reason) => bail!("Unable to list months: {reason}"),
        other => bail!("Unexpected months state {other:?}"),
    };
    if months.is_empty() {
        return Ok(Out::new("No months have data yet", months));
    }
    let lines: Vec<String> = months
        .iter()
        .map(|(year, dates)| {
            let names: Vec<String> = dates.iter().map(|d| month_name(*d)).collect();
            format!("{year}: {}", names.join(", "))
        })
        .collect();
    Ok(Out::new(lines.join("\n"), months))
}
