use crate::commands::{repository, Out};
use crate::model::{parse_month_key, FinanceScreenExpense, FinanceScreenModel, Money};
use crate::screens::HomeScreen;
use crate::state::GenericState;
use crate::{Config, Result};
use anyhow::bail;
use chrono::Datelike;
use std::fmt::Write;

/// Shows the totals of a month and its breakdown by category. Without `month`, the current month
/// is shown.
pub async fn home(config: Config, month: Option<&str>) -> Result<Out<FinanceScreenModel>> {
    let screen = HomeScreen::create(repository(&config).await?);
    match month {
        Some(month_key) => screen.load(month_key),
        None => screen.refresh(),
    }
    let state = screen.wait_for(|s| s.finance.is_terminal()).await;
    let model = match state.finance {
        GenericState::Success(model) => model,
        GenericState::Error(reason) => bail!("Unable to show the month: {reason}"),
        other => bail!("Unexpected month state {other:?}"),
    };

    let year = parse_month_key(&state.month_key)?.year();
    let mut message = format!(
        "{} {year}: income {}, expenses {}, balance {}",
        state.month_name,
        Money::from_minor_units(model.income_amount),
        Money::from_minor_units(model.expense_amount),
        Money::from_minor_units(model.balance()),
    );
    write_rows(&mut message, "Expenses", &model.expenses);
    write_rows(&mut message, "Income", &model.income);
    Ok(Out::new(message, model))
}

fn write_rows(message: &mut String, title: &str, rows: &[FinanceScreenExpense]) {
    if rows.is_empty() {
        return;
    }
    let _ = write!(message, "\n{title}:");
    for row in rows {
        let _ = write!(
            message,
            "\n  {:<14} {:>12} {:>4}%  ({})",
            row.category.display_name(),
            row.money().to_string(),
            row.percentage,
            row.count
        );
    }
}
