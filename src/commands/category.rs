use crate::commands::{repository, Out};
use crate::model::{
    current_month_key, format_ddmmyyyy, CategoryEnum, CategoryMonthDetail, Money,
};
use crate::screens::CategoryDetailScreen;
use crate::state::GenericState;
use crate::{Config, Result};
use anyhow::bail;
use std::fmt::Write;

/// Shows every expense of `category` in `month`, newest first.
pub async fn category(
    config: Config,
    category: CategoryEnum,
    month: Option<&str>,
) -> Result<Out<CategoryMonthDetail>> {
    let month_key = month.map(str::to_string).unwrap_or_else(current_month_key);
    let screen = CategoryDetailScreen::create(repository(&config).await?);
    screen.load(category, month_key.clone());
    let state = screen.wait_for(|s| s.detail.is_terminal()).await;
    let detail = match state.detail {
        GenericState::Success(detail) => detail,
        GenericState::Error(reason) => bail!("Unable to show {category} in {month_key}: {reason}"),
        other => bail!("Unexpected detail state {other:?}"),
    };

    let mut message = format!(
        "{} in {month_key}: {} across {} expenses",
        category.display_name(),
        Money::from_minor_units(detail.month_amount),
        detail.transactions.len()
    );
    for t in &detail.transactions {
        let _ = write!(
            message,
            "\n  #{:<5} {} {:>12}  {}",
            t.id,
            format_ddmmyyyy(t.occurred_at_millis),
            t.money().to_string(),
            t.note
        );
    }
    Ok(Out::new(message, detail))
}
