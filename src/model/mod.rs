//! Types that represent the core data model, such as `Transaction`, `CategoryEnum` and `Money`.
mod category;
mod finance;
mod money;
mod month;
mod transaction;

pub use category::{CategoryEnum, CategoryInfo, ALL_CATEGORIES};
pub use finance::{CategoryMonthDetail, FinanceScreenExpense, FinanceScreenModel, Months};
pub use money::{
    format_money, from_minor_units, parse_amount, round_to_two_digits, to_minor_units, Money,
    MoneyError,
};
pub use month::{
    current_month_key, current_month_name, format_ddmmyyyy, local_date, local_midnight_millis,
    local_noon_millis, month_key, month_key_from_millis, month_name, parse_month_key,
};
pub use transaction::{FinanceEnum, Transaction};
