//! The screens of the app, each a `Reducer` run by a `Container`.
//!
//! Every screen is exposed as a type alias over `Container` with its named intents implemented on
//! it, e.g. `EditScreen::expense(repository).set_amount("500")`.

mod category_detail;
mod edit;
mod home;
mod months;

pub use category_detail::{
    CategoryDetailEffect, CategoryDetailIntent, CategoryDetailReducer, CategoryDetailScreen,
    CategoryDetailState,
};
pub use edit::{EditEffect, EditIntent, EditReducer, EditScreen, EditScreenState};
pub use home::{HomeEffect, HomeIntent, HomeReducer, HomeScreen, HomeState};
pub use months::{MonthsEffect, MonthsIntent, MonthsReducer, MonthsScreen};
