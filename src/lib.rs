pub mod config;
pub mod connection;
pub mod database;
pub mod errors;
pub mod generator;
pub mod mcp_handler;
pub mod purchase;
pub mod rank;
pub mod reports;
pub mod rounds;
pub mod statistics;
pub mod types;
pub mod use_cases;
pub mod utils;
pub mod winnings;

pub use errors::{LottoError, LottoResult};
pub use generator::{draw_winning_numbers, pick_ticket_numbers};
pub use purchase::{ManualPurchaseForm, purchase_auto, purchase_manual};
pub use rank::determine_rank;
pub use rounds::{
    FinalizedRound, create_next_round, delete_round, finalize_round, finalize_round_with_draw,
    round_state,
};
pub use statistics::{aggregate, dashboard};
pub use types::*;
pub use winnings::check_winnings;
