use chrono::Utc;
use rand::Rng;
use rusqlite::Connection;
use serde_json::Value;
use std::collections::HashMap;
use tracing::{info, warn};

use crate::database::{get_open_round, insert_ticket};
use crate::errors::{LottoError, LottoResult};
use crate::generator::pick_ticket_numbers;
use crate::types::{LottoNumbers, RoundRow, TicketKind, TicketRow};

pub const FORM_FIELDS: [&str; 6] = ["p_num1", "p_num2", "p_num3", "p_num4", "p_num5", "p_num6"];

/// The six number fields of a manual purchase, as submitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManualPurchaseForm {
    values: Vec<i64>,
}

impl ManualPurchaseForm {
    pub fn new(values: Vec<i64>) -> Self {
        Self { values }
    }

    /// Reads `p_num1`..`p_num6`. Form posts may carry numbers as strings.
    pub fn from_fields(fields: &HashMap<String, Value>) -> LottoResult<Self> {
        let mut values = Vec::with_capacity(FORM_FIELDS.len());
        for field in FORM_FIELDS {
            let value = fields
                .get(field)
                .ok_or_else(|| LottoError::MissingField(field.to_string()))?;
            let number = match value {
                Value::Number(n) => n.as_i64(),
                Value::String(s) => s.trim().parse::<i64>().ok(),
                _ => None,
            }
            .ok_or_else(|| LottoError::NotANumber(field.to_string()))?;
            values.push(number);
        }
        Ok(Self { values })
    }

    pub fn clean(&self) -> LottoResult<LottoNumbers> {
        LottoNumbers::try_from_values(&self.values)
    }
}

fn require_open_round(conn: &Connection, owner: &str) -> LottoResult<RoundRow> {
    get_open_round(conn)?.ok_or_else(|| {
        warn!(owner, "purchase rejected, no open round");
        LottoError::NoOpenRound
    })
}

pub fn purchase_manual(
    conn: &Connection,
    owner: &str,
    form: &ManualPurchaseForm,
) -> LottoResult<TicketRow> {
    let round = require_open_round(conn, owner)?;
    let numbers = form.clean().inspect_err(|e| {
        warn!(owner, error = %e, "manual ticket rejected");
    })?;

    let ticket = insert_ticket(conn, owner, round.id, TicketKind::Manual, &numbers, Utc::now())?;
    info!(owner, round = round.round_number, numbers = %numbers, "manual ticket purchased");
    Ok(ticket)
}

pub fn purchase_auto<R: Rng + ?Sized>(
    conn: &Connection,
    owner: &str,
    rng: &mut R,
) -> LottoResult<TicketRow> {
    let round = require_open_round(conn, owner)?;
    let numbers = pick_ticket_numbers(rng)?;

    let ticket = insert_ticket(conn, owner, round.id, TicketKind::Auto, &numbers, Utc::now())?;
    info!(owner, round = round.round_number, numbers = %numbers, "auto ticket purchased");
    Ok(ticket)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::memory_conn;
    use crate::database::count_tickets;
    use crate::rounds::{create_next_round, finalize_round};
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use serde_json::json;

    fn fields(values: Value) -> HashMap<String, Value> {
        serde_json::from_value(values).unwrap()
    }

    #[test]
    fn form_accepts_numbers_and_numeric_strings() {
        let form = ManualPurchaseForm::from_fields(&fields(json!({
            "p_num1": 45, "p_num2": "3", "p_num3": 17,
            "p_num4": " 8 ", "p_num5": 1, "p_num6": 30
        })))
        .unwrap();
        assert_eq!(form.clean().unwrap().as_slice(), &[1, 3, 8, 17, 30, 45]);
    }

    #[test]
    fn form_reports_missing_and_garbage_fields() {
        let missing = ManualPurchaseForm::from_fields(&fields(json!({
            "p_num1": 1, "p_num2": 2, "p_num3": 3, "p_num4": 4, "p_num5": 5
        })));
        assert!(matches!(missing, Err(LottoError::MissingField(f)) if f == "p_num6"));

        let garbage = ManualPurchaseForm::from_fields(&fields(json!({
            "p_num1": 1, "p_num2": 2, "p_num3": "x", "p_num4": 4, "p_num5": 5, "p_num6": 6
        })));
        assert!(matches!(garbage, Err(LottoError::NotANumber(f)) if f == "p_num3"));
    }

    #[test]
    fn out_of_range_and_duplicates_are_rejected_without_a_ticket() {
        let conn = memory_conn().unwrap();
        create_next_round(&conn).unwrap();

        let too_big = ManualPurchaseForm::new(vec![1, 2, 3, 4, 5, 46]);
        assert!(matches!(
            purchase_manual(&conn, "alice", &too_big),
            Err(LottoError::InvalidNumber(46))
        ));

        let zero = ManualPurchaseForm::new(vec![0, 2, 3, 4, 5, 6]);
        assert!(matches!(
            purchase_manual(&conn, "alice", &zero),
            Err(LottoError::InvalidNumber(0))
        ));

        let duplicate = ManualPurchaseForm::new(vec![1, 2, 3, 4, 5, 5]);
        assert!(matches!(
            purchase_manual(&conn, "alice", &duplicate),
            Err(LottoError::DuplicateNumber(5))
        ));

        assert_eq!(count_tickets(&conn).unwrap(), 0);
    }

    #[test]
    fn manual_ticket_is_stored_sorted() {
        let conn = memory_conn().unwrap();
        let round = create_next_round(&conn).unwrap();
        let form = ManualPurchaseForm::new(vec![44, 2, 19, 7, 33, 1]);

        let ticket = purchase_manual(&conn, "alice", &form).unwrap();
        assert_eq!(ticket.round_id, Some(round.id));
        assert_eq!(ticket.kind, TicketKind::Manual);
        assert_eq!(ticket.numbers.as_slice(), &[1, 2, 7, 19, 33, 44]);
    }

    #[test]
    fn same_numbers_can_be_bought_twice() {
        let conn = memory_conn().unwrap();
        create_next_round(&conn).unwrap();
        let form = ManualPurchaseForm::new(vec![1, 2, 3, 4, 5, 6]);
        purchase_manual(&conn, "alice", &form).unwrap();
        purchase_manual(&conn, "alice", &form).unwrap();
        assert_eq!(count_tickets(&conn).unwrap(), 2);
    }

    #[test]
    fn purchases_need_an_open_round() {
        let conn = memory_conn().unwrap();
        let mut rng = StdRng::seed_from_u64(1);
        let form = ManualPurchaseForm::new(vec![1, 2, 3, 4, 5, 6]);

        assert!(matches!(
            purchase_auto(&conn, "bob", &mut rng),
            Err(LottoError::NoOpenRound)
        ));

        create_next_round(&conn).unwrap();
        let ticket = purchase_auto(&conn, "bob", &mut rng).unwrap();
        assert_eq!(ticket.kind, TicketKind::Auto);

        finalize_round(&conn, &mut rng).unwrap();
        assert!(matches!(
            purchase_manual(&conn, "bob", &form),
            Err(LottoError::NoOpenRound)
        ));
        assert_eq!(count_tickets(&conn).unwrap(), 1);
    }
}
