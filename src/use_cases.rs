use anyhow::Result;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::Arc;

use crate::database::get_open_round;
use crate::errors::LottoError;
use crate::purchase::{self, ManualPurchaseForm};
use crate::reports;
use crate::rounds;
use crate::statistics::dashboard;
use crate::utils::outcome_label;
use crate::winnings::check_winnings;

fn require_user(arguments: &HashMap<String, Value>) -> Result<&str> {
    arguments
        .get("user")
        .and_then(|v| v.as_str())
        .map(str::trim)
        .filter(|user| !user.is_empty())
        .ok_or_else(|| anyhow::anyhow!("Missing user parameter"))
}

fn require_admin<'a>(
    arguments: &'a HashMap<String, Value>,
    admin_users: &[String],
) -> Result<&'a str> {
    let user = require_user(arguments)?;
    if !admin_users.iter().any(|admin| admin == user) {
        tracing::warn!(user, "admin tool called by non-admin");
        return Err(LottoError::Unauthorized(user.to_string()).into());
    }
    Ok(user)
}

pub struct TicketUseCase {
    connection: Arc<rusqlite::Connection>,
}

impl TicketUseCase {
    pub fn new(connection: Arc<rusqlite::Connection>) -> Self {
        Self { connection }
    }

    pub async fn current_round(&self, _arguments: &HashMap<String, Value>) -> Result<String> {
        let round = get_open_round(&self.connection)?;
        let state = rounds::round_state(&self.connection)?;

        Ok(json!({
            "success": true,
            "state": state,
            "current_round": round
        })
        .to_string())
    }

    pub async fn purchase_manual(&self, arguments: &HashMap<String, Value>) -> Result<String> {
        let user = require_user(arguments)?;
        let form = ManualPurchaseForm::from_fields(arguments)?;

        let ticket = purchase::purchase_manual(&self.connection, user, &form)?;

        Ok(json!({
            "success": true,
            "ticket": ticket,
            "message": format!("Manual ticket purchased: {}", ticket.numbers)
        })
        .to_string())
    }

    pub async fn purchase_auto(&self, arguments: &HashMap<String, Value>) -> Result<String> {
        let user = require_user(arguments)?;

        let ticket = purchase::purchase_auto(&self.connection, user, &mut rand::thread_rng())?;

        Ok(json!({
            "success": true,
            "ticket": ticket,
            "message": format!("Auto ticket purchased: {}", ticket.numbers)
        })
        .to_string())
    }

    pub async fn check_winnings(&self, arguments: &HashMap<String, Value>) -> Result<String> {
        let user = require_user(arguments)?;

        let results: Vec<Value> = check_winnings(&self.connection, user)?
            .into_iter()
            .map(|check| {
                let label = outcome_label(&check.outcome);
                json!({ "check": check, "label": label })
            })
            .collect();

        Ok(json!({
            "success": true,
            "results": results
        })
        .to_string())
    }
}

pub struct AdminUseCase {
    connection: Arc<rusqlite::Connection>,
    admin_users: Vec<String>,
}

impl AdminUseCase {
    pub fn new(connection: Arc<rusqlite::Connection>, admin_users: Vec<String>) -> Self {
        Self {
            connection,
            admin_users,
        }
    }

    pub async fn admin_dashboard(&self, arguments: &HashMap<String, Value>) -> Result<String> {
        require_admin(arguments, &self.admin_users)?;

        let dashboard = dashboard(&self.connection)?;

        Ok(json!({
            "success": true,
            "dashboard": dashboard
        })
        .to_string())
    }

    pub async fn create_next_round(&self, arguments: &HashMap<String, Value>) -> Result<String> {
        require_admin(arguments, &self.admin_users)?;

        let round = rounds::create_next_round(&self.connection)?;

        Ok(json!({
            "success": true,
            "round": round,
            "message": format!("Round {} is open for sales", round.round_number)
        })
        .to_string())
    }

    pub async fn finalize_round(&self, arguments: &HashMap<String, Value>) -> Result<String> {
        require_admin(arguments, &self.admin_users)?;

        let finalized = rounds::finalize_round(&self.connection, &mut rand::thread_rng())?;

        Ok(json!({
            "success": true,
            "round": finalized.round,
            "statistics": finalized.statistics,
            "message": format!(
                "Round {} drawn and tallied; open the next round to resume sales",
                finalized.round.round_number
            )
        })
        .to_string())
    }

    pub async fn delete_round(&self, arguments: &HashMap<String, Value>) -> Result<String> {
        require_admin(arguments, &self.admin_users)?;

        let round_number = arguments
            .get("round_number")
            .and_then(|v| v.as_i64())
            .ok_or_else(|| anyhow::anyhow!("Missing round_number parameter"))?;

        rounds::delete_round(&self.connection, round_number)?;

        Ok(json!({
            "success": true,
            "message": format!("Round {} deleted", round_number)
        })
        .to_string())
    }
}

pub struct ReportUseCase {
    connection: Arc<rusqlite::Connection>,
    admin_users: Vec<String>,
    report_path: String,
}

impl ReportUseCase {
    pub fn new(
        connection: Arc<rusqlite::Connection>,
        admin_users: Vec<String>,
        report_path: String,
    ) -> Self {
        Self {
            connection,
            admin_users,
            report_path,
        }
    }

    pub async fn generate_sales_report(&self, arguments: &HashMap<String, Value>) -> Result<String> {
        require_admin(arguments, &self.admin_users)?;

        let path = reports::generate_and_save_report_to_path(&self.connection, &self.report_path)
            .map_err(|e| anyhow::anyhow!("Report generation error: {}", e))?;

        Ok(json!({
            "success": true,
            "path": path.display().to_string(),
            "message": "Sales report generated successfully"
        })
        .to_string())
    }
}
