use anyhow::Result;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use lotto_lib::connection::conn;
use lotto_lib::mcp_handler::{MCPHandler, stdio};
use lotto_lib::use_cases::{AdminUseCase, ReportUseCase, TicketUseCase};
use lotto_lib::config;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    let config = config::load()?;

    tracing::info!("Rounds open, balls ready.");

    let db_conn = conn(&config.database_url)?;
    let db_conn_arc = Arc::new(db_conn);

    let ticket_use_case = TicketUseCase::new(Arc::clone(&db_conn_arc));

    let admin_use_case = AdminUseCase::new(Arc::clone(&db_conn_arc), config.admin_users.clone());

    let report_use_case = ReportUseCase::new(
        Arc::clone(&db_conn_arc),
        config.admin_users.clone(),
        config.report_path.clone(),
    );

    let handler = MCPHandler::new(
        Arc::new(ticket_use_case),
        Arc::new(admin_use_case),
        Arc::new(report_use_case),
    );

    let (reader, writer) = stdio();

    handler.serve(reader, writer).await.inspect_err(|e| {
        tracing::error!("serving error: {:?}", e);
    })?;

    Ok(())
}
