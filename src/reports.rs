use chrono::Utc;
use rusqlite::Connection;
use std::error::Error;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::statistics::dashboard;
use crate::types::{Dashboard, RoundRow, SalesPerformanceRow};
use crate::utils::format_timestamp;

const REPORT_FILENAME: &str = "sales_report.html";

fn render_latest_round(round: Option<&RoundRow>) -> String {
    let Some(round) = round else {
        return r#"
            <div class="round-card">
                <div class="round-title">No rounds yet</div>
            </div>
"#
        .to_string();
    };

    let (status, numbers) = match &round.draw {
        Some(draw) => {
            let mut balls: String = draw
                .winning
                .as_slice()
                .iter()
                .map(|n| format!(r#"<span class="ball">{}</span>"#, n))
                .collect();
            balls.push_str(&format!(
                r#"<span class="plus">+</span><span class="ball bonus">{}</span>"#,
                draw.bonus
            ));
            (format!("Drawn {}", format_timestamp(round.drawn_at)), balls)
        }
        None => ("Open for sales".to_string(), String::new()),
    };

    format!(
        r#"
            <div class="round-card">
                <div class="round-title">Round {}</div>
                <div class="round-status">{}</div>
                <div class="balls">{}</div>
            </div>
"#,
        round.round_number, status, numbers
    )
}

fn render_sales_row(row: &SalesPerformanceRow) -> String {
    let s = &row.statistics;
    format!(
        r#"
                    <tr>
                        <td>{}</td>
                        <td>{}</td>
                        <td>{}</td>
                        <td>{}</td>
                        <td>{}</td>
                        <td>{}</td>
                        <td>{}</td>
                        <td>{}</td>
                        <td>{}</td>
                    </tr>
"#,
        row.round_number,
        format_timestamp(row.drawn_at),
        s.total_sales,
        s.total_winners,
        s.rank1_winners,
        s.rank2_winners,
        s.rank3_winners,
        s.rank4_winners,
        s.rank5_winners,
    )
}

pub fn render_sales_report(dashboard: &Dashboard) -> String {
    let total_sales: i64 = dashboard.sales.iter().map(|r| r.statistics.total_sales).sum();
    let total_winners: i64 = dashboard.sales.iter().map(|r| r.statistics.total_winners).sum();

    let mut html = String::new();

    html.push_str(&format!(
        r#"
<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Lotto sales performance</title>
    <style>
        body {{
            font-family: 'Segoe UI', Tahoma, Geneva, sans-serif;
            margin: 0;
            padding: 20px;
            background: linear-gradient(135deg, #667eea 0%, #764ba2 100%);
            min-height: 100vh;
        }}
        .container {{
            max-width: 1200px;
            margin: 0 auto;
            background: white;
            border-radius: 15px;
            box-shadow: 0 20px 40px rgba(0,0,0,0.1);
            overflow: hidden;
        }}
        .header {{
            background: linear-gradient(135deg, #ff6b6b, #feca57);
            color: white;
            padding: 30px;
            text-align: center;
        }}
        .content {{
            padding: 30px;
        }}
        .stats {{
            display: flex;
            gap: 20px;
            margin-bottom: 30px;
        }}
        .stat-item {{
            flex: 1;
            background: #f8f9ff;
            border-radius: 10px;
            padding: 20px;
            text-align: center;
        }}
        .stat-number {{
            font-size: 2em;
            font-weight: 700;
            color: #4834d4;
        }}
        .round-card {{
            border: 2px solid #e2e8f0;
            border-radius: 10px;
            padding: 20px;
            margin-bottom: 30px;
        }}
        .round-title {{
            font-size: 1.4em;
            font-weight: 600;
        }}
        .ball {{
            display: inline-block;
            width: 40px;
            line-height: 40px;
            margin: 10px 4px 0 0;
            border-radius: 50%;
            background: #ffd700;
            text-align: center;
            font-weight: 700;
        }}
        .ball.bonus {{
            background: #a0aec0;
        }}
        table {{
            width: 100%;
            border-collapse: collapse;
        }}
        th, td {{
            padding: 10px;
            border-bottom: 1px solid #e2e8f0;
            text-align: right;
        }}
    </style>
</head>
<body>
    <div class="container">
        <div class="header">
            <h1>Sales performance</h1>
            <div class="date">Next round: {}</div>
        </div>
        <div class="content">
            <div class="stats">
                <div class="stat-item">
                    <div class="stat-number">{}</div>
                    <div class="stat-label">Drawn rounds</div>
                </div>
                <div class="stat-item">
                    <div class="stat-number">{}</div>
                    <div class="stat-label">Tickets sold</div>
                </div>
                <div class="stat-item">
                    <div class="stat-number">{}</div>
                    <div class="stat-label">Winning tickets</div>
                </div>
            </div>
"#,
        dashboard.next_round_number,
        dashboard.sales.len(),
        total_sales,
        total_winners,
    ));

    html.push_str(&render_latest_round(dashboard.latest_round.as_ref()));

    html.push_str(
        r#"
            <table>
                <thead>
                    <tr>
                        <th>Round</th><th>Drawn</th><th>Sales</th><th>Winners</th>
                        <th>1st</th><th>2nd</th><th>3rd</th><th>4th</th><th>5th</th>
                    </tr>
                </thead>
                <tbody>
"#,
    );

    for row in &dashboard.sales {
        html.push_str(&render_sales_row(row));
    }

    html.push_str(&format!(
        r#"
                </tbody>
            </table>
        </div>
        <div class="footer">
            <p>Generated {}</p>
        </div>
    </div>
</body>
</html>
"#,
        Utc::now().format("%Y-%m-%d %H:%M:%S UTC")
    ));

    html
}

pub fn save_html_report_to_path(
    html_content: &str,
    filename: &str,
    report_path: &str,
) -> Result<PathBuf, Box<dyn Error>> {
    let filepath = Path::new(report_path).join(filename);

    // Ensure the report directory exists
    if let Some(parent) = filepath.parent() {
        fs::create_dir_all(parent)?;
    }

    let mut file = File::create(&filepath)?;
    file.write_all(html_content.as_bytes())?;
    Ok(filepath)
}

pub fn generate_and_save_report_to_path(
    conn: &Connection,
    report_path: &str,
) -> Result<PathBuf, Box<dyn Error>> {
    let html_content = render_sales_report(&dashboard(conn)?);
    save_html_report_to_path(&html_content, REPORT_FILENAME, report_path)
}
