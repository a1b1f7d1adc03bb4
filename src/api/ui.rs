//! Upload page

use axum::{
    response::{Html, IntoResponse},
    routing::get,
    Router,
};

use crate::AppState;

/// GET /
///
/// Minimal upload page: pick an inspection JSON, get a PDF back.
pub async fn upload_page() -> impl IntoResponse {
    let version = env!("CARGO_PKG_VERSION");

    let html = format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Inspection Report Generator</title>
    <style>
        * {{
            margin: 0;
            padding: 0;
            box-sizing: border-box;
        }}
        body {{
            font-family: 'Segoe UI', Tahoma, Geneva, Verdana, sans-serif;
            background-color: #1a1a1a;
            color: #e0e0e0;
            line-height: 1.6;
        }}
        header {{
            background-color: #2a2a2a;
            border-bottom: 1px solid #3a3a3a;
            padding: 20px;
            margin-bottom: 30px;
        }}
        h1 {{
            font-size: 26px;
            color: #4a9eff;
        }}
        .subtitle {{
            color: #888;
            font-size: 16px;
        }}
        .container {{
            max-width: 640px;
            margin: 0 auto;
            padding: 20px;
        }}
        .card {{
            background-color: #2a2a2a;
            border: 1px solid #3a3a3a;
            border-radius: 8px;
            padding: 24px;
            margin-bottom: 20px;
        }}
        input[type="file"] {{
            margin: 12px 0;
            color: #e0e0e0;
        }}
        button {{
            background-color: #4a9eff;
            color: #fff;
            border: none;
            border-radius: 4px;
            padding: 10px 20px;
            font-size: 15px;
            cursor: pointer;
        }}
        button:hover {{
            background-color: #3a8eef;
        }}
        .hint {{
            color: #888;
            font-size: 13px;
            margin-top: 8px;
        }}
    </style>
</head>
<body>
    <header>
        <h1>Inspection Report Generator</h1>
        <div class="subtitle">v{version} &mdash; upload inspection JSON, download a PDF report</div>
    </header>
    <div class="container">
        <div class="card">
            <form action="/reports" method="post" enctype="multipart/form-data">
                <label for="file">Inspection JSON file</label><br>
                <input type="file" id="file" name="file" accept=".json" required>
                <br>
                <button type="submit">Generate PDF Report</button>
            </form>
            <div class="hint">
                POST the same file to <code>/analyze</code> for an AI executive summary
                and deficiency categorization.
            </div>
        </div>
    </div>
</body>
</html>"#
    );

    Html(html)
}

/// Build UI routes
pub fn ui_routes() -> Router<AppState> {
    Router::new().route("/", get(upload_page))
}
