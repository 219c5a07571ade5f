//! Inline HTML views
//!
//! Two pages, no template engine. Everything interpolated from
//! provider data is escaped.

use crate::config::AppConfig;
use crate::provider::{Identity, ScheduleEntry};

/// Render the login page with the provider authorize link.
///
/// The redirect URI on the link is the same value later sent in the
/// token exchange.
pub fn render_login(config: &AppConfig) -> String {
    let authorize_link = format!(
        "{}?response_type=code&redirect_uri={}&client_id={}&district_id={}",
        config.provider.authorize_url,
        urlencoding::encode(&config.server.redirect_uri()),
        urlencoding::encode(&config.provider.client_id),
        urlencoding::encode(&config.provider.district_id),
    );

    format!(
        r#"<!DOCTYPE html>
<html>
<head><title>Bell Schedule</title></head>
<body>
    <h1>Bell Schedule</h1>
    <p>Sign in with your school account to see your schedule.</p>
    <a href="{}">Sign in</a>
</body>
</html>
"#,
        html_escape::encode_double_quoted_attribute(&authorize_link)
    )
}

/// Render the schedule view, personalized with the identity's name.
///
/// Entries are expected to be sorted already.
pub fn render_schedule(identity: &Identity, entries: &[ScheduleEntry]) -> String {
    let rows: String = entries
        .iter()
        .map(|entry| {
            format!(
                "        <tr><td>{}</td><td>{}</td></tr>\n",
                html_escape::encode_text(&entry.data.period),
                html_escape::encode_text(&entry.data.name),
            )
        })
        .collect();

    format!(
        r#"<!DOCTYPE html>
<html>
<head><title>Bell Schedule</title></head>
<body>
    <h1>Bell Schedule for {}</h1>
    <table>
        <tr><th>Period</th><th>Class</th></tr>
{}    </table>
    <form method="post" action="/logout"><button type="submit">Sign out</button></form>
</body>
</html>
"#,
        html_escape::encode_text(&identity.name),
        rows
    )
}
