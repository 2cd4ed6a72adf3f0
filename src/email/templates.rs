use askama::Template;

#[derive(Template)]
#[template(path = "email/password_reset.html")]
struct PasswordResetEmail<'a> {
    name: &'a str,
    reset_url: &'a str,
    valid_minutes: i64,
}

pub fn render_password_reset(
    name: &str,
    reset_url: &str,
    valid_minutes: i64,
) -> Result<String, askama::Error> {
    PasswordResetEmail {
        name,
        reset_url,
        valid_minutes,
    }
    .render()
}
