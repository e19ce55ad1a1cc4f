//! Profile screen: role switch, login, registration.

use lapak_core::PhoneNumber;
use lapak_storefront::error::{AppError, Result};
use secrecy::SecretString;

use crate::app::App;
use crate::output;

/// Show the active role and who is logged in.
pub fn show_role(app: &App) {
    let session = app.session.session();
    output::line(format_args!("Peran: {}", session.role));
    match (&session.customer_name, &session.phone) {
        (Some(name), Some(phone)) => output::line(format_args!("Masuk sebagai {name} ({phone})")),
        (None, Some(phone)) => output::line(format_args!("Masuk sebagai {phone}")),
        _ => output::line("Belum login"),
    }
}

/// Toggle between admin and customer.
pub fn switch_role(app: &mut App) -> Result<()> {
    let role = app.session.switch_role()?;
    output::line(format_args!("Peran sekarang: {role}"));
    Ok(())
}

/// Log in with phone and password (read from stdin if not given).
pub async fn login(app: &mut App, phone: &str, password: Option<String>) -> Result<()> {
    let phone = parse_phone(phone)?;
    let password = match password {
        Some(p) => SecretString::from(p),
        None => read_password()?,
    };
    let session = app.session.login(&app.api, &phone, &password).await?;
    output::line(format_args!(
        "Selamat datang, {}!",
        session.customer_name_or(phone.as_str())
    ));
    Ok(())
}

/// Create an account and log in.
pub async fn register(
    app: &mut App,
    name: &str,
    phone: &str,
    password: Option<String>,
) -> Result<()> {
    let phone = parse_phone(phone)?;
    let password = match password {
        Some(p) => SecretString::from(p),
        None => read_password()?,
    };
    let session = app.session.register(&app.api, name, &phone, &password).await?;
    output::line(format_args!(
        "Akun dibuat. Selamat datang, {}!",
        session.customer_name_or(name)
    ));
    Ok(())
}

/// Return to the logged-out customer session.
pub fn logout(app: &mut App) -> Result<()> {
    app.session.logout(&app.api)?;
    output::line("Anda telah keluar.");
    Ok(())
}

fn parse_phone(phone: &str) -> Result<PhoneNumber> {
    PhoneNumber::parse(phone).map_err(|e| AppError::BadRequest(format!("Nomor HP tidak valid: {e}")))
}

fn read_password() -> Result<SecretString> {
    output::read_password("Kata sandi")
        .map_err(|e| AppError::BadRequest(format!("Gagal membaca kata sandi: {e}")))
}
