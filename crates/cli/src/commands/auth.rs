//! Session commands.

use secrecy::SecretString;
use shopfront::error::Result;
use shopfront::state::Storefront;

pub async fn login(shop: &mut Storefront, username: &str, password: String) -> Result<()> {
    let password = SecretString::from(password);
    shop.login(username, &password).await?;
    println!("Logged in as {username}.");
    Ok(())
}

/// Create an account. The new account still has to log in.
pub async fn register(
    shop: &Storefront,
    email: &str,
    username: &str,
    password: String,
    confirm_password: Option<String>,
) -> Result<()> {
    let password = SecretString::from(password);
    let confirm_password = confirm_password.map(SecretString::from);
    let user = shop
        .register(email, username, &password, confirm_password.as_ref())
        .await?;
    println!("Registered {username} (id {}). Log in to continue.", user.id);
    Ok(())
}

pub fn logout(shop: &mut Storefront) {
    shop.logout();
    println!("Logged out.");
}

pub fn status(shop: &Storefront) {
    let session = shop.session();
    match session.username() {
        Some(username) if session.is_authenticated() => {
            println!(
                "Logged in as {username} (user {}).",
                session.user_id().unwrap_or(username)
            );
        }
        _ => println!("Not logged in. Acting as {}.", shop.current_user(None)),
    }
}
