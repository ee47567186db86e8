use anyhow::{bail, Result};
use tracing::warn;

use califica_core::api::{is_unauthorized, LoginOutcome, Registration};
use califica_core::routes::Route;

use crate::app::{prompt, prompt_password, App};
use crate::render;

pub async fn login(app: &App, email: Option<String>) -> Result<()> {
    app.store.wait_rehydrated().await;
    if let Some(user) = app.store.user().filter(|_| app.store.is_authenticated()) {
        println!("Already logged in as {}.", user.email);
        return Ok(());
    }

    let email = match email {
        Some(email) => email,
        None => prompt("Email", app.config.last_email.as_deref())?,
    };
    let password = prompt_password("Password")?;

    let client = app.public_client(Route::Login)?;
    let outcome = match client
        .auth()
        .login(&app.store, app.config.login_policy, &email, &password)
        .await
    {
        Err(e) if is_unauthorized(&e) => bail!("Invalid email or password"),
        other => other?,
    };

    match outcome {
        LoginOutcome::LoggedIn(user) => {
            remember_email(app, &user.email);
            println!("Welcome, {}!", user.name);
        }
        LoginOutcome::EmailNotVerified { email } => {
            println!("Your email address has not been verified yet.");
            println!("Check your inbox, or run: califica resend-verification {}", email);
        }
    }
    Ok(())
}

pub async fn signup(app: &App) -> Result<()> {
    let name = prompt("Name", None)?;
    let email = prompt("Email", None)?;
    let password = prompt_password("Password")?;
    let confirmation = prompt_password("Confirm password")?;

    let registration = Registration {
        name,
        email,
        password,
        role: None,
    };
    let client = app.public_client(Route::Signup)?;
    let outcome = client
        .auth()
        .register(&app.store, app.config.login_policy, &registration, &confirmation)
        .await?;

    remember_email(app, &outcome.user.email);
    if outcome.logged_in {
        println!("Welcome, {}!", outcome.user.name);
    } else {
        println!("Account created. We sent a verification link to {}.", outcome.user.email);
        println!("Verify your email, then run: califica login");
    }
    Ok(())
}

pub async fn logout(app: &App) -> Result<()> {
    app.store.wait_rehydrated().await;
    app.store.logout();
    println!("Logged out.");
    Ok(())
}

pub async fn whoami(app: &App) -> Result<()> {
    app.store.wait_rehydrated().await;
    match app.store.user().filter(|_| app.store.is_authenticated()) {
        Some(user) => render::user(&user),
        None => println!("Not logged in."),
    }
    Ok(())
}

pub async fn verify(app: &App, token: &str) -> Result<()> {
    let client = app.public_client(Route::VerifyEmail)?;
    let message = client.auth().verify_email(token).await?;
    println!("{}", message.as_deref().unwrap_or("Email verified."));
    println!("You can now log in: califica login");
    Ok(())
}

pub async fn resend_verification(app: &App, email: &str) -> Result<()> {
    let client = app.public_client(Route::VerifyEmail)?;
    let message = client.auth().resend_verification(email).await?;
    println!("{}", message.as_deref().unwrap_or("Verification email sent."));
    Ok(())
}

fn remember_email(app: &App, email: &str) {
    let mut config = app.config.clone();
    config.last_email = Some(email.to_string());
    if let Err(e) = config.save() {
        warn!(error = %e, "Could not save config");
    }
}
